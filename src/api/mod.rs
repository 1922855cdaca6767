pub mod handlers;
pub mod views;

use std::{collections::HashMap, sync::Arc};

use axum::{
    Router,
    body::Body,
    extract::{Path, Query, State},
    http::{Response, StatusCode, header},
    routing::get,
};
use tracing::error;

use crate::config::AppConfig;
use crate::core::provider::ChainDataProvider;
use crate::explorer::pages::Explorer;
use crate::utils::logger::init_logger;
use handlers::ApiHttpResponse;

pub type SharedExplorer = Arc<Explorer<dyn ChainDataProvider>>;

#[derive(Clone)]
pub struct ApiState {
    pub explorer: SharedExplorer,
}

type QueryParams = Query<HashMap<String, String>>;

/// `?q=` wins; otherwise the first parameter value, whatever its name.
fn query_value(params: &HashMap<String, String>) -> Option<&str> {
    params
        .get("q")
        .or_else(|| params.values().next())
        .map(String::as_str)
}

async fn welcome_handler() -> Response<Body> {
    build_response(handlers::welcome())
}

async fn home_handler(State(state): State<ApiState>) -> Response<Body> {
    build_response(handlers::home_page(&state.explorer, None).await)
}

async fn home_page_handler(
    Path(page): Path<String>,
    State(state): State<ApiState>,
) -> Response<Body> {
    build_response(handlers::home_page(&state.explorer, Some(&page)).await)
}

async fn tx_page_handler(
    Query(params): QueryParams,
    State(state): State<ApiState>,
) -> Response<Body> {
    build_response(handlers::block_transactions(&state.explorer, query_value(&params)).await)
}

async fn tx_info_handler(
    Query(params): QueryParams,
    State(state): State<ApiState>,
) -> Response<Body> {
    build_response(handlers::transaction_info(&state.explorer, query_value(&params)).await)
}

async fn block_details_handler(
    Query(params): QueryParams,
    State(state): State<ApiState>,
) -> Response<Body> {
    build_response(handlers::block_details(&state.explorer, query_value(&params)).await)
}

async fn account_handler(
    Query(params): QueryParams,
    State(state): State<ApiState>,
) -> Response<Body> {
    build_response(handlers::account_info(&state.explorer, query_value(&params)).await)
}

async fn fallback_handler() -> Response<Body> {
    build_response(ApiHttpResponse::error(
        StatusCode::NOT_FOUND,
        "Unknown endpoint",
    ))
}

pub fn router(explorer: SharedExplorer) -> Router {
    Router::new()
        .route("/", get(welcome_handler))
        .route("/homepage", get(home_handler))
        .route("/homepage/:page", get(home_page_handler))
        .route("/txpage", get(tx_page_handler))
        .route("/txinfo", get(tx_info_handler))
        .route("/blockdetails", get(block_details_handler))
        .route("/accInfo", get(account_handler))
        .fallback(fallback_handler)
        .with_state(ApiState { explorer })
}

pub fn build_response(api_response: ApiHttpResponse) -> Response<Body> {
    Response::builder()
        .status(api_response.status)
        .header(header::CONTENT_TYPE, api_response.content_type)
        .body(Body::from(api_response.body))
        .unwrap_or_else(|err| {
            error!("Failed to build response: {err}");
            let mut fallback = Response::new(Body::from("{\"error\":\"Internal server error\"}"));
            *fallback.status_mut() = StatusCode::INTERNAL_SERVER_ERROR;
            fallback
        })
}

pub fn init_logging(cfg: &AppConfig) -> anyhow::Result<()> {
    init_logger(&cfg.logging)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_value_prefers_q() {
        let mut params = HashMap::new();
        params.insert("q".to_string(), "42".to_string());
        assert_eq!(query_value(&params), Some("42"));

        let mut params = HashMap::new();
        params.insert("block".to_string(), "7".to_string());
        assert_eq!(query_value(&params), Some("7"));

        assert_eq!(query_value(&HashMap::new()), None);
    }

    #[test]
    fn build_response_copies_status_and_content_type() {
        let response = build_response(ApiHttpResponse::error(StatusCode::BAD_REQUEST, "bad"));
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            response.headers().get(header::CONTENT_TYPE).unwrap(),
            "application/json"
        );
    }
}
