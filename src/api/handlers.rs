use axum::http::StatusCode;
use serde::Serialize;
use tracing::error;

use crate::{
    api::views::{
        AccountView, BlockDetailsView, BlockTransactionsView, HomePageView, TransactionInfoView,
    },
    core::{error::ExplorerError, provider::ChainDataProvider},
    explorer::pages::{BlockQuery, Explorer, parse_address, parse_hash},
};

#[derive(Serialize, Debug, PartialEq, Eq)]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(Debug, PartialEq, Eq)]
pub struct ApiHttpResponse {
    pub status: u16,
    pub body: String,
    pub content_type: &'static str,
}

impl ApiHttpResponse {
    pub fn json<T: Serialize>(status: StatusCode, value: &T) -> Self {
        match serde_json::to_string(value) {
            Ok(body) => Self {
                status: status.as_u16(),
                body,
                content_type: "application/json",
            },
            Err(err) => Self {
                status: StatusCode::INTERNAL_SERVER_ERROR.as_u16(),
                body: format!("{{\"error\":\"failed to serialize response: {}\"}}", err),
                content_type: "application/json",
            },
        }
    }

    pub fn error(status: StatusCode, message: impl Into<String>) -> Self {
        let error = ErrorResponse {
            error: message.into(),
        };
        let body = serde_json::to_string(&error)
            .unwrap_or_else(|_| "{\"error\":\"Internal server error\"}".to_string());
        Self {
            status: status.as_u16(),
            body,
            content_type: "application/json",
        }
    }
}

pub fn error_status(err: &ExplorerError) -> StatusCode {
    match err {
        ExplorerError::NotFound(_) => StatusCode::NOT_FOUND,
        ExplorerError::InvalidInput(_) => StatusCode::BAD_REQUEST,
        ExplorerError::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
        ExplorerError::Provider(_) => StatusCode::BAD_GATEWAY,
    }
}

fn from_result<T, V>(result: Result<T, ExplorerError>) -> ApiHttpResponse
where
    V: Serialize + for<'a> From<&'a T>,
{
    match result {
        Ok(value) => ApiHttpResponse::json(StatusCode::OK, &V::from(&value)),
        Err(err) => {
            let status = error_status(&err);
            if status.is_server_error() {
                error!("❌ Request failed: {}", err);
            }
            ApiHttpResponse::error(status, err.to_string())
        }
    }
}

fn require(query: Option<&str>) -> Result<&str, ExplorerError> {
    query
        .map(str::trim)
        .filter(|q| !q.is_empty())
        .ok_or_else(|| ExplorerError::InvalidInput("missing query parameter".to_string()))
}

/// Page index from the path; anything that is not a non-negative integer means page 0.
pub fn parse_page(raw: Option<&str>) -> u64 {
    raw.and_then(|p| p.trim().parse::<u64>().ok())
        .unwrap_or_default()
}

pub fn welcome() -> ApiHttpResponse {
    ApiHttpResponse::json(
        StatusCode::OK,
        &serde_json::json!({
            "service": "rs-block-explorer",
            "version": env!("CARGO_PKG_VERSION"),
            "routes": ["/homepage", "/homepage/{page}", "/txpage?q=", "/txinfo?q=", "/blockdetails?q=", "/accInfo?q="],
        }),
    )
}

pub async fn home_page<P>(explorer: &Explorer<P>, page: Option<&str>) -> ApiHttpResponse
where
    P: ChainDataProvider + ?Sized + 'static,
{
    from_result::<_, HomePageView>(explorer.home_page(parse_page(page)).await)
}

pub async fn block_transactions<P>(explorer: &Explorer<P>, query: Option<&str>) -> ApiHttpResponse
where
    P: ChainDataProvider + ?Sized + 'static,
{
    let result = match require(query).and_then(str::parse::<BlockQuery>) {
        Ok(block) => explorer.block_transactions(block).await,
        Err(err) => Err(err),
    };
    from_result::<_, BlockTransactionsView>(result)
}

pub async fn transaction_info<P>(explorer: &Explorer<P>, query: Option<&str>) -> ApiHttpResponse
where
    P: ChainDataProvider + ?Sized + 'static,
{
    let result = match require(query).and_then(parse_hash) {
        Ok(hash) => explorer.transaction_info(hash).await,
        Err(err) => Err(err),
    };
    from_result::<_, TransactionInfoView>(result)
}

pub async fn block_details<P>(explorer: &Explorer<P>, query: Option<&str>) -> ApiHttpResponse
where
    P: ChainDataProvider + ?Sized + 'static,
{
    let result = match require(query).and_then(parse_hash) {
        Ok(hash) => explorer.block_details(hash).await,
        Err(err) => Err(err),
    };
    from_result::<_, BlockDetailsView>(result)
}

pub async fn account_info<P>(explorer: &Explorer<P>, query: Option<&str>) -> ApiHttpResponse
where
    P: ChainDataProvider + ?Sized + 'static,
{
    let result = match require(query).and_then(parse_address) {
        Ok(address) => explorer.account_info(address).await,
        Err(err) => Err(err),
    };
    from_result::<_, AccountView>(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::ProviderError;

    #[test]
    fn page_parameter_falls_back_to_zero() {
        assert_eq!(parse_page(None), 0);
        assert_eq!(parse_page(Some("3")), 3);
        assert_eq!(parse_page(Some("abc")), 0);
        assert_eq!(parse_page(Some("-2")), 0);
    }

    #[test]
    fn errors_map_to_http_statuses() {
        assert_eq!(
            error_status(&ExplorerError::NotFound("block 9".into())),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            error_status(&ExplorerError::InvalidInput("x".into())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            error_status(&ExplorerError::Timeout(30)),
            StatusCode::GATEWAY_TIMEOUT
        );
        assert_eq!(
            error_status(&ExplorerError::Provider(ProviderError::Rpc("down".into()))),
            StatusCode::BAD_GATEWAY
        );
    }

    #[test]
    fn error_body_is_json() {
        let response = ApiHttpResponse::error(StatusCode::NOT_FOUND, "block 9 not found");
        assert_eq!(response.status, 404);
        let json: serde_json::Value = serde_json::from_str(&response.body).unwrap();
        assert_eq!(json["error"], "block 9 not found");
    }

    #[test]
    fn welcome_lists_routes() {
        let response = welcome();
        assert_eq!(response.status, 200);
        let json: serde_json::Value = serde_json::from_str(&response.body).unwrap();
        assert_eq!(json["service"], "rs-block-explorer");
    }
}
