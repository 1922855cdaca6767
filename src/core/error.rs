//! Error types shared by the provider layer and the explorer pipeline.

use thiserror::Error;

/// Failures reported by a [`ChainDataProvider`](crate::core::provider::ChainDataProvider).
#[derive(Debug, Error)]
pub enum ProviderError {
    /// The node answered but has no such block / transaction / receipt.
    #[error("{0} not found")]
    NotFound(String),

    /// Transport or JSON-RPC level failure.
    #[error("rpc error: {0}")]
    Rpc(String),

    /// The node returned something that could not be turned into chain types.
    #[error("invalid response: {0}")]
    InvalidResponse(String),
}

impl ProviderError {
    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound(what.into())
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

/// Errors surfaced by explorer page assembly.
#[derive(Debug, Error)]
pub enum ExplorerError {
    #[error("{0} not found")]
    NotFound(String),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("page assembly timed out after {0}s")]
    Timeout(u64),

    #[error(transparent)]
    Provider(ProviderError),
}

impl From<ProviderError> for ExplorerError {
    fn from(err: ProviderError) -> Self {
        match err {
            ProviderError::NotFound(what) => ExplorerError::NotFound(what),
            other => ExplorerError::Provider(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_is_classified_separately() {
        let err: ExplorerError = ProviderError::not_found("block 7").into();
        assert!(matches!(err, ExplorerError::NotFound(ref what) if what == "block 7"));
        assert_eq!(err.to_string(), "block 7 not found");

        let err: ExplorerError = ProviderError::Rpc("connection refused".into()).into();
        assert!(matches!(err, ExplorerError::Provider(ProviderError::Rpc(_))));
    }
}
