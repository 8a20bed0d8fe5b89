use crate::eip1193::error::Eip1193Error;
use ethers::{
    contract::ContractError,
    providers::{JsonRpcError, Middleware, MiddlewareError, ProviderError, RpcError},
};
use thiserror::Error;

/// EIP-1193: the user rejected the request.
pub const USER_REJECTED_REQUEST: i64 = 4001;
/// EIP-1193: the requested method or account has not been authorized.
pub const UNAUTHORIZED: i64 = 4100;
/// EIP-1193: the provider is disconnected from all chains.
pub const DISCONNECTED: i64 = 4900;
/// EIP-1474: execution reverted.
pub const EXECUTION_REVERTED: i64 = 3;

#[derive(Error, Debug)]
pub enum TransactionsError {
    #[error("Wallet unavailable")]
    WalletUnavailable,

    #[error("Not connected")]
    NotConnected,

    #[error("Another transaction is still pending")]
    SendInProgress,

    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    #[error("RPC failure: {0}")]
    RpcFailure(String),

    #[error("Contract reverted: {0}")]
    ContractRevert(String),

    #[error("Invalid recipient address: {0}")]
    InvalidAddress(String),

    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    #[error("Storage error: {0}")]
    Storage(String),
}

impl TransactionsError {
    /// Maps a JSON-RPC error object onto the tagged cause.
    pub fn from_rpc(err: &JsonRpcError) -> Self {
        match err.code {
            USER_REJECTED_REQUEST | UNAUTHORIZED => Self::PermissionDenied(err.message.clone()),
            DISCONNECTED => Self::WalletUnavailable,
            EXECUTION_REVERTED => Self::ContractRevert(err.message.clone()),
            _ => Self::RpcFailure(err.to_string()),
        }
    }
}

impl From<Eip1193Error> for TransactionsError {
    fn from(src: Eip1193Error) -> Self {
        match src {
            Eip1193Error::JsNoEthereum => Self::WalletUnavailable,
            Eip1193Error::JsonRpcError(e) => Self::from_rpc(&e),
            other => Self::RpcFailure(other.to_string()),
        }
    }
}

impl From<ProviderError> for TransactionsError {
    fn from(src: ProviderError) -> Self {
        match RpcError::as_error_response(&src) {
            Some(e) => Self::from_rpc(e),
            None => Self::RpcFailure(src.to_string()),
        }
    }
}

impl<M: Middleware> From<ContractError<M>> for TransactionsError {
    fn from(src: ContractError<M>) -> Self {
        if src.is_revert() {
            let reason = src.decode_revert::<String>().unwrap_or_else(|| src.to_string());
            return Self::ContractRevert(reason);
        }
        let response = match (src.as_middleware_error(), src.as_provider_error()) {
            (Some(e), _) => e.as_error_response(),
            (None, Some(e)) => RpcError::as_error_response(e),
            _ => None,
        };
        match response {
            Some(e) => Self::from_rpc(e),
            None => Self::RpcFailure(src.to_string()),
        }
    }
}
