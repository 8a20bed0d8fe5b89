use crate::error::DISCONNECTED;
use ethers::prelude::{JsonRpcError, ProviderError, RpcError};
use gloo_utils::format::JsValueSerdeExt;
use std::sync::OnceLock;
use thiserror::Error;
use wasm_bindgen::JsValue;

#[derive(Error, Debug)]
/// Error thrown while talking to the injected provider
pub enum Eip1193Error {
    /// Thrown if the request failed with something that is not a JSON-RPC error
    #[error("JsValue error: {0}")]
    JsValueError(String),

    /// Thrown if no window.ethereum is found in DOM
    #[error("No ethereum found")]
    JsNoEthereum,

    #[error(transparent)]
    /// Thrown if the wallet answered with an error object
    JsonRpcError(#[from] JsonRpcError),

    #[error(transparent)]
    /// Serde JSON Error
    SerdeJson(#[from] serde_json::Error),

    #[error("Communication error")]
    CommunicationError,
}

/// A missing provider answers like a wallet that is disconnected from every chain, so the cause
/// survives being boxed into a [`ProviderError`].
fn no_ethereum_response() -> &'static JsonRpcError {
    static RESPONSE: OnceLock<JsonRpcError> = OnceLock::new();
    RESPONSE.get_or_init(|| JsonRpcError {
        code: DISCONNECTED,
        message: Eip1193Error::JsNoEthereum.to_string(),
        data: None,
    })
}

impl RpcError for Eip1193Error {
    fn as_error_response(&self) -> Option<&JsonRpcError> {
        match self {
            Eip1193Error::JsonRpcError(e) => Some(e),
            Eip1193Error::JsNoEthereum => Some(no_ethereum_response()),
            _ => None,
        }
    }

    fn is_error_response(&self) -> bool {
        self.as_error_response().is_some()
    }

    fn as_serde_error(&self) -> Option<&serde_json::Error> {
        match self {
            Eip1193Error::SerdeJson(e) => Some(e),
            _ => None,
        }
    }

    fn is_serde_error(&self) -> bool {
        self.as_serde_error().is_some()
    }
}

impl From<JsValue> for Eip1193Error {
    fn from(src: JsValue) -> Self {
        if let Ok(message) = src.into_serde::<JsonRpcError>() {
            Eip1193Error::JsonRpcError(message)
        } else {
            Eip1193Error::JsValueError(format!("{:?}", src))
        }
    }
}

impl From<Eip1193Error> for ProviderError {
    fn from(src: Eip1193Error) -> Self {
        ProviderError::JsonRpcClientError(Box::new(src))
    }
}
