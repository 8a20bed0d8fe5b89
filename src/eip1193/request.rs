use crate::eip1193::error::Eip1193Error;
use serde::Serialize;
use serde_json::{json, Value};

/// Argument object handed to `window.ethereum.request`.
#[derive(Debug, Clone, Serialize)]
pub(crate) struct RequestArguments {
    pub method: String,
    pub params: Value,
}

impl RequestArguments {
    pub(crate) fn new<T: Serialize>(method: &str, params: T) -> Result<Self, Eip1193Error> {
        Ok(Self { method: method.to_string(), params: normalize_params(serde_json::to_value(params)?) })
    }
}

/// Wallets expect an array of params. `()` serializes to `null`, and a single object is wrapped.
/// MetaMask also rejects zero padded transaction types (`0x02`), so they are rewritten.
pub(crate) fn normalize_params(params: Value) -> Value {
    match params {
        Value::Null => json!([]),
        Value::Array(items) => Value::Array(items.into_iter().map(normalize_tx_type).collect()),
        other => json!([normalize_tx_type(other)]),
    }
}

fn normalize_tx_type(mut value: Value) -> Value {
    if let Some(tx_type) = value.get_mut("type") {
        let short = match tx_type.as_str() {
            Some("0x01") => Some("0x1"),
            Some("0x02") => Some("0x2"),
            Some("0x03") => Some("0x3"),
            _ => None,
        };
        if let Some(short) = short {
            *tx_type = Value::String(short.to_string());
        }
    }
    value
}
