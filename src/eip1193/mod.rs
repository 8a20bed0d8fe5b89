pub mod error;
pub(crate) mod ethereum;
pub(crate) mod request;

use crate::{
    eip1193::{error::Eip1193Error, ethereum::Ethereum, request::RequestArguments},
    error::TransactionsError,
    wallet::Wallet,
};
use async_trait::async_trait;
use ethers::{
    providers::JsonRpcClient,
    types::{Address, TransactionRequest, TxHash},
};
use futures::channel::oneshot;
use gloo_utils::format::JsValueSerdeExt;
use log::debug;
use serde::{de::DeserializeOwned, Serialize};
use wasm_bindgen::JsValue;
use wasm_bindgen_futures::spawn_local;

#[derive(Debug, Clone, Default)]
// The injected object is thread unsafe and wasm is single threaded anyway.
// To stay Send and Sync for ethers, `window.ethereum` is looked up on every request
// instead of being stored here.
pub struct Eip1193 {}

#[cfg_attr(target_arch = "wasm32", async_trait(? Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
impl JsonRpcClient for Eip1193 {
    type Error = Eip1193Error;

    /// Sends the request via `window.ethereum` in Js
    async fn request<T: Serialize + Send + Sync, R: DeserializeOwned + Send>(
        &self,
        method: &str,
        params: T,
    ) -> Result<R, Self::Error> {
        let args = JsValue::from_serde(&RequestArguments::new(method, params)?)?;
        let (sender, receiver) = oneshot::channel();

        spawn_local(async move {
            let res = match Ethereum::injected() {
                Ok(ethereum) => match ethereum.request(&args).await {
                    Ok(r) => match js_sys::JSON::stringify(&r) {
                        Ok(r) => r.as_string().ok_or(Eip1193Error::CommunicationError),
                        Err(err) => Err(err.into()),
                    },
                    Err(err) => Err(err.into()),
                },
                Err(err) => Err(err),
            };
            _ = sender.send(res);
        });

        let res = receiver.await.map_err(|_| Eip1193Error::CommunicationError)??;
        Ok(serde_json::from_str(&res)?)
    }
}

impl Eip1193 {
    pub fn new() -> Self {
        Eip1193 {}
    }
}

#[async_trait(?Send)]
impl Wallet for Eip1193 {
    fn is_available(&self) -> bool {
        Ethereum::injected().is_ok()
    }

    async fn accounts(&self) -> Result<Vec<Address>, TransactionsError> {
        Ok(self.request("eth_accounts", ()).await?)
    }

    async fn request_accounts(&self) -> Result<Vec<Address>, TransactionsError> {
        Ok(self.request("eth_requestAccounts", ()).await?)
    }

    async fn send_transaction(&self, tx: &TransactionRequest) -> Result<TxHash, TransactionsError> {
        debug!("Submitting native transfer {tx:?}");
        Ok(self.request("eth_sendTransaction", [tx]).await?)
    }
}

#[cfg(test)]
#[cfg(target_arch = "wasm32")]
mod tests {
    use super::*;
    use wasm_bindgen_test::*;

    #[wasm_bindgen_test]
    fn test_wallet_is_unavailable_without_injected_provider() {
        let wallet = Eip1193::new();
        assert!(!wallet.is_available());
    }

    #[wasm_bindgen_test]
    async fn test_request_without_injected_provider_is_wallet_unavailable() {
        let wallet = Eip1193::new();
        let result = wallet.accounts().await;
        assert!(matches!(result, Err(TransactionsError::WalletUnavailable)));
    }
}
