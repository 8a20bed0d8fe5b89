use crate::error::TransactionsError;
use async_trait::async_trait;
use ethers::types::{Address, TransactionRequest, TxHash};
use std::rc::Rc;

/// Browser wallet capability: account discovery, permission requests and native transfers.
///
/// [`crate::eip1193::Eip1193`] talks to `window.ethereum`; anything else (a test double, another
/// injected provider) can be plugged into [`crate::Transactions`] instead.
#[async_trait(?Send)]
pub trait Wallet {
    /// Whether the wallet object exists at all.
    fn is_available(&self) -> bool;

    /// Accounts already authorized for this page. Never prompts the user.
    async fn accounts(&self) -> Result<Vec<Address>, TransactionsError>;

    /// Asks the user to authorize accounts. May open a wallet prompt.
    async fn request_accounts(&self) -> Result<Vec<Address>, TransactionsError>;

    /// Submits a native value transfer, signed by the wallet.
    async fn send_transaction(&self, tx: &TransactionRequest) -> Result<TxHash, TransactionsError>;
}

#[async_trait(?Send)]
impl<W: Wallet + ?Sized> Wallet for Rc<W> {
    fn is_available(&self) -> bool {
        (**self).is_available()
    }

    async fn accounts(&self) -> Result<Vec<Address>, TransactionsError> {
        (**self).accounts().await
    }

    async fn request_accounts(&self) -> Result<Vec<Address>, TransactionsError> {
        (**self).request_accounts().await
    }

    async fn send_transaction(&self, tx: &TransactionRequest) -> Result<TxHash, TransactionsError> {
        (**self).send_transaction(tx).await
    }
}
