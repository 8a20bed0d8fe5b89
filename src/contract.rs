use crate::{
    eip1193::Eip1193,
    error::TransactionsError,
    record::{NewTransfer, RawTransfer},
};
use async_trait::async_trait;
use ethers::{
    contract::abigen,
    providers::{Middleware, PendingTransaction, Provider},
    types::{Address, TxHash, U256, U64},
};
use log::debug;
use std::{rc::Rc, sync::Arc};

abigen!(TransactionsContract, "abi/Transactions.json");

pub type BrowserLedger = ContractLedger<Provider<Eip1193>>;

/// Handle to an appended entry that has been submitted but not yet mined.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PendingRecord {
    pub tx_hash: TxHash,
}

/// The transfer ledger contract as seen by the adapter.
#[async_trait(?Send)]
pub trait Ledger {
    /// Every recorded transfer, in ledger order.
    async fn get_all_transactions(&self) -> Result<Vec<RawTransfer>, TransactionsError>;

    async fn get_transaction_count(&self) -> Result<u64, TransactionsError>;

    /// Submits `addToBlockchain` signed by `from`. Returns as soon as the wallet hands back a hash.
    async fn add_to_blockchain(
        &self,
        from: Address,
        transfer: NewTransfer,
    ) -> Result<PendingRecord, TransactionsError>;

    /// Resolves once the entry is mined. Fails if it reverted or got dropped.
    async fn wait_for_confirmation(&self, pending: &PendingRecord) -> Result<(), TransactionsError>;
}

#[async_trait(?Send)]
impl<L: Ledger + ?Sized> Ledger for Rc<L> {
    async fn get_all_transactions(&self) -> Result<Vec<RawTransfer>, TransactionsError> {
        (**self).get_all_transactions().await
    }

    async fn get_transaction_count(&self) -> Result<u64, TransactionsError> {
        (**self).get_transaction_count().await
    }

    async fn add_to_blockchain(
        &self,
        from: Address,
        transfer: NewTransfer,
    ) -> Result<PendingRecord, TransactionsError> {
        (**self).add_to_blockchain(from, transfer).await
    }

    async fn wait_for_confirmation(&self, pending: &PendingRecord) -> Result<(), TransactionsError> {
        (**self).wait_for_confirmation(pending).await
    }
}

impl From<TransferStruct> for RawTransfer {
    fn from(entry: TransferStruct) -> Self {
        Self {
            sender: entry.sender,
            receiver: entry.receiver,
            amount: entry.amount,
            message: entry.message,
            timestamp: entry.timestamp,
            keyword: entry.keyword,
        }
    }
}

/// [`Ledger`] backed by the deployed contract, reached through any ethers middleware.
#[derive(Debug)]
pub struct ContractLedger<M> {
    client: Arc<M>,
    contract: TransactionsContract<M>,
}

impl<M: Middleware> ContractLedger<M> {
    pub fn new(address: Address, client: Arc<M>) -> Self {
        Self { contract: TransactionsContract::new(address, client.clone()), client }
    }

    pub fn address(&self) -> Address {
        self.contract.address()
    }
}

#[async_trait(?Send)]
impl<M: Middleware + 'static> Ledger for ContractLedger<M> {
    async fn get_all_transactions(&self) -> Result<Vec<RawTransfer>, TransactionsError> {
        let entries = self.contract.get_all_transactions().call().await?;
        Ok(entries.into_iter().map(RawTransfer::from).collect())
    }

    async fn get_transaction_count(&self) -> Result<u64, TransactionsError> {
        let count = self.contract.get_transaction_count().call().await?;
        if count > U256::from(u64::MAX) {
            return Err(TransactionsError::RpcFailure(format!("transaction count {count} overflows")));
        }
        Ok(count.as_u64())
    }

    async fn add_to_blockchain(
        &self,
        from: Address,
        transfer: NewTransfer,
    ) -> Result<PendingRecord, TransactionsError> {
        let call = self
            .contract
            .add_to_blockchain(transfer.receiver, transfer.amount, transfer.message, transfer.keyword)
            .from(from);
        let pending = call.send().await?;
        let tx_hash = pending.tx_hash();
        debug!("Ledger entry submitted {tx_hash:?}");
        Ok(PendingRecord { tx_hash })
    }

    async fn wait_for_confirmation(&self, pending: &PendingRecord) -> Result<(), TransactionsError> {
        let receipt = PendingTransaction::new(pending.tx_hash, self.client.provider()).await?;
        match receipt {
            None => Err(TransactionsError::RpcFailure(format!(
                "transaction {:?} was dropped from the mempool",
                pending.tx_hash
            ))),
            Some(receipt) if receipt.status == Some(U64::zero()) => Err(
                TransactionsError::ContractRevert(format!("transaction {:?} reverted", pending.tx_hash)),
            ),
            Some(_) => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ethers::abi::AbiEncode;

    #[test]
    fn ledger_entries_map_field_by_field() {
        let entry = TransferStruct {
            sender: Address::from_low_u64_be(7),
            receiver: Address::from_low_u64_be(8),
            amount: U256::exp10(18),
            message: "coffee".to_string(),
            timestamp: U256::from(60u64),
            keyword: "cup".to_string(),
        };

        let raw = RawTransfer::from(entry);

        assert_eq!(raw.sender, Address::from_low_u64_be(7));
        assert_eq!(raw.receiver, Address::from_low_u64_be(8));
        assert_eq!(raw.amount, U256::exp10(18));
        assert_eq!(raw.message, "coffee");
        assert_eq!(raw.timestamp, U256::from(60u64));
        assert_eq!(raw.keyword, "cup");
    }

    #[test]
    fn append_call_uses_the_contract_selector() {
        let call = AddToBlockchainCall {
            receiver: Address::from_low_u64_be(8),
            amount: U256::one(),
            message: "m".to_string(),
            keyword: "k".to_string(),
        };
        let selector = ethers::utils::id("addToBlockchain(address,uint256,string,string)");

        assert_eq!(&call.encode()[..4], &selector[..]);
    }
}
