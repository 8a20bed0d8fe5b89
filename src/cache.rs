use crate::error::TransactionsError;
use gloo_storage::{LocalStorage, Storage};
use log::debug;
use std::rc::Rc;

/// Key under which the last seen transaction count is kept. Bump the version if the encoding changes.
pub const COUNT_STORAGE_KEY: &str = "ethers-web-transactions:transaction-count:v1";

/// Persistence for the transaction counter. Only a cache: the contract is read again on every
/// session start.
pub trait CountCache {
    fn load(&self) -> Option<u64>;
    fn store(&self, count: u64) -> Result<(), TransactionsError>;
}

impl<C: CountCache + ?Sized> CountCache for Rc<C> {
    fn load(&self) -> Option<u64> {
        (**self).load()
    }

    fn store(&self, count: u64) -> Result<(), TransactionsError> {
        (**self).store(count)
    }
}

/// Browser `localStorage` backed counter.
#[derive(Clone, Debug)]
pub struct LocalStorageCache {
    key: String,
}

impl LocalStorageCache {
    pub fn new(key: &str) -> Self {
        Self { key: key.to_string() }
    }
}

impl Default for LocalStorageCache {
    fn default() -> Self {
        Self::new(COUNT_STORAGE_KEY)
    }
}

impl CountCache for LocalStorageCache {
    fn load(&self) -> Option<u64> {
        match LocalStorage::get::<u64>(&self.key) {
            Ok(count) => Some(count),
            Err(err) => {
                debug!("No cached transaction count under {}: {err}", self.key);
                None
            }
        }
    }

    fn store(&self, count: u64) -> Result<(), TransactionsError> {
        LocalStorage::set(&self.key, count).map_err(|e| TransactionsError::Storage(e.to_string()))
    }
}
