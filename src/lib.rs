pub mod cache;
pub mod contract;
pub mod eip1193;
pub mod error;
pub mod form;
pub mod logging;
pub mod record;
mod store;
pub mod wallet;

#[cfg(feature = "leptos")]
pub mod leptos;
#[cfg(feature = "yew")]
pub mod yew;

pub use cache::{CountCache, LocalStorageCache, COUNT_STORAGE_KEY};
pub use contract::{BrowserLedger, ContractLedger, Ledger, PendingRecord};
pub use eip1193::Eip1193;
pub use error::TransactionsError;
pub use form::{FormData, FormField};
pub use record::{NewTransfer, RawTransfer, TransactionRecord};
pub use store::{Listener, TransactionsState};
pub use wallet::Wallet;

use ethers::{
    providers::Provider,
    types::{Address, TransactionRequest, TxHash, U256},
};
use log::{debug, error, info, warn};
use record::parse_amount;
use std::{
    fmt::{Debug, Formatter, Result as FmtResult},
    str::FromStr,
    sync::Arc,
    time::Duration,
};
use store::{LoadingGuard, SendGuard, StateStore};

/// Gas hint sent with the native transfer (a plain value transfer costs 21000).
pub const DEFAULT_GAS_LIMIT: u64 = 0x5208;
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(2);
pub const NO_WALLET_NOTICE: &str = "Please install MetaMask";

pub type BrowserTransactions = Transactions<Eip1193, BrowserLedger, LocalStorageCache>;

pub struct TransactionsBuilder {
    pub contract_address: Option<Address>,
    pub gas_limit: U256,
    pub count_key: String,
    pub poll_interval: Duration,
}

impl Default for TransactionsBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl TransactionsBuilder {
    pub fn new() -> Self {
        Self {
            contract_address: None,
            gas_limit: U256::from(DEFAULT_GAS_LIMIT),
            count_key: COUNT_STORAGE_KEY.to_string(),
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }

    pub fn contract_address(&mut self, address: Address) -> &mut Self {
        self.contract_address = Some(address);
        self
    }

    pub fn gas_limit(&mut self, gas_limit: U256) -> &mut Self {
        self.gas_limit = gas_limit;
        self
    }

    pub fn count_key(&mut self, key: &str) -> &mut Self {
        self.count_key = key.to_string();
        self
    }

    pub fn poll_interval(&mut self, interval: Duration) -> &mut Self {
        self.poll_interval = interval;
        self
    }

    /// Wires the adapter to `window.ethereum`, the deployed contract and `localStorage`.
    pub fn build(&self, listener: Option<Listener>) -> BrowserTransactions {
        let address = self.contract_address.unwrap_or_else(|| {
            warn!("No contract address configured, ledger calls will go to the zero address");
            Address::zero()
        });
        let provider = Provider::new(Eip1193::new()).interval(self.poll_interval);
        let ledger = ContractLedger::new(address, Arc::new(provider));

        Transactions::new(
            Eip1193::new(),
            ledger,
            LocalStorageCache::new(&self.count_key),
            self.gas_limit,
            listener,
        )
    }
}

/// State changes published to the page.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    AccountChanged(Option<Address>),
    FormChanged(FormData),
    LoadingChanged(bool),
    TransactionCountChanged(u64),
    TransactionsChanged(Vec<TransactionRecord>),
    /// Something the user has to see, e.g. that no wallet is installed.
    Notice(String),
}

/// Bridges a browser wallet and the transfer ledger contract to page state.
pub struct Transactions<W, L, C> {
    wallet: W,
    ledger: L,
    cache: C,
    gas_limit: U256,
    store: StateStore,
}

impl<W, L, C> Debug for Transactions<W, L, C> {
    fn fmt(&self, f: &mut Formatter) -> FmtResult {
        self.store.read(|s| {
            write!(
                f,
                "Transactions with account: {:?}, count: {:?}, loading: {}",
                s.current_account, s.transaction_count, s.is_loading
            )
        })
    }
}

impl<W: Wallet, L: Ledger, C: CountCache> Transactions<W, L, C> {
    /// The last cached transaction count is shown until [`Self::init`] reads the contract.
    pub fn new(wallet: W, ledger: L, cache: C, gas_limit: U256, listener: Option<Listener>) -> Self {
        let state = TransactionsState { transaction_count: cache.load(), ..Default::default() };
        Self { wallet, ledger, cache, gas_limit, store: StateStore::new(state, listener) }
    }

    pub fn state(&self) -> TransactionsState {
        self.store.snapshot()
    }

    pub fn current_account(&self) -> Option<Address> {
        self.store.read(|s| s.current_account)
    }

    pub fn form_data(&self) -> FormData {
        self.store.read(|s| s.form_data.clone())
    }

    pub fn is_loading(&self) -> bool {
        self.store.read(|s| s.is_loading)
    }

    pub fn transaction_count(&self) -> Option<u64> {
        self.store.read(|s| s.transaction_count)
    }

    pub fn transactions(&self) -> Vec<TransactionRecord> {
        self.store.read(|s| s.transactions.clone())
    }

    /// Session start: picks up an already authorized account and refreshes the counter.
    pub async fn init(&self) {
        self.check_if_wallet_is_connected().await;
        if let Err(err) = self.check_if_transactions_exist().await {
            error!("Transaction count sync failed: {err}");
        }
    }

    pub async fn check_if_wallet_is_connected(&self) {
        if !self.wallet_present() {
            return;
        }
        match self.wallet.accounts().await {
            Ok(accounts) => match accounts.first() {
                Some(account) => {
                    self.store.set_account(*account);
                    self.get_all_transactions().await;
                }
                None => info!("No authorized accounts found"),
            },
            Err(err) => error!("Could not list wallet accounts: {err}"),
        }
    }

    /// Reads the ledger counter, publishes it and caches it.
    pub async fn check_if_transactions_exist(&self) -> Result<u64, TransactionsError> {
        if !self.wallet.is_available() {
            return Err(TransactionsError::WalletUnavailable);
        }
        let count = self.ledger.get_transaction_count().await?;
        self.publish_count(count);
        Ok(count)
    }

    pub async fn connect_wallet(&self) -> Result<(), TransactionsError> {
        if !self.wallet_present() {
            return Ok(());
        }
        let accounts = self.wallet.request_accounts().await.map_err(|err| {
            error!("Wallet connection failed: {err}");
            err
        })?;
        match accounts.first() {
            Some(account) => {
                info!("Connected account {account:?}");
                self.store.set_account(*account);
            }
            None => warn!("Wallet granted no accounts"),
        }
        Ok(())
    }

    pub fn handle_change(&self, field: FormField, value: String) {
        self.store.set_form(|form| form.set(field, value));
    }

    /// Reads the whole ledger into [`TransactionsState::transactions`]. Failures are only logged.
    pub async fn get_all_transactions(&self) {
        if !self.wallet_present() {
            return;
        }
        match self.ledger.get_all_transactions().await {
            Ok(entries) => {
                let records: Vec<TransactionRecord> =
                    entries.into_iter().map(TransactionRecord::from).collect();
                debug!("Loaded {} transactions {records:?}", records.len());
                self.store.set_transactions(records);
            }
            Err(err) => error!("Could not load transactions: {err}"),
        }
    }

    /// Sends the amount in the form to its recipient, then records the transfer on the ledger.
    ///
    /// Returns the hash of the ledger entry, or `None` when there is no wallet to send with.
    /// Fails with [`TransactionsError::SendInProgress`] while another send is running.
    pub async fn send_transaction(&self) -> Result<Option<TxHash>, TransactionsError> {
        if !self.wallet_present() {
            return Ok(None);
        }
        match self.submit().await {
            Ok(tx_hash) => {
                info!("Success - {tx_hash:?}");
                Ok(Some(tx_hash))
            }
            Err(err) => {
                error!("Transaction failed: {err}");
                Err(err)
            }
        }
    }

    async fn submit(&self) -> Result<TxHash, TransactionsError> {
        let from = self.current_account().ok_or(TransactionsError::NotConnected)?;
        let _sending = SendGuard::acquire(&self.store)?;

        let form = self.form_data();
        let to = Address::from_str(form.address_to.trim())
            .map_err(|_| TransactionsError::InvalidAddress(form.address_to.clone()))?;
        let amount = parse_amount(&form.amount)?;

        let transfer = TransactionRequest::new().from(from).to(to).gas(self.gas_limit).value(amount);
        let transfer_hash = self.wallet.send_transaction(&transfer).await?;
        debug!("Native transfer submitted {transfer_hash:?}");

        let entry =
            NewTransfer { receiver: to, amount, message: form.message, keyword: form.keyword };
        let pending = self.ledger.add_to_blockchain(from, entry).await?;
        {
            let _loading = LoadingGuard::raise(&self.store);
            info!("Loading - {:?}", pending.tx_hash);
            self.ledger.wait_for_confirmation(&pending).await?;
        }

        let count = self.ledger.get_transaction_count().await?;
        self.publish_count(count);
        self.get_all_transactions().await;
        Ok(pending.tx_hash)
    }

    fn wallet_present(&self) -> bool {
        if self.wallet.is_available() {
            return true;
        }
        warn!("No injected wallet found");
        self.store.emit(Event::Notice(NO_WALLET_NOTICE.to_string()));
        false
    }

    fn publish_count(&self, count: u64) {
        self.store.set_transaction_count(count);
        if let Err(err) = self.cache.store(count) {
            warn!("Could not cache transaction count: {err}");
        }
    }
}

#[cfg(test)]
#[cfg(not(target_arch = "wasm32"))]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use ethers::types::NameOrAddress;
    use futures::channel::oneshot;
    use std::{
        cell::{Cell, RefCell},
        rc::Rc,
    };

    const RECIPIENT: &str = "0x8e71f65cb8512c70caa005fd3f487cce99e04ce2";

    fn account(n: u64) -> Address {
        Address::from_low_u64_be(n)
    }

    #[derive(Default)]
    struct MockWallet {
        missing: bool,
        reject: bool,
        accounts: Vec<Address>,
        granted: Vec<Address>,
        account_queries: Cell<usize>,
        permission_requests: Cell<usize>,
        sent: RefCell<Vec<TransactionRequest>>,
        gate: RefCell<Option<oneshot::Receiver<()>>>,
    }

    #[async_trait(?Send)]
    impl Wallet for MockWallet {
        fn is_available(&self) -> bool {
            !self.missing
        }

        async fn accounts(&self) -> Result<Vec<Address>, TransactionsError> {
            self.account_queries.set(self.account_queries.get() + 1);
            Ok(self.accounts.clone())
        }

        async fn request_accounts(&self) -> Result<Vec<Address>, TransactionsError> {
            self.permission_requests.set(self.permission_requests.get() + 1);
            if self.reject {
                return Err(TransactionsError::PermissionDenied("User rejected".to_string()));
            }
            Ok(self.granted.clone())
        }

        async fn send_transaction(
            &self,
            tx: &TransactionRequest,
        ) -> Result<TxHash, TransactionsError> {
            if self.reject {
                return Err(TransactionsError::PermissionDenied("User rejected".to_string()));
            }
            self.sent.borrow_mut().push(tx.clone());
            let gate = self.gate.borrow_mut().take();
            if let Some(gate) = gate {
                _ = gate.await;
            }
            Ok(TxHash::from_low_u64_be(1))
        }
    }

    #[derive(Default)]
    struct MockLedger {
        entries: Vec<RawTransfer>,
        count: Cell<u64>,
        fail_count: bool,
        revert: Cell<bool>,
        reads: Cell<usize>,
        appended: RefCell<Vec<(Address, NewTransfer)>>,
        gate: RefCell<Option<oneshot::Receiver<()>>>,
    }

    #[async_trait(?Send)]
    impl Ledger for MockLedger {
        async fn get_all_transactions(&self) -> Result<Vec<RawTransfer>, TransactionsError> {
            self.reads.set(self.reads.get() + 1);
            Ok(self.entries.clone())
        }

        async fn get_transaction_count(&self) -> Result<u64, TransactionsError> {
            if self.fail_count {
                return Err(TransactionsError::RpcFailure("node unreachable".to_string()));
            }
            Ok(self.count.get())
        }

        async fn add_to_blockchain(
            &self,
            from: Address,
            transfer: NewTransfer,
        ) -> Result<PendingRecord, TransactionsError> {
            self.appended.borrow_mut().push((from, transfer));
            Ok(PendingRecord { tx_hash: TxHash::from_low_u64_be(2) })
        }

        async fn wait_for_confirmation(
            &self,
            _pending: &PendingRecord,
        ) -> Result<(), TransactionsError> {
            let gate = self.gate.borrow_mut().take();
            if let Some(gate) = gate {
                _ = gate.await;
            }
            if self.revert.get() {
                return Err(TransactionsError::ContractRevert("reverted".to_string()));
            }
            self.count.set(self.count.get() + 1);
            Ok(())
        }
    }

    #[derive(Default)]
    struct MemoryCache {
        value: Cell<Option<u64>>,
        writes: Cell<usize>,
    }

    impl CountCache for MemoryCache {
        fn load(&self) -> Option<u64> {
            self.value.get()
        }

        fn store(&self, count: u64) -> Result<(), TransactionsError> {
            self.writes.set(self.writes.get() + 1);
            self.value.set(Some(count));
            Ok(())
        }
    }

    type TestTransactions = Transactions<Rc<MockWallet>, Rc<MockLedger>, Rc<MemoryCache>>;

    fn adapter(
        wallet: &Rc<MockWallet>,
        ledger: &Rc<MockLedger>,
        cache: &Rc<MemoryCache>,
    ) -> (TestTransactions, Rc<RefCell<Vec<Event>>>) {
        let events = Rc::new(RefCell::new(Vec::new()));
        let sink = events.clone();
        let listener: Listener = Rc::new(move |event| sink.borrow_mut().push(event));
        let transactions = Transactions::new(
            wallet.clone(),
            ledger.clone(),
            cache.clone(),
            U256::from(DEFAULT_GAS_LIMIT),
            Some(listener),
        );
        (transactions, events)
    }

    fn fill_form(transactions: &TestTransactions, amount: &str) {
        transactions.handle_change(FormField::AddressTo, RECIPIENT.to_string());
        transactions.handle_change(FormField::Amount, amount.to_string());
        transactions.handle_change(FormField::Keyword, "gift".to_string());
        transactions.handle_change(FormField::Message, "happy birthday".to_string());
    }

    fn loading_events(events: &[Event]) -> Vec<bool> {
        events
            .iter()
            .filter_map(|e| match e {
                Event::LoadingChanged(loading) => Some(*loading),
                _ => None,
            })
            .collect()
    }

    #[tokio::test]
    async fn no_authorized_accounts_leaves_connection_empty() {
        let wallet = Rc::new(MockWallet::default());
        let ledger = Rc::new(MockLedger::default());
        let (transactions, _) = adapter(&wallet, &ledger, &Rc::default());

        transactions.check_if_wallet_is_connected().await;

        assert_eq!(wallet.account_queries.get(), 1);
        assert_eq!(transactions.current_account(), None);
        assert_eq!(ledger.reads.get(), 0);
    }

    #[tokio::test]
    async fn authorized_account_is_picked_up_and_ledger_loaded() {
        let wallet = Rc::new(MockWallet { accounts: vec![account(1)], ..Default::default() });
        let ledger = Rc::new(MockLedger {
            entries: vec![RawTransfer {
                sender: account(1),
                receiver: account(2),
                amount: U256::from_str_radix("1bc16d674ec80000", 16).unwrap(),
                message: "rent".to_string(),
                timestamp: U256::zero(),
                keyword: "house".to_string(),
            }],
            ..Default::default()
        });
        let (transactions, events) = adapter(&wallet, &ledger, &Rc::default());

        transactions.check_if_wallet_is_connected().await;

        assert_eq!(transactions.current_account(), Some(account(1)));
        assert_eq!(ledger.reads.get(), 1);
        let records = transactions.transactions();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].amount, "2");
        assert_eq!(records[0].address_to, account(2));
        assert_eq!(records[0].timestamp, "Thu Jan 01 1970 00:00:00 UTC");
        assert_eq!(events.borrow()[0], Event::AccountChanged(Some(account(1))));
        assert!(matches!(events.borrow()[1], Event::TransactionsChanged(_)));
    }

    #[tokio::test]
    async fn missing_wallet_on_init_only_notifies() {
        let wallet = Rc::new(MockWallet { missing: true, ..Default::default() });
        let ledger = Rc::new(MockLedger::default());
        let (transactions, events) = adapter(&wallet, &ledger, &Rc::default());

        transactions.check_if_wallet_is_connected().await;

        assert_eq!(wallet.account_queries.get(), 0);
        assert_eq!(*events.borrow(), vec![Event::Notice(NO_WALLET_NOTICE.to_string())]);
    }

    #[tokio::test]
    async fn missing_wallet_on_connect_notifies_and_keeps_state() {
        let wallet = Rc::new(MockWallet { missing: true, ..Default::default() });
        let (transactions, events) = adapter(&wallet, &Rc::default(), &Rc::default());

        transactions.connect_wallet().await.unwrap();

        assert_eq!(wallet.permission_requests.get(), 0);
        assert_eq!(transactions.current_account(), None);
        assert_eq!(*events.borrow(), vec![Event::Notice(NO_WALLET_NOTICE.to_string())]);
    }

    #[tokio::test]
    async fn connect_sets_first_granted_account() {
        let wallet =
            Rc::new(MockWallet { granted: vec![account(3), account(4)], ..Default::default() });
        let (transactions, _) = adapter(&wallet, &Rc::default(), &Rc::default());

        transactions.connect_wallet().await.unwrap();

        assert_eq!(transactions.current_account(), Some(account(3)));
    }

    #[tokio::test]
    async fn rejected_connect_reports_permission_denied() {
        let wallet = Rc::new(MockWallet { reject: true, ..Default::default() });
        let (transactions, _) = adapter(&wallet, &Rc::default(), &Rc::default());

        let result = transactions.connect_wallet().await;

        assert!(matches!(result, Err(TransactionsError::PermissionDenied(_))));
        assert_eq!(transactions.current_account(), None);
    }

    #[test]
    fn handle_change_merges_one_field_at_a_time() {
        let (transactions, events) = adapter(&Rc::default(), &Rc::default(), &Rc::default());

        transactions.handle_change(FormField::Amount, "1".to_string());
        transactions.handle_change(FormField::Keyword, "k".to_string());
        transactions.handle_change(FormField::Amount, "2".to_string());

        let form = transactions.form_data();
        assert_eq!(form.amount, "2");
        assert_eq!(form.keyword, "k");
        assert_eq!(form.address_to, "");
        assert_eq!(form.message, "");
        assert_eq!(events.borrow().len(), 3);
        assert_eq!(events.borrow()[2], Event::FormChanged(form));
    }

    #[tokio::test]
    async fn count_sync_publishes_and_caches_under_one_key() {
        let ledger = Rc::new(MockLedger { count: Cell::new(9), ..Default::default() });
        let cache = Rc::new(MemoryCache { value: Cell::new(Some(5)), ..Default::default() });
        let (transactions, _) = adapter(&Rc::default(), &ledger, &cache);

        assert_eq!(transactions.transaction_count(), Some(5));

        transactions.init().await;

        assert_eq!(transactions.transaction_count(), Some(9));
        assert_eq!(cache.value.get(), Some(9));
    }

    #[tokio::test]
    async fn count_sync_failure_keeps_its_cause() {
        let ledger = Rc::new(MockLedger { fail_count: true, ..Default::default() });
        let cache = Rc::new(MemoryCache::default());
        let (transactions, _) = adapter(&Rc::default(), &ledger, &cache);

        let result = transactions.check_if_transactions_exist().await;

        assert!(matches!(result, Err(TransactionsError::RpcFailure(_))));
        assert_eq!(cache.writes.get(), 0);
    }

    #[tokio::test]
    async fn count_sync_without_wallet_is_wallet_unavailable() {
        let wallet = Rc::new(MockWallet { missing: true, ..Default::default() });
        let ledger = Rc::new(MockLedger { count: Cell::new(4), ..Default::default() });
        let cache = Rc::new(MemoryCache::default());
        let (transactions, events) = adapter(&wallet, &ledger, &cache);

        let result = transactions.check_if_transactions_exist().await;

        assert!(matches!(result, Err(TransactionsError::WalletUnavailable)));
        assert_eq!(transactions.transaction_count(), None);
        assert_eq!(cache.writes.get(), 0);
        assert!(events.borrow().is_empty());
    }

    #[tokio::test]
    async fn send_transfers_value_records_entry_and_refreshes_count() {
        let wallet = Rc::new(MockWallet { accounts: vec![account(1)], ..Default::default() });
        let ledger = Rc::new(MockLedger::default());
        let cache = Rc::new(MemoryCache::default());
        let (transactions, events) = adapter(&wallet, &ledger, &cache);
        transactions.check_if_wallet_is_connected().await;
        fill_form(&transactions, "1.5");

        assert!(!transactions.is_loading());
        let tx_hash = transactions.send_transaction().await.unwrap();
        assert!(!transactions.is_loading());

        assert_eq!(tx_hash, Some(TxHash::from_low_u64_be(2)));
        let recipient = Address::from_str(RECIPIENT).unwrap();
        let amount = U256::from(1_500_000_000_000_000_000u64);

        let sent = wallet.sent.borrow();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].from, Some(account(1)));
        assert_eq!(sent[0].to, Some(NameOrAddress::Address(recipient)));
        assert_eq!(sent[0].gas, Some(U256::from(0x5208u64)));
        assert_eq!(sent[0].value, Some(amount));

        let appended = ledger.appended.borrow();
        assert_eq!(appended.len(), 1);
        assert_eq!(
            appended[0],
            (
                account(1),
                NewTransfer {
                    receiver: recipient,
                    amount,
                    message: "happy birthday".to_string(),
                    keyword: "gift".to_string(),
                }
            )
        );

        assert_eq!(loading_events(&events.borrow()), vec![true, false]);
        assert_eq!(transactions.transaction_count(), Some(1));
        assert_eq!(cache.value.get(), Some(1));
        assert_eq!(ledger.reads.get(), 2);
    }

    #[tokio::test]
    async fn failed_confirmation_resets_loading_and_releases_send() {
        let wallet = Rc::new(MockWallet { accounts: vec![account(1)], ..Default::default() });
        let ledger = Rc::new(MockLedger::default());
        ledger.revert.set(true);
        let (transactions, events) = adapter(&wallet, &ledger, &Rc::default());
        transactions.check_if_wallet_is_connected().await;
        fill_form(&transactions, "0.1");

        let result = transactions.send_transaction().await;

        assert!(matches!(result, Err(TransactionsError::ContractRevert(_))));
        assert!(!transactions.is_loading());
        assert_eq!(loading_events(&events.borrow()), vec![true, false]);

        ledger.revert.set(false);
        assert!(transactions.send_transaction().await.is_ok());
    }

    #[tokio::test]
    async fn overlapping_send_is_rejected() {
        let (release, gate) = oneshot::channel();
        let wallet = Rc::new(MockWallet {
            accounts: vec![account(1)],
            gate: RefCell::new(Some(gate)),
            ..Default::default()
        });
        let ledger = Rc::new(MockLedger::default());
        let (transactions, _) = adapter(&wallet, &ledger, &Rc::default());
        transactions.check_if_wallet_is_connected().await;
        fill_form(&transactions, "1");

        let (first, second, _) = futures::join!(
            transactions.send_transaction(),
            transactions.send_transaction(),
            async {
                // edits made while the first send is in flight must not leak into it
                transactions.handle_change(FormField::Message, "edited".to_string());
                _ = release.send(());
            }
        );

        assert!(first.is_ok());
        assert!(matches!(second, Err(TransactionsError::SendInProgress)));
        assert_eq!(wallet.sent.borrow().len(), 1);
        assert_eq!(ledger.appended.borrow()[0].1.message, "happy birthday");
    }

    #[tokio::test]
    async fn loading_is_raised_only_while_confirming() {
        let (release, gate) = oneshot::channel();
        let wallet = Rc::new(MockWallet { accounts: vec![account(1)], ..Default::default() });
        let ledger = Rc::new(MockLedger { gate: RefCell::new(Some(gate)), ..Default::default() });
        let (transactions, _) = adapter(&wallet, &ledger, &Rc::default());
        transactions.check_if_wallet_is_connected().await;
        fill_form(&transactions, "1");

        let (result, loading_while_waiting) = futures::join!(transactions.send_transaction(), async {
            let loading = transactions.is_loading();
            _ = release.send(());
            loading
        });

        assert!(result.is_ok());
        assert!(loading_while_waiting);
        assert!(!transactions.is_loading());
    }

    #[tokio::test]
    async fn send_requires_a_connected_account() {
        let wallet = Rc::new(MockWallet::default());
        let (transactions, _) = adapter(&wallet, &Rc::default(), &Rc::default());
        fill_form(&transactions, "1");

        let result = transactions.send_transaction().await;

        assert!(matches!(result, Err(TransactionsError::NotConnected)));
        assert!(wallet.sent.borrow().is_empty());
    }

    #[tokio::test]
    async fn send_validates_recipient_and_amount() {
        let wallet = Rc::new(MockWallet { accounts: vec![account(1)], ..Default::default() });
        let (transactions, _) = adapter(&wallet, &Rc::default(), &Rc::default());
        transactions.check_if_wallet_is_connected().await;

        fill_form(&transactions, "1");
        transactions.handle_change(FormField::AddressTo, "not an address".to_string());
        let result = transactions.send_transaction().await;
        assert!(matches!(result, Err(TransactionsError::InvalidAddress(a)) if a == "not an address"));

        fill_form(&transactions, "lots");
        let result = transactions.send_transaction().await;
        assert!(matches!(result, Err(TransactionsError::InvalidAmount(_))));

        assert!(wallet.sent.borrow().is_empty());
    }

    #[tokio::test]
    async fn send_refuses_negative_and_sub_wei_amounts() {
        let wallet = Rc::new(MockWallet { accounts: vec![account(1)], ..Default::default() });
        let ledger = Rc::new(MockLedger::default());
        let (transactions, _) = adapter(&wallet, &ledger, &Rc::default());
        transactions.check_if_wallet_is_connected().await;

        for amount in ["-1", "0.0000000000000000001"] {
            fill_form(&transactions, amount);
            let result = transactions.send_transaction().await;
            assert!(matches!(result, Err(TransactionsError::InvalidAmount(_))), "{amount}");
        }

        assert!(wallet.sent.borrow().is_empty());
        assert!(ledger.appended.borrow().is_empty());
    }

    #[tokio::test]
    async fn rejected_transfer_never_reaches_the_ledger() {
        let wallet =
            Rc::new(MockWallet { accounts: vec![account(1)], reject: true, ..Default::default() });
        let ledger = Rc::new(MockLedger::default());
        let (transactions, _) = adapter(&wallet, &ledger, &Rc::default());
        transactions.check_if_wallet_is_connected().await;
        fill_form(&transactions, "1");

        let result = transactions.send_transaction().await;

        assert!(matches!(result, Err(TransactionsError::PermissionDenied(_))));
        assert!(ledger.appended.borrow().is_empty());
        assert!(!transactions.is_loading());
    }

    #[tokio::test]
    async fn missing_wallet_on_send_notifies() {
        let wallet = Rc::new(MockWallet { missing: true, ..Default::default() });
        let (transactions, events) = adapter(&wallet, &Rc::default(), &Rc::default());

        assert_eq!(transactions.send_transaction().await.unwrap(), None);
        assert_eq!(*events.borrow(), vec![Event::Notice(NO_WALLET_NOTICE.to_string())]);
    }
}
