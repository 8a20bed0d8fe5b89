use crate::{error::TransactionsError, form::FormData, record::TransactionRecord, Event};
use ethers::types::Address;
use std::{
    cell::{Cell, RefCell},
    rc::Rc,
};

pub type Listener = Rc<dyn Fn(Event)>;

/// Everything a page can render.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TransactionsState {
    pub current_account: Option<Address>,
    pub form_data: FormData,
    pub is_loading: bool,
    pub transaction_count: Option<u64>,
    pub transactions: Vec<TransactionRecord>,
}

/// Single threaded state container. Every mutation is followed by an [`Event`], emitted once the
/// borrow is released so listeners can read the state back.
pub(crate) struct StateStore {
    state: RefCell<TransactionsState>,
    sending: Cell<bool>,
    listener: Option<Listener>,
}

impl StateStore {
    pub(crate) fn new(state: TransactionsState, listener: Option<Listener>) -> Self {
        Self { state: RefCell::new(state), sending: Cell::new(false), listener }
    }

    pub(crate) fn snapshot(&self) -> TransactionsState {
        self.state.borrow().clone()
    }

    pub(crate) fn read<R>(&self, f: impl FnOnce(&TransactionsState) -> R) -> R {
        f(&self.state.borrow())
    }

    fn update(&self, f: impl FnOnce(&mut TransactionsState), event: Event) {
        f(&mut self.state.borrow_mut());
        self.emit(event);
    }

    pub(crate) fn emit(&self, event: Event) {
        if let Some(listener) = &self.listener {
            listener(event);
        }
    }

    pub(crate) fn set_account(&self, account: Address) {
        self.update(|s| s.current_account = Some(account), Event::AccountChanged(Some(account)));
    }

    pub(crate) fn set_form(&self, f: impl FnOnce(&mut FormData)) {
        let mut form = self.read(|s| s.form_data.clone());
        f(&mut form);
        let event = Event::FormChanged(form.clone());
        self.update(|s| s.form_data = form, event);
    }

    pub(crate) fn set_transaction_count(&self, count: u64) {
        self.update(|s| s.transaction_count = Some(count), Event::TransactionCountChanged(count));
    }

    pub(crate) fn set_transactions(&self, transactions: Vec<TransactionRecord>) {
        let event = Event::TransactionsChanged(transactions.clone());
        self.update(|s| s.transactions = transactions, event);
    }

    fn set_loading(&self, loading: bool) {
        self.update(|s| s.is_loading = loading, Event::LoadingChanged(loading));
    }
}

/// Held for the whole send; a second send fails while it is alive.
pub(crate) struct SendGuard<'a> {
    store: &'a StateStore,
}

impl<'a> SendGuard<'a> {
    pub(crate) fn acquire(store: &'a StateStore) -> Result<Self, TransactionsError> {
        if store.sending.replace(true) {
            return Err(TransactionsError::SendInProgress);
        }
        Ok(Self { store })
    }
}

impl Drop for SendGuard<'_> {
    fn drop(&mut self) {
        self.store.sending.set(false);
    }
}

/// Raises the loading flag for its lifetime.
pub(crate) struct LoadingGuard<'a> {
    store: &'a StateStore,
}

impl<'a> LoadingGuard<'a> {
    pub(crate) fn raise(store: &'a StateStore) -> Self {
        store.set_loading(true);
        Self { store }
    }
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        self.store.set_loading(false);
    }
}
