use std::{rc::Rc, str::FromStr};

use crate::{
    BrowserTransactions, Event, FormData, FormField, Listener, TransactionRecord,
    TransactionsBuilder, TransactionsState,
};
use ethers::types::Address;
use gloo::dialogs::alert;
use leptos::*;
use log::{debug, error};

/// Root component for the transactions page. Children reach the state with
/// `use_context::<TransactionsContext>()`
#[component]
pub fn TransactionsProvider(children: Children) -> impl IntoView {
    debug!("Creating new transactions root");

    let context = TransactionsContext::new();
    context.init();
    provide_context(context);

    children()
}

#[derive(Clone, Debug)]
pub struct TransactionsContext {
    adapter: Rc<BrowserTransactions>,
    state: ReadSignal<TransactionsState>,
}

impl TransactionsContext {
    pub(crate) fn new() -> Self {
        let (state, set_state) = create_signal(TransactionsState::default());

        let listener: Listener = Rc::new(move |event| match event {
            Event::AccountChanged(account) => set_state.update(|s| s.current_account = account),
            Event::FormChanged(data) => set_state.update(|s| s.form_data = data),
            Event::LoadingChanged(loading) => set_state.update(|s| s.is_loading = loading),
            Event::TransactionCountChanged(count) => {
                set_state.update(|s| s.transaction_count = Some(count))
            }
            Event::TransactionsChanged(records) => set_state.update(|s| s.transactions = records),
            Event::Notice(message) => alert(&message),
        });

        let mut builder = TransactionsBuilder::new();
        if let Some(address) = std::option_env!("CONTRACT_ADDRESS") {
            match Address::from_str(address) {
                Ok(address) => {
                    builder.contract_address(address);
                }
                Err(err) => error!("Invalid CONTRACT_ADDRESS {address}: {err}"),
            }
        }
        let adapter = Rc::new(builder.build(Some(listener)));
        set_state.set(adapter.state());

        Self { adapter, state }
    }

    fn init(&self) {
        let adapter = self.adapter.clone();
        spawn_local(async move {
            adapter.init().await;
        });
    }

    /// Asks the wallet for an account. The wallet may show a prompt.
    pub fn connect_wallet(&self) {
        let adapter = self.adapter.clone();
        spawn_local(async move {
            if let Err(err) = adapter.connect_wallet().await {
                error!("Could not connect wallet: {err}");
            }
        });
    }

    pub fn handle_change(&self, field: FormField, value: String) {
        self.adapter.handle_change(field, value);
    }

    /// `on:input` handler writing the input's value into `field`
    pub fn on_input(&self, field: FormField) -> impl Fn(ev::Event) + 'static {
        let adapter = self.adapter.clone();
        move |ev| adapter.handle_change(field, event_target_value(&ev))
    }

    pub fn send_transaction(&self) {
        let adapter = self.adapter.clone();
        spawn_local(async move {
            if let Err(err) = adapter.send_transaction().await {
                error!("Could not send transaction: {err}");
            }
        });
    }

    pub fn current_account(&self) -> Option<Address> {
        self.state.with(|s| s.current_account)
    }

    pub fn form_data(&self) -> FormData {
        self.state.with(|s| s.form_data.clone())
    }

    pub fn is_loading(&self) -> bool {
        self.state.with(|s| s.is_loading)
    }

    pub fn transaction_count(&self) -> Option<u64> {
        self.state.with(|s| s.transaction_count)
    }

    pub fn transactions(&self) -> Vec<TransactionRecord> {
        self.state.with(|s| s.transactions.clone())
    }
}
