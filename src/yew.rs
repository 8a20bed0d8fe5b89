use crate::{
    BrowserTransactions, Event, FormData, FormField, Listener, TransactionRecord,
    TransactionsBuilder,
};
use ethers::types::Address;
use gloo::dialogs::alert;
use log::error;
use std::{rc::Rc, str::FromStr};
use yew::{
    platform::spawn_local, prelude::*, web_sys::HtmlInputElement, Children, ContextProvider, Html,
    Properties, TargetCast,
};

#[derive(Properties, PartialEq)]
pub struct Props {
    #[prop_or_default]
    pub children: Children,
}

/// Wrap the page in this to reach the transactions state with `use_context::<UseTransactions>()`
#[function_component(TransactionsContextProvider)]
pub fn transactions_context_provider(props: &Props) -> Html {
    let transactions = use_transactions();

    html! {
        <ContextProvider<UseTransactions> context={transactions}>
            {for props.children.iter()}
        </ContextProvider<UseTransactions>>
    }
}

#[derive(Clone, Debug)]
pub struct UseTransactions {
    adapter: Rc<BrowserTransactions>,
    pub current_account: UseStateHandle<Option<Address>>,
    pub form_data: UseStateHandle<FormData>,
    pub is_loading: UseStateHandle<bool>,
    pub transaction_count: UseStateHandle<Option<u64>>,
    pub transactions: UseStateHandle<Vec<TransactionRecord>>,
}

impl PartialEq for UseTransactions {
    fn eq(&self, other: &Self) -> bool {
        self.current_account == other.current_account
            && self.form_data == other.form_data
            && self.is_loading == other.is_loading
            && self.transaction_count == other.transaction_count
            && self.transactions == other.transactions
    }
}

impl UseTransactions {
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

    /// `oninput` handler writing the input's value into `field`
    pub fn on_input(&self, field: FormField) -> Callback<InputEvent> {
        let adapter = self.adapter.clone();
        Callback::from(move |e: InputEvent| {
            let input: HtmlInputElement = e.target_unchecked_into();
            adapter.handle_change(field, input.value());
        })
    }

    /// Sends what is currently in the form. Outcome is reflected in the state handles.
    pub fn send_transaction(&self) {
        let adapter = self.adapter.clone();
        spawn_local(async move {
            if let Err(err) = adapter.send_transaction().await {
                error!("Could not send transaction: {err}");
            }
        });
    }

    pub fn is_connected(&self) -> bool {
        self.current_account.is_some()
    }

    /// Connected account as `0x` hex, empty when disconnected
    pub fn account(&self) -> String {
        (*self.current_account).map(|a| format!("{a:?}")).unwrap_or_default()
    }
}

#[hook]
pub fn use_transactions() -> UseTransactions {
    let current_account = use_state(|| None as Option<Address>);
    let form_data = use_state(FormData::default);
    let is_loading = use_state(|| false);
    let transaction_count = use_state(|| None as Option<u64>);
    let transactions = use_state(Vec::<TransactionRecord>::new);

    let adapter = {
        let acc = current_account.clone();
        let form = form_data.clone();
        let loading = is_loading.clone();
        let count = transaction_count.clone();
        let list = transactions.clone();

        use_memo((), move |_| {
            let listener: Listener = Rc::new(move |event| match event {
                Event::AccountChanged(account) => acc.set(account),
                Event::FormChanged(data) => form.set(data),
                Event::LoadingChanged(value) => loading.set(value),
                Event::TransactionCountChanged(value) => count.set(Some(value)),
                Event::TransactionsChanged(records) => list.set(records),
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
            builder.build(Some(listener))
        })
    };

    {
        let adapter = adapter.clone();
        let count = transaction_count.clone();
        yew_hooks::use_effect_once(move || {
            count.set(adapter.transaction_count());
            spawn_local(async move {
                adapter.init().await;
            });
            || {}
        });
    }

    UseTransactions { adapter, current_account, form_data, is_loading, transaction_count, transactions }
}
