use ethers_web_transactions::{
    logging,
    yew::{TransactionsContextProvider, UseTransactions},
    FormField,
};
use log::Level;
use yew::prelude::*;

fn use_transactions_context() -> UseTransactions {
    use_context::<UseTransactions>().expect(
        "No transactions found. You must wrap your components in a <TransactionsContextProvider />",
    )
}

#[function_component(WalletButton)]
fn wallet_button() -> Html {
    let transactions = use_transactions_context();

    if transactions.is_connected() {
        return html! { <p>{ format!("Connected as {}", transactions.account()) }</p> };
    }
    let onclick = {
        let transactions = transactions.clone();
        Callback::from(move |_: MouseEvent| transactions.connect_wallet())
    };
    html! { <button {onclick}>{"Connect wallet"}</button> }
}

#[function_component(SendForm)]
fn send_form() -> Html {
    let transactions = use_transactions_context();
    let form = (*transactions.form_data).clone();

    let fields = [
        (FormField::AddressTo, "Address To", form.address_to),
        (FormField::Amount, "Amount (ETH)", form.amount),
        (FormField::Keyword, "Keyword (Gif)", form.keyword),
        (FormField::Message, "Enter Message", form.message),
    ];
    let onclick = {
        let transactions = transactions.clone();
        Callback::from(move |_: MouseEvent| transactions.send_transaction())
    };
    let busy = *transactions.is_loading || !transactions.is_connected();

    html! {
        <div>
            { for fields.into_iter().map(|(field, placeholder, value)| html! {
                <input name={field.to_string()} {placeholder} {value} oninput={transactions.on_input(field)} />
            }) }
            if *transactions.is_loading {
                <p>{"Waiting for confirmation..."}</p>
            }
            <button {onclick} disabled={busy}>{"Send now"}</button>
        </div>
    }
}

#[function_component(TransactionList)]
fn transaction_list() -> Html {
    let transactions = use_transactions_context();
    let count = transactions.transaction_count.map(|c| c.to_string()).unwrap_or_default();

    html! {
        <div>
            <h3>{ format!("Transactions: {count}") }</h3>
            <ul>
                { for transactions.transactions.iter().rev().map(|t| html! {
                    <li>{ format!("{} ETH from {:?} to {:?} at {}: {} #{}", t.amount, t.address_from, t.address_to, t.timestamp, t.message, t.keyword) }</li>
                }) }
            </ul>
        </div>
    }
}

#[function_component]
fn App() -> Html {
    html! {
        <TransactionsContextProvider>
            <WalletButton />
            <SendForm />
            <TransactionList />
        </TransactionsContextProvider>
    }
}

fn main() {
    logging::init(Level::Debug);
    yew::Renderer::<App>::new().render();
}
