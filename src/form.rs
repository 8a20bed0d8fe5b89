use derive_more::Display;
use serde::Serialize;

/// Keys of [`FormData`]. Displayed with the names the page uses for its inputs.
#[derive(Clone, Copy, Debug, Display, PartialEq, Eq, Hash)]
pub enum FormField {
    #[display(fmt = "addressTo")]
    AddressTo,
    #[display(fmt = "amount")]
    Amount,
    #[display(fmt = "keyword")]
    Keyword,
    #[display(fmt = "message")]
    Message,
}

/// Free text entered by the user for the next transfer. Nothing here is validated until send.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FormData {
    pub address_to: String,
    pub amount: String,
    pub keyword: String,
    pub message: String,
}

impl FormData {
    pub fn get(&self, field: FormField) -> &str {
        match field {
            FormField::AddressTo => &self.address_to,
            FormField::Amount => &self.amount,
            FormField::Keyword => &self.keyword,
            FormField::Message => &self.message,
        }
    }

    pub fn set(&mut self, field: FormField, value: String) {
        let slot = match field {
            FormField::AddressTo => &mut self.address_to,
            FormField::Amount => &mut self.amount,
            FormField::Keyword => &mut self.keyword,
            FormField::Message => &mut self.message,
        };
        *slot = value;
    }
}
