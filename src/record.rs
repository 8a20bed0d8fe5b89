use crate::error::TransactionsError;
use chrono::{DateTime, Utc};
use ethers::{
    types::{Address, U256},
    utils::{format_ether, parse_units, ParseUnits},
};
use serde::Serialize;

const TIMESTAMP_FORMAT: &str = "%a %b %d %Y %H:%M:%S UTC";
const ETHER_DECIMALS: usize = 18;

/// Ledger entry exactly as the contract returns it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RawTransfer {
    pub sender: Address,
    pub receiver: Address,
    pub amount: U256,
    pub message: String,
    pub timestamp: U256,
    pub keyword: String,
}

/// Entry to be appended to the ledger.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NewTransfer {
    pub receiver: Address,
    pub amount: U256,
    pub message: String,
    pub keyword: String,
}

/// Human readable view of a ledger entry, as published to consumers.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionRecord {
    pub address_to: Address,
    pub address_from: Address,
    pub timestamp: String,
    pub message: String,
    pub keyword: String,
    pub amount: String,
}

impl From<RawTransfer> for TransactionRecord {
    fn from(raw: RawTransfer) -> Self {
        Self {
            address_to: raw.receiver,
            address_from: raw.sender,
            timestamp: format_timestamp(raw.timestamp),
            message: raw.message,
            keyword: raw.keyword,
            amount: format_amount(raw.amount),
        }
    }
}

/// Converts a user entered ether amount into wei.
///
/// Negative amounts and amounts finer than one wei are rejected rather than wrapped or truncated.
pub fn parse_amount(amount: &str) -> Result<U256, TransactionsError> {
    let amount = amount.trim();
    if let Some((_, fraction)) = amount.split_once('.') {
        if fraction.len() > ETHER_DECIMALS {
            return Err(TransactionsError::InvalidAmount(format!(
                "{amount} has more than {ETHER_DECIMALS} decimals"
            )));
        }
    }
    match parse_units(amount, ETHER_DECIMALS as u32) {
        Ok(ParseUnits::U256(wei)) => Ok(wei),
        Ok(ParseUnits::I256(_)) => {
            Err(TransactionsError::InvalidAmount(format!("{amount} is negative")))
        }
        Err(err) => Err(TransactionsError::InvalidAmount(format!("{amount}: {err}"))),
    }
}

/// Renders wei as ether, without trailing fractional zeros.
pub fn format_amount(amount: U256) -> String {
    let formatted = format_ether(amount);
    if formatted.contains('.') {
        formatted.trim_end_matches('0').trim_end_matches('.').to_string()
    } else {
        formatted
    }
}

/// Renders seconds since the epoch in UTC. Values no date can hold are printed as the raw integer.
pub fn format_timestamp(seconds: U256) -> String {
    if seconds > U256::from(i64::MAX as u64) {
        return seconds.to_string();
    }
    match DateTime::<Utc>::from_timestamp(seconds.as_u64() as i64, 0) {
        Some(date) => date.format(TIMESTAMP_FORMAT).to_string(),
        None => seconds.to_string(),
    }
}
