//! Price reference consumed by the sale.
//!
//! Any contract exposing `get_rate(asset_pair) -> PriceData` can back a sale.
//! `price` is a fixed-point value scaled by `10^decimals`; `timestamp` is the
//! ledger time the quote was published.

use soroban_sdk::{contractclient, contracttype, Address, Env, Symbol};

use crate::SaleError;

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PriceData {
    pub price: i128,
    pub decimals: u32,
    pub timestamp: u64,
}

#[contractclient(name = "PriceOracleClient")]
pub trait PriceOracle {
    fn get_rate(env: Env, asset_pair: Symbol) -> PriceData;
}

/// Fetch the current quote. A failing or malformed oracle call is reported as
/// `InvalidPrice`.
pub(crate) fn latest_rate(
    env: &Env,
    oracle: &Address,
    asset_pair: &Symbol,
) -> Result<PriceData, SaleError> {
    match PriceOracleClient::new(env, oracle).try_get_rate(asset_pair) {
        Ok(Ok(quote)) => Ok(quote),
        _ => Err(SaleError::InvalidPrice),
    }
}
