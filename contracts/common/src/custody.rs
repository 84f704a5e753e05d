//! Checked token movements.
//!
//! Balances live in the token contract. Transfers are validated here before
//! `token::Client` is called, so a short balance or bad recipient is a typed
//! contract error rather than a host trap.

use soroban_sdk::{contracterror, token, Address, Env};

#[contracterror]
#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd)]
#[repr(u32)]
pub enum CustodyError {
    /// Sender holds less than the requested amount.
    InsufficientBalance = 1,
    /// Recipient is the sender itself or the token contract.
    InvalidRecipient = 2,
    /// Negative transfer amount.
    InvalidAmount = 3,
}

pub fn balance_of(env: &Env, token: &Address, account: &Address) -> i128 {
    token::Client::new(env, token).balance(account)
}

/// Move `amount` of `token` from `from` to `to`. A zero amount is a no-op.
pub fn transfer(
    env: &Env,
    token: &Address,
    from: &Address,
    to: &Address,
    amount: i128,
) -> Result<(), CustodyError> {
    if amount < 0 {
        return Err(CustodyError::InvalidAmount);
    }
    if to == from || to == token {
        return Err(CustodyError::InvalidRecipient);
    }
    if amount == 0 {
        return Ok(());
    }
    if balance_of(env, token, from) < amount {
        return Err(CustodyError::InsufficientBalance);
    }
    token::Client::new(env, token).transfer(from, to, &amount);
    Ok(())
}

/// Move `amount` of `token` out of the current contract's custody.
pub fn transfer_out(
    env: &Env,
    token: &Address,
    to: &Address,
    amount: i128,
) -> Result<(), CustodyError> {
    transfer(env, token, &env.current_contract_address(), to, amount)
}
