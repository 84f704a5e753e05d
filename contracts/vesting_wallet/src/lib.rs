#![no_std]
#![deny(unsafe_code)]
#![deny(clippy::dbg_macro, clippy::todo, clippy::unimplemented)]
//! Linear vesting wallet for a single beneficiary.
//!
//! Any token sent to the wallet vests linearly from `start` over `duration`
//! seconds. The vesting base of a token is its current balance plus everything
//! already released, so deposits made later vest on the same curve.

use distribution_common::{custody, CustodyError};
use soroban_sdk::{
    contract, contracterror, contractimpl, contracttype, symbol_short, Address, Env, Symbol,
};

const EVENT_INIT: Symbol = symbol_short!("init");
pub const EVENT_RELEASED: Symbol = symbol_short!("released");

#[contracterror]
#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd)]
#[repr(u32)]
pub enum WalletError {
    AlreadyInitialized = 1,
    NotInitialized = 2,
    /// Nothing vested since the last release.
    NothingToRelease = 3,
    InsufficientBalance = 4,
    InvalidRecipient = 5,
    InvalidAmount = 6,
    Overflow = 7,
    /// `start + duration` does not fit in a timestamp.
    InvalidSchedule = 8,
}

impl WalletError {
    pub const fn reason(self) -> &'static str {
        match self {
            WalletError::AlreadyInitialized => "Wallet already initialized",
            WalletError::NotInitialized => "Wallet not initialized",
            WalletError::NothingToRelease => "Cannot release 0 tokens",
            WalletError::InsufficientBalance => "Wallet balance too low",
            WalletError::InvalidRecipient => "Invalid recipient",
            WalletError::InvalidAmount => "Invalid amount",
            WalletError::Overflow => "Amount overflow",
            WalletError::InvalidSchedule => "Invalid vesting schedule",
        }
    }
}

impl From<CustodyError> for WalletError {
    fn from(err: CustodyError) -> Self {
        match err {
            CustodyError::InsufficientBalance => WalletError::InsufficientBalance,
            CustodyError::InvalidRecipient => WalletError::InvalidRecipient,
            CustodyError::InvalidAmount => WalletError::InvalidAmount,
        }
    }
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Schedule {
    pub beneficiary: Address,
    pub start: u64,
    pub duration: u64,
}

#[contracttype]
pub enum DataKey {
    Schedule,
    /// token -> amount already paid to the beneficiary.
    Released(Address),
}

/// Amount of `total` vested at `timestamp` on a linear curve.
fn linear_vested(total: i128, schedule: &Schedule, timestamp: u64) -> Result<i128, WalletError> {
    if timestamp < schedule.start {
        return Ok(0);
    }
    let elapsed = timestamp - schedule.start;
    if elapsed >= schedule.duration {
        return Ok(total);
    }
    let numerator = total
        .checked_mul(i128::from(elapsed))
        .ok_or(WalletError::Overflow)?;
    Ok(numerator / i128::from(schedule.duration))
}

#[contract]
pub struct VestingWallet;

#[contractimpl]
impl VestingWallet {
    fn load_schedule(env: &Env) -> Result<Schedule, WalletError> {
        env.storage()
            .instance()
            .get(&DataKey::Schedule)
            .ok_or(WalletError::NotInitialized)
    }

    pub fn initialize(
        env: Env,
        beneficiary: Address,
        start: u64,
        duration: u64,
    ) -> Result<(), WalletError> {
        if env.storage().instance().has(&DataKey::Schedule) {
            return Err(WalletError::AlreadyInitialized);
        }
        beneficiary.require_auth();
        start
            .checked_add(duration)
            .ok_or(WalletError::InvalidSchedule)?;

        let schedule = Schedule {
            beneficiary: beneficiary.clone(),
            start,
            duration,
        };
        env.storage().instance().set(&DataKey::Schedule, &schedule);
        env.events()
            .publish((EVENT_INIT, beneficiary), (start, duration));
        Ok(())
    }

    pub fn beneficiary(env: Env) -> Result<Address, WalletError> {
        Ok(Self::load_schedule(&env)?.beneficiary)
    }

    pub fn start(env: Env) -> Result<u64, WalletError> {
        Ok(Self::load_schedule(&env)?.start)
    }

    pub fn duration(env: Env) -> Result<u64, WalletError> {
        Ok(Self::load_schedule(&env)?.duration)
    }

    pub fn end(env: Env) -> Result<u64, WalletError> {
        let schedule = Self::load_schedule(&env)?;
        Ok(schedule.start + schedule.duration)
    }

    pub fn released(env: Env, token: Address) -> i128 {
        env.storage()
            .persistent()
            .get(&DataKey::Released(token))
            .unwrap_or(0)
    }

    /// Amount of `token` vested at `timestamp`, released or not.
    pub fn vested_amount(env: Env, token: Address, timestamp: u64) -> Result<i128, WalletError> {
        let schedule = Self::load_schedule(&env)?;
        let held = custody::balance_of(&env, &token, &env.current_contract_address());
        let total = held
            .checked_add(Self::released(env.clone(), token))
            .ok_or(WalletError::Overflow)?;
        linear_vested(total, &schedule, timestamp)
    }

    /// Vested but not yet released amount of `token`.
    pub fn releasable(env: Env, token: Address) -> Result<i128, WalletError> {
        let now = env.ledger().timestamp();
        let vested = Self::vested_amount(env.clone(), token.clone(), now)?;
        Ok((vested - Self::released(env, token)).max(0))
    }

    /// Pay the releasable amount of `token` to the beneficiary. Anyone may
    /// trigger it; funds only ever go to the beneficiary.
    pub fn release(env: Env, token: Address) -> Result<i128, WalletError> {
        let schedule = Self::load_schedule(&env)?;
        let amount = Self::releasable(env.clone(), token.clone())?;
        if amount == 0 {
            return Err(WalletError::NothingToRelease);
        }

        let released = Self::released(env.clone(), token.clone())
            .checked_add(amount)
            .ok_or(WalletError::Overflow)?;
        env.storage()
            .persistent()
            .set(&DataKey::Released(token.clone()), &released);
        custody::transfer_out(&env, &token, &schedule.beneficiary, amount)?;

        env.events().publish((EVENT_RELEASED, token), amount);
        Ok(amount)
    }
}

mod test;
