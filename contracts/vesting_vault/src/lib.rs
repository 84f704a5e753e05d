#![no_std]
#![deny(unsafe_code)]
#![deny(clippy::dbg_macro, clippy::todo, clippy::unimplemented)]
//! Vesting vault: locks token allocations per beneficiary until their release
//! time, then pays out every matured tranche in a single sweep.
//!
//! Controllers (operators, or a sale contract) record tranches with
//! [`VestingVault::allocate`]; tokens backing those tranches must be held by the
//! vault. Beneficiaries call [`VestingVault::release`] once any tranche matures.

use distribution_common::{access, custody, AccessError, CustodyError, Role};
use soroban_sdk::{contract, contracterror, contractimpl, contracttype, Address, Env, Vec};

pub mod events;
mod ledger;

pub use ledger::{Tranche, MAX_TRANCHES};

// ── Errors ──────────────────────────────────────────────────

#[contracterror]
#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd)]
#[repr(u32)]
pub enum VaultError {
    /// `initialize` was already called.
    AlreadyInitialized = 1,
    /// The vault has no token configured yet.
    NotInitialized = 2,
    /// Caller lacks the role the operation requires.
    Unauthorized = 3,
    /// No tranche has matured, or matured tranches were already released.
    NothingToRelease = 4,
    /// The vault holds fewer tokens than the release needs.
    InsufficientBalance = 5,
    InvalidRecipient = 6,
    /// Negative amount.
    InvalidAmount = 7,
    /// Accumulated amount or counter exceeded i128.
    Overflow = 8,
    /// The only remaining admin cannot be removed.
    LastAdmin = 9,
    /// Beneficiary already holds `MAX_TRANCHES` distinct release times.
    TooManyTranches = 10,
}

impl VaultError {
    pub const fn reason(self) -> &'static str {
        match self {
            VaultError::AlreadyInitialized => "Vault already initialized",
            VaultError::NotInitialized => "Vault not initialized",
            VaultError::Unauthorized => "Caller is not authorized",
            VaultError::NothingToRelease => "Cannot release 0 tokens",
            VaultError::InsufficientBalance => "Vault balance too low",
            VaultError::InvalidRecipient => "Invalid recipient",
            VaultError::InvalidAmount => "Amount must not be negative",
            VaultError::Overflow => "Amount overflow",
            VaultError::LastAdmin => "Cannot remove the last admin",
            VaultError::TooManyTranches => "Too many tranches for beneficiary",
        }
    }
}

impl From<AccessError> for VaultError {
    fn from(err: AccessError) -> Self {
        match err {
            AccessError::AlreadyInitialized => VaultError::AlreadyInitialized,
            AccessError::Unauthorized => VaultError::Unauthorized,
            AccessError::LastAdmin => VaultError::LastAdmin,
        }
    }
}

impl From<CustodyError> for VaultError {
    fn from(err: CustodyError) -> Self {
        match err {
            CustodyError::InsufficientBalance => VaultError::InsufficientBalance,
            CustodyError::InvalidRecipient => VaultError::InvalidRecipient,
            CustodyError::InvalidAmount => VaultError::InvalidAmount,
        }
    }
}

// ── Storage ─────────────────────────────────────────────────

#[contracttype]
pub enum DataKey {
    /// Token held in custody.
    Token,
    /// Sum of all outstanding tranche amounts.
    TotalLocked,
    /// Sum of all amounts paid out by `release`.
    TotalReleased,
    /// (beneficiary, release_time) -> locked amount.
    Tranche(Address, u64),
    /// Beneficiary -> release times in insertion order.
    Schedule(Address),
}

// ── Contract ────────────────────────────────────────────────

#[contract]
pub struct VestingVault;

#[contractimpl]
impl VestingVault {
    fn load_token(env: &Env) -> Result<Address, VaultError> {
        env.storage()
            .instance()
            .get(&DataKey::Token)
            .ok_or(VaultError::NotInitialized)
    }

    fn counter(env: &Env, key: &DataKey) -> i128 {
        env.storage().instance().get(key).unwrap_or(0)
    }

    fn record(
        env: &Env,
        beneficiary: &Address,
        release_time: u64,
        amount: i128,
    ) -> Result<(), VaultError> {
        if amount < 0 {
            return Err(VaultError::InvalidAmount);
        }
        if amount == 0 {
            return Ok(());
        }

        ledger::accumulate(env, beneficiary, release_time, amount)?;
        let locked = Self::counter(env, &DataKey::TotalLocked)
            .checked_add(amount)
            .ok_or(VaultError::Overflow)?;
        env.storage().instance().set(&DataKey::TotalLocked, &locked);

        events::tranche_allocated(env, beneficiary, release_time, amount);
        Ok(())
    }

    /// Set the vested token and assign the first admin.
    pub fn initialize(env: Env, admin: Address, token: Address) -> Result<(), VaultError> {
        if env.storage().instance().has(&DataKey::Token) {
            return Err(VaultError::AlreadyInitialized);
        }
        admin.require_auth();

        access::initialize(&env, &admin)?;
        env.storage().instance().set(&DataKey::Token, &token);
        env.storage().instance().set(&DataKey::TotalLocked, &0_i128);
        env.storage().instance().set(&DataKey::TotalReleased, &0_i128);

        events::initialized(&env, &admin, &token);
        Ok(())
    }

    pub fn token(env: Env) -> Result<Address, VaultError> {
        Self::load_token(&env)
    }

    // ── Roles ───────────────────────────────────────────────

    pub fn grant_role(
        env: Env,
        caller: Address,
        role: Role,
        account: Address,
    ) -> Result<(), VaultError> {
        Self::load_token(&env)?;
        access::grant_role(&env, &caller, role, &account)?;
        Ok(())
    }

    pub fn revoke_role(
        env: Env,
        caller: Address,
        role: Role,
        account: Address,
    ) -> Result<(), VaultError> {
        Self::load_token(&env)?;
        access::revoke_role(&env, &caller, role, &account)?;
        Ok(())
    }

    pub fn renounce_role(env: Env, account: Address, role: Role) -> Result<(), VaultError> {
        Self::load_token(&env)?;
        access::renounce_role(&env, &account, role)?;
        Ok(())
    }

    pub fn has_role(env: Env, role: Role, account: Address) -> bool {
        access::has_role(&env, role, &account)
    }

    // ── Allocation ──────────────────────────────────────────

    /// Lock `amount` for `beneficiary` until `release_time`.
    ///
    /// Allocating to a release time the beneficiary already holds increases
    /// that tranche; otherwise a new tranche is appended. Zero is accepted and
    /// changes nothing. Tokens are not moved: the vault is expected to already
    /// hold them (see [`VestingVault::deposit_and_allocate`]).
    pub fn allocate(
        env: Env,
        caller: Address,
        beneficiary: Address,
        release_time: u64,
        amount: i128,
    ) -> Result<(), VaultError> {
        Self::load_token(&env)?;
        caller.require_auth();
        access::require_role(&env, Role::Controller, &caller)?;

        Self::record(&env, &beneficiary, release_time, amount)
    }

    /// Pull `amount` tokens from `caller` into the vault and allocate them.
    pub fn deposit_and_allocate(
        env: Env,
        caller: Address,
        beneficiary: Address,
        release_time: u64,
        amount: i128,
    ) -> Result<(), VaultError> {
        let token = Self::load_token(&env)?;
        caller.require_auth();
        access::require_role(&env, Role::Controller, &caller)?;
        if amount < 0 {
            return Err(VaultError::InvalidAmount);
        }

        custody::transfer(
            &env,
            &token,
            &caller,
            &env.current_contract_address(),
            amount,
        )?;
        Self::record(&env, &beneficiary, release_time, amount)
    }

    // ── Release ─────────────────────────────────────────────

    /// Pay out every tranche of `beneficiary` whose release time has passed.
    ///
    /// Matured tranches are removed, immature ones stay in their original
    /// order, and the sum is transferred in one token call. Returns the amount
    /// released.
    pub fn release(env: Env, beneficiary: Address) -> Result<i128, VaultError> {
        let token = Self::load_token(&env)?;
        beneficiary.require_auth();

        let now = env.ledger().timestamp();
        let total = ledger::sweep_matured(&env, &beneficiary, now)?;
        if total == 0 {
            return Err(VaultError::NothingToRelease);
        }

        custody::transfer_out(&env, &token, &beneficiary, total)?;

        let locked = Self::counter(&env, &DataKey::TotalLocked)
            .checked_sub(total)
            .ok_or(VaultError::Overflow)?;
        let released = Self::counter(&env, &DataKey::TotalReleased)
            .checked_add(total)
            .ok_or(VaultError::Overflow)?;
        env.storage().instance().set(&DataKey::TotalLocked, &locked);
        env.storage()
            .instance()
            .set(&DataKey::TotalReleased, &released);

        events::tranche_released(&env, &beneficiary, total);
        Ok(total)
    }

    // ── Views ───────────────────────────────────────────────

    /// Outstanding tranches of `beneficiary`, in insertion order.
    pub fn vesting_for(env: Env, beneficiary: Address) -> Vec<Tranche> {
        ledger::tranches(&env, &beneficiary)
    }

    /// Amount `release` would pay out right now.
    pub fn releasable(env: Env, beneficiary: Address) -> Result<i128, VaultError> {
        ledger::matured_total(&env, &beneficiary, env.ledger().timestamp())
    }

    pub fn locked_balance(env: Env, beneficiary: Address) -> Result<i128, VaultError> {
        ledger::matured_total(&env, &beneficiary, u64::MAX)
    }

    pub fn total_locked(env: Env) -> i128 {
        Self::counter(&env, &DataKey::TotalLocked)
    }

    pub fn total_released(env: Env) -> i128 {
        Self::counter(&env, &DataKey::TotalReleased)
    }
}

mod test_auth;
mod test_conservation;
