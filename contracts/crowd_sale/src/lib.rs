#![no_std]
#![deny(unsafe_code)]
#![deny(clippy::dbg_macro, clippy::todo, clippy::unimplemented)]
//! Crowd sale: converts whitelisted contributions into vesting tranches.
//!
//! The sale holds an inventory of tokens. Each contribution is priced against
//! an external oracle, the payment is forwarded to the sale wallet, the bought
//! tokens move into the vesting vault, and the vault records a tranche for the
//! payer that unlocks at the sale's `end_time`. The sale must hold the vault's
//! `Controller` role.

use distribution_common::{access, custody, AccessError, CustodyError, Role};
use soroban_sdk::{contract, contracterror, contractimpl, contracttype, Address, Env, Symbol};

pub mod events;
pub mod oracle;
pub mod pricing;
pub mod vault;

pub use oracle::{PriceData, PriceOracleClient};

// ── Errors ──────────────────────────────────────────────────

#[contracterror]
#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd)]
#[repr(u32)]
pub enum SaleError {
    AlreadyInitialized = 1,
    NotInitialized = 2,
    /// Caller lacks the admin role.
    Unauthorized = 3,
    /// Payer does not hold `Whitelisted`.
    NotWhitelisted = 4,
    /// The sale has reached `end_time`.
    SaleInactive = 5,
    /// Inventory is empty or smaller than the requested quantity.
    SoldOut = 6,
    /// Payer holds less payment token than offered.
    InsufficientBalance = 7,
    InvalidRecipient = 8,
    /// Non-positive payment, or a payment that buys zero tokens.
    InvalidAmount = 9,
    /// Oracle returned a non-positive price or could not be read.
    InvalidPrice = 10,
    /// Oracle quote is older than `max_price_age`.
    StalePrice = 11,
    Overflow = 12,
    LastAdmin = 13,
    /// Rejected sale configuration.
    InvalidConfig = 14,
    /// The vault refused the tranche; usually the sale lacks `Controller`.
    AllocationFailed = 15,
    /// Unsold tokens can only be reclaimed once the sale has ended.
    SaleStillActive = 16,
    /// Inventory can only be added before the first contribution.
    FundingClosed = 17,
}

impl SaleError {
    pub const fn reason(self) -> &'static str {
        match self {
            SaleError::AlreadyInitialized => "Sale already initialized",
            SaleError::NotInitialized => "Sale not initialized",
            SaleError::Unauthorized => "Caller is not authorized",
            SaleError::NotWhitelisted => "Payer is not whitelisted",
            SaleError::SaleInactive => "Sale is not active",
            SaleError::SoldOut => "Not enough tokens left",
            SaleError::InsufficientBalance => "Payment balance too low",
            SaleError::InvalidRecipient => "Invalid recipient",
            SaleError::InvalidAmount => "Invalid payment amount",
            SaleError::InvalidPrice => "Invalid oracle price",
            SaleError::StalePrice => "Oracle price is stale",
            SaleError::Overflow => "Amount overflow",
            SaleError::LastAdmin => "Cannot remove the last admin",
            SaleError::InvalidConfig => "Invalid sale configuration",
            SaleError::AllocationFailed => "Vault allocation failed",
            SaleError::SaleStillActive => "Sale has not ended",
            SaleError::FundingClosed => "Sale inventory is locked",
        }
    }
}

impl From<AccessError> for SaleError {
    fn from(err: AccessError) -> Self {
        match err {
            AccessError::AlreadyInitialized => SaleError::AlreadyInitialized,
            AccessError::Unauthorized => SaleError::Unauthorized,
            AccessError::LastAdmin => SaleError::LastAdmin,
        }
    }
}

impl From<CustodyError> for SaleError {
    fn from(err: CustodyError) -> Self {
        match err {
            CustodyError::InsufficientBalance => SaleError::InsufficientBalance,
            CustodyError::InvalidRecipient => SaleError::InvalidRecipient,
            CustodyError::InvalidAmount => SaleError::InvalidAmount,
        }
    }
}

// ── Types ───────────────────────────────────────────────────

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SaleConfig {
    /// Token sold and locked in the vault.
    pub token: Address,
    /// Token accepted as payment.
    pub payment_token: Address,
    /// Vesting vault recording purchased tranches.
    pub vault: Address,
    pub oracle: Address,
    /// Pair passed to `get_rate`.
    pub asset_pair: Symbol,
    /// Receives every payment.
    pub wallet: Address,
    /// Tokens per one USD of payment.
    pub usd_rate: i128,
    /// Contributions stop at this time; purchased tranches unlock at it.
    pub end_time: u64,
    /// Maximum oracle quote age in seconds, 0 to accept any age.
    pub max_price_age: u64,
}

#[contracttype]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum SaleStatus {
    Created = 0,
    Active = 1,
    Closed = 2,
}

#[contracttype]
pub enum DataKey {
    Config,
    FundsRaised,
    TokensSold,
    /// Set once a contribution takes the last inventory token.
    SoldOut,
}

// ── Contract ────────────────────────────────────────────────

#[contract]
pub struct CrowdSale;

#[contractimpl]
impl CrowdSale {
    fn load_config(env: &Env) -> Result<SaleConfig, SaleError> {
        env.storage()
            .instance()
            .get(&DataKey::Config)
            .ok_or(SaleError::NotInitialized)
    }

    fn counter(env: &Env, key: &DataKey) -> i128 {
        env.storage().instance().get(key).unwrap_or(0)
    }

    fn inventory(env: &Env, config: &SaleConfig) -> i128 {
        custody::balance_of(env, &config.token, &env.current_contract_address())
    }

    fn is_sold_out(env: &Env) -> bool {
        env.storage()
            .instance()
            .get(&DataKey::SoldOut)
            .unwrap_or(false)
    }

    fn require_admin(env: &Env, caller: &Address) -> Result<(), SaleError> {
        caller.require_auth();
        access::require_role(env, Role::Admin, caller)?;
        Ok(())
    }

    /// Quantity bought by `payment_amount` at the oracle's current rate.
    fn price(env: &Env, config: &SaleConfig, payment_amount: i128) -> Result<i128, SaleError> {
        let quote = oracle::latest_rate(env, &config.oracle, &config.asset_pair)?;
        pricing::check_freshness(
            env.ledger().timestamp(),
            quote.timestamp,
            config.max_price_age,
        )?;
        pricing::token_quantity(env, payment_amount, &quote, config.usd_rate)
    }

    pub fn initialize(env: Env, admin: Address, config: SaleConfig) -> Result<(), SaleError> {
        if env.storage().instance().has(&DataKey::Config) {
            return Err(SaleError::AlreadyInitialized);
        }
        admin.require_auth();

        let this = env.current_contract_address();
        if config.usd_rate <= 0
            || config.end_time <= env.ledger().timestamp()
            || config.wallet == this
            || config.vault == this
            || config.token == config.payment_token
        {
            return Err(SaleError::InvalidConfig);
        }
        if vault::token(&env, &config.vault) != Some(config.token.clone()) {
            return Err(SaleError::InvalidConfig);
        }

        access::initialize(&env, &admin)?;
        env.storage().instance().set(&DataKey::Config, &config);
        env.storage().instance().set(&DataKey::FundsRaised, &0_i128);
        env.storage().instance().set(&DataKey::TokensSold, &0_i128);

        events::initialized(&env, &admin, &config.token, config.end_time);
        Ok(())
    }

    // ── Roles ───────────────────────────────────────────────

    /// Grant a role; `Role::Whitelisted` admits a payer to the sale.
    pub fn grant_role(
        env: Env,
        caller: Address,
        role: Role,
        account: Address,
    ) -> Result<(), SaleError> {
        Self::load_config(&env)?;
        access::grant_role(&env, &caller, role, &account)?;
        Ok(())
    }

    pub fn revoke_role(
        env: Env,
        caller: Address,
        role: Role,
        account: Address,
    ) -> Result<(), SaleError> {
        Self::load_config(&env)?;
        access::revoke_role(&env, &caller, role, &account)?;
        Ok(())
    }

    pub fn renounce_role(env: Env, account: Address, role: Role) -> Result<(), SaleError> {
        Self::load_config(&env)?;
        access::renounce_role(&env, &account, role)?;
        Ok(())
    }

    pub fn has_role(env: Env, role: Role, account: Address) -> bool {
        access::has_role(&env, role, &account)
    }

    // ── Inventory ───────────────────────────────────────────

    /// Move `amount` sale tokens from `funder` into inventory. Only allowed
    /// before the first contribution.
    pub fn fund(env: Env, funder: Address, amount: i128) -> Result<(), SaleError> {
        let config = Self::load_config(&env)?;
        funder.require_auth();
        if env.ledger().timestamp() >= config.end_time {
            return Err(SaleError::SaleInactive);
        }
        if Self::counter(&env, &DataKey::TokensSold) > 0 {
            return Err(SaleError::FundingClosed);
        }
        if amount <= 0 {
            return Err(SaleError::InvalidAmount);
        }

        custody::transfer(
            &env,
            &config.token,
            &funder,
            &env.current_contract_address(),
            amount,
        )?;
        events::funded(&env, &funder, amount);
        Ok(())
    }

    /// After `end_time`, send every unsold token to `to`. Returns the amount moved.
    pub fn reclaim_unsold(env: Env, caller: Address, to: Address) -> Result<i128, SaleError> {
        let config = Self::load_config(&env)?;
        Self::require_admin(&env, &caller)?;
        if env.ledger().timestamp() < config.end_time {
            return Err(SaleError::SaleStillActive);
        }

        let remaining = Self::inventory(&env, &config);
        if remaining > 0 {
            custody::transfer_out(&env, &config.token, &to, remaining)?;
            events::unsold_reclaimed(&env, &to, remaining);
        }
        Ok(remaining)
    }

    // ── Contribution ────────────────────────────────────────

    /// Buy tokens with `payment_amount` of the payment token.
    ///
    /// The payment goes to the sale wallet and the bought quantity is locked
    /// in the vault for `payer` until `end_time`. Any failing step aborts the
    /// whole contribution. Returns the quantity bought.
    pub fn contribute(env: Env, payer: Address, payment_amount: i128) -> Result<i128, SaleError> {
        let config = Self::load_config(&env)?;
        payer.require_auth();
        if !access::has_role(&env, Role::Whitelisted, &payer) {
            return Err(SaleError::NotWhitelisted);
        }
        if env.ledger().timestamp() >= config.end_time {
            return Err(SaleError::SaleInactive);
        }
        if payment_amount <= 0 {
            return Err(SaleError::InvalidAmount);
        }

        let inventory = Self::inventory(&env, &config);
        if inventory == 0 || Self::is_sold_out(&env) {
            return Err(SaleError::SoldOut);
        }
        let quantity = Self::price(&env, &config, payment_amount)?;
        if quantity == 0 {
            return Err(SaleError::InvalidAmount);
        }
        if quantity > inventory {
            return Err(SaleError::SoldOut);
        }

        custody::transfer(
            &env,
            &config.payment_token,
            &payer,
            &config.wallet,
            payment_amount,
        )?;
        custody::transfer_out(&env, &config.token, &config.vault, quantity)?;
        vault::allocate(&env, &config.vault, &payer, config.end_time, quantity)?;

        let raised = Self::counter(&env, &DataKey::FundsRaised)
            .checked_add(payment_amount)
            .ok_or(SaleError::Overflow)?;
        let sold = Self::counter(&env, &DataKey::TokensSold)
            .checked_add(quantity)
            .ok_or(SaleError::Overflow)?;
        env.storage().instance().set(&DataKey::FundsRaised, &raised);
        env.storage().instance().set(&DataKey::TokensSold, &sold);
        if quantity == inventory {
            env.storage().instance().set(&DataKey::SoldOut, &true);
        }

        events::contribution_accepted(&env, &payer, payment_amount, quantity);
        Ok(quantity)
    }

    /// Tokens `payment_amount` would buy at the current oracle rate.
    pub fn quote(env: Env, payment_amount: i128) -> Result<i128, SaleError> {
        let config = Self::load_config(&env)?;
        Self::price(&env, &config, payment_amount)
    }

    // ── Admin ───────────────────────────────────────────────

    pub fn set_max_price_age(env: Env, caller: Address, max_age: u64) -> Result<(), SaleError> {
        let mut config = Self::load_config(&env)?;
        Self::require_admin(&env, &caller)?;

        config.max_price_age = max_age;
        env.storage().instance().set(&DataKey::Config, &config);
        events::max_price_age_set(&env, &caller, max_age);
        Ok(())
    }

    // ── Views ───────────────────────────────────────────────

    pub fn tokens_available(env: Env) -> Result<i128, SaleError> {
        let config = Self::load_config(&env)?;
        Ok(Self::inventory(&env, &config))
    }

    pub fn funds_raised(env: Env) -> i128 {
        Self::counter(&env, &DataKey::FundsRaised)
    }

    pub fn tokens_sold(env: Env) -> i128 {
        Self::counter(&env, &DataKey::TokensSold)
    }

    pub fn config(env: Env) -> Result<SaleConfig, SaleError> {
        Self::load_config(&env)
    }

    /// `Created` until inventory arrives, `Active` while open with inventory,
    /// `Closed` once `end_time` passes or a contribution takes the last
    /// token. `Closed` is final.
    pub fn status(env: Env) -> SaleStatus {
        let Ok(config) = Self::load_config(&env) else {
            return SaleStatus::Created;
        };
        if env.ledger().timestamp() >= config.end_time {
            return SaleStatus::Closed;
        }
        if Self::is_sold_out(&env) {
            return SaleStatus::Closed;
        }
        if Self::inventory(&env, &config) > 0 {
            SaleStatus::Active
        } else {
            SaleStatus::Created
        }
    }
}
