//! Per-beneficiary tranche storage.
//!
//! Amounts live under `Tranche(beneficiary, release_time)` so accumulation is a
//! single read-modify-write; `Schedule(beneficiary)` keeps the release times in
//! insertion order for enumeration and sweeping.

use soroban_sdk::{contracttype, Address, Env, Vec};

use crate::{DataKey, VaultError};

/// Upper bound on distinct release times per beneficiary; `release` reads
/// every one of them in a single invocation.
pub const MAX_TRANCHES: u32 = 100;

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Tranche {
    pub token_amount: i128,
    pub release_time: u64,
}

fn schedule(env: &Env, beneficiary: &Address) -> Vec<u64> {
    env.storage()
        .persistent()
        .get(&DataKey::Schedule(beneficiary.clone()))
        .unwrap_or_else(|| Vec::new(env))
}

fn amount_at(env: &Env, beneficiary: &Address, release_time: u64) -> i128 {
    env.storage()
        .persistent()
        .get(&DataKey::Tranche(beneficiary.clone(), release_time))
        .unwrap_or(0)
}

/// Add `amount` to the tranche at `release_time`, creating it if needed.
/// Returns the tranche's new amount.
pub fn accumulate(
    env: &Env,
    beneficiary: &Address,
    release_time: u64,
    amount: i128,
) -> Result<i128, VaultError> {
    let key = DataKey::Tranche(beneficiary.clone(), release_time);
    let updated = match env.storage().persistent().get::<DataKey, i128>(&key) {
        Some(existing) => existing.checked_add(amount).ok_or(VaultError::Overflow)?,
        None => {
            let mut times = schedule(env, beneficiary);
            if times.len() >= MAX_TRANCHES {
                return Err(VaultError::TooManyTranches);
            }
            times.push_back(release_time);
            env.storage()
                .persistent()
                .set(&DataKey::Schedule(beneficiary.clone()), &times);
            amount
        }
    };
    env.storage().persistent().set(&key, &updated);
    Ok(updated)
}

pub fn tranches(env: &Env, beneficiary: &Address) -> Vec<Tranche> {
    let mut out = Vec::new(env);
    for release_time in schedule(env, beneficiary).iter() {
        out.push_back(Tranche {
            token_amount: amount_at(env, beneficiary, release_time),
            release_time,
        });
    }
    out
}

/// Sum of tranches with `release_time <= now`.
pub fn matured_total(env: &Env, beneficiary: &Address, now: u64) -> Result<i128, VaultError> {
    let mut total: i128 = 0;
    for release_time in schedule(env, beneficiary).iter() {
        if release_time <= now {
            total = total
                .checked_add(amount_at(env, beneficiary, release_time))
                .ok_or(VaultError::Overflow)?;
        }
    }
    Ok(total)
}

/// Remove every matured tranche and return their sum. Immature release times
/// keep their relative order.
pub fn sweep_matured(env: &Env, beneficiary: &Address, now: u64) -> Result<i128, VaultError> {
    let times = schedule(env, beneficiary);
    let mut retained: Vec<u64> = Vec::new(env);
    let mut total: i128 = 0;

    for release_time in times.iter() {
        if release_time > now {
            retained.push_back(release_time);
            continue;
        }
        let key = DataKey::Tranche(beneficiary.clone(), release_time);
        let amount: i128 = env.storage().persistent().get(&key).unwrap_or(0);
        total = total.checked_add(amount).ok_or(VaultError::Overflow)?;
        env.storage().persistent().remove(&key);
    }

    if retained.len() == times.len() {
        return Ok(total);
    }
    let schedule_key = DataKey::Schedule(beneficiary.clone());
    if retained.is_empty() {
        env.storage().persistent().remove(&schedule_key);
    } else {
        env.storage().persistent().set(&schedule_key, &retained);
    }
    Ok(total)
}
