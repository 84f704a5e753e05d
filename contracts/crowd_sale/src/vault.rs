use soroban_sdk::{contractclient, Address, Env};

use crate::SaleError;

/// The slice of the vesting vault the sale calls into.
#[contractclient(name = "VaultClient")]
pub trait VaultInterface {
    fn token(env: Env) -> Address;
    fn allocate(env: Env, caller: Address, beneficiary: Address, release_time: u64, amount: i128);
}

/// Token the vault holds in custody, or `None` if the vault cannot be read.
pub(crate) fn token(env: &Env, vault: &Address) -> Option<Address> {
    match VaultClient::new(env, vault).try_token() {
        Ok(Ok(token)) => Some(token),
        _ => None,
    }
}

/// Record a tranche for `beneficiary`, acting as the vault's controller.
pub(crate) fn allocate(
    env: &Env,
    vault: &Address,
    beneficiary: &Address,
    release_time: u64,
    amount: i128,
) -> Result<(), SaleError> {
    let client = VaultClient::new(env, vault);
    match client.try_allocate(
        &env.current_contract_address(),
        beneficiary,
        &release_time,
        &amount,
    ) {
        Ok(Ok(())) => Ok(()),
        _ => Err(SaleError::AllocationFailed),
    }
}
