#![cfg(test)]
use soroban_sdk::{
    testutils::{Address as _, Events as _, Ledger as _},
    token, vec, Address, Env, IntoVal, TryIntoVal,
};

use crate::{VestingWallet, VestingWalletClient, WalletError, EVENT_RELEASED};

const E18: i128 = 1_000_000_000_000_000_000;
const PROJECT_FUND: i128 = 2_000_000_000 * E18;
const YEAR: u64 = 365 * 24 * 3600;
const START: u64 = 1_700_000_000;
const DURATION: u64 = 10 * YEAR;

/// Wallet vesting over ten years for `beneficiary`, holding `PROJECT_FUND`.
fn setup() -> (Env, VestingWalletClient<'static>, Address, Address) {
    let env = Env::default();
    env.mock_all_auths();
    set_time(&env, START);

    let issuer = Address::generate(&env);
    let beneficiary = Address::generate(&env);
    let token = env
        .register_stellar_asset_contract_v2(issuer)
        .address();

    let id = env.register_contract(None, VestingWallet);
    let client = VestingWalletClient::new(&env, &id);
    client.initialize(&beneficiary, &START, &DURATION);
    token::StellarAssetClient::new(&env, &token).mint(&id, &PROJECT_FUND);

    (env, client, beneficiary, token)
}

fn set_time(env: &Env, timestamp: u64) {
    env.ledger().with_mut(|li| li.timestamp = timestamp);
}

fn balance(env: &Env, token: &Address, who: &Address) -> i128 {
    token::Client::new(env, token).balance(who)
}

#[test]
fn initialize_stores_schedule() {
    let (_env, client, beneficiary, _token) = setup();

    assert_eq!(client.beneficiary(), beneficiary);
    assert_eq!(client.start(), START);
    assert_eq!(client.duration(), DURATION);
    assert_eq!(client.end(), START + DURATION);
}

#[test]
fn initialize_twice_fails() {
    let (env, client, _beneficiary, _token) = setup();
    let other = Address::generate(&env);

    assert_eq!(
        client.try_initialize(&other, &START, &DURATION),
        Err(Ok(WalletError::AlreadyInitialized))
    );
}

#[test]
fn initialize_rejects_overflowing_end() {
    let env = Env::default();
    env.mock_all_auths();
    let client = VestingWalletClient::new(&env, &env.register_contract(None, VestingWallet));
    let beneficiary = Address::generate(&env);

    assert_eq!(
        client.try_initialize(&beneficiary, &u64::MAX, &1),
        Err(Ok(WalletError::InvalidSchedule))
    );
    assert_eq!(client.try_start(), Err(Ok(WalletError::NotInitialized)));
}

#[test]
fn vested_amount_follows_linear_curve() {
    let (_env, client, _beneficiary, token) = setup();

    assert_eq!(client.vested_amount(&token, &(START - 1)), 0);
    assert_eq!(client.vested_amount(&token, &START), 0);
    assert_eq!(
        client.vested_amount(&token, &(START + 5 * YEAR)),
        PROJECT_FUND / 2
    );
    assert_eq!(
        client.vested_amount(&token, &(START + YEAR)),
        PROJECT_FUND / 10
    );
    assert_eq!(
        client.vested_amount(&token, &(START + DURATION)),
        PROJECT_FUND
    );
    assert_eq!(
        client.vested_amount(&token, &(START + 2 * DURATION)),
        PROJECT_FUND
    );
}

#[test]
fn release_before_start_fails() {
    let (env, client, _beneficiary, token) = setup();
    set_time(&env, START - 10);

    assert_eq!(
        client.try_release(&token),
        Err(Ok(WalletError::NothingToRelease))
    );
}

#[test]
fn release_halfway_pays_half_and_keeps_rest() {
    let (env, client, beneficiary, token) = setup();
    let halfway = START + 5 * YEAR;
    let vested = client.vested_amount(&token, &halfway);

    set_time(&env, halfway);
    assert_eq!(client.releasable(&token), vested);
    assert_eq!(client.release(&token), vested);

    assert_eq!(vested, PROJECT_FUND / 2);
    assert_eq!(balance(&env, &token, &beneficiary), vested);
    assert_eq!(balance(&env, &token, &client.address), PROJECT_FUND - vested);
    assert_eq!(client.released(&token), vested);
    assert_eq!(client.releasable(&token), 0);
    // the vesting base still counts released tokens
    assert_eq!(client.vested_amount(&token, &halfway), vested);
}

#[test]
fn release_emits_event() {
    let (env, client, _beneficiary, token) = setup();
    set_time(&env, START + 5 * YEAR);

    let amount = client.release(&token);

    let (contract, topics, data) = env.events().all().last().unwrap();
    assert_eq!(contract, client.address);
    assert_eq!(
        topics,
        vec![&env, EVENT_RELEASED.into_val(&env), token.into_val(&env)]
    );
    let paid: i128 = data.try_into_val(&env).unwrap();
    assert_eq!(paid, amount);
}

#[test]
fn second_release_without_new_vesting_fails() {
    let (env, client, _beneficiary, token) = setup();
    set_time(&env, START + 5 * YEAR);
    client.release(&token);

    assert_eq!(
        client.try_release(&token),
        Err(Ok(WalletError::NothingToRelease))
    );
}

#[test]
fn partial_releases_add_up_to_full_fund() {
    let (env, client, beneficiary, token) = setup();

    set_time(&env, START + 5 * YEAR);
    let first = client.release(&token);
    set_time(&env, START + 7 * YEAR + YEAR / 2);
    let second = client.release(&token);
    set_time(&env, START + DURATION);
    let last = client.release(&token);

    assert_eq!(first, PROJECT_FUND / 2);
    assert_eq!(second, PROJECT_FUND / 4);
    assert_eq!(first + second + last, PROJECT_FUND);
    assert_eq!(balance(&env, &token, &beneficiary), PROJECT_FUND);
    assert_eq!(balance(&env, &token, &client.address), 0);
    assert_eq!(client.released(&token), PROJECT_FUND);
}

#[test]
fn late_deposit_vests_on_same_curve() {
    let (env, client, _beneficiary, token) = setup();
    let halfway = START + 5 * YEAR;
    set_time(&env, halfway);
    client.release(&token);

    let deposit = 1_000 * E18;
    token::StellarAssetClient::new(&env, &token).mint(&client.address, &deposit);

    assert_eq!(
        client.vested_amount(&token, &halfway),
        (PROJECT_FUND + deposit) / 2
    );
    assert_eq!(client.releasable(&token), deposit / 2);
}

#[test]
fn tokens_vest_independently() {
    let (env, client, beneficiary, token) = setup();
    let issuer = Address::generate(&env);
    let other = env
        .register_stellar_asset_contract_v2(issuer)
        .address();
    token::StellarAssetClient::new(&env, &other).mint(&client.address, &(100 * E18));

    set_time(&env, START + 5 * YEAR);
    client.release(&token);

    assert_eq!(client.released(&other), 0);
    assert_eq!(client.releasable(&other), 50 * E18);
    assert_eq!(client.release(&other), 50 * E18);
    assert_eq!(balance(&env, &other, &beneficiary), 50 * E18);
}

#[test]
fn error_reasons_are_readable() {
    assert_eq!(
        WalletError::NothingToRelease.reason(),
        "Cannot release 0 tokens"
    );
}
