#![cfg(test)]
extern crate std;

use distribution_common::Role;
use soroban_sdk::{
    testutils::{Address as _, AuthorizedFunction, AuthorizedInvocation, Ledger as _},
    Address, Env, IntoVal, Symbol,
};

use crate::{VaultError, VestingVault, VestingVaultClient};

const RELEASE_TIME: u64 = 5_000;

fn setup() -> (Env, VestingVaultClient<'static>, Address) {
    let env = Env::default();
    env.mock_all_auths();
    let admin = Address::generate(&env);
    let token = env
        .register_stellar_asset_contract_v2(admin.clone())
        .address();
    let id = env.register_contract(None, VestingVault);
    let client = VestingVaultClient::new(&env, &id);
    client.initialize(&admin, &token);
    (env, client, admin)
}

#[test]
fn allocate_without_controller_role_fails_then_succeeds_after_grant() {
    let (env, client, admin) = setup();
    let operator = Address::generate(&env);
    let beneficiary = Address::generate(&env);

    assert_eq!(
        client.try_allocate(&operator, &beneficiary, &RELEASE_TIME, &5),
        Err(Ok(VaultError::Unauthorized))
    );
    assert_eq!(client.vesting_for(&beneficiary).len(), 0);

    client.grant_role(&admin, &Role::Controller, &operator);
    client.allocate(&operator, &beneficiary, &RELEASE_TIME, &5);
    assert_eq!(client.locked_balance(&beneficiary), 5);
}

#[test]
fn allocate_records_controller_auth() {
    let (env, client, admin) = setup();
    let operator = Address::generate(&env);
    let beneficiary = Address::generate(&env);
    client.grant_role(&admin, &Role::Controller, &operator);

    client.allocate(&operator, &beneficiary, &RELEASE_TIME, &5);

    assert_eq!(
        env.auths(),
        std::vec![(
            operator.clone(),
            AuthorizedInvocation {
                function: AuthorizedFunction::Contract((
                    client.address.clone(),
                    Symbol::new(&env, "allocate"),
                    (operator.clone(), beneficiary.clone(), RELEASE_TIME, 5_i128)
                        .into_val(&env),
                )),
                sub_invocations: std::vec![],
            }
        )]
    );
}

#[test]
fn allocate_without_signature_is_rejected() {
    let (env, client, admin) = setup();
    let operator = Address::generate(&env);
    let beneficiary = Address::generate(&env);
    client.grant_role(&admin, &Role::Controller, &operator);

    env.set_auths(&[]);
    assert!(client
        .try_allocate(&operator, &beneficiary, &RELEASE_TIME, &5)
        .is_err());
    assert_eq!(client.locked_balance(&beneficiary), 0);
}

#[test]
fn release_without_signature_is_rejected() {
    let (env, client, admin) = setup();
    let operator = Address::generate(&env);
    let beneficiary = Address::generate(&env);
    client.grant_role(&admin, &Role::Controller, &operator);
    client.allocate(&operator, &beneficiary, &RELEASE_TIME, &5);
    env.ledger().with_mut(|li| li.timestamp = RELEASE_TIME);

    env.set_auths(&[]);
    assert!(client.try_release(&beneficiary).is_err());
    assert_eq!(client.locked_balance(&beneficiary), 5);
}

#[test]
fn revoked_controller_cannot_allocate() {
    let (env, client, admin) = setup();
    let operator = Address::generate(&env);
    let beneficiary = Address::generate(&env);
    client.grant_role(&admin, &Role::Controller, &operator);
    client.allocate(&operator, &beneficiary, &RELEASE_TIME, &5);

    client.revoke_role(&admin, &Role::Controller, &operator);

    assert!(!client.has_role(&Role::Controller, &operator));
    assert_eq!(
        client.try_allocate(&operator, &beneficiary, &RELEASE_TIME, &5),
        Err(Ok(VaultError::Unauthorized))
    );
    assert_eq!(client.locked_balance(&beneficiary), 5);
}

#[test]
fn non_admin_cannot_grant_roles() {
    let (env, client, _admin) = setup();
    let attacker = Address::generate(&env);

    assert_eq!(
        client.try_grant_role(&attacker, &Role::Controller, &attacker),
        Err(Ok(VaultError::Unauthorized))
    );
    assert!(!client.has_role(&Role::Controller, &attacker));
}

#[test]
fn controller_cannot_grant_roles() {
    let (env, client, admin) = setup();
    let operator = Address::generate(&env);
    let other = Address::generate(&env);
    client.grant_role(&admin, &Role::Controller, &operator);

    assert_eq!(
        client.try_grant_role(&operator, &Role::Controller, &other),
        Err(Ok(VaultError::Unauthorized))
    );
}

#[test]
fn grant_is_idempotent() {
    let (env, client, admin) = setup();
    let operator = Address::generate(&env);

    client.grant_role(&admin, &Role::Controller, &operator);
    client.grant_role(&admin, &Role::Controller, &operator);
    assert!(client.has_role(&Role::Controller, &operator));

    client.revoke_role(&admin, &Role::Controller, &operator);
    assert!(!client.has_role(&Role::Controller, &operator));
}

#[test]
fn controller_can_renounce_own_role() {
    let (env, client, admin) = setup();
    let operator = Address::generate(&env);
    client.grant_role(&admin, &Role::Controller, &operator);

    client.renounce_role(&operator, &Role::Controller);

    assert!(!client.has_role(&Role::Controller, &operator));
}

#[test]
fn last_admin_cannot_leave() {
    let (env, client, admin) = setup();

    assert_eq!(
        client.try_renounce_role(&admin, &Role::Admin),
        Err(Ok(VaultError::LastAdmin))
    );
    assert_eq!(
        client.try_revoke_role(&admin, &Role::Admin, &admin),
        Err(Ok(VaultError::LastAdmin))
    );

    let successor = Address::generate(&env);
    client.grant_role(&admin, &Role::Admin, &successor);
    client.renounce_role(&admin, &Role::Admin);

    assert!(!client.has_role(&Role::Admin, &admin));
    assert!(client.has_role(&Role::Admin, &successor));
    assert_eq!(
        client.try_grant_role(&admin, &Role::Controller, &admin),
        Err(Ok(VaultError::Unauthorized))
    );
}
