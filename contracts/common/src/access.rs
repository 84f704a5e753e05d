//! Role-based access control.
//!
//! Membership is stored per `(Role, Address)` in the persistent storage of the
//! contract that calls into this module, so the vault and the sale each own an
//! independent role set. Checks always read storage; a grant or revoke is
//! visible to the very next call.

use soroban_sdk::{contracterror, contracttype, symbol_short, Address, Env, Symbol};

pub const EVENT_ROLE_GRANTED: Symbol = symbol_short!("role_grnt");
pub const EVENT_ROLE_REVOKED: Symbol = symbol_short!("role_rvk");

#[contracterror]
#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd)]
#[repr(u32)]
pub enum AccessError {
    /// The first admin has already been assigned.
    AlreadyInitialized = 1,
    /// Caller does not hold the role the operation requires.
    Unauthorized = 2,
    /// Removing the account would leave the contract without an admin.
    LastAdmin = 3,
}

#[contracttype]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Role {
    /// Grants and revokes every role, including `Admin` itself.
    Admin,
    /// Records tranches in the vesting vault.
    Controller,
    /// May contribute payment to a sale.
    Whitelisted,
}

#[contracttype]
pub enum AccessKey {
    /// Present when the account holds the role.
    Member(Role, Address),
    /// Number of accounts currently holding `Role::Admin`.
    AdminCount,
}

/// Assign the first admin. Fails once any admin has ever been assigned.
pub fn initialize(env: &Env, admin: &Address) -> Result<(), AccessError> {
    if env.storage().persistent().has(&AccessKey::AdminCount) {
        return Err(AccessError::AlreadyInitialized);
    }
    env.storage()
        .persistent()
        .set(&AccessKey::Member(Role::Admin, admin.clone()), &true);
    env.storage().persistent().set(&AccessKey::AdminCount, &1u32);
    env.events().publish(
        (EVENT_ROLE_GRANTED, Role::Admin),
        (admin.clone(), admin.clone()),
    );
    Ok(())
}

pub fn has_role(env: &Env, role: Role, account: &Address) -> bool {
    env.storage()
        .persistent()
        .get::<AccessKey, bool>(&AccessKey::Member(role, account.clone()))
        .unwrap_or(false)
}

pub fn require_role(env: &Env, role: Role, account: &Address) -> Result<(), AccessError> {
    if !has_role(env, role, account) {
        return Err(AccessError::Unauthorized);
    }
    Ok(())
}

pub fn admin_count(env: &Env) -> u32 {
    env.storage()
        .persistent()
        .get(&AccessKey::AdminCount)
        .unwrap_or(0)
}

/// Grant `role` to `account`. `caller` must authorize and hold `Admin`.
///
/// Returns `false` when the account already held the role; nothing is written
/// and no event is emitted in that case.
pub fn grant_role(
    env: &Env,
    caller: &Address,
    role: Role,
    account: &Address,
) -> Result<bool, AccessError> {
    caller.require_auth();
    require_role(env, Role::Admin, caller)?;

    if has_role(env, role, account) {
        return Ok(false);
    }
    env.storage()
        .persistent()
        .set(&AccessKey::Member(role, account.clone()), &true);
    if role == Role::Admin {
        let count = admin_count(env).saturating_add(1);
        env.storage().persistent().set(&AccessKey::AdminCount, &count);
    }
    env.events()
        .publish((EVENT_ROLE_GRANTED, role), (account.clone(), caller.clone()));
    Ok(true)
}

/// Revoke `role` from `account`. `caller` must authorize and hold `Admin`.
pub fn revoke_role(
    env: &Env,
    caller: &Address,
    role: Role,
    account: &Address,
) -> Result<bool, AccessError> {
    caller.require_auth();
    require_role(env, Role::Admin, caller)?;
    remove_member(env, caller, role, account)
}

/// Drop a role held by `account` itself.
pub fn renounce_role(env: &Env, account: &Address, role: Role) -> Result<bool, AccessError> {
    account.require_auth();
    remove_member(env, account, role, account)
}

fn remove_member(
    env: &Env,
    sender: &Address,
    role: Role,
    account: &Address,
) -> Result<bool, AccessError> {
    if !has_role(env, role, account) {
        return Ok(false);
    }
    if role == Role::Admin {
        let count = admin_count(env);
        if count <= 1 {
            return Err(AccessError::LastAdmin);
        }
        env.storage()
            .persistent()
            .set(&AccessKey::AdminCount, &(count - 1));
    }
    env.storage()
        .persistent()
        .remove(&AccessKey::Member(role, account.clone()));
    env.events()
        .publish((EVENT_ROLE_REVOKED, role), (account.clone(), sender.clone()));
    Ok(true)
}

#[cfg(test)]
mod test {
    use super::*;
    use soroban_sdk::{contract, testutils::Address as _};

    #[contract]
    struct Host;

    #[test]
    fn initialize_assigns_single_admin() {
        let env = Env::default();
        let host = env.register_contract(None, Host);
        let admin = Address::generate(&env);

        env.as_contract(&host, || {
            initialize(&env, &admin).unwrap();
            assert!(has_role(&env, Role::Admin, &admin));
            assert!(!has_role(&env, Role::Controller, &admin));
            assert_eq!(admin_count(&env), 1);
        });
    }

    #[test]
    fn initialize_twice_fails() {
        let env = Env::default();
        let host = env.register_contract(None, Host);
        let admin = Address::generate(&env);
        let other = Address::generate(&env);

        env.as_contract(&host, || {
            initialize(&env, &admin).unwrap();
            assert_eq!(
                initialize(&env, &other),
                Err(AccessError::AlreadyInitialized)
            );
            assert!(!has_role(&env, Role::Admin, &other));
        });
    }

    #[test]
    fn require_role_rejects_non_members() {
        let env = Env::default();
        let host = env.register_contract(None, Host);
        let admin = Address::generate(&env);
        let stranger = Address::generate(&env);

        env.as_contract(&host, || {
            initialize(&env, &admin).unwrap();
            assert_eq!(require_role(&env, Role::Admin, &admin), Ok(()));
            assert_eq!(
                require_role(&env, Role::Admin, &stranger),
                Err(AccessError::Unauthorized)
            );
        });
    }

    #[test]
    fn last_admin_cannot_be_removed() {
        let env = Env::default();
        let host = env.register_contract(None, Host);
        let admin = Address::generate(&env);

        env.as_contract(&host, || {
            initialize(&env, &admin).unwrap();
            assert_eq!(
                remove_member(&env, &admin, Role::Admin, &admin),
                Err(AccessError::LastAdmin)
            );
            assert!(has_role(&env, Role::Admin, &admin));
        });
    }

    #[test]
    fn removing_missing_member_is_noop() {
        let env = Env::default();
        let host = env.register_contract(None, Host);
        let admin = Address::generate(&env);
        let stranger = Address::generate(&env);

        env.as_contract(&host, || {
            initialize(&env, &admin).unwrap();
            assert_eq!(
                remove_member(&env, &admin, Role::Controller, &stranger),
                Ok(false)
            );
        });
    }
}
