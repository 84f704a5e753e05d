//! Events published by the vault.
//!
//! | topics                      | data                      |
//! |-----------------------------|---------------------------|
//! | `("init", admin)`           | `token`                   |
//! | `("tr_alloc", beneficiary)` | `(release_time, amount)`  |
//! | `("tr_rel", beneficiary)`   | `amount`                  |

use soroban_sdk::{symbol_short, Address, Env, Symbol};

pub const EVENT_INIT: Symbol = symbol_short!("init");
pub const EVENT_TRANCHE_ALLOCATED: Symbol = symbol_short!("tr_alloc");
pub const EVENT_TRANCHE_RELEASED: Symbol = symbol_short!("tr_rel");

pub(crate) fn initialized(env: &Env, admin: &Address, token: &Address) {
    env.events()
        .publish((EVENT_INIT, admin.clone()), token.clone());
}

pub(crate) fn tranche_allocated(env: &Env, beneficiary: &Address, release_time: u64, amount: i128) {
    env.events().publish(
        (EVENT_TRANCHE_ALLOCATED, beneficiary.clone()),
        (release_time, amount),
    );
}

pub(crate) fn tranche_released(env: &Env, beneficiary: &Address, amount: i128) {
    env.events()
        .publish((EVENT_TRANCHE_RELEASED, beneficiary.clone()), amount);
}
