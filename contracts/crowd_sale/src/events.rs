use soroban_sdk::{symbol_short, Address, Env, Symbol};

pub const EVENT_INIT: Symbol = symbol_short!("init");
pub const EVENT_FUNDED: Symbol = symbol_short!("funded");
pub const EVENT_CONTRIBUTION: Symbol = symbol_short!("contrib");
pub const EVENT_RECLAIM: Symbol = symbol_short!("reclaim");
pub const EVENT_PRICE_AGE_SET: Symbol = symbol_short!("age_set");

pub(crate) fn initialized(env: &Env, admin: &Address, token: &Address, end_time: u64) {
    env.events()
        .publish((EVENT_INIT, admin.clone()), (token.clone(), end_time));
}

pub(crate) fn funded(env: &Env, funder: &Address, amount: i128) {
    env.events().publish((EVENT_FUNDED, funder.clone()), amount);
}

pub(crate) fn contribution_accepted(env: &Env, payer: &Address, payment_amount: i128, quantity: i128) {
    env.events().publish(
        (EVENT_CONTRIBUTION, payer.clone()),
        (payment_amount, quantity),
    );
}

pub(crate) fn unsold_reclaimed(env: &Env, to: &Address, amount: i128) {
    env.events().publish((EVENT_RECLAIM, to.clone()), amount);
}

pub(crate) fn max_price_age_set(env: &Env, admin: &Address, max_age: u64) {
    env.events()
        .publish((EVENT_PRICE_AGE_SET, admin.clone()), max_age);
}
