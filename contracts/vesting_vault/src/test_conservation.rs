#![cfg(test)]
//! Randomized allocate/advance/release sequences. After every step the sum of
//! outstanding tranches plus everything released must equal everything
//! allocated, and the vault must hold exactly the outstanding amount.
extern crate std;

use arbitrary::{Arbitrary, Unstructured};
use distribution_common::Role;
use soroban_sdk::{
    testutils::{Address as _, Ledger as _},
    token, Address, Env,
};
use std::vec::Vec as StdVec;

use crate::{VaultError, VestingVault, VestingVaultClient};

const START: u64 = 10_000;
const SLOT_SPACING: u64 = 250;
const BENEFICIARIES: usize = 3;
const STEPS: usize = 48;

#[derive(Arbitrary, Debug)]
enum Op {
    Allocate {
        beneficiary: u8,
        slot: u8,
        amount: u16,
    },
    Advance {
        seconds: u16,
    },
    Release {
        beneficiary: u8,
    },
}

/// xorshift64; deterministic input bytes for a given seed.
fn seeded_bytes(seed: u64, len: usize) -> StdVec<u8> {
    let mut state = seed.wrapping_mul(0x9E37_79B9_7F4A_7C15) | 1;
    let mut out = StdVec::with_capacity(len);
    while out.len() < len {
        state ^= state << 13;
        state ^= state >> 7;
        state ^= state << 17;
        out.extend_from_slice(&state.to_le_bytes());
    }
    out.truncate(len);
    out
}

fn run(seed: u64) {
    let env = Env::default();
    env.mock_all_auths();
    env.budget().reset_unlimited();
    env.ledger().with_mut(|li| li.timestamp = START);

    let admin = Address::generate(&env);
    let controller = Address::generate(&env);
    let token = env
        .register_stellar_asset_contract_v2(admin.clone())
        .address();
    let id = env.register_contract(None, VestingVault);
    let client = VestingVaultClient::new(&env, &id);
    client.initialize(&admin, &token);
    client.grant_role(&admin, &Role::Controller, &controller);
    let token_client = token::Client::new(&env, &token);
    let minter = token::StellarAssetClient::new(&env, &token);

    let beneficiaries: StdVec<Address> = (0..BENEFICIARIES)
        .map(|_| Address::generate(&env))
        .collect();

    let bytes = seeded_bytes(seed, STEPS * 8);
    let mut u = Unstructured::new(&bytes);
    let mut allocated: i128 = 0;
    let mut released: i128 = 0;

    for _ in 0..STEPS {
        let op = Op::arbitrary(&mut u).unwrap();
        match op {
            Op::Allocate {
                beneficiary,
                slot,
                amount,
            } => {
                let who = &beneficiaries[usize::from(beneficiary) % BENEFICIARIES];
                let release_time = START + u64::from(slot % 8) * SLOT_SPACING;
                let amount = i128::from(amount);
                if amount > 0 {
                    minter.mint(&id, &amount);
                }
                client.allocate(&controller, who, &release_time, &amount);
                allocated += amount;
            }
            Op::Advance { seconds } => {
                env.ledger()
                    .with_mut(|li| li.timestamp += u64::from(seconds % 600));
            }
            Op::Release { beneficiary } => {
                let who = &beneficiaries[usize::from(beneficiary) % BENEFICIARIES];
                let expected = client.releasable(who);
                match client.try_release(who) {
                    Ok(Ok(amount)) => {
                        assert_eq!(amount, expected);
                        released += amount;
                        let now = env.ledger().timestamp();
                        for tranche in client.vesting_for(who).iter() {
                            assert!(tranche.release_time > now);
                        }
                    }
                    Err(Ok(err)) => {
                        assert_eq!(err, VaultError::NothingToRelease);
                        assert_eq!(expected, 0);
                    }
                    other => panic!("unexpected release result: {:?}", other),
                }
            }
        }

        let outstanding: i128 = beneficiaries
            .iter()
            .map(|b| client.locked_balance(b))
            .sum();
        assert_eq!(outstanding + released, allocated, "seed {seed}");
        assert_eq!(client.total_locked(), outstanding);
        assert_eq!(client.total_released(), released);
        assert_eq!(token_client.balance(&id), outstanding);
    }
}

#[test]
fn conservation_holds_over_random_sequences() {
    for seed in 0..12 {
        run(seed);
    }
}
