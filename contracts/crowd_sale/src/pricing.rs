//! Payment to token conversion.
//!
//! `quantity = floor(payment * price * usd_rate / 10^decimals)`. The
//! `payment * price` product is carried in 256 bits, so quotes with many
//! decimals only fail when the final quantity itself exceeds `i128`.

use soroban_sdk::{Env, I256};

use crate::{oracle::PriceData, SaleError};

/// Largest `10^decimals` scale that fits in `i128`.
pub const MAX_PRICE_DECIMALS: u32 = 38;

pub fn token_quantity(
    env: &Env,
    payment_amount: i128,
    quote: &PriceData,
    usd_rate: i128,
) -> Result<i128, SaleError> {
    if quote.price <= 0 || quote.decimals > MAX_PRICE_DECIMALS {
        return Err(SaleError::InvalidPrice);
    }
    if payment_amount < 0 || usd_rate <= 0 {
        return Err(SaleError::InvalidAmount);
    }

    // |payment * price| < 2^254, so the product never leaves I256.
    let scale = I256::from_i128(env, 10_i128.pow(quote.decimals));
    let value = I256::from_i128(env, payment_amount).mul(&I256::from_i128(env, quote.price));

    // floor(v * r / s) = floor(v / s) * r + floor((v mod s) * r / s)
    let whole = value.div(&scale).to_i128().ok_or(SaleError::Overflow)?;
    let fraction = value
        .rem_euclid(&scale)
        .mul(&I256::from_i128(env, usd_rate))
        .div(&scale)
        .to_i128()
        .ok_or(SaleError::Overflow)?;

    whole
        .checked_mul(usd_rate)
        .and_then(|v| v.checked_add(fraction))
        .ok_or(SaleError::Overflow)
}

/// `max_age == 0` disables the check. Quotes stamped in the future count as fresh.
pub fn check_freshness(now: u64, quoted_at: u64, max_age: u64) -> Result<(), SaleError> {
    if max_age == 0 {
        return Ok(());
    }
    if now.saturating_sub(quoted_at) > max_age {
        return Err(SaleError::StalePrice);
    }
    Ok(())
}

#[cfg(test)]
mod test {
    use super::*;

    const E18: i128 = 1_000_000_000_000_000_000;

    fn quote(price: i128, decimals: u32) -> PriceData {
        PriceData {
            price,
            decimals,
            timestamp: 0,
        }
    }

    #[test]
    fn converts_with_eight_decimal_price() {
        let env = Env::default();
        // 10 units at 2000.00000000 per unit, 250 tokens per USD
        let q = token_quantity(&env, 10 * E18, &quote(2_000_00000000, 8), 250).unwrap();
        assert_eq!(q, 5_000_000 * E18);
    }

    #[test]
    fn converts_with_fourteen_decimal_price() {
        let env = Env::default();
        let price = 2_000 * 10_i128.pow(14);
        assert_eq!(
            token_quantity(&env, 10 * E18, &quote(price, 14), 250),
            Ok(5_000_000 * E18)
        );
    }

    #[test]
    fn converts_with_eighteen_decimal_price() {
        let env = Env::default();
        let price = 2_000 * E18;
        assert_eq!(
            token_quantity(&env, 10 * E18, &quote(price, 18), 250),
            Ok(5_000_000 * E18)
        );
    }

    #[test]
    fn floors_fractional_result() {
        let env = Env::default();
        // 3 * 1.5 * 1 = 4.5
        assert_eq!(token_quantity(&env, 3, &quote(15, 1), 1), Ok(4));
        // 3 * 1.5 * 3 = 13.5
        assert_eq!(token_quantity(&env, 3, &quote(15, 1), 3), Ok(13));
        assert_eq!(token_quantity(&env, 1, &quote(1, 2), 1), Ok(0));
    }

    #[test]
    fn rejects_non_positive_price() {
        let env = Env::default();
        assert_eq!(
            token_quantity(&env, 100, &quote(0, 8), 250),
            Err(SaleError::InvalidPrice)
        );
        assert_eq!(
            token_quantity(&env, 100, &quote(-5, 8), 250),
            Err(SaleError::InvalidPrice)
        );
    }

    #[test]
    fn rejects_scale_beyond_i128() {
        let env = Env::default();
        assert_eq!(
            token_quantity(&env, 1, &quote(1, MAX_PRICE_DECIMALS + 1), 1),
            Err(SaleError::InvalidPrice)
        );
        assert_eq!(
            token_quantity(&env, E18, &quote(E18, MAX_PRICE_DECIMALS), 1),
            Ok(E18 * E18 / 10_i128.pow(MAX_PRICE_DECIMALS))
        );
    }

    #[test]
    fn rejects_bad_rate_or_payment() {
        let env = Env::default();
        assert_eq!(
            token_quantity(&env, 100, &quote(1, 0), 0),
            Err(SaleError::InvalidAmount)
        );
        assert_eq!(
            token_quantity(&env, -1, &quote(1, 0), 1),
            Err(SaleError::InvalidAmount)
        );
    }

    #[test]
    fn overflow_only_when_quantity_does_not_fit() {
        let env = Env::default();
        assert_eq!(
            token_quantity(&env, i128::MAX, &quote(2, 0), 1),
            Err(SaleError::Overflow)
        );
        assert_eq!(
            token_quantity(&env, i128::MAX, &quote(1, 0), 2),
            Err(SaleError::Overflow)
        );
        assert_eq!(
            token_quantity(&env, i128::MAX, &quote(2, 1), 1),
            Ok(i128::MAX / 5)
        );
    }

    #[test]
    fn freshness_window() {
        assert_eq!(check_freshness(1_000, 900, 100), Ok(()));
        assert_eq!(check_freshness(1_000, 899, 100), Err(SaleError::StalePrice));
        assert_eq!(check_freshness(1_000, 1_200, 100), Ok(()));
    }

    #[test]
    fn zero_max_age_disables_freshness() {
        assert_eq!(check_freshness(u64::MAX, 0, 0), Ok(()));
    }
}
