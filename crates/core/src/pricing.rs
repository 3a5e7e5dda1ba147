//! Pricing utilities
//!
//! Minor-unit arithmetic shared by the discount types.
//!
//! Percentages are rounded half away from zero to whole minor units, once per line. Fixed
//! amounts are split across lines without losing or inventing minor units.

use decimal_percentage::Percentage;
use rust_decimal::{Decimal, RoundingStrategy, prelude::ToPrimitive};
use smallvec::SmallVec;
use thiserror::Error;

/// Errors raised by minor-unit arithmetic.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PricingError {
    /// Percentage calculation could not be safely converted.
    #[error("percentage conversion overflowed or was not finite")]
    PercentConversion,

    /// Minor-unit arithmetic overflowed.
    #[error("minor unit arithmetic overflowed")]
    Overflow,
}

/// Build a percentage from a whole-number percent value (`10` is 10%).
pub fn percentage_from_points(points: Decimal) -> Percentage {
    Percentage::from(points / Decimal::ONE_HUNDRED)
}

/// The percentage as a plain ratio, `0.1` for 10%.
fn ratio(percent: Percentage) -> Decimal {
    Decimal::ONE * percent
}

/// Calculate `percent` of `minor`, rounded half away from zero to whole minor units.
///
/// # Errors
///
/// Returns [`PricingError::PercentConversion`] if the exact amount overflows a [`Decimal`] or
/// the rounded amount does not fit in minor units.
pub fn percent_of_minor(percent: &Percentage, minor: i64) -> Result<i64, PricingError> {
    let exact = ratio(*percent)
        .checked_mul(Decimal::from(minor))
        .ok_or(PricingError::PercentConversion)?;

    exact
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_i64()
        .ok_or(PricingError::PercentConversion)
}

/// Split `amount` across `weights` proportionally.
///
/// Each share is the floor of its proportional part; leftover minor units go one at a time to
/// the weights in order, skipping any share that already equals its weight. The shares always
/// sum to `min(amount, sum(weights))` and no share exceeds its weight.
///
/// # Errors
///
/// Returns [`PricingError::Overflow`] if the intermediate products overflow.
pub fn split_proportionally(
    amount: i64,
    weights: &[i64],
) -> Result<SmallVec<[i64; 8]>, PricingError> {
    let total = weights
        .iter()
        .try_fold(0_i64, |acc, weight| acc.checked_add((*weight).max(0)))
        .ok_or(PricingError::Overflow)?;

    let amount = amount.clamp(0, total);

    if total == 0 || amount == 0 {
        return Ok(weights.iter().map(|_| 0).collect());
    }

    let mut shares: SmallVec<[i64; 8]> = SmallVec::with_capacity(weights.len());

    for weight in weights {
        let weight = i128::from((*weight).max(0));
        let share = weight
            .checked_mul(i128::from(amount))
            .ok_or(PricingError::Overflow)?
            / i128::from(total);

        shares.push(i64::try_from(share).map_err(|_err| PricingError::Overflow)?);
    }

    let mut leftover = amount - shares.iter().sum::<i64>();

    for (share, weight) in shares.iter_mut().zip(weights) {
        if leftover == 0 {
            break;
        }

        if *share < *weight {
            *share += 1;
            leftover -= 1;
        }
    }

    Ok(shares)
}
