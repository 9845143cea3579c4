//! Continuous compounding in unsigned 64.64 fixed point.
//!
//! Every step rounds down, so the same inputs always produce the same value
//! whether the caller is validating a guarantee or pricing a repayment.

use crate::storage::{ActiveLoan, SECONDS_PER_YEAR};

/// 1.0 in 64.64
const ONE: u128 = 1 << 64;
const LO_MASK: u128 = u64::MAX as u128;
/// ln(2) in 64.64, rounded down
const LN_2: u128 = 0xB172_17F7_D1CF_79AB;
/// Largest power of two the growth factor may carry before the principal multiply
const MAX_DOUBLINGS: u128 = 62;
const TAYLOR_TERMS: u128 = 32;
/// Rate is whole percent per year, elapsed is seconds
const EXPONENT_DENOMINATOR: u128 = 100 * SECONDS_PER_YEAR as u128;

/// Calculate the compounded value of a principal
///
/// Formula: value = principal × e^(rate/100 × elapsed/SECONDS_PER_YEAR)
///
/// Example:
/// - rate: 10%, elapsed: 1 year, principal: 1,000
/// - value: 1,000 × e^0.1 = 1,105.17 → 1,105
pub fn compounded_value(rate: u32, elapsed: u64, principal: i128) -> Option<i128> {
    let principal = u128::try_from(principal).ok()?;
    let growth = exp(exponent(rate, elapsed)?)?;
    i128::try_from(mul_int(growth, principal)?).ok()
}

/// Value of the remaining principal compounded from activation up to `now`.
pub fn current_interest_value(loan: &ActiveLoan, now: u64) -> Option<i128> {
    let elapsed = now.checked_sub(loan.activated_at)?;
    compounded_value(loan.rate, elapsed, loan.principal)
}

/// Calculate how much principal a partial payment retires
///
/// Formula: delta = paid / (interest_value / principal)
///
/// Example:
/// - principal: 1,000, interest_value: 1,051, paid: 60
/// - ratio: 1.051, delta: 60 / 1.051 = 57.08 → 57
pub fn principal_reduction(paid: i128, interest_value: i128, principal: i128) -> Option<i128> {
    if paid < 0 || interest_value <= 0 || principal <= 0 {
        return None;
    }
    let ratio = div_scaled(interest_value as u128, principal as u128)?;
    // integer ÷ 64.64 leaves an integer
    i128::try_from(div_scaled(paid as u128, ratio)?).ok()
}

/// rate/100 × elapsed/SECONDS_PER_YEAR as 64.64
fn exponent(rate: u32, elapsed: u64) -> Option<u128> {
    let numerator = (rate as u128).checked_mul(elapsed as u128)?;
    div_scaled(numerator, EXPONENT_DENOMINATOR)
}

/// e^x for 64.64 `x`, via x = k·ln2 + r and a Taylor series on r ∈ [0, ln2).
fn exp(x: u128) -> Option<u128> {
    let doublings = x / LN_2;
    if doublings > MAX_DOUBLINGS {
        return None;
    }
    let r = x - doublings * LN_2;

    let mut term = ONE;
    let mut sum = ONE;
    for n in 1..=TAYLOR_TERMS {
        term = mul_fixed(term, r)? / n;
        if term == 0 {
            break;
        }
        sum = sum.checked_add(term)?;
    }

    sum.checked_mul(1u128 << doublings)
}

/// 64.64 × 64.64, rounded down
fn mul_fixed(a: u128, b: u128) -> Option<u128> {
    let (a_hi, a_lo) = (a >> 64, a & LO_MASK);
    let (b_hi, b_lo) = (b >> 64, b & LO_MASK);

    let hi = a_hi.checked_mul(b_hi)?.checked_mul(ONE)?;
    let mid = (a_hi * b_lo).checked_add(a_lo * b_hi)?;
    let lo = (a_lo * b_lo) >> 64;

    hi.checked_add(mid)?.checked_add(lo)
}

/// 64.64 × integer, rounded down to an integer
fn mul_int(fixed: u128, x: u128) -> Option<u128> {
    let (f_hi, f_lo) = (fixed >> 64, fixed & LO_MASK);
    let (x_hi, x_lo) = (x >> 64, x & LO_MASK);

    let whole = f_hi.checked_mul(x)?;
    let frac = (f_lo * x_hi).checked_add((f_lo * x_lo) >> 64)?;

    whole.checked_add(frac)
}

/// floor(a × 2^64 / b) by restoring long division on the remainder
fn div_scaled(a: u128, b: u128) -> Option<u128> {
    if b == 0 {
        return None;
    }

    let mut quotient = (a / b).checked_mul(ONE)?;
    let mut rem = a % b;
    for bit in (0..64).rev() {
        // rem < b, so compare 2·rem against b without doubling first
        if rem >= b - rem {
            rem -= b - rem;
            quotient |= 1u128 << bit;
        } else {
            rem <<= 1;
        }
    }

    Some(quotient)
}
