use crate::{ContractError, StakeRecord};

/// Seconds in a 365-day year, the period the annual rate is quoted over.
pub const SECONDS_PER_YEAR: u64 = 365 * 24 * 60 * 60;

/// Denominator of the annual rate, which is stored in basis points.
pub const BPS_DENOMINATOR: i128 = 10_000;

/// 10% of staked principal per year.
pub const DEFAULT_ANNUAL_RATE_BPS: u32 = 1_000;

/// Upper bound accepted at initialization (1000% per year).
pub const MAX_ANNUAL_RATE_BPS: u32 = 100_000;

// ── Core accrual engine ─────────────────────────────────────────────────────

/// Compute `floor(a × b / d)` for non-negative `a`, `b` and positive `d`
/// without forming the full `a × b` product.
///
/// `a` is split into `q × d + r`, so
///
/// ```text
/// a × b / d = q × b + (r × b) / d
/// ```
///
/// where `r < d` keeps the second product small. The result is exact
/// (rounded toward zero) and `None` only when the quotient itself does not
/// fit in `i128`.
fn mul_div_floor(a: i128, b: i128, d: i128) -> Option<i128> {
    let q = a / d;
    let r = a % d;
    let whole = q.checked_mul(b)?;
    let frac = r.checked_mul(b)? / d;
    whole.checked_add(frac)
}

/// Rewards generated by `amount` staked for `elapsed` seconds at
/// `rate_bps` basis points per year.
///
/// ```text
/// accrued = amount × rate_bps × elapsed / (10_000 × SECONDS_PER_YEAR)
/// ```
///
/// Rounds toward zero. Returns `ArithmeticOverflow` when the result cannot
/// be represented.
pub fn accrued(amount: i128, rate_bps: u32, elapsed: u64) -> Result<i128, ContractError> {
    if amount <= 0 || rate_bps == 0 || elapsed == 0 {
        return Ok(0);
    }

    // u32 × u64 always fits in i128.
    let numerator = (rate_bps as i128)
        .checked_mul(elapsed as i128)
        .ok_or(ContractError::ArithmeticOverflow)?;
    let denominator = BPS_DENOMINATOR * SECONDS_PER_YEAR as i128;

    mul_div_floor(amount, numerator, denominator).ok_or(ContractError::ArithmeticOverflow)
}

/// Fold the accrual since `record.last_update` into `record.unclaimed_rewards`
/// and advance `record.last_update` to `now`.
///
/// Must run before any change to `record.amount` so each sub-interval
/// accrues on the principal actually staked during it.
///
/// A `now` earlier than `record.last_update` is rejected with
/// `TimeRegression` and leaves the record untouched.
pub fn settle(record: &mut StakeRecord, rate_bps: u32, now: u64) -> Result<i128, ContractError> {
    if now < record.last_update {
        return Err(ContractError::TimeRegression);
    }

    let elapsed = now - record.last_update;
    let gained = accrued(record.amount, rate_bps, elapsed)?;
    let unclaimed = record
        .unclaimed_rewards
        .checked_add(gained)
        .ok_or(ContractError::ArithmeticOverflow)?;

    record.unclaimed_rewards = unclaimed;
    record.last_update = now;

    Ok(gained)
}

/// Read-only projection of `settle`: the unclaimed rewards the record would
/// hold at `now`. A regressed clock contributes no accrual.
pub fn pending(record: &StakeRecord, rate_bps: u32, now: u64) -> i128 {
    let elapsed = now.saturating_sub(record.last_update);
    let gained = accrued(record.amount, rate_bps, elapsed).unwrap_or(i128::MAX);
    record.unclaimed_rewards.saturating_add(gained)
}

// ── Unit tests ──────────────────────────────────────────────────────────────
// These are pure-math tests with no Soroban environment dependency.
