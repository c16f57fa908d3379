//! Conversion between experience levels and experience points.
//!
//! Every combine operation has a cost in levels. Levels are not linear in the
//! underlying point currency: the curve is a piecewise quadratic with breaks
//! after level 16 and level 31.
//!
//! ```text
//! level <= 16        L^2 + 6L
//! 17 <= level <= 31  2.5L^2 - 40.5L + 360
//! level >= 32        4.5L^2 - 162.5L + 2220
//! ```
//!
//! The half terms always cancel for integer levels, so the conversion is done
//! in exact integer arithmetic on the doubled polynomials.

use crate::RangeError;

/// Points needed to reach level 16, where the first and second pieces meet.
pub const POINTS_AT_LEVEL_16: u64 = 352;

/// Points needed to reach level 31, where the second and third pieces meet.
pub const POINTS_AT_LEVEL_31: u64 = 1507;

/// Convert a level to the total number of points needed to reach it from zero.
///
/// # Errors
///
/// Returns [`RangeError::NegativeLevel`] for negative input and
/// [`RangeError::LevelTooLarge`] when the result does not fit in a `u64`.
pub fn level_to_points(level: i64) -> Result<u64, RangeError> {
    let l = u64::try_from(level).map_err(|_| RangeError::NegativeLevel(level))?;
    if l > u64::from(u32::MAX) {
        return Err(RangeError::LevelTooLarge(level));
    }
    let points = points_for(u128::from(l));
    u64::try_from(points).map_err(|_| RangeError::LevelTooLarge(level))
}

/// Like [`level_to_points`], flooring a fractional level first.
///
/// # Errors
///
/// Returns [`RangeError::NotFinite`] for NaN or infinite input, otherwise the
/// same errors as [`level_to_points`].
#[allow(clippy::cast_possible_truncation)]
pub fn level_to_points_f64(level: f64) -> Result<u64, RangeError> {
    if !level.is_finite() {
        return Err(RangeError::NotFinite);
    }
    let floored = level.floor();
    if floored < 0.0 {
        // saturating cast keeps the reported value meaningful for huge negatives
        return Err(RangeError::NegativeLevel(floored as i64));
    }
    if floored >= i64::MAX as f64 {
        return Err(RangeError::LevelTooLarge(i64::MAX));
    }
    level_to_points(floored as i64)
}

/// Convert a point total back to the highest level it fully pays for.
///
/// # Errors
///
/// Returns [`RangeError::NegativePoints`] for negative input.
pub fn points_to_level(points: i64) -> Result<u64, RangeError> {
    let p = u64::try_from(points).map_err(|_| RangeError::NegativePoints(points))?;
    let p = u128::from(p);

    let estimate = if p <= u128::from(POINTS_AT_LEVEL_16) {
        // (L + 3)^2 = p + 9
        isqrt(p + 9) - 3
    } else if p <= u128::from(POINTS_AT_LEVEL_31) {
        // 5L^2 - 81L + (720 - 2p) = 0
        (81 + isqrt(40 * p - 7839)) / 10
    } else {
        // 9L^2 - 325L + (4440 - 2p) = 0
        (325 + isqrt(72 * p - 54215)) / 18
    };

    // The closed form is exact; the nudges only guard the piece boundaries.
    let mut level = estimate;
    while points_for(level + 1) <= p {
        level += 1;
    }
    while level > 0 && points_for(level) > p {
        level -= 1;
    }

    Ok(u64::try_from(level).unwrap_or(u64::MAX))
}

/// Points gained (or lost, if negative) moving from one level to another.
///
/// # Errors
///
/// Propagates [`RangeError`] from converting either endpoint.
pub fn levels_between(from: i64, to: i64) -> Result<i64, RangeError> {
    let from_points = level_to_points(from)?;
    let to_points = level_to_points(to)?;
    let diff = i128::from(to_points) - i128::from(from_points);
    i64::try_from(diff).map_err(|_| RangeError::LevelTooLarge(to.max(from)))
}

/// Total points when every step is paid for separately, starting from zero.
#[must_use]
pub fn incremental_total(step_costs: &[u32]) -> u64 {
    step_costs
        .iter()
        .map(|&c| points_for_level(c))
        .fold(0_u64, u64::saturating_add)
}

/// Total points when saving up for the single most expensive step.
///
/// Spending down after the peak step never needs more than the peak itself,
/// so only the maximum matters. Empty input costs nothing.
#[must_use]
pub fn bulk_total(step_costs: &[u32]) -> u64 {
    step_costs.iter().copied().max().map_or(0, points_for_level)
}

/// Prior-work penalty in levels for an item that has been combined `n` times.
#[must_use]
pub fn penalty(prior_work: u32) -> u64 {
    1_u64.checked_shl(prior_work).map_or(u64::MAX, |v| v - 1)
}

/// Infallible conversion for levels that are already known to be small.
#[must_use]
pub(crate) fn points_for_level(level: u32) -> u64 {
    // 4.5 * u32::MAX^2 overflows u64 only past level ~2 billion
    u64::try_from(points_for(u128::from(level))).unwrap_or(u64::MAX)
}

fn points_for(l: u128) -> u128 {
    if l <= 16 {
        l * l + 6 * l
    } else if l <= 31 {
        (5 * l * l + 720 - 81 * l) / 2
    } else {
        (9 * l * l + 4440 - 325 * l) / 2
    }
}

fn isqrt(n: u128) -> u128 {
    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        clippy::cast_precision_loss
    )]
    let mut x = (n as f64).sqrt() as u128;
    while x * x > n {
        x -= 1;
    }
    while (x + 1) * (x + 1) <= n {
        x += 1;
    }
    x
}
