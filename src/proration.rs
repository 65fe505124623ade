//! Day-level proration of annual entitlements.

use crate::error::{BenefitsError, BenefitsResult};
use crate::models::{checked_div, checked_mul};
use chrono::NaiveDate;
use rust_decimal::Decimal;

/// Days in the year used by the legal proration convention.
pub const STANDARD_YEAR_LENGTH: Decimal = Decimal::from_parts(365, 0, 0, false, 0);

/// Counts days from `start` to `end`, both included.
pub fn days_between_inclusive(start: NaiveDate, end: NaiveDate) -> BenefitsResult<i64> {
    if end < start {
        return Err(BenefitsError::InvalidRange { start, end });
    }
    Ok((end - start).num_days() + 1)
}

/// Scales `annual_entitlement` by the share of `year_length` covered by
/// `[period_start, period_end]`.
///
/// Callers clamp the period to the calculation year and to the hire and
/// termination dates; no clamping happens here.
pub fn prorate(
    annual_entitlement: Decimal,
    period_start: NaiveDate,
    period_end: NaiveDate,
    year_length: Decimal,
) -> BenefitsResult<Decimal> {
    if year_length <= Decimal::ZERO {
        return Err(BenefitsError::InvalidDivisor {
            field: "year_length",
            value: year_length,
        });
    }
    let days = days_between_inclusive(period_start, period_end)?;
    let scaled = checked_mul("annual_entitlement", annual_entitlement, Decimal::from(days))?;
    checked_div("annual_entitlement", scaled, year_length)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn counts_both_endpoints() {
        assert_eq!(days_between_inclusive(date(2024, 1, 1), date(2024, 1, 1)), Ok(1));
        assert_eq!(days_between_inclusive(date(2023, 1, 1), date(2023, 12, 31)), Ok(365));
    }

    #[test]
    fn full_year_yields_full_entitlement() {
        let days = prorate(dec!(15), date(2023, 1, 1), date(2023, 12, 31), STANDARD_YEAR_LENGTH);
        assert_eq!(days, Ok(dec!(15)));
    }

    #[test]
    fn partial_year_is_proportional() {
        // 73 days of 365 is exactly one fifth.
        let days = prorate(dec!(15), date(2023, 10, 20), date(2023, 12, 31), STANDARD_YEAR_LENGTH);
        assert_eq!(days, Ok(dec!(3)));
    }

    #[test]
    fn reversed_range_is_rejected() {
        let err = prorate(dec!(15), date(2024, 6, 2), date(2024, 6, 1), STANDARD_YEAR_LENGTH);
        assert!(matches!(err, Err(BenefitsError::InvalidRange { .. })));
    }

    #[test]
    fn zero_year_length_is_rejected() {
        let err = prorate(dec!(15), date(2024, 1, 1), date(2024, 1, 2), Decimal::ZERO);
        assert!(matches!(err, Err(BenefitsError::InvalidDivisor { .. })));
    }
}
