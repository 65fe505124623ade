//! Vacation entitlement by years of service.

use crate::statutory::VacationBreakpoint;
use chrono::NaiveDate;

/// Whole anniversaries completed between `hire` and `reference`.
///
/// Fractions of a year are truncated; a reference date before the hire
/// date counts as zero years.
pub fn years_of_service(hire: NaiveDate, reference: NaiveDate) -> u32 {
    reference.years_since(hire).unwrap_or(0)
}

/// Vacation days for `years_of_service` under `table`.
///
/// Picks the breakpoint with the greatest threshold not above
/// `years_of_service`, falling back to the first entry below the first
/// threshold.  An empty table grants nothing; loaded tables are never
/// empty.
pub fn resolve_vacation_days(years_of_service: u32, table: &[VacationBreakpoint]) -> u32 {
    table
        .iter()
        .rfind(|b| b.minimum_years_of_service <= years_of_service)
        .or_else(|| table.first())
        .map_or(0, |b| b.vacation_days)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::statutory::fixtures::table_2024;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn resolves_published_tiers() {
        let table = table_2024().vacation_table;
        let cases = [(0, 12), (1, 12), (5, 20), (10, 22), (11, 24), (16, 26), (31, 32), (45, 32)];
        for (years, days) in cases {
            assert_eq!(resolve_vacation_days(years, &table), days, "{years} years");
        }
    }

    #[test]
    fn table_is_monotonic() {
        let table = table_2024().vacation_table;
        assert!(table.windows(2).all(|w| w[1].vacation_days >= w[0].vacation_days));
    }

    #[test]
    fn years_are_truncated() {
        assert_eq!(years_of_service(date(2019, 6, 15), date(2024, 6, 14)), 4);
        assert_eq!(years_of_service(date(2019, 6, 15), date(2024, 6, 15)), 5);
        assert_eq!(years_of_service(date(2024, 6, 15), date(2024, 6, 1)), 0);
    }

    #[test]
    fn empty_table_grants_nothing() {
        assert_eq!(resolve_vacation_days(3, &[]), 0);
    }
}
