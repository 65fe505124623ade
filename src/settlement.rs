//! Termination settlement (finiquito and liquidación).
//!
//! A settlement always pays the accrued entitlements: proportional
//! aguinaldo and vacation, the vacation premium and the salary owed for
//! the termination month.  The seniority premium is added after fifteen
//! years of service or on unjustified dismissal, and an unjustified
//! dismissal also pays the constitutional indemnification and twenty
//! days per year of service.
//!
//! Aguinaldo and vacation are prorated by calendar month of the
//! termination date, not by day.

use crate::error::{BenefitsError, BenefitsResult};
use crate::exemption;
use crate::models::{
    checked_mul, round_money, BenefitLineItem, CalculationResult, Concept, EmploymentPeriod,
    Operation, SettlementResult, TerminationClassification,
};
use crate::statutory::{StatutoryConstants, VacationBreakpoint};
use crate::vacation::{resolve_vacation_days, years_of_service};
use chrono::{Datelike, Months, NaiveDate};
use rust_decimal::Decimal;
use tracing::debug;

const MONTHS_PER_YEAR: Decimal = Decimal::from_parts(12, 0, 0, false, 0);
const SENIORITY_DAYS_PER_YEAR: u32 = 12;
const INDEMNIFICATION_DAYS: u32 = 90;
const INDEMNIFICATION_DAYS_PER_YEAR: u32 = 20;
const SENIORITY_THRESHOLD_YEARS: u32 = 15;

/// Years counted for the separation-payment exemption: completed years,
/// plus one when more than six months have passed since the last
/// anniversary.
fn exemption_years(hire: NaiveDate, termination: NaiveDate, years: u32) -> u32 {
    let half_year_mark = hire
        .checked_add_months(Months::new(years * 12 + 6))
        .unwrap_or(NaiveDate::MAX);
    if termination > half_year_mark {
        years + 1
    } else {
        years
    }
}

/// Composes the settlement owed on `period.termination_date`.
pub fn compose_settlement(
    period: &EmploymentPeriod,
    classification: TerminationClassification,
    constants: &StatutoryConstants,
    vacation_table: &[VacationBreakpoint],
) -> BenefitsResult<SettlementResult> {
    let hire = period.validate()?;
    let termination = period
        .termination_date
        .ok_or(BenefitsError::MissingRequiredInput("termination_date"))?;
    let salary = period.daily_salary;
    let uma = constants.daily_reference_unit_value;
    let years = years_of_service(hire, termination);
    let month = Decimal::from(termination.month());

    let mut items = Vec::new();

    let aguinaldo_days =
        Decimal::from(constants.minimum_annual_bonus_days) * month / MONTHS_PER_YEAR;
    let aguinaldo = BenefitLineItem::new(Concept::ProportionalAguinaldo, aguinaldo_days, salary)?;
    let split = exemption::split(
        aguinaldo.gross_amount,
        constants.aguinaldo_exemption_units.into(),
        uma,
    )?;
    items.push(aguinaldo.with_exempt_amount(split.exempt_amount));

    // The tier being accrued is the one for the year not yet completed.
    let vacation_days =
        Decimal::from(resolve_vacation_days(years + 1, vacation_table)) * month / MONTHS_PER_YEAR;
    let vacation = BenefitLineItem::new(Concept::ProportionalVacation, vacation_days, salary)?;

    let premium_gross = round_money(checked_mul(
        "gross_amount",
        vacation.gross_amount,
        constants.vacation_premium_rate,
    )?);
    let premium = BenefitLineItem {
        gross_amount: premium_gross,
        taxable_amount: premium_gross,
        ..BenefitLineItem::new(
            Concept::VacationPremium,
            vacation_days,
            checked_mul("daily_salary", salary, constants.vacation_premium_rate)?,
        )?
    };
    let split = exemption::split(
        premium.gross_amount,
        constants.vacation_premium_exemption_units.into(),
        uma,
    )?;
    items.push(vacation);
    items.push(premium.with_exempt_amount(split.exempt_amount));

    items.push(BenefitLineItem::new(
        Concept::PendingSalary,
        Decimal::from(termination.day()),
        salary,
    )?);

    let (seniority_due, dismissed_without_cause) = match classification {
        TerminationClassification::Voluntary | TerminationClassification::JustifiedDismissal => {
            (years >= SENIORITY_THRESHOLD_YEARS, false)
        }
        TerminationClassification::UnjustifiedDismissal => (true, true),
    };

    let mut separation = Vec::new();
    if seniority_due {
        let capped_rate = salary.min(constants.units_to_pesos(constants.seniority_premium_rate_cap_units));
        separation.push(BenefitLineItem::new(
            Concept::SeniorityPremium,
            Decimal::from(years * SENIORITY_DAYS_PER_YEAR),
            capped_rate,
        )?);
    }
    if dismissed_without_cause {
        separation.push(BenefitLineItem::new(
            Concept::ConstitutionalIndemnification,
            Decimal::from(INDEMNIFICATION_DAYS),
            salary,
        )?);
        separation.push(BenefitLineItem::new(
            Concept::TwentyDaysPerYear,
            Decimal::from(years * INDEMNIFICATION_DAYS_PER_YEAR),
            salary,
        )?);
    }

    if !separation.is_empty() {
        let exempt_units = Decimal::from(constants.separation_exemption_units_per_year)
            * Decimal::from(exemption_years(hire, termination, years));
        let grosses: Vec<Decimal> = separation.iter().map(|i| i.gross_amount).collect();
        let splits = exemption::split_shared(&grosses, exempt_units, uma)?;
        items.extend(
            separation
                .into_iter()
                .zip(splits)
                .map(|(item, split)| item.with_exempt_amount(split.exempt_amount)),
        );
    }

    let result = CalculationResult::new(Operation::Settlement, period.reference_year, items)?;
    debug!(
        ?classification,
        years,
        %termination,
        items = result.items.len(),
        total = %result.total,
        "composed settlement"
    );
    Ok(result)
}
