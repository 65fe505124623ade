//! Benefit computation engine.
//!
//! The `engine` module exposes the four top-level operations (annual
//! aguinaldo, vacation entitlement, PTU and termination settlement) and
//! dispatches tagged [`CalculationRequest`]s against a
//! [`StatutoryCatalog`].  Each operation is a pure function of its
//! request, the statutory table for the request's reference year and,
//! where service is measured to "today", an explicitly passed date.
//! Batches are evaluated in parallel with [`rayon`].

use crate::error::{BenefitsError, BenefitsResult};
use crate::exemption;
use crate::models::{
    checked_mul, round_money, AguinaldoRequest, BenefitLineItem, CalculationRequest,
    CalculationResult, Concept, Operation, PtuRequest, SettlementRequest, SettlementResult,
    VacationRequest,
};
use crate::proration::{days_between_inclusive, prorate};
use crate::ptu::allocate_ptu;
use crate::settlement::compose_settlement;
use crate::statutory::{StatutoryCatalog, StatutoryTable};
use crate::vacation::{resolve_vacation_days, years_of_service};
use chrono::NaiveDate;
use rayon::prelude::*;
use rust_decimal::Decimal;
use tracing::debug;

/// Annual aguinaldo for the service inside the reference year, prorated
/// by day.
pub fn aguinaldo(request: &AguinaldoRequest, table: &StatutoryTable) -> BenefitsResult<CalculationResult> {
    let period = &request.period;
    let hire = period.validate()?;
    let year = period.reference_year;
    let (year_start, year_end) = NaiveDate::from_ymd_opt(year, 1, 1)
        .zip(NaiveDate::from_ymd_opt(year, 12, 31))
        .ok_or(BenefitsError::UnknownReferenceYear(year))?;

    let start = hire.max(year_start);
    let end = period.termination_date.unwrap_or(year_end).min(year_end);
    let year_length = Decimal::from(days_between_inclusive(year_start, year_end)?);
    let constants = &table.constants;
    let days = prorate(
        constants.minimum_annual_bonus_days.into(),
        start,
        end,
        year_length,
    )?;

    let item = BenefitLineItem::new(Concept::Aguinaldo, days, period.daily_salary)?;
    let split = exemption::split(
        item.gross_amount,
        constants.aguinaldo_exemption_units.into(),
        constants.daily_reference_unit_value,
    )?;
    debug!(year, %start, %end, %days, "calculated aguinaldo");
    CalculationResult::new(
        Operation::Aguinaldo,
        year,
        vec![item.with_exempt_amount(split.exempt_amount)],
    )
}

/// Vacation days and premium for the current tier.
///
/// Service is measured to `today`, or to the termination date when that
/// comes first.
pub fn vacation(
    request: &VacationRequest,
    table: &StatutoryTable,
    today: NaiveDate,
) -> BenefitsResult<CalculationResult> {
    let period = &request.period;
    let hire = period.validate()?;
    let as_of = request.as_of.unwrap_or(today);
    let reference = period.termination_date.map_or(as_of, |end| end.min(as_of));
    if reference < hire {
        return Err(BenefitsError::InvalidRange {
            start: hire,
            end: reference,
        });
    }
    let years = years_of_service(hire, reference);
    let days = Decimal::from(resolve_vacation_days(years, &table.vacation_table));
    let constants = &table.constants;

    let pay = BenefitLineItem::new(Concept::Vacation, days, period.daily_salary)?;
    let premium_gross = round_money(checked_mul(
        "gross_amount",
        pay.gross_amount,
        constants.vacation_premium_rate,
    )?);
    let premium = BenefitLineItem {
        gross_amount: premium_gross,
        taxable_amount: premium_gross,
        ..BenefitLineItem::new(
            Concept::VacationPremium,
            days,
            checked_mul("daily_salary", period.daily_salary, constants.vacation_premium_rate)?,
        )?
    };
    let split = exemption::split(
        premium.gross_amount,
        constants.vacation_premium_exemption_units.into(),
        constants.daily_reference_unit_value,
    )?;
    debug!(years, %reference, %days, "calculated vacation entitlement");
    CalculationResult::new(
        Operation::Vacation,
        period.reference_year,
        vec![pay, premium.with_exempt_amount(split.exempt_amount)],
    )
}

/// One employee's PTU, capped when the employee's daily salary is known.
///
/// The cap is the more favourable of `profit_sharing_cap_days` of salary
/// and the average PTU of the three previous years.
pub fn ptu(request: &PtuRequest, table: &StatutoryTable) -> BenefitsResult<CalculationResult> {
    let allocation = allocate_ptu(
        request.pool,
        request.employee_days_worked,
        request.company_total_days,
        request.employee_annual_salary,
        request.company_total_salaries,
    )?;
    let constants = &table.constants;

    let mut gross = allocation.total;
    if let Some(salary) = request.daily_salary {
        if salary <= Decimal::ZERO {
            return Err(BenefitsError::InvalidAmount {
                field: "daily_salary",
                value: salary,
            });
        }
        let average = request.trailing_three_year_average.unwrap_or(Decimal::ZERO);
        if average < Decimal::ZERO {
            return Err(BenefitsError::InvalidAmount {
                field: "trailing_three_year_average",
                value: average,
            });
        }
        // A cap beyond the decimal range never binds.
        let cap = Decimal::from(constants.profit_sharing_cap_days)
            .checked_mul(salary)
            .unwrap_or(Decimal::MAX)
            .max(average);
        gross = gross.min(cap);
    }

    let item = BenefitLineItem::lump_sum(Concept::ProfitSharing, gross);
    let split = exemption::split(
        item.gross_amount,
        constants.profit_sharing_exemption_units.into(),
        constants.daily_reference_unit_value,
    )?;
    debug!(
        days_factor = %allocation.days_factor,
        salary_factor = %allocation.salary_factor,
        capped = gross < allocation.total,
        "allocated ptu"
    );
    CalculationResult::new(
        Operation::Ptu,
        request.reference_year,
        vec![item.with_exempt_amount(split.exempt_amount)],
    )
}

/// Termination settlement for the request's classification.
pub fn settlement(request: &SettlementRequest, table: &StatutoryTable) -> BenefitsResult<SettlementResult> {
    compose_settlement(
        &request.period,
        request.classification,
        &table.constants,
        &table.vacation_table,
    )
}

/// Runs any request against the table for its reference year.
pub fn calculate(
    request: &CalculationRequest,
    catalog: &StatutoryCatalog,
    today: NaiveDate,
) -> BenefitsResult<CalculationResult> {
    let table = catalog.get(request.reference_year())?;
    match request {
        CalculationRequest::Aguinaldo(r) => aguinaldo(r, table),
        CalculationRequest::Vacation(r) => vacation(r, table, today),
        CalculationRequest::Ptu(r) => ptu(r, table),
        CalculationRequest::Settlement(r) => settlement(r, table),
    }
}

/// Evaluates independent requests in parallel.
///
/// Outcomes are returned in request order; a failing request never
/// affects the others.
pub fn run_batch(
    requests: &[CalculationRequest],
    catalog: &StatutoryCatalog,
    today: NaiveDate,
) -> Vec<BenefitsResult<CalculationResult>> {
    requests
        .par_iter()
        .map(|request| calculate(request, catalog, today))
        .collect()
}
