//! Profit-sharing (PTU) allocation.
//!
//! Half of the company pool is distributed by days worked and half by
//! salary.  The individual cap of the 2021 reform is not applied here;
//! see [`crate::engine::ptu`].

use crate::error::{BenefitsError, BenefitsResult};
use crate::models::{checked_div, checked_mul};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One employee's share of the pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PtuAllocation {
    pub days_factor: Decimal,
    pub salary_factor: Decimal,
    pub total: Decimal,
}

fn check_divisor(field: &'static str, value: Decimal) -> BenefitsResult<()> {
    if value <= Decimal::ZERO {
        return Err(BenefitsError::InvalidDivisor { field, value });
    }
    Ok(())
}

pub fn allocate_ptu(
    pool: Decimal,
    employee_days_worked: Decimal,
    company_total_days: Decimal,
    employee_annual_salary: Decimal,
    company_total_salaries: Decimal,
) -> BenefitsResult<PtuAllocation> {
    check_divisor("company_total_days", company_total_days)?;
    check_divisor("company_total_salaries", company_total_salaries)?;
    for (field, value) in [
        ("pool", pool),
        ("employee_days_worked", employee_days_worked),
        ("employee_annual_salary", employee_annual_salary),
    ] {
        if value < Decimal::ZERO {
            return Err(BenefitsError::InvalidAmount { field, value });
        }
    }

    let half = pool / Decimal::TWO;
    let days_factor = checked_div(
        "pool",
        checked_mul("pool", half, employee_days_worked)?,
        company_total_days,
    )?;
    let salary_factor = checked_div(
        "pool",
        checked_mul("pool", half, employee_annual_salary)?,
        company_total_salaries,
    )?;
    let total = days_factor
        .checked_add(salary_factor)
        .ok_or(BenefitsError::InvalidAmount { field: "pool", value: pool })?;
    Ok(PtuAllocation {
        days_factor,
        salary_factor,
        total,
    })
}
