//! Data models for the Benefits Engine.
//!
//! The `models` module defines the serialisable inputs and outputs of
//! every calculation: the employment period under evaluation, the
//! termination classification, the request shapes accepted by the
//! engine and the line items it produces.  Money and day counts are
//! exact decimals; dates are calendar dates without a time zone.

use crate::error::{BenefitsError, BenefitsResult};
use chrono::NaiveDate;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

const MONEY_DP: u32 = 2;
const DAYS_DP: u32 = 4;

/// Rounds a peso amount to cents, midpoint away from zero.
pub fn round_money(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(MONEY_DP, RoundingStrategy::MidpointAwayFromZero)
}

/// Rounds a fractional day count to the precision reported on line items.
pub fn round_days(days: Decimal) -> Decimal {
    days.round_dp_with_strategy(DAYS_DP, RoundingStrategy::MidpointAwayFromZero)
}

/// `value * factor`, reporting overflow as an invalid `field` amount.
pub(crate) fn checked_mul(field: &'static str, value: Decimal, factor: Decimal) -> BenefitsResult<Decimal> {
    value
        .checked_mul(factor)
        .ok_or(BenefitsError::InvalidAmount { field, value })
}

/// `value / divisor`, reporting overflow as an invalid `field` amount.
pub(crate) fn checked_div(field: &'static str, value: Decimal, divisor: Decimal) -> BenefitsResult<Decimal> {
    value
        .checked_div(divisor)
        .ok_or(BenefitsError::InvalidAmount { field, value })
}

/// Why the employment relationship ended.  Drives which settlement
/// components are included.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TerminationClassification {
    /// The employee resigned.
    Voluntary,
    /// The employer dismissed the employee with legal cause.
    JustifiedDismissal,
    /// The employer dismissed the employee without legal cause.
    UnjustifiedDismissal,
}

/// The employment facts a calculation is evaluated against.
///
/// `hire_date` is optional only so that a missing value can be reported
/// as [`BenefitsError::MissingRequiredInput`] instead of a parse error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmploymentPeriod {
    #[serde(default)]
    pub hire_date: Option<NaiveDate>,
    /// Absent for an active employee.
    #[serde(default)]
    pub termination_date: Option<NaiveDate>,
    /// Daily salary in pesos.
    pub daily_salary: Decimal,
    /// Selects the year-versioned statutory table.
    pub reference_year: i32,
}

impl EmploymentPeriod {
    /// Checks the period and returns the hire date.
    pub fn validate(&self) -> BenefitsResult<NaiveDate> {
        let hire = self
            .hire_date
            .ok_or(BenefitsError::MissingRequiredInput("hire_date"))?;
        if self.daily_salary < Decimal::ZERO {
            return Err(BenefitsError::InvalidAmount {
                field: "daily_salary",
                value: self.daily_salary,
            });
        }
        if self.daily_salary.is_zero() {
            return Err(BenefitsError::MissingRequiredInput("daily_salary"));
        }
        if let Some(end) = self.termination_date {
            if end < hire {
                return Err(BenefitsError::InvalidRange { start: hire, end });
            }
        }
        Ok(hire)
    }
}

/// What a line item pays for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Concept {
    Aguinaldo,
    ProportionalAguinaldo,
    Vacation,
    ProportionalVacation,
    VacationPremium,
    PendingSalary,
    SeniorityPremium,
    ConstitutionalIndemnification,
    TwentyDaysPerYear,
    ProfitSharing,
}

impl Concept {
    /// Display label used on settlement receipts.
    pub fn label(self) -> &'static str {
        match self {
            Concept::Aguinaldo => "Aguinaldo",
            Concept::ProportionalAguinaldo => "Aguinaldo proporcional",
            Concept::Vacation => "Vacaciones",
            Concept::ProportionalVacation => "Vacaciones proporcionales",
            Concept::VacationPremium => "Prima vacacional",
            Concept::PendingSalary => "Salario pendiente",
            Concept::SeniorityPremium => "Prima de antigüedad",
            Concept::ConstitutionalIndemnification => "Indemnización constitucional (90 días)",
            Concept::TwentyDaysPerYear => "20 días por año de servicio",
            Concept::ProfitSharing => "PTU",
        }
    }
}

/// A single payable concept with its exempt/taxable split.
///
/// Invariants: `exempt_amount <= gross_amount` and
/// `taxable_amount == gross_amount - exempt_amount`.  For day-based
/// items `gross_amount` is `days * daily_rate` rounded to cents, using
/// the reported (already rounded) `days`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BenefitLineItem {
    pub concept: Concept,
    pub label: String,
    pub days: Decimal,
    pub daily_rate: Decimal,
    pub gross_amount: Decimal,
    pub exempt_amount: Decimal,
    pub taxable_amount: Decimal,
    /// Never set by any current concept; kept so receipts can carry
    /// deductions once a rule requires them.
    pub is_deduction: bool,
}

impl BenefitLineItem {
    /// Builds a fully taxable item paying `days` at `daily_rate`.
    pub fn new(concept: Concept, days: Decimal, daily_rate: Decimal) -> BenefitsResult<Self> {
        let days = round_days(days);
        let gross = round_money(checked_mul("daily_rate", daily_rate, days)?);
        Ok(Self {
            concept,
            label: concept.label().to_string(),
            days,
            daily_rate,
            gross_amount: gross,
            exempt_amount: Decimal::ZERO,
            taxable_amount: gross,
            is_deduction: false,
        })
    }

    /// Builds a fully taxable item for an amount not derived from days.
    pub fn lump_sum(concept: Concept, amount: Decimal) -> Self {
        let gross = round_money(amount);
        Self {
            concept,
            label: concept.label().to_string(),
            days: Decimal::ZERO,
            daily_rate: Decimal::ZERO,
            gross_amount: gross,
            exempt_amount: Decimal::ZERO,
            taxable_amount: gross,
            is_deduction: false,
        }
    }

    /// Marks up to `exempt` of the gross amount as tax exempt.
    pub(crate) fn with_exempt_amount(self, exempt: Decimal) -> Self {
        let exempt = round_money(exempt.max(Decimal::ZERO).min(self.gross_amount));
        Self {
            exempt_amount: exempt,
            taxable_amount: self.gross_amount - exempt,
            ..self
        }
    }

    /// Gross amount with the sign it contributes to a total.
    pub fn signed_amount(&self) -> Decimal {
        if self.is_deduction {
            -self.gross_amount
        } else {
            self.gross_amount
        }
    }
}

/// The top-level operation that produced a result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    Aguinaldo,
    Vacation,
    Ptu,
    Settlement,
}

/// The ordered line items of one calculation plus their totals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalculationResult {
    pub operation: Operation,
    pub reference_year: i32,
    pub items: Vec<BenefitLineItem>,
    /// Sum of gross amounts, deductions negated.
    pub total: Decimal,
    pub exempt_total: Decimal,
    pub taxable_total: Decimal,
}

/// A termination settlement is an ordinary calculation result.
pub type SettlementResult = CalculationResult;

impl CalculationResult {
    /// Totals the items; fails if any sum leaves the decimal range.
    pub fn new(
        operation: Operation,
        reference_year: i32,
        items: Vec<BenefitLineItem>,
    ) -> BenefitsResult<Self> {
        let mut total = Decimal::ZERO;
        let mut exempt_total = Decimal::ZERO;
        let mut taxable_total = Decimal::ZERO;
        for item in &items {
            let overflow = BenefitsError::InvalidAmount {
                field: "gross_amount",
                value: item.gross_amount,
            };
            total = total.checked_add(item.signed_amount()).ok_or(overflow.clone())?;
            exempt_total = exempt_total
                .checked_add(item.exempt_amount)
                .ok_or(overflow.clone())?;
            taxable_total = taxable_total
                .checked_add(item.taxable_amount)
                .ok_or(overflow)?;
        }
        Ok(Self {
            operation,
            reference_year,
            items,
            total,
            exempt_total,
            taxable_total,
        })
    }

    /// Returns the first item for `concept`, if included.
    pub fn item(&self, concept: Concept) -> Option<&BenefitLineItem> {
        self.items.iter().find(|i| i.concept == concept)
    }
}

/// Input to the annual aguinaldo calculation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AguinaldoRequest {
    pub period: EmploymentPeriod,
}

/// Input to the current vacation entitlement calculation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VacationRequest {
    pub period: EmploymentPeriod,
    /// Date service is measured to.  Defaults to the caller's "today".
    #[serde(default)]
    pub as_of: Option<NaiveDate>,
}

/// Input to a single employee's profit-sharing allocation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PtuRequest {
    pub reference_year: i32,
    /// Company-wide amount to distribute.
    pub pool: Decimal,
    pub employee_days_worked: Decimal,
    pub company_total_days: Decimal,
    pub employee_annual_salary: Decimal,
    pub company_total_salaries: Decimal,
    /// When present the statutory individual cap is applied.
    #[serde(default)]
    pub daily_salary: Option<Decimal>,
    /// Average PTU received over the three previous years.
    #[serde(default)]
    pub trailing_three_year_average: Option<Decimal>,
}

/// Input to a termination settlement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SettlementRequest {
    pub period: EmploymentPeriod,
    pub classification: TerminationClassification,
}

/// Any top-level calculation, tagged by operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "operation", rename_all = "snake_case")]
pub enum CalculationRequest {
    Aguinaldo(AguinaldoRequest),
    Vacation(VacationRequest),
    Ptu(PtuRequest),
    Settlement(SettlementRequest),
}

impl CalculationRequest {
    pub fn reference_year(&self) -> i32 {
        match self {
            CalculationRequest::Aguinaldo(r) => r.period.reference_year,
            CalculationRequest::Vacation(r) => r.period.reference_year,
            CalculationRequest::Ptu(r) => r.reference_year,
            CalculationRequest::Settlement(r) => r.period.reference_year,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn period() -> EmploymentPeriod {
        EmploymentPeriod {
            hire_date: NaiveDate::from_ymd_opt(2020, 3, 1),
            termination_date: None,
            daily_salary: dec!(500),
            reference_year: 2024,
        }
    }

    #[test]
    fn validate_returns_hire_date() {
        assert_eq!(period().validate(), Ok(NaiveDate::from_ymd_opt(2020, 3, 1).unwrap()));
    }

    #[test]
    fn validate_rejects_missing_hire_date() {
        let p = EmploymentPeriod {
            hire_date: None,
            ..period()
        };
        assert_eq!(
            p.validate(),
            Err(BenefitsError::MissingRequiredInput("hire_date"))
        );
    }

    #[test]
    fn validate_distinguishes_zero_and_negative_salary() {
        let zero = EmploymentPeriod {
            daily_salary: Decimal::ZERO,
            ..period()
        };
        assert_eq!(
            zero.validate(),
            Err(BenefitsError::MissingRequiredInput("daily_salary"))
        );

        let negative = EmploymentPeriod {
            daily_salary: dec!(-1),
            ..period()
        };
        assert!(matches!(
            negative.validate(),
            Err(BenefitsError::InvalidAmount { field: "daily_salary", .. })
        ));
    }

    #[test]
    fn validate_rejects_termination_before_hire() {
        let p = EmploymentPeriod {
            termination_date: NaiveDate::from_ymd_opt(2019, 12, 31),
            ..period()
        };
        assert!(matches!(p.validate(), Err(BenefitsError::InvalidRange { .. })));
    }

    #[test]
    fn line_item_rounds_gross_to_cents() {
        let item = BenefitLineItem::new(Concept::Aguinaldo, dec!(7.438356164), dec!(500)).unwrap();
        assert_eq!(item.days, dec!(7.4384));
        assert_eq!(item.gross_amount, dec!(3719.20));
        assert_eq!(item.gross_amount, round_money(item.days * item.daily_rate));
        assert_eq!(item.taxable_amount, item.gross_amount);
        assert_eq!(item.label, "Aguinaldo");
    }

    #[test]
    fn line_item_overflow_is_an_error() {
        let salary = Decimal::MAX / dec!(10);
        assert_eq!(
            BenefitLineItem::new(Concept::TwentyDaysPerYear, dec!(100), salary),
            Err(BenefitsError::InvalidAmount {
                field: "daily_rate",
                value: salary,
            })
        );
    }

    #[test]
    fn exempt_amount_is_clamped_to_gross() {
        let item = BenefitLineItem::lump_sum(Concept::ProfitSharing, dec!(100)).with_exempt_amount(dec!(250));
        assert_eq!(item.exempt_amount, dec!(100));
        assert_eq!(item.taxable_amount, Decimal::ZERO);
    }

    #[test]
    fn total_negates_deductions() {
        let pay = BenefitLineItem::lump_sum(Concept::PendingSalary, dec!(1000));
        let deduction = BenefitLineItem {
            is_deduction: true,
            ..BenefitLineItem::lump_sum(Concept::PendingSalary, dec!(300))
        };
        let result = CalculationResult::new(Operation::Settlement, 2024, vec![pay, deduction]).unwrap();
        assert_eq!(result.total, dec!(700));
    }

    #[test]
    fn totals_split_exempt_and_taxable() {
        let bonus = BenefitLineItem::lump_sum(Concept::Aguinaldo, dec!(3750)).with_exempt_amount(dec!(3257.10));
        let salary = BenefitLineItem::lump_sum(Concept::PendingSalary, dec!(500));
        let result = CalculationResult::new(Operation::Settlement, 2024, vec![bonus, salary]).unwrap();
        assert_eq!(result.exempt_total, dec!(3257.10));
        assert_eq!(result.taxable_total, dec!(992.90));
        assert_eq!(result.exempt_total + result.taxable_total, result.total);
    }

    #[test]
    fn total_overflow_is_an_error() {
        let half = BenefitLineItem::lump_sum(Concept::PendingSalary, Decimal::MAX / dec!(2) + dec!(1));
        let result = CalculationResult::new(Operation::Settlement, 2024, vec![half.clone(), half]);
        assert!(matches!(result, Err(BenefitsError::InvalidAmount { .. })));
    }

    #[test]
    fn request_is_tagged_by_operation() {
        let json = serde_json::json!({
            "operation": "settlement",
            "period": {
                "hire_date": "2019-06-01",
                "termination_date": "2024-06-15",
                "daily_salary": "500",
                "reference_year": 2024
            },
            "classification": "unjustified_dismissal"
        });
        let request: CalculationRequest = serde_json::from_value(json).unwrap();
        assert_eq!(request.reference_year(), 2024);
        assert!(matches!(
            request,
            CalculationRequest::Settlement(SettlementRequest {
                classification: TerminationClassification::UnjustifiedDismissal,
                ..
            })
        ));
    }
}
