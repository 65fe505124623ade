//! Splitting benefit amounts into exempt and taxable portions.
//!
//! Income-tax exemptions for statutory benefits are expressed as a
//! number of UMAs.  The exempt portion is the gross amount up to that
//! ceiling and the remainder is taxable.

use crate::error::{BenefitsError, BenefitsResult};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Exempt and taxable portions of a gross amount.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExemptionSplit {
    pub exempt_amount: Decimal,
    pub taxable_amount: Decimal,
}

fn check_gross(gross_amount: Decimal) -> BenefitsResult<()> {
    if gross_amount < Decimal::ZERO {
        return Err(BenefitsError::InvalidAmount {
            field: "gross_amount",
            value: gross_amount,
        });
    }
    Ok(())
}

/// Exemption ceiling in pesos; an out-of-range ceiling exempts everything.
fn ceiling(exemption_units: Decimal, reference_unit_value: Decimal) -> Decimal {
    exemption_units
        .checked_mul(reference_unit_value)
        .unwrap_or(Decimal::MAX)
}

/// Splits `gross_amount` against a ceiling of `exemption_units` UMAs.
pub fn split(
    gross_amount: Decimal,
    exemption_units: Decimal,
    reference_unit_value: Decimal,
) -> BenefitsResult<ExemptionSplit> {
    check_gross(gross_amount)?;
    let limit = ceiling(exemption_units, reference_unit_value);
    let exempt_amount = gross_amount.min(limit).max(Decimal::ZERO);
    Ok(ExemptionSplit {
        exempt_amount,
        taxable_amount: (gross_amount - exempt_amount).max(Decimal::ZERO),
    })
}

/// Splits several amounts that share one ceiling, consuming it in order.
///
/// Used for separation payments, whose exemption is a single allowance
/// per year of service rather than one per concept.
pub fn split_shared(
    gross_amounts: &[Decimal],
    exemption_units: Decimal,
    reference_unit_value: Decimal,
) -> BenefitsResult<Vec<ExemptionSplit>> {
    let mut remaining = ceiling(exemption_units, reference_unit_value).max(Decimal::ZERO);
    gross_amounts
        .iter()
        .map(|&gross| {
            check_gross(gross)?;
            let exempt_amount = gross.min(remaining);
            remaining -= exempt_amount;
            Ok(ExemptionSplit {
                exempt_amount,
                taxable_amount: gross - exempt_amount,
            })
        })
        .collect()
}
