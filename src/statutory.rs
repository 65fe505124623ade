//! Statutory constants and year-versioned tables.
//!
//! The `statutory` module holds the legally fixed values of the Ley
//! Federal del Trabajo together with the values that change every year
//! (chiefly the UMA).  Tables are stored externally as one JSON file per
//! reference year and loaded into a [`StatutoryCatalog`] so that an
//! annual legal update never requires a code change.

use crate::error::{BenefitsError, BenefitsResult};
use anyhow::{Context, Result};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::{debug, warn};

/// The constants a calculation year is evaluated with.
///
/// Rates are fractions (`0.25` is 25%); `*_units` fields count UMAs
/// (days of the daily reference unit value).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatutoryConstants {
    pub minimum_annual_bonus_days: u32,
    pub vacation_premium_rate: Decimal,
    /// Daily UMA in pesos for the reference year.
    pub daily_reference_unit_value: Decimal,
    pub aguinaldo_exemption_units: u32,
    pub vacation_premium_exemption_units: u32,
    pub seniority_premium_rate_cap_units: u32,
    pub profit_sharing_exemption_units: u32,
    /// Exempt UMAs per year of service for separation payments.
    pub separation_exemption_units_per_year: u32,
    /// Days of salary forming the individual PTU cap.
    pub profit_sharing_cap_days: u32,
}

impl StatutoryConstants {
    /// UMA-denominated ceiling in pesos, saturating at `Decimal::MAX`.
    pub fn units_to_pesos(&self, units: u32) -> Decimal {
        Decimal::from(units)
            .checked_mul(self.daily_reference_unit_value)
            .unwrap_or(Decimal::MAX)
    }

    fn validate(&self) -> std::result::Result<(), String> {
        if self.vacation_premium_rate < Decimal::ZERO {
            return Err("vacation_premium_rate must not be negative".into());
        }
        if self.daily_reference_unit_value <= Decimal::ZERO {
            return Err("daily_reference_unit_value must be positive".into());
        }
        let units = [
            ("minimum_annual_bonus_days", self.minimum_annual_bonus_days),
            ("aguinaldo_exemption_units", self.aguinaldo_exemption_units),
            (
                "vacation_premium_exemption_units",
                self.vacation_premium_exemption_units,
            ),
            (
                "seniority_premium_rate_cap_units",
                self.seniority_premium_rate_cap_units,
            ),
            (
                "profit_sharing_exemption_units",
                self.profit_sharing_exemption_units,
            ),
            (
                "separation_exemption_units_per_year",
                self.separation_exemption_units_per_year,
            ),
            ("profit_sharing_cap_days", self.profit_sharing_cap_days),
        ];
        match units.iter().find(|(_, value)| *value == 0) {
            Some((name, _)) => Err(format!("{name} must be positive")),
            None => Ok(()),
        }
    }
}

/// One step of the vacation entitlement table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VacationBreakpoint {
    pub minimum_years_of_service: u32,
    pub vacation_days: u32,
}

/// Everything needed to calculate benefits for one reference year.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatutoryTable {
    pub reference_year: i32,
    pub constants: StatutoryConstants,
    /// Sorted by ascending `minimum_years_of_service`.
    pub vacation_table: Vec<VacationBreakpoint>,
}

impl StatutoryTable {
    /// Checks constant ranges and vacation table ordering.
    pub fn validate(&self) -> BenefitsResult<()> {
        let invalid = |reason: String| BenefitsError::InvalidTable {
            year: self.reference_year,
            reason,
        };
        self.constants.validate().map_err(&invalid)?;
        if self.vacation_table.is_empty() {
            return Err(invalid("vacation table is empty".into()));
        }
        for pair in self.vacation_table.windows(2) {
            if pair[1].minimum_years_of_service <= pair[0].minimum_years_of_service {
                return Err(invalid(format!(
                    "vacation thresholds not ascending at {} years",
                    pair[1].minimum_years_of_service
                )));
            }
            if pair[1].vacation_days < pair[0].vacation_days {
                return Err(invalid(format!(
                    "vacation days decrease at {} years",
                    pair[1].minimum_years_of_service
                )));
            }
        }
        Ok(())
    }
}

/// Validated tables keyed by reference year.
#[derive(Debug, Clone, Default)]
pub struct StatutoryCatalog {
    tables: BTreeMap<i32, StatutoryTable>,
}

impl StatutoryCatalog {
    /// Builds a catalog, rejecting the first invalid table.  A later
    /// table for the same year replaces an earlier one.
    pub fn from_tables(tables: impl IntoIterator<Item = StatutoryTable>) -> BenefitsResult<Self> {
        let mut map = BTreeMap::new();
        for table in tables {
            table.validate()?;
            map.insert(table.reference_year, table);
        }
        Ok(Self { tables: map })
    }

    pub fn get(&self, year: i32) -> BenefitsResult<&StatutoryTable> {
        self.tables
            .get(&year)
            .ok_or(BenefitsError::UnknownReferenceYear(year))
    }

    pub fn years(&self) -> Vec<i32> {
        self.tables.keys().copied().collect()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }
}

/// Load all statutory tables from a directory.
///
/// Every `.json` file is parsed as a [`StatutoryTable`].  Files that do
/// not parse are skipped with a warning; a table that parses but breaks
/// a table invariant fails the whole load.
pub fn load_tables_from_dir(path: &Path) -> Result<StatutoryCatalog> {
    let mut tables = Vec::new();
    if path.is_dir() {
        for entry in std::fs::read_dir(path)? {
            let entry = entry?;
            let file = entry.path();
            if !entry.file_type()?.is_file() || file.extension().map_or(true, |ext| ext != "json") {
                continue;
            }
            let data = std::fs::read_to_string(&file)
                .with_context(|| format!("reading {}", file.display()))?;
            match serde_json::from_str::<StatutoryTable>(&data) {
                Ok(table) => {
                    debug!(year = table.reference_year, file = %file.display(), "loaded statutory table");
                    tables.push(table);
                }
                Err(err) => warn!(file = %file.display(), %err, "skipping unparsable statutory table"),
            }
        }
    } else {
        warn!(path = %path.display(), "statutory table directory not found");
    }
    let catalog = StatutoryCatalog::from_tables(tables)?;
    Ok(catalog)
}
