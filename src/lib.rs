//! Benefits Engine library crate.
//!
//! This crate implements the statutory benefit arithmetic of Mexico's
//! Ley Federal del Trabajo: aguinaldo, vacation pay and premium,
//! profit sharing (PTU) and termination settlements.  External
//! applications may call into `engine::calculate` directly or embed the
//! API via `api::build_router`.
//!
//! Amounts produced here are advisory; nothing is posted, filed or
//! remitted.

pub mod error;
pub mod models;
pub mod statutory;
pub mod proration;
pub mod exemption;
pub mod vacation;
pub mod ptu;
pub mod settlement;
pub mod engine;
pub mod api;

pub use error::{BenefitsError, BenefitsResult};
pub use models::{
    BenefitLineItem, CalculationRequest, CalculationResult, Concept, EmploymentPeriod,
    SettlementResult, TerminationClassification,
};
pub use statutory::{StatutoryCatalog, StatutoryConstants, StatutoryTable, VacationBreakpoint};
