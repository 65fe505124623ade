//! HTTP API for the Benefits Engine.
//!
//! This module exposes a minimal REST API around the calculation
//! engine using the [`axum`](https://crates.io/crates/axum) framework.
//! Clients submit a calculation request and receive its line items in
//! JSON.  The statutory tables are loaded from a directory at startup
//! and can be reloaded in place when the annual values change.

use crate::engine::{calculate, run_batch};
use crate::error::BenefitsError;
use crate::models::{
    AguinaldoRequest, CalculationRequest, CalculationResult, PtuRequest, SettlementRequest,
    VacationRequest,
};
use crate::statutory::{load_tables_from_dir, StatutoryCatalog};
use anyhow::Result;
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use serde_json::json;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{info, warn};

/// Application state shared across requests.
pub struct AppState {
    pub tables_dir: PathBuf,
    pub catalog: RwLock<StatutoryCatalog>,
}

/// Per-request outcome of `POST /api/batch`.
#[derive(Debug, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum BatchOutcome {
    Ok { result: CalculationResult },
    Error { error: String },
}

/// Build the API router and load statutory tables from the given
/// directory.  Returns the router and a handle to the state.
pub async fn build_router(tables_dir: PathBuf) -> Result<(Router, Arc<AppState>)> {
    let catalog = load_tables_from_dir(&tables_dir)?;
    if catalog.is_empty() {
        warn!(dir = %tables_dir.display(), "no statutory tables loaded");
    } else {
        info!(years = ?catalog.years(), "loaded statutory tables");
    }
    let state = Arc::new(AppState {
        tables_dir,
        catalog: RwLock::new(catalog),
    });
    let router = Router::new()
        .route("/api/aguinaldo", post(aguinaldo_handler))
        .route("/api/vacation", post(vacation_handler))
        .route("/api/ptu", post(ptu_handler))
        .route("/api/settlement", post(settlement_handler))
        .route("/api/batch", post(batch_handler))
        .route("/api/tables", get(tables_handler))
        .route("/api/tables/reload", post(reload_handler))
        .with_state(state.clone());
    Ok((router, state))
}

fn today() -> chrono::NaiveDate {
    chrono::Local::now().date_naive()
}

fn error_response(err: &BenefitsError) -> Response {
    let status = match err {
        BenefitsError::UnknownReferenceYear(_) => StatusCode::NOT_FOUND,
        BenefitsError::InvalidTable { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        BenefitsError::InvalidRange { .. }
        | BenefitsError::InvalidAmount { .. }
        | BenefitsError::InvalidDivisor { .. }
        | BenefitsError::MissingRequiredInput(_) => StatusCode::UNPROCESSABLE_ENTITY,
    };
    (status, Json(json!({"error": err.to_string()}))).into_response()
}

async fn run(app_state: &AppState, request: CalculationRequest) -> Response {
    let catalog = app_state.catalog.read().await;
    match calculate(&request, &catalog, today()) {
        Ok(result) => (StatusCode::OK, Json(result)).into_response(),
        Err(err) => error_response(&err),
    }
}

/// Handler for POST /api/aguinaldo
async fn aguinaldo_handler(
    State(app_state): State<Arc<AppState>>,
    Json(input): Json<AguinaldoRequest>,
) -> Response {
    run(&app_state, CalculationRequest::Aguinaldo(input)).await
}

/// Handler for POST /api/vacation
async fn vacation_handler(
    State(app_state): State<Arc<AppState>>,
    Json(input): Json<VacationRequest>,
) -> Response {
    run(&app_state, CalculationRequest::Vacation(input)).await
}

/// Handler for POST /api/ptu
async fn ptu_handler(
    State(app_state): State<Arc<AppState>>,
    Json(input): Json<PtuRequest>,
) -> Response {
    run(&app_state, CalculationRequest::Ptu(input)).await
}

/// Handler for POST /api/settlement
async fn settlement_handler(
    State(app_state): State<Arc<AppState>>,
    Json(input): Json<SettlementRequest>,
) -> Response {
    run(&app_state, CalculationRequest::Settlement(input)).await
}

/// Handler for POST /api/batch
async fn batch_handler(
    State(app_state): State<Arc<AppState>>,
    Json(input): Json<Vec<CalculationRequest>>,
) -> Response {
    let catalog = app_state.catalog.read().await;
    let outcomes: Vec<BatchOutcome> = run_batch(&input, &catalog, today())
        .into_iter()
        .map(|outcome| match outcome {
            Ok(result) => BatchOutcome::Ok { result },
            Err(err) => BatchOutcome::Error {
                error: err.to_string(),
            },
        })
        .collect();
    (StatusCode::OK, Json(outcomes)).into_response()
}

/// Handler for GET /api/tables
async fn tables_handler(State(app_state): State<Arc<AppState>>) -> Response {
    let years = app_state.catalog.read().await.years();
    (StatusCode::OK, Json(json!({"years": years}))).into_response()
}

/// Handler for POST /api/tables/reload.  The current catalog is kept
/// when the directory fails to load.
async fn reload_handler(State(app_state): State<Arc<AppState>>) -> Response {
    match load_tables_from_dir(&app_state.tables_dir) {
        Ok(catalog) => {
            let years = catalog.years();
            *app_state.catalog.write().await = catalog;
            info!(?years, "reloaded statutory tables");
            (StatusCode::OK, Json(json!({"years": years}))).into_response()
        }
        Err(err) => {
            warn!(%err, "statutory table reload failed");
            let body = Json(json!({"error": err.to_string()}));
            (StatusCode::INTERNAL_SERVER_ERROR, body).into_response()
        }
    }
}

/// Launch the API server.  This function builds the router from the
/// given table directory and binds to the supplied address.  It
/// blocks until the server terminates (e.g. when interrupted).
pub async fn serve(addr: &str, tables_dir: PathBuf) -> Result<()> {
    let (router, _state) = build_router(tables_dir).await?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(addr, "server listening");
    axum::serve(listener, router).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{EmploymentPeriod, TerminationClassification};
    use crate::statutory::fixtures::table_2024;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;
    use serde_json::Value;

    fn state_with(dir: &tempfile::TempDir) -> Arc<AppState> {
        std::fs::write(
            dir.path().join("mx_2024.json"),
            serde_json::to_string(&table_2024()).unwrap(),
        )
        .unwrap();
        Arc::new(AppState {
            tables_dir: dir.path().to_path_buf(),
            catalog: RwLock::new(load_tables_from_dir(dir.path()).unwrap()),
        })
    }

    async fn body_json(response: Response) -> Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn settlement(reference_year: i32, salary: rust_decimal::Decimal) -> SettlementRequest {
        SettlementRequest {
            period: EmploymentPeriod {
                hire_date: NaiveDate::from_ymd_opt(2019, 6, 1),
                termination_date: NaiveDate::from_ymd_opt(2024, 6, 15),
                daily_salary: salary,
                reference_year,
            },
            classification: TerminationClassification::UnjustifiedDismissal,
        }
    }

    #[tokio::test]
    async fn settlement_returns_line_items() {
        let dir = tempfile::tempdir().unwrap();
        let response = settlement_handler(State(state_with(&dir)), Json(settlement(2024, dec!(500)))).await;
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["operation"], "settlement");
        assert_eq!(body["items"].as_array().unwrap().len(), 7);

        let amount = |key: &str| serde_json::from_value::<rust_decimal::Decimal>(body[key].clone()).unwrap();
        // Aguinaldo 3257.10 + premium 1375 + separation ceiling 48856.50.
        assert_eq!(amount("exempt_total"), dec!(53488.60));
        assert_eq!(amount("taxable_total"), dec!(72664.80));
        assert_eq!(amount("total"), dec!(126153.40));
    }

    #[tokio::test]
    async fn validation_errors_are_unprocessable() {
        let dir = tempfile::tempdir().unwrap();
        let response = settlement_handler(State(state_with(&dir)), Json(settlement(2024, dec!(-5)))).await;
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let body = body_json(response).await;
        assert!(body["error"].as_str().unwrap().contains("daily_salary"));
    }

    #[tokio::test]
    async fn unknown_year_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let response = settlement_handler(State(state_with(&dir)), Json(settlement(2031, dec!(500)))).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn batch_reports_each_outcome() {
        let dir = tempfile::tempdir().unwrap();
        let requests = vec![
            CalculationRequest::Settlement(settlement(2024, dec!(500))),
            CalculationRequest::Settlement(settlement(2031, dec!(500))),
            CalculationRequest::Settlement(settlement(2024, rust_decimal::Decimal::MAX / dec!(10))),
            CalculationRequest::Settlement(settlement(2024, dec!(500))),
        ];
        let response = batch_handler(State(state_with(&dir)), Json(requests)).await;
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body[0]["status"], "ok");
        assert_eq!(body[1]["status"], "error");
        assert_eq!(body[2]["status"], "error");
        assert!(body[2]["error"].as_str().unwrap().contains("invalid amount"));
        assert_eq!(body[3]["status"], "ok");
    }

    #[tokio::test]
    async fn reload_picks_up_new_tables() {
        let dir = tempfile::tempdir().unwrap();
        let state = state_with(&dir);
        let mut table = table_2024();
        table.reference_year = 2025;
        table.constants.daily_reference_unit_value = dec!(113.14);
        std::fs::write(
            dir.path().join("mx_2025.json"),
            serde_json::to_string(&table).unwrap(),
        )
        .unwrap();

        let response = reload_handler(State(state.clone())).await;
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(tables_handler(State(state)).await).await;
        assert_eq!(body["years"], json!([2024, 2025]));
    }
}
