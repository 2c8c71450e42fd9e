//! Company API handlers
//!
//! Create and list companies. There is no update or delete.

use crate::db::StoreError;
use crate::error::AppError;
use crate::models::{Company, CompanyCreate};
use crate::state::AppState;
use axum::{
    extract::{rejection::JsonRejection, State},
    response::Json,
};
use tracing::info;

/// POST /companies - Create a company
///
/// Returns the payload as persisted. A second create with the same
/// `companyId` is a conflict and leaves the stored record untouched.
pub async fn create_company(
    State(state): State<AppState>,
    payload: Result<Json<CompanyCreate>, JsonRejection>,
) -> Result<Json<CompanyCreate>, AppError> {
    let Json(company) = payload?;
    company.validate().map_err(AppError::Validation)?;

    match state.store.insert_company(&company).await {
        Ok(()) => {
            info!(company_id = %company.company_id, "Company created");
            Ok(Json(company))
        }
        Err(StoreError::DuplicateKey(_)) => Err(AppError::Conflict(
            "A company with this companyId already exists.".to_string(),
        )),
        Err(e) => Err(e.into()),
    }
}

/// GET /companies - List companies
pub async fn list_companies(
    State(state): State<AppState>,
) -> Result<Json<Vec<Company>>, AppError> {
    let companies = state.store.list_companies(state.query_limit).await?;
    Ok(Json(companies))
}
