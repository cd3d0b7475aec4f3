//! Ledger account handlers.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use serde_json::json;

use crate::auth::AuthUser;
use crate::error::ApiError;
use crate::state::AppState;
use backbar_core::validation::{validate_code, validate_name};
use backbar_core::{CoreError, Ledger, LedgerKind};
use backbar_db::repository::ledger::LedgerInput;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerBody {
    pub code: Option<String>,
    pub name: String,
    pub kind: LedgerKind,
    pub screen: Option<String>,
    #[serde(default)]
    pub sort_order: i64,
    pub status: Option<bool>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScreenQuery {
    pub kind: LedgerKind,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReorderBody {
    pub codes: Vec<String>,
}

impl LedgerBody {
    fn to_input(&self, code: String) -> LedgerInput {
        LedgerInput {
            code,
            name: self.name.trim().to_string(),
            kind: self.kind,
            screen: self.screen.clone(),
            sort_order: self.sort_order,
            status: self.status.unwrap_or(true),
        }
    }
}

/// GET /api/ledgers
pub async fn list(
    State(state): State<AppState>,
    _user: AuthUser,
) -> Result<Json<Vec<Ledger>>, ApiError> {
    Ok(Json(state.db.ledgers().list().await?))
}

/// GET /api/ledgers/screen/:screen?kind= - the entry screens load their
/// section rows from here.
pub async fn list_for_screen(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(screen): Path<String>,
    Query(query): Query<ScreenQuery>,
) -> Result<Json<Vec<Ledger>>, ApiError> {
    Ok(Json(
        state.db.ledgers().list_for_screen(query.kind, &screen).await?,
    ))
}

/// POST /api/ledgers
pub async fn create(
    State(state): State<AppState>,
    _user: AuthUser,
    Json(body): Json<LedgerBody>,
) -> Result<(StatusCode, Json<Ledger>), ApiError> {
    let code = body
        .code
        .as_deref()
        .ok_or_else(|| ApiError::BadRequest("code is required".to_string()))?
        .trim()
        .to_string();
    validate_code("code", &code).map_err(CoreError::from)?;
    validate_name("name", &body.name).map_err(CoreError::from)?;

    let ledger = state.db.ledgers().insert(&body.to_input(code)).await?;
    Ok((StatusCode::CREATED, Json(ledger)))
}

/// PUT /api/ledgers/:code
pub async fn update(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(code): Path<String>,
    Json(body): Json<LedgerBody>,
) -> Result<Json<Ledger>, ApiError> {
    validate_name("name", &body.name).map_err(CoreError::from)?;
    let ledger = state
        .db
        .ledgers()
        .update(&code, &body.to_input(code.clone()))
        .await?;
    Ok(Json(ledger))
}

/// POST /api/ledgers/reorder
pub async fn reorder(
    State(state): State<AppState>,
    _user: AuthUser,
    Json(body): Json<ReorderBody>,
) -> Result<Json<serde_json::Value>, ApiError> {
    state.db.ledgers().reorder(&body.codes).await?;
    Ok(Json(json!({ "success": true })))
}
