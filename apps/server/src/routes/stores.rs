//! Store master and open/close lifecycle handlers.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use serde_json::json;
use tracing::info;

use crate::auth::AuthUser;
use crate::error::ApiError;
use crate::state::AppState;
use backbar_core::types::parse_business_date;
use backbar_core::validation::{validate_code, validate_email, validate_name, validate_phone};
use backbar_core::{CoreError, Store};
use backbar_db::repository::store::StoreInput;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreBody {
    pub store_code: Option<String>,
    pub store_name: String,
    pub address: Option<String>,
    pub area: Option<String>,
    pub zone: Option<String>,
    pub district: Option<String>,
    pub city: Option<String>,
    pub pin: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub gst_number: Option<String>,
    pub store_type: Option<String>,
    pub status: Option<bool>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OpenBody {
    /// ISO or DD-MM-YYYY.
    pub business_date: String,
    pub user_name: Option<String>,
}

impl StoreBody {
    fn validate(&self) -> Result<(), ApiError> {
        validate_name("storeName", &self.store_name).map_err(CoreError::from)?;
        if let Some(phone) = self.phone.as_deref() {
            validate_phone(phone).map_err(CoreError::from)?;
        }
        if let Some(email) = self.email.as_deref() {
            validate_email(email).map_err(CoreError::from)?;
        }
        Ok(())
    }

    fn to_input(&self, store_code: String) -> StoreInput {
        StoreInput {
            store_code,
            store_name: self.store_name.trim().to_string(),
            address: self.address.clone(),
            area: self.area.clone(),
            zone: self.zone.clone(),
            district: self.district.clone(),
            city: self.city.clone(),
            pin: self.pin.clone(),
            phone: self.phone.clone(),
            email: self.email.clone(),
            gst_number: self.gst_number.clone(),
            store_type: self.store_type.clone(),
            status: self.status.unwrap_or(true),
        }
    }
}

/// GET /api/stores
pub async fn list(
    State(state): State<AppState>,
    _user: AuthUser,
) -> Result<Json<Vec<Store>>, ApiError> {
    Ok(Json(state.db.stores().list().await?))
}

/// GET /api/stores/:code
pub async fn get(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(code): Path<String>,
) -> Result<Json<Store>, ApiError> {
    state
        .db
        .stores()
        .get_by_code(&code)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("Store not found: {}", code)))
}

/// POST /api/stores
pub async fn create(
    State(state): State<AppState>,
    _user: AuthUser,
    Json(body): Json<StoreBody>,
) -> Result<(StatusCode, Json<Store>), ApiError> {
    let code = body
        .store_code
        .as_deref()
        .ok_or_else(|| ApiError::BadRequest("storeCode is required".to_string()))?
        .trim()
        .to_string();
    validate_code("storeCode", &code).map_err(CoreError::from)?;
    body.validate()?;

    let store = state.db.stores().insert(&body.to_input(code)).await?;
    Ok((StatusCode::CREATED, Json(store)))
}

/// PUT /api/stores/:code
pub async fn update(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(code): Path<String>,
    Json(body): Json<StoreBody>,
) -> Result<Json<Store>, ApiError> {
    body.validate()?;
    let store = state.db.stores().update(&code, &body.to_input(code.clone())).await?;
    Ok(Json(store))
}

/// POST /api/stores/:code/open
///
/// A closed → open transition advances the business date and seeds the DSR
/// for that date; re-opening an already open store just updates the date.
pub async fn open(
    State(state): State<AppState>,
    user: AuthUser,
    Path(code): Path<String>,
    Json(body): Json<OpenBody>,
) -> Result<Json<Store>, ApiError> {
    let date = parse_business_date(&body.business_date)?;
    let was_open = state.db.stores().open(&code, date).await?;

    if !was_open {
        let opener = body.user_name.clone().unwrap_or(user.user_name);
        info!(store_code = %code, %date, "Store opened, seeding DSR");
        state.db.dsr().populate(&code, date, Some(&opener)).await?;
    }

    state
        .db
        .stores()
        .get_by_code(&code)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("Store not found: {}", code)))
}

/// POST /api/stores/:code/close
pub async fn close(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(code): Path<String>,
) -> Result<Json<serde_json::Value>, ApiError> {
    state.db.stores().close(&code).await?;
    info!(store_code = %code, "Store closed");
    Ok(Json(json!({ "success": true })))
}

/// DELETE /api/stores/:code - soft delete.
pub async fn deactivate(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(code): Path<String>,
) -> Result<Json<serde_json::Value>, ApiError> {
    state.db.stores().deactivate(&code).await?;
    Ok(Json(json!({ "success": true })))
}
