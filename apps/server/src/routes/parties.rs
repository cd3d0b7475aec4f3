//! Party (vendor/customer) handlers.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;

use crate::auth::AuthUser;
use crate::error::ApiError;
use crate::state::AppState;
use backbar_core::validation::{validate_code, validate_email, validate_name, validate_phone};
use backbar_core::{CoreError, Party};
use backbar_db::repository::party::PartyInput;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartyListQuery {
    /// "Vendor" / "Customer"; absent lists everything.
    #[serde(rename = "type")]
    pub party_type: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartyBody {
    pub code: Option<String>,
    pub name: String,
    pub address: Option<String>,
    pub city: Option<String>,
    pub district: Option<String>,
    pub pin: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub pan: Option<String>,
    pub gst_number: Option<String>,
    pub party_type: Option<String>,
    pub status: Option<bool>,
}

impl PartyBody {
    fn validate(&self) -> Result<(), ApiError> {
        validate_name("name", &self.name).map_err(CoreError::from)?;
        if let Some(phone) = self.phone.as_deref() {
            validate_phone(phone).map_err(CoreError::from)?;
        }
        if let Some(email) = self.email.as_deref() {
            validate_email(email).map_err(CoreError::from)?;
        }
        Ok(())
    }

    fn to_input(&self, code: String) -> PartyInput {
        PartyInput {
            code,
            name: self.name.trim().to_string(),
            address: self.address.clone(),
            city: self.city.clone(),
            district: self.district.clone(),
            pin: self.pin.clone(),
            phone: self.phone.clone(),
            email: self.email.clone(),
            pan: self.pan.clone(),
            gst_number: self.gst_number.clone(),
            party_type: self.party_type.clone(),
            status: self.status.unwrap_or(true),
        }
    }
}

/// GET /api/parties?type=Vendor
pub async fn list(
    State(state): State<AppState>,
    _user: AuthUser,
    Query(query): Query<PartyListQuery>,
) -> Result<Json<Vec<Party>>, ApiError> {
    let parties = match query.party_type.as_deref() {
        Some(t) if !t.is_empty() => state.db.parties().list_by_type(t).await?,
        _ => state.db.parties().list().await?,
    };
    Ok(Json(parties))
}

/// POST /api/parties
pub async fn create(
    State(state): State<AppState>,
    _user: AuthUser,
    Json(body): Json<PartyBody>,
) -> Result<(StatusCode, Json<Party>), ApiError> {
    let code = body
        .code
        .as_deref()
        .ok_or_else(|| ApiError::BadRequest("code is required".to_string()))?
        .trim()
        .to_string();
    validate_code("code", &code).map_err(CoreError::from)?;
    body.validate()?;

    let party = state.db.parties().insert(&body.to_input(code)).await?;
    Ok((StatusCode::CREATED, Json(party)))
}

/// PUT /api/parties/:code
pub async fn update(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(code): Path<String>,
    Json(body): Json<PartyBody>,
) -> Result<Json<Party>, ApiError> {
    body.validate()?;
    let party = state.db.parties().update(&code, &body.to_input(code.clone())).await?;
    Ok(Json(party))
}
