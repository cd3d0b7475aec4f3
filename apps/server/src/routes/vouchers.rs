//! Voucher numbering rule handlers.

use axum::extract::{Path, Query, State};
use axum::Json;
use serde::Deserialize;

use crate::auth::AuthUser;
use crate::error::ApiError;
use crate::routes::sales::resolve_date;
use crate::state::AppState;
use backbar_core::{NumberingScope, ResetFrequency, VoucherRule, VoucherType};
use backbar_db::repository::voucher::VoucherRuleInput;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoucherRuleBody {
    pub voucher_type: VoucherType,
    pub prefix: Option<String>,
    pub suffix: Option<String>,
    #[serde(default = "default_true")]
    pub include_store_code: bool,
    #[serde(default = "default_position")]
    pub store_code_position: i64,
    #[serde(default = "default_true")]
    pub include_year: bool,
    pub year_format: Option<String>,
    #[serde(default)]
    pub include_month: bool,
    pub month_format: Option<String>,
    #[serde(default)]
    pub include_day: bool,
    pub day_format: Option<String>,
    #[serde(default = "default_separator")]
    pub separator: String,
    #[serde(default = "default_padding")]
    pub number_padding: i64,
    #[serde(default)]
    pub reset_frequency: ResetFrequency,
    #[serde(default)]
    pub numbering_scope: NumberingScope,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

fn default_true() -> bool {
    true
}
fn default_position() -> i64 {
    1
}
fn default_separator() -> String {
    "-".to_string()
}
fn default_padding() -> i64 {
    4
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreviewQuery {
    pub store_code: Option<String>,
    pub date: Option<String>,
}

fn parse_voucher_type(raw: &str) -> Result<VoucherType, ApiError> {
    match raw.to_uppercase().as_str() {
        "SALE" => Ok(VoucherType::Sale),
        "PURCHASE" => Ok(VoucherType::Purchase),
        "STOCK_TRANSFER_OUT" => Ok(VoucherType::StockTransferOut),
        "STOCK_TRANSFER_IN" => Ok(VoucherType::StockTransferIn),
        other => Err(ApiError::BadRequest(format!(
            "unknown voucher type: {}",
            other
        ))),
    }
}

/// GET /api/voucher-config/:voucher_type
pub async fn get(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(voucher_type): Path<String>,
) -> Result<Json<VoucherRule>, ApiError> {
    let voucher_type = parse_voucher_type(&voucher_type)?;
    state
        .db
        .vouchers()
        .get_rule(voucher_type)
        .await?
        .map(Json)
        .ok_or_else(|| {
            ApiError::NotFound(format!(
                "no numbering rule for {}",
                voucher_type.as_str()
            ))
        })
}

/// POST /api/voucher-config (admin)
pub async fn save(
    State(state): State<AppState>,
    user: AuthUser,
    Json(body): Json<VoucherRuleBody>,
) -> Result<Json<VoucherRule>, ApiError> {
    user.require_admin()?;

    let rule = state
        .db
        .vouchers()
        .save_rule(&VoucherRuleInput {
            voucher_type: body.voucher_type,
            prefix: body.prefix,
            suffix: body.suffix,
            include_store_code: body.include_store_code,
            store_code_position: body.store_code_position,
            include_year: body.include_year,
            year_format: body.year_format,
            include_month: body.include_month,
            month_format: body.month_format,
            include_day: body.include_day,
            day_format: body.day_format,
            separator: body.separator,
            number_padding: body.number_padding,
            reset_frequency: body.reset_frequency,
            numbering_scope: body.numbering_scope,
            is_active: body.is_active,
        })
        .await?;
    Ok(Json(rule))
}

/// GET /api/voucher-config/:voucher_type/preview?storeCode=
pub async fn preview(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(voucher_type): Path<String>,
    Query(query): Query<PreviewQuery>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let voucher_type = parse_voucher_type(&voucher_type)?;
    let date = resolve_date(query.date.as_deref())?;
    let number = state
        .db
        .vouchers()
        .preview(voucher_type, query.store_code.as_deref(), date)
        .await?;
    Ok(Json(serde_json::json!({ "preview": number })))
}
