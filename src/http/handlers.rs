//! Storefront API handlers.
//!
//! Guarded handlers receive the verified body through the
//! [`Authorized`] extension and parse exactly those bytes.

use axum::{extract::State, Extension, Json};
use serde_json::{json, Number, Value};

use crate::guard::Authorized;
use crate::http::response::{ApiError, ApiResult, EnvelopeError};
use crate::signing::format_number;
use crate::http::server::AppState;

/// Liveness probe.
pub async fn health() -> &'static str {
    "ok"
}

/// `GET /api/layanan`: public service catalog.
pub async fn catalog(State(state): State<AppState>) -> ApiResult<Json<Value>> {
    Ok(Json(state.vendor.catalog().await?))
}

/// `POST /api/layanan/resolve`: service detail when `code` is given, catalog otherwise.
///
/// Success and failure both use the `ok` envelope.
pub async fn resolve_service(
    State(state): State<AppState>,
    Extension(verified): Extension<Authorized>,
) -> Result<Json<Value>, EnvelopeError> {
    let body = parse_body(&verified)?;
    let code = body
        .get("code")
        .and_then(Value::as_str)
        .map(str::trim)
        .unwrap_or_default();

    let result = if code.is_empty() {
        state.vendor.catalog().await?
    } else {
        state.vendor.service_detail(code).await?
    };
    Ok(Json(json!({ "ok": true, "result": result })))
}

/// `GET|POST /api/balance`: reseller balance.
pub async fn balance(
    State(state): State<AppState>,
    Extension(_verified): Extension<Authorized>,
) -> ApiResult<Json<Value>> {
    Ok(Json(state.vendor.balance().await?))
}

/// `POST /api/order`: place an order with the vendor.
pub async fn place_order(
    State(state): State<AppState>,
    Extension(verified): Extension<Authorized>,
) -> ApiResult<Json<Value>> {
    let body = parse_body(&verified)?;
    let order = OrderInput::from_body(&body)?;

    tracing::info!(
        product_id = %order.product_id,
        quantity = %order.quantity,
        "Placing vendor order"
    );
    let response = state
        .vendor
        .order_product(&order.product_id, &order.data, order.quantity)
        .await?;
    Ok(Json(response))
}

/// `POST /api/order/detail`: status of a placed order.
pub async fn order_detail(
    State(state): State<AppState>,
    Extension(verified): Extension<Authorized>,
) -> ApiResult<Json<Value>> {
    let body = parse_body(&verified)?;
    let trx = body
        .get("trx")
        .and_then(Value::as_str)
        .filter(|t| !t.is_empty())
        .ok_or_else(|| ApiError::BadRequest("trx is required".into()))?;

    Ok(Json(state.vendor.order_detail(trx).await?))
}

fn parse_body(verified: &Authorized) -> ApiResult<Value> {
    verified.json().map_err(|_| ApiError::InvalidJson)
}

/// Validated order fields.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderInput {
    pub product_id: String,
    pub data: String,
    pub quantity: Number,
}

impl OrderInput {
    /// Validate in the order the storefront reports problems:
    /// `data`, then `quantity`, then `product_id`.
    pub fn from_body(body: &Value) -> ApiResult<Self> {
        let data = body
            .get("data")
            .and_then(Value::as_str)
            .filter(|d| !d.is_empty())
            .ok_or_else(|| ApiError::BadRequest("data is required".into()))?;

        let quantity = body
            .get("quantity")
            .and_then(positive_quantity)
            .ok_or_else(|| ApiError::BadRequest("quantity must be > 0".into()))?;

        let product_id = body
            .get("product_id")
            .and_then(parse_product_id)
            .ok_or_else(|| ApiError::BadRequest("product_id is required".into()))?;

        Ok(Self {
            product_id,
            data: data.to_string(),
            quantity,
        })
    }
}

/// Accepts a number or numeric string; integral values come back as integers.
fn positive_quantity(value: &Value) -> Option<Number> {
    let q = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) if !s.trim().is_empty() => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    if !q.is_finite() || q <= 0.0 {
        return None;
    }
    if q.fract() == 0.0 && q <= u64::MAX as f64 {
        Some(Number::from(q as u64))
    } else {
        Number::from_f64(q)
    }
}

fn parse_product_id(value: &Value) -> Option<String> {
    let id = match value {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => format_number(n),
        Value::Bool(b) => b.to_string(),
        _ => return None,
    };
    (!id.is_empty()).then_some(id)
}
