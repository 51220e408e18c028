// src/api/webhooks.rs
//
// Paystack event callbacks. Balances are derived from the gateway on every
// read, so events are only authenticated, logged and acknowledged.

use actix_web::{HttpRequest, HttpResponse, post, web};
use serde::Deserialize;
use serde_json::json;

use crate::error::ApiError;
use crate::paystack::{self, from_minor};
use crate::AppState;

pub const SIGNATURE_HEADER: &str = "x-paystack-signature";

#[derive(Debug, Deserialize)]
pub struct GatewayEvent {
    pub event: String,
    #[serde(default)]
    pub data: EventData,
}

#[derive(Debug, Default, Deserialize)]
pub struct EventData {
    #[serde(default)]
    pub reference: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub amount: Option<i64>,
    #[serde(default)]
    pub channel: Option<String>,
    #[serde(default)]
    pub customer: Option<EventCustomer>,
}

#[derive(Debug, Default, Deserialize)]
pub struct EventCustomer {
    #[serde(default)]
    pub email: Option<String>,
}

impl GatewayEvent {
    pub fn customer_email(&self) -> Option<&str> {
        self.data.customer.as_ref().and_then(|c| c.email.as_deref())
    }

    /// Amount in KES.
    pub fn amount(&self) -> Option<f64> {
        self.data.amount.map(from_minor)
    }
}

pub fn parse_event(body: &[u8]) -> Result<GatewayEvent, serde_json::Error> {
    serde_json::from_slice(body)
}

pub fn signature_header(req: &HttpRequest) -> Option<&str> {
    req.headers()
        .get(SIGNATURE_HEADER)
        .and_then(|h| h.to_str().ok())
}

#[utoipa::path(
    post,
    path = "/api/paystack/webhook",
    tag = "payments",
    params(("x-paystack-signature" = String, Header, description = "Hex HMAC-SHA512 of the raw body")),
    request_body(content = String, content_type = "application/json", description = "Raw Paystack event"),
    responses(
        (status = 200, description = "Event acknowledged"),
        (status = 400, description = "Body is not a Paystack event"),
        (status = 401, description = "Missing or invalid signature")
    )
)]
#[post("/api/paystack/webhook")]
pub async fn paystack_webhook(
    req: HttpRequest,
    body: web::Bytes,
    state: web::Data<AppState>,
) -> Result<HttpResponse, ApiError> {
    let Some(signature) = signature_header(&req) else {
        log::warn!("paystack webhook without signature");
        return Err(ApiError::Unauthorized("Missing signature".to_string()));
    };
    if !paystack::verify_signature(state.paystack.secret_key(), &body, signature) {
        log::warn!("paystack webhook with bad signature");
        return Err(ApiError::Unauthorized("Invalid signature".to_string()));
    }

    let event = parse_event(&body).map_err(|e| {
        log::warn!("paystack webhook parse error: {e}");
        ApiError::bad_request("Invalid event payload")
    })?;

    match event.event.as_str() {
        "charge.success" => log::info!(
            "deposit confirmed reference={} email={} amount={} channel={}",
            event.data.reference.as_deref().unwrap_or("-"),
            event.customer_email().unwrap_or("-"),
            event.amount().unwrap_or_default(),
            event.data.channel.as_deref().unwrap_or("-"),
        ),
        other => log::info!(
            "paystack event {other} reference={} status={}",
            event.data.reference.as_deref().unwrap_or("-"),
            event.data.status.as_deref().unwrap_or("-"),
        ),
    }

    Ok(HttpResponse::Ok().json(json!({ "success": true })))
}
