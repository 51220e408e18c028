// src/api/payments.rs
//
// Wallet top-ups: M-Pesa STK push and card checkout, both through Paystack.

use actix_web::{HttpResponse, get, post, web};
use serde::Deserialize;
use serde_json::json;
use utoipa::ToSchema;

use crate::api::require_email;
use crate::currency::{self, round2};
use crate::error::ApiError;
use crate::paystack::Verification;
use crate::{AppState, phone};

#[derive(Debug, Deserialize, ToSchema)]
pub struct MpesaChargeRequest {
    /// 07XXXXXXXX, 2547XXXXXXXX or +2547XXXXXXXX
    pub phone: String,
    /// KES
    pub amount: f64,
    /// Account email the deposit is credited to
    pub email: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct SubmitOtpRequest {
    pub otp: String,
    pub reference: String,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CardInitializeRequest {
    pub email: String,
    pub amount: f64,
    /// Currency of `amount`; converted to KES before charging. Defaults to KES.
    pub currency: Option<String>,
    pub callback_url: Option<String>,
}

fn check_deposit(amount: f64, min_deposit: f64) -> Result<f64, ApiError> {
    if !amount.is_finite() || amount <= 0.0 {
        return Err(ApiError::bad_request("Amount must be a positive number"));
    }
    let amount = round2(amount);
    if amount < min_deposit {
        return Err(ApiError::bad_request(format!(
            "Minimum deposit is KES {min_deposit}"
        )));
    }
    Ok(amount)
}

fn verification_body(v: Verification) -> serde_json::Value {
    json!({
        "success": true,
        "paid": v.is_successful(),
        "status": v.status,
        "reference": v.reference,
        "amount": v.amount,
        "currency": v.currency,
        "channel": v.channel,
        "gatewayResponse": v.gateway_response,
        "paidAt": v.paid_at,
        "email": v.customer_email,
        "data": v.raw,
    })
}

fn require_reference(reference: &str) -> Result<&str, ApiError> {
    let reference = reference.trim();
    if reference.is_empty() {
        return Err(ApiError::bad_request("Payment reference is required"));
    }
    Ok(reference)
}

#[utoipa::path(
    post,
    path = "/api/mpesa/charge",
    tag = "payments",
    request_body = MpesaChargeRequest,
    responses(
        (status = 200, description = "STK push sent to the phone"),
        (status = 400, description = "Invalid phone, email or amount"),
        (status = 500, description = "Gateway error")
    )
)]
#[post("/api/mpesa/charge")]
pub async fn mpesa_charge(
    state: web::Data<AppState>,
    payload: web::Json<MpesaChargeRequest>,
) -> Result<HttpResponse, ApiError> {
    let payload = payload.into_inner();

    if !phone::validate_phone(&payload.phone) {
        return Err(ApiError::bad_request(
            "Invalid phone number. Use 07XXXXXXXX or 2547XXXXXXXX",
        ));
    }
    let amount = check_deposit(payload.amount, state.config.min_deposit_kes)?;
    let email = require_email(payload.email.as_deref())?;
    let msisdn = phone::normalize_phone(&payload.phone);

    log::info!("mpesa charge email={email} phone={msisdn} amount={amount}");
    let outcome = state
        .paystack
        .charge_mobile_money(
            &email,
            &phone::to_international(&payload.phone),
            amount,
            json!({ "phone": msisdn, "email": email, "purpose": "wallet_deposit" }),
        )
        .await?;

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "reference": outcome.reference,
        "status": outcome.status,
        "message": outcome
            .display_text
            .unwrap_or_else(|| "Check your phone and enter your M-Pesa PIN".to_string()),
    })))
}

#[utoipa::path(
    get,
    path = "/api/mpesa/verify/{reference}",
    tag = "payments",
    params(("reference" = String, Path, description = "Gateway reference")),
    responses(
        (status = 200, description = "Current payment status"),
        (status = 500, description = "Gateway error")
    )
)]
#[get("/api/mpesa/verify/{reference}")]
pub async fn mpesa_verify(
    state: web::Data<AppState>,
    reference: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let reference = require_reference(&reference)?;
    let verification = state.paystack.verify(reference).await?;
    log::info!(
        "mpesa verify reference={} status={}",
        verification.reference,
        verification.status
    );
    Ok(HttpResponse::Ok().json(verification_body(verification)))
}

#[utoipa::path(
    post,
    path = "/api/mpesa/submit-otp",
    tag = "payments",
    request_body = SubmitOtpRequest,
    responses(
        (status = 200, description = "OTP accepted by the gateway"),
        (status = 400, description = "Missing otp or reference")
    )
)]
#[post("/api/mpesa/submit-otp")]
pub async fn mpesa_submit_otp(
    state: web::Data<AppState>,
    payload: web::Json<SubmitOtpRequest>,
) -> Result<HttpResponse, ApiError> {
    let otp = payload.otp.trim();
    if otp.is_empty() {
        return Err(ApiError::bad_request("OTP is required"));
    }
    let reference = require_reference(&payload.reference)?;

    let outcome = state.paystack.submit_otp(otp, reference).await?;
    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "reference": outcome.reference,
        "status": outcome.status,
        "message": outcome.display_text,
    })))
}

#[utoipa::path(
    post,
    path = "/api/card/initialize",
    tag = "payments",
    request_body = CardInitializeRequest,
    responses(
        (status = 200, description = "Checkout URL created"),
        (status = 400, description = "Invalid email, amount or currency")
    )
)]
#[post("/api/card/initialize")]
pub async fn card_initialize(
    state: web::Data<AppState>,
    payload: web::Json<CardInitializeRequest>,
) -> Result<HttpResponse, ApiError> {
    let payload = payload.into_inner();
    let email = require_email(Some(&payload.email))?;

    let code = payload
        .currency
        .as_deref()
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .unwrap_or("KES")
        .to_uppercase();
    let amount_kes = currency::convert_to_kes(payload.amount, &code)
        .ok_or_else(|| ApiError::bad_request(format!("Unsupported currency: {code}")))?;
    let amount_kes = check_deposit(amount_kes, state.config.min_deposit_kes)?;

    let callback_url = payload
        .callback_url
        .as_deref()
        .filter(|u| !u.trim().is_empty())
        .or(state.config.card_callback_url.as_deref());

    log::info!("card initialize email={email} amount_kes={amount_kes} currency={code}");
    let checkout = state
        .paystack
        .initialize_card(
            &email,
            amount_kes,
            callback_url,
            json!({
                "email": email,
                "purpose": "wallet_deposit",
                "original_amount": payload.amount,
                "original_currency": code,
            }),
        )
        .await?;

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "authorizationUrl": checkout.authorization_url,
        "accessCode": checkout.access_code,
        "reference": checkout.reference,
        "amount": amount_kes,
        "currency": "KES",
    })))
}

#[utoipa::path(
    get,
    path = "/api/card/verify/{reference}",
    tag = "payments",
    params(("reference" = String, Path, description = "Gateway reference")),
    responses((status = 200, description = "Current payment status"))
)]
#[get("/api/card/verify/{reference}")]
pub async fn card_verify(
    state: web::Data<AppState>,
    reference: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let reference = require_reference(&reference)?;
    let verification = state.paystack.verify(reference).await?;
    log::info!(
        "card verify reference={} status={}",
        verification.reference,
        verification.status
    );
    Ok(HttpResponse::Ok().json(verification_body(verification)))
}
