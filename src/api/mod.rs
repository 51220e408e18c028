// src/api/mod.rs

pub mod auth;
pub mod catalog;
pub mod payments;
pub mod servers;
pub mod transactions;
pub mod webhooks;

use actix_web::web;

use crate::error::ApiError;

/// Registers every route plus extractor configs that turn malformed input into 400s.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(
        web::JsonConfig::default()
            .error_handler(|err, _req| ApiError::bad_request(format!("Invalid request body: {err}")).into()),
    )
    .app_data(
        web::QueryConfig::default()
            .error_handler(|err, _req| ApiError::bad_request(format!("Invalid query: {err}")).into()),
    )
    .app_data(
        web::PathConfig::default()
            .error_handler(|err, _req| ApiError::bad_request(format!("Invalid path: {err}")).into()),
    )
    .service(catalog::index)
    .service(catalog::list_tiers)
    .service(catalog::list_currencies)
    .service(payments::mpesa_charge)
    .service(payments::mpesa_verify)
    .service(payments::mpesa_submit_otp)
    .service(payments::card_initialize)
    .service(payments::card_verify)
    .service(transactions::list_transactions)
    .service(transactions::transaction_totals)
    .service(auth::login)
    .service(auth::register)
    .service(servers::create_server)
    .service(servers::list_servers)
    .service(servers::delete_server)
    .service(webhooks::paystack_webhook);
}

pub(crate) fn is_plausible_email(email: &str) -> bool {
    let email = email.trim();
    match email.split_once('@') {
        Some((local, domain)) => !local.is_empty() && domain.contains('.') && !domain.starts_with('.'),
        None => false,
    }
}

pub(crate) fn require_email(email: Option<&str>) -> Result<String, ApiError> {
    match email.map(str::trim).filter(|e| !e.is_empty()) {
        Some(e) if is_plausible_email(e) => Ok(e.to_lowercase()),
        Some(_) => Err(ApiError::bad_request("Invalid email address")),
        None => Err(ApiError::bad_request("Email is required")),
    }
}
