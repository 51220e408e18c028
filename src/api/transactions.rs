// src/api/transactions.rs

use actix_web::{HttpResponse, get, web};
use serde::Deserialize;
use serde_json::json;
use utoipa::IntoParams;

use crate::api::require_email;
use crate::error::ApiError;
use crate::{AppState, wallet};

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct EmailQuery {
    /// Account email
    pub email: Option<String>,
}

#[utoipa::path(
    get,
    path = "/api/transactions",
    tag = "wallet",
    params(EmailQuery),
    responses(
        (status = 200, description = "Deposits and spending, newest first, with the balance"),
        (status = 400, description = "Missing or invalid email")
    )
)]
#[get("/api/transactions")]
pub async fn list_transactions(
    state: web::Data<AppState>,
    query: web::Query<EmailQuery>,
) -> Result<HttpResponse, ApiError> {
    let email = require_email(query.email.as_deref())?;
    let (transactions, summary) = wallet::history(&state.paystack, &state.ledger, &email).await?;

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "transactions": transactions,
        "totalDeposits": summary.total_deposits,
        "totalSpending": summary.total_spending,
        "balance": summary.balance,
    })))
}

#[utoipa::path(
    get,
    path = "/api/transactions/totals",
    tag = "wallet",
    params(EmailQuery),
    responses(
        (status = 200, description = "Wallet totals and balance"),
        (status = 400, description = "Missing or invalid email")
    )
)]
#[get("/api/transactions/totals")]
pub async fn transaction_totals(
    state: web::Data<AppState>,
    query: web::Query<EmailQuery>,
) -> Result<HttpResponse, ApiError> {
    let email = require_email(query.email.as_deref())?;
    let summary = wallet::summarize(&state.paystack, &state.ledger, &email).await?;

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "totalDeposits": summary.total_deposits,
        "totalSpending": summary.total_spending,
        "balance": summary.balance,
    })))
}
