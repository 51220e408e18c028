// src/wallet.rs
//
// Wallet balance is never stored: it is the sum of successful gateway
// deposits minus locally recorded spending, floored at zero.

use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;

use crate::currency::round2;
use crate::ledger::{LedgerError, SpendingLedger, SpendingRecord, normalize_email};
use crate::paystack::{GatewayTransaction, PaystackClient, PaystackError};

#[derive(Debug, thiserror::Error)]
pub enum WalletError {
    #[error(transparent)]
    Gateway(#[from] PaystackError),
    #[error(transparent)]
    Ledger(#[from] LedgerError),
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct WalletSummary {
    pub total_deposits: f64,
    pub total_spending: f64,
    pub balance: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Credit,
    Debit,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub id: String,
    pub direction: Direction,
    pub amount: f64,
    pub description: String,
    pub status: String,
    pub date: Option<DateTime<Utc>>,
    pub reference: Option<String>,
    pub channel: Option<String>,
    pub server_id: Option<String>,
}

pub fn compute_balance(total_deposits: f64, total_spending: f64) -> f64 {
    round2((total_deposits - total_spending).max(0.0))
}

pub fn summary_from(deposits: &[GatewayTransaction], spending: &[SpendingRecord]) -> WalletSummary {
    let total_deposits = round2(deposits.iter().map(|d| d.amount).sum());
    let total_spending = round2(spending.iter().map(|s| s.amount).sum());
    WalletSummary {
        total_deposits,
        total_spending,
        balance: compute_balance(total_deposits, total_spending),
    }
}

fn paid_by(tx: &GatewayTransaction, email: &str) -> bool {
    tx.status == "success"
        && tx
            .customer_email
            .as_deref()
            .is_some_and(|e| normalize_email(e) == email)
}

/// Successful deposits made with `email`.
///
/// Asks the gateway to filter by customer first; when that yields nothing the
/// unfiltered page is fetched instead. Both results are filtered by email
/// locally since the gateway filter cannot be relied on.
pub async fn successful_deposits(
    paystack: &PaystackClient,
    email: &str,
) -> Result<Vec<GatewayTransaction>, PaystackError> {
    let email = normalize_email(email);

    let filtered: Vec<_> = paystack
        .list_successful(Some(&email))
        .await?
        .into_iter()
        .filter(|tx| paid_by(tx, &email))
        .collect();
    if !filtered.is_empty() {
        return Ok(filtered);
    }

    log::debug!("customer filter returned nothing for {email}, falling back to full listing");
    Ok(paystack
        .list_successful(None)
        .await?
        .into_iter()
        .filter(|tx| paid_by(tx, &email))
        .collect())
}

pub async fn summarize(
    paystack: &PaystackClient,
    ledger: &SpendingLedger,
    email: &str,
) -> Result<WalletSummary, WalletError> {
    let deposits = successful_deposits(paystack, email).await?;
    let spending = ledger.records_for(email).await?;
    Ok(summary_from(&deposits, &spending))
}

/// Merged credit/debit history, newest first, with the summary it implies.
pub async fn history(
    paystack: &PaystackClient,
    ledger: &SpendingLedger,
    email: &str,
) -> Result<(Vec<Transaction>, WalletSummary), WalletError> {
    let deposits = successful_deposits(paystack, email).await?;
    let spending = ledger.records_for(email).await?;
    let summary = summary_from(&deposits, &spending);
    Ok((merge_history(deposits, spending), summary))
}

fn parse_date(raw: Option<&str>) -> Option<DateTime<Utc>> {
    raw.and_then(|s| DateTime::parse_from_rfc3339(s).ok())
        .map(|d| d.with_timezone(&Utc))
}

pub fn merge_history(
    deposits: Vec<GatewayTransaction>,
    spending: Vec<SpendingRecord>,
) -> Vec<Transaction> {
    let credits = deposits.into_iter().map(|d| Transaction {
        id: d
            .id
            .map(|id| id.to_string())
            .unwrap_or_else(|| d.reference.clone()),
        direction: Direction::Credit,
        amount: d.amount,
        description: match d.channel.as_deref() {
            Some("mobile_money") => "M-Pesa deposit".to_string(),
            Some("card") => "Card deposit".to_string(),
            _ => "Wallet deposit".to_string(),
        },
        status: d.status,
        date: parse_date(d.paid_at.as_deref()).or_else(|| parse_date(d.created_at.as_deref())),
        reference: Some(d.reference),
        channel: d.channel,
        server_id: None,
    });

    let debits = spending.into_iter().enumerate().map(|(i, s)| Transaction {
        id: if s.server_id.is_empty() {
            format!("spend-{}-{i}", s.date.timestamp_millis())
        } else {
            format!("spend-{}", s.server_id)
        },
        direction: Direction::Debit,
        amount: s.amount,
        description: s.description,
        status: "success".to_string(),
        date: Some(s.date),
        reference: None,
        channel: None,
        server_id: Some(s.server_id).filter(|id| !id.is_empty()),
    });

    let mut all: Vec<Transaction> = credits.chain(debits).collect();
    all.sort_by(|a, b| b.date.cmp(&a.date));
    all
}
