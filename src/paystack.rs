// src/paystack.rs
//
// Minimal client for the Paystack REST API (https://api.paystack.co).
// Auth: `Authorization: Bearer <secret key>`. Amounts on the wire are in
// minor units (cents); this module speaks major units to its callers.

use hmac::{Hmac, Mac};
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use sha2::Sha512;
use std::time::Duration;

use crate::currency::round2;

pub const CURRENCY: &str = "KES";
const MOBILE_MONEY_PROVIDER: &str = "mpesa";
const LIST_PAGE_SIZE: u32 = 100;

#[derive(Debug, thiserror::Error)]
pub enum PaystackError {
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("paystack api error status={status} message={message}")]
    Api { status: u16, message: String },
    #[error("paystack rejected request: {0}")]
    Rejected(String),
    #[error("invalid response: {0}")]
    InvalidResponse(String),
}

#[derive(Debug, Deserialize)]
struct Envelope {
    status: bool,
    #[serde(default)]
    message: String,
    #[serde(default)]
    data: Option<Value>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ChargeOutcome {
    pub reference: String,
    pub status: String,
    pub display_text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChargeData {
    reference: String,
    status: String,
    #[serde(default)]
    display_text: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

impl From<ChargeData> for ChargeOutcome {
    fn from(d: ChargeData) -> Self {
        Self {
            reference: d.reference,
            status: d.status,
            display_text: d.display_text.or(d.message),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CardCheckout {
    pub authorization_url: String,
    pub access_code: String,
    pub reference: String,
}

#[derive(Debug, Deserialize)]
struct CustomerData {
    #[serde(default)]
    email: Option<String>,
}

/// A transaction as returned by verify/list endpoints.
#[derive(Debug, Deserialize)]
struct TransactionData {
    #[serde(default)]
    id: Option<i64>,
    reference: String,
    status: String,
    amount: i64,
    #[serde(default)]
    currency: Option<String>,
    #[serde(default)]
    channel: Option<String>,
    #[serde(default)]
    gateway_response: Option<String>,
    #[serde(default)]
    paid_at: Option<String>,
    #[serde(default)]
    created_at: Option<String>,
    #[serde(default)]
    customer: Option<CustomerData>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Verification {
    pub reference: String,
    pub status: String,
    pub amount: f64,
    pub currency: Option<String>,
    pub channel: Option<String>,
    pub gateway_response: Option<String>,
    pub paid_at: Option<String>,
    pub customer_email: Option<String>,
    pub raw: Value,
}

impl Verification {
    pub fn is_successful(&self) -> bool {
        self.status == "success"
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct GatewayTransaction {
    pub id: Option<i64>,
    pub reference: String,
    pub status: String,
    pub amount: f64,
    pub channel: Option<String>,
    pub paid_at: Option<String>,
    pub created_at: Option<String>,
    pub customer_email: Option<String>,
}

impl From<TransactionData> for GatewayTransaction {
    fn from(d: TransactionData) -> Self {
        Self {
            id: d.id,
            reference: d.reference,
            status: d.status,
            amount: from_minor(d.amount),
            channel: d.channel,
            paid_at: d.paid_at,
            created_at: d.created_at,
            customer_email: d.customer.and_then(|c| c.email),
        }
    }
}

pub fn to_minor(amount: f64) -> i64 {
    (amount * 100.0).round() as i64
}

pub fn from_minor(amount: i64) -> f64 {
    round2(amount as f64 / 100.0)
}

#[derive(Clone)]
pub struct PaystackClient {
    http: Client,
    base_url: String,
    secret_key: String,
}

impl PaystackClient {
    pub fn new(
        base_url: impl Into<String>,
        secret_key: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, PaystackError> {
        let http = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            secret_key: secret_key.into(),
        })
    }

    pub fn secret_key(&self) -> &str {
        &self.secret_key
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn send<T: DeserializeOwned>(&self, req: RequestBuilder) -> Result<T, PaystackError> {
        let resp = req.bearer_auth(&self.secret_key).send().await?;
        let status = resp.status();
        let body = resp.text().await?;

        if !status.is_success() {
            let message = serde_json::from_str::<Envelope>(&body)
                .map(|e| e.message)
                .unwrap_or(body);
            return Err(PaystackError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let envelope = serde_json::from_str::<Envelope>(&body)
            .map_err(|e| PaystackError::InvalidResponse(format!("{e}; body={body}")))?;
        if !envelope.status {
            return Err(PaystackError::Rejected(envelope.message));
        }
        let data = envelope
            .data
            .ok_or_else(|| PaystackError::InvalidResponse(format!("missing data; body={body}")))?;
        serde_json::from_value(data).map_err(|e| PaystackError::InvalidResponse(e.to_string()))
    }

    /// Starts an M-Pesa STK push. `phone` must already be in `+254…` form.
    pub async fn charge_mobile_money(
        &self,
        email: &str,
        phone: &str,
        amount: f64,
        metadata: Value,
    ) -> Result<ChargeOutcome, PaystackError> {
        let body = json!({
            "email": email,
            "amount": to_minor(amount),
            "currency": CURRENCY,
            "mobile_money": {
                "phone": phone,
                "provider": MOBILE_MONEY_PROVIDER,
            },
            "metadata": metadata,
        });
        let data: ChargeData = self.send(self.http.post(self.url("/charge")).json(&body)).await?;
        Ok(data.into())
    }

    pub async fn submit_otp(&self, otp: &str, reference: &str) -> Result<ChargeOutcome, PaystackError> {
        let body = json!({ "otp": otp, "reference": reference });
        let data: ChargeData = self
            .send(self.http.post(self.url("/charge/submit_otp")).json(&body))
            .await?;
        Ok(data.into())
    }

    pub async fn verify(&self, reference: &str) -> Result<Verification, PaystackError> {
        let raw: Value = self
            .send(self.http.get(self.url(&format!("/transaction/verify/{reference}"))))
            .await?;
        let data = serde_json::from_value::<TransactionData>(raw.clone())
            .map_err(|e| PaystackError::InvalidResponse(e.to_string()))?;

        Ok(Verification {
            reference: data.reference,
            status: data.status,
            amount: from_minor(data.amount),
            currency: data.currency,
            channel: data.channel,
            gateway_response: data.gateway_response,
            paid_at: data.paid_at,
            customer_email: data.customer.and_then(|c| c.email),
            raw,
        })
    }

    pub async fn initialize_card(
        &self,
        email: &str,
        amount: f64,
        callback_url: Option<&str>,
        metadata: Value,
    ) -> Result<CardCheckout, PaystackError> {
        let mut body = json!({
            "email": email,
            "amount": to_minor(amount),
            "currency": CURRENCY,
            "channels": ["card"],
            "metadata": metadata,
        });
        if let Some(url) = callback_url {
            body["callback_url"] = json!(url);
        }

        #[derive(Deserialize)]
        struct InitData {
            authorization_url: String,
            access_code: String,
            reference: String,
        }

        let data: InitData = self
            .send(self.http.post(self.url("/transaction/initialize")).json(&body))
            .await?;
        Ok(CardCheckout {
            authorization_url: data.authorization_url,
            access_code: data.access_code,
            reference: data.reference,
        })
    }

    /// One page (up to 100) of successful transactions, optionally filtered by customer.
    pub async fn list_successful(
        &self,
        customer: Option<&str>,
    ) -> Result<Vec<GatewayTransaction>, PaystackError> {
        let per_page = LIST_PAGE_SIZE.to_string();
        let mut query = vec![("status", "success"), ("perPage", per_page.as_str())];
        if let Some(c) = customer {
            query.push(("customer", c));
        }

        let data: Vec<TransactionData> = self
            .send(self.http.get(self.url("/transaction")).query(&query))
            .await?;
        Ok(data.into_iter().map(GatewayTransaction::from).collect())
    }
}

/// Checks `x-paystack-signature`: hex HMAC-SHA512 of the raw body keyed by the secret key.
pub fn verify_signature(secret_key: &str, body: &[u8], signature_hex: &str) -> bool {
    let Ok(expected) = hex::decode(signature_hex.trim()) else {
        return false;
    };
    let Ok(mut mac) = Hmac::<Sha512>::new_from_slice(secret_key.as_bytes()) else {
        return false;
    };
    mac.update(body);
    mac.verify_slice(&expected).is_ok()
}
