// src/currency.rs

use serde::Serialize;
use utoipa::ToSchema;

/// KES per one unit of the currency. Static, refreshed by hand.
const RATES: &[(&str, f64)] = &[
    ("KES", 1.0),
    ("USD", 129.5),
    ("EUR", 140.2),
    ("GBP", 164.8),
    ("NGN", 0.084),
    ("GHS", 8.3),
    ("ZAR", 7.1),
    ("UGX", 0.035),
    ("TZS", 0.049),
];

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CurrencyRate {
    pub code: String,
    pub kes_per_unit: f64,
}

pub fn rates() -> Vec<CurrencyRate> {
    RATES
        .iter()
        .map(|&(code, kes_per_unit)| CurrencyRate {
            code: code.to_string(),
            kes_per_unit,
        })
        .collect()
}

fn rate(code: &str) -> Option<f64> {
    RATES
        .iter()
        .find(|(c, _)| c.eq_ignore_ascii_case(code.trim()))
        .map(|&(_, r)| r)
}

pub fn is_supported(code: &str) -> bool {
    rate(code).is_some()
}

pub fn convert_to_kes(amount: f64, code: &str) -> Option<f64> {
    rate(code).map(|r| round2(amount * r))
}

pub fn convert_from_kes(amount: f64, code: &str) -> Option<f64> {
    rate(code).map(|r| round2(amount / r))
}

pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
