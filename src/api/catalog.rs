// src/api/catalog.rs

use actix_web::{HttpResponse, Responder, get};
use serde_json::json;

use crate::currency;
use crate::tiers::Tier;

#[get("/")]
pub async fn index() -> impl Responder {
    HttpResponse::Ok().body("WolfHost API is running")
}

#[utoipa::path(
    get,
    path = "/api/tiers",
    tag = "catalog",
    responses((status = 200, description = "Hosting plans with limits and prices"))
)]
#[get("/api/tiers")]
pub async fn list_tiers() -> impl Responder {
    let tiers: Vec<_> = Tier::ALL.into_iter().map(Tier::info).collect();
    HttpResponse::Ok().json(json!({ "success": true, "tiers": tiers }))
}

#[utoipa::path(
    get,
    path = "/api/currencies",
    tag = "catalog",
    responses((status = 200, description = "Static KES conversion table"))
)]
#[get("/api/currencies")]
pub async fn list_currencies() -> impl Responder {
    HttpResponse::Ok().json(json!({
        "success": true,
        "base": "KES",
        "rates": currency::rates(),
    }))
}
