mod support;

use actix_web::{App, http::StatusCode, test, web};
use serde_json::Value;
use utoipa::OpenApi;

use support::harness;
use wolfhost::api;

#[actix_web::test]
async fn catalogue_endpoints() {
    let h = harness().await;
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(h.state.clone()))
            .configure(api::configure),
    )
    .await;

    let resp = test::call_service(&app, test::TestRequest::get().uri("/").to_request()).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = test::call_service(&app, test::TestRequest::get().uri("/api/tiers").to_request()).await;
    let body: Value = test::read_body_json(resp).await;
    let tiers = body["tiers"].as_array().unwrap();
    assert_eq!(tiers.len(), 3);
    assert_eq!(tiers[0]["plan"], "Limited");
    assert_eq!(tiers[0]["price"], 50.0);
    assert_eq!(tiers[2]["limits"]["memory"], 8192);

    let resp = test::call_service(&app, test::TestRequest::get().uri("/api/currencies").to_request()).await;
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["base"], "KES");
    assert!(
        body["rates"]
            .as_array()
            .unwrap()
            .iter()
            .any(|r| r["code"] == "USD")
    );
}

#[actix_web::test]
async fn malformed_json_is_400() {
    let h = harness().await;
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(h.state.clone()))
            .configure(api::configure),
    )
    .await;

    let req = test::TestRequest::post()
        .uri("/api/servers/create")
        .insert_header(("content-type", "application/json"))
        .set_payload("{ not json")
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["success"], false);
}

#[actix_web::test]
async fn openapi_lists_every_route() {
    let doc = wolfhost::docs::ApiDoc::openapi();
    for path in [
        "/api/mpesa/charge",
        "/api/card/initialize",
        "/api/transactions",
        "/api/servers/create",
        "/api/servers/{server_id}",
        "/api/paystack/webhook",
    ] {
        assert!(doc.paths.paths.contains_key(path), "{path}");
    }
}
