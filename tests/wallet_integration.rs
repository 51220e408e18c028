mod support;

use actix_web::{App, http::StatusCode, test, web};
use httpmock::Method::GET;
use serde_json::{Value, json};

use support::{harness, paystack_ok, paystack_tx};
use wolfhost::api;
use wolfhost::ledger::SpendingRecord;

const EMAIL: &str = "wolf@example.com";

#[actix_web::test]
async fn totals_subtract_spending_from_deposits() {
    let h = harness().await;
    let listing = h.paystack.mock(|when, then| {
        when.method(GET)
            .path("/transaction")
            .query_param("status", "success")
            .query_param("customer", EMAIL);
        then.status(200).json_body(paystack_ok(json!([
            paystack_tx(1, "ref_1", 30000, EMAIL, "2024-06-01T10:00:00.000Z"),
            paystack_tx(2, "ref_2", 20000, "WOLF@example.com", "2024-06-03T10:00:00.000Z"),
            paystack_tx(3, "ref_3", 99900, "intruder@example.com", "2024-06-04T10:00:00.000Z")
        ])));
    });
    h.state
        .ledger
        .record(SpendingRecord::new(EMAIL, 150.0, "Server purchase: survival", "42"))
        .await
        .unwrap();

    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(h.state.clone()))
            .configure(api::configure),
    )
    .await;

    let req = test::TestRequest::get()
        .uri("/api/transactions/totals?email=Wolf%40example.com")
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["totalDeposits"], 500.0);
    assert_eq!(body["totalSpending"], 150.0);
    assert_eq!(body["balance"], 350.0);
    listing.assert_hits(1);
}

#[actix_web::test]
async fn transactions_merge_credits_and_debits_newest_first() {
    let h = harness().await;
    h.paystack.mock(|when, then| {
        when.method(GET).path("/transaction");
        then.status(200).json_body(paystack_ok(json!([
            paystack_tx(1, "ref_1", 30000, EMAIL, "2024-06-01T10:00:00.000Z"),
            paystack_tx(2, "ref_2", 20000, EMAIL, "2024-06-03T10:00:00.000Z")
        ])));
    });
    let mut spend = SpendingRecord::new(EMAIL, 50.0, "Server purchase: survival", "42");
    spend.date = "2024-06-02T10:00:00Z".parse().unwrap();
    h.state.ledger.record(spend).await.unwrap();

    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(h.state.clone()))
            .configure(api::configure),
    )
    .await;

    let req = test::TestRequest::get()
        .uri("/api/transactions?email=wolf%40example.com")
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    let txs = body["transactions"].as_array().unwrap();
    assert_eq!(txs.len(), 3);
    assert_eq!(txs[0]["reference"], "ref_2");
    assert_eq!(txs[1]["direction"], "debit");
    assert_eq!(txs[1]["serverId"], "42");
    assert_eq!(txs[2]["direction"], "credit");
    assert_eq!(body["balance"], 450.0);
}

#[actix_web::test]
async fn empty_filtered_listing_falls_back_and_still_filters_by_email() {
    let h = harness().await;
    let listing = h.paystack.mock(|when, then| {
        when.method(GET).path("/transaction");
        then.status(200).json_body(paystack_ok(json!([
            paystack_tx(7, "ref_other", 500000, "someone@example.com", "2024-06-01T10:00:00.000Z")
        ])));
    });

    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(h.state.clone()))
            .configure(api::configure),
    )
    .await;

    let req = test::TestRequest::get()
        .uri("/api/transactions/totals?email=wolf%40example.com")
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["totalDeposits"], 0.0);
    assert_eq!(body["balance"], 0.0);
    listing.assert_hits(2);
}

#[actix_web::test]
async fn overspent_balance_floors_at_zero() {
    let h = harness().await;
    h.paystack.mock(|when, then| {
        when.method(GET).path("/transaction");
        then.status(200).json_body(paystack_ok(json!([
            paystack_tx(1, "ref_1", 50000, EMAIL, "2024-06-01T10:00:00.000Z")
        ])));
    });
    h.state
        .ledger
        .record(SpendingRecord::new(EMAIL, 600.0, "Server purchase: legacy", "9"))
        .await
        .unwrap();

    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(h.state.clone()))
            .configure(api::configure),
    )
    .await;

    let req = test::TestRequest::get()
        .uri("/api/transactions/totals?email=wolf%40example.com")
        .to_request();
    let resp = test::call_service(&app, req).await;

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["totalSpending"], 600.0);
    assert_eq!(body["balance"], 0.0);
}

#[actix_web::test]
async fn wallet_endpoints_require_email() {
    let h = harness().await;
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(h.state.clone()))
            .configure(api::configure),
    )
    .await;

    for uri in ["/api/transactions", "/api/transactions/totals", "/api/transactions?email=nope"] {
        let req = test::TestRequest::get().uri(uri).to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST, "{uri}");
    }
}

#[actix_web::test]
async fn gateway_failure_is_500() {
    let h = harness().await;
    h.paystack.mock(|when, then| {
        when.method(GET).path("/transaction");
        then.status(401).json_body(json!({ "status": false, "message": "Invalid key" }));
    });
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(h.state.clone()))
            .configure(api::configure),
    )
    .await;

    let req = test::TestRequest::get()
        .uri("/api/transactions/totals?email=wolf%40example.com")
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["success"], false);
}
