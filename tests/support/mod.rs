#![allow(dead_code)]

use hmac::{Hmac, Mac};
use httpmock::MockServer;
use serde_json::{Value, json};
use sha2::Sha512;
use tempfile::TempDir;

use wolfhost::AppState;
use wolfhost::config::Config;

pub const SECRET_KEY: &str = "sk_test_wolfhost";

/// Mocked Paystack and panel upstreams plus a ledger in a temp dir.
pub struct Harness {
    pub paystack: MockServer,
    pub panel: MockServer,
    pub state: AppState,
    _dir: TempDir,
}

pub async fn harness() -> Harness {
    let paystack = MockServer::start_async().await;
    let panel = MockServer::start_async().await;
    let dir = tempfile::tempdir().expect("tempdir");

    let config = Config::with_upstreams(
        paystack.base_url(),
        panel.base_url(),
        dir.path().join("spending.json"),
    );
    let state = AppState::new(config).expect("build state");

    Harness {
        paystack,
        panel,
        state,
        _dir: dir,
    }
}

pub fn panel_user(id: i64, email: &str) -> Value {
    json!({
        "object": "user",
        "attributes": user_attributes(id, email),
    })
}

pub fn user_attributes(id: i64, email: &str) -> Value {
    json!({
        "id": id,
        "external_id": null,
        "uuid": format!("uuid-user-{id}"),
        "username": format!("wolf{id}"),
        "email": email,
        "first_name": "Wolf",
        "last_name": "Host",
        "language": "en",
        "root_admin": false,
        "2fa": false,
        "created_at": "2024-05-01T10:00:00+00:00",
        "updated_at": "2024-05-01T10:00:00+00:00"
    })
}

pub fn server_attributes(id: i64, user: i64, name: &str, description: &str, memory: i64, cpu: i64) -> Value {
    json!({
        "id": id,
        "external_id": null,
        "uuid": format!("uuid-server-{id}"),
        "identifier": format!("srv{id}"),
        "name": name,
        "description": description,
        "status": null,
        "suspended": false,
        "limits": {
            "memory": memory,
            "swap": 0,
            "disk": 10240,
            "io": 500,
            "cpu": cpu,
            "threads": null,
            "oom_disabled": true
        },
        "feature_limits": { "databases": 1, "allocations": 1, "backups": 1 },
        "user": user,
        "node": 1,
        "allocation": id * 10,
        "nest": 5,
        "egg": 15,
        "created_at": "2024-06-01T12:00:00+00:00",
        "updated_at": "2024-06-01T12:00:00+00:00"
    })
}

pub fn server_detail(id: i64, user: i64, name: &str, description: &str) -> Value {
    let mut attrs = server_attributes(id, user, name, description, 2048, 100);
    attrs["relationships"] = json!({
        "allocations": {
            "object": "list",
            "data": [{
                "object": "allocation",
                "attributes": {
                    "id": id * 10,
                    "ip": "10.0.0.5",
                    "alias": null,
                    "port": 25565,
                    "assigned": true
                }
            }]
        }
    });
    json!({ "object": "server", "attributes": attrs })
}

pub fn allocation(id: i64, port: i64, assigned: bool) -> Value {
    json!({
        "object": "allocation",
        "attributes": {
            "id": id,
            "ip": "10.0.0.5",
            "alias": null,
            "port": port,
            "notes": null,
            "assigned": assigned
        }
    })
}

pub fn paystack_tx(id: i64, reference: &str, amount_minor: i64, email: &str, paid_at: &str) -> Value {
    json!({
        "id": id,
        "domain": "test",
        "status": "success",
        "reference": reference,
        "amount": amount_minor,
        "gateway_response": "Approved",
        "paid_at": paid_at,
        "created_at": paid_at,
        "channel": "mobile_money",
        "currency": "KES",
        "customer": { "id": 99, "email": email, "customer_code": "CUS_test" }
    })
}

pub fn paystack_ok(data: Value) -> Value {
    json!({ "status": true, "message": "ok", "data": data })
}

/// Signs a webhook body the way Paystack does.
pub fn sign(secret_key: &str, body: &[u8]) -> String {
    let mut mac = Hmac::<Sha512>::new_from_slice(secret_key.as_bytes()).expect("hmac key");
    mac.update(body);
    hex::encode(mac.finalize().into_bytes())
}
