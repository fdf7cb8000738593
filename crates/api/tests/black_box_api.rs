use std::sync::Arc;

use chrono::{Duration as ChronoDuration, Utc};
use commissary_api::app::{build_app, AppServices};
use commissary_auth::{JwtClaims, Role};
use commissary_core::UserId;
use commissary_infra::{bootstrap, Database};
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use reqwest::StatusCode;
use serde_json::{json, Value};

const JWT_SECRET: &str = "test-secret";

struct TestServer {
    base_url: String,
    client: reqwest::Client,
    handle: tokio::task::JoinHandle<()>,
}

impl TestServer {
    /// Same router as prod over a seeded in-memory database, on an ephemeral port.
    async fn spawn() -> Self {
        let db = Database::in_memory().await.expect("in-memory database");
        bootstrap::seed_default_users(db.pool()).await.expect("seed default users");

        let services = Arc::new(AppServices::new(db, JWT_SECRET, ChronoDuration::minutes(10)));
        let app = build_app(services);
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind ephemeral port");
        let addr = listener.local_addr().unwrap();

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            base_url: format!("http://{addr}"),
            client: reqwest::Client::new(),
            handle,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn login(&self, username: &str, password: &str) -> String {
        let res = self
            .client
            .post(self.url("/login"))
            .json(&json!({ "username": username, "password": password }))
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK, "login as {username}");
        let body: Value = res.json().await.unwrap();
        body["token"].as_str().unwrap().to_string()
    }

    async fn post(&self, token: &str, path: &str, body: Value) -> (StatusCode, Value) {
        let res = self
            .client
            .post(self.url(path))
            .bearer_auth(token)
            .json(&body)
            .send()
            .await
            .unwrap();
        let status = res.status();
        (status, res.json().await.unwrap_or(Value::Null))
    }

    async fn get(&self, token: &str, path: &str) -> (StatusCode, Value) {
        let res = self.client.get(self.url(path)).bearer_auth(token).send().await.unwrap();
        let status = res.status();
        (status, res.json().await.unwrap_or(Value::Null))
    }

    async fn audit_actions(&self, admin: &str) -> Vec<String> {
        let (status, body) = self.get(admin, "/audit").await;
        assert_eq!(status, StatusCode::OK);
        body.as_array()
            .unwrap()
            .iter()
            .map(|e| e["action"].as_str().unwrap().to_string())
            .collect()
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

fn mint_jwt(sub: UserId, role: Role, issued_at: chrono::DateTime<Utc>, ttl: ChronoDuration) -> String {
    let claims = JwtClaims {
        sub,
        role,
        issued_at,
        expires_at: issued_at + ttl,
    };
    jsonwebtoken::encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(JWT_SECRET.as_bytes()),
    )
    .expect("failed to encode jwt")
}

async fn create_item(srv: &TestServer, admin: &str, type_code: &str, size_code: &str) -> String {
    let (status, body) = srv
        .post(
            admin,
            "/items",
            json!({ "name": "Jumpsuit", "type_code": type_code, "size_code": size_code, "vendor": "Acme", "cost": 12.5 }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    body["barcode"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn health_is_public() {
    let srv = TestServer::spawn().await;
    let res = srv.client.get(srv.url("/health")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
}

#[tokio::test]
async fn seeded_accounts_can_log_in_and_see_themselves() {
    let srv = TestServer::spawn().await;

    for (username, password, role) in [
        ("admin", "admin123", "Admin"),
        ("staff", "staff123", "Staff"),
        ("trustee", "trustee123", "Trustee"),
    ] {
        let token = srv.login(username, password).await;
        let (status, body) = srv.get(&token, "/whoami").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["username"], username);
        assert_eq!(body["role"], role);
    }
}

#[tokio::test]
async fn bad_credentials_are_rejected() {
    let srv = TestServer::spawn().await;

    let res = srv
        .client
        .post(srv.url("/login"))
        .json(&json!({ "username": "admin", "password": "wrong" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    let res = srv
        .client
        .post(srv.url("/login"))
        .json(&json!({ "username": "admin" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn protected_endpoints_require_a_valid_token() {
    let srv = TestServer::spawn().await;

    let res = srv.client.get(srv.url("/whoami")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["error"], "unauthenticated");

    let expired = mint_jwt(
        UserId::new(),
        Role::Admin,
        Utc::now() - ChronoDuration::hours(2),
        ChronoDuration::minutes(10),
    );
    let (status, _) = srv.get(&expired, "/whoami").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn forged_actor_is_unauthenticated_at_the_pipeline() {
    let srv = TestServer::spawn().await;

    // Correctly signed, but the subject is not a known user.
    let token = mint_jwt(UserId::new(), Role::Admin, Utc::now(), ChronoDuration::minutes(10));
    let (status, body) = srv.post(&token, "/inmates", json!({ "id": "INM001", "name": "Jane Doe" })).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "unauthenticated");
}

#[tokio::test]
async fn registering_an_inmate_is_audited() {
    let srv = TestServer::spawn().await;
    let staff = srv.login("staff", "staff123").await;
    let admin = srv.login("admin", "admin123").await;

    let (status, body) = srv
        .post(&staff, "/inmates", json!({ "id": "INM001", "name": "Jane Doe" }))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["id"], "INM001");
    assert_eq!(body["housing_unit"], "Unknown");
    assert_eq!(body["fees"], 0.0);
    assert_eq!(body["status"], "In Custody");

    let (status, body) = srv.get(&admin, "/audit").await;
    assert_eq!(status, StatusCode::OK);
    let entries = body.as_array().unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0]["action"], "Inmate Added");
    assert_eq!(entries[0]["actor_username"], "staff");

    // Replay is a conflict and leaves no second entry.
    let (status, body) = srv
        .post(&staff, "/inmates", json!({ "id": "INM001", "name": "Jane Doe" }))
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "conflict");
    assert_eq!(srv.audit_actions(&admin).await.len(), 1);
}

#[tokio::test]
async fn trustee_cannot_register_inmates() {
    let srv = TestServer::spawn().await;
    let trustee = srv.login("trustee", "trustee123").await;
    let admin = srv.login("admin", "admin123").await;

    let (status, body) = srv
        .post(&trustee, "/inmates", json!({ "id": "INM001", "name": "Jane Doe" }))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "permission_denied");

    let (status, _) = srv.get(&admin, "/inmates/INM001").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(srv.audit_actions(&admin).await.is_empty());

    let (status, _) = srv.get(&trustee, "/audit").await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn invalid_input_is_a_bad_request() {
    let srv = TestServer::spawn().await;
    let admin = srv.login("admin", "admin123").await;

    let (status, body) = srv.post(&admin, "/inmates", json!({ "id": "INM001" })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "validation_error");

    let res = srv
        .client
        .post(srv.url("/inmates"))
        .bearer_auth(&admin)
        .header("content-type", "application/json")
        .body("{ not json")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["error"], "invalid_json");

    let (status, _) = srv
        .post(&admin, "/items", json!({ "name": "Jumpsuit", "type_code": "T-S", "size_code": "M" }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    assert!(srv.audit_actions(&admin).await.is_empty());
}

#[tokio::test]
async fn created_items_get_unique_barcodes() {
    let srv = TestServer::spawn().await;
    let admin = srv.login("admin", "admin123").await;
    let staff = srv.login("staff", "staff123").await;

    let mut barcodes = std::collections::HashSet::new();
    for _ in 0..10 {
        let barcode = create_item(&srv, &admin, "ts", "m").await;
        assert!(barcode.starts_with("TSM"));
        assert_eq!(barcode.len(), 9);
        assert!(barcodes.insert(barcode));
    }

    let barcode = barcodes.iter().next().unwrap();
    let (status, body) = srv.get(&staff, &format!("/items/{barcode}")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "In Stock");
    assert_eq!(body["condition"], "New");
    assert_eq!(body["cost"], 12.5);

    // Only admins create items.
    let (status, _) = srv
        .post(&staff, "/items", json!({ "name": "Towel", "type_code": "TW", "size_code": "L" }))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn item_lifecycle_through_assignment_laundry_and_return() {
    let srv = TestServer::spawn().await;
    let admin = srv.login("admin", "admin123").await;
    let staff = srv.login("staff", "staff123").await;
    let trustee = srv.login("trustee", "trustee123").await;

    srv.post(&staff, "/inmates", json!({ "id": "INM001", "name": "Jane Doe", "housing_unit": "B-2" }))
        .await;
    let barcode = create_item(&srv, &admin, "TS", "M").await;

    let (status, assignment) = srv
        .post(&staff, "/inmates/INM001/items", json!({ "barcode": barcode }))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    let assignment_id = assignment["id"].as_str().unwrap().to_string();

    // Already assigned.
    let (status, _) = srv
        .post(&staff, "/inmates/INM001/items", json!({ "barcode": barcode }))
        .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, item) = srv.post(&trustee, &format!("/items/{barcode}/laundry"), json!({})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(item["status"], "In Laundry");

    let (status, item) = srv
        .post(&trustee, &format!("/items/{barcode}/laundry/return"), json!({}))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(item["status"], "Assigned");

    // Open assignment blocks release.
    let (status, _) = srv.post(&staff, "/inmates/INM001/release", json!({})).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, closed) = srv
        .post(
            &staff,
            &format!("/inmates/INM001/items/{assignment_id}/return"),
            json!({ "outcome": "Returned", "condition": "Worn" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(closed["outcome"], "Returned");
    assert_eq!(closed["return_condition"], "Worn");

    let (_, item) = srv.get(&staff, &format!("/items/{barcode}")).await;
    assert_eq!(item["status"], "In Stock");
    assert_eq!(item["condition"], "Worn");

    let (status, inmate) = srv.post(&staff, "/inmates/INM001/release", json!({})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(inmate["status"], "Released");

    let (_, listed) = srv.get(&staff, "/inmates").await;
    assert!(listed.as_array().unwrap().is_empty());
    let (_, listed) = srv.get(&staff, "/inmates?include_released=true").await;
    assert_eq!(listed.as_array().unwrap().len(), 1);

    let (_, detail) = srv.get(&staff, "/inmates/INM001").await;
    assert_eq!(detail["assignments"].as_array().unwrap().len(), 1);

    assert_eq!(
        srv.audit_actions(&admin).await,
        vec![
            "Inmate Released",
            "Item Returned",
            "Item Received From Laundry",
            "Item Sent To Laundry",
            "Item Assigned",
            "Item Added",
            "Inmate Added",
        ]
    );
}

#[tokio::test]
async fn retired_items_cannot_be_assigned() {
    let srv = TestServer::spawn().await;
    let admin = srv.login("admin", "admin123").await;

    srv.post(&admin, "/inmates", json!({ "id": "INM001", "name": "Jane Doe" })).await;
    let barcode = create_item(&srv, &admin, "TS", "M").await;

    let (status, item) = srv
        .post(&admin, &format!("/items/{barcode}/retire"), json!({ "reason": "torn" }))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(item["status"], "Retired");

    let (status, _) = srv
        .post(&admin, "/inmates/INM001/items", json!({ "barcode": barcode }))
        .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, _) = srv.get(&admin, "/items/TSM999999").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn retire_reason_is_optional() {
    let srv = TestServer::spawn().await;
    let admin = srv.login("admin", "admin123").await;
    let barcode = create_item(&srv, &admin, "TW", "L").await;

    let res = srv
        .client
        .post(srv.url(&format!("/items/{barcode}/retire")))
        .bearer_auth(&admin)
        .body("{ not json")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let res = srv
        .client
        .post(srv.url(&format!("/items/{barcode}/retire")))
        .bearer_auth(&admin)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let item: Value = res.json().await.unwrap();
    assert_eq!(item["status"], "Retired");

    assert_eq!(srv.audit_actions(&admin).await, vec!["Item Retired", "Item Added"]);
}

#[tokio::test]
async fn fees_charge_the_inmate() {
    let srv = TestServer::spawn().await;
    let admin = srv.login("admin", "admin123").await;
    let staff = srv.login("staff", "staff123").await;

    srv.post(&staff, "/inmates", json!({ "id": "INM001", "name": "Jane Doe", "fees": 5.0 }))
        .await;
    let barcode = create_item(&srv, &admin, "TS", "M").await;

    let (status, fee) = srv
        .post(
            &staff,
            "/fees",
            json!({ "name": "Damaged jumpsuit", "amount": 12.25, "inmate_id": "INM001", "item_barcodes": [barcode] }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(fee["amount"], 12.25);

    let (_, inmate) = srv.get(&staff, "/inmates/INM001").await;
    assert_eq!(inmate["fees"], 17.25);

    let (status, fees) = srv.get(&staff, "/inmates/INM001/fees").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fees.as_array().unwrap().len(), 1);

    let (status, _) = srv
        .post(&staff, "/fees", json!({ "name": "Fee", "amount": 1.0, "inmate_id": "NOBODY" }))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = srv.post(&staff, "/fees", json!({ "name": "Fee", "amount": 0.0 })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn admins_create_users_who_can_log_in() {
    let srv = TestServer::spawn().await;
    let admin = srv.login("admin", "admin123").await;
    let staff = srv.login("staff", "staff123").await;

    let request = json!({
        "username": "officer1",
        "password": "secret99",
        "role": "Staff",
        "first_name": "Pat",
        "last_name": "Lee",
        "email": "pat@example.org"
    });

    let (status, _) = srv.post(&staff, "/users", request.clone()).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, user) = srv.post(&admin, "/users", request.clone()).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(user["role"], "Staff");
    assert!(user.get("password").is_none());

    let (status, _) = srv.post(&admin, "/users", request).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let token = srv.login("officer1", "secret99").await;
    let (status, me) = srv.get(&token, "/whoami").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(me["username"], "officer1");

    assert_eq!(srv.audit_actions(&admin).await, vec!["User Added"]);
}

#[tokio::test]
async fn policy_table_is_readable() {
    let srv = TestServer::spawn().await;
    let trustee = srv.login("trustee", "trustee123").await;

    let (status, body) = srv.get(&trustee, "/policy").await;
    assert_eq!(status, StatusCode::OK);
    let entries = body.as_array().unwrap();
    assert_eq!(entries.len(), 13);

    let create_item = entries.iter().find(|e| e["action"] == "create_item").unwrap();
    assert_eq!(create_item["label"], "Item Added");
    assert_eq!(create_item["roles"], json!(["Admin"]));
    assert_eq!(create_item["audited"], true);
}
