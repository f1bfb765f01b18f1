use axum::body::{to_bytes, Body};
use axum::http::{Method, Request, StatusCode};
use distribution_hub::{Hub, HubSettings};
use serde_json::{json, Value};
use tower::ServiceExt;

struct Api {
    router: axum::Router,
}

impl Api {
    fn new() -> Self {
        let hub = Hub::in_memory(HubSettings::default());
        Self {
            router: hub.router(),
        }
    }

    async fn call(&self, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let mut request = Request::builder().method(method).uri(uri);
        let body = match body {
            Some(payload) => {
                request = request.header("content-type", "application/json");
                Body::from(payload.to_string())
            }
            None => Body::empty(),
        };
        let response = self
            .router
            .clone()
            .oneshot(request.body(body).expect("request"))
            .await
            .expect("router dispatch");

        let status = response.status();
        let bytes = to_bytes(response.into_body(), 1024 * 1024)
            .await
            .expect("body");
        let payload = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).expect("json")
        };
        (status, payload)
    }

    async fn create(&self, uri: &str, body: Value) -> Value {
        let (status, payload) = self.call(Method::POST, uri, Some(body)).await;
        assert_eq!(status, StatusCode::CREATED, "create {uri}: {payload}");
        payload
    }
}

fn id_of(record: &Value) -> String {
    record["id"].as_str().expect("record id").to_string()
}

#[tokio::test]
async fn distributor_crud_round_trip() {
    let api = Api::new();
    let created = api
        .create(
            "/api/v1/distributors",
            json!({ "name": "Acme Distribution Ltd", "email": "ops@acme.example" }),
        )
        .await;
    assert_eq!(created["version"], 1);
    assert_eq!(created["status"], "active");
    let id = id_of(&created);

    let (status, fetched) = api
        .call(Method::GET, &format!("/api/v1/distributors/{id}"), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched["name"], "Acme Distribution Ltd");

    let (status, updated) = api
        .call(
            Method::PUT,
            &format!("/api/v1/distributors/{id}"),
            Some(json!({ "name": "Acme Iberia", "status": "suspended" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["version"], 2);
    assert_eq!(updated["created_at"], created["created_at"]);
    assert_eq!(updated["status"], "suspended");

    let (status, _) = api
        .call(Method::DELETE, &format!("/api/v1/distributors/{id}"), None)
        .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, body) = api
        .call(Method::GET, &format!("/api/v1/distributors/{id}"), None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["error"].as_str().expect("message").contains("not found"));
}

#[tokio::test]
async fn invalid_payloads_return_field_details() {
    let api = Api::new();
    let (status, body) = api
        .call(
            Method::POST,
            "/api/v1/distributors",
            Some(json!({ "name": " ", "email": "not-an-email" })),
        )
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["details"]["name"].is_string());
    assert!(body["details"]["email"].is_string());
}

#[tokio::test]
async fn rejected_requests_still_answer_with_json() {
    let api = Api::new();
    let (status, body) = api
        .call(Method::POST, "/api/v1/distributors", Some(json!({})))
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["error"].as_str().expect("message").contains("name"));

    let (status, body) = api
        .call(Method::GET, "/api/v1/distributors/not-a-uuid", None)
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());

    let response = api
        .router
        .clone()
        .oneshot(
            Request::post("/api/v1/terms/generate")
                .header("content-type", "application/json")
                .body(Body::from("{ not json"))
                .expect("request"),
        )
        .await
        .expect("router dispatch");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let bytes = to_bytes(response.into_body(), 1024 * 1024)
        .await
        .expect("body");
    let body: Value = serde_json::from_slice(&bytes).expect("json error body");
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn filter_pages_and_sorts_agencies() {
    let api = Api::new();
    let distributor = api
        .create("/api/v1/distributors", json!({ "name": "Acme" }))
        .await;
    let other = api
        .create("/api/v1/distributors", json!({ "name": "Globex" }))
        .await;

    let agencies = [
        ("B", &distributor),
        ("A", &distributor),
        ("C", &distributor),
        ("Z", &other),
    ];
    for (code, owner) in agencies {
        api.create(
            "/api/v1/agencies",
            json!({
                "distributor_id": owner["id"],
                "name": format!("Agency {code}"),
                "code": code
            }),
        )
        .await;
    }

    let (status, page) = api
        .call(
            Method::POST,
            "/api/v1/agencies/filter",
            Some(json!({
                "filters": { "distributor_id": distributor["id"] },
                "page": 0,
                "size": 2,
                "sort_by": "code",
                "sort_direction": "desc"
            })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(page["total_elements"], 3);
    assert_eq!(page["total_pages"], 2);
    let codes: Vec<_> = page["content"]
        .as_array()
        .expect("content")
        .iter()
        .map(|agency| agency["code"].as_str().expect("code").to_string())
        .collect();
    assert_eq!(codes, ["C", "B"]);

    let (_, unknown) = api
        .call(
            Method::POST,
            "/api/v1/agencies/filter",
            Some(json!({ "filters": { "region": "north" } })),
        )
        .await;
    assert_eq!(unknown["total_elements"], 0);
}

#[tokio::test]
async fn primary_payment_method_moves_between_methods() {
    let api = Api::new();
    let distributor = api
        .create("/api/v1/distributors", json!({ "name": "Acme" }))
        .await;
    let agency = api
        .create(
            "/api/v1/agencies",
            json!({ "distributor_id": distributor["id"], "name": "Porto", "code": "PRT" }),
        )
        .await;
    let agency_id = id_of(&agency);

    let first = api
        .create(
            "/api/v1/agency-payment-methods",
            json!({
                "agency_id": agency_id,
                "method_type": "bank_account",
                "account_identifier": "PT50000201231234567890154",
                "currency": "EUR",
                "is_primary": true
            }),
        )
        .await;
    let second = api
        .create(
            "/api/v1/agency-payment-methods",
            json!({
                "agency_id": agency_id,
                "method_type": "digital_wallet",
                "account_identifier": "wallet-77",
                "currency": "EUR"
            }),
        )
        .await;

    let primary_uri = format!("/api/v1/agencies/{agency_id}/payment-methods/primary");
    let (status, primary) = api.call(Method::GET, &primary_uri, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(primary["id"], first["id"]);

    let (status, promoted) = api
        .call(
            Method::POST,
            &format!("/api/v1/agency-payment-methods/{}/primary", id_of(&second)),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(promoted["is_primary"], true);

    let (_, primary) = api.call(Method::GET, &primary_uri, None).await;
    assert_eq!(primary["id"], second["id"]);
    let (_, demoted) = api
        .call(
            Method::GET,
            &format!("/api/v1/agency-payment-methods/{}", id_of(&first)),
            None,
        )
        .await;
    assert_eq!(demoted["is_primary"], false);
}

#[tokio::test]
async fn contract_status_follows_transition_table() {
    let api = Api::new();
    let distributor = api
        .create("/api/v1/distributors", json!({ "name": "Acme" }))
        .await;
    let product = api
        .create(
            "/api/v1/products",
            json!({
                "distributor_id": distributor["id"],
                "name": "Cargo e-bike",
                "sku": "EB-01",
                "price": 3200.0
            }),
        )
        .await;
    assert_eq!(product["currency"], "USD");

    let contract = api
        .create(
            "/api/v1/contracts",
            json!({
                "contract_number": "LC-2025-0042",
                "distributor_id": distributor["id"],
                "product_id": product["id"],
                "party_id": "customer-9",
                "start_date": "2025-01-01",
                "end_date": "2026-01-01",
                "monthly_payment": 280.0,
                "status": "active"
            }),
        )
        .await;
    assert_eq!(contract["status"], "draft");
    let status_uri = format!("/api/v1/contracts/{}/status", id_of(&contract));

    let (status, _) = api
        .call(Method::POST, &status_uri, Some(json!({ "status": "completed" })))
        .await;
    assert_eq!(status, StatusCode::CONFLICT);

    for next in ["pending_approval", "approved"] {
        let (status, body) = api
            .call(Method::POST, &status_uri, Some(json!({ "status": next })))
            .await;
        assert_eq!(status, StatusCode::OK, "{body}");
        assert_eq!(body["status"], next);
    }

    let (_, approved) = api
        .call(
            Method::GET,
            &format!("/api/v1/contracts/{}", id_of(&contract)),
            None,
        )
        .await;
    assert!(approved["approved_at"].is_string());
}

#[tokio::test]
async fn catalog_import_reports_rejected_rows() {
    let api = Api::new();
    let distributor = api
        .create("/api/v1/distributors", json!({ "name": "Acme" }))
        .await;
    let csv = "SKU,Name,Price,Currency\nEB-01,Cargo e-bike,3200,EUR\nEB-02,Broken row,abc,EUR\n";

    let response = api
        .router
        .clone()
        .oneshot(
            Request::post(format!(
                "/api/v1/distributors/{}/products/import",
                id_of(&distributor)
            ))
            .header("content-type", "text/csv")
            .body(Body::from(csv))
            .expect("request"),
        )
        .await
        .expect("router dispatch");
    assert_eq!(response.status(), StatusCode::OK);
    let body = to_bytes(response.into_body(), 1024 * 1024)
        .await
        .expect("body");
    let report: Value = serde_json::from_slice(&body).expect("json");
    assert_eq!(report["imported"].as_array().map(Vec::len), Some(1));
    assert_eq!(report["rejected"][0]["line"], 3);
}
