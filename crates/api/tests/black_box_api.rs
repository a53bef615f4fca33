use std::sync::Arc;

use putaway_ai::{ReasoningServiceClient, ScriptedReasoningService, ScriptedReply};
use putaway_infra::{AuditRecorder, DecisionOrchestrator};
use putaway_warehouse::{ZoneCatalog, ZoneTable};
use reqwest::StatusCode;
use serde_json::json;

struct TestServer {
    base_url: String,
    handle: tokio::task::JoinHandle<()>,
}

impl TestServer {
    async fn spawn(service: Arc<ScriptedReasoningService>) -> Self {
        let engine = DecisionOrchestrator::new(
            ZoneCatalog::new(ZoneTable::standard()).unwrap(),
            Some(ReasoningServiceClient::new(service)),
            AuditRecorder::in_memory(),
        );

        // Same router as prod, bound to an ephemeral port.
        let app = putaway_api::app::build_app(engine);
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind ephemeral port");
        let addr = listener.local_addr().unwrap();
        let base_url = format!("http://{}", addr);

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self { base_url, handle }
    }

    async fn with_answer(zone: &str, confidence: f64) -> Self {
        Self::spawn(Arc::new(ScriptedReasoningService::repeating(ScriptedReply::answer(
            zone,
            confidence,
            "closest suitable zone to dispatch",
        ))))
        .await
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

async fn submit(client: &reqwest::Client, srv: &TestServer, body: serde_json::Value) -> reqwest::Response {
    client
        .post(format!("{}/decisions", srv.base_url))
        .json(&body)
        .send()
        .await
        .unwrap()
}

#[tokio::test]
async fn health_and_catalog_endpoints() {
    let srv = TestServer::with_answer("A", 0.7).await;
    let client = reqwest::Client::new();

    let res = client.get(format!("{}/health", srv.base_url)).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let zones: serde_json::Value = client
        .get(format!("{}/zones", srv.base_url))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(zones.as_array().unwrap().len(), 5);
    assert_eq!(zones[2]["id"], "C");
    assert_eq!(zones[2]["maxWeightKg"], 400.0);

    let presets: serde_json::Value = client
        .get(format!("{}/presets", srv.base_url))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert!(!presets.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn rule_decisions_for_standard_scenarios() {
    let srv = TestServer::with_answer("A", 0.7).await;
    let client = reqwest::Client::new();

    let cases = [
        (json!({"id": "CHEM-1", "name": "Solvent", "category": "chemical", "weightKg": 20.0, "hazmat": true}), "C"),
        (
            json!({"id": "FRZ-1", "name": "Peas", "category": "frozen-food", "weightKg": 20.0, "temperatureRequirement": [-25.0, 4.0]}),
            "B",
        ),
        (json!({"id": "MACH-1", "name": "Motor", "category": "machinery", "weightKg": 800.0}), "E"),
    ];

    for (body, expected) in cases {
        let res = submit(&client, &srv, body).await;
        assert_eq!(res.status(), StatusCode::CREATED);

        let v: serde_json::Value = res.json().await.unwrap();
        assert_eq!(v["decision"]["zoneId"], expected);
        assert_eq!(v["decision"]["source"], "rule");
        assert_eq!(v["decision"]["confidence"], 1.0);
        assert!(v["entryId"].as_str().is_some());
    }
}

#[tokio::test]
async fn ambiguous_item_uses_reasoning_answer() {
    let srv = TestServer::with_answer("D", 0.82).await;
    let client = reqwest::Client::new();

    let res = submit(
        &client,
        &srv,
        json!({"id": "ELEC-1", "name": "Battery Pack", "category": "electronics", "weightKg": 45.0, "turnoverClass": "high"}),
    )
    .await;
    assert_eq!(res.status(), StatusCode::CREATED);

    let v: serde_json::Value = res.json().await.unwrap();
    assert_eq!(v["decision"]["zoneId"], "D");
    assert_eq!(v["decision"]["source"], "ai");
    assert_eq!(v["decision"]["confidence"], 0.82);
}

#[tokio::test]
async fn infeasible_item_is_created_without_zone() {
    let srv = TestServer::with_answer("C", 0.9).await;
    let client = reqwest::Client::new();

    let res = submit(
        &client,
        &srv,
        json!({"id": "CHEM-2", "name": "Bulk Tank", "category": "chemical", "weightKg": 3000.0, "hazmat": true}),
    )
    .await;
    assert_eq!(res.status(), StatusCode::CREATED);

    let v: serde_json::Value = res.json().await.unwrap();
    assert!(v["decision"]["zoneId"].is_null());
    assert_eq!(v["decision"]["source"], "fallback");
    assert_eq!(v["decision"]["confidence"], 0.0);
}

#[tokio::test]
async fn invalid_submissions_are_rejected_and_not_recorded() {
    let srv = TestServer::with_answer("A", 0.7).await;
    let client = reqwest::Client::new();

    for body in [
        json!({"id": "", "name": "Nameless", "category": "textiles", "weightKg": 5.0}),
        json!({"id": "NEG-1", "name": "Negative", "category": "textiles", "weightKg": -5.0}),
        json!({"id": "CAT-1", "name": "Unknown", "category": "spaceships", "weightKg": 5.0}),
    ] {
        let res = submit(&client, &srv, body).await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        let v: serde_json::Value = res.json().await.unwrap();
        assert_eq!(v["error"], "validation_error");
    }

    let audit: serde_json::Value = client
        .get(format!("{}/audit", srv.base_url))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert!(audit.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn override_flow_appends_to_audit_trail() {
    let srv = TestServer::with_answer("A", 0.7).await;
    let client = reqwest::Client::new();

    let res = submit(
        &client,
        &srv,
        json!({"id": "CHEM-1", "name": "Solvent", "category": "chemical", "weightKg": 20.0, "hazmat": true}),
    )
    .await;
    let created: serde_json::Value = res.json().await.unwrap();
    let entry_id = created["entryId"].as_str().unwrap().to_string();

    // Unknown zone.
    let res = client
        .post(format!("{}/audit/{}/override", srv.base_url, entry_id))
        .json(&json!({"zoneId": "Z", "operator": "shift-lead", "reason": "test"}))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    // Blank operator.
    let res = client
        .post(format!("{}/audit/{}/override", srv.base_url, entry_id))
        .json(&json!({"zoneId": "A", "operator": "  ", "reason": "test"}))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let res = client
        .post(format!("{}/audit/{}/override", srv.base_url, entry_id))
        .json(&json!({"zoneId": "A", "operator": "shift-lead", "reason": "hazmat bay full"}))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);

    let entry: serde_json::Value = res.json().await.unwrap();
    assert_eq!(entry["kind"], "override");
    assert_eq!(entry["sequenceNumber"], 2);
    assert_eq!(entry["override"]["newZone"], "A");
    assert!(!entry["override"]["violations"].as_array().unwrap().is_empty());

    let audit: serde_json::Value = client
        .get(format!("{}/audit", srv.base_url))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let kinds: Vec<&str> = audit.as_array().unwrap().iter().map(|e| e["kind"].as_str().unwrap()).collect();
    assert_eq!(kinds, vec!["decision", "override"]);

    let original: serde_json::Value = client
        .get(format!("{}/audit/{}", srv.base_url, entry_id))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(original["decision"]["zoneId"], "C");
}

#[tokio::test]
async fn unknown_entries_are_not_found() {
    let srv = TestServer::with_answer("A", 0.7).await;
    let client = reqwest::Client::new();
    let missing = "01890a5d-ac96-774b-bcce-b302099a8057";

    let res = client.get(format!("{}/audit/{}", srv.base_url, missing)).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    let res = client
        .post(format!("{}/audit/{}/override", srv.base_url, missing))
        .json(&json!({"zoneId": "A", "operator": "shift-lead", "reason": "x"}))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}
