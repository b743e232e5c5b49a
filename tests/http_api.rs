//! Integration tests for the REST surface: auth gate, error bodies and a
//! full configure/activate/deactivate round trip.

use std::sync::Arc;

use serde_json::{json, Value};
use tokio::net::TcpListener;

use metaplane::http::{admin_router, AppState};
use metaplane::ops::AdminServices;
use metaplane::store::InMemoryConfigStore;

const API_KEY: &str = "test-secret-key";
const USER: &str = "garygeeke";

/// Serve the admin router on an ephemeral port; returns its base URL.
async fn spawn_platform() -> String {
    let admin = Arc::new(AdminServices::with_defaults(Arc::new(
        InMemoryConfigStore::new(),
    )));
    let state = AppState {
        admin,
        api_key: Arc::from(API_KEY),
    };
    let app = admin_router(state);

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

fn client() -> reqwest::Client {
    reqwest::Client::new()
}

fn bearer(value: &str) -> String {
    format!("Bearer {value}")
}

#[tokio::test]
async fn requests_without_a_bearer_token_are_unauthorized() {
    let base = spawn_platform().await;

    let res = client()
        .get(format!("{base}/admin/servers"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 401);

    let res = client()
        .get(format!("{base}/admin/servers"))
        .header("Authorization", bearer("wrong-key"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 401);
}

#[tokio::test]
async fn requests_without_a_user_id_are_bad_requests() {
    let base = spawn_platform().await;

    let res = client()
        .get(format!("{base}/admin/servers"))
        .header("Authorization", bearer(API_KEY))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 400);

    let body: Value = res.json().await.unwrap();
    assert_eq!(body["kind"], "INVALID_PARAMETER");
}

#[tokio::test]
async fn unknown_server_maps_to_not_found_with_error_kind() {
    let base = spawn_platform().await;

    let res = client()
        .get(format!("{base}/admin/servers/srv1/configuration"))
        .header("Authorization", bearer(API_KEY))
        .header("x-user-id", USER)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 404);

    let body: Value = res.json().await.unwrap();
    assert_eq!(body["kind"], "UNKNOWN_SERVER");
    assert_eq!(body["server_name"], "srv1");
}

#[tokio::test]
async fn configure_activate_deactivate_round_trip() {
    let base = spawn_platform().await;
    let client = client();

    // Configure: default repository services, then an access service.
    let res = client
        .post(format!("{base}/admin/servers/srv1/repository-services/defaults"))
        .header("Authorization", bearer(API_KEY))
        .header("x-user-id", USER)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 204);

    let res = client
        .post(format!("{base}/admin/servers/srv1/event-bus"))
        .header("Authorization", bearer(API_KEY))
        .header("x-user-id", USER)
        .json(&json!({
            "connector_provider": "in-memory-topic",
            "topic_url_root": "metaplane.omag",
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 204);

    let res = client
        .post(format!("{base}/admin/servers/srv1/access-services/asset-consumer"))
        .header("Authorization", bearer(API_KEY))
        .header("x-user-id", USER)
        .json(&json!({ "options": { "foo": "bar" } }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 204);

    // Summaries carry identity, not options.
    let res = client
        .get(format!("{base}/admin/servers/srv1/access-services"))
        .header("Authorization", bearer(API_KEY))
        .header("x-user-id", USER)
        .send()
        .await
        .unwrap();
    let summaries: Value = res.json().await.unwrap();
    assert_eq!(summaries[0]["full_name"], "Asset Consumer OMAS");
    assert!(summaries[0].get("options").is_none());

    // One call wires every enabled view service to the same metadata server.
    let res = client
        .post(format!("{base}/admin/servers/srv1/view-services"))
        .header("Authorization", bearer(API_KEY))
        .header("x-user-id", USER)
        .json(&json!({
            "target_server_name": "srv1",
            "target_platform_url": "http://localhost:9443",
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 204);

    let res = client
        .get(format!("{base}/admin/servers/srv1/view-services"))
        .header("Authorization", bearer(API_KEY))
        .header("x-user-id", USER)
        .send()
        .await
        .unwrap();
    let view_summaries: Value = res.json().await.unwrap();
    assert_eq!(view_summaries.as_array().unwrap().len(), 3);

    // Activate and verify the start order is reported.
    let res = client
        .post(format!("{base}/admin/servers/srv1/instance"))
        .header("Authorization", bearer(API_KEY))
        .header("x-user-id", USER)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 200);
    let summary: Vec<String> = res.json().await.unwrap();
    assert_eq!(summary[0], "Open Metadata Repository Services");
    assert!(summary.contains(&"Asset Consumer OMAS".to_string()));

    let res = client
        .get(format!("{base}/admin/servers/active"))
        .header("Authorization", bearer(API_KEY))
        .header("x-user-id", USER)
        .send()
        .await
        .unwrap();
    let active: Vec<String> = res.json().await.unwrap();
    assert_eq!(active, vec!["srv1".to_string()]);

    // Permanent deactivation removes the instance and the document.
    let res = client
        .delete(format!("{base}/admin/servers/srv1"))
        .header("Authorization", bearer(API_KEY))
        .header("x-user-id", USER)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 204);

    let res = client
        .get(format!("{base}/admin/servers/srv1/configuration"))
        .header("Authorization", bearer(API_KEY))
        .header("x-user-id", USER)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 404);
}
