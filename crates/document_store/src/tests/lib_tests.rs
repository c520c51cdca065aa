use super::*;
use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use shared::domain::{UserType, WaitlistFields};
use tokio::{net::TcpListener, sync::Mutex};

#[derive(Debug, Clone)]
struct RecordedCreate {
    database_id: String,
    collection_id: String,
    project_header: Option<String>,
    key_header: Option<String>,
    body: Value,
}

#[derive(Clone)]
struct MockState {
    list_status: StatusCode,
    create_status: StatusCode,
    create_body: Option<Value>,
    list_text: Option<&'static str>,
    list_calls: Arc<Mutex<u32>>,
    creates: Arc<Mutex<Vec<RecordedCreate>>>,
}

impl MockState {
    fn healthy() -> Self {
        Self {
            list_status: StatusCode::OK,
            create_status: StatusCode::CREATED,
            create_body: None,
            list_text: None,
            list_calls: Arc::new(Mutex::new(0)),
            creates: Arc::new(Mutex::new(Vec::new())),
        }
    }

    fn replying(create_status: StatusCode, body: Value) -> Self {
        Self {
            create_status,
            create_body: Some(body),
            ..Self::healthy()
        }
    }

    fn rejecting(status: StatusCode, body: Value) -> Self {
        Self {
            list_status: status,
            create_status: status,
            create_body: Some(body),
            ..Self::healthy()
        }
    }
}

fn header(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string)
}

async fn handle_list(State(state): State<MockState>) -> Response {
    *state.list_calls.lock().await += 1;
    if let Some(text) = state.list_text {
        return (state.list_status, text).into_response();
    }
    if state.list_status.is_success() {
        (
            state.list_status,
            Json(serde_json::json!({ "total": 0, "databases": [] })),
        )
            .into_response()
    } else {
        (
            state.list_status,
            Json(state.create_body.clone().unwrap_or(Value::Null)),
        )
            .into_response()
    }
}

async fn handle_create(
    State(state): State<MockState>,
    Path((database_id, collection_id)): Path<(String, String)>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    state.creates.lock().await.push(RecordedCreate {
        database_id: database_id.clone(),
        collection_id: collection_id.clone(),
        project_header: header(&headers, "x-appwrite-project"),
        key_header: header(&headers, "x-appwrite-key"),
        body: body.clone(),
    });

    if let Some(reply) = &state.create_body {
        return (state.create_status, Json(reply.clone()));
    }

    let mut document = body["data"].clone();
    document["$id"] = body["documentId"].clone();
    document["$createdAt"] = Value::String("2025-01-04T08:15:30.000+00:00".to_string());
    document["$databaseId"] = Value::String(database_id);
    document["$collectionId"] = Value::String(collection_id);
    (state.create_status, Json(document))
}

async fn spawn_store(state: MockState) -> String {
    std::env::set_var("NO_PROXY", "127.0.0.1,localhost");
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    let app = Router::new()
        .route("/v1/databases", get(handle_list))
        .route(
            "/v1/databases/:database_id/collections/:collection_id/documents",
            post(handle_create),
        )
        .with_state(state);
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    format!("http://{addr}/v1")
}

fn config_for(endpoint: &str) -> BackendConfig {
    BackendConfig::new(endpoint, "project-1", "db-1", "waitlist").expect("config")
}

fn sample_entry() -> WaitlistEntry {
    WaitlistFields::new("Ada", "ADA@Example.com ", UserType::Business)
        .validate()
        .expect("valid entry")
}

#[tokio::test]
async fn probe_reports_reachable_store() {
    let state = MockState::healthy();
    let endpoint = spawn_store(state.clone()).await;
    let backend = WaitlistBackend::new(&config_for(&endpoint)).expect("backend");

    let result = backend.probe_connectivity().await;

    assert!(result.is_success());
    assert_eq!(*state.list_calls.lock().await, 1);
}

#[tokio::test]
async fn probe_captures_remote_rejection_as_data() {
    let state = MockState::rejecting(
        StatusCode::UNAUTHORIZED,
        serde_json::json!({
            "message": "User (role: guests) missing scope (databases.read)",
            "code": 401,
            "type": "general_unauthorized_scope",
        }),
    );
    let endpoint = spawn_store(state).await;
    let backend = WaitlistBackend::new(&config_for(&endpoint)).expect("backend");

    let result = backend.probe_connectivity().await;

    let err = result.error().expect("probe error");
    assert_eq!(err.code, Some(401));
    assert_eq!(err.kind.as_deref(), Some("general_unauthorized_scope"));
}

#[tokio::test]
async fn probe_captures_transport_failure() {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    drop(listener);

    std::env::set_var("NO_PROXY", "127.0.0.1,localhost");
    let backend =
        WaitlistBackend::new(&config_for(&format!("http://{addr}/v1"))).expect("backend");

    let result = backend.probe_connectivity().await;

    let err = result.error().expect("probe error");
    assert_eq!(err.code, None);
    assert!(err.message.is_some());
}

#[tokio::test]
async fn create_posts_normalized_entry_with_fresh_id() {
    let state = MockState::healthy();
    let endpoint = spawn_store(state.clone()).await;
    let config = config_for(&format!("{endpoint}/")).with_api_key("secret-key");
    let backend = WaitlistBackend::new(&config).expect("backend");

    let first = backend.create_entry(&sample_entry()).await.expect("create");
    let second = backend.create_entry(&sample_entry()).await.expect("create");

    assert_ne!(first.id, second.id);
    assert_eq!(first.entry, sample_entry());
    assert!(first.created_at.is_some());

    let creates = state.creates.lock().await;
    assert_eq!(creates.len(), 2);
    let recorded = &creates[0];
    assert_eq!(recorded.database_id, "db-1");
    assert_eq!(recorded.collection_id, "waitlist");
    assert_eq!(recorded.project_header.as_deref(), Some("project-1"));
    assert_eq!(recorded.key_header.as_deref(), Some("secret-key"));
    assert_eq!(
        recorded.body["documentId"],
        Value::String(first.id.clone().expect("echoed id"))
    );
    assert_eq!(
        recorded.body["data"],
        serde_json::json!({
            "name": "Ada",
            "email": "ada@example.com",
            "userType": "business",
        })
    );
}

#[tokio::test]
async fn accepted_create_with_sparse_echo_is_success() {
    let state = MockState::replying(
        StatusCode::CREATED,
        serde_json::json!({ "$id": "server-assigned" }),
    );
    let endpoint = spawn_store(state.clone()).await;
    let backend = WaitlistBackend::new(&config_for(&endpoint)).expect("backend");

    let created = backend.create_entry(&sample_entry()).await.expect("create");

    assert_eq!(created.id.as_deref(), Some("server-assigned"));
    assert_eq!(created.created_at, None);
    assert_eq!(created.entry, sample_entry());
    assert_eq!(state.creates.lock().await.len(), 1);
}

#[tokio::test]
async fn accepted_create_with_unreadable_echo_is_success() {
    let state = MockState::replying(StatusCode::CREATED, Value::String("ok".to_string()));
    let endpoint = spawn_store(state).await;
    let backend = WaitlistBackend::new(&config_for(&endpoint)).expect("backend");

    let created = backend.create_entry(&sample_entry()).await.expect("create");

    assert_eq!(created.id, None);
    assert_eq!(created.entry, sample_entry());
}

#[tokio::test]
async fn list_with_non_json_success_is_reachable() {
    let state = MockState {
        list_text: Some("pong"),
        ..MockState::healthy()
    };
    let endpoint = spawn_store(state).await;
    let backend = WaitlistBackend::new(&config_for(&endpoint)).expect("backend");

    assert!(backend.probe_connectivity().await.is_success());
}

#[tokio::test]
async fn create_omits_api_key_header_when_unset() {
    let state = MockState::healthy();
    let endpoint = spawn_store(state.clone()).await;
    let backend = WaitlistBackend::new(&config_for(&endpoint)).expect("backend");

    backend.create_entry(&sample_entry()).await.expect("create");

    let creates = state.creates.lock().await;
    assert_eq!(creates[0].key_header, None);
}

#[tokio::test]
async fn create_propagates_structured_conflict() {
    let state = MockState::rejecting(
        StatusCode::CONFLICT,
        serde_json::json!({
            "message": "Document with the requested ID already exists.",
            "code": 409,
            "type": "document_already_exists",
            "version": "1.6.0",
        }),
    );
    let endpoint = spawn_store(state).await;
    let backend = WaitlistBackend::new(&config_for(&endpoint)).expect("backend");

    let err = backend
        .create_entry(&sample_entry())
        .await
        .expect_err("must fail");

    assert_eq!(err.code, Some(409));
    assert_eq!(
        err.message.as_deref(),
        Some("Document with the requested ID already exists.")
    );
}

#[tokio::test]
async fn unrecognized_error_body_falls_back_to_http_status() {
    let state = MockState::rejecting(StatusCode::BAD_GATEWAY, Value::Null);
    let endpoint = spawn_store(state).await;
    let backend = WaitlistBackend::new(&config_for(&endpoint)).expect("backend");

    let err = backend
        .create_entry(&sample_entry())
        .await
        .expect_err("must fail");

    assert_eq!(err.code, Some(502));
    assert!(err.message.is_some());
}

#[test]
fn config_rejects_blank_identifiers_and_bad_endpoints() {
    assert_eq!(
        BackendConfig::new(config::DEFAULT_ENDPOINT, "p", " ", "c").unwrap_err(),
        BackendConfigError::MissingSetting("database_id")
    );
    assert!(matches!(
        BackendConfig::new("ftp://example.com", "p", "d", "c"),
        Err(BackendConfigError::InvalidEndpoint { .. })
    ));
    assert!(matches!(
        BackendConfig::new("not a url", "p", "d", "c"),
        Err(BackendConfigError::InvalidEndpoint { .. })
    ));
}

#[test]
fn config_debug_redacts_api_key() {
    let config = BackendConfig::new(config::DEFAULT_ENDPOINT, "p", "d", "c")
        .expect("config")
        .with_api_key("super-secret");
    let rendered = format!("{config:?}");
    assert!(!rendered.contains("super-secret"));
    assert!(rendered.contains("<redacted>"));
}
