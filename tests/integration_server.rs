use anyhow::Result;
use axum::{
    body::Body,
    extract::{Query, State},
    http::{Request, StatusCode},
    routing::get,
    Json, Router,
};
use http_body_util::BodyExt;
use pruvo::{cli::globals::GlobalArgs, pruvo::router, supabase};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
};
use tokio::net::TcpListener;
use tower::ServiceExt;

const ORIGIN: &str = "http://localhost:3000";

/// Row held by the stub store, same shape the REST layer returns
#[derive(Debug, Clone, Serialize, Deserialize)]
struct UserRow {
    email: String,
    password: String,
    #[serde(default)]
    proofs_completed: Vec<i64>,
}

/// In-memory stand-in for the hosted store's REST API
#[derive(Debug, Clone)]
struct StubStore {
    users: Arc<Mutex<Vec<UserRow>>>,
    catalog: Arc<Vec<i64>>,
}

impl StubStore {
    fn new(catalog: Vec<i64>) -> Self {
        Self {
            users: Arc::new(Mutex::new(Vec::new())),
            catalog: Arc::new(catalog),
        }
    }

    fn stored_proofs(&self, email: &str) -> Option<Vec<i64>> {
        self.users
            .lock()
            .unwrap()
            .iter()
            .find(|row| row.email == email)
            .map(|row| row.proofs_completed.clone())
    }
}

fn email_filter(params: &HashMap<String, String>) -> Option<String> {
    params
        .get("email")
        .and_then(|filter| filter.strip_prefix("eq."))
        .map(ToString::to_string)
}

async fn get_users(
    State(store): State<StubStore>,
    Query(params): Query<HashMap<String, String>>,
) -> Json<Value> {
    let users = store.users.lock().unwrap();

    let rows: Vec<&UserRow> = match email_filter(&params) {
        Some(email) => users.iter().filter(|row| row.email == email).collect(),
        None => users.iter().take(1).collect(),
    };

    Json(serde_json::to_value(rows).unwrap())
}

async fn post_users(State(store): State<StubStore>, Json(row): Json<UserRow>) -> StatusCode {
    store.users.lock().unwrap().push(row);

    StatusCode::CREATED
}

async fn patch_users(
    State(store): State<StubStore>,
    Query(params): Query<HashMap<String, String>>,
    Json(patch): Json<Value>,
) -> StatusCode {
    let Some(email) = email_filter(&params) else {
        return StatusCode::BAD_REQUEST;
    };

    let proofs: Vec<i64> = patch["proofs_completed"]
        .as_array()
        .map(|ids| ids.iter().filter_map(Value::as_i64).collect())
        .unwrap_or_default();

    let mut users = store.users.lock().unwrap();
    for row in users.iter_mut().filter(|row| row.email == email) {
        row.proofs_completed.clone_from(&proofs);
    }

    StatusCode::NO_CONTENT
}

async fn get_proof_templates(
    State(store): State<StubStore>,
    Query(params): Query<HashMap<String, String>>,
) -> Json<Value> {
    let ids: Vec<i64> = params
        .get("id")
        .and_then(|filter| filter.strip_prefix("in.("))
        .and_then(|filter| filter.strip_suffix(')'))
        .map(|ids| ids.split(',').filter_map(|id| id.parse().ok()).collect())
        .unwrap_or_default();

    let rows: Vec<Value> = ids
        .into_iter()
        .filter(|id| store.catalog.contains(id))
        .map(|id| json!({ "id": id }))
        .collect();

    Json(Value::Array(rows))
}

/// Bind the stub on an ephemeral port and return its base URL
async fn spawn_stub(store: StubStore) -> Result<String> {
    let app = Router::new()
        .route(
            "/rest/v1/users",
            get(get_users).post(post_users).patch(patch_users),
        )
        .route("/rest/v1/proof_templates", get(get_proof_templates))
        .with_state(store);

    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;

    tokio::spawn(async move {
        let _ = axum::serve(listener, app.into_make_service()).await;
    });

    Ok(format!("http://{addr}"))
}

/// Application router wired to the stub store
fn app_for(base_url: &str) -> Result<Router> {
    let globals = GlobalArgs::new(
        base_url.to_string(),
        SecretString::from("test-key".to_string()),
    );

    router(ORIGIN, supabase::Client::new(&globals)?)
}

async fn post_json(app: &Router, path: &str, body: Value) -> (StatusCode, Value) {
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(path)
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();

    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);

    (status, body)
}

#[tokio::test]
async fn test_signup_login_update_scenario() -> Result<()> {
    let store = StubStore::new(vec![1, 2]);
    let app = app_for(&spawn_stub(store.clone()).await?)?;

    let (status, _) = post_json(
        &app,
        "/signup",
        json!({"email": "a@b.com", "password": "secret1"}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    // fresh accounts start with an empty completed-proof set
    let (status, body) = post_json(
        &app,
        "/login",
        json!({"email": "a@b.com", "password": "secret1"}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user"]["email"], "a@b.com");
    assert_eq!(body["user"]["proofs_completed"], json!([]));

    // 999 is not in the catalog and must be dropped, not stored
    let (status, body) = post_json(
        &app,
        "/update-proofs",
        json!({"email": "a@b.com", "proofs": [1, 2, 999]}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["proofs"], json!(["1", "2"]));

    // the stored set only ever holds catalog ids
    assert_eq!(store.stored_proofs("a@b.com"), Some(vec![1, 2]));

    let (status, body) = post_json(
        &app,
        "/login",
        json!({"email": "a@b.com", "password": "secret1"}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user"]["proofs_completed"], json!([1, 2]));

    Ok(())
}

#[tokio::test]
async fn test_duplicate_signup_rejected_regardless_of_password() -> Result<()> {
    let app = app_for(&spawn_stub(StubStore::new(vec![1, 2])).await?)?;

    let (status, _) = post_json(
        &app,
        "/signup",
        json!({"email": "a@b.com", "password": "secret1"}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    for password in ["secret1", "different-password", "short"] {
        let (status, body) = post_json(
            &app,
            "/signup",
            json!({"email": "a@b.com", "password": password}),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(
            body["error"],
            "An account with this email already exists. Please log in instead."
        );
    }

    Ok(())
}

#[tokio::test]
async fn test_login_unknown_email() -> Result<()> {
    let app = app_for(&spawn_stub(StubStore::new(vec![1, 2])).await?)?;

    let (status, body) = post_json(
        &app,
        "/login",
        json!({"email": "nobody@b.com", "password": "secret1"}),
    )
    .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(
        body["error"],
        "No account found with this email. Please sign up first."
    );

    Ok(())
}

#[tokio::test]
async fn test_login_wrong_password() -> Result<()> {
    let app = app_for(&spawn_stub(StubStore::new(vec![1, 2])).await?)?;

    let (status, _) = post_json(
        &app,
        "/signup",
        json!({"email": "a@b.com", "password": "secret1"}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = post_json(
        &app,
        "/login",
        json!({"email": "a@b.com", "password": "secret2"}),
    )
    .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Incorrect password. Please try again.");

    Ok(())
}

#[tokio::test]
async fn test_update_proofs_requires_known_user() -> Result<()> {
    let app = app_for(&spawn_stub(StubStore::new(vec![1, 2])).await?)?;

    let (status, body) = post_json(
        &app,
        "/update-proofs",
        json!({"email": "nobody@b.com", "proofs": [1]}),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "User not found");

    let (status, body) = post_json(&app, "/update-proofs", json!({"email": "", "proofs": [1]})).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "User must be logged in");

    Ok(())
}

#[tokio::test]
async fn test_update_proofs_empty_list_clears_and_is_idempotent() -> Result<()> {
    let store = StubStore::new(vec![1, 2]);
    let app = app_for(&spawn_stub(store.clone()).await?)?;

    let (status, _) = post_json(
        &app,
        "/signup",
        json!({"email": "a@b.com", "password": "secret1"}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = post_json(
        &app,
        "/update-proofs",
        json!({"email": "a@b.com", "proofs": [1, 2]}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["proofs"], json!(["1", "2"]));

    // full replace, a shorter list shrinks the stored set
    for _ in 0..2 {
        let (status, body) = post_json(
            &app,
            "/update-proofs",
            json!({"email": "a@b.com", "proofs": []}),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["proofs"], json!([]));
        assert_eq!(store.stored_proofs("a@b.com"), Some(Vec::new()));
    }

    // unknown ids alone also clear the set
    let (status, body) = post_json(
        &app,
        "/update-proofs",
        json!({"email": "a@b.com", "proofs": [999]}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["proofs"], json!([]));
    assert_eq!(store.stored_proofs("a@b.com"), Some(Vec::new()));

    Ok(())
}
