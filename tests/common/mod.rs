// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! In-process fake backend for integration tests.

use axum::{
    extract::{Path, Request, State},
    http::{header, HeaderMap, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{delete, get, post},
    Json, Router,
};
use psa_client::config::Config;
use psa_client::session::{SessionKey, SessionStore};
use psa_client::PsaClient;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub const INITIAL_ACCESS: &str = "access-1";
pub const INITIAL_REFRESH: &str = "refresh-1";
pub const VALID_OTP: &str = "123456";
pub const RESET_GRANT: &str = "reset-grant";

/// How the fake answers `/api/auth/refresh_token/`.
#[allow(dead_code)]
#[derive(Debug, Clone)]
pub enum RefreshBehavior {
    /// 200 with a new access token (and optionally a rotated refresh token).
    Issue {
        access: String,
        refresh: Option<String>,
    },
    /// 200 with an access token the protected routes still reject.
    IssueUnusable(String),
    /// 200 with no `access` key.
    NoAccess,
    /// 200 with a plain-text body.
    NonJson,
    /// 204 with no body.
    NoContent,
    /// 401 `{"detail": "Token is invalid"}`.
    Invalid,
    /// 401 with some other detail.
    Unauthorized,
    /// 500.
    ServerError,
}

/// One request seen by the fake.
#[allow(dead_code)]
#[derive(Debug, Clone)]
pub struct Recorded {
    pub method: String,
    pub path: String,
    pub authorization: Option<String>,
}

/// Body of a public auth call, with its content type.
#[allow(dead_code)]
#[derive(Debug, Clone)]
pub struct RecordedBody {
    pub path: String,
    pub content_type: String,
    pub fields: HashMap<String, String>,
}

pub struct FakeState {
    pub valid_access: Mutex<String>,
    pub refresh_behavior: Mutex<RefreshBehavior>,
    pub refresh_delay: Mutex<Duration>,
    pub refresh_calls: AtomicUsize,
    pub requests: Mutex<Vec<Recorded>>,
    pub bodies: Mutex<Vec<RecordedBody>>,
    pub chats: Mutex<Vec<Value>>,
    pub accounts: Mutex<Vec<Value>>,
}

impl FakeState {
    fn new() -> Self {
        Self {
            valid_access: Mutex::new(INITIAL_ACCESS.to_string()),
            refresh_behavior: Mutex::new(RefreshBehavior::Issue {
                access: "access-2".to_string(),
                refresh: None,
            }),
            refresh_delay: Mutex::new(Duration::ZERO),
            refresh_calls: AtomicUsize::new(0),
            requests: Mutex::new(Vec::new()),
            bodies: Mutex::new(Vec::new()),
            chats: Mutex::new(Vec::new()),
            accounts: Mutex::new(Vec::new()),
        }
    }

    #[allow(dead_code)]
    pub fn set_refresh(&self, behavior: RefreshBehavior) {
        *self.refresh_behavior.lock().unwrap() = behavior;
    }

    /// Make the current access token stale; only `access` is accepted.
    #[allow(dead_code)]
    pub fn rotate_valid_access(&self, access: &str) {
        *self.valid_access.lock().unwrap() = access.to_string();
    }

    #[allow(dead_code)]
    pub fn refresh_calls(&self) -> usize {
        self.refresh_calls.load(Ordering::SeqCst)
    }

    /// Authorization headers sent to `path`, in order.
    #[allow(dead_code)]
    pub fn authorizations_for(&self, path: &str) -> Vec<Option<String>> {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.path == path)
            .map(|r| r.authorization.clone())
            .collect()
    }

    #[allow(dead_code)]
    pub fn calls_to(&self, path: &str) -> usize {
        self.authorizations_for(path).len()
    }

    #[allow(dead_code)]
    pub fn bodies_for(&self, path: &str) -> Vec<RecordedBody> {
        self.bodies
            .lock()
            .unwrap()
            .iter()
            .filter(|b| b.path == path)
            .cloned()
            .collect()
    }

    fn authorized(&self, headers: &HeaderMap) -> bool {
        let expected = format!("Bearer {}", self.valid_access.lock().unwrap());
        headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            == Some(expected.as_str())
    }
}

pub struct FakeBackend {
    pub url: String,
    pub state: Arc<FakeState>,
}

impl FakeBackend {
    /// Start the fake on an ephemeral port.
    pub async fn start() -> Self {
        let state = Arc::new(FakeState::new());
        let app = router(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind fake backend");
        let addr = listener.local_addr().expect("local addr");
        tokio::spawn(async move {
            axum::serve(listener, app).await.expect("fake backend");
        });

        Self {
            url: format!("http://{}", addr),
            state,
        }
    }

    /// Client with an empty in-memory session.
    #[allow(dead_code)]
    pub fn client(&self) -> PsaClient {
        let session = Arc::new(SessionStore::in_memory());
        PsaClient::new(Config::test_default(&self.url), session).expect("client")
    }

    /// Client whose session already holds the initial credentials.
    #[allow(dead_code)]
    pub fn logged_in_client(&self) -> PsaClient {
        let client = self.client();
        client
            .session
            .set(SessionKey::AccessToken, INITIAL_ACCESS)
            .unwrap();
        client
            .session
            .set(SessionKey::RefreshToken, INITIAL_REFRESH)
            .unwrap();
        client.session.set(SessionKey::Username, "ada").unwrap();
        client
    }
}

fn router(state: Arc<FakeState>) -> Router {
    Router::new()
        .route("/api/auth/login/", post(login))
        .route("/api/auth/login_google/", post(login_google))
        .route("/api/auth/otp/", post(otp))
        .route("/api/auth/verify_otp/", post(verify_otp))
        .route("/api/auth/register/", post(register))
        .route("/api/auth/refresh_token/", post(refresh_token))
        .route("/api/auth/reset_password/", post(reset_password))
        .route("/api/auth/is_auth/", post(protected_ok))
        .route("/api/auth/change_password/", post(protected_ok))
        .route("/api/chat/history/", get(chat_history))
        .route("/api/chat/create/", post(create_chat))
        .route(
            "/api/chat/chat/{id}/",
            get(chat_messages).put(protected_ok).delete(delete_chat),
        )
        .route("/api/chat/send_prompt/{id}/", post(send_prompt))
        .route("/api/chat/delete_all/", delete(delete_all))
        .route("/api/user/problem_solving_accounts/", get(list_accounts))
        .route("/api/user/add_handle/", post(add_handle))
        .route(
            "/api/user/verify_handle/{id}/",
            get(verify_challenge).post(verify_confirm),
        )
        .route(
            "/api/user/problem_solving_account/{id}/",
            delete(remove_account),
        )
        .route("/api/profile/oj_insights/cf/", get(insights))
        .route("/api/status/{code}/", get(fixed_status))
        .layer(middleware::from_fn_with_state(state.clone(), record))
        .with_state(state)
}

async fn record(State(state): State<Arc<FakeState>>, request: Request, next: Next) -> Response {
    let authorization = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    state.requests.lock().unwrap().push(Recorded {
        method: request.method().to_string(),
        path: request.uri().path().to_string(),
        authorization,
    });
    next.run(request).await
}

fn unauthorized() -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({
            "detail": "Given token not valid for any token type",
            "code": "token_not_valid"
        })),
    )
        .into_response()
}

/// Parse a JSON or urlencoded body into string fields.
fn parse_fields(headers: &HeaderMap, body: &str) -> (String, HashMap<String, String>) {
    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();

    let fields = if content_type.starts_with("application/json") {
        serde_json::from_str::<HashMap<String, Value>>(body)
            .unwrap_or_default()
            .into_iter()
            .map(|(k, v)| {
                let v = v.as_str().map(str::to_string).unwrap_or_else(|| v.to_string());
                (k, v)
            })
            .collect()
    } else {
        body.split('&')
            .filter(|pair| !pair.is_empty())
            .filter_map(|pair| pair.split_once('='))
            .map(|(k, v)| {
                let decode = |s: &str| {
                    urlencoding::decode(&s.replace('+', " "))
                        .map(|c| c.into_owned())
                        .unwrap_or_default()
                };
                (decode(k), decode(v))
            })
            .collect()
    };
    (content_type, fields)
}

fn record_body(
    state: &FakeState,
    path: &str,
    headers: &HeaderMap,
    body: &str,
) -> HashMap<String, String> {
    let (content_type, fields) = parse_fields(headers, body);
    state.bodies.lock().unwrap().push(RecordedBody {
        path: path.to_string(),
        content_type,
        fields: fields.clone(),
    });
    fields
}

fn login_envelope() -> Value {
    json!({
        "status": 200,
        "message": "Login successful",
        "data": {
            "access": INITIAL_ACCESS,
            "refresh": INITIAL_REFRESH,
            "user": {
                "username": "ada",
                "email": "ada@example.com",
                "first_name": "Ada",
                "last_name": "Lovelace"
            }
        }
    })
}

// ─── Auth ────────────────────────────────────────────────────────────────────

async fn login(State(state): State<Arc<FakeState>>, headers: HeaderMap, body: String) -> Response {
    let fields = record_body(&state, "/api/auth/login/", &headers, &body);
    if fields.get("password").map(String::as_str) == Some("correct-horse") {
        Json(login_envelope()).into_response()
    } else {
        Json(json!({"status": 400, "message": "Invalid credentials"})).into_response()
    }
}

async fn login_google(
    State(state): State<Arc<FakeState>>,
    headers: HeaderMap,
    body: String,
) -> Response {
    let fields = record_body(&state, "/api/auth/login_google/", &headers, &body);
    if fields.get("code").map(String::as_str) == Some("google-code") {
        Json(login_envelope()).into_response()
    } else {
        (
            StatusCode::BAD_REQUEST,
            Json(json!({"message": "Invalid authorization code"})),
        )
            .into_response()
    }
}

async fn otp(State(state): State<Arc<FakeState>>, headers: HeaderMap, body: String) -> Response {
    record_body(&state, "/api/auth/otp/", &headers, &body);
    Json(json!({"message": "OTP sent"})).into_response()
}

async fn verify_otp(
    State(state): State<Arc<FakeState>>,
    headers: HeaderMap,
    body: String,
) -> Response {
    let fields = record_body(&state, "/api/auth/verify_otp/", &headers, &body);
    if fields.get("otp").map(String::as_str) != Some(VALID_OTP) {
        return (StatusCode::BAD_REQUEST, Json(json!({"message": "Invalid OTP"}))).into_response();
    }
    if fields.get("option").map(String::as_str) == Some("reset_password") {
        Json(json!({"status": 200, "data": {"access": RESET_GRANT}})).into_response()
    } else {
        Json(json!({"message": "OTP verified"})).into_response()
    }
}

async fn register(
    State(state): State<Arc<FakeState>>,
    headers: HeaderMap,
    body: String,
) -> Response {
    record_body(&state, "/api/auth/register/", &headers, &body);
    (StatusCode::CREATED, Json(json!({"message": "User registered"}))).into_response()
}

async fn refresh_token(State(state): State<Arc<FakeState>>) -> Response {
    state.refresh_calls.fetch_add(1, Ordering::SeqCst);

    let delay = *state.refresh_delay.lock().unwrap();
    if !delay.is_zero() {
        tokio::time::sleep(delay).await;
    }

    let behavior = state.refresh_behavior.lock().unwrap().clone();
    match behavior {
        RefreshBehavior::Issue { access, refresh } => {
            *state.valid_access.lock().unwrap() = access.clone();
            let mut body = json!({"access": access});
            if let Some(refresh) = refresh {
                body["refresh"] = Value::String(refresh);
            }
            Json(body).into_response()
        }
        RefreshBehavior::IssueUnusable(access) => Json(json!({ "access": access })).into_response(),
        RefreshBehavior::NoAccess => Json(json!({})).into_response(),
        RefreshBehavior::NonJson => (StatusCode::OK, "OK").into_response(),
        RefreshBehavior::NoContent => StatusCode::NO_CONTENT.into_response(),
        RefreshBehavior::Invalid => (
            StatusCode::UNAUTHORIZED,
            Json(json!({"detail": "Token is invalid", "code": "token_not_valid"})),
        )
            .into_response(),
        RefreshBehavior::Unauthorized => (
            StatusCode::UNAUTHORIZED,
            Json(json!({"detail": "Token is blacklisted"})),
        )
            .into_response(),
        RefreshBehavior::ServerError => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({"message": "Refresh unavailable"})),
        )
            .into_response(),
    }
}

async fn reset_password(
    State(state): State<Arc<FakeState>>,
    headers: HeaderMap,
    body: String,
) -> Response {
    let expected = format!("Bearer {}", RESET_GRANT);
    if headers.get(header::AUTHORIZATION).and_then(|v| v.to_str().ok()) != Some(expected.as_str()) {
        return unauthorized();
    }
    record_body(&state, "/api/auth/reset_password/", &headers, &body);
    Json(json!({"message": "Password reset"})).into_response()
}

async fn protected_ok(State(state): State<Arc<FakeState>>, headers: HeaderMap) -> Response {
    if !state.authorized(&headers) {
        return unauthorized();
    }
    Json(json!({"message": "ok"})).into_response()
}

// ─── Chat ────────────────────────────────────────────────────────────────────

async fn chat_history(State(state): State<Arc<FakeState>>, headers: HeaderMap) -> Response {
    if !state.authorized(&headers) {
        return unauthorized();
    }
    let chats = state.chats.lock().unwrap().clone();
    Json(Value::Array(chats)).into_response()
}

async fn create_chat(State(state): State<Arc<FakeState>>, headers: HeaderMap) -> Response {
    if !state.authorized(&headers) {
        return unauthorized();
    }
    Json(json!({"chat_id": 42})).into_response()
}

async fn chat_messages(
    State(state): State<Arc<FakeState>>,
    Path(id): Path<i64>,
    headers: HeaderMap,
) -> Response {
    if !state.authorized(&headers) {
        return unauthorized();
    }
    if id == 404 {
        return (StatusCode::NOT_FOUND, Json(json!({"detail": "Not found."}))).into_response();
    }
    Json(json!({
        "data": [
            {"markdown_content": "How do I start with DP?"},
            {"markdown_content": "Begin with **Fibonacci**."}
        ]
    }))
    .into_response()
}

async fn delete_chat(
    State(state): State<Arc<FakeState>>,
    Path(id): Path<i64>,
    headers: HeaderMap,
) -> Response {
    if !state.authorized(&headers) {
        return unauthorized();
    }
    if id == 404 {
        return (StatusCode::NOT_FOUND, Json(json!({"detail": "Not found."}))).into_response();
    }
    state
        .chats
        .lock()
        .unwrap()
        .retain(|c| c.get("id").and_then(Value::as_i64) != Some(id));
    Json(json!({"message": "Chat deleted"})).into_response()
}

async fn delete_all(State(state): State<Arc<FakeState>>, headers: HeaderMap) -> Response {
    if !state.authorized(&headers) {
        return unauthorized();
    }
    state.chats.lock().unwrap().clear();
    StatusCode::NO_CONTENT.into_response()
}

async fn send_prompt(
    State(state): State<Arc<FakeState>>,
    Path(_id): Path<i64>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    if !state.authorized(&headers) {
        return unauthorized();
    }
    let prompt = body.get("prompt").and_then(Value::as_str).unwrap_or_default();
    if prompt.contains("fail") {
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({"message": "Assistant unavailable"})),
        )
            .into_response();
    }
    Json(json!({"response": format!("You said: {}", prompt)})).into_response()
}

// ─── Accounts / insights ─────────────────────────────────────────────────────

async fn list_accounts(State(state): State<Arc<FakeState>>, headers: HeaderMap) -> Response {
    if !state.authorized(&headers) {
        return unauthorized();
    }
    let accounts = state.accounts.lock().unwrap().clone();
    Json(json!({ "data": accounts })).into_response()
}

async fn add_handle(
    State(state): State<Arc<FakeState>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    if !state.authorized(&headers) {
        return unauthorized();
    }
    let mut accounts = state.accounts.lock().unwrap();
    let account = json!({
        "id": accounts.len() as i64 + 1,
        "platform": body["platform"],
        "handle": body["handle"],
        "status": "unverified"
    });
    accounts.push(account.clone());
    Json(account).into_response()
}

async fn verify_challenge(
    State(state): State<Arc<FakeState>>,
    Path(id): Path<i64>,
    headers: HeaderMap,
) -> Response {
    if !state.authorized(&headers) {
        return unauthorized();
    }
    Json(json!({
        "problem_link": format!("https://codeforces.com/problemset/problem/4/A?account={}", id),
        "message": "Submit a compilation error within 5 minutes"
    }))
    .into_response()
}

async fn verify_confirm(
    State(state): State<Arc<FakeState>>,
    Path(id): Path<i64>,
    headers: HeaderMap,
) -> Response {
    if !state.authorized(&headers) {
        return unauthorized();
    }
    let mut accounts = state.accounts.lock().unwrap();
    match accounts
        .iter_mut()
        .find(|a| a.get("id").and_then(Value::as_i64) == Some(id))
    {
        Some(account) => {
            account["status"] = Value::String("verified".to_string());
            Json(account.clone()).into_response()
        }
        None => (StatusCode::NOT_FOUND, Json(json!({"detail": "Not found."}))).into_response(),
    }
}

async fn remove_account(
    State(state): State<Arc<FakeState>>,
    Path(id): Path<i64>,
    headers: HeaderMap,
) -> Response {
    if !state.authorized(&headers) {
        return unauthorized();
    }
    state
        .accounts
        .lock()
        .unwrap()
        .retain(|a| a.get("id").and_then(Value::as_i64) != Some(id));
    StatusCode::NO_CONTENT.into_response()
}

async fn insights(State(state): State<Arc<FakeState>>, headers: HeaderMap) -> Response {
    if !state.authorized(&headers) {
        return unauthorized();
    }
    Json(json!({
        "data": {
            "handle": "tourist",
            "solved_by_level": {"800": 10, "1200": 5},
            "solved_by_tag": {"dp": 7, "greedy": 9, "math": 7},
            "contests": [{"name": "Div. 2", "solved_by_problem": {"A": 3, "B": 2}}]
        }
    }))
    .into_response()
}

async fn fixed_status(
    State(state): State<Arc<FakeState>>,
    Path(code): Path<u16>,
    headers: HeaderMap,
) -> Response {
    if !state.authorized(&headers) {
        return unauthorized();
    }
    let status = StatusCode::from_u16(code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (status, Json(json!({"message": format!("status {}", code)}))).into_response()
}
