//! Mock Entra ID + Key Vault server
//!
//! Routes come from the shared `paths` crate so the mock and the client agree
//! on the API surface.

use axum::{
    extract::{Form, Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use keyvault_dump::config::{Credentials, DumperConfig, VaultLocation};
use paths::azure::{ROUTE_GET_SECRET, ROUTE_GET_SECRET_VERSION, ROUTE_LIST_SECRETS, ROUTE_TOKEN};
use serde_json::json;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::net::TcpListener;

pub const CLIENT_ID: &str = "00000000-0000-0000-0000-000000000001";
pub const CLIENT_SECRET: &str = "mock-client-secret";
pub const TENANT_ID: &str = "00000000-0000-0000-0000-00000000000a";
const ACCESS_TOKEN: &str = "mock-access-token";

/// A seeded secret
#[derive(Debug, Clone)]
pub struct MockSecret {
    pub name: String,
    pub version: String,
    pub value: String,
    pub enabled: bool,
}

impl MockSecret {
    pub fn enabled(name: &str, value: &str) -> Self {
        Self {
            name: name.to_string(),
            version: format!("{name}-v1"),
            value: value.to_string(),
            enabled: true,
        }
    }

    pub fn disabled(name: &str, value: &str) -> Self {
        Self {
            enabled: false,
            ..Self::enabled(name, value)
        }
    }
}

/// Behaviour of the mock for one test
#[derive(Debug, Default)]
pub struct MockBehaviour {
    /// Listing pages, in order
    pub pages: Vec<Vec<MockSecret>>,
    /// Listed but deleted before the fetch (404 on get)
    pub deleted: HashSet<String>,
    /// Listed but answering get with this status
    pub fetch_status: HashMap<String, StatusCode>,
    /// Status returned by every listing request
    pub list_status: Option<StatusCode>,
    /// Next link pointing at another host
    pub foreign_next_link: bool,
}

#[derive(Debug, Default)]
pub struct RequestCounts {
    pub token: AtomicUsize,
    pub list: AtomicUsize,
    pub get: AtomicUsize,
}

#[derive(Clone)]
struct MockState {
    base_url: String,
    behaviour: Arc<MockBehaviour>,
    counts: Arc<RequestCounts>,
    fetched: Arc<Mutex<Vec<String>>>,
}

/// Running mock server
pub struct MockKeyVault {
    pub base_url: String,
    pub counts: Arc<RequestCounts>,
    fetched: Arc<Mutex<Vec<String>>>,
    handle: tokio::task::JoinHandle<()>,
}

impl Drop for MockKeyVault {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

impl MockKeyVault {
    /// Start the mock on 127.0.0.1 with an ephemeral port
    pub async fn start(behaviour: MockBehaviour) -> Self {
        drop(rustls::crypto::ring::default_provider().install_default());

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base_url = format!("http://{}/", listener.local_addr().unwrap());
        let counts = Arc::new(RequestCounts::default());
        let fetched = Arc::new(Mutex::new(Vec::new()));
        let state = MockState {
            base_url: base_url.clone(),
            behaviour: Arc::new(behaviour),
            counts: Arc::clone(&counts),
            fetched: Arc::clone(&fetched),
        };

        let app = Router::new()
            .route(ROUTE_TOKEN, post(token))
            .route(ROUTE_LIST_SECRETS, get(list_secrets))
            .route(ROUTE_GET_SECRET, get(get_secret))
            .route(ROUTE_GET_SECRET_VERSION, get(get_secret_version))
            .with_state(state);

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            base_url,
            counts,
            fetched,
            handle,
        }
    }

    /// Config pointing both the authority host and the vault at this mock
    pub fn config(&self) -> DumperConfig {
        self.config_with_secret(CLIENT_SECRET)
    }

    pub fn config_with_secret(&self, client_secret: &str) -> DumperConfig {
        DumperConfig::new(
            Credentials::new(CLIENT_ID, client_secret, TENANT_ID).unwrap(),
            VaultLocation::parse(&self.base_url).unwrap(),
        )
        .with_authority_host(&self.base_url)
        .unwrap()
    }

    pub fn token_requests(&self) -> usize {
        self.counts.token.load(Ordering::SeqCst)
    }

    pub fn list_requests(&self) -> usize {
        self.counts.list.load(Ordering::SeqCst)
    }

    pub fn get_requests(&self) -> usize {
        self.counts.get.load(Ordering::SeqCst)
    }

    /// Secret names requested by get, in arrival order
    pub fn fetched(&self) -> Vec<String> {
        self.fetched.lock().unwrap().clone()
    }
}

fn vault_error(status: StatusCode, code: &str, message: &str) -> Response {
    (
        status,
        Json(json!({ "error": { "code": code, "message": message } })),
    )
        .into_response()
}

fn authorized(headers: &HeaderMap) -> bool {
    headers
        .get("authorization")
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value == format!("Bearer {ACCESS_TOKEN}"))
}

/// POST /{tenant}/oauth2/v2.0/token
async fn token(
    State(state): State<MockState>,
    Path(tenant): Path<String>,
    Form(form): Form<HashMap<String, String>>,
) -> Response {
    state.counts.token.fetch_add(1, Ordering::SeqCst);

    let field = |key: &str| form.get(key).map(String::as_str);
    if tenant != TENANT_ID || field("grant_type") != Some("client_credentials") {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "error": "invalid_request",
                "error_description": "AADSTS900144: The request body must contain the following parameter: 'grant_type'."
            })),
        )
            .into_response();
    }
    if field("client_id") != Some(CLIENT_ID) || field("client_secret") != Some(CLIENT_SECRET) {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({
                "error": "invalid_client",
                "error_description": "AADSTS7000215: Invalid client secret provided."
            })),
        )
            .into_response();
    }

    Json(json!({
        "token_type": "Bearer",
        "expires_in": 3599,
        "ext_expires_in": 3599,
        "access_token": ACCESS_TOKEN
    }))
    .into_response()
}

/// GET /secrets?api-version=...&maxresults=...[&$skiptoken=N]
async fn list_secrets(
    State(state): State<MockState>,
    headers: HeaderMap,
    Query(query): Query<HashMap<String, String>>,
) -> Response {
    state.counts.list.fetch_add(1, Ordering::SeqCst);

    if !authorized(&headers) {
        return vault_error(StatusCode::UNAUTHORIZED, "Unauthorized", "AKV10000: Request is missing a Bearer or PoP token.");
    }
    if let Some(status) = state.behaviour.list_status {
        return vault_error(status, "Forbidden", "The user, group or application does not have secrets list permission.");
    }

    let page: usize = query
        .get("$skiptoken")
        .and_then(|token| token.parse().ok())
        .unwrap_or(0);
    let pages = &state.behaviour.pages;
    let items: Vec<_> = pages
        .get(page)
        .map(Vec::as_slice)
        .unwrap_or_default()
        .iter()
        .map(|secret| {
            json!({
                "id": format!("{}secrets/{}", state.base_url, secret.name),
                "attributes": { "enabled": secret.enabled, "recoveryLevel": "Recoverable+Purgeable" }
            })
        })
        .collect();

    let next_link = if page + 1 < pages.len() {
        let base = if state.behaviour.foreign_next_link {
            "https://elsewhere.example.com:443/"
        } else {
            state.base_url.as_str()
        };
        // Same shape as Key Vault: explicit port, skiptoken, maxresults last
        json!(format!(
            "{base}secrets?api-version=7.4&$skiptoken={}&maxresults=25",
            page + 1
        ))
    } else {
        serde_json::Value::Null
    };

    Json(json!({ "value": items, "nextLink": next_link })).into_response()
}

fn lookup(state: &MockState, name: &str, version: Option<&str>) -> Response {
    state.counts.get.fetch_add(1, Ordering::SeqCst);
    state.fetched.lock().unwrap().push(name.to_string());

    let behaviour = &state.behaviour;
    if let Some(&status) = behaviour.fetch_status.get(name) {
        return vault_error(status, "Failure", &format!("get {name} failed"));
    }
    let secret = behaviour
        .pages
        .iter()
        .flatten()
        .rfind(|secret| secret.name == name && version.is_none_or(|v| v == secret.version));
    match secret {
        Some(secret) if !behaviour.deleted.contains(name) => Json(json!({
            "value": secret.value,
            "id": format!("{}secrets/{}/{}", state.base_url, secret.name, secret.version),
            "attributes": { "enabled": secret.enabled }
        }))
        .into_response(),
        _ => vault_error(
            StatusCode::NOT_FOUND,
            "SecretNotFound",
            &format!("A secret with (name/id) {name} was not found in this key vault."),
        ),
    }
}

/// GET /secrets/{name}
async fn get_secret(
    State(state): State<MockState>,
    headers: HeaderMap,
    Path(name): Path<String>,
) -> Response {
    if !authorized(&headers) {
        return vault_error(StatusCode::UNAUTHORIZED, "Unauthorized", "missing token");
    }
    lookup(&state, &name, None)
}

/// GET /secrets/{name}/{version}
async fn get_secret_version(
    State(state): State<MockState>,
    headers: HeaderMap,
    Path((name, version)): Path<(String, String)>,
) -> Response {
    if !authorized(&headers) {
        return vault_error(StatusCode::UNAUTHORIZED, "Unauthorized", "missing token");
    }
    lookup(&state, &name, Some(&version))
}
