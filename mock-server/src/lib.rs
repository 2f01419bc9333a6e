//! In-memory imitation of the Pocket v3 API.
//!
//! Serves `/v3/get`, `/v3/add` and `/v3/send` with JSON bodies. Failures are
//! reported the way the real service does: an empty body, a status code, and
//! the diagnostic text in an `X-Error` header.

use std::{collections::BTreeMap, sync::Arc};

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Map, Value};
use tokio::{net::TcpListener, sync::RwLock};

pub type Params = Map<String, Value>;

pub const MAINTENANCE_MESSAGE: &str = "Pocket server is down for scheduled maintenance";
pub const RATE_LIMIT_MESSAGE: &str =
    "User was authenticated, but access denied due to lack of permission or rate limiting";
pub const INVALID_CONSUMER_KEY_MESSAGE: &str = "Invalid consumer key";
pub const INVALID_ACCESS_TOKEN_MESSAGE: &str = "Invalid access token";
pub const BAD_REQUEST_MESSAGE: &str = "Invalid request, please refer to API documentation";

/// Credentials the server accepts and the failure modes it simulates.
#[derive(Debug, Clone)]
pub struct MockConfig {
    pub consumer_key: String,
    pub access_token: String,
    /// Requests served before every further one gets 403.
    pub request_limit: Option<u32>,
    /// Answer every request with 503.
    pub maintenance: bool,
}

impl MockConfig {
    pub fn new(consumer_key: impl Into<String>, access_token: impl Into<String>) -> Self {
        Self {
            consumer_key: consumer_key.into(),
            access_token: access_token.into(),
            request_limit: None,
            maintenance: false,
        }
    }

    pub fn with_request_limit(mut self, limit: u32) -> Self {
        self.request_limit = Some(limit);
        self
    }

    pub fn in_maintenance(mut self) -> Self {
        self.maintenance = true;
        self
    }
}

/// A saved item. `status` is "0" for unread and "1" for archived.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Item {
    pub item_id: String,
    pub given_url: String,
    pub given_title: String,
    pub status: String,
    pub favorite: String,
    pub time_added: u64,
    pub tags: Vec<String>,
}

impl Item {
    fn to_json(&self) -> Value {
        json!({
            "item_id": self.item_id,
            "given_url": self.given_url,
            "given_title": self.given_title,
            "status": self.status,
            "favorite": self.favorite,
            "time_added": self.time_added.to_string(),
            "tags": self.tags,
        })
    }
}

#[derive(Debug, Default)]
pub struct Store {
    clock: u64,
    requests: u32,
    items: BTreeMap<String, Item>,
}

impl Store {
    fn insert(&mut self, url: String, title: Option<String>, tags: Vec<String>) -> &Item {
        self.clock += 1;
        let item_id = self.clock.to_string();
        let item = Item {
            item_id: item_id.clone(),
            given_title: title.unwrap_or_default(),
            given_url: url,
            status: "0".to_string(),
            favorite: "0".to_string(),
            time_added: self.clock,
            tags,
        };
        self.items.entry(item_id).or_insert(item)
    }

    /// Apply one send action; the result goes into `action_results`.
    fn apply(&mut self, action: &Params) -> Value {
        let Some(name) = param_str(action, "action") else {
            return Value::Bool(false);
        };
        match name.as_str() {
            "add" => {
                return match param_str(action, "url") {
                    Some(url) => self
                        .insert(url, param_str(action, "title"), param_tags(action))
                        .to_json(),
                    None => Value::Bool(false),
                };
            }
            "tag_rename" => return Value::Bool(self.rename_tag(action)),
            _ => {}
        }

        let Some(item_id) = param_str(action, "item_id") else {
            return Value::Bool(false);
        };
        if name == "delete" {
            return Value::Bool(self.items.remove(&item_id).is_some());
        }
        let Some(item) = self.items.get_mut(&item_id) else {
            return Value::Bool(false);
        };
        match name.as_str() {
            "archive" => item.status = "1".to_string(),
            "readd" => item.status = "0".to_string(),
            "favorite" => item.favorite = "1".to_string(),
            "unfavorite" => item.favorite = "0".to_string(),
            "tags_add" => {
                for tag in param_tags(action) {
                    if !item.tags.contains(&tag) {
                        item.tags.push(tag);
                    }
                }
            }
            "tags_remove" => {
                let removed = param_tags(action);
                item.tags.retain(|tag| !removed.contains(tag));
            }
            "tags_replace" => item.tags = param_tags(action),
            "tags_clear" => item.tags.clear(),
            _ => return Value::Bool(false),
        }
        Value::Bool(true)
    }

    fn rename_tag(&mut self, action: &Params) -> bool {
        let (Some(old_tag), Some(new_tag)) =
            (param_str(action, "old_tag"), param_str(action, "new_tag"))
        else {
            return false;
        };
        for item in self.items.values_mut() {
            for tag in item.tags.iter_mut().filter(|tag| **tag == old_tag) {
                *tag = new_tag.clone();
            }
        }
        true
    }
}

#[derive(Clone)]
struct AppState {
    config: Arc<MockConfig>,
    store: Arc<RwLock<Store>>,
}

pub fn app(config: MockConfig) -> Router {
    let state = AppState {
        config: Arc::new(config),
        store: Arc::new(RwLock::new(Store::default())),
    };
    Router::new()
        .route("/v3/get", get(retrieve).post(retrieve))
        .route("/v3/add", post(add))
        .route("/v3/send", post(send))
        .with_state(state)
}

pub async fn run(listener: TcpListener, config: MockConfig) -> Result<(), std::io::Error> {
    axum::serve(listener, app(config)).await
}

/// A service-issued failure: status plus `X-Error` text, empty body.
#[derive(Debug)]
pub struct ApiFailure {
    status: StatusCode,
    message: &'static str,
}

impl ApiFailure {
    fn new(status: StatusCode, message: &'static str) -> Self {
        Self { status, message }
    }

    fn bad_request() -> Self {
        Self::new(StatusCode::BAD_REQUEST, BAD_REQUEST_MESSAGE)
    }
}

impl IntoResponse for ApiFailure {
    fn into_response(self) -> Response {
        (self.status, [("X-Error", self.message)]).into_response()
    }
}

/// Unparseable bodies get the same empty-body 400 as other bad requests.
fn json_body(payload: Result<Json<Params>, JsonRejection>) -> Result<Params, ApiFailure> {
    payload.map(|Json(params)| params).map_err(|rejection| {
        tracing::debug!(%rejection, "rejected request body");
        ApiFailure::bad_request()
    })
}

/// Checks maintenance mode, credentials and the request budget, in that order.
fn authorize(config: &MockConfig, store: &mut Store, params: &Params) -> Result<(), ApiFailure> {
    if config.maintenance {
        return Err(ApiFailure::new(StatusCode::SERVICE_UNAVAILABLE, MAINTENANCE_MESSAGE));
    }
    if param_str(params, "consumer_key").as_deref() != Some(config.consumer_key.as_str()) {
        tracing::warn!("rejected request with unknown consumer key");
        return Err(ApiFailure::new(StatusCode::UNAUTHORIZED, INVALID_CONSUMER_KEY_MESSAGE));
    }
    if param_str(params, "access_token").as_deref() != Some(config.access_token.as_str()) {
        tracing::warn!("rejected request with unknown access token");
        return Err(ApiFailure::new(StatusCode::UNAUTHORIZED, INVALID_ACCESS_TOKEN_MESSAGE));
    }
    store.requests += 1;
    if config.request_limit.is_some_and(|limit| store.requests > limit) {
        return Err(ApiFailure::new(StatusCode::FORBIDDEN, RATE_LIMIT_MESSAGE));
    }
    Ok(())
}

async fn retrieve(
    State(state): State<AppState>,
    payload: Result<Json<Params>, JsonRejection>,
) -> Result<Json<Value>, ApiFailure> {
    let params = json_body(payload)?;
    let mut store = state.store.write().await;
    authorize(&state.config, &mut store, &params)?;

    let mut items: Vec<&Item> = store
        .items
        .values()
        .filter(|item| matches_filters(item, &params))
        .collect();
    sort_items(&mut items, param_str(&params, "sort").as_deref());

    let offset = param_u64(&params, "offset").unwrap_or(0) as usize;
    let count = param_u64(&params, "count").map_or(usize::MAX, |count| count as usize);
    let list: Params = items
        .into_iter()
        .skip(offset)
        .take(count)
        .enumerate()
        .map(|(sort_id, item)| {
            let mut value = item.to_json();
            value["sort_id"] = json!(sort_id);
            (item.item_id.clone(), value)
        })
        .collect();
    tracing::debug!(returned = list.len(), "retrieve");

    Ok(Json(json!({
        "status": 1,
        "complete": 1,
        "list": list,
        "since": store.clock,
    })))
}

async fn add(
    State(state): State<AppState>,
    payload: Result<Json<Params>, JsonRejection>,
) -> Result<Json<Value>, ApiFailure> {
    let params = json_body(payload)?;
    let mut store = state.store.write().await;
    authorize(&state.config, &mut store, &params)?;

    let url = param_str(&params, "url")
        .filter(|url| !url.is_empty())
        .ok_or_else(ApiFailure::bad_request)?;
    let item = store.insert(url, param_str(&params, "title"), param_tags(&params));
    tracing::debug!(item_id = %item.item_id, "added item");

    Ok(Json(json!({ "item": item.to_json(), "status": 1 })))
}

/// Accepts either a batch under `actions` or a single flattened action.
async fn send(
    State(state): State<AppState>,
    payload: Result<Json<Params>, JsonRejection>,
) -> Result<Json<Value>, ApiFailure> {
    let params = json_body(payload)?;
    let mut store = state.store.write().await;
    authorize(&state.config, &mut store, &params)?;

    let actions: Vec<Params> = match params.get("actions") {
        Some(Value::Array(list)) => list
            .iter()
            .map(|action| action.as_object().cloned().ok_or_else(ApiFailure::bad_request))
            .collect::<Result<_, _>>()?,
        Some(_) => return Err(ApiFailure::bad_request()),
        None if params.contains_key("action") => vec![params.clone()],
        None => return Err(ApiFailure::bad_request()),
    };
    let results: Vec<Value> = actions.iter().map(|action| store.apply(action)).collect();
    tracing::debug!(actions = results.len(), "applied actions");

    Ok(Json(json!({ "status": 1, "action_results": results })))
}

fn matches_filters(item: &Item, params: &Params) -> bool {
    let state_ok = match param_str(params, "state").as_deref() {
        Some("archive") => item.status == "1",
        Some("all") => true,
        _ => item.status == "0",
    };
    let favorite_ok =
        param_str(params, "favorite").is_none_or(|favorite| item.favorite == favorite);
    let tag_ok = match param_str(params, "tag").as_deref() {
        None => true,
        Some("_untagged_") => item.tags.is_empty(),
        Some(tag) => item.tags.iter().any(|t| t == tag),
    };
    let search_ok = param_str(params, "search").is_none_or(|search| {
        let search = search.to_lowercase();
        item.given_title.to_lowercase().contains(&search)
            || item.given_url.to_lowercase().contains(&search)
    });
    let domain_ok =
        param_str(params, "domain").is_none_or(|domain| item.given_url.contains(domain.as_str()));
    state_ok && favorite_ok && tag_ok && search_ok && domain_ok
}

fn sort_items(items: &mut [&Item], sort: Option<&str>) {
    match sort {
        Some("oldest") => items.sort_by_key(|item| item.time_added),
        Some("title") => items.sort_by(|a, b| a.given_title.cmp(&b.given_title)),
        Some("site") => items.sort_by(|a, b| a.given_url.cmp(&b.given_url)),
        _ => items.sort_by(|a, b| b.time_added.cmp(&a.time_added)),
    }
}

/// Read a scalar parameter as text; clients send numbers and strings alike.
fn param_str(params: &Params, key: &str) -> Option<String> {
    match params.get(key)? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(if *b { "1" } else { "0" }.to_string()),
        _ => None,
    }
}

fn param_u64(params: &Params, key: &str) -> Option<u64> {
    param_str(params, key)?.parse().ok()
}

fn param_tags(params: &Params) -> Vec<String> {
    param_str(params, "tags")
        .map(|tags| {
            tags.split(',')
                .map(str::trim)
                .filter(|tag| !tag.is_empty())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}
