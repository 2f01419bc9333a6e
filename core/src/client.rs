//! Request dispatcher and public operations for the Pocket API.
//!
//! # Design
//! Every operation goes through [`PocketClient::dispatch`]: the caller's
//! parameters are copied, the consumer key and access token are written over
//! them, the result is serialized as one JSON body and sent through the
//! client's [`Transport`]. The status code alone decides the outcome.
//!
//! Building (`build_*`) and interpreting (`parse_response`) are pure and
//! public, so hosts that do their own I/O can skip the transport entirely.

use serde_json::Value;

use crate::config::ClientConfig;
use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::transport::{Transport, UreqTransport};
use crate::types::{Action, AddOptions, ModifyAction, ModifyOptions, Params, RetrieveOptions};

pub const RETRIEVE_PATH: &str = "/v3/get";
pub const ADD_PATH: &str = "/v3/add";
pub const SEND_PATH: &str = "/v3/send";

const CONSUMER_KEY: &str = "consumer_key";
const ACCESS_TOKEN: &str = "access_token";
const ERROR_HEADER: &str = "X-Error";

/// Synchronous client for the Pocket API.
///
/// Holds the consumer key and a transport; carries no per-request state, so
/// a shared reference can be used from several threads at once.
#[derive(Debug, Clone)]
pub struct PocketClient<T = UreqTransport> {
    config: ClientConfig,
    transport: T,
}

impl PocketClient<UreqTransport> {
    pub fn new(config: ClientConfig) -> Self {
        let transport = UreqTransport::new(config.timeout());
        Self { config, transport }
    }
}

impl<T> PocketClient<T> {
    pub fn with_transport(config: ClientConfig, transport: T) -> Self {
        Self { config, transport }
    }

    /// Replace the consumer key. No format check is made; a bad key shows
    /// up as `ApiError::Unauthorized` on the next request.
    pub fn configure(&mut self, consumer_key: impl Into<String>) {
        self.config.consumer_key = consumer_key.into();
    }

    pub fn consumer_key(&self) -> &str {
        &self.config.consumer_key
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Build the request for `dispatch`.
    ///
    /// `body` is left untouched. `consumer_key` and `access_token` always
    /// take the client's values, whatever the caller put under those keys.
    pub fn build_request(
        &self,
        access_token: &str,
        method: HttpMethod,
        path: &str,
        body: &Params,
    ) -> HttpRequest {
        let mut payload = body.clone();
        for key in [CONSUMER_KEY, ACCESS_TOKEN] {
            if payload.contains_key(key) {
                tracing::debug!(key, "caller parameter replaced by credential");
            }
        }
        payload.insert(CONSUMER_KEY.to_string(), Value::from(self.consumer_key()));
        payload.insert(ACCESS_TOKEN.to_string(), Value::from(access_token));

        HttpRequest {
            method,
            url: format!("{}{path}", self.config.base_url()),
            headers: vec![
                ("content-type".to_string(), "application/json".to_string()),
                ("x-accept".to_string(), "application/json".to_string()),
            ],
            body: Some(Value::Object(payload).to_string()),
        }
    }

    pub fn build_retrieve(&self, access_token: &str, options: &RetrieveOptions) -> HttpRequest {
        self.build_request(
            access_token,
            HttpMethod::Get,
            RETRIEVE_PATH,
            &options.to_params(),
        )
    }

    /// Note that a `url` key in `options.extra` replaces the positional
    /// `url`; caller options are merged last.
    pub fn build_add(&self, access_token: &str, url: &str, options: &AddOptions) -> HttpRequest {
        let mut body = Params::new();
        body.insert("url".to_string(), Value::from(url));
        body.extend(options.to_params());
        self.build_request(access_token, HttpMethod::Post, ADD_PATH, &body)
    }

    /// Same override rule as `build_add`, for the `action` key.
    pub fn build_modify(
        &self,
        access_token: &str,
        action: &Action,
        options: &ModifyOptions,
    ) -> HttpRequest {
        let body = ModifyAction::new(action.clone(), options.clone()).to_params();
        self.build_request(access_token, HttpMethod::Post, SEND_PATH, &body)
    }

    /// An empty batch still produces a request with `"actions": []`.
    pub fn build_multi_modify(&self, access_token: &str, actions: &[ModifyAction]) -> HttpRequest {
        let actions = actions
            .iter()
            .map(|action| Value::Object(action.to_params()))
            .collect();
        let mut body = Params::new();
        body.insert("actions".to_string(), Value::Array(actions));
        self.build_request(access_token, HttpMethod::Post, SEND_PATH, &body)
    }

    /// Interpret a response: 200 yields the decoded body, anything else an
    /// `ApiError` carrying the `X-Error` header.
    pub fn parse_response(&self, response: HttpResponse) -> Result<Value, ApiError> {
        check_status(&response)?;
        Ok(decode_body(response.body))
    }
}

impl<T: Transport> PocketClient<T> {
    /// Send one request and interpret its status. No retries.
    pub fn dispatch(
        &self,
        access_token: &str,
        method: HttpMethod,
        path: &str,
        body: &Params,
    ) -> Result<Value, ApiError> {
        let request = self.build_request(access_token, method, path, body);
        self.send(request)
    }

    /// Fetch items. Filters are passed to the service unchecked.
    pub fn retrieve(
        &self,
        access_token: &str,
        options: &RetrieveOptions,
    ) -> Result<Value, ApiError> {
        self.send(self.build_retrieve(access_token, options))
    }

    pub fn add(
        &self,
        access_token: &str,
        url: &str,
        options: &AddOptions,
    ) -> Result<Value, ApiError> {
        self.send(self.build_add(access_token, url, options))
    }

    pub fn modify(
        &self,
        access_token: &str,
        action: &Action,
        options: &ModifyOptions,
    ) -> Result<Value, ApiError> {
        self.send(self.build_modify(access_token, action, options))
    }

    /// Apply several actions in one round trip.
    pub fn multi_modify(
        &self,
        access_token: &str,
        actions: &[ModifyAction],
    ) -> Result<Value, ApiError> {
        self.send(self.build_multi_modify(access_token, actions))
    }

    fn send(&self, request: HttpRequest) -> Result<Value, ApiError> {
        tracing::debug!(method = %request.method, url = %request.url, "dispatching request");
        let response = self.transport.execute(&request)?;
        tracing::debug!(status = response.status, "received response");
        self.parse_response(response)
    }
}

/// Map non-200 status codes to the matching `ApiError` kind.
fn check_status(response: &HttpResponse) -> Result<(), ApiError> {
    if response.status == 200 {
        return Ok(());
    }
    let message = response.header(ERROR_HEADER).unwrap_or_default();
    Err(ApiError::from_status(response.status, message))
}

/// JSON when possible; an empty body is `null`, anything else a string.
fn decode_body(body: String) -> Value {
    if body.trim().is_empty() {
        return Value::Null;
    }
    match serde_json::from_str(&body) {
        Ok(value) => value,
        Err(_) => Value::String(body),
    }
}
