//! Synchronous API client core for the Pocket read-it-later service.
//!
//! # Overview
//! Every operation (retrieve, add, modify, batch modify) funnels through a
//! single dispatcher that merges the caller's parameters with the consumer
//! key and access token, hands the JSON body to a [`Transport`], and maps the
//! HTTP status back into either the decoded body or a typed [`ApiError`].
//!
//! # Design
//! - `PocketClient` owns its `ClientConfig`; several differently configured
//!   clients can live in one process.
//! - Request building and response parsing are pure (`build_*` /
//!   `parse_response`), so the I/O boundary stays explicit and the
//!   dispatcher can be exercised without a network.
//! - Option builders are typed but keep an `extra` map; the service is the
//!   authority on which keys are valid.

pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod transport;
pub mod types;

pub use client::{PocketClient, ADD_PATH, RETRIEVE_PATH, SEND_PATH};
pub use config::{ClientConfig, DEFAULT_BASE_URL};
pub use error::{ApiError, TransportError};
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use transport::{Transport, UreqTransport};
pub use types::{
    Action, AddOptions, ContentType, DetailType, ModifyAction, ModifyOptions, Params,
    RetrieveOptions, Sort, State,
};
