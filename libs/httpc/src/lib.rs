#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
#![warn(warnings)]

//! Chainable HTTP client over hyper and rustls
//!
//! A [`Client`] is an immutable configuration value. Every setter returns a
//! new value and leaves the receiver as it was, so a configured base can be
//! branched without one branch seeing another's query parameters or headers:
//!
//! - Base URL, query parameters (set/add, raw query strings), headers
//! - Buffered, streaming, JSON and `multipart/form-data` bodies
//! - HTTP (`CONNECT` tunnel) and SOCKS5 proxies, timeout, pluggable name resolution
//! - Deferred errors: a rejected setting is recorded in an [`ErrorChain`] and
//!   returned by the next terminal call, before any network activity
//! - Size-bounded body reads (64 KB by default)
//!
//! # Example
//!
//! ```ignore
//! use httpc::Client;
//! use std::time::Duration;
//!
//! let api = Client::new()
//!     .set_base_url("https://api.example.com")
//!     .set_timeout(Duration::from_secs(10))
//!     .set_header("Authorization", "Bearer token");
//!
//! let user: User = api
//!     .set_query_param("id", ["42"])
//!     .get("/users")
//!     .await?
//!     .json()
//!     .await?;
//!
//! let created = api.set_json_body(&new_user).post("/users").await?;
//! assert!(created.is_successful());
//! ```
//!
//! # Body reads
//!
//! [`HttpResponse::read_body`], [`HttpResponse::json`] and
//! [`HttpResponse::text`] reject statuses outside `200..=299` and bodies
//! larger than the client's cap ([`Client::set_max_body_size`]).
//! `text()` is lossy: it returns an empty string instead of an error.

mod body;
mod chain;
mod client;
mod config;
pub mod consts;
mod dispatch;
pub mod dns;
mod error;
pub mod global;
mod limit;
mod multipart;
mod query;
mod response;
pub mod transport;

pub use body::{Body, RequestBody};
pub use chain::ErrorChain;
pub use client::Client;
pub use config::{ClientConfig, DEFAULT_MAX_BODY_SIZE, DEFAULT_USER_AGENT, USER_AGENT_ENV};
pub use error::{BoxError, ConfigError, HttpError};
pub use limit::{LimitedBody, read_bounded};
pub use multipart::FormDataRow;
pub use query::QueryParams;
pub use response::HttpResponse;
pub use transport::{HyperTransport, ResponseBody, Transport, TransportFuture};

pub use http::{Method, StatusCode};
pub use tokio_util::sync::CancellationToken;
