//! Process-wide default [`Client`] and free functions that start a chain from it.
//!
//! ```ignore
//! let body = httpc::global::set_query_param("q", ["rust"])
//!     .get("https://example.com/search")
//!     .await?
//!     .text()
//!     .await;
//! ```
//!
//! The default client is created on first use with [`ClientConfig::default`]
//! and never changes; every function here returns a new value derived from it.

use crate::body::{Body, RequestBody};
use crate::client::Client;
use crate::config::ClientConfig;
use crate::dns::NameResolver;
use crate::error::HttpError;
use crate::multipart::FormDataRow;
use crate::response::HttpResponse;
use crate::transport::Transport;
use http::{Method, Request};
use serde::Serialize;
use std::sync::{Arc, OnceLock};
use std::time::Duration;
use tokio_util::sync::CancellationToken;

static DEFAULT_CLIENT: OnceLock<Client> = OnceLock::new();

/// The shared default client
#[must_use]
pub fn default_client() -> &'static Client {
    DEFAULT_CLIENT.get_or_init(|| Client::with_config(ClientConfig::default()))
}

/// See [`Client::set_base_url`].
#[must_use]
pub fn set_base_url(url: impl Into<String>) -> Client {
    default_client().set_base_url(url)
}

/// See [`Client::set_query_param`].
#[must_use]
pub fn set_query_param<I, V>(key: impl Into<String>, values: I) -> Client
where
    I: IntoIterator<Item = V>,
    V: Into<String>,
{
    default_client().set_query_param(key, values)
}

/// See [`Client::add_query_param`].
#[must_use]
pub fn add_query_param<I, V>(key: impl Into<String>, values: I) -> Client
where
    I: IntoIterator<Item = V>,
    V: Into<String>,
{
    default_client().add_query_param(key, values)
}

/// See [`Client::set_query_string`].
#[must_use]
pub fn set_query_string(raw: &str) -> Client {
    default_client().set_query_string(raw)
}

/// See [`Client::add_query_string`].
#[must_use]
pub fn add_query_string(raw: &str) -> Client {
    default_client().add_query_string(raw)
}

/// See [`Client::set_header`].
#[must_use]
pub fn set_header(key: impl AsRef<str>, value: impl AsRef<str>) -> Client {
    default_client().set_header(key, value)
}

/// See [`Client::set_headers`].
#[must_use]
pub fn set_headers<I, K, V>(headers: I) -> Client
where
    I: IntoIterator<Item = (K, V)>,
    K: AsRef<str>,
    V: AsRef<str>,
{
    default_client().set_headers(headers)
}

/// See [`Client::set_user_agent`].
#[must_use]
pub fn set_user_agent(value: impl AsRef<str>) -> Client {
    default_client().set_user_agent(value)
}

/// See [`Client::set_content_type`].
#[must_use]
pub fn set_content_type(value: impl AsRef<str>) -> Client {
    default_client().set_content_type(value)
}

/// See [`Client::set_body`].
#[must_use]
pub fn set_body(body: impl Into<Body>) -> Client {
    default_client().set_body(body)
}

/// See [`Client::set_json_body`].
#[must_use]
pub fn set_json_body<T: Serialize + ?Sized>(value: &T) -> Client {
    default_client().set_json_body(value)
}

/// See [`Client::set_multipart_form`].
#[must_use]
pub fn set_multipart_form(rows: Vec<FormDataRow>) -> Client {
    default_client().set_multipart_form(rows)
}

/// See [`Client::set_proxy`].
#[must_use]
pub fn set_proxy(url: &str) -> Client {
    default_client().set_proxy(url)
}

/// See [`Client::set_timeout`].
#[must_use]
pub fn set_timeout(timeout: Duration) -> Client {
    default_client().set_timeout(timeout)
}

/// See [`Client::use_dns`].
#[must_use]
pub fn use_dns<I, S>(nameservers: I) -> Client
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    default_client().use_dns(nameservers)
}

/// See [`Client::set_resolver`].
#[must_use]
pub fn set_resolver(resolver: Arc<dyn NameResolver>) -> Client {
    default_client().set_resolver(resolver)
}

/// See [`Client::with_transport`].
#[must_use]
pub fn with_transport(transport: Arc<dyn Transport>) -> Client {
    default_client().with_transport(transport)
}

/// See [`Client::set_max_body_size`].
#[must_use]
pub fn set_max_body_size(max_body_size: usize) -> Client {
    default_client().set_max_body_size(max_body_size)
}

/// See [`Client::execute`].
///
/// # Errors
/// See [`Client::execute`].
pub async fn execute(method: Method, url: &str) -> Result<HttpResponse, HttpError> {
    default_client().execute(method, url).await
}

/// See [`Client::execute_with_cancel`].
///
/// # Errors
/// See [`Client::execute_with_cancel`].
pub async fn execute_with_cancel(
    cancel: &CancellationToken,
    method: Method,
    url: &str,
) -> Result<HttpResponse, HttpError> {
    default_client().execute_with_cancel(cancel, method, url).await
}

/// See [`Client::dispatch`].
///
/// # Errors
/// See [`Client::dispatch`].
pub async fn dispatch(request: Request<RequestBody>) -> Result<HttpResponse, HttpError> {
    default_client().dispatch(request).await
}

/// `GET url` on the default client.
///
/// # Errors
/// See [`Client::execute`].
pub async fn get(url: &str) -> Result<HttpResponse, HttpError> {
    default_client().get(url).await
}

/// `HEAD url` on the default client.
///
/// # Errors
/// See [`Client::execute`].
pub async fn head(url: &str) -> Result<HttpResponse, HttpError> {
    default_client().head(url).await
}

/// `OPTIONS url` on the default client.
///
/// # Errors
/// See [`Client::execute`].
pub async fn options(url: &str) -> Result<HttpResponse, HttpError> {
    default_client().options(url).await
}

/// `POST url` without a body on the default client.
///
/// # Errors
/// See [`Client::execute`].
pub async fn post(url: &str) -> Result<HttpResponse, HttpError> {
    default_client().post(url).await
}

/// `PUT url` without a body on the default client.
///
/// # Errors
/// See [`Client::execute`].
pub async fn put(url: &str) -> Result<HttpResponse, HttpError> {
    default_client().put(url).await
}

/// `PATCH url` without a body on the default client.
///
/// # Errors
/// See [`Client::execute`].
pub async fn patch(url: &str) -> Result<HttpResponse, HttpError> {
    default_client().patch(url).await
}

/// `DELETE url` on the default client.
///
/// # Errors
/// See [`Client::execute`].
pub async fn delete(url: &str) -> Result<HttpResponse, HttpError> {
    default_client().delete(url).await
}
