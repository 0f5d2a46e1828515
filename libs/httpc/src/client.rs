use crate::body::Body;
use crate::chain::ErrorChain;
use crate::config::ClientConfig;
use crate::consts;
use crate::dns::{HostsResolver, NameResolver};
use crate::error::ConfigError;
use crate::multipart::{self, FormDataRow};
use crate::query::QueryParams;
use crate::transport::{HyperTransport, ProxyTarget, Transport, TransportSettings};
use http::header::{HeaderName, HeaderValue};
use http::HeaderMap;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;

/// Transport a [`Client`] dispatches on.
#[derive(Debug, Clone)]
pub enum TransportKind {
    /// hyper stack configured by this crate; proxy and resolver can be changed
    Builtin(Arc<HyperTransport>),
    /// caller-supplied transport, used as-is
    Custom(Arc<dyn Transport>),
}

impl TransportKind {
    pub(crate) fn as_transport(&self) -> &dyn Transport {
        match self {
            TransportKind::Builtin(transport) => transport.as_ref(),
            TransportKind::Custom(transport) => transport.as_ref(),
        }
    }

    fn settings(&self) -> Option<&TransportSettings> {
        match self {
            TransportKind::Builtin(transport) => Some(transport.settings()),
            TransportKind::Custom(_) => None,
        }
    }
}

/// Immutable, chainable HTTP client configuration.
///
/// Every setter takes `&self` and returns a new `Client`; the receiver is
/// never modified, so one base value can be branched freely:
///
/// ```ignore
/// let api = Client::new().set_base_url("https://api.example.com");
/// let users = api.set_query_param("page", ["2"]);
/// let search = api.add_query_string("q=rust");   // no `page` here
///
/// let list: Vec<User> = users.get("/users").await?.json().await?;
/// ```
///
/// Setters never fail. A rejected argument (bad proxy URL, malformed query
/// string, invalid header, unserializable body) is appended to the value's
/// [`ErrorChain`] and returned as `HttpError::Config` by the next terminal
/// call (`execute`, `get`, `dispatch`, ...) before any network activity.
///
/// Cloning is cheap: collections are shared and copied only when a branch
/// changes them.
#[derive(Debug, Clone)]
pub struct Client {
    pub(crate) base_url: Option<String>,
    pub(crate) query: Arc<QueryParams>,
    pub(crate) headers: Arc<HeaderMap>,
    pub(crate) body: Body,
    pub(crate) timeout: Option<Duration>,
    pub(crate) max_body_size: usize,
    pub(crate) user_agent: Arc<str>,
    pub(crate) transport: TransportKind,
    pub(crate) errors: Option<ErrorChain>,
}

impl Default for Client {
    fn default() -> Self {
        Self::new()
    }
}

impl Client {
    /// Client with [`ClientConfig::default`] and the built-in transport
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(ClientConfig::default())
    }

    /// Client with the given initial settings and the built-in transport
    #[must_use]
    pub fn with_config(config: ClientConfig) -> Self {
        Self {
            base_url: None,
            query: Arc::new(QueryParams::new()),
            headers: Arc::new(HeaderMap::new()),
            body: Body::empty(),
            timeout: config.timeout,
            max_body_size: config.max_body_size,
            user_agent: Arc::from(config.user_agent),
            transport: TransportKind::Builtin(Arc::new(HyperTransport::default())),
            errors: None,
        }
    }

    // -- accessors ---------------------------------------------------------

    /// Base URL prefixed to every request URL
    #[must_use]
    pub fn base_url(&self) -> Option<&str> {
        self.base_url.as_deref()
    }

    /// Configured query parameters
    #[must_use]
    pub fn query_params(&self) -> &QueryParams {
        &self.query
    }

    /// Configured request headers
    #[must_use]
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Configured request body
    #[must_use]
    pub fn body(&self) -> &Body {
        &self.body
    }

    /// Request timeout
    #[must_use]
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    /// Cap applied by the body readers of responses from this client
    #[must_use]
    pub fn max_body_size(&self) -> usize {
        self.max_body_size
    }

    /// Configuration errors accumulated so far, earliest first
    #[must_use]
    pub fn errors(&self) -> Option<&ErrorChain> {
        self.errors.as_ref()
    }

    // -- URL ---------------------------------------------------------------

    /// Prefix every request URL with `url`.
    #[must_use]
    pub fn set_base_url(&self, url: impl Into<String>) -> Self {
        self.derive(|next| next.base_url = Some(url.into()))
    }

    #[must_use]
    pub fn clear_base_url(&self) -> Self {
        self.derive(|next| next.base_url = None)
    }

    // -- query -------------------------------------------------------------

    /// Replace every value of query parameter `key`.
    #[must_use]
    pub fn set_query_param<I, V>(&self, key: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<String>,
    {
        self.derive(|next| Arc::make_mut(&mut next.query).set(key, values))
    }

    /// Append values to query parameter `key`.
    #[must_use]
    pub fn add_query_param<I, V>(&self, key: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<String>,
    {
        self.derive(|next| Arc::make_mut(&mut next.query).add(key, values))
    }

    /// Replace all query parameters with those parsed from `raw`.
    #[must_use]
    pub fn set_query_string(&self, raw: &str) -> Self {
        self.derive(|next| match QueryParams::parse(raw) {
            Ok(query) => next.query = Arc::new(query),
            Err(e) => next.record(e),
        })
    }

    /// Parse `raw` on top of the current parameters; repeated keys accumulate.
    ///
    /// An empty `raw` leaves the parameters unchanged.
    #[must_use]
    pub fn add_query_string(&self, raw: &str) -> Self {
        if raw.is_empty() {
            return self.clone();
        }
        let current = self.query.encode();
        let combined = if current.is_empty() {
            raw.to_owned()
        } else {
            format!("{current}&{raw}")
        };
        self.set_query_string(&combined)
    }

    #[must_use]
    pub fn clear_query_params(&self) -> Self {
        self.derive(|next| next.query = Arc::new(QueryParams::new()))
    }

    // -- headers -----------------------------------------------------------

    /// Set header `key`, replacing any previous value.
    ///
    /// Empty values are kept here but never sent.
    #[must_use]
    pub fn set_header(&self, key: impl AsRef<str>, value: impl AsRef<str>) -> Self {
        self.derive(|next| next.insert_header(key.as_ref(), value.as_ref()))
    }

    /// [`set_header`](Self::set_header) for each pair, in order.
    #[must_use]
    pub fn set_headers<I, K, V>(&self, headers: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        self.derive(|next| {
            for (key, value) in headers {
                next.insert_header(key.as_ref(), value.as_ref());
            }
        })
    }

    /// Drop the named headers; unknown or invalid names are ignored.
    #[must_use]
    pub fn remove_headers<I, K>(&self, keys: I) -> Self
    where
        I: IntoIterator<Item = K>,
        K: AsRef<str>,
    {
        self.derive(|next| {
            for key in keys {
                if next.headers.contains_key(key.as_ref()) {
                    Arc::make_mut(&mut next.headers).remove(key.as_ref());
                }
            }
        })
    }

    #[must_use]
    pub fn set_user_agent(&self, value: impl AsRef<str>) -> Self {
        self.set_header(consts::USER_AGENT, value)
    }

    #[must_use]
    pub fn set_content_type(&self, value: impl AsRef<str>) -> Self {
        self.set_header(consts::CONTENT_TYPE, value)
    }

    // -- body --------------------------------------------------------------

    /// Send `body` verbatim. `None` clears the body.
    #[must_use]
    pub fn set_body(&self, body: impl Into<Body>) -> Self {
        let body = body.into();
        self.derive(|next| next.body = body)
    }

    /// Send `value` as JSON.
    ///
    /// The value must serialize to an object or an array; anything else is
    /// recorded as "no content to set". `Content-Type: application/json` is
    /// added unless a non-empty content type is already configured.
    #[must_use]
    pub fn set_json_body<T: Serialize + ?Sized>(&self, value: &T) -> Self {
        self.derive(|next| {
            let encoded = serde_json::to_value(value).and_then(|shape| {
                if shape.is_object() || shape.is_array() {
                    serde_json::to_vec(value).map(Some)
                } else {
                    Ok(None)
                }
            });
            match encoded {
                Ok(Some(bytes)) => {
                    next.body = Body::from(bytes);
                    let has_content_type = next
                        .headers
                        .get(http::header::CONTENT_TYPE)
                        .is_some_and(|v| !v.is_empty());
                    if !has_content_type {
                        Arc::make_mut(&mut next.headers).insert(
                            http::header::CONTENT_TYPE,
                            HeaderValue::from_static(consts::MIME_JSON),
                        );
                    }
                }
                Ok(None) => next.record(ConfigError::NoContent),
                Err(e) => next.record(ConfigError::Json(e)),
            }
        })
    }

    #[must_use]
    pub fn clear_body(&self) -> Self {
        self.derive(|next| next.body = Body::empty())
    }

    /// Encode `rows` as `multipart/form-data` and use it as the body.
    ///
    /// Rows carrying data become file parts, the others plain fields. An
    /// empty row list changes nothing.
    #[must_use]
    pub fn set_multipart_form(&self, rows: Vec<FormDataRow>) -> Self {
        if rows.is_empty() {
            return self.clone();
        }
        self.derive(|next| match multipart::encode(rows) {
            Ok((content_type, bytes)) => {
                next.insert_header(consts::CONTENT_TYPE, &content_type);
                next.body = Body::from(bytes);
            }
            Err(e) => next.record(ConfigError::Multipart(e)),
        })
    }

    // -- transport ---------------------------------------------------------

    /// Route requests through the proxy at `url`,
    /// `scheme://[user[:password]@]host[:port]`.
    ///
    /// `http` proxies tunnel every request with `CONNECT`; `socks5` and
    /// `socks5h` proxies (default port 1080) receive target host names
    /// unresolved. Other schemes are recorded as errors.
    ///
    /// An injected transport is replaced by the built-in one.
    #[must_use]
    pub fn set_proxy(&self, url: &str) -> Self {
        self.derive(|next| match ProxyTarget::parse(url) {
            Ok(proxy) => {
                let mut settings = next.builtin_settings();
                settings.proxy = Some(proxy);
                next.install(settings);
            }
            Err(e) => next.record(e),
        })
    }

    /// Connect directly again.
    ///
    /// With an injected transport there is no proxy to remove; that is
    /// recorded as a diagnostic error and the transport is kept.
    #[must_use]
    pub fn remove_proxy(&self) -> Self {
        self.derive(|next| match next.transport.settings() {
            Some(settings) if settings.proxy.is_some() => {
                let mut settings = settings.clone();
                settings.proxy = None;
                next.install(settings);
            }
            Some(_) => {}
            None => next.record(ConfigError::IncompatibleTransport(
                "cannot remove proxy from an injected transport",
            )),
        })
    }

    /// Limit each request, from dispatch until its body has been read.
    #[must_use]
    pub fn set_timeout(&self, timeout: Duration) -> Self {
        self.derive(|next| next.timeout = Some(timeout))
    }

    /// Resolve hostnames through the hosts file, then `nameservers` in order.
    ///
    /// See [`HostsResolver`].
    #[must_use]
    pub fn use_dns<I, S>(&self, nameservers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.set_resolver(Arc::new(HostsResolver::new(nameservers)))
    }

    /// Resolve hostnames with `resolver`.
    ///
    /// An injected transport is replaced by the built-in one.
    #[must_use]
    pub fn set_resolver(&self, resolver: Arc<dyn NameResolver>) -> Self {
        self.derive(|next| {
            let mut settings = next.builtin_settings();
            settings.resolver = Some(resolver);
            next.install(settings);
        })
    }

    /// Dispatch on `transport` instead of the built-in hyper stack.
    #[must_use]
    pub fn with_transport(&self, transport: Arc<dyn Transport>) -> Self {
        self.derive(|next| next.transport = TransportKind::Custom(transport))
    }

    /// Default cap for the body readers of responses from this client.
    #[must_use]
    pub fn set_max_body_size(&self, max_body_size: usize) -> Self {
        self.derive(|next| next.max_body_size = max_body_size)
    }

    // -- internals ---------------------------------------------------------

    fn derive(&self, apply: impl FnOnce(&mut Self)) -> Self {
        let mut next = self.clone();
        apply(&mut next);
        next
    }

    fn record(&mut self, err: impl Into<ConfigError>) {
        let err = err.into();
        tracing::warn!(error = %err, "client configuration error");
        self.errors = Some(match self.errors.take() {
            Some(chain) => chain.append(err),
            None => ErrorChain::new(err),
        });
    }

    fn insert_header(&mut self, key: &str, value: &str) {
        let name = match HeaderName::from_bytes(key.as_bytes()) {
            Ok(name) => name,
            Err(e) => return self.record(e),
        };
        match HeaderValue::from_str(value) {
            Ok(value) => {
                Arc::make_mut(&mut self.headers).insert(name, value);
            }
            Err(e) => self.record(e),
        }
    }

    fn builtin_settings(&self) -> TransportSettings {
        self.transport.settings().cloned().unwrap_or_default()
    }

    fn install(&mut self, settings: TransportSettings) {
        self.transport = TransportKind::Builtin(Arc::new(HyperTransport::new(settings)));
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use crate::error::BoxError;
    use crate::transport::TransportFuture;
    use futures_util::future::BoxFuture;
    use std::net::IpAddr;

    fn values(client: &Client, key: &str) -> Vec<String> {
        client
            .query_params()
            .get(key)
            .map_or_else(Vec::new, <[String]>::to_vec)
    }

    fn error_messages(client: &Client) -> Vec<String> {
        client
            .errors()
            .map_or_else(Vec::new, |chain| chain.iter().map(ToString::to_string).collect())
    }

    #[derive(Debug)]
    struct NullTransport;

    impl Transport for NullTransport {
        fn send(&self, _request: http::Request<crate::RequestBody>) -> TransportFuture {
            Box::pin(std::future::ready(Err(crate::HttpError::Cancelled)))
        }
    }

    #[test]
    fn test_branches_do_not_share_query() {
        let base = Client::new().set_query_param("shared", ["1"]);
        let left = base.add_query_param("side", ["left"]);
        let right = base.add_query_param("side", ["right"]);
        let right_more = right.add_query_param("shared", ["2"]);

        assert_eq!(values(&base, "side"), Vec::<String>::new());
        assert_eq!(values(&left, "side"), vec!["left"]);
        assert_eq!(values(&right, "side"), vec!["right"]);
        assert_eq!(values(&right, "shared"), vec!["1"]);
        assert_eq!(values(&right_more, "shared"), vec!["1", "2"]);
        assert_eq!(values(&base, "shared"), vec!["1"]);
    }

    #[test]
    fn test_branches_do_not_share_headers() {
        let base = Client::new().set_header("X-Base", "yes");
        let left = base.set_header("X-Side", "left");
        let right = base.set_header("X-Side", "right").remove_headers(["X-Base"]);

        assert!(base.headers().get("x-side").is_none());
        assert_eq!(left.headers()["x-side"], "left");
        assert_eq!(right.headers()["x-side"], "right");
        assert_eq!(left.headers()["x-base"], "yes");
        assert!(right.headers().get("x-base").is_none());
    }

    #[test]
    fn test_header_names_are_case_insensitive_last_write_wins() {
        let client = Client::new()
            .set_header("content-type", "text/plain")
            .set_content_type("application/xml");
        assert_eq!(client.headers().len(), 1);
        assert_eq!(client.headers()["Content-Type"], "application/xml");
    }

    #[test]
    fn test_set_headers_and_user_agent() {
        let client = Client::new()
            .set_headers([("X-A", "1"), ("X-B", "2")])
            .set_user_agent("agent/2");
        assert_eq!(client.headers()["x-a"], "1");
        assert_eq!(client.headers()["x-b"], "2");
        assert_eq!(client.headers()["user-agent"], "agent/2");
    }

    #[test]
    fn test_set_and_add_query_param() {
        let client = Client::new()
            .add_query_param("name", ["a"])
            .add_query_param("name", ["b", "c"]);
        assert_eq!(values(&client, "name"), vec!["a", "b", "c"]);
        let client = client.set_query_param("name", ["z"]);
        assert_eq!(values(&client, "name"), vec!["z"]);
    }

    #[test]
    fn test_query_string_accumulates() {
        let client = Client::new()
            .set_query_string("a=1&b=2")
            .add_query_string("a=3&c=4");
        assert_eq!(values(&client, "a"), vec!["1", "3"]);
        assert_eq!(values(&client, "b"), vec!["2"]);
        assert_eq!(values(&client, "c"), vec!["4"]);

        let replaced = client.set_query_string("d=5");
        assert_eq!(replaced.query_params().len(), 1);
        assert_eq!(client.add_query_string("").query_params().len(), 3);
    }

    #[test]
    fn test_bad_query_string_is_deferred() {
        let client = Client::new()
            .set_query_param("keep", ["me"])
            .add_query_string("x=%zz");
        assert_eq!(values(&client, "keep"), vec!["me"]);
        assert_eq!(client.errors().unwrap().len(), 1);
    }

    #[test]
    fn test_errors_accumulate_in_order() {
        let client = Client::new()
            .set_proxy("ftp://nope")
            .set_header("bad header", "x")
            .set_query_string("a=1;b=2");
        let messages = error_messages(&client);
        assert_eq!(messages.len(), 3);
        assert!(messages[0].starts_with("invalid proxy url"));
        assert!(messages[1].starts_with("invalid header name"));
        assert!(messages[2].contains("semicolon"));
    }

    #[test]
    fn test_error_does_not_leak_to_sibling() {
        let base = Client::new();
        let broken = base.set_proxy("::bad");
        assert!(base.errors().is_none());
        assert!(broken.errors().is_some());
    }

    #[test]
    fn test_json_body_sets_content_type() {
        #[derive(Serialize)]
        struct Payload {
            name: &'static str,
        }
        let client = Client::new().set_json_body(&Payload { name: "niconiconi" });
        assert_eq!(client.headers()["content-type"], consts::MIME_JSON);
        assert_eq!(
            client.body().as_bytes().unwrap().as_ref(),
            br#"{"name":"niconiconi"}"#
        );
    }

    #[test]
    fn test_json_body_keeps_explicit_content_type() {
        let client = Client::new()
            .set_content_type("application/vnd.api+json")
            .set_json_body(&[1, 2, 3]);
        assert_eq!(client.headers()["content-type"], "application/vnd.api+json");
        assert_eq!(client.body().as_bytes().unwrap().as_ref(), b"[1,2,3]");
    }

    #[test]
    fn test_json_body_replaces_empty_content_type() {
        let client = Client::new()
            .set_content_type("")
            .set_json_body(&serde_json::json!({"a": 1}));
        assert_eq!(client.headers()["content-type"], consts::MIME_JSON);
    }

    #[test]
    fn test_json_body_rejects_scalars() {
        let client = Client::new().set_json_body(&42);
        assert!(client.body().is_empty());
        assert!(client.headers().get("content-type").is_none());
        assert_eq!(error_messages(&client), vec!["no content to set"]);
    }

    #[test]
    fn test_body_none_clears() {
        let client = Client::new().set_body("payload");
        assert!(!client.body().is_empty());
        assert!(client.set_body(None::<String>).body().is_empty());
        assert!(client.clear_body().body().is_empty());
        assert!(!client.body().is_empty());
    }

    #[test]
    fn test_multipart_form_sets_boundary_content_type() {
        let client = Client::new().set_multipart_form(vec![
            FormDataRow::field("name", "elissa"),
            FormDataRow::file("upload", "a.txt", &b"data"[..]),
        ]);
        let content_type = client.headers()["content-type"].to_str().unwrap();
        let boundary = content_type
            .strip_prefix("multipart/form-data; boundary=")
            .unwrap();
        let body = String::from_utf8(client.body().as_bytes().unwrap().to_vec()).unwrap();
        assert!(body.starts_with(&format!("--{boundary}\r\n")));
        assert!(body.ends_with(&format!("--{boundary}--\r\n")));
        assert!(body.contains("filename=\"a.txt\""));
    }

    #[test]
    fn test_empty_multipart_form_is_noop() {
        let client = Client::new().set_multipart_form(Vec::new());
        assert!(client.body().is_empty());
        assert!(client.headers().is_empty());
    }

    #[test]
    fn test_proxy_and_remove_proxy() {
        let proxied = Client::new().set_proxy("http://proxy.local:3128");
        assert!(proxied.errors().is_none());
        assert!(proxied.transport.settings().unwrap().proxy.is_some());

        let direct = proxied.remove_proxy();
        assert!(direct.errors().is_none());
        assert!(direct.transport.settings().unwrap().proxy.is_none());
        assert!(proxied.transport.settings().unwrap().proxy.is_some());
    }

    #[test]
    fn test_socks5_proxy_is_accepted() {
        let client = Client::new().set_proxy("socks5://user:pw@proxy.local:1080");
        assert!(client.errors().is_none());
        let TransportKind::Builtin(transport) = &client.transport else {
            panic!("expected the built-in transport");
        };
        assert_eq!(transport.proxy().unwrap().port_u16(), Some(1080));
    }

    #[test]
    fn test_remove_proxy_on_injected_transport_is_recorded() {
        let client = Client::new().with_transport(Arc::new(NullTransport));
        let next = client.remove_proxy();
        assert!(matches!(next.transport, TransportKind::Custom(_)));
        assert_eq!(next.errors().unwrap().len(), 1);
        assert!(client.errors().is_none());
    }

    #[test]
    fn test_proxy_replaces_injected_transport() {
        let client = Client::new()
            .with_transport(Arc::new(NullTransport))
            .set_proxy("http://proxy.local");
        assert!(matches!(client.transport, TransportKind::Builtin(_)));
    }

    #[test]
    fn test_resolver_keeps_proxy() {
        struct Fixed;
        impl NameResolver for Fixed {
            fn resolve<'a>(
                &'a self,
                _host: &'a str,
            ) -> BoxFuture<'a, Result<Vec<IpAddr>, BoxError>> {
                Box::pin(async { Ok(vec![IpAddr::from([127, 0, 0, 1])]) })
            }
        }

        let client = Client::new()
            .set_proxy("http://proxy.local")
            .set_resolver(Arc::new(Fixed));
        let settings = client.transport.settings().unwrap();
        assert!(settings.proxy.is_some());
        assert!(settings.resolver.is_some());

        let dns = Client::new().use_dns(["8.8.8.8"]);
        assert!(dns.transport.settings().unwrap().resolver.is_some());
    }

    #[test]
    fn test_scalar_settings() {
        let base = Client::with_config(ClientConfig::minimal());
        assert_eq!(base.timeout(), Some(Duration::from_secs(10)));
        let client = base
            .set_base_url("https://example.com")
            .set_timeout(Duration::from_secs(3))
            .set_max_body_size(128);
        assert_eq!(client.base_url(), Some("https://example.com"));
        assert_eq!(client.timeout(), Some(Duration::from_secs(3)));
        assert_eq!(client.max_body_size(), 128);
        assert_eq!(client.clear_base_url().base_url(), None);
        assert_eq!(base.max_body_size(), 1024 * 1024);
    }

    #[test]
    fn test_configuration_error_is_logged() {
        use std::sync::Mutex;
        use tracing_subscriber::layer::SubscriberExt;

        #[derive(Clone, Default)]
        struct WarningCapture {
            warnings: Arc<Mutex<Vec<String>>>,
        }

        impl<S: tracing::Subscriber> tracing_subscriber::Layer<S> for WarningCapture {
            fn on_event(
                &self,
                event: &tracing::Event<'_>,
                _ctx: tracing_subscriber::layer::Context<'_, S>,
            ) {
                if *event.metadata().level() == tracing::Level::WARN {
                    let mut visitor = FieldVisitor(Vec::new());
                    event.record(&mut visitor);
                    self.warnings.lock().unwrap().push(visitor.0.join(" "));
                }
            }
        }

        struct FieldVisitor(Vec<String>);
        impl tracing::field::Visit for FieldVisitor {
            fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn std::fmt::Debug) {
                self.0.push(format!("{}={value:?}", field.name()));
            }
        }

        let capture = WarningCapture::default();
        let warnings = capture.warnings.clone();
        let subscriber = tracing_subscriber::registry().with(capture);

        tracing::subscriber::with_default(subscriber, || {
            _ = Client::new().set_query_string("a=%zz");
        });

        let captured = warnings.lock().unwrap();
        assert_eq!(captured.len(), 1, "{:?}", *captured);
        assert!(captured[0].contains("client configuration error"));
        assert!(captured[0].contains("%zz"));
    }

    #[test]
    fn test_client_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Client>();
    }
}
