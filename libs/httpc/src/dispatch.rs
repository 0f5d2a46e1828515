//! Terminal operations: turning a [`Client`] value into a request on the wire.

use crate::body::RequestBody;
use crate::client::Client;
use crate::config::env_user_agent;
use crate::error::HttpError;
use crate::response::HttpResponse;
use http::header::{HeaderValue, USER_AGENT};
use http::{HeaderMap, Method, Request, Uri};
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use url::Url;

macro_rules! verbs {
    ($($(#[$doc:meta])* $name:ident, $with_cancel:ident => $method:ident;)*) => {
        $(
            $(#[$doc])*
            ///
            /// # Errors
            /// See [`execute`](Self::execute).
            pub async fn $name(&self, url: &str) -> Result<HttpResponse, HttpError> {
                self.execute(Method::$method, url).await
            }

            #[doc = concat!("[`", stringify!($name), "`](Self::", stringify!($name), ") that stops when `cancel` fires.")]
            ///
            /// # Errors
            /// See [`execute`](Self::execute).
            pub async fn $with_cancel(
                &self,
                cancel: &CancellationToken,
                url: &str,
            ) -> Result<HttpResponse, HttpError> {
                self.execute_with_cancel(cancel, Method::$method, url).await
            }
        )*
    };
}

impl Client {
    /// Build the outgoing request for `method` and `url` from this configuration.
    ///
    /// The URL is the base URL (if any) followed by `url`; configured query
    /// parameters are merged after the ones already in the URL. `User-Agent`
    /// comes from the `UserAgent` environment variable, else the configured
    /// default; configured headers override it, and headers with an empty
    /// value are not sent.
    ///
    /// # Errors
    /// Returns `HttpError::Config` if configuration errors were accumulated,
    /// `HttpError::InvalidUri` for an unparsable URL, and
    /// `HttpError::BodyConsumed` if the streaming body was already sent.
    pub fn build_request(&self, method: Method, url: &str) -> Result<Request<RequestBody>, HttpError> {
        self.check_errors()?;

        let full = match &self.base_url {
            Some(base) => format!("{base}{url}"),
            None => url.to_owned(),
        };
        let invalid = |reason: String| HttpError::InvalidUri {
            url: full.clone(),
            reason,
        };
        let mut parsed = Url::parse(&full).map_err(|e| invalid(e.to_string()))?;
        if !self.query.is_empty() {
            self.query.merge_into(&mut parsed);
        }
        let uri = parsed
            .as_str()
            .parse::<Uri>()
            .map_err(|e| invalid(e.to_string()))?;

        let mut request = Request::builder()
            .method(method)
            .uri(uri)
            .body(self.body.clone().into_request_body()?)?;
        *request.headers_mut() = self.outgoing_headers();
        Ok(request)
    }

    fn outgoing_headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::with_capacity(self.headers.len() + 1);

        let agent = env_user_agent().unwrap_or_else(|| self.user_agent.as_ref().to_owned());
        match HeaderValue::from_str(&agent) {
            Ok(value) if !value.is_empty() => {
                headers.insert(USER_AGENT, value);
            }
            Ok(_) => {}
            Err(e) => tracing::warn!(user_agent = %agent, error = %e, "ignoring invalid default user agent"),
        }

        for (name, value) in self.headers.iter() {
            if value.is_empty() {
                continue;
            }
            headers.insert(name.clone(), value.clone());
        }
        headers
    }

    /// Send `method` to `url` (prefixed with the base URL) and wrap the response.
    ///
    /// Accumulated configuration errors are returned before any network
    /// activity. Non-2xx statuses are not errors here; they are rejected by
    /// the response's body readers.
    ///
    /// # Errors
    /// Returns `HttpError::Config` for accumulated configuration errors, the
    /// errors of [`build_request`](Self::build_request), `HttpError::Timeout`
    /// when the configured timeout elapses before response headers arrive,
    /// and `HttpError::Transport`/`HttpError::Tls` for network failures.
    /// The same timeout keeps running while the response body is read.
    pub async fn execute(&self, method: Method, url: &str) -> Result<HttpResponse, HttpError> {
        let request = self.build_request(method, url)?;
        self.send(request, None).await
    }

    /// [`execute`](Self::execute) that stops when `cancel` fires.
    ///
    /// The token stays attached to the response, so cancelling it also
    /// interrupts a body read in progress.
    ///
    /// # Errors
    /// As [`execute`](Self::execute), plus `HttpError::Cancelled`.
    pub async fn execute_with_cancel(
        &self,
        cancel: &CancellationToken,
        method: Method,
        url: &str,
    ) -> Result<HttpResponse, HttpError> {
        let request = self.build_request(method, url)?;
        self.send(request, Some(cancel)).await
    }

    verbs! {
        /// `OPTIONS url`
        options, options_with_cancel => OPTIONS;
        /// `HEAD url`
        head, head_with_cancel => HEAD;
        /// `GET url`
        get, get_with_cancel => GET;
        /// `POST url` with the configured body
        post, post_with_cancel => POST;
        /// `PUT url` with the configured body
        put, put_with_cancel => PUT;
        /// `PATCH url` with the configured body
        patch, patch_with_cancel => PATCH;
        /// `DELETE url`
        delete, delete_with_cancel => DELETE;
    }

    /// Send a fully built `request` as-is on this client's transport.
    ///
    /// URL, query, headers and body of the configuration are not applied;
    /// the timeout, body cap and accumulated errors are.
    ///
    /// # Errors
    /// As [`execute`](Self::execute).
    pub async fn dispatch(&self, request: Request<RequestBody>) -> Result<HttpResponse, HttpError> {
        self.check_errors()?;
        self.send(request, None).await
    }

    /// [`dispatch`](Self::dispatch) that stops when `cancel` fires.
    ///
    /// # Errors
    /// As [`execute_with_cancel`](Self::execute_with_cancel).
    pub async fn dispatch_with_cancel(
        &self,
        cancel: &CancellationToken,
        request: Request<RequestBody>,
    ) -> Result<HttpResponse, HttpError> {
        self.check_errors()?;
        self.send(request, Some(cancel)).await
    }

    fn check_errors(&self) -> Result<(), HttpError> {
        match &self.errors {
            Some(chain) => Err(HttpError::Config(chain.clone())),
            None => Ok(()),
        }
    }

    async fn send(
        &self,
        request: Request<RequestBody>,
        cancel: Option<&CancellationToken>,
    ) -> Result<HttpResponse, HttpError> {
        tracing::debug!(method = %request.method(), url = %request.uri(), "dispatching request");

        // One deadline covers the exchange and every body read after it.
        let deadline = self
            .timeout
            .and_then(|limit| Instant::now().checked_add(limit).map(|at| (at, limit)));

        let exchange = self.transport.as_transport().send(request);
        let exchange = async {
            match deadline {
                Some((at, limit)) => tokio::time::timeout_at(at, exchange)
                    .await
                    .unwrap_or_else(|_| Err(HttpError::Timeout(limit))),
                None => exchange.await,
            }
        };

        let response = match cancel {
            Some(token) => tokio::select! {
                biased;
                () = token.cancelled() => Err(HttpError::Cancelled),
                result = exchange => result,
            },
            None => exchange.await,
        }?;

        tracing::debug!(status = %response.status(), "response received");
        let response = HttpResponse::new(response, self.max_body_size, cancel.cloned());
        Ok(match deadline {
            Some((at, limit)) => response.with_deadline(at, limit),
            None => response,
        })
    }
}
