use crate::error::HttpError;
use crate::limit::{LimitedBody, read_bounded};
use crate::transport::ResponseBody;
use bytes::Bytes;
use http::{HeaderMap, Response, StatusCode};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

/// HTTP response wrapper with bounded body-reading helpers
///
/// - `resp.is_successful()` - status in `200..=299`
/// - `resp.read_body().await?` - bytes, status-checked, capped
/// - `resp.text().await` - lossy text, errors swallowed
/// - `resp.decode_json(&mut value).await?` / `resp.json::<T>().await?`
///
/// Every read consumes the response, so the body is released exactly once
/// whether it was read, rejected or cancelled. The default cap comes from the
/// client that produced the response (64 KB unless configured), and so does
/// the deadline: a client timeout also bounds body reads.
#[derive(Debug)]
pub struct HttpResponse {
    pub(crate) inner: Response<ResponseBody>,
    pub(crate) max_body_size: usize,
    pub(crate) cancel: Option<CancellationToken>,
    pub(crate) deadline: Option<(Instant, Duration)>,
}

impl HttpResponse {
    pub(crate) fn new(
        inner: Response<ResponseBody>,
        max_body_size: usize,
        cancel: Option<CancellationToken>,
    ) -> Self {
        Self {
            inner,
            max_body_size,
            cancel,
            deadline: None,
        }
    }

    /// Fail body reads with `HttpError::Timeout(limit)` once `at` has passed.
    #[must_use]
    pub(crate) fn with_deadline(mut self, at: Instant, limit: Duration) -> Self {
        self.deadline = Some((at, limit));
        self
    }

    /// Get the response status code
    #[must_use]
    pub fn status(&self) -> StatusCode {
        self.inner.status()
    }

    /// Get the response headers
    #[must_use]
    pub fn headers(&self) -> &HeaderMap {
        self.inner.headers()
    }

    /// `true` for statuses in the inclusive range `200..=299`
    #[must_use]
    pub fn is_successful(&self) -> bool {
        is_successful(self.inner.status())
    }

    /// Consume the wrapper and return the inner response with boxed body
    #[must_use]
    pub fn into_inner(self) -> Response<ResponseBody> {
        self.inner
    }

    /// Returns the configured max body size for this response.
    ///
    /// This is the limit applied by `read_body()`, `text()`, `decode_json()`
    /// and `json()`.
    #[must_use]
    pub fn max_body_size(&self) -> usize {
        self.max_body_size
    }

    /// Returns the response body as a size-limited stream.
    ///
    /// No status check is made, and neither the client's timeout nor its
    /// cancellation token applies. When the limit is exceeded, the next
    /// `poll_frame()` call returns `HttpError::BodyTooLarge`.
    #[must_use]
    pub fn into_limited_body(self) -> LimitedBody<ResponseBody> {
        LimitedBody::new(self.inner.into_body(), self.max_body_size)
    }

    /// Check status and return error for non-2xx responses
    ///
    /// Does NOT read the response body.
    ///
    /// # Errors
    /// Returns `HttpError::HttpStatus` if the response status is not 2xx.
    pub fn error_for_status(self) -> Result<Self, HttpError> {
        if self.is_successful() {
            return Ok(self);
        }
        Err(HttpError::HttpStatus {
            status: self.inner.status(),
            content_type: content_type(self.inner.headers()),
        })
    }

    /// Read the body with the response's cap.
    ///
    /// # Errors
    /// Returns `HttpError::HttpStatus` if status is not 2xx.
    /// Returns `HttpError::BodyTooLarge` if body exceeds the cap.
    /// Returns `HttpError::Cancelled` if the request's token fires mid-read.
    /// Returns `HttpError::Timeout` if the client's timeout elapses mid-read.
    pub async fn read_body(self) -> Result<Bytes, HttpError> {
        let limit = self.max_body_size;
        self.read_body_limited(limit).await
    }

    /// Read the body, accepting at most `max_size` bytes.
    ///
    /// # Errors
    /// Same as [`read_body`](Self::read_body).
    pub async fn read_body_limited(self, max_size: usize) -> Result<Bytes, HttpError> {
        let (parts, body) = self.inner.into_parts();
        if !is_successful(parts.status) {
            return Err(HttpError::HttpStatus {
                status: parts.status,
                content_type: content_type(&parts.headers),
            });
        }

        let read = read_bounded(body, max_size);
        let read = async {
            match self.deadline {
                Some((at, limit)) => tokio::time::timeout_at(at, read)
                    .await
                    .unwrap_or_else(|_| Err(HttpError::Timeout(limit))),
                None => read.await,
            }
        };
        match self.cancel {
            Some(token) => tokio::select! {
                biased;
                () = token.cancelled() => Err(HttpError::Cancelled),
                result = read => result,
            },
            None => read.await,
        }
    }

    /// Body as text, invalid UTF-8 replaced with U+FFFD.
    ///
    /// This accessor is lossy on purpose: any failure of
    /// [`read_body`](Self::read_body) (bad status, oversize body, transport
    /// error, cancellation) yields an empty string and the error is discarded.
    pub async fn text(self) -> String {
        let limit = self.max_body_size;
        self.text_limited(limit).await
    }

    /// [`text`](Self::text) with an explicit cap.
    pub async fn text_limited(self, max_size: usize) -> String {
        match self.read_body_limited(max_size).await {
            Ok(bytes) => String::from_utf8_lossy(&bytes).into_owned(),
            Err(e) => {
                tracing::debug!(error = %e, "discarding body read error in text()");
                String::new()
            }
        }
    }

    /// Decode the JSON body into `target`.
    ///
    /// The response `Content-Type` must mention `json`, `javascript` or `xml`.
    ///
    /// # Errors
    /// Returns `HttpError::NotJson` for any other content type, and otherwise
    /// the errors of [`read_body`](Self::read_body) or `HttpError::Json`.
    pub async fn decode_json<T: DeserializeOwned>(self, target: &mut T) -> Result<(), HttpError> {
        *target = self.json().await?;
        Ok(())
    }

    /// Parse the JSON body. See [`decode_json`](Self::decode_json).
    ///
    /// # Errors
    /// Same as [`decode_json`](Self::decode_json).
    pub async fn json<T: DeserializeOwned>(self) -> Result<T, HttpError> {
        let limit = self.max_body_size;
        self.json_limited(limit).await
    }

    /// [`json`](Self::json) with an explicit cap.
    ///
    /// # Errors
    /// Same as [`decode_json`](Self::decode_json).
    pub async fn json_limited<T: DeserializeOwned>(self, max_size: usize) -> Result<T, HttpError> {
        let content_type = content_type(self.inner.headers()).unwrap_or_default();
        if !is_json_like(&content_type) {
            return Err(HttpError::NotJson { content_type });
        }
        let bytes = self.read_body_limited(max_size).await?;
        Ok(serde_json::from_slice(&bytes)?)
    }
}

fn is_successful(status: StatusCode) -> bool {
    (200..300).contains(&status.as_u16())
}

// json, jsonp and xml flavours: application/json, application/javascript, text/xml, ...
fn is_json_like(content_type: &str) -> bool {
    ["json", "javascript", "xml"]
        .iter()
        .any(|marker| content_type.contains(marker))
}

fn content_type(headers: &HeaderMap) -> Option<String> {
    headers
        .get(http::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(String::from)
}
