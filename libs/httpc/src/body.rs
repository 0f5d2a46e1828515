use crate::error::{BoxError, HttpError};
use bytes::Bytes;
use futures_util::{Stream, TryStreamExt};
use http_body::Frame;
use http_body_util::combinators::UnsyncBoxBody;
use http_body_util::{BodyExt, Full, StreamBody};
use std::fmt;
use std::pin::Pin;
use std::sync::{Arc, Mutex};
use tokio::io::AsyncRead;
use tokio_util::io::ReaderStream;

/// Body type handed to a [`Transport`](crate::Transport).
pub type RequestBody = UnsyncBoxBody<Bytes, BoxError>;

type ByteStream = Pin<Box<dyn Stream<Item = Result<Bytes, BoxError>> + Send>>;

/// Request body source stored in a [`Client`](crate::Client).
///
/// Buffered bodies are shared by every clone and can be sent any number of
/// times. A streaming body is produced lazily and can be sent once: clones
/// share the same stream, and whichever request goes out first takes it.
#[derive(Clone, Default)]
pub struct Body {
    kind: BodyKind,
}

#[derive(Clone, Default)]
enum BodyKind {
    #[default]
    Empty,
    Bytes(Bytes),
    Stream(Arc<Mutex<Option<ByteStream>>>),
}

impl Body {
    /// A body with no content
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Wrap a stream of byte chunks.
    #[must_use]
    pub fn from_stream<S, E>(stream: S) -> Self
    where
        S: Stream<Item = Result<Bytes, E>> + Send + 'static,
        E: Into<BoxError> + 'static,
    {
        let stream: ByteStream = Box::pin(stream.map_err(Into::into));
        Self {
            kind: BodyKind::Stream(Arc::new(Mutex::new(Some(stream)))),
        }
    }

    /// Wrap an async reader; it is read chunk by chunk while the request is sent.
    #[must_use]
    pub fn from_reader<R>(reader: R) -> Self
    where
        R: AsyncRead + Send + 'static,
    {
        Self::from_stream(ReaderStream::new(reader))
    }

    /// `true` for the empty body
    #[must_use]
    pub fn is_empty(&self) -> bool {
        matches!(self.kind, BodyKind::Empty)
    }

    /// Buffered content, `None` for empty and streaming bodies
    #[must_use]
    pub fn as_bytes(&self) -> Option<&Bytes> {
        match &self.kind {
            BodyKind::Bytes(bytes) => Some(bytes),
            BodyKind::Empty | BodyKind::Stream(_) => None,
        }
    }

    /// Convert into the transport body type.
    ///
    /// # Errors
    /// Returns `HttpError::BodyConsumed` if this is a streaming body that an
    /// earlier request already took.
    pub fn into_request_body(self) -> Result<RequestBody, HttpError> {
        match self.kind {
            BodyKind::Empty => Ok(full(Bytes::new())),
            BodyKind::Bytes(bytes) => Ok(full(bytes)),
            BodyKind::Stream(slot) => {
                let stream = slot
                    .lock()
                    .ok()
                    .and_then(|mut slot| slot.take())
                    .ok_or(HttpError::BodyConsumed)?;
                Ok(StreamBody::new(stream.map_ok(Frame::data)).boxed_unsync())
            }
        }
    }
}

fn full(bytes: Bytes) -> RequestBody {
    Full::new(bytes)
        .map_err(|never| match never {})
        .boxed_unsync()
}

impl fmt::Debug for Body {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            BodyKind::Empty => f.write_str("Body::Empty"),
            BodyKind::Bytes(bytes) => f.debug_tuple("Body::Bytes").field(&bytes.len()).finish(),
            BodyKind::Stream(_) => f.write_str("Body::Stream"),
        }
    }
}

impl From<Bytes> for Body {
    fn from(bytes: Bytes) -> Self {
        Self {
            kind: BodyKind::Bytes(bytes),
        }
    }
}

impl From<Vec<u8>> for Body {
    fn from(bytes: Vec<u8>) -> Self {
        Bytes::from(bytes).into()
    }
}

impl From<&'static [u8]> for Body {
    fn from(bytes: &'static [u8]) -> Self {
        Bytes::from_static(bytes).into()
    }
}

impl From<String> for Body {
    fn from(text: String) -> Self {
        Bytes::from(text).into()
    }
}

impl From<&'static str> for Body {
    fn from(text: &'static str) -> Self {
        Bytes::from_static(text.as_bytes()).into()
    }
}

impl<T: Into<Body>> From<Option<T>> for Body {
    fn from(body: Option<T>) -> Self {
        body.map_or_else(Body::empty, Into::into)
    }
}
