//! Size-bounded body reading.
//!
//! Remote bodies are never buffered past the configured limit: reading stops
//! at the first frame that pushes the total above `max_size` and the partial
//! buffer is dropped.

use crate::error::{BoxError, HttpError};
use bytes::Bytes;
use http_body::{Body, Frame};
use http_body_util::BodyExt;
use pin_project_lite::pin_project;
use std::pin::Pin;
use std::task::{Context, Poll};

/// Read at most `max_size` bytes from `body`.
///
/// A body that ends before `max_size` bytes is not an error; its bytes are
/// returned as-is. The returned buffer carries no spare capacity.
///
/// # Errors
/// Returns `HttpError::BodyTooLarge` if the body holds more than `max_size` bytes.
/// Returns `HttpError::Transport` if reading a frame fails.
pub async fn read_bounded<B>(body: B, max_size: usize) -> Result<Bytes, HttpError>
where
    B: Body<Data = Bytes>,
    B::Error: Into<BoxError>,
{
    let hint = usize::try_from(body.size_hint().lower()).unwrap_or(usize::MAX);
    let mut collected = Vec::with_capacity(hint.min(max_size));
    let mut body = std::pin::pin!(body);

    while let Some(frame) = body.frame().await {
        let frame = frame.map_err(|e| HttpError::Transport(e.into()))?;
        let Ok(chunk) = frame.into_data() else {
            continue;
        };

        let total = collected.len().saturating_add(chunk.len());
        if total > max_size {
            return Err(HttpError::BodyTooLarge {
                limit: max_size,
                actual: total,
            });
        }
        collected.extend_from_slice(&chunk);
    }

    collected.shrink_to_fit();
    Ok(Bytes::from(collected))
}

pin_project! {
    /// Body wrapper that enforces size limits during streaming.
    ///
    /// Created by [`HttpResponse::into_limited_body()`](crate::HttpResponse::into_limited_body).
    /// Tracks bytes read and yields [`HttpError::BodyTooLarge`] once the limit is exceeded.
    pub struct LimitedBody<B> {
        #[pin]
        inner: B,
        limit: usize,
        read: usize,
    }
}

impl<B> LimitedBody<B> {
    /// Creates a new `LimitedBody` wrapping the given body with the specified limit.
    #[must_use]
    pub fn new(inner: B, limit: usize) -> Self {
        Self {
            inner,
            limit,
            read: 0,
        }
    }

    /// Returns the number of bytes read so far.
    #[must_use]
    pub fn bytes_read(&self) -> usize {
        self.read
    }

    /// Returns the configured size limit.
    #[must_use]
    pub fn limit(&self) -> usize {
        self.limit
    }
}

impl<B> Body for LimitedBody<B>
where
    B: Body<Data = Bytes>,
    B::Error: Into<BoxError>,
{
    type Data = Bytes;
    type Error = HttpError;

    fn poll_frame(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
    ) -> Poll<Option<Result<Frame<Self::Data>, Self::Error>>> {
        let this = self.project();

        match this.inner.poll_frame(cx) {
            Poll::Ready(Some(Ok(frame))) => {
                if let Some(data) = frame.data_ref() {
                    *this.read = this.read.saturating_add(data.len());
                    if *this.read > *this.limit {
                        return Poll::Ready(Some(Err(HttpError::BodyTooLarge {
                            limit: *this.limit,
                            actual: *this.read,
                        })));
                    }
                }
                Poll::Ready(Some(Ok(frame)))
            }
            Poll::Ready(Some(Err(e))) => Poll::Ready(Some(Err(HttpError::Transport(e.into())))),
            Poll::Ready(None) => Poll::Ready(None),
            Poll::Pending => Poll::Pending,
        }
    }

    fn size_hint(&self) -> http_body::SizeHint {
        self.inner.size_hint()
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use futures_util::stream;
    use http_body_util::{Full, StreamBody};
    use std::convert::Infallible;

    fn chunked(chunks: Vec<&'static [u8]>) -> StreamBody<impl futures_util::Stream<Item = Result<Frame<Bytes>, Infallible>>> {
        StreamBody::new(stream::iter(
            chunks
                .into_iter()
                .map(|c| Ok(Frame::data(Bytes::from_static(c)))),
        ))
    }

    #[tokio::test]
    async fn test_body_of_exactly_max_size() {
        let body = Full::new(Bytes::from_static(b"0123456789"));
        let bytes = read_bounded(body, 10).await.unwrap();
        assert_eq!(&bytes[..], b"0123456789");
    }

    #[tokio::test]
    async fn test_body_one_over_max_size() {
        let body = Full::new(Bytes::from_static(b"0123456789A"));
        let result = read_bounded(body, 10).await;
        assert!(matches!(
            result,
            Err(HttpError::BodyTooLarge {
                limit: 10,
                actual: 11
            })
        ));
    }

    #[tokio::test]
    async fn test_body_one_under_max_size_has_no_padding() {
        let body = Full::new(Bytes::from_static(b"012345678"));
        let bytes = read_bounded(body, 10).await.unwrap();
        assert_eq!(bytes.len(), 9);
        assert_eq!(&bytes[..], b"012345678");
    }

    #[tokio::test]
    async fn test_multi_frame_body_overflow_detected() {
        let body = chunked(vec![b"aaaa", b"bbbb", b"cccc"]);
        let result = read_bounded(body, 10).await;
        assert!(matches!(result, Err(HttpError::BodyTooLarge { .. })));
    }

    #[tokio::test]
    async fn test_multi_frame_body_within_limit() {
        let body = chunked(vec![b"ab", b"cd", b"ef"]);
        let bytes = read_bounded(body, 6).await.unwrap();
        assert_eq!(&bytes[..], b"abcdef");
    }

    #[tokio::test]
    async fn test_empty_body() {
        let body = Full::new(Bytes::new());
        let bytes = read_bounded(body, 0).await.unwrap();
        assert!(bytes.is_empty());
    }

    #[tokio::test]
    async fn test_read_error_is_propagated() {
        let body = StreamBody::new(stream::iter(vec![
            Ok(Frame::data(Bytes::from_static(b"ok"))),
            Err(std::io::Error::other("connection reset")),
        ]));
        let result = read_bounded(body, 64).await;
        match result {
            Err(HttpError::Transport(e)) => assert_eq!(e.to_string(), "connection reset"),
            other => panic!("expected transport error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_limited_body_stops_streaming() {
        let body = LimitedBody::new(chunked(vec![b"1234", b"5678"]), 6);
        let mut body = std::pin::pin!(body);

        let first = body.frame().await.unwrap().unwrap();
        assert_eq!(first.into_data().unwrap(), Bytes::from_static(b"1234"));

        let second = body.frame().await.unwrap();
        assert!(matches!(
            second,
            Err(HttpError::BodyTooLarge {
                limit: 6,
                actual: 8
            })
        ));
    }
}
