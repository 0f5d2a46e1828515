//! Ordered accumulation of errors.
//!
//! An [`ErrorChain`] is a persistent singly linked list: every node holds one
//! error and shares the rest of the list with the chain it was derived from.
//! `prepend` and `append` return new chains and leave the receiver untouched,
//! so a chain can be carried inside cloned [`Client`](crate::Client) values
//! without one branch observing errors recorded by another.

use crate::error::BoxError;
use std::error::Error;
use std::fmt;
use std::sync::Arc;

type Cause = Arc<dyn Error + Send + Sync + 'static>;

/// Chain of errors rendered as `first -> second -> ...`.
///
/// [`Error::source`] returns the next node, so the usual
/// `while let Some(e) = err.source()` loop visits every recorded cause.
#[derive(Clone)]
pub struct ErrorChain {
    value: Cause,
    next: Option<Arc<ErrorChain>>,
}

impl ErrorChain {
    /// Start a chain with its first cause.
    pub fn new(err: impl Into<BoxError>) -> Self {
        Self {
            value: Arc::from(err.into()),
            next: None,
        }
    }

    /// Return a chain with `err` as the new head, followed by `self`.
    #[must_use]
    pub fn prepend(self, err: impl Into<BoxError>) -> Self {
        Self {
            value: Arc::from(err.into()),
            next: Some(Arc::new(self)),
        }
    }

    /// Like [`prepend`](Self::prepend), but a `None` leaves the chain unchanged.
    #[must_use]
    pub fn prepend_opt<E: Into<BoxError>>(self, err: Option<E>) -> Self {
        match err {
            Some(err) => self.prepend(err),
            None => self,
        }
    }

    /// Return a chain with `err` linked after the current tail.
    #[must_use]
    pub fn append(self, err: impl Into<BoxError>) -> Self {
        self.link(Arc::from(err.into()))
    }

    /// Like [`append`](Self::append), but a `None` leaves the chain unchanged.
    #[must_use]
    pub fn append_opt<E: Into<BoxError>>(self, err: Option<E>) -> Self {
        match err {
            Some(err) => self.append(err),
            None => self,
        }
    }

    /// The error held by this node.
    #[must_use]
    pub fn value(&self) -> &(dyn Error + Send + Sync + 'static) {
        self.value.as_ref()
    }

    /// The node after this one, if any.
    #[must_use]
    pub fn next(&self) -> Option<&ErrorChain> {
        self.next.as_deref()
    }

    /// Number of errors in the chain.
    #[must_use]
    pub fn len(&self) -> usize {
        self.causes().count()
    }

    /// Always `false`: a chain holds at least one error.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Iterate over the errors from head to tail.
    pub fn iter(&self) -> impl Iterator<Item = &(dyn Error + Send + Sync + 'static)> {
        self.causes().map(|cause| &**cause)
    }

    fn causes(&self) -> impl Iterator<Item = &Cause> {
        let mut node = Some(self);
        std::iter::from_fn(move || {
            let current = node?;
            node = current.next.as_deref();
            Some(&current.value)
        })
    }

    // Copies the nodes up to the tail; nodes shared with other chains stay as they are.
    fn link(self, tail: Cause) -> Self {
        let next = match self.next {
            Some(next) => Arc::unwrap_or_clone(next).link(tail),
            None => Self {
                value: tail,
                next: None,
            },
        };
        Self {
            value: self.value,
            next: Some(Arc::new(next)),
        }
    }
}

impl fmt::Display for ErrorChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, err) in self.iter().enumerate() {
            if i > 0 {
                f.write_str(" -> ")?;
            }
            write!(f, "{err}")?;
        }
        Ok(())
    }
}

impl fmt::Debug for ErrorChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

impl Error for ErrorChain {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        self.next.as_deref().map(|next| next as &(dyn Error + 'static))
    }
}
