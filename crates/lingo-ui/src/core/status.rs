//! Per-operation request lifecycle.
//!
//! # Design
//! - One tagged state per operation; pending and failed are never
//!   observed together.
//! - Combined views OR two operations; the first operand wins on errors.

use crate::core::error::RequestError;

/// Lifecycle of one asynchronous operation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RequestStatus<T> {
    /// Never invoked, or explicitly reset.
    Idle,
    /// Invoked and awaiting the transport.
    Pending,
    /// Completed with a payload.
    Succeeded(T),
    /// Completed with a captured failure.
    Failed(RequestError),
}

impl<T> Default for RequestStatus<T> {
    fn default() -> Self {
        Self::Idle
    }
}

impl<T> RequestStatus<T> {
    /// Whether the operation is in flight.
    #[must_use]
    pub const fn is_pending(&self) -> bool {
        matches!(self, Self::Pending)
    }

    /// Whether the operation last completed with a failure.
    #[must_use]
    pub const fn is_failed(&self) -> bool {
        matches!(self, Self::Failed(_))
    }

    /// Whether the operation last completed successfully.
    #[must_use]
    pub const fn is_succeeded(&self) -> bool {
        matches!(self, Self::Succeeded(_))
    }

    /// Captured failure, if any.
    #[must_use]
    pub const fn error(&self) -> Option<&RequestError> {
        match self {
            Self::Failed(err) => Some(err),
            Self::Idle | Self::Pending | Self::Succeeded(_) => None,
        }
    }

    /// Success payload, if any.
    #[must_use]
    pub const fn value(&self) -> Option<&T> {
        match self {
            Self::Succeeded(value) => Some(value),
            Self::Idle | Self::Pending | Self::Failed(_) => None,
        }
    }

    /// Return to [`RequestStatus::Idle`].
    pub fn reset(&mut self) {
        *self = Self::Idle;
    }
}

impl<T> From<Result<T, RequestError>> for RequestStatus<T> {
    fn from(outcome: Result<T, RequestError>) -> Self {
        match outcome {
            Ok(value) => Self::Succeeded(value),
            Err(err) => Self::Failed(err),
        }
    }
}

/// OR-combination of two independent operations as seen by a caller.
///
/// A failure of one operation can be masked by the other being pending;
/// callers are expected not to run both at once.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CombinedStatus {
    /// Either operation is in flight.
    pub pending: bool,
    /// First captured failure, checking the first operand before the second.
    pub error: Option<RequestError>,
}

impl CombinedStatus {
    /// Combine two statuses; `first`'s failure takes precedence.
    #[must_use]
    pub fn of<A, B>(first: &RequestStatus<A>, second: &RequestStatus<B>) -> Self {
        Self {
            pending: first.is_pending() || second.is_pending(),
            error: first.error().or_else(|| second.error()).cloned(),
        }
    }

    /// Whether either operation has a current failure.
    #[must_use]
    pub const fn is_error(&self) -> bool {
        self.error.is_some()
    }
}
