// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::borrow::Cow;

/// The text of the synthetic rate-exceeded error.
const EXCEEDED_ERROR_RATE: &str = "exceeded error rate";

/// The error that caused a state transition.
///
/// A cause is attached to a [`Message`][crate::Message] when the transition was
/// triggered by an error condition. It is either the synthetic
/// [`ExceededErrorRate`][Cause::ExceededErrorRate] sentinel raised by a policy once the
/// retry budget is spent, or an opaque error reported by the task's handler.
///
/// # Examples
///
/// ```
/// use strikeout::Cause;
///
/// let cause = Cause::handler("connection refused");
/// assert_eq!(cause.to_string(), "connection refused");
/// assert!(!cause.is_exceeded_error_rate());
///
/// assert_eq!(Cause::ExceededErrorRate.to_string(), "exceeded error rate");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, thiserror::Error)]
pub enum Cause {
    /// The task failed too often within the lookback window and must not be retried.
    ///
    /// This is never one of the handler's own errors; those stay in the failure history.
    #[error("{}", EXCEEDED_ERROR_RATE)]
    ExceededErrorRate,

    /// An error reported by the task's handler, stored verbatim.
    #[error("{0}")]
    Handler(Cow<'static, str>),
}

impl Cause {
    /// Creates a cause from a handler error description.
    #[must_use]
    pub fn handler(description: impl Into<Cow<'static, str>>) -> Self {
        Self::Handler(description.into())
    }

    /// Returns `true` if this is the synthetic rate-exceeded sentinel.
    #[must_use]
    pub const fn is_exceeded_error_rate(&self) -> bool {
        matches!(self, Self::ExceededErrorRate)
    }

    /// Decodes a cause from its wire text.
    ///
    /// The sentinel text maps back to [`Cause::ExceededErrorRate`]; any other text is a
    /// handler error.
    #[cfg(feature = "serde")]
    pub(crate) fn from_wire(text: String) -> Self {
        if text == EXCEEDED_ERROR_RATE {
            Self::ExceededErrorRate
        } else {
            Self::Handler(Cow::Owned(text))
        }
    }

    #[cfg(feature = "serde")]
    pub(crate) fn to_wire(&self) -> String {
        match self {
            Self::ExceededErrorRate => EXCEEDED_ERROR_RATE.to_owned(),
            Self::Handler(description) => description.clone().into_owned(),
        }
    }
}

impl From<String> for Cause {
    fn from(description: String) -> Self {
        Self::handler(description)
    }
}

impl From<&'static str> for Cause {
    fn from(description: &'static str) -> Self {
        Self::handler(description)
    }
}
