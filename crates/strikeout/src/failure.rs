// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::borrow::Cow;
use std::time::SystemTime;

use tick::Clock;

/// A single failure of a task's handler.
///
/// The executor creates a record whenever a handler invocation fails and appends it to the
/// task's failure history. A history is a slice of records in the order they were appended,
/// which is also chronological order. Policies read the history but never reorder it; when
/// they shorten it, they keep the most recent records.
///
/// With the `serde` feature, a record is encoded as
/// `{ "timestamp": "<ISO 8601>", "error": "<description>" }`. Timestamps are written in UTC with
/// 100ns precision.
///
/// # Examples
///
/// ```
/// use std::time::{Duration, SystemTime};
///
/// use strikeout::FailureRecord;
///
/// let at = SystemTime::UNIX_EPOCH + Duration::from_secs(1_000_000);
/// let record = FailureRecord::new(at, "connection refused");
///
/// assert_eq!(record.occurred_at(), at);
/// assert_eq!(record.description(), "connection refused");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FailureRecord {
    occurred_at: SystemTime,
    description: Cow<'static, str>,
}

impl FailureRecord {
    /// Creates a record of a failure that occurred at the given time.
    #[must_use]
    pub fn new(occurred_at: SystemTime, description: impl Into<Cow<'static, str>>) -> Self {
        Self {
            occurred_at,
            description: description.into(),
        }
    }

    /// Creates a record of a failure that occurred just now, according to `clock`.
    #[must_use]
    pub fn now(clock: &Clock, description: impl Into<Cow<'static, str>>) -> Self {
        Self::new(clock.system_time(), description)
    }

    /// Returns when the failure occurred.
    #[must_use]
    pub fn occurred_at(&self) -> SystemTime {
        self.occurred_at
    }

    /// Returns the human-readable cause of the failure.
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }
}

#[cfg(feature = "serde")]
mod wire {
    use std::borrow::Cow;
    use std::time::SystemTime;

    use serde::ser::Error as _;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use tick::fmt::Iso8601;

    use super::FailureRecord;

    #[derive(Serialize)]
    struct Out<'a> {
        timestamp: Iso8601,
        error: &'a str,
    }

    #[derive(Deserialize)]
    struct In {
        timestamp: Iso8601,
        error: String,
    }

    impl Serialize for FailureRecord {
        fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
            Out {
                timestamp: Iso8601::try_from(self.occurred_at).map_err(S::Error::custom)?,
                error: &self.description,
            }
            .serialize(serializer)
        }
    }

    impl<'de> Deserialize<'de> for FailureRecord {
        fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
            let record = In::deserialize(deserializer)?;
            Ok(Self::new(SystemTime::from(record.timestamp), Cow::Owned(record.error)))
        }
    }
}
