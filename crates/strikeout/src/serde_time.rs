// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Text encodings for durations on the wire.
//!
//! Durations are written as ISO 8601 durations (`PT10M`). Parsing also accepts the friendly
//! duration format (`10m`, `4h 30m`) understood by [`jiff`]. Timestamps use
//! [`tick::fmt::Iso8601`] directly.

use std::time::Duration;

use serde::de::Error as _;
use serde::ser::Error as _;
use serde::{Deserialize, Deserializer, Serializer};

fn serialize_duration<S: Serializer>(duration: Duration, serializer: S) -> Result<S::Ok, S::Error> {
    let signed = jiff::SignedDuration::try_from(duration).map_err(S::Error::custom)?;
    serializer.collect_str(&signed)
}

fn deserialize_signed<'de, D: Deserializer<'de>>(deserializer: D) -> Result<jiff::SignedDuration, D::Error> {
    let text = String::deserialize(deserializer)?;
    text.parse().map_err(D::Error::custom)
}

/// A non-negative duration such as a backoff.
pub(crate) mod duration {
    use std::time::Duration;

    use serde::de::Error as _;
    use serde::{Deserializer, Serializer};

    use super::{deserialize_signed, serialize_duration};

    pub(crate) fn serialize<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serialize_duration(*duration, serializer)
    }

    pub(crate) fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        let signed = deserialize_signed(deserializer)?;
        if signed.is_negative() {
            return Err(D::Error::custom(format!("duration must not be negative, got {signed}")));
        }

        Duration::try_from(signed).map_err(D::Error::custom)
    }
}

/// A lookback window.
///
/// The sign is ignored when parsing, so `-PT4H` and `PT4H` both mean "the last four hours".
pub(crate) mod lookback {
    use std::time::Duration;

    use serde::{Deserializer, Serializer};

    use super::{deserialize_signed, serialize_duration};

    pub(crate) fn serialize<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serialize_duration(*duration, serializer)
    }

    pub(crate) fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        deserialize_signed(deserializer).map(jiff::SignedDuration::unsigned_abs)
    }
}
