// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::time::{Duration, SystemTime};

use crate::constants::{DEFAULT_BACKOFF, DEFAULT_LIFETIME, DEFAULT_MAX_STRIKES};
use crate::{Error, FailureRecord, Result};

/// Settings for a [`StrikePolicy`][crate::StrikePolicy].
///
/// | Setting | Default | Meaning |
/// |---------|---------|---------|
/// | [`lifetime`][Self::lifetime] | 4 hours | Failures older than this are ignored |
/// | [`max_strikes`][Self::max_strikes] | 8 | Strikes within the window that fail the task |
/// | [`backoff`][Self::backoff] | 10 minutes | Cooldown before the handler may run again |
///
/// With the `serde` feature, options can be loaded from configuration. Durations are strings
/// such as `"PT10M"` or `"10m"`, and missing fields take their defaults:
///
/// ```json
/// { "lifetime": "4h", "max_strikes": 8, "backoff": "10m" }
/// ```
///
/// # Examples
///
/// ```
/// use std::time::Duration;
///
/// use strikeout::StrikeOptions;
///
/// let options = StrikeOptions::default()
///     .max_strikes(3)
///     .backoff(Duration::from_secs(30));
///
/// assert_eq!(options.get_max_strikes(), 3);
/// assert_eq!(options.get_lifetime(), Duration::from_secs(4 * 60 * 60));
/// options.validate()?;
/// # Ok::<(), strikeout::Error>(())
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default, deny_unknown_fields))]
pub struct StrikeOptions {
    #[cfg_attr(feature = "serde", serde(with = "crate::serde_time::lookback"))]
    lifetime: Duration,
    max_strikes: usize,
    #[cfg_attr(feature = "serde", serde(with = "crate::serde_time::duration"))]
    backoff: Duration,
}

// Setters use plain names; getters carry the `get_` prefix.
impl StrikeOptions {
    /// Sets how far back failures count as strikes.
    ///
    /// **Default**: 4 hours
    #[must_use]
    pub const fn lifetime(mut self, lifetime: Duration) -> Self {
        self.lifetime = lifetime;
        self
    }

    /// Sets how many strikes within the lookback window fail the task.
    ///
    /// This is also the number of records kept in the history while the task keeps
    /// retrying.
    ///
    /// **Default**: 8
    #[must_use]
    pub const fn max_strikes(mut self, max_strikes: usize) -> Self {
        self.max_strikes = max_strikes;
        self
    }

    /// Sets the cooldown between a failure and the next handler invocation.
    ///
    /// **Default**: 10 minutes
    #[must_use]
    pub const fn backoff(mut self, backoff: Duration) -> Self {
        self.backoff = backoff;
        self
    }

    /// Returns the lookback window.
    #[must_use]
    pub const fn get_lifetime(&self) -> Duration {
        self.lifetime
    }

    /// Returns the strike threshold.
    #[must_use]
    pub const fn get_max_strikes(&self) -> usize {
        self.max_strikes
    }

    /// Returns the cooldown duration.
    #[must_use]
    pub const fn get_backoff(&self) -> Duration {
        self.backoff
    }

    /// Checks that these options describe a usable policy.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ZeroMaxStrikes`] if `max_strikes` is zero and
    /// [`Error::ZeroLifetime`] if the lookback window is empty.
    pub const fn validate(&self) -> Result<()> {
        if self.max_strikes == 0 {
            return Err(Error::ZeroMaxStrikes);
        }

        if self.lifetime.is_zero() {
            return Err(Error::ZeroLifetime);
        }

        Ok(())
    }

    /// Counts the records in `history` that occurred strictly after `now - lifetime`.
    ///
    /// A record exactly at the cutoff does not count. If the cutoff lies before the earliest
    /// representable time, every record counts.
    pub(crate) fn strikes(&self, history: &[FailureRecord], now: SystemTime) -> usize {
        let cutoff = now.checked_sub(self.lifetime);

        history
            .iter()
            .filter(|record| cutoff.is_none_or(|cutoff| record.occurred_at() > cutoff))
            .count()
    }

    /// Returns the most recent `max_strikes` records of `history`, oldest first.
    pub(crate) fn trim(&self, history: &[FailureRecord]) -> Vec<FailureRecord> {
        let skip = history.len().saturating_sub(self.max_strikes);
        history.iter().skip(skip).cloned().collect()
    }

    /// Returns the deadline for a sleep that starts at `now`.
    ///
    /// Saturates to `now` if the deadline is not representable.
    pub(crate) fn deadline(&self, now: SystemTime) -> SystemTime {
        now.checked_add(self.backoff).unwrap_or(now)
    }
}

impl Default for StrikeOptions {
    fn default() -> Self {
        Self {
            lifetime: DEFAULT_LIFETIME,
            max_strikes: DEFAULT_MAX_STRIKES,
            backoff: DEFAULT_BACKOFF,
        }
    }
}
