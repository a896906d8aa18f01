// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::time::Duration;

use tick::Clock;

use crate::{Cause, FailureRecord, Message, Result, RetryPolicy, StrikeOptions, telemetry};

/// The default [`RetryPolicy`]: a fixed cooldown until too many failures pile up.
///
/// Every failure inside the lookback window is a *strike*. On each decision the policy reads
/// the current time from its [`Clock`] and counts the strikes in the history:
///
/// - Fewer than `max_strikes`: the task sleeps for the backoff duration. The returned history
///   keeps only the most recent `max_strikes` records so it cannot grow without bound.
/// - `max_strikes` or more: the task fails with [`Cause::ExceededErrorRate`]. The history is
///   returned untouched so the complete record of what went wrong survives the failure.
///
/// A failure that occurred exactly `lifetime` ago is outside the window. The task identifier
/// is ignored.
///
/// See [`StrikeOptions`] for the defaults.
///
/// # Examples
///
/// ```
/// use std::time::{Duration, SystemTime};
///
/// use strikeout::{Cause, FailureRecord, MessageCode, RetryPolicy, StrikePolicy};
/// use tick::Clock;
///
/// let now = SystemTime::UNIX_EPOCH + Duration::from_secs(86_400);
/// let clock = Clock::new_frozen_at(now);
/// let policy = StrikePolicy::new(&clock).max_strikes(2);
///
/// let first = vec![FailureRecord::new(now, "timeout")];
/// let (message, history) = policy.decide("ingest", &first);
/// assert_eq!(message.code(), MessageCode::Sleep);
/// assert_eq!(message.until(), Some(now + Duration::from_secs(600)));
/// assert_eq!(history, first);
///
/// let second = [history, vec![FailureRecord::new(now, "timeout")]].concat();
/// let (message, history) = policy.decide("ingest", &second);
/// assert_eq!(message.code(), MessageCode::Fail);
/// assert_eq!(message.cause(), Some(&Cause::ExceededErrorRate));
/// assert_eq!(history, second);
/// ```
#[derive(Debug, Clone)]
pub struct StrikePolicy {
    clock: Clock,
    options: StrikeOptions,
}

impl StrikePolicy {
    /// Creates a policy with default options that reads time from `clock`.
    #[must_use]
    pub fn new(clock: &Clock) -> Self {
        Self {
            clock: clock.clone(),
            options: StrikeOptions::default(),
        }
    }

    /// Creates a policy from previously loaded options.
    ///
    /// # Errors
    ///
    /// Returns an error if the options fail [`StrikeOptions::validate`].
    pub fn from_options(clock: &Clock, options: StrikeOptions) -> Result<Self> {
        options.validate()?;

        Ok(Self {
            clock: clock.clone(),
            options,
        })
    }

    /// Sets how far back failures count as strikes.
    ///
    /// **Default**: 4 hours
    #[must_use]
    pub fn lifetime(mut self, lifetime: Duration) -> Self {
        self.options = self.options.lifetime(lifetime);
        self
    }

    /// Sets how many strikes fail the task.
    ///
    /// A threshold of zero fails every task on its first decision.
    ///
    /// **Default**: 8
    #[must_use]
    pub fn max_strikes(mut self, max_strikes: usize) -> Self {
        self.options = self.options.max_strikes(max_strikes);
        self
    }

    /// Sets the cooldown before the handler may run again.
    ///
    /// **Default**: 10 minutes
    #[must_use]
    pub fn backoff(mut self, backoff: Duration) -> Self {
        self.options = self.options.backoff(backoff);
        self
    }

    /// Returns the options this policy decides with.
    #[must_use]
    pub const fn options(&self) -> &StrikeOptions {
        &self.options
    }

    /// Returns the number of records in `history` that count as strikes right now.
    #[must_use]
    pub fn strikes(&self, history: &[FailureRecord]) -> usize {
        self.options.strikes(history, self.clock.system_time())
    }
}

impl RetryPolicy for StrikePolicy {
    fn decide(&self, task_id: &str, history: &[FailureRecord]) -> (Message, Vec<FailureRecord>) {
        let now = self.clock.system_time();
        let strikes = self.options.strikes(history, now);
        let max_strikes = self.options.get_max_strikes();

        if strikes >= max_strikes {
            telemetry::fail(task_id, strikes, max_strikes, history.len());
            return (Message::fail().with_cause(Cause::ExceededErrorRate), history.to_vec());
        }

        let kept = self.options.trim(history);
        telemetry::sleep(task_id, strikes, self.options.get_backoff(), history.len() - kept.len());

        (Message::sleep(self.options.deadline(now)), kept)
    }
}
