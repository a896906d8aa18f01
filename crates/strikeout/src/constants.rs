// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::time::Duration;

/// Default lookback window: failures older than 4 hours are ignored.
///
/// A few hours is long enough to notice a handler that keeps failing on every
/// wake-up, yet short enough that an isolated burst of errors from yesterday
/// does not count against a task that has since recovered.
pub(crate) const DEFAULT_LIFETIME: Duration = Duration::from_secs(4 * 60 * 60);

/// Default strike threshold: 8 failures within the lookback window.
pub(crate) const DEFAULT_MAX_STRIKES: usize = 8;

/// Default cooldown before a failed handler may run again: 10 minutes.
///
/// Combined with the defaults above, a handler that fails on every attempt is
/// abandoned after roughly 70 minutes of sleeping.
pub(crate) const DEFAULT_BACKOFF: Duration = Duration::from_secs(10 * 60);
