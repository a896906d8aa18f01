// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Log events emitted by [`StrikePolicy`][crate::StrikePolicy] when the `logs` feature is enabled.

use std::time::Duration;

/// Event name for a decision that fails the task.
#[cfg(any(feature = "logs", test))]
pub(crate) const FAIL_EVENT: &str = "strikeout.fail";

/// Event name for a decision that puts the task to sleep.
#[cfg(any(feature = "logs", test))]
pub(crate) const SLEEP_EVENT: &str = "strikeout.sleep";

pub(crate) fn fail(task_id: &str, strikes: usize, max_strikes: usize, history_len: usize) {
    #[cfg(any(feature = "logs", test))]
    tracing::event!(
        name: FAIL_EVENT,
        tracing::Level::WARN,
        task.id = task_id,
        strikes,
        max_strikes,
        history.len = history_len,
        "error rate exceeded, failing task"
    );

    #[cfg(not(any(feature = "logs", test)))]
    let _ = (task_id, strikes, max_strikes, history_len);
}

pub(crate) fn sleep(task_id: &str, strikes: usize, backoff: Duration, trimmed: usize) {
    #[cfg(any(feature = "logs", test))]
    tracing::event!(
        name: SLEEP_EVENT,
        tracing::Level::DEBUG,
        task.id = task_id,
        strikes,
        backoff = backoff.as_secs_f32(),
        history.trimmed = trimmed,
        "task failed, sleeping before retry"
    );

    #[cfg(not(any(feature = "logs", test)))]
    let _ = (task_id, strikes, backoff, trimmed);
}
