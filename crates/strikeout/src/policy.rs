// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::fmt::{Debug, Formatter};
use std::sync::Arc;

use crate::{FailureRecord, Message};

/// Decides what a task does after its handler fails.
///
/// The executor appends a [`FailureRecord`] to the task's history every time the handler
/// fails and then asks the policy for the next transition. The policy returns the
/// [`Message`] to apply together with the history the executor should persist from now on.
///
/// # Contract
///
/// Implementations must:
///
/// - Be deterministic given the arguments and the current wall-clock time.
/// - Leave the caller's history untouched and return a new history, which may be equal to
///   the input or a contiguous suffix of it.
/// - Return without blocking, panicking or performing I/O for any input, including an
///   empty history.
///
/// The policy keeps no per-task state. The executor must run at most one
/// decide-and-persist cycle per task at a time; otherwise concurrent callers can lose each
/// other's history updates.
///
/// # Implementing
///
/// Any `Fn(&str, &[FailureRecord]) -> (Message, Vec<FailureRecord>)` closure that is
/// `Send + Sync` is a policy, so simple strategies need no dedicated type:
///
/// ```
/// use strikeout::{FailureRecord, Message, RetryPolicy, SharedPolicy};
///
/// // Give up after the first failure, but only for tasks in the "oneshot" group.
/// let policy = SharedPolicy::from_fn(|task_id: &str, history: &[FailureRecord]| {
///     if task_id.starts_with("oneshot/") {
///         (Message::error("oneshot task failed"), history.to_vec())
///     } else {
///         (Message::run(), history.to_vec())
///     }
/// });
///
/// let (message, _) = policy.decide("oneshot/import", &[]);
/// assert!(message.is_terminal());
/// ```
pub trait RetryPolicy: Send + Sync {
    /// Returns the next transition for `task_id` and the history to keep.
    fn decide(&self, task_id: &str, history: &[FailureRecord]) -> (Message, Vec<FailureRecord>);
}

impl<F> RetryPolicy for F
where
    F: Fn(&str, &[FailureRecord]) -> (Message, Vec<FailureRecord>) + Send + Sync,
{
    fn decide(&self, task_id: &str, history: &[FailureRecord]) -> (Message, Vec<FailureRecord>) {
        self(task_id, history)
    }
}

/// A cheaply clonable, type-erased [`RetryPolicy`].
///
/// Executors that pick a policy at runtime, for example per task type, can store
/// `SharedPolicy` values instead of being generic over the policy type. Clones share the
/// same underlying policy.
#[derive(Clone)]
pub struct SharedPolicy(Arc<dyn RetryPolicy>);

impl SharedPolicy {
    /// Wraps a policy.
    #[must_use]
    pub fn new(policy: impl RetryPolicy + 'static) -> Self {
        Self(Arc::new(policy))
    }

    /// Wraps a closure.
    ///
    /// This is equivalent to [`SharedPolicy::new`], but the `Fn` bound lets the compiler
    /// infer the closure's argument types.
    #[must_use]
    pub fn from_fn<F>(policy: F) -> Self
    where
        F: Fn(&str, &[FailureRecord]) -> (Message, Vec<FailureRecord>) + Send + Sync + 'static,
    {
        Self::new(policy)
    }
}

impl RetryPolicy for SharedPolicy {
    fn decide(&self, task_id: &str, history: &[FailureRecord]) -> (Message, Vec<FailureRecord>) {
        self.0.decide(task_id, history)
    }
}

impl Debug for SharedPolicy {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SharedPolicy").finish()
    }
}
