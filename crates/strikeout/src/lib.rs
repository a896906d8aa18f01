// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc(html_logo_url = "https://media.githubusercontent.com/media/microsoft/oxidizer/refs/heads/main/crates/strikeout/logo.png")]
#![doc(html_favicon_url = "https://media.githubusercontent.com/media/microsoft/oxidizer/refs/heads/main/crates/strikeout/favicon.ico")]

//! Retry decisions for stateful task executors.
//!
//! When a task's handler fails, an executor has to decide whether to run it again, let it
//! cool down first, or give up for good. This crate makes that decision from a bounded
//! history of past failures and keeps the history from growing without bound. The executor
//! itself, including how it stores task state and schedules handlers, lives elsewhere; this
//! crate only produces the transition to apply.
//!
//! # Core Types
//!
//! - [`FailureRecord`]: One failure of a handler, with its time and description.
//! - [`Message`]: The transition the executor should apply next (`Run`, `Sleep` or `Fail`).
//! - [`RetryPolicy`]: Maps a task's failure history to the next [`Message`] and the history
//!   to keep. Closures are policies too.
//! - [`StrikePolicy`]: The default policy. It sleeps for a fixed backoff after each failure
//!   and fails the task once too many failures land inside a sliding time window.
//! - [`Cause`]: Why a transition happened, including the [`Cause::ExceededErrorRate`] sentinel.
//!
//! # Quick Start
//!
//! ```
//! use std::time::{Duration, SystemTime};
//!
//! use strikeout::{FailureRecord, MessageCode, RetryPolicy, StrikePolicy};
//! use tick::Clock;
//!
//! # let clock = Clock::new_frozen_at(SystemTime::UNIX_EPOCH + Duration::from_secs(86_400));
//! let policy = StrikePolicy::new(&clock);
//! let mut history = Vec::new();
//!
//! // The handler failed; record it and ask the policy what to do next.
//! history.push(FailureRecord::now(&clock, "upstream timed out"));
//! let (message, kept) = policy.decide("nightly-report", &history);
//! history = kept;
//!
//! match message.transition() {
//!     MessageCode::Sleep => { /* park the task until `message.until()` */ }
//!     MessageCode::Fail => { /* mark the task as permanently failed */ }
//!     _ => { /* run the handler again */ }
//! }
//! # assert_eq!(message.code(), MessageCode::Sleep);
//! # assert_eq!(history.len(), 1);
//! ```
//!
//! > **Note**: Policies read the current time from a [`Clock`][tick::Clock] supplied by the
//! > [`tick`] crate. In tests, use `tick::ClockControl` to move time forward deterministically.
//!
//! # Concurrency
//!
//! Policies hold no mutable state and can decide for many tasks at once. They take a
//! snapshot of the history and return a new one, so the executor must serialize the
//! decide-and-persist cycle for any single task.
//!
//! ## Features
//!
//! - `serde`: Serialization for [`FailureRecord`], [`Message`] and [`StrikeOptions`].
//!   Timestamps and durations use ISO 8601.
//! - `logs`: Emits `tracing` events for every decision of a [`StrikePolicy`].

mod cause;
mod constants;
mod error;
mod failure;
mod message;
mod options;
mod policy;
mod strike;
mod telemetry;

#[cfg(feature = "serde")]
mod serde_time;

pub use cause::Cause;
pub use error::{Error, Result};
pub use failure::FailureRecord;
pub use message::{Message, MessageCode};
pub use options::StrikeOptions;
pub use policy::{RetryPolicy, SharedPolicy};
pub use strike::StrikePolicy;
