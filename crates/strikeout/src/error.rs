// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

/// The result for fallible operations in this crate.
pub type Result<T> = std::result::Result<T, Error>;

/// An error raised while configuring a retry policy.
///
/// Decisions themselves never fail; this type only surfaces problems with the
/// options a policy is built from.
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// The strike threshold is zero, so every decision would fail the task.
    #[error("max_strikes must be at least 1")]
    ZeroMaxStrikes,

    /// The lookback window is empty, so no failure could ever count as a strike.
    #[error("lifetime must be greater than zero")]
    ZeroLifetime,
}
