// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::fmt::{Display, Formatter};
use std::time::{Duration, SystemTime};

use crate::Cause;

/// The kind of transition a [`Message`] requests.
///
/// The executor's task state machine has three states: `Run`, `Sleep` and the terminal
/// `Fail`. [`MessageCode::Error`] is not a state; it requests the `Fail` transition on
/// behalf of an error and resolves to [`MessageCode::Fail`] via [`MessageCode::transition`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageCode {
    /// Invoke the handler again right away.
    Run,
    /// Wait until the message deadline before invoking the handler again.
    Sleep,
    /// Stop the task permanently.
    Fail,
    /// Stop the task permanently because of the attached cause.
    Error,
}

impl MessageCode {
    /// Returns the state the executor should enter for this code.
    ///
    /// ```
    /// use strikeout::MessageCode;
    ///
    /// assert_eq!(MessageCode::Error.transition(), MessageCode::Fail);
    /// assert_eq!(MessageCode::Sleep.transition(), MessageCode::Sleep);
    /// ```
    #[must_use]
    pub const fn transition(self) -> Self {
        match self {
            Self::Error => Self::Fail,
            code => code,
        }
    }

    /// Returns `true` if the task must not run again.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Fail | Self::Error)
    }
}

impl Display for MessageCode {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Run => write!(f, "run"),
            Self::Sleep => write!(f, "sleep"),
            Self::Fail => write!(f, "fail"),
            Self::Error => write!(f, "error"),
        }
    }
}

/// A state transition request produced by a [`RetryPolicy`][crate::RetryPolicy].
///
/// A message is built fresh for every decision and consumed right away by the executor,
/// which applies the transition and persists the task state. Only [`MessageCode::Sleep`]
/// messages carry a deadline; the constructors make it impossible to build a message that
/// breaks this rule.
///
/// With the `serde` feature, a message is encoded as
/// `{ "code": "Run" | "Sleep" | "Fail", "until"?: "<ISO 8601>", "error"?: "<text>" }`.
/// [`MessageCode::Error`] is written as `"Fail"` because it only exists to request that
/// transition.
///
/// # Examples
///
/// ```
/// use std::time::{Duration, SystemTime};
///
/// use strikeout::{Cause, Message, MessageCode};
///
/// let until = SystemTime::UNIX_EPOCH + Duration::from_secs(600);
/// let message = Message::sleep(until);
/// assert_eq!(message.code(), MessageCode::Sleep);
/// assert_eq!(message.until(), Some(until));
///
/// let message = Message::fail().with_cause(Cause::ExceededErrorRate);
/// assert!(message.is_terminal());
/// assert_eq!(message.until(), None);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    code: MessageCode,
    until: Option<SystemTime>,
    cause: Option<Cause>,
}

impl Message {
    /// Requests that the handler is invoked again right away.
    #[must_use]
    pub const fn run() -> Self {
        Self {
            code: MessageCode::Run,
            until: None,
            cause: None,
        }
    }

    /// Requests that the handler is not invoked again before `until`.
    #[must_use]
    pub const fn sleep(until: SystemTime) -> Self {
        Self {
            code: MessageCode::Sleep,
            until: Some(until),
            cause: None,
        }
    }

    /// Requests that the task is stopped permanently.
    #[must_use]
    pub const fn fail() -> Self {
        Self {
            code: MessageCode::Fail,
            until: None,
            cause: None,
        }
    }

    /// Requests that the task is stopped permanently because of `cause`.
    #[must_use]
    pub fn error(cause: impl Into<Cause>) -> Self {
        Self {
            code: MessageCode::Error,
            until: None,
            cause: Some(cause.into()),
        }
    }

    /// Attaches the error that caused this transition.
    #[must_use]
    pub fn with_cause(mut self, cause: impl Into<Cause>) -> Self {
        self.cause = Some(cause.into());
        self
    }

    /// Returns the requested transition.
    #[must_use]
    pub const fn code(&self) -> MessageCode {
        self.code
    }

    /// Returns the state the executor should enter; see [`MessageCode::transition`].
    #[must_use]
    pub const fn transition(&self) -> MessageCode {
        self.code.transition()
    }

    /// Returns the earliest time the handler may run again, for sleep messages.
    #[must_use]
    pub const fn until(&self) -> Option<SystemTime> {
        self.until
    }

    /// Returns the error that caused this transition, if any.
    #[must_use]
    pub const fn cause(&self) -> Option<&Cause> {
        self.cause.as_ref()
    }

    /// Returns `true` if the task must not run again.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        self.code.is_terminal()
    }

    /// Returns how long the executor must still wait at `now` before invoking the handler.
    ///
    /// This is zero for messages without a deadline and once the deadline has passed.
    #[must_use]
    pub fn remaining(&self, now: SystemTime) -> Duration {
        self.until
            .and_then(|until| until.duration_since(now).ok())
            .unwrap_or(Duration::ZERO)
    }
}

impl Display for Message {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        Display::fmt(&self.code, f)?;

        if let Some(cause) = &self.cause {
            write!(f, " ({cause})")?;
        }

        Ok(())
    }
}

#[cfg(feature = "serde")]
mod wire {
    use serde::de::Error as _;
    use serde::ser::Error as _;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use tick::fmt::Iso8601;

    use super::{Message, MessageCode};
    use crate::Cause;

    #[derive(Serialize, Deserialize)]
    enum Code {
        Run,
        Sleep,
        Fail,
    }

    #[derive(Serialize, Deserialize)]
    struct Wire {
        code: Code,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        until: Option<Iso8601>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        error: Option<String>,
    }

    impl Serialize for Message {
        fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
            let code = match self.code {
                MessageCode::Run => Code::Run,
                MessageCode::Sleep => Code::Sleep,
                MessageCode::Fail | MessageCode::Error => Code::Fail,
            };

            Wire {
                code,
                until: self.until.map(Iso8601::try_from).transpose().map_err(S::Error::custom)?,
                error: self.cause.as_ref().map(Cause::to_wire),
            }
            .serialize(serializer)
        }
    }

    impl<'de> Deserialize<'de> for Message {
        fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
            let wire = Wire::deserialize(deserializer)?;

            let message = match (wire.code, wire.until) {
                (Code::Sleep, Some(until)) => Self::sleep(until.into()),
                (Code::Sleep, None) => return Err(D::Error::missing_field("until")),
                (Code::Run | Code::Fail, Some(_)) => {
                    return Err(D::Error::custom("`until` is only allowed on Sleep messages"));
                }
                (Code::Run, None) => Self::run(),
                (Code::Fail, None) => Self::fail(),
            };

            Ok(match wire.error {
                Some(text) => message.with_cause(Cause::from_wire(text)),
                None => message,
            })
        }
    }
}

#[cfg_attr(coverage_nightly, coverage(off))]
#[cfg(test)]
mod tests {
    use super::*;

    fn at(secs: u64) -> SystemTime {
        SystemTime::UNIX_EPOCH + Duration::from_secs(secs)
    }

    #[test]
    fn assert_types() {
        static_assertions::assert_impl_all!(Message: Send, Sync, Clone, std::fmt::Debug, Eq);
        static_assertions::assert_impl_all!(MessageCode: Send, Sync, Copy, Eq, std::hash::Hash);
    }

    #[test]
    fn only_sleep_has_deadline() {
        assert_eq!(Message::run().until(), None);
        assert_eq!(Message::fail().until(), None);
        assert_eq!(Message::error("boom").until(), None);
        assert_eq!(Message::sleep(at(10)).until(), Some(at(10)));
    }

    #[test]
    fn error_resolves_to_fail() {
        let message = Message::error("handler gave up");

        assert_eq!(message.code(), MessageCode::Error);
        assert_eq!(message.transition(), MessageCode::Fail);
        assert_eq!(message.cause(), Some(&Cause::handler("handler gave up")));
        assert!(message.is_terminal());
    }

    #[test]
    fn terminal_codes() {
        assert!(!MessageCode::Run.is_terminal());
        assert!(!MessageCode::Sleep.is_terminal());
        assert!(MessageCode::Fail.is_terminal());
        assert!(MessageCode::Error.is_terminal());
    }

    #[test]
    fn remaining_counts_down() {
        let message = Message::sleep(at(600));

        assert_eq!(message.remaining(at(0)), Duration::from_secs(600));
        assert_eq!(message.remaining(at(599)), Duration::from_secs(1));
        assert_eq!(message.remaining(at(600)), Duration::ZERO);
        assert_eq!(message.remaining(at(900)), Duration::ZERO);
        assert_eq!(Message::run().remaining(at(0)), Duration::ZERO);
    }

    #[test]
    fn display_ok() {
        assert_eq!(Message::run().to_string(), "run");
        assert_eq!(Message::sleep(at(1)).to_string(), "sleep");
        assert_eq!(
            Message::fail().with_cause(Cause::ExceededErrorRate).to_string(),
            "fail (exceeded error rate)"
        );
        assert_eq!(Message::error("disk full").to_string(), "error (disk full)");
    }

    #[cfg(feature = "serde")]
    mod json {
        use super::*;

        fn parse(json: &str) -> Result<Message, serde_json::Error> {
            serde_json::from_str(json)
        }

        #[test]
        fn run_format() {
            assert_eq!(serde_json::to_string(&Message::run()).unwrap(), r#"{"code":"Run"}"#);
            assert_eq!(parse(r#"{"code":"Run"}"#).unwrap(), Message::run());
        }

        #[test]
        fn sleep_format() {
            let until: SystemTime = "2024-08-06T21:40:00Z".parse::<jiff::Timestamp>().unwrap().into();
            let message = Message::sleep(until);

            let json = serde_json::to_string(&message).unwrap();

            assert_eq!(json, r#"{"code":"Sleep","until":"2024-08-06T21:40:00Z"}"#);
            assert_eq!(parse(&json).unwrap(), message);
        }

        #[test]
        fn fail_with_sentinel_format() {
            let message = Message::fail().with_cause(Cause::ExceededErrorRate);

            let json = serde_json::to_string(&message).unwrap();

            assert_eq!(json, r#"{"code":"Fail","error":"exceeded error rate"}"#);
            assert_eq!(parse(&json).unwrap().cause(), Some(&Cause::ExceededErrorRate));
        }

        #[test]
        fn error_written_as_fail() {
            let json = serde_json::to_string(&Message::error("disk full")).unwrap();

            assert_eq!(json, r#"{"code":"Fail","error":"disk full"}"#);
            assert_eq!(parse(&json).unwrap(), Message::fail().with_cause("disk full"));
        }

        #[test]
        fn sleep_until_offset_normalized_to_utc() {
            let message = parse(r#"{"code":"Sleep","until":"2024-08-06T23:40:00+02:00"}"#).unwrap();

            let expected: SystemTime = "2024-08-06T21:40:00Z".parse::<jiff::Timestamp>().unwrap().into();
            assert_eq!(message.until(), Some(expected));
        }

        #[test]
        fn invalid_until_rejected() {
            parse(r#"{"code":"Sleep","until":"in ten minutes"}"#).unwrap_err();
        }

        #[test]
        fn sleep_without_until_rejected() {
            let error = parse(r#"{"code":"Sleep"}"#).unwrap_err();

            assert!(error.to_string().contains("until"), "{error}");
        }

        #[test]
        fn until_on_run_rejected() {
            parse(r#"{"code":"Run","until":"2024-08-06T21:40:00Z"}"#).unwrap_err();
            parse(r#"{"code":"Fail","until":"2024-08-06T21:40:00Z"}"#).unwrap_err();
        }

        #[test]
        fn unknown_code_rejected() {
            parse(r#"{"code":"Error"}"#).unwrap_err();
            parse(r#"{"code":"Pause"}"#).unwrap_err();
        }
    }
}
