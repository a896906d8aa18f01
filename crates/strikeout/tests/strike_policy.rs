// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

#![allow(missing_docs, reason = "This is a test module")]

//! Integration tests for the default policy using only public API.

use std::time::{Duration, SystemTime};

use rstest::rstest;
use strikeout::{Cause, FailureRecord, Message, MessageCode, RetryPolicy, SharedPolicy, StrikeOptions, StrikePolicy};
use tick::{Clock, ClockControl};

const HOUR: Duration = Duration::from_secs(3600);
const MINUTE: Duration = Duration::from_secs(60);
const MAX_STRIKES: usize = 8;

fn now() -> SystemTime {
    SystemTime::UNIX_EPOCH + 10_000 * HOUR
}

fn policy() -> StrikePolicy {
    StrikePolicy::new(&Clock::new_frozen_at(now()))
}

/// Builds a chronological history from failure ages, oldest first.
fn history(ages: &[Duration]) -> Vec<FailureRecord> {
    ages.iter()
        .enumerate()
        .map(|(i, age)| FailureRecord::new(now() - *age, format!("failure #{i}")))
        .collect()
}

fn repeat(count: usize, age: Duration) -> Vec<Duration> {
    vec![age; count]
}

#[rstest]
#[case::empty(0, 0)]
#[case::one_recent(1, 0)]
#[case::below_with_old(7, 30)]
#[case::few_recent_many_old(3, 100)]
fn sleeps_below_threshold(#[case] recent: usize, #[case] old: usize) {
    let ages = [repeat(old, 6 * HOUR), repeat(recent, 30 * MINUTE)].concat();
    let input = history(&ages);

    let (message, kept) = policy().decide("task", &input);

    assert_eq!(message.code(), MessageCode::Sleep);
    assert_eq!(message.until(), Some(now() + 10 * MINUTE));
    assert_eq!(message.cause(), None);
    assert!(kept.len() <= MAX_STRIKES);
    assert_eq!(kept, input[input.len() - kept.len()..]);
}

#[rstest]
#[case::at_threshold(8, 0)]
#[case::above_threshold(12, 0)]
#[case::with_old(8, 40)]
fn fails_at_threshold(#[case] recent: usize, #[case] old: usize) {
    let input = history(&[repeat(old, 6 * HOUR), repeat(recent, 30 * MINUTE)].concat());

    let (message, kept) = policy().decide("task", &input);

    assert_eq!(message, Message::fail().with_cause(Cause::ExceededErrorRate));
    assert_eq!(kept, input);
}

#[test]
fn boundary_one_below_threshold_sleeps() {
    let input = history(&repeat(MAX_STRIKES - 1, HOUR));

    assert_eq!(policy().decide("task", &input).0.code(), MessageCode::Sleep);
}

#[test]
fn boundary_at_threshold_fails() {
    let input = history(&repeat(MAX_STRIKES, HOUR));

    assert_eq!(policy().decide("task", &input).0.code(), MessageCode::Fail);
}

#[test]
fn thousand_old_failures_do_not_count() {
    let input = history(&repeat(1000, 4 * HOUR + Duration::from_secs(1)));

    let (message, kept) = policy().decide("task", &input);

    assert_eq!(message.code(), MessageCode::Sleep);
    assert_eq!(kept.len(), MAX_STRIKES);
}

#[test]
fn twenty_records_trimmed_on_sleep_kept_on_fail() {
    // One failure every 10 minutes over the last 200 minutes: all 20 are strikes.
    let ages: Vec<_> = (1..=20_u32).rev().map(|i| i * 10 * MINUTE).collect();
    let input = history(&ages);

    let (message, kept) = policy().decide("task", &input);
    assert_eq!(message.code(), MessageCode::Fail);
    assert_eq!(kept, input);

    // With a one hour window only 5 of them are strikes.
    let (message, kept) = policy().lifetime(HOUR).decide("task", &input);
    assert_eq!(message.code(), MessageCode::Sleep);
    assert_eq!(kept, input[12..]);
    assert_eq!(kept.first().map(FailureRecord::description), Some("failure #12"));
}

#[test]
fn scenario_eight_recent_failures() {
    let input = history(&repeat(8, HOUR));

    let (message, kept) = policy().decide("task", &input);

    assert_eq!(message.code(), MessageCode::Fail);
    assert!(message.cause().is_some_and(Cause::is_exceeded_error_rate));
    assert_eq!(kept.len(), 8);
    assert_eq!(kept, input);
}

#[test]
fn scenario_seven_recent_five_old() {
    let input = history(&[repeat(5, 5 * HOUR), repeat(7, HOUR)].concat());

    let (message, kept) = policy().decide("task", &input);

    assert_eq!(message.code(), MessageCode::Sleep);
    assert_eq!(message.remaining(now()), 10 * MINUTE);
    assert_eq!(kept.len(), 8);
    assert_eq!(kept, input[4..]);
}

#[test]
fn sentinel_differs_from_handler_causes() {
    let input: Vec<_> = (0..8)
        .map(|_| FailureRecord::new(now(), "exceeded error rate"))
        .collect();

    let (message, _) = policy().decide("task", &input);

    assert_eq!(message.cause(), Some(&Cause::ExceededErrorRate));
    assert_ne!(message.cause(), Some(&Cause::handler("exceeded error rate")));
}

#[test]
fn loaded_options_drive_policy() {
    let clock = Clock::new_frozen_at(now());
    let options = StrikeOptions::default().max_strikes(2).backoff(HOUR);
    let policy = StrikePolicy::from_options(&clock, options).unwrap();

    assert_eq!(policy.options(), &options);
    assert_eq!(policy.decide("task", &history(&[MINUTE])).0, Message::sleep(now() + HOUR));
    assert_eq!(policy.decide("task", &history(&[MINUTE, MINUTE])).0.code(), MessageCode::Fail);
}

#[test]
fn executor_loop_fails_after_seventy_minutes() {
    let control = ClockControl::new_at(now());
    let clock = control.to_clock();
    let policy = SharedPolicy::new(StrikePolicy::new(&clock));
    let mut persisted = Vec::new();
    let start = clock.system_time();

    let message = loop {
        persisted.push(FailureRecord::now(&clock, "handler failed"));
        let (message, kept) = policy.decide("looping-task", &persisted);
        persisted = kept;

        if message.is_terminal() {
            break message;
        }

        control.advance(message.remaining(clock.system_time()));
    };

    assert_eq!(message.cause(), Some(&Cause::ExceededErrorRate));
    assert_eq!(persisted.len(), MAX_STRIKES);
    assert_eq!(clock.system_time().duration_since(start).unwrap(), 70 * MINUTE);
}

#[test]
fn spaced_out_failures_sleep_forever() {
    let control = ClockControl::new_at(now());
    let clock = control.to_clock();
    let policy = StrikePolicy::new(&clock);
    let mut persisted = Vec::new();

    for _ in 0..50 {
        persisted.push(FailureRecord::now(&clock, "handler failed"));
        let (message, kept) = policy.decide("slow-task", &persisted);
        persisted = kept;

        assert_eq!(message.code(), MessageCode::Sleep);
        assert!(persisted.len() <= MAX_STRIKES);

        // One failure per hour never puts more than four inside the window.
        control.advance(HOUR);
    }
}
