// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! A toy executor that keeps running a flaky handler until the policy gives up.
//!
//! The handler fails on every invocation. After each failure the executor records it,
//! asks the policy for the next transition, persists the trimmed history and applies the
//! transition. Time is simulated with `ClockControl`, so the example finishes instantly even
//! though the task sleeps for more than an hour in total.

use std::collections::HashMap;
use std::time::{Duration, SystemTime};

use strikeout::{FailureRecord, Message, MessageCode, RetryPolicy, SharedPolicy, StrikePolicy};
use tick::{Clock, ClockControl};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let control = ClockControl::new_at(SystemTime::UNIX_EPOCH + Duration::from_secs(1_722_979_800));
    let clock = control.to_clock();

    let mut executor = Executor::new(SharedPolicy::new(StrikePolicy::new(&clock)), clock);
    let task_id = "reports/nightly";
    let mut attempt = 0;

    let message = loop {
        attempt += 1;
        let message = executor.run_once(task_id, || Err(format!("upstream timed out (attempt {attempt})")));

        match message.transition() {
            MessageCode::Sleep => {
                let wait = message.remaining(executor.clock.system_time());
                println!("attempt {attempt}: sleeping for {}s", wait.as_secs());
                control.advance(wait);
            }
            MessageCode::Run => println!("attempt {attempt}: running again"),
            _ => break message,
        }
    };

    println!("task gave up after {attempt} attempts: {message}");
    println!("message: {}", serde_json::to_string(&message)?);
    println!("history: {}", serde_json::to_string_pretty(executor.history(task_id))?);

    Ok(())
}

/// Keeps the persisted failure history of every task and applies a policy to it.
struct Executor {
    policy: SharedPolicy,
    clock: Clock,
    histories: HashMap<String, Vec<FailureRecord>>,
}

impl Executor {
    fn new(policy: SharedPolicy, clock: Clock) -> Self {
        Self {
            policy,
            clock,
            histories: HashMap::new(),
        }
    }

    /// Invokes the handler once and returns the transition to apply.
    fn run_once(&mut self, task_id: &str, handler: impl FnOnce() -> Result<(), String>) -> Message {
        let Err(error) = handler() else {
            return Message::run();
        };

        let history = self.histories.entry(task_id.to_owned()).or_default();
        history.push(FailureRecord::now(&self.clock, error));

        let (message, kept) = self.policy.decide(task_id, history);
        *history = kept;
        message
    }

    fn history(&self, task_id: &str) -> &[FailureRecord] {
        self.histories.get(task_id).map(Vec::as_slice).unwrap_or_default()
    }
}
