// src/orchestrator/schedule.rs

use std::time::Duration;

use chrono::{DateTime, NaiveTime, TimeDelta, Utc};

/// The first instant strictly after `now` whose UTC wall-clock time is `at`.
pub fn next_daily_run(now: DateTime<Utc>, at: NaiveTime) -> DateTime<Utc> {
    let today = now.date_naive().and_time(at).and_utc();
    if today > now {
        today
    } else {
        today + TimeDelta::days(1)
    }
}

/// Time left until `target`; zero if it has already passed.
pub fn delay_until(now: DateTime<Utc>, target: DateTime<Utc>) -> Duration {
    (target - now).to_std().unwrap_or(Duration::ZERO)
}
