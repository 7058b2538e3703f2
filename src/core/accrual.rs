//! Statistics accrual engine.
//!
//! Converts one start/stop log action into the next statistics snapshot.
//! Pure function of (current snapshot, log type, log time): no I/O, no
//! clock reads, and it never fails on valid inputs. Transition policy
//! (e.g. rejecting a start while running) belongs to the caller; the
//! engine itself is permissive so that out-of-order or missing entries
//! degrade to zero-duration increments instead of errors.

use chrono::NaiveDateTime;
use rust_decimal::Decimal;

use crate::models::log_entry::LogType;
use crate::models::statistics::{EventStatus, Statistics};

/// Apply one log action to an event's statistics snapshot.
/// `current == None` means the event has never been started or stopped.
pub fn apply(
    current: Option<&Statistics>,
    event_id: i64,
    log_type: LogType,
    log_time: NaiveDateTime,
) -> Statistics {
    match log_type {
        LogType::Start => start(current, event_id, log_time),
        LogType::Stop => stop(current, event_id, log_time),
    }
}

/// A start rebases the clock. On an existing snapshot the accumulated
/// total is untouched, so a start received while already running simply
/// moves `last_start_time` forward without double counting.
fn start(current: Option<&Statistics>, event_id: i64, log_time: NaiveDateTime) -> Statistics {
    match current {
        Some(stats) => Statistics {
            last_start_time: Some(log_time),
            event_status: EventStatus::Running,
            ..stats.clone()
        },
        None => Statistics {
            event_id,
            last_start_time: Some(log_time),
            last_stop_time: None,
            total_duration_seconds: Decimal::ZERO,
            event_status: EventStatus::Running,
        },
    }
}

/// A stop accrues elapsed time only when the event is actually running
/// with a known start time; stopping an already-stopped event adds zero.
fn stop(current: Option<&Statistics>, event_id: i64, log_time: NaiveDateTime) -> Statistics {
    match current {
        Some(stats) => {
            let increment = if stats.is_running() {
                stats
                    .last_start_time
                    .map(|started| elapsed_seconds(started, log_time))
                    .unwrap_or(Decimal::ZERO)
            } else {
                Decimal::ZERO
            };

            Statistics {
                last_stop_time: Some(log_time),
                total_duration_seconds: stats.total_duration_seconds + increment,
                event_status: EventStatus::Stopped,
                ..stats.clone()
            }
        }
        None => {
            // Stop with no prior history: record the snapshot with zero
            // duration and flag the inconsistency, non-fatally.
            tracing::warn!(
                event_id,
                "stop received without a statistics record or prior start"
            );
            Statistics {
                event_id,
                last_start_time: None,
                last_stop_time: Some(log_time),
                total_duration_seconds: Decimal::ZERO,
                event_status: EventStatus::Stopped,
            }
        }
    }
}

/// Non-negative elapsed seconds between two timestamps at millisecond
/// precision. Clock skew (stop earlier than start) clamps to zero.
fn elapsed_seconds(from: NaiveDateTime, to: NaiveDateTime) -> Decimal {
    let millis = (to - from).num_milliseconds().max(0);
    Decimal::new(millis, 3)
}
