use chrono::{DateTime, Duration, TimeZone};

use crate::predict::types::{PassEvent, PassEventKind, VisiblePass};

const FULL_PASS: [PassEventKind; 3] = [
    PassEventKind::Rise,
    PassEventKind::Culminate,
    PassEventKind::Set,
];

/// A day's events describe a visible flyover when they form exactly one
/// rise/culminate/set triple with at least one point in sunlight.
pub fn visible_pass(events: &[PassEvent]) -> Option<VisiblePass> {
    if events.len() != FULL_PASS.len() {
        return None;
    }
    if events.iter().map(|e| e.kind).ne(FULL_PASS) {
        return None;
    }
    if !events.iter().any(|e| e.sunlit) {
        return None;
    }

    Some(VisiblePass {
        start: truncate_to_minute(events[0].at),
        end: truncate_to_minute(events[2].at),
    })
}

/// Drop seconds and sub-seconds, keeping the timezone.
pub fn truncate_to_minute<Tz: TimeZone>(at: DateTime<Tz>) -> DateTime<Tz> {
    let seconds = at.timestamp().rem_euclid(60);
    let nanos = i64::from(at.timestamp_subsec_nanos());
    at - Duration::seconds(seconds) - Duration::nanoseconds(nanos)
}
