use crate::calendar::types::ExistingEvent;
use crate::predict::{truncate_to_minute, VisiblePass};

/// Matches computed passes against events recorded by earlier runs.
///
/// The baseline is fetched once per run and never refreshed, so two passes
/// of the same run are not checked against each other.
pub struct Deduplicator<'a> {
    title: &'a str,
    existing: &'a [ExistingEvent],
}

impl<'a> Deduplicator<'a> {
    pub fn new(title: &'a str, existing: &'a [ExistingEvent]) -> Self {
        Self { title, existing }
    }

    /// The recorded event for `pass`, if any.
    pub fn find(&self, pass: &VisiblePass) -> Option<&'a ExistingEvent> {
        let tz = pass.start.timezone();
        let start = truncate_to_minute(pass.start);
        self.existing.iter().find(|event| {
            event.title == self.title
                && truncate_to_minute(event.start.with_timezone(&tz)) == start
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, TimeZone};

    const TITLE: &str = "ISS Fly-over";

    fn existing(title: &str, start: &str) -> ExistingEvent {
        ExistingEvent {
            id: "evt".to_string(),
            title: title.to_string(),
            start: DateTime::parse_from_rfc3339(start).unwrap(),
        }
    }

    fn pass_at(rfc3339: &str) -> VisiblePass {
        let tz = chrono_tz::America::New_York;
        let at = DateTime::parse_from_rfc3339(rfc3339)
            .unwrap()
            .with_timezone(&tz);
        let start = truncate_to_minute(at);
        VisiblePass {
            start,
            end: start + chrono::Duration::minutes(6),
        }
    }

    #[test]
    fn same_minute_in_another_offset_is_a_duplicate() {
        let pass = pass_at("2024-06-01T21:47:12-04:00");
        let events = vec![existing(TITLE, "2024-06-02T01:47:00+00:00")];
        assert!(Deduplicator::new(TITLE, &events).find(&pass).is_some());
    }

    #[test]
    fn next_minute_is_not_a_duplicate() {
        let pass = pass_at("2024-06-01T21:47:12-04:00");
        let events = vec![existing(TITLE, "2024-06-01T21:48:00-04:00")];
        assert!(Deduplicator::new(TITLE, &events).find(&pass).is_none());
    }

    #[test]
    fn title_must_match() {
        let pass = pass_at("2024-06-01T21:47:12-04:00");
        let events = vec![existing("Dentist", "2024-06-01T21:47:00-04:00")];
        assert!(Deduplicator::new(TITLE, &events).find(&pass).is_none());
    }

    #[test]
    fn finds_the_matching_event_among_many() {
        let pass = pass_at("2024-06-03T20:10:40-04:00");
        let events = vec![
            existing(TITLE, "2024-06-01T21:47:00-04:00"),
            existing("Dinner", "2024-06-03T20:10:00-04:00"),
            ExistingEvent {
                id: "hit".into(),
                ..existing(TITLE, "2024-06-04T00:10:00Z")
            },
        ];
        let found = Deduplicator::new(TITLE, &events).find(&pass).unwrap();
        assert_eq!(found.id, "hit");
    }

    #[test]
    fn seconds_on_the_recorded_event_are_ignored() {
        let pass = pass_at("2024-06-01T21:47:12-04:00");
        let tz = chrono_tz::America::New_York;
        let recorded = tz.with_ymd_and_hms(2024, 6, 1, 21, 47, 30).unwrap().fixed_offset();
        let events = vec![ExistingEvent {
            id: "evt".into(),
            title: TITLE.into(),
            start: recorded,
        }];
        assert!(Deduplicator::new(TITLE, &events).find(&pass).is_some());
    }
}
