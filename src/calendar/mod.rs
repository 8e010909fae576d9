mod dedup;
mod error;
mod google;
mod types;

pub use dedup::Deduplicator;
pub use error::CalendarError;
pub use google::{GoogleCalendar, DEFAULT_API_BASE};
pub use types::{ExistingEvent, InsertedEvent, NewEvent, Reminder, ReminderMethod};

use chrono::{DateTime, Utc};

/// The calendar the planner reads from and writes to.
pub trait CalendarSink {
    fn list_upcoming_events(
        &self,
        calendar_id: &str,
        not_before: DateTime<Utc>,
        max_results: u32,
    ) -> Result<Vec<ExistingEvent>, CalendarError>;

    fn insert_event(
        &self,
        calendar_id: &str,
        event: &NewEvent,
    ) -> Result<InsertedEvent, CalendarError>;
}
