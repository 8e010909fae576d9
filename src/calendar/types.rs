use chrono::{DateTime, FixedOffset};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

/// An event already on the calendar.
#[derive(Debug, Clone, PartialEq)]
pub struct ExistingEvent {
    pub id: String,
    pub title: String,
    pub start: DateTime<FixedOffset>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReminderMethod {
    Popup,
    Email,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Reminder {
    pub method: ReminderMethod,
    pub minutes: u32,
}

impl Reminder {
    pub fn new(method: ReminderMethod, minutes: u32) -> Self {
        Self { method, minutes }
    }

    pub fn popup(minutes: u32) -> Self {
        Self::new(ReminderMethod::Popup, minutes)
    }
}

/// Event to be created.
#[derive(Debug, Clone, PartialEq)]
pub struct NewEvent {
    pub title: String,
    pub start: DateTime<Tz>,
    pub end: DateTime<Tz>,
    pub reminders: Vec<Reminder>,
}

impl NewEvent {
    pub fn timezone(&self) -> &'static str {
        self.start.timezone().name()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct InsertedEvent {
    pub id: String,
    pub html_link: Option<String>,
}
