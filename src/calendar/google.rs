use std::time::Duration;

use chrono::{DateTime, FixedOffset, LocalResult, NaiveDate, SecondsFormat, TimeZone, Utc};
use chrono_tz::Tz;
use reqwest::blocking::{Client, Response};
use reqwest::Url;
use serde::{Deserialize, Serialize};

use crate::calendar::error::CalendarError;
use crate::calendar::types::{ExistingEvent, InsertedEvent, NewEvent, Reminder};
use crate::calendar::CalendarSink;

pub const DEFAULT_API_BASE: &str = "https://www.googleapis.com/calendar/v3";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Google Calendar v3 over plain REST. Token acquisition happens elsewhere;
/// this client only attaches the bearer token it is given.
pub struct GoogleCalendar {
    client: Client,
    api_base: String,
    access_token: String,
    /// Zone used for all-day events, which carry no offset.
    timezone: Tz,
}

impl GoogleCalendar {
    pub fn new(api_base: &str, access_token: String, timezone: Tz) -> Result<Self, CalendarError> {
        let client = Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self {
            client,
            api_base: api_base.trim_end_matches('/').to_string(),
            access_token,
            timezone,
        })
    }

    /// Read the token from the environment variable `token_env`.
    pub fn from_env(api_base: &str, token_env: &str, timezone: Tz) -> Result<Self, CalendarError> {
        let token = std::env::var(token_env)
            .map_err(|_| CalendarError::MissingToken(token_env.to_string()))?;
        Self::new(api_base, token, timezone)
    }

    fn events_url(&self, calendar_id: &str) -> Result<Url, CalendarError> {
        let mut url =
            Url::parse(&self.api_base).map_err(|e| CalendarError::InvalidUrl(e.to_string()))?;
        url.path_segments_mut()
            .map_err(|_| CalendarError::InvalidUrl(self.api_base.clone()))?
            .extend(["calendars", calendar_id, "events"]);
        Ok(url)
    }

    fn check(response: Response) -> Result<Response, CalendarError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().unwrap_or_default();
        Err(CalendarError::Api {
            status: status.as_u16(),
            body,
        })
    }
}

impl CalendarSink for GoogleCalendar {
    fn list_upcoming_events(
        &self,
        calendar_id: &str,
        not_before: DateTime<Utc>,
        max_results: u32,
    ) -> Result<Vec<ExistingEvent>, CalendarError> {
        log::info!("Getting the upcoming {} events from the calendar", max_results);

        let url = self.events_url(calendar_id)?;
        let response = self
            .client
            .get(url)
            .bearer_auth(&self.access_token)
            .query(&[
                (
                    "timeMin",
                    not_before.to_rfc3339_opts(SecondsFormat::Secs, true),
                ),
                ("maxResults", max_results.to_string()),
                ("singleEvents", "true".to_string()),
                ("orderBy", "startTime".to_string()),
            ])
            .send()?;

        let list: EventList = Self::check(response)?.json()?;
        list.items
            .into_iter()
            .map(|item| item.into_existing(self.timezone))
            .collect()
    }

    fn insert_event(
        &self,
        calendar_id: &str,
        event: &NewEvent,
    ) -> Result<InsertedEvent, CalendarError> {
        let body = EventBody::from(event);
        let url = self.events_url(calendar_id)?;
        let response = self
            .client
            .post(url)
            .bearer_auth(&self.access_token)
            .json(&body)
            .send()?;

        let created: CreatedEvent = Self::check(response)?.json()?;
        log::info!(
            "Event created: {}",
            created.html_link.as_deref().unwrap_or(&created.id)
        );
        Ok(InsertedEvent {
            id: created.id,
            html_link: created.html_link,
        })
    }
}

#[derive(Debug, Deserialize)]
struct EventList {
    #[serde(default)]
    items: Vec<EventItem>,
}

#[derive(Debug, Deserialize)]
struct EventItem {
    id: String,
    #[serde(default)]
    summary: String,
    start: EventStart,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct EventStart {
    date_time: Option<String>,
    date: Option<String>,
}

impl EventItem {
    fn into_existing(self, timezone: Tz) -> Result<ExistingEvent, CalendarError> {
        let malformed = |message: String| CalendarError::MalformedEvent {
            id: self.id.clone(),
            message,
        };

        let start = match (&self.start.date_time, &self.start.date) {
            (Some(dt), _) => {
                DateTime::parse_from_rfc3339(dt).map_err(|e| malformed(e.to_string()))?
            }
            (None, Some(date)) => all_day_start(date, timezone).map_err(malformed)?,
            (None, None) => return Err(malformed("event has no start".to_string())),
        };

        Ok(ExistingEvent {
            id: self.id,
            title: self.summary,
            start,
        })
    }
}

/// All-day events start at local midnight.
fn all_day_start(date: &str, timezone: Tz) -> Result<DateTime<FixedOffset>, String> {
    let date = NaiveDate::parse_from_str(date, "%Y-%m-%d").map_err(|e| e.to_string())?;
    let midnight = date.and_hms_opt(0, 0, 0).ok_or("invalid midnight")?;
    match timezone.from_local_datetime(&midnight) {
        LocalResult::Single(dt) | LocalResult::Ambiguous(dt, _) => Ok(dt.fixed_offset()),
        LocalResult::None => Err(format!("{} has no local midnight", date)),
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct EventBody {
    summary: String,
    start: EventTime,
    end: EventTime,
    reminders: Reminders,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct EventTime {
    date_time: String,
    time_zone: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Reminders {
    use_default: bool,
    overrides: Vec<Reminder>,
}

impl From<&NewEvent> for EventBody {
    fn from(event: &NewEvent) -> Self {
        let time = |at: &DateTime<Tz>| EventTime {
            date_time: at.to_rfc3339_opts(SecondsFormat::Secs, false),
            time_zone: event.timezone().to_string(),
        };
        EventBody {
            summary: event.title.clone(),
            start: time(&event.start),
            end: time(&event.end),
            reminders: Reminders {
                use_default: false,
                overrides: event.reminders.clone(),
            },
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreatedEvent {
    id: String,
    html_link: Option<String>,
}
