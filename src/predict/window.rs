use chrono::{DateTime, Duration, LocalResult, NaiveTime, TimeZone, Timelike, Utc};
use chrono_tz::Tz;

use crate::predict::ephemeris::Ephemeris;
use crate::predict::error::PredictError;
use crate::predict::location::Location;
use crate::predict::types::DayWindow;

/// Builds one sunset-to-bedtime window per day, anchored on the first
/// sunset after `now`.
#[derive(Debug, Clone, Copy)]
pub struct DayWindowBuilder {
    base_sunset: DateTime<Tz>,
    bed_time: NaiveTime,
    timezone: Tz,
}

impl DayWindowBuilder {
    /// Probe `[now, now + 1 day]` for a sunset.
    pub fn new(
        ephemeris: &dyn Ephemeris,
        location: &Location,
        now: DateTime<Utc>,
        bed_time: NaiveTime,
    ) -> Result<Self, PredictError> {
        let probe_end = now + Duration::days(1);
        let events = ephemeris.sun_events(location, now, probe_end)?;
        for event in &events {
            log::debug!(
                "{} {}",
                event.at.with_timezone(&location.timezone),
                if event.rising { "Rise" } else { "Set" }
            );
        }

        let sunset = events
            .iter()
            .find(|e| !e.rising)
            .ok_or_else(|| PredictError::NoSunset {
                start: now.to_rfc3339(),
                end: probe_end.to_rfc3339(),
            })?;

        let base_sunset = sunset.at.with_timezone(&location.timezone);
        log::info!("Sunset time: {}", base_sunset);

        Ok(Self {
            base_sunset,
            bed_time,
            timezone: location.timezone,
        })
    }

    /// Window for day `day` (0-based). A bedtime before noon belongs to the
    /// small hours after the sunset. An evening bedtime that has already
    /// passed at sunset gives an empty window.
    pub fn window(&self, day: u32) -> Result<DayWindow, PredictError> {
        let start = self.base_sunset + Duration::days(i64::from(day));
        let mut date = start.date_naive();

        if self.bed_time.hour() < 12 {
            date = date.succ_opt().ok_or_else(|| {
                PredictError::InvalidWindow(format!("no calendar day after {}", date))
            })?;
        }

        let end = self.local(date.and_time(self.bed_time))?;
        if end <= start {
            log::info!("Sunset {} is after bedtime, nothing to observe", start);
            return Ok(DayWindow { start, end: start });
        }

        Ok(DayWindow { start, end })
    }

    fn local(&self, naive: chrono::NaiveDateTime) -> Result<DateTime<Tz>, PredictError> {
        match self.timezone.from_local_datetime(&naive) {
            LocalResult::Single(dt) => Ok(dt),
            LocalResult::Ambiguous(earliest, _) => Ok(earliest),
            LocalResult::None => Err(PredictError::InvalidWindow(format!(
                "bedtime {} does not exist in {}",
                naive,
                self.timezone.name()
            ))),
        }
    }
}
