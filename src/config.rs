use chrono::NaiveTime;
use chrono_tz::Tz;
use serde::Deserialize;
use thiserror::Error;

use crate::calendar::{GoogleCalendar, Reminder, ReminderMethod};
use crate::flyover::PlanSettings;
use crate::predict::{CatalogSource, Location};

const DEFAULT_CATALOG: &str =
    "https://celestrak.org/NORAD/elements/gp.php?GROUP=stations&FORMAT=tle";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("invalid {field}: {message}")]
    Invalid {
        field: &'static str,
        message: String,
    },
}

fn invalid(field: &'static str, message: impl Into<String>) -> ConfigError {
    ConfigError::Invalid {
        field,
        message: message.into(),
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub station: StationConfig,
    #[serde(default)]
    pub predict: PredictConfig,
    #[serde(default)]
    pub calendar: CalendarConfig,
    #[serde(default)]
    pub web: WebConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StationConfig {
    pub name: Option<String>,
    pub coordinates: String,
    #[serde(default)]
    pub altitude_m: f64,
    #[serde(default = "default_timezone")]
    pub timezone: String,
}

fn default_timezone() -> String {
    "UTC".to_string()
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PredictConfig {
    pub catalog: CatalogSource,
    pub satellite: String,
    pub horizon_days: u32,
    pub min_elevation_deg: f64,
    pub bed_time: String,
    pub event_title: String,
}

impl Default for PredictConfig {
    fn default() -> Self {
        Self {
            catalog: CatalogSource::parse(DEFAULT_CATALOG),
            satellite: "ISS (ZARYA)".to_string(),
            horizon_days: 10,
            min_elevation_deg: 30.0,
            bed_time: "23:30".to_string(),
            event_title: "ISS Fly-over".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CalendarConfig {
    pub calendar_id: String,
    pub max_results: u32,
    pub reminder_minutes: Vec<u32>,
    pub reminder_method: ReminderMethod,
    pub token_env: String,
    pub api_base: String,
}

impl Default for CalendarConfig {
    fn default() -> Self {
        Self {
            calendar_id: "primary".to_string(),
            max_results: 20,
            reminder_minutes: vec![30, 10],
            reminder_method: ReminderMethod::Popup,
            token_env: "GOOGLE_CALENDAR_TOKEN".to_string(),
            api_base: crate::calendar::DEFAULT_API_BASE.to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct WebConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
        }
    }
}

fn default_bind() -> String {
    "0.0.0.0:8080".to_string()
}

impl Config {
    pub fn from_file(path: &str) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    pub fn from_yaml(content: &str) -> Result<Self, ConfigError> {
        let config: Config = serde_yaml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.location()?;
        self.plan_settings()?;
        if self.predict.satellite.trim().is_empty() {
            return Err(invalid("predict.satellite", "must not be empty"));
        }
        Ok(())
    }

    pub fn timezone(&self) -> Result<Tz, ConfigError> {
        self.station.timezone.parse().map_err(|_| {
            invalid(
                "station.timezone",
                format!("unknown zone {:?}", self.station.timezone),
            )
        })
    }

    pub fn location(&self) -> Result<Location, ConfigError> {
        let timezone = self.timezone()?;
        Location::from_coordinates(&self.station.coordinates, self.station.altitude_m, timezone)
            .ok_or_else(|| {
                invalid(
                    "station.coordinates",
                    format!(
                        "expected \"lat, lon\" in degrees, got {:?}",
                        self.station.coordinates
                    ),
                )
            })
    }

    pub fn bed_time(&self) -> Result<NaiveTime, ConfigError> {
        NaiveTime::parse_from_str(self.predict.bed_time.trim(), "%H:%M")
            .map_err(|e| invalid("predict.bed_time", format!("{} (expected HH:MM)", e)))
    }

    pub fn plan_settings(&self) -> Result<PlanSettings, ConfigError> {
        if self.predict.horizon_days == 0 {
            return Err(invalid("predict.horizon_days", "must be at least 1"));
        }
        if !(0.0..90.0).contains(&self.predict.min_elevation_deg) {
            return Err(invalid("predict.min_elevation_deg", "must be in [0, 90)"));
        }
        if self.calendar.max_results == 0 {
            return Err(invalid("calendar.max_results", "must be at least 1"));
        }

        Ok(PlanSettings {
            horizon_days: self.predict.horizon_days,
            min_elevation_deg: self.predict.min_elevation_deg,
            bed_time: self.bed_time()?,
            event_title: self.predict.event_title.clone(),
            calendar_id: self.calendar.calendar_id.clone(),
            max_results: self.calendar.max_results,
            reminders: self
                .calendar
                .reminder_minutes
                .iter()
                .map(|m| Reminder::new(self.calendar.reminder_method, *m))
                .collect(),
        })
    }

    pub fn google_calendar(&self) -> Result<GoogleCalendar, crate::calendar::CalendarError> {
        let timezone = self.timezone().unwrap_or(Tz::UTC);
        GoogleCalendar::from_env(&self.calendar.api_base, &self.calendar.token_env, timezone)
    }
}
