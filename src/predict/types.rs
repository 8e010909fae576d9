use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use serde::Serialize;
use strum_macros::Display;
use utoipa::ToSchema;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Display, ToSchema)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum PassEventKind {
    Rise,
    Culminate,
    Set,
}

/// Sunrise (`rising`) or sunset at an observer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SunEvent {
    pub at: DateTime<Utc>,
    pub rising: bool,
}

/// A satellite event as reported by the ephemeris, before the sunlit check.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DiscreteEvent {
    pub at: DateTime<Utc>,
    pub kind: PassEventKind,
}

/// Observation interval for one night, `start` is sunset and `end` bedtime.
/// Empty (`start == end`) when the sun sets after bedtime.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, ToSchema)]
pub struct DayWindow {
    #[schema(value_type = String, format = DateTime)]
    pub start: DateTime<Tz>,
    #[schema(value_type = String, format = DateTime)]
    pub end: DateTime<Tz>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, ToSchema)]
pub struct PassEvent {
    pub kind: PassEventKind,
    #[schema(value_type = String, format = DateTime)]
    pub at: DateTime<Tz>,
    pub sunlit: bool,
}

/// A sunlit flyover, minute resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
pub struct VisiblePass {
    #[schema(value_type = String, format = DateTime)]
    pub start: DateTime<Tz>,
    #[schema(value_type = String, format = DateTime)]
    pub end: DateTime<Tz>,
}
