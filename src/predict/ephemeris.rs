use chrono::{DateTime, Duration, Utc};

use crate::predict::catalog::{load_satellite, CatalogSource, Satellite};
use crate::predict::error::PredictError;
use crate::predict::location::Location;
use crate::predict::propagation::{position_teme, satellite_look_angles};
use crate::predict::search::scan;
use crate::predict::sun::{is_sunlit, sun_altitude_deg, SUN_HORIZON_DEG};
use crate::predict::types::{DiscreteEvent, PassEventKind, SunEvent};

const SUN_STEP: Duration = Duration::minutes(5);
const SATELLITE_STEP: Duration = Duration::seconds(10);

/// Source of solar and satellite geometry for one satellite.
pub trait Ephemeris {
    fn satellite_name(&self) -> &str;

    /// Sunrises and sunsets in `[start, end]`, chronological.
    fn sun_events(
        &self,
        location: &Location,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<SunEvent>, PredictError>;

    /// Rise/culminate/set events above `min_elevation_deg` in `[start, end]`,
    /// chronological.
    fn satellite_events(
        &self,
        location: &Location,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        min_elevation_deg: f64,
    ) -> Result<Vec<DiscreteEvent>, PredictError>;

    fn is_sunlit(&self, at: DateTime<Utc>) -> Result<bool, PredictError>;
}

/// SGP4 propagation plus the analytic sun model.
pub struct Sgp4Ephemeris {
    satellite: Satellite,
}

impl Sgp4Ephemeris {
    pub fn new(satellite: Satellite) -> Self {
        Self { satellite }
    }

    pub fn load(source: &CatalogSource, name: &str) -> Result<Self, PredictError> {
        Ok(Self::new(load_satellite(source, name)?))
    }

    pub fn satellite(&self) -> &Satellite {
        &self.satellite
    }
}

impl Ephemeris for Sgp4Ephemeris {
    fn satellite_name(&self) -> &str {
        &self.satellite.name
    }

    fn sun_events(
        &self,
        location: &Location,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<SunEvent>, PredictError> {
        let result = scan(start, end, SUN_STEP, SUN_HORIZON_DEG, false, |t| {
            Ok::<_, PredictError>(sun_altitude_deg(location, t))
        })?;

        Ok(result
            .crossings
            .into_iter()
            .map(|c| SunEvent {
                at: c.at,
                rising: c.rising,
            })
            .collect())
    }

    fn satellite_events(
        &self,
        location: &Location,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        min_elevation_deg: f64,
    ) -> Result<Vec<DiscreteEvent>, PredictError> {
        let result = scan(start, end, SATELLITE_STEP, min_elevation_deg, true, |t| {
            satellite_look_angles(location, &self.satellite, t).map(|a| a.elevation_deg)
        })?;

        let mut events: Vec<DiscreteEvent> = result
            .crossings
            .iter()
            .map(|c| DiscreteEvent {
                at: c.at,
                kind: if c.rising {
                    PassEventKind::Rise
                } else {
                    PassEventKind::Set
                },
            })
            .chain(
                result
                    .maxima
                    .iter()
                    .filter(|m| m.value >= min_elevation_deg)
                    .map(|m| DiscreteEvent {
                        at: m.at,
                        kind: PassEventKind::Culminate,
                    }),
            )
            .collect();

        events.sort_by_key(|e| e.at);
        Ok(events)
    }

    fn is_sunlit(&self, at: DateTime<Utc>) -> Result<bool, PredictError> {
        Ok(is_sunlit(position_teme(&self.satellite, at)?, at))
    }
}
