use crate::predict::ephemeris::Ephemeris;
use crate::predict::error::PredictError;
use crate::predict::location::Location;
use crate::predict::types::{DayWindow, PassEvent, PassEventKind};

/// Satellite events inside `window`, each tagged with whether the satellite
/// is in sunlight at that instant.
pub fn find_pass_events(
    ephemeris: &dyn Ephemeris,
    location: &Location,
    window: &DayWindow,
    min_elevation_deg: f64,
) -> Result<Vec<PassEvent>, PredictError> {
    let start = window.start.to_utc();
    let end = window.end.to_utc();

    let discrete = ephemeris.satellite_events(location, start, end, min_elevation_deg)?;

    let mut events = Vec::with_capacity(discrete.len());
    for event in discrete.into_iter().filter(|e| e.at >= start && e.at <= end) {
        let sunlit = ephemeris.is_sunlit(event.at)?;
        let at = event.at.with_timezone(&location.timezone);
        log::info!(
            "{}  {} is in {}",
            at,
            describe(event.kind, min_elevation_deg),
            if sunlit { "sunlight" } else { "shadow" }
        );
        events.push(PassEvent {
            kind: event.kind,
            at,
            sunlit,
        });
    }

    Ok(events)
}

fn describe(kind: PassEventKind, min_elevation_deg: f64) -> String {
    match kind {
        PassEventKind::Rise => format!("rise above {}°", min_elevation_deg),
        PassEventKind::Culminate => "culminate".to_string(),
        PassEventKind::Set => format!("set below {}°", min_elevation_deg),
    }
}
