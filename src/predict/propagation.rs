use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;

use crate::predict::catalog::Satellite;
use crate::predict::error::PredictError;
use crate::predict::location::Location;

/// Topocentric direction of a target as seen from a [`Location`].
#[derive(Debug, Clone, Copy, Serialize, ToSchema)]
pub struct LookAngles {
    pub azimuth_deg: f64,
    pub elevation_deg: f64,
    pub range_km: f64,
}

/// Satellite position in the TEME frame, km.
pub fn position_teme(satellite: &Satellite, at: DateTime<Utc>) -> Result<[f64; 3], PredictError> {
    let minutes = satellite
        .elements
        .datetime_to_minutes_since_epoch(&at.naive_utc())
        .map_err(|e| PredictError::Propagation(e.to_string()))?;

    let prediction = satellite.constants.propagate(minutes)?;
    Ok(prediction.position)
}

/// Greenwich sidereal angle in radians.
pub fn sidereal_angle(at: DateTime<Utc>) -> f64 {
    sgp4::iau_epoch_to_sidereal_time(sgp4::julian_years_since_j2000(&at.naive_utc()))
}

pub fn satellite_look_angles(
    location: &Location,
    satellite: &Satellite,
    at: DateTime<Utc>,
) -> Result<LookAngles, PredictError> {
    let teme = position_teme(satellite, at)?;
    Ok(inertial_look_angles(location, teme, at))
}

/// Look angles toward a target given in an Earth-centred inertial frame
/// (TEME or equator of date).
pub fn inertial_look_angles(location: &Location, target: [f64; 3], at: DateTime<Utc>) -> LookAngles {
    let target_ecef = teme_to_ecef_position(target, sidereal_angle(at));
    let station = location.position_ecef_km();
    let dr = [
        target_ecef[0] - station[0],
        target_ecef[1] - station[1],
        target_ecef[2] - station[2],
    ];
    let range_km = norm(dr);

    let (east, north, up) = ecef_to_enu(dr, location.lat_rad(), location.lon_rad());
    let azimuth_deg = east.atan2(north).to_degrees().rem_euclid(360.0);
    let elevation_deg = if range_km > 0.0 {
        (up / range_km).asin().to_degrees()
    } else {
        0.0
    };

    LookAngles {
        azimuth_deg,
        elevation_deg,
        range_km,
    }
}

pub fn teme_to_ecef_position(pos_teme: [f64; 3], gmst: f64) -> [f64; 3] {
    let cos_gmst = gmst.cos();
    let sin_gmst = gmst.sin();
    [
        pos_teme[0] * cos_gmst + pos_teme[1] * sin_gmst,
        -pos_teme[0] * sin_gmst + pos_teme[1] * cos_gmst,
        pos_teme[2],
    ]
}

pub fn ecef_to_enu(dr: [f64; 3], lat_rad: f64, lon_rad: f64) -> (f64, f64, f64) {
    let sin_lat = lat_rad.sin();
    let cos_lat = lat_rad.cos();
    let sin_lon = lon_rad.sin();
    let cos_lon = lon_rad.cos();

    let east = -sin_lon * dr[0] + cos_lon * dr[1];
    let north = -sin_lat * cos_lon * dr[0] - sin_lat * sin_lon * dr[1] + cos_lat * dr[2];
    let up = cos_lat * cos_lon * dr[0] + cos_lat * sin_lon * dr[1] + sin_lat * dr[2];
    (east, north, up)
}

pub(crate) fn norm(v: [f64; 3]) -> f64 {
    (v[0] * v[0] + v[1] * v[1] + v[2] * v[2]).sqrt()
}

pub(crate) fn dot(a: [f64; 3], b: [f64; 3]) -> f64 {
    a[0] * b[0] + a[1] * b[1] + a[2] * b[2]
}
