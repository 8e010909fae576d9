//! Low-precision solar ephemeris.
//!
//! Mean-longitude / mean-anomaly series from the Astronomical Almanac,
//! good to about 0.01° between 1950 and 2050. That is far below the
//! one-second search tolerance used for sunset and shadow crossings.

use chrono::{DateTime, Utc};

use crate::predict::location::{Location, EARTH_RADIUS_KM};
use crate::predict::propagation::{dot, inertial_look_angles};

const AU_KM: f64 = 149_597_870.7;
const J2000_JD: f64 = 2_451_545.0;
const UNIX_EPOCH_JD: f64 = 2_440_587.5;

/// Sun's apparent radius plus standard refraction.
pub const SUN_HORIZON_DEG: f64 = -50.0 / 60.0;

pub fn julian_date(at: DateTime<Utc>) -> f64 {
    let seconds = at.timestamp() as f64 + f64::from(at.timestamp_subsec_nanos()) * 1e-9;
    UNIX_EPOCH_JD + seconds / 86_400.0
}

/// Geocentric sun position in km, mean equator and equinox of date.
pub fn sun_position_km(at: DateTime<Utc>) -> [f64; 3] {
    let n = julian_date(at) - J2000_JD;
    let mean_longitude = (280.460 + 0.985_647_4 * n).rem_euclid(360.0);
    let g = (357.528 + 0.985_600_3 * n).rem_euclid(360.0).to_radians();

    let lambda = (mean_longitude + 1.915 * g.sin() + 0.020 * (2.0 * g).sin()).to_radians();
    let epsilon = (23.439 - 0.000_000_4 * n).to_radians();
    let r = (1.000_14 - 0.016_71 * g.cos() - 0.000_14 * (2.0 * g).cos()) * AU_KM;

    [
        r * lambda.cos(),
        r * epsilon.cos() * lambda.sin(),
        r * epsilon.sin() * lambda.sin(),
    ]
}

pub fn sun_altitude_deg(location: &Location, at: DateTime<Utc>) -> f64 {
    inertial_look_angles(location, sun_position_km(at), at).elevation_deg
}

/// True unless the Earth blocks the line from `position` toward the sun.
pub fn is_sunlit(position: [f64; 3], at: DateTime<Utc>) -> bool {
    let sun = sun_position_km(at);
    let to_sun = [sun[0] - position[0], sun[1] - position[1], sun[2] - position[2]];
    let len_sq = dot(to_sun, to_sun);
    if len_sq == 0.0 {
        return true;
    }

    // Closest approach of the segment to Earth's centre.
    let t = (-dot(position, to_sun) / len_sq).clamp(0.0, 1.0);
    let closest = [
        position[0] + t * to_sun[0],
        position[1] + t * to_sun[1],
        position[2] + t * to_sun[2],
    ];
    dot(closest, closest) > EARTH_RADIUS_KM * EARTH_RADIUS_KM
}
