use chrono_tz::Tz;
use serde::Serialize;
use utoipa::ToSchema;

/// WGS-84 equatorial radius.
pub const EARTH_RADIUS_KM: f64 = 6378.137;
const EARTH_E2: f64 = 0.00669437999014;

/// Observer position on the ground together with the timezone used for all
/// local clock arithmetic.
#[derive(Debug, Clone, Copy, Serialize, ToSchema)]
pub struct Location {
    pub latitude_deg: f64,
    pub longitude_deg: f64,
    pub elevation_m: f64,
    #[schema(value_type = String)]
    #[serde(serialize_with = "serialize_tz")]
    pub timezone: Tz,
}

impl Location {
    pub fn new(latitude_deg: f64, longitude_deg: f64, elevation_m: f64, timezone: Tz) -> Self {
        Self {
            latitude_deg,
            longitude_deg,
            elevation_m,
            timezone,
        }
    }

    /// Parse `"lat, lon"` in signed decimal degrees.
    pub fn from_coordinates(coordinates: &str, elevation_m: f64, timezone: Tz) -> Option<Self> {
        let parts: Vec<_> = coordinates.split(',').map(|s| s.trim()).collect();
        if parts.len() != 2 {
            return None;
        }
        let lat: f64 = parts[0].parse().ok()?;
        let lon: f64 = parts[1].parse().ok()?;
        if !(-90.0..=90.0).contains(&lat) || !(-180.0..=180.0).contains(&lon) {
            return None;
        }
        Some(Self::new(lat, lon, elevation_m, timezone))
    }

    pub fn lat_rad(&self) -> f64 {
        self.latitude_deg.to_radians()
    }

    pub fn lon_rad(&self) -> f64 {
        self.longitude_deg.to_radians()
    }

    pub fn position_ecef_km(&self) -> [f64; 3] {
        let lat = self.lat_rad();
        let lon = self.lon_rad();
        let sin_lat = lat.sin();
        let cos_lat = lat.cos();
        let n = EARTH_RADIUS_KM / (1.0 - EARTH_E2 * sin_lat * sin_lat).sqrt();
        let alt_km = self.elevation_m / 1000.0;
        [
            (n + alt_km) * cos_lat * lon.cos(),
            (n + alt_km) * cos_lat * lon.sin(),
            (n * (1.0 - EARTH_E2) + alt_km) * sin_lat,
        ]
    }
}

fn serialize_tz<S: serde::Serializer>(tz: &Tz, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(tz.name())
}
