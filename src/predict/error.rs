use thiserror::Error;

#[derive(Debug, Error)]
pub enum PredictError {
    #[error("catalog file read error: {0}")]
    FileRead(#[from] std::io::Error),
    #[error("catalog fetch error: {0}")]
    Fetch(#[from] reqwest::Error),
    #[error("invalid TLE in {source_name}: {message}")]
    InvalidTle {
        source_name: String,
        message: String,
    },
    #[error("no satellites in catalog {0}")]
    NoSatellites(String),
    #[error("satellite {0:?} not found in catalog")]
    SatelliteNotFound(String),
    #[error("propagation error: {0}")]
    Propagation(String),
    #[error("no sunset between {start} and {end}")]
    NoSunset { start: String, end: String },
    #[error("invalid day window: {0}")]
    InvalidWindow(String),
}

impl From<sgp4::Error> for PredictError {
    fn from(err: sgp4::Error) -> Self {
        PredictError::Propagation(err.to_string())
    }
}

impl PredictError {
    /// Whether the error comes from loading the catalog rather than from
    /// evaluating a single time range.
    pub fn is_provider_failure(&self) -> bool {
        matches!(
            self,
            PredictError::FileRead(_)
                | PredictError::Fetch(_)
                | PredictError::InvalidTle { .. }
                | PredictError::NoSatellites(_)
                | PredictError::SatelliteNotFound(_)
        )
    }
}
