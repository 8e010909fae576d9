use thiserror::Error;

use crate::calendar::CalendarError;
use crate::predict::PredictError;

#[derive(Debug, Error)]
pub enum FlyoverError {
    /// Nothing can be computed for one day; the run goes on.
    #[error("data unavailable: {0}")]
    DataUnavailable(#[source] PredictError),
    /// The satellite could not be loaded; nothing can be computed at all.
    #[error("ephemeris provider failure: {0}")]
    ProviderFailure(#[source] PredictError),
    #[error("calendar failure: {0}")]
    SinkFailure(#[from] CalendarError),
}

impl From<PredictError> for FlyoverError {
    fn from(err: PredictError) -> Self {
        if err.is_provider_failure() {
            FlyoverError::ProviderFailure(err)
        } else {
            FlyoverError::DataUnavailable(err)
        }
    }
}
