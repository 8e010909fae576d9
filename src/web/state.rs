use std::sync::Arc;

use crate::config::Config;
use crate::flyover::PlanSettings;
use crate::predict::{Location, Sgp4Ephemeris};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub location: Location,
    pub settings: Arc<PlanSettings>,
    pub ephemeris: Arc<Sgp4Ephemeris>,
}
