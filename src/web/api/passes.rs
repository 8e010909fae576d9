use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::flyover::{DayPlan, Planner};
use crate::predict::{satellite_look_angles, Location, LookAngles};
use crate::web::api::error::{ApiError, ApiResult, ErrorResponse};
use crate::web::state::AppState;

const MAX_DAYS: u32 = 30;

#[derive(Debug, Deserialize, IntoParams)]
pub struct PassesQuery {
    /// Number of nights to compute, defaults to the configured horizon
    pub days: Option<u32>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct DayResponse {
    pub day: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub plan: Option<DayPlan>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PassesResponse {
    pub satellite: String,
    pub location: Location,
    pub min_elevation_deg: f64,
    pub days: Vec<DayResponse>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct StationResponse {
    pub name: Option<String>,
    pub location: Location,
    pub satellite: String,
    pub norad_id: u64,
    pub element_epoch: String,
    /// Where the satellite is right now
    pub look_angles: Option<LookAngles>,
}

#[utoipa::path(
    get,
    path = "/api/passes",
    tag = "passes",
    params(PassesQuery),
    responses(
        (status = 200, description = "Nightly windows and visible passes", body = PassesResponse),
        (status = 400, description = "Invalid parameters", body = ErrorResponse),
        (status = 500, description = "Prediction task failed", body = ErrorResponse)
    )
)]
pub async fn list_passes(
    State(state): State<AppState>,
    Query(query): Query<PassesQuery>,
) -> ApiResult<impl IntoResponse> {
    let days = query.days.unwrap_or(state.settings.horizon_days);
    if days == 0 || days > MAX_DAYS {
        return Err(ApiError::Validation(format!(
            "days must be between 1 and {}",
            MAX_DAYS
        )));
    }

    let worker = state.clone();
    let plans = tokio::task::spawn_blocking(move || {
        let planner = Planner::new(worker.ephemeris.as_ref(), worker.location, &worker.settings);
        planner.plan(Utc::now(), days)
    })
    .await?;

    let days = (0u32..)
        .zip(plans)
        .map(|(day, plan)| match plan {
            Ok(plan) => DayResponse {
                day,
                plan: Some(plan),
                error: None,
            },
            Err(e) => DayResponse {
                day,
                plan: None,
                error: Some(e.to_string()),
            },
        })
        .collect();

    Ok((
        StatusCode::OK,
        Json(PassesResponse {
            satellite: state.ephemeris.satellite().name.clone(),
            location: state.location,
            min_elevation_deg: state.settings.min_elevation_deg,
            days,
        }),
    ))
}

#[utoipa::path(
    get,
    path = "/api/station",
    tag = "passes",
    responses(
        (status = 200, description = "Observer and tracked satellite", body = StationResponse)
    )
)]
pub async fn station(State(state): State<AppState>) -> ApiResult<impl IntoResponse> {
    let satellite = state.ephemeris.satellite();
    let look_angles = match satellite_look_angles(&state.location, satellite, Utc::now()) {
        Ok(angles) => Some(angles),
        Err(e) => {
            log::warn!("Failed to propagate {}: {}", satellite.name, e);
            None
        }
    };

    Ok((
        StatusCode::OK,
        Json(StationResponse {
            name: state.config.station.name.clone(),
            location: state.location,
            satellite: satellite.name.clone(),
            norad_id: satellite.norad_id,
            element_epoch: satellite.elements.datetime.to_string(),
            look_angles,
        }),
    ))
}
