use utoipa::OpenApi;

use super::api::error::ErrorResponse;
use super::api::passes::{DayResponse, PassesResponse, StationResponse};

#[derive(OpenApi)]
#[openapi(
    paths(super::api::passes::list_passes, super::api::passes::station),
    components(schemas(
        PassesResponse,
        DayResponse,
        StationResponse,
        ErrorResponse,
        crate::flyover::DayPlan,
        crate::predict::DayWindow,
        crate::predict::PassEvent,
        crate::predict::PassEventKind,
        crate::predict::VisiblePass,
        crate::predict::Location,
        crate::predict::LookAngles,
    )),
    info(
        title = "ISS Fly-over API",
        description = "Nightly visibility windows and sunlit passes for the configured observer",
        version = "0.1.0"
    ),
    tags(
        (name = "passes", description = "Pass prediction")
    )
)]
pub struct ApiDoc;
