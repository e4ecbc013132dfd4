use axum::{extract::State, Json};
use serde::Serialize;
use utoipa::ToSchema;

use crate::alerts::{AlertSettings, MinElevation, WarningLead};
use crate::config::Permission;
use crate::web::api::error::{ApiError, ApiResult, ErrorResponse};
use crate::web::auth::{require_permission, AppState, AuthenticatedUser};

#[derive(Debug, Serialize, ToSchema)]
pub struct SettingsResponse {
    pub settings: AlertSettings,
    /// Accepted `min_elevation` values
    pub elevation_options: Vec<u32>,
    /// Accepted `pre_pass_warning_minutes` values
    pub warning_options: Vec<u32>,
}

impl From<AlertSettings> for SettingsResponse {
    fn from(settings: AlertSettings) -> Self {
        SettingsResponse {
            settings,
            elevation_options: MinElevation::ALL.iter().map(|e| u32::from(*e)).collect(),
            warning_options: WarningLead::ALL.iter().map(|w| w.minutes()).collect(),
        }
    }
}

#[utoipa::path(
    get,
    path = "/api/settings",
    responses(
        (status = 200, description = "Current alert settings", body = SettingsResponse),
        (status = 503, description = "Settings not loaded", body = ErrorResponse)
    ),
    tag = "settings"
)]
pub async fn get_settings(State(state): State<AppState>) -> ApiResult<Json<SettingsResponse>> {
    let settings = state
        .settings
        .snapshot()
        .ok_or(ApiError::Unavailable("settings_not_loaded"))?;
    Ok(Json(SettingsResponse::from(*settings)))
}

#[utoipa::path(
    put,
    path = "/api/settings",
    request_body = AlertSettings,
    security(
        ("api_key" = [])
    ),
    responses(
        (status = 200, description = "Settings replaced", body = SettingsResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Insufficient permissions"),
        (status = 422, description = "Unsupported option value")
    ),
    tag = "settings"
)]
pub async fn put_settings(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Json(settings): Json<AlertSettings>,
) -> ApiResult<Json<SettingsResponse>> {
    require_permission(&user, Permission::ChangeSettings)?;

    log::info!("Settings changed by {}", user.name);
    let settings = state.settings.replace(settings)?;
    Ok(Json(SettingsResponse::from(*settings)))
}
