use axum::{extract::State, Json};
use serde::Serialize;
use utoipa::ToSchema;

use crate::alerts::{AlertEvent, SatellitePass};
use crate::config::Permission;
use crate::tone::ToneKind;
use crate::web::api::error::{ApiResult, ErrorResponse};
use crate::web::auth::{require_permission, AppState, AuthenticatedUser};

#[derive(Debug, Serialize, ToSchema)]
pub struct TestToneResponse {
    pub tone: ToneKind,
    /// False when alerts are disabled or no audio backend is configured
    pub played: bool,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct LedgerResetResponse {
    /// Number of fired-alert entries forgotten
    pub cleared: usize,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PassesResponse {
    pub passes: Vec<SatellitePass>,
    pub ledger_entries: usize,
}

#[utoipa::path(
    post,
    path = "/api/alerts/test/warning",
    security(
        ("api_key" = [])
    ),
    responses(
        (status = 200, description = "Warning tone requested", body = TestToneResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Insufficient permissions")
    ),
    tag = "alerts"
)]
pub async fn test_warning(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> ApiResult<Json<TestToneResponse>> {
    play_test_tone(&state, &user, ToneKind::Warning)
}

#[utoipa::path(
    post,
    path = "/api/alerts/test/urgent",
    security(
        ("api_key" = [])
    ),
    responses(
        (status = 200, description = "Urgent tone requested", body = TestToneResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Insufficient permissions")
    ),
    tag = "alerts"
)]
pub async fn test_urgent(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> ApiResult<Json<TestToneResponse>> {
    play_test_tone(&state, &user, ToneKind::Urgent)
}

fn play_test_tone(
    state: &AppState,
    user: &AuthenticatedUser,
    tone: ToneKind,
) -> ApiResult<Json<TestToneResponse>> {
    require_permission(user, Permission::TestAlerts)?;
    let played = state.monitor.lock().unwrap().play_test_tone(tone);
    Ok(Json(TestToneResponse { tone, played }))
}

#[utoipa::path(
    get,
    path = "/api/alerts",
    responses(
        (status = 200, description = "Recently fired alerts, newest first", body = Vec<AlertEvent>)
    ),
    tag = "alerts"
)]
pub async fn list_alerts(State(state): State<AppState>) -> Json<Vec<AlertEvent>> {
    let monitor = state.monitor.lock().unwrap();
    Json(monitor.recent_alerts().cloned().collect())
}

#[utoipa::path(
    get,
    path = "/api/passes",
    responses(
        (status = 200, description = "Current pass list", body = PassesResponse)
    ),
    tag = "alerts"
)]
pub async fn list_passes(State(state): State<AppState>) -> Json<PassesResponse> {
    let monitor = state.monitor.lock().unwrap();
    Json(PassesResponse {
        passes: monitor.passes().to_vec(),
        ledger_entries: monitor.ledger().len(),
    })
}

#[utoipa::path(
    delete,
    path = "/api/alerts/ledger",
    security(
        ("api_key" = [])
    ),
    responses(
        (status = 200, description = "Ledger cleared", body = LedgerResetResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Insufficient permissions")
    ),
    tag = "alerts"
)]
pub async fn reset_ledger(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> ApiResult<Json<LedgerResetResponse>> {
    require_permission(&user, Permission::ChangeSettings)?;
    log::info!("Alert ledger reset requested by {}", user.name);
    let cleared = state.monitor.lock().unwrap().reset_ledger();
    Ok(Json(LedgerResetResponse { cleared }))
}
