use utoipa::{
    openapi::security::{Http, HttpAuthScheme, SecurityScheme},
    Modify, OpenApi,
};

use super::api::alerts::{LedgerResetResponse, PassesResponse, TestToneResponse};
use super::api::error::ErrorResponse;
use super::api::settings::SettingsResponse;

#[derive(OpenApi)]
#[openapi(
    paths(
        super::api::settings::get_settings,
        super::api::settings::put_settings,
        super::api::alerts::test_warning,
        super::api::alerts::test_urgent,
        super::api::alerts::list_alerts,
        super::api::alerts::list_passes,
        super::api::alerts::reset_ledger,
    ),
    components(
        schemas(
            SettingsResponse,
            TestToneResponse,
            PassesResponse,
            LedgerResetResponse,
            ErrorResponse,
            crate::alerts::AlertSettings,
            crate::alerts::AlertEvent,
            crate::alerts::AlertClass,
            crate::alerts::SatellitePass,
            crate::tone::ToneKind,
        )
    ),
    modifiers(&SecurityAddon),
    info(
        title = "Pass Alert API",
        description = "Satellite pass alert settings, test tones and alert history",
        version = "0.1.0"
    ),
    tags(
        (name = "settings", description = "Alert settings"),
        (name = "alerts", description = "Alert history, passes and test tones")
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "api_key",
                SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer)),
            );
        }
    }
}
