use askama::Template;
use askama_web::WebTemplate;

pub struct PassRow {
    pub name: String,
    pub aos: String,
    pub los: String,
    pub max_elevation: f64,
    pub high_priority: bool,
    /// When the pre-pass warning fired, if it has
    pub warned_at: Option<String>,
}

pub struct AlertRow {
    pub class: String,
    pub name: String,
    pub fired_at: String,
    pub detail: String,
}

#[derive(Template, WebTemplate)]
#[template(path = "dashboard.html")]
pub struct DashboardTemplate {
    pub settings_loaded: bool,
    pub enabled: bool,
    pub high_priority_only: bool,
    pub min_elevation: u32,
    pub min_elevation_label: String,
    pub warning_minutes: u32,
    pub passes: Vec<PassRow>,
    pub alerts: Vec<AlertRow>,
}
