pub mod api;
pub mod api_doc;
pub mod auth;
pub mod server;
pub mod ui;

pub use auth::AppState;
pub use server::run_server;
