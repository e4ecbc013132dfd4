mod evaluator;
mod ledger;
mod monitor;
mod settings;
mod types;

pub use evaluator::evaluate;
pub use ledger::AlertLedger;
pub use monitor::{AlertMonitor, DEFAULT_HISTORY_LIMIT};
pub use settings::{AlertSettings, MinElevation, SettingsError, SettingsStore, WarningLead};
pub use types::{AlertClass, AlertEvent, AlertKey, SatellitePass};
