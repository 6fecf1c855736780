pub mod logging;
pub mod settings;

pub use logging::{initialize as initialize_logging, LogDestination};
pub use settings::{EditorSettings, SettingsError, SettingsStore, DEFAULT_SETTINGS_FILENAME};
