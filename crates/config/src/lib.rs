// Configuration loading

pub mod settings;

pub use settings::Settings;

/// Directory name used under the platform config/data dirs.
pub const APP_DIR: &str = "evalgrid";
