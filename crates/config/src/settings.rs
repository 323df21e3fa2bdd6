// Operator settings
// Loaded from ~/.config/evalgrid/settings.json

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use evalgrid_core::{DEFAULT_MAX_ERROR_SAMPLES, DEFAULT_MAX_UPLOAD_BYTES};

use crate::APP_DIR;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // Storage
    /// SQLite database file. Empty = platform data dir.
    #[serde(rename = "database.path")]
    pub database_path: Option<PathBuf>,

    // Import
    /// TOML column layout. None = built-in Forms export headers.
    #[serde(rename = "import.layoutFile")]
    pub layout_file: Option<PathBuf>,

    #[serde(rename = "import.maxErrorSamples")]
    pub max_error_samples: usize,

    #[serde(rename = "import.maxUploadBytes")]
    pub max_upload_bytes: u64,

    // Reconciliation
    /// Ignore mappings whose official name is not in the registry.
    #[serde(rename = "reconcile.strictMappings")]
    pub strict_mappings: bool,

    // Display
    #[serde(rename = "display.anonymousLabel")]
    pub anonymous_label: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            database_path: None,
            layout_file: None,
            max_error_samples: DEFAULT_MAX_ERROR_SAMPLES,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            strict_mappings: false,
            anonymous_label: "匿名".to_string(),
        }
    }
}

impl Settings {
    /// Get the settings file path
    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(APP_DIR)
            .join("settings.json")
    }

    /// Database path, falling back to the platform data dir.
    pub fn effective_database_path(&self) -> PathBuf {
        match &self.database_path {
            Some(p) if !p.as_os_str().is_empty() => p.clone(),
            _ => dirs::data_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(APP_DIR)
                .join("evalgrid.db"),
        }
    }

    /// Load settings from disk, falling back to defaults
    pub fn load() -> Self {
        let path = Self::config_path();
        if !path.exists() {
            let settings = Self::default();
            settings.create_default_file(&path);
            return settings;
        }
        Self::load_from(&path)
    }

    /// Load from an explicit file. Parse errors fall back to defaults.
    pub fn load_from(path: &Path) -> Self {
        match fs::read_to_string(path) {
            Ok(contents) => match Self::parse(&contents) {
                Ok(settings) => settings,
                Err(e) => {
                    log::warn!("Error parsing {}: {}; using default settings", path.display(), e);
                    Self::default()
                }
            },
            Err(e) => {
                log::warn!("Error reading {}: {}", path.display(), e);
                Self::default()
            }
        }
    }

    /// Parse settings JSON. Lines starting with `//` are comments.
    pub fn parse(contents: &str) -> Result<Self, String> {
        let cleaned: String = contents
            .lines()
            .filter(|line| !line.trim().starts_with("//"))
            .collect::<Vec<_>>()
            .join("\n");
        serde_json::from_str(&cleaned).map_err(|e| e.to_string())
    }

    /// Create default settings file with comments
    fn create_default_file(&self, path: &Path) {
        if let Some(parent) = path.parent() {
            if let Err(e) = fs::create_dir_all(parent) {
                log::warn!("Error creating config directory: {}", e);
                return;
            }
        }

        let default_config = r#"{
    // SQLite database (null = platform data dir)
    "database.path": null,

    // Import: TOML column layout (null = Microsoft Forms export headers)
    "import.layoutFile": null,
    "import.maxErrorSamples": 10,
    "import.maxUploadBytes": 10485760,

    // Reconciliation: ignore mappings that point outside the participant list
    "reconcile.strictMappings": false,

    // Shown instead of the respondent name on anonymous evaluations
    "display.anonymousLabel": "匿名"
}
"#;

        if let Err(e) = fs::write(path, default_config) {
            log::warn!("Error writing default settings.json: {}", e);
        }
    }
}
