//! Configuration file support for the upload form.
//!
//! Everything the controller needs to know about the page (element ids,
//! accepted files, timings, localized text) lives here so a deployment can
//! override it without rebuilding. Every section falls back to defaults that
//! match the stock upload page.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::constants::{self, classes, ids, selectors, timing};

/// Log level setting for the application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Show only errors
    Error,
    /// Show errors and warnings
    Warn,
    /// Show errors, warnings, and info messages
    #[default]
    Info,
    /// Show debug-level logging
    Debug,
    /// Show all log messages including trace
    Trace,
}

impl LogLevel {
    /// Convert to log crate's LevelFilter.
    pub fn to_level_filter(&self) -> log::LevelFilter {
        match self {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }

    /// Convert to log crate's Level, used by the browser console logger.
    pub fn to_level(&self) -> log::Level {
        match self {
            LogLevel::Error => log::Level::Error,
            LogLevel::Warn => log::Level::Warn,
            LogLevel::Info => log::Level::Info,
            LogLevel::Debug => log::Level::Debug,
            LogLevel::Trace => log::Level::Trace,
        }
    }
}

/// Current configuration file format version.
/// Increment this when making breaking changes to the config format.
pub const CONFIG_VERSION: u32 = 1;

/// Upload form configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UploadConfig {
    /// Version of the configuration file format
    pub version: u32,

    /// Which files are accepted
    #[serde(default)]
    pub policy: UploadPolicy,

    /// Animation and auto-dismiss delays
    #[serde(default)]
    pub timings: Timings,

    /// User-facing text
    #[serde(default)]
    pub messages: Messages,

    /// DOM contract
    #[serde(default)]
    pub elements: ElementNames,

    /// Log verbosity level
    #[serde(default)]
    pub log_level: LogLevel,
}

/// File acceptance rules.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UploadPolicy {
    /// Accepted media types, compared exactly
    pub accepted_types: Vec<String>,
    /// Largest accepted file, inclusive
    pub max_size_bytes: u64,
}

impl Default for UploadPolicy {
    fn default() -> Self {
        Self {
            accepted_types: constants::ACCEPTED_MIME_TYPES
                .iter()
                .map(|t| t.to_string())
                .collect(),
            max_size_bytes: constants::MAX_UPLOAD_BYTES,
        }
    }
}

/// Timeline delays, in milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Timings {
    pub alert_fade_delay_ms: u64,
    pub alert_hide_delay_ms: u64,
    pub bar_collapse_delay_ms: u64,
    pub bar_expand_delay_ms: u64,
    pub preview_fade_delay_ms: u64,
    pub preview_fade_duration_ms: u64,
}

impl Timings {
    pub fn alert_fade_delay(&self) -> Duration {
        Duration::from_millis(self.alert_fade_delay_ms)
    }

    pub fn alert_hide_delay(&self) -> Duration {
        Duration::from_millis(self.alert_hide_delay_ms)
    }

    pub fn bar_collapse_delay(&self) -> Duration {
        Duration::from_millis(self.bar_collapse_delay_ms)
    }

    pub fn bar_expand_delay(&self) -> Duration {
        Duration::from_millis(self.bar_expand_delay_ms)
    }

    pub fn preview_fade_delay(&self) -> Duration {
        Duration::from_millis(self.preview_fade_delay_ms)
    }

    /// CSS `transition` value for the preview fade-in, e.g. `opacity 0.3s`.
    pub fn preview_transition(&self) -> String {
        let seconds = self.preview_fade_duration_ms as f64 / 1000.0;
        format!("opacity {}s", seconds)
    }
}

impl Default for Timings {
    fn default() -> Self {
        Self {
            alert_fade_delay_ms: timing::ALERT_FADE_DELAY_MS,
            alert_hide_delay_ms: timing::ALERT_HIDE_DELAY_MS,
            bar_collapse_delay_ms: timing::BAR_COLLAPSE_DELAY_MS,
            bar_expand_delay_ms: timing::BAR_EXPAND_DELAY_MS,
            preview_fade_delay_ms: timing::PREVIEW_FADE_DELAY_MS,
            preview_fade_duration_ms: timing::PREVIEW_FADE_DURATION_MS,
        }
    }
}

/// Localized user-facing text. Defaults are Vietnamese.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Messages {
    /// Alert shown for a file that is not an accepted image type
    pub invalid_type: String,
    /// Alert shown for a file over the size limit
    pub too_large: String,
    /// Alert shown when the file could not be read for the preview
    pub read_failed: String,
    /// Submit button markup while the form is being submitted
    pub analyzing_label: String,
}

impl Default for Messages {
    fn default() -> Self {
        Self {
            invalid_type: "Vui lòng chọn file ảnh (PNG, JPG, JPEG)".to_string(),
            too_large: "Kích thước file không được vượt quá 16MB".to_string(),
            read_failed: "Không thể đọc file ảnh, vui lòng thử lại".to_string(),
            analyzing_label: "<span class=\"btn-icon\">⏳</span> Đang phân tích...".to_string(),
        }
    }
}

/// Element ids, classes and selectors of the page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ElementNames {
    pub upload_area: String,
    pub file_input: String,
    pub preview: String,
    pub preview_image: String,
    pub upload_form: String,
    pub submit_button: String,
    pub drag_over_class: String,
    pub pulse_class: String,
    pub alert_selector: String,
    pub bar_selector: String,
}

impl Default for ElementNames {
    fn default() -> Self {
        Self {
            upload_area: ids::UPLOAD_AREA.to_string(),
            file_input: ids::FILE_INPUT.to_string(),
            preview: ids::PREVIEW.to_string(),
            preview_image: ids::PREVIEW_IMAGE.to_string(),
            upload_form: ids::UPLOAD_FORM.to_string(),
            submit_button: ids::SUBMIT_BUTTON.to_string(),
            drag_over_class: classes::DRAG_OVER.to_string(),
            pulse_class: classes::PULSE_ANIMATION.to_string(),
            alert_selector: selectors::ALERT.to_string(),
            bar_selector: selectors::PROBABILITY_BAR.to_string(),
        }
    }
}

impl UploadConfig {
    /// Create a new configuration with default values.
    pub fn new() -> Self {
        Self {
            version: CONFIG_VERSION,
            policy: UploadPolicy::default(),
            timings: Timings::default(),
            messages: Messages::default(),
            elements: ElementNames::default(),
            log_level: LogLevel::default(),
        }
    }

    /// Serialize the configuration to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Deserialize configuration from JSON.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;

        if config.version > CONFIG_VERSION {
            return Err(ConfigError::VersionTooNew {
                file_version: config.version,
                supported_version: CONFIG_VERSION,
            });
        }

        Ok(config)
    }

    /// Get the default filename for the config file.
    pub fn default_filename() -> &'static str {
        "upload-form.json"
    }

    /// Get the default config file path.
    /// Returns None on WASM (no filesystem access).
    #[cfg(not(target_arch = "wasm32"))]
    pub fn default_path() -> Option<std::path::PathBuf> {
        if let Some(config_dir) = dirs::config_dir() {
            Some(config_dir.join("upload-form").join(Self::default_filename()))
        } else {
            dirs::home_dir().map(|home_dir| {
                home_dir
                    .join(".config")
                    .join("upload-form")
                    .join(Self::default_filename())
            })
        }
    }

    /// Load configuration from a file.
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load_from_path(path: &std::path::Path) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Try to load configuration from the default path.
    /// Returns None if the file doesn't exist or can't be read.
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load_from_default_path() -> Option<Self> {
        let path = Self::default_path()?;
        if !path.exists() {
            log::debug!("No config file found at {:?}", path);
            return None;
        }

        match Self::load_from_path(&path) {
            Ok(config) => {
                log::info!("Loaded configuration from {:?}", path);
                Some(config)
            }
            Err(e) => {
                log::warn!("Failed to load config file {:?}: {}", path, e);
                None
            }
        }
    }

    /// LocalStorage key for WASM config overrides.
    #[cfg(target_arch = "wasm32")]
    const LOCALSTORAGE_KEY: &'static str = "upload-form-config";

    /// Try to load configuration from localStorage (WASM only).
    /// Returns None if not found or can't be parsed.
    #[cfg(target_arch = "wasm32")]
    pub fn load_from_local_storage() -> Option<Self> {
        let window = web_sys::window()?;
        let storage = window.local_storage().ok()??;

        match storage.get_item(Self::LOCALSTORAGE_KEY) {
            Ok(Some(json)) => match Self::from_json(&json) {
                Ok(config) => {
                    log::info!("Loaded configuration from localStorage");
                    Some(config)
                }
                Err(e) => {
                    log::warn!("Failed to parse config from localStorage: {}", e);
                    None
                }
            },
            Ok(None) => {
                log::debug!("No config found in localStorage");
                None
            }
            Err(e) => {
                log::warn!("Failed to read from localStorage: {:?}", e);
                None
            }
        }
    }
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// JSON parsing error
    #[error("Failed to parse configuration: {0}")]
    ParseError(#[from] serde_json::Error),

    /// Configuration version is newer than supported
    #[error(
        "Configuration file version {file_version} is newer than supported version {supported_version}"
    )]
    VersionTooNew {
        file_version: u32,
        supported_version: u32,
    },

    /// I/O error when reading config
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
}
