//! Configuration management with layered loading
//!
//! Precedence (lowest to highest):
//! 1. Compiled defaults
//! 2. Global config: `$XDG_CONFIG_HOME/fishbone/fishbone.toml`
//! 3. Explicit config file (`--config <file>`)
//! 4. Environment variables: `FISHBONE_*` prefix, `__` for nesting
//!    (`FISHBONE_VIEWPORT__WIDTH=1200`)

use std::path::{Path, PathBuf};

use config::{Config, ConfigError, Environment};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::application::services::EditorDefaults;
use crate::application::ApplicationError;
use crate::domain::Viewport;

/// Default canvas size for rendering.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ViewportConfig {
    pub width: f64,
    pub height: f64,
}

impl Default for ViewportConfig {
    fn default() -> Self {
        let v = Viewport::default();
        Self {
            width: v.width,
            height: v.height,
        }
    }
}

impl From<ViewportConfig> for Viewport {
    fn from(v: ViewportConfig) -> Self {
        Viewport::new(v.width, v.height)
    }
}

/// Raw viewport config for intermediate parsing.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawViewportConfig {
    pub width: Option<f64>,
    pub height: Option<f64>,
}

/// Raw settings for intermediate parsing (`None` → field not specified, inherit).
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawSettings {
    pub server_url: Option<String>,
    pub created_by: Option<String>,
    pub root_bone_name: Option<String>,
    pub child_bone_name: Option<String>,
    pub timeout_secs: Option<u64>,
    #[serde(default)]
    pub viewport: RawViewportConfig,
}

/// Unified configuration for fishbone.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Settings {
    /// Base URL of the diagram store (default: http://localhost:8080)
    pub server_url: String,
    /// Attribution written into new bones
    pub created_by: String,
    /// Name given to new main bones
    pub root_bone_name: String,
    /// Name given to new sub bones
    pub child_bone_name: String,
    /// Request timeout for store calls
    pub timeout_secs: u64,
    /// Default render size
    pub viewport: ViewportConfig,
}

impl Default for Settings {
    fn default() -> Self {
        let defaults = EditorDefaults::default();
        Self {
            server_url: "http://localhost:8080".into(),
            created_by: defaults.created_by,
            root_bone_name: defaults.root_name,
            child_bone_name: defaults.child_name,
            timeout_secs: 15,
            viewport: ViewportConfig::default(),
        }
    }
}

/// Get the XDG config directory for fishbone.
pub fn global_config_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "fishbone").map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the global config file.
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("fishbone.toml"))
}

/// Load a TOML file into RawSettings for manual merging.
fn load_raw_settings(path: &Path) -> Result<RawSettings, ApplicationError> {
    let content = std::fs::read_to_string(path).map_err(|e| ApplicationError::Config {
        message: format!("read {}: {}", path.display(), e),
    })?;
    toml::from_str(&content).map_err(|e| ApplicationError::Config {
        message: format!("parse {}: {}", path.display(), e),
    })
}

fn config_err(e: ConfigError) -> ApplicationError {
    ApplicationError::Config {
        message: e.to_string(),
    }
}

impl Settings {
    /// Defaults handed to editing sessions.
    pub fn editor_defaults(&self) -> EditorDefaults {
        EditorDefaults {
            root_name: self.root_bone_name.clone(),
            child_name: self.child_bone_name.clone(),
            created_by: self.created_by.clone(),
        }
    }

    /// Overlay wins where it specifies a value.
    fn merge_with(&self, overlay: &RawSettings) -> Self {
        Self {
            server_url: overlay
                .server_url
                .clone()
                .unwrap_or_else(|| self.server_url.clone()),
            created_by: overlay
                .created_by
                .clone()
                .unwrap_or_else(|| self.created_by.clone()),
            root_bone_name: overlay
                .root_bone_name
                .clone()
                .unwrap_or_else(|| self.root_bone_name.clone()),
            child_bone_name: overlay
                .child_bone_name
                .clone()
                .unwrap_or_else(|| self.child_bone_name.clone()),
            timeout_secs: overlay.timeout_secs.unwrap_or(self.timeout_secs),
            viewport: ViewportConfig {
                width: overlay.viewport.width.unwrap_or(self.viewport.width),
                height: overlay.viewport.height.unwrap_or(self.viewport.height),
            },
        }
    }

    /// Load settings with layered precedence.
    ///
    /// # Arguments
    /// * `config_file` - Optional explicit config file, layered above the global one
    ///
    /// A missing global file is skipped; a missing explicit file is an error.
    pub fn load(config_file: Option<&Path>) -> Result<Self, ApplicationError> {
        let global = global_config_path().filter(|path| path.exists());
        Self::load_from(global.as_deref(), config_file)
    }

    /// Same layering as [`Settings::load`] with the global file chosen by the caller.
    ///
    /// Both files must exist when given.
    pub fn load_from(global: Option<&Path>, config_file: Option<&Path>) -> Result<Self, ApplicationError> {
        // 1. Start with defaults
        let mut current = Self::default();

        // 2. Global config, then the explicit file above it
        for path in [global, config_file].into_iter().flatten() {
            let raw = load_raw_settings(path)?;
            current = current.merge_with(&raw);
        }

        // 3. Environment variables
        current = Self::apply_env_overrides(current)?;

        current.validate()?;
        Ok(current)
    }

    /// Apply FISHBONE_* environment variables as explicit overrides.
    fn apply_env_overrides(mut settings: Self) -> Result<Self, ApplicationError> {
        // Use config crate just for env var parsing
        let builder = Config::builder().add_source(
            Environment::with_prefix("FISHBONE")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder.build().map_err(config_err)?;

        if let Ok(val) = config.get_string("server_url") {
            settings.server_url = val;
        }
        if let Ok(val) = config.get_string("created_by") {
            settings.created_by = val;
        }
        if let Ok(val) = config.get_string("root_bone_name") {
            settings.root_bone_name = val;
        }
        if let Ok(val) = config.get_string("child_bone_name") {
            settings.child_bone_name = val;
        }
        if let Ok(val) = config.get_int("timeout_secs") {
            settings.timeout_secs = u64::try_from(val).map_err(|_| ApplicationError::Config {
                message: format!("timeout_secs must not be negative: {val}"),
            })?;
        }
        if let Ok(val) = config.get_float("viewport.width") {
            settings.viewport.width = val;
        }
        if let Ok(val) = config.get_float("viewport.height") {
            settings.viewport.height = val;
        }

        Ok(settings)
    }

    fn validate(&self) -> Result<(), ApplicationError> {
        if self.server_url.trim().is_empty() {
            return Err(ApplicationError::Config {
                message: "server_url must not be empty".into(),
            });
        }
        if self.viewport.width <= 0.0 || self.viewport.height <= 0.0 {
            return Err(ApplicationError::Config {
                message: format!(
                    "viewport must be positive, got {}x{}",
                    self.viewport.width, self.viewport.height
                ),
            });
        }
        Ok(())
    }

    /// Render as TOML (for `config show`).
    pub fn to_toml(&self) -> Result<String, ApplicationError> {
        toml::to_string_pretty(self).map_err(|e| ApplicationError::Config {
            message: format!("serialize settings: {}", e),
        })
    }
}
