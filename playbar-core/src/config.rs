use crate::error::{CoreError, Result};
use crate::widget::WidgetOptions;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PlaybarConfig {
    #[serde(default)]
    pub backend: BackendConfig,
    #[serde(default)]
    pub widget: WidgetConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    /// Backend-specific sections, parsed by each backend crate
    #[serde(default)]
    pub providers: ProvidersConfig,
}

/// Which backend feeds the widget
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackendSource {
    #[default]
    Platypush,
}

impl BackendSource {
    /// Key of this backend's `[providers.<name>]` section
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Platypush => "platypush",
        }
    }
}

impl std::fmt::Display for BackendSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BackendConfig {
    #[serde(default)]
    pub source: BackendSource,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WidgetConfig {
    #[serde(default = "default_tick_interval")]
    pub tick_interval_ms: u64,
    #[serde(default = "default_true")]
    pub notifications: bool,
}

const fn default_tick_interval() -> u64 {
    1000
}

const fn default_true() -> bool {
    true
}

impl Default for WidgetConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: default_tick_interval(),
            notifications: true,
        }
    }
}

impl WidgetConfig {
    /// Convert to the widget's runtime options
    #[must_use]
    pub const fn options(&self) -> WidgetOptions {
        WidgetOptions {
            tick_period: Duration::from_millis(self.tick_interval_ms),
            notifications: self.notifications,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Also write logs to a file
    #[serde(default)]
    pub enabled: bool,
}

/// Dynamic `[providers.*]` tables keyed by backend name
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProvidersConfig(HashMap<String, toml::Value>);

impl ProvidersConfig {
    /// Deserialize the section for `name`, if present.
    ///
    /// # Errors
    ///
    /// Returns an error if the section exists but does not match `T`.
    pub fn get<T: DeserializeOwned>(&self, name: &str) -> Result<Option<T>> {
        self.0
            .get(name)
            .map(|value| {
                value
                    .clone()
                    .try_into()
                    .map_err(|e: toml::de::Error| CoreError::ConfigInvalid {
                        message: format!("providers.{name}: {e}"),
                    })
            })
            .transpose()
    }

    /// Whether a section exists for `name`
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }
}

impl PlaybarConfig {
    /// Get the config file path (~/.config/playbar/config.toml)
    #[must_use]
    pub fn config_path() -> PathBuf {
        crate::paths::config_path()
    }

    /// Load config from the default path, or create a template on first run.
    ///
    /// `provider_templates` are appended to the base template so each backend
    /// crate can contribute its own section.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::ConfigNotFound`] after writing the template, or an
    /// error if the file cannot be read, parsed or validated.
    pub fn load_or_create(provider_templates: Option<&[&str]>) -> Result<Self> {
        Self::load_or_create_at(&Self::config_path(), provider_templates)
    }

    /// Same as [`load_or_create`](Self::load_or_create) for an explicit path.
    ///
    /// # Errors
    ///
    /// See [`load_or_create`](Self::load_or_create).
    pub fn load_or_create_at(path: &Path, provider_templates: Option<&[&str]>) -> Result<Self> {
        if !path.exists() {
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)?;
            }

            fs::write(path, build_config_template(provider_templates))?;

            return Err(CoreError::ConfigNotFound {
                path: path.to_path_buf(),
            });
        }

        let content = fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Parse and validate config from TOML text.
    ///
    /// # Errors
    ///
    /// Returns an error if the text is not valid TOML or fails validation.
    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Check invariants serde cannot express.
    ///
    /// # Errors
    ///
    /// Returns an error describing the first invalid field.
    pub fn validate(&self) -> Result<()> {
        if self.widget.tick_interval_ms == 0 {
            return Err(CoreError::ConfigInvalid {
                message: "widget.tick_interval_ms must be greater than zero".into(),
            });
        }
        if !self.providers.contains(self.backend.source.as_str()) {
            return Err(CoreError::ConfigMissingField {
                field: format!("providers.{}", self.backend.source),
            });
        }
        Ok(())
    }
}

/// Base template followed by any backend templates
#[must_use]
pub fn build_config_template(provider_templates: Option<&[&str]>) -> String {
    let mut template = CONFIG_TEMPLATE.to_string();
    for provider in provider_templates.unwrap_or_default() {
        template.push('\n');
        template.push_str(provider);
    }
    template
}

const CONFIG_TEMPLATE: &str = r#"# Playbar Configuration
# ~/.config/playbar/config.toml

[backend]
# Player backend: "platypush"
source = "platypush"

[widget]
# Period of the local elapsed-time tick between player updates
tick_interval_ms = 1000
# Announce new tracks
notifications = true

[logging]
# Also write logs to the cache directory
enabled = false
"#;
