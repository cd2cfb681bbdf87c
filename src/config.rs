//! Layout configuration.
//!
//! Handles loading, validating, and merging `meta-tags.toml`. Stock defaults
//! are overridden by whatever the user file specifies; everything is
//! optional.
//!
//! ## Configuration Options
//!
//! ```toml
//! [layout]
//! site = "My Site"     # Site name, first (or last, with reverse) in every title
//! prefix = " "         # Text before the separator; false for none
//! separator = ""       # Between site name and title parts
//! suffix = " "         # Text after the separator; false for none
//! lowercase = false    # Lowercase the page title parts
//! reverse = false      # Put the site name last
//!
//! [translations]
//! files = ["locales/en.toml"]   # Merged in order, later files win
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use crate::translation::{Catalog, CatalogError};
use crate::types::{MetaTagState, Scalar, Tag};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// File name looked up in the config directory.
pub const CONFIG_FILE: &str = "meta-tags.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Configuration loaded from `meta-tags.toml`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MetaConfig {
    /// Site name and title layout.
    pub layout: LayoutConfig,
    /// Translation catalog files.
    pub translations: TranslationsConfig,
}

impl MetaConfig {
    /// Validate config values are usable in a document head.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let layout = &self.layout;
        let fields = [
            ("layout.site", Some(layout.site.as_str())),
            ("layout.separator", Some(layout.separator.as_str())),
            ("layout.prefix", layout.prefix.as_text()),
            ("layout.suffix", layout.suffix.as_text()),
        ];
        for (name, value) in fields {
            if value.is_some_and(|v| v.contains(['\n', '\r'])) {
                return Err(ConfigError::Validation(format!(
                    "{name} must not contain line breaks"
                )));
            }
        }
        Ok(())
    }

    /// Load the configured translation files, relative to `root`.
    pub fn catalog(&self, root: &Path) -> Result<Catalog, CatalogError> {
        Catalog::load(&self.translations.paths(root))
    }
}

/// Title layout settings, used as render defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LayoutConfig {
    pub site: String,
    /// A string, or `false` for no prefix.
    pub prefix: Scalar,
    pub separator: String,
    /// A string, or `false` for no suffix.
    pub suffix: Scalar,
    pub lowercase: bool,
    pub reverse: bool,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            site: String::new(),
            prefix: Scalar::Text(" ".to_string()),
            separator: String::new(),
            suffix: Scalar::Text(" ".to_string()),
            lowercase: false,
            reverse: false,
        }
    }
}

impl LayoutConfig {
    /// Render defaults carrying these layout options.
    pub fn to_defaults(&self) -> MetaTagState {
        MetaTagState::new()
            .with(Tag::Site, self.site.as_str())
            .with(Tag::Prefix, self.prefix.clone())
            .with(Tag::Separator, self.separator.as_str())
            .with(Tag::Suffix, self.suffix.clone())
            .with(Tag::Lowercase, self.lowercase)
            .with(Tag::Reverse, self.reverse)
    }
}

/// Translation catalog settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TranslationsConfig {
    /// Catalog files, merged in order.
    pub files: Vec<PathBuf>,
}

impl TranslationsConfig {
    /// Files resolved against `root`. Absolute paths are kept as-is.
    pub fn paths(&self, root: &Path) -> Vec<PathBuf> {
        self.files.iter().map(|f| root.join(f)).collect()
    }
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
pub fn stock_defaults_value() -> Result<toml::Value, ConfigError> {
    toml::Value::try_from(MetaConfig::default())
        .map_err(|e| ConfigError::Validation(format!("default config must serialize: {e}")))
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
/// - Keys keep the position they first appeared at; new keys are appended.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                match base_table.get_mut(&key) {
                    Some(slot) => {
                        let base_val = std::mem::replace(slot, toml::Value::Boolean(false));
                        *slot = merge_toml(base_val, overlay_val);
                    }
                    None => {
                        base_table.insert(key, overlay_val);
                    }
                }
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Load `meta-tags.toml` from a directory as a raw TOML value.
///
/// Returns `Ok(None)` if the file does not exist.
pub fn load_raw_config(dir: &Path) -> Result<Option<toml::Value>, ConfigError> {
    let config_path = dir.join(CONFIG_FILE);
    if !config_path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(&config_path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Merge an optional overlay onto a base value, then deserialize and validate.
pub fn resolve_config(
    base: toml::Value,
    overlay: Option<toml::Value>,
) -> Result<MetaConfig, ConfigError> {
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: MetaConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load config from `meta-tags.toml` in the given directory.
///
/// Merges user values on top of stock defaults, rejects unknown keys,
/// and validates the result.
pub fn load_config(dir: &Path) -> Result<MetaConfig, ConfigError> {
    let base = stock_defaults_value()?;
    let overlay = load_raw_config(dir)?;
    resolve_config(base, overlay)
}

/// Returns a fully-commented stock `meta-tags.toml`.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# meta-tags configuration
# ======================
# All settings are optional. Values shown below are the defaults.
# Unknown keys will cause an error.

# ---------------------------------------------------------------------------
# Title layout
# ---------------------------------------------------------------------------
[layout]
# Site name. Rendered alone when a page sets no title.
site = ""

# The title is the site name and the page title parts joined with
# prefix + separator + suffix. Set prefix or suffix to false to drop it.
# With an empty separator, the default spacing collapses to one space:
#   "My Site Login"; with separator = "|": "My Site | Login".
prefix = " "
separator = ""
suffix = " "

# Lowercase the page title parts (not the site name).
lowercase = false

# Put the site name last: "Login | My Site".
reverse = false

# ---------------------------------------------------------------------------
# Translations
# ---------------------------------------------------------------------------
[translations]
# Catalog files holding [metas.<controller>.<action>] tables and a
# [metas.defaults] table. Relative to this file; later files win.
files = []
"##
}
