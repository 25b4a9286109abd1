//! Client configuration module.
//!
//! Handles loading, validating, and merging `config.toml`. Stock defaults are
//! the base layer; a user file overrides only the keys it names, and CLI flags
//! override both.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! [api]
//! base_url = "https://api.yayasanpusakakai.org"
//! page_size = 30            # Items per page request (1-100)
//! timeout_secs = 30         # Per-request timeout
//!
//! [layout]
//! estimated_item_height = 300   # Pixels assumed per item when balancing columns (1-10000)
//! gap = 24                      # Pixels between items in a column (0-1000)
//! breakpoints = [[1280, 5], [1024, 4], [768, 3], [640, 2]]
//!
//! [labels]
//! site_title = "Yayasan Pusaka"
//! all_categories = "Semua"
//! all_regions = "Semua Wilayah"
//! empty = "Tidak ada gambar ditemukan"
//! loading = "Memuat galeri..."
//! footer = "© 2025 Yayasan Pusaka. Membangun masa depan yang lebih baik."
//!
//! [colors]
//! accent = "#3b82f6"
//! accent_end = "#4f46e5"
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

/// Upper bound for `layout.estimated_item_height`, in pixels.
pub const MAX_ITEM_HEIGHT: u32 = 10_000;
/// Upper bound for `layout.gap`, in pixels.
pub const MAX_GAP: u32 = 1_000;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Client configuration loaded from `config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    /// Remote gallery service settings.
    pub api: ApiConfig,
    /// Masonry layout tuning.
    pub layout: LayoutConfig,
    /// User-facing text.
    pub labels: LabelsConfig,
    /// Accent colors for the rendered page.
    pub colors: ColorConfig,
}

impl AppConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if url::Url::parse(&self.api.base_url).is_err() {
            return Err(ConfigError::Validation(format!(
                "api.base_url is not a valid URL: {}",
                self.api.base_url
            )));
        }
        if !(1..=100).contains(&self.api.page_size) {
            return Err(ConfigError::Validation(
                "api.page_size must be 1-100".into(),
            ));
        }
        if self.api.timeout_secs == 0 {
            return Err(ConfigError::Validation(
                "api.timeout_secs must be non-zero".into(),
            ));
        }
        if !(1..=MAX_ITEM_HEIGHT).contains(&self.layout.estimated_item_height) {
            return Err(ConfigError::Validation(format!(
                "layout.estimated_item_height must be 1-{MAX_ITEM_HEIGHT}"
            )));
        }
        if self.layout.gap > MAX_GAP {
            return Err(ConfigError::Validation(format!(
                "layout.gap must be at most {MAX_GAP}"
            )));
        }
        if self.layout.breakpoints.is_empty() {
            return Err(ConfigError::Validation(
                "layout.breakpoints must not be empty".into(),
            ));
        }
        if self.layout.breakpoints.iter().any(|[_, columns]| *columns == 0) {
            return Err(ConfigError::Validation(
                "layout.breakpoints column counts must be non-zero".into(),
            ));
        }
        if self
            .layout
            .breakpoints
            .windows(2)
            .any(|pair| pair[0][0] <= pair[1][0])
        {
            return Err(ConfigError::Validation(
                "layout.breakpoints widths must be strictly descending".into(),
            ));
        }
        Ok(())
    }
}

/// Remote gallery service settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ApiConfig {
    /// Service root, without the `/api` suffix.
    pub base_url: String,
    /// Items requested per page.
    pub page_size: u32,
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.yayasanpusakakai.org".to_string(),
            page_size: 30,
            timeout_secs: 30,
        }
    }
}

/// Masonry layout tuning.
///
/// Rendered heights are not known when columns are balanced, so every item is
/// assumed to be `estimated_item_height` tall.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LayoutConfig {
    /// Assumed item height in pixels.
    pub estimated_item_height: u32,
    /// Vertical gap between items in pixels.
    pub gap: u32,
    /// `[min_width, columns]` pairs, widest first. Narrower viewports get one column.
    pub breakpoints: Vec<[u32; 2]>,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            estimated_item_height: 300,
            gap: 24,
            breakpoints: vec![[1280, 5], [1024, 4], [768, 3], [640, 2]],
        }
    }
}

/// User-facing text.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LabelsConfig {
    pub site_title: String,
    /// Category pill shown when no category filter is active.
    pub all_categories: String,
    /// Region dropdown label when no region filter is active.
    pub all_regions: String,
    /// Empty-state message.
    pub empty: String,
    /// Message under the full-page spinner.
    pub loading: String,
    pub footer: String,
}

impl Default for LabelsConfig {
    fn default() -> Self {
        Self {
            site_title: "Yayasan Pusaka".to_string(),
            all_categories: "Semua".to_string(),
            all_regions: "Semua Wilayah".to_string(),
            empty: "Tidak ada gambar ditemukan".to_string(),
            loading: "Memuat galeri...".to_string(),
            footer: "© 2025 Yayasan Pusaka. Membangun masa depan yang lebih baik.".to_string(),
        }
    }
}

/// Accent gradient used for the logo, active pills and spinners.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ColorConfig {
    pub accent: String,
    pub accent_end: String,
}

impl Default for ColorConfig {
    fn default() -> Self {
        Self {
            accent: "#3b82f6".to_string(),
            accent_end: "#4f46e5".to_string(),
        }
    }
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
pub fn stock_defaults_value() -> toml::Value {
    toml::Value::try_from(AppConfig::default()).expect("default config must serialize")
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Load a config file as a raw TOML value.
///
/// Returns `Ok(None)` if the file does not exist.
pub fn load_raw_config(path: &Path) -> Result<Option<toml::Value>, ConfigError> {
    if !path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Merge an optional overlay onto a base value, then deserialize and validate.
pub fn resolve_config(
    base: toml::Value,
    overlay: Option<toml::Value>,
) -> Result<AppConfig, ConfigError> {
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: AppConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load config from the given file, falling back to stock defaults when the
/// file is absent.
pub fn load_config(path: &Path) -> Result<AppConfig, ConfigError> {
    let base = stock_defaults_value();
    let overlay = load_raw_config(path)?;
    resolve_config(base, overlay)
}

/// Returns a fully-commented stock `config.toml`.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# gallery-feed configuration
# ==========================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults. Unknown keys cause an error.

# ---------------------------------------------------------------------------
# Remote gallery service
# ---------------------------------------------------------------------------
[api]
# Service root. Endpoints live under /api on this host.
base_url = "https://api.yayasanpusakakai.org"

# Items requested per page (1-100).
page_size = 30

# Per-request timeout in seconds.
timeout_secs = 30

# ---------------------------------------------------------------------------
# Masonry layout
# ---------------------------------------------------------------------------
[layout]
# Height in pixels assumed for every item while balancing columns (1-10000).
estimated_item_height = 300

# Vertical gap between items in a column, in pixels (0-1000).
gap = 24

# [min_width, columns] pairs, widest first. Anything narrower than the last
# breakpoint gets a single column.
breakpoints = [[1280, 5], [1024, 4], [768, 3], [640, 2]]

# ---------------------------------------------------------------------------
# Labels
# ---------------------------------------------------------------------------
[labels]
site_title = "Yayasan Pusaka"
all_categories = "Semua"
all_regions = "Semua Wilayah"
empty = "Tidak ada gambar ditemukan"
loading = "Memuat galeri..."
footer = "© 2025 Yayasan Pusaka. Membangun masa depan yang lebih baik."

# ---------------------------------------------------------------------------
# Colors
# ---------------------------------------------------------------------------
[colors]
accent = "#3b82f6"
accent_end = "#4f46e5"
"##
}

/// Generate CSS custom properties from color config.
pub fn generate_color_css(colors: &ColorConfig) -> String {
    format!(
        r#":root {{
    --color-accent: {accent};
    --color-accent-end: {accent_end};
}}"#,
        accent = colors.accent,
        accent_end = colors.accent_end,
    )
}
