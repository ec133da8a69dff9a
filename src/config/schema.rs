/// Configuration schema and defaults for prism.
///
/// Defines the TOML-serializable structure with its sections: `[web]`,
/// `[fetch]`, `[render]`, and `[export]`. Every field has a built-in
/// default; users only set the values they want to override.
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

/// Top-level prism configuration.
///
/// Maps directly to the `~/.prism/config.toml` and `.prism.toml` file
/// schemas. All sections and fields are optional — missing values fall back
/// to built-in defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PrismConfig {
    pub web: WebConfig,
    pub fetch: FetchConfig,
    pub render: RenderConfig,
    pub export: ExportConfig,
}

// ---------------------------------------------------------------------------
// [web]
// ---------------------------------------------------------------------------

/// Web dashboard settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WebConfig {
    /// Listen address for `prism web`.
    pub addr: String,
    /// Open the dashboard in the default browser on startup.
    pub open_browser: bool,
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            addr: "127.0.0.1:9747".to_string(),
            open_browser: true,
        }
    }
}

// ---------------------------------------------------------------------------
// [fetch]
// ---------------------------------------------------------------------------

/// HTTP payload fetching settings (for URL inputs).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self { timeout_secs: 10 }
    }
}

// ---------------------------------------------------------------------------
// [render]
// ---------------------------------------------------------------------------

/// Rendering settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Show messages newest-first. A view-level reordering only.
    pub newest_first: bool,
}

// ---------------------------------------------------------------------------
// [export]
// ---------------------------------------------------------------------------

/// Analysis export settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    /// Pretty-print exported JSON documents.
    pub pretty: bool,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self { pretty: true }
    }
}
