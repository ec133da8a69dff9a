/// Configuration system for prism.
///
/// Provides a layered configuration hierarchy:
///
/// 1. **Built-in defaults** — hardcoded in [`schema::PrismConfig::default()`]
/// 2. **User global config** — `~/.prism/config.toml`
/// 3. **Project local config** — `.prism.toml` in the current working directory
/// 4. **Environment variables** — `PRISM_*` overrides (highest precedence)
///
/// Later layers override earlier ones. Malformed files are silently ignored
/// — a broken config must never take the inspector down with it.
pub mod schema;

use std::fs;
use std::path::PathBuf;

pub use schema::PrismConfig;

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Load the fully resolved prism configuration.
///
/// Merges all layers in order: defaults → global TOML → project TOML → env
/// vars. This is the primary entry point for all modules that need
/// configuration.
pub fn load() -> PrismConfig {
    let mut config = PrismConfig::default();

    // Layer 2: user global config (~/.prism/config.toml)
    if let Some(global) = load_toml_file(global_config_path()) {
        merge_config(&mut config, &global);
    }

    // Layer 3: project local config (.prism.toml)
    if let Some(project) = load_toml_file(project_config_path()) {
        merge_config(&mut config, &project);
    }

    // Layer 4: environment variable overrides
    apply_env_overrides(&mut config);

    config
}

/// Load a TOML config file from the given path (if it exists).
///
/// Returns `None` if the path is `None`, the file doesn't exist, or the
/// content is malformed.
fn load_toml_file(path: Option<PathBuf>) -> Option<PrismConfig> {
    let path = path?;
    let content = fs::read_to_string(&path).ok()?;
    toml::from_str(&content).ok()
}

/// Merge a loaded config layer into the base config.
///
/// Each TOML file is deserialized with defaults filling its unset fields,
/// so the overlay fully replaces the base: explicitly-set values differ
/// from defaults and win, unset values match the base's defaults anyway.
fn merge_config(base: &mut PrismConfig, overlay: &PrismConfig) {
    *base = overlay.clone();
}

// ---------------------------------------------------------------------------
// File paths
// ---------------------------------------------------------------------------

/// Path to the user global config: `~/.prism/config.toml`.
fn global_config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".prism").join("config.toml"))
}

/// Path to the project local config: `.prism.toml` in the current directory.
fn project_config_path() -> Option<PathBuf> {
    std::env::current_dir()
        .ok()
        .map(|cwd| cwd.join(".prism.toml"))
}

// ---------------------------------------------------------------------------
// Environment variable overrides
// ---------------------------------------------------------------------------

/// Apply environment variable overrides (highest precedence layer).
///
/// Supported variables:
/// - `PRISM_WEB_ADDR` — dashboard listen address
/// - `PRISM_OPEN_BROWSER` — open the dashboard on startup (`1`/`true`/`yes`/`on`)
/// - `PRISM_FETCH_TIMEOUT_SECS` — URL fetch timeout
/// - `PRISM_NEWEST_FIRST` — show messages newest-first
/// - `PRISM_EXPORT_PRETTY` — pretty-print exported documents
fn apply_env_overrides(config: &mut PrismConfig) {
    if let Ok(val) = std::env::var("PRISM_WEB_ADDR")
        && !val.is_empty()
    {
        config.web.addr = val;
    }
    if let Ok(val) = std::env::var("PRISM_OPEN_BROWSER") {
        config.web.open_browser = is_truthy(&val);
    }
    if let Ok(val) = std::env::var("PRISM_FETCH_TIMEOUT_SECS")
        && let Ok(secs) = val.parse::<u64>()
    {
        config.fetch.timeout_secs = secs;
    }
    if let Ok(val) = std::env::var("PRISM_NEWEST_FIRST") {
        config.render.newest_first = is_truthy(&val);
    }
    if let Ok(val) = std::env::var("PRISM_EXPORT_PRETTY") {
        config.export.pretty = is_truthy(&val);
    }
}

/// Check if a string value represents a truthy boolean.
fn is_truthy(val: &str) -> bool {
    matches!(
        val.to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}
