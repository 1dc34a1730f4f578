/// Configuration system for trimsave.
///
/// Provides a layered configuration hierarchy:
///
/// 1. **Built-in defaults**: hardcoded in [`schema::TrimsaveConfig::default()`]
/// 2. **User global config**: `~/.trimsave/config.toml`
/// 3. **Project local config**: `.trimsave.toml` in the current working directory
/// 4. **Environment variables**: `TRIMSAVE_*` overrides (highest precedence)
///
/// A file layer replaces the layer below it wholesale; missing keys inside a
/// file fall back to the built-in defaults through `serde(default)`.
///
/// # Usage
///
/// ```rust,ignore
/// use trimsave::config;
///
/// let cfg = config::load();
/// let registry = SessionRegistry::new(cfg.trim.options());
/// ```
pub mod schema;

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};

pub use schema::TrimsaveConfig;

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Load the fully resolved configuration: defaults → global TOML → project
/// TOML → env vars.
pub fn load() -> TrimsaveConfig {
    let mut config = load_layers(global_config_path(), project_config_path());
    apply_env_overrides(&mut config, |key| std::env::var(key).ok());
    config
}

/// Merge the file layers only.
pub fn load_layers(global: Option<PathBuf>, project: Option<PathBuf>) -> TrimsaveConfig {
    let mut config = TrimsaveConfig::default();

    if let Some(global) = load_toml_file(global) {
        config = global;
    }
    if let Some(project) = load_toml_file(project) {
        config = project;
    }

    config
}

/// Load a TOML config file from the given path (if it exists).
///
/// Returns `None` if the path is `None`, the file doesn't exist, or the
/// content is malformed. A broken config file never blocks a save.
fn load_toml_file(path: Option<PathBuf>) -> Option<TrimsaveConfig> {
    let path = path?;
    let content = fs::read_to_string(&path).ok()?;
    toml::from_str(&content).ok()
}

// ---------------------------------------------------------------------------
// File paths
// ---------------------------------------------------------------------------

/// Path to the user global config: `~/.trimsave/config.toml`.
fn global_config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".trimsave").join("config.toml"))
}

/// Path to the project local config: `.trimsave.toml` in the current directory.
fn project_config_path() -> Option<PathBuf> {
    std::env::current_dir()
        .ok()
        .map(|cwd| cwd.join(".trimsave.toml"))
}

/// Return the path to the global config file for display/init purposes.
pub fn global_config_file() -> Option<PathBuf> {
    global_config_path()
}

/// Return the path to the project config file for display purposes.
pub fn project_config_file() -> Option<PathBuf> {
    project_config_path()
}

// ---------------------------------------------------------------------------
// Environment variable overrides
// ---------------------------------------------------------------------------

/// Apply environment variable overrides (highest precedence layer).
///
/// Supported variables:
/// - `TRIMSAVE_ENABLED`: master switch (`1`/`true`/`yes`/`on`)
/// - `TRIMSAVE_TRAILING`: trailing whitespace pass
/// - `TRIMSAVE_BLANK_TAIL`: blank tail pass
/// - `TRIMSAVE_PRESERVE_CURSOR`: cursor whitespace restore
/// - `TRIMSAVE_SKIP_LANGUAGES`: comma-separated language identifiers
/// - `TRIMSAVE_LOG`: event logging
pub fn apply_env_overrides(config: &mut TrimsaveConfig, var: impl Fn(&str) -> Option<String>) {
    if let Some(val) = var("TRIMSAVE_ENABLED") {
        config.general.enabled = is_truthy(&val);
    }
    if let Some(val) = var("TRIMSAVE_TRAILING") {
        config.trim.trailing_whitespace = is_truthy(&val);
    }
    if let Some(val) = var("TRIMSAVE_BLANK_TAIL") {
        config.trim.blank_tail = is_truthy(&val);
    }
    if let Some(val) = var("TRIMSAVE_PRESERVE_CURSOR") {
        config.trim.preserve_cursor = is_truthy(&val);
    }
    if let Some(val) = var("TRIMSAVE_SKIP_LANGUAGES") {
        config.trim.skip_languages = parse_list(&val);
    }
    if let Some(val) = var("TRIMSAVE_LOG") {
        config.logging.enabled = is_truthy(&val);
    }
}

/// Check if a string value represents a truthy boolean.
fn is_truthy(val: &str) -> bool {
    matches!(
        val.to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

/// Split a comma-separated list, dropping empty items.
fn parse_list(val: &str) -> Vec<String> {
    val.split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}

// ---------------------------------------------------------------------------
// Config init / set / reset
// ---------------------------------------------------------------------------

/// Write the default annotated config to `~/.trimsave/config.toml`.
///
/// Returns an error if the file already exists (use `force = true` to
/// overwrite).
pub fn init_config(force: bool) -> Result<PathBuf> {
    let path = global_config_path().context("could not determine home directory")?;

    if path.exists() && !force {
        anyhow::bail!(
            "config file already exists at {}. Use --force to overwrite.",
            path.display()
        );
    }

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).context("failed to create ~/.trimsave/ directory")?;
    }

    fs::write(&path, TrimsaveConfig::default_toml()).context("failed to write config file")?;

    Ok(path)
}

/// Set a single dotted key (e.g. `trim.blank_tail`) in the global config.
pub fn set_config_value(key: &str, value: &str) -> Result<()> {
    let path = global_config_path().context("could not determine home directory")?;

    let content = if path.exists() {
        fs::read_to_string(&path).context("failed to read config file")?
    } else {
        toml::to_string_pretty(&TrimsaveConfig::default())
            .context("failed to serialize default config")?
    };

    let mut root: toml::Value =
        toml::from_str(&content).context("failed to parse config as TOML value")?;
    set_toml_value(&mut root, key, value)?;

    // Reject values the schema cannot load back.
    let updated = toml::to_string_pretty(&root).context("failed to serialize config")?;
    toml::from_str::<TrimsaveConfig>(&updated)
        .with_context(|| format!("invalid value '{value}' for '{key}'"))?;

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).context("failed to create config directory")?;
    }
    fs::write(&path, updated).context("failed to write config file")?;

    Ok(())
}

/// Set a value in a TOML value tree using a dotted key path. The type of the
/// existing value decides how `raw_value` is parsed.
fn set_toml_value(root: &mut toml::Value, key: &str, raw_value: &str) -> Result<()> {
    let Some((section, leaf)) = key.rsplit_once('.') else {
        anyhow::bail!("config key must be dotted, e.g. 'trim.blank_tail': '{key}'");
    };

    let mut current = root;
    for part in section.split('.') {
        current = current
            .get_mut(part)
            .with_context(|| format!("config key not found: section '{part}' in '{key}'"))?;
    }

    let table = current
        .as_table_mut()
        .with_context(|| format!("expected table at '{section}'"))?;

    let new_value = match table.get(leaf) {
        Some(toml::Value::Boolean(_)) => toml::Value::Boolean(is_truthy(raw_value)),
        Some(toml::Value::Integer(_)) => {
            let n: i64 = raw_value
                .parse()
                .with_context(|| format!("expected integer for '{key}', got '{raw_value}'"))?;
            toml::Value::Integer(n)
        }
        Some(toml::Value::Array(_)) => toml::Value::Array(
            parse_list(raw_value)
                .into_iter()
                .map(toml::Value::String)
                .collect(),
        ),
        Some(_) => toml::Value::String(raw_value.to_string()),
        None => anyhow::bail!("unknown config key '{key}'"),
    };

    table.insert(leaf.to_string(), new_value);
    Ok(())
}

/// Reset the global config to defaults (overwrite the file).
pub fn reset_config() -> Result<PathBuf> {
    init_config(true)
}

/// Show the effective (fully resolved) config as TOML.
pub fn show_effective_config() -> Result<String> {
    let config = load();
    toml::to_string_pretty(&config).context("failed to serialize effective config")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
