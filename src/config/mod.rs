//! Configuration system for the MediConnect client.
//!
//! Layers, lowest precedence first:
//!
//! 1. **Built-in defaults** from [`schema::MediConnectConfig::default()`]
//! 2. **User global config** at `~/.mediconnect/config.toml`
//! 3. **Project local config** at `.mediconnect.toml` in the working directory
//! 4. **Environment variables** `MEDICONNECT_*`
//!
//! A layer that is present replaces the one below it; missing keys inside a
//! file fall back to defaults. Malformed files are skipped.

pub mod schema;

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

pub use schema::MediConnectConfig;

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Load the fully resolved configuration.
pub fn load() -> MediConnectConfig {
    let mut config = MediConnectConfig::default();

    if let Some(global) = load_toml_file(global_config_path()) {
        merge_config(&mut config, &global);
    }

    if let Some(project) = load_toml_file(project_config_path()) {
        merge_config(&mut config, &project);
    }

    apply_env_overrides(&mut config, |key| std::env::var(key).ok());
    config
}

fn load_toml_file(path: Option<PathBuf>) -> Option<MediConnectConfig> {
    let path = path?;
    let content = fs::read_to_string(&path).ok()?;
    match toml::from_str(&content) {
        Ok(config) => Some(config),
        Err(err) => {
            tracing::warn!(path = %path.display(), error = %err, "ignoring malformed config file");
            None
        }
    }
}

/// The overlay was deserialized with defaults for every unset key, so it
/// replaces the base wholesale.
fn merge_config(base: &mut MediConnectConfig, overlay: &MediConnectConfig) {
    *base = overlay.clone();
}

// ---------------------------------------------------------------------------
// File paths
// ---------------------------------------------------------------------------

fn global_config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".mediconnect").join("config.toml"))
}

fn project_config_path() -> Option<PathBuf> {
    std::env::current_dir()
        .ok()
        .map(|cwd| cwd.join(".mediconnect.toml"))
}

/// Path to `~/.mediconnect/config.toml`, for display and init.
pub fn global_config_file() -> Option<PathBuf> {
    global_config_path()
}

/// Path to `.mediconnect.toml`, for display.
pub fn project_config_file() -> Option<PathBuf> {
    project_config_path()
}

// ---------------------------------------------------------------------------
// Environment variable overrides
// ---------------------------------------------------------------------------

/// Supported variables:
/// - `MEDICONNECT_BASE_URL`: backend origin
/// - `MEDICONNECT_LOG_LEVEL`: log filter
/// - `MEDICONNECT_CHAT`: chat widget on/off (`1`/`true`/`yes`/`on`)
/// - `MEDICONNECT_NOTIFY_TTL_SECS`: notification lifetime
fn apply_env_overrides<F>(config: &mut MediConnectConfig, var: F)
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(val) = var("MEDICONNECT_BASE_URL")
        && !val.trim().is_empty()
    {
        config.server.base_url = val.trim().to_string();
    }
    if let Some(val) = var("MEDICONNECT_LOG_LEVEL")
        && !val.trim().is_empty()
    {
        config.logging.level = val.trim().to_string();
    }
    if let Some(val) = var("MEDICONNECT_CHAT") {
        config.chat.enabled = is_truthy(&val);
    }
    if let Some(val) = var("MEDICONNECT_NOTIFY_TTL_SECS")
        && let Ok(secs) = val.trim().parse::<u64>()
    {
        config.notifications.ttl_secs = secs;
    }
}

pub fn is_truthy(val: &str) -> bool {
    matches!(
        val.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

// ---------------------------------------------------------------------------
// Config init / set / reset
// ---------------------------------------------------------------------------

/// Write the annotated defaults to `~/.mediconnect/config.toml`.
///
/// Fails if the file exists, unless `force` is set.
pub fn init_config(force: bool) -> Result<PathBuf> {
    let path = global_config_path().context("could not determine home directory")?;
    write_default_config(&path, force)?;
    Ok(path)
}

fn write_default_config(path: &Path, force: bool) -> Result<()> {
    if path.exists() && !force {
        anyhow::bail!(
            "config file already exists at {}. Use --force to overwrite.",
            path.display()
        );
    }
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).context("failed to create config directory")?;
    }
    fs::write(path, MediConnectConfig::default_toml()).context("failed to write config file")?;
    Ok(())
}

/// Set one dotted key (e.g. `server.base_url`) in the global config file,
/// starting from defaults if the file does not exist yet.
pub fn set_config_value(key: &str, value: &str) -> Result<PathBuf> {
    let path = global_config_path().context("could not determine home directory")?;
    set_value_in_file(&path, key, value)?;
    Ok(path)
}

fn set_value_in_file(path: &Path, key: &str, value: &str) -> Result<()> {
    let source = if path.exists() {
        fs::read_to_string(path).context("failed to read config file")?
    } else {
        toml::to_string_pretty(&MediConnectConfig::default())
            .context("failed to serialize default config")?
    };

    let mut root: toml::Value = toml::from_str(&source).context("failed to parse config as TOML")?;
    set_toml_value(&mut root, key, value)?;

    let output = toml::to_string_pretty(&root).context("failed to serialize updated config")?;
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).context("failed to create config directory")?;
    }
    fs::write(path, output).context("failed to write config file")?;
    Ok(())
}

/// Set a value in a TOML tree by dotted path, keeping the existing type.
fn set_toml_value(root: &mut toml::Value, key: &str, raw_value: &str) -> Result<()> {
    let Some((section_path, leaf)) = key.rsplit_once('.') else {
        anyhow::bail!("config key must look like 'section.key', got '{key}'");
    };

    let mut current = root;
    for part in section_path.split('.') {
        current = current
            .get_mut(part)
            .with_context(|| format!("config key not found: section '{part}' in '{key}'"))?;
    }
    let table = current
        .as_table_mut()
        .with_context(|| format!("expected table at '{section_path}'"))?;

    let new_value = match table.get(leaf) {
        Some(toml::Value::Boolean(_)) => toml::Value::Boolean(is_truthy(raw_value)),
        Some(toml::Value::Integer(_)) => {
            let n: i64 = raw_value
                .trim()
                .parse()
                .with_context(|| format!("expected integer for '{key}', got '{raw_value}'"))?;
            toml::Value::Integer(n)
        }
        Some(_) => toml::Value::String(raw_value.to_string()),
        None => anyhow::bail!("unknown config key '{key}'"),
    };

    table.insert(leaf.to_string(), new_value);
    Ok(())
}

/// Overwrite the global config with defaults.
pub fn reset_config() -> Result<PathBuf> {
    init_config(true)
}

/// The effective configuration as TOML.
pub fn show_effective_config() -> Result<String> {
    toml::to_string_pretty(&load()).context("failed to serialize effective config")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn defaults_value() -> toml::Value {
        toml::Value::try_from(MediConnectConfig::default()).unwrap()
    }

    #[test]
    fn is_truthy_accepts_variants() {
        for val in ["1", "true", "TRUE", "yes", "on", " On "] {
            assert!(is_truthy(val), "{val}");
        }
        for val in ["0", "false", "no", "off", ""] {
            assert!(!is_truthy(val), "{val}");
        }
    }

    #[test]
    fn env_overrides_apply() {
        let env: HashMap<&str, &str> = [
            ("MEDICONNECT_BASE_URL", "https://clinic.example"),
            ("MEDICONNECT_CHAT", "off"),
            ("MEDICONNECT_NOTIFY_TTL_SECS", "9"),
            ("MEDICONNECT_LOG_LEVEL", "debug"),
        ]
        .into_iter()
        .collect();

        let mut config = MediConnectConfig::default();
        apply_env_overrides(&mut config, |k| env.get(k).map(|v| v.to_string()));

        assert_eq!(config.server.base_url, "https://clinic.example");
        assert!(!config.chat.enabled);
        assert_eq!(config.notifications.ttl_secs, 9);
        assert_eq!(config.logging.level, "debug");
    }

    #[test]
    fn bad_ttl_override_is_ignored() {
        let mut config = MediConnectConfig::default();
        apply_env_overrides(&mut config, |k| {
            (k == "MEDICONNECT_NOTIFY_TTL_SECS").then(|| "soon".to_string())
        });
        assert_eq!(config.notifications.ttl_secs, 5);
    }

    #[test]
    fn set_toml_value_preserves_types() {
        let mut root = defaults_value();
        set_toml_value(&mut root, "chat.enabled", "no").unwrap();
        set_toml_value(&mut root, "notifications.max_stack", "4").unwrap();
        set_toml_value(&mut root, "server.base_url", "http://10.0.0.2:8080").unwrap();

        let config: MediConnectConfig = root.try_into().unwrap();
        assert!(!config.chat.enabled);
        assert_eq!(config.notifications.max_stack, 4);
        assert_eq!(config.server.base_url, "http://10.0.0.2:8080");
    }

    #[test]
    fn set_toml_value_rejects_unknown_keys() {
        let mut root = defaults_value();
        assert!(set_toml_value(&mut root, "server.port", "80").is_err());
        assert!(set_toml_value(&mut root, "nosuch.key", "x").is_err());
        assert!(set_toml_value(&mut root, "toplevel", "x").is_err());
        assert!(set_toml_value(&mut root, "notifications.ttl_secs", "five").is_err());
    }

    #[test]
    fn set_value_in_file_starts_from_defaults() {
        let dir = std::env::temp_dir().join(format!("mediconnect-config-{}", std::process::id()));
        let path = dir.join("config.toml");
        let _ = fs::remove_file(&path);

        set_value_in_file(&path, "logging.level", "info").unwrap();
        let config: MediConnectConfig = toml::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.notifications.ttl_secs, 5);

        assert!(write_default_config(&path, false).is_err());
        write_default_config(&path, true).unwrap();
        let config: MediConnectConfig = toml::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(config, MediConnectConfig::default());

        let _ = fs::remove_dir_all(&dir);
    }
}
