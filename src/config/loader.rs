//! Configuration loading and discovery for `tooltipgen.toml`
//!
//! Provides functions to find, load, and merge configuration.

use super::schema::Config;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Name of the configuration file
pub const CONFIG_FILE_NAME: &str = "tooltipgen.toml";
const APP_DIR: &str = "tooltipgen";

/// Configuration loading error
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConfigError {
    /// File I/O error
    #[error("Failed to read config: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parsing error
    #[error("Failed to parse tooltipgen.toml: {0}")]
    Parse(#[from] toml::de::Error),
    /// Validation error
    #[error("Config validation failed:\n{}", .0.iter().map(|e| format!("  - {}", e)).collect::<Vec<_>>().join("\n"))]
    Validation(Vec<String>),
}

/// CLI arguments that can override config values
#[derive(Debug, Default, Clone)]
pub struct CliOverrides {
    pub scale: Option<u32>,
    pub timeout_ms: Option<u64>,
    pub workers: Option<usize>,
    pub max_line_length: Option<usize>,
    pub skins: Option<PathBuf>,
}

/// Find tooltipgen.toml by walking up from the current working directory.
///
/// Search order:
/// 1. Walk up from current directory looking for tooltipgen.toml
/// 2. Check XDG_CONFIG_HOME/tooltipgen/tooltipgen.toml (or ~/.config/tooltipgen/tooltipgen.toml)
pub fn find_config() -> Option<PathBuf> {
    if let Ok(cwd) = env::current_dir() {
        if let Some(path) = find_config_from(cwd) {
            return Some(path);
        }
    }

    find_xdg_config()
}

/// Find tooltipgen.toml in the XDG config directory.
pub fn find_xdg_config() -> Option<PathBuf> {
    let xdg_config = env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .or_else(|_| env::var("HOME").map(|h| PathBuf::from(h).join(".config")))
        .ok()?;

    let config_path = xdg_config.join(APP_DIR).join(CONFIG_FILE_NAME);
    if config_path.exists() {
        Some(config_path)
    } else {
        None
    }
}

/// Find tooltipgen.toml by walking up from a specific directory.
pub fn find_config_from(start: PathBuf) -> Option<PathBuf> {
    let mut current = start;

    loop {
        let config_path = current.join(CONFIG_FILE_NAME);
        if config_path.exists() {
            return Some(config_path);
        }

        if !current.pop() {
            return None;
        }
    }
}

/// Load configuration.
///
/// An explicit `path` wins; otherwise [`find_config`] is consulted, and the
/// built-in defaults apply when nothing is found.
///
/// ```ignore
/// let config = load_config(None)?;
/// let config = load_config(Some(Path::new("assets/tooltipgen.toml")))?;
/// ```
pub fn load_config(path: Option<&Path>) -> Result<Config, ConfigError> {
    let config_path = match path {
        Some(p) => Some(p.to_path_buf()),
        None => find_config(),
    };

    match config_path {
        Some(p) => load_config_file(&p),
        None => {
            tracing::debug!("No {} found, using defaults", CONFIG_FILE_NAME);
            Ok(Config::default())
        }
    }
}

/// Load configuration from a specific file path.
pub fn load_config_file(path: &Path) -> Result<Config, ConfigError> {
    let contents = fs::read_to_string(path)?;
    let mut config: Config = toml::from_str(&contents)?;

    let errors = config.validate();
    if !errors.is_empty() {
        return Err(ConfigError::Validation(errors.into_iter().map(|e| e.to_string()).collect()));
    }

    if let Some(root) = config_root(path) {
        config.resolve_paths(root);
    }
    tracing::debug!("Loaded configuration from {}", path.display());
    Ok(config)
}

/// Merge CLI overrides into a configuration, then re-validate.
///
/// CLI arguments take precedence over config file values.
pub fn merge_cli_overrides(config: &mut Config, overrides: &CliOverrides) -> Result<(), ConfigError> {
    if let Some(scale) = overrides.scale {
        config.render.scale = scale;
    }
    if let Some(timeout_ms) = overrides.timeout_ms {
        config.render.timeout_ms = timeout_ms;
    }
    if let Some(workers) = overrides.workers {
        config.render.workers = workers;
    }
    if let Some(max_line_length) = overrides.max_line_length {
        config.render.max_line_length = max_line_length;
    }
    if let Some(ref skins) = overrides.skins {
        config.data.skins = Some(skins.clone());
    }

    let errors = config.validate();
    if errors.is_empty() {
        Ok(())
    } else {
        Err(ConfigError::Validation(errors.into_iter().map(|e| e.to_string()).collect()))
    }
}

/// Directory containing the config file.
pub fn config_root(config_path: &Path) -> Option<&Path> {
    config_path.parent().filter(|p| !p.as_os_str().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::fs::File;
    use std::io::Write;
    use tempfile::TempDir;

    fn write_config(dir: &Path, contents: &str) -> PathBuf {
        let config_path = dir.join(CONFIG_FILE_NAME);
        File::create(&config_path)
            .expect("should create config file")
            .write_all(contents.as_bytes())
            .expect("should write config content");
        config_path
    }

    #[test]
    fn test_find_config_in_current_dir() {
        let temp = TempDir::new().expect("should create temp dir");
        let config_path = write_config(temp.path(), "[render]\nscale = 2");

        let found = find_config_from(temp.path().to_path_buf());
        assert_eq!(found, Some(config_path));
    }

    #[test]
    fn test_find_config_in_parent_dir() {
        let temp = TempDir::new().expect("should create temp dir");
        let config_path = write_config(temp.path(), "");

        let subdir = temp.path().join("assets").join("items");
        fs::create_dir_all(&subdir).expect("should create subdirectories");

        let found = find_config_from(subdir);
        assert_eq!(found, Some(config_path));
    }

    #[test]
    fn test_find_config_not_found() {
        let temp = TempDir::new().expect("should create temp dir");
        let found = find_config_from(temp.path().to_path_buf());
        assert_eq!(found, None);
    }

    #[test]
    fn test_load_config_resolves_relative_paths() {
        let temp = TempDir::new().expect("should create temp dir");
        let config_path = write_config(
            temp.path(),
            "[data]\natlas = \"items.png\"\natlas_coordinates = \"items.json\"\n\n[render]\nscale = 3\n",
        );

        let config = load_config(Some(&config_path)).expect("should load config");
        assert_eq!(config.render.scale, 3);
        assert_eq!(config.data.atlas, Some(temp.path().join("items.png")));
        assert_eq!(config.data.atlas_coordinates, Some(temp.path().join("items.json")));
    }

    #[test]
    fn test_load_config_parse_error() {
        let temp = TempDir::new().expect("should create temp dir");
        let config_path = write_config(temp.path(), "[render\nscale = ");
        assert!(matches!(load_config(Some(&config_path)), Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_load_config_validation_error() {
        let temp = TempDir::new().expect("should create temp dir");
        let config_path = write_config(temp.path(), "[render]\nscale = 0\nmax_line_length = 0\n");
        match load_config(Some(&config_path)) {
            Err(ConfigError::Validation(errors)) => {
                assert_eq!(errors.len(), 2);
                assert!(errors[0].contains("render.scale"));
            }
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_load_config_missing_file() {
        let temp = TempDir::new().expect("should create temp dir");
        let result = load_config(Some(&temp.path().join("missing.toml")));
        assert!(matches!(result, Err(ConfigError::Io(_))));
    }

    #[test]
    fn test_merge_cli_overrides() {
        let mut config = Config::default();
        let overrides = CliOverrides { scale: Some(4), timeout_ms: Some(500), ..Default::default() };
        merge_cli_overrides(&mut config, &overrides).expect("overrides are valid");
        assert_eq!(config.render.scale, 4);
        assert_eq!(config.render.timeout_ms, 500);

        let bad = CliOverrides { max_line_length: Some(0), ..Default::default() };
        assert!(merge_cli_overrides(&mut config, &bad).is_err());
    }

    #[test]
    #[serial]
    fn test_find_xdg_config() {
        let temp = TempDir::new().expect("should create temp dir");
        let app_dir = temp.path().join(APP_DIR);
        fs::create_dir_all(&app_dir).expect("should create app dir");
        let config_path = write_config(&app_dir, "[render]\nscale = 2");

        let previous = env::var_os("XDG_CONFIG_HOME");
        env::set_var("XDG_CONFIG_HOME", temp.path());
        let found = find_xdg_config();
        match previous {
            Some(value) => env::set_var("XDG_CONFIG_HOME", value),
            None => env::remove_var("XDG_CONFIG_HOME"),
        }

        assert_eq!(found, Some(config_path));
    }
}
