//! Configuration for tooltipgen
//!
//! Provides types, discovery and loading for `tooltipgen.toml`.

pub mod loader;
pub mod schema;

pub use loader::{
    config_root, find_config, find_config_from, find_xdg_config, load_config, load_config_file, merge_cli_overrides,
    CliOverrides, ConfigError, CONFIG_FILE_NAME,
};
pub use schema::*;
