//! List command implementation

use std::path::Path;
use std::process::ExitCode;

use clap::ValueEnum;

use crate::config::load_config;
use crate::context::Context;
use crate::error::Result;

use super::{EXIT_ERROR, EXIT_SUCCESS};

/// What the list command prints
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListKind {
    /// Item ids in the sprite atlas
    Items,
    /// Overlay color option names
    Colors,
    /// Armor trim materials
    Trims,
}

/// Names of `kind` containing `query`, sorted
pub(super) fn listing(context: &Context, kind: ListKind, query: Option<&str>) -> Vec<String> {
    let query = query.unwrap_or("").to_lowercase();
    let names = match kind {
        ListKind::Items => return context.atlas().search(&query).into_iter().map(str::to_string).collect(),
        ListKind::Colors => context.overlays().all_option_names(),
        ListKind::Trims => context.overlays().trim_materials(),
    };
    names.into_iter().filter(|name| name.contains(&query)).collect()
}

fn load_context(config_path: Option<&Path>) -> Result<Context> {
    Context::init(&load_config(config_path)?)
}

/// Execute the list command
pub(super) fn run_list(config_path: Option<&Path>, kind: ListKind, query: Option<&str>) -> ExitCode {
    match load_context(config_path) {
        Ok(context) => {
            let names = listing(&context, kind, query);
            if names.is_empty() {
                eprintln!("No matches");
            }
            for name in names {
                println!("{}", name);
            }
            ExitCode::from(EXIT_SUCCESS)
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::from(EXIT_ERROR)
        }
    }
}
