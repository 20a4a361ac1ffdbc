//! Inventory command implementation

use std::path::Path;
use std::process::ExitCode;

use crate::config::CliOverrides;
use crate::inventory::InventoryRequest;
use crate::output::write_output;
use crate::pipeline::{GenerationRequest, TooltipRequest};

use super::render::load_generator;
use super::{EXIT_ERROR, EXIT_SUCCESS};

/// Everything the inventory command was asked to draw
#[derive(Debug, Default)]
pub(super) struct InventoryArgs {
    pub contents: String,
    pub rows: u32,
    pub slots_per_row: u32,
    pub recipe: bool,
    pub title: Option<String>,
    pub no_border: bool,
    pub no_background: bool,
    pub still: bool,
    pub scale: Option<u32>,
    pub lore: Option<String>,
    pub timeout: Option<u64>,
}

/// The grid, then the hovered item's tooltip when lore is given
fn inventory_requests(args: &InventoryArgs) -> Vec<GenerationRequest> {
    let mut inventory = if args.recipe {
        InventoryRequest::recipe(args.contents.clone(), !args.no_background)
    } else {
        InventoryRequest {
            title: args.title.clone(),
            border: !args.no_border,
            slot_background: !args.no_background,
            ..InventoryRequest::new(args.rows, args.slots_per_row, args.contents.clone())
        }
    };
    inventory.animate = !args.still;
    if let Some(scale) = args.scale {
        inventory.scale = scale;
    }

    let mut requests = vec![GenerationRequest::Inventory(inventory)];
    if let Some(lore) = &args.lore {
        requests.push(GenerationRequest::Tooltip(TooltipRequest::lore(lore.clone())));
    }
    requests
}

/// Execute the inventory command
pub(super) fn run_inventory(config_path: Option<&Path>, args: InventoryArgs, output: &Path) -> ExitCode {
    let overrides = CliOverrides { timeout_ms: args.timeout, ..Default::default() };
    let result = load_generator(config_path, &overrides)
        .and_then(|generator| generator.generate(inventory_requests(&args)))
        .and_then(|result| write_output(&result, output));
    match result {
        Ok(path) => {
            println!("Saved: {}", path.display());
            ExitCode::from(EXIT_SUCCESS)
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::from(EXIT_ERROR)
        }
    }
}
