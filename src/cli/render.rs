//! Render and nbt command implementations

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use glob::glob;

use crate::config::{load_config, merge_cli_overrides, CliOverrides, Config};
use crate::context::Context;
use crate::error::{GeneratorError, Result};
use crate::item::parse_item;
use crate::output::{generate_output_path, write_output};
use crate::pipeline::{GenerationRequest, Generator, HeadRequest, TooltipRequest};
use crate::rarity::Rarity;
use crate::sprite::ItemRequest;
use crate::templates::TemplateEngine;
use crate::tooltip::TooltipSettings;

use super::{TooltipArgs, EXIT_ERROR, EXIT_INVALID_ARGS, EXIT_SUCCESS};

/// Everything the render command was asked to draw
#[derive(Debug, Default)]
pub(super) struct RenderArgs {
    pub item: Option<String>,
    pub lore: Option<String>,
    pub name: Option<String>,
    pub rarity: Option<String>,
    pub item_type: Option<String>,
    pub enchanted: bool,
    pub hover: bool,
    pub durability: Option<i32>,
    pub color: Option<String>,
    pub data: Option<String>,
    pub trim: Option<String>,
    pub big: bool,
    pub head: Option<String>,
    pub timeout: Option<u64>,
    pub tooltip: TooltipArgs,
}

fn parse_rarity(name: Option<&str>) -> std::result::Result<Option<Rarity>, ExitCode> {
    match name {
        None => Ok(None),
        Some(name) => match Rarity::by_name(name) {
            Some(rarity) => Ok(Some(rarity)),
            None => {
                let known: Vec<&str> = Rarity::all().iter().map(|r| r.name).collect();
                eprintln!("Error: Unknown rarity '{}'. Expected one of: {}", name, known.join(", "));
                Err(ExitCode::from(EXIT_INVALID_ARGS))
            }
        },
    }
}

pub(super) fn load_generator(config_path: Option<&Path>, overrides: &CliOverrides) -> Result<Generator> {
    let mut config: Config = load_config(config_path)?;
    merge_cli_overrides(&mut config, overrides)?;
    let context = Context::init(&config)?;
    Generator::new(Arc::new(context))
}

/// Tooltip settings: configured defaults, then the command-line flags
fn tooltip_settings(base: TooltipSettings, args: &TooltipArgs) -> TooltipSettings {
    TooltipSettings {
        centered: args.centered,
        border: !args.no_border,
        first_line_padding: !args.no_first_line_padding,
        alpha: args.alpha.unwrap_or(base.alpha),
        padding: args.padding.unwrap_or(base.padding),
        scale: args.scale.unwrap_or(base.scale),
        frame_count: args.frames.unwrap_or(base.frame_count),
        seed: args.seed.or(base.seed),
        ..base
    }
}

fn render_requests(args: &RenderArgs, rarity: Option<Rarity>, settings: TooltipSettings) -> Vec<GenerationRequest> {
    let mut requests = Vec::new();

    if let Some(skin) = &args.head {
        requests.push(GenerationRequest::Head(HeadRequest { skin: skin.clone(), big_image: args.big }));
    } else if let Some(item) = &args.item {
        requests.push(GenerationRequest::Item(ItemRequest {
            item_id: item.clone(),
            data: args.data.clone(),
            color: args.color.clone(),
            enchanted: args.enchanted,
            hover: args.hover,
            big_image: args.big,
            durability: args.durability,
            armor_trim: args.trim.clone(),
        }));
    }

    if args.lore.is_some() || args.name.is_some() {
        requests.push(GenerationRequest::Tooltip(TooltipRequest {
            name: args.name.clone(),
            lore: args.lore.clone().unwrap_or_default(),
            rarity,
            item_type: args.item_type.clone(),
            max_line_length: args.tooltip.max_line_length.map(|len| len as usize),
            settings: Some(settings),
        }));
    }
    requests
}

/// Execute the render command
pub(super) fn run_render(config_path: Option<&Path>, args: RenderArgs, output: &Path) -> ExitCode {
    let rarity = match parse_rarity(args.rarity.as_deref()) {
        Ok(rarity) => rarity,
        Err(code) => return code,
    };
    if args.item.is_none() && args.head.is_none() && args.lore.is_none() && args.name.is_none() {
        eprintln!("Error: Nothing to render. Pass an item id, --head, --lore or --name");
        return ExitCode::from(EXIT_INVALID_ARGS);
    }

    let overrides = CliOverrides {
        scale: args.tooltip.scale,
        timeout_ms: args.timeout,
        ..Default::default()
    };
    let generator = match load_generator(config_path, &overrides) {
        Ok(generator) => generator,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::from(EXIT_ERROR);
        }
    };

    let settings = tooltip_settings(generator.context().tooltip_settings(), &args.tooltip);
    let requests = render_requests(&args, rarity, settings);
    match generator.generate(requests).and_then(|result| write_output(&result, output)) {
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

/// Files named by `input`: the path itself when it exists, else glob matches
fn collect_inputs(input: &str) -> Result<Vec<PathBuf>> {
    let path = Path::new(input);
    if path.is_file() {
        return Ok(vec![path.to_path_buf()]);
    }
    let paths = glob(input).map_err(|e| GeneratorError::invalid(format!("Invalid pattern '{}': {}", input, e)))?;
    let mut files: Vec<PathBuf> = paths.filter_map(std::result::Result::ok).filter(|p| p.is_file()).collect();
    files.sort();
    if files.is_empty() {
        return Err(GeneratorError::not_found(format!("No files matched '{}'", input)));
    }
    Ok(files)
}

fn render_file(generator: &Generator, file: &Path, rarity: Option<Rarity>, output: PathBuf) -> Result<PathBuf> {
    let json = std::fs::read_to_string(file)?;
    let parsed = parse_item(&json, generator.context().templates())?;
    tracing::info!("Rendering '{}' ({} dialect) from {}", parsed.item_id, parsed.dialect, file.display());
    let result = generator.generate_item(&parsed, rarity)?;
    write_output(&result, &output)
}

/// Execute the nbt command
pub(super) fn run_nbt(
    config_path: Option<&Path>,
    input: &str,
    output: Option<&Path>,
    rarity: Option<&str>,
    dry_run: bool,
    timeout: Option<u64>,
) -> ExitCode {
    let rarity = match parse_rarity(rarity) {
        Ok(rarity) => rarity,
        Err(code) => return code,
    };
    let files = match collect_inputs(input) {
        Ok(files) => files,
        Err(GeneratorError::InvalidInput(message)) => {
            eprintln!("Error: {}", message);
            return ExitCode::from(EXIT_INVALID_ARGS);
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::from(EXIT_ERROR);
        }
    };

    if dry_run {
        return print_descriptions(&files);
    }

    let overrides = CliOverrides { timeout_ms: timeout, ..Default::default() };
    let generator = match load_generator(config_path, &overrides) {
        Ok(generator) => generator,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::from(EXIT_ERROR);
        }
    };

    let single = files.len() == 1;
    let mut failures = 0;
    for file in &files {
        let target = generate_output_path(file, output, single);
        match render_file(&generator, file, rarity, target) {
            Ok(path) => println!("Saved: {}", path.display()),
            Err(e) => {
                eprintln!("Error: {}: {}", file.display(), e);
                failures += 1;
            }
        }
    }

    if failures > 0 {
        eprintln!("{} of {} file(s) failed", failures, files.len());
        ExitCode::from(EXIT_ERROR)
    } else {
        ExitCode::from(EXIT_SUCCESS)
    }
}

fn print_descriptions(files: &[PathBuf]) -> ExitCode {
    let templates = match TemplateEngine::new() {
        Ok(templates) => templates,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::from(EXIT_ERROR);
        }
    };
    let mut failed = false;
    for file in files {
        let parsed = std::fs::read_to_string(file)
            .map_err(GeneratorError::from)
            .and_then(|json| parse_item(&json, &templates));
        match parsed {
            Ok(parsed) => println!("{}: {:#?}", file.display(), parsed),
            Err(e) => {
                eprintln!("Error: {}: {}", file.display(), e);
                failed = true;
            }
        }
    }
    ExitCode::from(if failed { EXIT_ERROR } else { EXIT_SUCCESS })
}
