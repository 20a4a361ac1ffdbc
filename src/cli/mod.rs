//! Command-line interface implementation
//!
//! This module provides the CLI entry point and dispatches to submodules
//! for specific command implementations.

mod inventory;
mod list;
mod render;
mod text;

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;

use tracing::Level;

pub use list::ListKind;

pub(crate) const EXIT_SUCCESS: u8 = 0;
pub(crate) const EXIT_ERROR: u8 = 1;
pub(crate) const EXIT_INVALID_ARGS: u8 = 2;

/// Tooltipgen - render item tooltips and sprites to PNG or GIF
#[derive(Parser, Debug)]
#[command(name = "tooltipgen")]
#[command(about = "Render item tooltips, sprites and player heads to PNG or animated GIF")]
#[command(version)]
pub struct Cli {
    /// Path to tooltipgen.toml (default: discovered from the working directory)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// More log output (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Only log errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Tooltip layout flags shared by the render commands
#[derive(Args, Debug, Clone, Default)]
pub struct TooltipArgs {
    /// Center every line
    #[arg(long)]
    pub centered: bool,

    /// Draw without the purple border
    #[arg(long)]
    pub no_border: bool,

    /// Skip the extra gap under the first line
    #[arg(long)]
    pub no_first_line_padding: bool,

    /// Background alpha (0-255)
    #[arg(long)]
    pub alpha: Option<u8>,

    /// Transparent padding around the tooltip, in pixels
    #[arg(long)]
    pub padding: Option<u32>,

    /// Wrap width in visible characters (1-128)
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..=128))]
    pub max_line_length: Option<u32>,

    /// Tooltip scale factor (1-16)
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..=16))]
    pub scale: Option<u32>,

    /// Seed for obfuscated text, for reproducible output
    #[arg(long)]
    pub seed: Option<u64>,

    /// Frames rendered for obfuscated text
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
    pub frames: Option<u32>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Render an item sprite, a player head and/or a tooltip
    Render {
        /// Item id to draw (e.g. diamond_sword)
        item: Option<String>,

        /// Lore text with & color codes and %%PLACEHOLDERS%%
        #[arg(short, long)]
        lore: Option<String>,

        /// Item name shown on the first tooltip line
        #[arg(short, long)]
        name: Option<String>,

        /// Rarity footer (e.g. LEGENDARY)
        #[arg(short, long)]
        rarity: Option<String>,

        /// Item type appended to the rarity footer
        #[arg(long = "type")]
        item_type: Option<String>,

        /// Add the enchantment glint
        #[arg(long)]
        enchanted: bool,

        /// Add the inventory hover highlight
        #[arg(long)]
        hover: bool,

        /// Remaining durability in percent (0-100)
        #[arg(long)]
        durability: Option<i32>,

        /// Overlay color option or hex color
        #[arg(long)]
        color: Option<String>,

        /// Legacy data value, used as the color option when --color is unset
        #[arg(long)]
        data: Option<String>,

        /// Armor trim material
        #[arg(long)]
        trim: Option<String>,

        /// Enlarge small sprites and heads
        #[arg(long)]
        big: bool,

        /// Player head skin: texture hash, base64 profile or player name
        #[arg(long)]
        head: Option<String>,

        /// Output file; the extension follows the output (.png or .gif)
        #[arg(short, long, default_value = "tooltip.png")]
        output: PathBuf,

        /// Time budget in milliseconds
        #[arg(long)]
        timeout: Option<u64>,

        #[command(flatten)]
        tooltip: TooltipArgs,
    },
    /// Render items from JSON metadata files
    Nbt {
        /// JSON file or glob pattern (e.g. "items/*.json")
        input: String,

        /// Output file or directory (ends with /)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Rarity footer for every item
        #[arg(short, long)]
        rarity: Option<String>,

        /// Print the parsed description instead of rendering
        #[arg(long)]
        dry_run: bool,

        /// Time budget in milliseconds
        #[arg(long)]
        timeout: Option<u64>,
    },
    /// Render an inventory or crafting grid from an inventory string
    Inventory {
        /// Entries like "diamond,enchant:1,16%%stick:[2,5]" joined by %%
        contents: String,

        /// Slot rows
        #[arg(long, default_value_t = 3)]
        rows: u32,

        /// Slots in each row
        #[arg(long, default_value_t = 9)]
        slots_per_row: u32,

        /// 3x3 crafting grid without the container frame
        #[arg(long)]
        recipe: bool,

        /// Container title
        #[arg(short, long)]
        title: Option<String>,

        /// Draw without the container frame
        #[arg(long)]
        no_border: bool,

        /// Draw without slot wells
        #[arg(long)]
        no_background: bool,

        /// Draw glinting items on their first frame only
        #[arg(long = "static")]
        still: bool,

        /// Output pixels per GUI pixel (1-16)
        #[arg(long, value_parser = clap::value_parser!(u32).range(1..=16))]
        scale: Option<u32>,

        /// Tooltip of the hovered item, drawn next to the grid
        #[arg(short, long)]
        lore: Option<String>,

        /// Output file; the extension follows the output (.png or .gif)
        #[arg(short, long, default_value = "inventory.png")]
        output: PathBuf,

        /// Time budget in milliseconds
        #[arg(long)]
        timeout: Option<u64>,
    },
    /// List available item ids, color options or trim materials
    List {
        #[arg(value_enum)]
        kind: ListKind,

        /// Only names containing this text
        query: Option<String>,
    },
    /// Expand %%PLACEHOLDERS%% into formatted text
    Expand {
        /// Text to expand (default: read stdin)
        text: Option<String>,
    },
    /// Map formatted text back to %%PLACEHOLDERS%%
    Reverse {
        /// Text to map (default: read stdin)
        text: Option<String>,
    },
}

/// Log level for the verbosity flags
pub fn log_level(verbose: u8, quiet: bool) -> Level {
    if quiet {
        return Level::ERROR;
    }
    match verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    }
}

fn init_logging(level: Level) {
    // A subscriber may already be installed when embedded
    let _ = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_max_level(level)
        .with_target(false)
        .try_init();
}

/// Parse arguments and run the chosen command
pub fn run() -> ExitCode {
    let cli = Cli::parse();
    init_logging(log_level(cli.verbose, cli.quiet));
    let config = cli.config.as_deref();

    match cli.command {
        Commands::Render {
            item,
            lore,
            name,
            rarity,
            item_type,
            enchanted,
            hover,
            durability,
            color,
            data,
            trim,
            big,
            head,
            output,
            timeout,
            tooltip,
        } => render::run_render(
            config,
            render::RenderArgs {
                item,
                lore,
                name,
                rarity,
                item_type,
                enchanted,
                hover,
                durability,
                color,
                data,
                trim,
                big,
                head,
                timeout,
                tooltip,
            },
            &output,
        ),
        Commands::Nbt { input, output, rarity, dry_run, timeout } => {
            render::run_nbt(config, &input, output.as_deref(), rarity.as_deref(), dry_run, timeout)
        }
        Commands::Inventory {
            contents,
            rows,
            slots_per_row,
            recipe,
            title,
            no_border,
            no_background,
            still,
            scale,
            lore,
            output,
            timeout,
        } => inventory::run_inventory(
            config,
            inventory::InventoryArgs {
                contents,
                rows,
                slots_per_row,
                recipe,
                title,
                no_border,
                no_background,
                still,
                scale,
                lore,
                timeout,
            },
            &output,
        ),
        Commands::List { kind, query } => list::run_list(config, kind, query.as_deref()),
        Commands::Expand { text } => text::run_expand(text.as_deref()),
        Commands::Reverse { text } => text::run_reverse(text.as_deref()),
    }
}
