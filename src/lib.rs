//! Tooltipgen - item tooltip and sprite image composition
//!
//! This library provides functionality to:
//! - Lay out legacy-formatted chat text into game-style tooltips
//! - Composite item sprites with color overlays, glint, durability and hover
//! - Expand lore placeholders and map rendered text back to them
//! - Parse item metadata in several schema dialects
//! - Draw inventory and crafting grids from inventory strings
//! - Compose the results into one PNG or looping GIF under a time budget

pub mod cli;
pub mod color;
pub mod config;
pub mod context;
pub mod error;
pub mod font;
pub mod frames;
pub mod generated;
pub mod gif;
pub mod inventory;
pub mod item;
pub mod output;
pub mod pipeline;
mod raster;
pub mod rarity;
pub mod sprite;
pub mod templates;
pub mod text;
pub mod tooltip;
pub mod worker;

pub use context::Context;
pub use error::{GeneratorError, Result};
pub use generated::GeneratedObject;
pub use pipeline::{FinalOutput, GenerationRequest, Generator};
