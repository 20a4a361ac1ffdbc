//! Lore placeholders
//!
//! Forward expansion turns `%%HEALTH:100%%` into formatted chat text using
//! the catalogues in [`data`]. The reverse direction maps rendered text back
//! to placeholders on a best-effort basis.
//!
//! ```
//! use tooltipgen::templates::TemplateEngine;
//!
//! let engine = TemplateEngine::new().unwrap();
//! let expanded = engine.expand("%%HEALTH:100%%");
//! assert_eq!(expanded, "&7Health: &c100&r");
//! assert_eq!(engine.reverse(&expanded), "%%HEALTH:100%%");
//! ```

pub mod data;
mod forward;
mod reverse;

pub use reverse::ReverseRule;

use regex::{Captures, Regex};

use crate::error::{GeneratorError, Result};

const TOKEN_PATTERN: &str = r"%%([A-Za-z0-9_]+)(?::([^%\n]+))?%%";
const PLACEHOLDER_PATTERN: &str = r"\{([^}]+)}";

/// Compiled forward and reverse template rules, built once and shared.
#[derive(Debug, Clone)]
pub struct TemplateEngine {
    token: Regex,
    placeholder: Regex,
    rules: Vec<ReverseRule>,
}

impl TemplateEngine {
    pub fn new() -> Result<Self> {
        let compile =
            |pattern: &str| Regex::new(pattern).map_err(|e| GeneratorError::internal("Template pattern", e));
        let placeholder = compile(PLACEHOLDER_PATTERN)?;
        let rules = reverse::build_rules(&placeholder)?;
        tracing::info!("Initialized placeholder reverse mapper with {} rules", rules.len());
        Ok(Self { token: compile(TOKEN_PATTERN)?, placeholder, rules })
    }

    /// Expand every known placeholder in `input`. Unknown names are kept.
    pub fn expand(&self, input: &str) -> String {
        if input.trim().is_empty() {
            return input.to_string();
        }
        self.token
            .replace_all(input, |caps: &Captures| {
                let extra = caps.get(2).map(|m| m.as_str());
                self.expand_token(&caps[1], extra).unwrap_or_else(|| {
                    tracing::debug!("Unknown placeholder '{}'", &caps[0]);
                    caps[0].to_string()
                })
            })
            .into_owned()
    }

    /// Resolve one placeholder: stats, flavors, gemstones, then icons.
    pub fn expand_token(&self, name: &str, extra: Option<&str>) -> Option<String> {
        if let Some(entry) = data::stat(name).or_else(|| data::flavor_by_name(name)) {
            tracing::debug!("Found placeholder '{}' with extra data: {:?}", entry.name, extra);
            return forward::format_entry(&self.placeholder, entry, extra).map(forward::terminate);
        }
        if let Some(gemstone) = data::gemstone(name) {
            return Some(forward::format_gemstone(gemstone, extra));
        }
        data::icon(name).map(|icon| forward::format_icon(icon, extra))
    }

    /// Map rendered text back to placeholders, line by line.
    pub fn reverse(&self, input: &str) -> String {
        reverse::map_placeholders(&self.rules, input)
    }

    pub fn rules(&self) -> &[ReverseRule] {
        &self.rules
    }
}
