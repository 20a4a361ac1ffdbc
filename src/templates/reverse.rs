//! Rendered lore back to placeholders
//!
//! Best effort: every template format becomes a regex whose fixed tokens are
//! literals and whose free tokens are lazy captures. Rules are applied in
//! registration order (stats, gemstones, icons, flavors) and formats sharing
//! literal text can shadow each other.

use regex::{Captures, Regex};

use super::data::{self, TemplateEntry, FLAVORS, GEMSTONES, GEMSTONE_TIERS, ICONS, STATS};
use super::forward::{base_placeholder, entry_field};
use crate::color::{AMPERSAND_SYMBOL, SECTION_SYMBOL};
use crate::error::{GeneratorError, Result};

const DEFAULT_CAPTURE: &str = r"[^\n]+?";
const MARKER_CLASS: &str = "[§&]";
const OPTIONAL_RESET: &str = "(?:[§&]r)?";
const RESET_OR_END: &str = "(?:[§&]r|$)";

#[derive(Debug, Clone)]
enum Replacement {
    /// `%%NAME%%` or `%%NAME:part:part%%` from the capture groups
    Template { name: &'static str },
    /// `%%NAME%%` or `%%NAME:count%%`
    Icon { name: &'static str, glyph: &'static str },
    Gemstone { name: &'static str, tier: &'static str },
}

/// One compiled reverse rule
#[derive(Debug, Clone)]
pub struct ReverseRule {
    pattern: Regex,
    replacement: Replacement,
}

impl ReverseRule {
    pub fn pattern(&self) -> &str {
        self.pattern.as_str()
    }

    fn replace(&self, caps: &Captures) -> String {
        match &self.replacement {
            Replacement::Template { name } => {
                let parts: Vec<&str> = caps.iter().skip(1).flatten().map(|m| m.as_str().trim()).collect();
                if parts.is_empty() {
                    format!("%%{}%%", name)
                } else {
                    format!("%%{}:{}%%", name, parts.join(":"))
                }
            }
            Replacement::Icon { name, glyph } => {
                let count = caps[0].chars().count() / glyph.chars().count().max(1);
                if count > 1 {
                    format!("%%{}:{}%%", name, count)
                } else {
                    format!("%%{}%%", name)
                }
            }
            Replacement::Gemstone { name, tier } => format!("%%{}:{}%%", name, tier),
        }
    }

    /// Replace every non-overlapping match in `line`
    pub fn apply(&self, line: &str) -> String {
        self.pattern.replace_all(line, |caps: &Captures| self.replace(caps)).into_owned()
    }
}

/// Escape literal text, letting `&` match either marker
fn escape_literal(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        if c == AMPERSAND_SYMBOL {
            out.push_str(MARKER_CLASS);
        } else {
            out.push_str(&regex::escape(c.encode_utf8(&mut [0; 4])));
        }
    }
    out
}

fn compile(pattern: &str) -> Result<Regex> {
    Regex::new(pattern).map_err(|e| GeneratorError::internal(format!("Invalid reverse rule '{}'", pattern), e))
}

/// Walk a format left to right: resolvable tokens become literals, the
/// rest become captures. Returns the regex source and the capture count.
fn template_pattern(placeholder: &Regex, format: &str, entry: &TemplateEntry) -> (String, usize) {
    let mut regex = String::from("(?i)");
    let mut captures = 0;
    let mut last = 0;
    let mut ends_with_capture = false;

    for caps in placeholder.captures_iter(format) {
        let Some(whole) = caps.get(0) else { continue };
        regex.push_str(&escape_literal(&format[last..whole.start()]));

        let token = &caps[1];
        let value = match entry_field(entry, token) {
            Some(value) => value,
            None => base_placeholder(token),
        };
        match value.filter(|v| !v.is_empty()) {
            Some(value) => {
                regex.push_str(&escape_literal(&value));
                ends_with_capture = false;
            }
            None => {
                regex.push('(');
                regex.push_str(DEFAULT_CAPTURE);
                regex.push(')');
                captures += 1;
                ends_with_capture = whole.end() == format.len();
            }
        }
        last = whole.end();
    }

    regex.push_str(&escape_literal(&format[last..]));
    regex.push_str(if ends_with_capture { RESET_OR_END } else { OPTIONAL_RESET });
    (regex, captures)
}

fn entry_rules(placeholder: &Regex, entries: &'static [TemplateEntry]) -> Result<Vec<ReverseRule>> {
    let mut rules = Vec::new();
    for entry in entries {
        let Some(parse_type) = data::parse_type(entry.parse_type) else {
            tracing::warn!("Missing parse type for '{}'", entry.name);
            continue;
        };
        for format in [parse_type.with_extra, parse_type.without_extra].into_iter().flatten() {
            let (source, _) = template_pattern(placeholder, format, entry);
            rules.push(ReverseRule {
                pattern: compile(&source)?,
                replacement: Replacement::Template { name: entry.name },
            });
        }
    }
    Ok(rules)
}

fn gemstone_rules() -> Result<Vec<ReverseRule>> {
    let mut rules = Vec::new();
    for gemstone in GEMSTONES {
        let icon = format!(
            "(?:{}|{})",
            escape_literal(&gemstone.formatted_icon()),
            escape_literal(gemstone.icon)
        );
        for &(tier, format) in GEMSTONE_TIERS {
            let source: Vec<String> = format.split("%s").map(escape_literal).collect();
            rules.push(ReverseRule {
                pattern: compile(&format!("(?i){}", source.join(icon.as_str())))?,
                replacement: Replacement::Gemstone { name: gemstone.name, tier },
            });
        }
    }
    Ok(rules)
}

fn icon_rules() -> Result<Vec<ReverseRule>> {
    ICONS
        .iter()
        .filter(|icon| !icon.icon.is_empty())
        .map(|icon| {
            Ok(ReverseRule {
                pattern: compile(&format!("(?:{})+", escape_literal(icon.icon)))?,
                replacement: Replacement::Icon { name: icon.name, glyph: icon.icon },
            })
        })
        .collect()
}

/// Every rule in application order
pub(super) fn build_rules(placeholder: &Regex) -> Result<Vec<ReverseRule>> {
    let mut rules = entry_rules(placeholder, STATS)?;
    rules.extend(gemstone_rules()?);
    rules.extend(icon_rules()?);
    rules.extend(entry_rules(placeholder, FLAVORS)?);
    Ok(rules)
}

/// `§` to `&`, line endings to `\n`, then every rule over every line.
pub(super) fn map_placeholders(rules: &[ReverseRule], input: &str) -> String {
    if input.trim().is_empty() {
        return input.to_string();
    }
    let normalized = crate::text::normalize_newlines(&input.replace(SECTION_SYMBOL, &AMPERSAND_SYMBOL.to_string()));
    normalized
        .split('\n')
        .map(|line| rules.iter().fold(line.to_string(), |acc, rule| rule.apply(&acc)))
        .collect::<Vec<_>>()
        .join("\n")
}
