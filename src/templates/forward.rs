//! `%%NAME%%` / `%%NAME:EXTRA%%` expansion

use regex::{Captures, Regex};

use super::data::{self, Gemstone, Icon, TemplateEntry, ENTRY_FIELDS, GEMSTONE_TIERS};
use crate::color::{ChatFormat, AMPERSAND_SYMBOL};

pub(super) const INVALID_FORMAT: &str = "[INVALID FORMAT]";

/// Shared formatting-code placeholders: `{red}` -> `c`, `{ampersand}` -> `&`
pub(super) fn base_placeholder(token: &str) -> Option<String> {
    if token.eq_ignore_ascii_case("ampersand") {
        return Some(AMPERSAND_SYMBOL.to_string());
    }
    ChatFormat::by_name(token).map(|format| format.code().to_string())
}

/// Value of an entry field token, `None` if the token is not a field
pub(super) fn entry_field(entry: &TemplateEntry, token: &str) -> Option<Option<String>> {
    ENTRY_FIELDS.iter().find(|(key, _)| key.eq_ignore_ascii_case(token)).map(|(_, get)| get(entry))
}

/// Replace every `{token}` in `format`; unknown tokens are kept verbatim.
pub(super) fn substitute<F>(placeholder: &Regex, format: &str, resolve: F) -> String
where
    F: Fn(&str) -> Option<String>,
{
    placeholder
        .replace_all(format, |caps: &Captures| resolve(&caps[1]).unwrap_or_else(|| caps[0].to_string()))
        .into_owned()
}

/// Format a stat or flavor entry, or one of the bracketed error markers.
pub(super) fn format_entry(placeholder: &Regex, entry: &TemplateEntry, extra: Option<&str>) -> Option<String> {
    let parse_type = match data::parse_type(entry.parse_type) {
        Some(parse_type) => parse_type,
        None => {
            tracing::warn!("Could not find parse type '{}' for '{}'", entry.parse_type, entry.name);
            return None;
        }
    };
    let extra = extra.filter(|e| !e.is_empty());

    let mut parts: Vec<(&str, String)> = Vec::new();
    if let Some([first, second]) = parse_type.parts {
        let Some(extra) = extra else {
            tracing::warn!("Missing extra details for {}: {}", parse_type.name, entry.name);
            return Some(format!("[{}_MISSING_DETAILS]", parse_type.name));
        };
        let Some((head, tail)) = extra.split_once(':') else {
            tracing::warn!("Missing separator ':' in extra details for {}: {}", parse_type.name, extra);
            return Some(format!("[{}_MISSING_SEPARATOR]", parse_type.name));
        };
        parts.push((first, head.to_string()));
        parts.push((second, tail.to_string()));
    }

    let format = if extra.is_some() { parse_type.with_extra } else { parse_type.without_extra };
    let Some(format) = format else {
        tracing::warn!("Format string is missing for parse type: {}", parse_type.name);
        return Some(INVALID_FORMAT.to_string());
    };

    let formatted = substitute(placeholder, format, |token| {
        if token == "extraDetails" {
            return Some(extra.unwrap_or_default().to_string());
        }
        if let Some((_, value)) = parts.iter().find(|(key, _)| *key == token) {
            return Some(value.clone());
        }
        if let Some(value) = entry_field(entry, token) {
            return Some(value.unwrap_or_default());
        }
        base_placeholder(token)
    });
    tracing::trace!("Formatted {} with '{}' as '{}'", entry.name, format, formatted);
    Some(formatted)
}

/// Reset-terminate a formatted entry unless it opens with a bracket marker
pub(super) fn terminate(formatted: String) -> String {
    if formatted.starts_with('[') {
        formatted
    } else {
        format!("{}{}r", formatted, AMPERSAND_SYMBOL)
    }
}

/// Gemstone slot: tier format with the colored icon, or the plain icon when
/// the format already sets a color right before it.
/// A missing or unknown tier gives the plain dark slot.
pub(super) fn format_gemstone(gemstone: &Gemstone, tier: Option<&str>) -> String {
    let plain_slot = || format!("&8[{}]&r", gemstone.icon);
    let Some(tier) = tier else {
        return plain_slot();
    };

    let Some((_, format)) = GEMSTONE_TIERS.iter().find(|(name, _)| name.eq_ignore_ascii_case(tier)) else {
        tracing::warn!("Unknown gemstone tier '{}' for {}", tier, gemstone.name);
        return plain_slot();
    };

    let colored_before = format.find("%s").is_some_and(|index| {
        let before: Vec<char> = format[..index].chars().collect();
        matches!(before.as_slice(), [.., marker, code] if *marker == AMPERSAND_SYMBOL && code.is_ascii_hexdigit())
    });
    let icon = if colored_before { gemstone.icon.to_string() } else { gemstone.formatted_icon() };
    format.replace("%s", &icon)
}

/// Inline icon, repeated `count` times
pub(super) fn format_icon(icon: &Icon, count: Option<&str>) -> String {
    let repeat = match count.map(str::trim) {
        None => 1,
        Some(value) => match value.parse::<usize>() {
            Ok(n) if n > 0 => n,
            _ => {
                tracing::warn!("Invalid repeat count '{}' for icon {}", value, icon.name);
                1
            }
        },
    };
    icon.icon.repeat(repeat)
}
