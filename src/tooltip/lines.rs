//! Assembles the name, lore and rarity footer into tooltip lines

use crate::rarity::Rarity;
use crate::text::{wrap_string, LineSegment};

/// Default wrap width, in visible characters
pub const DEFAULT_MAX_LINE_LENGTH: usize = 36;
/// Inclusive bounds for the wrap width
pub const MAX_LINE_LENGTH_RANGE: (usize, usize) = (1, 128);

/// Text content of one tooltip, already template-expanded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TooltipText {
    pub name: Option<String>,
    pub lore: String,
    pub rarity: Option<Rarity>,
    /// Item type appended to the rarity footer, e.g. "SWORD"
    pub item_type: Option<String>,
    pub max_line_length: usize,
}

impl Default for TooltipText {
    fn default() -> Self {
        Self {
            name: None,
            lore: String::new(),
            rarity: None,
            item_type: None,
            max_line_length: DEFAULT_MAX_LINE_LENGTH,
        }
    }
}

/// Clamp a requested wrap width into the supported range
pub fn clamp_line_length(value: usize) -> usize {
    value.clamp(MAX_LINE_LENGTH_RANGE.0, MAX_LINE_LENGTH_RANGE.1)
}

impl TooltipText {
    pub fn lore(lore: impl Into<String>) -> Self {
        Self { lore: lore.into(), ..Self::default() }
    }

    fn decorating_rarity(&self) -> Option<Rarity> {
        self.rarity.filter(|r| !r.is_none())
    }

    /// Build the ordered tooltip lines: optional name, wrapped lore, then the
    /// rarity footer.
    pub fn to_lines(&self) -> Vec<LineSegment> {
        let mut lines = Vec::new();
        let rarity = self.decorating_rarity();

        if let Some(name) = self.name.as_deref().filter(|n| !n.is_empty()) {
            let name = match rarity {
                Some(rarity) => format!("{}{}", rarity.color_code(), name),
                None => name.to_string(),
            };
            lines.extend(LineSegment::parse_lines(&name));
        }

        for line in wrap_string(&self.lore, clamp_line_length(self.max_line_length)) {
            lines.extend(LineSegment::parse_lines(&line));
        }

        if let Some(rarity) = rarity {
            let footer = match self.item_type.as_deref().filter(|t| !t.is_empty()) {
                Some(item_type) => format!("{} {}", rarity.formatted_display(), item_type),
                None => rarity.formatted_display(),
            };
            lines.extend(LineSegment::parse_lines(&footer));
        }

        lines
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::ChatFormat;

    #[test]
    fn test_name_lore_and_footer_order() {
        let text = TooltipText {
            name: Some("Aspect of the End".into()),
            lore: "&7Damage: &c+100".into(),
            rarity: Rarity::by_name("RARE"),
            item_type: Some("SWORD".into()),
            ..TooltipText::default()
        };
        let lines = text.to_lines();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0].plain_text(), "Aspect of the End");
        assert_eq!(lines[0].segments[0].style.color, Some(ChatFormat::Blue));
        assert_eq!(lines[1].plain_text(), "Damage: +100");
        assert_eq!(lines[2].plain_text(), "RARE SWORD");
        assert!(lines[2].segments[0].style.bold);
    }

    #[test]
    fn test_none_rarity_adds_no_decoration() {
        let text = TooltipText {
            name: Some("Stick".into()),
            rarity: Rarity::by_name("NONE"),
            ..TooltipText::default()
        };
        let lines = text.to_lines();
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].segments[0].style.color, None);
    }

    #[test]
    fn test_lore_wraps_at_line_length() {
        let mut text = TooltipText::lore("one two three four five six");
        text.max_line_length = 9;
        let lines = text.to_lines();
        assert!(lines.len() > 1);
        for line in &lines {
            assert!(line.plain_text().chars().count() <= 9, "{:?}", line.plain_text());
        }
    }

    #[test]
    fn test_clamp_line_length() {
        assert_eq!(clamp_line_length(0), 1);
        assert_eq!(clamp_line_length(500), 128);
        assert_eq!(clamp_line_length(40), 40);
    }
}
