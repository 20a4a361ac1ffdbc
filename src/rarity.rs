//! Item rarities and their tooltip decorations

use crate::color::ChatFormat;

/// A rarity tier shown in the tooltip footer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rarity {
    pub name: &'static str,
    pub display: &'static str,
    pub color: ChatFormat,
}

const RARITIES: &[Rarity] = &[
    Rarity { name: "COMMON", display: "COMMON", color: ChatFormat::White },
    Rarity { name: "UNCOMMON", display: "UNCOMMON", color: ChatFormat::Green },
    Rarity { name: "RARE", display: "RARE", color: ChatFormat::Blue },
    Rarity { name: "EPIC", display: "EPIC", color: ChatFormat::DarkPurple },
    Rarity { name: "LEGENDARY", display: "LEGENDARY", color: ChatFormat::Gold },
    Rarity { name: "MYTHIC", display: "MYTHIC", color: ChatFormat::LightPurple },
    Rarity { name: "DIVINE", display: "DIVINE", color: ChatFormat::Aqua },
    Rarity { name: "SPECIAL", display: "SPECIAL", color: ChatFormat::Red },
    Rarity { name: "VERY_SPECIAL", display: "VERY SPECIAL", color: ChatFormat::Red },
    Rarity { name: "ULTIMATE", display: "ULTIMATE", color: ChatFormat::DarkRed },
    Rarity { name: "ADMIN", display: "ADMIN", color: ChatFormat::DarkRed },
    Rarity { name: "NONE", display: "NONE", color: ChatFormat::Gray },
];

impl Rarity {
    /// Find a rarity by name or display text, ignoring case
    pub fn by_name(name: &str) -> Option<Rarity> {
        RARITIES
            .iter()
            .find(|r| r.name.eq_ignore_ascii_case(name) || r.display.eq_ignore_ascii_case(name))
            .copied()
    }

    pub fn all() -> &'static [Rarity] {
        RARITIES
    }

    /// The placeholder rarity that adds no decoration
    pub fn is_none(&self) -> bool {
        self.name == "NONE"
    }

    pub fn color_code(&self) -> String {
        self.color.legacy()
    }

    /// Bold, colored display text used for the footer line
    pub fn formatted_display(&self) -> String {
        format!("{}{}{}", self.color_code(), ChatFormat::Bold.legacy(), self.display)
    }
}
