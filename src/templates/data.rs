//! Compile-time template catalogues
//!
//! Stats and flavor lines are formatted through a [`ParseType`]; gemstones
//! and icons carry their own glyphs.

use crate::color::ChatFormat;
use ChatFormat::*;

/// A pair of format strings with `{token}` placeholders
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParseType {
    pub name: &'static str,
    pub with_extra: Option<&'static str>,
    pub without_extra: Option<&'static str>,
    /// Tokens filled from an extra of the form `first:second`
    pub parts: Option<[&'static str; 2]>,
}

/// A stat or flavor entry resolved through a parse type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TemplateEntry {
    pub name: &'static str,
    pub icon: &'static str,
    pub stat: &'static str,
    pub display: &'static str,
    pub color: ChatFormat,
    pub sub_color: Option<ChatFormat>,
    pub parse_type: &'static str,
}

impl TemplateEntry {
    /// Falls back to the main color
    pub fn secondary_color(&self) -> ChatFormat {
        self.sub_color.unwrap_or(self.color)
    }
}

/// Accessor for one `{token}` of an entry
pub type FieldAccessor = fn(&TemplateEntry) -> Option<String>;

fn non_empty(value: &str) -> Option<String> {
    (!value.is_empty()).then(|| value.to_string())
}

/// Per-entry tokens usable in a format string
pub const ENTRY_FIELDS: [(&str, FieldAccessor); 7] = [
    ("name", |e| non_empty(e.name)),
    ("icon", |e| non_empty(e.icon)),
    ("stat", |e| non_empty(e.stat)),
    ("display", |e| non_empty(e.display)),
    ("color", |e| Some(e.color.code().to_string())),
    ("subColor", |e| Some(e.secondary_color().code().to_string())),
    ("parseType", |e| non_empty(e.parse_type)),
];

pub static PARSE_TYPES: &[ParseType] = &[
    ParseType {
        name: "NORMAL",
        with_extra: Some("&7{stat}: &{color}{extraDetails}"),
        without_extra: Some("&{color}{icon} {stat}"),
        parts: None,
    },
    ParseType {
        name: "BOLD",
        with_extra: Some("&{color}&l{stat} &{subColor}{extraDetails}"),
        without_extra: Some("&{color}&l{stat}"),
        parts: None,
    },
    ParseType {
        name: "BOLD_ICON",
        with_extra: Some("&{color}&l{icon} &{subColor}{extraDetails} {stat}"),
        without_extra: Some("&{color}&l{icon} {stat}"),
        parts: None,
    },
    ParseType {
        name: "DUAL",
        with_extra: Some("&{color}{icon} {extraDetails} &{subColor}{stat}"),
        without_extra: Some("&{color}{icon} &{subColor}{stat}"),
        parts: None,
    },
    ParseType {
        name: "POST",
        with_extra: Some("&7{stat}: &{color}+{extraDetails}"),
        without_extra: Some("&7{stat}"),
        parts: None,
    },
    ParseType {
        name: "POST_DUAL",
        with_extra: Some("&7{stat}: &{color}+{extraDetails} &{subColor}{icon}"),
        without_extra: Some("&7{stat} &{subColor}{icon}"),
        parts: None,
    },
    ParseType {
        name: "SOULBOUND",
        with_extra: Some("&{color}* {extraDetails} {stat} *"),
        without_extra: Some("&{color}* {stat} *"),
        parts: None,
    },
    ParseType {
        name: "ITEM_STAT",
        with_extra: Some("&{color}{itemStat}: &7{amount}"),
        without_extra: None,
        parts: Some(["itemStat", "amount"]),
    },
    ParseType {
        name: "ABILITY",
        with_extra: Some("&{color}{stat}: {abilityName} &{subColor}&l{abilityType}"),
        without_extra: None,
        parts: Some(["abilityName", "abilityType"]),
    },
    ParseType {
        name: "FLAVOR",
        with_extra: Some("&{color}{display} &{subColor}{extraDetails}"),
        without_extra: Some("&{color}{display}"),
        parts: None,
    },
];

const fn entry(
    name: &'static str,
    icon: &'static str,
    stat: &'static str,
    color: ChatFormat,
    sub_color: Option<ChatFormat>,
    parse_type: &'static str,
) -> TemplateEntry {
    TemplateEntry { name, icon, stat, display: stat, color, sub_color, parse_type }
}

const fn flavor(
    name: &'static str,
    display: &'static str,
    color: ChatFormat,
    sub_color: Option<ChatFormat>,
    parse_type: &'static str,
) -> TemplateEntry {
    TemplateEntry { name, icon: "", stat: display, display, color, sub_color, parse_type }
}

pub static STATS: &[TemplateEntry] = &[
    entry("HEALTH", "❤", "Health", Red, None, "NORMAL"),
    entry("DEFENSE", "❈", "Defense", Green, None, "NORMAL"),
    entry("TRUE_DEFENSE", "❂", "True Defense", White, None, "NORMAL"),
    entry("STRENGTH", "❁", "Strength", Red, None, "NORMAL"),
    entry("INTELLIGENCE", "✎", "Intelligence", Aqua, None, "NORMAL"),
    entry("CRIT_CHANCE", "☣", "Crit Chance", Blue, None, "NORMAL"),
    entry("CRIT_DAMAGE", "☠", "Crit Damage", Blue, None, "NORMAL"),
    entry("SPEED", "✦", "Speed", White, None, "NORMAL"),
    entry("ATTACK_SPEED", "⚔", "Bonus Attack Speed", Yellow, None, "NORMAL"),
    entry("FEROCITY", "⫽", "Ferocity", Red, None, "NORMAL"),
    entry("MAGIC_FIND", "✯", "Magic Find", Aqua, None, "NORMAL"),
    entry("PET_LUCK", "♣", "Pet Luck", LightPurple, None, "NORMAL"),
    entry("SEA_CREATURE_CHANCE", "α", "Sea Creature Chance", DarkAqua, None, "NORMAL"),
    entry("ABILITY_DAMAGE", "๑", "Ability Damage", Red, None, "NORMAL"),
    entry("HEALTH_REGEN", "❣", "Health Regen", Red, None, "NORMAL"),
    entry("VITALITY", "♨", "Vitality", DarkRed, None, "NORMAL"),
    entry("MENDING", "☄", "Mending", Green, None, "NORMAL"),
    entry("MINING_SPEED", "⸕", "Mining Speed", Gold, None, "NORMAL"),
    entry("MINING_FORTUNE", "☘", "Mining Fortune", Gold, None, "NORMAL"),
    entry("DAMAGE", "❁", "Damage", Red, None, "POST"),
    entry("GEAR_SCORE", "⚚", "Gear Score", LightPurple, Some(DarkGray), "POST_DUAL"),
    entry("RIFT_TIME", "ф", "Rift Time", Green, Some(Gray), "DUAL"),
    entry("RARE_DROP", "", "RARE DROP!", Gold, Some(Aqua), "BOLD"),
    entry("OVERFLOW_MANA", "ʬ", "Overflow Mana", DarkAqua, Some(Aqua), "BOLD_ICON"),
    entry("ITEM_STAT_RED", "", "", Red, None, "ITEM_STAT"),
    entry("ITEM_STAT_GREEN", "", "", Green, None, "ITEM_STAT"),
    entry("ITEM_STAT_PURPLE", "", "", DarkPurple, None, "ITEM_STAT"),
];

pub static FLAVORS: &[TemplateEntry] = &[
    flavor("REQUIRE", "Requires", Red, Some(DarkPurple), "FLAVOR"),
    flavor("RECIPE", "Right-click to view recipes!", Yellow, None, "FLAVOR"),
    flavor("SOULBOUND", "Soulbound", DarkGray, None, "SOULBOUND"),
    flavor("ABILITY", "Ability", Gold, Some(Yellow), "ABILITY"),
    flavor("MANA_COST", "Mana Cost:", DarkGray, Some(DarkAqua), "FLAVOR"),
    flavor("COOLDOWN", "Cooldown:", DarkGray, Some(Green), "FLAVOR"),
    flavor("COMBAT_SKILL", "Combat Skill", Gray, Some(Gold), "FLAVOR"),
    flavor("REFORGEABLE", "This item can be reforged!", DarkGray, None, "FLAVOR"),
];

/// A gemstone slot glyph
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Gemstone {
    pub name: &'static str,
    pub icon: &'static str,
    pub color: ChatFormat,
}

impl Gemstone {
    /// Icon prefixed with the gemstone's color code
    pub fn formatted_icon(&self) -> String {
        format!("{}{}", self.color.legacy(), self.icon)
    }
}

/// Gemstone tier formats; `%s` is the gemstone icon
pub static GEMSTONE_TIERS: &[(&str, &str)] = &[
    ("rough", "&f[%s&f]"),
    ("flawed", "&a[%s&a]"),
    ("fine", "&9[%s&9]"),
    ("flawless", "&5[%s&5]"),
    ("perfect", "&6[%s&6]"),
    ("unlocked", "&8[&7%s&8]"),
];

pub static GEMSTONES: &[Gemstone] = &[
    Gemstone { name: "GEM_RUBY", icon: "❤", color: Red },
    Gemstone { name: "GEM_AMETHYST", icon: "❈", color: DarkPurple },
    Gemstone { name: "GEM_JADE", icon: "☘", color: Green },
    Gemstone { name: "GEM_SAPPHIRE", icon: "✎", color: Aqua },
    Gemstone { name: "GEM_AMBER", icon: "⸕", color: Gold },
    Gemstone { name: "GEM_TOPAZ", icon: "✧", color: Yellow },
    Gemstone { name: "GEM_JASPER", icon: "❁", color: LightPurple },
    Gemstone { name: "GEM_OPAL", icon: "❂", color: White },
    Gemstone { name: "GEM_ONYX", icon: "☠", color: DarkGray },
    Gemstone { name: "GEM_AQUAMARINE", icon: "α", color: DarkAqua },
    Gemstone { name: "GEM_CITRINE", icon: "☘", color: DarkRed },
    Gemstone { name: "GEM_PERIDOT", icon: "☘", color: DarkGreen },
    Gemstone { name: "GEM_COMBAT", icon: "⚔", color: DarkRed },
    Gemstone { name: "GEM_DEFENSIVE", icon: "☤", color: Green },
    Gemstone { name: "GEM_MINING", icon: "✦", color: DarkPurple },
    Gemstone { name: "GEM_UNIVERSAL", icon: "❂", color: White },
];

/// An inline glyph, optionally repeated
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Icon {
    pub name: &'static str,
    pub icon: &'static str,
}

pub static ICONS: &[Icon] = &[
    Icon { name: "DOT", icon: "•" },
    Icon { name: "STAR", icon: "✪" },
    Icon { name: "MASTER_STAR", icon: "➊" },
    Icon { name: "TICKER", icon: "Ⓞ" },
    Icon { name: "CHECKMARK", icon: "✔" },
    Icon { name: "CROSS", icon: "✖" },
    Icon { name: "ARROW", icon: "➜" },
    Icon { name: "DIAMOND", icon: "◆" },
];

pub fn parse_type(name: &str) -> Option<&'static ParseType> {
    PARSE_TYPES.iter().find(|p| p.name.eq_ignore_ascii_case(name))
}

pub fn stat(name: &str) -> Option<&'static TemplateEntry> {
    STATS.iter().find(|s| s.name.eq_ignore_ascii_case(name))
}

pub fn flavor_by_name(name: &str) -> Option<&'static TemplateEntry> {
    FLAVORS.iter().find(|f| f.name.eq_ignore_ascii_case(name))
}

pub fn gemstone(name: &str) -> Option<&'static Gemstone> {
    GEMSTONES.iter().find(|g| g.name.eq_ignore_ascii_case(name))
}

pub fn icon(name: &str) -> Option<&'static Icon> {
    ICONS.iter().find(|i| i.name.eq_ignore_ascii_case(name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_every_entry_has_a_parse_type() {
        for entry in STATS.iter().chain(FLAVORS) {
            assert!(parse_type(entry.parse_type).is_some(), "{} has no parse type", entry.name);
        }
    }

    #[test]
    fn test_names_are_unique_across_catalogues() {
        let names: Vec<&str> = STATS
            .iter()
            .chain(FLAVORS)
            .map(|e| e.name)
            .chain(GEMSTONES.iter().map(|g| g.name))
            .chain(ICONS.iter().map(|i| i.name))
            .collect();
        let unique: HashSet<&str> = names.iter().copied().collect();
        assert_eq!(unique.len(), names.len());
    }

    #[test]
    fn test_lookup_is_case_insensitive() {
        assert_eq!(stat("health").map(|s| s.stat), Some("Health"));
        assert_eq!(flavor_by_name("Soulbound").map(|f| f.color), Some(DarkGray));
        assert_eq!(gemstone("gem_ruby").map(|g| g.formatted_icon()), Some("&c❤".to_string()));
        assert_eq!(icon("star").map(|i| i.icon), Some("✪"));
    }

    #[test]
    fn test_field_accessors() {
        let health = stat("HEALTH").unwrap();
        let field = |token: &str| ENTRY_FIELDS.iter().find(|(key, _)| *key == token).and_then(|(_, get)| get(health));
        assert_eq!(field("color"), Some("c".to_string()));
        assert_eq!(field("subColor"), Some("c".to_string()));
        assert_eq!(field("icon"), Some("❤".to_string()));
        assert_eq!(field("stat"), Some("Health".to_string()));
    }
}
