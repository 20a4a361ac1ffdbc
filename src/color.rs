//! Chat formatting codes and hex color parsing
//!
//! Formatting follows the legacy chat convention: a marker character
//! (`&` or `§`) followed by one code character. Codes `0-9a-f` select a color,
//! `k l m n o` toggle a style and `r` resets.

use image::Rgba;
use thiserror::Error;

/// Marker used in user-supplied text
pub const AMPERSAND_SYMBOL: char = '&';
/// Marker used by the game itself
pub const SECTION_SYMBOL: char = '§';

/// Error type for color parsing failures
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ColorError {
    /// Input string was empty
    #[error("empty color string")]
    Empty,
    /// Input string doesn't start with '#'
    #[error("color must start with '#'")]
    MissingHash,
    /// Invalid length (must be 3, 4, 6, or 8 hex chars after #)
    #[error("invalid color length {0}, expected 3, 4, 6, or 8")]
    InvalidLength(usize),
    /// Contains non-hex characters
    #[error("invalid hex character '{0}'")]
    InvalidHex(char),
}

/// A legacy chat formatting code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChatFormat {
    Black,
    DarkBlue,
    DarkGreen,
    DarkAqua,
    DarkRed,
    DarkPurple,
    Gold,
    Gray,
    DarkGray,
    Blue,
    Green,
    Aqua,
    Red,
    LightPurple,
    Yellow,
    White,
    Obfuscated,
    Bold,
    Strikethrough,
    Underline,
    Italic,
    Reset,
}

/// (format, code, lowercase name, foreground rgb, shadow rgb)
const FORMAT_TABLE: [(ChatFormat, char, &str, u32, u32); 22] = [
    (ChatFormat::Black, '0', "black", 0x000000, 0x000000),
    (ChatFormat::DarkBlue, '1', "dark_blue", 0x0000AA, 0x00002A),
    (ChatFormat::DarkGreen, '2', "dark_green", 0x00AA00, 0x002A00),
    (ChatFormat::DarkAqua, '3', "dark_aqua", 0x00AAAA, 0x002A2A),
    (ChatFormat::DarkRed, '4', "dark_red", 0xAA0000, 0x2A0000),
    (ChatFormat::DarkPurple, '5', "dark_purple", 0xAA00AA, 0x2A002A),
    (ChatFormat::Gold, '6', "gold", 0xFFAA00, 0x2A2A00),
    (ChatFormat::Gray, '7', "gray", 0xAAAAAA, 0x2A2A2A),
    (ChatFormat::DarkGray, '8', "dark_gray", 0x555555, 0x151515),
    (ChatFormat::Blue, '9', "blue", 0x5555FF, 0x15153F),
    (ChatFormat::Green, 'a', "green", 0x55FF55, 0x153F15),
    (ChatFormat::Aqua, 'b', "aqua", 0x55FFFF, 0x153F3F),
    (ChatFormat::Red, 'c', "red", 0xFF5555, 0x3F1515),
    (ChatFormat::LightPurple, 'd', "light_purple", 0xFF55FF, 0x3F153F),
    (ChatFormat::Yellow, 'e', "yellow", 0xFFFF55, 0x3F3F15),
    (ChatFormat::White, 'f', "white", 0xFFFFFF, 0x3F3F3F),
    (ChatFormat::Obfuscated, 'k', "obfuscated", 0, 0),
    (ChatFormat::Bold, 'l', "bold", 0, 0),
    (ChatFormat::Strikethrough, 'm', "strikethrough", 0, 0),
    (ChatFormat::Underline, 'n', "underline", 0, 0),
    (ChatFormat::Italic, 'o', "italic", 0, 0),
    (ChatFormat::Reset, 'r', "reset", 0, 0),
];

impl ChatFormat {
    /// Every format in code order
    pub fn all() -> impl Iterator<Item = ChatFormat> {
        FORMAT_TABLE.iter().map(|entry| entry.0)
    }

    fn entry(&self) -> &'static (ChatFormat, char, &'static str, u32, u32) {
        // The table is exhaustive over the enum, in declaration order.
        &FORMAT_TABLE[*self as usize]
    }

    /// The code character following the marker
    pub fn code(&self) -> char {
        self.entry().1
    }

    /// Lowercase name, as used by JSON text components and template tokens
    pub fn name(&self) -> &'static str {
        self.entry().2
    }

    /// Look up a format by its code character (case-insensitive)
    pub fn of(code: char) -> Option<ChatFormat> {
        let code = code.to_ascii_lowercase();
        FORMAT_TABLE.iter().find(|entry| entry.1 == code).map(|entry| entry.0)
    }

    /// Look up a format by its name (case-insensitive)
    pub fn by_name(name: &str) -> Option<ChatFormat> {
        FORMAT_TABLE.iter().find(|entry| entry.2.eq_ignore_ascii_case(name)).map(|entry| entry.0)
    }

    /// Whether this is one of the 16 colors rather than a style
    pub fn is_color(&self) -> bool {
        (*self as usize) < 16
    }

    /// Foreground color
    pub fn color(&self) -> Rgba<u8> {
        rgb_to_rgba(self.entry().3)
    }

    /// Drop-shadow color drawn one pixel below and right of the text
    pub fn background_color(&self) -> Rgba<u8> {
        rgb_to_rgba(self.entry().4)
    }

    /// The `&x` sequence selecting this format
    pub fn legacy(&self) -> String {
        format!("{}{}", AMPERSAND_SYMBOL, self.code())
    }
}

/// Whether `c` is a marker character
pub fn is_marker(c: char) -> bool {
    c == AMPERSAND_SYMBOL || c == SECTION_SYMBOL
}

fn rgb_to_rgba(rgb: u32) -> Rgba<u8> {
    Rgba([(rgb >> 16) as u8, (rgb >> 8) as u8, rgb as u8, 255])
}

/// Render a packed 24-bit color as `#RRGGBB`.
pub fn format_hex_rgb(rgb: u32) -> String {
    format!("#{:06X}", rgb & 0xFF_FFFF)
}

/// Pack an RGBA color into a 24-bit integer, dropping alpha.
pub fn pack_rgb(color: Rgba<u8>) -> u32 {
    ((color[0] as u32) << 16) | ((color[1] as u32) << 8) | color[2] as u32
}

/// Parse a hex color string (#RGB, #RGBA, #RRGGBB, #RRGGBBAA)
///
/// # Examples
///
/// ```
/// use tooltipgen::color::parse_hex_color;
///
/// assert_eq!(parse_hex_color("#F00").unwrap(), image::Rgba([255, 0, 0, 255]));
/// assert_eq!(parse_hex_color("#A06540").unwrap(), image::Rgba([160, 101, 64, 255]));
/// ```
pub fn parse_hex_color(s: &str) -> Result<Rgba<u8>, ColorError> {
    if s.is_empty() {
        return Err(ColorError::Empty);
    }
    let hex = s.strip_prefix('#').ok_or(ColorError::MissingHash)?;

    // Validate all characters are hex
    let digits = hex.chars().map(parse_hex_digit).collect::<Result<Vec<u8>, _>>()?;

    match digits.as_slice() {
        // #RGB -> #RRGGBB (doubled digits), alpha = 255
        [r, g, b] => Ok(Rgba([r * 17, g * 17, b * 17, 255])),
        [r, g, b, a] => Ok(Rgba([r * 17, g * 17, b * 17, a * 17])),
        [r1, r2, g1, g2, b1, b2] => Ok(Rgba([r1 * 16 + r2, g1 * 16 + g2, b1 * 16 + b2, 255])),
        [r1, r2, g1, g2, b1, b2, a1, a2] => {
            Ok(Rgba([r1 * 16 + r2, g1 * 16 + g2, b1 * 16 + b2, a1 * 16 + a2]))
        }
        _ => Err(ColorError::InvalidLength(digits.len())),
    }
}

/// Parse a single hex digit (0-9, A-F, a-f) to u8 (0-15)
fn parse_hex_digit(c: char) -> Result<u8, ColorError> {
    match c {
        '0'..='9' => Ok(c as u8 - b'0'),
        'a'..='f' => Ok(c as u8 - b'a' + 10),
        'A'..='F' => Ok(c as u8 - b'A' + 10),
        _ => Err(ColorError::InvalidHex(c)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_lookup_by_code_and_name() {
        assert_eq!(ChatFormat::of('c'), Some(ChatFormat::Red));
        assert_eq!(ChatFormat::of('L'), Some(ChatFormat::Bold));
        assert_eq!(ChatFormat::of('z'), None);
        assert_eq!(ChatFormat::by_name("DARK_AQUA"), Some(ChatFormat::DarkAqua));
        assert_eq!(ChatFormat::by_name("ampersand"), None);
    }

    #[test]
    fn test_table_matches_declaration_order() {
        for (index, format) in ChatFormat::all().enumerate() {
            assert_eq!(format as usize, index);
        }
    }

    #[test]
    fn test_colors_and_styles() {
        assert!(ChatFormat::Gold.is_color());
        assert!(!ChatFormat::Bold.is_color());
        assert!(!ChatFormat::Reset.is_color());
        assert_eq!(ChatFormat::Gray.color(), Rgba([170, 170, 170, 255]));
        assert_eq!(ChatFormat::Gray.background_color(), Rgba([42, 42, 42, 255]));
        assert_eq!(ChatFormat::Red.legacy(), "&c");
    }

    #[test]
    fn test_parse_hex_color() {
        assert_eq!(parse_hex_color("#fff"), Ok(Rgba([255, 255, 255, 255])));
        assert_eq!(parse_hex_color("#FF000080"), Ok(Rgba([255, 0, 0, 128])));
        assert_eq!(parse_hex_color(""), Err(ColorError::Empty));
        assert_eq!(parse_hex_color("fff"), Err(ColorError::MissingHash));
        assert_eq!(parse_hex_color("#ff"), Err(ColorError::InvalidLength(2)));
        assert_eq!(parse_hex_color("#ggg"), Err(ColorError::InvalidHex('g')));
    }

    #[test]
    fn test_hex_formatting() {
        assert_eq!(format_hex_rgb(0xA06540), "#A06540");
        assert_eq!(format_hex_rgb(0x1FF_FFFF), "#FFFFFF");
        assert_eq!(pack_rgb(Rgba([1, 2, 3, 0])), 0x010203);
    }
}
