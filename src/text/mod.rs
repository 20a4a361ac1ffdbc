//! Styled text runs parsed from legacy formatting codes
//!
//! A [`LineSegment`] is one visual tooltip line made of ordered
//! [`ColorSegment`] runs. Order is preserved from parse through layout.

pub mod wrap;

use crate::color::{is_marker, ChatFormat};

pub use wrap::{normalize_newlines, strip_color_codes, visible_length, wrap_string};

/// Color and style flags shared by one run of text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct TextStyle {
    /// `None` renders with the tooltip default (gray)
    pub color: Option<ChatFormat>,
    pub bold: bool,
    pub italic: bool,
    pub underlined: bool,
    pub strikethrough: bool,
    pub obfuscated: bool,
}

impl TextStyle {
    /// Style bucket index: regular 0, bold 1, italic 2, bold-italic 3
    pub fn bucket(&self) -> usize {
        usize::from(self.bold) + 2 * usize::from(self.italic)
    }

    /// Apply one formatting code, following in-game semantics: a color code
    /// drops active styles, `r` resets to white.
    pub fn apply(&mut self, format: ChatFormat) {
        match format {
            ChatFormat::Obfuscated => self.obfuscated = true,
            ChatFormat::Bold => self.bold = true,
            ChatFormat::Strikethrough => self.strikethrough = true,
            ChatFormat::Underline => self.underlined = true,
            ChatFormat::Italic => self.italic = true,
            ChatFormat::Reset => {
                *self = TextStyle { color: Some(ChatFormat::White), ..TextStyle::default() };
            }
            color => {
                *self = TextStyle { color: Some(color), ..TextStyle::default() };
            }
        }
    }

    /// Legacy codes that recreate this style from a clean state
    pub fn to_legacy(&self) -> String {
        let mut out = String::new();
        if let Some(color) = self.color {
            out.push_str(&color.legacy());
        }
        for (flag, format) in [
            (self.obfuscated, ChatFormat::Obfuscated),
            (self.bold, ChatFormat::Bold),
            (self.strikethrough, ChatFormat::Strikethrough),
            (self.underlined, ChatFormat::Underline),
            (self.italic, ChatFormat::Italic),
        ] {
            if flag {
                out.push_str(&format.legacy());
            }
        }
        out
    }
}

/// A run of text sharing one color and style-flag set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColorSegment {
    pub text: String,
    pub style: TextStyle,
}

impl ColorSegment {
    pub fn new(text: impl Into<String>, style: TextStyle) -> Self {
        Self { text: text.into(), style }
    }

    pub fn plain(text: impl Into<String>) -> Self {
        Self::new(text, TextStyle::default())
    }

    /// Color used for drawing; unset colors fall back to gray
    pub fn color(&self) -> ChatFormat {
        self.style.color.unwrap_or(ChatFormat::Gray)
    }
}

/// An ordered sequence of color segments forming one visual line.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LineSegment {
    pub segments: Vec<ColorSegment>,
}

impl LineSegment {
    pub fn new(segments: Vec<ColorSegment>) -> Self {
        Self { segments }
    }

    /// Parse one line of legacy-formatted text.
    ///
    /// Both `&` and `§` act as markers. A marker followed by anything other
    /// than a valid code is kept as literal text.
    pub fn parse(line: &str) -> LineSegment {
        let mut segments = Vec::new();
        let mut style = TextStyle::default();
        let mut text = String::new();
        let mut chars = line.chars().peekable();

        while let Some(c) = chars.next() {
            if is_marker(c) {
                if let Some(format) = chars.peek().copied().and_then(ChatFormat::of) {
                    chars.next();
                    if !text.is_empty() {
                        segments.push(ColorSegment::new(std::mem::take(&mut text), style));
                    }
                    style.apply(format);
                    continue;
                }
            }
            text.push(c);
        }

        if !text.is_empty() || segments.is_empty() {
            segments.push(ColorSegment::new(text, style));
        }

        LineSegment { segments }
    }

    /// Parse multi-line legacy text; real newlines and literal `\n` both
    /// start a new line.
    pub fn parse_lines(text: &str) -> Vec<LineSegment> {
        normalize_newlines(text).split('\n').map(LineSegment::parse).collect()
    }

    /// Visible character count
    pub fn len(&self) -> usize {
        self.segments.iter().map(|s| s.text.chars().count()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn has_obfuscation(&self) -> bool {
        self.segments.iter().any(|s| s.style.obfuscated && !s.text.is_empty())
    }

    /// Visible text without formatting
    pub fn plain_text(&self) -> String {
        self.segments.iter().map(|s| s.text.as_str()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_plain_line() {
        let line = LineSegment::parse("Hello");
        assert_eq!(line.segments, vec![ColorSegment::plain("Hello")]);
        assert_eq!(line.segments[0].color(), ChatFormat::Gray);
    }

    #[test]
    fn test_parse_colors_and_styles() {
        let line = LineSegment::parse("&cRed &lBold§9Blue");
        assert_eq!(line.segments.len(), 3);
        assert_eq!(line.segments[0].text, "Red ");
        assert_eq!(line.segments[0].style.color, Some(ChatFormat::Red));
        assert_eq!(line.segments[1].text, "Bold");
        assert!(line.segments[1].style.bold);
        assert_eq!(line.segments[1].style.color, Some(ChatFormat::Red));
        // Color codes drop styles
        assert_eq!(line.segments[2].text, "Blue");
        assert!(!line.segments[2].style.bold);
        assert_eq!(line.segments[2].style.color, Some(ChatFormat::Blue));
    }

    #[test]
    fn test_reset_returns_to_white() {
        let line = LineSegment::parse("&c&lA&rB");
        assert_eq!(line.segments[1].text, "B");
        assert_eq!(line.segments[1].style, TextStyle { color: Some(ChatFormat::White), ..Default::default() });
    }

    #[test]
    fn test_invalid_code_is_literal() {
        let line = LineSegment::parse("Salt &Pepper &z");
        assert_eq!(line.plain_text(), "Salt &Pepper &z");
    }

    #[test]
    fn test_trailing_marker_is_literal() {
        assert_eq!(LineSegment::parse("50&").plain_text(), "50&");
    }

    #[test]
    fn test_parse_lines_splits_on_literal_and_real_newlines() {
        let lines = LineSegment::parse_lines("one\\ntwo\nthree");
        let texts: Vec<String> = lines.iter().map(|l| l.plain_text()).collect();
        assert_eq!(texts, vec!["one", "two", "three"]);
    }

    #[test]
    fn test_obfuscation_flag_and_bucket() {
        let line = LineSegment::parse("&k&l&oabc");
        assert!(line.has_obfuscation());
        assert_eq!(line.segments[0].style.bucket(), 3);
        assert!(!LineSegment::parse("&kabc&rdef").segments[1].style.obfuscated);
    }

    #[test]
    fn test_style_round_trips_through_legacy() {
        let style = TextStyle { color: Some(ChatFormat::Gold), bold: true, underlined: true, ..Default::default() };
        assert_eq!(style.to_legacy(), "&6&l&n");
        assert_eq!(LineSegment::parse(&format!("{}x", style.to_legacy())).segments[0].style, style);
    }
}
