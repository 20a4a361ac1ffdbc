//! Line wrapping that keeps legacy formatting alive across breaks

use crate::color::{is_marker, ChatFormat};

/// The last color code and the active formatting codes, carried from one
/// wrapped line to the next.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct FormatState {
    last_color: String,
    formatting: String,
}

impl FormatState {
    fn prefix(&self) -> String {
        format!("{}{}", self.last_color, self.formatting)
    }

    /// State at the end of `segment`, given the state at its start.
    fn derive(&self, segment: &str) -> FormatState {
        let mut state = self.clone();
        let chars: Vec<char> = segment.chars().collect();
        let mut i = 0;

        while i < chars.len() {
            if is_marker(chars[i]) && i + 1 < chars.len() {
                if let Some(format) = ChatFormat::of(chars[i + 1]) {
                    let code: String = chars[i..i + 2].iter().collect();
                    if format.is_color() {
                        // Changing color resets formatting
                        state.last_color = code;
                        state.formatting.clear();
                    } else if !state.formatting.contains(&code) {
                        state.formatting.push_str(&code);
                    }
                    i += 2;
                    continue;
                }
            }
            i += 1;
        }

        state
    }
}

/// Remove every valid formatting code (`&x` or `§x`).
pub fn strip_color_codes(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        if is_marker(c) && chars.peek().copied().and_then(ChatFormat::of).is_some() {
            chars.next();
            continue;
        }
        out.push(c);
    }

    out
}

/// Number of characters a player would see
pub fn visible_length(text: &str) -> usize {
    strip_color_codes(text).chars().count()
}

/// Normalize line breaks: CRLF and CR become `\n`, a literal `\n` becomes a
/// real break, and a literal `\n` next to a real break collapses into it.
pub fn normalize_newlines(input: &str) -> String {
    let input = input.replace("\r\n", "\n").replace('\r', "\n");
    let chars: Vec<char> = input.chars().collect();
    let mut normalized = String::with_capacity(input.len());
    let mut i = 0;

    while i < chars.len() {
        let current = chars[i];

        if current == '\n' {
            normalized.push('\n');
            i += 1;
            while i + 1 < chars.len() && chars[i] == '\\' && chars[i + 1] == 'n' {
                i += 2;
            }
            continue;
        }

        if current == '\\' && i + 1 < chars.len() && chars[i + 1] == 'n' {
            if i + 2 < chars.len() && chars[i + 2] == '\n' {
                i += 2;
                continue;
            }
            normalized.push('\n');
            i += 2;
            continue;
        }

        normalized.push(current);
        i += 1;
    }

    normalized
}

/// Split into alternating runs of whitespace and non-whitespace
fn tokens(line: &str) -> Vec<&str> {
    let mut out = Vec::new();
    let mut start = 0;
    let mut in_space: Option<bool> = None;

    for (index, c) in line.char_indices() {
        let space = c.is_whitespace();
        if in_space.is_some_and(|previous| previous != space) {
            out.push(&line[start..index]);
            start = index;
        }
        in_space = Some(space);
    }
    if start < line.len() {
        out.push(&line[start..]);
    }

    out
}

/// Wrap text to `max_line_length` visible characters per line.
///
/// Every produced line is prefixed with the color and formatting codes
/// active where the previous line ended, so styling survives the break.
/// Empty paragraphs are preserved and reset the carried state. Leading
/// whitespace of a paragraph is kept as a manual indent; whitespace at an
/// automatic break is dropped. A `max_line_length` of zero disables wrapping.
pub fn wrap_string(input: &str, max_line_length: usize) -> Vec<String> {
    let mut lines = Vec::new();

    if input.is_empty() {
        return lines;
    }
    if max_line_length == 0 {
        lines.push(input.to_string());
        return lines;
    }

    let normalized = normalize_newlines(input);
    let mut state = FormatState::default();

    for raw_line in normalized.split('\n') {
        if raw_line.is_empty() {
            lines.push(String::new());
            state = FormatState::default();
            continue;
        }

        let mut current = String::new();
        let mut current_length = 0;

        for (index, token) in tokens(raw_line).into_iter().enumerate() {
            if token.chars().all(char::is_whitespace) {
                let width = token.chars().count();

                if current_length + width > max_line_length && !current.is_empty() {
                    state = flush_line(&mut lines, &mut current, &state);
                    current_length = 0;
                }

                let manual_indent = index == 0;
                if current.is_empty() && !manual_indent {
                    continue;
                }

                current.push_str(token);
                current_length += width;
                continue;
            }

            let word_length = visible_length(token);

            if word_length > max_line_length {
                if !current.is_empty() {
                    state = flush_line(&mut lines, &mut current, &state);
                }
                state = split_long_word(token, max_line_length, &mut lines, state);
                current_length = 0;
            } else if current_length + word_length <= max_line_length {
                current.push_str(token);
                current_length += word_length;
            } else {
                state = flush_line(&mut lines, &mut current, &state);
                current.push_str(token);
                current_length = word_length;
            }
        }

        if !current.is_empty() {
            state = flush_line(&mut lines, &mut current, &state);
        }
    }

    lines
}

fn flush_line(lines: &mut Vec<String>, current: &mut String, state: &FormatState) -> FormatState {
    let finished = std::mem::take(current);
    let next = state.derive(&finished);
    lines.push(format!("{}{}", state.prefix(), finished));
    next
}

/// Break a word longer than the line into pieces, carrying formatting.
fn split_long_word(word: &str, max_line_length: usize, lines: &mut Vec<String>, initial: FormatState) -> FormatState {
    let chars: Vec<char> = word.chars().collect();
    let mut state = initial;
    let mut start = 0;

    while start < chars.len() {
        let mut visible = 0;
        let mut end = start;

        while end < chars.len() {
            let is_code = is_marker(chars[end]) && end + 1 < chars.len() && ChatFormat::of(chars[end + 1]).is_some();
            if is_code {
                end += 2;
            } else {
                visible += 1;
                end += 1;
            }
            if visible >= max_line_length {
                break;
            }
        }

        let piece: String = chars[start..end].iter().collect();
        lines.push(format!("{}{}", state.prefix(), piece));
        state = state.derive(&piece);
        start = end;
    }

    state
}
