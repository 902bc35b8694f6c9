//! Text normalization used for keyword membership tests, and line splitting
//! shared by every line-oriented pass over résumé text.

/// Lowercases `text` and drops every character outside `[a-z0-9]` and whitespace.
///
/// Whitespace runs are preserved as-is; callers split on whitespace afterwards.
pub fn normalize(text: &str) -> String {
    text.to_lowercase()
        .chars()
        .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c.is_whitespace())
        .collect()
}

/// Characters that end a line, matching Python's `str.splitlines`.
fn is_line_boundary(c: char) -> bool {
    matches!(
        c,
        '\n' | '\r' | '\u{0b}' | '\u{0c}' | '\u{1c}' | '\u{1d}' | '\u{1e}' | '\u{85}' | '\u{2028}'
            | '\u{2029}'
    )
}

/// Splits `text` into lines on every Unicode line boundary, treating `\r\n` as one.
///
/// No trailing empty line is produced for text ending in a boundary.
pub fn split_lines(text: &str) -> Vec<&str> {
    let mut lines = Vec::new();
    let mut start = 0;
    let mut chars = text.char_indices().peekable();

    while let Some((i, c)) = chars.next() {
        if !is_line_boundary(c) {
            continue;
        }
        lines.push(&text[start..i]);
        start = i + c.len_utf8();
        if c == '\r' {
            if let Some(&(j, '\n')) = chars.peek() {
                chars.next();
                start = j + 1;
            }
        }
    }

    if start < text.len() {
        lines.push(&text[start..]);
    }
    lines
}
