use unicode_width::UnicodeWidthStr;

/// Calculates the display width of a string in terminal columns.
///
/// Handles Unicode correctly: CJK characters and emoji count as 2 columns,
/// combining marks as 0, standard ASCII as 1.
pub fn display_width(s: &str) -> usize {
    UnicodeWidthStr::width(s)
}

/// Pads `s` with trailing spaces up to `width` display columns.
///
/// Used by the list widget so the selection highlight spans the full row.
/// Strings already at or beyond `width` are returned unchanged.
pub fn pad_to_width(s: &str, width: usize) -> String {
    let w = display_width(s);
    if w >= width {
        return s.to_string();
    }
    let mut out = String::with_capacity(s.len() + (width - w));
    out.push_str(s);
    for _ in 0..(width - w) {
        out.push(' ');
    }
    out
}

/// Greedy word wrap of `text` into lines of at most `width` columns.
///
/// The text is split on single spaces; tokens are packed into lines while
/// they fit, each token reserving one trailing space. A single token wider
/// than `width` is emitted alone on its own line and overflows the column;
/// tokens are never split.
///
/// `width < 1` is clamped to 1.
pub fn wrap(text: &str, width: usize) -> Vec<String> {
    let width = width.max(1);
    let mut lines = Vec::new();

    // Remaining columns on the line being accumulated.
    let mut remaining = width;
    let mut line: Vec<&str> = Vec::new();

    for token in text.split(' ') {
        let len = display_width(token);
        if len >= remaining && !line.is_empty() {
            lines.push(line.join(" "));
            line.clear();
            remaining = width;
        }
        line.push(token);
        remaining = remaining.saturating_sub(len + 1);
    }
    if !line.is_empty() {
        lines.push(line.join(" "));
    }

    lines
}
