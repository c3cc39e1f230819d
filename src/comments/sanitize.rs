//! Markup escaping for user-supplied text.
//!
//! Applied once, at write time, to `name` and `message`. Existing entities are
//! not decoded, so `&amp;` becomes `&amp;amp;`.

/// Replace `& < > " '` with their HTML entity equivalents.
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
