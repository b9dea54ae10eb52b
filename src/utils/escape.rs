//! String literal escaping for generated source code.

/// Escape text for a double-quoted Kotlin string literal.
///
/// `$` is escaped too: Kotlin would otherwise read `$name` as a template.
pub fn kotlin_string_escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '$' => out.push_str("\\$"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            other => out.push(other),
        }
    }
    out
}
