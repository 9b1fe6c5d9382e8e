//! Text and parameter escaping (RFC 5545 §3.3.11, RFC 6868).

/// Escapes a TEXT value: backslash, comma, semicolon and newlines.
///
/// CR is dropped; CRLF and LF both become `\n`.
#[must_use]
pub fn escape_text(s: &str) -> String {
    let mut result = String::with_capacity(s.len() + 10);
    for c in s.chars() {
        match c {
            '\\' => result.push_str("\\\\"),
            ',' => result.push_str("\\,"),
            ';' => result.push_str("\\;"),
            '\n' => result.push_str("\\n"),
            '\r' => {}
            _ => result.push(c),
        }
    }
    result
}

/// Makes raw text safe to write on a single physical line.
///
/// Raw values are written as parsed; only embedded line breaks, which the
/// grammar cannot carry, are turned into `\n`.
#[must_use]
pub fn escape_line_breaks(s: &str) -> String {
    s.replace("\r\n", "\\n")
        .replace('\n', "\\n")
        .replace('\r', "")
}

/// Quotes a parameter value when it holds `:`, `;`, `,`, `"` or a newline,
/// caret-escaping inside the quotes.
#[must_use]
pub fn escape_param_value(s: &str) -> String {
    if !needs_quoting(s) {
        return s.to_string();
    }

    let mut result = String::with_capacity(s.len() + 10);
    result.push('"');
    for c in s.chars() {
        match c {
            '^' => result.push_str("^^"),
            '\n' => result.push_str("^n"),
            '"' => result.push_str("^'"),
            '\r' => {}
            _ => result.push(c),
        }
    }
    result.push('"');
    result
}

fn needs_quoting(s: &str) -> bool {
    s.chars()
        .any(|c| matches!(c, ':' | ';' | ',' | '"' | '\n' | '\r'))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escape_text_basic() {
        assert_eq!(escape_text("hello, world"), "hello\\, world");
        assert_eq!(escape_text("line1\r\nline2"), "line1\\nline2");
        assert_eq!(escape_text("back\\slash"), "back\\\\slash");
        assert_eq!(escape_text("semi;colon"), "semi\\;colon");
    }

    #[test]
    fn escape_line_breaks_only_touches_newlines() {
        assert_eq!(escape_line_breaks(r"a\,b"), r"a\,b");
        assert_eq!(escape_line_breaks("a\r\nb\nc\rd"), r"a\nb\ncd");
    }

    #[test]
    fn param_values() {
        assert_eq!(escape_param_value("Simple"), "Simple");
        assert_eq!(escape_param_value("Doe, Jane"), "\"Doe, Jane\"");
        assert_eq!(escape_param_value("mailto:a@x.org"), "\"mailto:a@x.org\"");
        assert_eq!(escape_param_value("Line1\nLine2"), "\"Line1^nLine2\"");
        assert_eq!(escape_param_value("Has\"quote^"), "\"Has^'quote^^\"");
        assert_eq!(escape_param_value("caret^only"), "caret^only");
    }
}
