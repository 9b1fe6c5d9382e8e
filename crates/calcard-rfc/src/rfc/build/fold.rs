//! Content line folding (RFC 5545 §3.1).

use calcard_core::constants::CRLF;

/// Folds one logical line into CRLF-terminated physical lines of at most
/// `max_octets` octets each, the leading continuation space included.
///
/// Breaks only on UTF-8 character boundaries. `max_octets` must be at least
/// 5 so a continuation line can hold any character.
#[must_use]
pub fn fold_line(line: &str, max_octets: usize) -> String {
    if line.len() <= max_octets {
        return format!("{line}{CRLF}");
    }

    let mut result = String::with_capacity(line.len() + (line.len() / max_octets + 1) * 3);
    let mut pos = 0;
    let mut first_line = true;

    while pos < line.len() {
        // Continuation lines give one octet to the leading space.
        let budget = if first_line {
            max_octets
        } else {
            max_octets.saturating_sub(1).max(1)
        };

        let mut end = (pos + budget).min(line.len());
        while end > pos && !line.is_char_boundary(end) {
            end -= 1;
        }
        if end == pos {
            // A single character wider than the budget goes out whole.
            end = pos + 1;
            while !line.is_char_boundary(end) {
                end += 1;
            }
        }

        if !first_line {
            result.push(' ');
        }
        result.push_str(&line[pos..end]);
        result.push_str(CRLF);

        pos = end;
        first_line = false;
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unfold(folded: &str) -> String {
        folded.replace("\r\n ", "").replace("\r\n", "")
    }

    #[test]
    fn fold_short_line() {
        assert_eq!(fold_line("SUMMARY:Short", 75), "SUMMARY:Short\r\n");
    }

    #[test]
    fn fold_exactly_at_limit() {
        let line = "X".repeat(75);
        assert_eq!(fold_line(&line, 75), format!("{line}\r\n"));
    }

    #[test]
    fn fold_boundary_75_octets() {
        let line = "A".repeat(80);
        let result = fold_line(&line, 75);

        let lines: Vec<&str> = result.split("\r\n").filter(|s| !s.is_empty()).collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].len(), 75);
        assert_eq!(lines[1].len(), 6);
    }

    #[test]
    fn fold_respects_every_limit() {
        let line = format!("DESCRIPTION:{}", "ä日本語x".repeat(40));
        for max in [5, 6, 20, 75, 100] {
            let result = fold_line(&line, max);
            assert_eq!(unfold(&result), line);
            for physical in result.split("\r\n").filter(|s| !s.is_empty()) {
                assert!(physical.len() <= max, "{} > {max}", physical.len());
            }
        }
    }

    #[test]
    fn fold_preserves_utf8() {
        let line = format!("{}日本語", "A".repeat(73));
        let result = fold_line(&line, 75);
        assert_eq!(unfold(&result), line);
        assert!(result.starts_with(&"A".repeat(73)));
    }
}
