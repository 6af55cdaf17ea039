//! Shared value types used across the runtime

pub mod interval_set;

pub use interval_set::{Interval, IntervalSet};

use std::collections::BTreeSet;

/// Set of alternative numbers (1-based)
pub type AltSet = BTreeSet<usize>;

/// Render an alt set the way diagnostics print it: `{1, 2}`
pub fn format_alts(alts: &AltSet) -> String {
    let parts: Vec<String> = alts.iter().map(|a| a.to_string()).collect();
    format!("{{{}}}", parts.join(", "))
}

/// Printable form of a code point for lexer diagnostics
pub fn display_char(c: i32) -> String {
    match c {
        -1 => "<EOF>".to_string(),
        0x0A => "'\\n'".to_string(),
        0x0D => "'\\r'".to_string(),
        0x09 => "'\\t'".to_string(),
        _ => match char::from_u32(c as u32) {
            Some(ch) => format!("'{}'", ch),
            None => format!("'\\u{{{:X}}}'", c),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_alts() {
        let alts: AltSet = [2, 1].into_iter().collect();
        assert_eq!(format_alts(&alts), "{1, 2}");
        assert_eq!(format_alts(&AltSet::new()), "{}");
    }

    #[test]
    fn test_display_char() {
        assert_eq!(display_char('a' as i32), "'a'");
        assert_eq!(display_char('\n' as i32), "'\\n'");
        assert_eq!(display_char(-1), "<EOF>");
    }
}
