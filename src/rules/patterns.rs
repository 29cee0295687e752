//! Text patterns shared by the hints collector and the text classifiers.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    /// A bare number such as a page number, step number or bag number.
    pub static ref NUMBER: Regex = Regex::new(r"^\s*(\d{1,4})\s*$").unwrap();

    /// A part count such as `2x`, `12 x` or `3×`.
    pub static ref PART_COUNT: Regex = Regex::new(r"^\s*(\d{1,3})\s*[xX×]\s*$").unwrap();
}

/// Parse a bare number, `None` for anything else.
pub fn parse_number(text: &str) -> Option<u32> {
    NUMBER
        .captures(text)
        .and_then(|c| c.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

/// Parse a part count like `4x`, returning the quantity.
pub fn parse_part_count(text: &str) -> Option<u32> {
    PART_COUNT
        .captures(text)
        .and_then(|c| c.get(1))
        .and_then(|m| m.as_str().parse().ok())
        .filter(|&n| n > 0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_number() {
        assert_eq!(parse_number("42"), Some(42));
        assert_eq!(parse_number(" 7 "), Some(7));
        assert_eq!(parse_number("4x"), None);
        assert_eq!(parse_number("12345"), None);
        assert_eq!(parse_number(""), None);
    }

    #[test]
    fn test_parse_part_count() {
        assert_eq!(parse_part_count("2x"), Some(2));
        assert_eq!(parse_part_count("12 X"), Some(12));
        assert_eq!(parse_part_count("3×"), Some(3));
        assert_eq!(parse_part_count("0x"), None);
        assert_eq!(parse_part_count("x2"), None);
        assert_eq!(parse_part_count("2"), None);
    }
}
