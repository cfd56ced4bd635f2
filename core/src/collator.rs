//! Byte order collation.
//!
//! SigV4 requires header names and query components to be sorted by their
//! encoded bytes. Locale aware collation does not give that order, so every
//! sort in the canonicalizer goes through [`BinaryCollator`].

use std::cmp::Ordering;

/// Character set used to turn a string into bytes before comparing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Charset {
    /// US-ASCII, every non-ASCII character becomes `?`.
    Ascii,
    /// UTF-8, raw bytes.
    Utf8,
}

/// Compares strings by their encoded bytes as unsigned values.
///
/// A string that is a byte prefix of another sorts first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BinaryCollator {
    charset: Charset,
}

impl BinaryCollator {
    /// Collator for query keys and values.
    pub const ASCII: BinaryCollator = BinaryCollator::new(Charset::Ascii);
    /// Collator for header names.
    pub const UTF8: BinaryCollator = BinaryCollator::new(Charset::Utf8);

    /// Create a collator for the given charset.
    pub const fn new(charset: Charset) -> Self {
        Self { charset }
    }

    /// The charset used to encode strings.
    pub fn charset(&self) -> Charset {
        self.charset
    }

    /// Compare two strings.
    pub fn compare(&self, a: &str, b: &str) -> Ordering {
        match self.charset {
            Charset::Utf8 => a.as_bytes().cmp(b.as_bytes()),
            Charset::Ascii => ascii_bytes(a).cmp(ascii_bytes(b)),
        }
    }

    /// Sort a slice in place.
    pub fn sort<S: AsRef<str>>(&self, values: &mut [S]) {
        values.sort_by(|a, b| self.compare(a.as_ref(), b.as_ref()));
    }
}

fn ascii_bytes(s: &str) -> impl Iterator<Item = u8> + '_ {
    s.chars()
        .map(|c| if c.is_ascii() { c as u8 } else { b'?' })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use test_case::test_case;

    const SAMPLES: &[&str] = &[
        "", "a", "aa", "ab", "B", "b", "Z", "~", "-", "_", ".", "x-amz-date", "host", "é", "ü",
        "\u{7f}", "a\u{0}", "日本",
    ];

    #[test_case(BinaryCollator::ASCII ; "ascii")]
    #[test_case(BinaryCollator::UTF8 ; "utf8")]
    fn test_total_order(c: BinaryCollator) {
        for a in SAMPLES {
            assert_eq!(c.compare(a, a), Ordering::Equal, "{a:?}");
            for b in SAMPLES {
                assert_eq!(c.compare(a, b), c.compare(b, a).reverse(), "{a:?} vs {b:?}");
                for x in SAMPLES {
                    if c.compare(a, b) == Ordering::Less && c.compare(b, x) == Ordering::Less {
                        assert_eq!(c.compare(a, x), Ordering::Less, "{a:?} < {b:?} < {x:?}");
                    }
                }
            }
        }
    }

    #[test_case(BinaryCollator::ASCII ; "ascii")]
    #[test_case(BinaryCollator::UTF8 ; "utf8")]
    fn test_prefix_sorts_first(c: BinaryCollator) {
        assert_eq!(c.compare("a", "aa"), Ordering::Less);
        assert_eq!(c.compare("aa", "a"), Ordering::Greater);
        assert_eq!(c.compare("", "a"), Ordering::Less);
    }

    #[test]
    fn test_uppercase_before_lowercase() {
        let mut v = vec!["b", "a", "B", "A", "_", "~", "0"];
        BinaryCollator::ASCII.sort(&mut v);
        assert_eq!(v, vec!["0", "A", "B", "_", "a", "b", "~"]);
    }

    #[test]
    fn test_utf8_bytes_are_unsigned() {
        // 0xC3 must sort after 0x7F, which a signed comparison gets wrong.
        assert_eq!(BinaryCollator::UTF8.compare("é", "\u{7f}"), Ordering::Greater);
        assert_eq!(BinaryCollator::UTF8.compare("é", "z"), Ordering::Greater);
    }

    #[test]
    fn test_ascii_replaces_non_ascii() {
        // Both sides encode to "a?".
        assert_eq!(BinaryCollator::ASCII.compare("aé", "aü"), Ordering::Equal);
        assert_eq!(BinaryCollator::ASCII.compare("aé", "a?"), Ordering::Equal);
        assert_eq!(BinaryCollator::UTF8.compare("aé", "aü"), Ordering::Less);
    }

    #[test]
    fn test_sort_headers() {
        let mut v = vec![
            "x-amz-date".to_string(),
            "host".to_string(),
            "content-type".to_string(),
            "x-amz-content-sha256".to_string(),
        ];
        BinaryCollator::UTF8.sort(&mut v);
        assert_eq!(
            v,
            vec!["content-type", "host", "x-amz-content-sha256", "x-amz-date"]
        );
    }
}
