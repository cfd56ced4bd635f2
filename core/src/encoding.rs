//! AWS flavoured percent encoding.
//!
//! Only `A-Z a-z 0-9 - _ . ~` are left alone, everything else becomes `%XX`
//! with uppercase hex. That means a space is `%20` (never `+`), `*` is `%2A`
//! and `~` is never escaped. Paths additionally keep their `/`.

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

/// AsciiSet for [AWS UriEncode](https://docs.aws.amazon.com/AmazonS3/latest/API/sig-v4-header-based-auth.html)
///
/// Used for query keys and values, `/` is escaped.
pub static AWS_QUERY_ENCODE_SET: AsciiSet = NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

/// Same as [`AWS_QUERY_ENCODE_SET`] but keeps `/`, used for paths.
pub static AWS_PATH_ENCODE_SET: AsciiSet = AWS_QUERY_ENCODE_SET.remove(b'/');

/// Encode a url component the way SigV4 expects.
///
/// `None` encodes to an empty string. With `path` set, `/` is preserved.
pub fn aws_encode_url_component(value: Option<&str>, path: bool) -> String {
    let Some(value) = value else {
        return String::new();
    };

    let set = if path {
        &AWS_PATH_ENCODE_SET
    } else {
        &AWS_QUERY_ENCODE_SET
    };
    utf8_percent_encode(value, set).to_string()
}

/// Encode a query key or value.
pub fn encode_query_component(value: &str) -> String {
    aws_encode_url_component(Some(value), false)
}

/// Encode a path, keeping `/`.
pub fn encode_path(value: &str) -> String {
    aws_encode_url_component(Some(value), true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use percent_encoding::percent_decode_str;
    use pretty_assertions::assert_eq;
    use test_case::test_case;

    #[test_case("a b", "a%20b" ; "space")]
    #[test_case("a*b", "a%2Ab" ; "asterisk")]
    #[test_case("a~b", "a~b" ; "tilde")]
    #[test_case("a+b", "a%2Bb" ; "plus")]
    #[test_case("a/b", "a%2Fb" ; "slash")]
    #[test_case("a=b&c", "a%3Db%26c" ; "reserved")]
    #[test_case("%7E", "%257E" ; "literal percent")]
    #[test_case("ü", "%C3%BC" ; "utf8")]
    #[test_case("AZaz09-_.~", "AZaz09-_.~" ; "unreserved")]
    fn test_query_mode(input: &str, expected: &str) {
        assert_eq!(aws_encode_url_component(Some(input), false), expected);
    }

    #[test_case("/a b/c", "/a%20b/c" ; "space in path")]
    #[test_case("/photos/2024/", "/photos/2024/" ; "slashes kept")]
    #[test_case("/a*b~c", "/a%2Ab~c" ; "asterisk and tilde")]
    fn test_path_mode(input: &str, expected: &str) {
        assert_eq!(aws_encode_url_component(Some(input), true), expected);
    }

    #[test]
    fn test_none_is_empty() {
        assert_eq!(aws_encode_url_component(None, false), "");
        assert_eq!(aws_encode_url_component(None, true), "");
    }

    #[test]
    fn test_unreserved_is_idempotent() {
        let v = "Hello-World_2024.txt~";
        let once = encode_query_component(v);
        assert_eq!(once, v);
        assert_eq!(encode_query_component(&once), v);
    }

    #[test_case("a b*c~d/e+f" ; "mixed")]
    #[test_case("日本語 テキスト" ; "cjk")]
    #[test_case("" ; "empty")]
    #[test_case("100%" ; "percent")]
    fn test_decode_round_trip(input: &str) {
        for encoded in [encode_query_component(input), encode_path(input)] {
            let decoded = percent_decode_str(&encoded).decode_utf8().unwrap();
            assert_eq!(decoded, input);
        }
    }
}
