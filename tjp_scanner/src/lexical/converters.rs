//! Literal converters: matched text in, typed value out
//!
//! These are pure functions. The rule callbacks wrap their failures into
//! `ScanError`s with the construct position attached.

/// Decimal integer literal
pub fn to_integer(text: &str) -> Option<i64> {
    text.parse().ok()
}

/// Decimal fraction such as `1.5` or `.25`
pub fn to_float(text: &str) -> Option<f64> {
    text.parse::<f64>().ok().filter(|value| value.is_finite())
}

/// `H:MM[:SS]` to seconds since midnight
pub fn to_time(text: &str) -> Option<i64> {
    let mut fields = text.split(':');
    let hours: i64 = fields.next()?.parse().ok()?;
    let minutes: i64 = fields.next()?.parse().ok()?;
    let seconds: i64 = match fields.next() {
        Some(s) => s.parse().ok()?,
        None => 0,
    };
    if fields.next().is_some() {
        return None;
    }

    Some(hours * 3600 + minutes * 60 + seconds)
}

/// Drop the trailing colon of an `ID_WITH_COLON`
pub fn chop_colon(text: &str) -> &str {
    text.strip_suffix(':').unwrap_or(text)
}

/// Drop the leading `[` and the trailing `]` plus line break of a macro body
pub fn chop_macro(text: &str) -> &str {
    let text = text.strip_prefix('[').unwrap_or(text);
    let text = text.strip_suffix('\n').unwrap_or(text);
    text.strip_suffix(']').unwrap_or(text)
}

/// Replace escaped quotes (`\"` or `\'`) with the bare quote; other
/// backslashes stay as written
pub fn unescape(text: &str, quote: char) -> String {
    let mut escaped = String::with_capacity(2);
    escaped.push('\\');
    escaped.push(quote);
    text.replace(&escaped, quote.encode_utf8(&mut [0; 4]))
}

/// Split a scissor line into its leading indentation and the rest
pub fn split_indent(line: &str) -> (&str, &str) {
    let end = line
        .char_indices()
        .find(|(_, c)| !c.is_whitespace() || *c == '\n')
        .map(|(i, _)| i)
        .unwrap_or(line.len());
    line.split_at(end)
}

/// Remove the longest prefix `line` shares with `indent`, character by character
pub fn strip_common_prefix<'a>(line: &'a str, indent: &str) -> &'a str {
    let shared: usize = line
        .chars()
        .zip(indent.chars())
        .take_while(|(a, b)| a == b)
        .map(|(a, _)| a.len_utf8())
        .sum();
    &line[shared..]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_time_conversion() {
        assert_eq!(to_time("9:05"), Some(32700));
        assert_eq!(to_time("10:00:30"), Some(36030));
        assert_eq!(to_time("0:00"), Some(0));
        assert_eq!(to_time("10"), None);
    }

    #[test]
    fn test_numbers() {
        assert_eq!(to_integer("42"), Some(42));
        assert_eq!(to_integer("99999999999999999999"), None);
        assert_eq!(to_float(".25"), Some(0.25));
        assert_eq!(to_float("3.5"), Some(3.5));
    }

    #[test]
    fn test_chops() {
        assert_eq!(chop_colon("start:"), "start");
        assert_eq!(chop_macro("[Hello ${1}]\n"), "Hello ${1}");
        assert_eq!(chop_macro("[a]"), "a");
    }

    #[test]
    fn test_unescape_only_touches_the_active_quote() {
        assert_eq!(unescape(r#"a\"b"#, '"'), "a\"b");
        assert_eq!(unescape(r#"it\'s \"x\""#, '\''), r#"it's \"x\""#);
        assert_eq!(unescape(r"c:\path", '"'), r"c:\path");
    }

    #[test]
    fn test_indentation_helpers() {
        assert_eq!(split_indent("  foo\n"), ("  ", "foo\n"));
        assert_eq!(split_indent("\n"), ("", "\n"));
        assert_eq!(split_indent("   \n"), ("   ", "\n"));

        assert_eq!(strip_common_prefix("    bar\n", "  "), "  bar\n");
        assert_eq!(strip_common_prefix(" baz\n", "  "), "baz\n");
        assert_eq!(strip_common_prefix("qux\n", "  "), "qux\n");
        assert_eq!(strip_common_prefix("\tx\n", "  "), "\tx\n");
    }
}
