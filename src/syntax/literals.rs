//! Decoding of protobuf integer, float and string literals.

/// Parse an unsigned integer literal: decimal, `0x` hex, or leading-zero octal.
pub fn parse_int(text: &str) -> Option<u64> {
    if let Some(hex) = text.strip_prefix("0x").or_else(|| text.strip_prefix("0X")) {
        u64::from_str_radix(hex, 16).ok()
    } else if text.len() > 1 && text.starts_with('0') {
        u64::from_str_radix(&text[1..], 8).ok()
    } else {
        text.parse().ok()
    }
}

/// Parse a signed integer literal into the range used for field and enum numbers.
pub fn parse_signed(negative: bool, text: &str) -> Option<i64> {
    let magnitude = parse_int(text)? as i128;
    let value = if negative { -magnitude } else { magnitude };
    i64::try_from(value).ok()
}

/// Parse a float literal, accepting `inf` and `nan`.
pub fn parse_float(text: &str) -> Option<f64> {
    match text {
        "inf" => Some(f64::INFINITY),
        "nan" => Some(f64::NAN),
        _ => text.parse().ok(),
    }
}

/// Strip the quotes from a string literal and decode its escapes.
///
/// Returns `None` when the literal contains an invalid escape.
pub fn unescape_string(literal: &str) -> Option<String> {
    let quote = literal.chars().next()?;
    if quote != '"' && quote != '\'' {
        return None;
    }
    let inner = literal.strip_prefix(quote)?.strip_suffix(quote)?;

    let mut out: Vec<u8> = Vec::with_capacity(inner.len());
    let mut chars = inner.chars().peekable();
    while let Some(ch) = chars.next() {
        if ch != '\\' {
            let mut buf = [0u8; 4];
            out.extend_from_slice(ch.encode_utf8(&mut buf).as_bytes());
            continue;
        }
        match chars.next()? {
            'a' => out.push(0x07),
            'b' => out.push(0x08),
            'f' => out.push(0x0C),
            'n' => out.push(b'\n'),
            'r' => out.push(b'\r'),
            't' => out.push(b'\t'),
            'v' => out.push(0x0B),
            '\\' => out.push(b'\\'),
            '\'' => out.push(b'\''),
            '"' => out.push(b'"'),
            '?' => out.push(b'?'),
            'x' | 'X' => {
                let mut value = 0u32;
                let mut digits = 0;
                while digits < 2 {
                    match chars.peek().and_then(|c| c.to_digit(16)) {
                        Some(d) => {
                            value = value * 16 + d;
                            chars.next();
                            digits += 1;
                        }
                        None => break,
                    }
                }
                if digits == 0 {
                    return None;
                }
                out.push(value as u8);
            }
            'u' | 'U' => {
                let width = 4;
                let mut value = 0u32;
                for _ in 0..width {
                    value = value * 16 + chars.next()?.to_digit(16)?;
                }
                let ch = char::from_u32(value)?;
                let mut buf = [0u8; 4];
                out.extend_from_slice(ch.encode_utf8(&mut buf).as_bytes());
            }
            d @ '0'..='7' => {
                let mut value = d.to_digit(8)?;
                for _ in 0..2 {
                    match chars.peek().and_then(|c| c.to_digit(8)) {
                        Some(next) => {
                            value = value * 8 + next;
                            chars.next();
                        }
                        None => break,
                    }
                }
                out.push(value as u8);
            }
            _ => return None,
        }
    }
    Some(String::from_utf8_lossy(&out).into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("0", Some(0))]
    #[case("42", Some(42))]
    #[case("0x2A", Some(42))]
    #[case("052", Some(42))]
    #[case("09", None)]
    #[case("18446744073709551615", Some(u64::MAX))]
    fn test_parse_int(#[case] text: &str, #[case] expected: Option<u64>) {
        assert_eq!(parse_int(text), expected);
    }

    #[test]
    fn test_parse_signed_bounds() {
        assert_eq!(parse_signed(true, "1"), Some(-1));
        assert_eq!(parse_signed(true, "9223372036854775808"), Some(i64::MIN));
        assert_eq!(parse_signed(false, "9223372036854775808"), None);
    }

    #[test]
    fn test_unescape() {
        assert_eq!(unescape_string(r#""a\nb""#).as_deref(), Some("a\nb"));
        assert_eq!(unescape_string(r#"'it\'s'"#).as_deref(), Some("it's"));
        assert_eq!(unescape_string(r#""\x41\101""#).as_deref(), Some("AA"));
        assert_eq!(unescape_string(r#""\q""#), None);
    }

    #[test]
    fn test_parse_float() {
        assert_eq!(parse_float("1.5"), Some(1.5));
        assert_eq!(parse_float("inf"), Some(f64::INFINITY));
        assert!(parse_float("nan").is_some_and(f64::is_nan));
    }
}
