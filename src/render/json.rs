use crate::record::FieldMap;
use regex::Regex;
use serde_json::{Map, Number, Value};
use std::io::{self, Write};
use std::sync::LazyLock;

/// One output object, keys in insertion order.
pub type JsonRecord = Map<String, Value>;

/// Fractional digits kept when a decimal has to be rounded.
pub const DECIMAL_SCALE: usize = 4;

static INTEGER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*[+-]?[0-9]+$").expect("valid integer regex"));
static DECIMAL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*[+-]?[0-9]*\.[0-9]*$").expect("valid decimal regex"));

/// Type a raw value for output: integer, decimal, or string.
///
/// Inference looks only at the text; the field's rule plays no part.
pub fn infer_value(raw: &str) -> Value {
    let literal = if INTEGER_RE.is_match(raw) {
        Some(format_integer(raw))
    } else if DECIMAL_RE.is_match(raw) {
        format_decimal(raw)
    } else {
        None
    };

    // Literals built above are always valid JSON numbers.
    literal
        .and_then(|l| l.parse::<Number>().ok())
        .map(Value::Number)
        .unwrap_or_else(|| Value::String(raw.to_string()))
}

pub fn to_json_record(fields: &FieldMap) -> JsonRecord {
    let mut record = JsonRecord::new();
    for (key, value) in fields {
        record.insert(key.clone(), infer_value(value));
    }
    record
}

/// Write one record as a compact JSON object followed by `\n`.
pub fn write_json_line<W: Write>(writer: &mut W, record: &JsonRecord) -> io::Result<()> {
    serde_json::to_writer(&mut *writer, record)?;
    writer.write_all(b"\n")
}

/// Split an optional leading sign off an already-trimmed numeric string.
fn split_sign(s: &str) -> (bool, &str) {
    match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    }
}

/// Canonical integer literal: no `+`, no leading zeros, no negative zero.
pub fn format_integer(raw: &str) -> String {
    let (negative, digits) = split_sign(raw.trim());
    let digits = digits.trim_start_matches('0');
    match (digits.is_empty(), negative) {
        (true, _) => "0".to_string(),
        (false, true) => format!("-{}", digits),
        (false, false) => digits.to_string(),
    }
}

/// Canonical decimal literal, rounded half-to-even when it has more than
/// `DECIMAL_SCALE` fractional digits. `None` for a bare ".".
pub fn format_decimal(raw: &str) -> Option<String> {
    let (negative, body) = split_sign(raw.trim());
    let (int_part, frac_part) = body.split_once('.')?;
    if int_part.is_empty() && frac_part.is_empty() {
        return None;
    }

    let mut int_digits: Vec<u8> = int_part.trim_start_matches('0').bytes().collect();
    let mut frac_digits: Vec<u8> = frac_part.bytes().collect();

    if frac_digits.len() > DECIMAL_SCALE {
        let first_dropped = frac_digits[DECIMAL_SCALE];
        let rest_nonzero = frac_digits[DECIMAL_SCALE + 1..].iter().any(|&d| d != b'0');
        let last_kept_odd = (frac_digits[DECIMAL_SCALE - 1] - b'0') % 2 == 1;
        let round_up = first_dropped > b'5'
            || (first_dropped == b'5' && (rest_nonzero || last_kept_odd));

        frac_digits.truncate(DECIMAL_SCALE);
        if round_up && increment(&mut frac_digits) {
            if increment(&mut int_digits) {
                int_digits.insert(0, b'1');
            }
        }
    } else if frac_digits.is_empty() {
        frac_digits.push(b'0');
    }

    if int_digits.is_empty() {
        int_digits.push(b'0');
    }

    let is_zero = int_digits.iter().chain(&frac_digits).all(|&d| d == b'0');
    let sign = if negative && !is_zero { "-" } else { "" };
    Some(format!(
        "{}{}.{}",
        sign,
        String::from_utf8_lossy(&int_digits),
        String::from_utf8_lossy(&frac_digits)
    ))
}

/// Add one to an ASCII digit string in place; true if it carried out.
fn increment(digits: &mut [u8]) -> bool {
    for d in digits.iter_mut().rev() {
        if *d == b'9' {
            *d = b'0';
        } else {
            *d += 1;
            return false;
        }
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn rendered(raw: &str) -> String {
        serde_json::to_string(&infer_value(raw)).unwrap()
    }

    #[test]
    fn integers_are_bare() {
        assert_eq!(rendered("42"), "42");
        assert_eq!(rendered("  +007"), "7");
        assert_eq!(rendered("-0"), "0");
        assert_eq!(rendered("-15"), "-15");
        assert_eq!(rendered("123456789012345678901234"), "123456789012345678901234");
    }

    #[test]
    fn decimals_round_half_even_at_four_digits() {
        assert_eq!(rendered("3.14159"), "3.1416");
        assert_eq!(rendered("123.45678"), "123.4568");
        assert_eq!(rendered("0.12345"), "0.1234");
        assert_eq!(rendered("0.12355"), "0.1236");
        assert_eq!(rendered("0.123450001"), "0.1235");
        assert_eq!(rendered("9.99995"), "10.0000");
        assert_eq!(rendered("-0.00004"), "0.0000");
    }

    #[test]
    fn short_decimals_keep_their_digits() {
        assert_eq!(rendered("1.0"), "1.0");
        assert_eq!(rendered("-2.50"), "-2.50");
        assert_eq!(rendered("1."), "1.0");
        assert_eq!(rendered(".5"), "0.5");
        assert_eq!(rendered(" -.25"), "-0.25");
    }

    #[test]
    fn everything_else_is_a_string() {
        assert_eq!(rendered("abc"), r#""abc""#);
        assert_eq!(rendered("."), r#"".""#);
        assert_eq!(rendered("12 "), r#""12 ""#);
        assert_eq!(rendered("1e5"), r#""1e5""#);
        assert_eq!(rendered(r#"say "hi""#), r#""say \"hi\"""#);
    }

    #[test]
    fn record_keeps_key_order_and_ends_with_newline() {
        let fields: FieldMap = vec![
            ("z".to_string(), "1".to_string()),
            ("a".to_string(), "x".to_string()),
        ];
        let mut out = Vec::new();
        write_json_line(&mut out, &to_json_record(&fields)).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "{\"z\":1,\"a\":\"x\"}\n");
    }
}
