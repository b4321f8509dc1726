//! Formatting helpers shared by bankweb crates

use chrono::{DateTime, NaiveDateTime};
use thiserror::Error;

/// Display format used by the bank backend for timestamps
pub const DATE_TIME_FORMAT: &str = "%d/%m/%Y %H:%M:%S";

const ISO_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AmountParseError {
    #[error("empty amount")]
    Empty,
    #[error("invalid amount: {0}")]
    Invalid(String),
    #[error("amount out of range: {0}")]
    Overflow(String),
}

/// Format cents the way the backend does: `-0.01€`, `10.00€`
pub fn format_cents(cents: i64) -> String {
    format_cents_with(cents, "€", false)
}

/// Format cents with a custom symbol placed before or after the number
pub fn format_cents_with(cents: i64, symbol: &str, symbol_before: bool) -> String {
    let sign = if cents < 0 { "-" } else { "" };
    let abs = cents.unsigned_abs();
    let number = format!("{}.{:02}", abs / 100, abs % 100);
    if symbol_before {
        format!("{}{}{}", sign, symbol, number)
    } else {
        format!("{}{}{}", sign, number, symbol)
    }
}

/// Parse a formatted money string back into cents.
///
/// Accepts what [`format_cents`] produces plus common variants: a comma as
/// decimal separator, a leading `+`, a symbol on either side and one
/// fractional digit (`"1.5"` is 150 cents). A string without a decimal
/// separator is read as whole units.
pub fn parse_cents(input: &str) -> Result<i64, AmountParseError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(AmountParseError::Empty);
    }

    let (negative, rest) = match trimmed.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, trimmed.strip_prefix('+').unwrap_or(trimmed)),
    };

    let number: String = rest
        .trim_matches(|c: char| !c.is_ascii_digit() && c != '.' && c != ',')
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect();
    if number.is_empty() {
        return Err(AmountParseError::Invalid(input.to_string()));
    }

    let (units, fraction) = match number.rfind(|c: char| c == '.' || c == ',') {
        Some(pos) => (&number[..pos], &number[pos + 1..]),
        None => (number.as_str(), ""),
    };

    if (units.is_empty() && fraction.is_empty())
        || !units.chars().all(|c| c.is_ascii_digit())
        || !fraction.chars().all(|c| c.is_ascii_digit())
        || fraction.len() > 2
    {
        return Err(AmountParseError::Invalid(input.to_string()));
    }

    let units: i64 = if units.is_empty() {
        0
    } else {
        units
            .parse()
            .map_err(|_| AmountParseError::Overflow(input.to_string()))?
    };
    let fraction: i64 = match fraction.len() {
        0 => 0,
        1 => fraction.parse::<i64>().unwrap_or(0) * 10,
        _ => fraction.parse().unwrap_or(0),
    };

    let cents = units
        .checked_mul(100)
        .and_then(|c| c.checked_add(fraction))
        .ok_or_else(|| AmountParseError::Overflow(input.to_string()))?;

    Ok(if negative { -cents } else { cents })
}

/// Format a timestamp as `dd/MM/yyyy HH:mm:ss`
pub fn format_timestamp(value: &NaiveDateTime) -> String {
    value.format(DATE_TIME_FORMAT).to_string()
}

/// Parse a timestamp in the backend display format, RFC 3339 or ISO local time
pub fn parse_timestamp(input: &str) -> Option<NaiveDateTime> {
    let input = input.trim();
    if let Ok(value) = NaiveDateTime::parse_from_str(input, DATE_TIME_FORMAT) {
        return Some(value);
    }
    if let Ok(value) = DateTime::parse_from_rfc3339(input) {
        return Some(value.naive_utc());
    }
    ISO_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(input, format).ok())
}

/// Escape text for interpolation into HTML
pub fn escape_html(content: &str) -> String {
    let mut escaped = String::with_capacity(content.len());
    for c in content.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn datetime(y: i32, m: u32, d: u32, h: u32, min: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, min, s)
            .unwrap()
    }

    #[test]
    fn test_format_cents() {
        assert_eq!(format_cents(-1), "-0.01€");
        assert_eq!(format_cents(0), "0.00€");
        assert_eq!(format_cents(1), "0.01€");
        assert_eq!(format_cents(10), "0.10€");
        assert_eq!(format_cents(100), "1.00€");
        assert_eq!(format_cents(10_00), "10.00€");
        assert_eq!(format_cents(-123_45), "-123.45€");
    }

    #[test]
    fn test_format_cents_with_symbol_before() {
        assert_eq!(format_cents_with(1500, "$", true), "$15.00");
        assert_eq!(format_cents_with(-5, "$", true), "-$0.05");
    }

    #[test]
    fn test_parse_cents_backend_format() {
        assert_eq!(parse_cents("-0.01€"), Ok(-1));
        assert_eq!(parse_cents("0.00€"), Ok(0));
        assert_eq!(parse_cents("0.10€"), Ok(10));
        assert_eq!(parse_cents("50.00€"), Ok(5000));
        assert_eq!(parse_cents("65.00 €"), Ok(6500));
    }

    #[test]
    fn test_parse_cents_variants() {
        assert_eq!(parse_cents("12,34"), Ok(1234));
        assert_eq!(parse_cents("+1.5"), Ok(150));
        assert_eq!(parse_cents("$7.25"), Ok(725));
        assert_eq!(parse_cents("42"), Ok(4200));
    }

    #[test]
    fn test_parse_cents_rejects_garbage() {
        assert_eq!(parse_cents("  "), Err(AmountParseError::Empty));
        assert!(matches!(parse_cents("€"), Err(AmountParseError::Invalid(_))));
        assert!(matches!(parse_cents("1.234"), Err(AmountParseError::Invalid(_))));
        assert!(matches!(parse_cents("1a.00"), Err(AmountParseError::Invalid(_))));
        assert!(matches!(
            parse_cents("99999999999999999999.00"),
            Err(AmountParseError::Overflow(_))
        ));
    }

    #[test]
    fn test_format_timestamp() {
        assert_eq!(format_timestamp(&datetime(2022, 11, 12, 4, 20, 20)), "12/11/2022 04:20:20");
        assert_eq!(format_timestamp(&datetime(2022, 11, 1, 4, 20, 20)), "01/11/2022 04:20:20");
        assert_eq!(format_timestamp(&datetime(2022, 11, 1, 12, 5, 20)), "01/11/2022 12:05:20");
    }

    #[test]
    fn test_parse_timestamp() {
        let expected = datetime(2022, 11, 12, 4, 20, 20);
        assert_eq!(parse_timestamp("12/11/2022 04:20:20"), Some(expected));
        assert_eq!(parse_timestamp("2022-11-12T04:20:20"), Some(expected));
        assert_eq!(parse_timestamp("2022-11-12T04:20:20.000"), Some(expected));
        assert_eq!(parse_timestamp("2022-11-12T05:20:20+01:00"), Some(expected));
        assert_eq!(parse_timestamp("yesterday"), None);
    }

    #[test]
    fn test_escape_html() {
        assert_eq!(
            escape_html("<script>alert('x') & \"y\"</script>"),
            "&lt;script&gt;alert(&#39;x&#39;) &amp; &quot;y&quot;&lt;/script&gt;"
        );
        assert_eq!(escape_html("Dépôt N° 1"), "Dépôt N° 1");
    }
}
