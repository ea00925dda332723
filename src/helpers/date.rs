//! Date helper functions

use chrono::{DateTime, FixedOffset, Locale, TimeZone};

/// Parse an upstream publication timestamp
///
/// The API emits `2021-03-15T19:25:28+0000`; RFC 3339 is accepted as well.
pub fn parse_timestamp(value: &str) -> Option<DateTime<FixedOffset>> {
    DateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%z")
        .or_else(|_| DateTime::parse_from_rfc3339(value))
        .ok()
}

/// Format a date using a date-fns compatible format string
///
/// # Examples
/// ```ignore
/// format_date(&date, "dd MMM yyyy", Locale::pt_BR) // -> "25 mar 2021"
/// ```
pub fn format_date<Tz: TimeZone>(date: &DateTime<Tz>, format: &str, locale: Locale) -> String
where
    Tz::Offset: std::fmt::Display,
{
    let chrono_format = date_fns_to_chrono_format(format);
    date.format_localized(&chrono_format, locale).to_string()
}

/// Parse, shift into `tz` and format; `None` when the value is not a timestamp
pub fn format_timestamp(
    value: &str,
    format: &str,
    locale: Locale,
    tz: chrono_tz::Tz,
) -> Option<String> {
    let date = parse_timestamp(value)?.with_timezone(&tz);
    Some(format_date(&date, format, locale))
}

/// Format a date in ISO 8601 / XML format
pub fn date_xml<Tz: TimeZone>(date: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    date.format("%Y-%m-%dT%H:%M:%S%:z").to_string()
}

/// Convert date-fns tokens (`dd MMM yyyy`) to chrono specifiers
fn date_fns_to_chrono_format(format: &str) -> String {
    let chars: Vec<char> = format.chars().collect();
    let mut result = String::with_capacity(format.len() * 2);
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];

        // Quoted literal text: 'de'
        if c == '\'' {
            i += 1;
            while i < chars.len() && chars[i] != '\'' {
                push_literal(&mut result, chars[i]);
                i += 1;
            }
            i += 1;
            continue;
        }

        let mut run = 1;
        while i + run < chars.len() && chars[i + run] == c {
            run += 1;
        }

        let spec = match (c, run) {
            ('y', 2) => Some("%y"),
            ('y', _) => Some("%Y"),
            ('M' | 'L', 1) => Some("%-m"),
            ('M' | 'L', 2) => Some("%m"),
            ('M' | 'L', 3) => Some("%b"),
            ('M' | 'L', _) => Some("%B"),
            ('d', 1) => Some("%-d"),
            ('d', _) => Some("%d"),
            ('E', 4) => Some("%A"),
            ('E', _) => Some("%a"),
            ('H', 1) => Some("%-H"),
            ('H', _) => Some("%H"),
            ('h', 1) => Some("%-I"),
            ('h', _) => Some("%I"),
            ('m', 1) => Some("%-M"),
            ('m', _) => Some("%M"),
            ('s', 1) => Some("%-S"),
            ('s', _) => Some("%S"),
            ('a', _) => Some("%p"),
            _ => None,
        };

        match spec {
            Some(spec) => result.push_str(spec),
            None => {
                for _ in 0..run {
                    push_literal(&mut result, c);
                }
            }
        }
        i += run;
    }

    result
}

fn push_literal(out: &mut String, c: char) {
    if c == '%' {
        out.push_str("%%");
    } else {
        out.push(c);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn test_parse_upstream_timestamp() {
        let date = parse_timestamp("2021-03-25T19:25:28+0000").unwrap();
        assert_eq!(
            date.with_timezone(&Utc).to_rfc3339(),
            "2021-03-25T19:25:28+00:00"
        );
        assert!(parse_timestamp("2021-03-25T19:25:28+00:00").is_some());
        assert!(parse_timestamp("yesterday").is_none());
    }

    #[test]
    fn test_format_date() {
        let date = Utc.with_ymd_and_hms(2021, 3, 25, 19, 25, 28).unwrap();
        assert_eq!(format_date(&date, "dd MMM yyyy", Locale::en_US), "25 Mar 2021");
        assert_eq!(format_date(&date, "yyyy-MM-dd", Locale::en_US), "2021-03-25");
    }

    #[test]
    fn test_format_localized_month() {
        let date = Utc.with_ymd_and_hms(2021, 3, 25, 19, 25, 28).unwrap();
        let formatted = format_date(&date, "dd MMM yyyy", Locale::pt_BR);
        assert!(formatted.starts_with("25 "));
        assert!(formatted.ends_with(" 2021"));
        assert!(formatted.to_lowercase().contains("mar"));
    }

    #[test]
    fn test_format_timestamp_shifts_timezone() {
        let formatted = format_timestamp(
            "2021-03-26T01:00:00+0000",
            "dd/MM/yyyy",
            Locale::en_US,
            chrono_tz::America::Sao_Paulo,
        );
        assert_eq!(formatted.as_deref(), Some("25/03/2021"));
    }

    #[test]
    fn test_date_fns_to_chrono() {
        assert_eq!(date_fns_to_chrono_format("dd MMM yyyy"), "%d %b %Y");
        assert_eq!(date_fns_to_chrono_format("dd LLL yyyy"), "%d %b %Y");
        assert_eq!(date_fns_to_chrono_format("d 'de' MMMM"), "%-d de %B");
        assert_eq!(date_fns_to_chrono_format("HH:mm"), "%H:%M");
    }
}
