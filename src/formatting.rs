use crate::config::FormatSettings;
use crate::value::Value;
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

/// Output formatter selected by a placeholder modifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Formatter {
    Number,
    Integer,
    Currency,
    DateFull,
    DateLong,
    DateMedium,
    DateShort,
}

impl Formatter {
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        match keyword {
            "number" => Some(Formatter::Number),
            "integer" => Some(Formatter::Integer),
            "currency" => Some(Formatter::Currency),
            "date_full" => Some(Formatter::DateFull),
            "date_long" => Some(Formatter::DateLong),
            "date_medium" => Some(Formatter::DateMedium),
            "date_short" => Some(Formatter::DateShort),
            _ => None,
        }
    }

    pub fn is_numeric(&self) -> bool {
        matches!(
            self,
            Formatter::Number | Formatter::Integer | Formatter::Currency
        )
    }

    /// Formats `value`, returning a description of the problem on failure.
    pub fn format(&self, value: &Value, settings: &FormatSettings) -> Result<String, String> {
        if value.is_null() {
            return Ok(String::new());
        }
        match self {
            Formatter::Number => {
                let n = to_number(value)?;
                Ok(group_decimal(n, 3, true, settings))
            }
            Formatter::Integer => {
                let n = to_number(value)?;
                Ok(group_decimal(n.round(), 0, false, settings))
            }
            Formatter::Currency => {
                let n = to_number(value)?;
                let digits = group_decimal(n.abs(), settings.currency_decimals, false, settings);
                let sign = if n < 0.0 { "-" } else { "" };
                Ok(format!("{}{}{}", sign, settings.currency_symbol, digits))
            }
            Formatter::DateFull => Ok(to_date(value)?.format("%A, %B %-d, %Y").to_string()),
            Formatter::DateLong => Ok(to_date(value)?.format("%B %-d, %Y").to_string()),
            Formatter::DateMedium => Ok(to_date(value)?.format("%b %-d, %Y").to_string()),
            Formatter::DateShort => Ok(to_date(value)?.format("%-m/%-d/%y").to_string()),
        }
    }
}

fn to_number(value: &Value) -> Result<f64, String> {
    match value {
        Value::Int(i) => Ok(*i as f64),
        Value::Float(f) => Ok(*f),
        Value::Text(text) => text
            .trim()
            .parse::<f64>()
            .map_err(|_| format!("'{}' is not a number", text)),
        other => Err(format!("cannot format a {} as a number", other.kind_name())),
    }
}

fn to_date(value: &Value) -> Result<NaiveDateTime, String> {
    match value {
        Value::Date(date) => Ok(*date),
        Value::Text(text) => {
            let text = text.trim();
            NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S")
                .or_else(|_| NaiveDateTime::parse_from_str(text, "%Y-%m-%d %H:%M:%S"))
                .or_else(|_| {
                    NaiveDate::parse_from_str(text, "%Y-%m-%d")
                        .map(|date| date.and_time(NaiveTime::MIN))
                })
                .map_err(|_| format!("'{}' is not a date", text))
        }
        other => Err(format!("cannot format a {} as a date", other.kind_name())),
    }
}

/// Renders `n` with `decimals` fraction digits and grouped thousands. When
/// `trim` is set, trailing fraction zeros are dropped.
fn group_decimal(n: f64, decimals: usize, trim: bool, settings: &FormatSettings) -> String {
    let fixed = format!("{:.*}", decimals, n.abs());
    let (int_part, frac_part) = match fixed.split_once('.') {
        Some((int_part, frac_part)) => (int_part, frac_part),
        None => (fixed.as_str(), ""),
    };
    let frac_part = if trim {
        frac_part.trim_end_matches('0')
    } else {
        frac_part
    };

    let mut grouped = String::new();
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(settings.grouping_separator);
        }
        grouped.push(ch);
    }

    let mut out = String::new();
    if n < 0.0 && fixed.chars().any(|c| c != '0' && c != '.') {
        out.push('-');
    }
    out.push_str(&grouped);
    if !frac_part.is_empty() {
        out.push(settings.decimal_separator);
        out.push_str(frac_part);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings() -> FormatSettings {
        FormatSettings::default()
    }

    #[test]
    fn test_number() {
        let f = Formatter::Number;
        assert_eq!(f.format(&Value::Float(1234567.5), &settings()).unwrap(), "1,234,567.5");
        assert_eq!(f.format(&Value::Int(12), &settings()).unwrap(), "12");
        assert_eq!(f.format(&Value::Float(0.12345), &settings()).unwrap(), "0.123");
        assert_eq!(f.format(&Value::Float(-1500.0), &settings()).unwrap(), "-1,500");
        assert_eq!(f.format(&"42.50".into(), &settings()).unwrap(), "42.5");
    }

    #[test]
    fn test_integer() {
        let f = Formatter::Integer;
        assert_eq!(f.format(&Value::Float(1999.6), &settings()).unwrap(), "2,000");
        assert_eq!(f.format(&Value::Int(-7), &settings()).unwrap(), "-7");
    }

    #[test]
    fn test_currency() {
        let f = Formatter::Currency;
        assert_eq!(f.format(&Value::Float(50.0), &settings()).unwrap(), "$50.00");
        assert_eq!(f.format(&Value::Float(-1234.5), &settings()).unwrap(), "-$1,234.50");

        let custom = FormatSettings {
            currency_symbol: "Rp ".to_string(),
            grouping_separator: '.',
            decimal_separator: ',',
            currency_decimals: 0,
        };
        assert_eq!(f.format(&Value::Int(1500000), &custom).unwrap(), "Rp 1.500.000");
    }

    #[test]
    fn test_dates() {
        let date: Value = NaiveDate::from_ymd_opt(2024, 3, 9).unwrap().into();
        assert_eq!(
            Formatter::DateFull.format(&date, &settings()).unwrap(),
            "Saturday, March 9, 2024"
        );
        assert_eq!(Formatter::DateLong.format(&date, &settings()).unwrap(), "March 9, 2024");
        assert_eq!(Formatter::DateMedium.format(&date, &settings()).unwrap(), "Mar 9, 2024");
        assert_eq!(Formatter::DateShort.format(&date, &settings()).unwrap(), "3/9/24");
        assert_eq!(
            Formatter::DateShort.format(&"2024-12-25".into(), &settings()).unwrap(),
            "12/25/24"
        );
    }

    #[test]
    fn test_format_errors() {
        assert!(Formatter::Number.format(&"abc".into(), &settings()).is_err());
        assert!(Formatter::DateLong.format(&Value::Int(3), &settings()).is_err());
        assert!(Formatter::Currency.format(&Value::Bool(true), &settings()).is_err());
    }

    #[test]
    fn test_null_formats_empty() {
        assert_eq!(Formatter::Currency.format(&Value::Null, &settings()).unwrap(), "");
    }
}
