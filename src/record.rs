use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::{PipelineError, Stage};

pub const DATE_FIELD: &str = "Datum";
pub const RESULT_FIELD: &str = "Ergebnis";
pub const XG_FIELD: &str = "xG";
pub const XGA_FIELD: &str = "xGA";

pub const DATE_FORMAT: &str = "%d.%m.%Y";

/// One row of a team's schedule table.
///
/// Columns other than the four the pipeline reads are kept in `extra` so a
/// snapshot written from a live fetch still carries the whole row.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchRecord {
    #[serde(rename = "Datum")]
    pub date: String,
    #[serde(rename = "Ergebnis")]
    pub result: Option<String>,
    #[serde(rename = "xG")]
    pub xg: Option<f64>,
    #[serde(rename = "xGA")]
    pub xga: Option<f64>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl MatchRecord {
    pub fn played(date: &str, result: &str, xg: f64, xga: f64) -> Self {
        Self {
            date: date.to_string(),
            result: Some(result.to_string()),
            xg: Some(xg),
            xga: Some(xga),
            extra: BTreeMap::new(),
        }
    }

    pub fn scheduled(date: &str) -> Self {
        Self {
            date: date.to_string(),
            result: None,
            xg: None,
            xga: None,
            extra: BTreeMap::new(),
        }
    }

    /// A blank result counts as unplayed, same as a missing one.
    pub fn is_played(&self) -> bool {
        self.result
            .as_deref()
            .is_some_and(|result| !result.trim().is_empty())
    }

    /// Parses `Datum` as strict `DD.MM.YYYY`; chrono alone would take `1.8.2023`.
    pub fn parsed_date(&self, index: usize) -> Result<NaiveDate, PipelineError> {
        let raw = self.date.trim();
        let date_error = || PipelineError::DateParse {
            stage: Stage::Sort,
            index,
            value: self.date.clone(),
        };
        if !has_date_shape(raw) {
            return Err(date_error());
        }
        NaiveDate::parse_from_str(raw, DATE_FORMAT).map_err(|_| date_error())
    }

    /// Decodes one record, telling an absent key apart from a `null` value.
    ///
    /// A blank `Ergebnis` string counts as absent, same as `null`.
    pub fn from_json(index: usize, value: &Value) -> Result<Self, PipelineError> {
        let Some(obj) = value.as_object() else {
            return Err(PipelineError::NotAnObject {
                stage: Stage::Decode,
                index,
            });
        };

        let date = match require(obj, index, DATE_FIELD)? {
            Value::String(s) => s.clone(),
            other => {
                return Err(invalid(index, DATE_FIELD, other));
            }
        };

        let result = match require(obj, index, RESULT_FIELD)? {
            Value::Null => None,
            Value::String(s) if s.trim().is_empty() => None,
            Value::String(s) => Some(s.trim().to_string()),
            Value::Number(n) => Some(n.to_string()),
            other => return Err(invalid(index, RESULT_FIELD, other)),
        };

        let xg = decode_number(obj, index, XG_FIELD)?;
        let xga = decode_number(obj, index, XGA_FIELD)?;

        let extra = obj
            .iter()
            .filter(|(key, _)| !is_core_field(key))
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect();

        Ok(Self {
            date,
            result,
            xg,
            xga,
            extra,
        })
    }
}

pub fn decode_records(values: &[Value]) -> Result<Vec<MatchRecord>, PipelineError> {
    values
        .iter()
        .enumerate()
        .map(|(idx, value)| MatchRecord::from_json(idx, value))
        .collect()
}

/// Parses a stat cell, accepting a decimal comma.
pub fn parse_decimal(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    let normalized = trimmed.replace(',', ".");
    normalized.parse::<f64>().ok().filter(|v| v.is_finite())
}

fn has_date_shape(raw: &str) -> bool {
    let bytes = raw.as_bytes();
    bytes.len() == 10
        && bytes.iter().enumerate().all(|(idx, b)| match idx {
            2 | 5 => *b == b'.',
            _ => b.is_ascii_digit(),
        })
}

fn is_core_field(key: &str) -> bool {
    matches!(key, DATE_FIELD | RESULT_FIELD | XG_FIELD | XGA_FIELD)
}

fn require<'a>(
    obj: &'a Map<String, Value>,
    index: usize,
    field: &'static str,
) -> Result<&'a Value, PipelineError> {
    obj.get(field).ok_or(PipelineError::MissingField {
        stage: Stage::Decode,
        index,
        field,
    })
}

fn decode_number(
    obj: &Map<String, Value>,
    index: usize,
    field: &'static str,
) -> Result<Option<f64>, PipelineError> {
    match require(obj, index, field)? {
        Value::Null => Ok(None),
        Value::Number(n) => Ok(n.as_f64()),
        Value::String(s) if s.trim().is_empty() => Ok(None),
        Value::String(s) => parse_decimal(s)
            .map(Some)
            .ok_or_else(|| invalid(index, field, &Value::String(s.clone()))),
        other => Err(invalid(index, field, other)),
    }
}

fn invalid(index: usize, field: &'static str, value: &Value) -> PipelineError {
    PipelineError::InvalidValue {
        stage: Stage::Decode,
        index,
        field,
        value: value.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn null_and_absent_are_different() {
        let with_null = json!({"Datum": "15.08.2023", "Ergebnis": null, "xG": null, "xGA": null});
        let rec = MatchRecord::from_json(0, &with_null).expect("null is allowed");
        assert!(!rec.is_played());
        assert_eq!(rec.xg, None);

        let without_xga = json!({"Datum": "15.08.2023", "Ergebnis": null, "xG": null});
        let err = MatchRecord::from_json(4, &without_xga).unwrap_err();
        assert_eq!(
            err,
            PipelineError::MissingField {
                stage: Stage::Decode,
                index: 4,
                field: XGA_FIELD,
            }
        );
    }

    #[test]
    fn keeps_extra_columns() {
        let value = json!({
            "Datum": "01.08.2023",
            "Ergebnis": "S 1:0",
            "xG": 1.5,
            "xGA": "0,8",
            "Gegner": "Mainz 05",
            "Zuschauer": 22012
        });
        let rec = MatchRecord::from_json(0, &value).expect("valid record");
        assert_eq!(rec.xga, Some(0.8));
        assert_eq!(rec.extra.get("Gegner"), Some(&json!("Mainz 05")));
        assert_eq!(rec.extra.len(), 2);
    }

    #[test]
    fn rejects_non_numeric_xg() {
        let value = json!({"Datum": "01.08.2023", "Ergebnis": "1:0", "xG": "n/a", "xGA": 0.8});
        let err = MatchRecord::from_json(2, &value).unwrap_err();
        assert!(matches!(
            err,
            PipelineError::InvalidValue { field: XG_FIELD, index: 2, .. }
        ));
    }

    #[test]
    fn blank_result_is_not_played() {
        assert!(!MatchRecord::played("01.08.2023", "", 1.0, 1.0).is_played());
        assert!(!MatchRecord::played("01.08.2023", "  ", 1.0, 1.0).is_played());
        assert!(MatchRecord::played("01.08.2023", "1:0", 1.0, 1.0).is_played());
    }

    #[test]
    fn dates_need_two_digit_day_and_month() {
        let short = MatchRecord::played("1.8.2023", "1:0", 1.0, 1.0);
        assert_eq!(
            short.parsed_date(0),
            Err(PipelineError::DateParse {
                stage: Stage::Sort,
                index: 0,
                value: "1.8.2023".to_string(),
            })
        );
        assert!(has_date_shape("01.08.2023"));
        assert!(!has_date_shape("01-08-2023"));
        assert!(!has_date_shape("01.08.23"));

        let padded = MatchRecord::played(" 01.08.2023 ", "1:0", 1.0, 1.0);
        assert_eq!(
            padded.parsed_date(0),
            Ok(NaiveDate::from_ymd_opt(2023, 8, 1).expect("valid date"))
        );
    }

    #[test]
    fn decimal_comma() {
        assert_eq!(parse_decimal("1,7"), Some(1.7));
        assert_eq!(parse_decimal(" 0.4 "), Some(0.4));
        assert_eq!(parse_decimal(""), None);
        assert_eq!(parse_decimal("abc"), None);
    }
}
