//! Option value kinds and their CLI text forms
//!
//! Each kind carries its own parse/serialize pair, chosen when the option is
//! declared:
//!
//! | Kind      | Serialized suffix       | Tokens                |
//! |-----------|-------------------------|-----------------------|
//! | `Bool`    | (bare flag)             | (none)                |
//! | `Enum`    | ` "mp4"` (lower-cased)  | `mp4`                 |
//! | `Date`    | ` 20200322`             | `20200322`            |
//! | `Str`     | ` "value"`              | `value`               |
//! | `Int`     | ` 42`                   | `42`                  |
//! | `Float`   | ` 1.5`                  | `1.5`                 |
//! | `StrList` | ` "a" "b"`              | `a`, `b`              |

use chrono::NaiveDate;
use std::fmt;

use crate::core::error::{YtdlError, YtdlResult};

/// Fixed 8-digit date form used by yt-dlp (`--dateafter 20190101`).
pub const DATE_FORMAT: &str = "%Y%m%d";

/// Value kind of an option, selected at declaration time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    Bool,
    /// Enumerated value; the first name is the unset default. An empty list
    /// accepts any name.
    Enum(&'static [&'static str]),
    Date,
    Str,
    Int,
    Float,
    StrList,
}

/// A typed option value.
#[derive(Debug, Clone, PartialEq)]
pub enum OptionValue {
    Bool(bool),
    Enum(String),
    Date(NaiveDate),
    Str(String),
    Int(i64),
    Float(f64),
    StrList(Vec<String>),
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ValueKind::Bool => "boolean",
            ValueKind::Enum(_) => "enumerated value",
            ValueKind::Date => "date (YYYYMMDD)",
            ValueKind::Str => "string",
            ValueKind::Int => "integer",
            ValueKind::Float => "number",
            ValueKind::StrList => "list of strings",
        };
        f.write_str(name)
    }
}

impl ValueKind {
    /// Parses the value token(s) that followed a flag.
    ///
    /// `flag` is only used for error messages. Boolean options ignore the raw
    /// text: their presence means `true`.
    pub fn parse(self, flag: &str, raw: &str) -> YtdlResult<OptionValue> {
        let raw = raw.trim();
        match self {
            ValueKind::Bool => Ok(OptionValue::Bool(true)),
            ValueKind::Enum(names) => {
                let text = strip_quotes(raw);
                if names.is_empty() {
                    return Ok(OptionValue::Enum(text.to_lowercase()));
                }
                names
                    .iter()
                    .find(|name| name.eq_ignore_ascii_case(text))
                    .map(|name| OptionValue::Enum((*name).to_string()))
                    .ok_or_else(|| {
                        YtdlError::value_conversion(flag, raw, format!("expected one of: {}", names.join(", ")))
                    })
            }
            ValueKind::Date => parse_date(strip_quotes(raw))
                .map(OptionValue::Date)
                .ok_or_else(|| YtdlError::value_conversion(flag, raw, "expected a date as YYYYMMDD")),
            ValueKind::Str => Ok(OptionValue::Str(strip_quotes(raw).to_string())),
            ValueKind::Int => strip_quotes(raw)
                .parse::<i64>()
                .map(OptionValue::Int)
                .map_err(|e| YtdlError::value_conversion(flag, raw, e.to_string())),
            ValueKind::Float => strip_quotes(raw)
                .parse::<f64>()
                .map(OptionValue::Float)
                .map_err(|e| YtdlError::value_conversion(flag, raw, e.to_string())),
            ValueKind::StrList => Ok(OptionValue::StrList(split_quoted(raw))),
        }
    }

    /// True if `value` equals this kind's default, i.e. setting it means "unset".
    pub fn is_default(self, value: &OptionValue) -> bool {
        match (self, value) {
            (ValueKind::Bool, OptionValue::Bool(b)) => !b,
            (ValueKind::Enum(names), OptionValue::Enum(name)) => names.first().is_some_and(|first| first == name),
            (ValueKind::StrList, OptionValue::StrList(list)) => list.is_empty(),
            _ => false,
        }
    }

    /// True if `value` can be stored in an option of this kind.
    pub fn accepts(self, value: &OptionValue) -> bool {
        match (self, value) {
            (ValueKind::Enum(names), OptionValue::Enum(name)) => {
                names.is_empty() || names.iter().any(|n| n == name)
            }
            (ValueKind::Bool, OptionValue::Bool(_))
            | (ValueKind::Date, OptionValue::Date(_))
            | (ValueKind::Str, OptionValue::Str(_))
            | (ValueKind::Int, OptionValue::Int(_))
            | (ValueKind::Float, OptionValue::Float(_))
            | (ValueKind::StrList, OptionValue::StrList(_)) => true,
            _ => false,
        }
    }
}

impl OptionValue {
    /// The kind a value of this variant naturally belongs to.
    pub fn natural_kind(&self) -> ValueKind {
        match self {
            OptionValue::Bool(_) => ValueKind::Bool,
            OptionValue::Enum(_) => ValueKind::Enum(&[]),
            OptionValue::Date(_) => ValueKind::Date,
            OptionValue::Str(_) => ValueKind::Str,
            OptionValue::Int(_) => ValueKind::Int,
            OptionValue::Float(_) => ValueKind::Float,
            OptionValue::StrList(_) => ValueKind::StrList,
        }
    }

    /// Text appended after the flag in the serialized (config file) form,
    /// including the separating space. Empty for booleans.
    pub fn cli_suffix(&self) -> String {
        match self {
            OptionValue::Bool(_) => String::new(),
            OptionValue::Enum(name) => format!(" \"{}\"", name.to_lowercase()),
            OptionValue::Date(date) => format!(" {}", date.format(DATE_FORMAT)),
            OptionValue::Str(s) => format!(" \"{}\"", s),
            OptionValue::Int(n) => format!(" {}", n),
            OptionValue::Float(x) => format!(" {}", x),
            OptionValue::StrList(list) => list.iter().map(|v| format!(" \"{}\"", v)).collect(),
        }
    }

    /// Raw argument tokens following the flag when spawning the process directly.
    pub fn tokens(&self) -> Vec<String> {
        match self {
            OptionValue::Bool(_) => Vec::new(),
            OptionValue::Enum(name) => vec![name.to_lowercase()],
            OptionValue::Date(date) => vec![date.format(DATE_FORMAT).to_string()],
            OptionValue::Str(s) => vec![s.clone()],
            OptionValue::Int(n) => vec![n.to_string()],
            OptionValue::Float(x) => vec![x.to_string()],
            OptionValue::StrList(list) => list.clone(),
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            OptionValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            OptionValue::Str(s) | OptionValue::Enum(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            OptionValue::Int(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f64> {
        match self {
            OptionValue::Float(x) => Some(*x),
            _ => None,
        }
    }

    pub fn as_date(&self) -> Option<NaiveDate> {
        match self {
            OptionValue::Date(d) => Some(*d),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[String]> {
        match self {
            OptionValue::StrList(list) => Some(list),
            _ => None,
        }
    }
}

impl From<bool> for OptionValue {
    fn from(value: bool) -> Self {
        OptionValue::Bool(value)
    }
}

impl From<&str> for OptionValue {
    fn from(value: &str) -> Self {
        OptionValue::Str(value.to_string())
    }
}

impl From<String> for OptionValue {
    fn from(value: String) -> Self {
        OptionValue::Str(value)
    }
}

impl From<i64> for OptionValue {
    fn from(value: i64) -> Self {
        OptionValue::Int(value)
    }
}

impl From<f64> for OptionValue {
    fn from(value: f64) -> Self {
        OptionValue::Float(value)
    }
}

impl From<NaiveDate> for OptionValue {
    fn from(value: NaiveDate) -> Self {
        OptionValue::Date(value)
    }
}

impl From<Vec<String>> for OptionValue {
    fn from(value: Vec<String>) -> Self {
        OptionValue::StrList(value)
    }
}

/// Parses exactly eight digits as year, month and day.
fn parse_date(text: &str) -> Option<NaiveDate> {
    if text.len() != 8 || !text.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let year = text[..4].parse().ok()?;
    let month = text[4..6].parse().ok()?;
    let day = text[6..].parse().ok()?;
    NaiveDate::from_ymd_opt(year, month, day)
}

/// Removes one pair of surrounding double quotes, if present.
pub(crate) fn strip_quotes(text: &str) -> &str {
    text.strip_prefix('"')
        .and_then(|rest| rest.strip_suffix('"'))
        .unwrap_or(text)
}

/// Splits on whitespace outside double quotes and drops the quotes.
pub(crate) fn split_quoted(text: &str) -> Vec<String> {
    let mut parts = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut has_token = false;

    for c in text.chars() {
        match c {
            '"' => {
                in_quotes = !in_quotes;
                has_token = true;
            }
            c if c.is_whitespace() && !in_quotes => {
                if has_token {
                    parts.push(std::mem::take(&mut current));
                    has_token = false;
                }
            }
            c => {
                current.push(c);
                has_token = true;
            }
        }
    }
    if has_token {
        parts.push(current);
    }
    parts
}
