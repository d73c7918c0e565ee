//! A single yt-dlp option and its config-line syntax

use std::borrow::Cow;
use std::fmt;

use crate::core::error::{YtdlError, YtdlResult};
use crate::options::catalog::OptionSpec;
use crate::options::value::{strip_quotes, OptionValue, ValueKind};

/// One CLI option: its aliases, value kind and current value(s).
///
/// Single-valued options hold at most one value; multi-valued options hold an
/// ordered sequence and emit one `flag value` pair per element. An option is
/// *set* exactly when it holds at least one value, so assigning the kind's
/// default (false, the first enum name, an empty list) clears it.
#[derive(Debug, Clone, PartialEq)]
pub struct CliOption {
    aliases: Vec<Cow<'static, str>>,
    kind: ValueKind,
    multi: bool,
    custom: bool,
    values: Vec<OptionValue>,
}

impl CliOption {
    pub fn new(aliases: &'static [&'static str], kind: ValueKind) -> Self {
        Self {
            aliases: aliases.iter().map(|a| Cow::Borrowed(*a)).collect(),
            kind,
            multi: false,
            custom: false,
            values: Vec::new(),
        }
    }

    pub fn new_multi(aliases: &'static [&'static str], kind: ValueKind) -> Self {
        Self {
            multi: true,
            ..Self::new(aliases, kind)
        }
    }

    pub(crate) fn from_spec(spec: &OptionSpec) -> Self {
        if spec.multi {
            Self::new_multi(spec.aliases, spec.kind)
        } else {
            Self::new(spec.aliases, spec.kind)
        }
    }

    /// A user-defined option not in the catalog. Its kind follows the value.
    pub fn custom(flag: impl Into<String>, value: impl Into<OptionValue>) -> Self {
        let value = value.into();
        let mut option = Self {
            aliases: vec![Cow::Owned(flag.into())],
            kind: value.natural_kind(),
            multi: false,
            custom: true,
            values: Vec::new(),
        };
        option.assign(value);
        option
    }

    /// Canonical flag: the first declared alias.
    pub fn flag(&self) -> &str {
        self.aliases.first().map(|a| a.as_ref()).unwrap_or_default()
    }

    pub fn aliases(&self) -> impl Iterator<Item = &str> {
        self.aliases.iter().map(|a| a.as_ref())
    }

    pub fn matches(&self, flag: &str) -> bool {
        self.aliases.iter().any(|a| a == flag)
    }

    pub fn kind(&self) -> ValueKind {
        self.kind
    }

    pub fn is_multi(&self) -> bool {
        self.multi
    }

    pub fn is_custom(&self) -> bool {
        self.custom
    }

    pub fn is_set(&self) -> bool {
        !self.values.is_empty()
    }

    /// Current value of a single-valued option (first element for multi).
    pub fn value(&self) -> Option<&OptionValue> {
        self.values.first()
    }

    pub fn values(&self) -> &[OptionValue] {
        &self.values
    }

    /// Replaces the current value(s) with `value`, after checking its kind.
    pub fn set(&mut self, value: OptionValue) -> YtdlResult<()> {
        self.check(&value)?;
        self.assign(value);
        Ok(())
    }

    /// Replaces the whole sequence of a multi-valued option.
    pub fn set_values(&mut self, values: Vec<OptionValue>) -> YtdlResult<()> {
        for value in &values {
            self.check(value)?;
        }
        self.assign_all(values);
        Ok(())
    }

    pub fn clear(&mut self) {
        self.values.clear();
    }

    /// Parses one `flag [value]` line into this option.
    ///
    /// The line is split at the first whitespace. The flag must be one of the
    /// aliases; the remainder is converted with the option's kind. Multi-valued
    /// options append, single-valued ones replace.
    pub fn set_from_str(&mut self, line: &str) -> YtdlResult<()> {
        let (flag, raw) = split_flag(line);
        if !self.matches(flag) {
            return Err(YtdlError::format(line.trim()));
        }
        let value = self.kind.parse(flag, raw)?;
        if self.multi {
            self.push(value);
        } else {
            self.assign(value);
        }
        Ok(())
    }

    /// Serialized form, one `flag value` string per held value.
    pub fn to_flags(&self) -> Vec<String> {
        let flag = self.flag();
        self.values
            .iter()
            .map(|v| format!("{}{}", flag, v.cli_suffix()))
            .collect()
    }

    /// Argument tokens for spawning the process directly.
    pub fn to_args(&self) -> Vec<String> {
        let flag = self.flag();
        self.values
            .iter()
            .flat_map(|v| std::iter::once(flag.to_string()).chain(v.tokens()))
            .collect()
    }

    pub(crate) fn assign(&mut self, value: OptionValue) {
        self.values.clear();
        if !self.kind.is_default(&value) {
            self.values.push(value);
        }
    }

    pub(crate) fn assign_all(&mut self, values: Vec<OptionValue>) {
        self.values.clear();
        for value in values {
            self.push(value);
        }
    }

    fn push(&mut self, value: OptionValue) {
        if !self.kind.is_default(&value) {
            self.values.push(value);
        }
    }

    fn check(&self, value: &OptionValue) -> YtdlResult<()> {
        if self.kind.accepts(value) {
            Ok(())
        } else {
            Err(YtdlError::value_conversion(
                self.flag(),
                format!("{:?}", value),
                format!("expected {}", self.kind),
            ))
        }
    }
}

impl fmt::Display for CliOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_flags().join(" "))
    }
}

/// Splits an option line into its flag and the (untrimmed) remainder.
pub(crate) fn split_flag(line: &str) -> (&str, &str) {
    let line = line.trim();
    line.split_once(char::is_whitespace).unwrap_or((line, ""))
}

/// Best-effort value for a flag the catalog does not know.
pub(crate) fn discovered_value(raw: &str) -> OptionValue {
    let raw = raw.trim();
    if raw.is_empty() {
        OptionValue::Bool(true)
    } else {
        OptionValue::Str(strip_quotes(raw).to_string())
    }
}
