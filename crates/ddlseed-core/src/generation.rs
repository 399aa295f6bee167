//! Per-column generation overrides parsed from inline directives.
//!
//! A directive has the shape `<kind>:<value>` where kind is one of `oneof`,
//! `range` or `type` (a named preset). Values are parsed against the
//! column's type family when the directive is attached, so a column never
//! carries an override it cannot honour.

use std::cmp::Ordering;
use std::fmt;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime, TimeDelta};
use rand::Rng;
use thiserror::Error;

use crate::presets::Preset;
use crate::types::{SqlType, TypeFamily};
use crate::value::{Value, ValueContext};

pub const DATE_FORMAT: &str = "%d.%m.%Y";
pub const TIME_FORMAT: &str = "%H:%M:%S";
pub const TIMESTAMP_FORMAT: &str = "%d.%m.%Y %H:%M:%S";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DirectiveError {
    #[error("unknown generation type: {0}")]
    UnknownKind(String),
    #[error("invalid oneof value: {0}")]
    InvalidOneof(String),
    #[error("invalid range value: {value}, {reason}")]
    InvalidRange { value: String, reason: String },
    #[error("invalid {family} literal: {value}")]
    InvalidLiteral { value: String, family: &'static str },
    #[error("empty range: {from} is not below {to}")]
    EmptyRange { from: String, to: String },
    #[error("unknown generation preset: {0}")]
    UnknownPreset(String),
    #[error("generation type {kind} can be used only with {expected} types, got {actual}")]
    TypeMismatch {
        kind: String,
        expected: &'static str,
        actual: String,
    },
}

/// Directive tag, the text before the first `:`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenerationKind {
    Oneof,
    Range,
    Preset,
}

impl GenerationKind {
    pub fn parse(tag: &str) -> Result<Self, DirectiveError> {
        match tag {
            "oneof" => Ok(Self::Oneof),
            "range" => Ok(Self::Range),
            "type" => Ok(Self::Preset),
            other => Err(DirectiveError::UnknownKind(other.to_string())),
        }
    }

    pub fn tag(self) -> &'static str {
        match self {
            Self::Oneof => "oneof",
            Self::Range => "range",
            Self::Preset => "type",
        }
    }

    /// Whether a column of `family` may carry this kind of override.
    pub fn supports(self, family: TypeFamily) -> bool {
        match self {
            Self::Oneof => family.is_numeric() || family.is_temporal() || family == TypeFamily::String,
            Self::Range => family.is_numeric() || family.is_temporal(),
            Self::Preset => family == TypeFamily::String,
        }
    }

    fn expected(self) -> &'static str {
        match self {
            Self::Oneof => "numeric, string, date and time",
            Self::Range => "numeric, date and time",
            Self::Preset => "string",
        }
    }
}

/// A validated generation override attached to a column.
#[derive(Debug, Clone, PartialEq)]
pub enum GenerationType {
    Oneof(Oneof),
    Range(Range),
    Preset(Preset),
}

impl GenerationType {
    /// Parse `directive` (e.g. `range:[1 - 10]`) for a column of `sql_type`.
    pub fn parse(directive: &str, sql_type: &SqlType) -> Result<Self, DirectiveError> {
        let (tag, raw) = directive
            .split_once(':')
            .ok_or_else(|| DirectiveError::UnknownKind(directive.to_string()))?;
        let kind = GenerationKind::parse(tag.trim())?;
        let raw = raw.trim();

        let generation = match kind {
            GenerationKind::Preset => Self::Preset(raw.parse()?),
            GenerationKind::Oneof => {
                ensure_supported(kind, raw, sql_type)?;
                Self::Oneof(Oneof::parse(raw, sql_type.family)?)
            }
            GenerationKind::Range => {
                ensure_supported(kind, raw, sql_type)?;
                Self::Range(Range::parse(raw, sql_type.family)?)
            }
        };
        generation.validate(sql_type)?;
        Ok(generation)
    }

    pub fn kind(&self) -> GenerationKind {
        match self {
            Self::Oneof(_) => GenerationKind::Oneof,
            Self::Range(_) => GenerationKind::Range,
            Self::Preset(_) => GenerationKind::Preset,
        }
    }

    pub fn validate(&self, sql_type: &SqlType) -> Result<(), DirectiveError> {
        let kind = self.kind();
        if kind.supports(sql_type.family) {
            return Ok(());
        }
        let label = match self {
            Self::Preset(preset) => preset.as_str().to_string(),
            _ => kind.tag().to_string(),
        };
        Err(DirectiveError::TypeMismatch {
            kind: label,
            expected: kind.expected(),
            actual: sql_type.to_string(),
        })
    }

    pub fn generate(&self, sql_type: &SqlType, ctx: &mut ValueContext<'_>) -> Value {
        match self {
            Self::Oneof(oneof) => oneof.generate(ctx),
            Self::Range(range) => range.generate(ctx),
            Self::Preset(preset) => {
                let text = preset.generate(&mut *ctx.rng);
                match sql_type.max_chars() {
                    Some(width) => Value::Text(text.chars().take(width).collect()),
                    None => Value::Text(text),
                }
            }
        }
    }

    /// Directive text this override was parsed from, normalised.
    pub fn directive(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for GenerationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Oneof(oneof) => write!(f, "oneof:{}", oneof.raw),
            Self::Range(range) => write!(f, "range:{}", range.raw),
            Self::Preset(preset) => write!(f, "type:{preset}"),
        }
    }
}

fn ensure_supported(
    kind: GenerationKind,
    raw: &str,
    sql_type: &SqlType,
) -> Result<(), DirectiveError> {
    if kind.supports(sql_type.family) {
        Ok(())
    } else {
        Err(DirectiveError::TypeMismatch {
            kind: format!("{}:{raw}", kind.tag()),
            expected: kind.expected(),
            actual: sql_type.to_string(),
        })
    }
}

/// Uniform choice among a fixed set of literals.
#[derive(Debug, Clone, PartialEq)]
pub struct Oneof {
    pub values: Vec<Value>,
    raw: String,
}

impl Oneof {
    pub fn parse(raw: &str, family: TypeFamily) -> Result<Self, DirectiveError> {
        let inner = bracketed(raw).ok_or_else(|| DirectiveError::InvalidOneof(raw.to_string()))?;
        if inner.trim().is_empty() {
            return Err(DirectiveError::InvalidOneof(raw.to_string()));
        }
        let values = inner
            .split(',')
            .map(|literal| parse_literal(literal.trim(), family))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            values,
            raw: raw.to_string(),
        })
    }

    pub fn generate(&self, ctx: &mut ValueContext<'_>) -> Value {
        let idx = ctx.rng.random_range(0..self.values.len());
        self.values[idx].clone()
    }
}

/// Uniform draw from the half-open interval `[from, to)`.
#[derive(Debug, Clone, PartialEq)]
pub struct Range {
    pub from: Value,
    pub to: Value,
    raw: String,
}

impl Range {
    pub fn parse(raw: &str, family: TypeFamily) -> Result<Self, DirectiveError> {
        let invalid = |reason: &str| DirectiveError::InvalidRange {
            value: raw.to_string(),
            reason: reason.to_string(),
        };
        let inner = bracketed(raw).ok_or_else(|| invalid("expected [from - to]"))?;
        let bounds: Vec<&str> = inner.split(" - ").collect();
        let [from, to] = bounds.as_slice() else {
            return Err(invalid("expected exactly two bounds"));
        };
        let (from, to) = (from.trim(), to.trim());
        if from.is_empty() || to.is_empty() {
            return Err(invalid("bounds must not be empty"));
        }

        let from = parse_literal(from, family)?;
        let to = parse_literal(to, family)?;
        if let (Value::Float(lo), Value::Float(hi)) = (&from, &to)
            && !(lo.is_finite() && hi.is_finite() && (hi - lo).is_finite())
        {
            return Err(invalid("bounds and their span must be finite"));
        }
        if from.compare(&to) != Some(Ordering::Less) {
            return Err(DirectiveError::EmptyRange {
                from: from.to_string(),
                to: to.to_string(),
            });
        }
        Ok(Self {
            from,
            to,
            raw: raw.to_string(),
        })
    }

    pub fn generate(&self, ctx: &mut ValueContext<'_>) -> Value {
        let rng = &mut *ctx.rng;
        match (&self.from, &self.to) {
            (Value::Int(from), Value::Int(to)) => Value::Int(rng.random_range(*from..*to)),
            (Value::Float(from), Value::Float(to)) => Value::Float(rng.random_range(*from..*to)),
            (Value::Date(from), Value::Date(to)) => {
                let days = (*to - *from).num_days();
                Value::Date(*from + TimeDelta::days(rng.random_range(0..days)))
            }
            (Value::Time(from), Value::Time(to)) => {
                let seconds = (*to - *from).num_seconds();
                Value::Time(*from + TimeDelta::seconds(rng.random_range(0..seconds)))
            }
            (Value::TimeTz(from), Value::TimeTz(to)) => {
                let seconds = (*to - *from).num_seconds();
                Value::TimeTz(*from + TimeDelta::seconds(rng.random_range(0..seconds)))
            }
            (Value::Timestamp(from), Value::Timestamp(to)) => {
                let seconds = (*to - *from).num_seconds();
                Value::Timestamp(*from + TimeDelta::seconds(rng.random_range(0..seconds)))
            }
            (Value::TimestampTz(from), Value::TimestampTz(to)) => {
                let seconds = (*to - *from).num_seconds();
                Value::TimestampTz(*from + TimeDelta::seconds(rng.random_range(0..seconds)))
            }
            _ => Value::Null,
        }
    }
}

fn bracketed(raw: &str) -> Option<&str> {
    raw.strip_prefix('[')?.strip_suffix(']')
}

/// Parse one directive literal into a value of `family`.
pub fn parse_literal(literal: &str, family: TypeFamily) -> Result<Value, DirectiveError> {
    let invalid = || DirectiveError::InvalidLiteral {
        value: literal.to_string(),
        family: family.as_str(),
    };
    let value = match family {
        TypeFamily::Int => Value::Int(literal.parse().map_err(|_| invalid())?),
        TypeFamily::Float | TypeFamily::Decimal => {
            Value::Float(literal.parse().map_err(|_| invalid())?)
        }
        TypeFamily::String => Value::Text(literal.to_string()),
        TypeFamily::Date => {
            Value::Date(NaiveDate::parse_from_str(literal, DATE_FORMAT).map_err(|_| invalid())?)
        }
        TypeFamily::Time => {
            Value::Time(NaiveTime::parse_from_str(literal, TIME_FORMAT).map_err(|_| invalid())?)
        }
        TypeFamily::TimeTz => {
            Value::TimeTz(NaiveTime::parse_from_str(literal, TIME_FORMAT).map_err(|_| invalid())?)
        }
        TypeFamily::Timestamp => Value::Timestamp(
            NaiveDateTime::parse_from_str(literal, TIMESTAMP_FORMAT).map_err(|_| invalid())?,
        ),
        TypeFamily::TimestampTz => Value::TimestampTz(
            NaiveDateTime::parse_from_str(literal, TIMESTAMP_FORMAT)
                .map_err(|_| invalid())?
                .and_utc(),
        ),
        _ => return Err(invalid()),
    };
    Ok(value)
}
