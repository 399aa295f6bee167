use std::fmt;

use serde::{Deserialize, Serialize};

/// Coarse classification of a SQL type; value synthesis and directive
/// validation only ever look at the family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TypeFamily {
    Int,
    Float,
    Decimal,
    String,
    Bool,
    Date,
    Time,
    TimeTz,
    Timestamp,
    TimestampTz,
    Interval,
    Json,
    Uuid,
    Other,
}

impl TypeFamily {
    pub fn is_numeric(self) -> bool {
        matches!(self, Self::Int | Self::Float | Self::Decimal)
    }

    pub fn is_temporal(self) -> bool {
        matches!(
            self,
            Self::Date | Self::Time | Self::TimeTz | Self::Timestamp | Self::TimestampTz
        )
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Int => "int",
            Self::Float => "float",
            Self::Decimal => "decimal",
            Self::String => "string",
            Self::Bool => "bool",
            Self::Date => "date",
            Self::Time => "time",
            Self::TimeTz => "timetz",
            Self::Timestamp => "timestamp",
            Self::TimestampTz => "timestamptz",
            Self::Interval => "interval",
            Self::Json => "json",
            Self::Uuid => "uuid",
            Self::Other => "other",
        }
    }
}

/// Column type as declared in DDL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SqlType {
    /// Canonical Postgres type name (`int4`, `varchar`, `timestamptz`, ...).
    pub name: String,
    pub family: TypeFamily,
    /// Byte width for integers, declared length for character types.
    pub width: Option<u32>,
    /// Precision and scale for `numeric(p, s)`.
    pub precision: Option<u32>,
    pub scale: Option<u32>,
}

impl SqlType {
    pub fn new(name: impl Into<String>, family: TypeFamily) -> Self {
        Self {
            name: name.into(),
            family,
            width: None,
            precision: None,
            scale: None,
        }
    }

    pub fn with_width(mut self, width: u32) -> Self {
        self.width = Some(width);
        self
    }

    /// Map a Postgres type name plus its type modifiers onto a family.
    ///
    /// Array types and anything unrecognised land in [`TypeFamily::Other`].
    pub fn from_pg_name(name: &str, modifiers: &[i64], is_array: bool) -> Self {
        let name = name.to_ascii_lowercase();
        if is_array {
            return Self::new(format!("{name}[]"), TypeFamily::Other);
        }

        let first_modifier = modifiers.first().and_then(|m| u32::try_from(*m).ok());
        match name.as_str() {
            "int2" | "smallint" | "smallserial" | "serial2" => {
                Self::new("int2", TypeFamily::Int).with_width(2)
            }
            "int4" | "int" | "integer" | "serial" | "serial4" => {
                Self::new("int4", TypeFamily::Int).with_width(4)
            }
            "int8" | "bigint" | "bigserial" | "serial8" => {
                Self::new("int8", TypeFamily::Int).with_width(8)
            }
            "float4" | "real" => Self::new("float4", TypeFamily::Float),
            "float8" | "float" | "double precision" => Self::new("float8", TypeFamily::Float),
            "numeric" | "decimal" => {
                let mut ty = Self::new("numeric", TypeFamily::Decimal);
                ty.precision = first_modifier;
                ty.scale = modifiers.get(1).and_then(|m| u32::try_from(*m).ok());
                ty
            }
            "text" | "citext" | "name" => Self::new(name, TypeFamily::String),
            "varchar" | "character varying" => Self {
                width: first_modifier,
                ..Self::new("varchar", TypeFamily::String)
            },
            "bpchar" | "char" | "character" => {
                Self::new("bpchar", TypeFamily::String).with_width(first_modifier.unwrap_or(1))
            }
            "bool" | "boolean" => Self::new("bool", TypeFamily::Bool),
            "date" => Self::new("date", TypeFamily::Date),
            "time" => Self::new("time", TypeFamily::Time),
            "timetz" => Self::new("timetz", TypeFamily::TimeTz),
            "timestamp" => Self::new("timestamp", TypeFamily::Timestamp),
            "timestamptz" => Self::new("timestamptz", TypeFamily::TimestampTz),
            "interval" => Self::new("interval", TypeFamily::Interval),
            "json" | "jsonb" => Self::new(name, TypeFamily::Json),
            "uuid" => Self::new("uuid", TypeFamily::Uuid),
            _ => Self::new(name, TypeFamily::Other),
        }
    }

    /// `char(n)`: blank-padded, fixed-width character type.
    pub fn is_fixed_char(&self) -> bool {
        self.name == "bpchar"
    }

    /// Maximum character length for string types, if declared.
    pub fn max_chars(&self) -> Option<usize> {
        match self.family {
            TypeFamily::String => self.width.map(|w| w as usize),
            _ => None,
        }
    }
}

impl fmt::Display for SqlType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.family, self.width, self.precision, self.scale) {
            (TypeFamily::String, Some(width), _, _) => write!(f, "{}({width})", self.name),
            (TypeFamily::Decimal, _, Some(p), Some(s)) => write!(f, "{}({p},{s})", self.name),
            (TypeFamily::Decimal, _, Some(p), None) => write!(f, "{}({p})", self.name),
            _ => f.write_str(&self.name),
        }
    }
}
