use std::cmp::Ordering;
use std::fmt;

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, TimeDelta, Utc};
use rand::{Rng, RngCore};
use serde::Serialize;

use crate::types::{SqlType, TypeFamily};

/// Bound applied to the signed day/hour/second offsets of temporal values.
const TEMPORAL_SPREAD: i64 = 500;
/// Upper bound (exclusive) on the length of unbounded text.
const MAX_TEXT_LEN: usize = 20;
const LETTERS: &[u8] = b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// A single synthesized cell.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    Json(serde_json::Value),
    Uuid(uuid::Uuid),
    Date(NaiveDate),
    Time(NaiveTime),
    TimeTz(NaiveTime),
    Timestamp(NaiveDateTime),
    TimestampTz(DateTime<Utc>),
    #[serde(serialize_with = "serialize_interval")]
    Interval(TimeDelta),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Stable textual key used for uniqueness bookkeeping. `None` for NULL,
    /// which never equals anything.
    pub fn key(&self) -> Option<String> {
        match self {
            Self::Null => None,
            other => Some(other.to_string()),
        }
    }

    /// Ordering between two values of the same variant; `None` otherwise.
    pub fn compare(&self, other: &Self) -> Option<Ordering> {
        match (self, other) {
            (Self::Int(a), Self::Int(b)) => Some(a.cmp(b)),
            (Self::Float(a), Self::Float(b)) => a.partial_cmp(b),
            (Self::Text(a), Self::Text(b)) => Some(a.cmp(b)),
            (Self::Date(a), Self::Date(b)) => Some(a.cmp(b)),
            (Self::Time(a), Self::Time(b)) | (Self::TimeTz(a), Self::TimeTz(b)) => Some(a.cmp(b)),
            (Self::Timestamp(a), Self::Timestamp(b)) => Some(a.cmp(b)),
            (Self::TimestampTz(a), Self::TimestampTz(b)) => Some(a.cmp(b)),
            (Self::Interval(a), Self::Interval(b)) => Some(a.cmp(b)),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => f.write_str("NULL"),
            Self::Bool(value) => write!(f, "{value}"),
            Self::Int(value) => write!(f, "{value}"),
            Self::Float(value) => write!(f, "{value}"),
            Self::Text(value) => f.write_str(value),
            Self::Json(value) => write!(f, "{value}"),
            Self::Uuid(value) => write!(f, "{value}"),
            Self::Date(value) => write!(f, "{}", value.format("%Y-%m-%d")),
            Self::Time(value) => write!(f, "{}", value.format("%H:%M:%S")),
            Self::TimeTz(value) => write!(f, "{}+00", value.format("%H:%M:%S")),
            Self::Timestamp(value) => write!(f, "{}", value.format("%Y-%m-%d %H:%M:%S")),
            Self::TimestampTz(value) => write!(f, "{}", value.format("%Y-%m-%d %H:%M:%S%:z")),
            Self::Interval(value) => write!(f, "{} seconds", value.num_seconds()),
        }
    }
}

fn serialize_interval<S>(value: &TimeDelta, serializer: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    serializer.serialize_i64(value.num_seconds())
}

/// Per-call inputs for value synthesis: the run's reference clock and its
/// random source.
pub struct ValueContext<'a> {
    pub now: DateTime<Utc>,
    pub rng: &'a mut dyn RngCore,
}

impl<'a> ValueContext<'a> {
    pub fn new(now: DateTime<Utc>, rng: &'a mut dyn RngCore) -> Self {
        Self { now, rng }
    }
}

/// Default synthesis for a column with no directive, dispatched on family.
pub fn random_value(sql_type: &SqlType, ctx: &mut ValueContext<'_>) -> Value {
    let rng = &mut *ctx.rng;
    match sql_type.family {
        TypeFamily::Int => {
            let max = if sql_type.width == Some(2) {
                i64::from(i16::MAX)
            } else {
                i64::from(i32::MAX)
            };
            Value::Int(rng.random_range(0..=max))
        }
        TypeFamily::Float | TypeFamily::Decimal => Value::Float(rng.random::<f64>()),
        TypeFamily::String => Value::Text(random_text(sql_type, rng)),
        TypeFamily::Bool => Value::Bool(rng.random_bool(0.5)),
        TypeFamily::Date => {
            let days = spread(rng);
            Value::Date(ctx.now.date_naive() + TimeDelta::days(days))
        }
        TypeFamily::Time => Value::Time(shift_time(ctx.now.time(), spread(rng))),
        TypeFamily::TimeTz => Value::TimeTz(shift_time(ctx.now.time(), spread(rng))),
        TypeFamily::Timestamp => {
            Value::Timestamp(ctx.now.naive_utc() + TimeDelta::hours(spread(rng)))
        }
        TypeFamily::TimestampTz => Value::TimestampTz(ctx.now + TimeDelta::hours(spread(rng))),
        TypeFamily::Interval => Value::Interval(TimeDelta::seconds(spread(rng))),
        TypeFamily::Json => Value::Json(serde_json::Value::Object(serde_json::Map::new())),
        TypeFamily::Uuid => {
            let mut bytes = [0_u8; 16];
            rng.fill_bytes(&mut bytes);
            Value::Uuid(uuid::Builder::from_random_bytes(bytes).into_uuid())
        }
        TypeFamily::Other => Value::Null,
    }
}

fn spread(rng: &mut dyn RngCore) -> i64 {
    rng.random_range(-TEMPORAL_SPREAD..TEMPORAL_SPREAD)
}

fn shift_time(time: NaiveTime, seconds: i64) -> NaiveTime {
    time.overflowing_add_signed(TimeDelta::seconds(seconds)).0
}

fn random_text(sql_type: &SqlType, rng: &mut dyn RngCore) -> String {
    let len = if sql_type.is_fixed_char() {
        1
    } else {
        let upper = sql_type
            .max_chars()
            .map(|width| width.saturating_add(1).min(MAX_TEXT_LEN))
            .unwrap_or(MAX_TEXT_LEN);
        rng.random_range(0..upper)
    };
    (0..len)
        .map(|_| LETTERS[rng.random_range(0..LETTERS.len())] as char)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn integers_respect_width() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let mut ctx = ValueContext::new(now(), &mut rng);
        let smallint = SqlType::from_pg_name("int2", &[], false);
        for _ in 0..200 {
            match random_value(&smallint, &mut ctx) {
                Value::Int(v) => assert!((0..=i64::from(i16::MAX)).contains(&v)),
                other => panic!("unexpected value {other:?}"),
            }
        }
    }

    #[test]
    fn text_lengths_follow_declared_width() {
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        let mut ctx = ValueContext::new(now(), &mut rng);
        let fixed = SqlType::from_pg_name("bpchar", &[4], false);
        let short = SqlType::from_pg_name("varchar", &[3], false);
        let text = SqlType::from_pg_name("text", &[], false);
        for _ in 0..200 {
            let Value::Text(v) = random_value(&fixed, &mut ctx) else {
                panic!("expected text");
            };
            assert_eq!(v.chars().count(), 1);
            let Value::Text(v) = random_value(&short, &mut ctx) else {
                panic!("expected text");
            };
            assert!(v.chars().count() <= 3);
            let Value::Text(v) = random_value(&text, &mut ctx) else {
                panic!("expected text");
            };
            assert!(v.chars().count() < MAX_TEXT_LEN);
        }
    }

    #[test]
    fn temporal_values_stay_near_reference() {
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let mut ctx = ValueContext::new(now(), &mut rng);
        let date = SqlType::from_pg_name("date", &[], false);
        let ts = SqlType::from_pg_name("timestamptz", &[], false);
        for _ in 0..100 {
            let Value::Date(d) = random_value(&date, &mut ctx) else {
                panic!("expected date");
            };
            assert!((d - now().date_naive()).num_days().abs() <= TEMPORAL_SPREAD);
            let Value::TimestampTz(t) = random_value(&ts, &mut ctx) else {
                panic!("expected timestamptz");
            };
            assert!((t - now()).num_hours().abs() <= TEMPORAL_SPREAD);
        }
    }

    #[test]
    fn json_uuid_and_other_families() {
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let mut ctx = ValueContext::new(now(), &mut rng);
        let json = random_value(&SqlType::from_pg_name("jsonb", &[], false), &mut ctx);
        assert_eq!(json.to_string(), "{}");
        let a = random_value(&SqlType::from_pg_name("uuid", &[], false), &mut ctx);
        let b = random_value(&SqlType::from_pg_name("uuid", &[], false), &mut ctx);
        assert_ne!(a, b);
        let other = random_value(&SqlType::from_pg_name("inet", &[], false), &mut ctx);
        assert!(other.is_null());
        assert_eq!(other.key(), None);
    }
}
