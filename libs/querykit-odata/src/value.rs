//! Literal values and their OData text rendering.
//!
//! A [`Value`] is a single literal operand in a compiled query. Rendering is
//! pure and deterministic: the same value always produces the same text.

use bigdecimal::{BigDecimal, FromPrimitive};
use chrono::{DateTime, NaiveDate, NaiveTime, SecondsFormat, Utc};
use uuid::Uuid;

/// A literal operand in a query expression.
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Number(BigDecimal),
    Uuid(Uuid),
    DateTime(DateTime<Utc>),
    Date(NaiveDate),
    Time(NaiveTime),
    String(String),
}

impl Value {
    /// Render the literal in OData text form.
    ///
    /// Strings are single-quoted with embedded single quotes doubled.
    /// Numbers render in plain decimal form, booleans as `true`/`false`,
    /// and date-time values as `datetime'...'` ISO-8601 literals.
    #[must_use]
    pub fn to_odata_literal(&self) -> String {
        match self {
            Value::Null => "null".to_owned(),
            Value::Bool(b) => b.to_string(),
            Value::Number(n) => n.to_string(),
            Value::Uuid(u) => u.to_string(),
            Value::DateTime(dt) => format!(
                "datetime'{}'",
                dt.to_rfc3339_opts(SecondsFormat::Millis, true)
            ),
            Value::Date(d) => format!("datetime'{}'", d.format("%Y-%m-%d")),
            Value::Time(t) => format!("time'{}'", t.format("%H:%M:%S")),
            Value::String(s) => format!("'{}'", s.replace('\'', "''")),
        }
    }
}

/// Trait for types that can be converted to literal [`Value`]s.
pub trait IntoValue {
    /// Convert this value into a literal.
    fn into_value(self) -> Value;
}

impl IntoValue for Value {
    fn into_value(self) -> Value {
        self
    }
}

impl IntoValue for bool {
    fn into_value(self) -> Value {
        Value::Bool(self)
    }
}

impl IntoValue for Uuid {
    fn into_value(self) -> Value {
        Value::Uuid(self)
    }
}

impl IntoValue for String {
    fn into_value(self) -> Value {
        Value::String(self)
    }
}

impl IntoValue for &str {
    fn into_value(self) -> Value {
        Value::String(self.to_owned())
    }
}

impl IntoValue for i32 {
    fn into_value(self) -> Value {
        Value::Number(self.into())
    }
}

impl IntoValue for i64 {
    fn into_value(self) -> Value {
        Value::Number(self.into())
    }
}

impl IntoValue for u32 {
    fn into_value(self) -> Value {
        Value::Number(self.into())
    }
}

impl IntoValue for u64 {
    fn into_value(self) -> Value {
        Value::Number(self.into())
    }
}

impl IntoValue for f64 {
    fn into_value(self) -> Value {
        // NaN and infinities have no literal form.
        BigDecimal::from_f64(self).map_or(Value::Null, Value::Number)
    }
}

impl IntoValue for DateTime<Utc> {
    fn into_value(self) -> Value {
        Value::DateTime(self)
    }
}

impl IntoValue for NaiveDate {
    fn into_value(self) -> Value {
        Value::Date(self)
    }
}

impl IntoValue for NaiveTime {
    fn into_value(self) -> Value {
        Value::Time(self)
    }
}
