use std::fmt;

use chrono::{NaiveDate, NaiveDateTime, TimeDelta};
use rust_decimal::Decimal;

/// A typed field value. The variant set mirrors the destination column
/// types; absence (SQL NULL) is carried by the surrounding `Option`, not by
/// the variant.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    String(String),
    Byte(u8),
    SmallInt(i16),
    Int(i32),
    BigInt(i64),
    Real(f32),
    Double(f64),
    Decimal(Decimal),
    Boolean(bool),
    Date(NaiveDate),
    DateTime(NaiveDateTime),
    Interval(TimeDelta),
}

/// One typed record, one cell per schema column in declaration order.
pub type Record = Vec<Option<Value>>;

impl Value {
    pub fn as_display(&self) -> String {
        match self {
            Value::String(s) => s.clone(),
            Value::Byte(v) => v.to_string(),
            Value::SmallInt(v) => v.to_string(),
            Value::Int(v) => v.to_string(),
            Value::BigInt(v) => v.to_string(),
            Value::Real(v) => v.to_string(),
            Value::Double(v) => v.to_string(),
            Value::Decimal(v) => v.to_string(),
            Value::Boolean(v) => v.to_string(),
            Value::Date(d) => d.format("%Y-%m-%d").to_string(),
            Value::DateTime(dt) => dt.format("%Y-%m-%d %H:%M:%S").to_string(),
            Value::Interval(td) => format_interval(td),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_display())
    }
}

fn format_interval(td: &TimeDelta) -> String {
    let negative = *td < TimeDelta::zero();
    let abs = if negative { -*td } else { *td };
    let total = abs.num_seconds();
    let millis = abs.subsec_nanos() / 1_000_000;
    let body = if millis > 0 {
        format!(
            "{}:{:02}:{:02}.{:03}",
            total / 3600,
            total % 3600 / 60,
            total % 60,
            millis
        )
    } else {
        format!("{}:{:02}:{:02}", total / 3600, total % 3600 / 60, total % 60)
    };
    if negative { format!("-{body}") } else { body }
}
