//! Record builder: one raw line in, one typed record (or a terminal error)
//! out.
//!
//! A line either converts completely or fails atomically; no partially
//! converted record is ever produced. The first failing column aborts the
//! record with the column name and index attached for diagnostics.

use anyhow::{Context, Result, bail};

use crate::{
    convert::{self, DEFAULT_DATE_FORMAT, DEFAULT_DATETIME_FORMAT},
    data::{Record, Value},
    schema::{ColumnMeta, ColumnType, Schema},
};

pub fn build_record(line: &str, schema: &Schema) -> Result<Record> {
    let fields: Vec<&str> = line.split(schema.delimiter).collect();
    if fields.len() != schema.columns.len() {
        bail!(
            "expected {} field(s), found {}",
            schema.columns.len(),
            fields.len()
        );
    }
    schema
        .columns
        .iter()
        .zip(fields)
        .enumerate()
        .map(|(idx, (column, field))| {
            convert_field(field, column)
                .with_context(|| format!("column '{}' (index {idx})", column.name))
        })
        .collect()
}

pub fn convert_field(raw: &str, column: &ColumnMeta) -> Result<Option<Value>> {
    let opts = &column.options;
    let value = Some(raw);
    let converted = match column.datatype {
        ColumnType::String => Ok(convert::normalize_string(value, opts).map(Value::String)),
        ColumnType::Byte => {
            convert::to_byte(value, opts.zero_for_null).map(|v| v.map(Value::Byte))
        }
        ColumnType::SmallInt => {
            convert::to_small_int(value, opts.zero_for_null).map(|v| v.map(Value::SmallInt))
        }
        ColumnType::Int => convert::to_int(value, opts.zero_for_null).map(|v| v.map(Value::Int)),
        ColumnType::BigInt => {
            convert::to_big_int(value, opts.zero_for_null).map(|v| v.map(Value::BigInt))
        }
        ColumnType::Real => {
            convert::to_real(value, opts.zero_for_null).map(|v| v.map(Value::Real))
        }
        ColumnType::Double => {
            convert::to_double(value, opts.zero_for_null).map(|v| v.map(Value::Double))
        }
        ColumnType::Decimal => {
            convert::to_decimal(value, opts.zero_for_null).map(|v| v.map(Value::Decimal))
        }
        ColumnType::Boolean => convert::to_boolean(value).map(|v| v.map(Value::Boolean)),
        ColumnType::Date => {
            let format = opts.format.as_deref().unwrap_or(DEFAULT_DATE_FORMAT);
            convert::to_date(value, format).map(|v| v.map(Value::Date))
        }
        ColumnType::DateTime => {
            let format = opts.format.as_deref().unwrap_or(DEFAULT_DATETIME_FORMAT);
            convert::to_datetime(value, format).map(|v| v.map(Value::DateTime))
        }
        ColumnType::Interval => convert::to_interval(value).map(|v| v.map(Value::Interval)),
    };
    Ok(converted?)
}
