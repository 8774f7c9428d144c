//! Schema model and YAML persistence.
//!
//! A schema fixes the destination table name (used only as a diagnostic
//! label), the field delimiter, and the ordered column list with per-column
//! converter options. It is constructed once at startup from a YAML document
//! and is immutable for the process lifetime.

use std::{fmt, fs, path::Path};

use anyhow::{Context, Result, bail, ensure};
use itertools::Itertools;
use log::warn;
use serde::{Deserialize, Serialize};

use crate::convert::ConvertOptions;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Schema {
    /// Destination table/object name; used for progress and error labeling.
    pub table: String,
    /// Field delimiter, fixed at schema-generation time.
    pub delimiter: char,
    pub columns: Vec<ColumnMeta>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ColumnMeta {
    pub name: String,
    pub datatype: ColumnType,
    #[serde(default)]
    pub options: ConvertOptions,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum ColumnType {
    String,
    Byte,
    SmallInt,
    Int,
    BigInt,
    Real,
    Double,
    Decimal,
    Boolean,
    Date,
    DateTime,
    Interval,
}

impl ColumnType {
    /// Types whose strict parse is driven by a format pattern option.
    pub fn uses_format_pattern(&self) -> bool {
        matches!(self, ColumnType::Date | ColumnType::DateTime)
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ColumnType::String => "String",
            ColumnType::Byte => "Byte",
            ColumnType::SmallInt => "SmallInt",
            ColumnType::Int => "Int",
            ColumnType::BigInt => "BigInt",
            ColumnType::Real => "Real",
            ColumnType::Double => "Double",
            ColumnType::Decimal => "Decimal",
            ColumnType::Boolean => "Boolean",
            ColumnType::Date => "Date",
            ColumnType::DateTime => "DateTime",
            ColumnType::Interval => "Interval",
        };
        write!(f, "{name}")
    }
}

impl Schema {
    pub fn load(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("Reading schema file {path:?}"))?;
        let schema: Schema = serde_yaml::from_str(&raw)
            .with_context(|| format!("Parsing schema file {path:?}"))?;
        schema.validate()?;
        Ok(schema)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let serialized = serde_yaml::to_string(self).context("Serializing schema")?;
        fs::write(path, serialized).with_context(|| format!("Writing schema file {path:?}"))
    }

    pub fn validate(&self) -> Result<()> {
        ensure!(
            !self.table.trim().is_empty(),
            "Schema table name cannot be empty"
        );
        ensure!(
            !self.columns.is_empty(),
            "Schema '{}' defines no columns",
            self.table
        );
        let duplicates = self
            .columns
            .iter()
            .map(|column| column.name.as_str())
            .duplicates()
            .collect::<Vec<_>>();
        if !duplicates.is_empty() {
            bail!(
                "Schema '{}' has duplicate column name(s): {}",
                self.table,
                duplicates.iter().join(", ")
            );
        }
        for column in &self.columns {
            ensure!(
                !column.name.trim().is_empty(),
                "Schema '{}' has a column with an empty name",
                self.table
            );
            if column.options.format.is_some() && !column.datatype.uses_format_pattern() {
                warn!(
                    "Column '{}' sets a format pattern but type {} does not use one",
                    column.name, column.datatype
                );
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn column(name: &str, datatype: ColumnType) -> ColumnMeta {
        ColumnMeta {
            name: name.to_string(),
            datatype,
            options: ConvertOptions::default(),
        }
    }

    #[test]
    fn validate_rejects_duplicate_column_names() {
        let schema = Schema {
            table: "trades".to_string(),
            delimiter: '\t',
            columns: vec![column("id", ColumnType::BigInt), column("id", ColumnType::Int)],
        };
        let err = schema.validate().unwrap_err();
        assert!(err.to_string().contains("duplicate column name"));
    }

    #[test]
    fn validate_rejects_empty_column_list() {
        let schema = Schema {
            table: "trades".to_string(),
            delimiter: '\t',
            columns: Vec::new(),
        };
        assert!(schema.validate().is_err());
    }

    #[test]
    fn format_patterns_drive_date_and_datetime_only() {
        assert!(ColumnType::Date.uses_format_pattern());
        assert!(ColumnType::DateTime.uses_format_pattern());
        assert!(!ColumnType::Interval.uses_format_pattern());
        assert!(!ColumnType::Decimal.uses_format_pattern());
    }

    #[test]
    fn yaml_document_with_defaulted_options_parses() {
        let raw = "table: trades\ndelimiter: \"\\t\"\ncolumns:\n  - name: id\n    datatype: BigInt\n  - name: note\n    datatype: String\n    options:\n      upper_case: true\n";
        let schema: Schema = serde_yaml::from_str(raw).unwrap();
        assert_eq!(schema.delimiter, '\t');
        assert_eq!(schema.columns.len(), 2);
        assert_eq!(schema.columns[0].datatype, ColumnType::BigInt);
        assert!(!schema.columns[0].options.upper_case);
        assert!(schema.columns[1].options.upper_case);
        assert!(schema.columns[1].options.trim);
    }
}
