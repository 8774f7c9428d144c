//! Schema YAML persistence and validation tests.

use bulkstream::{
    convert::ConvertOptions,
    schema::{ColumnMeta, ColumnType, Schema},
};
use tempfile::tempdir;

fn sample_schema() -> Schema {
    Schema {
        table: "trades".to_string(),
        delimiter: '\t',
        columns: vec![
            ColumnMeta {
                name: "id".to_string(),
                datatype: ColumnType::BigInt,
                options: ConvertOptions::default(),
            },
            ColumnMeta {
                name: "traded_on".to_string(),
                datatype: ColumnType::Date,
                options: ConvertOptions {
                    format: Some("%d%m%Y".to_string()),
                    ..ConvertOptions::default()
                },
            },
            ColumnMeta {
                name: "amount".to_string(),
                datatype: ColumnType::Decimal,
                options: ConvertOptions {
                    zero_for_null: true,
                    ..ConvertOptions::default()
                },
            },
        ],
    }
}

#[test]
fn schema_round_trips_through_yaml() -> anyhow::Result<()> {
    let dir = tempdir()?;
    let path = dir.path().join("trades-schema.yml");

    let schema = sample_schema();
    schema.save(&path)?;
    let loaded = Schema::load(&path)?;

    assert_eq!(loaded, schema);
    assert_eq!(loaded.columns[1].options.format.as_deref(), Some("%d%m%Y"));
    assert!(loaded.columns[2].options.zero_for_null);
    Ok(())
}

#[test]
fn load_rejects_duplicate_columns() -> anyhow::Result<()> {
    let dir = tempdir()?;
    let path = dir.path().join("bad-schema.yml");
    std::fs::write(
        &path,
        "table: t\ndelimiter: \",\"\ncolumns:\n  - name: a\n    datatype: Int\n  - name: a\n    datatype: Int\n",
    )?;

    let err = Schema::load(&path).unwrap_err();
    assert!(err.to_string().contains("duplicate column name"));
    Ok(())
}

#[test]
fn load_rejects_unknown_datatype() -> anyhow::Result<()> {
    let dir = tempdir()?;
    let path = dir.path().join("bad-type-schema.yml");
    std::fs::write(
        &path,
        "table: t\ndelimiter: \",\"\ncolumns:\n  - name: a\n    datatype: Varchar\n",
    )?;

    assert!(Schema::load(&path).is_err());
    Ok(())
}

#[test]
fn load_rejects_unknown_option_keys() -> anyhow::Result<()> {
    let dir = tempdir()?;
    let path = dir.path().join("bad-option-schema.yml");
    std::fs::write(
        &path,
        "table: t\ndelimiter: \",\"\ncolumns:\n  - name: a\n    datatype: Int\n    options:\n      replace_null_with_zero: true\n",
    )?;

    assert!(Schema::load(&path).is_err());
    Ok(())
}
