// SPDX-License-Identifier: Apache-2.0
// SPDX-FileCopyrightText: Copyright The Lance Authors

//! Lookup from abstract metadata column types to target-system type strings.
//!
//! The table is a CSV whose first column, `metadata`, holds the abstract type
//! name and whose remaining columns hold one type string per output format
//! (`glue`, `spark`, ...). It is parsed once into a [`TypeMap`].

use std::collections::HashMap;
use std::io::Cursor;
use std::sync::Arc;

use arrow_array::cast::AsArray;
use arrow_array::Array;
use arrow_csv::reader::{Format, ReaderBuilder};
use arrow_schema::{DataType, Field, Schema};
use snafu::{ensure, OptionExt, ResultExt};

use crate::error::{
    ArrowSnafu, CatalogResult, InvalidTypeTableSnafu, TypeNotFoundSnafu, UnknownTargetFormatSnafu,
};

/// Output format used for catalog column types.
pub const GLUE_TARGET: &str = "glue";

const KEY_COLUMN: &str = "metadata";

const BUNDLED_TYPE_TABLE: &str = include_str!("../data/data_type_conversion.csv");

/// Immutable abstract-type → target-type table.
#[derive(Debug, Clone)]
pub struct TypeMap {
    target_formats: Vec<String>,
    rows: HashMap<String, Vec<String>>,
}

impl TypeMap {
    /// Parse the conversion table packaged with this crate.
    pub fn bundled() -> CatalogResult<Self> {
        Self::from_csv(BUNDLED_TYPE_TABLE)
    }

    /// Parse a conversion table from CSV text with a header row.
    ///
    /// Every cell is read as a string. Abstract type names must be unique and
    /// no cell may be empty.
    pub fn from_csv(text: &str) -> CatalogResult<Self> {
        let format = Format::default().with_header(true);
        let (inferred, _) = format
            .infer_schema(Cursor::new(text), None)
            .context(ArrowSnafu)?;
        let schema = Schema::new(
            inferred
                .fields()
                .iter()
                .map(|f| Field::new(f.name(), DataType::Utf8, true))
                .collect::<Vec<_>>(),
        );

        let key_index = schema.index_of(KEY_COLUMN).ok().context(InvalidTypeTableSnafu {
            message: format!("missing '{}' column", KEY_COLUMN),
        })?;
        let target_formats: Vec<String> = schema
            .fields()
            .iter()
            .enumerate()
            .filter(|(i, _)| *i != key_index)
            .map(|(_, f)| f.name().clone())
            .collect();

        let reader = ReaderBuilder::new(Arc::new(schema))
            .with_header(true)
            .build(Cursor::new(text))
            .context(ArrowSnafu)?;

        let mut rows = HashMap::new();
        for batch in reader {
            let batch = batch.context(ArrowSnafu)?;
            let columns = batch
                .columns()
                .iter()
                .map(|c| c.as_string_opt::<i32>())
                .collect::<Option<Vec<_>>>()
                .context(InvalidTypeTableSnafu {
                    message: "non-string column",
                })?;

            for row in 0..batch.num_rows() {
                let cell = |col: usize| -> CatalogResult<String> {
                    let value = if columns[col].is_valid(row) {
                        columns[col].value(row).trim()
                    } else {
                        ""
                    };
                    ensure!(
                        !value.is_empty(),
                        InvalidTypeTableSnafu {
                            message: format!(
                                "empty '{}' cell in row {}",
                                batch.schema().field(col).name(),
                                row + 1
                            ),
                        }
                    );
                    Ok(value.to_string())
                };

                let name = cell(key_index)?;
                let targets = (0..columns.len())
                    .filter(|i| *i != key_index)
                    .map(cell)
                    .collect::<CatalogResult<Vec<_>>>()?;

                ensure!(
                    !rows.contains_key(&name),
                    InvalidTypeTableSnafu {
                        message: format!("duplicate type '{}'", name),
                    }
                );
                rows.insert(name, targets);
            }
        }

        Ok(Self {
            target_formats,
            rows,
        })
    }

    /// Translate `column_type` into the type string used by `target_format`.
    pub fn translate_type(&self, column_type: &str, target_format: &str) -> CatalogResult<&str> {
        let targets = self
            .rows
            .get(column_type)
            .context(TypeNotFoundSnafu { column_type })?;
        let index = self
            .target_formats
            .iter()
            .position(|f| f == target_format)
            .context(UnknownTargetFormatSnafu { target_format })?;
        Ok(targets[index].as_str())
    }

    /// Output formats available as translation targets.
    pub fn target_formats(&self) -> &[String] {
        &self.target_formats
    }

    /// Abstract type names known to the table, in no particular order.
    pub fn type_names(&self) -> impl Iterator<Item = &str> {
        self.rows.keys().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CatalogError;

    #[test]
    fn test_basic_glue_mappings() {
        let types = TypeMap::bundled().unwrap();
        assert_eq!(types.translate_type("character", GLUE_TARGET).unwrap(), "string");
        assert_eq!(types.translate_type("int", GLUE_TARGET).unwrap(), "int");
        assert_eq!(types.translate_type("long", GLUE_TARGET).unwrap(), "bigint");
        assert_eq!(types.translate_type("double", GLUE_TARGET).unwrap(), "double");
        assert_eq!(types.translate_type("boolean", GLUE_TARGET).unwrap(), "boolean");
        assert_eq!(types.translate_type("date", GLUE_TARGET).unwrap(), "date");
        assert_eq!(types.translate_type("datetime", GLUE_TARGET).unwrap(), "timestamp");
    }

    #[test]
    fn test_every_type_translates_to_every_format() {
        let types = TypeMap::bundled().unwrap();
        assert!(types.target_formats().contains(&GLUE_TARGET.to_string()));
        for name in types.type_names() {
            for target in types.target_formats() {
                let translated = types.translate_type(name, target).unwrap();
                assert!(!translated.is_empty(), "{} -> {} is empty", name, target);
            }
        }
    }

    #[test]
    fn test_unknown_type_names_the_type() {
        let types = TypeMap::bundled().unwrap();
        let err = types.translate_type("hyperloglog", GLUE_TARGET).unwrap_err();
        assert!(matches!(err, CatalogError::TypeNotFound { .. }));
        assert!(err.to_string().contains("hyperloglog"));
    }

    #[test]
    fn test_unknown_target_format_is_distinct() {
        let types = TypeMap::bundled().unwrap();
        let err = types.translate_type("int", "cobol").unwrap_err();
        assert!(matches!(err, CatalogError::UnknownTargetFormat { .. }));
        assert!(err.to_string().contains("cobol"));
    }

    #[test]
    fn test_lookup_is_case_sensitive() {
        let types = TypeMap::bundled().unwrap();
        assert!(types.translate_type("INT", GLUE_TARGET).is_err());
    }

    #[test]
    fn test_custom_table() {
        let types = TypeMap::from_csv("metadata,glue\nuuid,string\n").unwrap();
        assert_eq!(types.translate_type("uuid", "glue").unwrap(), "string");
        assert_eq!(types.target_formats(), &["glue".to_string()]);
    }

    #[test]
    fn test_duplicate_type_rejected() {
        let err = TypeMap::from_csv("metadata,glue\nint,int\nint,bigint\n").unwrap_err();
        assert!(matches!(err, CatalogError::InvalidTypeTable { .. }));
        assert!(err.to_string().contains("duplicate"));
    }

    #[test]
    fn test_missing_key_column_rejected() {
        let err = TypeMap::from_csv("name,glue\nint,int\n").unwrap_err();
        assert!(matches!(err, CatalogError::InvalidTypeTable { .. }));
    }

    #[test]
    fn test_empty_cell_rejected() {
        let err = TypeMap::from_csv("metadata,glue,spark\nint,,IntegerType\n").unwrap_err();
        assert!(matches!(err, CatalogError::InvalidTypeTable { .. }));
    }
}
