// SPDX-License-Identifier: Apache-2.0
// SPDX-FileCopyrightText: Copyright The Lance Authors

//! Catalog-agnostic metadata documents.
//!
//! These are the caller-authored descriptions of a database and its tables.
//! They are read-only inputs: nothing in this crate mutates or persists them.

use std::path::Path;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use snafu::ResultExt;

use crate::error::{CatalogResult, IoSnafu, JsonSnafu};

/// File that names the database in a metadata folder.
pub const DATABASE_FILE: &str = "database.json";

/// Metadata about a column in a table document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnMetadata {
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Abstract type name, translated through the type conversion table.
    #[serde(rename = "type")]
    pub column_type: String,
    /// Column position. Input order is not trusted; columns are sorted by this.
    pub column_number: i64,
}

/// Metadata document describing one table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableMetadata {
    pub table_name: String,
    #[serde(default)]
    pub table_desc: String,
    /// One of `csv`, `parquet` (or `par`), `avro`, `orc`.
    pub data_format: String,
    /// Storage URI of the table data, e.g. `s3://bucket/prefix/`.
    pub location: String,
    #[serde(default)]
    pub columns: Vec<ColumnMetadata>,
}

impl TableMetadata {
    /// Columns ordered by ascending `column_number`.
    pub fn sorted_columns(&self) -> Vec<&ColumnMetadata> {
        let mut columns: Vec<&ColumnMetadata> = self.columns.iter().collect();
        columns.sort_by_key(|c| c.column_number);
        columns
    }
}

/// Metadata document describing the database, read from `database.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatabaseMetadata {
    pub name: String,
    #[serde(default)]
    pub description: String,
}

pub async fn read_json<T: DeserializeOwned>(path: &Path) -> CatalogResult<T> {
    let text = tokio::fs::read_to_string(path)
        .await
        .context(IoSnafu { path })?;
    parse_json(&path.display().to_string(), &text)
}

pub fn parse_json<T: DeserializeOwned>(document: &str, text: &str) -> CatalogResult<T> {
    serde_json::from_str(text).context(JsonSnafu { document })
}
