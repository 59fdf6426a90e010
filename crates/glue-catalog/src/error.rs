// SPDX-License-Identifier: Apache-2.0
// SPDX-FileCopyrightText: Copyright The Lance Authors

//! Error types shared by the lookup, template, builder and client layers.

use std::path::PathBuf;

use snafu::Snafu;

/// Errors that can occur while rendering or applying catalog definitions.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum CatalogError {
    /// An abstract column type is absent from the type conversion table.
    #[snafu(display(
        "You attempted to lookup column type '{column_type}', but this cannot be found in data_type_conversion.csv"
    ))]
    TypeNotFound { column_type: String },

    /// The type conversion table has no column for the requested output format.
    #[snafu(display("Type conversion table has no target format '{target_format}'"))]
    UnknownTargetFormat { target_format: String },

    /// No table template exists for the requested storage format.
    #[snafu(display(
        "Unsupported data format '{format}', expected one of: csv, parquet, avro, orc"
    ))]
    UnsupportedDataFormat { format: String },

    /// The bundled type conversion table could not be interpreted.
    #[snafu(display("Invalid type conversion table: {message}"))]
    InvalidTypeTable { message: String },

    /// Remote entity (database, table, job) does not exist.
    #[snafu(display("Not found: {entity}"))]
    NotFound { entity: String },

    #[snafu(display(
        "database.json not found in metadata folder {}: add a database.json with the database name and description",
        folder.display()
    ))]
    MissingDatabaseFile { folder: PathBuf },

    #[snafu(display("Invalid configuration: {message}"))]
    Config { message: String },

    /// Non-2xx response from the catalog service other than "not found".
    #[snafu(display("{operation} failed with {code}: {message}"))]
    Remote {
        operation: String,
        code: String,
        message: String,
    },

    #[snafu(display("Auth error: {message}"))]
    Auth { message: String },

    #[snafu(display("Catalog connection error: {message}"))]
    Connection { message: String },

    #[snafu(display("Invalid response: {message}"))]
    InvalidResponse { message: String },

    #[snafu(display("Failed to read {}: {source}", path.display()))]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[snafu(display("Invalid JSON in {document}: {source}"))]
    Json {
        document: String,
        source: serde_json::Error,
    },

    #[snafu(display("Arrow error: {source}"))]
    Arrow { source: arrow_schema::ArrowError },

    #[snafu(display("Object storage error: {source}"))]
    Storage { source: object_store::Error },
}

impl CatalogError {
    /// True when the remote entity was absent, the only failure that
    /// delete-before-create flows may treat as success.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

pub type CatalogResult<T> = std::result::Result<T, CatalogError>;
