// SPDX-License-Identifier: Apache-2.0
// SPDX-FileCopyrightText: Copyright The Lance Authors

//! Build AWS Glue Data Catalog databases and tables from metadata documents.
//!
//! - [`TypeMap`]: abstract column type → catalog type lookup
//! - [`TemplateSet`]: per-storage-format table definition templates
//! - [`CatalogBuilder`]: renders metadata and applies it through a
//!   [`CatalogService`] and an [`ObjectStorage`]
//! - [`GlueCatalogClient`]: the Glue implementation of [`CatalogService`]

pub mod builder;
pub mod catalog_service;
pub mod error;
pub mod export;
#[cfg(feature = "glue")]
pub mod glue;
pub mod job;
pub mod metadata;
pub mod storage;
pub mod template;
pub mod type_mapping;

pub use builder::{CatalogBuilder, CatalogResources, FolderBuildReport, GlueColumn};
pub use catalog_service::{
    CatalogService, DatabaseInfo, DatabaseInput, DeletePolicy, ObjectStorage,
};
pub use error::{CatalogError, CatalogResult};
pub use export::{batches_to_csv, export_batches_to_csv, CsvExportOptions};
pub use job::{submit_etl_job, EtlJob, JobDefinition, JobSubmission};
pub use metadata::{ColumnMetadata, DatabaseMetadata, TableMetadata, DATABASE_FILE};
pub use storage::ObjectStoreStorage;
pub use template::{deep_merge, DataFormat, Document, TemplateSet};
pub use type_mapping::{TypeMap, GLUE_TARGET};

#[cfg(feature = "glue")]
pub use glue::{GlueCatalogClient, GlueCatalogConfig};
