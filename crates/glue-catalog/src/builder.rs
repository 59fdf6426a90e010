// SPDX-License-Identifier: Apache-2.0
// SPDX-FileCopyrightText: Copyright The Lance Authors

//! Renders metadata documents into Glue definitions and applies them.
//!
//! [`CatalogBuilder`] owns no state of its own beyond the injected service
//! clients and the static [`CatalogResources`]; each operation is independent
//! and awaits its remote calls one at a time.

use std::path::Path;
use std::sync::Arc;

use arrow_array::RecordBatch;
use serde::Serialize;
use serde_json::Value;
use snafu::{ensure, ResultExt};
use tracing::{debug, info, instrument};

use crate::catalog_service::{CatalogService, DatabaseInput, DeletePolicy, ObjectStorage};
use crate::error::{CatalogResult, IoSnafu, JsonSnafu, MissingDatabaseFileSnafu};
use crate::export::{export_batches_to_csv, CsvExportOptions};
use crate::job::{submit_etl_job, EtlJob, JobSubmission};
use crate::metadata::{read_json, DatabaseMetadata, TableMetadata, DATABASE_FILE};
use crate::template::{deep_merge, Document, TemplateSet};
use crate::type_mapping::{TypeMap, GLUE_TARGET};

/// The packaged type table and templates, parsed once and shared.
#[derive(Debug, Clone)]
pub struct CatalogResources {
    pub types: TypeMap,
    pub templates: TemplateSet,
}

impl CatalogResources {
    pub fn new(types: TypeMap, templates: TemplateSet) -> Self {
        Self { types, templates }
    }

    pub fn bundled() -> CatalogResult<Self> {
        Ok(Self::new(TypeMap::bundled()?, TemplateSet::bundled()?))
    }
}

/// One entry of `StorageDescriptor.Columns`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct GlueColumn {
    pub name: String,
    pub comment: String,
    #[serde(rename = "Type")]
    pub column_type: String,
}

/// What [`CatalogBuilder::build_database_from_folder`] created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FolderBuildReport {
    pub database: String,
    /// Table names in the order they were created.
    pub tables: Vec<String>,
}

pub struct CatalogBuilder {
    catalog: Arc<dyn CatalogService>,
    storage: Arc<dyn ObjectStorage>,
    resources: Arc<CatalogResources>,
    delete_policy: DeletePolicy,
}

impl CatalogBuilder {
    pub fn new(
        catalog: Arc<dyn CatalogService>,
        storage: Arc<dyn ObjectStorage>,
        resources: Arc<CatalogResources>,
    ) -> Self {
        Self {
            catalog,
            storage,
            resources,
            delete_policy: DeletePolicy::default(),
        }
    }

    /// Builder over the Glue endpoint and S3 credentials found in the
    /// environment, with the bundled resources.
    #[cfg(feature = "glue")]
    pub fn from_env() -> CatalogResult<Self> {
        let config = crate::glue::GlueCatalogConfig::from_env();
        let storage = crate::storage::ObjectStoreStorage::s3_from_env().with_region(&config.region);
        let catalog = crate::glue::GlueCatalogClient::new(config)?;
        Ok(Self::new(
            Arc::new(catalog),
            Arc::new(storage),
            Arc::new(CatalogResources::bundled()?),
        ))
    }

    pub fn with_delete_policy(mut self, policy: DeletePolicy) -> Self {
        self.delete_policy = policy;
        self
    }

    pub fn catalog(&self) -> &dyn CatalogService {
        self.catalog.as_ref()
    }

    pub fn resources(&self) -> &CatalogResources {
        &self.resources
    }

    pub fn translate_type(&self, column_type: &str, target_format: &str) -> CatalogResult<&str> {
        self.resources.types.translate_type(column_type, target_format)
    }

    pub fn get_template(&self, format_name: &str, overrides: &Document) -> CatalogResult<Document> {
        self.resources.templates.get_template(format_name, overrides)
    }

    /// Glue columns of `table`, ordered by `column_number`.
    pub fn render_column_spec(&self, table: &TableMetadata) -> CatalogResult<Vec<GlueColumn>> {
        table
            .sorted_columns()
            .into_iter()
            .map(|c| -> CatalogResult<GlueColumn> {
                Ok(GlueColumn {
                    name: c.name.clone(),
                    comment: c.description.clone(),
                    column_type: self.translate_type(&c.column_type, GLUE_TARGET)?.to_string(),
                })
            })
            .collect()
    }

    /// Glue `TableInput` for `table`.
    pub fn render_table_definition(&self, table: &TableMetadata) -> CatalogResult<Document> {
        self.render_table_definition_with(table, &Document::new())
    }

    /// Glue `TableInput` for `table` with `overrides` deep-merged last.
    pub fn render_table_definition_with(
        &self,
        table: &TableMetadata,
        overrides: &Document,
    ) -> CatalogResult<Document> {
        let mut definition = self.get_template(&table.data_format, &Document::new())?;
        let columns = serde_json::to_value(self.render_column_spec(table)?).context(JsonSnafu {
            document: table.table_name.as_str(),
        })?;

        definition.insert("Name".into(), Value::String(table.table_name.clone()));
        definition.insert("Description".into(), Value::String(table.table_desc.clone()));

        let storage = definition
            .entry("StorageDescriptor")
            .or_insert_with(|| Value::Object(Document::new()));
        if !storage.is_object() {
            *storage = Value::Object(Document::new());
        }
        if let Value::Object(storage) = storage {
            storage.insert("Columns".into(), columns);
            storage.insert("Location".into(), Value::String(table.location.clone()));
        }

        deep_merge(&mut definition, overrides);
        Ok(definition)
    }

    /// Delete `name` if present, then create it.
    #[instrument(skip_all, fields(database = %name))]
    pub async fn create_or_replace_database(&self, name: &str, description: &str) -> CatalogResult<()> {
        let entity = format!("database '{}'", name);
        if self
            .delete_policy
            .apply(&entity, self.catalog.delete_database(name).await)?
        {
            debug!("deleted database");
        }
        debug!("creating database");
        self.catalog
            .create_database(&DatabaseInput::new(name, description))
            .await
    }

    /// Delete `table_name` if present, then create it from `definition`.
    #[instrument(skip_all, fields(database = %database_name, table = %table_name))]
    pub async fn create_or_replace_table(
        &self,
        database_name: &str,
        table_name: &str,
        definition: &Document,
    ) -> CatalogResult<()> {
        self.delete_table_if_present(database_name, table_name).await?;
        debug!("creating table");
        self.catalog.create_table(database_name, definition).await
    }

    /// Render `table` and create it in `database`.
    ///
    /// With `check_existence` the database is created when missing and any
    /// existing table of the same name is replaced. Without it the table is
    /// created directly and the caller guarantees it does not exist.
    #[instrument(skip_all, fields(database = %database.name, table = %table.table_name))]
    pub async fn build_table(
        &self,
        table: &TableMetadata,
        database: &DatabaseMetadata,
        check_existence: bool,
    ) -> CatalogResult<()> {
        let definition = self.render_table_definition(table)?;
        self.apply_table(&definition, table, database, check_existence)
            .await
    }

    async fn apply_table(
        &self,
        definition: &Document,
        table: &TableMetadata,
        database: &DatabaseMetadata,
        check_existence: bool,
    ) -> CatalogResult<()> {
        if check_existence {
            match self.catalog.get_database(&database.name).await {
                Ok(_) => {}
                Err(e) if e.is_not_found() => {
                    info!(database = %database.name, "database missing, creating it");
                    self.create_or_replace_database(&database.name, &database.description)
                        .await?;
                }
                Err(e) => return Err(e),
            }
            self.delete_table_if_present(&database.name, &table.table_name)
                .await?;
        }

        info!(database = %database.name, table = %table.table_name, "creating table");
        self.catalog.create_table(&database.name, definition).await
    }

    async fn delete_table_if_present(&self, database_name: &str, table_name: &str) -> CatalogResult<()> {
        let entity = format!("table '{}.{}'", database_name, table_name);
        if self
            .delete_policy
            .apply(&entity, self.catalog.delete_table(database_name, table_name).await)?
        {
            debug!(database = %database_name, table = %table_name, "deleted table");
        }
        Ok(())
    }

    /// Rebuild a whole database from a folder of metadata documents.
    ///
    /// The folder must hold a `database.json`; every other `*.json` file is a
    /// table document. All documents are read and rendered before the first
    /// remote call. The database is then replaced and each table created,
    /// in file-name order.
    #[instrument(skip_all, fields(folder = %folder.as_ref().display()))]
    pub async fn build_database_from_folder(
        &self,
        folder: impl AsRef<Path>,
    ) -> CatalogResult<FolderBuildReport> {
        let folder = folder.as_ref();
        let names = list_json_files(folder).await?;
        ensure!(
            names.iter().any(|n| n == DATABASE_FILE),
            MissingDatabaseFileSnafu { folder }
        );

        let database: DatabaseMetadata = read_json(&folder.join(DATABASE_FILE)).await?;
        let mut tables = Vec::new();
        for name in names.iter().filter(|n| *n != DATABASE_FILE) {
            let table: TableMetadata = read_json(&folder.join(name)).await?;
            let definition = self.render_table_definition(&table)?;
            tables.push((table, definition));
        }

        self.create_or_replace_database(&database.name, &database.description)
            .await?;
        for (table, definition) in &tables {
            self.apply_table(definition, table, &database, false).await?;
        }

        info!(database = %database.name, tables = tables.len(), "built database");
        Ok(FolderBuildReport {
            database: database.name,
            tables: tables.into_iter().map(|(t, _)| t.table_name).collect(),
        })
    }

    /// Stage `job`'s script and start one run of it.
    pub async fn submit_etl_job(&self, job: &EtlJob) -> CatalogResult<JobSubmission> {
        submit_etl_job(self.catalog.as_ref(), self.storage.as_ref(), job).await
    }

    /// Write `batches` as CSV to `bucket`/`key`.
    pub async fn export_csv(
        &self,
        batches: &[RecordBatch],
        bucket: &str,
        key: &str,
        options: &CsvExportOptions,
    ) -> CatalogResult<usize> {
        export_batches_to_csv(self.storage.as_ref(), batches, bucket, key, options).await
    }
}

/// `*.json` entries of `folder` (at least one character before the
/// extension), sorted by name.
async fn list_json_files(folder: &Path) -> CatalogResult<Vec<String>> {
    let mut entries = tokio::fs::read_dir(folder)
        .await
        .context(IoSnafu { path: folder })?;
    let mut names = Vec::new();
    while let Some(entry) = entries.next_entry().await.context(IoSnafu { path: folder })? {
        let is_dir = entry
            .file_type()
            .await
            .context(IoSnafu { path: entry.path() })?
            .is_dir();
        let Ok(name) = entry.file_name().into_string() else {
            continue;
        };
        if !is_dir && name.len() > ".json".len() && name.ends_with(".json") {
            names.push(name);
        }
    }
    names.sort();
    Ok(names)
}
