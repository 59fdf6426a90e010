// SPDX-License-Identifier: Apache-2.0
// SPDX-FileCopyrightText: Copyright The Lance Authors

//! Capability traits for the external catalog service and object storage.
//!
//! The builder only talks to these traits, so the Glue client and the
//! `object_store` backend can be swapped for fakes in tests.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::CatalogResult;
use crate::job::JobDefinition;
use crate::template::Document;

/// `DatabaseInput` of a `CreateDatabase` call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct DatabaseInput {
    pub name: String,
    pub description: String,
}

impl DatabaseInput {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
        }
    }
}

/// Database as returned by `GetDatabase`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct DatabaseInfo {
    pub name: String,
    pub description: Option<String>,
    pub location_uri: Option<String>,
    pub catalog_id: Option<String>,
}

/// Remote catalog operations used by the builder.
///
/// Every method is a single request/response. Implementations must report an
/// absent entity as [`CatalogError::NotFound`](crate::CatalogError::NotFound)
/// so callers can tell it apart from other failures.
#[async_trait]
pub trait CatalogService: Send + Sync {
    /// Human-readable name of this service (e.g., "aws-glue").
    fn name(&self) -> &str;

    /// Existence probe for a database.
    async fn get_database(&self, name: &str) -> CatalogResult<DatabaseInfo>;

    async fn create_database(&self, input: &DatabaseInput) -> CatalogResult<()>;

    async fn delete_database(&self, name: &str) -> CatalogResult<()>;

    /// Create a table from a rendered Glue `TableInput`.
    async fn create_table(&self, database_name: &str, table_input: &Document) -> CatalogResult<()>;

    async fn delete_table(&self, database_name: &str, table_name: &str) -> CatalogResult<()>;

    /// Register a job, returning the name the service assigned.
    async fn create_job(&self, job: &JobDefinition) -> CatalogResult<String>;

    /// Trigger a run of a registered job, returning the run id.
    async fn start_job_run(&self, job_name: &str) -> CatalogResult<String>;
}

/// Blob storage addressed by bucket and key.
#[async_trait]
pub trait ObjectStorage: Send + Sync {
    async fn put_object(&self, bucket: &str, key: &str, body: Vec<u8>) -> CatalogResult<()>;
}

/// How failed deletes are treated in delete-before-create flows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DeletePolicy {
    /// A `NotFound` failure means the entity is already absent. Every other
    /// failure is returned to the caller.
    #[default]
    IgnoreNotFound,
    /// Ignore every delete failure, logging it at `warn`.
    IgnoreAll,
}

impl DeletePolicy {
    /// Resolve the outcome of a delete. `Ok(true)` when the entity was
    /// deleted, `Ok(false)` when the failure was tolerated.
    pub fn apply(&self, entity: &str, result: CatalogResult<()>) -> CatalogResult<bool> {
        match result {
            Ok(()) => Ok(true),
            Err(e) if e.is_not_found() => {
                debug!(entity, "nothing to delete");
                Ok(false)
            }
            Err(e) if *self == Self::IgnoreAll => {
                warn!(entity, error = %e, "ignoring failed delete");
                Ok(false)
            }
            Err(e) => Err(e),
        }
    }
}
