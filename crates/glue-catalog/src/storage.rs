// SPDX-License-Identifier: Apache-2.0
// SPDX-FileCopyrightText: Copyright The Lance Authors

//! [`ObjectStorage`] backed by the `object_store` crate.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use object_store::aws::AmazonS3Builder;
use object_store::path::Path;
use object_store::{ObjectStore, PutPayload};
use snafu::ResultExt;
use tracing::debug;

use crate::catalog_service::ObjectStorage;
use crate::error::{CatalogError, CatalogResult, StorageSnafu};

/// Routes each bucket to an [`ObjectStore`].
///
/// Buckets registered with [`with_store`](Self::with_store) take precedence.
/// Any other bucket is opened as S3 from the environment when enabled, and
/// rejected otherwise.
#[derive(Default)]
pub struct ObjectStoreStorage {
    stores: HashMap<String, Arc<dyn ObjectStore>>,
    s3_from_env: bool,
    region: Option<String>,
}

impl ObjectStoreStorage {
    /// Storage with no buckets; register them with [`with_store`](Self::with_store).
    pub fn new() -> Self {
        Self::default()
    }

    /// Storage that opens an S3 store per bucket using `AWS_*` environment
    /// credentials.
    pub fn s3_from_env() -> Self {
        Self {
            s3_from_env: true,
            ..Self::default()
        }
    }

    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region = Some(region.into());
        self
    }

    pub fn with_store(mut self, bucket: impl Into<String>, store: Arc<dyn ObjectStore>) -> Self {
        self.stores.insert(bucket.into(), store);
        self
    }

    fn store_for(&self, bucket: &str) -> CatalogResult<Arc<dyn ObjectStore>> {
        if let Some(store) = self.stores.get(bucket) {
            return Ok(store.clone());
        }
        if !self.s3_from_env {
            return Err(CatalogError::Config {
                message: format!("no object store registered for bucket '{}'", bucket),
            });
        }

        let mut builder = AmazonS3Builder::from_env().with_bucket_name(bucket);
        if let Some(ref region) = self.region {
            builder = builder.with_region(region);
        }
        let store = builder.build().context(StorageSnafu)?;
        Ok(Arc::new(store))
    }
}

#[async_trait]
impl ObjectStorage for ObjectStoreStorage {
    async fn put_object(&self, bucket: &str, key: &str, body: Vec<u8>) -> CatalogResult<()> {
        let store = self.store_for(bucket)?;
        let size = body.len();
        store
            .put(&Path::from(key), PutPayload::from(body))
            .await
            .context(StorageSnafu)?;
        debug!(bucket, key, size, "uploaded object");
        Ok(())
    }
}
