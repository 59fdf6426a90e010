// SPDX-License-Identifier: Apache-2.0
// SPDX-FileCopyrightText: Copyright The Lance Authors

//! AWS Glue Data Catalog client implementing the [`CatalogService`] trait.
//!
//! Speaks the Glue JSON 1.1 protocol: every operation is a `POST /` with an
//! `X-Amz-Target: AWSGlue.<Operation>` header. Request signing is left to the
//! endpoint (a local emulator or a signing proxy); a bearer token is attached
//! when configured.

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, StatusCode};
use serde::de::{DeserializeOwned, IgnoredAny};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::debug;

use crate::catalog_service::{CatalogService, DatabaseInfo, DatabaseInput};
use crate::error::{CatalogError, CatalogResult};
use crate::job::JobDefinition;
use crate::template::Document;

/// Region used when none is configured.
pub const DEFAULT_REGION: &str = "eu-west-1";

const TARGET_PREFIX: &str = "AWSGlue";
const AMZ_JSON: &str = "application/x-amz-json-1.1";
const AMZ_TARGET: &str = "X-Amz-Target";
const AMZ_ERROR_TYPE: &str = "x-amzn-ErrorType";

/// Configuration for connecting to a Glue endpoint.
#[derive(Debug, Clone)]
pub struct GlueCatalogConfig {
    /// Base URL of the Glue endpoint (e.g., `https://glue.eu-west-1.amazonaws.com`).
    pub endpoint: String,
    pub region: String,
    /// Account id of the catalog; the caller's account when unset.
    pub catalog_id: Option<String>,
    /// Optional bearer token for authenticated access.
    pub bearer_token: Option<String>,
    /// Optional request timeout in seconds.
    pub timeout_secs: Option<u64>,
}

impl GlueCatalogConfig {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
            region: DEFAULT_REGION.to_string(),
            catalog_id: None,
            bearer_token: None,
            timeout_secs: None,
        }
    }

    /// Public Glue endpoint of `region`.
    pub fn for_region(region: impl Into<String>) -> Self {
        let region = region.into();
        let mut config = Self::new(format!("https://glue.{}.amazonaws.com", region));
        config.region = region;
        config
    }

    /// Read `AWS_REGION` (or `AWS_DEFAULT_REGION`), `GLUE_ENDPOINT_URL`,
    /// `GLUE_CATALOG_ID` and `GLUE_BEARER_TOKEN`.
    pub fn from_env() -> Self {
        let var = |name: &str| std::env::var(name).ok().filter(|v| !v.is_empty());
        let region = var("AWS_REGION")
            .or_else(|| var("AWS_DEFAULT_REGION"))
            .unwrap_or_else(|| DEFAULT_REGION.to_string());

        let mut config = match var("GLUE_ENDPOINT_URL") {
            Some(endpoint) => Self::new(endpoint).with_region(region),
            None => Self::for_region(region),
        };
        config.catalog_id = var("GLUE_CATALOG_ID");
        config.bearer_token = var("GLUE_BEARER_TOKEN");
        config
    }

    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region = region.into();
        self
    }

    pub fn with_catalog_id(mut self, catalog_id: impl Into<String>) -> Self {
        self.catalog_id = Some(catalog_id.into());
        self
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.bearer_token = Some(token.into());
        self
    }

    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = Some(secs);
        self
    }
}

/// Glue Data Catalog client.
pub struct GlueCatalogClient {
    config: GlueCatalogConfig,
    client: Client,
}

impl GlueCatalogClient {
    pub fn new(config: GlueCatalogConfig) -> CatalogResult<Self> {
        let mut builder = Client::builder();
        if let Some(timeout) = config.timeout_secs {
            builder = builder.timeout(std::time::Duration::from_secs(timeout));
        }
        let client = builder.build().map_err(|e| CatalogError::Connection {
            message: format!("Failed to build HTTP client: {}", e),
        })?;

        Ok(Self { config, client })
    }

    pub fn config(&self) -> &GlueCatalogConfig {
        &self.config
    }

    /// Issue one Glue operation. `resource` names the entity for `NotFound`.
    async fn call<T: DeserializeOwned>(
        &self,
        operation: &str,
        mut body: Value,
        resource: &str,
    ) -> CatalogResult<T> {
        if let (Some(catalog_id), Some(fields)) = (&self.config.catalog_id, body.as_object_mut()) {
            fields.insert("CatalogId".to_string(), Value::String(catalog_id.clone()));
        }
        debug!(operation, resource, "glue request");

        let mut req = self
            .client
            .post(format!("{}/", self.config.endpoint))
            .header(AMZ_TARGET, format!("{}.{}", TARGET_PREFIX, operation))
            .header(CONTENT_TYPE, AMZ_JSON)
            .body(body.to_string());
        if let Some(ref token) = self.config.bearer_token {
            req = req.bearer_auth(token);
        }

        let resp = req.send().await.map_err(|e| CatalogError::Connection {
            message: e.to_string(),
        })?;
        self.handle_response(resp, operation, resource).await
    }

    async fn handle_response<T: DeserializeOwned>(
        &self,
        resp: reqwest::Response,
        operation: &str,
        resource: &str,
    ) -> CatalogResult<T> {
        let status = resp.status();
        let header_code = resp
            .headers()
            .get(AMZ_ERROR_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let text = resp.text().await.map_err(|e| CatalogError::Connection {
            message: e.to_string(),
        })?;

        if status.is_success() {
            let text = if text.trim().is_empty() { "{}" } else { text.as_str() };
            return serde_json::from_str(text).map_err(|e| CatalogError::InvalidResponse {
                message: format!("{} response: {}", operation, e),
            });
        }

        let error: GlueErrorBody = serde_json::from_str(&text).unwrap_or_default();
        let code = error
            .error_type
            .or(header_code)
            .map(|raw| error_code(&raw).to_string())
            .unwrap_or_else(|| format!("HTTP {}", status.as_u16()));
        let message = error.message.unwrap_or(text);

        if code == "EntityNotFoundException" {
            return Err(CatalogError::NotFound {
                entity: format!("{} ({})", resource, message),
            });
        }
        if status == StatusCode::UNAUTHORIZED
            || status == StatusCode::FORBIDDEN
            || code == "AccessDeniedException"
        {
            return Err(CatalogError::Auth {
                message: format!("HTTP {}: {}", status, message),
            });
        }
        Err(CatalogError::Remote {
            operation: operation.to_string(),
            code,
            message,
        })
    }
}

/// Strip the namespace (`com.amazonaws.glue#`) and any `:`-suffix from an
/// error type.
fn error_code(raw: &str) -> &str {
    let code = raw.rsplit('#').next().unwrap_or(raw);
    code.split(':').next().unwrap_or(code)
}

// ---- Serde models for Glue JSON responses ----

#[derive(Default, Deserialize)]
struct GlueErrorBody {
    #[serde(rename = "__type")]
    error_type: Option<String>,
    #[serde(alias = "Message")]
    message: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct GetDatabaseResponse {
    database: DatabaseInfo,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct CreateJobResponse {
    name: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct StartJobRunResponse {
    job_run_id: String,
}

// ---- CatalogService implementation ----

#[async_trait]
impl CatalogService for GlueCatalogClient {
    fn name(&self) -> &str {
        "aws-glue"
    }

    async fn get_database(&self, name: &str) -> CatalogResult<DatabaseInfo> {
        let body: GetDatabaseResponse = self
            .call("GetDatabase", json!({ "Name": name }), &format!("database '{}'", name))
            .await?;
        Ok(body.database)
    }

    async fn create_database(&self, input: &DatabaseInput) -> CatalogResult<()> {
        let _: IgnoredAny = self
            .call(
                "CreateDatabase",
                json!({ "DatabaseInput": input }),
                &format!("database '{}'", input.name),
            )
            .await?;
        Ok(())
    }

    async fn delete_database(&self, name: &str) -> CatalogResult<()> {
        let _: IgnoredAny = self
            .call("DeleteDatabase", json!({ "Name": name }), &format!("database '{}'", name))
            .await?;
        Ok(())
    }

    async fn create_table(&self, database_name: &str, table_input: &Document) -> CatalogResult<()> {
        let table_name = table_input
            .get("Name")
            .and_then(Value::as_str)
            .unwrap_or_default();
        let _: IgnoredAny = self
            .call(
                "CreateTable",
                json!({ "DatabaseName": database_name, "TableInput": table_input }),
                &format!("database '{}'", database_name),
            )
            .await
            .map_err(|e| match e {
                CatalogError::NotFound { entity } => CatalogError::NotFound {
                    entity: format!("{} for table '{}'", entity, table_name),
                },
                other => other,
            })?;
        Ok(())
    }

    async fn delete_table(&self, database_name: &str, table_name: &str) -> CatalogResult<()> {
        let _: IgnoredAny = self
            .call(
                "DeleteTable",
                json!({ "DatabaseName": database_name, "Name": table_name }),
                &format!("table '{}.{}'", database_name, table_name),
            )
            .await?;
        Ok(())
    }

    async fn create_job(&self, job: &JobDefinition) -> CatalogResult<String> {
        let body = serde_json::to_value(job).map_err(|e| CatalogError::InvalidResponse {
            message: format!("CreateJob request: {}", e),
        })?;
        let resp: CreateJobResponse = self
            .call("CreateJob", body, &format!("job '{}'", job.name))
            .await?;
        Ok(resp.name.unwrap_or_else(|| job.name.clone()))
    }

    async fn start_job_run(&self, job_name: &str) -> CatalogResult<String> {
        let resp: StartJobRunResponse = self
            .call("StartJobRun", json!({ "JobName": job_name }), &format!("job '{}'", job_name))
            .await?;
        Ok(resp.job_run_id)
    }
}
