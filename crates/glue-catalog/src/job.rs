// SPDX-License-Identifier: Apache-2.0
// SPDX-FileCopyrightText: Copyright The Lance Authors

//! ETL job staging and submission.
//!
//! Submission is fire-and-forget: the script is uploaded, the job registered
//! and one run started. Nothing here polls the run.

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::Serialize;
use snafu::ResultExt;
use tracing::info;

use crate::catalog_service::{CatalogService, ObjectStorage};
use crate::error::{CatalogResult, IoSnafu};

pub const DEFAULT_ALLOCATED_CAPACITY: u32 = 2;
pub const DEFAULT_MAX_CONCURRENT_RUNS: u32 = 1;
pub const DEFAULT_MAX_RETRIES: u32 = 0;
pub const JOB_COMMAND_NAME: &str = "glueetl";
pub const BOOKMARK_OPTION_DISABLED: &str = "job-bookmark-disable";

/// `CreateJob` request body.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct JobDefinition {
    pub name: String,
    pub role: String,
    pub command: JobCommand,
    pub default_arguments: BTreeMap<String, String>,
    pub execution_property: ExecutionProperty,
    pub max_retries: u32,
    pub allocated_capacity: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct JobCommand {
    pub name: String,
    pub script_location: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct ExecutionProperty {
    pub max_concurrent_runs: u32,
}

/// A local ETL script and where to stage it.
#[derive(Debug, Clone)]
pub struct EtlJob {
    pub job_name: String,
    pub role: String,
    pub local_script: PathBuf,
    pub script_bucket: String,
    pub script_key: String,
    /// Scratch location passed to the job as `--TempDir`.
    pub temp_dir: String,
    pub allocated_capacity: u32,
}

impl EtlJob {
    /// Job staging `local_script` at `s3://{script_bucket}/{script_key}`.
    ///
    /// `temp_dir` defaults to `s3://{script_bucket}/temp/`.
    pub fn new(
        job_name: impl Into<String>,
        role: impl Into<String>,
        local_script: impl Into<PathBuf>,
        script_bucket: impl Into<String>,
        script_key: impl Into<String>,
    ) -> Self {
        let script_bucket = script_bucket.into();
        Self {
            job_name: job_name.into(),
            role: role.into(),
            local_script: local_script.into(),
            temp_dir: format!("s3://{}/temp/", script_bucket),
            script_bucket,
            script_key: script_key.into(),
            allocated_capacity: DEFAULT_ALLOCATED_CAPACITY,
        }
    }

    pub fn with_temp_dir(mut self, temp_dir: impl Into<String>) -> Self {
        self.temp_dir = temp_dir.into();
        self
    }

    pub fn with_allocated_capacity(mut self, capacity: u32) -> Self {
        self.allocated_capacity = capacity;
        self
    }

    pub fn script_location(&self) -> String {
        format!("s3://{}/{}", self.script_bucket, self.script_key)
    }

    pub fn definition(&self) -> JobDefinition {
        let mut default_arguments = BTreeMap::new();
        default_arguments.insert("--TempDir".to_string(), self.temp_dir.clone());
        default_arguments.insert(
            "--job-bookmark-option".to_string(),
            BOOKMARK_OPTION_DISABLED.to_string(),
        );

        JobDefinition {
            name: self.job_name.clone(),
            role: self.role.clone(),
            command: JobCommand {
                name: JOB_COMMAND_NAME.to_string(),
                script_location: self.script_location(),
            },
            default_arguments,
            execution_property: ExecutionProperty {
                max_concurrent_runs: DEFAULT_MAX_CONCURRENT_RUNS,
            },
            max_retries: DEFAULT_MAX_RETRIES,
            allocated_capacity: self.allocated_capacity,
        }
    }
}

/// Outcome of a job submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobSubmission {
    pub job_name: String,
    pub run_id: String,
    pub script_location: String,
}

/// Upload the job's script, register the job and start one run.
pub async fn submit_etl_job(
    catalog: &dyn CatalogService,
    storage: &dyn ObjectStorage,
    job: &EtlJob,
) -> CatalogResult<JobSubmission> {
    let script = tokio::fs::read(&job.local_script)
        .await
        .context(IoSnafu {
            path: &job.local_script,
        })?;
    storage
        .put_object(&job.script_bucket, &job.script_key, script)
        .await?;

    let definition = job.definition();
    let job_name = catalog.create_job(&definition).await?;
    let run_id = catalog.start_job_run(&job_name).await?;
    info!(job = %job_name, run_id = %run_id, "started job run");

    Ok(JobSubmission {
        job_name,
        run_id,
        script_location: definition.command.script_location,
    })
}
