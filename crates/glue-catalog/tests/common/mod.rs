// SPDX-License-Identifier: Apache-2.0
// SPDX-FileCopyrightText: Copyright The Lance Authors

//! In-memory catalog that records every call it receives.

#![allow(dead_code)]

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use glue_catalog::{
    CatalogBuilder, CatalogError, CatalogResources, CatalogResult, CatalogService, DatabaseInfo,
    DatabaseInput, Document, JobDefinition, ObjectStoreStorage,
};
use object_store::memory::InMemory;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    GetDatabase(String),
    CreateDatabase { name: String, description: String },
    DeleteDatabase(String),
    CreateTable { database: String, table: String },
    DeleteTable { database: String, table: String },
    CreateJob(String),
    StartJobRun(String),
}

#[derive(Default)]
struct State {
    calls: Vec<Call>,
    databases: BTreeSet<String>,
    tables: BTreeMap<(String, String), Document>,
    jobs: BTreeMap<String, JobDefinition>,
    runs: usize,
    /// Error code returned by every delete call.
    delete_failure: Option<String>,
    /// Error code returned by every get_database call.
    get_failure: Option<String>,
}

#[derive(Default)]
pub struct RecordingCatalog {
    state: Mutex<State>,
}

impl RecordingCatalog {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn with_database(self: Arc<Self>, name: &str) -> Arc<Self> {
        self.state.lock().unwrap().databases.insert(name.to_string());
        self
    }

    pub fn with_table(self: Arc<Self>, database: &str, table: &str) -> Arc<Self> {
        let mut state = self.state.lock().unwrap();
        state.databases.insert(database.to_string());
        state
            .tables
            .insert((database.to_string(), table.to_string()), Document::new());
        drop(state);
        self
    }

    pub fn failing_deletes(self: Arc<Self>, code: &str) -> Arc<Self> {
        self.state.lock().unwrap().delete_failure = Some(code.to_string());
        self
    }

    pub fn failing_gets(self: Arc<Self>, code: &str) -> Arc<Self> {
        self.state.lock().unwrap().get_failure = Some(code.to_string());
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn table(&self, database: &str, table: &str) -> Option<Document> {
        self.state
            .lock()
            .unwrap()
            .tables
            .get(&(database.to_string(), table.to_string()))
            .cloned()
    }

    pub fn table_names(&self, database: &str) -> Vec<String> {
        self.state
            .lock()
            .unwrap()
            .tables
            .keys()
            .filter(|(db, _)| db == database)
            .map(|(_, t)| t.clone())
            .collect()
    }

    pub fn job(&self, name: &str) -> Option<JobDefinition> {
        self.state.lock().unwrap().jobs.get(name).cloned()
    }
}

fn remote(operation: &str, code: &str) -> CatalogError {
    CatalogError::Remote {
        operation: operation.to_string(),
        code: code.to_string(),
        message: "injected failure".to_string(),
    }
}

fn not_found(entity: String) -> CatalogError {
    CatalogError::NotFound { entity }
}

#[async_trait]
impl CatalogService for RecordingCatalog {
    fn name(&self) -> &str {
        "recording"
    }

    async fn get_database(&self, name: &str) -> CatalogResult<DatabaseInfo> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(Call::GetDatabase(name.to_string()));
        if let Some(code) = &state.get_failure {
            return Err(remote("GetDatabase", code));
        }
        if !state.databases.contains(name) {
            return Err(not_found(format!("database '{}'", name)));
        }
        Ok(DatabaseInfo {
            name: name.to_string(),
            description: None,
            location_uri: None,
            catalog_id: None,
        })
    }

    async fn create_database(&self, input: &DatabaseInput) -> CatalogResult<()> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(Call::CreateDatabase {
            name: input.name.clone(),
            description: input.description.clone(),
        });
        if !state.databases.insert(input.name.clone()) {
            return Err(remote("CreateDatabase", "AlreadyExistsException"));
        }
        Ok(())
    }

    async fn delete_database(&self, name: &str) -> CatalogResult<()> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(Call::DeleteDatabase(name.to_string()));
        if let Some(code) = &state.delete_failure {
            return Err(remote("DeleteDatabase", code));
        }
        if !state.databases.remove(name) {
            return Err(not_found(format!("database '{}'", name)));
        }
        state.tables.retain(|(db, _), _| db != name);
        Ok(())
    }

    async fn create_table(&self, database_name: &str, table_input: &Document) -> CatalogResult<()> {
        let mut state = self.state.lock().unwrap();
        let table = table_input
            .get("Name")
            .and_then(|v| v.as_str())
            .unwrap_or_default()
            .to_string();
        state.calls.push(Call::CreateTable {
            database: database_name.to_string(),
            table: table.clone(),
        });
        if !state.databases.contains(database_name) {
            return Err(not_found(format!("database '{}'", database_name)));
        }
        let key = (database_name.to_string(), table);
        if state.tables.contains_key(&key) {
            return Err(remote("CreateTable", "AlreadyExistsException"));
        }
        state.tables.insert(key, table_input.clone());
        Ok(())
    }

    async fn delete_table(&self, database_name: &str, table_name: &str) -> CatalogResult<()> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(Call::DeleteTable {
            database: database_name.to_string(),
            table: table_name.to_string(),
        });
        if let Some(code) = &state.delete_failure {
            return Err(remote("DeleteTable", code));
        }
        let key = (database_name.to_string(), table_name.to_string());
        if state.tables.remove(&key).is_none() {
            return Err(not_found(format!("table '{}.{}'", database_name, table_name)));
        }
        Ok(())
    }

    async fn create_job(&self, job: &JobDefinition) -> CatalogResult<String> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(Call::CreateJob(job.name.clone()));
        state.jobs.insert(job.name.clone(), job.clone());
        Ok(job.name.clone())
    }

    async fn start_job_run(&self, job_name: &str) -> CatalogResult<String> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(Call::StartJobRun(job_name.to_string()));
        if !state.jobs.contains_key(job_name) {
            return Err(not_found(format!("job '{}'", job_name)));
        }
        state.runs += 1;
        Ok(format!("jr_{:04}", state.runs))
    }
}

pub fn builder(catalog: Arc<RecordingCatalog>) -> CatalogBuilder {
    builder_with_store(catalog, "raw", Arc::new(InMemory::new()))
}

pub fn builder_with_store(
    catalog: Arc<RecordingCatalog>,
    bucket: &str,
    store: Arc<InMemory>,
) -> CatalogBuilder {
    init_tracing();
    CatalogBuilder::new(
        catalog,
        Arc::new(ObjectStoreStorage::new().with_store(bucket, store)),
        Arc::new(CatalogResources::bundled().unwrap()),
    )
}

/// Route builder logs to the test harness; set `RUST_LOG` to see them.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

pub fn write_file(dir: &Path, name: &str, contents: &str) {
    std::fs::write(dir.join(name), contents).unwrap();
}

pub fn table_json(table_name: &str, data_format: &str) -> String {
    serde_json::json!({
        "table_name": table_name,
        "table_desc": format!("{} table", table_name),
        "data_format": data_format,
        "location": format!("s3://raw/{}/", table_name),
        "columns": [
            {"name": "amount", "description": "Amount", "type": "double", "column_number": 3},
            {"name": "id", "description": "Identifier", "type": "int", "column_number": 1},
            {"name": "label", "description": "Label", "type": "character", "column_number": 2}
        ]
    })
    .to_string()
}

pub fn database_json(name: &str, description: &str) -> String {
    serde_json::json!({"name": name, "description": description}).to_string()
}
