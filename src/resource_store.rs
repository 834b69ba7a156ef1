//! Rows of one REST resource, with the loading flag and the last error
//! shown to the user.

use crate::api_client::ApiClient;
use crate::data::datatable::{GridRow, Record, RowId};
use serde_json::Value;
use tracing::{error, info};

pub const LOAD_ERROR: &str = "Erreur lors du chargement des données";
pub const CREATE_ERROR: &str = "Erreur lors de la création";
pub const UPDATE_ERROR: &str = "Erreur lors de la mise à jour";
pub const DELETE_ERROR: &str = "Erreur lors de la suppression";

pub struct ResourceStore {
    client: ApiClient,
    resource: String,
    rows: Vec<Record>,
    loading: bool,
    error: Option<String>,
}

impl ResourceStore {
    pub fn new(client: ApiClient, resource: impl Into<String>) -> Self {
        Self {
            client,
            resource: resource.into(),
            rows: Vec::new(),
            loading: false,
            error: None,
        }
    }

    pub fn resource(&self) -> &str {
        &self.resource
    }

    pub fn rows(&self) -> &[Record] {
        &self.rows
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    fn fail(&mut self, message: &str, err: anyhow::Error) {
        error!(target: "api", "{} ({}): {:#}", message, self.resource, err);
        self.error = Some(message.to_string());
    }

    /// Replace the row with the same id, or append it
    fn upsert(&mut self, record: Record) {
        let id = record.row_id();
        match self.rows.iter_mut().find(|row| row.id() == &id) {
            Some(row) => *row = record,
            None => self.rows.push(record),
        }
    }

    /// Reload every row. On failure the previous rows are kept.
    pub async fn refresh(&mut self) -> bool {
        self.loading = true;
        let result = self.client.list(&self.resource).await;
        self.loading = false;
        match result {
            Ok(rows) => {
                info!(target: "api", "Fetched {} {}", rows.len(), self.resource);
                self.rows = rows;
                self.error = None;
                true
            }
            Err(e) => {
                self.fail(LOAD_ERROR, e);
                false
            }
        }
    }

    pub async fn create(&mut self, body: &Value) -> Option<RowId> {
        match self.client.create(&self.resource, body).await {
            Ok(record) => {
                let id = record.row_id();
                self.upsert(record);
                self.error = None;
                Some(id)
            }
            Err(e) => {
                self.fail(CREATE_ERROR, e);
                None
            }
        }
    }

    pub async fn update(&mut self, id: &RowId, body: &Value) -> bool {
        match self.client.update(&self.resource, id, body).await {
            Ok(record) => {
                self.upsert(record);
                self.error = None;
                true
            }
            Err(e) => {
                self.fail(UPDATE_ERROR, e);
                false
            }
        }
    }

    pub async fn remove(&mut self, id: &RowId) -> bool {
        match self.client.delete(&self.resource, id).await {
            Ok(()) => {
                self.rows.retain(|row| row.id() != id);
                self.error = None;
                true
            }
            Err(e) => {
                self.fail(DELETE_ERROR, e);
                false
            }
        }
    }
}
