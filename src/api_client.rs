use crate::data::datatable::{records_from_json, Record, RowId};
use anyhow::{anyhow, bail, Context, Result};
use reqwest::{Response, Url};
use serde_json::Value;
use tracing::debug;

/// Async client for the `/api/<resource>` CRUD endpoints
#[derive(Clone)]
pub struct ApiClient {
    base_url: String,
    client: reqwest::Client,
}

impl ApiClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client: reqwest::Client::new(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn collection_url(&self, resource: &str) -> String {
        format!("{}/api/{}", self.base_url, resource)
    }

    /// The id is percent-encoded as a single path segment
    fn item_url(&self, resource: &str, id: &RowId) -> Result<Url> {
        let mut url = Url::parse(&self.collection_url(resource))
            .with_context(|| format!("Invalid API base URL: {}", self.base_url))?;
        url.path_segments_mut()
            .map_err(|_| anyhow!("API base URL cannot hold a path: {}", self.base_url))?
            .push(&id.to_string());
        Ok(url)
    }

    /// `GET /api/<resource>`
    pub async fn list(&self, resource: &str) -> Result<Vec<Record>> {
        let url = self.collection_url(resource);
        debug!(target: "api", "GET {}", url);
        let response = self.client.get(&url).send().await?;
        let body = Self::json_body(response).await?;
        rows_from_response(&body)
    }

    /// `POST /api/<resource>`, returns the stored row
    pub async fn create(&self, resource: &str, body: &Value) -> Result<Record> {
        let url = self.collection_url(resource);
        debug!(target: "api", "POST {}", url);
        let response = self.client.post(&url).json(body).send().await?;
        let body = Self::json_body(response).await?;
        Record::from_json(&body).context("Unexpected create response")
    }

    /// `PUT /api/<resource>/<id>`, returns the stored row
    pub async fn update(&self, resource: &str, id: &RowId, body: &Value) -> Result<Record> {
        let url = self.item_url(resource, id)?;
        debug!(target: "api", "PUT {}", url);
        let response = self.client.put(url).json(body).send().await?;
        let body = Self::json_body(response).await?;
        Record::from_json(&body).context("Unexpected update response")
    }

    /// `DELETE /api/<resource>/<id>`
    pub async fn delete(&self, resource: &str, id: &RowId) -> Result<()> {
        let url = self.item_url(resource, id)?;
        debug!(target: "api", "DELETE {}", url);
        let response = self.client.delete(url).send().await?;
        Self::check_status(response).await?;
        Ok(())
    }

    async fn check_status(response: Response) -> Result<Response> {
        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            bail!("API Error ({}): {}", status, error_text);
        }
        Ok(response)
    }

    async fn json_body(response: Response) -> Result<Value> {
        let response = Self::check_status(response).await?;
        let body: Value = response.json().await.context("Invalid JSON in API response")?;
        Ok(body)
    }
}

/// Rows from a list response, either a bare array or `{ "data": [...] }`
pub fn rows_from_response(body: &Value) -> Result<Vec<Record>> {
    match body {
        Value::Array(_) => records_from_json(body),
        Value::Object(obj) => {
            let data = obj
                .get("data")
                .ok_or_else(|| anyhow!("API response has no 'data' array"))?;
            records_from_json(data)
        }
        _ => Err(anyhow!("Unexpected API response: {}", body)),
    }
}
