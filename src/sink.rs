//! Destinations for encoded bulk payloads.

use reqwest::{Client, header::CONTENT_TYPE};
use serde::Deserialize;
use serde_json::Value;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::{common::is_success_status, error::LoadError};

/// Status code and raw body of one bulk request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BulkResponse {
    pub status: u16,
    pub body: String,
}

/// Per-item failures reported inside an otherwise successful bulk response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemErrors {
    pub failed: usize,
    pub total: usize,
    pub first_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct BulkResponseBody {
    #[serde(default)]
    errors: bool,
    #[serde(default)]
    items: Vec<Value>,
}

impl BulkResponse {
    pub fn is_success(&self) -> bool {
        is_success_status(self.status)
    }

    /// Advisory only: the loader never acts on this. Returns `None` when the
    /// body is not a bulk response or reports no errors.
    pub fn item_errors(&self) -> Option<ItemErrors> {
        let parsed: BulkResponseBody = serde_json::from_str(&self.body).ok()?;
        if !parsed.errors {
            return None;
        }

        let mut failed = 0usize;
        let mut first_reason = None;
        for item in &parsed.items {
            // Each item is {"<action>": {"status": ..., "error": {...}}}.
            let Some(error) = item
                .as_object()
                .and_then(|actions| actions.values().next())
                .and_then(|result| result.get("error"))
            else {
                continue;
            };
            failed += 1;
            if first_reason.is_none() {
                first_reason = Some(
                    error
                        .get("reason")
                        .and_then(Value::as_str)
                        .map(str::to_string)
                        .unwrap_or_else(|| error.to_string()),
                );
            }
        }

        Some(ItemErrors {
            failed,
            total: parsed.items.len(),
            first_reason,
        })
    }
}

/// Accepts a bulk payload for an index and returns the receiver's status.
pub trait BulkSink {
    fn send(
        &self,
        index_name: &str,
        payload: String,
    ) -> impl Future<Output = Result<BulkResponse, LoadError>> + Send;
}

/// POSTs payloads to `{endpoint}/{index}/_bulk`.
pub struct HttpBulkSink {
    client: Client,
    endpoint: String,
}

impl HttpBulkSink {
    pub fn new(client: Client, endpoint: &str) -> Self {
        Self {
            client,
            endpoint: endpoint.trim().trim_end_matches('/').to_string(),
        }
    }

    pub fn bulk_url(&self, index_name: &str) -> String {
        format!("{}/{}/_bulk", self.endpoint, index_name)
    }
}

impl BulkSink for HttpBulkSink {
    async fn send(&self, index_name: &str, payload: String) -> Result<BulkResponse, LoadError> {
        let url = self.bulk_url(index_name);
        let response = self
            .client
            .post(&url)
            .header(CONTENT_TYPE, "application/json")
            .body(payload)
            .send()
            .await
            .map_err(|source| LoadError::Network {
                url: url.clone(),
                source,
            })?;

        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|source| LoadError::Network { url, source })?;
        Ok(BulkResponse { status, body })
    }
}

/// Accepts every payload without sending it anywhere.
#[derive(Debug, Default)]
pub struct DryRunSink {
    payloads: AtomicUsize,
    bytes: AtomicUsize,
}

impl DryRunSink {
    pub fn payloads(&self) -> usize {
        self.payloads.load(Ordering::Relaxed)
    }

    pub fn bytes(&self) -> usize {
        self.bytes.load(Ordering::Relaxed)
    }
}

impl BulkSink for DryRunSink {
    async fn send(&self, index_name: &str, payload: String) -> Result<BulkResponse, LoadError> {
        self.payloads.fetch_add(1, Ordering::Relaxed);
        self.bytes.fetch_add(payload.len(), Ordering::Relaxed);
        let body = serde_json::json!({
            "dry_run": true,
            "index": index_name,
            "bytes": payload.len(),
        });
        Ok(BulkResponse {
            status: 200,
            body: body.to_string(),
        })
    }
}
