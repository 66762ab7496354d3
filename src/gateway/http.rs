//! HTTP implementation of the remote gateway.

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};

use super::{GatewayError, RemoteGateway, TaskSnapshot};

/// Gateway speaking JSON over HTTP to the remote task service.
#[derive(Clone)]
pub struct HttpGateway {
    client: Client,
    base_url: String,
}

/// Content fields sent on create and update. Local bookkeeping (`synced`,
/// local id) never crosses the wire.
#[derive(Serialize)]
struct TaskBody<'a> {
    title: &'a str,
    completed: bool,
}

#[derive(Deserialize)]
struct CreatedTask {
    id: RemoteId,
}

/// Some deployments answer with numeric ids, others with strings.
#[derive(Deserialize)]
#[serde(untagged)]
enum RemoteId {
    Number(i64),
    Text(String),
}

impl RemoteId {
    fn into_string(self) -> String {
        match self {
            RemoteId::Number(n) => n.to_string(),
            RemoteId::Text(s) => s,
        }
    }
}

impl HttpGateway {
    /// Build a gateway for `base_url` with a per-request timeout.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .context("building HTTP client")?;

        Ok(HttpGateway {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn collection_url(&self) -> String {
        format!("{}/tasks", self.base_url)
    }

    fn resource_url(&self, remote_id: &str) -> String {
        format!("{}/tasks/{}", self.base_url, remote_id)
    }
}

#[async_trait]
impl RemoteGateway for HttpGateway {
    async fn create_task(&self, snapshot: &TaskSnapshot) -> Result<String, GatewayError> {
        let response = self
            .client
            .post(self.collection_url())
            .json(&TaskBody {
                title: &snapshot.title,
                completed: snapshot.completed,
            })
            .send()
            .await
            .map_err(|e| GatewayError::Network(e.to_string()))?;

        if !response.status().is_success() {
            return Err(GatewayError::Status(response.status().as_u16()));
        }

        let created: CreatedTask = response
            .json()
            .await
            .map_err(|e| GatewayError::InvalidResponse(e.to_string()))?;

        Ok(created.id.into_string())
    }

    async fn update_task(
        &self,
        remote_id: &str,
        snapshot: &TaskSnapshot,
    ) -> Result<(), GatewayError> {
        let response = self
            .client
            .put(self.resource_url(remote_id))
            .json(&TaskBody {
                title: &snapshot.title,
                completed: snapshot.completed,
            })
            .send()
            .await
            .map_err(|e| GatewayError::Network(e.to_string()))?;

        if !response.status().is_success() {
            return Err(GatewayError::Status(response.status().as_u16()));
        }

        Ok(())
    }

    async fn delete_task(&self, remote_id: &str) -> Result<(), GatewayError> {
        let response = self
            .client
            .delete(self.resource_url(remote_id))
            .send()
            .await
            .map_err(|e| GatewayError::Network(e.to_string()))?;

        // A resource already gone remotely counts as deleted.
        if response.status().is_success() || response.status() == StatusCode::NOT_FOUND {
            return Ok(());
        }

        Err(GatewayError::Status(response.status().as_u16()))
    }
}
