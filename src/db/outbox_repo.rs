// src/db/outbox_repo.rs

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{
    common::{error::AppError, timestamp},
    db::document_store::{from_document, to_document, DocumentStore, Filter},
    models::member::new_id,
};

const OUTBOX: &str = "outbox";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutboxStatus {
    Pending,
    Delivered,
    Failed,
}

// Registro de um evento emitido para um colaborador externo
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutboxEvent {
    pub id: String,
    pub tenant_id: String,
    pub kind: String,
    pub payload: Value,
    pub status: OutboxStatus,
    pub error: Option<String>,
    #[serde(with = "timestamp")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "timestamp")]
    pub updated_at: DateTime<Utc>,
}

#[derive(Clone)]
pub struct OutboxRepository {
    store: Arc<dyn DocumentStore>,
}

impl OutboxRepository {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    pub async fn record(
        &self,
        tenant_id: &str,
        kind: &str,
        payload: Value,
    ) -> Result<OutboxEvent, AppError> {
        let now = Utc::now();
        let event = OutboxEvent {
            id: new_id(),
            tenant_id: tenant_id.to_string(),
            kind: kind.to_string(),
            payload,
            status: OutboxStatus::Pending,
            error: None,
            created_at: now,
            updated_at: now,
        };
        self.store.set(OUTBOX, &event.id, to_document(&event)?).await?;
        Ok(event)
    }

    pub async fn mark(
        &self,
        mut event: OutboxEvent,
        status: OutboxStatus,
        error: Option<String>,
    ) -> Result<OutboxEvent, AppError> {
        event.status = status;
        event.error = error;
        event.updated_at = Utc::now();
        self.store.set(OUTBOX, &event.id, to_document(&event)?).await?;
        Ok(event)
    }

    pub async fn list(&self, tenant_id: &str) -> Result<Vec<OutboxEvent>, AppError> {
        let docs = self
            .store
            .query(OUTBOX, &Filter::eq("tenantId", tenant_id), Some("createdAt"))
            .await?;

        docs.into_iter()
            .map(|d| from_document(d).map_err(AppError::from))
            .collect()
    }
}
