// src/db/catalog_repo.rs

use std::sync::Arc;

use crate::{
    common::error::AppError,
    db::document_store::{from_document, to_document, DocumentStore, Filter},
    models::catalog::CatalogEntry,
};

const CATALOG: &str = "catalog";

#[derive(Clone)]
pub struct CatalogRepository {
    store: Arc<dyn DocumentStore>,
}

impl CatalogRepository {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    pub async fn create(&self, entry: &CatalogEntry) -> Result<(), AppError> {
        self.store.set(CATALOG, &entry.id, to_document(entry)?).await?;
        Ok(())
    }

    pub async fn list(&self, tenant_id: &str) -> Result<Vec<CatalogEntry>, AppError> {
        let docs = self
            .store
            .query(CATALOG, &Filter::eq("tenantId", tenant_id), Some("name"))
            .await?;

        docs.into_iter()
            .map(|d| from_document(d).map_err(AppError::from))
            .collect()
    }
}
