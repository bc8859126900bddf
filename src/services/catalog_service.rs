// src/services/catalog_service.rs

use crate::{
    common::error::AppError,
    db::CatalogRepository,
    models::{
        catalog::{CatalogEntry, CatalogKind},
        member::new_id,
    },
};

#[derive(Clone)]
pub struct CatalogService {
    repo: CatalogRepository,
}

impl CatalogService {
    pub fn new(repo: CatalogRepository) -> Self {
        Self { repo }
    }

    pub async fn create_entry(
        &self,
        tenant_id: &str,
        name: &str,
        kind: CatalogKind,
    ) -> Result<CatalogEntry, AppError> {
        let entry = CatalogEntry {
            id: new_id(),
            tenant_id: tenant_id.to_string(),
            name: name.trim().to_string(),
            kind,
        };
        self.repo.create(&entry).await?;
        Ok(entry)
    }

    pub async fn list(
        &self,
        tenant_id: &str,
        kind: Option<CatalogKind>,
    ) -> Result<Vec<CatalogEntry>, AppError> {
        let mut entries = self.repo.list(tenant_id).await?;
        if let Some(kind) = kind {
            entries.retain(|e| e.kind == kind);
        }
        Ok(entries)
    }
}
