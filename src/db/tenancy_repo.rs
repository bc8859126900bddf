// src/db/tenancy_repo.rs

use std::sync::Arc;

use crate::{
    common::error::AppError,
    db::document_store::{from_document, to_document, DocumentStore},
    models::tenancy::Tenant,
};

const TENANTS: &str = "tenants";

#[derive(Clone)]
pub struct TenantRepository {
    store: Arc<dyn DocumentStore>,
}

impl TenantRepository {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    pub async fn save(&self, tenant: &Tenant) -> Result<(), AppError> {
        self.store.set(TENANTS, &tenant.id, to_document(tenant)?).await?;
        Ok(())
    }

    pub async fn find_by_id(&self, id: &str) -> Result<Option<Tenant>, AppError> {
        match self.store.get(TENANTS, id).await? {
            Some(doc) => Ok(Some(from_document(doc)?)),
            None => Ok(None),
        }
    }
}
