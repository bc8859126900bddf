// src/db/member_repo.rs

use std::sync::Arc;

use crate::{
    common::error::AppError,
    db::document_store::{from_document, to_document, DocumentStore, Filter},
    models::member::Member,
};

const MEMBERS: &str = "members";

#[derive(Clone)]
pub struct MemberRepository {
    store: Arc<dyn DocumentStore>,
}

impl MemberRepository {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    /// Todos os membros da casa, do mais antigo para o mais novo.
    /// Essa ordem define quem fica além do limite do plano.
    pub async fn list(&self, tenant_id: &str) -> Result<Vec<Member>, AppError> {
        let docs = self
            .store
            .query(MEMBERS, &Filter::eq("tenantId", tenant_id), Some("createdAt"))
            .await?;

        docs.into_iter()
            .map(|d| from_document(d).map_err(AppError::from))
            .collect()
    }

    pub async fn find(&self, tenant_id: &str, id: &str) -> Result<Option<Member>, AppError> {
        let Some(doc) = self.store.get(MEMBERS, id).await? else {
            return Ok(None);
        };
        let member: Member = from_document(doc)?;

        // Documento de outra casa não existe para este tenant
        Ok((member.tenant_id == tenant_id).then_some(member))
    }

    /// Grava o documento inteiro (cria ou substitui).
    pub async fn save(&self, member: &Member) -> Result<(), AppError> {
        self.store.set(MEMBERS, &member.id, to_document(member)?).await?;
        Ok(())
    }

    pub async fn delete(&self, id: &str) -> Result<(), AppError> {
        self.store.delete(MEMBERS, id).await?;
        Ok(())
    }
}
