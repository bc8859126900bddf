// src/db/document_store.rs

// O contrato de persistência: um armazenamento de documentos JSON com
// get / set / delete / consulta por igualdade + ordenação.
// Toda escrita é um overwrite do documento inteiro (sem patch parcial).

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use sqlx::{PgPool, Row};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("erro de banco de dados: {0}")]
    Database(#[from] sqlx::Error),

    #[error("documento inválido: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("armazenamento indisponível: {0}")]
    Unavailable(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

pub fn to_document<T: Serialize>(value: &T) -> StoreResult<Value> {
    Ok(serde_json::to_value(value)?)
}

pub fn from_document<T: DeserializeOwned>(doc: Value) -> StoreResult<T> {
    Ok(serde_json::from_value(doc)?)
}

/// Operadores suportados pelas consultas. Só igualdade por enquanto.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryOp {
    Eq,
}

#[derive(Debug, Clone)]
pub struct Filter {
    pub field: String,
    pub op: QueryOp,
    pub value: Value,
}

impl Filter {
    pub fn eq(field: &str, value: impl Into<Value>) -> Self {
        Self { field: field.to_string(), op: QueryOp::Eq, value: value.into() }
    }

    fn matches(&self, doc: &Value) -> bool {
        match self.op {
            QueryOp::Eq => doc.get(&self.field) == Some(&self.value),
        }
    }
}

#[async_trait]
pub trait DocumentStore: Send + Sync + 'static {
    async fn get(&self, collection: &str, id: &str) -> StoreResult<Option<Value>>;

    async fn set(&self, collection: &str, id: &str, document: Value) -> StoreResult<()>;

    /// Remover um id inexistente não é erro.
    async fn delete(&self, collection: &str, id: &str) -> StoreResult<()>;

    /// Sem `order_by` a ordem é a de inserção.
    async fn query(
        &self,
        collection: &str,
        filter: &Filter,
        order_by: Option<&str>,
    ) -> StoreResult<Vec<Value>>;
}

// =========================================================================
//  MEMÓRIA (testes e desenvolvimento)
// =========================================================================

#[derive(Default)]
struct Collection {
    // Ordem de inserção; um overwrite mantém a posição original
    order: Vec<String>,
    docs: HashMap<String, Value>,
}

#[derive(Clone, Default)]
pub struct MemoryDocumentStore {
    data: Arc<RwLock<HashMap<String, Collection>>>,
}

impl MemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn poisoned<T>(_: T) -> StoreError {
    StoreError::Unavailable("lock envenenado".into())
}

fn sort_key(doc: &Value, field: &str) -> String {
    match doc.get(field) {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Null) | None => String::new(),
        Some(other) => other.to_string(),
    }
}

#[async_trait]
impl DocumentStore for MemoryDocumentStore {
    async fn get(&self, collection: &str, id: &str) -> StoreResult<Option<Value>> {
        let data = self.data.read().map_err(poisoned)?;
        Ok(data.get(collection).and_then(|c| c.docs.get(id).cloned()))
    }

    async fn set(&self, collection: &str, id: &str, document: Value) -> StoreResult<()> {
        let mut data = self.data.write().map_err(poisoned)?;
        let coll = data.entry(collection.to_string()).or_default();
        if coll.docs.insert(id.to_string(), document).is_none() {
            coll.order.push(id.to_string());
        }
        Ok(())
    }

    async fn delete(&self, collection: &str, id: &str) -> StoreResult<()> {
        let mut data = self.data.write().map_err(poisoned)?;
        if let Some(coll) = data.get_mut(collection) {
            if coll.docs.remove(id).is_some() {
                coll.order.retain(|k| k != id);
            }
        }
        Ok(())
    }

    async fn query(
        &self,
        collection: &str,
        filter: &Filter,
        order_by: Option<&str>,
    ) -> StoreResult<Vec<Value>> {
        let data = self.data.read().map_err(poisoned)?;
        let Some(coll) = data.get(collection) else {
            return Ok(Vec::new());
        };

        let mut found: Vec<Value> = coll
            .order
            .iter()
            .filter_map(|id| coll.docs.get(id))
            .filter(|doc| filter.matches(doc))
            .cloned()
            .collect();

        if let Some(field) = order_by {
            // sort_by_key é estável: empates mantêm a ordem de inserção
            found.sort_by_key(|doc| sort_key(doc, field));
        }

        Ok(found)
    }
}

// =========================================================================
//  POSTGRES (JSONB)
// =========================================================================

#[derive(Clone)]
pub struct PgDocumentStore {
    pool: PgPool,
}

impl PgDocumentStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl DocumentStore for PgDocumentStore {
    async fn get(&self, collection: &str, id: &str) -> StoreResult<Option<Value>> {
        let row = sqlx::query("SELECT body FROM documents WHERE collection = $1 AND id = $2")
            .bind(collection)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(|r| r.try_get::<Value, _>("body")).transpose()?)
    }

    async fn set(&self, collection: &str, id: &str, document: Value) -> StoreResult<()> {
        // UPSERT (Insert or Update), sempre o documento inteiro
        sqlx::query(
            r#"
            INSERT INTO documents (collection, id, body)
            VALUES ($1, $2, $3)
            ON CONFLICT (collection, id)
            DO UPDATE SET body = EXCLUDED.body, updated_at = NOW()
            "#,
        )
        .bind(collection)
        .bind(id)
        .bind(&document)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn delete(&self, collection: &str, id: &str) -> StoreResult<()> {
        sqlx::query("DELETE FROM documents WHERE collection = $1 AND id = $2")
            .bind(collection)
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn query(
        &self,
        collection: &str,
        filter: &Filter,
        order_by: Option<&str>,
    ) -> StoreResult<Vec<Value>> {
        // O campo de ordenação vai como parâmetro ($3) e não interpolado.
        // seq é a ordem de inserção, usada como desempate.
        let rows = match filter.op {
            QueryOp::Eq => {
                sqlx::query(
                    r#"
                    SELECT body FROM documents
                    WHERE collection = $1
                      AND body -> $2 = $4
                    ORDER BY
                      CASE WHEN $3::text IS NULL THEN NULL ELSE body ->> $3 END ASC NULLS FIRST,
                      seq ASC
                    "#,
                )
                .bind(collection)
                .bind(&filter.field)
                .bind(order_by)
                .bind(&filter.value)
                .fetch_all(&self.pool)
                .await?
            }
        };

        rows.into_iter()
            .map(|r| r.try_get::<Value, _>("body").map_err(StoreError::from))
            .collect()
    }
}
