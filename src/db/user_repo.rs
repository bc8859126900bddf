// src/db/user_repo.rs

use std::sync::Arc;

use crate::{
    common::error::AppError,
    db::document_store::{from_document, to_document, DocumentStore, Filter},
    models::auth::User,
};

const USERS: &str = "users";

// O repositório de contas de acesso (coleção "users")
#[derive(Clone)]
pub struct UserRepository {
    store: Arc<dyn DocumentStore>,
}

impl UserRepository {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    // Busca um usuário pelo seu e-mail
    pub async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        let docs = self
            .store
            .query(USERS, &Filter::eq("email", email.to_lowercase()), None)
            .await?;

        match docs.into_iter().next() {
            Some(doc) => Ok(Some(from_document(doc)?)),
            None => Ok(None),
        }
    }

    // Busca um usuário pelo seu ID
    pub async fn find_by_id(&self, id: &str) -> Result<Option<User>, AppError> {
        match self.store.get(USERS, id).await? {
            Some(doc) => Ok(Some(from_document(doc)?)),
            None => Ok(None),
        }
    }

    // Cria uma nova conta. E-mail é único entre todas as casas.
    pub async fn create_user(&self, user: &User) -> Result<(), AppError> {
        if self.find_by_email(&user.email).await?.is_some() {
            return Err(AppError::EmailAlreadyExists);
        }
        self.store.set(USERS, &user.id, to_document(user)?).await?;
        Ok(())
    }
}
