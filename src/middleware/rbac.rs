// src/middleware/rbac.rs

use axum::{
    extract::FromRequestParts,
    http::{request::Parts, StatusCode},
};
use std::marker::PhantomData;

use crate::{
    common::error::ApiError,
    middleware::auth::AuthenticatedUser,
    models::auth::{PERM_CATALOG_WRITE, PERM_MEMBERS_READ, PERM_MEMBERS_WRITE},
};

/// 1. O Trait que define o que é uma Permissão
pub trait PermissionDef: Send + Sync + 'static {
    fn slug() -> &'static str;
}

/// 2. O Extractor (Guardião)
pub struct RequirePermission<T>(pub PhantomData<T>);

impl<T, S> FromRequestParts<S> for RequirePermission<T>
where
    T: PermissionDef,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        // As permissões vêm no documento do operador, carregado pelo auth_guard
        let user = parts
            .extensions
            .get::<AuthenticatedUser>()
            .ok_or_else(|| ApiError::new(StatusCode::UNAUTHORIZED, "Usuário não autenticado"))?;

        let required_perm = T::slug();

        if !user.0.can(required_perm) {
            return Err(ApiError::new(
                StatusCode::FORBIDDEN,
                format!("Você precisa da permissão '{}' para realizar esta ação.", required_perm),
            ));
        }

        Ok(RequirePermission(PhantomData))
    }
}

// ---
// DEFINIÇÃO DAS PERMISSÕES (TIPOS)
// ---

pub struct PermMembersRead;
impl PermissionDef for PermMembersRead {
    fn slug() -> &'static str { PERM_MEMBERS_READ }
}

pub struct PermMembersWrite;
impl PermissionDef for PermMembersWrite {
    fn slug() -> &'static str { PERM_MEMBERS_WRITE }
}

pub struct PermCatalogWrite;
impl PermissionDef for PermCatalogWrite {
    fn slug() -> &'static str { PERM_CATALOG_WRITE }
}
