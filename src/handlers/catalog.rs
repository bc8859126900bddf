// src/handlers/catalog.rs

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::{
    common::error::{ApiError, AppError},
    config::AppState,
    middleware::{
        auth::AuthenticatedUser,
        rbac::{PermCatalogWrite, PermMembersRead, RequirePermission},
    },
    models::catalog::{CatalogEntry, CatalogKind},
};

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateCatalogEntryPayload {
    #[validate(length(min = 1, message = "required"))]
    #[schema(example = "Médium de Caboclo")]
    pub name: String,

    pub kind: CatalogKind,
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct CatalogQuery {
    /// Filtra por tipo (entity | houseRole)
    pub kind: Option<CatalogKind>,
}

// GET /api/catalog
#[utoipa::path(
    get,
    path = "/api/catalog",
    tag = "Catalog",
    params(CatalogQuery),
    responses((status = 200, description = "Entidades e funções da casa", body = Vec<CatalogEntry>)),
    security(("api_jwt" = []))
)]
pub async fn list_catalog(
    State(app_state): State<AppState>,
    _perm: RequirePermission<PermMembersRead>,
    AuthenticatedUser(user): AuthenticatedUser,
    Query(query): Query<CatalogQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let entries = app_state
        .catalog_service
        .list(&user.tenant_id, query.kind)
        .await?;

    Ok((StatusCode::OK, Json(entries)))
}

// POST /api/catalog
#[utoipa::path(
    post,
    path = "/api/catalog",
    tag = "Catalog",
    request_body = CreateCatalogEntryPayload,
    responses(
        (status = 201, description = "Item do catálogo criado", body = CatalogEntry),
        (status = 400, description = "Dados inválidos")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_catalog_entry(
    State(app_state): State<AppState>,
    _perm: RequirePermission<PermCatalogWrite>,
    AuthenticatedUser(user): AuthenticatedUser,
    Json(payload): Json<CreateCatalogEntryPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload.validate().map_err(AppError::ValidationError)?;

    let entry = app_state
        .catalog_service
        .create_entry(&user.tenant_id, &payload.name, payload.kind)
        .await?;

    Ok((StatusCode::CREATED, Json(entry)))
}
