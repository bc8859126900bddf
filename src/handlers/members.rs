// src/handlers/members.rs

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};

use crate::{
    common::error::ApiError,
    config::AppState,
    middleware::{
        auth::AuthenticatedUser,
        rbac::{PermMembersRead, PermMembersWrite, RequirePermission},
    },
    models::{
        auth::OperatorSession,
        member::{Member, MemberDraft},
        tenancy::PlanStatus,
    },
    services::member_service::{CreateOutcome, MemberListing},
};

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListMembersQuery {
    /// Busca por nome, CPF, e-mail ou id
    #[serde(default)]
    pub q: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct DeleteMemberPayload {
    pub password: String,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ToggleHouseRolePayload {
    pub draft: MemberDraft,
    pub role_id: String,
}

// GET /api/members
#[utoipa::path(
    get,
    path = "/api/members",
    tag = "Members",
    params(ListMembersQuery),
    responses((status = 200, description = "Membros da casa com trava do plano", body = MemberListing)),
    security(("api_jwt" = []))
)]
pub async fn list_members(
    State(app_state): State<AppState>,
    _perm: RequirePermission<PermMembersRead>,
    AuthenticatedUser(user): AuthenticatedUser,
    Query(query): Query<ListMembersQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let registry = app_state.member_service.registry_for(&user.tenant_id).await?;
    let listing = registry.list(&query.q).await?;

    Ok((StatusCode::OK, Json(listing)))
}

// GET /api/members/{id}
#[utoipa::path(
    get,
    path = "/api/members/{id}",
    tag = "Members",
    params(("id" = String, Path, description = "ID do membro")),
    responses(
        (status = 200, description = "Membro", body = Member),
        (status = 404, description = "Não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_member(
    State(app_state): State<AppState>,
    _perm: RequirePermission<PermMembersRead>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let registry = app_state.member_service.registry_for(&user.tenant_id).await?;
    let member = registry.get(&id).await?;

    Ok((StatusCode::OK, Json(member)))
}

// POST /api/members
#[utoipa::path(
    post,
    path = "/api/members",
    tag = "Members",
    request_body = MemberDraft,
    responses(
        (status = 201, description = "Membro cadastrado", body = CreateOutcome),
        (status = 400, description = "Dados inválidos"),
        (status = 402, description = "Limite do plano atingido")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_member(
    State(app_state): State<AppState>,
    _perm: RequirePermission<PermMembersWrite>,
    AuthenticatedUser(user): AuthenticatedUser,
    Json(draft): Json<MemberDraft>,
) -> Result<impl IntoResponse, ApiError> {
    let registry = app_state.member_service.registry_for(&user.tenant_id).await?;
    let outcome = registry.create(draft).await?;

    Ok((StatusCode::CREATED, Json(outcome)))
}

// PUT /api/members/{id}
#[utoipa::path(
    put,
    path = "/api/members/{id}",
    tag = "Members",
    params(("id" = String, Path, description = "ID do membro")),
    request_body = MemberDraft,
    responses(
        (status = 200, description = "Membro atualizado", body = Member),
        (status = 400, description = "Dados inválidos"),
        (status = 402, description = "Registro além do limite do plano"),
        (status = 404, description = "Não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_member(
    State(app_state): State<AppState>,
    _perm: RequirePermission<PermMembersWrite>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(id): Path<String>,
    Json(draft): Json<MemberDraft>,
) -> Result<impl IntoResponse, ApiError> {
    let registry = app_state.member_service.registry_for(&user.tenant_id).await?;
    let member = registry.update(&id, draft).await?;

    Ok((StatusCode::OK, Json(member)))
}

// DELETE /api/members/{id}
// A permissão de exclusão é conferida no serviço, junto com a senha.
#[utoipa::path(
    delete,
    path = "/api/members/{id}",
    tag = "Members",
    params(("id" = String, Path, description = "ID do membro")),
    request_body = DeleteMemberPayload,
    responses(
        (status = 204, description = "Membro excluído"),
        (status = 401, description = "Senha incorreta"),
        (status = 403, description = "Sem permissão de exclusão"),
        (status = 404, description = "Não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_member(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(id): Path<String>,
    Json(payload): Json<DeleteMemberPayload>,
) -> Result<impl IntoResponse, ApiError> {
    let registry = app_state.member_service.registry_for(&user.tenant_id).await?;
    let session = OperatorSession::from(&user);
    registry.delete(&id, &payload.password, &session).await?;

    Ok(StatusCode::NO_CONTENT)
}

// POST /api/members/draft/house-roles
#[utoipa::path(
    post,
    path = "/api/members/draft/house-roles",
    tag = "Members",
    request_body = ToggleHouseRolePayload,
    responses((status = 200, description = "Rascunho com as flags recalculadas", body = MemberDraft)),
    security(("api_jwt" = []))
)]
pub async fn toggle_house_role(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Json(payload): Json<ToggleHouseRolePayload>,
) -> Result<impl IntoResponse, ApiError> {
    let registry = app_state.member_service.registry_for(&user.tenant_id).await?;
    let draft = registry.toggle_house_role(payload.draft, &payload.role_id).await?;

    Ok((StatusCode::OK, Json(draft)))
}

// GET /api/plan
#[utoipa::path(
    get,
    path = "/api/plan",
    tag = "Members",
    responses((status = 200, description = "Limite do plano e uso atual", body = PlanStatus)),
    security(("api_jwt" = []))
)]
pub async fn get_plan(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
) -> Result<impl IntoResponse, ApiError> {
    let registry = app_state.member_service.registry_for(&user.tenant_id).await?;
    let status = registry.plan_status().await?;

    Ok((StatusCode::OK, Json(status)))
}
