// src/docs.rs

use utoipa::OpenApi;
use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use crate::handlers;
use crate::models;
use crate::services;
use crate::common;

#[derive(OpenApi)]
#[openapi(
    paths(
        // --- Auth ---
        handlers::auth::register,
        handlers::auth::login,

        // --- Users ---
        handlers::auth::get_me,

        // --- Members ---
        handlers::members::list_members,
        handlers::members::get_member,
        handlers::members::create_member,
        handlers::members::update_member,
        handlers::members::delete_member,
        handlers::members::toggle_house_role,
        handlers::members::get_plan,

        // --- Catalog ---
        handlers::catalog::list_catalog,
        handlers::catalog::create_catalog_entry,

        // --- Masks ---
        handlers::masks::format_value,
    ),
    components(
        schemas(
            // --- Auth ---
            models::auth::UserProfile,
            models::auth::RegisterUserPayload,
            models::auth::LoginUserPayload,
            models::auth::AuthResponse,
            models::auth::CreateLinkedUser,

            // --- Members ---
            models::member::MemberStatus,
            models::member::ObligationLocation,
            models::member::PaymentStatus,
            models::member::SpiritualMilestone,
            models::member::SpiritualObligation,
            models::member::Member,
            models::member::MemberDraft,
            services::member_service::MemberRow,
            services::member_service::MemberListing,
            services::member_service::CreateOutcome,
            services::provisioning::ProvisioningStatus,
            handlers::members::DeleteMemberPayload,
            handlers::members::ToggleHouseRolePayload,

            // --- Plano ---
            models::tenancy::Tenant,
            models::tenancy::PlanStatus,

            // --- Catalog ---
            models::catalog::CatalogKind,
            models::catalog::CatalogEntry,
            models::catalog::HouseRoleFlags,
            handlers::catalog::CreateCatalogEntryPayload,

            // --- Masks ---
            common::validators::MaskKind,
            handlers::masks::MaskResponse,
        )
    ),
    tags(
        (name = "Auth", description = "Autenticação e Registro da Casa"),
        (name = "Users", description = "Dados do Operador"),
        (name = "Members", description = "Cadastro de Membros e Limite do Plano"),
        (name = "Catalog", description = "Entidades e Funções da Casa"),
        (name = "Masks", description = "Formatação de CPF, RG, CEP e Telefone")
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "api_jwt",
            SecurityScheme::Http(
                Http::new(HttpAuthScheme::Bearer)
            ),
        );
    }
}
