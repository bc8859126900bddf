// src/lib.rs

use axum::{
    middleware as axum_middleware,
    routing::{get, post},
    Router,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

pub mod common;
pub mod config;
pub mod db;
pub mod docs;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod services;

use crate::config::AppState;
use crate::docs::ApiDoc;
use crate::middleware::auth::auth_guard;

/// Monta o router completo da API.
pub fn app(app_state: AppState) -> Router {
    // Rotas de autenticação (públicas)
    let auth_routes = Router::new()
        .route("/register", post(handlers::auth::register))
        .route("/login", post(handlers::auth::login));

    let user_routes = Router::new()
        .route("/me", get(handlers::auth::get_me))
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_guard,
        ));

    let member_routes = Router::new()
        .route("/"
               ,get(handlers::members::list_members)
               .post(handlers::members::create_member)
        )
        .route("/draft/house-roles"
               ,post(handlers::members::toggle_house_role)
        )
        .route("/{id}"
               ,get(handlers::members::get_member)
               .put(handlers::members::update_member)
               .delete(handlers::members::delete_member)
        )
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_guard,
        ));

    let plan_routes = Router::new()
        .route("/", get(handlers::members::get_plan))
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_guard,
        ));

    let catalog_routes = Router::new()
        .route("/"
               ,get(handlers::catalog::list_catalog)
               .post(handlers::catalog::create_catalog_entry)
        )
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_guard,
        ));

    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .route("/api/health", get(|| async { "OK" }))
        .route("/api/masks/{kind}", get(handlers::masks::format_value))
        .nest("/api/auth", auth_routes)
        .nest("/api/users", user_routes)
        .nest("/api/members", member_routes)
        .nest("/api/plan", plan_routes)
        .nest("/api/catalog", catalog_routes)
        .with_state(app_state)
}
