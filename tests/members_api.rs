// tests/members_api.rs

use std::sync::Arc;

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

use terreiro_backend::{
    config::{AppConfig, AppState, StoreBackend},
    db::document_store::MemoryDocumentStore,
    services::plan::PlanContact,
};

fn test_app() -> Router {
    let config = AppConfig {
        store_backend: StoreBackend::Memory,
        database_url: None,
        jwt_secret: "segredo-de-teste".to_string(),
        bind_addr: "127.0.0.1:0".to_string(),
        contact: PlanContact { phone: "+55 (11) 99999-0000".to_string(), message: None },
    };
    let state = AppState::with_store(Arc::new(MemoryDocumentStore::new()), &config);
    terreiro_backend::app(state)
}

async fn send(app: &Router, method: Method, uri: &str, token: Option<&str>, body: Option<Value>) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, value)
}

async fn register(app: &Router, email: &str, plan: &str) -> String {
    let (status, body) = send(
        app,
        Method::POST,
        "/api/auth/register",
        None,
        Some(json!({
            "terreiroName": "Tenda de Umbanda Caboclo Sete Flechas",
            "name": "Pai Joaquim",
            "email": email,
            "password": "axe12345",
            "planName": plan,
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    body["token"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn health_is_public() {
    let app = test_app();
    let request = Request::builder().uri("/api/health").body(Body::empty()).unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn members_require_a_token() {
    let app = test_app();
    let (status, _) = send(&app, Method::GET, "/api/members", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn register_then_login_returns_profile() {
    let app = test_app();
    register(&app, "pai@terreiro.org", "Plano Iniciante").await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/auth/login",
        None,
        Some(json!({ "email": "PAI@terreiro.org", "password": "axe12345" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let token = body["token"].as_str().unwrap();

    let (status, me) = send(&app, Method::GET, "/api/users/me", Some(token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(me["email"], "pai@terreiro.org");

    let (status, _) = send(
        &app,
        Method::POST,
        "/api/auth/login",
        None,
        Some(json!({ "email": "pai@terreiro.org", "password": "errada123" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn member_lifecycle_over_http() {
    let app = test_app();
    let token = register(&app, "mae@terreiro.org", "Plano Iniciante").await;

    let (status, plan) = send(&app, Method::GET, "/api/plan", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(plan["limit"], 30);
    assert_eq!(plan["used"], 0);
    assert_eq!(plan["unlimited"], false);
    assert!(plan["contactUrl"].as_str().unwrap().starts_with("https://wa.me/5511999990000?text="));

    // CPF é normalizado pela máscara antes de gravar
    let (status, created) = send(
        &app,
        Method::POST,
        "/api/members",
        Some(&token),
        Some(json!({
            "name": "Maria Silva",
            "birthDate": "1990-01-01",
            "cpf": "11144477735",
            "phone": "11987654321",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{created}");
    assert_eq!(created["member"]["cpf"], "111.444.777-35");
    assert_eq!(created["member"]["phone"], "(11) 98765-4321");
    assert_eq!(created["provisioning"]["status"], "notRequested");
    let id = created["member"]["id"].as_str().unwrap().to_string();

    let (status, listing) = send(&app, Method::GET, "/api/members?q=maria", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(listing["total"], 1);
    assert_eq!(listing["members"][0]["id"], id.as_str());
    assert_eq!(listing["members"][0]["locked"], false);

    let (status, updated) = send(
        &app,
        Method::PUT,
        &format!("/api/members/{id}"),
        Some(&token),
        Some(json!({
            "name": "Maria da Silva",
            "birthDate": "1990-01-01",
            "cpf": "111.444.777-35",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{updated}");
    assert_eq!(updated["name"], "Maria da Silva");
    assert!(updated["phone"].is_null());

    let (status, _) = send(
        &app,
        Method::DELETE,
        &format!("/api/members/{id}"),
        Some(&token),
        Some(json!({ "password": "senha-errada" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = send(
        &app,
        Method::DELETE,
        &format!("/api/members/{id}"),
        Some(&token),
        Some(json!({ "password": "axe12345" })),
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = send(&app, Method::GET, &format!("/api/members/{id}"), Some(&token), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn invalid_draft_reports_each_field() {
    let app = test_app();
    let token = register(&app, "ogan@terreiro.org", "Plano Iniciante").await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/members",
        Some(&token),
        Some(json!({ "name": "  ", "cpf": "11111111111", "email": "sem-arroba" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let details = &body["details"];
    assert_eq!(details["name"][0]["code"], "required");
    assert_eq!(details["birthDate"][0]["code"], "required");
    assert_eq!(details["cpf"][0]["code"], "invalid_cpf");
    assert_eq!(details["email"][0]["code"], "invalid_email");

    let (_, plan) = send(&app, Method::GET, "/api/plan", Some(&token), None).await;
    assert_eq!(plan["used"], 0);
}

#[tokio::test]
async fn member_with_email_gets_a_linked_login_without_permissions() {
    let app = test_app();
    let token = register(&app, "zelador@terreiro.org", "Plano Expandido").await;

    let (status, created) = send(
        &app,
        Method::POST,
        "/api/members",
        Some(&token),
        Some(json!({
            "name": "João Batista",
            "birthDate": "1985-06-24",
            "email": "Joao@Terreiro.org",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{created}");
    assert_eq!(created["provisioning"]["status"], "provisioned");
    assert!(created["provisioning"]["userId"].is_string());

    // O mesmo e-mail não pode ser usado de novo para abrir uma casa
    let (status, _) = send(
        &app,
        Method::POST,
        "/api/auth/register",
        None,
        Some(json!({
            "terreiroName": "Outra Casa",
            "name": "João",
            "email": "joao@terreiro.org",
            "password": "axe12345",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn plan_ceiling_blocks_new_members() {
    let app = test_app();
    let token = register(&app, "teto@terreiro.org", "Plano Iniciante").await;

    for n in 0..30 {
        let (status, body) = send(
            &app,
            Method::POST,
            "/api/members",
            Some(&token),
            Some(json!({ "name": format!("Filho {n}"), "birthDate": "2000-01-01" })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED, "{body}");
    }

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/members",
        Some(&token),
        Some(json!({ "name": "Filho 31", "birthDate": "2000-01-01" })),
    )
    .await;
    assert_eq!(status, StatusCode::PAYMENT_REQUIRED);
    assert_eq!(body["details"]["limit"], 30);
    assert!(body["details"]["contactUrl"].as_str().unwrap().starts_with("https://wa.me/"));

    let (_, listing) = send(&app, Method::GET, "/api/members", Some(&token), None).await;
    assert_eq!(listing["total"], 30);
    assert_eq!(listing["planLimit"], 30);
    assert!(listing["members"].as_array().unwrap().iter().all(|m| m["locked"] == false));
}

#[tokio::test]
async fn house_roles_drive_the_derived_flags() {
    let app = test_app();
    let token = register(&app, "cambone@terreiro.org", "Plano Iniciante").await;

    let (status, role) = send(
        &app,
        Method::POST,
        "/api/catalog",
        Some(&token),
        Some(json!({ "name": "Cambone de Exu", "kind": "houseRole" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{role}");
    let role_id = role["id"].as_str().unwrap().to_string();

    let (status, draft) = send(
        &app,
        Method::POST,
        "/api/members/draft/house-roles",
        Some(&token),
        Some(json!({ "draft": { "name": "Ana" }, "roleId": role_id })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{draft}");
    assert_eq!(draft["houseRoleIds"][0], role_id.as_str());
    assert_eq!(draft["isCambone"], true);
    assert_eq!(draft["isMedium"], false);

    let (status, roles) = send(&app, Method::GET, "/api/catalog?kind=houseRole", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(roles.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn masks_format_partial_input() {
    let app = test_app();

    let (status, body) = send(&app, Method::GET, "/api/masks/cpf?value=1114447", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["formatted"], "111.444.7");
    assert_eq!(body["valid"], false);

    let (_, body) = send(&app, Method::GET, "/api/masks/cep?value=01310-100", None, None).await;
    assert_eq!(body["formatted"], "01310-100");
    assert_eq!(body["digits"], "01310100");
}
