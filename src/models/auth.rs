// src/models/auth.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

// Slugs de permissão do operador
pub const PERM_MEMBERS_READ: &str = "members:read";
pub const PERM_MEMBERS_WRITE: &str = "members:write";
pub const PERM_MEMBERS_DELETE: &str = "members:delete";
pub const PERM_CATALOG_WRITE: &str = "catalog:write";

pub const ALL_PERMISSIONS: [&str; 4] = [
    PERM_MEMBERS_READ,
    PERM_MEMBERS_WRITE,
    PERM_MEMBERS_DELETE,
    PERM_CATALOG_WRITE,
];

// Conta de acesso como fica no armazenamento (coleção "users").
// O hash da senha vai junto no documento; para a API use `UserProfile`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub tenant_id: String,
    pub name: String,
    pub email: String,
    pub password_hash: String,

    // "owner" para quem registrou a casa, "member" para logins vinculados
    pub role: String,
    pub profile_type: Option<String>,
    #[serde(default)]
    pub permissions: Vec<String>,

    // Membro ao qual esse login pertence, se houver
    pub linked_entity_id: Option<String>,
    pub photo: Option<String>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn can(&self, permission: &str) -> bool {
        self.permissions.iter().any(|p| p == permission)
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: String,
    pub tenant_id: String,
    #[schema(example = "Pai Antônio")]
    pub name: String,
    #[schema(example = "antonio@terreiro.org")]
    pub email: String,
    pub role: String,
    pub permissions: Vec<String>,
    pub linked_entity_id: Option<String>,
}

impl From<&User> for UserProfile {
    fn from(u: &User) -> Self {
        Self {
            id: u.id.clone(),
            tenant_id: u.tenant_id.clone(),
            name: u.name.clone(),
            email: u.email.clone(),
            role: u.role.clone(),
            permissions: u.permissions.clone(),
            linked_entity_id: u.linked_entity_id.clone(),
        }
    }
}

// Dados para registro de uma nova casa com seu primeiro operador
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterUserPayload {
    #[validate(length(min = 1, message = "O nome da casa é obrigatório."))]
    #[schema(example = "Terreiro Caboclo Pena Branca")]
    pub terreiro_name: String,

    #[validate(length(min = 1, message = "O nome é obrigatório."))]
    #[schema(example = "Pai Antônio")]
    pub name: String,

    #[validate(email(message = "O e-mail fornecido é inválido."))]
    #[schema(example = "antonio@terreiro.org")]
    pub email: String,

    #[validate(length(min = 6, message = "A senha deve ter no mínimo 6 caracteres."))]
    pub password: String,

    #[schema(example = "Plano Iniciante")]
    pub plan_name: Option<String>,
}

// Dados para login
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct LoginUserPayload {
    #[validate(email(message = "O e-mail fornecido é inválido."))]
    pub email: String,
    #[validate(length(min = 6, message = "A senha deve ter no mínimo 6 caracteres."))]
    pub password: String,
}

// Resposta de autenticação com o token
#[derive(Debug, Serialize, ToSchema)]
pub struct AuthResponse {
    pub token: String,
}

// Estrutura de dados ("claims") dentro do JWT
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String, // Subject (ID do usuário)
    pub exp: usize,  // Expiration time (quando o token expira)
    pub iat: usize,  // Issued At (quando o token foi criado)
}

/// Evento "create-linked-user": pede a criação de um login para um
/// membro recém-cadastrado que informou e-mail.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateLinkedUser {
    pub name: String,
    pub email: String,
    pub role: String,
    pub profile_type: String,
    pub linked_entity_id: String,
    pub temporary_password: String,
    pub photo: Option<String>,
}

/// Quem está operando o sistema nesta requisição.
///
/// `stored_password` só existe quando a sessão guarda a senha digitada
/// no login (fluxo antigo do painel); o fluxo HTTP deixa em `None`.
#[derive(Debug, Clone)]
pub struct OperatorSession {
    pub user_id: String,
    pub tenant_id: String,
    pub permissions: Vec<String>,
    pub stored_password: Option<String>,
}

impl OperatorSession {
    pub fn can_delete(&self) -> bool {
        self.permissions.iter().any(|p| p == PERM_MEMBERS_DELETE)
    }
}

impl From<&User> for OperatorSession {
    fn from(u: &User) -> Self {
        Self {
            user_id: u.id.clone(),
            tenant_id: u.tenant_id.clone(),
            permissions: u.permissions.clone(),
            stored_password: None,
        }
    }
}
