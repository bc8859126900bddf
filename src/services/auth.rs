// src/services/auth.rs

use async_trait::async_trait;
use bcrypt::{hash, verify};
use chrono::Utc;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};

use crate::{
    common::error::AppError,
    db::{TenantRepository, UserRepository},
    models::{
        auth::{Claims, OperatorSession, RegisterUserPayload, User, ALL_PERMISSIONS},
        member::new_id,
        tenancy::Tenant,
    },
};

// Plano de quem se registra sem escolher um
const DEFAULT_PLAN: &str = "Trial";

// Hash em thread separada: bcrypt é CPU-bound e travaria o runtime
pub(crate) async fn hash_password(password: &str) -> Result<String, AppError> {
    let password_clone = password.to_owned();
    let hashed = tokio::task::spawn_blocking(move || hash(&password_clone, bcrypt::DEFAULT_COST))
        .await
        .map_err(|e| anyhow::anyhow!("Falha na task de hashing: {}", e))??;
    Ok(hashed)
}

pub(crate) async fn verify_password(password: &str, password_hash: &str) -> Result<bool, AppError> {
    let password_clone = password.to_owned();
    let password_hash_clone = password_hash.to_owned();
    let valid = tokio::task::spawn_blocking(move || verify(&password_clone, &password_hash_clone))
        .await
        .map_err(|e| anyhow::anyhow!("Falha na task de verificação de senha: {}", e))??;
    Ok(valid)
}

#[derive(Clone)]
pub struct AuthService {
    user_repo: UserRepository,
    tenant_repo: TenantRepository,
    jwt_secret: String,
}

impl AuthService {
    pub fn new(user_repo: UserRepository, tenant_repo: TenantRepository, jwt_secret: String) -> Self {
        Self { user_repo, tenant_repo, jwt_secret }
    }

    /// Cria a casa (tenant) e o operador dono com todas as permissões.
    pub async fn register_user(&self, payload: &RegisterUserPayload) -> Result<String, AppError> {
        let email = payload.email.trim().to_lowercase();
        if self.user_repo.find_by_email(&email).await?.is_some() {
            return Err(AppError::EmailAlreadyExists);
        }

        let hashed_password = hash_password(&payload.password).await?;
        let now = Utc::now();

        let tenant = Tenant {
            id: new_id(),
            name: payload.terreiro_name.trim().to_string(),
            plan_name: payload
                .plan_name
                .clone()
                .filter(|p| !p.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_PLAN.to_string()),
            created_at: now,
            updated_at: now,
        };
        self.tenant_repo.save(&tenant).await?;

        let owner = User {
            id: new_id(),
            tenant_id: tenant.id.clone(),
            name: payload.name.trim().to_string(),
            email,
            password_hash: hashed_password,
            role: "owner".into(),
            profile_type: None,
            permissions: ALL_PERMISSIONS.iter().map(|p| p.to_string()).collect(),
            linked_entity_id: None,
            photo: None,
            created_at: now,
            updated_at: now,
        };
        self.user_repo.create_user(&owner).await?;

        tracing::info!("🏠 Casa '{}' registrada (plano '{}')", tenant.name, tenant.plan_name);

        self.create_token(&owner.id)
    }

    pub async fn login_user(&self, email: &str, password: &str) -> Result<String, AppError> {
        let user = self
            .user_repo
            .find_by_email(&email.trim().to_lowercase())
            .await?
            .ok_or(AppError::InvalidCredentials)?;

        if !verify_password(password, &user.password_hash).await? {
            return Err(AppError::InvalidCredentials);
        }

        self.create_token(&user.id)
    }

    pub async fn validate_token(&self, token: &str) -> Result<User, AppError> {
        let validation = Validation::default();
        let token_data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.jwt_secret.as_ref()),
            &validation,
        )
        .map_err(|_| AppError::InvalidToken)?;

        self.user_repo
            .find_by_id(&token_data.claims.sub)
            .await?
            .ok_or(AppError::UserNotFound)
    }

    fn create_token(&self, user_id: &str) -> Result<String, AppError> {
        let now = Utc::now();
        let expires_at = now + chrono::Duration::days(7);

        let claims = Claims {
            sub: user_id.to_string(),
            exp: expires_at.timestamp() as usize,
            iat: now.timestamp() as usize,
        };

        Ok(encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.jwt_secret.as_ref()),
        )?)
    }
}

// =========================================================================
//  RECONFIRMAÇÃO DE SENHA (exclusão de membro)
// =========================================================================

/// Pede ao operador que digite a senha de novo antes de uma ação destrutiva.
#[async_trait]
pub trait PasswordConfirmation: Send + Sync {
    async fn confirm(&self, session: &OperatorSession, password: &str) -> Result<bool, AppError>;
}

/// Comparação literal com a senha guardada na sessão do painel.
/// Não é proteção criptográfica.
pub struct PlaintextSessionConfirmation;

#[async_trait]
impl PasswordConfirmation for PlaintextSessionConfirmation {
    async fn confirm(&self, session: &OperatorSession, password: &str) -> Result<bool, AppError> {
        Ok(session.stored_password.as_deref() == Some(password))
    }
}

/// Confere contra o hash bcrypt da conta do operador.
pub struct AccountPasswordConfirmation {
    user_repo: UserRepository,
}

impl AccountPasswordConfirmation {
    pub fn new(user_repo: UserRepository) -> Self {
        Self { user_repo }
    }
}

#[async_trait]
impl PasswordConfirmation for AccountPasswordConfirmation {
    async fn confirm(&self, session: &OperatorSession, password: &str) -> Result<bool, AppError> {
        let user = self
            .user_repo
            .find_by_id(&session.user_id)
            .await?
            .ok_or(AppError::UserNotFound)?;
        verify_password(password, &user.password_hash).await
    }
}
