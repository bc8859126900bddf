// src/common/error.rs

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};
use thiserror::Error;

use crate::db::document_store::StoreError;

// Nosso tipo de erro, com `thiserror` para melhor ergonomia.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Erro de validação")]
    ValidationError(#[from] validator::ValidationErrors),

    #[error("Você não tem permissão para excluir registros")]
    PermissionDenied,

    #[error("Senha de confirmação incorreta")]
    WrongPassword,

    #[error("Limite de {limit} cadastros do plano atingido")]
    PlanLimitReached { limit: usize, contact_url: String },

    #[error("{0} não encontrado")]
    NotFound(&'static str),

    #[error("E-mail já existe")]
    EmailAlreadyExists,

    #[error("Credenciais inválidas")]
    InvalidCredentials,

    #[error("Token inválido")]
    InvalidToken,

    #[error("Usuário não encontrado")]
    UserNotFound,

    // Falha do armazenamento de documentos. O rascunho do operador fica
    // intacto e ele pode reenviar manualmente.
    #[error("Falha ao gravar no armazenamento: {0}")]
    Persistence(#[from] StoreError),

    #[error("Erro interno do servidor")]
    InternalServerError(#[from] anyhow::Error),

    #[error("Erro de Bcrypt: {0}")]
    BcryptError(#[from] bcrypt::BcryptError),

    #[error("Erro de JWT: {0}")]
    JwtError(#[from] jsonwebtoken::errors::Error),
}

/// Acumula erros por campo no formato do `validator`, para os casos em
/// que a regra não cabe num `#[validate(...)]` (CPF, telefone, foto).
#[derive(Debug, Default)]
pub struct FieldErrors(validator::ValidationErrors);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, field: &'static str, code: &'static str, message: &'static str) {
        let mut err = validator::ValidationError::new(code);
        err.message = Some(message.into());
        self.0.add(field, err);
    }

    pub fn into_result(self) -> Result<(), AppError> {
        if self.0.is_empty() {
            Ok(())
        } else {
            Err(AppError::ValidationError(self.0))
        }
    }
}

// O envelope JSON que o cliente recebe
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub error: String,
    pub details: Option<Value>,
}

impl ApiError {
    pub fn new(status: StatusCode, error: impl Into<String>) -> Self {
        Self { status, error: error.into(), details: None }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = match self.details {
            Some(details) => json!({ "error": self.error, "details": details }),
            None => json!({ "error": self.error }),
        };
        (self.status, Json(body)).into_response()
    }
}

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        match err {
            // Retorna todos os detalhes da validação, campo a campo.
            AppError::ValidationError(errors) => {
                let mut details = serde_json::Map::new();
                for (field, field_errors) in errors.field_errors() {
                    let entries: Vec<Value> = field_errors
                        .iter()
                        .map(|e| {
                            json!({
                                "code": e.code.to_string(),
                                "message": e.message.as_ref().map(|m| m.to_string()),
                            })
                        })
                        .collect();
                    details.insert(field.to_string(), Value::Array(entries));
                }
                ApiError {
                    status: StatusCode::BAD_REQUEST,
                    error: "Um ou mais campos são inválidos.".into(),
                    details: Some(Value::Object(details)),
                }
            }
            AppError::PermissionDenied => {
                ApiError::new(StatusCode::FORBIDDEN, "Você não tem permissão para excluir registros.")
            }
            AppError::WrongPassword => {
                ApiError::new(StatusCode::UNAUTHORIZED, "Senha incorreta. Tente novamente.")
            }
            AppError::PlanLimitReached { limit, contact_url } => ApiError {
                status: StatusCode::PAYMENT_REQUIRED,
                error: format!(
                    "Seu plano permite até {} cadastros. Fale conosco para ampliar o limite.",
                    limit
                ),
                details: Some(json!({ "limit": limit, "contactUrl": contact_url })),
            },
            AppError::NotFound(what) => {
                ApiError::new(StatusCode::NOT_FOUND, format!("{} não encontrado.", what))
            }
            AppError::EmailAlreadyExists => ApiError::new(StatusCode::CONFLICT, "Este e-mail já está em uso."),
            AppError::InvalidCredentials => {
                ApiError::new(StatusCode::UNAUTHORIZED, "E-mail ou senha inválidos.")
            }
            AppError::InvalidToken => {
                ApiError::new(StatusCode::UNAUTHORIZED, "Token de autenticação inválido ou ausente.")
            }
            AppError::UserNotFound => ApiError::new(StatusCode::NOT_FOUND, "Usuário não encontrado."),
            AppError::Persistence(ref e) => {
                tracing::error!("Falha no armazenamento: {}", e);
                ApiError::new(
                    StatusCode::SERVICE_UNAVAILABLE,
                    "Não foi possível salvar. Tente novamente.",
                )
            }

            // Todos os outros erros viram 500.
            // O `tracing` loga a mensagem detalhada que `thiserror` nos deu.
            ref e => {
                tracing::error!("Erro Interno do Servidor: {}", e);
                ApiError::new(StatusCode::INTERNAL_SERVER_ERROR, "Ocorreu um erro inesperado.")
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        ApiError::from(self).into_response()
    }
}
