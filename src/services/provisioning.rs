// src/services/provisioning.rs

// Criação do login vinculado a um membro recém-cadastrado.
// Roda depois da gravação do membro e não participa dela: se falhar,
// o membro continua salvo e o resultado volta separado para o operador.

use async_trait::async_trait;
use chrono::Utc;
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{
        outbox_repo::{OutboxRepository, OutboxStatus},
        UserRepository,
    },
    models::{
        auth::{CreateLinkedUser, User},
        member::{new_id, Member, MemberStatus},
    },
    services::auth::hash_password,
};

pub const CREATE_LINKED_USER: &str = "create-linked-user";

const TEMPORARY_PASSWORD_LEN: usize = 10;

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum ProvisioningStatus {
    /// Membro sem e-mail: nada a criar.
    NotRequested,
    Provisioned {
        #[serde(rename = "userId")]
        user_id: String,
    },
    Failed { reason: String },
}

/// O colaborador que cria contas de acesso.
#[async_trait]
pub trait LinkedAccountProvisioner: Send + Sync {
    /// Devolve o id da conta criada.
    async fn provision(&self, tenant_id: &str, request: &CreateLinkedUser) -> Result<String, AppError>;
}

/// Cria a conta direto na coleção "users", sem nenhuma permissão de operador.
pub struct StoreAccountProvisioner {
    user_repo: UserRepository,
}

impl StoreAccountProvisioner {
    pub fn new(user_repo: UserRepository) -> Self {
        Self { user_repo }
    }
}

#[async_trait]
impl LinkedAccountProvisioner for StoreAccountProvisioner {
    async fn provision(&self, tenant_id: &str, request: &CreateLinkedUser) -> Result<String, AppError> {
        let now = Utc::now();
        let user = User {
            id: new_id(),
            tenant_id: tenant_id.to_string(),
            name: request.name.clone(),
            email: request.email.trim().to_lowercase(),
            password_hash: hash_password(&request.temporary_password).await?,
            role: request.role.clone(),
            profile_type: Some(request.profile_type.clone()),
            permissions: Vec::new(),
            linked_entity_id: Some(request.linked_entity_id.clone()),
            photo: request.photo.clone(),
            created_at: now,
            updated_at: now,
        };
        self.user_repo.create_user(&user).await?;
        Ok(user.id)
    }
}

pub fn temporary_password() -> String {
    Uuid::new_v4().simple().to_string()[..TEMPORARY_PASSWORD_LEN].to_string()
}

/// Monta o evento para um membro; `None` quando ele não tem e-mail.
pub fn linked_user_request(member: &Member) -> Option<CreateLinkedUser> {
    let email = member.email.as_deref()?.trim();
    if email.is_empty() {
        return None;
    }

    let profile_type = match member.status {
        MemberStatus::Consulente => "consulente",
        _ => "member",
    };

    Some(CreateLinkedUser {
        name: member.name.clone(),
        email: email.to_string(),
        role: "member".into(),
        profile_type: profile_type.into(),
        linked_entity_id: member.id.clone(),
        temporary_password: temporary_password(),
        photo: member.photo.clone(),
    })
}

/// Registra o evento no outbox, chama o colaborador e anota o desfecho.
/// Nunca devolve erro: tudo vira `ProvisioningStatus`.
pub async fn provision_linked_user(
    outbox: &OutboxRepository,
    provisioner: &dyn LinkedAccountProvisioner,
    member: &Member,
) -> ProvisioningStatus {
    let Some(request) = linked_user_request(member) else {
        return ProvisioningStatus::NotRequested;
    };

    // O outbox guarda o pedido sem a senha temporária
    let mut logged = request.clone();
    logged.temporary_password = String::new();
    let event = match serde_json::to_value(&logged) {
        Ok(payload) => match outbox.record(&member.tenant_id, CREATE_LINKED_USER, payload).await {
            Ok(event) => Some(event),
            Err(e) => {
                tracing::warn!("Não foi possível registrar o evento no outbox: {}", e);
                None
            }
        },
        Err(e) => {
            tracing::warn!("Evento de login vinculado não serializou: {}", e);
            None
        }
    };

    let status = match provisioner.provision(&member.tenant_id, &request).await {
        Ok(user_id) => {
            tracing::info!("🔗 Login vinculado criado para o membro {}", member.id);
            ProvisioningStatus::Provisioned { user_id }
        }
        Err(e) => {
            tracing::warn!("Falha ao criar login vinculado do membro {}: {}", member.id, e);
            ProvisioningStatus::Failed { reason: e.to_string() }
        }
    };

    if let Some(event) = event {
        let (outcome, error) = match &status {
            ProvisioningStatus::Failed { reason } => (OutboxStatus::Failed, Some(reason.clone())),
            _ => (OutboxStatus::Delivered, None),
        };
        if let Err(e) = outbox.mark(event, outcome, error).await {
            tracing::warn!("Não foi possível atualizar o outbox: {}", e);
        }
    }

    status
}
