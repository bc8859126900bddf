// src/config.rs

use std::{env, sync::Arc, time::Duration};

use anyhow::Context;
use sqlx::postgres::PgPoolOptions;

use crate::{
    db::{
        document_store::{DocumentStore, MemoryDocumentStore, PgDocumentStore},
        outbox_repo::OutboxRepository,
        CatalogRepository, MemberRepository, TenantRepository, UserRepository,
    },
    services::{
        auth::{AccountPasswordConfirmation, AuthService},
        catalog_service::CatalogService,
        member_service::MemberService,
        plan::PlanContact,
        provisioning::StoreAccountProvisioner,
    },
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    Postgres,
    Memory,
}

// Tudo que vem do ambiente, lido uma vez na subida
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub store_backend: StoreBackend,
    pub database_url: Option<String>,
    pub jwt_secret: String,
    pub bind_addr: String,
    pub contact: PlanContact,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let store_backend = match env::var("STORE_BACKEND").as_deref() {
            Ok("memory") => StoreBackend::Memory,
            Ok("postgres") | Err(_) => StoreBackend::Postgres,
            Ok(other) => anyhow::bail!("STORE_BACKEND desconhecido: {}", other),
        };

        let database_url = env::var("DATABASE_URL").ok();
        if store_backend == StoreBackend::Postgres && database_url.is_none() {
            anyhow::bail!("DATABASE_URL deve ser definida");
        }

        let contact = PlanContact {
            phone: env::var("CONTACT_PHONE").unwrap_or_default(),
            message: env::var("PLAN_CONTACT_MESSAGE").ok(),
        };
        if !contact.has_recipient() {
            tracing::warn!("⚠️ CONTACT_PHONE vazio: o link de ampliação do plano ficará sem destinatário");
        }

        Ok(Self {
            store_backend,
            database_url,
            jwt_secret: env::var("JWT_SECRET").context("JWT_SECRET deve ser definido")?,
            bind_addr: env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".to_string()),
            contact,
        })
    }
}

#[derive(Clone)]
pub struct AppState {
    pub auth_service: AuthService,
    pub member_service: MemberService,
    pub catalog_service: CatalogService,
}

impl AppState {
    pub async fn new(config: &AppConfig) -> anyhow::Result<Self> {
        let store: Arc<dyn DocumentStore> = match config.store_backend {
            StoreBackend::Postgres => {
                let database_url = config
                    .database_url
                    .as_deref()
                    .context("DATABASE_URL deve ser definida")?;

                // Conecta ao banco de dados, usando '?' para propagar erros
                let db_pool = PgPoolOptions::new()
                    .max_connections(5)
                    .acquire_timeout(Duration::from_secs(3))
                    .connect(database_url)
                    .await?;
                tracing::info!("✅ Conexão com o banco de dados estabelecida com sucesso!");

                sqlx::migrate!().run(&db_pool).await?;
                tracing::info!("✅ Migrações do banco de dados executadas com sucesso!");

                Arc::new(PgDocumentStore::new(db_pool))
            }
            StoreBackend::Memory => {
                tracing::warn!("⚠️ Usando armazenamento em memória: nada será persistido");
                Arc::new(MemoryDocumentStore::new())
            }
        };

        Ok(Self::with_store(store, config))
    }

    /// Monta o gráfico de dependências sobre um armazenamento já pronto.
    pub fn with_store(store: Arc<dyn DocumentStore>, config: &AppConfig) -> Self {
        let user_repo = UserRepository::new(store.clone());
        let tenant_repo = TenantRepository::new(store.clone());
        let catalog_repo = CatalogRepository::new(store.clone());

        let auth_service =
            AuthService::new(user_repo.clone(), tenant_repo.clone(), config.jwt_secret.clone());

        let member_service = MemberService::new(
            MemberRepository::new(store.clone()),
            catalog_repo.clone(),
            tenant_repo,
            OutboxRepository::new(store.clone()),
            Arc::new(StoreAccountProvisioner::new(user_repo.clone())),
            Arc::new(AccountPasswordConfirmation::new(user_repo.clone())),
            config.contact.clone(),
        );

        Self {
            auth_service,
            member_service,
            catalog_service: CatalogService::new(catalog_repo),
        }
    }
}
