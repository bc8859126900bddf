// src/services/member_service.rs

use std::sync::Arc;

use serde::Serialize;
use utoipa::ToSchema;

use crate::{
    common::{
        error::{AppError, FieldErrors},
        validators::{
            max_digits, only_digits, validate_cpf, validate_email, validate_phone, MaskKind,
        },
    },
    db::{outbox_repo::OutboxRepository, CatalogRepository, MemberRepository, TenantRepository},
    models::{
        auth::OperatorSession,
        member::{DraftChange, Member, MemberDraft},
        tenancy::PlanStatus,
    },
    services::{
        auth::PasswordConfirmation,
        plan::{PlanContact, PlanGate},
        provisioning::{provision_linked_user, LinkedAccountProvisioner, ProvisioningStatus},
    },
};

/// Teto da foto já decodificada.
pub const MAX_PHOTO_BYTES: usize = 500 * 1024;

// --- RESPOSTAS ---

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MemberRow {
    #[serde(flatten)]
    pub member: Member,
    /// Além do limite do plano: não pode ser editado.
    pub locked: bool,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MemberListing {
    pub members: Vec<MemberRow>,
    pub total: usize,
    pub plan_limit: usize,
    pub contact_url: String,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateOutcome {
    pub member: Member,
    pub provisioning: ProvisioningStatus,
}

// --- VALIDAÇÃO ---

/// Regras do formulário, aplicadas ao rascunho como foi digitado.
/// Campos opcionais vazios não passam pelos validadores.
pub fn validate_draft(draft: &MemberDraft) -> Result<(), AppError> {
    let mut errors = FieldErrors::new();

    if draft.name.trim().is_empty() {
        errors.push("name", "required", "O nome é obrigatório.");
    }
    if draft.birth_date.is_none() {
        errors.push("birthDate", "required", "A data de nascimento é obrigatória.");
    }
    if let Some(email) = present(&draft.email) {
        if !validate_email(email.trim()) {
            errors.push("email", "invalid_email", "E-mail inválido.");
        }
    }
    if let Some(cpf) = present(&draft.cpf) {
        if !validate_cpf(cpf) {
            errors.push("cpf", "invalid_cpf", "CPF inválido.");
        }
    }
    if let Some(phone) = present(&draft.phone) {
        if !validate_phone(phone) {
            errors.push("phone", "invalid_phone", "O telefone deve ter 10 ou 11 dígitos.");
        }
    }
    let masked = [
        ("rg", &draft.rg, MaskKind::Rg),
        ("emergencyPhone", &draft.emergency_phone, MaskKind::Phone),
        ("cep", &draft.cep, MaskKind::Cep),
    ];
    for (field, value, kind) in masked {
        if present(value).is_some_and(|v| only_digits(v).len() > max_digits(kind)) {
            errors.push(field, "too_long", "Dígitos além do formato do campo.");
        }
    }
    if let Some(photo) = present(&draft.photo) {
        if decoded_photo_size(photo) > MAX_PHOTO_BYTES {
            errors.push("photo", "photo_too_large", "A foto deve ter no máximo 500KB.");
        }
    }

    errors.into_result()
}

fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.trim().is_empty())
}

// Tamanho em bytes de um data URL base64 ("data:image/png;base64,....")
fn decoded_photo_size(data_url: &str) -> usize {
    let encoded = data_url.split_once(',').map_or(data_url, |(_, data)| data);
    let padding = encoded.bytes().rev().take_while(|b| *b == b'=').count();
    (encoded.len() * 3 / 4).saturating_sub(padding)
}

// =========================================================================
//  SERVIÇO (compartilhado no AppState)
// =========================================================================

#[derive(Clone)]
pub struct MemberService {
    member_repo: MemberRepository,
    catalog_repo: CatalogRepository,
    tenant_repo: TenantRepository,
    outbox: OutboxRepository,
    provisioner: Arc<dyn LinkedAccountProvisioner>,
    confirmation: Arc<dyn PasswordConfirmation>,
    contact: PlanContact,
}

impl MemberService {
    pub fn new(
        member_repo: MemberRepository,
        catalog_repo: CatalogRepository,
        tenant_repo: TenantRepository,
        outbox: OutboxRepository,
        provisioner: Arc<dyn LinkedAccountProvisioner>,
        confirmation: Arc<dyn PasswordConfirmation>,
        contact: PlanContact,
    ) -> Self {
        Self {
            member_repo,
            catalog_repo,
            tenant_repo,
            outbox,
            provisioner,
            confirmation,
            contact,
        }
    }

    /// Monta o controlador da casa, já com o portão do plano dela.
    pub async fn registry_for(&self, tenant_id: &str) -> Result<MemberRegistry<'_>, AppError> {
        let tenant = self
            .tenant_repo
            .find_by_id(tenant_id)
            .await?
            .ok_or(AppError::NotFound("Casa"))?;

        let gate = PlanGate::new(&tenant.plan_name, &self.contact);
        Ok(MemberRegistry::new(self, tenant.id, gate))
    }
}

// =========================================================================
//  CONTROLADOR (uma casa, um plano)
// =========================================================================

pub struct MemberRegistry<'a> {
    service: &'a MemberService,
    tenant_id: String,
    gate: PlanGate,
}

impl<'a> MemberRegistry<'a> {
    pub fn new(service: &'a MemberService, tenant_id: String, gate: PlanGate) -> Self {
        Self { service, tenant_id, gate }
    }

    pub fn gate(&self) -> &PlanGate {
        &self.gate
    }

    /// Busca na lista completa da casa. A trava de cada linha usa a posição
    /// na lista inteira, não na filtrada.
    pub async fn list(&self, filter: &str) -> Result<MemberListing, AppError> {
        let all = self.service.member_repo.list(&self.tenant_id).await?;
        let total = all.len();

        let members = all
            .into_iter()
            .enumerate()
            .filter(|(_, m)| m.matches(filter))
            .map(|(index, member)| MemberRow { member, locked: self.gate.is_locked(index) })
            .collect();

        Ok(MemberListing {
            members,
            total,
            plan_limit: self.gate.limit(),
            contact_url: self.gate.contact_url().to_string(),
        })
    }

    pub async fn get(&self, id: &str) -> Result<Member, AppError> {
        self.service
            .member_repo
            .find(&self.tenant_id, id)
            .await?
            .ok_or(AppError::NotFound("Membro"))
    }

    pub async fn plan_status(&self) -> Result<PlanStatus, AppError> {
        let used = self.service.member_repo.list(&self.tenant_id).await?.len();
        Ok(PlanStatus {
            plan_name: self.gate.plan_name().to_string(),
            limit: self.gate.limit(),
            used,
            unlimited: self.gate.is_unlimited(),
            contact_url: self.gate.contact_url().to_string(),
        })
    }

    pub async fn create(&self, draft: MemberDraft) -> Result<CreateOutcome, AppError> {
        let count = self.service.member_repo.list(&self.tenant_id).await?.len();
        self.gate.check_create(count)?;

        // Valida o que foi digitado: a máscara descarta dígitos excedentes
        validate_draft(&draft)?;
        let catalog = self.service.catalog_repo.list(&self.tenant_id).await?;
        let draft = draft.normalized(&catalog);

        let member = draft.into_member(&self.tenant_id, None);
        self.service.member_repo.save(&member).await?;
        tracing::info!("👤 Membro {} cadastrado na casa {}", member.id, self.tenant_id);

        let provisioning = provision_linked_user(
            &self.service.outbox,
            self.service.provisioner.as_ref(),
            &member,
        )
        .await;

        Ok(CreateOutcome { member, provisioning })
    }

    /// Substitui o registro inteiro pelo rascunho.
    pub async fn update(&self, id: &str, draft: MemberDraft) -> Result<Member, AppError> {
        let all = self.service.member_repo.list(&self.tenant_id).await?;
        let index = all
            .iter()
            .position(|m| m.id == id)
            .ok_or(AppError::NotFound("Membro"))?;
        self.gate.check_edit(index)?;

        validate_draft(&draft)?;
        let catalog = self.service.catalog_repo.list(&self.tenant_id).await?;
        let draft = draft.normalized(&catalog);

        let member = draft.into_member(&self.tenant_id, Some(&all[index]));
        self.service.member_repo.save(&member).await?;
        tracing::info!("✏️ Membro {} atualizado", member.id);

        Ok(member)
    }

    pub async fn delete(
        &self,
        id: &str,
        confirm_password: &str,
        session: &OperatorSession,
    ) -> Result<(), AppError> {
        if !session.can_delete() {
            return Err(AppError::PermissionDenied);
        }
        if !self.service.confirmation.confirm(session, confirm_password).await? {
            return Err(AppError::WrongPassword);
        }

        let member = self.get(id).await?;
        self.service.member_repo.delete(&member.id).await?;
        tracing::info!("🗑️ Membro {} excluído por {}", member.id, session.user_id);

        Ok(())
    }

    /// Liga/desliga uma função da casa no rascunho e recalcula as flags.
    pub async fn toggle_house_role(
        &self,
        draft: MemberDraft,
        role_id: &str,
    ) -> Result<MemberDraft, AppError> {
        let catalog = self.service.catalog_repo.list(&self.tenant_id).await?;
        Ok(draft.apply(DraftChange::ToggleHouseRole(role_id.to_string()), &catalog))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use chrono::{Duration, NaiveDate, TimeZone, Utc};
    use serde_json::Value;

    use crate::db::document_store::{
        DocumentStore, Filter, MemoryDocumentStore, StoreError, StoreResult,
    };
    use crate::models::{
        auth::{CreateLinkedUser, PERM_MEMBERS_DELETE},
        catalog::{CatalogEntry, CatalogKind},
        tenancy::Tenant,
    };
    use crate::services::auth::PlaintextSessionConfirmation;

    // Armazenamento que conta gravações e pode ser configurado para falhar
    #[derive(Default)]
    struct RecordingStore {
        inner: MemoryDocumentStore,
        writes: AtomicUsize,
        fail_member_writes: bool,
    }

    #[async_trait]
    impl DocumentStore for RecordingStore {
        async fn get(&self, c: &str, id: &str) -> StoreResult<Option<Value>> {
            self.inner.get(c, id).await
        }
        async fn set(&self, c: &str, id: &str, doc: Value) -> StoreResult<()> {
            if c == "members" {
                self.writes.fetch_add(1, Ordering::SeqCst);
                if self.fail_member_writes {
                    return Err(StoreError::Unavailable("offline".into()));
                }
            }
            self.inner.set(c, id, doc).await
        }
        async fn delete(&self, c: &str, id: &str) -> StoreResult<()> {
            self.inner.delete(c, id).await
        }
        async fn query(&self, c: &str, f: &Filter, o: Option<&str>) -> StoreResult<Vec<Value>> {
            self.inner.query(c, f, o).await
        }
    }

    #[derive(Default)]
    struct CountingProvisioner {
        calls: AtomicUsize,
        fail: bool,
    }

    #[async_trait]
    impl LinkedAccountProvisioner for CountingProvisioner {
        async fn provision(&self, _: &str, _: &CreateLinkedUser) -> Result<String, AppError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                Err(AppError::EmailAlreadyExists)
            } else {
                Ok("user-1".into())
            }
        }
    }

    struct Fixture {
        store: Arc<RecordingStore>,
        provisioner: Arc<CountingProvisioner>,
        service: MemberService,
    }

    async fn fixture_with(plan: &str, store: RecordingStore, provisioner: CountingProvisioner) -> Fixture {
        let store = Arc::new(store);
        let provisioner = Arc::new(provisioner);
        let dyn_store: Arc<dyn DocumentStore> = store.clone();

        let tenant_repo = TenantRepository::new(dyn_store.clone());
        let now = Utc::now();
        tenant_repo
            .save(&Tenant {
                id: "t1".into(),
                name: "Casa de Teste".into(),
                plan_name: plan.into(),
                created_at: now,
                updated_at: now,
            })
            .await
            .unwrap();

        let service = MemberService::new(
            MemberRepository::new(dyn_store.clone()),
            CatalogRepository::new(dyn_store.clone()),
            tenant_repo,
            OutboxRepository::new(dyn_store),
            provisioner.clone(),
            Arc::new(PlaintextSessionConfirmation),
            PlanContact { phone: "5511999999999".into(), message: None },
        );

        Fixture { store, provisioner, service }
    }

    async fn fixture(plan: &str) -> Fixture {
        fixture_with(plan, RecordingStore::default(), CountingProvisioner::default()).await
    }

    fn maria() -> MemberDraft {
        MemberDraft {
            name: "Maria Silva".into(),
            birth_date: NaiveDate::from_ymd_opt(1990, 1, 1),
            ..Default::default()
        }
    }

    // Grava `n` membros com datas de criação crescentes
    async fn seed(f: &Fixture, n: usize) -> Vec<Member> {
        let repo = MemberRepository::new(f.store.clone());
        let base = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let mut out = Vec::new();
        for i in 0..n {
            let mut m = MemberDraft { name: format!("Membro {i:02}"), ..maria() }.into_member("t1", None);
            m.created_at = base + Duration::seconds(i as i64);
            repo.save(&m).await.unwrap();
            out.push(m);
        }
        out
    }

    fn session(perms: &[&str]) -> OperatorSession {
        OperatorSession {
            user_id: "op".into(),
            tenant_id: "t1".into(),
            permissions: perms.iter().map(|p| p.to_string()).collect(),
            stored_password: Some("senha123".into()),
        }
    }

    #[test]
    fn optional_fields_skip_their_validators() {
        assert!(validate_draft(&maria()).is_ok());

        let mut draft = maria();
        draft.email = Some(String::new());
        draft.cpf = Some("   ".into());
        assert!(validate_draft(&draft).is_ok());
    }

    #[test]
    fn each_bad_field_is_reported() {
        let draft = MemberDraft {
            email: Some("maria".into()),
            cpf: Some("111.111.111-11".into()),
            phone: Some("(11) 9876".into()),
            ..Default::default()
        };
        let Err(AppError::ValidationError(errors)) = validate_draft(&draft) else {
            panic!("esperava erro de validação");
        };
        let fields = errors.field_errors();
        for field in ["name", "birthDate", "email", "cpf", "phone"] {
            assert!(fields.contains_key(field), "faltou {field}");
        }
    }

    #[test]
    fn oversized_photo_is_rejected() {
        let mut draft = maria();
        draft.photo = Some(format!("data:image/png;base64,{}", "A".repeat(700 * 1024)));
        assert!(validate_draft(&draft).is_err());

        draft.photo = Some(format!("data:image/png;base64,{}", "A".repeat(400 * 1024)));
        assert!(validate_draft(&draft).is_ok());
    }

    #[test]
    fn digits_past_the_mask_are_rejected() {
        let draft = MemberDraft {
            phone: Some("119876543219999".into()),
            cpf: Some("1114447773500".into()),
            emergency_phone: Some("(11) 98765-43210".into()),
            rg: Some("12.345.678-90".into()),
            cep: Some("01310-1000".into()),
            ..maria()
        };
        let Err(AppError::ValidationError(errors)) = validate_draft(&draft) else {
            panic!("esperava erro de validação");
        };
        let fields = errors.field_errors();
        assert_eq!(fields["phone"][0].code, "invalid_phone");
        assert_eq!(fields["cpf"][0].code, "invalid_cpf");
        for field in ["emergencyPhone", "rg", "cep"] {
            assert_eq!(fields[field][0].code, "too_long", "{field}");
        }

        let twelve_digits = MemberDraft { phone: Some("119876543210".into()), ..maria() };
        assert!(validate_draft(&twelve_digits).is_err());
    }

    #[tokio::test]
    async fn create_keeps_the_typed_digits_or_refuses() {
        let f = fixture("Terreiro Pro").await;
        let registry = f.service.registry_for("t1").await.unwrap();

        let draft = MemberDraft { phone: Some("119876543219999".into()), ..maria() };
        let err = registry.create(draft).await.unwrap_err();
        assert!(matches!(err, AppError::ValidationError(_)));
        assert_eq!(f.store.writes.load(Ordering::SeqCst), 0);

        let draft = MemberDraft { phone: Some("11987654321".into()), ..maria() };
        let member = registry.create(draft).await.unwrap().member;
        assert_eq!(member.phone.as_deref(), Some("(11) 98765-4321"));
    }

    #[tokio::test]
    async fn create_without_optional_fields_succeeds() {
        let f = fixture("Terreiro Pro").await;
        let registry = f.service.registry_for("t1").await.unwrap();

        let outcome = registry.create(maria()).await.unwrap();
        assert_eq!(outcome.member.name, "Maria Silva");
        assert_eq!(outcome.provisioning, ProvisioningStatus::NotRequested);
        assert_eq!(f.provisioner.calls.load(Ordering::SeqCst), 0);

        let stored = registry.get(&outcome.member.id).await.unwrap();
        assert_eq!(stored, outcome.member);
    }

    #[tokio::test]
    async fn create_with_empty_name_never_reaches_the_store() {
        let f = fixture("Terreiro Pro").await;
        let registry = f.service.registry_for("t1").await.unwrap();

        let draft = MemberDraft { name: String::new(), ..maria() };
        let err = registry.create(draft).await.unwrap_err();
        assert!(matches!(err, AppError::ValidationError(_)));
        assert_eq!(f.store.writes.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn provisioning_failure_keeps_the_member() {
        let f = fixture_with(
            "Terreiro Pro",
            RecordingStore::default(),
            CountingProvisioner { fail: true, ..Default::default() },
        )
        .await;
        let registry = f.service.registry_for("t1").await.unwrap();

        let draft = MemberDraft { email: Some("maria@casa.org".into()), ..maria() };
        let outcome = registry.create(draft).await.unwrap();
        assert!(matches!(outcome.provisioning, ProvisioningStatus::Failed { .. }));
        assert_eq!(f.provisioner.calls.load(Ordering::SeqCst), 1);
        assert!(registry.get(&outcome.member.id).await.is_ok());
    }

    #[tokio::test]
    async fn store_failure_surfaces_as_persistence_error() {
        let f = fixture_with(
            "Terreiro Pro",
            RecordingStore { fail_member_writes: true, ..Default::default() },
            CountingProvisioner::default(),
        )
        .await;
        let registry = f.service.registry_for("t1").await.unwrap();

        let draft = MemberDraft { email: Some("maria@casa.org".into()), ..maria() };
        let err = registry.create(draft).await.unwrap_err();
        assert!(matches!(err, AppError::Persistence(_)));
        assert_eq!(f.provisioner.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn plan_gate_blocks_the_thirty_first_member() {
        let f = fixture("Plano Iniciante").await;
        let seeded = seed(&f, 30).await;
        let registry = f.service.registry_for("t1").await.unwrap();

        let err = registry.create(maria()).await.unwrap_err();
        assert!(matches!(err, AppError::PlanLimitReached { limit: 30, .. }));

        // Os 30 existentes continuam editáveis
        let last = &seeded[29];
        let edited = MemberDraft { name: "Editado".into(), ..maria() };
        assert_eq!(registry.update(&last.id, edited).await.unwrap().name, "Editado");
    }

    #[tokio::test]
    async fn records_beyond_the_limit_are_locked() {
        let f = fixture("Plano Iniciante").await;
        let seeded = seed(&f, 32).await;
        let registry = f.service.registry_for("t1").await.unwrap();

        let listing = registry.list("").await.unwrap();
        assert_eq!(listing.total, 32);
        assert_eq!(listing.plan_limit, 30);
        let locked: Vec<bool> = listing.members.iter().map(|r| r.locked).collect();
        assert!(!locked[29]);
        assert!(locked[30] && locked[31]);

        let err = registry.update(&seeded[30].id, maria()).await.unwrap_err();
        assert!(matches!(err, AppError::PlanLimitReached { .. }));

        // Filtrar não muda a posição usada para travar
        let filtered = registry.list("membro 31").await.unwrap();
        assert_eq!(filtered.members.len(), 1);
        assert!(filtered.members[0].locked);
    }

    #[tokio::test]
    async fn update_replaces_the_whole_draft() {
        let f = fixture("Terreiro Pro").await;
        let registry = f.service.registry_for("t1").await.unwrap();

        let draft = MemberDraft { city: Some("Salvador".into()), cpf: Some("11144477735".into()), ..maria() };
        let created = registry.create(draft).await.unwrap().member;
        assert_eq!(created.cpf.as_deref(), Some("111.444.777-35"));

        // Sem cidade no novo rascunho: a cidade some
        let updated = registry.update(&created.id, maria()).await.unwrap();
        assert_eq!(updated.id, created.id);
        assert_eq!(updated.city, None);
        assert_eq!(updated.cpf, None);
        assert_eq!(updated.created_at, created.created_at);

        let err = registry.update("nao-existe", maria()).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn derived_flags_come_from_the_catalog() {
        let f = fixture("Terreiro Pro").await;
        let catalog = CatalogRepository::new(f.store.clone());
        catalog
            .create(&CatalogEntry {
                id: "r-medium".into(),
                tenant_id: "t1".into(),
                name: "Médium de Caboclo".into(),
                kind: CatalogKind::HouseRole,
            })
            .await
            .unwrap();
        let registry = f.service.registry_for("t1").await.unwrap();

        let draft = registry.toggle_house_role(maria(), "r-medium").await.unwrap();
        assert!(draft.flags.is_medium);

        let mut forged = draft.clone();
        forged.flags.is_cambone = true;
        let member = registry.create(forged).await.unwrap().member;
        assert!(member.flags.is_medium);
        assert!(!member.flags.is_cambone);

        let draft = registry.toggle_house_role(draft, "r-medium").await.unwrap();
        assert!(!draft.flags.is_medium);
    }

    #[tokio::test]
    async fn delete_requires_capability_and_password() {
        let f = fixture("Terreiro Pro").await;
        let registry = f.service.registry_for("t1").await.unwrap();
        let id = registry.create(maria()).await.unwrap().member.id;

        let err = registry.delete(&id, "senha123", &session(&[])).await.unwrap_err();
        assert!(matches!(err, AppError::PermissionDenied));

        let err = registry
            .delete(&id, "errada", &session(&[PERM_MEMBERS_DELETE]))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::WrongPassword));
        assert!(registry.get(&id).await.is_ok());

        registry.delete(&id, "senha123", &session(&[PERM_MEMBERS_DELETE])).await.unwrap();
        assert!(matches!(registry.get(&id).await, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn unknown_tenant_has_no_registry() {
        let f = fixture("Terreiro Pro").await;
        assert!(matches!(f.service.registry_for("outra").await, Err(AppError::NotFound(_))));
    }
}
