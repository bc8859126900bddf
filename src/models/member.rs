// src/models/member.rs

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::common::{timestamp, validators};
use crate::models::catalog::{CatalogEntry, HouseRoleFlags};

// --- ENUMS ---

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum MemberStatus {
    #[default]
    Active,
    Consulente,
    Inactive,
    Dismissed,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ObligationLocation {
    #[default]
    House,
    External,
}

// Mantido pelo módulo financeiro; aqui é só leitura
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Paid,
    Justified,
    Unpaid,
}

// --- SUB-REGISTROS ---

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SpiritualMilestone {
    #[serde(default)]
    pub id: String,
    #[schema(value_type = Option<String>, format = Date, example = "2015-04-23")]
    pub date: Option<NaiveDate>,
    #[schema(example = "Batismo")]
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SpiritualObligation {
    #[serde(default)]
    pub id: String,
    #[schema(value_type = Option<String>, format = Date, example = "2019-11-02")]
    pub date: Option<NaiveDate>,
    #[serde(rename = "type")]
    #[schema(example = "Amaci")]
    pub obligation_type: String,
    #[serde(default)]
    pub location: ObligationLocation,
    #[serde(default)]
    pub responsible: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

// --- MEMBRO (o documento guardado) ---

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Member {
    #[schema(example = "c0a8012e-7f3a-4f5e-9a1c-2b3d4e5f6a7b")]
    pub id: String,

    #[schema(ignore)]
    pub tenant_id: String,

    // Dados pessoais
    #[schema(example = "Maria Silva")]
    pub name: String,
    #[schema(value_type = Option<String>, format = Date, example = "1990-01-01")]
    pub birth_date: Option<NaiveDate>,
    #[schema(example = "111.444.777-35")]
    pub cpf: Option<String>,
    pub rg: Option<String>,
    pub nationality: Option<String>,
    pub birthplace: Option<String>,
    pub marital_status: Option<String>,
    pub spouse_name: Option<String>,
    pub education_level: Option<String>,
    pub profession: Option<String>,
    #[serde(default)]
    pub is_employed: bool,

    // Contato
    pub email: Option<String>,
    #[schema(example = "(11) 98765-4321")]
    pub phone: Option<String>,
    pub emergency_phone: Option<String>,
    pub address: Option<String>,
    pub neighborhood: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub cep: Option<String>,

    pub status: MemberStatus,

    // Referências ao catálogo
    pub head_father_id: Option<String>,
    pub head_mother_id: Option<String>,
    pub guide_id: Option<String>,
    pub house_position_id: Option<String>,
    #[serde(default)]
    pub house_role_ids: Vec<String>,

    #[serde(flatten)]
    pub flags: HouseRoleFlags,

    #[serde(default)]
    pub spiritual_milestones: Vec<SpiritualMilestone>,
    #[serde(default)]
    pub spiritual_obligations: Vec<SpiritualObligation>,

    // Chave "{ano}-{mês}"
    #[serde(default)]
    pub monthly_payments: BTreeMap<String, PaymentStatus>,

    // data URL base64
    pub photo: Option<String>,

    #[serde(with = "timestamp")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "timestamp")]
    pub updated_at: DateTime<Utc>,
}

// --- RASCUNHO (o formulário) ---

/// O estado editável do formulário de membro. Cada envio substitui
/// todos esses campos no documento.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct MemberDraft {
    #[schema(example = "Maria Silva")]
    pub name: String,
    #[schema(value_type = Option<String>, format = Date, example = "1990-01-01")]
    pub birth_date: Option<NaiveDate>,
    pub cpf: Option<String>,
    pub rg: Option<String>,
    pub nationality: Option<String>,
    pub birthplace: Option<String>,
    pub marital_status: Option<String>,
    pub spouse_name: Option<String>,
    pub education_level: Option<String>,
    pub profession: Option<String>,
    pub is_employed: bool,

    pub email: Option<String>,
    pub phone: Option<String>,
    pub emergency_phone: Option<String>,
    pub address: Option<String>,
    pub neighborhood: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub cep: Option<String>,

    pub status: MemberStatus,

    pub head_father_id: Option<String>,
    pub head_mother_id: Option<String>,
    pub guide_id: Option<String>,
    pub house_position_id: Option<String>,
    pub house_role_ids: Vec<String>,

    // Calculado; o que o cliente mandar aqui é sobrescrito
    #[serde(flatten)]
    pub flags: HouseRoleFlags,

    pub spiritual_milestones: Vec<SpiritualMilestone>,
    pub spiritual_obligations: Vec<SpiritualObligation>,

    pub photo: Option<String>,
}

/// Uma alteração de campo no rascunho.
#[derive(Debug, Clone, PartialEq)]
pub enum DraftChange {
    Name(String),
    BirthDate(Option<NaiveDate>),
    Cpf(String),
    Rg(String),
    Nationality(String),
    Birthplace(String),
    MaritalStatus(String),
    SpouseName(String),
    EducationLevel(String),
    Profession(String),
    Employed(bool),
    Email(String),
    Phone(String),
    EmergencyPhone(String),
    Address(String),
    Neighborhood(String),
    City(String),
    State(String),
    Cep(String),
    Status(MemberStatus),
    HeadFather(Option<String>),
    HeadMother(Option<String>),
    Guide(Option<String>),
    HousePosition(Option<String>),
    ToggleHouseRole(String),
    AddMilestone(SpiritualMilestone),
    EditMilestone(SpiritualMilestone),
    RemoveMilestone(String),
    AddObligation(SpiritualObligation),
    EditObligation(SpiritualObligation),
    RemoveObligation(String),
    Photo(Option<String>),
}

// String vazia no formulário = campo ausente
fn non_empty(value: String) -> Option<String> {
    if value.trim().is_empty() { None } else { Some(value) }
}

pub fn new_id() -> String {
    Uuid::new_v4().to_string()
}

impl MemberDraft {
    pub fn new() -> Self {
        Self::default()
    }

    /// Aplica uma alteração e devolve o novo rascunho.
    ///
    /// Os campos com máscara (CPF, RG, telefones, CEP) são formatados aqui,
    /// a cada tecla. Alternar uma função da casa recalcula as três flags
    /// derivadas a partir do catálogo.
    pub fn apply(mut self, change: DraftChange, catalog: &[CatalogEntry]) -> Self {
        match change {
            DraftChange::Name(v) => self.name = v,
            DraftChange::BirthDate(v) => self.birth_date = v,
            DraftChange::Cpf(v) => self.cpf = non_empty(validators::format_cpf(&v)),
            DraftChange::Rg(v) => self.rg = non_empty(validators::format_rg(&v)),
            DraftChange::Nationality(v) => self.nationality = non_empty(v),
            DraftChange::Birthplace(v) => self.birthplace = non_empty(v),
            DraftChange::MaritalStatus(v) => self.marital_status = non_empty(v),
            DraftChange::SpouseName(v) => self.spouse_name = non_empty(v),
            DraftChange::EducationLevel(v) => self.education_level = non_empty(v),
            DraftChange::Profession(v) => self.profession = non_empty(v),
            DraftChange::Employed(v) => self.is_employed = v,
            DraftChange::Email(v) => self.email = non_empty(v),
            DraftChange::Phone(v) => self.phone = non_empty(validators::format_phone(&v)),
            DraftChange::EmergencyPhone(v) => {
                self.emergency_phone = non_empty(validators::format_phone(&v))
            }
            DraftChange::Address(v) => self.address = non_empty(v),
            DraftChange::Neighborhood(v) => self.neighborhood = non_empty(v),
            DraftChange::City(v) => self.city = non_empty(v),
            DraftChange::State(v) => self.state = non_empty(v),
            DraftChange::Cep(v) => self.cep = non_empty(validators::format_cep(&v)),
            DraftChange::Status(v) => self.status = v,
            DraftChange::HeadFather(v) => self.head_father_id = v,
            DraftChange::HeadMother(v) => self.head_mother_id = v,
            DraftChange::Guide(v) => self.guide_id = v,
            DraftChange::HousePosition(v) => self.house_position_id = v,
            DraftChange::ToggleHouseRole(role_id) => {
                if let Some(pos) = self.house_role_ids.iter().position(|r| *r == role_id) {
                    self.house_role_ids.remove(pos);
                } else {
                    self.house_role_ids.push(role_id);
                }
                self.flags = HouseRoleFlags::from_selection(&self.house_role_ids, catalog);
            }
            DraftChange::AddMilestone(mut m) => {
                m.id = new_id();
                self.spiritual_milestones.push(m);
            }
            DraftChange::EditMilestone(m) => {
                if let Some(slot) = self.spiritual_milestones.iter_mut().find(|x| x.id == m.id) {
                    *slot = m;
                }
            }
            DraftChange::RemoveMilestone(id) => self.spiritual_milestones.retain(|x| x.id != id),
            DraftChange::AddObligation(mut o) => {
                o.id = new_id();
                self.spiritual_obligations.push(o);
            }
            DraftChange::EditObligation(o) => {
                if let Some(slot) = self.spiritual_obligations.iter_mut().find(|x| x.id == o.id) {
                    *slot = o;
                }
            }
            DraftChange::RemoveObligation(id) => self.spiritual_obligations.retain(|x| x.id != id),
            DraftChange::Photo(v) => self.photo = v,
        }
        self
    }

    /// Prepara o rascunho para gravação: aplica as máscaras, descarta
    /// campos vazios, gera ids dos sub-registros novos e recalcula as flags.
    pub fn normalized(mut self, catalog: &[CatalogEntry]) -> Self {
        let mask = |v: Option<String>, f: fn(&str) -> String| v.and_then(|s| non_empty(f(&s)));

        self.name = self.name.trim().to_string();
        self.cpf = mask(self.cpf, validators::format_cpf);
        self.rg = mask(self.rg, validators::format_rg);
        self.phone = mask(self.phone, validators::format_phone);
        self.emergency_phone = mask(self.emergency_phone, validators::format_phone);
        self.cep = mask(self.cep, validators::format_cep);
        self.email = self.email.and_then(|e| non_empty(e.trim().to_string()));

        for m in self.spiritual_milestones.iter_mut().filter(|m| m.id.is_empty()) {
            m.id = new_id();
        }
        for o in self.spiritual_obligations.iter_mut().filter(|o| o.id.is_empty()) {
            o.id = new_id();
        }

        self.flags = HouseRoleFlags::from_selection(&self.house_role_ids, catalog);
        self
    }

    /// Monta o documento completo. `previous` preserva identidade, criação
    /// e a agenda de mensalidades de um registro já existente.
    pub fn into_member(self, tenant_id: &str, previous: Option<&Member>) -> Member {
        let now = Utc::now();
        let (id, created_at, monthly_payments) = match previous {
            Some(p) => (p.id.clone(), p.created_at, p.monthly_payments.clone()),
            None => (new_id(), now, BTreeMap::new()),
        };

        Member {
            id,
            tenant_id: tenant_id.to_string(),
            name: self.name,
            birth_date: self.birth_date,
            cpf: self.cpf,
            rg: self.rg,
            nationality: self.nationality,
            birthplace: self.birthplace,
            marital_status: self.marital_status,
            spouse_name: self.spouse_name,
            education_level: self.education_level,
            profession: self.profession,
            is_employed: self.is_employed,
            email: self.email,
            phone: self.phone,
            emergency_phone: self.emergency_phone,
            address: self.address,
            neighborhood: self.neighborhood,
            city: self.city,
            state: self.state,
            cep: self.cep,
            status: self.status,
            head_father_id: self.head_father_id,
            head_mother_id: self.head_mother_id,
            guide_id: self.guide_id,
            house_position_id: self.house_position_id,
            house_role_ids: self.house_role_ids,
            flags: self.flags,
            spiritual_milestones: self.spiritual_milestones,
            spiritual_obligations: self.spiritual_obligations,
            monthly_payments,
            photo: self.photo,
            created_at,
            updated_at: now,
        }
    }
}

impl Member {
    /// Busca da tabela: nome, CPF, e-mail ou id, sem diferenciar maiúsculas.
    pub fn matches(&self, needle: &str) -> bool {
        let needle = needle.trim().to_lowercase();
        if needle.is_empty() {
            return true;
        }

        [
            Some(self.name.as_str()),
            self.cpf.as_deref(),
            self.email.as_deref(),
            Some(self.id.as_str()),
        ]
        .into_iter()
        .flatten()
        .any(|field| field.to_lowercase().contains(&needle))
    }
}
