// src/models/catalog.rs

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

// O catálogo externo: entidades (pai/mãe de cabeça, guia) e funções da casa
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub enum CatalogKind {
    Entity,
    HouseRole,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CatalogEntry {
    #[schema(example = "2f0c0d7e-4c1b-4a51-9d0e-4b8d0f6d1a11")]
    pub id: String,

    #[schema(ignore)]
    pub tenant_id: String,

    #[schema(example = "Médium de Caboclo")]
    pub name: String,

    pub kind: CatalogKind,
}

/// Capacidades espirituais derivadas das funções da casa selecionadas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    Medium,
    Cambone,
    Consulente,
}

// Termos procurados (sem diferenciar maiúsculas) no nome da função.
// "médium" com acento: "Medium" sem acento não casa, igual ao formulário.
const CAPABILITY_TERMS: [(Capability, &str); 3] = [
    (Capability::Medium, "médium"),
    (Capability::Cambone, "cambone"),
    (Capability::Consulente, "consulente"),
];

impl Capability {
    /// Capacidades que o nome de uma função concede.
    pub fn granted_by(role_name: &str) -> impl Iterator<Item = Capability> + '_ {
        let lowered = role_name.to_lowercase();
        CAPABILITY_TERMS
            .iter()
            .filter(move |(_, term)| lowered.contains(term))
            .map(|(cap, _)| *cap)
    }
}

/// Os três booleanos derivados do membro. Nunca são definidos à mão:
/// sempre saem de `from_selection`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct HouseRoleFlags {
    pub is_medium: bool,
    pub is_cambone: bool,
    pub is_consulente: bool,
}

impl HouseRoleFlags {
    /// Resolve os ids selecionados no catálogo e marca as capacidades.
    /// Ids que não existem no catálogo são ignorados.
    pub fn from_selection(selected_ids: &[String], catalog: &[CatalogEntry]) -> Self {
        let mut flags = Self::default();

        for entry in catalog.iter().filter(|e| selected_ids.contains(&e.id)) {
            for cap in Capability::granted_by(&entry.name) {
                match cap {
                    Capability::Medium => flags.is_medium = true,
                    Capability::Cambone => flags.is_cambone = true,
                    Capability::Consulente => flags.is_consulente = true,
                }
            }
        }

        flags
    }
}
