// src/models/tenancy.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

// ---
// Tenant (a "Casa")
// ---
// Cada terreiro é um tenant; o plano contratado define o teto de cadastros.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Tenant {
    pub id: String,

    #[schema(example = "Terreiro Caboclo Pena Branca")]
    pub name: String,

    #[schema(example = "Plano Iniciante")]
    pub plan_name: String,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// Situação do plano para a tela de membros
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PlanStatus {
    #[schema(example = "Plano Iniciante")]
    pub plan_name: String,
    #[schema(example = 30)]
    pub limit: usize,
    #[schema(example = 12)]
    pub used: usize,
    pub unlimited: bool,
    pub contact_url: String,
}
