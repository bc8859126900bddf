// src/handlers/masks.rs

// Máscaras de digitação para o formulário: o front chama a cada tecla.

use axum::{
    extract::{Path, Query},
    Json,
};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::common::validators::{self, max_digits, MaskKind};

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct MaskQuery {
    #[serde(default)]
    pub value: String,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MaskResponse {
    #[schema(example = "111.444.777-35")]
    pub formatted: String,
    #[schema(example = "11144477735")]
    pub digits: String,
    /// CPF e telefone: passou no validador. RG e CEP: todos os dígitos digitados.
    pub valid: bool,
}

// GET /api/masks/{kind}?value=
#[utoipa::path(
    get,
    path = "/api/masks/{kind}",
    tag = "Masks",
    params(
        ("kind" = MaskKind, Path, description = "cpf | rg | phone | cep"),
        MaskQuery
    ),
    responses((status = 200, description = "Valor formatado", body = MaskResponse))
)]
pub async fn format_value(
    Path(kind): Path<MaskKind>,
    Query(query): Query<MaskQuery>,
) -> Json<MaskResponse> {
    let formatted = kind.format(&query.value);
    let digits = validators::only_digits(&formatted);

    let valid = match kind {
        MaskKind::Cpf => validators::validate_cpf(&digits),
        MaskKind::Phone => validators::validate_phone(&digits),
        MaskKind::Rg | MaskKind::Cep => digits.len() == max_digits(kind),
    };

    Json(MaskResponse { formatted, digits, valid })
}
