// src/common/validators.rs

// Funções puras de validação e máscara dos campos de cadastro.
// Nada aqui lança erro: validadores devolvem bool, formatadores devolvem
// a máscara parcial possível com os dígitos recebidos.

use std::sync::LazyLock;

use regex::Regex;

// Mesma checagem "tem @ e tem ponto" do formulário. Aceita endereços
// mal formados como "a@b.c"; é limitação conhecida, não corrigir aqui.
static EMAIL_SHAPE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("regex de e-mail inválida")
});

const CPF_MASK: &str = "###.###.###-##";
const RG_MASK: &str = "##.###.###-#";
const CEP_MASK: &str = "#####-###";
const PHONE_MASK_LANDLINE: &str = "(##) ####-####";
const PHONE_MASK_MOBILE: &str = "(##) #####-####";

/// Remove tudo que não for dígito ASCII.
pub fn only_digits(value: &str) -> String {
    value.chars().filter(|c| c.is_ascii_digit()).collect()
}

pub fn validate_email(value: &str) -> bool {
    EMAIL_SHAPE.is_match(value)
}

/// Valida um CPF pelos dois dígitos verificadores (módulo 11).
///
/// Aceita a entrada com ou sem máscara. Sequências de um único dígito
/// repetido ("111.111.111-11") passam no cálculo mas são rejeitadas.
pub fn validate_cpf(value: &str) -> bool {
    let digits: Vec<u32> = only_digits(value)
        .chars()
        .filter_map(|c| c.to_digit(10))
        .collect();

    if digits.len() != 11 {
        return false;
    }
    if digits.iter().all(|d| *d == digits[0]) {
        return false;
    }

    let check_digit = |len: usize| -> u32 {
        // Pesos decrescentes: 10..2 para o primeiro, 11..2 para o segundo
        let sum: u32 = digits[..len]
            .iter()
            .enumerate()
            .map(|(i, d)| d * (len as u32 + 1 - i as u32))
            .sum();
        let rest = (sum * 10) % 11;
        if rest == 10 { 0 } else { rest }
    };

    check_digit(9) == digits[9] && check_digit(10) == digits[10]
}

/// Telefone válido = 10 (fixo) ou 11 (celular) dígitos, com DDD.
pub fn validate_phone(value: &str) -> bool {
    let len = only_digits(value).len();
    (10..=11).contains(&len)
}

pub fn format_cpf(value: &str) -> String {
    apply_mask(&only_digits(value), CPF_MASK)
}

pub fn format_rg(value: &str) -> String {
    apply_mask(&only_digits(value), RG_MASK)
}

pub fn format_cep(value: &str) -> String {
    apply_mask(&only_digits(value), CEP_MASK)
}

/// Fixo "(11) 3456-7890" ou celular "(11) 98765-4321", escolhido pelo
/// número de dígitos já digitados.
pub fn format_phone(value: &str) -> String {
    let digits = only_digits(value);
    let mask = if digits.len() > 10 {
        PHONE_MASK_MOBILE
    } else {
        PHONE_MASK_LANDLINE
    };
    apply_mask(&digits, mask)
}

// Preenche os '#' da máscara com os dígitos na ordem. Separadores só
// entram quando ainda há dígito para vir depois deles, e o que passar
// da capacidade da máscara é descartado.
fn apply_mask(digits: &str, mask: &str) -> String {
    let mut remaining = digits.chars().peekable();
    let mut out = String::with_capacity(mask.len());

    for slot in mask.chars() {
        if remaining.peek().is_none() {
            break;
        }
        if slot == '#' {
            if let Some(d) = remaining.next() {
                out.push(d);
            }
        } else {
            out.push(slot);
        }
    }

    out
}

/// Quantidade máxima de dígitos que cada máscara comporta.
pub fn max_digits(mask_kind: MaskKind) -> usize {
    match mask_kind {
        MaskKind::Cpf => 11,
        MaskKind::Rg => 9,
        MaskKind::Phone => 11,
        MaskKind::Cep => 8,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum MaskKind {
    Cpf,
    Rg,
    Phone,
    Cep,
}

impl MaskKind {
    pub fn format(self, value: &str) -> String {
        match self {
            MaskKind::Cpf => format_cpf(value),
            MaskKind::Rg => format_rg(value),
            MaskKind::Phone => format_phone(value),
            MaskKind::Cep => format_cep(value),
        }
    }
}
