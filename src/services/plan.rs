// src/services/plan.rs

// Teto de cadastros por plano. É um bloqueio de interface: nada no
// armazenamento impede a gravação, e a posição conta pela ordem da lista.

use crate::common::error::AppError;

/// Valor usado como "sem limite".
pub const UNLIMITED: usize = 999_999;

// Ordem importa: o primeiro termo encontrado no nome do plano vence
const PLAN_TIERS: [(&str, usize); 4] = [
    ("trial", 30),
    ("test", 30),
    ("iniciante", 30),
    ("expandido", 100),
];

pub fn plan_limit_for(plan_name: &str) -> usize {
    let lowered = plan_name.to_lowercase();
    PLAN_TIERS
        .iter()
        .find(|(term, _)| lowered.contains(term))
        .map(|(_, limit)| *limit)
        .unwrap_or(UNLIMITED)
}

/// `index` é a posição (0-based) do registro na lista carregada.
pub fn is_over_limit(index: usize, limit: usize) -> bool {
    index >= limit
}

/// Para onde mandar quem bate no teto.
#[derive(Debug, Clone)]
pub struct PlanContact {
    pub phone: String,
    pub message: Option<String>,
}

impl PlanContact {
    /// Há ao menos um dígito para onde mandar a mensagem.
    pub fn has_recipient(&self) -> bool {
        self.phone.chars().any(|c| c.is_ascii_digit())
    }

    pub fn link_for(&self, plan_name: &str) -> String {
        let message = self.message.clone().unwrap_or_else(|| {
            format!(
                "Olá! Gostaria de ampliar o limite de cadastros do meu plano ({}).",
                plan_name
            )
        });
        let phone: String = self.phone.chars().filter(|c| c.is_ascii_digit()).collect();
        format!("https://wa.me/{}?text={}", phone, urlencoding::encode(&message))
    }
}

/// O portão de limite, montado com o plano do tenant da requisição.
#[derive(Debug, Clone)]
pub struct PlanGate {
    plan_name: String,
    limit: usize,
    contact_url: String,
}

impl PlanGate {
    pub fn new(plan_name: &str, contact: &PlanContact) -> Self {
        Self {
            plan_name: plan_name.to_string(),
            limit: plan_limit_for(plan_name),
            contact_url: contact.link_for(plan_name),
        }
    }

    pub fn plan_name(&self) -> &str {
        &self.plan_name
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    pub fn is_unlimited(&self) -> bool {
        self.limit >= UNLIMITED
    }

    pub fn contact_url(&self) -> &str {
        &self.contact_url
    }

    pub fn is_locked(&self, index: usize) -> bool {
        is_over_limit(index, self.limit)
    }

    /// Um novo cadastro entraria na posição `current_count`.
    pub fn check_create(&self, current_count: usize) -> Result<(), AppError> {
        self.check_position(current_count)
    }

    pub fn check_edit(&self, index: usize) -> Result<(), AppError> {
        self.check_position(index)
    }

    fn check_position(&self, index: usize) -> Result<(), AppError> {
        if self.is_locked(index) {
            tracing::warn!(
                "Limite do plano '{}' atingido (posição {}, limite {})",
                self.plan_name,
                index,
                self.limit
            );
            return Err(AppError::PlanLimitReached {
                limit: self.limit,
                contact_url: self.contact_url.clone(),
            });
        }
        Ok(())
    }
}
