// src/models/lead.rs

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::{Validate, ValidationError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum LeadKind {
    // Pedido de relatório de histórico do veículo
    Carvertical,
    #[default]
    #[serde(other)]
    General,
}

// Submissão pública (sem autenticação) do formulário de contato/veículo.
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
#[validate(schema(function = "validate_contact", skip_on_field_errors = false))]
pub struct LeadPayload {
    #[validate(length(max = 200, message = "Nome muito longo."))]
    #[schema(example = "João Pereira")]
    pub name: Option<String>,

    #[validate(length(max = 40, message = "Telefone inválido."))]
    #[schema(example = "+351912345678")]
    pub phone: Option<String>,

    #[validate(email(message = "O e-mail fornecido é inválido."))]
    #[schema(example = "joao@email.com")]
    pub email: Option<String>,

    #[validate(length(max = 5000, message = "Mensagem muito longa."))]
    pub message: Option<String>,

    pub vehicle_id: Option<Uuid>,

    #[serde(default, rename = "type")]
    pub kind: LeadKind,

    // Página de origem. Padrão derivado do tipo/veículo.
    #[validate(length(max = 100))]
    pub page: Option<String>,
}

fn present(value: &Option<String>) -> bool {
    value.as_deref().is_some_and(|v| !v.trim().is_empty())
}

// Regras de contato:
// - carvertical: e-mail obrigatório;
// - demais: nome obrigatório e pelo menos e-mail ou telefone.
fn validate_contact(lead: &LeadPayload) -> Result<(), ValidationError> {
    match lead.kind {
        LeadKind::Carvertical => {
            if !present(&lead.email) {
                let mut err = ValidationError::new("email_required");
                err.message = Some("Informe o e-mail para receber o relatório.".into());
                return Err(err);
            }
        }
        LeadKind::General => {
            if !present(&lead.name) {
                let mut err = ValidationError::new("name_required");
                err.message = Some("Informe o seu nome.".into());
                return Err(err);
            }
            if !present(&lead.email) && !present(&lead.phone) {
                let mut err = ValidationError::new("contact_required");
                err.message = Some("Informe um e-mail ou telefone.".into());
                return Err(err);
            }
        }
    }
    Ok(())
}

impl LeadPayload {
    pub fn source_page(&self) -> String {
        if let Some(page) = self.page.as_deref().filter(|p| !p.trim().is_empty()) {
            return page.trim().to_string();
        }
        match (self.kind, self.vehicle_id) {
            (LeadKind::Carvertical, _) => "carvertical".to_string(),
            (LeadKind::General, Some(_)) => "vehicle".to_string(),
            (LeadKind::General, None) => "contact".to_string(),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct LeadReceipt {
    pub success: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lead(json: &str) -> LeadPayload {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn general_lead_requires_name_and_a_contact() {
        assert!(lead(r#"{"name": "Ana", "email": "ana@email.com"}"#).validate().is_ok());
        assert!(lead(r#"{"name": "Ana", "phone": "912345678"}"#).validate().is_ok());
        assert!(lead(r#"{"name": "Ana"}"#).validate().is_err());
        assert!(lead(r#"{"email": "ana@email.com"}"#).validate().is_err());
        assert!(lead(r#"{"name": "  ", "phone": "912345678"}"#).validate().is_err());
    }

    #[test]
    fn carvertical_lead_requires_email_only() {
        assert!(lead(r#"{"type": "carvertical", "email": "ana@email.com"}"#).validate().is_ok());
        assert!(lead(r#"{"type": "carvertical", "name": "Ana", "phone": "91234"}"#)
            .validate()
            .is_err());
    }

    #[test]
    fn malformed_email_is_rejected() {
        assert!(lead(r#"{"name": "Ana", "email": "nao-e-email"}"#).validate().is_err());
    }

    #[test]
    fn unknown_type_falls_back_to_general() {
        let payload = lead(r#"{"type": "test-drive", "name": "Ana", "phone": "1"}"#);
        assert_eq!(payload.kind, LeadKind::General);
    }

    #[test]
    fn source_page_defaults() {
        assert_eq!(lead(r#"{}"#).source_page(), "contact");
        assert_eq!(
            lead(&format!(r#"{{"vehicleId": "{}"}}"#, Uuid::new_v4())).source_page(),
            "vehicle"
        );
        assert_eq!(lead(r#"{"type": "carvertical"}"#).source_page(), "carvertical");
        assert_eq!(lead(r#"{"page": "/stock/golf"}"#).source_page(), "/stock/golf");
    }
}
