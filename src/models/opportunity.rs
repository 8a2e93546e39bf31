// src/models/opportunity.rs

use std::fmt;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::common::response::double_option;

// --- ENUMS ---

// Etapas fixas do funil. Não existem etapas customizadas.
// A ordem de declaração é a ordem das colunas do quadro.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, sqlx::Type, ToSchema,
)]
#[sqlx(type_name = "opportunity_stage", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    #[default]
    New,
    Contacted,
    Negotiation,
    Won,
    Lost,
}

impl Stage {
    pub const ALL: [Stage; 5] = [
        Stage::New,
        Stage::Contacted,
        Stage::Negotiation,
        Stage::Won,
        Stage::Lost,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Stage::New => "new",
            Stage::Contacted => "contacted",
            Stage::Negotiation => "negotiation",
            Stage::Won => "won",
            Stage::Lost => "lost",
        }
    }

    /// Reconhece um identificador de etapa (ex: alvo de um drop no quadro).
    pub fn parse(value: &str) -> Option<Stage> {
        Stage::ALL.into_iter().find(|stage| stage.as_str() == value)
    }

    /// Ganha ou perdida: a negociação terminou.
    pub fn is_closed(self) -> bool {
        matches!(self, Stage::Won | Stage::Lost)
    }

    pub fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// --- PROVENIÊNCIA ---

// Gravado apenas em oportunidades criadas pela captura pública de leads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LeadSource {
    #[schema(example = "vehicle")]
    pub page: String,
    pub vehicle_id: Option<Uuid>,
    pub submitted_at: DateTime<Utc>,
}

// --- OPORTUNIDADE (O Dado) ---

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Opportunity {
    pub id: Uuid,
    pub customer_id: Uuid,
    pub vehicle_id: Option<Uuid>,
    pub stage: Stage,

    #[schema(value_type = Option<f64>, example = 45000.0)]
    pub expected_value: Option<Decimal>,
    pub notes: Option<String>,

    // Texto livre de data (YYYY-MM-DD). Sem normalização de fuso.
    #[schema(example = "2026-10-20")]
    pub next_action_date: Option<String>,

    pub source: Option<LeadSource>,

    pub deleted: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deleted_by: Option<String>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Opportunity {
    pub fn new(customer_id: Uuid, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            customer_id,
            vehicle_id: None,
            stage: Stage::New,
            expected_value: None,
            notes: None,
            next_action_date: None,
            source: None,
            deleted: false,
            deleted_by: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Aplica uma atualização parcial. `id`, `deleted` e `createdAt` não fazem
    /// parte do patch, então nunca mudam por este caminho.
    pub fn apply_patch(&mut self, patch: UpdateOpportunityPayload, now: DateTime<Utc>) {
        if let Some(customer_id) = patch.customer_id {
            self.customer_id = customer_id;
        }
        if let Some(vehicle_id) = patch.vehicle_id {
            self.vehicle_id = vehicle_id;
        }
        if let Some(stage) = patch.stage {
            self.stage = stage;
        }
        if let Some(expected_value) = patch.expected_value {
            self.expected_value = expected_value;
        }
        if let Some(notes) = patch.notes {
            self.notes = notes;
        }
        if let Some(next_action_date) = patch.next_action_date {
            self.next_action_date = next_action_date;
        }
        self.updated_at = now;
    }
}

// Visão de leitura: oportunidade + nomes resolvidos em tempo de leitura.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OpportunityView {
    #[serde(flatten)]
    pub opportunity: Opportunity,

    #[schema(example = "Maria da Silva")]
    pub customer_name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schema(example = "Volkswagen Golf (2019)")]
    pub vehicle_name: Option<String>,
}

// --- PAYLOADS ---

// `deleted` não existe aqui: se o cliente mandar, o serde ignora.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateOpportunityPayload {
    pub customer_id: Uuid,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vehicle_id: Option<Uuid>,

    // Padrão: "new"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stage: Option<Stage>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<f64>, example = 45000.0)]
    pub expected_value: Option<Decimal>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(length(max = 5000, message = "As notas devem ter no máximo 5000 caracteres."))]
    pub notes: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(length(max = 40, message = "Data inválida."))]
    #[schema(example = "2026-10-20")]
    pub next_action_date: Option<String>,
}

// Atualização parcial. Campos opcionais aceitam `null` para limpar o valor.
// `id` e `deleted` são ignorados.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateOpportunityPayload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customer_id: Option<Uuid>,

    #[serde(default, deserialize_with = "double_option", skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<Uuid>)]
    pub vehicle_id: Option<Option<Uuid>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stage: Option<Stage>,

    #[serde(default, deserialize_with = "double_option", skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<f64>)]
    pub expected_value: Option<Option<Decimal>>,

    #[serde(default, deserialize_with = "double_option", skip_serializing_if = "Option::is_none")]
    #[validate(length(max = 5000, message = "As notas devem ter no máximo 5000 caracteres."))]
    #[schema(value_type = Option<String>)]
    pub notes: Option<Option<String>>,

    #[serde(default, deserialize_with = "double_option", skip_serializing_if = "Option::is_none")]
    #[validate(length(max = 40, message = "Data inválida."))]
    #[schema(value_type = Option<String>)]
    pub next_action_date: Option<Option<String>>,
}

impl UpdateOpportunityPayload {
    /// O patch enviado pelo quadro ao soltar um card numa coluna.
    pub fn stage_only(stage: Stage) -> Self {
        Self {
            stage: Some(stage),
            ..Default::default()
        }
    }
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListParams {
    /// Máximo de registros (padrão 50)
    pub limit: Option<i64>,
}

/// Listagem paginada das oportunidades.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PageParams {
    /// Máximo de registros (padrão 50, máximo 500)
    pub limit: Option<i64>,
    /// Registros a pular (padrão 0)
    pub offset: Option<i64>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn stage_parse_accepts_only_the_fixed_set() {
        for stage in Stage::ALL {
            assert_eq!(Stage::parse(stage.as_str()), Some(stage));
        }
        assert_eq!(Stage::parse("qualified"), None);
        assert_eq!(Stage::parse("NEW"), None);
        assert_eq!(Stage::parse(""), None);
    }

    #[test]
    fn unknown_stage_is_rejected_by_serde() {
        let result: Result<UpdateOpportunityPayload, _> =
            serde_json::from_str(r#"{"stage": "archived"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn patch_validates_like_create() {
        let patch: UpdateOpportunityPayload = serde_json::from_str(&format!(
            r#"{{"nextActionDate": "{}"}}"#,
            "9".repeat(41)
        ))
        .unwrap();
        let errors = patch.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("next_action_date"));

        let cleared: UpdateOpportunityPayload =
            serde_json::from_str(r#"{"nextActionDate": null}"#).unwrap();
        assert!(cleared.validate().is_ok());
    }

    #[test]
    fn stage_patch_keeps_identity_fields() {
        let created = Utc::now();
        let mut opp = Opportunity::new(Uuid::new_v4(), created);
        let before = opp.clone();

        let later = created + Duration::minutes(5);
        opp.apply_patch(UpdateOpportunityPayload::stage_only(Stage::Negotiation), later);

        assert_eq!(opp.stage, Stage::Negotiation);
        assert_eq!(opp.id, before.id);
        assert_eq!(opp.created_at, before.created_at);
        assert_eq!(opp.customer_id, before.customer_id);
        assert_eq!(opp.updated_at, later);
    }

    #[test]
    fn patch_ignores_id_and_deleted() {
        let mut opp = Opportunity::new(Uuid::new_v4(), Utc::now());
        let original_id = opp.id;

        let patch: UpdateOpportunityPayload = serde_json::from_str(&format!(
            r#"{{"id": "{}", "deleted": true, "notes": "retornar ligação"}}"#,
            Uuid::new_v4()
        ))
        .unwrap();
        opp.apply_patch(patch, Utc::now());

        assert_eq!(opp.id, original_id);
        assert!(!opp.deleted);
        assert_eq!(opp.notes.as_deref(), Some("retornar ligação"));
    }

    #[test]
    fn null_clears_optional_fields() {
        let mut opp = Opportunity::new(Uuid::new_v4(), Utc::now());
        opp.vehicle_id = Some(Uuid::new_v4());
        opp.next_action_date = Some("2026-10-20".into());

        let patch: UpdateOpportunityPayload =
            serde_json::from_str(r#"{"vehicleId": null}"#).unwrap();
        opp.apply_patch(patch, Utc::now());

        assert_eq!(opp.vehicle_id, None);
        assert_eq!(opp.next_action_date.as_deref(), Some("2026-10-20"));
    }

    #[test]
    fn view_flattens_opportunity_fields() {
        let opp = Opportunity::new(Uuid::new_v4(), Utc::now());
        let view = OpportunityView {
            opportunity: opp.clone(),
            customer_name: "Maria".into(),
            vehicle_name: None,
        };

        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(json["id"], opp.id.to_string());
        assert_eq!(json["stage"], "new");
        assert_eq!(json["customerName"], "Maria");
        assert!(json.get("vehicleName").is_none());

        let back: OpportunityView = serde_json::from_value(json).unwrap();
        assert_eq!(back, view);
    }
}
