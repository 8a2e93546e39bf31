// src/models/dashboard.rs

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::opportunity::{OpportunityView, Stage};

// Lembretes derivados de `nextActionDate`. Nada disso é persistido.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Reminders {
    // nextActionDate <= hoje
    pub overdue: Vec<OpportunityView>,
    // hoje < nextActionDate <= hoje + 7 dias
    pub upcoming: Vec<OpportunityView>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StageCount {
    pub stage: Stage,
    pub count: usize,
}

// Os cards do topo + lembretes
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSummary {
    pub today: NaiveDate,
    pub stage_counts: Vec<StageCount>,
    pub total_open: usize,
    // Soma de expectedValue das etapas em aberto (nem ganha nem perdida)
    #[schema(value_type = f64)]
    pub open_pipeline_value: Decimal,
    pub reminders: Reminders,
}
