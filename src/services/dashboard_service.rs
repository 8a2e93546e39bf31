// src/services/dashboard_service.rs

use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::{
    common::error::AppError,
    models::{
        dashboard::{DashboardSummary, StageCount},
        opportunity::{OpportunityView, Stage},
    },
    services::{opportunity_service::OpportunityService, reminders::derive_reminders},
};

#[derive(Clone)]
pub struct DashboardService {
    opportunities: OpportunityService,
}

impl DashboardService {
    pub fn new(opportunities: OpportunityService) -> Self {
        Self { opportunities }
    }

    pub async fn get_summary(&self, today: NaiveDate) -> Result<DashboardSummary, AppError> {
        let items = self.opportunities.list_all().await?;
        Ok(summarize(&items, today))
    }
}

pub fn summarize(items: &[OpportunityView], today: NaiveDate) -> DashboardSummary {
    let mut counts = [0usize; 5];
    let mut open_pipeline_value = Decimal::ZERO;

    for item in items {
        let stage = item.opportunity.stage;
        counts[stage.index()] += 1;
        if !stage.is_closed() {
            let value = item.opportunity.expected_value.unwrap_or(Decimal::ZERO);
            // Satura em vez de estourar (dados antigos sem o teto de validação)
            open_pipeline_value = open_pipeline_value.checked_add(value).unwrap_or_else(|| {
                tracing::warn!("Valor do pipeline saturou em Decimal::MAX");
                Decimal::MAX
            });
        }
    }

    let stage_counts: Vec<StageCount> = Stage::ALL
        .into_iter()
        .map(|stage| StageCount {
            stage,
            count: counts[stage.index()],
        })
        .collect();
    let total_open = stage_counts
        .iter()
        .filter(|c| !c.stage.is_closed())
        .map(|c| c.count)
        .sum();

    DashboardSummary {
        today,
        stage_counts,
        total_open,
        open_pipeline_value,
        reminders: derive_reminders(items, today),
    }
}
