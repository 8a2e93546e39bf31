// src/services/lead_service.rs

use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{CustomerRepository, OpportunityRepository},
    models::{
        customer::{normalize_email, Customer},
        lead::{LeadKind, LeadPayload},
        opportunity::{LeadSource, Opportunity, Stage},
    },
};

const LEAD_ACTOR: &str = "lead-capture";
const CARVERTICAL_FALLBACK_NAME: &str = "CarVertical Lead";

// Resultado interno da captura: útil para logs e testes.
#[derive(Debug, Clone)]
pub struct CapturedLead {
    pub customer_id: Uuid,
    pub opportunity_id: Uuid,
    pub customer_created: bool,
}

#[derive(Clone)]
pub struct LeadService {
    customers: Arc<dyn CustomerRepository>,
    opportunities: Arc<dyn OpportunityRepository>,
}

impl LeadService {
    pub fn new(
        customers: Arc<dyn CustomerRepository>,
        opportunities: Arc<dyn OpportunityRepository>,
    ) -> Self {
        Self { customers, opportunities }
    }

    /// Casa (ou cria) o cliente e abre uma oportunidade em "new".
    ///
    /// São duas escritas independentes. Se a oportunidade falhar e o cliente
    /// tiver sido criado nesta mesma requisição, o cliente é excluído (soft
    /// delete) para não ficar órfão.
    pub async fn capture(&self, payload: LeadPayload) -> Result<CapturedLead, AppError> {
        let now = Utc::now();
        let email = payload
            .email
            .as_deref()
            .map(normalize_email)
            .filter(|e| !e.is_empty());

        // 1. Cliente: casa por e-mail, senão cria
        let existing = match &email {
            Some(email) => self.customers.find_active_by_email(email).await?,
            None => None,
        };

        let (customer_id, customer_created) = match existing {
            Some(customer) => (customer.id, false),
            None => {
                let name = payload
                    .name
                    .as_deref()
                    .map(str::trim)
                    .filter(|n| !n.is_empty())
                    .map(str::to_string)
                    .unwrap_or_else(|| CARVERTICAL_FALLBACK_NAME.to_string());
                let phone = payload
                    .phone
                    .as_deref()
                    .map(str::trim)
                    .filter(|p| !p.is_empty())
                    .map(str::to_string);

                let customer = Customer::new(name, email.as_deref(), phone, now);
                self.customers.insert(&customer).await?;
                (customer.id, true)
            }
        };

        // 2. Oportunidade
        let mut opportunity = Opportunity::new(customer_id, now);
        opportunity.stage = Stage::New;
        opportunity.vehicle_id = payload.vehicle_id;
        opportunity.notes = lead_notes(&payload);
        opportunity.source = Some(LeadSource {
            page: payload.source_page(),
            vehicle_id: payload.vehicle_id,
            submitted_at: now,
        });

        if let Err(err) = self.opportunities.insert(&opportunity).await {
            if customer_created {
                self.compensate(customer_id).await;
            }
            return Err(err);
        }

        tracing::info!(
            "📨 Lead capturado: cliente {} ({}), oportunidade {}",
            customer_id,
            if customer_created { "novo" } else { "existente" },
            opportunity.id
        );

        Ok(CapturedLead {
            customer_id,
            opportunity_id: opportunity.id,
            customer_created,
        })
    }

    async fn compensate(&self, customer_id: Uuid) {
        match self.customers.soft_delete(customer_id, LEAD_ACTOR, Utc::now()).await {
            Ok(_) => tracing::warn!(
                "↩️ Oportunidade do lead falhou; cliente {} criado nesta requisição foi excluído",
                customer_id
            ),
            Err(e) => tracing::error!(
                "🔥 Falha ao compensar o cliente órfão {}: {:?}",
                customer_id,
                e
            ),
        }
    }
}

fn lead_notes(payload: &LeadPayload) -> Option<String> {
    let message = payload
        .message
        .as_deref()
        .map(str::trim)
        .filter(|m| !m.is_empty());

    match (payload.kind, message) {
        (LeadKind::Carvertical, Some(message)) => Some(format!("[CarVertical] {}", message)),
        (LeadKind::Carvertical, None) => Some("[CarVertical] Pedido de relatório".to_string()),
        (LeadKind::General, message) => message.map(str::to_string),
    }
}
