// src/services/opportunity_service.rs

use std::{
    collections::{HashMap, HashSet},
    sync::Arc,
};

use chrono::Utc;
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::{
    common::{
        error::{validation_error, AppError},
        response::DeletedRecord,
    },
    db::{CustomerRepository, OpportunityRepository, VehicleRepository},
    models::{
        auth::{Role, Session},
        opportunity::{
            CreateOpportunityPayload, Opportunity, OpportunityView, UpdateOpportunityPayload,
        },
    },
};

pub const DEFAULT_LIST_LIMIT: i64 = 50;
pub const MAX_LIST_LIMIT: i64 = 500;
pub const UNKNOWN_CUSTOMER: &str = "Unknown Customer";

/// Limite efetivo de listagem: padrão 50, entre 1 e 500.
pub fn effective_limit(limit: Option<i64>) -> i64 {
    limit.unwrap_or(DEFAULT_LIST_LIMIT).clamp(1, MAX_LIST_LIMIT)
}

#[derive(Clone)]
pub struct OpportunityService {
    repo: Arc<dyn OpportunityRepository>,
    customers: Arc<dyn CustomerRepository>,
    vehicles: Arc<dyn VehicleRepository>,
}

impl OpportunityService {
    pub fn new(
        repo: Arc<dyn OpportunityRepository>,
        customers: Arc<dyn CustomerRepository>,
        vehicles: Arc<dyn VehicleRepository>,
    ) -> Self {
        Self { repo, customers, vehicles }
    }

    // =========================================================================
    //  LEITURA
    // =========================================================================

    pub async fn list(&self, limit: Option<i64>, offset: Option<i64>) -> Result<Vec<OpportunityView>, AppError> {
        let offset = offset.unwrap_or(0).max(0);
        let opportunities = self.repo.list_active(Some(effective_limit(limit)), offset).await?;
        self.resolve_names(opportunities).await
    }

    /// Todas as oportunidades ativas (dashboard / lembretes).
    pub async fn list_all(&self) -> Result<Vec<OpportunityView>, AppError> {
        let opportunities = self.repo.list_active(None, 0).await?;
        self.resolve_names(opportunities).await
    }

    pub async fn get(&self, id: Uuid) -> Result<OpportunityView, AppError> {
        let opportunity = self
            .repo
            .find_active(id)
            .await?
            .ok_or(AppError::NotFound("Oportunidade"))?;

        let mut views = self.resolve_names(vec![opportunity]).await?;
        views.pop().ok_or(AppError::NotFound("Oportunidade"))
    }

    // Resolve customerName/vehicleName com uma busca em lote por coleção,
    // nunca uma busca por registro.
    async fn resolve_names(
        &self,
        opportunities: Vec<Opportunity>,
    ) -> Result<Vec<OpportunityView>, AppError> {
        let customer_ids: Vec<Uuid> = opportunities
            .iter()
            .map(|o| o.customer_id)
            .collect::<HashSet<_>>()
            .into_iter()
            .collect();
        let vehicle_ids: Vec<Uuid> = opportunities
            .iter()
            .filter_map(|o| o.vehicle_id)
            .collect::<HashSet<_>>()
            .into_iter()
            .collect();

        let customer_names: HashMap<Uuid, String> = self
            .customers
            .find_by_ids(&customer_ids)
            .await?
            .into_iter()
            .map(|c| (c.id, c.name))
            .collect();

        let vehicle_names: HashMap<Uuid, String> = self
            .vehicles
            .find_by_ids(&vehicle_ids)
            .await?
            .into_iter()
            .map(|v| (v.id, v.display_name()))
            .collect();

        Ok(opportunities
            .into_iter()
            .map(|opportunity| {
                let customer_name = customer_names
                    .get(&opportunity.customer_id)
                    .cloned()
                    .unwrap_or_else(|| UNKNOWN_CUSTOMER.to_string());
                let vehicle_name = opportunity
                    .vehicle_id
                    .and_then(|id| vehicle_names.get(&id).cloned());

                OpportunityView {
                    opportunity,
                    customer_name,
                    vehicle_name,
                }
            })
            .collect())
    }

    // =========================================================================
    //  ESCRITA (Editor ou superior)
    // =========================================================================

    pub async fn create(
        &self,
        session: &Session,
        payload: CreateOpportunityPayload,
    ) -> Result<OpportunityView, AppError> {
        session.authorize(Role::Editor)?;
        ensure_valid_expected_value(payload.expected_value)?;

        let mut opportunity = Opportunity::new(payload.customer_id, Utc::now());
        opportunity.vehicle_id = payload.vehicle_id;
        opportunity.stage = payload.stage.unwrap_or_default();
        opportunity.expected_value = payload.expected_value;
        opportunity.notes = payload.notes;
        opportunity.next_action_date = payload.next_action_date;

        self.repo.insert(&opportunity).await?;

        tracing::info!(
            "📌 Oportunidade {} criada por {} (etapa: {})",
            opportunity.id,
            session.uid,
            opportunity.stage
        );

        self.get(opportunity.id).await
    }

    pub async fn update(
        &self,
        session: &Session,
        id: Uuid,
        payload: UpdateOpportunityPayload,
    ) -> Result<OpportunityView, AppError> {
        session.authorize(Role::Editor)?;
        if let Some(expected_value) = payload.expected_value {
            ensure_valid_expected_value(expected_value)?;
        }

        let mut opportunity = self
            .repo
            .find_active(id)
            .await?
            .ok_or(AppError::NotFound("Oportunidade"))?;

        let previous_stage = opportunity.stage;
        opportunity.apply_patch(payload, Utc::now());

        // Última escrita vence; se foi excluída entre a leitura e a escrita, 404.
        if !self.repo.save(&opportunity).await? {
            return Err(AppError::NotFound("Oportunidade"));
        }

        if previous_stage != opportunity.stage {
            tracing::info!(
                "🔀 Oportunidade {}: {} → {} ({})",
                opportunity.id,
                previous_stage,
                opportunity.stage,
                session.uid
            );
        }

        self.get(id).await
    }

    pub async fn soft_delete(&self, session: &Session, id: Uuid) -> Result<DeletedRecord, AppError> {
        session.authorize(Role::Editor)?;

        // Já excluída conta como inexistente: a segunda chamada é 404.
        if !self.repo.soft_delete(id, &session.uid, Utc::now()).await? {
            return Err(AppError::NotFound("Oportunidade"));
        }

        tracing::info!("🗑️ Oportunidade {} excluída por {}", id, session.uid);

        Ok(DeletedRecord {
            id,
            message: "Oportunidade excluída com sucesso.".to_string(),
        })
    }
}

/// Teto da coluna `expected_value NUMERIC(14, 2)`.
pub fn max_expected_value() -> Decimal {
    Decimal::new(99_999_999_999_999, 2)
}

fn ensure_valid_expected_value(value: Option<Decimal>) -> Result<(), AppError> {
    match value {
        Some(v) if v < Decimal::ZERO => Err(validation_error(
            "expectedValue",
            "non_negative",
            "O valor esperado não pode ser negativo.",
        )),
        Some(v) if v > max_expected_value() => Err(validation_error(
            "expectedValue",
            "too_large",
            "O valor esperado excede o máximo permitido.",
        )),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        db::MemoryStore,
        models::{
            customer::Customer,
            opportunity::Stage,
            vehicle::{CreateVehiclePayload, Vehicle},
        },
    };

    struct Fixture {
        store: Arc<MemoryStore>,
        service: OpportunityService,
    }

    fn fixture() -> Fixture {
        let store = Arc::new(MemoryStore::new());
        let service = OpportunityService::new(store.clone(), store.clone(), store.clone());
        Fixture { store, service }
    }

    fn session(role: Role) -> Session {
        Session {
            uid: format!("uid-{}", role.as_str()),
            email: format!("{}@loja.com", role.as_str()),
            role,
        }
    }

    fn create_payload(customer_id: Uuid) -> CreateOpportunityPayload {
        CreateOpportunityPayload {
            customer_id,
            vehicle_id: None,
            stage: None,
            expected_value: None,
            notes: None,
            next_action_date: None,
        }
    }

    async fn seed_customer(store: &MemoryStore, name: &str) -> Uuid {
        let customer = Customer::new(name.into(), None, None, Utc::now());
        CustomerRepository::insert(store, &customer).await.unwrap();
        customer.id
    }

    async fn seed_vehicle(store: &MemoryStore) -> Uuid {
        let vehicle = Vehicle::from_payload(
            CreateVehiclePayload {
                make: "Peugeot".into(),
                model: "308".into(),
                year: 2021,
                price: None,
                mileage: None,
                fuel_type: None,
                transmission: None,
                body_type: None,
                color: None,
                description: None,
                images: None,
                status: None,
                featured: None,
            },
            Utc::now(),
        );
        VehicleRepository::insert(store, &vehicle).await.unwrap();
        vehicle.id
    }

    #[tokio::test]
    async fn create_defaults_stage_and_resolves_names() {
        let f = fixture();
        let customer_id = seed_customer(&f.store, "Maria").await;
        let vehicle_id = seed_vehicle(&f.store).await;

        let mut payload = create_payload(customer_id);
        payload.vehicle_id = Some(vehicle_id);

        let created = f.service.create(&session(Role::Editor), payload).await.unwrap();
        assert_eq!(created.opportunity.stage, Stage::New);
        assert!(!created.opportunity.deleted);
        assert_eq!(created.customer_name, "Maria");
        assert_eq!(created.vehicle_name.as_deref(), Some("Peugeot 308 (2021)"));
    }

    #[tokio::test]
    async fn missing_customer_falls_back_to_unknown() {
        let f = fixture();
        let mut payload = create_payload(Uuid::new_v4());
        payload.vehicle_id = Some(Uuid::new_v4());

        let created = f.service.create(&session(Role::Admin), payload).await.unwrap();
        assert_eq!(created.customer_name, UNKNOWN_CUSTOMER);
        assert_eq!(created.vehicle_name, None);
    }

    #[tokio::test]
    async fn viewer_cannot_write() {
        let f = fixture();
        let result = f
            .service
            .create(&session(Role::Viewer), create_payload(Uuid::new_v4()))
            .await;
        assert!(matches!(result, Err(AppError::Forbidden(_))));
    }

    #[tokio::test]
    async fn expected_value_outside_column_range_is_rejected() {
        let f = fixture();
        let mut payload = create_payload(Uuid::new_v4());
        payload.expected_value = Some(Decimal::new(-1, 0));

        let result = f.service.create(&session(Role::Editor), payload).await;
        assert!(matches!(result, Err(AppError::ValidationError(_))));

        let mut huge = create_payload(Uuid::new_v4());
        huge.expected_value = Some(Decimal::new(5, 0) * Decimal::new(10_i64.pow(18), 0));
        let result = f.service.create(&session(Role::Editor), huge).await;
        assert!(matches!(result, Err(AppError::ValidationError(_))));

        let mut at_limit = create_payload(Uuid::new_v4());
        at_limit.expected_value = Some(max_expected_value());
        assert!(f.service.create(&session(Role::Editor), at_limit).await.is_ok());

        let mut zero = create_payload(Uuid::new_v4());
        zero.expected_value = Some(Decimal::ZERO);
        assert!(f.service.create(&session(Role::Editor), zero).await.is_ok());
    }

    #[tokio::test]
    async fn stage_update_keeps_identity() {
        let f = fixture();
        let editor = session(Role::Editor);
        let customer_id = seed_customer(&f.store, "João").await;
        let created = f.service.create(&editor, create_payload(customer_id)).await.unwrap();

        let updated = f
            .service
            .update(
                &editor,
                created.opportunity.id,
                UpdateOpportunityPayload::stage_only(Stage::Negotiation),
            )
            .await
            .unwrap();

        assert_eq!(updated.opportunity.stage, Stage::Negotiation);
        assert_eq!(updated.opportunity.id, created.opportunity.id);
        assert_eq!(updated.opportunity.created_at, created.opportunity.created_at);
        assert_eq!(updated.opportunity.customer_id, customer_id);
    }

    #[tokio::test]
    async fn deleted_record_cannot_be_read_updated_or_deleted_again() {
        let f = fixture();
        let editor = session(Role::Editor);
        let created = f
            .service
            .create(&editor, create_payload(Uuid::new_v4()))
            .await
            .unwrap();
        let id = created.opportunity.id;

        let receipt = f.service.soft_delete(&editor, id).await.unwrap();
        assert_eq!(receipt.id, id);

        assert!(matches!(f.service.get(id).await, Err(AppError::NotFound(_))));
        assert!(matches!(
            f.service
                .update(&editor, id, UpdateOpportunityPayload::stage_only(Stage::Won))
                .await,
            Err(AppError::NotFound(_))
        ));
        assert!(matches!(
            f.service.soft_delete(&editor, id).await,
            Err(AppError::NotFound(_))
        ));
        assert!(f.service.list(None, None).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn list_batches_names_and_respects_limit() {
        let f = fixture();
        let editor = session(Role::Editor);
        let customer_id = seed_customer(&f.store, "Cliente Frequente").await;
        for _ in 0..3 {
            f.service.create(&editor, create_payload(customer_id)).await.unwrap();
        }

        let listed = f.service.list(Some(2), None).await.unwrap();
        assert_eq!(listed.len(), 2);
        assert!(listed.iter().all(|v| v.customer_name == "Cliente Frequente"));
        assert_eq!(f.service.list(None, None).await.unwrap().len(), 3);
        assert_eq!(f.service.list(Some(2), Some(2)).await.unwrap().len(), 1);
    }

    #[test]
    fn limit_is_clamped() {
        assert_eq!(effective_limit(None), 50);
        assert_eq!(effective_limit(Some(0)), 1);
        assert_eq!(effective_limit(Some(10_000)), MAX_LIST_LIMIT);
    }
}
