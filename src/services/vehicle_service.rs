// src/services/vehicle_service.rs

use std::sync::Arc;

use chrono::Utc;
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::{
    common::{
        error::{validation_error, AppError},
        response::DeletedRecord,
    },
    db::VehicleRepository,
    models::{
        auth::{Role, Session},
        vehicle::{CreateVehiclePayload, UpdateVehiclePayload, Vehicle, VehicleFilter},
    },
    services::opportunity_service::effective_limit,
};

#[derive(Clone)]
pub struct VehicleService {
    repo: Arc<dyn VehicleRepository>,
}

impl VehicleService {
    pub fn new(repo: Arc<dyn VehicleRepository>) -> Self {
        Self { repo }
    }

    /// Busca da vitrine pública e listagem do admin (mesmo filtro).
    pub async fn search(&self, filter: &VehicleFilter) -> Result<Vec<Vehicle>, AppError> {
        self.repo.search(filter, effective_limit(filter.limit)).await
    }

    pub async fn get(&self, id: Uuid) -> Result<Vehicle, AppError> {
        self.repo
            .find_active(id)
            .await?
            .ok_or(AppError::NotFound("Veículo"))
    }

    pub async fn create(
        &self,
        session: &Session,
        payload: CreateVehiclePayload,
    ) -> Result<Vehicle, AppError> {
        session.authorize(Role::Editor)?;
        ensure_valid_price(payload.price)?;

        let vehicle = Vehicle::from_payload(payload, Utc::now());
        self.repo.insert(&vehicle).await?;

        tracing::info!("🚗 Veículo {} ({}) cadastrado por {}", vehicle.id, vehicle.display_name(), session.uid);

        Ok(vehicle)
    }

    pub async fn update(
        &self,
        session: &Session,
        id: Uuid,
        payload: UpdateVehiclePayload,
    ) -> Result<Vehicle, AppError> {
        session.authorize(Role::Editor)?;
        if let Some(price) = payload.price {
            ensure_valid_price(price)?;
        }

        let mut vehicle = self.get(id).await?;
        vehicle.apply_patch(payload, Utc::now());

        if !self.repo.save(&vehicle).await? {
            return Err(AppError::NotFound("Veículo"));
        }
        Ok(vehicle)
    }

    pub async fn soft_delete(&self, session: &Session, id: Uuid) -> Result<DeletedRecord, AppError> {
        session.authorize(Role::Editor)?;

        if !self.repo.soft_delete(id, &session.uid, Utc::now()).await? {
            return Err(AppError::NotFound("Veículo"));
        }

        tracing::info!("🗑️ Veículo {} excluído por {}", id, session.uid);

        Ok(DeletedRecord {
            id,
            message: "Veículo excluído com sucesso.".to_string(),
        })
    }
}

fn ensure_valid_price(price: Option<Decimal>) -> Result<(), AppError> {
    match price {
        Some(p) if p < Decimal::ZERO => Err(validation_error(
            "price",
            "non_negative",
            "O preço não pode ser negativo.",
        )),
        Some(p) if p > max_price() => Err(validation_error(
            "price",
            "too_large",
            "O preço excede o máximo permitido.",
        )),
        _ => Ok(()),
    }
}

/// Teto da coluna `price NUMERIC(12, 2)`.
pub fn max_price() -> Decimal {
    Decimal::new(999_999_999_999, 2)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::MemoryStore;

    fn editor() -> Session {
        Session {
            uid: "u-editor".into(),
            email: "editor@loja.com".into(),
            role: Role::Editor,
        }
    }

    fn payload(make: &str, featured: bool) -> CreateVehiclePayload {
        CreateVehiclePayload {
            make: make.into(),
            model: "Modelo".into(),
            year: 2020,
            price: Some(Decimal::new(15000, 0)),
            mileage: None,
            fuel_type: None,
            transmission: None,
            body_type: None,
            color: None,
            description: None,
            images: None,
            status: None,
            featured: Some(featured),
        }
    }

    #[tokio::test]
    async fn featured_vehicles_come_first_and_deleted_are_hidden() {
        let service = VehicleService::new(Arc::new(MemoryStore::new()));
        let plain = service.create(&editor(), payload("Fiat", false)).await.unwrap();
        let featured = service.create(&editor(), payload("BMW", true)).await.unwrap();
        let removed = service.create(&editor(), payload("Seat", false)).await.unwrap();
        service.soft_delete(&editor(), removed.id).await.unwrap();

        let listed = service.search(&VehicleFilter::default()).await.unwrap();
        let ids: Vec<Uuid> = listed.iter().map(|v| v.id).collect();
        assert_eq!(ids, vec![featured.id, plain.id]);

        assert!(matches!(service.get(removed.id).await, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn negative_price_is_rejected() {
        let service = VehicleService::new(Arc::new(MemoryStore::new()));
        let mut bad = payload("Fiat", false);
        bad.price = Some(Decimal::new(-100, 0));
        assert!(matches!(
            service.create(&editor(), bad).await,
            Err(AppError::ValidationError(_))
        ));
    }

    #[tokio::test]
    async fn price_above_column_limit_is_rejected() {
        let service = VehicleService::new(Arc::new(MemoryStore::new()));
        let created = service.create(&editor(), payload("Fiat", false)).await.unwrap();

        let mut bad = payload("Fiat", false);
        bad.price = Some(max_price() + Decimal::new(1, 2));
        assert!(matches!(
            service.create(&editor(), bad).await,
            Err(AppError::ValidationError(_))
        ));

        let patch = UpdateVehiclePayload {
            price: Some(Some(Decimal::new(5, 0) * Decimal::new(10_i64.pow(18), 0))),
            ..Default::default()
        };
        assert!(matches!(
            service.update(&editor(), created.id, patch).await,
            Err(AppError::ValidationError(_))
        ));
    }
}
