// src/db/vehicle_repo.rs

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::vehicle::{Vehicle, VehicleFilter},
};

#[async_trait]
pub trait VehicleRepository: Send + Sync {
    async fn insert(&self, vehicle: &Vehicle) -> Result<(), AppError>;

    async fn find_active(&self, id: Uuid) -> Result<Option<Vehicle>, AppError>;

    /// Busca em lote para resolver nomes (inclui excluídos).
    async fn find_by_ids(&self, ids: &[Uuid]) -> Result<Vec<Vehicle>, AppError>;

    /// Destaques primeiro, depois os mais recentes.
    async fn search(&self, filter: &VehicleFilter, limit: i64) -> Result<Vec<Vehicle>, AppError>;

    async fn save(&self, vehicle: &Vehicle) -> Result<bool, AppError>;

    async fn soft_delete(&self, id: Uuid, actor: &str, at: DateTime<Utc>) -> Result<bool, AppError>;
}

const COLUMNS: &str = r#"
    id, make, model, year, price, mileage, fuel_type, transmission, body_type,
    color, description, images, status, featured, deleted, deleted_by,
    created_at, updated_at
"#;

#[derive(Clone)]
pub struct PgVehicleRepository {
    pool: PgPool,
}

impl PgVehicleRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl VehicleRepository for PgVehicleRepository {
    async fn insert(&self, vehicle: &Vehicle) -> Result<(), AppError> {
        sqlx::query(
            r#"
            INSERT INTO vehicles (
                id, make, model, year, price, mileage, fuel_type, transmission,
                body_type, color, description, images, status, featured,
                deleted, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, FALSE, $15, $16)
            "#,
        )
        .bind(vehicle.id)
        .bind(&vehicle.make)
        .bind(&vehicle.model)
        .bind(vehicle.year)
        .bind(vehicle.price)
        .bind(vehicle.mileage)
        .bind(vehicle.fuel_type.as_deref())
        .bind(vehicle.transmission.as_deref())
        .bind(vehicle.body_type.as_deref())
        .bind(vehicle.color.as_deref())
        .bind(vehicle.description.as_deref())
        .bind(&vehicle.images)
        .bind(vehicle.status)
        .bind(vehicle.featured)
        .bind(vehicle.created_at)
        .bind(vehicle.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn find_active(&self, id: Uuid) -> Result<Option<Vehicle>, AppError> {
        let vehicle = sqlx::query_as::<_, Vehicle>(&format!(
            "SELECT {COLUMNS} FROM vehicles WHERE id = $1 AND deleted = FALSE"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(vehicle)
    }

    async fn find_by_ids(&self, ids: &[Uuid]) -> Result<Vec<Vehicle>, AppError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let vehicles = sqlx::query_as::<_, Vehicle>(&format!(
            "SELECT {COLUMNS} FROM vehicles WHERE id = ANY($1)"
        ))
        .bind(ids)
        .fetch_all(&self.pool)
        .await?;

        Ok(vehicles)
    }

    async fn search(&self, filter: &VehicleFilter, limit: i64) -> Result<Vec<Vehicle>, AppError> {
        // Mesma semântica de VehicleFilter::matches
        let mut builder: QueryBuilder<Postgres> =
            QueryBuilder::new(format!("SELECT {COLUMNS} FROM vehicles WHERE deleted = FALSE"));

        if let Some(q) = filter.q.as_deref().map(str::trim).filter(|q| !q.is_empty()) {
            builder
                .push(" AND (make || ' ' || model || ' ' || COALESCE(description, '')) ILIKE ")
                .push_bind(contains_pattern(q))
                .push(r" ESCAPE '\'");
        }
        if let Some(make) = &filter.make {
            builder.push(" AND LOWER(make) = LOWER(").push_bind(make.clone()).push(")");
        }
        if let Some(model) = &filter.model {
            builder.push(" AND LOWER(model) = LOWER(").push_bind(model.clone()).push(")");
        }
        if let Some(min) = filter.min_price {
            builder.push(" AND price >= ").push_bind(min);
        }
        if let Some(max) = filter.max_price {
            builder.push(" AND price <= ").push_bind(max);
        }
        if let Some(min) = filter.min_year {
            builder.push(" AND year >= ").push_bind(min);
        }
        if let Some(max) = filter.max_year {
            builder.push(" AND year <= ").push_bind(max);
        }
        if let Some(fuel) = &filter.fuel_type {
            builder.push(" AND LOWER(fuel_type) = LOWER(").push_bind(fuel.clone()).push(")");
        }
        if let Some(status) = filter.status {
            builder.push(" AND status = ").push_bind(status);
        }

        builder.push(" ORDER BY featured DESC, created_at DESC LIMIT ").push_bind(limit);

        let vehicles = builder
            .build_query_as::<Vehicle>()
            .fetch_all(&self.pool)
            .await?;

        Ok(vehicles)
    }

    async fn save(&self, vehicle: &Vehicle) -> Result<bool, AppError> {
        let result = sqlx::query(
            r#"
            UPDATE vehicles
            SET make = $2, model = $3, year = $4, price = $5, mileage = $6,
                fuel_type = $7, transmission = $8, body_type = $9, color = $10,
                description = $11, images = $12, status = $13, featured = $14,
                updated_at = $15
            WHERE id = $1 AND deleted = FALSE
            "#,
        )
        .bind(vehicle.id)
        .bind(&vehicle.make)
        .bind(&vehicle.model)
        .bind(vehicle.year)
        .bind(vehicle.price)
        .bind(vehicle.mileage)
        .bind(vehicle.fuel_type.as_deref())
        .bind(vehicle.transmission.as_deref())
        .bind(vehicle.body_type.as_deref())
        .bind(vehicle.color.as_deref())
        .bind(vehicle.description.as_deref())
        .bind(&vehicle.images)
        .bind(vehicle.status)
        .bind(vehicle.featured)
        .bind(vehicle.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn soft_delete(&self, id: Uuid, actor: &str, at: DateTime<Utc>) -> Result<bool, AppError> {
        let result = sqlx::query(
            r#"
            UPDATE vehicles
            SET deleted = TRUE, deleted_by = $2, updated_at = $3
            WHERE id = $1 AND deleted = FALSE
            "#,
        )
        .bind(id)
        .bind(actor)
        .bind(at)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}

/// Padrão ILIKE de "contém" com `%`, `_` e `\` do texto tratados como literais.
fn contains_pattern(q: &str) -> String {
    let mut pattern = String::with_capacity(q.len() + 2);
    pattern.push('%');
    for c in q.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}
