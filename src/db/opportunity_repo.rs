// src/db/opportunity_repo.rs

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{types::Json, PgPool};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::opportunity::{LeadSource, Opportunity, Stage},
};

// Coleção `opportunities`. Todas as leituras ignoram registros com deleted = true.
#[async_trait]
pub trait OpportunityRepository: Send + Sync {
    async fn insert(&self, opportunity: &Opportunity) -> Result<(), AppError>;

    async fn find_active(&self, id: Uuid) -> Result<Option<Opportunity>, AppError>;

    /// Ordenado por criação (mais recentes primeiro). `None` = sem limite.
    /// Mais recentes primeiro; `offset` conta sobre essa mesma ordem.
    async fn list_active(&self, limit: Option<i64>, offset: i64) -> Result<Vec<Opportunity>, AppError>;

    /// Grava o registro inteiro se ele ainda existir e não estiver excluído.
    /// Retorna `false` quando nenhuma linha foi atualizada.
    async fn save(&self, opportunity: &Opportunity) -> Result<bool, AppError>;

    /// Retorna `false` se o registro não existe ou já estava excluído.
    async fn soft_delete(&self, id: Uuid, actor: &str, at: DateTime<Utc>) -> Result<bool, AppError>;
}

// Linha crua do Postgres: `source` é JSONB.
#[derive(sqlx::FromRow)]
struct OpportunityRow {
    id: Uuid,
    customer_id: Uuid,
    vehicle_id: Option<Uuid>,
    stage: Stage,
    expected_value: Option<Decimal>,
    notes: Option<String>,
    next_action_date: Option<String>,
    source: Option<Json<LeadSource>>,
    deleted: bool,
    deleted_by: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<OpportunityRow> for Opportunity {
    fn from(row: OpportunityRow) -> Self {
        Self {
            id: row.id,
            customer_id: row.customer_id,
            vehicle_id: row.vehicle_id,
            stage: row.stage,
            expected_value: row.expected_value,
            notes: row.notes,
            next_action_date: row.next_action_date,
            source: row.source.map(|Json(source)| source),
            deleted: row.deleted,
            deleted_by: row.deleted_by,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

const COLUMNS: &str = r#"
    id, customer_id, vehicle_id, stage, expected_value, notes,
    next_action_date, source, deleted, deleted_by, created_at, updated_at
"#;

#[derive(Clone)]
pub struct PgOpportunityRepository {
    pool: PgPool,
}

impl PgOpportunityRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl OpportunityRepository for PgOpportunityRepository {
    async fn insert(&self, opportunity: &Opportunity) -> Result<(), AppError> {
        sqlx::query(
            r#"
            INSERT INTO opportunities (
                id, customer_id, vehicle_id, stage, expected_value, notes,
                next_action_date, source, deleted, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, FALSE, $9, $10)
            "#,
        )
        .bind(opportunity.id)
        .bind(opportunity.customer_id)
        .bind(opportunity.vehicle_id)
        .bind(opportunity.stage)
        .bind(opportunity.expected_value)
        .bind(opportunity.notes.as_deref())
        .bind(opportunity.next_action_date.as_deref())
        .bind(opportunity.source.as_ref().map(Json))
        .bind(opportunity.created_at)
        .bind(opportunity.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn find_active(&self, id: Uuid) -> Result<Option<Opportunity>, AppError> {
        let row = sqlx::query_as::<_, OpportunityRow>(&format!(
            "SELECT {COLUMNS} FROM opportunities WHERE id = $1 AND deleted = FALSE"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Opportunity::from))
    }

    async fn list_active(&self, limit: Option<i64>, offset: i64) -> Result<Vec<Opportunity>, AppError> {
        // LIMIT NULL no Postgres = sem limite
        let rows = sqlx::query_as::<_, OpportunityRow>(&format!(
            r#"
            SELECT {COLUMNS}
            FROM opportunities
            WHERE deleted = FALSE
            ORDER BY created_at DESC, id
            LIMIT $1 OFFSET $2
            "#
        ))
        .bind(limit)
        .bind(offset.max(0))
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Opportunity::from).collect())
    }

    async fn save(&self, opportunity: &Opportunity) -> Result<bool, AppError> {
        let result = sqlx::query(
            r#"
            UPDATE opportunities
            SET customer_id = $2,
                vehicle_id = $3,
                stage = $4,
                expected_value = $5,
                notes = $6,
                next_action_date = $7,
                updated_at = $8
            WHERE id = $1 AND deleted = FALSE
            "#,
        )
        .bind(opportunity.id)
        .bind(opportunity.customer_id)
        .bind(opportunity.vehicle_id)
        .bind(opportunity.stage)
        .bind(opportunity.expected_value)
        .bind(opportunity.notes.as_deref())
        .bind(opportunity.next_action_date.as_deref())
        .bind(opportunity.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn soft_delete(&self, id: Uuid, actor: &str, at: DateTime<Utc>) -> Result<bool, AppError> {
        let result = sqlx::query(
            r#"
            UPDATE opportunities
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
