// src/db/customer_repo.rs

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::{common::error::AppError, models::customer::Customer};

#[async_trait]
pub trait CustomerRepository: Send + Sync {
    async fn insert(&self, customer: &Customer) -> Result<(), AppError>;

    async fn find_active(&self, id: Uuid) -> Result<Option<Customer>, AppError>;

    /// Busca em lote para resolver nomes. Inclui excluídos: o nome de um
    /// cliente removido continua válido como referência histórica.
    async fn find_by_ids(&self, ids: &[Uuid]) -> Result<Vec<Customer>, AppError>;

    /// `email` já normalizado.
    async fn find_active_by_email(&self, email: &str) -> Result<Option<Customer>, AppError>;

    async fn list_active(&self, limit: Option<i64>) -> Result<Vec<Customer>, AppError>;

    async fn save(&self, customer: &Customer) -> Result<bool, AppError>;

    async fn soft_delete(&self, id: Uuid, actor: &str, at: DateTime<Utc>) -> Result<bool, AppError>;
}

const COLUMNS: &str =
    "id, name, email, phone, notes, deleted, deleted_by, created_at, updated_at";

#[derive(Clone)]
pub struct PgCustomerRepository {
    pool: PgPool,
}

impl PgCustomerRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CustomerRepository for PgCustomerRepository {
    async fn insert(&self, customer: &Customer) -> Result<(), AppError> {
        sqlx::query(
            r#"
            INSERT INTO customers (id, name, email, phone, notes, deleted, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, FALSE, $6, $7)
            "#,
        )
        .bind(customer.id)
        .bind(&customer.name)
        .bind(customer.email.as_deref())
        .bind(customer.phone.as_deref())
        .bind(customer.notes.as_deref())
        .bind(customer.created_at)
        .bind(customer.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn find_active(&self, id: Uuid) -> Result<Option<Customer>, AppError> {
        let customer = sqlx::query_as::<_, Customer>(&format!(
            "SELECT {COLUMNS} FROM customers WHERE id = $1 AND deleted = FALSE"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(customer)
    }

    async fn find_by_ids(&self, ids: &[Uuid]) -> Result<Vec<Customer>, AppError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let customers = sqlx::query_as::<_, Customer>(&format!(
            "SELECT {COLUMNS} FROM customers WHERE id = ANY($1)"
        ))
        .bind(ids)
        .fetch_all(&self.pool)
        .await?;

        Ok(customers)
    }

    async fn find_active_by_email(&self, email: &str) -> Result<Option<Customer>, AppError> {
        // Mais antigo primeiro: se houver duplicados, o lead cai sempre no mesmo
        let customer = sqlx::query_as::<_, Customer>(&format!(
            r#"
            SELECT {COLUMNS}
            FROM customers
            WHERE email = $1 AND deleted = FALSE
            ORDER BY created_at ASC
            LIMIT 1
            "#
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(customer)
    }

    async fn list_active(&self, limit: Option<i64>) -> Result<Vec<Customer>, AppError> {
        let customers = sqlx::query_as::<_, Customer>(&format!(
            r#"
            SELECT {COLUMNS}
            FROM customers
            WHERE deleted = FALSE
            ORDER BY created_at DESC
            LIMIT $1
            "#
        ))
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(customers)
    }

    async fn save(&self, customer: &Customer) -> Result<bool, AppError> {
        let result = sqlx::query(
            r#"
            UPDATE customers
            SET name = $2, email = $3, phone = $4, notes = $5, updated_at = $6
            WHERE id = $1 AND deleted = FALSE
            "#,
        )
        .bind(customer.id)
        .bind(&customer.name)
        .bind(customer.email.as_deref())
        .bind(customer.phone.as_deref())
        .bind(customer.notes.as_deref())
        .bind(customer.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn soft_delete(&self, id: Uuid, actor: &str, at: DateTime<Utc>) -> Result<bool, AppError> {
        let result = sqlx::query(
            r#"
            UPDATE customers
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
