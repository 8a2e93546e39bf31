// src/db/user_repo.rs

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::{
    common::error::AppError,
    models::auth::{Role, UserRecord},
};

// Coleção `users`: { uid, email, role }. O uid vem do provedor de identidade.
#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn find_by_uid(&self, uid: &str) -> Result<Option<UserRecord>, AppError>;

    async fn list(&self) -> Result<Vec<UserRecord>, AppError>;

    /// Cria ou atualiza o papel do usuário.
    async fn upsert(
        &self,
        uid: &str,
        email: &str,
        role: Role,
        at: DateTime<Utc>,
    ) -> Result<UserRecord, AppError>;
}

#[derive(Clone)]
pub struct PgUserRepository {
    pool: PgPool,
}

impl PgUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn find_by_uid(&self, uid: &str) -> Result<Option<UserRecord>, AppError> {
        let maybe_user = sqlx::query_as::<_, UserRecord>(
            "SELECT uid, email, role, created_at, updated_at FROM users WHERE uid = $1",
        )
        .bind(uid)
        .fetch_optional(&self.pool)
        .await?;

        Ok(maybe_user)
    }

    async fn list(&self) -> Result<Vec<UserRecord>, AppError> {
        let users = sqlx::query_as::<_, UserRecord>(
            "SELECT uid, email, role, created_at, updated_at FROM users ORDER BY email ASC",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(users)
    }

    async fn upsert(
        &self,
        uid: &str,
        email: &str,
        role: Role,
        at: DateTime<Utc>,
    ) -> Result<UserRecord, AppError> {
        let user = sqlx::query_as::<_, UserRecord>(
            r#"
            INSERT INTO users (uid, email, role, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $4)
            ON CONFLICT (uid) DO UPDATE
                SET email = EXCLUDED.email,
                    role = EXCLUDED.role,
                    updated_at = EXCLUDED.updated_at
            RETURNING uid, email, role, created_at, updated_at
            "#,
        )
        .bind(uid)
        .bind(email)
        .bind(role)
        .bind(at)
        .fetch_one(&self.pool)
        .await?;

        Ok(user)
    }
}
