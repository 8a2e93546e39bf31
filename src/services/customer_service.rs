// src/services/customer_service.rs

use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;
use validator::ValidateEmail;

use crate::{
    common::{
        error::{validation_error, AppError},
        response::DeletedRecord,
    },
    db::CustomerRepository,
    models::{
        auth::{Role, Session},
        customer::{CreateCustomerPayload, Customer, UpdateCustomerPayload},
    },
    services::opportunity_service::effective_limit,
};

#[derive(Clone)]
pub struct CustomerService {
    repo: Arc<dyn CustomerRepository>,
}

impl CustomerService {
    pub fn new(repo: Arc<dyn CustomerRepository>) -> Self {
        Self { repo }
    }

    pub async fn list(&self, limit: Option<i64>) -> Result<Vec<Customer>, AppError> {
        self.repo.list_active(Some(effective_limit(limit))).await
    }

    pub async fn get(&self, id: Uuid) -> Result<Customer, AppError> {
        self.repo
            .find_active(id)
            .await?
            .ok_or(AppError::NotFound("Cliente"))
    }

    pub async fn create(
        &self,
        session: &Session,
        payload: CreateCustomerPayload,
    ) -> Result<Customer, AppError> {
        session.authorize(Role::Editor)?;

        let mut customer = Customer::new(
            payload.name,
            payload.email.as_deref(),
            payload.phone,
            Utc::now(),
        );
        customer.notes = payload.notes;

        self.repo.insert(&customer).await?;
        Ok(customer)
    }

    pub async fn update(
        &self,
        session: &Session,
        id: Uuid,
        payload: UpdateCustomerPayload,
    ) -> Result<Customer, AppError> {
        session.authorize(Role::Editor)?;

        if let Some(Some(email)) = &payload.email {
            if !email.validate_email() {
                return Err(validation_error(
                    "email",
                    "email",
                    "O e-mail fornecido é inválido.",
                ));
            }
        }

        let mut customer = self.get(id).await?;
        customer.apply_patch(payload, Utc::now());

        if !self.repo.save(&customer).await? {
            return Err(AppError::NotFound("Cliente"));
        }
        Ok(customer)
    }

    pub async fn soft_delete(&self, session: &Session, id: Uuid) -> Result<DeletedRecord, AppError> {
        session.authorize(Role::Editor)?;

        if !self.repo.soft_delete(id, &session.uid, Utc::now()).await? {
            return Err(AppError::NotFound("Cliente"));
        }

        tracing::info!("🗑️ Cliente {} excluído por {}", id, session.uid);

        Ok(DeletedRecord {
            id,
            message: "Cliente excluído com sucesso.".to_string(),
        })
    }
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

    #[tokio::test]
    async fn update_rejects_invalid_email_and_missing_record() {
        let service = CustomerService::new(Arc::new(MemoryStore::new()));
        let created = service
            .create(
                &editor(),
                CreateCustomerPayload {
                    name: "Rui".into(),
                    email: Some("rui@email.com".into()),
                    phone: None,
                    notes: None,
                },
            )
            .await
            .unwrap();

        let bad = UpdateCustomerPayload {
            email: Some(Some("rui-arroba-email".into())),
            ..Default::default()
        };
        assert!(matches!(
            service.update(&editor(), created.id, bad).await,
            Err(AppError::ValidationError(_))
        ));

        service.soft_delete(&editor(), created.id).await.unwrap();
        assert!(matches!(
            service
                .update(&editor(), created.id, UpdateCustomerPayload::default())
                .await,
            Err(AppError::NotFound(_))
        ));
    }
}
