// src/db/memory.rs
//
// Armazenamento em memória com a mesma semântica dos repositórios Postgres.
// Usado nos testes e quando DATABASE_URL não está definida (desenvolvimento).

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{CustomerRepository, OpportunityRepository, UserRepository, VehicleRepository},
    models::{
        auth::{Role, UserRecord},
        customer::Customer,
        opportunity::Opportunity,
        vehicle::{Vehicle, VehicleFilter},
    },
};

#[derive(Default)]
pub struct MemoryStore {
    opportunities: RwLock<HashMap<Uuid, Opportunity>>,
    customers: RwLock<HashMap<Uuid, Customer>>,
    vehicles: RwLock<HashMap<Uuid, Vehicle>>,
    users: RwLock<HashMap<String, UserRecord>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn take_limit<T>(mut items: Vec<T>, limit: Option<i64>) -> Vec<T> {
    if let Some(limit) = limit {
        items.truncate(limit.max(0) as usize);
    }
    items
}

// =============================================================================
//  OPORTUNIDADES
// =============================================================================

#[async_trait]
impl OpportunityRepository for MemoryStore {
    async fn insert(&self, opportunity: &Opportunity) -> Result<(), AppError> {
        let mut records = self.opportunities.write().await;
        records.insert(opportunity.id, opportunity.clone());
        Ok(())
    }

    async fn find_active(&self, id: Uuid) -> Result<Option<Opportunity>, AppError> {
        let records = self.opportunities.read().await;
        Ok(records.get(&id).filter(|o| !o.deleted).cloned())
    }

    async fn list_active(&self, limit: Option<i64>, offset: i64) -> Result<Vec<Opportunity>, AppError> {
        let records = self.opportunities.read().await;
        let mut items: Vec<Opportunity> = records.values().filter(|o| !o.deleted).cloned().collect();
        items.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(a.id.cmp(&b.id)));
        let skip = (offset.max(0) as usize).min(items.len());
        items.drain(..skip);
        Ok(take_limit(items, limit))
    }

    async fn save(&self, opportunity: &Opportunity) -> Result<bool, AppError> {
        let mut records = self.opportunities.write().await;
        match records.get_mut(&opportunity.id) {
            Some(existing) if !existing.deleted => {
                // deleted/deleted_by/created_at não são regravados, como no UPDATE do Postgres
                let mut updated = opportunity.clone();
                updated.deleted = existing.deleted;
                updated.deleted_by = existing.deleted_by.clone();
                updated.created_at = existing.created_at;
                *existing = updated;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn soft_delete(&self, id: Uuid, actor: &str, at: DateTime<Utc>) -> Result<bool, AppError> {
        let mut records = self.opportunities.write().await;
        match records.get_mut(&id) {
            Some(existing) if !existing.deleted => {
                existing.deleted = true;
                existing.deleted_by = Some(actor.to_string());
                existing.updated_at = at;
                Ok(true)
            }
            _ => Ok(false),
        }
    }
}

// =============================================================================
//  CLIENTES
// =============================================================================

#[async_trait]
impl CustomerRepository for MemoryStore {
    async fn insert(&self, customer: &Customer) -> Result<(), AppError> {
        let mut records = self.customers.write().await;
        records.insert(customer.id, customer.clone());
        Ok(())
    }

    async fn find_active(&self, id: Uuid) -> Result<Option<Customer>, AppError> {
        let records = self.customers.read().await;
        Ok(records.get(&id).filter(|c| !c.deleted).cloned())
    }

    async fn find_by_ids(&self, ids: &[Uuid]) -> Result<Vec<Customer>, AppError> {
        let records = self.customers.read().await;
        Ok(ids.iter().filter_map(|id| records.get(id).cloned()).collect())
    }

    async fn find_active_by_email(&self, email: &str) -> Result<Option<Customer>, AppError> {
        let records = self.customers.read().await;
        Ok(records
            .values()
            .filter(|c| !c.deleted && c.email.as_deref() == Some(email))
            .min_by_key(|c| c.created_at)
            .cloned())
    }

    async fn list_active(&self, limit: Option<i64>) -> Result<Vec<Customer>, AppError> {
        let records = self.customers.read().await;
        let mut items: Vec<Customer> = records.values().filter(|c| !c.deleted).cloned().collect();
        items.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(a.id.cmp(&b.id)));
        Ok(take_limit(items, limit))
    }

    async fn save(&self, customer: &Customer) -> Result<bool, AppError> {
        let mut records = self.customers.write().await;
        match records.get_mut(&customer.id) {
            Some(existing) if !existing.deleted => {
                let mut updated = customer.clone();
                updated.deleted = existing.deleted;
                updated.deleted_by = existing.deleted_by.clone();
                updated.created_at = existing.created_at;
                *existing = updated;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn soft_delete(&self, id: Uuid, actor: &str, at: DateTime<Utc>) -> Result<bool, AppError> {
        let mut records = self.customers.write().await;
        match records.get_mut(&id) {
            Some(existing) if !existing.deleted => {
                existing.deleted = true;
                existing.deleted_by = Some(actor.to_string());
                existing.updated_at = at;
                Ok(true)
            }
            _ => Ok(false),
        }
    }
}

// =============================================================================
//  VEÍCULOS
// =============================================================================

#[async_trait]
impl VehicleRepository for MemoryStore {
    async fn insert(&self, vehicle: &Vehicle) -> Result<(), AppError> {
        let mut records = self.vehicles.write().await;
        records.insert(vehicle.id, vehicle.clone());
        Ok(())
    }

    async fn find_active(&self, id: Uuid) -> Result<Option<Vehicle>, AppError> {
        let records = self.vehicles.read().await;
        Ok(records.get(&id).filter(|v| !v.deleted).cloned())
    }

    async fn find_by_ids(&self, ids: &[Uuid]) -> Result<Vec<Vehicle>, AppError> {
        let records = self.vehicles.read().await;
        Ok(ids.iter().filter_map(|id| records.get(id).cloned()).collect())
    }

    async fn search(&self, filter: &VehicleFilter, limit: i64) -> Result<Vec<Vehicle>, AppError> {
        let records = self.vehicles.read().await;
        let mut items: Vec<Vehicle> = records
            .values()
            .filter(|v| !v.deleted && filter.matches(v))
            .cloned()
            .collect();
        items.sort_by(|a, b| {
            b.featured
                .cmp(&a.featured)
                .then(b.created_at.cmp(&a.created_at))
                .then(a.id.cmp(&b.id))
        });
        Ok(take_limit(items, Some(limit)))
    }

    async fn save(&self, vehicle: &Vehicle) -> Result<bool, AppError> {
        let mut records = self.vehicles.write().await;
        match records.get_mut(&vehicle.id) {
            Some(existing) if !existing.deleted => {
                let mut updated = vehicle.clone();
                updated.deleted = existing.deleted;
                updated.deleted_by = existing.deleted_by.clone();
                updated.created_at = existing.created_at;
                *existing = updated;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn soft_delete(&self, id: Uuid, actor: &str, at: DateTime<Utc>) -> Result<bool, AppError> {
        let mut records = self.vehicles.write().await;
        match records.get_mut(&id) {
            Some(existing) if !existing.deleted => {
                existing.deleted = true;
                existing.deleted_by = Some(actor.to_string());
                existing.updated_at = at;
                Ok(true)
            }
            _ => Ok(false),
        }
    }
}

// =============================================================================
//  USUÁRIOS
// =============================================================================

#[async_trait]
impl UserRepository for MemoryStore {
    async fn find_by_uid(&self, uid: &str) -> Result<Option<UserRecord>, AppError> {
        let records = self.users.read().await;
        Ok(records.get(uid).cloned())
    }

    async fn list(&self) -> Result<Vec<UserRecord>, AppError> {
        let records = self.users.read().await;
        let mut users: Vec<UserRecord> = records.values().cloned().collect();
        users.sort_by(|a, b| a.email.cmp(&b.email));
        Ok(users)
    }

    async fn upsert(
        &self,
        uid: &str,
        email: &str,
        role: Role,
        at: DateTime<Utc>,
    ) -> Result<UserRecord, AppError> {
        let mut records = self.users.write().await;
        let record = records
            .entry(uid.to_string())
            .and_modify(|existing| {
                existing.email = email.to_string();
                existing.role = role;
                existing.updated_at = at;
            })
            .or_insert_with(|| UserRecord {
                uid: uid.to_string(),
                email: email.to_string(),
                role,
                created_at: at,
                updated_at: at,
            });
        Ok(record.clone())
    }
}
