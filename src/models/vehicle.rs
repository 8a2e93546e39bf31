// src/models/vehicle.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::common::response::double_option;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "vehicle_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum VehicleStatus {
    #[default]
    Available,
    Reserved,
    Sold,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Vehicle {
    pub id: Uuid,

    #[schema(example = "Volkswagen")]
    pub make: String,
    #[schema(example = "Golf")]
    pub model: String,
    #[schema(example = 2019)]
    pub year: i32,

    #[schema(value_type = Option<f64>, example = 18900.0)]
    pub price: Option<Decimal>,
    #[schema(example = 84000)]
    pub mileage: Option<i32>,

    #[schema(example = "diesel")]
    pub fuel_type: Option<String>,
    #[schema(example = "manual")]
    pub transmission: Option<String>,
    pub body_type: Option<String>,
    pub color: Option<String>,
    pub description: Option<String>,

    // URLs no armazenamento de objetos externo
    pub images: Vec<String>,

    pub status: VehicleStatus,
    pub featured: bool,

    pub deleted: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deleted_by: Option<String>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Vehicle {
    /// Nome de exibição: "{make} {model} ({year})"
    pub fn display_name(&self) -> String {
        format!("{} {} ({})", self.make, self.model, self.year)
    }

    pub fn from_payload(payload: CreateVehiclePayload, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            make: payload.make,
            model: payload.model,
            year: payload.year,
            price: payload.price,
            mileage: payload.mileage,
            fuel_type: payload.fuel_type,
            transmission: payload.transmission,
            body_type: payload.body_type,
            color: payload.color,
            description: payload.description,
            images: payload.images.unwrap_or_default(),
            status: payload.status.unwrap_or_default(),
            featured: payload.featured.unwrap_or(false),
            deleted: false,
            deleted_by: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn apply_patch(&mut self, patch: UpdateVehiclePayload, now: DateTime<Utc>) {
        if let Some(make) = patch.make {
            self.make = make;
        }
        if let Some(model) = patch.model {
            self.model = model;
        }
        if let Some(year) = patch.year {
            self.year = year;
        }
        if let Some(price) = patch.price {
            self.price = price;
        }
        if let Some(mileage) = patch.mileage {
            self.mileage = mileage;
        }
        if let Some(fuel_type) = patch.fuel_type {
            self.fuel_type = fuel_type;
        }
        if let Some(transmission) = patch.transmission {
            self.transmission = transmission;
        }
        if let Some(body_type) = patch.body_type {
            self.body_type = body_type;
        }
        if let Some(color) = patch.color {
            self.color = color;
        }
        if let Some(description) = patch.description {
            self.description = description;
        }
        if let Some(images) = patch.images {
            self.images = images;
        }
        if let Some(status) = patch.status {
            self.status = status;
        }
        if let Some(featured) = patch.featured {
            self.featured = featured;
        }
        self.updated_at = now;
    }
}

// =============================================================================
//  PAYLOADS
// =============================================================================

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateVehiclePayload {
    #[validate(length(min = 1, max = 80, message = "required"))]
    #[schema(example = "Volkswagen")]
    pub make: String,

    #[validate(length(min = 1, max = 80, message = "required"))]
    #[schema(example = "Golf")]
    pub model: String,

    #[validate(range(min = 1900, max = 2100, message = "invalid_year"))]
    #[schema(example = 2019)]
    pub year: i32,

    #[schema(value_type = Option<f64>, example = 18900.0)]
    pub price: Option<Decimal>,

    #[validate(range(min = 0, message = "invalid_mileage"))]
    pub mileage: Option<i32>,

    pub fuel_type: Option<String>,
    pub transmission: Option<String>,
    pub body_type: Option<String>,
    pub color: Option<String>,

    #[validate(length(max = 20000))]
    pub description: Option<String>,

    pub images: Option<Vec<String>>,
    pub status: Option<VehicleStatus>,
    pub featured: Option<bool>,
}

#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateVehiclePayload {
    #[validate(length(min = 1, max = 80, message = "required"))]
    pub make: Option<String>,

    #[validate(length(min = 1, max = 80, message = "required"))]
    pub model: Option<String>,

    #[validate(range(min = 1900, max = 2100, message = "invalid_year"))]
    pub year: Option<i32>,

    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<f64>)]
    pub price: Option<Option<Decimal>>,

    #[serde(default, deserialize_with = "double_option")]
    #[validate(range(min = 0, message = "invalid_mileage"))]
    #[schema(value_type = Option<i32>)]
    pub mileage: Option<Option<i32>>,

    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>)]
    pub fuel_type: Option<Option<String>>,

    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>)]
    pub transmission: Option<Option<String>>,

    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>)]
    pub body_type: Option<Option<String>>,

    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>)]
    pub color: Option<Option<String>>,

    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>)]
    pub description: Option<Option<String>>,

    pub images: Option<Vec<String>>,
    pub status: Option<VehicleStatus>,
    pub featured: Option<bool>,
}

// =============================================================================
//  BUSCA (Vitrine pública)
// =============================================================================

#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct VehicleFilter {
    /// Texto livre: casa com marca, modelo ou descrição
    pub q: Option<String>,
    pub make: Option<String>,
    pub model: Option<String>,
    #[param(value_type = Option<f64>)]
    pub min_price: Option<Decimal>,
    #[param(value_type = Option<f64>)]
    pub max_price: Option<Decimal>,
    pub min_year: Option<i32>,
    pub max_year: Option<i32>,
    pub fuel_type: Option<String>,
    pub status: Option<VehicleStatus>,
    /// Máximo de registros (padrão 50)
    pub limit: Option<i64>,
}

impl VehicleFilter {
    /// Mesma semântica do filtro SQL do repositório Postgres
    /// (comparações de texto sem diferenciar maiúsculas).
    pub fn matches(&self, vehicle: &Vehicle) -> bool {
        fn eq_ci(a: &str, b: &str) -> bool {
            a.to_lowercase() == b.to_lowercase()
        }

        if let Some(q) = self.q.as_deref().map(str::trim).filter(|q| !q.is_empty()) {
            let needle = q.to_lowercase();
            let haystack = format!(
                "{} {} {}",
                vehicle.make,
                vehicle.model,
                vehicle.description.as_deref().unwrap_or_default()
            )
            .to_lowercase();
            if !haystack.contains(&needle) {
                return false;
            }
        }
        if let Some(make) = &self.make {
            if !eq_ci(&vehicle.make, make) {
                return false;
            }
        }
        if let Some(model) = &self.model {
            if !eq_ci(&vehicle.model, model) {
                return false;
            }
        }
        if let Some(min) = self.min_price {
            if vehicle.price.is_none_or(|p| p < min) {
                return false;
            }
        }
        if let Some(max) = self.max_price {
            if vehicle.price.is_none_or(|p| p > max) {
                return false;
            }
        }
        if self.min_year.is_some_and(|min| vehicle.year < min) {
            return false;
        }
        if self.max_year.is_some_and(|max| vehicle.year > max) {
            return false;
        }
        if let Some(fuel) = &self.fuel_type {
            if !vehicle.fuel_type.as_deref().is_some_and(|f| eq_ci(f, fuel)) {
                return false;
            }
        }
        if let Some(status) = self.status {
            if vehicle.status != status {
                return false;
            }
        }
        true
    }
}

// Rascunho devolvido pelo parser de anúncios: tudo opcional,
// o formulário do admin completa o resto.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct VehicleDraft {
    pub make: Option<String>,
    pub model: Option<String>,
    pub year: Option<i32>,
    #[schema(value_type = Option<f64>)]
    pub price: Option<Decimal>,
    pub mileage: Option<i32>,
    pub fuel_type: Option<String>,
    pub transmission: Option<String>,
    pub body_type: Option<String>,
    pub color: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ParseListingPayload {
    #[validate(length(min = 1, max = 20000, message = "O texto do anúncio é obrigatório."))]
    #[schema(example = "VW Golf 1.6 TDI 2019, 84 mil km, diesel, manual, 18.900€")]
    pub text: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    fn golf() -> Vehicle {
        let payload = CreateVehiclePayload {
            make: "Volkswagen".into(),
            model: "Golf".into(),
            year: 2019,
            price: Some(Decimal::new(18900, 0)),
            mileage: Some(84000),
            fuel_type: Some("Diesel".into()),
            transmission: Some("manual".into()),
            body_type: None,
            color: None,
            description: Some("Único dono, revisões em dia".into()),
            images: None,
            status: None,
            featured: None,
        };
        Vehicle::from_payload(payload, Utc::now())
    }

    #[test]
    fn display_name_format() {
        assert_eq!(golf().display_name(), "Volkswagen Golf (2019)");
    }

    #[test]
    fn filter_matches_case_insensitively() {
        let vehicle = golf();
        let filter = VehicleFilter {
            make: Some("volkswagen".into()),
            fuel_type: Some("diesel".into()),
            ..Default::default()
        };
        assert!(filter.matches(&vehicle));

        let text = VehicleFilter {
            q: Some("REVISÕES".into()),
            ..Default::default()
        };
        assert!(text.matches(&vehicle));
    }

    #[test]
    fn price_and_year_bounds_are_inclusive() {
        let vehicle = golf();
        let filter = VehicleFilter {
            min_price: Some(Decimal::new(18900, 0)),
            max_price: Some(Decimal::new(18900, 0)),
            min_year: Some(2019),
            max_year: Some(2019),
            ..Default::default()
        };
        assert!(filter.matches(&vehicle));

        let too_new = VehicleFilter {
            min_year: Some(2020),
            ..Default::default()
        };
        assert!(!too_new.matches(&vehicle));
    }

    #[test]
    fn negative_mileage_patch_is_invalid() {
        let patch: UpdateVehiclePayload = serde_json::from_str(r#"{"mileage": -5}"#).unwrap();
        assert!(patch.validate().is_err());

        let cleared: UpdateVehiclePayload = serde_json::from_str(r#"{"mileage": null}"#).unwrap();
        assert!(cleared.validate().is_ok());
    }

    #[test]
    fn price_filter_excludes_unpriced_vehicles() {
        let mut vehicle = golf();
        vehicle.price = None;
        let filter = VehicleFilter {
            max_price: Some(Decimal::new(50000, 0)),
            ..Default::default()
        };
        assert!(!filter.matches(&vehicle));
    }
}
