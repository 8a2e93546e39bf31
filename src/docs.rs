// src/docs.rs

use utoipa::OpenApi;
use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use crate::common;
use crate::handlers;
use crate::models;

#[derive(OpenApi)]
#[openapi(
    paths(
        // --- Opportunities ---
        handlers::opportunities::list_opportunities,
        handlers::opportunities::get_opportunity,
        handlers::opportunities::create_opportunity,
        handlers::opportunities::update_opportunity,
        handlers::opportunities::delete_opportunity,

        // --- Customers ---
        handlers::customers::list_customers,
        handlers::customers::get_customer,
        handlers::customers::create_customer,
        handlers::customers::update_customer,
        handlers::customers::delete_customer,

        // --- Vehicles ---
        handlers::vehicles::list_vehicles,
        handlers::vehicles::get_vehicle,
        handlers::vehicles::create_vehicle,
        handlers::vehicles::update_vehicle,
        handlers::vehicles::delete_vehicle,
        handlers::vehicles::parse_listing,

        // --- Storefront ---
        handlers::vehicles::search_vehicles,
        handlers::vehicles::get_public_vehicle,

        // --- Leads ---
        handlers::leads::submit_lead,

        // --- Users ---
        handlers::users::get_me,
        handlers::users::list_users,
        handlers::users::assign_role,

        // --- Dashboard ---
        handlers::dashboard::get_summary,
    ),
    components(
        schemas(
            common::response::DeletedRecord,

            // --- Opportunities ---
            models::opportunity::Stage,
            models::opportunity::LeadSource,
            models::opportunity::Opportunity,
            models::opportunity::OpportunityView,
            models::opportunity::CreateOpportunityPayload,
            models::opportunity::UpdateOpportunityPayload,

            // --- Customers ---
            models::customer::Customer,
            models::customer::CreateCustomerPayload,
            models::customer::UpdateCustomerPayload,

            // --- Vehicles ---
            models::vehicle::VehicleStatus,
            models::vehicle::Vehicle,
            models::vehicle::CreateVehiclePayload,
            models::vehicle::UpdateVehiclePayload,
            models::vehicle::VehicleDraft,
            models::vehicle::ParseListingPayload,

            // --- Leads ---
            models::lead::LeadKind,
            models::lead::LeadPayload,
            models::lead::LeadReceipt,

            // --- Auth ---
            models::auth::Role,
            models::auth::Session,
            models::auth::SessionInfo,
            models::auth::UserRecord,
            models::auth::AssignRolePayload,

            // --- Dashboard ---
            models::dashboard::DashboardSummary,
            models::dashboard::StageCount,
            models::dashboard::Reminders,
        )
    ),
    tags(
        (name = "Opportunities", description = "Funil de vendas (oportunidades)"),
        (name = "Customers", description = "Clientes do stand"),
        (name = "Vehicles", description = "Gestão do estoque de veículos"),
        (name = "Storefront", description = "Vitrine pública de veículos"),
        (name = "Leads", description = "Formulário público de contato"),
        (name = "Users", description = "Sessão e papéis do painel"),
        (name = "Dashboard", description = "Indicadores e lembretes do funil")
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "api_jwt",
            SecurityScheme::Http(
                Http::new(HttpAuthScheme::Bearer)
            ),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn openapi_lists_admin_and_public_routes() {
        let doc = ApiDoc::openapi();
        let paths = &doc.paths.paths;
        assert!(paths.contains_key("/api/admin/opportunities/{id}"));
        assert!(paths.contains_key("/api/leads"));
        assert!(paths.contains_key("/api/vehicles"));
    }
}
