pub mod auth;
pub mod customer_service;
pub mod dashboard_service;
pub mod lead_service;
pub mod listing_parser;
pub mod opportunity_service;
pub mod reminders;
pub mod vehicle_service;
