pub mod customers;
pub mod dashboard;
pub mod leads;
pub mod opportunities;
pub mod users;
pub mod vehicles;
