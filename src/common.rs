pub mod error;
pub mod extract;
pub mod response;

pub use error::{ApiError, AppError};
pub use response::ApiResponse;
