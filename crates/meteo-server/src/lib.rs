//! HTTP front end for the cached weather service.

pub mod error_mapping;
pub mod routes;
pub mod state;

pub use error_mapping::ApiError;
pub use routes::router;
pub use state::{AppState, Service};
