mod error;
pub use error::{AppError, Result};

mod handlers;
pub mod models;
mod refresh_service;
pub mod routes;
mod storage;
mod summary;
mod valuation;

pub use refresh_service::RefreshService;
pub use storage::{CountryStorage, StatusStorage};
pub use valuation::{RandomFactor, ThreadRngFactor};
