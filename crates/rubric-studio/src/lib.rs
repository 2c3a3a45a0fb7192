pub mod config;
pub mod error;
pub mod rubric;
pub mod telemetry;

pub use error::AppError;
