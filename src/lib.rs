pub mod ai;
pub mod app;
pub mod config;
pub mod error;
pub mod models;
pub mod services;
pub mod store;

pub use app::{App, RunOutcome, RunSettings};
pub use config::Config;
pub use error::{AppError, Result};
