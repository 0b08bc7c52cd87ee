pub mod config;
pub mod confirm;

pub use config::AppConfig;
pub use confirm::{create_confirmer, AlwaysConfirm, Confirm, StdinConfirm};
