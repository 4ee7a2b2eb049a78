//! Data layer and configuration for the microscope measurement dashboard.
//!
//! The desktop shell in `main.rs` renders whatever [`data::service::DatasetService`]
//! exposes; nothing in this library depends on egui.

pub mod config;
pub mod data;
pub mod error;

pub use error::DataError;
