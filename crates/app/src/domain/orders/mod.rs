//! Orders

pub mod data;
pub mod errors;
pub mod pricing;
pub mod records;
pub mod repository;
pub mod service;
pub mod status;
pub mod validation;

pub use errors::OrdersServiceError;
pub use service::*;
