//! Carts

pub mod data;
pub mod errors;
pub mod reconcile;
pub mod records;
pub mod repositories;
pub mod service;

pub use errors::CartsServiceError;
pub use service::*;
