//! Authentication

mod errors;
mod models;
mod repository;
mod service;
mod token;

pub use errors::*;
pub use models::*;
pub use repository::{AuthRepository, PgAuthRepository};
pub use service::*;
pub use token::*;
