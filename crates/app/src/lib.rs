//! Shared storefront domain and persistence modules.

pub mod auth;
pub mod context;
pub mod database;
pub mod domain;
pub mod pagination;
pub mod storage;


mod uuids;

pub use uuids::TypedUuid;
