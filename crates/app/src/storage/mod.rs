//! Storage backends that are not tied to PostgreSQL.

pub mod memory;

pub use memory::MemoryStore;
