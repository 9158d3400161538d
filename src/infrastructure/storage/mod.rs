//! Storage backends that do not need a database server.

pub mod memory;

pub use memory::InMemoryStore;
