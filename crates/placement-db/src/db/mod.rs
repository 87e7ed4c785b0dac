//! Database repositories for data access layer
//
// Store trait, filters and errors
pub mod store;
//
// Implementations
pub mod memory;
pub mod postgres;

pub use memory::MemoryDocumentStore;
pub use postgres::PgDocumentStore;
pub use store::{Filter, RecordStore, SortKey, StoreError, StoreResult};
