//! Placement DB Library
//!
//! Document persistence for portal records: the `RecordStore` trait, a Postgres
//! JSONB implementation and an in-memory implementation for tests and local runs.

pub mod db;

pub use db::{
    Filter, MemoryDocumentStore, PgDocumentStore, RecordStore, SortKey, StoreError, StoreResult,
};
