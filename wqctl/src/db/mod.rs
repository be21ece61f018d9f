//! Persistence layer.
//!
//! - [`store`]: the [`RecordStore`] contract and the [`Record`] trait for typed entities
//! - [`records`]: [`Records`], a typed repository over any store
//! - [`in_memory`]: process-local store, the default
//! - [`postgres`]: PostgreSQL store keeping records as JSONB documents
//! - [`models`]: the stored record types

pub mod errors;
pub mod in_memory;
pub mod models;
pub mod postgres;
pub mod records;
pub mod store;

pub use in_memory::InMemoryStore;
pub use postgres::PgRecordStore;
pub use records::Records;
pub use store::{Document, Record, RecordKind, RecordStore};
