//! Remote document-store abstraction
//!
//! The report pipeline consumes the store through one seam: a filtered,
//! paginated "list records of a kind" capability ([`RecordStore`]).
//! This crate provides the query model for that seam, a REST-backed
//! implementation for Frappe-style backends, and an in-memory
//! implementation with full operator semantics for tests and local runs.

pub mod error;
pub mod filter;
pub mod frappe;
pub mod memory;
pub mod store;

pub use error::StoreError;
pub use filter::{FieldFilter, FilterValue, Operator, OrderBy, SortOrder};
pub use frappe::{FrappeClient, FrappeConfig};
pub use memory::MemoryStore;
pub use store::{ListQuery, RecordKind, RecordStore};
