//! Report-assembly core
//!
//! Takes flat, paginated record sets (projects, tasks, comments) from a
//! remote document store and reconstructs a consistent, ordered,
//! filtered tree of project -> task-hierarchy -> comment-list.
//!
//! Pipeline: query parameters -> filter resolution ([`ReportQuery`]) ->
//! batched fetching ([`RecordFetcher`]) -> per-project tree building
//! ([`build_forest`]) -> assembly and ordering ([`ReportAssembler`]).
//!
//! # Quick start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use worklens_report::{ReportAssembler, ReportQuery};
//! use worklens_store::FrappeClient;
//!
//! let store = Arc::new(FrappeClient::from_env()?);
//! let assembler = ReportAssembler::new(store);
//! let query = ReportQuery::new().with_company("Acme");
//! let report = assembler.assemble(&query).await?;
//! ```

pub mod assemble;
pub mod error;
pub mod fetch;
pub mod query;
pub mod tree;

pub use assemble::{ReportAssembler, Strategy};
pub use error::ReportError;
pub use fetch::{FetchLimits, RecordFetcher};
pub use query::{ReportQuery, ResolvedFilter};
pub use tree::build_forest;
