//! Persistence-side collaborator of the identity model.
//!
//! An in-memory session that stores records, issues local ids on first save and hands
//! out lazy [`Proxy`](medrec_core::Proxy) values bound to itself. Intended for tests
//! and dev; it has no transactions, flushing or queries.

pub mod config;
pub mod error;
pub mod session;

pub use config::SessionConfig;
pub use error::SessionError;
pub use session::InMemorySession;
