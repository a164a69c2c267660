//! `medrec-core`: identity foundation for clinical records.
//!
//! This crate contains the **pure domain** identity model (no infrastructure concerns):
//! record identity fields, the entity kind hierarchy, lazy proxies and the resolver
//! that decides when two representations denote the same record.

pub mod entity;
pub mod error;
pub mod id;
pub mod identity;
pub mod kind;
pub mod proxy;

pub use entity::{Entity, EntityBase, Record};
pub use error::{DomainError, DomainResult};
pub use id::{LocalId, new_instance_tag, new_record_uuid};
pub use kind::{EntityKind, KindDef, KindRegistry, KindRegistryBuilder};
pub use proxy::{Proxy, RecordLoader};
