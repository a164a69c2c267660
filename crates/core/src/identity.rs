//! Identity resolution shared by every record.
//!
//! Two entity values denote the same record when their real kinds are compatible (equal,
//! or one an ancestor of the other) and both carry the same uuid. Proxies take part
//! through [`Entity::kind`], which they answer without loading. The local id is never
//! consulted.
//!
//! These functions are total: no input makes them fail or panic.
//!
//! Equality is reflexive and symmetric. It is not transitive across siblings: with
//! `DrugOrder` and `TestOrder` both under `Order`, a drug order and a test order sharing
//! a uuid each equal an `Order` with that uuid but not each other.

use core::any::Any;

use tracing::trace;

use crate::entity::Entity;
use crate::kind::KindRegistry;

/// Placeholder rendered for an absent uuid.
pub const NULL_UUID: &str = "<null>";

/// Whether `this` and `other` denote the same record.
pub fn equals(this: &dyn Entity, other: &dyn Entity) -> bool {
    if same_instance(this, other) {
        return true;
    }

    let (this_kind, other_kind) = (this.kind(), other.kind());
    if !this_kind.is_compatible_with(other_kind) {
        trace!(left = %this_kind, right = %other_kind, "incompatible kinds");
        return false;
    }

    match (this.uuid(), other.uuid()) {
        (Some(a), Some(b)) => a == b,
        _ => false,
    }
}

/// [`equals`] against a value that may be absent.
pub fn equals_opt(this: &dyn Entity, other: Option<&dyn Entity>) -> bool {
    other.is_some_and(|other| equals(this, other))
}

/// [`equals`] against an arbitrary value; values the registry does not recognize as
/// entities are never equal.
pub fn equals_any(registry: &KindRegistry, this: &dyn Entity, other: &dyn Any) -> bool {
    registry
        .recognize(other)
        .is_some_and(|other| equals(this, other))
}

/// Identity digest: DJB2 over the uuid, or the instance tag when there is none.
///
/// Both inputs are part of the value, so the digest does not change when the value
/// moves. It does change when the uuid is set or reset, so records without a uuid
/// must not be used as hash keys until one is assigned.
pub fn digest(entity: &dyn Entity) -> u32 {
    match entity.uuid() {
        Some(uuid) => djb2(uuid.as_bytes()),
        None => entity.instance_tag(),
    }
}

/// Debug rendering: `Kind[hashCode=<hex digest>,uuid=<uuid or <null>>]`.
pub fn render(entity: &dyn Entity) -> String {
    format!(
        "{}[hashCode={:x},uuid={}]",
        entity.kind(),
        digest(entity),
        entity.uuid().unwrap_or(NULL_UUID)
    )
}

fn same_instance(a: &dyn Entity, b: &dyn Entity) -> bool {
    // A record and a base embedded at offset zero share an address.
    core::ptr::addr_eq(a, b) && a.kind() == b.kind()
}

fn djb2(bytes: &[u8]) -> u32 {
    let mut hash: u32 = 5381;
    for &b in bytes {
        hash = hash.wrapping_mul(33).wrapping_add(b as u32);
    }
    hash
}
