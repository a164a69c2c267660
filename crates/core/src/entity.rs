//! Entity trait: identity + continuity across state changes.
//!
//! Every persistent record, materialized or proxied, is an [`Entity`]. Concrete record
//! types embed an [`EntityBase`] holding the two identity fields and implement
//! [`Record`]; they then get [`Entity`] for free and pick up identity-based
//! `PartialEq`/`Eq`/`Hash`/`Display` through [`entity_identity!`](crate::entity_identity).

use core::any::Any;
use serde::{Deserialize, Serialize};

use crate::error::{DomainError, DomainResult};
use crate::id::{LocalId, new_instance_tag, new_record_uuid};
use crate::identity;
use crate::kind::EntityKind;

/// Anything that stands for a persistent record.
///
/// `kind` must report the real concrete kind without loading data; proxies answer it
/// from what the persistence layer told them at creation.
pub trait Entity: core::fmt::Debug + Send + Sync + 'static {
    fn kind(&self) -> EntityKind;

    /// Globally unique identity token. `None` only after an explicit reset.
    fn uuid(&self) -> Option<&str>;

    /// Identifier assigned by the persistence layer on first save.
    fn local_id(&self) -> Option<LocalId>;

    /// Stable per-instance tag, used for the digest of a record without a uuid.
    fn instance_tag(&self) -> u32;

    fn as_any(&self) -> &dyn Any;

    fn as_entity(&self) -> &dyn Entity;
}

/// Identity fields shared by every concrete record.
///
/// Besides the persisted uuid and local id, each base carries an instance tag that is
/// never serialized. A clone is a new instance and gets a new tag.
#[derive(Debug, Serialize, Deserialize)]
pub struct EntityBase {
    #[serde(default)]
    uuid: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    local_id: Option<LocalId>,
    #[serde(skip, default = "new_instance_tag")]
    instance_tag: u32,
}

impl EntityBase {
    /// Fresh, transient identity: a new uuid and no local id.
    pub fn new() -> Self {
        Self {
            uuid: Some(new_record_uuid()),
            local_id: None,
            instance_tag: new_instance_tag(),
        }
    }

    /// Fresh uuid for a record whose local id is already known.
    pub fn with_local_id(local_id: LocalId) -> Self {
        Self {
            uuid: Some(new_record_uuid()),
            local_id: Some(local_id),
            instance_tag: new_instance_tag(),
        }
    }

    /// Identity exactly as stored; nothing is generated.
    pub fn from_parts(uuid: Option<String>, local_id: Option<LocalId>) -> Self {
        Self {
            uuid,
            local_id,
            instance_tag: new_instance_tag(),
        }
    }

    pub fn uuid(&self) -> Option<&str> {
        self.uuid.as_deref()
    }

    /// Replace the uuid.
    ///
    /// Resetting to `None` is tolerated by equality and hashing but leaves the record
    /// equal only to itself. Do not change the uuid of a record used as a hash key.
    pub fn set_uuid(&mut self, uuid: Option<String>) {
        self.uuid = uuid;
    }

    pub fn local_id(&self) -> Option<LocalId> {
        self.local_id
    }

    pub fn instance_tag(&self) -> u32 {
        self.instance_tag
    }

    /// Record the local id issued on first save. Assigning the same id again is a
    /// no-op; a different id is rejected.
    pub fn assign_local_id(&mut self, local_id: LocalId) -> DomainResult<()> {
        match self.local_id {
            None => {
                self.local_id = Some(local_id);
                Ok(())
            }
            Some(existing) if existing == local_id => Ok(()),
            Some(existing) => Err(DomainError::invariant(format!(
                "local id already assigned ({existing}), refusing {local_id}"
            ))),
        }
    }
}

impl Clone for EntityBase {
    fn clone(&self) -> Self {
        Self::from_parts(self.uuid.clone(), self.local_id)
    }
}

impl Default for EntityBase {
    fn default() -> Self {
        Self::new()
    }
}

/// A concrete, materialized record type.
pub trait Record: core::fmt::Debug + Clone + Send + Sync + 'static {
    /// Kind tag of this type.
    fn declared_kind() -> EntityKind;

    fn base(&self) -> &EntityBase;

    fn base_mut(&mut self) -> &mut EntityBase;

    fn set_uuid(&mut self, uuid: Option<String>) {
        self.base_mut().set_uuid(uuid);
    }

    fn assign_local_id(&mut self, local_id: LocalId) -> DomainResult<()> {
        self.base_mut().assign_local_id(local_id)
    }
}

impl<R: Record> Entity for R {
    fn kind(&self) -> EntityKind {
        R::declared_kind()
    }

    fn uuid(&self) -> Option<&str> {
        self.base().uuid()
    }

    fn local_id(&self) -> Option<LocalId> {
        self.base().local_id()
    }

    fn instance_tag(&self) -> u32 {
        self.base().instance_tag()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_entity(&self) -> &dyn Entity {
        self
    }
}

/// Implement identity-based `PartialEq`, `Eq`, `Hash` and `Display` for entity types.
///
/// Equality accepts any other entity on the right-hand side, so a supertype compares
/// against its subtypes and a record against a proxy of itself.
#[macro_export]
macro_rules! entity_identity {
    ($($t:ty),+ $(,)?) => {
        $(
            impl<T: $crate::Entity + ?Sized> ::core::cmp::PartialEq<T> for $t {
                fn eq(&self, other: &T) -> bool {
                    $crate::identity::equals(self, other.as_entity())
                }
            }

            impl ::core::cmp::Eq for $t {}

            impl ::core::hash::Hash for $t {
                fn hash<H: ::core::hash::Hasher>(&self, state: &mut H) {
                    state.write_u32($crate::identity::digest(self));
                }
            }

            impl ::core::fmt::Display for $t {
                fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                    f.write_str(&$crate::identity::render(self))
                }
            }
        )+
    };
}

impl<T: Entity + ?Sized> PartialEq<T> for dyn Entity {
    fn eq(&self, other: &T) -> bool {
        identity::equals(self, other.as_entity())
    }
}

impl Eq for dyn Entity {}

impl core::hash::Hash for dyn Entity {
    fn hash<H: core::hash::Hasher>(&self, state: &mut H) {
        state.write_u32(identity::digest(self));
    }
}

impl core::fmt::Display for dyn Entity {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&identity::render(self))
    }
}
