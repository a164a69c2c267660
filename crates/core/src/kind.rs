//! Entity kinds: statically declared type tags with single-parent inheritance.
//!
//! Every record reports its real concrete kind through [`crate::Entity::kind`]. Kinds
//! are declared as `static` [`KindDef`]s, so the hierarchy is fixed at compile time and
//! walking it never allocates:
//!
//! ```ignore
//! pub static ORDER: KindDef = KindDef::root("Order");
//! pub static DRUG_ORDER: KindDef = KindDef::child("DrugOrder", &ORDER);
//! ```
//!
//! A [`KindRegistry`] is built once at startup from the declared kinds. It validates the
//! graph and precomputes each kind's lineage so the persistence layer can resolve kinds
//! by name and key rows by hierarchy root.

use core::any::Any;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use tracing::debug;

use crate::entity::Entity;
use crate::error::{DomainError, DomainResult};
use crate::proxy::Proxy;

/// Upper bound on hierarchy depth. Walks stop here even on a malformed graph.
pub const MAX_KIND_DEPTH: usize = 16;

type Recognizer = fn(&dyn Any) -> Option<&dyn Entity>;

fn recognize_as<T: Entity>(value: &dyn Any) -> Option<&dyn Entity> {
    value.downcast_ref::<T>().map(|v| v as &dyn Entity)
}

/// Static declaration of an entity kind.
pub struct KindDef {
    name: &'static str,
    parent: Option<&'static KindDef>,
    recognize: Option<Recognizer>,
}

impl KindDef {
    /// Declare a kind with no supertype.
    pub const fn root(name: &'static str) -> Self {
        Self {
            name,
            parent: None,
            recognize: None,
        }
    }

    /// Declare a kind that specializes `parent`.
    pub const fn child(name: &'static str, parent: &'static KindDef) -> Self {
        Self {
            name,
            parent: Some(parent),
            recognize: None,
        }
    }

    /// Bind the Rust type implementing this kind, so type-erased values of `T` are
    /// recognized as entities by [`KindRegistry::recognize`].
    pub const fn recognizing<T: Entity>(mut self) -> Self {
        self.recognize = Some(recognize_as::<T>);
        self
    }

    pub const fn name(&self) -> &'static str {
        self.name
    }
}

impl core::fmt::Debug for KindDef {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("KindDef")
            .field("name", &self.name)
            .field("parent", &self.parent.map(KindDef::name))
            .finish_non_exhaustive()
    }
}

/// Type tag of an entity. Two tags are equal iff they point at the same declaration.
#[derive(Clone, Copy)]
pub struct EntityKind(&'static KindDef);

impl EntityKind {
    pub const fn of(def: &'static KindDef) -> Self {
        Self(def)
    }

    pub fn name(self) -> &'static str {
        self.0.name
    }

    pub fn parent(self) -> Option<EntityKind> {
        self.0.parent.map(EntityKind)
    }

    /// Proper ancestors, nearest first.
    pub fn ancestors(self) -> Ancestors {
        Ancestors {
            next: self.parent(),
            remaining: MAX_KIND_DEPTH,
        }
    }

    /// Top of this kind's hierarchy (itself when it has no parent).
    pub fn root(self) -> EntityKind {
        self.ancestors().last().unwrap_or(self)
    }

    /// Number of proper ancestors.
    pub fn depth(self) -> usize {
        self.ancestors().count()
    }

    /// True when `other` is this kind or one of its descendants.
    pub fn is_assignable_from(self, other: EntityKind) -> bool {
        self == other || other.ancestors().any(|a| a == self)
    }

    /// True when either kind is assignable from the other.
    pub fn is_compatible_with(self, other: EntityKind) -> bool {
        self.is_assignable_from(other) || other.is_assignable_from(self)
    }
}

impl PartialEq for EntityKind {
    fn eq(&self, other: &Self) -> bool {
        core::ptr::eq(self.0, other.0)
    }
}

impl Eq for EntityKind {}

impl core::hash::Hash for EntityKind {
    fn hash<H: core::hash::Hasher>(&self, state: &mut H) {
        core::ptr::hash(self.0, state);
    }
}

impl core::fmt::Debug for EntityKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_tuple("EntityKind").field(&self.0.name).finish()
    }
}

impl core::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.0.name)
    }
}

impl From<&'static KindDef> for EntityKind {
    fn from(def: &'static KindDef) -> Self {
        Self(def)
    }
}

/// Iterator over a kind's proper ancestors.
#[derive(Debug, Clone)]
pub struct Ancestors {
    next: Option<EntityKind>,
    remaining: usize,
}

impl Iterator for Ancestors {
    type Item = EntityKind;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let current = self.next?;
        self.remaining -= 1;
        self.next = current.parent();
        Some(current)
    }
}

/// Validated set of kinds with precomputed lineages.
#[derive(Debug, Clone, Default)]
pub struct KindRegistry {
    kinds: Vec<EntityKind>,
    by_name: HashMap<&'static str, EntityKind>,
    /// Kind -> itself plus all of its ancestors.
    lineage: HashMap<EntityKind, HashSet<EntityKind>>,
}

impl KindRegistry {
    pub fn builder() -> KindRegistryBuilder {
        KindRegistryBuilder::default()
    }

    pub fn len(&self) -> usize {
        self.kinds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.kinds.is_empty()
    }

    /// Registered kinds in registration order.
    pub fn kinds(&self) -> &[EntityKind] {
        &self.kinds
    }

    pub fn contains(&self, kind: EntityKind) -> bool {
        self.lineage.contains_key(&kind)
    }

    pub fn by_name(&self, name: &str) -> Option<EntityKind> {
        self.by_name.get(name).copied()
    }

    /// Hierarchy root of a registered kind.
    pub fn root_of(&self, kind: EntityKind) -> Option<EntityKind> {
        self.contains(kind).then(|| kind.root())
    }

    /// Kind compatibility through the precomputed table.
    ///
    /// Falls back to walking the declarations when either kind is unregistered.
    pub fn is_compatible(&self, a: EntityKind, b: EntityKind) -> bool {
        match (self.lineage.get(&a), self.lineage.get(&b)) {
            (Some(la), Some(lb)) => la.contains(&b) || lb.contains(&a),
            _ => a.is_compatible_with(b),
        }
    }

    /// View a type-erased value as an entity.
    ///
    /// Recognizes proxies, `Arc<dyn Entity>` and `Box<dyn Entity>` carriers, and values
    /// of any registered kind declared with [`KindDef::recognizing`]. Everything else
    /// is not an entity.
    pub fn recognize<'a>(&self, value: &'a dyn Any) -> Option<&'a dyn Entity> {
        if let Some(proxy) = value.downcast_ref::<Proxy>() {
            return Some(proxy);
        }
        if let Some(shared) = value.downcast_ref::<Arc<dyn Entity>>() {
            return Some(shared.as_ref());
        }
        if let Some(boxed) = value.downcast_ref::<Box<dyn Entity>>() {
            return Some(boxed.as_ref());
        }
        self.kinds
            .iter()
            .filter_map(|k| k.0.recognize)
            .find_map(|recognize| recognize(value))
    }

    /// Registered kinds assignable to `kind` (itself and its descendants).
    pub fn descendants_of(&self, kind: EntityKind) -> impl Iterator<Item = EntityKind> + '_ {
        self.kinds
            .iter()
            .copied()
            .filter(move |k| self.lineage.get(k).is_some_and(|l| l.contains(&kind)))
    }
}

/// Collects kind declarations and validates them into a [`KindRegistry`].
#[derive(Debug, Default)]
pub struct KindRegistryBuilder {
    kinds: Vec<EntityKind>,
}

impl KindRegistryBuilder {
    pub fn register(mut self, def: &'static KindDef) -> Self {
        self.kinds.push(EntityKind::of(def));
        self
    }

    pub fn register_all(mut self, defs: impl IntoIterator<Item = &'static KindDef>) -> Self {
        self.kinds.extend(defs.into_iter().map(EntityKind::of));
        self
    }

    /// Validate the declared graph.
    ///
    /// Fails when two different declarations share a name, when a parent was not
    /// registered, or when a chain is cyclic or deeper than [`MAX_KIND_DEPTH`].
    /// Registering the same declaration twice is harmless.
    pub fn build(self) -> DomainResult<KindRegistry> {
        let mut registry = KindRegistry::default();

        for kind in self.kinds {
            match registry.by_name.get(kind.name()) {
                Some(existing) if *existing == kind => continue,
                Some(_) => {
                    return Err(DomainError::conflict(format!(
                        "kind '{}' declared more than once",
                        kind.name()
                    )));
                }
                None => {
                    registry.by_name.insert(kind.name(), kind);
                    registry.kinds.push(kind);
                }
            }
        }

        for &kind in &registry.kinds {
            let mut lineage = HashSet::from([kind]);
            let mut cursor = kind.parent();
            while let Some(parent) = cursor {
                if registry.by_name.get(parent.name()) != Some(&parent) {
                    return Err(DomainError::invariant(format!(
                        "kind '{}' extends unregistered kind '{}'",
                        kind.name(),
                        parent.name()
                    )));
                }
                if !lineage.insert(parent) || lineage.len() > MAX_KIND_DEPTH {
                    return Err(DomainError::invariant(format!(
                        "kind '{}' has a cyclic or too deep hierarchy",
                        kind.name()
                    )));
                }
                cursor = parent.parent();
            }
            registry.lineage.insert(kind, lineage);
        }

        debug!(kinds = registry.len(), "kind registry built");
        Ok(registry)
    }
}
