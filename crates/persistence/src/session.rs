//! In-memory record session.

use std::collections::HashMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use tracing::debug;

use medrec_core::{
    DomainError, DomainResult, Entity, EntityKind, KindRegistry, LocalId, Proxy, Record,
    RecordLoader,
};

use crate::config::SessionConfig;
use crate::error::SessionError;

/// Local ids are unique per hierarchy root, so a `DrugOrder` and an `Order` never share
/// one while an `Order` and an `Encounter` may.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
struct RowKey {
    root: EntityKind,
    local_id: LocalId,
}

#[derive(Debug, Default)]
struct Tables {
    rows: HashMap<RowKey, Arc<dyn Entity>>,
    by_uuid: HashMap<String, RowKey>,
    next_id: HashMap<EntityKind, LocalId>,
}

impl Tables {
    fn allocate(&mut self, root: EntityKind, first: LocalId) -> Result<LocalId, SessionError> {
        let id = self.next_id.get(&root).copied().unwrap_or(first);
        let next = id.next().ok_or(SessionError::IdsExhausted(root.name()))?;
        self.next_id.insert(root, next);
        Ok(id)
    }

    /// Keep the sequence ahead of an id chosen by the caller.
    fn reserve(&mut self, root: EntityKind, id: LocalId, first: LocalId) {
        let current = self.next_id.get(&root).copied().unwrap_or(first);
        if let Some(next) = id.next().filter(|_| id >= current) {
            self.next_id.insert(root, next);
        }
    }
}

#[derive(Debug)]
struct SessionState {
    registry: Arc<KindRegistry>,
    config: SessionConfig,
    tables: RwLock<Tables>,
}

impl SessionState {
    fn read(&self) -> Result<RwLockReadGuard<'_, Tables>, SessionError> {
        self.tables.read().map_err(|_| SessionError::Poisoned)
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Tables>, SessionError> {
        self.tables.write().map_err(|_| SessionError::Poisoned)
    }

    fn key(&self, kind: EntityKind, local_id: LocalId) -> Result<RowKey, SessionError> {
        let root = self
            .registry
            .root_of(kind)
            .ok_or(SessionError::UnknownKind(kind.name()))?;
        Ok(RowKey { root, local_id })
    }
}

impl RecordLoader for SessionState {
    fn materialize(&self, kind: EntityKind, local_id: LocalId) -> DomainResult<Arc<dyn Entity>> {
        let key = self
            .key(kind, local_id)
            .map_err(|e| DomainError::invariant(e.to_string()))?;
        let tables = self
            .read()
            .map_err(|e| DomainError::invariant(e.to_string()))?;

        let row = tables
            .rows
            .get(&key)
            .cloned()
            .ok_or_else(|| DomainError::not_found(format!("{kind} #{local_id}")))?;

        debug!(session = %self.config.name, %kind, %local_id, "materialized record");
        Ok(row)
    }
}

/// Shared handle to an in-memory record store.
///
/// Cloning is cheap; clones see the same records. Proxies handed out by [`load`]
/// keep the store alive and read from it when first dereferenced.
///
/// [`load`]: InMemorySession::load
#[derive(Debug, Clone)]
pub struct InMemorySession {
    inner: Arc<SessionState>,
}

impl InMemorySession {
    pub fn new(registry: Arc<KindRegistry>, config: SessionConfig) -> Self {
        Self {
            inner: Arc::new(SessionState {
                registry,
                config,
                tables: RwLock::new(Tables::default()),
            }),
        }
    }

    pub fn registry(&self) -> &KindRegistry {
        &self.inner.registry
    }

    pub fn config(&self) -> &SessionConfig {
        &self.inner.config
    }

    /// Store a snapshot of `entity`.
    ///
    /// On first save the next local id of the kind's hierarchy is assigned to `entity`
    /// (unless it already carries one). Saving again replaces the snapshot under the
    /// same id. The uuid is required and must be unique across the session. A local id
    /// chosen by the caller must not already hold a row with another uuid, which also
    /// rules out changing the uuid of a saved record.
    pub fn save<E: Record>(&self, entity: &mut E) -> Result<LocalId, SessionError> {
        let state = &self.inner;
        let kind = entity.kind();
        let root = state
            .registry
            .root_of(kind)
            .ok_or(SessionError::UnknownKind(kind.name()))?;
        let uuid = entity
            .uuid()
            .ok_or(SessionError::MissingUuid(kind.name()))?
            .to_owned();
        let first = state.config.first_local_id;

        let mut tables = state.write()?;
        let existing = tables.by_uuid.get(&uuid).copied();

        let local_id = match (entity.local_id(), existing) {
            (Some(id), Some(key)) if key == (RowKey { root, local_id: id }) => {
                let stored = tables.rows.get(&key).map(|row| row.kind());
                if let Some(actual) = stored.filter(|actual| *actual != kind) {
                    return Err(SessionError::WrongKind {
                        requested: kind.name(),
                        actual: actual.name(),
                    });
                }
                id
            }
            (_, Some(_)) => return Err(SessionError::DuplicateUuid(uuid)),
            (Some(id), None) => {
                let taken = tables.rows.get(&RowKey { root, local_id: id });
                if let Some(row) = taken {
                    return Err(SessionError::LocalIdTaken {
                        kind: kind.name(),
                        local_id: id,
                        stored_uuid: row.uuid().unwrap_or_default().to_owned(),
                    });
                }
                tables.reserve(root, id, first);
                id
            }
            (None, None) => tables.allocate(root, first)?,
        };

        entity.assign_local_id(local_id)?;

        let key = RowKey { root, local_id };
        tables.rows.insert(key, Arc::new(entity.clone()));
        tables.by_uuid.insert(uuid, key);

        debug!(session = %state.config.name, %kind, %local_id, "saved record");
        Ok(local_id)
    }

    /// Materialized record stored under `kind`'s hierarchy, if it is a `kind`.
    pub fn get(
        &self,
        kind: EntityKind,
        local_id: LocalId,
    ) -> Result<Option<Arc<dyn Entity>>, SessionError> {
        let key = self.inner.key(kind, local_id)?;
        let tables = self.inner.read()?;
        Ok(tables
            .rows
            .get(&key)
            .filter(|row| kind.is_assignable_from(row.kind()))
            .cloned())
    }

    /// Typed copy of a stored record whose concrete type is exactly `E`.
    pub fn get_as<E: Record>(&self, local_id: LocalId) -> Result<Option<E>, SessionError> {
        Ok(self
            .get(E::declared_kind(), local_id)?
            .and_then(|row| row.as_any().downcast_ref::<E>().cloned()))
    }

    /// Lazy reference to a record; nothing is materialized until the proxy needs state.
    ///
    /// The proxy reveals the stored record's real kind, which may be a subtype of
    /// `kind`. For an unknown id the proxy carries `kind` and will fail to initialize.
    pub fn load(&self, kind: EntityKind, local_id: LocalId) -> Result<Proxy, SessionError> {
        let key = self.inner.key(kind, local_id)?;
        let real_kind = {
            let tables = self.inner.read()?;
            match tables.rows.get(&key).map(|row| row.kind()) {
                Some(actual) if kind.is_assignable_from(actual) => actual,
                Some(actual) => {
                    return Err(SessionError::WrongKind {
                        requested: kind.name(),
                        actual: actual.name(),
                    });
                }
                None => kind,
            }
        };

        debug!(session = %self.inner.config.name, kind = %real_kind, %local_id, "created proxy");
        let loader: Arc<dyn RecordLoader> = self.inner.clone();
        Ok(Proxy::new(real_kind, local_id, loader))
    }

    pub fn find_by_uuid(&self, uuid: &str) -> Result<Option<Arc<dyn Entity>>, SessionError> {
        let tables = self.inner.read()?;
        Ok(tables
            .by_uuid
            .get(uuid)
            .and_then(|key| tables.rows.get(key))
            .cloned())
    }

    pub fn len(&self) -> Result<usize, SessionError> {
        Ok(self.inner.read()?.rows.len())
    }

    pub fn is_empty(&self) -> Result<bool, SessionError> {
        Ok(self.len()? == 0)
    }
}
