//! Lazy stand-ins for records that have not been materialized yet.
//!
//! A [`Proxy`] knows which record it stands for (kind + local id) and which loader to
//! ask for it. It reveals its kind without loading. Anything needing record state,
//! including the uuid, materializes the target once through the loader handle the
//! proxy was created with. There is no ambient session: whoever hands out proxies
//! passes the loader in explicitly.

use core::any::Any;
use std::sync::{Arc, OnceLock};

use tracing::warn;

use crate::entity::Entity;
use crate::error::DomainResult;
use crate::id::{LocalId, new_instance_tag};
use crate::kind::EntityKind;

/// Capability to fetch the record behind a proxy.
pub trait RecordLoader: Send + Sync + core::fmt::Debug {
    fn materialize(&self, kind: EntityKind, local_id: LocalId) -> DomainResult<Arc<dyn Entity>>;
}

/// Placeholder for a record whose data is fetched on first use.
#[derive(Clone)]
pub struct Proxy {
    kind: EntityKind,
    local_id: LocalId,
    loader: Arc<dyn RecordLoader>,
    target: OnceLock<Option<Arc<dyn Entity>>>,
    instance_tag: u32,
}

impl Proxy {
    /// `kind` is the real concrete kind of the row, as known to the persistence layer.
    ///
    /// The kind is fixed for the proxy's lifetime: a target of any other kind, a subtype
    /// included, is discarded when the proxy initializes.
    pub fn new(kind: EntityKind, local_id: LocalId, loader: Arc<dyn RecordLoader>) -> Self {
        Self {
            kind,
            local_id,
            loader,
            target: OnceLock::new(),
            instance_tag: new_instance_tag(),
        }
    }

    /// Whether the target has been fetched (successfully or not).
    pub fn is_initialized(&self) -> bool {
        self.target.get().is_some()
    }

    /// The materialized record, fetching it on first call.
    ///
    /// A failed fetch is logged and remembered; the proxy then behaves as a record
    /// without a uuid.
    pub fn target(&self) -> Option<&Arc<dyn Entity>> {
        self.target
            .get_or_init(|| self.fetch())
            .as_ref()
    }

    fn fetch(&self) -> Option<Arc<dyn Entity>> {
        match self.loader.materialize(self.kind, self.local_id) {
            Ok(target) if target.kind() == self.kind => Some(target),
            Ok(target) => {
                warn!(
                    kind = %self.kind,
                    local_id = %self.local_id,
                    loaded_kind = %target.kind(),
                    "proxy target has an unexpected kind"
                );
                None
            }
            Err(err) => {
                warn!(
                    kind = %self.kind,
                    local_id = %self.local_id,
                    error = %err,
                    "failed to initialize proxy"
                );
                None
            }
        }
    }
}

impl Entity for Proxy {
    fn kind(&self) -> EntityKind {
        self.kind
    }

    fn uuid(&self) -> Option<&str> {
        self.target().and_then(|t| t.uuid())
    }

    fn local_id(&self) -> Option<LocalId> {
        Some(self.local_id)
    }

    fn instance_tag(&self) -> u32 {
        self.instance_tag
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_entity(&self) -> &dyn Entity {
        self
    }
}

impl core::fmt::Debug for Proxy {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Proxy")
            .field("kind", &self.kind)
            .field("local_id", &self.local_id)
            .field("initialized", &self.is_initialized())
            .finish()
    }
}

crate::entity_identity!(Proxy);

#[cfg(test)]
mod tests {
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::entity::{EntityBase, Record};
    use crate::error::DomainError;
    use crate::kind::KindDef;

    static PATIENT: KindDef = KindDef::root("Patient");
    static CONCEPT: KindDef = KindDef::root("Concept");
    static PERSON: KindDef = KindDef::root("Person");
    static ENROLLED: KindDef = KindDef::child("Enrolled", &PERSON);

    #[derive(Debug, Clone)]
    struct Patient {
        base: EntityBase,
    }

    impl Record for Patient {
        fn declared_kind() -> EntityKind {
            EntityKind::of(&PATIENT)
        }

        fn base(&self) -> &EntityBase {
            &self.base
        }

        fn base_mut(&mut self) -> &mut EntityBase {
            &mut self.base
        }
    }

    crate::entity_identity!(Patient);

    #[derive(Debug, Default)]
    struct FixedLoader {
        rows: Mutex<Vec<Arc<dyn Entity>>>,
        calls: AtomicUsize,
    }

    impl FixedLoader {
        fn with(row: Patient) -> Arc<Self> {
            let loader = Self::default();
            loader.rows.lock().unwrap().push(Arc::new(row));
            Arc::new(loader)
        }
    }

    impl RecordLoader for FixedLoader {
        fn materialize(&self, _kind: EntityKind, local_id: LocalId) -> DomainResult<Arc<dyn Entity>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.rows
                .lock()
                .unwrap()
                .iter()
                .find(|row| row.local_id() == Some(local_id))
                .cloned()
                .ok_or_else(|| DomainError::not_found(format!("row {local_id}")))
        }
    }

    fn id(raw: u32) -> LocalId {
        LocalId::new(raw).unwrap()
    }

    fn patient(raw: u32) -> Patient {
        Patient {
            base: EntityBase::with_local_id(id(raw)),
        }
    }

    #[test]
    fn kind_and_local_id_do_not_load() {
        let loader = FixedLoader::with(patient(2));
        let proxy = Proxy::new(EntityKind::of(&PATIENT), id(2), loader.clone());

        assert_eq!(proxy.kind(), EntityKind::of(&PATIENT));
        assert_eq!(proxy.local_id(), Some(id(2)));
        assert!(!proxy.is_initialized());
        assert_eq!(loader.calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn uuid_loads_the_target_once() {
        let row = patient(2);
        let expected = row.uuid().map(str::to_owned);
        let loader = FixedLoader::with(row);
        let proxy = Proxy::new(EntityKind::of(&PATIENT), id(2), loader.clone());

        assert_eq!(proxy.uuid().map(str::to_owned), expected);
        assert_eq!(proxy.uuid().map(str::to_owned), expected);
        assert!(proxy.is_initialized());
        assert_eq!(loader.calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn proxy_equals_its_materialized_record() {
        let row = patient(2);
        let loader = FixedLoader::with(row.clone());
        let proxy = Proxy::new(EntityKind::of(&PATIENT), id(2), loader);

        assert_eq!(proxy, row);
        assert_eq!(row, proxy);
    }

    #[test]
    fn missing_row_leaves_proxy_without_uuid() {
        let loader = FixedLoader::with(patient(2));
        let proxy = Proxy::new(EntityKind::of(&PATIENT), id(99), loader.clone());
        let other = Proxy::new(EntityKind::of(&PATIENT), id(99), loader);

        assert_eq!(proxy.uuid(), None);
        assert!(proxy.is_initialized());
        assert_eq!(proxy, proxy);
        assert_ne!(proxy, other);
        assert!(proxy.to_string().ends_with(",uuid=<null>]"));
    }

    #[test]
    fn target_of_unexpected_kind_is_discarded() {
        let loader = FixedLoader::with(patient(2));
        let proxy = Proxy::new(EntityKind::of(&CONCEPT), id(2), loader);

        assert!(proxy.target().is_none());
        assert_eq!(proxy.uuid(), None);
    }

    #[test]
    fn subtype_target_under_a_supertype_kind_is_discarded() {
        #[derive(Debug, Clone)]
        struct Enrolled {
            base: EntityBase,
        }

        impl Record for Enrolled {
            fn declared_kind() -> EntityKind {
                EntityKind::of(&ENROLLED)
            }

            fn base(&self) -> &EntityBase {
                &self.base
            }

            fn base_mut(&mut self) -> &mut EntityBase {
                &mut self.base
            }
        }

        let loader = FixedLoader::default();
        loader.rows.lock().unwrap().push(Arc::new(Enrolled {
            base: EntityBase::with_local_id(id(5)),
        }));
        let proxy = Proxy::new(EntityKind::of(&PERSON), id(5), Arc::new(loader));

        assert!(proxy.target().is_none());
        assert_eq!(proxy.kind(), EntityKind::of(&PERSON));
        assert_eq!(proxy.uuid(), None);
    }

    #[test]
    fn failed_proxy_digest_survives_a_move() {
        let loader = FixedLoader::with(patient(2));
        let proxy = Proxy::new(EntityKind::of(&PATIENT), id(99), loader);
        let before = proxy.to_string();

        let moved = Box::new(proxy);
        assert_eq!(moved.to_string(), before);
    }

    #[test]
    fn render_uses_the_revealed_kind() {
        let loader = FixedLoader::with(patient(2));
        let proxy = Proxy::new(EntityKind::of(&PATIENT), id(2), loader);

        assert!(proxy.to_string().starts_with("Patient[hashCode="));
    }
}
