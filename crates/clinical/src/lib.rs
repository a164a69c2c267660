//! Clinical record kinds.
//!
//! Concrete records of the clinical domain and the kind graph they are declared in.
//! Each record embeds an [`EntityBase`](medrec_core::EntityBase) and gets identity
//! semantics from `medrec-core`; subtypes embed their supertype record.

macro_rules! impl_record {
    ($t:ty, $kind:path, $($base:ident).+) => {
        impl medrec_core::Record for $t {
            fn declared_kind() -> medrec_core::EntityKind {
                medrec_core::EntityKind::of(&$kind)
            }

            fn base(&self) -> &medrec_core::EntityBase {
                &self.$($base).+
            }

            fn base_mut(&mut self) -> &mut medrec_core::EntityBase {
                &mut self.$($base).+
            }
        }

        medrec_core::entity_identity!($t);
    };
}

pub mod concept;
pub mod encounter;
pub mod kinds;
pub mod order;
pub mod patient;

pub use concept::{Concept, ConceptDatatype, ConceptNumeric};
pub use encounter::Encounter;
pub use order::{DrugOrder, Order, OrderAction, OrderFrequency};
pub use patient::Patient;
