//! Declared kind graph of the clinical domain.
//!
//! ```text
//! Patient
//! Encounter
//! Concept
//! └── ConceptNumeric
//! Order
//! └── DrugOrder
//! OrderFrequency
//! ```

use medrec_core::{DomainResult, KindDef, KindRegistry};

use crate::concept::{Concept, ConceptNumeric};
use crate::encounter::Encounter;
use crate::order::{DrugOrder, Order, OrderFrequency};
use crate::patient::Patient;

pub static PATIENT: KindDef = KindDef::root("Patient").recognizing::<Patient>();
pub static ENCOUNTER: KindDef = KindDef::root("Encounter").recognizing::<Encounter>();
pub static CONCEPT: KindDef = KindDef::root("Concept").recognizing::<Concept>();
pub static CONCEPT_NUMERIC: KindDef =
    KindDef::child("ConceptNumeric", &CONCEPT).recognizing::<ConceptNumeric>();
pub static ORDER: KindDef = KindDef::root("Order").recognizing::<Order>();
pub static DRUG_ORDER: KindDef = KindDef::child("DrugOrder", &ORDER).recognizing::<DrugOrder>();
pub static ORDER_FREQUENCY: KindDef =
    KindDef::root("OrderFrequency").recognizing::<OrderFrequency>();

/// Every clinical kind, parents before children.
pub fn all() -> [&'static KindDef; 7] {
    [
        &PATIENT,
        &ENCOUNTER,
        &CONCEPT,
        &CONCEPT_NUMERIC,
        &ORDER,
        &DRUG_ORDER,
        &ORDER_FREQUENCY,
    ]
}

/// Registry of the clinical kinds.
pub fn registry() -> DomainResult<KindRegistry> {
    KindRegistry::builder().register_all(all()).build()
}
