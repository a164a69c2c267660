use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use medrec_core::{EntityBase, LocalId};

use crate::kinds::ENCOUNTER;

/// A single interaction between a patient and the care system.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Encounter {
    #[serde(flatten)]
    base: EntityBase,
    #[serde(default)]
    encounter_datetime: Option<DateTime<Utc>>,
    /// Local id of the patient seen.
    #[serde(default)]
    patient: Option<LocalId>,
}

impl Encounter {
    pub fn new() -> Self {
        Self {
            base: EntityBase::new(),
            encounter_datetime: None,
            patient: None,
        }
    }

    pub fn with_local_id(local_id: LocalId) -> Self {
        Self {
            base: EntityBase::with_local_id(local_id),
            ..Self::new()
        }
    }

    pub fn at(mut self, encounter_datetime: DateTime<Utc>) -> Self {
        self.encounter_datetime = Some(encounter_datetime);
        self
    }

    pub fn for_patient(mut self, patient: LocalId) -> Self {
        self.patient = Some(patient);
        self
    }

    pub fn encounter_datetime(&self) -> Option<DateTime<Utc>> {
        self.encounter_datetime
    }

    pub fn patient(&self) -> Option<LocalId> {
        self.patient
    }
}

impl Default for Encounter {
    fn default() -> Self {
        Self::new()
    }
}

impl_record!(Encounter, ENCOUNTER, base);

#[cfg(test)]
mod tests {
    use medrec_core::{Entity, Record, identity};

    use super::*;
    use crate::order::Order;

    fn id(raw: u32) -> LocalId {
        LocalId::new(raw).unwrap()
    }

    #[test]
    fn encounter_and_order_with_same_local_id_differ() {
        let encounter = Encounter::with_local_id(id(2));
        let order = Order::with_local_id(id(2));

        assert_ne!(encounter, order);
        assert_ne!(order, encounter);
    }

    #[test]
    fn encounter_and_order_with_same_uuid_differ() {
        let encounter = Encounter::new();
        let mut order = Order::new();
        order.set_uuid(encounter.uuid().map(str::to_owned));

        assert_ne!(encounter, order);
        assert_ne!(order, encounter);
    }

    #[test]
    fn encounter_is_not_equal_to_absent_value() {
        let encounter = Encounter::with_local_id(id(2));
        assert!(!identity::equals_opt(&encounter, None));
    }

    #[test]
    fn encounter_builder_sets_details() {
        let when = Utc::now();
        let encounter = Encounter::new().at(when).for_patient(id(7));

        assert_eq!(encounter.encounter_datetime(), Some(when));
        assert_eq!(encounter.patient(), Some(id(7)));
        assert_eq!(encounter.local_id(), None);
    }
}
