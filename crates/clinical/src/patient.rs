use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use medrec_core::{EntityBase, LocalId};

use crate::kinds::PATIENT;

/// A person receiving care.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Patient {
    #[serde(flatten)]
    base: EntityBase,
    given_name: String,
    family_name: String,
    #[serde(default)]
    birthdate: Option<NaiveDate>,
}

impl Patient {
    pub fn new(given_name: impl Into<String>, family_name: impl Into<String>) -> Self {
        Self {
            base: EntityBase::new(),
            given_name: given_name.into(),
            family_name: family_name.into(),
            birthdate: None,
        }
    }

    pub fn with_birthdate(mut self, birthdate: NaiveDate) -> Self {
        self.birthdate = Some(birthdate);
        self
    }

    pub fn given_name(&self) -> &str {
        &self.given_name
    }

    pub fn family_name(&self) -> &str {
        &self.family_name
    }

    pub fn birthdate(&self) -> Option<NaiveDate> {
        self.birthdate
    }

    /// Fresh patient already carrying a local id, as if read back from storage.
    pub fn with_local_id(
        local_id: LocalId,
        given_name: impl Into<String>,
        family_name: impl Into<String>,
    ) -> Self {
        Self {
            base: EntityBase::with_local_id(local_id),
            ..Self::new(given_name, family_name)
        }
    }
}

impl_record!(Patient, PATIENT, base);
