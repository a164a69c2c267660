use serde::{Deserialize, Serialize};

use medrec_core::{EntityBase, LocalId};

use crate::kinds::{CONCEPT, CONCEPT_NUMERIC};

/// Value type of observations coded against a concept.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConceptDatatype {
    Numeric,
    Coded,
    Text,
    Boolean,
    Date,
    #[serde(rename = "n/a")]
    NotApplicable,
}

/// A coded clinical term.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Concept {
    #[serde(flatten)]
    base: EntityBase,
    name: String,
    datatype: ConceptDatatype,
}

impl Concept {
    pub fn new(name: impl Into<String>, datatype: ConceptDatatype) -> Self {
        Self {
            base: EntityBase::new(),
            name: name.into(),
            datatype,
        }
    }

    pub fn with_local_id(
        local_id: LocalId,
        name: impl Into<String>,
        datatype: ConceptDatatype,
    ) -> Self {
        Self {
            base: EntityBase::with_local_id(local_id),
            name: name.into(),
            datatype,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn datatype(&self) -> ConceptDatatype {
        self.datatype
    }
}

impl_record!(Concept, CONCEPT, base);

/// A concept whose observations are numbers, with reference ranges.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConceptNumeric {
    #[serde(flatten)]
    concept: Concept,
    #[serde(default)]
    units: Option<String>,
    #[serde(default)]
    low_normal: Option<f64>,
    #[serde(default)]
    hi_normal: Option<f64>,
}

impl ConceptNumeric {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            concept: Concept::new(name, ConceptDatatype::Numeric),
            units: None,
            low_normal: None,
            hi_normal: None,
        }
    }

    pub fn with_units(mut self, units: impl Into<String>) -> Self {
        self.units = Some(units.into());
        self
    }

    pub fn with_normal_range(mut self, low: f64, hi: f64) -> Self {
        self.low_normal = Some(low);
        self.hi_normal = Some(hi);
        self
    }

    /// The concept part of this record.
    pub fn concept(&self) -> &Concept {
        &self.concept
    }

    pub fn units(&self) -> Option<&str> {
        self.units.as_deref()
    }

    /// Whether `value` lies inside the normal range. Open bounds always pass.
    pub fn is_normal(&self, value: f64) -> bool {
        self.low_normal.is_none_or(|low| value >= low)
            && self.hi_normal.is_none_or(|hi| value <= hi)
    }
}

impl_record!(ConceptNumeric, CONCEPT_NUMERIC, concept.base);
