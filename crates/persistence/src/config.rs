//! Session configuration.

use core::num::NonZeroU32;

use medrec_core::LocalId;

/// In-memory session configuration.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Name for logging
    pub name: String,
    /// First local id issued in every hierarchy
    pub first_local_id: LocalId,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            name: "medrec-session".to_string(),
            first_local_id: LocalId::from(NonZeroU32::MIN),
        }
    }
}

impl SessionConfig {
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_first_local_id(mut self, first: LocalId) -> Self {
        self.first_local_id = first;
        self
    }
}
