//! Identity fields carried by every persistent record.

use core::num::NonZeroU32;
use core::str::FromStr;
use core::sync::atomic::{AtomicU32, Ordering};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::DomainError;

/// Generate a fresh record uuid (random v4, lowercase hyphenated).
pub fn new_record_uuid() -> String {
    Uuid::new_v4().hyphenated().to_string()
}

static INSTANCE_TAGS: AtomicU32 = AtomicU32::new(1);

/// Per-instance tag standing in for object identity when a record has no uuid.
///
/// Tags are issued from a process-wide counter and scrambled, so they survive moves
/// and never depend on where a value lives.
pub fn new_instance_tag() -> u32 {
    INSTANCE_TAGS
        .fetch_add(1, Ordering::Relaxed)
        .wrapping_mul(0x9E37_79B9)
}

/// Locally unique numeric identifier assigned by the persistence layer on first save.
///
/// Never used for equality between records; see [`crate::identity`].
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LocalId(NonZeroU32);

macro_rules! impl_numeric_id {
    ($t:ty, $name:literal) => {
        impl $t {
            /// Create an identifier from a raw value. Zero is not a valid id.
            pub fn new(value: u32) -> Result<Self, DomainError> {
                NonZeroU32::new(value)
                    .map(Self)
                    .ok_or_else(|| DomainError::invalid_id(format!("{}: must be positive", $name)))
            }

            pub fn get(self) -> u32 {
                self.0.get()
            }

            /// The identifier that follows this one in an id sequence.
            pub fn next(self) -> Option<Self> {
                self.0.checked_add(1).map(Self)
            }
        }

        impl core::fmt::Display for $t {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                core::fmt::Display::fmt(&self.0, f)
            }
        }

        impl From<NonZeroU32> for $t {
            fn from(value: NonZeroU32) -> Self {
                Self(value)
            }
        }

        impl From<$t> for u32 {
            fn from(value: $t) -> Self {
                value.0.get()
            }
        }

        impl TryFrom<u32> for $t {
            type Error = DomainError;

            fn try_from(value: u32) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }

        impl FromStr for $t {
            type Err = DomainError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let raw = u32::from_str(s)
                    .map_err(|e| DomainError::invalid_id(format!("{}: {}", $name, e)))?;
                Self::new(raw)
            }
        }
    };
}

impl_numeric_id!(LocalId, "LocalId");
