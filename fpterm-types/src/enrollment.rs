//! Fingerprint library positions

use std::fmt;

use crate::error::{Error, Result};

/// Index into the module's template library, always within `0..=MAX`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct StoragePosition(u16);

impl StoragePosition {
    /// Highest position of a 176-slot library
    pub const MAX: u16 = 175;

    pub const FIRST: Self = Self(0);

    pub fn new(position: u16) -> Result<Self> {
        if position > Self::MAX {
            return Err(Error::Validation(format!(
                "storage position {} exceeds {}",
                position,
                Self::MAX
            )));
        }
        Ok(Self(position))
    }

    pub fn get(self) -> u16 {
        self.0
    }

    /// Following position, wrapping to 0 past [`StoragePosition::MAX`]
    pub fn next(self) -> Self {
        if self.0 >= Self::MAX {
            Self::FIRST
        } else {
            Self(self.0 + 1)
        }
    }
}

impl TryFrom<u16> for StoragePosition {
    type Error = Error;

    fn try_from(value: u16) -> Result<Self> {
        Self::new(value)
    }
}

impl From<StoragePosition> for u16 {
    fn from(position: StoragePosition) -> u16 {
        position.0
    }
}

impl fmt::Display for StoragePosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Where the next enrolled template goes
///
/// Owned by the controller and advanced only after a template has been
/// stored successfully.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnrollmentRecord {
    position: StoragePosition,
    enrolled: u32,
}

impl EnrollmentRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resume from a known position, e.g. after counting stored templates
    pub fn starting_at(position: StoragePosition) -> Self {
        Self {
            position,
            enrolled: 0,
        }
    }

    /// Position the next enrollment will store to
    pub fn position(&self) -> StoragePosition {
        self.position
    }

    /// Templates stored since this record was created
    pub fn enrolled(&self) -> u32 {
        self.enrolled
    }

    /// Record a successful store and move to the following slot
    pub fn advance(&mut self) -> StoragePosition {
        let stored = self.position;
        self.position = stored.next();
        self.enrolled = self.enrolled.saturating_add(1);
        stored
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_position_bounds() {
        assert!(StoragePosition::new(0).is_ok());
        assert!(StoragePosition::new(175).is_ok());
        assert!(matches!(StoragePosition::new(176), Err(Error::Validation(_))));
    }

    #[test]
    fn test_position_wraps_after_max() {
        let last = StoragePosition::new(175).unwrap();
        assert_eq!(last.next(), StoragePosition::FIRST);
        assert_eq!(StoragePosition::new(3).unwrap().next().get(), 4);
    }

    #[test]
    fn test_record_advance() {
        let mut record = EnrollmentRecord::new();
        assert_eq!(record.position().get(), 0);

        let stored = record.advance();
        assert_eq!(stored.get(), 0);
        assert_eq!(record.position().get(), 1);
        assert_eq!(record.enrolled(), 1);
    }

    #[test]
    fn test_record_never_exceeds_max() {
        let mut record = EnrollmentRecord::new();
        for _ in 0..1000 {
            assert!(record.advance().get() <= StoragePosition::MAX);
        }
        // 1000 = 5 * 176 + 120
        assert_eq!(record.position().get(), 120);
    }
}
