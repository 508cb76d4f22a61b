//! Entity storage.
//!
//! The [`EntityStore`] trait is the only shared mutable state of a run.
//! Stages read full snapshots and hand back a [`WriteSet`], which the store
//! applies in one step so a failed stage leaves no partial writes behind.
//!
//! Runs against one institute are serialized with a [`RunLease`]: while a
//! lease is held, a second acquire fails with
//! [`StoreError::Busy`](crate::error::StoreError::Busy).

mod memory;

pub use memory::{InstituteData, MemoryStore};

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::StoreResult;
use crate::models::{Faculty, Section, Subject, Venue};

/// Per-institute run state.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Metadata {
    /// Lunch periods already placed on the current skeleton.
    #[serde(default)]
    pub lunch_assigned: bool,
}

/// Writes of one stage, applied together.
///
/// `faculty` and `subjects` replace the stored lists when present. Sections
/// and venues are upserted by ID. With `replace` set, the institute is
/// emptied first.
#[derive(Debug, Clone, Default)]
pub struct WriteSet {
    pub replace: bool,
    pub faculty: Option<Vec<Faculty>>,
    pub subjects: Option<Vec<Subject>>,
    pub sections: Vec<Section>,
    pub venues: Vec<Venue>,
    pub metadata: Option<Metadata>,
}

impl WriteSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Empties the institute before applying.
    pub fn replacing(mut self) -> Self {
        self.replace = true;
        self
    }

    pub fn with_faculty(mut self, faculty: Vec<Faculty>) -> Self {
        self.faculty = Some(faculty);
        self
    }

    pub fn with_subjects(mut self, subjects: Vec<Subject>) -> Self {
        self.subjects = Some(subjects);
        self
    }

    pub fn with_sections(mut self, sections: Vec<Section>) -> Self {
        self.sections = sections;
        self
    }

    pub fn with_venues(mut self, venues: Vec<Venue>) -> Self {
        self.venues = venues;
        self
    }

    pub fn with_metadata(mut self, metadata: Metadata) -> Self {
        self.metadata = Some(metadata);
        self
    }

    /// Whether applying this would change nothing.
    pub fn is_empty(&self) -> bool {
        !self.replace
            && self.faculty.is_none()
            && self.subjects.is_none()
            && self.sections.is_empty()
            && self.venues.is_empty()
            && self.metadata.is_none()
    }
}

/// Keyed storage scoped by institute.
///
/// Reads return everything stored for the institute, or an empty list when
/// nothing is. Sections and venues come back ordered by ID.
pub trait EntityStore {
    fn faculty(&self, institute: &str) -> StoreResult<Vec<Faculty>>;

    fn subjects(&self, institute: &str) -> StoreResult<Vec<Subject>>;

    fn sections(&self, institute: &str) -> StoreResult<Vec<Section>>;

    fn venues(&self, institute: &str) -> StoreResult<Vec<Venue>>;

    fn metadata(&self, institute: &str) -> StoreResult<Metadata>;

    /// Applies every write or none.
    fn commit(&self, institute: &str, writes: WriteSet) -> StoreResult<()>;

    /// Takes the run lock of an institute. Fails with `Busy` when held.
    fn acquire(&self, institute: &str) -> StoreResult<()>;

    /// Releases the run lock of an institute.
    fn release(&self, institute: &str) -> StoreResult<()>;
}

/// Run lock released on drop.
#[derive(Debug)]
pub struct RunLease<'a, S: EntityStore + ?Sized> {
    store: &'a S,
    institute: String,
}

impl<'a, S: EntityStore + ?Sized> RunLease<'a, S> {
    /// Acquires the run lock of `institute`.
    pub fn acquire(store: &'a S, institute: &str) -> StoreResult<Self> {
        store.acquire(institute)?;
        Ok(Self {
            store,
            institute: institute.to_string(),
        })
    }

    pub fn institute(&self) -> &str {
        &self.institute
    }
}

impl<S: EntityStore + ?Sized> Drop for RunLease<'_, S> {
    fn drop(&mut self) {
        if let Err(e) = self.store.release(&self.institute) {
            warn!(institute = %self.institute, error = %e, "failed to release run lease");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StoreError;

    #[test]
    fn test_write_set_builder() {
        assert!(WriteSet::new().is_empty());
        let w = WriteSet::new()
            .with_sections(vec![Section::new("A", 30)])
            .with_metadata(Metadata {
                lunch_assigned: true,
            });
        assert!(!w.is_empty());
        assert!(!w.replace);
        assert!(WriteSet::new().replacing().replace);
    }

    #[test]
    fn test_lease_released_on_drop() {
        let store = MemoryStore::new();
        {
            let lease = RunLease::acquire(&store, "iiit").unwrap();
            assert_eq!(lease.institute(), "iiit");
            assert!(matches!(
                RunLease::acquire(&store, "iiit"),
                Err(StoreError::Busy(_))
            ));
            // Other institutes are independent.
            assert!(RunLease::acquire(&store, "nitk").is_ok());
        }
        assert!(RunLease::acquire(&store, "iiit").is_ok());
    }
}
