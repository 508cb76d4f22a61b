//! In-memory entity store.
//!
//! Holds every institute in a shared map behind an `RwLock`. Clones share
//! the same data, so one store can be handed to several callers. The whole
//! store can be written to and read back from a JSON snapshot.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;
use std::sync::{Arc, Mutex, RwLock};
use tracing::debug;

use super::{EntityStore, Metadata, WriteSet};
use crate::error::{StoreError, StoreResult};
use crate::models::{Faculty, Section, Subject, Venue};

/// Everything stored for one institute.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstituteData {
    #[serde(default)]
    pub faculty: Vec<Faculty>,
    #[serde(default)]
    pub subjects: Vec<Subject>,
    /// Section ID → section.
    #[serde(default)]
    pub sections: BTreeMap<String, Section>,
    /// Venue ID → venue.
    #[serde(default)]
    pub venues: BTreeMap<String, Venue>,
    #[serde(default)]
    pub metadata: Metadata,
}

impl InstituteData {
    fn apply(&mut self, writes: WriteSet) {
        if writes.replace {
            *self = Self::default();
        }
        if let Some(faculty) = writes.faculty {
            self.faculty = faculty;
        }
        if let Some(subjects) = writes.subjects {
            self.subjects = subjects;
        }
        for section in writes.sections {
            self.sections.insert(section.id.clone(), section);
        }
        for venue in writes.venues {
            self.venues.insert(venue.id.clone(), venue);
        }
        if let Some(metadata) = writes.metadata {
            self.metadata = metadata;
        }
    }
}

/// In-memory [`EntityStore`].
///
/// # Example
///
/// ```
/// use u_timetable::models::Section;
/// use u_timetable::store::{EntityStore, MemoryStore, WriteSet};
///
/// let store = MemoryStore::new();
/// store
///     .commit("iiit", WriteSet::new().with_sections(vec![Section::new("A", 60)]))
///     .unwrap();
/// assert_eq!(store.sections("iiit").unwrap().len(), 1);
/// assert!(store.sections("other").unwrap().is_empty());
/// ```
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    data: Arc<RwLock<BTreeMap<String, InstituteData>>>,
    leases: Arc<Mutex<BTreeSet<String>>>,
}

impl MemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Institutes holding data.
    pub fn institutes(&self) -> StoreResult<Vec<String>> {
        self.read(|data| data.keys().cloned().collect())
    }

    /// Copy of one institute's data.
    pub fn snapshot(&self, institute: &str) -> StoreResult<InstituteData> {
        self.read(|data| data.get(institute).cloned())?
            .ok_or_else(|| StoreError::NotFound(format!("institute '{institute}'")))
    }

    /// Serializes every institute to JSON.
    pub fn to_json(&self) -> StoreResult<String> {
        let data = self
            .data
            .read()
            .map_err(|e| StoreError::Poisoned(e.to_string()))?;
        Ok(serde_json::to_string_pretty(&*data)?)
    }

    /// Builds a store from a JSON snapshot.
    pub fn from_json(json: &str) -> StoreResult<Self> {
        let data: BTreeMap<String, InstituteData> = serde_json::from_str(json)?;
        Ok(Self {
            data: Arc::new(RwLock::new(data)),
            leases: Arc::default(),
        })
    }

    /// Writes a JSON snapshot to `path`.
    pub fn save(&self, path: &Path) -> StoreResult<()> {
        std::fs::write(path, self.to_json()?)?;
        debug!(path = %path.display(), "store saved");
        Ok(())
    }

    /// Reads a JSON snapshot from `path`.
    pub fn load(path: &Path) -> StoreResult<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    fn read<T>(&self, f: impl FnOnce(&BTreeMap<String, InstituteData>) -> T) -> StoreResult<T> {
        let data = self
            .data
            .read()
            .map_err(|e| StoreError::Poisoned(e.to_string()))?;
        Ok(f(&data))
    }

    fn read_institute<T>(
        &self,
        institute: &str,
        f: impl FnOnce(&InstituteData) -> T,
    ) -> StoreResult<Option<T>> {
        self.read(|data| data.get(institute).map(f))
    }
}

impl EntityStore for MemoryStore {
    fn faculty(&self, institute: &str) -> StoreResult<Vec<Faculty>> {
        Ok(self
            .read_institute(institute, |d| d.faculty.clone())?
            .unwrap_or_default())
    }

    fn subjects(&self, institute: &str) -> StoreResult<Vec<Subject>> {
        Ok(self
            .read_institute(institute, |d| d.subjects.clone())?
            .unwrap_or_default())
    }

    fn sections(&self, institute: &str) -> StoreResult<Vec<Section>> {
        Ok(self
            .read_institute(institute, |d| d.sections.values().cloned().collect())?
            .unwrap_or_default())
    }

    fn venues(&self, institute: &str) -> StoreResult<Vec<Venue>> {
        Ok(self
            .read_institute(institute, |d| d.venues.values().cloned().collect())?
            .unwrap_or_default())
    }

    fn metadata(&self, institute: &str) -> StoreResult<Metadata> {
        Ok(self
            .read_institute(institute, |d| d.metadata.clone())?
            .unwrap_or_default())
    }

    fn commit(&self, institute: &str, writes: WriteSet) -> StoreResult<()> {
        if writes.is_empty() {
            return Ok(());
        }
        let mut data = self
            .data
            .write()
            .map_err(|e| StoreError::Poisoned(e.to_string()))?;
        debug!(
            institute,
            sections = writes.sections.len(),
            venues = writes.venues.len(),
            "commit"
        );
        data.entry(institute.to_string()).or_default().apply(writes);
        Ok(())
    }

    fn acquire(&self, institute: &str) -> StoreResult<()> {
        let mut leases = self
            .leases
            .lock()
            .map_err(|e| StoreError::Poisoned(e.to_string()))?;
        if leases.insert(institute.to_string()) {
            Ok(())
        } else {
            Err(StoreError::Busy(institute.to_string()))
        }
    }

    fn release(&self, institute: &str) -> StoreResult<()> {
        let mut leases = self
            .leases
            .lock()
            .map_err(|e| StoreError::Poisoned(e.to_string()))?;
        leases.remove(institute);
        Ok(())
    }
}
