//! The authoritative recipe collection and its durable backing.
//!
//! [`RecipeStore`] keeps an in-memory snapshot in step with one blob in a
//! [`KeyValueBacking`]. Every mutation builds the complete new collection,
//! writes it, and only then swaps the snapshot, so a rejected write leaves
//! the snapshot exactly as it was.

mod backing;
mod ids;

pub use backing::{BackingError, FileBacking, KeyValueBacking, MemoryBacking};
pub use ids::IdGenerator;

use chrono::{DateTime, Utc};
use log::{debug, warn};

use crate::error::RecipeError;
use crate::model::Recipe;
use crate::pipelines::structured;

/// Storage key used by every release that writes the current record shape
pub const DEFAULT_STORAGE_KEY: &str = "recipes_app_v2";

pub struct RecipeStore<B> {
    backing: B,
    key: String,
    records: Vec<Recipe>,
    version: u64,
    ids: IdGenerator,
}

impl<B: KeyValueBacking> RecipeStore<B> {
    /// Open the store and load whatever the backing holds under `key`
    pub fn open(backing: B, key: impl Into<String>) -> Self {
        let mut store = RecipeStore {
            backing,
            key: key.into(),
            records: Vec::new(),
            version: 0,
            ids: IdGenerator::new(),
        };
        store.load();
        store
    }

    /// Re-read the collection from the backing.
    ///
    /// Missing, unreadable, or unparseable data yields an empty collection.
    /// Within a well-formed array, entries that are not recipes are skipped
    /// and the rest are kept.
    pub fn load(&mut self) -> Vec<Recipe> {
        let records = match self.backing.read(&self.key) {
            Ok(Some(blob)) => match structured::parse_records(blob.as_bytes()) {
                Ok(records) => records,
                Err(e) => {
                    warn!(
                        "Stored recipes under '{}' are unreadable, starting empty: {}",
                        self.key, e
                    );
                    Vec::new()
                }
            },
            Ok(None) => {
                debug!("No recipes stored under '{}' yet", self.key);
                Vec::new()
            }
            Err(e) => {
                warn!("Failed to read '{}', starting empty: {}", self.key, e);
                Vec::new()
            }
        };

        debug!("Loaded {} recipes", records.len());
        self.records = records;
        self.version += 1;
        self.records.clone()
    }

    /// Write `records` as the complete collection.
    ///
    /// On failure nothing changes: neither the snapshot nor the version.
    pub fn persist(&mut self, records: Vec<Recipe>) -> Result<(), RecipeError> {
        let blob = serde_json::to_string(&records)?;
        self.backing.write(&self.key, &blob)?;
        self.records = records;
        self.version += 1;
        Ok(())
    }

    /// Discard the current collection in favour of `records`
    pub fn replace_all(&mut self, records: Vec<Recipe>) -> Result<(), RecipeError> {
        self.persist(records)
    }

    /// Add `records` after the current collection, in order
    pub fn append(&mut self, records: Vec<Recipe>) -> Result<(), RecipeError> {
        let mut all = self.records.clone();
        all.extend(records);
        self.persist(all)
    }

    /// Replace the record with the same id in place, or append it
    pub fn upsert(&mut self, record: Recipe) -> Result<(), RecipeError> {
        let mut all = self.records.clone();
        let mut replaced = false;
        for existing in all.iter_mut().filter(|r| r.id == record.id) {
            *existing = record.clone();
            replaced = true;
        }
        if !replaced {
            all.push(record);
        }
        self.persist(all)
    }

    /// Drop the record with `id`. Returns `false` without writing when no
    /// such record exists.
    pub fn remove(&mut self, id: &str) -> Result<bool, RecipeError> {
        if !self.records.iter().any(|r| r.id == id) {
            return Ok(false);
        }
        let remaining = self
            .records
            .iter()
            .filter(|r| r.id != id)
            .cloned()
            .collect();
        self.persist(remaining)?;
        Ok(true)
    }

    pub fn snapshot(&self) -> &[Recipe] {
        &self.records
    }

    pub fn get(&self, id: &str) -> Option<&Recipe> {
        self.records.iter().find(|r| r.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    /// Bumped on every load and successful persist
    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn backing(&self) -> &B {
        &self.backing
    }

    /// Mint an id that no record in the collection carries
    pub fn next_id(&mut self, now: DateTime<Utc>) -> String {
        loop {
            let id = self.ids.next_at(now);
            if !self.contains(&id) {
                return id;
            }
        }
    }
}
