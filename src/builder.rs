use std::path::PathBuf;

use log::debug;

use crate::config::RecipeBoxConfig;
use crate::store::{FileBacking, KeyValueBacking, MemoryBacking, RecipeStore};
use crate::{RecipeBook, RecipeError};

/// Where the collection is kept
#[derive(Debug, Clone, Default)]
pub enum StorageTarget {
    /// One JSON file per storage key under the configured directory (default)
    #[default]
    Configured,
    /// A specific directory, overriding the configuration
    Dir(PathBuf),
    /// Nothing touches the disk; the collection lives as long as the book
    Memory,
}

/// Builder for opening a [`RecipeBook`]
#[derive(Debug, Default)]
pub struct RecipeBookBuilder {
    config: RecipeBoxConfig,
    target: StorageTarget,
}

impl RecipeBookBuilder {
    /// Start from a loaded configuration instead of the defaults
    ///
    /// # Example
    /// ```no_run
    /// use recipe_box::{RecipeBook, RecipeBoxConfig};
    ///
    /// let config = RecipeBoxConfig::load().unwrap();
    /// let book = RecipeBook::builder().config(config).build().unwrap();
    /// ```
    pub fn config(mut self, config: RecipeBoxConfig) -> Self {
        self.config = config;
        self
    }

    /// Keep the collection under `dir`
    ///
    /// # Example
    /// ```no_run
    /// use recipe_box::RecipeBook;
    ///
    /// let book = RecipeBook::builder()
    ///     .storage_dir("/home/anna/.recipes")
    ///     .build()
    ///     .unwrap();
    /// ```
    pub fn storage_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.target = StorageTarget::Dir(dir.into());
        self
    }

    /// Keep the collection in memory only
    pub fn in_memory(mut self) -> Self {
        self.target = StorageTarget::Memory;
        self
    }

    /// Set the storage key the collection blob is written under
    pub fn storage_key(mut self, key: impl Into<String>) -> Self {
        self.config.storage.key = key.into();
        self
    }

    /// Reject writes larger than `bytes`
    pub fn capacity_bytes(mut self, bytes: usize) -> Self {
        self.config.storage.capacity_bytes = Some(bytes);
        self
    }

    /// Set the category tags always offered for selection
    pub fn palette<I, S>(mut self, palette: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.config.categories.palette = palette.into_iter().map(Into::into).collect();
        self
    }

    /// Mint fresh ids for merged records whose id is blank or taken
    pub fn fresh_ids_on_merge(mut self, enabled: bool) -> Self {
        self.config.import.fresh_ids_on_merge = enabled;
        self
    }

    /// Open the backing and load the collection
    ///
    /// Missing or unreadable stored data opens as an empty collection; this
    /// only fails on settings that cannot be used at all.
    pub fn build(self) -> Result<RecipeBook, RecipeError> {
        let storage = self.config.storage;
        if storage.key.trim().is_empty() {
            return Err(RecipeError::ConfigError(config::ConfigError::Message(
                "storage key cannot be empty".to_string(),
            )));
        }

        let backing: Box<dyn KeyValueBacking> = match self.target {
            StorageTarget::Memory => {
                debug!("Opening in-memory recipe book");
                match storage.capacity_bytes {
                    Some(capacity) => Box::new(MemoryBacking::with_capacity(capacity)),
                    None => Box::new(MemoryBacking::new()),
                }
            }
            target => {
                let dir = match target {
                    StorageTarget::Dir(dir) => dir,
                    _ => storage.dir,
                };
                debug!("Opening recipe book in {}", dir.display());
                let backing = FileBacking::new(dir);
                match storage.capacity_bytes {
                    Some(capacity) => Box::new(backing.with_capacity(capacity)),
                    None => Box::new(backing),
                }
            }
        };

        let store = RecipeStore::open(backing, storage.key);
        Ok(RecipeBook::with_settings(
            store,
            self.config.categories.palette,
            self.config.import.fresh_ids_on_merge,
            self.config.export.file_prefix,
        ))
    }
}
