//! The collection as the presentation layer sees it.

use std::path::{Path, PathBuf};

use chrono::{NaiveDate, Utc};
use log::{info, warn};

use crate::builder::RecipeBookBuilder;
use crate::error::RecipeError;
use crate::filter::{self, FilterSummary};
use crate::model::{format_timestamp, Recipe, RecipeForm};
use crate::pipelines::{spreadsheet, structured, ImportKind};
use crate::store::{KeyValueBacking, RecipeStore};
use crate::validate::validate;

/// One recipe collection with its store, plus the settings that shape
/// imports, exports, and the category list.
///
/// Every operation returns either its value or a [`RecipeError`]; asking
/// the user for confirmation before [`RecipeBook::delete`] or
/// [`RecipeBook::import_replace`] is the caller's job.
pub struct RecipeBook<B = Box<dyn KeyValueBacking>> {
    store: RecipeStore<B>,
    palette: Vec<String>,
    fresh_ids_on_merge: bool,
    export_prefix: String,
}

impl RecipeBook {
    /// Creates a new builder for opening a recipe book
    ///
    /// # Example
    /// ```
    /// use recipe_box::RecipeBook;
    ///
    /// let book = RecipeBook::builder().in_memory().build().unwrap();
    /// assert!(book.recipes().is_empty());
    /// ```
    pub fn builder() -> RecipeBookBuilder {
        RecipeBookBuilder::default()
    }
}

impl<B: KeyValueBacking> RecipeBook<B> {
    /// Wrap an already opened store with default settings
    pub fn new(store: RecipeStore<B>) -> Self {
        let defaults = crate::config::RecipeBoxConfig::default();
        Self {
            store,
            palette: defaults.categories.palette,
            fresh_ids_on_merge: defaults.import.fresh_ids_on_merge,
            export_prefix: defaults.export.file_prefix,
        }
    }

    pub(crate) fn with_settings(
        store: RecipeStore<B>,
        palette: Vec<String>,
        fresh_ids_on_merge: bool,
        export_prefix: String,
    ) -> Self {
        Self {
            store,
            palette,
            fresh_ids_on_merge,
            export_prefix,
        }
    }

    /// Re-read the collection from storage
    pub fn load_all(&mut self) -> Vec<Recipe> {
        self.store.load()
    }

    /// Current snapshot, as of the last load or successful write
    pub fn recipes(&self) -> &[Recipe] {
        self.store.snapshot()
    }

    pub fn get(&self, id: &str) -> Option<&Recipe> {
        self.store.get(id)
    }

    /// Changes whenever the snapshot does
    pub fn version(&self) -> u64 {
        self.store.version()
    }

    pub fn store(&self) -> &RecipeStore<B> {
        &self.store
    }

    /// Save a form.
    ///
    /// Without `editing_id` a new recipe is created with a fresh id and the
    /// current time as `createdAt`. With it, the recipe with that id has all
    /// fields replaced while its id and `createdAt` are kept.
    pub fn submit(
        &mut self,
        form: RecipeForm,
        editing_id: Option<&str>,
    ) -> Result<Recipe, RecipeError> {
        let form = validate(form)?;

        let recipe = match editing_id {
            Some(id) => {
                let existing = self
                    .store
                    .get(id)
                    .ok_or_else(|| RecipeError::UnknownRecipe(id.to_string()))?;
                let created_at = existing.created_at.clone();
                form.into_recipe(id.to_string(), created_at)
            }
            None => {
                let now = Utc::now();
                let id = self.store.next_id(now);
                form.into_recipe(id, format_timestamp(now))
            }
        };

        self.store.upsert(recipe.clone())?;
        info!("Saved recipe '{}' ({})", recipe.name, recipe.id);
        Ok(recipe)
    }

    /// Delete the recipe with `id`. Returns `false` when there was none.
    pub fn delete(&mut self, id: &str) -> Result<bool, RecipeError> {
        let removed = self.store.remove(id)?;
        if removed {
            info!("Deleted recipe {}", id);
        } else {
            warn!("No recipe with id {} to delete", id);
        }
        Ok(removed)
    }

    /// The full collection in the structured exchange format
    pub fn export_all(&self) -> Result<String, RecipeError> {
        structured::export_records(self.store.snapshot())
    }

    /// File name for an export made on `date`
    pub fn export_file_name(&self, date: NaiveDate) -> String {
        structured::export_file_name(&self.export_prefix, date)
    }

    /// Append the structured records in `bytes`; returns how many were added
    pub fn import_merge(&mut self, bytes: &[u8]) -> Result<usize, RecipeError> {
        structured::import_merge(&mut self.store, bytes, self.fresh_ids_on_merge, Utc::now())
    }

    /// Replace the collection with the structured records in `bytes`
    pub fn import_replace(&mut self, bytes: &[u8]) -> Result<usize, RecipeError> {
        structured::import_replace(&mut self.store, bytes)
    }

    /// Append the rows of a workbook's first sheet; returns how many were added
    pub fn import_spreadsheet(&mut self, bytes: &[u8]) -> Result<usize, RecipeError> {
        spreadsheet::import(&mut self.store, bytes, Utc::now())
    }

    pub fn import_bytes(&mut self, bytes: &[u8], kind: ImportKind) -> Result<usize, RecipeError> {
        match kind {
            ImportKind::Merge => self.import_merge(bytes),
            ImportKind::Replace => self.import_replace(bytes),
            ImportKind::Spreadsheet => self.import_spreadsheet(bytes),
        }
    }

    /// Read an import file and apply it
    pub async fn import_file(
        &mut self,
        path: impl AsRef<Path>,
        kind: ImportKind,
    ) -> Result<usize, RecipeError> {
        let path = path.as_ref();
        let bytes = tokio::fs::read(path).await?;
        info!("Importing {} ({} bytes) as {:?}", path.display(), bytes.len(), kind);
        self.import_bytes(&bytes, kind)
    }

    /// Write today's export into `dir`; returns the file written
    pub async fn export_to_dir(&self, dir: impl AsRef<Path>) -> Result<PathBuf, RecipeError> {
        let json = self.export_all()?;
        let path = dir
            .as_ref()
            .join(self.export_file_name(Utc::now().date_naive()));
        tokio::fs::write(&path, json).await?;
        info!(
            "Exported {} recipes to {}",
            self.store.snapshot().len(),
            path.display()
        );
        Ok(path)
    }

    /// Recipes visible under the given search term and category selection
    pub fn filter(&self, search_term: &str, selected: &[String]) -> Vec<Recipe> {
        filter::visible(self.store.snapshot(), search_term, selected)
    }

    pub fn summary(&self, shown: usize) -> FilterSummary {
        FilterSummary {
            shown,
            total: self.store.snapshot().len(),
        }
    }

    /// Palette tags followed by any other tag in use
    pub fn categories(&self) -> Vec<String> {
        filter::all_categories(&self.palette, self.store.snapshot())
    }
}
