//! UniFFI bindings for recipe-box
//!
//! This module provides FFI-compatible types and a shared recipe book object
//! for use with iOS and Android. File imports and exports are async in Rust;
//! the bindings drive them on a private tokio runtime and stay synchronous.

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard};

use crate::{ImportKind, Recipe, RecipeBook, RecipeError, RecipeForm, RecipeSource, SourceKind};

// Re-export UniFFI macro
#[cfg(feature = "uniffi")]
uniffi::setup_scaffolding!();

/// FFI-compatible recipe structure
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "uniffi", derive(uniffi::Record))]
pub struct FfiRecipe {
    pub id: String,
    pub name: String,
    pub categories: Vec<String>,
    pub source: FfiRecipeSource,
    /// Non-blank ingredient lines
    pub ingredients: Vec<String>,
    pub instructions: String,
    pub prep_time: String,
    pub cook_time: String,
    pub servings: String,
    /// Trimmed guest names
    pub guests: Vec<String>,
    pub notes: String,
    pub created_at: String,
}

/// FFI-compatible recipe source
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "uniffi", derive(uniffi::Enum))]
pub enum FfiRecipeSource {
    Online {
        url: String,
    },
    Book {
        title: String,
        author: String,
        page: String,
    },
}

impl From<RecipeSource> for FfiRecipeSource {
    fn from(source: RecipeSource) -> Self {
        match source {
            RecipeSource::Online { url } => FfiRecipeSource::Online { url },
            RecipeSource::Book {
                title,
                author,
                page,
            } => FfiRecipeSource::Book {
                title,
                author,
                page,
            },
        }
    }
}

impl From<FfiRecipeSource> for RecipeSource {
    fn from(source: FfiRecipeSource) -> Self {
        match source {
            FfiRecipeSource::Online { url } => RecipeSource::Online { url },
            FfiRecipeSource::Book {
                title,
                author,
                page,
            } => RecipeSource::Book {
                title,
                author,
                page,
            },
        }
    }
}

impl From<&Recipe> for FfiRecipe {
    fn from(recipe: &Recipe) -> Self {
        FfiRecipe {
            id: recipe.id.clone(),
            name: recipe.name.clone(),
            categories: recipe.categories.clone(),
            source: recipe.source().into(),
            ingredients: recipe
                .ingredient_lines()
                .into_iter()
                .map(str::to_string)
                .collect(),
            instructions: recipe.instructions.clone(),
            prep_time: recipe.prep_time.clone(),
            cook_time: recipe.cook_time.clone(),
            servings: recipe.servings.clone(),
            guests: recipe
                .guest_names()
                .into_iter()
                .map(str::to_string)
                .collect(),
            notes: recipe.notes.clone(),
            created_at: recipe.created_at.clone(),
        }
    }
}

/// FFI-compatible form payload. Text areas are passed through as typed.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "uniffi", derive(uniffi::Record))]
pub struct FfiRecipeForm {
    pub name: String,
    pub categories: Vec<String>,
    pub source: FfiRecipeSource,
    pub ingredients: String,
    pub instructions: String,
    pub prep_time: String,
    pub cook_time: String,
    pub servings: String,
    pub guests: String,
    pub notes: String,
}

impl From<FfiRecipeForm> for RecipeForm {
    fn from(form: FfiRecipeForm) -> Self {
        RecipeForm {
            name: form.name,
            categories: form.categories,
            source: form.source.into(),
            ingredients: form.ingredients,
            instructions: form.instructions,
            prep_time: form.prep_time,
            cook_time: form.cook_time,
            servings: form.servings,
            guests: form.guests,
            notes: form.notes,
        }
    }
}

/// FFI-compatible import kind
#[derive(Debug, Clone, Copy)]
#[cfg_attr(feature = "uniffi", derive(uniffi::Enum))]
pub enum FfiImportKind {
    Merge,
    Replace,
    Spreadsheet,
}

impl From<FfiImportKind> for ImportKind {
    fn from(kind: FfiImportKind) -> Self {
        match kind {
            FfiImportKind::Merge => ImportKind::Merge,
            FfiImportKind::Replace => ImportKind::Replace,
            FfiImportKind::Spreadsheet => ImportKind::Spreadsheet,
        }
    }
}

/// FFI-compatible error type
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "uniffi", derive(uniffi::Error))]
pub enum FfiRecipeError {
    /// The recipe has no name
    MissingName { message: String },
    /// Import file has the wrong shape
    InvalidFormat { message: String },
    /// Import file could not be parsed
    ParseFailure { message: String },
    /// Spreadsheet held no usable rows
    NoRecordsFound { message: String },
    /// Storage rejected the write
    PersistenceFailure { message: String },
    /// Edit of a recipe that does not exist
    UnknownRecipe { message: String },
    /// File or runtime error
    IoError { message: String },
    /// Configuration error
    ConfigError { message: String },
}

impl fmt::Display for FfiRecipeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FfiRecipeError::MissingName { message } => write!(f, "Missing name: {}", message),
            FfiRecipeError::InvalidFormat { message } => write!(f, "Invalid format: {}", message),
            FfiRecipeError::ParseFailure { message } => write!(f, "Parse failure: {}", message),
            FfiRecipeError::NoRecordsFound { message } => {
                write!(f, "No records found: {}", message)
            }
            FfiRecipeError::PersistenceFailure { message } => {
                write!(f, "Persistence failure: {}", message)
            }
            FfiRecipeError::UnknownRecipe { message } => write!(f, "Unknown recipe: {}", message),
            FfiRecipeError::IoError { message } => write!(f, "I/O error: {}", message),
            FfiRecipeError::ConfigError { message } => write!(f, "Config error: {}", message),
        }
    }
}

impl std::error::Error for FfiRecipeError {}

impl From<RecipeError> for FfiRecipeError {
    fn from(err: RecipeError) -> Self {
        let message = err.to_string();
        match err {
            RecipeError::MissingName => FfiRecipeError::MissingName { message },
            RecipeError::InvalidFormat(_) => FfiRecipeError::InvalidFormat { message },
            RecipeError::ParseFailure(_) => FfiRecipeError::ParseFailure { message },
            RecipeError::NoRecordsFound => FfiRecipeError::NoRecordsFound { message },
            RecipeError::PersistenceFailure(_) | RecipeError::Encode(_) => {
                FfiRecipeError::PersistenceFailure { message }
            }
            RecipeError::UnknownRecipe(_) => FfiRecipeError::UnknownRecipe { message },
            RecipeError::Io(_) => FfiRecipeError::IoError { message },
            RecipeError::ConfigError(_) => FfiRecipeError::ConfigError { message },
        }
    }
}

/// Create a new tokio runtime for FFI calls
fn create_runtime() -> Result<tokio::runtime::Runtime, FfiRecipeError> {
    tokio::runtime::Runtime::new().map_err(|e| FfiRecipeError::IoError {
        message: format!("Failed to create async runtime: {}", e),
    })
}

/// A recipe book shared with the host application
#[cfg_attr(feature = "uniffi", derive(uniffi::Object))]
pub struct FfiRecipeBook {
    inner: Mutex<RecipeBook>,
}

impl FfiRecipeBook {
    fn book(&self) -> MutexGuard<'_, RecipeBook> {
        // A panic while holding the lock cannot leave the store half-written
        self.inner
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[cfg_attr(feature = "uniffi", uniffi::export)]
impl FfiRecipeBook {
    /// Open (or create) the collection stored under `storage_dir`
    #[cfg_attr(feature = "uniffi", uniffi::constructor)]
    pub fn open(storage_dir: String) -> Result<Arc<Self>, FfiRecipeError> {
        let book = RecipeBook::builder().storage_dir(storage_dir).build()?;
        Ok(Arc::new(FfiRecipeBook {
            inner: Mutex::new(book),
        }))
    }

    /// Open a collection that is never written to disk
    #[cfg_attr(feature = "uniffi", uniffi::constructor)]
    pub fn in_memory() -> Result<Arc<Self>, FfiRecipeError> {
        let book = RecipeBook::builder().in_memory().build()?;
        Ok(Arc::new(FfiRecipeBook {
            inner: Mutex::new(book),
        }))
    }

    pub fn load_all(&self) -> Vec<FfiRecipe> {
        self.book().load_all().iter().map(FfiRecipe::from).collect()
    }

    pub fn get(&self, id: String) -> Option<FfiRecipe> {
        self.book().get(&id).map(FfiRecipe::from)
    }

    /// Save a form; pass the recipe id when editing
    pub fn submit(
        &self,
        form: FfiRecipeForm,
        editing_id: Option<String>,
    ) -> Result<FfiRecipe, FfiRecipeError> {
        let recipe = self.book().submit(form.into(), editing_id.as_deref())?;
        Ok(FfiRecipe::from(&recipe))
    }

    /// Delete a recipe; the host confirms with the user first
    pub fn delete(&self, id: String) -> Result<bool, FfiRecipeError> {
        Ok(self.book().delete(&id)?)
    }

    pub fn export_all(&self) -> Result<String, FfiRecipeError> {
        Ok(self.book().export_all()?)
    }

    /// Import bytes; the host confirms with the user before a replace
    pub fn import_bytes(&self, bytes: Vec<u8>, kind: FfiImportKind) -> Result<u64, FfiRecipeError> {
        let count = self.book().import_bytes(&bytes, kind.into())?;
        Ok(count as u64)
    }

    /// Import a file at `path`
    pub fn import_file(&self, path: String, kind: FfiImportKind) -> Result<u64, FfiRecipeError> {
        let rt = create_runtime()?;
        let mut book = self.book();
        let count = rt.block_on(book.import_file(&path, kind.into()))?;
        Ok(count as u64)
    }

    /// Write today's export into `dir` and return the file path
    pub fn export_to_dir(&self, dir: String) -> Result<String, FfiRecipeError> {
        let rt = create_runtime()?;
        let book = self.book();
        let path = rt.block_on(book.export_to_dir(&dir))?;
        Ok(path.display().to_string())
    }

    pub fn filter(&self, search_term: String, selected_categories: Vec<String>) -> Vec<FfiRecipe> {
        self.book()
            .filter(&search_term, &selected_categories)
            .iter()
            .map(FfiRecipe::from)
            .collect()
    }

    pub fn categories(&self) -> Vec<String> {
        self.book().categories()
    }

    pub fn count(&self) -> u64 {
        self.book().recipes().len() as u64
    }
}

/// Get the library version
#[cfg_attr(feature = "uniffi", uniffi::export)]
pub fn get_version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

/// Whether a source string would be imported as an online link
#[cfg_attr(feature = "uniffi", uniffi::export)]
pub fn is_online_source(source: String) -> bool {
    crate::pipelines::spreadsheet::classify_source(&source).kind() == SourceKind::Online
}
