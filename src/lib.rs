//! Recipe collection engine.
//!
//! A personal recipe collection: validated records kept in a durable
//! key-value blob, bulk import from JSON exports and spreadsheets, JSON
//! export, and search with conjunctive category filters.
//!
//! ```
//! use recipe_box::{RecipeBook, RecipeForm};
//!
//! let mut book = RecipeBook::builder().in_memory().build()?;
//!
//! let mut form = RecipeForm::new("Lasagne");
//! form.categories = vec!["Vlees".to_string(), "Pasta".to_string()];
//! form.ingredients = "lasagnebladen\n500 g gehakt\n3 tomaten".to_string();
//! book.submit(form, None)?;
//!
//! let hits = book.filter("tomaten", &["Pasta".to_string()]);
//! assert_eq!(hits.len(), 1);
//! # Ok::<(), recipe_box::RecipeError>(())
//! ```

pub mod book;
pub mod builder;
pub mod config;
pub mod error;
pub mod filter;
pub mod model;
pub mod pipelines;
pub mod store;
pub mod uniffi_bindings;
pub mod validate;

pub use crate::book::RecipeBook;
pub use crate::builder::{RecipeBookBuilder, StorageTarget};
pub use crate::config::RecipeBoxConfig;
pub use crate::error::RecipeError;
pub use crate::filter::{visible, FilterSummary};
pub use crate::model::{Recipe, RecipeForm, RecipeSource, SourceKind, FALLBACK_CATEGORY};
pub use crate::pipelines::ImportKind;
pub use crate::store::{
    BackingError, FileBacking, KeyValueBacking, MemoryBacking, RecipeStore, DEFAULT_STORAGE_KEY,
};
pub use crate::validate::validate;

/// Open the recipe book described by `recipe-box.toml` and `RECIPE_BOX__*`
/// environment variables.
pub fn open_configured() -> Result<RecipeBook, RecipeError> {
    let config = RecipeBoxConfig::load()?;
    RecipeBook::builder().config(config).build()
}
