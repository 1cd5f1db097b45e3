use thiserror::Error;

use crate::store::BackingError;

/// Errors that can occur while managing the recipe collection
#[derive(Error, Debug)]
pub enum RecipeError {
    /// The submitted recipe has an empty or whitespace-only name
    #[error("A recipe needs at least a name")]
    MissingName,

    /// Import data parsed, but its top-level shape is not a list of recipes
    #[error("Invalid file format: {0}")]
    InvalidFormat(String),

    /// Import bytes are not well formed in the expected encoding
    #[error("Failed to parse import data: {0}")]
    ParseFailure(String),

    /// The spreadsheet contained no usable rows
    #[error("No recipes found")]
    NoRecordsFound,

    /// The backing store rejected the write (e.g. over capacity)
    #[error("Failed to save recipes: {0}")]
    PersistenceFailure(#[from] BackingError),

    /// The collection could not be encoded as JSON
    #[error("Failed to encode recipes: {0}")]
    Encode(#[from] serde_json::Error),

    /// An edit referred to a recipe id that is not in the store
    #[error("Unknown recipe id: {0}")]
    UnknownRecipe(String),

    /// Reading or writing an import/export file failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(#[from] config::ConfigError),
}
