use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::PathBuf;

use crate::store::DEFAULT_STORAGE_KEY;

/// Main application configuration
#[derive(Debug, Deserialize, Clone, Default)]
pub struct RecipeBoxConfig {
    /// Where and how the collection is stored
    #[serde(default)]
    pub storage: StorageConfig,
    /// Category tags offered for selection
    #[serde(default)]
    pub categories: CategoriesConfig,
    /// Import behaviour
    #[serde(default)]
    pub import: ImportConfig,
    /// Export behaviour
    #[serde(default)]
    pub export: ExportConfig,
}

/// Configuration for the backing store
#[derive(Debug, Deserialize, Clone)]
pub struct StorageConfig {
    /// Directory holding the collection file
    #[serde(default = "default_storage_dir")]
    pub dir: PathBuf,
    /// Storage key; also the collection file's stem
    #[serde(default = "default_storage_key")]
    pub key: String,
    /// Optional quota in bytes; writes above it are rejected
    #[serde(default)]
    pub capacity_bytes: Option<usize>,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            dir: default_storage_dir(),
            key: default_storage_key(),
            capacity_bytes: None,
        }
    }
}

/// Configuration for category tags
#[derive(Debug, Deserialize, Clone)]
pub struct CategoriesConfig {
    /// Tags always offered, in display order
    #[serde(default = "default_palette")]
    pub palette: Vec<String>,
}

impl Default for CategoriesConfig {
    fn default() -> Self {
        Self {
            palette: default_palette(),
        }
    }
}

/// Configuration for structured imports
#[derive(Debug, Deserialize, Clone, Default)]
pub struct ImportConfig {
    /// Mint new ids for merged records whose id is blank or already taken
    #[serde(default)]
    pub fresh_ids_on_merge: bool,
}

/// Configuration for exports
#[derive(Debug, Deserialize, Clone)]
pub struct ExportConfig {
    /// Export file names are `<prefix>-YYYY-MM-DD.json`
    #[serde(default = "default_file_prefix")]
    pub file_prefix: String,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            file_prefix: default_file_prefix(),
        }
    }
}

// Default value functions
fn default_storage_dir() -> PathBuf {
    PathBuf::from(".recipe-box")
}

fn default_storage_key() -> String {
    DEFAULT_STORAGE_KEY.to_string()
}

fn default_palette() -> Vec<String> {
    [
        "Vlees",
        "Vis",
        "vega",
        "Voorgerecht",
        "Toetje",
        "Bijgerecht",
        "Thomas",
        "Ontbijt",
        "Pasta",
    ]
    .iter()
    .map(|tag| tag.to_string())
    .collect()
}

fn default_file_prefix() -> String {
    "recepten".to_string()
}

impl RecipeBoxConfig {
    /// Load configuration from file and environment variables
    ///
    /// Configuration is loaded with the following priority (highest to lowest):
    /// 1. Environment variables with RECIPE_BOX__ prefix
    /// 2. recipe-box.toml file in current directory
    /// 3. Default values
    ///
    /// Environment variable format: RECIPE_BOX__STORAGE__DIR
    pub fn load() -> Result<Self, ConfigError> {
        load_config()
    }
}

/// Load configuration from file and environment variables
///
/// See [`RecipeBoxConfig::load`] for the lookup order.
pub fn load_config() -> Result<RecipeBoxConfig, ConfigError> {
    load_config_from("recipe-box", "RECIPE_BOX")
}

fn load_config_from(file: &str, env_prefix: &str) -> Result<RecipeBoxConfig, ConfigError> {
    let settings = Config::builder()
        // Optional config file (can be missing)
        .add_source(File::with_name(file).required(false))
        // Use double underscore for nested: RECIPE_BOX__IMPORT__FRESH_IDS_ON_MERGE
        .add_source(
            Environment::with_prefix(env_prefix)
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        )
        .build()?;

    settings.try_deserialize()
}

/// Parse configuration from a TOML string layered over the defaults
pub fn config_from_toml(toml: &str) -> Result<RecipeBoxConfig, ConfigError> {
    Config::builder()
        .add_source(File::from_str(toml, config::FileFormat::Toml))
        .build()?
        .try_deserialize()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_values() {
        let config = RecipeBoxConfig::default();
        assert_eq!(config.storage.dir, PathBuf::from(".recipe-box"));
        assert_eq!(config.storage.key, "recipes_app_v2");
        assert!(config.storage.capacity_bytes.is_none());
        assert_eq!(config.categories.palette.len(), 9);
        assert_eq!(config.categories.palette[0], "Vlees");
        assert!(!config.import.fresh_ids_on_merge);
        assert_eq!(config.export.file_prefix, "recepten");
    }

    #[test]
    fn test_empty_toml_uses_defaults() {
        let config = config_from_toml("").unwrap();
        assert_eq!(config.storage.key, "recipes_app_v2");
        assert_eq!(config.categories.palette, default_palette());
    }

    #[test]
    fn test_partial_toml() {
        let config = config_from_toml(
            r#"
            [storage]
            dir = "/var/lib/recipes"
            capacity_bytes = 5242880

            [categories]
            palette = ["Soep", "Salade"]

            [import]
            fresh_ids_on_merge = true
            "#,
        )
        .unwrap();

        assert_eq!(config.storage.dir, PathBuf::from("/var/lib/recipes"));
        assert_eq!(config.storage.key, "recipes_app_v2");
        assert_eq!(config.storage.capacity_bytes, Some(5_242_880));
        assert_eq!(config.categories.palette, vec!["Soep", "Salade"]);
        assert!(config.import.fresh_ids_on_merge);
        assert_eq!(config.export.file_prefix, "recepten");
    }

    #[test]
    fn test_missing_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("recipe-box");
        let config =
            load_config_from(&missing.to_string_lossy(), "RECIPE_BOX_UNSET_IN_TESTS").unwrap();

        assert_eq!(config.storage.key, "recipes_app_v2");
        assert_eq!(config.categories.palette, default_palette());
        assert_eq!(config.export.file_prefix, "recepten");
    }

    #[test]
    fn test_file_is_layered_over_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("recipe-box.toml");
        std::fs::write(&path, "[export]\nfile_prefix = \"recipes\"\n").unwrap();

        let stem = dir.path().join("recipe-box");
        let config =
            load_config_from(&stem.to_string_lossy(), "RECIPE_BOX_UNSET_IN_TESTS").unwrap();

        assert_eq!(config.export.file_prefix, "recipes");
        assert_eq!(config.storage.key, "recipes_app_v2");
    }
}
