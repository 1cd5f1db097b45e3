use chrono::{DateTime, SecondsFormat, Utc};
use serde::de::IgnoredAny;
use serde::{Deserialize, Serialize};

/// Tag given to recipes submitted or imported without any category
pub const FALLBACK_CATEGORY: &str = "Other";

/// Where a recipe came from
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    #[default]
    Online,
    Book,
}

impl SourceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceKind::Online => "online",
            SourceKind::Book => "book",
        }
    }
}

impl std::fmt::Display for SourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A stored recipe.
///
/// The serialized shape is the structured exchange format: camelCase keys,
/// every text field present (empty when unused). Deserialization goes through
/// a lenient intermediate shape so that records written by older versions
/// (no `categories`, a singular `category`, `sourceType`, numeric scalars)
/// come out in canonical form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "RawRecipe")]
pub struct Recipe {
    pub id: String,
    pub name: String,
    pub categories: Vec<String>,
    pub source_kind: SourceKind,
    pub source_url: String,
    pub book_title: String,
    pub book_author: String,
    pub book_page: String,
    /// One ingredient per line
    pub ingredients: String,
    pub instructions: String,
    pub prep_time: String,
    pub cook_time: String,
    pub servings: String,
    /// Comma separated guest names
    pub guests: String,
    pub notes: String,
    /// ISO-8601 UTC timestamp, set once at first save
    pub created_at: String,
}

impl Recipe {
    /// The source of this recipe as a tagged value, ignoring the fields
    /// that do not belong to its kind.
    pub fn source(&self) -> RecipeSource {
        match self.source_kind {
            SourceKind::Online => RecipeSource::Online {
                url: self.source_url.clone(),
            },
            SourceKind::Book => RecipeSource::Book {
                title: self.book_title.clone(),
                author: self.book_author.clone(),
                page: self.book_page.clone(),
            },
        }
    }

    /// Non-blank ingredient lines, in order
    pub fn ingredient_lines(&self) -> Vec<&str> {
        self.ingredients
            .lines()
            .filter(|line| !line.trim().is_empty())
            .collect()
    }

    /// Trimmed guest names, skipping empty segments
    pub fn guest_names(&self) -> Vec<&str> {
        self.guests
            .split(',')
            .map(str::trim)
            .filter(|guest| !guest.is_empty())
            .collect()
    }

    pub fn created_at_utc(&self) -> Option<DateTime<Utc>> {
        DateTime::parse_from_rfc3339(&self.created_at)
            .ok()
            .map(|ts| ts.with_timezone(&Utc))
    }

    pub fn has_category(&self, tag: &str) -> bool {
        self.categories.iter().any(|category| category == tag)
    }
}

/// Tagged recipe source used by form payloads
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecipeSource {
    Online {
        url: String,
    },
    Book {
        title: String,
        author: String,
        page: String,
    },
}

impl Default for RecipeSource {
    fn default() -> Self {
        RecipeSource::Online { url: String::new() }
    }
}

impl RecipeSource {
    pub fn kind(&self) -> SourceKind {
        match self {
            RecipeSource::Online { .. } => SourceKind::Online,
            RecipeSource::Book { .. } => SourceKind::Book,
        }
    }
}

/// Form payload submitted by the presentation layer when creating or
/// editing a recipe. Only `name` is mandatory; see [`crate::validate`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecipeForm {
    pub name: String,
    pub categories: Vec<String>,
    pub source: RecipeSource,
    pub ingredients: String,
    pub instructions: String,
    pub prep_time: String,
    pub cook_time: String,
    pub servings: String,
    pub guests: String,
    pub notes: String,
}

impl RecipeForm {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Build the stored record. Identity fields are supplied by the caller:
    /// fresh ones on creation, the existing ones on edit.
    pub fn into_recipe(self, id: String, created_at: String) -> Recipe {
        let source_kind = self.source.kind();
        let (source_url, book_title, book_author, book_page) = match self.source {
            RecipeSource::Online { url } => (url, String::new(), String::new(), String::new()),
            RecipeSource::Book {
                title,
                author,
                page,
            } => (String::new(), title, author, page),
        };

        Recipe {
            id,
            name: self.name,
            categories: self.categories,
            source_kind,
            source_url,
            book_title,
            book_author,
            book_page,
            ingredients: self.ingredients,
            instructions: self.instructions,
            prep_time: self.prep_time,
            cook_time: self.cook_time,
            servings: self.servings,
            guests: self.guests,
            notes: self.notes,
            created_at,
        }
    }
}

impl From<&Recipe> for RecipeForm {
    fn from(recipe: &Recipe) -> Self {
        RecipeForm {
            name: recipe.name.clone(),
            categories: recipe.categories.clone(),
            source: recipe.source(),
            ingredients: recipe.ingredients.clone(),
            instructions: recipe.instructions.clone(),
            prep_time: recipe.prep_time.clone(),
            cook_time: recipe.cook_time.clone(),
            servings: recipe.servings.clone(),
            guests: recipe.guests.clone(),
            notes: recipe.notes.clone(),
        }
    }
}

/// Format a timestamp the way `createdAt` is stored
pub fn format_timestamp(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Text field that older files sometimes stored as a number or boolean.
/// Lists and objects are accepted and read as empty text.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum LooseText {
    Text(String),
    Number(serde_json::Number),
    Bool(bool),
    Other(IgnoredAny),
}

impl LooseText {
    fn into_tag(self) -> Option<String> {
        match self {
            LooseText::Text(tag) => Some(tag),
            _ => None,
        }
    }
}

impl From<LooseText> for String {
    fn from(value: LooseText) -> Self {
        match value {
            LooseText::Text(text) => text,
            LooseText::Number(number) => number.to_string(),
            LooseText::Bool(flag) => flag.to_string(),
            LooseText::Other(_) => String::new(),
        }
    }
}

/// Non-string entries of a tag list are dropped
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum CategoryField {
    Many(Vec<Option<LooseText>>),
    One(LooseText),
}

/// Every shape of recipe record that has been written to storage or export
/// files over time.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct RawRecipe {
    id: Option<LooseText>,
    name: Option<LooseText>,
    categories: Option<CategoryField>,
    category: Option<LooseText>,
    #[serde(alias = "sourceType")]
    source_kind: Option<LooseText>,
    source_url: Option<LooseText>,
    book_title: Option<LooseText>,
    book_author: Option<LooseText>,
    book_page: Option<LooseText>,
    ingredients: Option<LooseText>,
    instructions: Option<LooseText>,
    prep_time: Option<LooseText>,
    cook_time: Option<LooseText>,
    servings: Option<LooseText>,
    guests: Option<LooseText>,
    notes: Option<LooseText>,
    created_at: Option<LooseText>,
}

fn text(value: Option<LooseText>) -> String {
    value.map(String::from).unwrap_or_default()
}

fn normalize_categories(
    categories: Option<CategoryField>,
    legacy: Option<LooseText>,
) -> Vec<String> {
    let tags = match (categories, legacy) {
        (Some(CategoryField::Many(tags)), _) => tags
            .into_iter()
            .flatten()
            .filter_map(LooseText::into_tag)
            .collect(),
        (Some(CategoryField::One(tag)), _) | (None, Some(tag)) => vec![String::from(tag)],
        (None, None) => Vec::new(),
    };

    let tags: Vec<String> = tags.into_iter().filter(|tag| !tag.is_empty()).collect();
    if tags.is_empty() {
        vec![FALLBACK_CATEGORY.to_string()]
    } else {
        tags
    }
}

impl From<RawRecipe> for Recipe {
    fn from(raw: RawRecipe) -> Self {
        let source_url = text(raw.source_url);
        let book_title = text(raw.book_title);
        let book_author = text(raw.book_author);
        let book_page = text(raw.book_page);

        let declared_kind = raw.source_kind.map(|kind| String::from(kind).to_lowercase());
        let source_kind = match declared_kind.as_deref() {
            Some("online") => SourceKind::Online,
            Some("book") => SourceKind::Book,
            _ => {
                let has_book_fields =
                    !book_title.is_empty() || !book_author.is_empty() || !book_page.is_empty();
                if source_url.is_empty() && has_book_fields {
                    SourceKind::Book
                } else {
                    SourceKind::Online
                }
            }
        };

        Recipe {
            id: text(raw.id),
            name: text(raw.name),
            categories: normalize_categories(raw.categories, raw.category),
            source_kind,
            source_url,
            book_title,
            book_author,
            book_page,
            ingredients: text(raw.ingredients),
            instructions: text(raw.instructions),
            prep_time: text(raw.prep_time),
            cook_time: text(raw.cook_time),
            servings: text(raw.servings),
            guests: text(raw.guests),
            notes: text(raw.notes),
            created_at: text(raw.created_at),
        }
    }
}
