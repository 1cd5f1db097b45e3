//! Acceptance rules for a single recipe before it enters the store.

use crate::error::RecipeError;
use crate::model::{RecipeForm, FALLBACK_CATEGORY};

/// Validate and normalize a form payload.
///
/// Only the name is checked. Category tags are trimmed, blank tags are
/// dropped, and an empty tag list becomes the fallback tag. All other fields
/// are accepted as given.
pub fn validate(mut form: RecipeForm) -> Result<RecipeForm, RecipeError> {
    if form.name.trim().is_empty() {
        return Err(RecipeError::MissingName);
    }

    form.categories = form
        .categories
        .into_iter()
        .map(|tag| tag.trim().to_string())
        .filter(|tag| !tag.is_empty())
        .collect();

    if form.categories.is_empty() {
        form.categories.push(FALLBACK_CATEGORY.to_string());
    }

    Ok(form)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::RecipeSource;

    #[test]
    fn test_rejects_empty_name() {
        assert!(matches!(
            validate(RecipeForm::new("")),
            Err(RecipeError::MissingName)
        ));
    }

    #[test]
    fn test_rejects_whitespace_name() {
        for name in [" ", "\t", "\n  \n"] {
            assert!(
                matches!(validate(RecipeForm::new(name)), Err(RecipeError::MissingName)),
                "name {:?} should be rejected",
                name
            );
        }
    }

    #[test]
    fn test_empty_categories_fall_back() {
        let form = validate(RecipeForm::new("Hutspot")).unwrap();
        assert_eq!(form.categories, vec!["Other"]);
    }

    #[test]
    fn test_blank_categories_fall_back() {
        let mut form = RecipeForm::new("Hutspot");
        form.categories = vec!["  ".to_string(), String::new()];
        let form = validate(form).unwrap();
        assert_eq!(form.categories, vec!["Other"]);
    }

    #[test]
    fn test_categories_kept_in_order() {
        let mut form = RecipeForm::new("Spaghetti");
        form.categories = vec!["Vlees".to_string(), " Pasta ".to_string(), "Vlees".to_string()];
        let form = validate(form).unwrap();
        assert_eq!(form.categories, vec!["Vlees", "Pasta", "Vlees"]);
    }

    #[test]
    fn test_other_fields_untouched() {
        let form = RecipeForm {
            name: "  Risotto ".to_string(),
            source: RecipeSource::Online {
                url: "not a url".to_string(),
            },
            servings: "veel".to_string(),
            instructions: "  Roeren.\n\n  Blijven roeren.  ".to_string(),
            ..Default::default()
        };
        let validated = validate(form.clone()).unwrap();
        assert_eq!(validated.name, form.name);
        assert_eq!(validated.source, form.source);
        assert_eq!(validated.servings, "veel");
        assert_eq!(validated.instructions, form.instructions);
    }
}
