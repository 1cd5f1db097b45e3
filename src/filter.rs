//! Search and category filtering over a snapshot of the collection.

use std::fmt;

use crate::model::Recipe;

/// Recipes matching both the free-text search and every selected category,
/// in collection order.
///
/// The search is a case-insensitive substring match on the name,
/// ingredients, guests, or book title. An empty term or an empty selection
/// matches everything.
pub fn visible(records: &[Recipe], search_term: &str, selected: &[String]) -> Vec<Recipe> {
    let needle = search_term.to_lowercase();
    records
        .iter()
        .filter(|recipe| matches_search(recipe, &needle) && matches_categories(recipe, selected))
        .cloned()
        .collect()
}

/// `needle` must already be lowercased
pub fn matches_search(recipe: &Recipe, needle: &str) -> bool {
    if needle.is_empty() {
        return true;
    }
    [
        &recipe.name,
        &recipe.ingredients,
        &recipe.guests,
        &recipe.book_title,
    ]
    .iter()
    .any(|field| field.to_lowercase().contains(needle))
}

/// Conjunctive: the recipe must carry every selected tag
pub fn matches_categories(recipe: &Recipe, selected: &[String]) -> bool {
    selected.iter().all(|tag| recipe.has_category(tag))
}

/// The configured palette, followed by any other tag used in `records` in
/// first-seen order.
pub fn all_categories(palette: &[String], records: &[Recipe]) -> Vec<String> {
    let mut tags: Vec<String> = Vec::with_capacity(palette.len());
    let candidates = palette
        .iter()
        .chain(records.iter().flat_map(|recipe| recipe.categories.iter()));
    for tag in candidates {
        if !tags.contains(tag) {
            tags.push(tag.clone());
        }
    }
    tags
}

/// "N of M" counter shown above a filtered list
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FilterSummary {
    pub shown: usize,
    pub total: usize,
}

impl FilterSummary {
    pub fn is_filtered(&self) -> bool {
        self.shown != self.total
    }
}

impl fmt::Display for FilterSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} of {} recipes", self.shown, self.total)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn recipe(id: &str, name: &str, categories: &[&str]) -> Recipe {
        Recipe {
            id: id.to_string(),
            name: name.to_string(),
            categories: categories.iter().map(|c| c.to_string()).collect(),
            ..Default::default()
        }
    }

    fn tags(tags: &[&str]) -> Vec<String> {
        tags.iter().map(|t| t.to_string()).collect()
    }

    fn ids(recipes: &[Recipe]) -> Vec<&str> {
        recipes.iter().map(|r| r.id.as_str()).collect()
    }

    #[test]
    fn test_empty_filters_match_everything() {
        let records = vec![recipe("1", "A", &["Vis"]), recipe("2", "B", &["Other"])];
        assert_eq!(visible(&records, "", &[]), records);
    }

    #[test]
    fn test_category_filter_is_conjunctive() {
        let records = vec![
            recipe("A", "Biefstuk", &["Vlees"]),
            recipe("B", "Lasagne", &["Vlees", "Pasta"]),
            recipe("C", "Pesto", &["Pasta", "vega"]),
        ];
        let result = visible(&records, "", &tags(&["Vlees", "Pasta"]));
        assert_eq!(ids(&result), vec!["B"]);

        let result = visible(&records, "", &tags(&["Pasta"]));
        assert_eq!(ids(&result), vec!["B", "C"]);
    }

    #[test]
    fn test_category_match_is_exact() {
        let records = vec![recipe("1", "Salade", &["vega"])];
        assert!(visible(&records, "", &tags(&["Vega"])).is_empty());
    }

    #[test]
    fn test_search_is_case_insensitive_substring() {
        let mut tomato = recipe("1", "Soep", &["Other"]);
        tomato.ingredients = "3 Tomaten\n1 ui".to_string();
        let records = vec![tomato, recipe("2", "Stamppot", &["Other"])];

        assert_eq!(ids(&visible(&records, "tomaten", &[])), vec!["1"]);
        assert_eq!(ids(&visible(&records, "TOMAT", &[])), vec!["1"]);
        assert!(visible(&records, "paprika", &[]).is_empty());
    }

    #[test]
    fn test_search_fields() {
        let mut by_guest = recipe("g", "Curry", &["Other"]);
        by_guest.guests = "Jan, Marie".to_string();
        let mut by_book = recipe("b", "Taart", &["Toetje"]);
        by_book.book_title = "Marie's Bakboek".to_string();
        let mut by_notes = recipe("n", "Chili", &["Other"]);
        by_notes.notes = "Marie vond het lekker".to_string();

        let records = vec![by_guest, by_book, by_notes];
        assert_eq!(ids(&visible(&records, "marie", &[])), vec!["g", "b"]);
    }

    #[test]
    fn test_search_and_category_combine() {
        let records = vec![
            recipe("1", "Vispannetje", &["Vis"]),
            recipe("2", "Visburger", &["Vlees"]),
        ];
        assert_eq!(ids(&visible(&records, "vis", &tags(&["Vis"]))), vec!["1"]);
    }

    #[test]
    fn test_input_untouched_and_order_kept() {
        let records = vec![
            recipe("3", "Zuurkool", &["Other"]),
            recipe("1", "Andijvie", &["Other"]),
            recipe("2", "Boerenkool", &["Other"]),
        ];
        let before = records.clone();
        let result = visible(&records, "k", &[]);
        assert_eq!(ids(&result), vec!["3", "2"]);
        assert_eq!(records, before);
    }

    #[test]
    fn test_all_categories() {
        let palette = tags(&["Vlees", "Vis"]);
        let records = vec![
            recipe("1", "A", &["Pasta", "Vlees"]),
            recipe("2", "B", &["Other", "Pasta"]),
        ];
        assert_eq!(
            all_categories(&palette, &records),
            vec!["Vlees", "Vis", "Pasta", "Other"]
        );
    }

    #[test]
    fn test_summary() {
        let summary = FilterSummary { shown: 2, total: 5 };
        assert!(summary.is_filtered());
        assert_eq!(summary.to_string(), "2 of 5 recipes");
    }
}
