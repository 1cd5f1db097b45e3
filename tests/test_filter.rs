use pretty_assertions::assert_eq;
use recipe_box::{visible, FilterSummary, RecipeBook, RecipeForm, RecipeSource};

fn form(name: &str, categories: &[&str], ingredients: &str) -> RecipeForm {
    let mut form = RecipeForm::new(name);
    form.categories = categories.iter().map(|c| c.to_string()).collect();
    form.ingredients = ingredients.to_string();
    form
}

fn selected(tags: &[&str]) -> Vec<String> {
    tags.iter().map(|t| t.to_string()).collect()
}

fn names(book: &RecipeBook, search: &str, tags: &[&str]) -> Vec<String> {
    book.filter(search, &selected(tags))
        .into_iter()
        .map(|r| r.name)
        .collect()
}

fn sample_book() -> RecipeBook {
    let mut book = RecipeBook::builder().in_memory().build().unwrap();
    book.submit(form("Biefstuk", &["Vlees"], "2 biefstukken\nboter"), None)
        .unwrap();
    book.submit(
        form("Lasagne", &["Vlees", "Pasta"], "lasagnebladen\n3 Tomaten"),
        None,
    )
    .unwrap();

    let mut pesto = form("Pasta pesto", &["Pasta", "vega"], "basilicum\npijnboompitten");
    pesto.guests = "Thomas, Anna".to_string();
    book.submit(pesto, None).unwrap();

    let mut taart = form("Appeltaart", &["Toetje"], "appels");
    taart.source = RecipeSource::Book {
        title: "Oma's Bakboek".to_string(),
        author: "Oma".to_string(),
        page: "12".to_string(),
    };
    book.submit(taart, None).unwrap();
    book
}

#[test]
fn test_conjunctive_categories() {
    let book = sample_book();
    assert_eq!(names(&book, "", &["Vlees", "Pasta"]), vec!["Lasagne"]);
    assert_eq!(names(&book, "", &["Pasta"]), vec!["Lasagne", "Pasta pesto"]);
    assert!(names(&book, "", &["Vlees", "Toetje"]).is_empty());
}

#[test]
fn test_search_case_insensitive() {
    let book = sample_book();
    assert_eq!(names(&book, "tomaten", &[]), vec!["Lasagne"]);
    assert_eq!(names(&book, "TOMAT", &[]), vec!["Lasagne"]);
}

#[test]
fn test_search_guests_and_book_title() {
    let book = sample_book();
    assert_eq!(names(&book, "anna", &[]), vec!["Pasta pesto"]);
    assert_eq!(names(&book, "bakboek", &[]), vec!["Appeltaart"]);
    // Ingredients of other recipes do not leak into the match
    assert!(names(&book, "bakboek", &["Vlees"]).is_empty());
}

#[test]
fn test_search_combined_with_categories() {
    let book = sample_book();
    assert_eq!(names(&book, "pasta", &["vega"]), vec!["Pasta pesto"]);
    assert!(names(&book, "pasta", &["Vlees"]).is_empty());
}

#[test]
fn test_empty_filters_show_everything_in_order() {
    let book = sample_book();
    let all = visible(book.recipes(), "", &[]);
    assert_eq!(all.as_slice(), book.recipes());
}

#[test]
fn test_summary() {
    let book = sample_book();
    let shown = book.filter("", &selected(&["Pasta"])).len();
    let summary = book.summary(shown);

    assert_eq!(summary, FilterSummary { shown: 2, total: 4 });
    assert!(summary.is_filtered());
    assert_eq!(summary.to_string(), "2 of 4 recipes");
    assert!(!book.summary(4).is_filtered());
}

#[test]
fn test_categories_list_palette_then_extra_tags() {
    let mut book = sample_book();
    book.submit(form("Gazpacho", &["Soep"], "tomaten"), None)
        .unwrap();

    let categories = book.categories();
    assert_eq!(
        &categories[..9],
        &[
            "Vlees",
            "Vis",
            "vega",
            "Voorgerecht",
            "Toetje",
            "Bijgerecht",
            "Thomas",
            "Ontbijt",
            "Pasta"
        ]
    );
    assert_eq!(&categories[9..], &["Soep"]);
}
