use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use log::debug;

use recipe_box::{open_configured, ImportKind, Recipe, RecipeBook, RecipeForm, RecipeSource};

#[derive(Parser)]
#[command(name = "recipe-box")]
#[command(about = "Keep a personal recipe collection", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List recipes, optionally narrowed by search term and categories
    List {
        /// Case-insensitive text searched in name, ingredients, guests and book title
        #[arg(short, long, default_value = "")]
        search: String,
        /// Only show recipes carrying this category (repeatable, all must match)
        #[arg(short, long = "category")]
        categories: Vec<String>,
    },
    /// Show one recipe in full
    Show { id: String },
    /// Add a new recipe
    Add(RecipeArgs),
    /// Replace the fields of an existing recipe
    Edit {
        id: String,
        #[command(flatten)]
        recipe: RecipeArgs,
    },
    /// Delete a recipe
    Delete {
        id: String,
        /// Do not ask for confirmation
        #[arg(long)]
        yes: bool,
    },
    /// Write the whole collection to recepten-YYYY-MM-DD.json
    Export {
        /// Directory to write the export into
        #[arg(long, default_value = ".")]
        dir: PathBuf,
    },
    /// Import a JSON export (merged unless --replace) or a workbook
    Import {
        file: PathBuf,
        /// Replace the whole collection with the file's recipes
        #[arg(long)]
        replace: bool,
        /// Do not ask for confirmation
        #[arg(long)]
        yes: bool,
    },
    /// Import the first sheet of an xlsx/xls/ods workbook
    ImportSheet { file: PathBuf },
    /// List the category tags available for selection
    Categories,
}

#[derive(Args)]
struct RecipeArgs {
    /// Recipe name
    #[arg(long)]
    name: String,
    /// Category tag (repeatable)
    #[arg(short, long = "category")]
    categories: Vec<String>,
    /// Link to the recipe online
    #[arg(long, conflicts_with_all = ["book", "author", "page"])]
    url: Option<String>,
    /// Title of the cookbook the recipe comes from
    #[arg(long)]
    book: Option<String>,
    #[arg(long)]
    author: Option<String>,
    #[arg(long)]
    page: Option<String>,
    /// Ingredients, one per line
    #[arg(long, default_value = "")]
    ingredients: String,
    #[arg(long, default_value = "")]
    instructions: String,
    #[arg(long, default_value = "")]
    prep_time: String,
    #[arg(long, default_value = "")]
    cook_time: String,
    #[arg(long, default_value = "")]
    servings: String,
    /// Guests the dish was served to, comma separated
    #[arg(long, default_value = "")]
    guests: String,
    #[arg(long, default_value = "")]
    notes: String,
}

impl From<RecipeArgs> for RecipeForm {
    fn from(args: RecipeArgs) -> Self {
        let is_book = args.book.is_some() || args.author.is_some() || args.page.is_some();
        let source = if is_book {
            RecipeSource::Book {
                title: args.book.unwrap_or_default(),
                author: args.author.unwrap_or_default(),
                page: args.page.unwrap_or_default(),
            }
        } else {
            RecipeSource::Online {
                url: args.url.unwrap_or_default(),
            }
        };

        RecipeForm {
            name: args.name,
            categories: args.categories,
            source,
            ingredients: args.ingredients,
            instructions: args.instructions,
            prep_time: args.prep_time,
            cook_time: args.cook_time,
            servings: args.servings,
            guests: args.guests,
            notes: args.notes,
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let cli = Cli::parse();

    let mut book = open_configured()?;
    debug!("Opened recipe book with {} recipes", book.recipes().len());

    match cli.command {
        Commands::List { search, categories } => list(&book, &search, &categories),
        Commands::Show { id } => match book.get(&id) {
            Some(recipe) => print_recipe(recipe),
            None => return Err(format!("No recipe with id {}", id).into()),
        },
        Commands::Add(args) => {
            let recipe = book.submit(args.into(), None)?;
            println!("Added {} ({})", recipe.name, recipe.id);
        }
        Commands::Edit { id, recipe } => {
            let recipe = book.submit(recipe.into(), Some(&id))?;
            println!("Updated {} ({})", recipe.name, recipe.id);
        }
        Commands::Delete { id, yes } => {
            let name = match book.get(&id) {
                Some(recipe) => recipe.name.clone(),
                None => return Err(format!("No recipe with id {}", id).into()),
            };
            if !yes && !confirm(&format!("Delete '{}'?", name))? {
                println!("Cancelled");
                return Ok(());
            }
            book.delete(&id)?;
            println!("Deleted {}", name);
        }
        Commands::Export { dir } => {
            let path = book.export_to_dir(&dir).await?;
            println!("Exported {} recipes to {}", book.recipes().len(), path.display());
        }
        Commands::Import {
            file,
            replace,
            yes,
        } => {
            let kind = if replace {
                ImportKind::Replace
            } else {
                ImportKind::detect(&file)
            };
            import(&mut book, &file, kind, yes).await?;
        }
        Commands::ImportSheet { file } => {
            import(&mut book, &file, ImportKind::Spreadsheet, true).await?;
        }
        Commands::Categories => {
            for tag in book.categories() {
                println!("{}", tag);
            }
        }
    }

    Ok(())
}

fn list(book: &RecipeBook, search: &str, categories: &[String]) {
    let visible = book.filter(search, categories);
    for recipe in &visible {
        println!(
            "{}  {}  [{}]",
            recipe.id,
            recipe.name,
            recipe.categories.join(", ")
        );
    }

    let summary = book.summary(visible.len());
    if summary.is_filtered() {
        println!("{}", summary);
    }
}

async fn import(
    book: &mut RecipeBook,
    file: &Path,
    kind: ImportKind,
    yes: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    if kind.is_destructive()
        && !yes
        && !confirm(&format!(
            "Replace all {} recipes with the contents of {}?",
            book.recipes().len(),
            file.display()
        ))?
    {
        println!("Cancelled");
        return Ok(());
    }

    let count = book.import_file(file, kind).await?;
    match kind {
        ImportKind::Replace => println!("Collection replaced with {} recipes", count),
        _ => println!("Imported {} recipes", count),
    }
    Ok(())
}

fn print_recipe(recipe: &Recipe) {
    println!("{}", recipe.name);
    println!("Categories: {}", recipe.categories.join(", "));
    match recipe.source() {
        RecipeSource::Online { url } if !url.is_empty() => println!("Source: {}", url),
        RecipeSource::Online { .. } => {}
        RecipeSource::Book {
            title,
            author,
            page,
        } => {
            let mut line = format!("Book: {}", title);
            if !author.is_empty() {
                line.push_str(&format!(" by {}", author));
            }
            if !page.is_empty() {
                line.push_str(&format!(", p. {}", page));
            }
            println!("{}", line);
        }
    }

    for (label, value) in [
        ("Prep time", &recipe.prep_time),
        ("Cook time", &recipe.cook_time),
        ("Servings", &recipe.servings),
    ] {
        if !value.is_empty() {
            println!("{}: {}", label, value);
        }
    }

    let ingredients = recipe.ingredient_lines();
    if !ingredients.is_empty() {
        println!("\nIngredients:");
        for line in ingredients {
            println!("  - {}", line);
        }
    }
    if !recipe.instructions.is_empty() {
        println!("\n{}", recipe.instructions);
    }

    let guests = recipe.guest_names();
    if !guests.is_empty() {
        println!("\nServed to: {}", guests.join(", "));
    }
    if !recipe.notes.is_empty() {
        println!("\nNotes: {}", recipe.notes);
    }
}

fn confirm(prompt: &str) -> io::Result<bool> {
    print!("{} [y/N] ", prompt);
    io::stdout().flush()?;

    let mut answer = String::new();
    io::stdin().lock().read_line(&mut answer)?;
    Ok(matches!(answer.trim(), "y" | "Y" | "yes"))
}
