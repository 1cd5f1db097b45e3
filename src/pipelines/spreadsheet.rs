//! One-way import of recipes kept in a spreadsheet.
//!
//! Only the first sheet is read. Its first row is a header; every following
//! row is positional:
//!
//! | column | meaning                          |
//! |--------|----------------------------------|
//! | 0      | name                             |
//! | 1      | source (URL or book title)       |
//! | 2      | ingredients                      |
//! | 3, 4   | up to two category tags          |
//!
//! Rows without a name are skipped. Everything the sheet cannot express
//! (instructions, times, servings, guests, notes, book author/page) stays
//! empty.

use std::io::Cursor;

use calamine::{open_workbook_auto_from_rs, Data, Reader};
use chrono::{DateTime, Timelike, Utc};
use log::{debug, info};

use crate::error::RecipeError;
use crate::model::{format_timestamp, Recipe, RecipeForm, RecipeSource};
use crate::store::{KeyValueBacking, RecipeStore};
use crate::validate::validate;

/// Number of leading columns the import reads
pub const COLUMNS: u32 = 5;

/// Read the first sheet of a workbook (xlsx, xlsm, xls, or ods) as rows of
/// cell text, header row included. Each row has exactly [`COLUMNS`] cells;
/// missing cells are empty strings.
pub fn read_first_sheet(bytes: &[u8]) -> Result<Vec<Vec<String>>, RecipeError> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes.to_vec()))
        .map_err(|e| RecipeError::ParseFailure(format!("not a readable workbook: {}", e)))?;

    let range = match workbook.worksheet_range_at(0) {
        Some(range) => range.map_err(|e| RecipeError::ParseFailure(e.to_string()))?,
        None => {
            debug!("Workbook has no sheets");
            return Err(RecipeError::NoRecordsFound);
        }
    };

    let (Some((first_row, _)), Some((last_row, _))) = (range.start(), range.end()) else {
        return Ok(Vec::new());
    };

    let rows = (first_row..=last_row)
        .map(|row| {
            (0..COLUMNS)
                .map(|col| {
                    range
                        .get_value((row, col))
                        .map(cell_text)
                        .unwrap_or_default()
                })
                .collect()
        })
        .collect();

    Ok(rows)
}

/// Cell contents as the sheet displays them: booleans in capitals, dates
/// as `YYYY-MM-DD` (with the time when it is not midnight).
pub fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Bool(true) => "TRUE".to_string(),
        Data::Bool(false) => "FALSE".to_string(),
        Data::DateTime(value) => match value.as_datetime() {
            Some(ts) if ts.hour() == 0 && ts.minute() == 0 && ts.second() == 0 => {
                ts.format("%Y-%m-%d").to_string()
            }
            Some(ts) => ts.format("%Y-%m-%d %H:%M").to_string(),
            None => value.to_string(),
        },
        other => other.to_string(),
    }
}

/// Classify free source text: links are online sources, anything else is
/// taken to be a book title.
pub fn classify_source(source: &str) -> RecipeSource {
    let source = source.trim();
    let is_url =
        source.starts_with("http://") || source.starts_with("https://") || source.contains("www.");

    if is_url {
        RecipeSource::Online {
            url: source.to_string(),
        }
    } else {
        RecipeSource::Book {
            title: source.to_string(),
            author: String::new(),
            page: String::new(),
        }
    }
}

fn cell(row: &[String], index: usize) -> &str {
    row.get(index).map(String::as_str).unwrap_or("")
}

/// Form payload for one data row
pub fn row_to_form(row: &[String]) -> RecipeForm {
    RecipeForm {
        name: cell(row, 0).to_string(),
        source: classify_source(cell(row, 1)),
        ingredients: cell(row, 2).to_string(),
        categories: vec![cell(row, 3).to_string(), cell(row, 4).to_string()],
        ..Default::default()
    }
}

/// Convert the data rows (the header is skipped) into recipes.
///
/// Rows rejected by the validator are dropped. `mint_id` is called once per
/// accepted row.
pub fn convert_rows(
    rows: &[Vec<String>],
    mut mint_id: impl FnMut() -> String,
    created_at: &str,
) -> Vec<Recipe> {
    rows.iter()
        .enumerate()
        .skip(1)
        .filter_map(|(index, row)| match validate(row_to_form(row)) {
            Ok(form) => Some(form.into_recipe(mint_id(), created_at.to_string())),
            Err(e) => {
                debug!("Skipping spreadsheet row {}: {}", index + 1, e);
                None
            }
        })
        .collect()
}

/// Import a workbook and append its recipes to the collection.
///
/// Fails with [`RecipeError::NoRecordsFound`] without writing when no row
/// converts. Returns the number of recipes added.
pub fn import<B: KeyValueBacking>(
    store: &mut RecipeStore<B>,
    bytes: &[u8],
    now: DateTime<Utc>,
) -> Result<usize, RecipeError> {
    let rows = read_first_sheet(bytes)?;
    let created_at = format_timestamp(now);

    let converted = convert_rows(&rows, || store.next_id(now), &created_at);

    if converted.is_empty() {
        return Err(RecipeError::NoRecordsFound);
    }

    let count = converted.len();
    store.append(converted)?;
    info!(
        "Imported {} recipes from spreadsheet ({} data rows)",
        count,
        rows.len().saturating_sub(1)
    );
    Ok(count)
}
