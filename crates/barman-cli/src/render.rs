//! Plain-text rendering of drinks for the terminal.

use std::fmt::Write;

use barman_core::utils::{format_size, single_line, truncate_string};
use barman_core::{Drink, DrinkRepository, ImageError};

/// Width of the ingredients preview in list rows
const PREVIEW_WIDTH: usize = 48;

/// Width of the name column in list rows
const NAME_WIDTH: usize = 24;

pub fn size(bytes: usize) -> String {
    format_size(bytes)
}

fn list_row(index: usize, id: &str, source: &str, drink: &Drink) -> String {
    format!(
        "{:>3}  {}  {:<7}  {:<name_width$}  {}",
        index,
        id,
        source,
        truncate_string(&drink.name, NAME_WIDTH),
        truncate_string(&single_line(&drink.ingredients), PREVIEW_WIDTH),
        name_width = NAME_WIDTH,
    )
}

pub fn drink_list(repo: &DrinkRepository) -> String {
    if repo.is_empty() {
        return "No drinks yet. Add one with `barman add`.\n".to_string();
    }

    let mut out = String::new();
    for (index, (source, drink)) in repo.entries().enumerate() {
        let row = list_row(index, &drink.id().to_string(), source.label(), drink);
        let _ = writeln!(out, "{}", row.trim_end());
    }
    out
}

pub fn drink_detail(drink: &Drink, image_cached: bool) -> String {
    let image = if !drink.has_image() {
        "none".to_string()
    } else if image_cached {
        format!("{} (cached)", drink.img)
    } else {
        drink.img.clone()
    };

    let mut out = String::new();
    let _ = writeln!(out, "{}", drink.name);
    let _ = writeln!(out, "{}", "=".repeat(drink.name.chars().count()));
    let _ = writeln!(out, "Id:    {}", drink.id());
    let _ = writeln!(out, "Image: {}", image);
    let _ = writeln!(out);
    let _ = writeln!(out, "Ingredients:\n{}", drink.ingredients.trim_end());
    let _ = writeln!(out);
    let _ = writeln!(out, "Directions:\n{}", drink.directions.trim_end());
    out
}

pub fn image_status(image_id: &str, result: Result<usize, &ImageError>) -> String {
    match result {
        Ok(len) => format!("  ok      {} ({})", image_id, format_size(len)),
        Err(e) => format!("  failed  {}: {}", image_id, e),
    }
}
