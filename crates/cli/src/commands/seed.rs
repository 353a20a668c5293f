use std::path::Path;

use emporium_core::Storefront;

use crate::commands::{load_config, load_seed, seed_failure, CommandResult};

pub fn run(file: Option<&Path>) -> CommandResult {
    let config = match load_config("seed") {
        Ok(config) => config,
        Err(result) => return result,
    };

    let seed = match load_seed("seed", file) {
        Ok(seed) => seed,
        Err(result) => return result,
    };

    let mut store = Storefront::new(&config.store);
    let summary = match seed.apply(&mut store) {
        Ok(summary) => summary,
        Err(error) => return seed_failure("seed", &error),
    };

    let source = file.map(|path| path.display().to_string()).unwrap_or_else(|| "demo".to_string());
    let categories = distinct_categories(&store);
    let message = format!(
        "catalog seed loaded from {source}: {} users, {} products across {} categories ({})",
        summary.users,
        summary.products,
        categories.len(),
        categories.join(", ")
    );
    CommandResult::success_with("seed", message, Some(summary))
}

/// Categories in catalog traversal order, first occurrence wins.
fn distinct_categories(store: &Storefront) -> Vec<&str> {
    let mut categories: Vec<&str> = Vec::new();
    for product in store.products() {
        if !categories.contains(&product.category.as_str()) {
            categories.push(product.category.as_str());
        }
    }
    categories
}
