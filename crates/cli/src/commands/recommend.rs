use std::path::Path;

use emporium_core::fixtures::CatalogSeed;
use emporium_core::{CategoryRecommendation, StoreError, Storefront, UserId};
use serde::Serialize;

use crate::commands::{load_config, load_seed, seed_failure, CommandResult};

#[derive(Debug, Serialize)]
struct RecommendationReport<'a> {
    user_id: UserId,
    browsed: &'a [String],
    sections: &'a [CategoryRecommendation<'a>],
}

pub fn run(categories: &[String], user: Option<i32>, file: Option<&Path>) -> CommandResult {
    let config = match load_config("recommend") {
        Ok(config) => config,
        Err(result) => return result,
    };

    let seed = match load_seed("recommend", file) {
        Ok(seed) => seed,
        Err(result) => return result,
    };

    let mut store = Storefront::new(&config.store);
    if let Err(error) = seed.apply(&mut store) {
        return seed_failure("recommend", &error);
    }

    let (user_id, secret) = match seeded_credentials(&seed, user) {
        Ok(credentials) => credentials,
        Err(error) => return CommandResult::store_failure("recommend", &error, 4),
    };

    let mut session = store.new_session();
    if let Err(error) = store.login(&mut session, user_id, secret) {
        return CommandResult::store_failure("recommend", &error, 4);
    }

    for category in categories {
        if let Err(error) = store.browse(&mut session, category.as_str()) {
            return CommandResult::store_failure("recommend", &error, 4);
        }
    }

    let sections = match store.recommend(&session) {
        Ok(sections) => sections,
        Err(error) => return CommandResult::store_failure("recommend", &error, 4),
    };

    let matched: usize = sections.iter().map(|section| section.products.len()).sum();
    let message = format!(
        "{matched} recommended products across {} browsed categories for user {user_id}",
        sections.len()
    );
    let report = RecommendationReport {
        user_id,
        browsed: store.browsing_history(&session),
        sections: &sections,
    };
    CommandResult::success_with("recommend", message, Some(report))
}

/// Picks the requested user, or the first seeded one, together with the
/// secret it was seeded with.
fn seeded_credentials(seed: &CatalogSeed, user: Option<i32>) -> Result<(UserId, &str), StoreError> {
    let entry = match user {
        Some(id) => seed.users.iter().find(|candidate| candidate.id == id),
        None => seed.users.first(),
    };

    match entry {
        Some(entry) => Ok((UserId(entry.id), entry.secret.as_str())),
        None => Err(StoreError::NotFound {
            entity: "user",
            key: user.map(|id| id.to_string()).unwrap_or_else(|| "<none seeded>".to_string()),
        }),
    }
}
