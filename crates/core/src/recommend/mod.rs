//! Category-matching product recommendations.
//!
//! Every browsed category is matched against a full scan of the product index,
//! so the cost is `history length x catalog size`.

mod engine;
mod types;

pub use engine::RecommendationEngine;
pub use types::CategoryRecommendation;

use crate::errors::StoreError;

pub type RecommendationResult<T> = Result<T, StoreError>;
