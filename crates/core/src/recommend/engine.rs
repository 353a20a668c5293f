use super::types::CategoryRecommendation;
use super::RecommendationResult;
use crate::browsing::BrowsingBuffer;
use crate::domain::product::{Product, ProductId};
use crate::errors::StoreError;
use crate::index::ChainedIndex;

#[derive(Clone, Copy, Debug, Default)]
pub struct RecommendationEngine;

impl RecommendationEngine {
    pub fn new() -> Self {
        Self
    }

    /// One section per browsed category, in recorded order. Repeated
    /// categories produce repeated sections and a category with no matching
    /// products still yields an (empty) section.
    pub fn recommend<'a>(
        &self,
        products: &'a ChainedIndex<ProductId, Product>,
        history: &'a BrowsingBuffer,
    ) -> RecommendationResult<Vec<CategoryRecommendation<'a>>> {
        if history.is_empty() {
            return Err(StoreError::EmptyHistory);
        }

        let sections = history
            .snapshot()
            .iter()
            .map(|category| CategoryRecommendation {
                category: category.as_str(),
                products: products.values().filter(|product| product.in_category(category)).collect(),
            })
            .collect::<Vec<_>>();

        tracing::debug!(
            event_name = "store.recommend.computed",
            sections = sections.len(),
            matched = sections.iter().map(|section| section.products.len()).sum::<usize>(),
            "recommendations computed"
        );
        Ok(sections)
    }
}
