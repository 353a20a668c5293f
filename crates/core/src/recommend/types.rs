use serde::Serialize;

use crate::domain::product::Product;

/// Products matching one browsed category, in index traversal order.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct CategoryRecommendation<'a> {
    pub category: &'a str,
    pub products: Vec<&'a Product>,
}

impl CategoryRecommendation<'_> {
    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }
}
