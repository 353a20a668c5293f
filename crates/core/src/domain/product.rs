use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::index::{integer_bucket, IndexKey};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductId(pub i32);

impl fmt::Display for ProductId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i32> for ProductId {
    fn from(id: i32) -> Self {
        Self(id)
    }
}

impl IndexKey for ProductId {
    fn bucket_of(&self, bucket_count: usize) -> usize {
        integer_bucket(i64::from(self.0), bucket_count)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub category: String,
    pub price: Decimal,
    pub inventory: u32,
}

impl Product {
    /// Case-sensitive exact comparison against a browsed category label.
    pub fn in_category(&self, category: &str) -> bool {
        self.category == category
    }
}
