use crate::errors::StoreError;

pub const DEFAULT_BROWSING_CAPACITY: usize = 10;

/// Fixed-capacity, insertion-ordered record of browsed categories.
///
/// A full buffer rejects new categories instead of evicting old ones.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BrowsingBuffer {
    capacity: usize,
    categories: Vec<String>,
}

impl Default for BrowsingBuffer {
    fn default() -> Self {
        Self::new(DEFAULT_BROWSING_CAPACITY)
    }
}

impl BrowsingBuffer {
    pub fn new(capacity: usize) -> Self {
        Self { capacity, categories: Vec::with_capacity(capacity) }
    }

    pub fn record(&mut self, category: impl Into<String>) -> Result<(), StoreError> {
        if self.is_full() {
            return Err(StoreError::BufferFull { capacity: self.capacity });
        }
        self.categories.push(category.into());
        Ok(())
    }

    pub fn snapshot(&self) -> &[String] {
        &self.categories
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.categories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.categories.len() >= self.capacity
    }

    pub fn clear(&mut self) {
        self.categories.clear();
    }
}
