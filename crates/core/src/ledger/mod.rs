use std::iter::Rev;
use std::num::NonZeroU32;
use std::slice;

use crate::domain::product::ProductId;
use crate::domain::purchase::PurchaseRecord;
use crate::domain::user::UserId;

/// Process-wide append-only purchase log.
///
/// Records are never removed or mutated. Reads are newest-first and filter by
/// scanning the whole log; there is no per-user index.
#[derive(Clone, Debug, Default)]
pub struct Ledger {
    entries: Vec<PurchaseRecord>,
}

impl Ledger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(
        &mut self,
        user_id: UserId,
        product_id: ProductId,
        quantity: NonZeroU32,
    ) -> PurchaseRecord {
        let record = PurchaseRecord { user_id, product_id, quantity };
        self.entries.push(record);
        record
    }

    /// Records for `user_id`, most recent first. Clone the iterator to restart it.
    pub fn purchases_for(&self, user_id: UserId) -> PurchasesFor<'_> {
        PurchasesFor { user_id, entries: self.entries.iter().rev() }
    }

    /// Every record, most recent first.
    pub fn iter(&self) -> Rev<slice::Iter<'_, PurchaseRecord>> {
        self.entries.iter().rev()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[derive(Clone, Debug)]
pub struct PurchasesFor<'a> {
    user_id: UserId,
    entries: Rev<slice::Iter<'a, PurchaseRecord>>,
}

impl<'a> Iterator for PurchasesFor<'a> {
    type Item = &'a PurchaseRecord;

    fn next(&mut self) -> Option<Self::Item> {
        let user_id = self.user_id;
        self.entries.find(|record| record.user_id == user_id)
    }
}
