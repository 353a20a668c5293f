use std::num::NonZeroU32;

use serde::Serialize;

use crate::domain::product::ProductId;
use crate::domain::user::UserId;

/// One purchase event. Immutable once appended to the ledger.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct PurchaseRecord {
    pub user_id: UserId,
    pub product_id: ProductId,
    pub quantity: NonZeroU32,
}
