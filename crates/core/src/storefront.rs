use std::num::NonZeroU32;

use rust_decimal::Decimal;

use crate::config::StoreConfig;
use crate::domain::product::{Product, ProductId};
use crate::domain::purchase::PurchaseRecord;
use crate::domain::user::{Secret, User, UserId};
use crate::errors::StoreError;
use crate::index::ChainedIndex;
use crate::ledger::{Ledger, PurchasesFor};
use crate::recommend::{CategoryRecommendation, RecommendationEngine};
use crate::session::Session;

/// The in-process store: user and product indices plus the purchase ledger.
///
/// Session-gated operations take the caller's [`Session`] explicitly.
#[derive(Clone, Debug)]
pub struct Storefront {
    users: ChainedIndex<UserId, User>,
    products: ChainedIndex<ProductId, Product>,
    ledger: Ledger,
    engine: RecommendationEngine,
    settings: StoreConfig,
}

impl Default for Storefront {
    fn default() -> Self {
        Self::new(&StoreConfig::default())
    }
}

impl Storefront {
    pub fn new(settings: &StoreConfig) -> Self {
        Self {
            users: ChainedIndex::new("user", settings.bucket_count, settings.duplicate_keys),
            products: ChainedIndex::new("product", settings.bucket_count, settings.duplicate_keys),
            ledger: Ledger::new(),
            engine: RecommendationEngine::new(),
            settings: settings.clone(),
        }
    }

    pub fn settings(&self) -> &StoreConfig {
        &self.settings
    }

    /// A logged-out session sized and configured for this store.
    pub fn new_session(&self) -> Session {
        Session::new(self.settings.browsing_capacity)
            .clear_history_on_logout(self.settings.clear_history_on_logout)
    }

    /// Registration always refuses an existing id, whatever the index policy.
    pub fn register_user(
        &mut self,
        id: UserId,
        name: impl Into<String>,
        email: impl Into<String>,
        secret: Secret,
    ) -> Result<(), StoreError> {
        if self.users.contains(&id) {
            tracing::debug!(
                event_name = "store.user.register_rejected",
                user_id = id.0,
                "user id already registered"
            );
            return Err(StoreError::duplicate(self.users.entity(), id));
        }

        let user = User { id, name: name.into(), email: email.into(), secret };
        self.users.insert(id, user)?;
        tracing::info!(event_name = "store.user.registered", user_id = id.0, "user registered");
        Ok(())
    }

    pub fn user(&self, id: UserId) -> Result<&User, StoreError> {
        self.users.lookup(&id).ok_or_else(|| StoreError::not_found(self.users.entity(), id))
    }

    pub fn users(&self) -> impl Iterator<Item = &User> + '_ {
        self.users.values()
    }

    pub fn user_index(&self) -> &ChainedIndex<UserId, User> {
        &self.users
    }

    pub fn login(
        &self,
        session: &mut Session,
        id: UserId,
        secret: &str,
    ) -> Result<UserId, StoreError> {
        session.login(&self.users, id, secret)
    }

    pub fn logout(&self, session: &mut Session) -> Result<UserId, StoreError> {
        session.logout()
    }

    /// Catalog additions are only accepted while the session is logged out.
    pub fn add_product(&mut self, session: &Session, product: Product) -> Result<(), StoreError> {
        session.require_logged_out("add_product")?;
        if product.price < Decimal::ZERO {
            return Err(StoreError::InvalidPrice { price: product.price });
        }

        let id = product.id;
        let category = product.category.clone();
        self.products.insert(id, product)?;
        tracing::info!(
            event_name = "store.product.added",
            product_id = id.0,
            category = %category,
            "product added"
        );
        Ok(())
    }

    pub fn product(&self, id: ProductId) -> Result<&Product, StoreError> {
        self.products.lookup(&id).ok_or_else(|| StoreError::not_found(self.products.entity(), id))
    }

    pub fn products(&self) -> impl Iterator<Item = &Product> + '_ {
        self.products.values()
    }

    pub fn product_index(&self) -> &ChainedIndex<ProductId, Product> {
        &self.products
    }

    /// Overwrites a product's stock count and returns the previous value.
    pub fn update_inventory(
        &mut self,
        session: &Session,
        id: ProductId,
        inventory: u32,
    ) -> Result<u32, StoreError> {
        session.require_logged_in("update_inventory")?;
        let previous =
            self.products.update(&id, |product| std::mem::replace(&mut product.inventory, inventory))?;
        tracing::info!(
            event_name = "store.product.inventory_updated",
            product_id = id.0,
            previous,
            inventory,
            "inventory updated"
        );
        Ok(previous)
    }

    /// Decrements stock and appends one ledger record, or changes nothing.
    pub fn purchase(
        &mut self,
        session: &Session,
        product_id: ProductId,
        quantity: u32,
    ) -> Result<PurchaseRecord, StoreError> {
        let user_id = session.require_logged_in("purchase")?;
        let quantity = NonZeroU32::new(quantity).ok_or(StoreError::InvalidQuantity)?;

        let reserved = self.products.update(&product_id, |product| {
            if product.inventory < quantity.get() {
                return Err(StoreError::InsufficientInventory {
                    product_id,
                    requested: quantity.get(),
                    available: product.inventory,
                });
            }
            product.inventory -= quantity.get();
            Ok(product.inventory)
        })?;

        let remaining = match reserved {
            Ok(remaining) => remaining,
            Err(error) => {
                tracing::debug!(
                    event_name = "store.purchase.rejected",
                    user_id = user_id.0,
                    product_id = product_id.0,
                    error_class = error.error_class(),
                    "purchase rejected"
                );
                return Err(error);
            }
        };

        let record = self.ledger.append(user_id, product_id, quantity);
        tracing::info!(
            event_name = "store.purchase.recorded",
            user_id = user_id.0,
            product_id = product_id.0,
            quantity = quantity.get(),
            remaining,
            "purchase recorded"
        );
        Ok(record)
    }

    /// The logged-in user's purchases, most recent first.
    pub fn purchase_history(&self, session: &Session) -> Result<PurchasesFor<'_>, StoreError> {
        let user_id = session.require_logged_in("purchase_history")?;
        Ok(self.ledger.purchases_for(user_id))
    }

    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    pub fn browse(&self, session: &mut Session, category: impl Into<String>) -> Result<(), StoreError> {
        let user_id = session.require_logged_in("browse")?;
        let category = category.into();

        if let Err(error) = session.history_mut().record(category.clone()) {
            tracing::warn!(
                event_name = "store.browsing.buffer_full",
                user_id = user_id.0,
                category = %category,
                "browsing history is full"
            );
            return Err(error);
        }

        tracing::debug!(
            event_name = "store.browsing.recorded",
            user_id = user_id.0,
            category = %category,
            "category browsed"
        );
        Ok(())
    }

    pub fn browsing_history<'s>(&self, session: &'s Session) -> &'s [String] {
        session.history().snapshot()
    }

    pub fn recommend<'a>(
        &'a self,
        session: &'a Session,
    ) -> Result<Vec<CategoryRecommendation<'a>>, StoreError> {
        session.require_logged_in("recommend")?;
        self.engine.recommend(&self.products, session.history())
    }
}
