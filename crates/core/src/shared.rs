use std::sync::Arc;

use tokio::sync::RwLock;

use crate::config::StoreConfig;
use crate::domain::product::{Product, ProductId};
use crate::domain::purchase::PurchaseRecord;
use crate::domain::user::{Secret, UserId, UserProfile};
use crate::errors::StoreError;
use crate::session::Session;
use crate::storefront::Storefront;

/// A [`Storefront`] shared between concurrent callers.
///
/// Mutations hold the write lock for their whole check-then-act sequence, so
/// two purchases of the same product can never both pass the stock check
/// against the same inventory. Every caller keeps its own [`Session`].
#[derive(Clone, Default)]
pub struct SharedStorefront {
    inner: Arc<RwLock<Storefront>>,
}

impl SharedStorefront {
    pub fn new(settings: &StoreConfig) -> Self {
        Self::from_store(Storefront::new(settings))
    }

    pub fn from_store(store: Storefront) -> Self {
        Self { inner: Arc::new(RwLock::new(store)) }
    }

    pub async fn new_session(&self) -> Session {
        self.inner.read().await.new_session()
    }

    pub async fn register_user(
        &self,
        id: UserId,
        name: impl Into<String>,
        email: impl Into<String>,
        secret: Secret,
    ) -> Result<(), StoreError> {
        let mut store = self.inner.write().await;
        store.register_user(id, name, email, secret)
    }

    pub async fn user(&self, id: UserId) -> Result<UserProfile, StoreError> {
        let store = self.inner.read().await;
        store.user(id).map(UserProfile::from)
    }

    pub async fn login(
        &self,
        session: &mut Session,
        id: UserId,
        secret: &str,
    ) -> Result<UserId, StoreError> {
        let store = self.inner.read().await;
        store.login(session, id, secret)
    }

    pub async fn logout(&self, session: &mut Session) -> Result<UserId, StoreError> {
        let store = self.inner.read().await;
        store.logout(session)
    }

    pub async fn add_product(&self, session: &Session, product: Product) -> Result<(), StoreError> {
        let mut store = self.inner.write().await;
        store.add_product(session, product)
    }

    pub async fn product(&self, id: ProductId) -> Result<Product, StoreError> {
        let store = self.inner.read().await;
        store.product(id).cloned()
    }

    pub async fn products(&self) -> Vec<Product> {
        let store = self.inner.read().await;
        store.products().cloned().collect()
    }

    pub async fn update_inventory(
        &self,
        session: &Session,
        id: ProductId,
        inventory: u32,
    ) -> Result<u32, StoreError> {
        let mut store = self.inner.write().await;
        store.update_inventory(session, id, inventory)
    }

    pub async fn purchase(
        &self,
        session: &Session,
        product_id: ProductId,
        quantity: u32,
    ) -> Result<PurchaseRecord, StoreError> {
        let mut store = self.inner.write().await;
        store.purchase(session, product_id, quantity)
    }

    pub async fn purchase_history(&self, session: &Session) -> Result<Vec<PurchaseRecord>, StoreError> {
        let store = self.inner.read().await;
        Ok(store.purchase_history(session)?.copied().collect())
    }

    pub async fn browse(
        &self,
        session: &mut Session,
        category: impl Into<String>,
    ) -> Result<(), StoreError> {
        let store = self.inner.read().await;
        store.browse(session, category)
    }

    /// Owned copies of each matched product, grouped by browsed category.
    pub async fn recommend(
        &self,
        session: &Session,
    ) -> Result<Vec<(String, Vec<Product>)>, StoreError> {
        let store = self.inner.read().await;
        let sections = store.recommend(session)?;
        Ok(sections
            .into_iter()
            .map(|section| {
                (
                    section.category.to_string(),
                    section.products.into_iter().cloned().collect(),
                )
            })
            .collect())
    }

    /// Runs `read` against a consistent snapshot of the store.
    pub async fn with_store<R>(&self, read: impl FnOnce(&Storefront) -> R) -> R {
        let store = self.inner.read().await;
        read(&store)
    }
}
