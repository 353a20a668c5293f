pub mod browsing;
pub mod config;
pub mod domain;
pub mod errors;
pub mod fixtures;
pub mod index;
pub mod ledger;
pub mod recommend;
pub mod session;
pub mod shared;
pub mod storefront;

pub use browsing::BrowsingBuffer;
pub use config::{AppConfig, ConfigError, LoadOptions, LogFormat, StoreConfig};
pub use domain::product::{Product, ProductId};
pub use domain::purchase::PurchaseRecord;
pub use domain::user::{Secret, User, UserId, UserProfile};
pub use errors::StoreError;
pub use fixtures::{CatalogSeed, SeedError, SeedSummary};
pub use index::{ChainedIndex, DuplicatePolicy, IndexKey};
pub use ledger::{Ledger, PurchasesFor};
pub use recommend::{CategoryRecommendation, RecommendationEngine};
pub use session::{Session, SessionRequirement, SessionState};
pub use shared::SharedStorefront;
pub use storefront::Storefront;
