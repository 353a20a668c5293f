//! Catalog seeds: a deterministic demo dataset plus TOML seed files, both
//! validated against the field bounds the interactive front end enforces.

use std::fs;
use std::path::{Path, PathBuf};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::product::{Product, ProductId};
use crate::domain::user::{Secret, UserId};
use crate::errors::StoreError;
use crate::storefront::Storefront;

/// Longest accepted name, email or category, in characters.
pub const MAX_TEXT_LEN: usize = 49;
/// Longest accepted secret, in characters.
pub const MAX_SECRET_LEN: usize = 19;

#[derive(Debug, Error)]
pub enum SeedError {
    #[error("could not read seed file `{path}`: {source}")]
    ReadFile { path: PathBuf, source: std::io::Error },
    #[error("could not parse seed file `{path}`: {source}")]
    ParseFile { path: PathBuf, source: toml::de::Error },
    #[error("invalid seed entry: {0}")]
    Invalid(String),
    #[error(transparent)]
    Store(#[from] StoreError),
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CatalogSeed {
    #[serde(default)]
    pub users: Vec<UserSeed>,
    #[serde(default)]
    pub products: Vec<ProductSeed>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UserSeed {
    pub id: i32,
    pub name: String,
    pub email: String,
    pub secret: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProductSeed {
    pub id: i32,
    pub name: String,
    pub category: String,
    pub price: Decimal,
    pub inventory: u32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct SeedSummary {
    pub users: usize,
    pub products: usize,
}

struct DemoUser {
    id: i32,
    name: &'static str,
    email: &'static str,
    secret: &'static str,
}

struct DemoProduct {
    id: i32,
    name: &'static str,
    category: &'static str,
    price_cents: i64,
    inventory: u32,
}

const DEMO_USERS: &[DemoUser] = &[
    DemoUser { id: 1, name: "ada", email: "ada@example.com", secret: "lovelace" },
    DemoUser { id: 2, name: "alan", email: "alan@example.com", secret: "turing" },
    DemoUser { id: 102, name: "grace", email: "grace@example.com", secret: "hopper" },
];

const DEMO_PRODUCTS: &[DemoProduct] = &[
    DemoProduct { id: 1, name: "Headphones", category: "electronics", price_cents: 5_999, inventory: 12 },
    DemoProduct { id: 2, name: "Paperback", category: "books", price_cents: 1_250, inventory: 40 },
    DemoProduct { id: 3, name: "Kite", category: "toys", price_cents: 2_400, inventory: 6 },
    DemoProduct { id: 101, name: "E-Reader", category: "electronics", price_cents: 11_900, inventory: 4 },
    DemoProduct { id: 102, name: "Cookbook", category: "books", price_cents: 3_100, inventory: 9 },
    DemoProduct { id: 250, name: "Trowel", category: "garden", price_cents: 899, inventory: 25 },
];

impl CatalogSeed {
    pub fn demo() -> Self {
        Self {
            users: DEMO_USERS
                .iter()
                .map(|user| UserSeed {
                    id: user.id,
                    name: user.name.to_string(),
                    email: user.email.to_string(),
                    secret: user.secret.to_string(),
                })
                .collect(),
            products: DEMO_PRODUCTS
                .iter()
                .map(|product| ProductSeed {
                    id: product.id,
                    name: product.name.to_string(),
                    category: product.category.to_string(),
                    price: Decimal::new(product.price_cents, 2),
                    inventory: product.inventory,
                })
                .collect(),
        }
    }

    pub fn from_path(path: &Path) -> Result<Self, SeedError> {
        let raw = fs::read_to_string(path)
            .map_err(|source| SeedError::ReadFile { path: path.to_path_buf(), source })?;
        toml::from_str(&raw)
            .map_err(|source| SeedError::ParseFile { path: path.to_path_buf(), source })
    }

    pub fn validate(&self) -> Result<(), SeedError> {
        for user in &self.users {
            let context = format!("user {}", user.id);
            check_text(&context, "name", &user.name, MAX_TEXT_LEN)?;
            check_text(&context, "email", &user.email, MAX_TEXT_LEN)?;
            check_text(&context, "secret", &user.secret, MAX_SECRET_LEN)?;
        }

        for product in &self.products {
            let context = format!("product {}", product.id);
            check_text(&context, "name", &product.name, MAX_TEXT_LEN)?;
            check_text(&context, "category", &product.category, MAX_TEXT_LEN)?;
            if product.price < Decimal::ZERO {
                return Err(SeedError::Invalid(format!("{context}: price must not be negative")));
            }
        }

        Ok(())
    }

    /// Validates, then registers every user and adds every product through a
    /// fresh logged-out session. Stops at the first rejected entry.
    pub fn apply(&self, store: &mut Storefront) -> Result<SeedSummary, SeedError> {
        self.validate()?;

        for user in &self.users {
            store.register_user(
                UserId(user.id),
                user.name.clone(),
                user.email.clone(),
                Secret::new(user.secret.clone()),
            )?;
        }

        let session = store.new_session();
        for product in &self.products {
            store.add_product(
                &session,
                Product {
                    id: ProductId(product.id),
                    name: product.name.clone(),
                    category: product.category.clone(),
                    price: product.price,
                    inventory: product.inventory,
                },
            )?;
        }

        let summary = SeedSummary { users: self.users.len(), products: self.products.len() };
        tracing::info!(
            event_name = "store.seed.applied",
            users = summary.users,
            products = summary.products,
            "catalog seed applied"
        );
        Ok(summary)
    }
}

fn check_text(context: &str, field: &str, value: &str, max_len: usize) -> Result<(), SeedError> {
    if value.trim().is_empty() {
        return Err(SeedError::Invalid(format!("{context}: {field} must not be empty")));
    }
    if value.chars().count() > max_len {
        return Err(SeedError::Invalid(format!(
            "{context}: {field} must be at most {max_len} characters"
        )));
    }
    Ok(())
}
