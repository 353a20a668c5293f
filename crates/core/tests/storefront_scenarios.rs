use emporium_core::{
    CatalogSeed, DuplicatePolicy, Product, ProductId, StoreConfig, StoreError, Storefront, UserId,
};
use rust_decimal::Decimal;

type ScenarioResult<T = ()> = Result<T, String>;

macro_rules! require {
    ($cond:expr) => {
        if !$cond {
            return Err(format!("assertion failed: `{}`", stringify!($cond)));
        }
    };
    ($cond:expr, $($arg:tt)*) => {
        if !$cond {
            return Err(format!($($arg)*));
        }
    };
}

macro_rules! require_eq {
    ($left:expr, $right:expr) => {
        if $left != $right {
            return Err(format!(
                "assertion failed: `left == right` (`{:?}` != `{:?}`)",
                $left,
                $right
            ));
        }
    };
}

fn seeded_store(config: &StoreConfig) -> ScenarioResult<Storefront> {
    let mut store = Storefront::new(config);
    CatalogSeed::demo().apply(&mut store).map_err(|error| format!("demo seed failed: {error}"))?;
    Ok(store)
}

fn section_ids(store: &Storefront, session: &emporium_core::Session) -> ScenarioResult<Vec<Vec<i32>>> {
    let sections = store.recommend(session).map_err(|error| error.to_string())?;
    Ok(sections
        .iter()
        .map(|section| section.products.iter().map(|product| product.id.0).collect())
        .collect())
}

#[test]
fn shopper_walkthrough_over_demo_catalog() -> ScenarioResult {
    let mut store = seeded_store(&StoreConfig::default())?;
    let mut session = store.new_session();

    store.login(&mut session, UserId(1), "lovelace").map_err(|error| error.to_string())?;
    for category in ["electronics", "books", "electronics"] {
        store.browse(&mut session, category).map_err(|error| error.to_string())?;
    }

    let sections = section_ids(&store, &session)?;
    require_eq!(sections, vec![vec![101, 1], vec![102, 2], vec![101, 1]]);

    let record =
        store.purchase(&session, ProductId(101), 4).map_err(|error| error.to_string())?;
    require_eq!(record.quantity.get(), 4);
    require_eq!(store.product(ProductId(101)).map_err(|error| error.to_string())?.inventory, 0);

    let sold_out = store.purchase(&session, ProductId(101), 1);
    require!(
        matches!(sold_out, Err(StoreError::InsufficientInventory { available: 0, .. })),
        "sold-out product should refuse purchase, got {sold_out:?}"
    );
    require_eq!(store.ledger().len(), 1);

    store.logout(&mut session).map_err(|error| error.to_string())?;
    store.login(&mut session, UserId(2), "turing").map_err(|error| error.to_string())?;

    let history: Vec<_> =
        store.purchase_history(&session).map_err(|error| error.to_string())?.collect();
    require!(history.is_empty(), "second shopper should see no purchases");
    require_eq!(store.recommend(&session).err(), Some(StoreError::EmptyHistory));
    Ok(())
}

#[test]
fn catalog_is_frozen_while_a_user_is_logged_in() -> ScenarioResult {
    let mut store = seeded_store(&StoreConfig::default())?;
    let mut session = store.new_session();
    store.login(&mut session, UserId(102), "hopper").map_err(|error| error.to_string())?;

    let lamp = Product {
        id: ProductId(7),
        name: "Lamp".to_string(),
        category: "home".to_string(),
        price: Decimal::new(1999, 2),
        inventory: 3,
    };
    let rejected = store.add_product(&session, lamp.clone());
    require!(
        matches!(rejected, Err(StoreError::InvalidSessionState { operation: "add_product", .. })),
        "logged-in add should be rejected, got {rejected:?}"
    );
    require!(store.product(ProductId(7)).is_err(), "rejected product must not be stored");

    store.logout(&mut session).map_err(|error| error.to_string())?;
    store.add_product(&session, lamp).map_err(|error| error.to_string())?;
    require_eq!(store.product(ProductId(7)).map_err(|error| error.to_string())?.name, "Lamp");
    Ok(())
}

#[test]
fn shadowing_policy_serves_newest_product_for_reused_id() -> ScenarioResult {
    let config = StoreConfig { duplicate_keys: DuplicatePolicy::Shadow, ..StoreConfig::default() };
    let mut store = seeded_store(&config)?;
    let session = store.new_session();

    let replacement = Product {
        id: ProductId(3),
        name: "Stunt Kite".to_string(),
        category: "toys".to_string(),
        price: Decimal::new(3200, 2),
        inventory: 2,
    };
    store.add_product(&session, replacement).map_err(|error| error.to_string())?;

    require_eq!(store.product(ProductId(3)).map_err(|error| error.to_string())?.name, "Stunt Kite");
    let toys: Vec<&str> = store
        .products()
        .filter(|product| product.in_category("toys"))
        .map(|product| product.name.as_str())
        .collect();
    require_eq!(toys, vec!["Stunt Kite", "Kite"]);
    Ok(())
}

#[test]
fn small_bucket_counts_keep_lookups_exact() -> ScenarioResult {
    let config = StoreConfig { bucket_count: 1, ..StoreConfig::default() };
    let store = seeded_store(&config)?;

    for id in [1, 2, 3, 101, 102, 250] {
        require_eq!(store.product(ProductId(id)).map_err(|error| error.to_string())?.id, ProductId(id));
    }
    let order: Vec<i32> = store.products().map(|product| product.id.0).collect();
    require_eq!(order, vec![250, 102, 101, 3, 2, 1]);
    Ok(())
}
