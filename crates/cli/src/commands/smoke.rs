use std::time::Instant;

use anyhow::{ensure, Context};
use emporium_core::config::{AppConfig, LoadOptions};
use emporium_core::{CatalogSeed, ProductId, Session, Storefront, UserId};
use serde::Serialize;

use crate::commands::CommandResult;

const SMOKE_USER: UserId = UserId(1);
const SMOKE_SECRET: &str = "lovelace";
const SMOKE_PRODUCT: ProductId = ProductId(1);
const SMOKE_CATEGORIES: [&str; 2] = ["electronics", "books"];

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
enum SmokeStatus {
    Pass,
    Fail,
    Skipped,
}

#[derive(Debug, Serialize)]
struct SmokeCheck {
    name: &'static str,
    status: SmokeStatus,
    elapsed_ms: u64,
    message: String,
}

#[derive(Debug, Serialize)]
struct SmokeReport {
    command: &'static str,
    status: SmokeStatus,
    summary: String,
    total_elapsed_ms: u64,
    checks: Vec<SmokeCheck>,
}

struct Scenario {
    store: Storefront,
    session: Session,
}

type Step = fn(&mut Scenario) -> anyhow::Result<String>;

const STEPS: [(&str, Step); 7] = [
    ("seed_catalog", seed_catalog),
    ("login", login),
    ("browse", browse),
    ("purchase", purchase),
    ("purchase_history", purchase_history),
    ("recommend", recommend),
    ("logout", logout),
];

pub fn run() -> CommandResult {
    let started = Instant::now();
    let mut checks = Vec::new();

    let config = match timed_check(|| AppConfig::load(LoadOptions::default())) {
        Ok((elapsed_ms, config)) => {
            checks.push(SmokeCheck {
                name: "config_validation",
                status: SmokeStatus::Pass,
                elapsed_ms,
                message: "configuration loaded and validated".to_string(),
            });
            config
        }
        Err((elapsed_ms, error)) => {
            checks.push(SmokeCheck {
                name: "config_validation",
                status: SmokeStatus::Fail,
                elapsed_ms,
                message: error.to_string(),
            });
            checks.extend(STEPS.iter().map(|(name, _)| skipped(*name)));
            return finalize_report(checks, elapsed_since(started));
        }
    };

    let store = Storefront::new(&config.store);
    let session = store.new_session();
    let mut scenario = Scenario { store, session };

    let mut failed = false;
    for (name, step) in STEPS {
        if failed {
            checks.push(skipped(name));
            continue;
        }

        match timed_check(|| step(&mut scenario)) {
            Ok((elapsed_ms, message)) => {
                checks.push(SmokeCheck { name, status: SmokeStatus::Pass, elapsed_ms, message })
            }
            Err((elapsed_ms, error)) => {
                failed = true;
                checks.push(SmokeCheck {
                    name,
                    status: SmokeStatus::Fail,
                    elapsed_ms,
                    message: format!("{error:#}"),
                });
            }
        }
    }

    finalize_report(checks, elapsed_since(started))
}

fn seed_catalog(scenario: &mut Scenario) -> anyhow::Result<String> {
    let summary =
        CatalogSeed::demo().apply(&mut scenario.store).context("demo catalog did not load")?;
    Ok(format!("loaded {} users and {} products", summary.users, summary.products))
}

fn login(scenario: &mut Scenario) -> anyhow::Result<String> {
    let Scenario { store, session } = scenario;
    store.login(session, SMOKE_USER, SMOKE_SECRET).context("demo user login failed")?;

    let rejected = store.login(session, UserId(2), "turing").is_err();
    ensure!(rejected, "second login on an active session should be rejected");
    Ok(format!("logged in as user {SMOKE_USER}"))
}

fn browse(scenario: &mut Scenario) -> anyhow::Result<String> {
    let Scenario { store, session } = scenario;
    for category in SMOKE_CATEGORIES {
        store
            .browse(session, category)
            .with_context(|| format!("browsing `{category}` failed"))?;
    }
    Ok(format!("browsed {}", store.browsing_history(session).join(", ")))
}

fn purchase(scenario: &mut Scenario) -> anyhow::Result<String> {
    let Scenario { store, session } = scenario;
    let before = store.product(SMOKE_PRODUCT)?.inventory;

    let record = store.purchase(session, SMOKE_PRODUCT, 2).context("purchase failed")?;
    let after = store.product(SMOKE_PRODUCT)?.inventory;
    ensure!(after + 2 == before, "inventory should drop by 2 (before {before}, after {after})");

    let oversell = store.purchase(session, SMOKE_PRODUCT, after + 1);
    ensure!(oversell.is_err(), "purchasing more than the remaining stock should fail");
    ensure!(store.ledger().len() == 1, "exactly one ledger record should exist");

    Ok(format!(
        "bought {} of product {} ({before} -> {after} in stock)",
        record.quantity, record.product_id
    ))
}

fn purchase_history(scenario: &mut Scenario) -> anyhow::Result<String> {
    let Scenario { store, session } = scenario;
    let records: Vec<_> = store.purchase_history(session)?.collect();
    ensure!(records.len() == 1, "expected one purchase, found {}", records.len());
    ensure!(records[0].product_id == SMOKE_PRODUCT, "history should list the purchased product");
    Ok(format!("{} purchase(s) on record", records.len()))
}

fn recommend(scenario: &mut Scenario) -> anyhow::Result<String> {
    let Scenario { store, session } = scenario;
    let sections = store.recommend(session).context("recommendation failed")?;
    ensure!(
        sections.len() == SMOKE_CATEGORIES.len(),
        "expected one section per browsed category"
    );

    let matched: usize = sections.iter().map(|section| section.products.len()).sum();
    let electronics: Vec<ProductId> =
        sections[0].products.iter().map(|product| product.id).collect();
    ensure!(
        electronics.contains(&SMOKE_PRODUCT),
        "electronics recommendations should include product {SMOKE_PRODUCT}"
    );
    Ok(format!("{matched} products across {} categories", sections.len()))
}

fn logout(scenario: &mut Scenario) -> anyhow::Result<String> {
    let Scenario { store, session } = scenario;
    let user_id = store.logout(session).context("logout failed")?;
    ensure!(store.logout(session).is_err(), "second logout should report no session");
    Ok(format!("user {user_id} logged out"))
}

fn elapsed_since(started: Instant) -> u64 {
    u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX)
}

fn timed_check<T, E>(check: impl FnOnce() -> Result<T, E>) -> Result<(u64, T), (u64, E)> {
    let started = Instant::now();
    match check() {
        Ok(value) => Ok((elapsed_since(started), value)),
        Err(error) => Err((elapsed_since(started), error)),
    }
}

fn skipped(name: &'static str) -> SmokeCheck {
    SmokeCheck {
        name,
        status: SmokeStatus::Skipped,
        elapsed_ms: 0,
        message: "skipped due previous failure".to_string(),
    }
}

fn finalize_report(checks: Vec<SmokeCheck>, total_elapsed_ms: u64) -> CommandResult {
    let passed = checks.iter().filter(|check| check.status == SmokeStatus::Pass).count();
    let total = checks.len();
    let failed = checks.iter().any(|check| check.status == SmokeStatus::Fail);

    let report = SmokeReport {
        command: "smoke",
        status: if failed { SmokeStatus::Fail } else { SmokeStatus::Pass },
        summary: format!("smoke: {passed}/{total} checks passed in {total_elapsed_ms}ms"),
        total_elapsed_ms,
        checks,
    };

    let human = report.summary.clone();
    let machine = serde_json::to_string(&report).unwrap_or_else(|error| {
        format!(
            "{{\"command\":\"smoke\",\"status\":\"fail\",\"summary\":\"serialization failed\",\"error\":\"{}\"}}",
            error.to_string().replace('\\', "\\\\").replace('"', "\\\"")
        )
    });

    CommandResult { exit_code: if failed { 6 } else { 0 }, output: format!("{human}\n{machine}") }
}
