//! Initial data seeding.
//!
//! Populates a freshly rebuilt schema with accounts, products, reviews and
//! orders so the workload has something to read and contend on. Seeding runs
//! through the same transactional operations as the benchmark itself, so
//! expected constraint violations (duplicate review pairs, drained stock,
//! serialization conflicts between concurrent inserts) are counted and the
//! row is simply retried with fresh arguments.

use crate::config::{BenchConfig, ConfigError};
use crate::population::Population;
use futures::future::join_all;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::Serialize;
use std::future::Future;
use storeload_store::{ErrorKind, Store, StoreError};
use thiserror::Error;
use tracing::info;

/// Rows submitted concurrently per batch.
const SEED_BATCH: usize = 64;

/// Attempt budget per stage, as a multiple of the stage target.
const RETRY_FACTOR: u64 = 10;

/// Log seeding progress roughly this often, in created rows.
const PROGRESS_EVERY: u64 = 2_000;

/// Errors that can occur during seeding.
#[derive(Debug, Error)]
pub enum SeedError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("seeding stage '{stage}' exhausted its retry budget: {attempts} attempts for target {target}")]
    RetryBudgetExhausted {
        stage: &'static str,
        target: u64,
        attempts: u64,
    },
}

/// Row counts produced by a seeding run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SeedSummary {
    /// Accounts inserted by this run.
    pub users_created: u64,
    /// Accounts that already existed (re-seed of a populated schema).
    pub users_existing: u64,
    /// Products inserted.
    pub products_created: u64,
    /// Reviews inserted.
    pub reviews_created: u64,
    /// Orders inserted.
    pub orders_created: u64,
    /// Constraint violations absorbed and retried along the way.
    pub expected_violations: u64,
}

/// Seeds the schema up to the configured population sizes.
pub struct Seeder {
    store: Store,
    population: Population,
    users: u64,
    products: u64,
    reviews: u64,
    orders: u64,
    base_seed: u64,
}

impl Seeder {
    /// Build a seeder from the benchmark configuration.
    pub fn new(store: Store, config: &BenchConfig) -> Result<Self, ConfigError> {
        let population = Population::new(&config.population, &config.catalog, &config.orders)?;

        let base_seed = config.run.seed.unwrap_or_else(|| {
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .unwrap()
                .as_nanos() as u64
        });

        Ok(Self {
            store,
            population,
            users: config.population.users as u64,
            products: config.population.products as u64,
            reviews: config.population.seed_reviews as u64,
            orders: config.population.seed_orders as u64,
            base_seed,
        })
    }

    /// Run all seeding stages in dependency order.
    pub async fn run(&self) -> Result<SeedSummary, SeedError> {
        let mut summary = SeedSummary::default();

        self.seed_users(&mut summary).await?;

        let mut rng = ChaCha8Rng::seed_from_u64(self.base_seed.wrapping_add(2));
        summary.products_created = self
            .seed_stage("products", self.products, &mut summary.expected_violations, || {
                let store = self.store.clone();
                let name = self.population.product_name(&mut rng);
                let description = self.population.description(&mut rng);
                let price = self.population.price(&mut rng);
                let stock = self.population.stock(&mut rng);
                async move {
                    store
                        .add_product(&name, Some(&description), price, stock)
                        .await
                        .map(|_| ())
                }
            })
            .await?;
        info!(products = summary.products_created, "Seeded products");

        let mut rng = ChaCha8Rng::seed_from_u64(self.base_seed.wrapping_add(3));
        summary.reviews_created = self
            .seed_stage("reviews", self.reviews, &mut summary.expected_violations, || {
                let store = self.store.clone();
                let credentials = self.population.sample_credentials(&mut rng);
                let product = self.population.sample_product(&mut rng);
                let text = self.population.review_text(&mut rng);
                let rating = self.population.rating(&mut rng);
                async move {
                    store
                        .post_review(&credentials, product, Some(&text), rating)
                        .await
                }
            })
            .await?;
        info!(reviews = summary.reviews_created, "Seeded reviews");

        let mut rng = ChaCha8Rng::seed_from_u64(self.base_seed.wrapping_add(4));
        summary.orders_created = self
            .seed_stage("orders", self.orders, &mut summary.expected_violations, || {
                let store = self.store.clone();
                let credentials = self.population.sample_credentials(&mut rng);
                let line_items = self.population.line_items(&mut rng);
                let order_date = self.population.order_date(&mut rng);
                async move {
                    store
                        .submit_order(&credentials, &line_items, order_date)
                        .await
                        .map(|_| ())
                }
            })
            .await?;
        info!(orders = summary.orders_created, "Seeded orders");

        info!(
            users = summary.users_created,
            existing = summary.users_existing,
            products = summary.products_created,
            reviews = summary.reviews_created,
            orders = summary.orders_created,
            expected_violations = summary.expected_violations,
            "Seeding complete"
        );

        Ok(summary)
    }

    /// Insert accounts `1..=users` under the deterministic credential scheme.
    ///
    /// Runs sequentially: every index must end up present, and an existing
    /// row (re-seeding a populated schema) counts as success.
    async fn seed_users(&self, summary: &mut SeedSummary) -> Result<(), SeedError> {
        let mut rng = ChaCha8Rng::seed_from_u64(self.base_seed.wrapping_add(1));

        for index in 1..=self.users {
            let account = self.population.account_for(index as u32, &mut rng);
            match self.store.create_account(&account).await {
                Ok(()) => summary.users_created += 1,
                Err(e) if e.kind() == ErrorKind::DuplicateKey => summary.users_existing += 1,
                Err(e) => return Err(e.into()),
            }

            if index % PROGRESS_EVERY == 0 {
                info!(
                    stage = "users",
                    created = index,
                    target = self.users,
                    "Seeding progress"
                );
            }
        }

        info!(
            users = summary.users_created,
            existing = summary.users_existing,
            "Seeded accounts"
        );
        Ok(())
    }

    /// Drive one batched stage until `target` rows have been created.
    ///
    /// `build` synthesizes the arguments for one row and returns the insert
    /// future; batches of those futures run concurrently. Expected constraint
    /// violations are counted and the row retried, up to an attempt budget of
    /// `RETRY_FACTOR * target`.
    async fn seed_stage<F, Fut>(
        &self,
        stage: &'static str,
        target: u64,
        expected_violations: &mut u64,
        mut build: F,
    ) -> Result<u64, SeedError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<(), StoreError>>,
    {
        let budget = target.saturating_mul(RETRY_FACTOR);
        let mut created = 0u64;
        let mut attempts = 0u64;
        let mut last_logged = 0u64;

        while created < target {
            if attempts >= budget {
                return Err(SeedError::RetryBudgetExhausted {
                    stage,
                    target,
                    attempts,
                });
            }

            let batch = ((target - created) as usize).min(SEED_BATCH);
            let mut futures = Vec::with_capacity(batch);
            for _ in 0..batch {
                futures.push(build());
            }
            attempts += batch as u64;

            for result in join_all(futures).await {
                match result {
                    Ok(()) => created += 1,
                    Err(e) if e.kind().is_expected() => *expected_violations += 1,
                    Err(e) => return Err(e.into()),
                }
            }

            if created - last_logged >= PROGRESS_EVERY {
                info!(stage, created, target, "Seeding progress");
                last_logged = created;
            }
        }

        Ok(created)
    }
}
