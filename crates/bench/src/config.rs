//! Benchmark configuration types.
//!
//! All sections are optional in the TOML file; missing fields fall back to the
//! defaults below, which reproduce the seeded catalog and run shape the store
//! was originally sized for.

use chrono::NaiveDateTime;
use serde::Deserialize;
use std::fs;
use std::path::Path;
use storeload_store::StoreConfig;
use thiserror::Error;

/// Timestamp format accepted in `[orders]` date fields.
pub const DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Errors that can occur while loading or validating configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Top-level benchmark configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BenchConfig {
    /// Store connection configuration
    #[serde(default)]
    pub store: StoreConfig,

    /// Seeded population sizes
    #[serde(default)]
    pub population: PopulationConfig,

    /// Catalog value ranges
    #[serde(default)]
    pub catalog: CatalogConfig,

    /// Order generation parameters
    #[serde(default)]
    pub orders: OrderConfig,

    /// Run shape (duration, worker sweep, seed)
    #[serde(default)]
    pub run: RunConfig,
}

/// Seeded population sizes.
#[derive(Debug, Clone, Deserialize)]
pub struct PopulationConfig {
    /// Number of registered accounts
    #[serde(default = "default_users")]
    pub users: u32,

    /// Number of catalog products
    #[serde(default = "default_products")]
    pub products: u32,

    /// Reviews inserted by the seeder
    #[serde(default = "default_seed_reviews")]
    pub seed_reviews: u32,

    /// Orders inserted by the seeder
    #[serde(default = "default_seed_orders")]
    pub seed_orders: u32,

    /// Length of generated first and last names
    #[serde(default = "default_name_len")]
    pub name_len: usize,
}

impl Default for PopulationConfig {
    fn default() -> Self {
        Self {
            users: default_users(),
            products: default_products(),
            seed_reviews: default_seed_reviews(),
            seed_orders: default_seed_orders(),
            name_len: default_name_len(),
        }
    }
}

fn default_users() -> u32 {
    1000
}

fn default_products() -> u32 {
    10_000
}

fn default_seed_reviews() -> u32 {
    20_000
}

fn default_seed_orders() -> u32 {
    10_000
}

fn default_name_len() -> usize {
    10
}

/// Catalog value ranges.
#[derive(Debug, Clone, Deserialize)]
pub struct CatalogConfig {
    /// Lowest generated price, in currency units
    #[serde(default = "default_price_min")]
    pub price_min: f64,

    /// Highest generated price, in currency units
    #[serde(default = "default_price_max")]
    pub price_max: f64,

    /// Lowest seeded stock level
    #[serde(default = "default_stock_min")]
    pub stock_min: i32,

    /// Highest seeded stock level
    #[serde(default = "default_stock_max")]
    pub stock_max: i32,

    /// Lowest generated rating (inclusive)
    #[serde(default = "default_rating_min")]
    pub rating_min: f64,

    /// Highest generated rating (exclusive)
    #[serde(default = "default_rating_max")]
    pub rating_max: f64,

    /// Length of generated product names
    #[serde(default = "default_product_name_len")]
    pub product_name_len: usize,

    /// Length of generated product descriptions
    #[serde(default = "default_description_len")]
    pub description_len: usize,

    /// Length of generated review bodies
    #[serde(default = "default_review_text_len")]
    pub review_text_len: usize,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            price_min: default_price_min(),
            price_max: default_price_max(),
            stock_min: default_stock_min(),
            stock_max: default_stock_max(),
            rating_min: default_rating_min(),
            rating_max: default_rating_max(),
            product_name_len: default_product_name_len(),
            description_len: default_description_len(),
            review_text_len: default_review_text_len(),
        }
    }
}

fn default_price_min() -> f64 {
    1.0
}

fn default_price_max() -> f64 {
    100.0
}

fn default_stock_min() -> i32 {
    1
}

fn default_stock_max() -> i32 {
    100
}

fn default_rating_min() -> f64 {
    0.0
}

fn default_rating_max() -> f64 {
    5.0
}

fn default_product_name_len() -> usize {
    15
}

fn default_description_len() -> usize {
    50
}

fn default_review_text_len() -> usize {
    50
}

/// Order generation parameters.
#[derive(Debug, Clone, Deserialize)]
pub struct OrderConfig {
    /// Earliest order date, formatted as [`DATE_FORMAT`]
    #[serde(default = "default_date_min")]
    pub date_min: String,

    /// Latest order date, formatted as [`DATE_FORMAT`]
    #[serde(default = "default_date_max")]
    pub date_max: String,

    /// Line-item draws per order. Draws landing on the same product collapse
    /// into one line, so orders carry up to this many distinct products.
    #[serde(default = "default_max_line_items")]
    pub max_line_items: usize,

    /// Highest quantity per line item
    #[serde(default = "default_max_quantity")]
    pub max_quantity: i32,

    /// Highest delta applied by a restock operation
    #[serde(default = "default_max_restock")]
    pub max_restock: i32,
}

impl Default for OrderConfig {
    fn default() -> Self {
        Self {
            date_min: default_date_min(),
            date_max: default_date_max(),
            max_line_items: default_max_line_items(),
            max_quantity: default_max_quantity(),
            max_restock: default_max_restock(),
        }
    }
}

fn default_date_min() -> String {
    "2020-01-01 00:00:00".to_string()
}

fn default_date_max() -> String {
    "2020-12-31 00:59:00".to_string()
}

fn default_max_line_items() -> usize {
    10
}

fn default_max_quantity() -> i32 {
    3
}

fn default_max_restock() -> i32 {
    10
}

impl OrderConfig {
    /// Parse the configured date window.
    pub fn date_window(&self) -> Result<(NaiveDateTime, NaiveDateTime), ConfigError> {
        let min = parse_date(&self.date_min)?;
        let max = parse_date(&self.date_max)?;

        if min > max {
            return Err(ConfigError::Invalid(format!(
                "orders.date_min {} is after orders.date_max {}",
                self.date_min, self.date_max
            )));
        }

        Ok((min, max))
    }
}

fn parse_date(value: &str) -> Result<NaiveDateTime, ConfigError> {
    NaiveDateTime::parse_from_str(value, DATE_FORMAT).map_err(|e| {
        ConfigError::Invalid(format!(
            "date '{value}' does not match {DATE_FORMAT}: {e}"
        ))
    })
}

/// Run shape: how long to drive load, and at which worker counts.
#[derive(Debug, Clone, Deserialize)]
pub struct RunConfig {
    /// Wall-clock duration of each sweep step, in seconds
    #[serde(default = "default_duration_secs")]
    pub duration_secs: u64,

    /// Worker counts to sweep through, one timed step per entry
    #[serde(default = "default_workers")]
    pub workers: Vec<usize>,

    /// Base RNG seed. When unset, each run seeds from the clock.
    #[serde(default)]
    pub seed: Option<u64>,

    /// Seconds between progress lines
    #[serde(default = "default_progress_interval_secs")]
    pub progress_interval_secs: u64,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            duration_secs: default_duration_secs(),
            workers: default_workers(),
            seed: None,
            progress_interval_secs: default_progress_interval_secs(),
        }
    }
}

fn default_duration_secs() -> u64 {
    300
}

fn default_workers() -> Vec<usize> {
    vec![1, 2]
}

fn default_progress_interval_secs() -> u64 {
    5
}

impl BenchConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path)?;
        Ok(toml::from_str(&contents)?)
    }

    /// Check the configuration for values the generator cannot work with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.population.users == 0 {
            return Err(ConfigError::Invalid(
                "population.users must be at least 1".to_string(),
            ));
        }
        if self.population.products == 0 {
            return Err(ConfigError::Invalid(
                "population.products must be at least 1".to_string(),
            ));
        }

        if self.catalog.price_min <= 0.0 || self.catalog.price_min > self.catalog.price_max {
            return Err(ConfigError::Invalid(format!(
                "catalog price range [{}, {}] must be positive and ordered",
                self.catalog.price_min, self.catalog.price_max
            )));
        }
        if self.catalog.stock_min < 0 || self.catalog.stock_min > self.catalog.stock_max {
            return Err(ConfigError::Invalid(format!(
                "catalog stock range [{}, {}] must be non-negative and ordered",
                self.catalog.stock_min, self.catalog.stock_max
            )));
        }
        if self.catalog.rating_min < 0.0 || self.catalog.rating_min >= self.catalog.rating_max {
            return Err(ConfigError::Invalid(format!(
                "catalog rating range [{}, {}) must be non-negative and non-empty",
                self.catalog.rating_min, self.catalog.rating_max
            )));
        }

        if self.orders.max_line_items == 0 {
            return Err(ConfigError::Invalid(
                "orders.max_line_items must be at least 1".to_string(),
            ));
        }
        if self.orders.max_quantity < 1 {
            return Err(ConfigError::Invalid(
                "orders.max_quantity must be at least 1".to_string(),
            ));
        }
        if self.orders.max_restock < 1 {
            return Err(ConfigError::Invalid(
                "orders.max_restock must be at least 1".to_string(),
            ));
        }
        self.orders.date_window()?;

        if self.run.duration_secs == 0 {
            return Err(ConfigError::Invalid(
                "run.duration_secs must be at least 1".to_string(),
            ));
        }
        if self.run.workers.is_empty() {
            return Err(ConfigError::Invalid(
                "run.workers must list at least one worker count".to_string(),
            ));
        }
        if self.run.workers.iter().any(|&w| w == 0) {
            return Err(ConfigError::Invalid(
                "run.workers entries must be at least 1".to_string(),
            ));
        }

        if self.store.max_connections == 0 {
            return Err(ConfigError::Invalid(
                "store.max_connections must be at least 1".to_string(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use storeload_store::IsolationLevel;

    #[test]
    fn empty_toml_yields_defaults() {
        let config: BenchConfig = toml::from_str("").unwrap();

        assert_eq!(config.population.users, 1000);
        assert_eq!(config.population.products, 10_000);
        assert_eq!(config.population.seed_reviews, 20_000);
        assert_eq!(config.population.seed_orders, 10_000);
        assert_eq!(config.catalog.price_min, 1.0);
        assert_eq!(config.catalog.price_max, 100.0);
        assert_eq!(config.catalog.stock_max, 100);
        assert_eq!(config.orders.max_line_items, 10);
        assert_eq!(config.orders.max_quantity, 3);
        assert_eq!(config.run.duration_secs, 300);
        assert_eq!(config.run.workers, vec![1, 2]);
        assert_eq!(config.run.seed, None);
        assert_eq!(config.store.isolation, IsolationLevel::Serializable);

        config.validate().unwrap();
    }

    #[test]
    fn sections_override_independently() {
        let toml = r#"
            [store]
            max_connections = 4
            isolation = "read_committed"

            [population]
            users = 50

            [run]
            duration_secs = 10
            workers = [1, 2, 4, 8]
            seed = 7
        "#;
        let config: BenchConfig = toml::from_str(toml).unwrap();

        assert_eq!(config.store.max_connections, 4);
        assert_eq!(config.store.isolation, IsolationLevel::ReadCommitted);
        assert_eq!(config.population.users, 50);
        assert_eq!(config.population.products, 10_000);
        assert_eq!(config.run.duration_secs, 10);
        assert_eq!(config.run.workers, vec![1, 2, 4, 8]);
        assert_eq!(config.run.seed, Some(7));

        config.validate().unwrap();
    }

    #[test]
    fn default_date_window_parses() {
        let (min, max) = OrderConfig::default().date_window().unwrap();
        assert!(min < max);
        assert_eq!(min.format(DATE_FORMAT).to_string(), "2020-01-01 00:00:00");
        assert_eq!(max.format(DATE_FORMAT).to_string(), "2020-12-31 00:59:00");
    }

    #[test]
    fn validate_rejects_empty_worker_list() {
        let mut config = BenchConfig::default();
        config.run.workers.clear();
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_inverted_price_range() {
        let mut config = BenchConfig::default();
        config.catalog.price_min = 50.0;
        config.catalog.price_max = 10.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_unparseable_date() {
        let mut config = BenchConfig::default();
        config.orders.date_min = "2020/01/01".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_zero_duration() {
        let mut config = BenchConfig::default();
        config.run.duration_secs = 0;
        assert!(config.validate().is_err());
    }
}
