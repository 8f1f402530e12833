//! Population model and value samplers.
//!
//! The population is the universe the workload draws from: which user indexes
//! exist, which product ids exist, and the value ranges for prices, stock,
//! ratings, quantities and order dates. Credentials are deterministic in the
//! user index, so generated operations authenticate against seeded rows
//! without any shared lookup state.

use crate::config::{CatalogConfig, ConfigError, OrderConfig, PopulationConfig};
use chrono::NaiveDateTime;
use rand::distributions::Alphanumeric;
use rand::Rng;
use rust_decimal::Decimal;
use storeload_types::{Account, Credentials, LineItems, ProductId, Username};

/// Username prefix of the deterministic credential scheme.
pub const USER_PREFIX: &str = "user";

/// Password prefix of the deterministic credential scheme.
pub const PASSWORD_PREFIX: &str = "password";

/// Credentials of the seeded user at `index`.
///
/// Index `i` always maps to `user{i}` / `password{i}`, so any generator that
/// knows the population size can produce valid logins.
pub fn credentials_for(index: u32) -> Credentials {
    Credentials {
        username: Username::new(format!("{USER_PREFIX}{index}")),
        password: format!("{PASSWORD_PREFIX}{index}"),
    }
}

/// Flattened snapshot of the configured population and value ranges.
///
/// Built once at startup from the config sections and then shared (cloned)
/// into the seeder and every worker.
#[derive(Debug, Clone)]
pub struct Population {
    users: u32,
    products: u32,
    name_len: usize,
    product_name_len: usize,
    description_len: usize,
    review_text_len: usize,
    price_cents_min: i64,
    price_cents_max: i64,
    stock_min: i32,
    stock_max: i32,
    rating_min: f64,
    rating_max: f64,
    max_line_items: usize,
    max_quantity: i32,
    max_restock: i32,
    date_min: NaiveDateTime,
    date_max: NaiveDateTime,
}

impl Population {
    /// Build the population from validated config sections.
    pub fn new(
        population: &PopulationConfig,
        catalog: &CatalogConfig,
        orders: &OrderConfig,
    ) -> Result<Self, ConfigError> {
        let (date_min, date_max) = orders.date_window()?;

        // Prices are drawn in whole cents so every generated value is an
        // exact two-decimal quantity.
        let price_cents_min = (catalog.price_min * 100.0).round() as i64;
        let price_cents_max = (catalog.price_max * 100.0).round() as i64;

        Ok(Self {
            users: population.users,
            products: population.products,
            name_len: population.name_len,
            product_name_len: catalog.product_name_len,
            description_len: catalog.description_len,
            review_text_len: catalog.review_text_len,
            price_cents_min,
            price_cents_max,
            stock_min: catalog.stock_min,
            stock_max: catalog.stock_max,
            rating_min: catalog.rating_min,
            rating_max: catalog.rating_max,
            max_line_items: orders.max_line_items,
            max_quantity: orders.max_quantity,
            max_restock: orders.max_restock,
            date_min,
            date_max,
        })
    }

    /// Number of users in the population.
    pub fn users(&self) -> u32 {
        self.users
    }

    /// Number of products in the population.
    pub fn products(&self) -> u32 {
        self.products
    }

    /// Uniformly drawn user index, in `1..=users`.
    pub fn sample_user_index(&self, rng: &mut impl Rng) -> u32 {
        rng.gen_range(1..=self.users)
    }

    /// Credentials of a uniformly drawn seeded user.
    pub fn sample_credentials(&self, rng: &mut impl Rng) -> Credentials {
        credentials_for(self.sample_user_index(rng))
    }

    /// Full account row for the user at `index`: deterministic credentials,
    /// random display names.
    pub fn account_for(&self, index: u32, rng: &mut impl Rng) -> Account {
        let credentials = credentials_for(index);
        Account {
            username: credentials.username,
            password: credentials.password,
            first_name: alphanumeric(rng, self.name_len),
            last_name: alphanumeric(rng, self.name_len),
        }
    }

    /// Uniformly drawn product id, in `1..=products`.
    pub fn sample_product(&self, rng: &mut impl Rng) -> ProductId {
        ProductId(rng.gen_range(1..=self.products) as i32)
    }

    /// Random product name.
    pub fn product_name(&self, rng: &mut impl Rng) -> String {
        alphanumeric(rng, self.product_name_len)
    }

    /// Random product description.
    pub fn description(&self, rng: &mut impl Rng) -> String {
        alphanumeric(rng, self.description_len)
    }

    /// Random review body.
    pub fn review_text(&self, rng: &mut impl Rng) -> String {
        alphanumeric(rng, self.review_text_len)
    }

    /// Random price, exact at two decimal places.
    pub fn price(&self, rng: &mut impl Rng) -> Decimal {
        Decimal::new(rng.gen_range(self.price_cents_min..=self.price_cents_max), 2)
    }

    /// Random initial stock level.
    pub fn stock(&self, rng: &mut impl Rng) -> i32 {
        rng.gen_range(self.stock_min..=self.stock_max)
    }

    /// Random rating in `[rating_min, rating_max)`.
    pub fn rating(&self, rng: &mut impl Rng) -> f64 {
        rng.gen_range(self.rating_min..self.rating_max)
    }

    /// Random per-line quantity, at least one.
    pub fn quantity(&self, rng: &mut impl Rng) -> i32 {
        rng.gen_range(1..=self.max_quantity)
    }

    /// Random restock delta, at least one.
    pub fn restock_delta(&self, rng: &mut impl Rng) -> i32 {
        rng.gen_range(1..=self.max_restock)
    }

    /// Random order date inside the configured window.
    pub fn order_date(&self, rng: &mut impl Rng) -> NaiveDateTime {
        let span = (self.date_max - self.date_min).num_seconds();
        self.date_min + chrono::Duration::seconds(rng.gen_range(0..=span))
    }

    /// Random basket: `max_line_items` draws, collapsed per product.
    pub fn line_items(&self, rng: &mut impl Rng) -> LineItems {
        let mut items = LineItems::new();
        for _ in 0..self.max_line_items {
            let product = self.sample_product(rng);
            let quantity = self.quantity(rng);
            items.insert(product, quantity);
        }
        items
    }
}

fn alphanumeric(rng: &mut impl Rng, len: usize) -> String {
    (0..len).map(|_| char::from(rng.sample(Alphanumeric))).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{CatalogConfig, OrderConfig, PopulationConfig};
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn population() -> Population {
        Population::new(
            &PopulationConfig::default(),
            &CatalogConfig::default(),
            &OrderConfig::default(),
        )
        .unwrap()
    }

    #[test]
    fn credentials_are_deterministic_in_the_index() {
        let creds = credentials_for(42);
        assert_eq!(creds.username.as_str(), "user42");
        assert_eq!(creds.password, "password42");
        assert_eq!(credentials_for(42).username, creds.username);
    }

    #[test]
    fn sampled_values_stay_in_range() {
        let pop = population();
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let (date_min, date_max) = OrderConfig::default().date_window().unwrap();

        for _ in 0..1000 {
            let index = pop.sample_user_index(&mut rng);
            assert!((1..=pop.users()).contains(&index));

            let product = pop.sample_product(&mut rng);
            assert!((1..=pop.products() as i32).contains(&product.0));

            let price = pop.price(&mut rng);
            assert!(price >= Decimal::new(100, 2));
            assert!(price <= Decimal::new(10_000, 2));
            assert_eq!(price.scale(), 2);

            let stock = pop.stock(&mut rng);
            assert!((1..=100).contains(&stock));

            let rating = pop.rating(&mut rng);
            assert!((0.0..5.0).contains(&rating));

            let quantity = pop.quantity(&mut rng);
            assert!((1..=3).contains(&quantity));

            let date = pop.order_date(&mut rng);
            assert!(date >= date_min && date <= date_max);
        }
    }

    #[test]
    fn accounts_carry_deterministic_credentials_and_sized_names() {
        let pop = population();
        let mut rng = ChaCha8Rng::seed_from_u64(2);

        let account = pop.account_for(7, &mut rng);
        assert_eq!(account.username.as_str(), "user7");
        assert_eq!(account.password, "password7");
        assert_eq!(account.first_name.len(), 10);
        assert_eq!(account.last_name.len(), 10);
        assert!(account.first_name.chars().all(|c| c.is_ascii_alphanumeric()));
    }

    #[test]
    fn baskets_collapse_repeated_products() {
        let pop = population();
        let mut rng = ChaCha8Rng::seed_from_u64(3);

        for _ in 0..100 {
            let items = pop.line_items(&mut rng);
            assert!(!items.is_empty());
            assert!(items.len() <= 10);
            for (product, quantity) in items.iter() {
                assert!((1..=pop.products() as i32).contains(&product.0));
                assert!((1..=3).contains(&quantity));
            }
        }
    }
}
