//! Weighted operation generation.
//!
//! Operations are a tagged enum with typed payloads. Selection draws a
//! number in `1..=100` and maps it through cumulative thresholds, so the mix
//! is exact in expectation and cheap to sample.

use crate::population::Population;
use chrono::NaiveDateTime;
use rand::Rng;
use rust_decimal::Decimal;
use storeload_types::{Account, Credentials, LineItems, ProductId, Username};

/// Discriminant of a generated [`Operation`], used for stats and latency
/// bucketing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OpKind {
    CreateAccount,
    AddProduct,
    UpdateStockLevel,
    GetProductAndReviews,
    GetAverageUserRating,
    SubmitOrder,
    PostReview,
}

impl OpKind {
    /// Every kind, in weight-table order.
    pub const ALL: [OpKind; 7] = [
        OpKind::CreateAccount,
        OpKind::AddProduct,
        OpKind::UpdateStockLevel,
        OpKind::GetProductAndReviews,
        OpKind::GetAverageUserRating,
        OpKind::SubmitOrder,
        OpKind::PostReview,
    ];

    /// Number of operation kinds.
    pub const COUNT: usize = Self::ALL.len();

    /// Position in [`Self::ALL`].
    pub fn index(self) -> usize {
        match self {
            OpKind::CreateAccount => 0,
            OpKind::AddProduct => 1,
            OpKind::UpdateStockLevel => 2,
            OpKind::GetProductAndReviews => 3,
            OpKind::GetAverageUserRating => 4,
            OpKind::SubmitOrder => 5,
            OpKind::PostReview => 6,
        }
    }

    /// Stable snake_case name for logs and reports.
    pub fn label(self) -> &'static str {
        match self {
            OpKind::CreateAccount => "create_account",
            OpKind::AddProduct => "add_product",
            OpKind::UpdateStockLevel => "update_stock_level",
            OpKind::GetProductAndReviews => "get_product_and_reviews",
            OpKind::GetAverageUserRating => "get_average_user_rating",
            OpKind::SubmitOrder => "submit_order",
            OpKind::PostReview => "post_review",
        }
    }
}

/// A fully materialized operation, ready to run against the store.
#[derive(Debug, Clone)]
pub enum Operation {
    CreateAccount(Account),
    AddProduct {
        name: String,
        description: Option<String>,
        price: Decimal,
        stock: i32,
    },
    UpdateStockLevel {
        product_id: ProductId,
        delta: i32,
    },
    GetProductAndReviews {
        product_id: ProductId,
    },
    GetAverageUserRating {
        username: Username,
    },
    SubmitOrder {
        credentials: Credentials,
        line_items: LineItems,
        order_date: NaiveDateTime,
    },
    PostReview {
        credentials: Credentials,
        product_id: ProductId,
        review_text: Option<String>,
        rating: f64,
    },
}

impl Operation {
    /// Discriminant of this operation.
    pub fn kind(&self) -> OpKind {
        match self {
            Operation::CreateAccount(_) => OpKind::CreateAccount,
            Operation::AddProduct { .. } => OpKind::AddProduct,
            Operation::UpdateStockLevel { .. } => OpKind::UpdateStockLevel,
            Operation::GetProductAndReviews { .. } => OpKind::GetProductAndReviews,
            Operation::GetAverageUserRating { .. } => OpKind::GetAverageUserRating,
            Operation::SubmitOrder { .. } => OpKind::SubmitOrder,
            Operation::PostReview { .. } => OpKind::PostReview,
        }
    }
}

/// Map a draw in `1..=100` to an operation kind.
///
/// | draw   | kind                 | weight |
/// |--------|----------------------|--------|
/// | 1-3    | CreateAccount        | 3%     |
/// | 4-5    | AddProduct           | 2%     |
/// | 6-15   | UpdateStockLevel     | 10%    |
/// | 16-80  | GetProductAndReviews | 65%    |
/// | 81-85  | GetAverageUserRating | 5%     |
/// | 86-95  | SubmitOrder          | 10%    |
/// | 96-100 | PostReview           | 5%     |
pub(crate) fn kind_for_draw(draw: u8) -> OpKind {
    debug_assert!((1..=100).contains(&draw));
    match draw {
        1..=3 => OpKind::CreateAccount,
        4..=5 => OpKind::AddProduct,
        6..=15 => OpKind::UpdateStockLevel,
        16..=80 => OpKind::GetProductAndReviews,
        81..=85 => OpKind::GetAverageUserRating,
        86..=95 => OpKind::SubmitOrder,
        _ => OpKind::PostReview,
    }
}

/// Generator for the retail mix: mostly catalog reads, a steady trickle of
/// orders, reviews and stock updates, and the occasional account or product
/// insert.
///
/// `CreateAccount` deliberately draws an index inside the seeded population,
/// so most attempts collide with an existing row and surface as
/// `ErrorKind::DuplicateKey`. That keeps the unique-constraint path under
/// constant exercise.
#[derive(Debug, Clone)]
pub struct RetailWorkload {
    population: Population,
}

impl RetailWorkload {
    /// Create a workload over the given population.
    pub fn new(population: Population) -> Self {
        Self { population }
    }

    /// The population this workload draws from.
    pub fn population(&self) -> &Population {
        &self.population
    }

    /// Generate one operation with synthesized arguments.
    pub fn generate(&self, rng: &mut impl Rng) -> Operation {
        let draw = rng.gen_range(1..=100u8);
        match kind_for_draw(draw) {
            OpKind::CreateAccount => {
                let index = self.population.sample_user_index(rng);
                Operation::CreateAccount(self.population.account_for(index, rng))
            }
            OpKind::AddProduct => Operation::AddProduct {
                name: self.population.product_name(rng),
                description: Some(self.population.description(rng)),
                price: self.population.price(rng),
                stock: self.population.stock(rng),
            },
            OpKind::UpdateStockLevel => Operation::UpdateStockLevel {
                product_id: self.population.sample_product(rng),
                delta: self.population.restock_delta(rng),
            },
            OpKind::GetProductAndReviews => Operation::GetProductAndReviews {
                product_id: self.population.sample_product(rng),
            },
            OpKind::GetAverageUserRating => Operation::GetAverageUserRating {
                username: self.population.sample_credentials(rng).username,
            },
            OpKind::SubmitOrder => Operation::SubmitOrder {
                credentials: self.population.sample_credentials(rng),
                line_items: self.population.line_items(rng),
                order_date: self.population.order_date(rng),
            },
            OpKind::PostReview => Operation::PostReview {
                credentials: self.population.sample_credentials(rng),
                product_id: self.population.sample_product(rng),
                review_text: Some(self.population.review_text(rng)),
                rating: self.population.rating(rng),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{CatalogConfig, OrderConfig, PopulationConfig};
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn workload() -> RetailWorkload {
        let population = Population::new(
            &PopulationConfig::default(),
            &CatalogConfig::default(),
            &OrderConfig::default(),
        )
        .unwrap();
        RetailWorkload::new(population)
    }

    #[test]
    fn draw_boundaries_map_to_the_weight_table() {
        assert_eq!(kind_for_draw(1), OpKind::CreateAccount);
        assert_eq!(kind_for_draw(3), OpKind::CreateAccount);
        assert_eq!(kind_for_draw(4), OpKind::AddProduct);
        assert_eq!(kind_for_draw(5), OpKind::AddProduct);
        assert_eq!(kind_for_draw(6), OpKind::UpdateStockLevel);
        assert_eq!(kind_for_draw(15), OpKind::UpdateStockLevel);
        assert_eq!(kind_for_draw(16), OpKind::GetProductAndReviews);
        assert_eq!(kind_for_draw(80), OpKind::GetProductAndReviews);
        assert_eq!(kind_for_draw(81), OpKind::GetAverageUserRating);
        assert_eq!(kind_for_draw(85), OpKind::GetAverageUserRating);
        assert_eq!(kind_for_draw(86), OpKind::SubmitOrder);
        assert_eq!(kind_for_draw(95), OpKind::SubmitOrder);
        assert_eq!(kind_for_draw(96), OpKind::PostReview);
        assert_eq!(kind_for_draw(100), OpKind::PostReview);
    }

    #[test]
    fn kind_indexes_match_weight_table_order() {
        for (i, kind) in OpKind::ALL.iter().enumerate() {
            assert_eq!(kind.index(), i);
        }
        assert_eq!(OpKind::COUNT, 7);
    }

    #[test]
    fn generated_arguments_respect_population_ranges() {
        let workload = workload();
        let mut rng = ChaCha8Rng::seed_from_u64(9);

        for _ in 0..2000 {
            match workload.generate(&mut rng) {
                Operation::CreateAccount(account) => {
                    assert!(account.username.as_str().starts_with("user"));
                    assert!(account.password.starts_with("password"));
                }
                Operation::AddProduct { price, stock, name, .. } => {
                    assert!(price >= Decimal::new(100, 2));
                    assert!(price <= Decimal::new(10_000, 2));
                    assert!((1..=100).contains(&stock));
                    assert_eq!(name.len(), 15);
                }
                Operation::UpdateStockLevel { product_id, delta } => {
                    let products = workload.population().products() as i32;
                    assert!((1..=products).contains(&product_id.0));
                    assert!((1..=10).contains(&delta));
                }
                Operation::GetProductAndReviews { product_id } => {
                    let products = workload.population().products() as i32;
                    assert!((1..=products).contains(&product_id.0));
                }
                Operation::GetAverageUserRating { username } => {
                    assert!(username.as_str().starts_with("user"));
                }
                Operation::SubmitOrder { line_items, .. } => {
                    assert!(!line_items.is_empty());
                    assert!(line_items.len() <= 10);
                }
                Operation::PostReview { rating, .. } => {
                    assert!((0.0..5.0).contains(&rating));
                }
            }
        }
    }
}
