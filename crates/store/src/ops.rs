//! Business transactions against the retail schema.
//!
//! Every operation here is one atomic transaction: acquire a pooled
//! connection, begin at the configured isolation level, run the statements,
//! commit. Failures propagate with `?`, which drops the transaction and
//! rolls it back before the connection returns to the pool.
//!
//! Guarded writes (orders, reviews) run their credential lookup inside the
//! same transaction as their effects, so the check and the writes commit or
//! roll back as one unit.

use crate::{Store, StoreError};
use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use sqlx::postgres::PgRow;
use sqlx::{Postgres, Row, Transaction};
use storeload_types::{
    Account, Credentials, LineItems, OrderId, Product, ProductId, ProductPage, Review, Username,
};
use tracing::debug;

impl Store {
    /// Insert a new user account.
    ///
    /// Fails with `ErrorKind::DuplicateKey` when the username is taken.
    pub async fn create_account(&self, account: &Account) -> Result<(), StoreError> {
        let mut tx = self.begin().await?;

        sqlx::query(
            "INSERT INTO USERS (USER_NAME, PASSWORD, FIRST_NAME, LAST_NAME) \
             VALUES ($1, $2, $3, $4)",
        )
        .bind(account.username.as_str())
        .bind(&account.password)
        .bind(&account.first_name)
        .bind(&account.last_name)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(())
    }

    /// Check a (username, password) pair. Read-only, but still executed
    /// inside a transaction boundary like every other operation.
    pub async fn is_authorized(&self, credentials: &Credentials) -> Result<bool, StoreError> {
        let mut tx = self.begin().await?;
        let authorized = authorize(&mut tx, credentials).await?;
        tx.commit().await?;
        Ok(authorized)
    }

    /// Insert a catalog product, returning its generated id.
    ///
    /// Fails with `ErrorKind::CheckViolation` when `price` or `stock` is
    /// not strictly positive.
    pub async fn add_product(
        &self,
        name: &str,
        description: Option<&str>,
        price: Decimal,
        stock: i32,
    ) -> Result<ProductId, StoreError> {
        let mut tx = self.begin().await?;

        let row = sqlx::query(
            "INSERT INTO PRODUCTS (NAME, DESCRIPTION, PRICE, STOCK) \
             VALUES ($1, $2, $3, $4) RETURNING PRODUCT_ID",
        )
        .bind(name)
        .bind(description)
        .bind(price)
        .bind(stock)
        .fetch_one(&mut *tx)
        .await?;
        let id = ProductId(row.try_get("product_id")?);

        tx.commit().await?;
        Ok(id)
    }

    /// Restock a product, returning the affected row count.
    ///
    /// `delta` must be positive; this is a restock path, not a sale. An
    /// unknown product id affects zero rows, which callers distinguish from
    /// a successful update by inspecting the returned count.
    pub async fn update_stock_level(
        &self,
        product_id: ProductId,
        delta: i32,
    ) -> Result<u64, StoreError> {
        debug_assert!(delta > 0, "restock delta must be positive");

        let mut tx = self.begin().await?;

        let result = sqlx::query("UPDATE PRODUCTS SET STOCK = STOCK + $1 WHERE PRODUCT_ID = $2")
            .bind(delta)
            .bind(product_id.0)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(result.rows_affected())
    }

    /// Post a review as the given user, stamped with the current time.
    ///
    /// Fails with `ErrorKind::Unauthorized` on bad credentials (before any
    /// write), `ErrorKind::DuplicateKey` on a second review for the same
    /// (user, product) pair, `ErrorKind::CheckViolation` on a rating
    /// outside (0, 5), and `ErrorKind::ForeignKey` on an unknown product.
    pub async fn post_review(
        &self,
        credentials: &Credentials,
        product_id: ProductId,
        review_text: Option<&str>,
        rating: f64,
    ) -> Result<(), StoreError> {
        let mut tx = self.begin().await?;

        if !authorize(&mut tx, credentials).await? {
            tx.rollback().await?;
            return Err(StoreError::Unauthorized);
        }

        sqlx::query(
            "INSERT INTO REVIEWS (USER_NAME, PRODUCT_ID, REVIEW_TEXT, RATING, REVIEW_DATE) \
             VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(credentials.username.as_str())
        .bind(product_id.0)
        .bind(review_text)
        .bind(rating)
        .bind(chrono::Utc::now().naive_utc())
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(())
    }

    /// Submit an order: one ORDERS row plus, per line item in insertion
    /// order, a stock decrement and an ORDER_DETAILS row.
    ///
    /// Any failure rolls the whole order back, leaving no ORDERS row, no
    /// ORDER_DETAILS rows and no stock change. Draining a product to zero or
    /// below fails with `ErrorKind::CheckViolation`; an unknown product id
    /// surfaces as `ErrorKind::ForeignKey` when its detail row is
    /// inserted; concurrent submissions may fail with
    /// `ErrorKind::Serialization`.
    pub async fn submit_order(
        &self,
        credentials: &Credentials,
        line_items: &LineItems,
        order_date: NaiveDateTime,
    ) -> Result<OrderId, StoreError> {
        let mut tx = self.begin().await?;

        if !authorize(&mut tx, credentials).await? {
            tx.rollback().await?;
            return Err(StoreError::Unauthorized);
        }

        let row = sqlx::query(
            "INSERT INTO ORDERS (USER_NAME, ORDER_DATE) VALUES ($1, $2) RETURNING ORDER_ID",
        )
        .bind(credentials.username.as_str())
        .bind(order_date)
        .fetch_one(&mut *tx)
        .await?;
        let order_id = OrderId(row.try_get("order_id")?);

        for (product_id, quantity) in line_items.iter() {
            sqlx::query("UPDATE PRODUCTS SET STOCK = STOCK - $1 WHERE PRODUCT_ID = $2")
                .bind(quantity)
                .bind(product_id.0)
                .execute(&mut *tx)
                .await?;

            sqlx::query(
                "INSERT INTO ORDER_DETAILS (ORDER_ID, PRODUCT_ID, QUANTITY) VALUES ($1, $2, $3)",
            )
            .bind(order_id.0)
            .bind(product_id.0)
            .bind(quantity)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        debug!(order_id = order_id.0, lines = line_items.len(), "Order committed");
        Ok(order_id)
    }

    /// Fetch a product and all of its reviews in one read transaction.
    ///
    /// Returns `None` for an unknown product id.
    pub async fn get_product_and_reviews(
        &self,
        product_id: ProductId,
    ) -> Result<Option<ProductPage>, StoreError> {
        let mut tx = self.begin().await?;

        let product_row = sqlx::query(
            "SELECT PRODUCT_ID, NAME, DESCRIPTION, PRICE, STOCK \
             FROM PRODUCTS WHERE PRODUCT_ID = $1",
        )
        .bind(product_id.0)
        .fetch_optional(&mut *tx)
        .await?;

        let product = match product_row {
            Some(row) => product_from_row(&row)?,
            None => {
                tx.commit().await?;
                return Ok(None);
            }
        };

        let review_rows = sqlx::query(
            "SELECT USER_NAME, PRODUCT_ID, REVIEW_TEXT, RATING, REVIEW_DATE \
             FROM REVIEWS WHERE PRODUCT_ID = $1",
        )
        .bind(product_id.0)
        .fetch_all(&mut *tx)
        .await?;

        tx.commit().await?;

        let reviews = review_rows
            .iter()
            .map(review_from_row)
            .collect::<Result<Vec<_>, StoreError>>()?;

        Ok(Some(ProductPage { product, reviews }))
    }

    /// Average rating across all reviews by one user.
    ///
    /// Returns 0.0 when the user has no reviews or does not exist; callers
    /// cannot tell the two apart.
    pub async fn get_average_user_rating(&self, username: &Username) -> Result<f64, StoreError> {
        let mut tx = self.begin().await?;

        let row = sqlx::query("SELECT AVG(RATING) AS AVG_RATING FROM REVIEWS WHERE USER_NAME = $1")
            .bind(username.as_str())
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;

        let avg: Option<f64> = row.try_get("avg_rating")?;
        Ok(avg.unwrap_or(0.0))
    }
}

/// Credential lookup shared by the guarded writes. Runs inside the caller's
/// transaction so the check and the effects commit or roll back together.
async fn authorize(
    tx: &mut Transaction<'static, Postgres>,
    credentials: &Credentials,
) -> Result<bool, StoreError> {
    let row = sqlx::query("SELECT USER_NAME FROM USERS WHERE USER_NAME = $1 AND PASSWORD = $2")
        .bind(credentials.username.as_str())
        .bind(&credentials.password)
        .fetch_optional(&mut **tx)
        .await?;

    Ok(row.is_some())
}

fn product_from_row(row: &PgRow) -> Result<Product, StoreError> {
    Ok(Product {
        id: ProductId(row.try_get("product_id")?),
        name: row.try_get("name")?,
        description: row.try_get("description")?,
        price: row.try_get("price")?,
        stock: row.try_get("stock")?,
    })
}

fn review_from_row(row: &PgRow) -> Result<Review, StoreError> {
    Ok(Review {
        username: Username::new(row.try_get::<String, _>("user_name")?),
        product_id: ProductId(row.try_get("product_id")?),
        review_text: row.try_get("review_text")?,
        rating: row.try_get("rating")?,
        review_date: row.try_get("review_date")?,
    })
}
