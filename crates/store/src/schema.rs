//! Schema manager: drop and recreate the five retail tables.

use crate::{Store, StoreError};
use tracing::{debug, info};

/// Drops every table if present, children first so no foreign key blocks
/// the drop.
const DROP_TABLES: &str = "DROP TABLE IF EXISTS ORDER_DETAILS, ORDERS, REVIEWS, PRODUCTS, USERS";

const CREATE_USERS: &str = r#"
CREATE TABLE USERS (
    USER_NAME  VARCHAR(15) PRIMARY KEY,
    PASSWORD   VARCHAR(15) NOT NULL,
    FIRST_NAME TEXT NOT NULL,
    LAST_NAME  TEXT NOT NULL
)
"#;

const CREATE_PRODUCTS: &str = r#"
CREATE TABLE PRODUCTS (
    PRODUCT_ID  SERIAL PRIMARY KEY,
    NAME        TEXT NOT NULL,
    DESCRIPTION TEXT,
    PRICE       NUMERIC NOT NULL CHECK (PRICE > 0),
    STOCK       INTEGER NOT NULL CHECK (STOCK > 0)
)
"#;

const CREATE_REVIEWS: &str = r#"
CREATE TABLE REVIEWS (
    USER_NAME   VARCHAR(15),
    PRODUCT_ID  INTEGER,
    REVIEW_TEXT TEXT,
    RATING      FLOAT NOT NULL CHECK (RATING > 0) CHECK (RATING < 5),
    REVIEW_DATE TIMESTAMP NOT NULL,
    PRIMARY KEY (USER_NAME, PRODUCT_ID),
    FOREIGN KEY (USER_NAME) REFERENCES USERS (USER_NAME),
    FOREIGN KEY (PRODUCT_ID) REFERENCES PRODUCTS (PRODUCT_ID)
)
"#;

const CREATE_ORDERS: &str = r#"
CREATE TABLE ORDERS (
    ORDER_ID   SERIAL PRIMARY KEY,
    USER_NAME  VARCHAR(15) NOT NULL,
    ORDER_DATE TIMESTAMP NOT NULL,
    FOREIGN KEY (USER_NAME) REFERENCES USERS (USER_NAME)
)
"#;

const CREATE_ORDER_DETAILS: &str = r#"
CREATE TABLE ORDER_DETAILS (
    ORDER_ID   INTEGER,
    PRODUCT_ID INTEGER,
    QUANTITY   INTEGER NOT NULL CHECK (QUANTITY > 0),
    PRIMARY KEY (ORDER_ID, PRODUCT_ID),
    FOREIGN KEY (ORDER_ID) REFERENCES ORDERS (ORDER_ID),
    FOREIGN KEY (PRODUCT_ID) REFERENCES PRODUCTS (PRODUCT_ID)
)
"#;

/// Create statements in dependency order: parents before children.
const CREATE_TABLES: [(&str, &str); 5] = [
    ("USERS", CREATE_USERS),
    ("PRODUCTS", CREATE_PRODUCTS),
    ("REVIEWS", CREATE_REVIEWS),
    ("ORDERS", CREATE_ORDERS),
    ("ORDER_DETAILS", CREATE_ORDER_DETAILS),
];

impl Store {
    /// Drop (if present) and recreate every table.
    ///
    /// Destructive: all existing data is lost. The whole rebuild runs inside
    /// one transaction, so a failure leaves no partial schema behind.
    pub async fn rebuild_schema(&self) -> Result<(), StoreError> {
        info!("Rebuilding retail schema");

        let mut tx = self.pool().begin().await?;

        sqlx::query(DROP_TABLES).execute(&mut *tx).await?;

        for (table, ddl) in CREATE_TABLES {
            debug!(table, "Creating table");
            sqlx::query(ddl).execute(&mut *tx).await?;
        }

        tx.commit().await?;

        info!(tables = CREATE_TABLES.len(), "Schema rebuilt");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn creation_order_respects_dependencies() {
        let order: Vec<_> = CREATE_TABLES.iter().map(|(name, _)| *name).collect();
        assert_eq!(
            order,
            vec!["USERS", "PRODUCTS", "REVIEWS", "ORDERS", "ORDER_DETAILS"]
        );
    }

    #[test]
    fn drop_lists_children_before_parents() {
        let pos = |table: &str| DROP_TABLES.find(table).unwrap();
        assert!(pos("ORDER_DETAILS") < pos("ORDERS"));
        assert!(pos("REVIEWS") < pos("PRODUCTS"));
        assert!(pos("PRODUCTS") < pos("USERS"));
    }

    #[test]
    fn checks_guard_the_numeric_bounds() {
        assert!(CREATE_PRODUCTS.contains("CHECK (PRICE > 0)"));
        assert!(CREATE_PRODUCTS.contains("CHECK (STOCK > 0)"));
        assert!(CREATE_REVIEWS.contains("CHECK (RATING > 0)"));
        assert!(CREATE_REVIEWS.contains("CHECK (RATING < 5)"));
        assert!(CREATE_ORDER_DETAILS.contains("CHECK (QUANTITY > 0)"));
    }

    #[test]
    fn reviews_are_unique_per_user_and_product() {
        assert!(CREATE_REVIEWS.contains("PRIMARY KEY (USER_NAME, PRODUCT_ID)"));
    }
}
