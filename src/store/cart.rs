//! User cart repository
//!
//! Cart lines are addressed by the composite (user id, product id) key for
//! quantity updates and removal; the surrogate row id exists only for
//! insert bookkeeping.

use crate::error::StoreError;
use crate::store::products::Product;
use crate::store::query::Query;
use rusqlite::types::Value;
use rusqlite::{params, Connection, Row};
use serde::{Deserialize, Serialize};

/// A cart row
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CartItem {
    pub id: i64,
    pub user_id: i64,
    pub product_id: i64,
    pub quantity: i64,
}

impl CartItem {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(CartItem {
            id: row.get(0)?,
            user_id: row.get(1)?,
            product_id: row.get(2)?,
            quantity: row.get(3)?,
        })
    }
}

/// A cart row joined with its product
///
/// Carries the full product columns plus the cart line's quantity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CartProduct {
    pub product: Product,
    pub cart_quantity: i64,
}

impl CartProduct {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(CartProduct {
            product: Product::from_row(row)?,
            cart_quantity: row.get(7)?,
        })
    }
}

/// Repository for user cart operations
pub struct CartRepository<'a> {
    conn: &'a Connection,
}

impl<'a> CartRepository<'a> {
    /// Create a new cart repository
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    /// Insert a cart line and return the generated id
    ///
    /// Rejecting zero or negative quantities is the caller's responsibility.
    pub fn add_item(
        &self,
        user_id: i64,
        product_id: i64,
        quantity: i64,
    ) -> Result<i64, StoreError> {
        self.conn.execute(
            "INSERT INTO UserCart (user_id, product_id, quantity) VALUES (?1, ?2, ?3)",
            params![user_id, product_id, quantity],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    /// Every cart line belonging to a user
    pub fn items_for_user(&self, user_id: i64) -> Result<Query<'a, CartItem>, StoreError> {
        Query::prepare(
            self.conn,
            "SELECT id, user_id, product_id, quantity FROM UserCart WHERE user_id = ?1",
            vec![Value::from(user_id)],
            CartItem::from_row,
        )
    }

    /// Update a line's quantity by the composite (user id, product id) key
    ///
    /// Returns the affected-row count (0 if no such line exists).
    pub fn update_quantity(
        &self,
        user_id: i64,
        product_id: i64,
        quantity: i64,
    ) -> Result<usize, StoreError> {
        Ok(self.conn.execute(
            "UPDATE UserCart SET quantity = ?1 WHERE user_id = ?2 AND product_id = ?3",
            params![quantity, user_id, product_id],
        )?)
    }

    /// A user's cart joined with the product table
    ///
    /// One row per cart line: all product columns plus the line's quantity
    /// (aliased `cart_quantity`).
    pub fn cart_products_for_user(
        &self,
        user_id: i64,
    ) -> Result<Query<'a, CartProduct>, StoreError> {
        Query::prepare(
            self.conn,
            "SELECT p.id, p.name, p.description, p.price, p.quantity, p.image_url,
                    p.category_id, uc.quantity AS cart_quantity
             FROM UserCart uc
             INNER JOIN Products p ON uc.product_id = p.id
             WHERE uc.user_id = ?1",
            vec![Value::from(user_id)],
            CartProduct::from_row,
        )
    }

    /// Remove one line by the composite key; a missing line is a no-op
    pub fn remove_item(&self, user_id: i64, product_id: i64) -> Result<(), StoreError> {
        self.conn.execute(
            "DELETE FROM UserCart WHERE user_id = ?1 AND product_id = ?2",
            params![user_id, product_id],
        )?;
        Ok(())
    }

    /// Bulk-delete every line belonging to a user
    pub fn clear(&self, user_id: i64) -> Result<(), StoreError> {
        self.conn
            .execute("DELETE FROM UserCart WHERE user_id = ?1", [user_id])?;
        Ok(())
    }
}
