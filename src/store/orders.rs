//! Orders repository
//!
//! Orders and their detail lines live in two independently keyed tables
//! bridged by `order_id`. Deleting an order cascades to its details; the
//! multi-row checkout path lives on the store handle where it can span a
//! transaction.

use crate::error::StoreError;
use crate::store::query::Query;
use chrono::{DateTime, Utc};
use rusqlite::types::Value;
use rusqlite::{params, Connection, Row};
use serde::{Deserialize, Serialize};

const ORDER_COLUMNS: &str = "id, user_id, order_date, status, total_price, delivery_address";

/// An order row
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    pub id: i64,
    pub user_id: i64,
    pub order_date: DateTime<Utc>,
    /// Free-text status, e.g. "pending" or "shipped"
    pub status: String,
    pub total_price: Option<f64>,
    pub delivery_address: String,
}

impl Order {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Order {
            id: row.get(0)?,
            user_id: row.get(1)?,
            order_date: row.get(2)?,
            status: row.get(3)?,
            total_price: row.get(4)?,
            delivery_address: row.get(5)?,
        })
    }
}

/// Repository for order operations
pub struct OrdersRepository<'a> {
    conn: &'a Connection,
}

impl<'a> OrdersRepository<'a> {
    /// Create a new orders repository
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    /// Insert a new order and return the generated id
    ///
    /// The order date is stamped at insert time; the status starts as
    /// "pending".
    pub fn add(
        &self,
        user_id: i64,
        total_price: f64,
        delivery_address: &str,
    ) -> Result<i64, StoreError> {
        self.conn.execute(
            "INSERT INTO Orders (user_id, order_date, total_price, delivery_address)
             VALUES (?1, ?2, ?3, ?4)",
            params![user_id, Utc::now(), total_price, delivery_address],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    /// Every order placed by a user
    pub fn for_user(&self, user_id: i64) -> Result<Query<'a, Order>, StoreError> {
        Query::prepare(
            self.conn,
            &format!("SELECT {ORDER_COLUMNS} FROM Orders WHERE user_id = ?1"),
            vec![Value::from(user_id)],
            Order::from_row,
        )
    }

    /// Look up an order by primary key
    pub fn by_id(&self, id: i64) -> Result<Query<'a, Order>, StoreError> {
        Query::prepare(
            self.conn,
            &format!("SELECT {ORDER_COLUMNS} FROM Orders WHERE id = ?1"),
            vec![Value::from(id)],
            Order::from_row,
        )
    }

    /// Overwrite an order's status
    ///
    /// Returns the affected-row count (0 if the id does not exist).
    pub fn update_status(&self, id: i64, status: &str) -> Result<usize, StoreError> {
        Ok(self.conn.execute(
            "UPDATE Orders SET status = ?1 WHERE id = ?2",
            params![status, id],
        )?)
    }

    /// Overwrite an order's total price
    ///
    /// The total is not recomputed from the detail lines automatically;
    /// callers that change lines must call this with the new sum.
    pub fn update_total(&self, id: i64, total_price: f64) -> Result<usize, StoreError> {
        Ok(self.conn.execute(
            "UPDATE Orders SET total_price = ?1 WHERE id = ?2",
            params![total_price, id],
        )?)
    }

    /// Delete an order and (by cascade) its detail lines
    ///
    /// A missing id is a silent no-op.
    pub fn delete(&self, id: i64) -> Result<(), StoreError> {
        self.conn
            .execute("DELETE FROM Orders WHERE id = ?1", [id])?;
        Ok(())
    }
}
