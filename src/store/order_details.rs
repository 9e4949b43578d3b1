//! Order details repository

use crate::error::StoreError;
use crate::store::query::Query;
use rusqlite::types::Value;
use rusqlite::{params, Connection, Row};
use serde::{Deserialize, Serialize};

/// An order line item
///
/// `price_per_item` is the price snapshot taken at order time; it does not
/// track later changes to the product's live price.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderDetail {
    pub id: i64,
    pub order_id: i64,
    pub product_id: i64,
    pub quantity: i64,
    pub price_per_item: f64,
}

impl OrderDetail {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(OrderDetail {
            id: row.get(0)?,
            order_id: row.get(1)?,
            product_id: row.get(2)?,
            quantity: row.get(3)?,
            price_per_item: row.get(4)?,
        })
    }
}

/// Repository for order line item operations
pub struct OrderDetailsRepository<'a> {
    conn: &'a Connection,
}

impl<'a> OrderDetailsRepository<'a> {
    /// Create a new order details repository
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    /// Insert a line item and return the generated id
    pub fn add(
        &self,
        order_id: i64,
        product_id: i64,
        quantity: i64,
        price_per_item: f64,
    ) -> Result<i64, StoreError> {
        self.conn.execute(
            "INSERT INTO OrderDetails (order_id, product_id, quantity, price_per_item)
             VALUES (?1, ?2, ?3, ?4)",
            params![order_id, product_id, quantity, price_per_item],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    /// Every line item belonging to an order
    pub fn for_order(&self, order_id: i64) -> Result<Query<'a, OrderDetail>, StoreError> {
        Query::prepare(
            self.conn,
            "SELECT id, order_id, product_id, quantity, price_per_item
             FROM OrderDetails WHERE order_id = ?1",
            vec![Value::from(order_id)],
            OrderDetail::from_row,
        )
    }

    /// Overwrite a line item's quantity and price snapshot
    ///
    /// Returns the affected-row count (0 if the id does not exist).
    pub fn update(
        &self,
        id: i64,
        quantity: i64,
        price_per_item: f64,
    ) -> Result<usize, StoreError> {
        Ok(self.conn.execute(
            "UPDATE OrderDetails SET quantity = ?1, price_per_item = ?2 WHERE id = ?3",
            params![quantity, price_per_item, id],
        )?)
    }

    /// Delete a line item; a missing id is a silent no-op
    pub fn delete(&self, id: i64) -> Result<(), StoreError> {
        self.conn
            .execute("DELETE FROM OrderDetails WHERE id = ?1", [id])?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::orders::OrdersRepository;
    use crate::store::schema::SchemaManager;

    fn test_conn() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute("PRAGMA foreign_keys=ON", []).unwrap();
        SchemaManager::new(&conn).initialize().unwrap();
        conn
    }

    fn seed_order(conn: &Connection) -> i64 {
        OrdersRepository::new(conn).add(1, 0.0, "1 Main St").unwrap()
    }

    #[test]
    fn test_add_and_read_back() {
        let conn = test_conn();
        let details = OrderDetailsRepository::new(&conn);

        let order_id = seed_order(&conn);
        let id = details.add(order_id, 7, 2, 9.99).unwrap();

        let rows = details.for_order(order_id).unwrap().collect().unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].id, id);
        assert_eq!(rows[0].product_id, 7);
        assert_eq!(rows[0].quantity, 2);
        assert_eq!(rows[0].price_per_item, 9.99);
    }

    #[test]
    fn test_price_snapshot_is_independent_of_product() {
        let conn = test_conn();
        let details = OrderDetailsRepository::new(&conn);

        // product id 7 does not exist; the snapshot stands on its own
        let order_id = seed_order(&conn);
        details.add(order_id, 7, 1, 5.25).unwrap();

        let rows = details.for_order(order_id).unwrap().collect().unwrap();
        assert_eq!(rows[0].price_per_item, 5.25);
    }

    #[test]
    fn test_update_missing_id_affects_zero_rows() {
        let conn = test_conn();
        let details = OrderDetailsRepository::new(&conn);

        assert_eq!(details.update(999, 1, 1.0).unwrap(), 0);
    }

    #[test]
    fn test_update_and_delete() {
        let conn = test_conn();
        let details = OrderDetailsRepository::new(&conn);

        let order_id = seed_order(&conn);
        let id = details.add(order_id, 7, 2, 9.99).unwrap();

        assert_eq!(details.update(id, 3, 8.50).unwrap(), 1);
        let rows = details.for_order(order_id).unwrap().collect().unwrap();
        assert_eq!(rows[0].quantity, 3);
        assert_eq!(rows[0].price_per_item, 8.50);

        details.delete(id).unwrap();
        assert!(details.for_order(order_id).unwrap().collect().unwrap().is_empty());

        // deleting again is a silent no-op
        details.delete(id).unwrap();
    }
}
