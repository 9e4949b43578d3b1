//! Products repository
//!
//! Search is a plain `%term%` wildcard match on the lowercased name, with
//! an optional numeric category filter. No tokenization or ranking.

use crate::error::StoreError;
use crate::store::query::Query;
use rusqlite::types::Value;
use rusqlite::{params, Connection, Row};
use serde::{Deserialize, Serialize};

const PRODUCT_COLUMNS: &str = "id, name, description, price, quantity, image_url, category_id";

/// A product row
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub price: f64,
    /// Stock count
    pub quantity: i64,
    pub image_url: Option<String>,
    pub category_id: i64,
}

impl Product {
    pub(crate) fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Product {
            id: row.get(0)?,
            name: row.get(1)?,
            description: row.get(2)?,
            price: row.get(3)?,
            quantity: row.get(4)?,
            image_url: row.get(5)?,
            category_id: row.get(6)?,
        })
    }
}

/// User-supplied fields for insert and update (never the primary key)
#[derive(Debug, Clone)]
pub struct NewProduct<'a> {
    pub name: &'a str,
    pub description: Option<&'a str>,
    pub price: f64,
    pub quantity: i64,
    pub image_url: Option<&'a str>,
    pub category_id: i64,
}

/// Repository for product catalog operations
pub struct ProductsRepository<'a> {
    conn: &'a Connection,
}

impl<'a> ProductsRepository<'a> {
    /// Create a new products repository
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    /// Insert a new product and return the generated id
    pub fn add(&self, product: &NewProduct<'_>) -> Result<i64, StoreError> {
        self.conn.execute(
            "INSERT INTO Products (name, description, price, quantity, image_url, category_id)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                product.name,
                product.description,
                product.price,
                product.quantity,
                product.image_url,
                product.category_id,
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    /// Every product in the catalog
    pub fn all(&self) -> Result<Query<'a, Product>, StoreError> {
        Query::prepare(
            self.conn,
            &format!("SELECT {PRODUCT_COLUMNS} FROM Products"),
            vec![],
            Product::from_row,
        )
    }

    /// Look up a product by primary key
    pub fn by_id(&self, id: i64) -> Result<Query<'a, Product>, StoreError> {
        Query::prepare(
            self.conn,
            &format!("SELECT {PRODUCT_COLUMNS} FROM Products WHERE id = ?1"),
            vec![Value::from(id)],
            Product::from_row,
        )
    }

    /// Overwrite the listed columns for a product
    ///
    /// Returns the affected-row count (0 if the id does not exist).
    pub fn update(&self, id: i64, product: &NewProduct<'_>) -> Result<usize, StoreError> {
        Ok(self.conn.execute(
            "UPDATE Products SET name = ?1, description = ?2, price = ?3, quantity = ?4,
             image_url = ?5, category_id = ?6 WHERE id = ?7",
            params![
                product.name,
                product.description,
                product.price,
                product.quantity,
                product.image_url,
                product.category_id,
                id,
            ],
        )?)
    }

    /// Delete a product; a missing id is a silent no-op
    pub fn delete(&self, id: i64) -> Result<(), StoreError> {
        self.conn
            .execute("DELETE FROM Products WHERE id = ?1", [id])?;
        Ok(())
    }

    /// Search by name substring within one category
    pub fn search(&self, term: &str, category_id: i64) -> Result<Query<'a, Product>, StoreError> {
        Query::prepare(
            self.conn,
            &format!(
                "SELECT {PRODUCT_COLUMNS} FROM Products
                 WHERE LOWER(name) LIKE ?1 AND category_id = ?2"
            ),
            vec![Value::from(like_pattern(term)), Value::from(category_id)],
            Product::from_row,
        )
    }

    /// Search by name substring alone (case-insensitive)
    pub fn search_by_name(&self, term: &str) -> Result<Query<'a, Product>, StoreError> {
        Query::prepare(
            self.conn,
            &format!("SELECT {PRODUCT_COLUMNS} FROM Products WHERE LOWER(name) LIKE ?1"),
            vec![Value::from(like_pattern(term))],
            Product::from_row,
        )
    }

    /// Every product in one category
    pub fn search_by_category(&self, category_id: i64) -> Result<Query<'a, Product>, StoreError> {
        Query::prepare(
            self.conn,
            &format!("SELECT {PRODUCT_COLUMNS} FROM Products WHERE category_id = ?1"),
            vec![Value::from(category_id)],
            Product::from_row,
        )
    }
}

fn like_pattern(term: &str) -> String {
    format!("%{}%", term.to_lowercase())
}
