//! Store module
//!
//! This module provides all persistence functionality for shoplite:
//!
//! - **connection**: SQLite connection wrapper and configuration
//! - **schema**: schema definitions, versioning, and migration dispatch
//! - **bootstrap**: one-time seed-image materialization
//! - **query**: lazy forward-only row streaming
//! - **users / categories / products / cart / orders / order_details**:
//!   per-table repositories
//!
//! # Usage
//!
//! ```rust,ignore
//! use shoplite::ShopStore;
//!
//! // First launch: copy the packaged seed image into place, then open
//! let seed: &[u8] = include_bytes!("../assets/shoplite-seed.sqlite3");
//! let store = ShopStore::open_with_seed("/data/shoplite.sqlite3", seed)?;
//!
//! // Stream the catalog
//! let mut query = store.products().search_by_name("shirt")?;
//! let mut rows = query.cursor()?;
//! while let Some(product) = rows.next()? {
//!     println!("{}: {:.2}", product.name, product.price);
//! }
//! ```

pub mod bootstrap;
pub mod cart;
pub mod categories;
pub mod connection;
pub mod order_details;
pub mod orders;
pub mod products;
pub mod query;
pub mod schema;
pub mod users;

pub use bootstrap::materialize_seed;
pub use cart::{CartItem, CartProduct, CartRepository};
pub use categories::{CategoriesRepository, Category};
pub use connection::DatabaseConn;
pub use order_details::{OrderDetail, OrderDetailsRepository};
pub use orders::{Order, OrdersRepository};
pub use products::{NewProduct, Product, ProductsRepository};
pub use query::{Cursor, Query};
pub use schema::{SchemaDefinitions, SchemaManager, SchemaStatus, SCHEMA_VERSION};
pub use users::{NewUser, User, UsersRepository};

use crate::config::StoreConfig;
use crate::error::StoreError;
use chrono::Utc;
use rusqlite::params;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::info;

/// One line of a checkout request
#[derive(Debug, Clone)]
pub struct OrderLine {
    pub product_id: i64,
    pub quantity: i64,
    /// Price snapshot for this line, copied into the order detail row
    pub price_per_item: f64,
}

/// The store handle
///
/// `ShopStore` owns the single database connection and hands out
/// per-table repositories that borrow it. Construct one per process and
/// pass it to whatever needs data access; there is no global instance.
pub struct ShopStore {
    db: DatabaseConn,
}

impl ShopStore {
    /// Open the store database at the specified path
    ///
    /// A missing file is created and initialized with an empty schema. An
    /// existing file has its schema version checked: older versions are
    /// migrated, newer or damaged ones are an error.
    pub fn open(path: &str) -> Result<Self, StoreError> {
        let db = DatabaseConn::open_path(path)?;
        let schema = SchemaManager::new(&db.conn);

        match schema.check_status()? {
            SchemaStatus::Current => {
                info!("store schema is current");
            }
            SchemaStatus::NotInitialized => {
                info!("initializing store schema");
                schema.initialize()?;
            }
            SchemaStatus::NeedsMigration { from, to } => {
                schema.migrate(from, to)?;
            }
            SchemaStatus::Incompatible {
                database_version,
                required_version,
            } => {
                return Err(StoreError::SchemaIncompatible {
                    found: database_version,
                    supported: required_version,
                });
            }
            SchemaStatus::Corrupted => {
                return Err(StoreError::SchemaCorrupted);
            }
        }

        Ok(Self { db })
    }

    /// Materialize a seed image if the database file is absent, then open
    ///
    /// The seed is copied byte-for-byte into a newly created file (parent
    /// directories included). If the file already exists the seed is not
    /// consulted. A failed copy surfaces as [`StoreError::Bootstrap`].
    pub fn open_with_seed<R: Read>(path: &str, seed: R) -> Result<Self, StoreError> {
        materialize_seed(Path::new(path), seed)?;
        Self::open(path)
    }

    /// Open the store described by a [`StoreConfig`]
    ///
    /// Uses the configured seed image when one is set and the database
    /// file does not exist yet.
    pub fn open_with_config(config: &StoreConfig) -> Result<Self, StoreError> {
        let db_path = config.sqlite_path();
        match &config.seed_path {
            Some(seed_path) if !Path::new(&db_path).exists() => {
                let seed = File::open(seed_path).map_err(|source| StoreError::Bootstrap {
                    path: Path::new(seed_path).to_path_buf(),
                    source,
                })?;
                Self::open_with_seed(&db_path, seed)
            }
            _ => Self::open(&db_path),
        }
    }

    /// Open the store database from a data directory
    ///
    /// Uses the standard database file name: `{data_dir}/shoplite.sqlite3`
    pub fn open_in_dir(data_dir: &str) -> Result<Self, StoreError> {
        let path = format!("{}/shoplite.sqlite3", data_dir.trim_end_matches('/'));
        Self::open(&path)
    }

    /// Create an in-memory store (for testing)
    pub fn open_in_memory() -> Result<Self, StoreError> {
        let db = DatabaseConn::open_in_memory()?;
        let schema = SchemaManager::new(&db.conn);
        schema.initialize()?;
        Ok(Self { db })
    }

    /// Get the users repository
    pub fn users(&self) -> UsersRepository<'_> {
        UsersRepository::new(&self.db.conn)
    }

    /// Get the categories repository
    pub fn categories(&self) -> CategoriesRepository<'_> {
        CategoriesRepository::new(&self.db.conn)
    }

    /// Get the products repository
    pub fn products(&self) -> ProductsRepository<'_> {
        ProductsRepository::new(&self.db.conn)
    }

    /// Get the cart repository
    pub fn cart(&self) -> CartRepository<'_> {
        CartRepository::new(&self.db.conn)
    }

    /// Get the orders repository
    pub fn orders(&self) -> OrdersRepository<'_> {
        OrdersRepository::new(&self.db.conn)
    }

    /// Get the order details repository
    pub fn order_details(&self) -> OrderDetailsRepository<'_> {
        OrderDetailsRepository::new(&self.db.conn)
    }

    /// Every category name, in storage order
    pub fn category_names(&self) -> Result<Vec<String>, StoreError> {
        self.categories().all()
    }

    /// Place an order atomically
    ///
    /// Inserts the order row and one detail row per line inside a single
    /// transaction; any failure rolls back the whole checkout. The order
    /// total is computed from the lines. Returns the new order id.
    pub fn place_order(
        &self,
        user_id: i64,
        delivery_address: &str,
        lines: &[OrderLine],
    ) -> Result<i64, StoreError> {
        let tx = self.db.conn.unchecked_transaction()?;

        let total: f64 = lines
            .iter()
            .map(|line| line.price_per_item * line.quantity as f64)
            .sum();

        tx.execute(
            "INSERT INTO Orders (user_id, order_date, total_price, delivery_address)
             VALUES (?1, ?2, ?3, ?4)",
            params![user_id, Utc::now(), total, delivery_address],
        )?;
        let order_id = tx.last_insert_rowid();

        {
            let mut stmt = tx.prepare_cached(
                "INSERT INTO OrderDetails (order_id, product_id, quantity, price_per_item)
                 VALUES (?1, ?2, ?3, ?4)",
            )?;
            for line in lines {
                stmt.execute(params![
                    order_id,
                    line.product_id,
                    line.quantity,
                    line.price_per_item
                ])?;
            }
        }

        tx.commit()?;
        Ok(order_id)
    }

    /// Get the underlying database connection (for advanced queries)
    pub fn connection(&self) -> &rusqlite::Connection {
        &self.db.conn
    }

    /// Get a metadata value from the database
    pub fn get_meta(&self, key: &str) -> Result<Option<String>, StoreError> {
        SchemaManager::new(&self.db.conn).get_meta(key)
    }

    /// Set a metadata value in the database
    pub fn set_meta(&self, key: &str, value: &str) -> Result<(), StoreError> {
        SchemaManager::new(&self.db.conn).set_meta(key, value)
    }
}
