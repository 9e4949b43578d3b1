//! Database schema management
//!
//! All tables are defined here to ensure consistency and enable the one
//! cross-table query (the cart/product join).

use crate::error::StoreError;
use rusqlite::Connection;
use tracing::info;

/// Current schema version
/// Increment this when making breaking schema changes
pub const SCHEMA_VERSION: u32 = 1;

/// Schema definitions for all tables in the store
pub struct SchemaDefinitions;

impl SchemaDefinitions {
    /// SQL for creating the meta table (tracks schema version)
    pub const META_TABLE: &'static str = r#"
        CREATE TABLE IF NOT EXISTS shoplite_meta (
            key TEXT PRIMARY KEY,
            value TEXT NOT NULL,
            updated_at INTEGER NOT NULL DEFAULT (strftime('%s', 'now'))
        );
    "#;

    pub const USERS_TABLE: &'static str = r#"
        CREATE TABLE IF NOT EXISTS Users (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            username TEXT NOT NULL,
            password TEXT NOT NULL,
            role TEXT NOT NULL DEFAULT 'user',
            phone TEXT,
            email TEXT
        );
    "#;

    pub const CATEGORIES_TABLE: &'static str = r#"
        CREATE TABLE IF NOT EXISTS Categories (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL UNIQUE
        );
    "#;

    pub const PRODUCTS_TABLE: &'static str = r#"
        CREATE TABLE IF NOT EXISTS Products (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            description TEXT,
            price REAL NOT NULL,
            quantity INTEGER NOT NULL,
            image_url TEXT,
            category_id INTEGER NOT NULL
        );
    "#;

    /// Cart rows vanish with their user or product.
    pub const USER_CART_TABLE: &'static str = r#"
        CREATE TABLE IF NOT EXISTS UserCart (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id INTEGER NOT NULL REFERENCES Users(id) ON DELETE CASCADE,
            product_id INTEGER NOT NULL REFERENCES Products(id) ON DELETE CASCADE,
            quantity INTEGER NOT NULL
        );
    "#;

    /// `user_id` is deliberately unconstrained: orders outlive their user.
    pub const ORDERS_TABLE: &'static str = r#"
        CREATE TABLE IF NOT EXISTS Orders (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id INTEGER NOT NULL,
            order_date TEXT NOT NULL,
            status TEXT NOT NULL DEFAULT 'pending',
            total_price REAL,
            delivery_address TEXT NOT NULL
        );
    "#;

    /// `product_id` is a historical pointer; `price_per_item` is the price
    /// snapshot taken at order time, decoupled from the live product row.
    pub const ORDER_DETAILS_TABLE: &'static str = r#"
        CREATE TABLE IF NOT EXISTS OrderDetails (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            order_id INTEGER NOT NULL REFERENCES Orders(id) ON DELETE CASCADE,
            product_id INTEGER NOT NULL,
            quantity INTEGER NOT NULL,
            price_per_item REAL NOT NULL
        );
    "#;

    /// SQL for creating indexes on common query patterns
    pub const INDEXES: &'static [&'static str] = &[
        "CREATE INDEX IF NOT EXISTS idx_users_username ON Users(username)",
        "CREATE INDEX IF NOT EXISTS idx_products_category ON Products(category_id)",
        "CREATE INDEX IF NOT EXISTS idx_usercart_user ON UserCart(user_id)",
        "CREATE INDEX IF NOT EXISTS idx_orders_user ON Orders(user_id)",
        "CREATE INDEX IF NOT EXISTS idx_orderdetails_order ON OrderDetails(order_id)",
    ];

    /// Tables that must exist for the schema to be considered intact
    pub const REQUIRED_TABLES: &'static [&'static str] = &[
        "shoplite_meta",
        "Users",
        "Categories",
        "Products",
        "UserCart",
        "Orders",
        "OrderDetails",
    ];
}

/// Schema manager for the store database
///
/// Handles schema initialization, version checking, and migration dispatch.
pub struct SchemaManager<'a> {
    conn: &'a Connection,
}

impl<'a> SchemaManager<'a> {
    /// Create a new schema manager for the given connection
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    /// Initialize the database schema
    ///
    /// Creates all tables and indexes if they don't exist and records the
    /// schema version in the meta table. Safe to run against a pre-seeded
    /// image: every statement is `IF NOT EXISTS`.
    pub fn initialize(&self) -> Result<(), StoreError> {
        self.conn.execute(SchemaDefinitions::META_TABLE, [])?;
        self.set_meta("schema_version", &SCHEMA_VERSION.to_string())?;

        for table_sql in [
            SchemaDefinitions::USERS_TABLE,
            SchemaDefinitions::CATEGORIES_TABLE,
            SchemaDefinitions::PRODUCTS_TABLE,
            SchemaDefinitions::USER_CART_TABLE,
            SchemaDefinitions::ORDERS_TABLE,
            SchemaDefinitions::ORDER_DETAILS_TABLE,
        ] {
            self.conn.execute(table_sql, [])?;
        }

        for index_sql in SchemaDefinitions::INDEXES {
            self.conn.execute(index_sql, [])?;
        }

        info!("initialized store schema at version {}", SCHEMA_VERSION);
        Ok(())
    }

    /// Check the current schema status
    pub fn check_status(&self) -> Result<SchemaStatus, StoreError> {
        let meta_exists: i32 = self
            .conn
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name='shoplite_meta'",
                [],
                |row| row.get(0),
            )
            .unwrap_or(0);

        if meta_exists == 0 {
            return Ok(SchemaStatus::NotInitialized);
        }

        let current_version = self.get_schema_version()?;

        if current_version == SCHEMA_VERSION {
            if self.verify_integrity()? {
                Ok(SchemaStatus::Current)
            } else {
                Ok(SchemaStatus::Corrupted)
            }
        } else if current_version < SCHEMA_VERSION {
            Ok(SchemaStatus::NeedsMigration {
                from: current_version,
                to: SCHEMA_VERSION,
            })
        } else {
            Ok(SchemaStatus::Incompatible {
                database_version: current_version,
                required_version: SCHEMA_VERSION,
            })
        }
    }

    /// Apply migration steps from one schema version to another
    ///
    /// Steps are keyed by `(from, to)` version pairs. No pairs exist at
    /// version 1; future bumps register their steps here.
    pub fn migrate(&self, from: u32, to: u32) -> Result<(), StoreError> {
        info!("migrating store schema from v{} to v{}", from, to);
        match (from, to) {
            // (1, 2) => self.migrate_v1_to_v2(),
            _ => Err(StoreError::SchemaIncompatible {
                found: from,
                supported: to,
            }),
        }
    }

    /// Get the current schema version from the database
    pub fn get_schema_version(&self) -> Result<u32, StoreError> {
        let version: String = self
            .conn
            .query_row(
                "SELECT value FROM shoplite_meta WHERE key = 'schema_version'",
                [],
                |row| row.get(0),
            )
            .unwrap_or_else(|_| "0".to_string());

        Ok(version.parse().unwrap_or(0))
    }

    /// Verify schema integrity by checking required tables exist
    fn verify_integrity(&self) -> Result<bool, StoreError> {
        for table in SchemaDefinitions::REQUIRED_TABLES {
            let exists: i32 = self
                .conn
                .query_row(
                    "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name=?1",
                    [table],
                    |row| row.get(0),
                )
                .unwrap_or(0);

            if exists == 0 {
                return Ok(false);
            }
        }

        Ok(true)
    }

    /// Set a metadata value
    pub fn set_meta(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.conn.execute(
            "INSERT OR REPLACE INTO shoplite_meta (key, value, updated_at) VALUES (?1, ?2, strftime('%s', 'now'))",
            [key, value],
        )?;
        Ok(())
    }

    /// Get a metadata value
    pub fn get_meta(&self, key: &str) -> Result<Option<String>, StoreError> {
        let result: Result<String, _> = self.conn.query_row(
            "SELECT value FROM shoplite_meta WHERE key = ?1",
            [key],
            |row| row.get(0),
        );

        match result {
            Ok(value) => Ok(Some(value)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}

/// Status of the database schema
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchemaStatus {
    /// Database is not initialized (fresh database)
    NotInitialized,

    /// Schema is current and valid
    Current,

    /// Schema needs migration from an older version
    NeedsMigration { from: u32, to: u32 },

    /// Database is from a newer version (incompatible)
    Incompatible {
        database_version: u32,
        required_version: u32,
    },

    /// Schema is corrupted (missing tables)
    Corrupted,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rusqlite::Connection;

    fn create_test_conn() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute("PRAGMA foreign_keys=ON", []).unwrap();
        conn
    }

    #[test]
    fn test_schema_not_initialized() {
        let conn = create_test_conn();
        let manager = SchemaManager::new(&conn);

        assert_eq!(
            manager.check_status().unwrap(),
            SchemaStatus::NotInitialized
        );
    }

    #[test]
    fn test_schema_initialize() {
        let conn = create_test_conn();
        let manager = SchemaManager::new(&conn);

        manager.initialize().unwrap();

        assert_eq!(manager.check_status().unwrap(), SchemaStatus::Current);
    }

    #[test]
    fn test_schema_version() {
        let conn = create_test_conn();
        let manager = SchemaManager::new(&conn);

        manager.initialize().unwrap();

        let version = manager.get_schema_version().unwrap();
        assert_eq!(version, SCHEMA_VERSION);
    }

    #[test]
    fn test_meta_operations() {
        let conn = create_test_conn();
        let manager = SchemaManager::new(&conn);

        manager.initialize().unwrap();

        manager.set_meta("test_key", "test_value").unwrap();
        let value = manager.get_meta("test_key").unwrap();
        assert_eq!(value, Some("test_value".to_string()));

        let missing = manager.get_meta("nonexistent").unwrap();
        assert_eq!(missing, None);
    }

    #[test]
    fn test_missing_table_is_corrupted() {
        let conn = create_test_conn();
        let manager = SchemaManager::new(&conn);

        manager.initialize().unwrap();
        conn.execute("DROP TABLE UserCart", []).unwrap();

        assert_eq!(manager.check_status().unwrap(), SchemaStatus::Corrupted);
    }

    #[test]
    fn test_newer_version_is_incompatible() {
        let conn = create_test_conn();
        let manager = SchemaManager::new(&conn);

        manager.initialize().unwrap();
        manager
            .set_meta("schema_version", &(SCHEMA_VERSION + 1).to_string())
            .unwrap();

        assert!(matches!(
            manager.check_status().unwrap(),
            SchemaStatus::Incompatible { .. }
        ));
    }

    #[test]
    fn test_migrate_unknown_pair_errors() {
        let conn = create_test_conn();
        let manager = SchemaManager::new(&conn);

        assert!(manager.migrate(0, SCHEMA_VERSION).is_err());
    }
}
