#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]

//! Shoplite - an embedded retail persistence layer
//!
//! Shoplite owns the relational schema of a small retail (catalog / cart /
//! order) application, initializes the database from a pre-seeded snapshot
//! on first launch, and exposes typed CRUD and query operations over five
//! related entities: users, products, categories, cart items, and orders
//! with their line items. Everything above it (screens, navigation, session
//! state) is a caller of the contracts defined here.
//!
//! It is a single-process, single-writer, synchronous store: one
//! [`ShopStore`] handle per process, passed explicitly to whatever needs
//! data access.
//!
//! # Architecture
//!
//! - **[`store`]**: all persistence functionality
//!   - `connection`: SQLite connection wrapper and configuration
//!   - `schema`: schema definitions, versioning, migration dispatch
//!   - `bootstrap`: one-time seed-image materialization
//!   - `query`: lazy forward-only row streaming
//!   - per-table repositories: `users`, `categories`, `products`, `cart`,
//!     `orders`, `order_details`
//! - **[`config`]**: configuration management
//! - **[`error`]**: the [`StoreError`] taxonomy
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use shoplite::{NewUser, ShopStore, StoreConfig};
//!
//! // Open (seeding on first launch if the config names a seed image)
//! let config = StoreConfig::new(&None)?;
//! let store = ShopStore::open_with_config(&config)?;
//!
//! // Register and authenticate
//! let id = store.users().add(&NewUser {
//!     username: "alice",
//!     password: "correct horse",
//!     phone: None,
//!     email: Some("alice@example.com"),
//! })?;
//! let user = store.users().authenticate("alice", "correct horse")?;
//! assert_eq!(user.map(|u| u.id), Some(id));
//!
//! // Stream cart contents joined with product data
//! let mut query = store.cart().cart_products_for_user(id)?;
//! let mut rows = query.cursor()?;
//! while let Some(row) = rows.next()? {
//!     println!("{} x{}", row.product.name, row.cart_quantity);
//! }
//! ```

pub mod config;
pub mod error;
pub mod store;

// =============================================================================
// Configuration and errors
// =============================================================================

pub use config::StoreConfig;
pub use error::StoreError;

// =============================================================================
// Store handle and repositories
// =============================================================================

pub use store::ShopStore;

pub use store::{
    CartItem, CartProduct, CartRepository, CategoriesRepository, Category, NewProduct, NewUser,
    Order, OrderDetail, OrderDetailsRepository, OrderLine, OrdersRepository, Product,
    ProductsRepository, User, UsersRepository,
};

// Core database types
pub use store::{
    Cursor, DatabaseConn, Query, SchemaDefinitions, SchemaManager, SchemaStatus, SCHEMA_VERSION,
};

// Seed bootstrap
pub use store::materialize_seed;
