//! Categories repository

use crate::error::StoreError;
use rusqlite::Connection;
use serde::{Deserialize, Serialize};

/// A category row
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Category {
    pub id: i64,
    pub name: String,
}

/// Repository for category lookups
pub struct CategoriesRepository<'a> {
    conn: &'a Connection,
}

impl<'a> CategoriesRepository<'a> {
    /// Create a new categories repository
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    /// Every category name, in storage order
    ///
    /// No ORDER BY is applied; callers must not rely on the ordering.
    pub fn all(&self) -> Result<Vec<String>, StoreError> {
        let mut stmt = self.conn.prepare("SELECT name FROM Categories")?;
        let rows = stmt.query_map([], |row| row.get(0))?;
        let mut names = Vec::new();
        for name in rows {
            names.push(name?);
        }
        Ok(names)
    }

    /// Insert a new category and return the generated id
    pub fn add(&self, name: &str) -> Result<i64, StoreError> {
        self.conn
            .execute("INSERT INTO Categories (name) VALUES (?1)", [name])?;
        Ok(self.conn.last_insert_rowid())
    }

    /// Look up a category by name
    pub fn by_name(&self, name: &str) -> Result<Option<Category>, StoreError> {
        let result = self.conn.query_row(
            "SELECT id, name FROM Categories WHERE name = ?1",
            [name],
            |row| {
                Ok(Category {
                    id: row.get(0)?,
                    name: row.get(1)?,
                })
            },
        );

        match result {
            Ok(category) => Ok(Some(category)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}
