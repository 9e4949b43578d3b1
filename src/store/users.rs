//! Users repository
//!
//! Credential storage uses salted Argon2 hashes; the plain password never
//! touches the database and the hash never leaves this module.

use crate::error::StoreError;
use crate::store::query::Query;
use argon2::password_hash::{rand_core::OsRng, PasswordHash, SaltString};
use argon2::{Argon2, PasswordHasher, PasswordVerifier};
use rusqlite::types::Value;
use rusqlite::{params, Connection, Row};
use serde::{Deserialize, Serialize};

const USER_COLUMNS: &str = "id, username, role, phone, email";

/// A user row (credential hash excluded)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub role: String,
    pub phone: Option<String>,
    pub email: Option<String>,
}

impl User {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(User {
            id: row.get(0)?,
            username: row.get(1)?,
            role: row.get(2)?,
            phone: row.get(3)?,
            email: row.get(4)?,
        })
    }
}

/// User-supplied fields for insert and update (never the primary key)
#[derive(Debug, Clone)]
pub struct NewUser<'a> {
    pub username: &'a str,
    pub password: &'a str,
    pub phone: Option<&'a str>,
    pub email: Option<&'a str>,
}

/// Repository for user account operations
pub struct UsersRepository<'a> {
    conn: &'a Connection,
}

impl<'a> UsersRepository<'a> {
    /// Create a new users repository
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    /// Insert a new user and return the generated id
    ///
    /// The role defaults to `"user"`; the password is stored as a salted
    /// Argon2 hash.
    pub fn add(&self, user: &NewUser<'_>) -> Result<i64, StoreError> {
        let hash = hash_password(user.password)?;
        self.conn.execute(
            "INSERT INTO Users (username, password, phone, email, role)
             VALUES (?1, ?2, ?3, ?4, 'user')",
            params![user.username, hash, user.phone, user.email],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    /// Look up a user by primary key
    pub fn by_id(&self, id: i64) -> Result<Query<'a, User>, StoreError> {
        Query::prepare(
            self.conn,
            &format!("SELECT {USER_COLUMNS} FROM Users WHERE id = ?1"),
            vec![Value::from(id)],
            User::from_row,
        )
    }

    /// Verify a username/password pair
    ///
    /// `None` means authentication failure, whether the username is unknown
    /// or the password does not match.
    pub fn authenticate(
        &self,
        username: &str,
        password: &str,
    ) -> Result<Option<User>, StoreError> {
        let result = self.conn.query_row(
            &format!("SELECT {USER_COLUMNS}, password FROM Users WHERE username = ?1"),
            [username],
            |row| Ok((User::from_row(row)?, row.get::<_, String>(5)?)),
        );

        let (user, stored_hash) = match result {
            Ok(pair) => pair,
            Err(rusqlite::Error::QueryReturnedNoRows) => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        if verify_password(password, &stored_hash)? {
            Ok(Some(user))
        } else {
            Ok(None)
        }
    }

    /// Overwrite the listed columns for a user
    ///
    /// The password is rehashed; the role is left untouched. Returns the
    /// affected-row count (0 if the id does not exist).
    pub fn update(&self, id: i64, user: &NewUser<'_>) -> Result<usize, StoreError> {
        let hash = hash_password(user.password)?;
        Ok(self.conn.execute(
            "UPDATE Users SET username = ?1, password = ?2, phone = ?3, email = ?4
             WHERE id = ?5",
            params![user.username, hash, user.phone, user.email, id],
        )?)
    }

    /// Delete a user; a missing id is a silent no-op
    pub fn delete(&self, id: i64) -> Result<(), StoreError> {
        self.conn
            .execute("DELETE FROM Users WHERE id = ?1", [id])?;
        Ok(())
    }
}

fn hash_password(password: &str) -> Result<String, StoreError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| StoreError::PasswordHash(e.to_string()))
}

fn verify_password(password: &str, stored_hash: &str) -> Result<bool, StoreError> {
    let parsed =
        PasswordHash::new(stored_hash).map_err(|e| StoreError::PasswordHash(e.to_string()))?;
    match Argon2::default().verify_password(password.as_bytes(), &parsed) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(e) => Err(StoreError::PasswordHash(e.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::schema::SchemaManager;

    fn test_conn() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute("PRAGMA foreign_keys=ON", []).unwrap();
        SchemaManager::new(&conn).initialize().unwrap();
        conn
    }

    #[test]
    fn test_add_and_authenticate() {
        let conn = test_conn();
        let users = UsersRepository::new(&conn);

        let id = users
            .add(&NewUser {
                username: "alice",
                password: "pw1",
                phone: Some("555-0100"),
                email: Some("a@x.com"),
            })
            .unwrap();
        assert_eq!(id, 1);

        let user = users.authenticate("alice", "pw1").unwrap().unwrap();
        assert_eq!(user.id, 1);
        assert_eq!(user.username, "alice");
        assert_eq!(user.role, "user");

        assert!(users.authenticate("alice", "wrong").unwrap().is_none());
        assert!(users.authenticate("nobody", "pw1").unwrap().is_none());
    }

    #[test]
    fn test_password_is_not_stored_in_plaintext() {
        let conn = test_conn();
        let users = UsersRepository::new(&conn);

        users
            .add(&NewUser {
                username: "bob",
                password: "hunter2",
                phone: None,
                email: None,
            })
            .unwrap();

        let stored: String = conn
            .query_row(
                "SELECT password FROM Users WHERE username = 'bob'",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_ne!(stored, "hunter2");
        assert!(stored.starts_with("$argon2"));
    }

    #[test]
    fn test_read_back_by_id() {
        let conn = test_conn();
        let users = UsersRepository::new(&conn);

        let id = users
            .add(&NewUser {
                username: "carol",
                password: "pw",
                phone: Some("555-0101"),
                email: None,
            })
            .unwrap();

        let user = users.by_id(id).unwrap().first().unwrap().unwrap();
        assert_eq!(user.username, "carol");
        assert_eq!(user.phone.as_deref(), Some("555-0101"));
        assert_eq!(user.email, None);
    }

    #[test]
    fn test_update_missing_id_affects_zero_rows() {
        let conn = test_conn();
        let users = UsersRepository::new(&conn);

        let affected = users
            .update(
                999,
                &NewUser {
                    username: "ghost",
                    password: "pw",
                    phone: None,
                    email: None,
                },
            )
            .unwrap();
        assert_eq!(affected, 0);
        assert!(users.by_id(999).unwrap().first().unwrap().is_none());
    }

    #[test]
    fn test_update_existing_user() {
        let conn = test_conn();
        let users = UsersRepository::new(&conn);

        let id = users
            .add(&NewUser {
                username: "dave",
                password: "old",
                phone: None,
                email: None,
            })
            .unwrap();

        let affected = users
            .update(
                id,
                &NewUser {
                    username: "dave",
                    password: "new",
                    phone: Some("555-0199"),
                    email: Some("d@x.com"),
                },
            )
            .unwrap();
        assert_eq!(affected, 1);

        assert!(users.authenticate("dave", "old").unwrap().is_none());
        assert!(users.authenticate("dave", "new").unwrap().is_some());
    }

    #[test]
    fn test_delete_missing_id_is_noop() {
        let conn = test_conn();
        let users = UsersRepository::new(&conn);

        users.delete(12345).unwrap();
    }
}
