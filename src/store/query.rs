//! Lazy row streaming
//!
//! Read operations hand back a [`Query`]: a prepared statement with its
//! parameters bound but nothing executed. Calling [`Query::cursor`] starts
//! execution and yields a forward-only [`Cursor`]; rows are materialized one
//! at a time as the cursor is stepped, and dropping the cursor (or the
//! query) finalizes the statement.

use crate::error::StoreError;
use rusqlite::types::Value;
use rusqlite::{params_from_iter, Connection, Row, Rows, Statement};

/// A prepared, parameter-bound read query
///
/// Nothing touches the database until [`cursor`](Self::cursor) is called.
pub struct Query<'conn, T> {
    stmt: Statement<'conn>,
    params: Vec<Value>,
    map: fn(&Row<'_>) -> rusqlite::Result<T>,
}

impl<'conn, T> Query<'conn, T> {
    pub(crate) fn prepare(
        conn: &'conn Connection,
        sql: &str,
        params: Vec<Value>,
        map: fn(&Row<'_>) -> rusqlite::Result<T>,
    ) -> Result<Self, StoreError> {
        let stmt = conn.prepare(sql)?;
        Ok(Self { stmt, params, map })
    }

    /// Begin execution and return a forward-only cursor over the rows
    pub fn cursor(&mut self) -> Result<Cursor<'_, T>, StoreError> {
        let rows = self.stmt.query(params_from_iter(self.params.iter()))?;
        Ok(Cursor {
            rows,
            map: self.map,
        })
    }

    /// Run the query to completion and collect every row
    pub fn collect(mut self) -> Result<Vec<T>, StoreError> {
        let mut cursor = self.cursor()?;
        let mut items = Vec::new();
        while let Some(item) = cursor.next()? {
            items.push(item);
        }
        Ok(items)
    }

    /// Run the query and return the first row, if any
    pub fn first(mut self) -> Result<Option<T>, StoreError> {
        self.cursor()?.next()
    }
}

/// A forward-only, closable handle over a query's result rows
///
/// Advance with [`next`](Self::next); `None` marks exhaustion. The
/// underlying statement is finalized when the cursor and its query drop.
pub struct Cursor<'q, T> {
    rows: Rows<'q>,
    map: fn(&Row<'_>) -> rusqlite::Result<T>,
}

impl<T> Cursor<'_, T> {
    /// Step to the next row, or `None` once the result set is exhausted
    #[allow(clippy::should_implement_trait)]
    pub fn next(&mut self) -> Result<Option<T>, StoreError> {
        match self.rows.next()? {
            Some(row) => Ok(Some((self.map)(row)?)),
            None => Ok(None),
        }
    }

    /// Close the cursor, releasing the statement
    pub fn close(self) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_conn() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute("CREATE TABLE nums (n INTEGER NOT NULL)", [])
            .unwrap();
        conn.execute("INSERT INTO nums (n) VALUES (1), (2), (3)", [])
            .unwrap();
        conn
    }

    fn n_from_row(row: &Row<'_>) -> rusqlite::Result<i64> {
        row.get(0)
    }

    #[test]
    fn test_cursor_steps_forward_only() {
        let conn = test_conn();
        let mut query = Query::prepare(
            &conn,
            "SELECT n FROM nums ORDER BY n",
            vec![],
            n_from_row,
        )
        .unwrap();

        let mut cursor = query.cursor().unwrap();
        assert_eq!(cursor.next().unwrap(), Some(1));
        assert_eq!(cursor.next().unwrap(), Some(2));
        assert_eq!(cursor.next().unwrap(), Some(3));
        assert_eq!(cursor.next().unwrap(), None);
    }

    #[test]
    fn test_collect() {
        let conn = test_conn();
        let query = Query::prepare(
            &conn,
            "SELECT n FROM nums ORDER BY n",
            vec![],
            n_from_row,
        )
        .unwrap();

        assert_eq!(query.collect().unwrap(), vec![1, 2, 3]);
    }

    #[test]
    fn test_first_on_empty_result() {
        let conn = test_conn();
        let query = Query::prepare(
            &conn,
            "SELECT n FROM nums WHERE n > ?1",
            vec![Value::from(10_i64)],
            n_from_row,
        )
        .unwrap();

        assert_eq!(query.first().unwrap(), None);
    }

    #[test]
    fn test_bound_params() {
        let conn = test_conn();
        let query = Query::prepare(
            &conn,
            "SELECT n FROM nums WHERE n >= ?1 ORDER BY n",
            vec![Value::from(2_i64)],
            n_from_row,
        )
        .unwrap();

        assert_eq!(query.collect().unwrap(), vec![2, 3]);
    }
}
