pub mod file;
pub mod filetag;
pub mod migration;
pub mod query;
pub mod tag;
pub mod tagalong;

use std::path::Path;

use crate::entities::{FileId, FileTagId, TagId};
use crate::errors::*;
use crate::path::CanonicalPath;

pub struct Storage {
    pub db_path: CanonicalPath,
    conn: rusqlite::Connection,
}

impl Storage {
    /// Open a sqlite3 DB file, creating it (and its schema) if it doesn't already exist.
    /// The parent directory is NOT created if missing.
    pub fn open(db_path: &Path) -> Result<Self> {
        info!("Opening vault database at {}", db_path.display());

        let conn = rusqlite::Connection::open(db_path)
            .map_err(|_| ErrorKind::DatabaseAccessError(db_path.to_path_buf()))?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;

        let db_path = CanonicalPath::new(db_path)
            .map_err(|_| ErrorKind::NoDatabaseFound(db_path.to_path_buf()))?;

        let mut store = Storage { db_path, conn };
        store.upgrade_database()?;

        Ok(store)
    }

    /// Open a throwaway in-memory vault, mainly useful for tests.
    #[cfg(test)]
    pub fn open_in_memory() -> Result<Self> {
        let conn = rusqlite::Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;

        let mut store = Storage {
            db_path: CanonicalPath::new(std::env::temp_dir())?,
            conn,
        };
        store.upgrade_database()?;
        Ok(store)
    }

    pub fn begin_transaction(&mut self) -> Result<Transaction<'_>> {
        Ok(Transaction {
            tx: self.conn.transaction()?,
        })
    }

    fn upgrade_database(&mut self) -> Result<()> {
        let mut tx = self.begin_transaction()?;
        migration::upgrade(&mut tx)?;
        tx.commit()?;
        Ok(())
    }
}

pub struct Transaction<'a> {
    tx: rusqlite::Transaction<'a>,
}

// This implementation exposes useful methods from the underlying DB transaction, hiding
// rusqlite-specific types from submodules (except for query params).
impl<'a> Transaction<'a> {
    pub fn commit(self) -> Result<()> {
        Ok(self.tx.commit()?)
    }

    pub(crate) fn execute_batch(&mut self, sql: &str) -> Result<()> {
        Ok(self.tx.execute_batch(sql)?)
    }

    pub(crate) fn execute_params<P>(&mut self, sql: &str, params: P) -> Result<usize>
    where
        P: rusqlite::Params,
    {
        Ok(self.tx.execute(sql, params)?)
    }

    pub(crate) fn query_vec<T, F>(&mut self, sql: &str, f: F) -> Result<Vec<T>>
    where
        F: Fn(&rusqlite::Row<'_>) -> Result<T>,
    {
        self.query_vec_params(sql, [], f)
    }

    pub(crate) fn query_vec_params<T, P, F>(&mut self, sql: &str, params: P, f: F) -> Result<Vec<T>>
    where
        P: rusqlite::Params,
        F: Fn(&rusqlite::Row<'_>) -> Result<T>,
    {
        let mut stmt = self.tx.prepare(sql)?;
        let mut rows = stmt.query(params)?;

        let mut objects = Vec::new();
        while let Some(row) = rows.next()? {
            objects.push(f(row)?);
        }

        Ok(objects)
    }

    pub(crate) fn query_single_params<T, P, F>(
        &mut self,
        sql: &str,
        params: P,
        f: F,
    ) -> Result<Option<T>>
    where
        P: rusqlite::Params,
        F: FnOnce(&rusqlite::Row<'_>) -> Result<T>,
    {
        let mut stmt = self.tx.prepare(sql)?;
        let mut rows = stmt.query(params)?;

        rows.next()?.map(f).transpose()
    }
}

/// Builds a SQL string and its parameters incrementally; useful when the number of bound
/// parameters depends on runtime data (e.g. a dynamic `IN (...)` list or `VALUES` table).
#[derive(Default)]
pub(crate) struct SqlBuilder {
    sql: String,
    params: Vec<rusqlite::types::Value>,
}

impl SqlBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append_sql(&mut self, fragment: &str) -> &mut Self {
        self.sql.push_str(fragment);
        self
    }

    pub fn append_param<T: Into<rusqlite::types::Value>>(&mut self, value: T) -> &mut Self {
        self.params.push(value.into());
        self.sql.push('?');
        self
    }

    pub fn sql(&self) -> &str {
        &self.sql
    }

    pub fn params(&self) -> &[rusqlite::types::Value] {
        &self.params
    }
}

impl From<TagId> for rusqlite::types::Value {
    fn from(id: TagId) -> Self {
        rusqlite::types::Value::Integer(id.0 as i64)
    }
}

impl From<FileId> for rusqlite::types::Value {
    fn from(id: FileId) -> Self {
        rusqlite::types::Value::Integer(id.0 as i64)
    }
}

impl From<FileTagId> for rusqlite::types::Value {
    fn from(id: FileTagId) -> Self {
        rusqlite::types::Value::Integer(id.0 as i64)
    }
}

impl rusqlite::types::FromSql for TagId {
    fn column_result(value: rusqlite::types::ValueRef<'_>) -> rusqlite::types::FromSqlResult<Self> {
        u32::column_result(value).map(TagId)
    }
}

impl rusqlite::ToSql for TagId {
    fn to_sql(&self) -> rusqlite::Result<rusqlite::types::ToSqlOutput<'_>> {
        self.0.to_sql()
    }
}

impl rusqlite::types::FromSql for FileId {
    fn column_result(value: rusqlite::types::ValueRef<'_>) -> rusqlite::types::FromSqlResult<Self> {
        u32::column_result(value).map(FileId)
    }
}

impl rusqlite::ToSql for FileId {
    fn to_sql(&self) -> rusqlite::Result<rusqlite::types::ToSqlOutput<'_>> {
        self.0.to_sql()
    }
}

impl rusqlite::types::FromSql for FileTagId {
    fn column_result(value: rusqlite::types::ValueRef<'_>) -> rusqlite::types::FromSqlResult<Self> {
        u32::column_result(value).map(FileTagId)
    }
}

impl rusqlite::ToSql for FileTagId {
    fn to_sql(&self) -> rusqlite::Result<rusqlite::types::ToSqlOutput<'_>> {
        self.0.to_sql()
    }
}
