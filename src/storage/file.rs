use crate::entities::{File, FileId};
use crate::errors::*;
use crate::storage::{SqlBuilder, Transaction};

pub fn by_path(tx: &mut Transaction, path: &str) -> Result<Option<File>> {
    let sql = "SELECT id, path, inode, device FROM file WHERE path = ?1";
    tx.query_single_params(sql, rusqlite::params![path], parse_file)
}

/// Fetch several files by path in one round trip. Paths with no matching row are simply
/// absent from the result, mirroring `filetags/crud/file.py::get_many_by_path`.
pub fn get_many_by_path(tx: &mut Transaction, paths: &[String]) -> Result<Vec<File>> {
    if paths.is_empty() {
        return Ok(Vec::new());
    }

    let mut builder = SqlBuilder::new();
    builder.append_sql("SELECT id, path, inode, device FROM file WHERE path IN (");
    for (index, path) in paths.iter().enumerate() {
        if index > 0 {
            builder.append_sql(", ");
        }
        builder.append_param(path.clone());
    }
    builder.append_sql(")");

    tx.query_vec_params(builder.sql(), builder.params(), parse_file)
}

pub fn get_many(tx: &mut Transaction, file_ids: &[FileId]) -> Result<Vec<File>> {
    if file_ids.is_empty() {
        return Ok(Vec::new());
    }

    let mut builder = SqlBuilder::new();
    builder.append_sql("SELECT id, path, inode, device FROM file WHERE id IN (");
    for (index, file_id) in file_ids.iter().enumerate() {
        if index > 0 {
            builder.append_sql(", ");
        }
        builder.append_param(*file_id);
    }
    builder.append_sql(")");

    tx.query_vec_params(builder.sql(), builder.params(), parse_file)
}

pub fn all(tx: &mut Transaction) -> Result<Vec<File>> {
    let sql = "SELECT id, path, inode, device FROM file ORDER BY path";
    tx.query_vec(sql, parse_file)
}

/// Find a file by path, creating it (with no recorded inode/device) if it doesn't exist yet.
pub fn get_or_create(
    tx: &mut Transaction,
    path: &str,
    inode: Option<i64>,
    device: Option<i64>,
) -> Result<File> {
    if let Some(file) = by_path(tx, path)? {
        return Ok(file);
    }

    let sql = "INSERT INTO file (path, inode, device) VALUES (?1, ?2, ?3) RETURNING id";
    let id: FileId = tx
        .query_single_params(sql, rusqlite::params![path, inode, device], |row| {
            Ok(row.get(0)?)
        })?
        .chain_err(|| "insert into file did not return an id")?;

    Ok(File {
        id,
        path: path.to_string(),
        inode,
        device,
    })
}

/// Update a file's recorded path (and inode/device, which may have changed along with it).
pub fn update_location(
    tx: &mut Transaction,
    file_id: FileId,
    path: &str,
    inode: Option<i64>,
    device: Option<i64>,
) -> Result<()> {
    let sql = "UPDATE file SET path = ?2, inode = ?3, device = ?4 WHERE id = ?1";
    match tx.execute_params(sql, rusqlite::params![file_id, path, inode, device])? {
        0 => Err(ErrorKind::NotFound("file".into(), file_id.to_string()).into()),
        _ => Ok(()),
    }
}

pub fn delete(tx: &mut Transaction, file_id: FileId) -> Result<()> {
    let sql = "DELETE FROM file WHERE id = ?1";
    match tx.execute_params(sql, rusqlite::params![file_id])? {
        0 => Err(ErrorKind::NotFound("file".into(), file_id.to_string()).into()),
        _ => Ok(()),
    }
}

fn parse_file(row: &rusqlite::Row<'_>) -> Result<File> {
    Ok(File {
        id: row.get(0)?,
        path: row.get(1)?,
        inode: row.get(2)?,
        device: row.get(3)?,
    })
}
