use crate::entities::{Tag, TagId};
use crate::errors::*;
use crate::storage::Transaction;

pub fn by_name(tx: &mut Transaction, name: &str) -> Result<Option<Tag>> {
    let sql = "SELECT id, name FROM tag WHERE name = ?1";
    tx.query_single_params(sql, rusqlite::params![name], parse_tag)
}

pub fn all(tx: &mut Transaction) -> Result<Vec<Tag>> {
    let sql = "SELECT id, name FROM tag ORDER BY name";
    tx.query_vec(sql, parse_tag)
}

/// Find a tag by name, creating it if it doesn't exist. This is the only way new tags enter
/// the vault: there is no standalone "create tag" operation, matching `filetags/crud/tag.py`.
pub fn get_or_create(tx: &mut Transaction, name: &str) -> Result<Tag> {
    if let Some(tag) = by_name(tx, name)? {
        return Ok(tag);
    }

    let sql = "INSERT INTO tag (name) VALUES (?1) RETURNING id";
    let id: TagId = tx
        .query_single_params(sql, rusqlite::params![name], |row| Ok(row.get(0)?))?
        .chain_err(|| "insert into tag did not return an id")?;

    Ok(Tag {
        id,
        name: name.to_string(),
    })
}

fn parse_tag(row: &rusqlite::Row<'_>) -> Result<Tag> {
    Ok(Tag {
        id: row.get(0)?,
        name: row.get(1)?,
    })
}
