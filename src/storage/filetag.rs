use crate::entities::{FileId, FileTag, FileTagId, TagId};
use crate::errors::*;
use crate::storage::Transaction;

pub fn by_file_id(tx: &mut Transaction, file_id: FileId) -> Result<Vec<FileTag>> {
    let sql = "SELECT id, file_id, tag_id, parent_id FROM file_tag WHERE file_id = ?1";
    tx.query_vec_params(sql, rusqlite::params![file_id], parse_file_tag)
}

/// Children of `parent_id` (or root nodes, when `parent_id` is `None`) for one file, in
/// attachment order.
pub fn children(
    tx: &mut Transaction,
    file_id: FileId,
    parent_id: Option<FileTagId>,
) -> Result<Vec<FileTag>> {
    match parent_id {
        Some(parent_id) => {
            let sql = "
SELECT id, file_id, tag_id, parent_id
FROM file_tag
WHERE file_id = ?1 AND parent_id = ?2
ORDER BY id";
            tx.query_vec_params(sql, rusqlite::params![file_id, parent_id], parse_file_tag)
        }
        None => {
            let sql = "
SELECT id, file_id, tag_id, parent_id
FROM file_tag
WHERE file_id = ?1 AND parent_id IS NULL
ORDER BY id";
            tx.query_vec_params(sql, rusqlite::params![file_id], parse_file_tag)
        }
    }
}

/// Resolve a `/`-style path of tag names to the `FileTagId` of its last segment, if the whole
/// path exists for this file. Used to find the attachment point for `remove`/`replace`.
pub fn resolve_path(tx: &mut Transaction, file_id: FileId, path: &[TagId]) -> Result<Option<FileTagId>> {
    let mut parent_id = None;
    let mut found = None;

    for tag_id in path {
        let siblings = children(tx, file_id, parent_id)?;
        let node = siblings.into_iter().find(|ft| ft.tag_id == *tag_id);
        match node {
            Some(node) => {
                found = Some(node.id);
                parent_id = Some(node.id);
            }
            None => return Ok(None),
        }
    }

    Ok(found)
}

/// Attach `tag_id` under `parent_id` for `file_id`, returning the existing node if a sibling
/// with the same tag already sits there.
///
/// `UNIQUE(file_id, tag_id, parent_id)` does not prevent duplicate *root* nodes: SQL treats
/// every `NULL` as distinct from every other `NULL`, so the constraint is silently void when
/// `parent_id` is `NULL`. We therefore always select-before-insert rather than relying on
/// `ON CONFLICT DO NOTHING`.
pub fn attach(
    tx: &mut Transaction,
    file_id: FileId,
    tag_id: TagId,
    parent_id: Option<FileTagId>,
) -> Result<FileTagId> {
    if let Some(existing) = children(tx, file_id, parent_id)?
        .into_iter()
        .find(|ft| ft.tag_id == tag_id)
    {
        return Ok(existing.id);
    }

    let sql = "INSERT INTO file_tag (file_id, tag_id, parent_id) VALUES (?1, ?2, ?3) RETURNING id";
    let id: FileTagId = tx
        .query_single_params(sql, rusqlite::params![file_id, tag_id, parent_id], |row| {
            Ok(row.get(0)?)
        })?
        .chain_err(|| "insert into file_tag did not return an id")?;

    Ok(id)
}

/// Detach a node and (through `ON DELETE CASCADE`) its whole subtree.
pub fn detach(tx: &mut Transaction, file_tag_id: FileTagId) -> Result<()> {
    let sql = "DELETE FROM file_tag WHERE id = ?1";
    match tx.execute_params(sql, rusqlite::params![file_tag_id])? {
        0 => Err(ErrorKind::NotFound("file tag".into(), file_tag_id.to_string()).into()),
        _ => Ok(()),
    }
}

/// Detach every tag attached to a file, e.g. before re-tagging it from scratch (`set`).
pub fn drop_for_file(tx: &mut Transaction, file_id: FileId) -> Result<usize> {
    let sql = "DELETE FROM file_tag WHERE file_id = ?1 AND parent_id IS NULL";
    tx.execute_params(sql, rusqlite::params![file_id])
}

fn parse_file_tag(row: &rusqlite::Row<'_>) -> Result<FileTag> {
    Ok(FileTag {
        id: row.get(0)?,
        file_id: row.get(1)?,
        tag_id: row.get(2)?,
        parent_id: row.get(3)?,
    })
}
