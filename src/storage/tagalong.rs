use std::collections::HashSet;

use crate::entities::{TagId, TagalongEdge};
use crate::errors::*;
use crate::storage::Transaction;

pub fn all(tx: &mut Transaction) -> Result<Vec<TagalongEdge>> {
    let sql = "SELECT tag_id, tagalong_id FROM tagalong ORDER BY tag_id, tagalong_id";
    tx.query_vec(sql, parse_edge)
}

pub fn get_all_names(tx: &mut Transaction) -> Result<Vec<(String, String)>> {
    let sql = "
SELECT t.name, u.name
FROM tagalong ta
INNER JOIN tag t ON ta.tag_id = t.id
INNER JOIN tag u ON ta.tagalong_id = u.id
ORDER BY t.name, u.name";

    tx.query_vec(sql, |row| Ok((row.get(0)?, row.get(1)?)))
}

/// Record that attaching `tag_id` implies `tagalong_id`. Rejects an edge that would create a
/// cycle in the tagalong graph (direct or transitive), since `apply` assumes a DAG.
pub fn create(tx: &mut Transaction, tag_id: TagId, tagalong_id: TagId) -> Result<()> {
    if tag_id == tagalong_id {
        return Err(ErrorKind::InvalidArgument("a tag cannot tag along with itself".into()).into());
    }

    if would_cycle(tx, tag_id, tagalong_id)? {
        return Err(ErrorKind::InvalidArgument(format!(
            "adding tagalong {} -> {} would create a cycle",
            tag_id, tagalong_id
        ))
        .into());
    }

    let sql = "INSERT OR IGNORE INTO tagalong (tag_id, tagalong_id) VALUES (?1, ?2)";
    tx.execute_params(sql, rusqlite::params![tag_id, tagalong_id])?;
    Ok(())
}

pub fn delete(tx: &mut Transaction, tag_id: TagId, tagalong_id: TagId) -> Result<()> {
    let sql = "DELETE FROM tagalong WHERE tag_id = ?1 AND tagalong_id = ?2";
    match tx.execute_params(sql, rusqlite::params![tag_id, tagalong_id])? {
        0 => Err(ErrorKind::NotFound(
            "tagalong".into(),
            format!("{} -> {}", tag_id, tagalong_id),
        )
        .into()),
        _ => Ok(()),
    }
}

/// Transitive closure of the tags implied by `tag_ids`, not including `tag_ids` themselves
/// unless they are reachable through some other edge. Ported from
/// `tagumori/crud/tagalong.py::apply`'s recursive CTE.
pub fn apply(tx: &mut Transaction, tag_ids: &[TagId]) -> Result<HashSet<TagId>> {
    if tag_ids.is_empty() {
        return Ok(HashSet::new());
    }

    let mut placeholders = String::new();
    for (index, _) in tag_ids.iter().enumerate() {
        if index > 0 {
            placeholders.push(',');
        }
        placeholders.push_str(&format!("?{}", index + 1));
    }

    let sql = format!(
        "
WITH RECURSIVE closure(tag_id) AS (
    SELECT tagalong_id FROM tagalong WHERE tag_id IN ({placeholders})
    UNION
    SELECT ta.tagalong_id
    FROM tagalong ta
    INNER JOIN closure c ON ta.tag_id = c.tag_id
)
SELECT tag_id FROM closure",
        placeholders = placeholders
    );

    let params: Vec<TagId> = tag_ids.to_vec();
    let ids: Vec<TagId> = tx.query_vec_params(&sql, rusqlite::params_from_iter(params), |row| {
        Ok(row.get(0)?)
    })?;

    Ok(ids.into_iter().collect())
}

fn would_cycle(tx: &mut Transaction, tag_id: TagId, tagalong_id: TagId) -> Result<bool> {
    let reachable = apply(tx, &[tagalong_id])?;
    Ok(tagalong_id == tag_id || reachable.contains(&tag_id))
}

fn parse_edge(row: &rusqlite::Row<'_>) -> Result<TagalongEdge> {
    Ok(TagalongEdge {
        tag_id: row.get(0)?,
        tagalong_id: row.get(1)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{tag, Storage};

    #[test]
    fn apply_computes_transitive_closure() {
        let mut store = Storage::open_in_memory().unwrap();
        let mut tx = store.begin_transaction().unwrap();

        let a = tag::get_or_create(&mut tx, "a").unwrap().id;
        let b = tag::get_or_create(&mut tx, "b").unwrap().id;
        let c = tag::get_or_create(&mut tx, "c").unwrap().id;

        create(&mut tx, a, b).unwrap();
        create(&mut tx, b, c).unwrap();

        let closure = apply(&mut tx, &[a]).unwrap();
        assert!(closure.contains(&b));
        assert!(closure.contains(&c));
    }

    #[test]
    fn create_rejects_cycles() {
        let mut store = Storage::open_in_memory().unwrap();
        let mut tx = store.begin_transaction().unwrap();

        let a = tag::get_or_create(&mut tx, "a").unwrap().id;
        let b = tag::get_or_create(&mut tx, "b").unwrap().id;

        create(&mut tx, a, b).unwrap();
        assert!(create(&mut tx, b, a).is_err());
    }
}
