//! Persistence for saved queries (spec §4.6.1). A saved query stores its select/exclude tag
//! lists as JSON arrays of strings rather than as rows in their own table: they are never
//! joined against or queried by tag, only read back whole, so a relational model would add
//! structure with no payoff (SPEC_FULL.md §3).

use crate::entities::SavedQuery;
use crate::errors::*;
use crate::storage::Transaction;

pub fn by_name(tx: &mut Transaction, name: &str) -> Result<Option<SavedQuery>> {
    let sql = "
SELECT id, name, select_tags, exclude_tags, pattern, ignore_case, invert_match, ignore_tag_case
FROM query
WHERE name = ?1";
    tx.query_single_params(sql, rusqlite::params![name], parse_saved_query)
}

pub fn all(tx: &mut Transaction) -> Result<Vec<SavedQuery>> {
    let sql = "
SELECT id, name, select_tags, exclude_tags, pattern, ignore_case, invert_match, ignore_tag_case
FROM query
ORDER BY name";
    tx.query_vec(sql, parse_saved_query)
}

#[allow(clippy::too_many_arguments)]
pub fn create(
    tx: &mut Transaction,
    name: &str,
    select_tags: &[String],
    exclude_tags: &[String],
    pattern: &str,
    ignore_case: bool,
    invert_match: bool,
    ignore_tag_case: bool,
) -> Result<SavedQuery> {
    if by_name(tx, name)?.is_some() {
        return Err(ErrorKind::Conflict("saved query".into(), name.into()).into());
    }

    let select_json = serde_json::to_string(select_tags)?;
    let exclude_json = serde_json::to_string(exclude_tags)?;

    let sql = "
INSERT INTO query (name, select_tags, exclude_tags, pattern, ignore_case, invert_match, ignore_tag_case)
VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
RETURNING id";

    let id: u32 = tx
        .query_single_params(
            sql,
            rusqlite::params![
                name,
                select_json,
                exclude_json,
                pattern,
                ignore_case,
                invert_match,
                ignore_tag_case
            ],
            |row| Ok(row.get(0)?),
        )?
        .chain_err(|| "insert into query did not return an id")?;

    Ok(SavedQuery {
        id,
        name: name.to_string(),
        select_tags: select_tags.to_vec(),
        exclude_tags: exclude_tags.to_vec(),
        pattern: pattern.to_string(),
        ignore_case,
        invert_match,
        ignore_tag_case,
    })
}

pub fn delete(tx: &mut Transaction, name: &str) -> Result<()> {
    let sql = "DELETE FROM query WHERE name = ?1";
    match tx.execute_params(sql, rusqlite::params![name])? {
        0 => Err(ErrorKind::NotFound("saved query".into(), name.into()).into()),
        _ => Ok(()),
    }
}

fn parse_saved_query(row: &rusqlite::Row<'_>) -> Result<SavedQuery> {
    let select_tags: String = row.get(2)?;
    let exclude_tags: String = row.get(3)?;

    Ok(SavedQuery {
        id: row.get(0)?,
        name: row.get(1)?,
        select_tags: serde_json::from_str(&select_tags)?,
        exclude_tags: serde_json::from_str(&exclude_tags)?,
        pattern: row.get(4)?,
        ignore_case: row.get(5)?,
        invert_match: row.get(6)?,
        ignore_tag_case: row.get(7)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::Storage;

    #[test]
    fn roundtrips_tag_lists_as_json() {
        let mut store = Storage::open_in_memory().unwrap();
        let mut tx = store.begin_transaction().unwrap();

        create(
            &mut tx,
            "recent-rock",
            &["genre/rock".to_string()],
            &["live".to_string()],
            "",
            false,
            false,
            false,
        )
        .unwrap();

        let found = by_name(&mut tx, "recent-rock").unwrap().unwrap();
        assert_eq!(found.select_tags, vec!["genre/rock".to_string()]);
        assert_eq!(found.exclude_tags, vec!["live".to_string()]);
    }

    #[test]
    fn create_rejects_duplicate_name() {
        let mut store = Storage::open_in_memory().unwrap();
        let mut tx = store.begin_transaction().unwrap();

        create(&mut tx, "dup", &[], &[], "", false, false, false).unwrap();
        assert!(create(&mut tx, "dup", &[], &[], "", false, false, false).is_err());
    }
}
