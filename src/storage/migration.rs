//! Schema creation and upgrade. Migrations are idempotent: re-running the latest script
//! against an up-to-date store is a no-op, matching `Storage::upgrade_database` in spirit.

use crate::errors::*;
use crate::storage::Transaction;

pub const CURRENT_SCHEMA_VERSION: u32 = 1;

const SCHEMA_V1: &str = "
CREATE TABLE IF NOT EXISTS meta (
    schema_version INTEGER NOT NULL
);

CREATE TABLE IF NOT EXISTS file (
    id INTEGER PRIMARY KEY,
    path TEXT UNIQUE NOT NULL,
    inode INTEGER,
    device INTEGER
);

CREATE TABLE IF NOT EXISTS tag (
    id INTEGER PRIMARY KEY,
    name TEXT UNIQUE NOT NULL,
    category TEXT
);

CREATE TABLE IF NOT EXISTS file_tag (
    id INTEGER PRIMARY KEY,
    file_id INTEGER NOT NULL REFERENCES file(id) ON DELETE CASCADE,
    tag_id INTEGER NOT NULL REFERENCES tag(id) ON DELETE CASCADE,
    parent_id INTEGER REFERENCES file_tag(id) ON DELETE CASCADE,
    UNIQUE(file_id, tag_id, parent_id)
);

CREATE TABLE IF NOT EXISTS tagalong (
    tag_id INTEGER NOT NULL REFERENCES tag(id) ON DELETE CASCADE,
    tagalong_id INTEGER NOT NULL REFERENCES tag(id) ON DELETE CASCADE,
    PRIMARY KEY (tag_id, tagalong_id)
);

CREATE TABLE IF NOT EXISTS query (
    id INTEGER PRIMARY KEY,
    name TEXT UNIQUE NOT NULL,
    select_tags TEXT NOT NULL,
    exclude_tags TEXT NOT NULL,
    pattern TEXT NOT NULL,
    ignore_case INTEGER NOT NULL,
    invert_match INTEGER NOT NULL,
    ignore_tag_case INTEGER NOT NULL
);
";

/// Run every migration whose version is greater than the store's current schema version.
/// Reapplying the latest script on an up-to-date store must be a no-op: every statement uses
/// `CREATE TABLE IF NOT EXISTS`, so this holds trivially for a single-migration schema.
pub(crate) fn upgrade(tx: &mut Transaction) -> Result<()> {
    tx.execute_batch(SCHEMA_V1)?;

    let version = current_version(tx)?;
    if version < CURRENT_SCHEMA_VERSION {
        set_version(tx, CURRENT_SCHEMA_VERSION)?;
    }

    Ok(())
}

fn current_version(tx: &mut Transaction) -> Result<u32> {
    let row: Option<u32> =
        tx.query_single_params("SELECT schema_version FROM meta LIMIT 1", [], |row| {
            Ok(row.get(0)?)
        })?;
    Ok(row.unwrap_or(0))
}

fn set_version(tx: &mut Transaction, version: u32) -> Result<()> {
    tx.execute_params("DELETE FROM meta", [])?;
    tx.execute_params("INSERT INTO meta (schema_version) VALUES (?1)", [version])?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use crate::storage::Storage;

    #[test]
    fn upgrade_is_idempotent() {
        let mut store = Storage::open_in_memory().unwrap();
        // A second upgrade pass (as would happen on re-opening an up-to-date store) must not
        // error out or duplicate the meta row.
        let mut tx = store.begin_transaction().unwrap();
        super::upgrade(&mut tx).unwrap();
        tx.commit().unwrap();

        let mut tx = store.begin_transaction().unwrap();
        let version = super::current_version(&mut tx).unwrap();
        assert_eq!(version, super::CURRENT_SCHEMA_VERSION);
    }
}
