use crate::config::VaultConfig;
use crate::entities::SavedQuery;
use crate::errors::*;
use crate::query::Expression;
use crate::storage::{self, Storage};

/// Validate and persist a query under `name`. `select_tags`/`exclude_tags` are full query
/// strings (not necessarily storage-safe attach trees), each parsed to reject garbage before
/// it's stored. A duplicate name is a **Conflict**, overridden with `force`. Supplements the
/// distilled service facade from the `query` table named in the persistent schema.
#[allow(clippy::too_many_arguments)]
pub fn save_query(
    config: &VaultConfig,
    name: &str,
    select_tags: &[String],
    exclude_tags: &[String],
    pattern: &str,
    ignore_case: bool,
    invert_match: bool,
    ignore_tag_case: bool,
    force: bool,
) -> Result<SavedQuery> {
    let mut store = Storage::open(&config.vault_path)?;
    let mut tx = store.begin_transaction()?;

    for tag_query in select_tags.iter().chain(exclude_tags.iter()) {
        Expression::parse(tag_query)?;
    }

    if force {
        if storage::query::by_name(&mut tx, name)?.is_some() {
            storage::query::delete(&mut tx, name)?;
        }
    }

    let saved = storage::query::create(
        &mut tx,
        name,
        select_tags,
        exclude_tags,
        pattern,
        ignore_case,
        invert_match,
        ignore_tag_case,
    )?;

    tx.commit()?;
    Ok(saved)
}

pub fn saved_query_by_name(config: &VaultConfig, name: &str) -> Result<SavedQuery> {
    let mut store = Storage::open(&config.vault_path)?;
    let mut tx = store.begin_transaction()?;

    let saved = storage::query::by_name(&mut tx, name)?
        .ok_or_else(|| ErrorKind::NotFound("saved query".into(), name.into()))?;

    tx.commit()?;
    Ok(saved)
}

pub fn list_saved_queries(config: &VaultConfig) -> Result<Vec<SavedQuery>> {
    let mut store = Storage::open(&config.vault_path)?;
    let mut tx = store.begin_transaction()?;

    let queries = storage::query::all(&mut tx)?;

    tx.commit()?;
    Ok(queries)
}

pub fn delete_saved_query(config: &VaultConfig, name: &str) -> Result<()> {
    let mut store = Storage::open(&config.vault_path)?;
    let mut tx = store.begin_transaction()?;

    storage::query::delete(&mut tx, name)?;

    tx.commit()
}

/// Load a saved query by name and run it through `files::execute_query`.
pub fn execute_saved_query(config: &VaultConfig, name: &str) -> Result<Vec<String>> {
    let saved = saved_query_by_name(config, name)?;

    super::files::execute_query(
        config,
        &saved.select_tags,
        &saved.exclude_tags,
        &saved.pattern,
        saved.ignore_case,
        saved.invert_match,
        saved.ignore_tag_case,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_config(name: &str) -> VaultConfig {
        let path = std::env::temp_dir().join(format!("vaultkeep-query-test-{}-{:?}.db", name, std::thread::current().id()));
        let _ = std::fs::remove_file(&path);
        VaultConfig::new(path)
    }

    #[test]
    fn save_rejects_duplicate_name_without_force() {
        let config = temp_config("dup");

        save_query(&config, "recent", &["rock".to_string()], &[], "", false, false, false, false).unwrap();
        assert!(save_query(&config, "recent", &["jazz".to_string()], &[], "", false, false, false, false).is_err());
        save_query(&config, "recent", &["jazz".to_string()], &[], "", false, false, false, true).unwrap();

        let found = saved_query_by_name(&config, "recent").unwrap();
        assert_eq!(found.select_tags, vec!["jazz".to_string()]);

        let _ = std::fs::remove_file(&config.vault_path);
    }

    #[test]
    fn execute_saved_query_delegates_to_execute_query() {
        let config = temp_config("exec");
        crate::api::tags::add_tags_to_files(&config, &["a.mp3".to_string()], &["rock".to_string()], false).unwrap();
        save_query(&config, "rock-only", &["rock".to_string()], &[], "", false, false, false, false).unwrap();

        let found = execute_saved_query(&config, "rock-only").unwrap();
        assert_eq!(found, vec!["a.mp3".to_string()]);

        let _ = std::fs::remove_file(&config.vault_path);
    }
}
