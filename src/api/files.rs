use regex::RegexBuilder;

use crate::config::VaultConfig;
use crate::entities::{File, FileId};
use crate::errors::*;
use crate::executor::Executor;
use crate::planner;
use crate::query::Expression;
use crate::storage::{self, Storage};

/// Run a select/exclude tag query against the vault and return matching paths, sorted.
/// Composes one query string `S1|S2|…,!E1|!E2|…` from the given tag lists (empty selects and
/// excludes both ⇒ list every file), then parses, plans and executes it, finally running an
/// optional regex post-filter XORed with `invert_match`. Grounded in
/// `tagumori/service.py::execute_query`.
pub fn execute_query(
    config: &VaultConfig,
    select_tags: &[String],
    exclude_tags: &[String],
    pattern: &str,
    ignore_case: bool,
    invert_match: bool,
    ignore_tag_case: bool,
) -> Result<Vec<String>> {
    let mut store = Storage::open(&config.vault_path)?;
    let mut tx = store.begin_transaction()?;

    let mut clauses = Vec::new();
    if !select_tags.is_empty() {
        clauses.push(select_tags.join("|"));
    }
    if !exclude_tags.is_empty() {
        let excluded: Vec<String> = exclude_tags.iter().map(|tag| format!("!{}", tag)).collect();
        clauses.push(excluded.join("|"));
    }

    let file_ids: Vec<FileId> = if clauses.is_empty() {
        storage::file::all(&mut tx)?.into_iter().map(|f| f.id).collect()
    } else {
        let query_string = clauses.join(",");
        debug!("Composed query string: {}", query_string);

        let expr = Expression::parse(&query_string)?;
        let plan = planner::plan(&expr);
        Executor::new(&mut tx, ignore_tag_case)
            .execute(&plan)?
            .into_iter()
            .collect()
    };

    let mut files = storage::file::get_many(&mut tx, &file_ids)?;
    tx.commit()?;

    if !pattern.is_empty() {
        let regex = RegexBuilder::new(pattern).case_insensitive(ignore_case).build()?;
        files.retain(|file| regex.is_match(&file.path) != invert_match);
    }

    let mut paths: Vec<String> = files.into_iter().map(|file| file.path).collect();
    paths.sort();
    Ok(paths)
}

/// `true` iff `file` was previously recorded at a different inode/device and both values match
/// the candidate's, meaning the candidate is very likely `file` after being moved. Platforms
/// that never recorded inode/device return `false`, never a false positive. Grounded in
/// `tagumori/service.py::relocate_file`.
pub fn find_relocation_candidate(file: &File, candidate_inode: i64, candidate_device: i64) -> bool {
    file.inode == Some(candidate_inode) && file.device == Some(candidate_device)
}

/// Record that `file_id` now lives at `new_path` (with, possibly, a new inode/device pair).
pub fn update_file_location(
    config: &VaultConfig,
    file_id: FileId,
    new_path: &str,
    new_inode: Option<i64>,
    new_device: Option<i64>,
) -> Result<()> {
    let mut store = Storage::open(&config.vault_path)?;
    let mut tx = store.begin_transaction()?;

    storage::file::update_location(&mut tx, file_id, new_path, new_inode, new_device)?;

    tx.commit()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::tags::add_tags_to_files;

    fn temp_config(name: &str) -> VaultConfig {
        let path = std::env::temp_dir().join(format!("vaultkeep-files-test-{}-{:?}.db", name, std::thread::current().id()));
        let _ = std::fs::remove_file(&path);
        VaultConfig::new(path)
    }

    #[test]
    fn empty_selects_and_excludes_list_everything() {
        let config = temp_config("list-all");
        add_tags_to_files(&config, &["a.mp3".to_string(), "b.mp3".to_string()], &["rock".to_string()], false).unwrap();

        let found = execute_query(&config, &[], &[], "", false, false, false).unwrap();
        assert_eq!(found, vec!["a.mp3".to_string(), "b.mp3".to_string()]);

        let _ = std::fs::remove_file(&config.vault_path);
    }

    #[test]
    fn select_and_exclude_compose_into_one_query() {
        let config = temp_config("select-exclude");
        add_tags_to_files(&config, &["a.mp3".to_string()], &["rock".to_string()], false).unwrap();
        add_tags_to_files(&config, &["b.mp3".to_string()], &["rock,live".to_string()], false).unwrap();

        let found = execute_query(&config, &["rock".to_string()], &["live".to_string()], "", false, false, false).unwrap();
        assert_eq!(found, vec!["a.mp3".to_string()]);

        let _ = std::fs::remove_file(&config.vault_path);
    }

    #[test]
    fn relocation_candidate_requires_both_inode_and_device_to_match() {
        let file = File {
            id: FileId(1),
            path: "a.mp3".to_string(),
            inode: Some(7),
            device: Some(1),
        };
        assert!(find_relocation_candidate(&file, 7, 1));
        assert!(!find_relocation_candidate(&file, 7, 2));

        let unrecorded = File {
            id: FileId(2),
            path: "b.mp3".to_string(),
            inode: None,
            device: None,
        };
        assert!(!find_relocation_candidate(&unrecorded, 7, 1));
    }
}
