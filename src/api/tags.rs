use std::collections::HashMap;

use crate::config::VaultConfig;
use crate::entities::{FileId, TagId};
use crate::errors::*;
use crate::query::Expression;
use crate::storage::{self, Storage, Transaction};
use crate::tree;

use super::imply::apply_tagalongs_to_files;

/// List every tag name known to the vault, alphabetically.
pub fn list_tags(config: &VaultConfig) -> Result<Vec<String>> {
    let mut store = Storage::open(&config.vault_path)?;
    let mut tx = store.begin_transaction()?;

    let names = storage::tag::all(&mut tx)?.into_iter().map(|tag| tag.name).collect();

    tx.commit()?;
    Ok(names)
}

/// Parse a comma-joined storage expression and attach it under every given file, creating
/// tags and files on first use. Grounded in `tagumori/service.py::add_tags_to_files`.
pub fn add_tags_to_files(
    config: &VaultConfig,
    files: &[String],
    tag_strings: &[String],
    apply_tagalongs: bool,
) -> Result<()> {
    let mut store = Storage::open(&config.vault_path)?;
    let mut tx = store.begin_transaction()?;

    let expr = Expression::parse_for_storage(&tag_strings.join(","))?;

    let mut affected = Vec::with_capacity(files.len());
    for path in files {
        let file = storage::file::get_or_create(&mut tx, path, None, None)?;
        tree::attach_tree(&mut tx, file.id, &expr, None)?;
        affected.push(file.id);
    }

    if apply_tagalongs {
        apply_tagalongs_to_files(&mut tx, &affected)?;
    }

    tx.commit()
}

/// Resolve every root-to-leaf path named by `tag_strings` against each file and detach the
/// terminal node where it's found. Paths that don't exist for a given file are skipped.
pub fn remove_tags_from_files(config: &VaultConfig, files: &[String], tag_strings: &[String]) -> Result<()> {
    let mut store = Storage::open(&config.vault_path)?;
    let mut tx = store.begin_transaction()?;

    let expr = Expression::parse_for_storage(&tag_strings.join(","))?;
    let paths = expr_paths(&expr);

    for path in files {
        let file = match storage::file::by_path(&mut tx, path)? {
            Some(file) => file,
            None => continue,
        };

        for name_path in &paths {
            if let Some(tag_ids) = tag_ids_for_path(&mut tx, name_path)? {
                if let Some(file_tag_id) = storage::filetag::resolve_path(&mut tx, file.id, &tag_ids)? {
                    storage::filetag::detach(&mut tx, file_tag_id)?;
                }
            }
        }
    }

    tx.commit()
}

/// Replace each file's whole tag forest with `tag_strings`: compute the desired paths, detach
/// whatever's there that isn't among them, then attach (grounded in
/// `tagumori/service.py::set_tags_on_files` — removal always happens before addition, so a tag
/// moving between two positions in the same call doesn't collide with itself mid-way).
pub fn set_tags_on_files(
    config: &VaultConfig,
    files: &[String],
    tag_strings: &[String],
    apply_tagalongs: bool,
) -> Result<()> {
    let mut store = Storage::open(&config.vault_path)?;
    let mut tx = store.begin_transaction()?;

    let expr = Expression::parse_for_storage(&tag_strings.join(","))?;
    let desired = expr_paths(&expr);

    let mut affected = Vec::with_capacity(files.len());
    for path in files {
        let file = storage::file::get_or_create(&mut tx, path, None, None)?;

        for existing_path in existing_name_paths(&mut tx, file.id)? {
            if !desired.contains(&existing_path) {
                if let Some(tag_ids) = tag_ids_for_path(&mut tx, &existing_path)? {
                    if let Some(file_tag_id) = storage::filetag::resolve_path(&mut tx, file.id, &tag_ids)? {
                        storage::filetag::detach(&mut tx, file_tag_id)?;
                    }
                }
            }
        }

        tree::attach_tree(&mut tx, file.id, &expr, None)?;
        affected.push(file.id);
    }

    if apply_tagalongs {
        apply_tagalongs_to_files(&mut tx, &affected)?;
    }

    tx.commit()
}

/// Enumerate every root-to-leaf path of tag names in a storage-safe (`Tag`/`And`-only)
/// expression, mirroring the shape `tree::attach_tree` walks to build one.
fn expr_paths(expr: &Expression) -> Vec<Vec<String>> {
    match expr {
        Expression::Tag(name, None) => vec![vec![name.clone()]],
        Expression::Tag(name, Some(child)) => expr_paths(child)
            .into_iter()
            .map(|mut path| {
                path.insert(0, name.clone());
                path
            })
            .collect(),
        Expression::And(operands) => operands.iter().flat_map(expr_paths).collect(),
        _ => Vec::new(),
    }
}

/// Resolve a path of tag names to tag ids, or `None` if any name in the path hasn't been
/// created yet (in which case no file could possibly have it attached).
fn tag_ids_for_path(tx: &mut Transaction, names: &[String]) -> Result<Option<Vec<TagId>>> {
    let mut ids = Vec::with_capacity(names.len());
    for name in names {
        match storage::tag::by_name(tx, name)? {
            Some(tag) => ids.push(tag.id),
            None => return Ok(None),
        }
    }
    Ok(Some(ids))
}

/// The root-to-leaf paths (as tag names) actually attached to a file right now.
fn existing_name_paths(tx: &mut Transaction, file_id: FileId) -> Result<Vec<Vec<String>>> {
    let file_tags = storage::filetag::by_file_id(tx, file_id)?;

    let tag_id_by_file_tag: HashMap<_, _> = file_tags.iter().map(|ft| (ft.id, ft.tag_id)).collect();
    let name_by_tag_id: HashMap<TagId, String> = storage::tag::all(tx)?
        .into_iter()
        .map(|tag| (tag.id, tag.name))
        .collect();

    let forest = tree::Forest::build(file_tags);
    Ok(forest
        .paths_down()
        .into_iter()
        .map(|path| {
            path.iter()
                .map(|file_tag_id| name_by_tag_id[&tag_id_by_file_tag[file_tag_id]].clone())
                .collect()
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_tags_replaces_the_forest() {
        let path = std::env::temp_dir().join(format!("vaultkeep-tags-test-{:?}.db", std::thread::current().id()));
        let _ = std::fs::remove_file(&path);
        let config = VaultConfig::new(path.clone());

        add_tags_to_files(
            &config,
            &["a.mp3".to_string()],
            &["genre[rock]".to_string()],
            false,
        )
        .unwrap();

        set_tags_on_files(&config, &["a.mp3".to_string()], &["genre[jazz]".to_string()], false).unwrap();

        let mut store = Storage::open(&config.vault_path).unwrap();
        let mut tx = store.begin_transaction().unwrap();
        let file = storage::file::by_path(&mut tx, "a.mp3").unwrap().unwrap();
        let names = existing_name_paths(&mut tx, file.id).unwrap();
        assert_eq!(names, vec![vec!["genre".to_string(), "jazz".to_string()]]);

        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn remove_tags_detaches_named_path_only() {
        let path = std::env::temp_dir().join(format!("vaultkeep-tags-test2-{:?}.db", std::thread::current().id()));
        let _ = std::fs::remove_file(&path);
        let config = VaultConfig::new(path.clone());

        add_tags_to_files(
            &config,
            &["a.mp3".to_string()],
            &["genre[rock],mood".to_string()],
            false,
        )
        .unwrap();

        remove_tags_from_files(&config, &["a.mp3".to_string()], &["genre[rock]".to_string()]).unwrap();

        let mut store = Storage::open(&config.vault_path).unwrap();
        let mut tx = store.begin_transaction().unwrap();
        let file = storage::file::by_path(&mut tx, "a.mp3").unwrap().unwrap();
        let names = existing_name_paths(&mut tx, file.id).unwrap();
        assert_eq!(names, vec![vec!["mood".to_string()]]);

        let _ = std::fs::remove_file(&path);
    }
}
