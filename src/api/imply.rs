use crate::config::VaultConfig;
use crate::entities::{FileId, TagId};
use crate::errors::*;
use crate::storage::{self, Storage, Transaction};

pub fn create_tagalong(config: &VaultConfig, tag_name: &str, tagalong_name: &str) -> Result<()> {
    let mut store = Storage::open(&config.vault_path)?;
    let mut tx = store.begin_transaction()?;

    let tag = super::get_or_create_validated_tag(&mut tx, tag_name)?;
    let tagalong = super::get_or_create_validated_tag(&mut tx, tagalong_name)?;

    info!("Adding tagalong '{}' -> '{}'", tag_name, tagalong_name);
    storage::tagalong::create(&mut tx, tag.id, tagalong.id)?;

    tx.commit()
}

pub fn delete_tagalong(config: &VaultConfig, tag_name: &str, tagalong_name: &str) -> Result<()> {
    let mut store = Storage::open(&config.vault_path)?;
    let mut tx = store.begin_transaction()?;

    let tag = storage::tag::by_name(&mut tx, tag_name)?
        .ok_or_else(|| ErrorKind::NotFound("tag".into(), tag_name.into()))?;
    let tagalong = storage::tag::by_name(&mut tx, tagalong_name)?
        .ok_or_else(|| ErrorKind::NotFound("tag".into(), tagalong_name.into()))?;

    info!("Removing tagalong '{}' -> '{}'", tag_name, tagalong_name);
    storage::tagalong::delete(&mut tx, tag.id, tagalong.id)?;

    tx.commit()
}

pub fn list_tagalongs(config: &VaultConfig) -> Result<Vec<(String, String)>> {
    let mut store = Storage::open(&config.vault_path)?;
    let mut tx = store.begin_transaction()?;

    let names = storage::tagalong::get_all_names(&mut tx)?;

    tx.commit()?;
    Ok(names)
}

/// Apply the tagalong closure to the given files, or to every file in the vault if `files` is
/// `None`. Grounded in `tagumori/service.py::apply_tagalongs` / `tagumori/crud/tagalong.py::apply`.
pub fn apply_tagalongs(config: &VaultConfig, files: Option<&[String]>) -> Result<()> {
    let mut store = Storage::open(&config.vault_path)?;
    let mut tx = store.begin_transaction()?;

    let file_ids = match files {
        Some(paths) => storage::file::get_many_by_path(&mut tx, &paths.to_vec())?
            .into_iter()
            .map(|f| f.id)
            .collect(),
        None => storage::file::all(&mut tx)?.into_iter().map(|f| f.id).collect(),
    };

    apply_tagalongs_to_files(&mut tx, &file_ids)?;

    tx.commit()
}

/// For every `FileTag(file, tag, parent)` in `file_ids`, ensure every tag reachable through
/// zero-or-more tagalong edges from `tag` is also attached at the same `parent`. Idempotent
/// (`attach` is select-before-insert) and terminates on any tagalong graph, including cycles
/// (`tagalong::apply`'s CTE deduplicates by tag id).
pub(crate) fn apply_tagalongs_to_files(tx: &mut Transaction, file_ids: &[FileId]) -> Result<()> {
    for &file_id in file_ids {
        let file_tags = storage::filetag::by_file_id(tx, file_id)?;
        for file_tag in file_tags {
            let implied: Vec<TagId> = storage::tagalong::apply(tx, &[file_tag.tag_id])?
                .into_iter()
                .collect();
            for tag_id in implied {
                storage::filetag::attach(tx, file_id, tag_id, file_tag.parent_id)?;
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{file, filetag, tag};

    #[test]
    fn s4_closure_attaches_transitively_and_is_idempotent() {
        let mut store = Storage::open_in_memory().unwrap();
        let mut tx = store.begin_transaction().unwrap();

        let a = tag::get_or_create(&mut tx, "A").unwrap().id;
        let b = tag::get_or_create(&mut tx, "B").unwrap().id;
        let c = tag::get_or_create(&mut tx, "C").unwrap().id;
        storage::tagalong::create(&mut tx, a, b).unwrap();
        storage::tagalong::create(&mut tx, b, c).unwrap();

        let f = file::get_or_create(&mut tx, "f", None, None).unwrap().id;
        filetag::attach(&mut tx, f, a, None).unwrap();

        apply_tagalongs_to_files(&mut tx, &[f]).unwrap();
        let tags_after: Vec<TagId> = filetag::by_file_id(&mut tx, f)
            .unwrap()
            .into_iter()
            .map(|ft| ft.tag_id)
            .collect();
        assert!(tags_after.contains(&a));
        assert!(tags_after.contains(&b));
        assert!(tags_after.contains(&c));

        let count_before = tags_after.len();
        apply_tagalongs_to_files(&mut tx, &[f]).unwrap();
        let count_after = filetag::by_file_id(&mut tx, f).unwrap().len();
        assert_eq!(count_before, count_after);
    }
}
