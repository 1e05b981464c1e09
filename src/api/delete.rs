use crate::config::VaultConfig;
use crate::errors::*;
use crate::storage::{self, Storage};

/// Detach every tag from each file, optionally deleting the `file` row itself. Grounded in
/// `tagumori/service.py::drop_file_tags`.
pub fn drop_file_tags(config: &VaultConfig, files: &[String], retain_file: bool) -> Result<()> {
    let mut store = Storage::open(&config.vault_path)?;
    let mut tx = store.begin_transaction()?;

    for path in files {
        let file = match storage::file::by_path(&mut tx, path)? {
            Some(file) => file,
            None => continue,
        };

        info!("Dropping tags from '{}'", path);
        storage::filetag::drop_for_file(&mut tx, file.id)?;

        if !retain_file {
            storage::file::delete(&mut tx, file.id)?;
        }
    }

    tx.commit()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::tags::add_tags_to_files;

    #[test]
    fn drop_clears_tags_and_optionally_the_file() {
        let path = std::env::temp_dir().join(format!("vaultkeep-delete-test-{:?}.db", std::thread::current().id()));
        let _ = std::fs::remove_file(&path);
        let config = VaultConfig::new(path.clone());

        add_tags_to_files(&config, &["a.mp3".to_string()], &["rock".to_string()], false).unwrap();

        drop_file_tags(&config, &["a.mp3".to_string()], true).unwrap();

        let mut store = Storage::open(&config.vault_path).unwrap();
        let mut tx = store.begin_transaction().unwrap();
        let file = storage::file::by_path(&mut tx, "a.mp3").unwrap().unwrap();
        assert!(storage::filetag::by_file_id(&mut tx, file.id).unwrap().is_empty());

        drop_file_tags(&config, &["a.mp3".to_string()], false).unwrap();
        let mut tx = store.begin_transaction().unwrap();
        assert!(storage::file::by_path(&mut tx, "a.mp3").unwrap().is_none());

        let _ = std::fs::remove_file(&path);
    }
}
