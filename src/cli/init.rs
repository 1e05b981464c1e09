use std::path::PathBuf;

use structopt::StructOpt;

use crate::cli::GlobalOptions;
use crate::errors::*;
use crate::storage::Storage;

/// Creates a new, empty vault database at the given path (or the usual default location).
#[derive(Debug, StructOpt)]
pub struct InitOptions {
    /// Path of the database to create
    #[structopt(parse(from_os_str))]
    path: Option<PathBuf>,
}

impl InitOptions {
    pub fn execute(&self, global_opts: &GlobalOptions) -> Result<()> {
        let db_path = self
            .path
            .clone()
            .or_else(|| global_opts.database.clone())
            .unwrap_or_else(|| PathBuf::from(".vaultkeep/db"));

        if db_path.exists() {
            println!("{} already exists.", db_path.display());
            return Ok(());
        }

        if let Some(parent) = db_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        Storage::open(&db_path)?;
        println!("{} created.", db_path.display());

        Ok(())
    }
}
