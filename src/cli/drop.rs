use std::path::PathBuf;

use lazy_static::lazy_static;
use structopt::StructOpt;

use crate::api;
use crate::cli::add::paths_to_strings;
use crate::config::VaultConfig;
use crate::errors::*;

lazy_static! {
    static ref EXAMPLES: String = super::generate_examples(&[("vaultkeep drop -f song.mp3 --retain-file", None)]);
}

/// Detaches every tag from the given files, optionally forgetting the files themselves.
#[derive(Debug, StructOpt)]
#[structopt(after_help(EXAMPLES.as_str()))]
pub struct DropOptions {
    /// Files to clear
    #[structopt(short, long, required = true, parse(from_os_str))]
    files: Vec<PathBuf>,

    /// Keep the file's row in the vault, just drop its tags
    #[structopt(long)]
    retain_file: bool,
}

impl DropOptions {
    pub fn execute(&self, config: &VaultConfig) -> Result<()> {
        let files = paths_to_strings(&self.files);
        api::delete::drop_file_tags(config, &files, self.retain_file)
    }
}
