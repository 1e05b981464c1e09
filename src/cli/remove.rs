use std::path::PathBuf;

use lazy_static::lazy_static;
use structopt::StructOpt;

use crate::api;
use crate::cli::add::paths_to_strings;
use crate::config::VaultConfig;
use crate::errors::*;

lazy_static! {
    static ref EXAMPLES: String = super::generate_examples(&[("vaultkeep remove -f song.mp3 -t genre[rock]", None)]);
}

/// Detaches tags from files, following each tag path down from a root.
#[derive(Debug, StructOpt)]
#[structopt(after_help(EXAMPLES.as_str()))]
pub struct RemoveOptions {
    /// Files to untag
    #[structopt(short, long, required = true, parse(from_os_str))]
    files: Vec<PathBuf>,

    /// Tag paths to detach, e.g. "genre[rock]"
    #[structopt(short, long, required = true)]
    tags: Vec<String>,
}

impl RemoveOptions {
    pub fn execute(&self, config: &VaultConfig) -> Result<()> {
        let files = paths_to_strings(&self.files);
        api::tags::remove_tags_from_files(config, &files, &self.tags)
    }
}
