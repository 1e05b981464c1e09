use std::path::PathBuf;

use lazy_static::lazy_static;
use structopt::StructOpt;

use crate::api;
use crate::cli::add::paths_to_strings;
use crate::config::VaultConfig;
use crate::errors::*;

lazy_static! {
    static ref EXAMPLES: String = super::generate_examples(&[("vaultkeep set -f song.mp3 -t genre[jazz]", None)]);
}

/// Replaces each file's whole tag forest with the given tags.
#[derive(Debug, StructOpt)]
#[structopt(after_help(EXAMPLES.as_str()))]
pub struct SetOptions {
    /// Files to retag
    #[structopt(short, long, required = true, parse(from_os_str))]
    files: Vec<PathBuf>,

    /// Tag expressions the files should end up with, e.g. "genre[jazz]"
    #[structopt(short, long, required = true)]
    tags: Vec<String>,

    /// Skip applying the tagalong closure after attaching
    #[structopt(long)]
    no_tagalongs: bool,
}

impl SetOptions {
    pub fn execute(&self, config: &VaultConfig) -> Result<()> {
        let files = paths_to_strings(&self.files);
        api::tags::set_tags_on_files(config, &files, &self.tags, !self.no_tagalongs)
    }
}
