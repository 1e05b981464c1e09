use std::path::PathBuf;

use lazy_static::lazy_static;
use structopt::StructOpt;

use crate::api;
use crate::config::VaultConfig;
use crate::errors::*;

lazy_static! {
    static ref EXAMPLES: String = super::generate_examples(&[
        ("vaultkeep add -f song.mp3 -t genre[rock]", None),
        ("vaultkeep add -f song.mp3 -t mood --no-tagalongs", None),
    ]);
}

/// Attaches tags to files, creating both on first use.
#[derive(Debug, StructOpt)]
#[structopt(after_help(EXAMPLES.as_str()))]
pub struct AddOptions {
    /// Files to tag
    #[structopt(short, long, required = true, parse(from_os_str))]
    files: Vec<PathBuf>,

    /// Tag expressions to attach, e.g. "genre[rock]"
    #[structopt(short, long, required = true)]
    tags: Vec<String>,

    /// Skip applying the tagalong closure after attaching
    #[structopt(long)]
    no_tagalongs: bool,
}

impl AddOptions {
    pub fn execute(&self, config: &VaultConfig) -> Result<()> {
        let files = paths_to_strings(&self.files);
        api::tags::add_tags_to_files(config, &files, &self.tags, !self.no_tagalongs)
    }
}

pub(crate) fn paths_to_strings(paths: &[PathBuf]) -> Vec<String> {
    paths.iter().map(|p| p.display().to_string()).collect()
}
