use lazy_static::lazy_static;
use structopt::StructOpt;

use crate::api;
use crate::config::VaultConfig;
use crate::errors::*;

lazy_static! {
    static ref EXAMPLES: String = super::generate_examples(&[
        ("vaultkeep files -s rock -s jazz # files with 'rock' or 'jazz'", None),
        ("vaultkeep files -s rock -e live", None),
        ("vaultkeep files -p '\\.mp3$' -i", None),
    ]);
}

/// Lists the files matching a select/exclude tag query, with an optional regex filter on the
/// resulting paths. With no selects or excludes, lists every file in the vault.
#[derive(Debug, StructOpt)]
#[structopt(after_help(EXAMPLES.as_str()))]
pub struct FilesOptions {
    /// Tag query a file must match (may be given multiple times; OR'd together)
    #[structopt(short, long("select"))]
    select: Vec<String>,

    /// Tag query a file must not match (may be given multiple times; OR'd together)
    #[structopt(short, long("exclude"))]
    exclude: Vec<String>,

    /// Regex filter applied to the resulting paths
    #[structopt(short, long, default_value = "")]
    pattern: String,

    /// Ignore case in the regex filter
    #[structopt(short, long)]
    ignore_case: bool,

    /// Invert the regex filter (not the select/exclude query)
    #[structopt(short = "-v", long)]
    invert_match: bool,
}

impl FilesOptions {
    pub fn execute(&self, config: &VaultConfig) -> Result<()> {
        let files = api::files::execute_query(
            config,
            &self.select,
            &self.exclude,
            &self.pattern,
            self.ignore_case,
            self.invert_match,
            config.ignore_tag_case_default,
        )?;

        for path in files {
            println!("{}", path);
        }

        Ok(())
    }
}
