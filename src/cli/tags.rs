use lazy_static::lazy_static;
use structopt::StructOpt;

use crate::api;
use crate::cli::print_columns;
use crate::config::VaultConfig;
use crate::errors::*;

lazy_static! {
    static ref EXAMPLES: String = super::generate_examples(&[("vaultkeep tags", Some("mp3 music opera"))]);
}

/// Lists every tag name known to the vault.
#[derive(Debug, StructOpt)]
#[structopt(after_help(EXAMPLES.as_str()))]
pub struct TagsOptions {
    /// Lists the number of tags rather than their names
    #[structopt(short("c"), long("count"))]
    show_count: bool,

    /// Lists one tag per line
    #[structopt(short("1"))]
    one_per_line: bool,
}

impl TagsOptions {
    pub fn execute(&self, config: &VaultConfig) -> Result<()> {
        let names = api::tags::list_tags(config)?;

        if self.show_count {
            println!("{}", names.len());
        } else if self.one_per_line {
            for name in names {
                println!("{}", name);
            }
        } else {
            print_columns(&names);
        }

        Ok(())
    }
}
