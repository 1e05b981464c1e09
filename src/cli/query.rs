use lazy_static::lazy_static;
use structopt::StructOpt;

use crate::api;
use crate::config::VaultConfig;
use crate::errors::*;

lazy_static! {
    static ref EXAMPLES: String = super::generate_examples(&[
        ("vaultkeep query save recent-rock -s rock -e live", None),
        ("vaultkeep query run recent-rock", None),
        ("vaultkeep query list", None),
        ("vaultkeep query delete recent-rock", None),
    ]);
}

/// Manages saved queries: named select/exclude/pattern combinations that can be re-run later.
#[derive(Debug, StructOpt)]
#[structopt(after_help(EXAMPLES.as_str()))]
pub enum QueryOptions {
    /// Save a new query under a name
    Save {
        name: String,

        #[structopt(short, long("select"))]
        select: Vec<String>,

        #[structopt(short, long("exclude"))]
        exclude: Vec<String>,

        #[structopt(short, long, default_value = "")]
        pattern: String,

        #[structopt(short, long)]
        ignore_case: bool,

        #[structopt(short = "-v", long)]
        invert_match: bool,

        /// Overwrite an existing query with this name
        #[structopt(long)]
        force: bool,
    },
    /// Run a previously saved query
    Run { name: String },
    /// List every saved query's name
    List,
    /// Delete a saved query
    Delete { name: String },
}

impl QueryOptions {
    pub fn execute(&self, config: &VaultConfig) -> Result<()> {
        match self {
            QueryOptions::Save {
                name,
                select,
                exclude,
                pattern,
                ignore_case,
                invert_match,
                force,
            } => {
                api::query::save_query(
                    config,
                    name,
                    select,
                    exclude,
                    pattern,
                    *ignore_case,
                    *invert_match,
                    config.ignore_tag_case_default,
                    *force,
                )?;
                Ok(())
            }
            QueryOptions::Run { name } => {
                for path in api::query::execute_saved_query(config, name)? {
                    println!("{}", path);
                }
                Ok(())
            }
            QueryOptions::List => {
                for saved in api::query::list_saved_queries(config)? {
                    println!("{}", saved.name);
                }
                Ok(())
            }
            QueryOptions::Delete { name } => api::query::delete_saved_query(config, name),
        }
    }
}
