use lazy_static::lazy_static;
use structopt::StructOpt;

use crate::api;
use crate::config::VaultConfig;
use crate::errors::*;

lazy_static! {
    static ref EXAMPLES: String = super::generate_examples(&[
        ("vaultkeep imply mp3 music", None),
        ("vaultkeep imply", Some("mp3 -> music")),
        ("vaultkeep imply --delete mp3 music", None),
        ("vaultkeep imply --apply", None),
    ]);
}

/// Creates a tagalong edge such that any file tagged TAG is also implicitly tagged TAGALONG.
///
/// When run without TAG/TAGALONG, lists the existing tagalong edges.
#[derive(Debug, StructOpt)]
#[structopt(after_help(EXAMPLES.as_str()))]
pub struct ImplyOptions {
    /// Deletes the tagalong edge instead of creating it
    #[structopt(short, long, requires_all(&["tag", "tagalong"]))]
    delete: bool,

    /// Apply the tagalong closure to every file in the vault right now
    #[structopt(long, conflicts_with_all(&["tag", "tagalong", "delete"]))]
    apply: bool,

    /// Source tag
    #[structopt(requires("tagalong"))]
    tag: Option<String>,

    /// Tag implied by the source tag
    tagalong: Option<String>,
}

impl ImplyOptions {
    pub fn execute(&self, config: &VaultConfig) -> Result<()> {
        if self.apply {
            return api::imply::apply_tagalongs(config, None);
        }

        match (&self.tag, &self.tagalong) {
            (None, _) => list_tagalongs(config),
            (Some(tag), Some(tagalong)) if self.delete => {
                api::imply::delete_tagalong(config, tag, tagalong)
            }
            (Some(tag), Some(tagalong)) => api::imply::create_tagalong(config, tag, tagalong),
            (Some(_), None) => Err("a tagalong target is required".into()),
        }
    }
}

fn list_tagalongs(config: &VaultConfig) -> Result<()> {
    for (tag, tagalong) in api::imply::list_tagalongs(config)? {
        println!("{} -> {}", tag, tagalong);
    }
    Ok(())
}
