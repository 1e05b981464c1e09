//! Explicit configuration, passed around instead of relying on process globals.

use std::path::PathBuf;

/// Options controlling vault-wide defaults. Constructed once by the CLI (or by a test) and
/// threaded through to whichever API calls need them.
#[derive(Debug, Clone)]
pub struct VaultConfig {
    pub vault_path: PathBuf,
    pub schema_version: u32,
    pub ignore_tag_case_default: bool,
    pub regex_ignore_case_default: bool,
}

impl VaultConfig {
    pub fn new(vault_path: PathBuf) -> Self {
        Self {
            vault_path,
            schema_version: crate::storage::migration::CURRENT_SCHEMA_VERSION,
            ignore_tag_case_default: false,
            regex_ignore_case_default: false,
        }
    }
}
