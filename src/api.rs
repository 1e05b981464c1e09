//! Service facade: orchestrates multi-step operations over the store, grounded in
//! `tagumori/service.py`. Each public function owns its own transaction, committing on success.

pub mod delete;
pub mod files;
pub mod imply;
pub mod query;
pub mod tags;

use crate::entities::{self, Tag};
use crate::errors::*;
use crate::storage::Transaction;

/// Validate, then get-or-create a tag by name. Used by write paths that don't already go
/// through `tree::attach_tree` (which validates inline before its own `get_or_create`).
fn get_or_create_validated_tag(tx: &mut Transaction, name: &str) -> Result<Tag> {
    entities::validate_tag_name(name)?;
    crate::storage::tag::get_or_create(tx, name)
}
