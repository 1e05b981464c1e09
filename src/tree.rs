//! In-memory tag-forest helpers. Per the design notes: the tree is reconstructed fresh from
//! the store for each call (an arena of indices, not long-lived node references), since
//! `file_tag` rows already form a graph with parent/child edges persisted on the store.

use std::collections::HashMap;

use crate::entities::{self, FileId, FileTag, FileTagId};
use crate::errors::*;
use crate::query::Expression;
use crate::storage::{self, Transaction};

#[derive(Debug)]
struct Node {
    file_tag: FileTag,
    children: Vec<usize>,
}

/// A file's tag forest, rebuilt from a flat `Vec<FileTag>` fetched in one query.
pub struct Forest {
    nodes: Vec<Node>,
    roots: Vec<usize>,
}

impl Forest {
    pub fn build(file_tags: Vec<FileTag>) -> Self {
        let mut nodes: Vec<Node> = file_tags
            .into_iter()
            .map(|file_tag| Node {
                file_tag,
                children: Vec::new(),
            })
            .collect();

        let mut index_by_id = HashMap::new();
        for (index, node) in nodes.iter().enumerate() {
            index_by_id.insert(node.file_tag.id, index);
        }

        let mut roots = Vec::new();
        for index in 0..nodes.len() {
            match nodes[index].file_tag.parent_id {
                Some(parent_id) => {
                    if let Some(&parent_index) = index_by_id.get(&parent_id) {
                        nodes[parent_index].children.push(index);
                    }
                }
                None => roots.push(index),
            }
        }

        Forest { nodes, roots }
    }

    /// Enumerate every root-to-leaf path as a sequence of `FileTagId`s. Restartable and finite:
    /// a fresh traversal from the roots each time, matching the "lazy restartable generator"
    /// guidance without needing an actual iterator/generator type.
    pub fn paths_down(&self) -> Vec<Vec<FileTagId>> {
        let mut paths = Vec::new();
        for &root in &self.roots {
            self.collect_paths(root, &mut Vec::new(), &mut paths);
        }
        paths
    }

    fn collect_paths(&self, index: usize, prefix: &mut Vec<FileTagId>, paths: &mut Vec<Vec<FileTagId>>) {
        prefix.push(self.nodes[index].file_tag.id);
        if self.nodes[index].children.is_empty() {
            paths.push(prefix.clone());
        } else {
            for &child in &self.nodes[index].children {
                self.collect_paths(child, prefix, paths);
            }
        }
        prefix.pop();
    }
}

/// Recursively attach a storage-safe (`Tag`/`And`-only) expression under `parent_id`, creating
/// tags on first use. Grounded in `tagumori/service.py::attach_tree`.
pub fn attach_tree(
    tx: &mut Transaction,
    file_id: FileId,
    expr: &Expression,
    parent_id: Option<FileTagId>,
) -> Result<()> {
    match expr {
        Expression::Tag(name, child) => {
            entities::validate_tag_name(name)?;
            let tag = storage::tag::get_or_create(tx, name)?;
            let node_id = storage::filetag::attach(tx, file_id, tag.id, parent_id)?;
            if let Some(child) = child {
                attach_tree(tx, file_id, child, Some(node_id))?;
            }
            Ok(())
        }
        Expression::And(operands) => {
            for operand in operands {
                attach_tree(tx, file_id, operand, parent_id)?;
            }
            Ok(())
        }
        _ => Err(ErrorKind::StorageShapeError(expr.to_string()).into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::Storage;

    #[test]
    fn attach_tree_builds_a_chain() {
        let mut store = Storage::open_in_memory().unwrap();
        let mut tx = store.begin_transaction().unwrap();

        let file = storage::file::get_or_create(&mut tx, "a.mp3", None, None).unwrap();
        let expr = Expression::parse_for_storage("genre,mood").unwrap();
        attach_tree(&mut tx, file.id, &expr, None).unwrap();

        let file_tags = storage::filetag::by_file_id(&mut tx, file.id).unwrap();
        assert_eq!(file_tags.len(), 2);

        let forest = Forest::build(file_tags);
        assert_eq!(forest.paths_down().len(), 2);
    }

    #[test]
    fn attach_tree_rejects_non_storage_safe_expression() {
        let mut store = Storage::open_in_memory().unwrap();
        let mut tx = store.begin_transaction().unwrap();
        let file = storage::file::get_or_create(&mut tx, "a.mp3", None, None).unwrap();

        let expr = Expression::parse("a|b").unwrap();
        assert!(attach_tree(&mut tx, file.id, &expr, None).is_err());
    }
}
