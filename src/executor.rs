//! Evaluates a [`QueryPlan`] against the store, producing a set of matching file ids. Path
//! matching is a single recursive query per `TagPath`, grounded in
//! `tagumori/query/executor.py::find_all`.

use std::collections::{HashMap, HashSet};

use crate::entities::FileId;
use crate::errors::*;
use crate::planner::{QueryPlan, Segment};
use crate::storage::{SqlBuilder, Transaction};

pub struct Executor<'a, 'conn> {
    tx: &'a mut Transaction<'conn>,
    ignore_case: bool,
    /// Materialized once per top-level evaluation and reused by every `QP_Not` in the plan.
    universe: Option<HashSet<FileId>>,
}

impl<'a, 'conn> Executor<'a, 'conn> {
    pub fn new(tx: &'a mut Transaction<'conn>, ignore_case: bool) -> Self {
        Self {
            tx,
            ignore_case,
            universe: None,
        }
    }

    pub fn execute(&mut self, plan: &QueryPlan) -> Result<HashSet<FileId>> {
        match plan {
            QueryPlan::TagPath(segments) => self.match_path(segments),
            QueryPlan::And(operands) => self.execute_and(operands),
            QueryPlan::Or(operands) => self.execute_or(operands),
            QueryPlan::Xor(operands) => self.execute_parity(operands, |count| count % 2 == 1),
            QueryPlan::OnlyOne(operands) => self.execute_parity(operands, |count| count == 1),
            QueryPlan::Not(inner) => self.execute_not(inner),
        }
    }

    fn execute_and(&mut self, operands: &[QueryPlan]) -> Result<HashSet<FileId>> {
        let mut result: Option<HashSet<FileId>> = None;
        for operand in operands {
            let set = self.execute(operand)?;
            result = Some(match result {
                None => set,
                Some(acc) => acc.intersection(&set).copied().collect(),
            });
            if result.as_ref().map_or(false, HashSet::is_empty) {
                break;
            }
        }
        Ok(result.unwrap_or_default())
    }

    fn execute_or(&mut self, operands: &[QueryPlan]) -> Result<HashSet<FileId>> {
        let mut result = HashSet::new();
        for operand in operands {
            result.extend(self.execute(operand)?);
        }
        Ok(result)
    }

    fn execute_parity<F>(&mut self, operands: &[QueryPlan], keep: F) -> Result<HashSet<FileId>>
    where
        F: Fn(u32) -> bool,
    {
        let mut counts: HashMap<FileId, u32> = HashMap::new();
        for operand in operands {
            for id in self.execute(operand)? {
                *counts.entry(id).or_insert(0) += 1;
            }
        }
        Ok(counts
            .into_iter()
            .filter(|(_, count)| keep(*count))
            .map(|(id, _)| id)
            .collect())
    }

    fn execute_not(&mut self, inner: &QueryPlan) -> Result<HashSet<FileId>> {
        let matched = self.execute(inner)?;
        let universe = self.universe()?.clone();
        Ok(universe.difference(&matched).copied().collect())
    }

    fn universe(&mut self) -> Result<&HashSet<FileId>> {
        if self.universe.is_none() {
            let ids: Vec<FileId> = self.tx.query_vec("SELECT id FROM file", |row| Ok(row.get(0)?))?;
            self.universe = Some(ids.into_iter().collect());
        }
        Ok(self.universe.as_ref().unwrap())
    }

    /// Match a `TagPath` via one recursive CTE: a `seg` table carries the segments as data
    /// rows, a `match` CTE walks `file_tag` depth by depth, and the final `SELECT` keeps only
    /// files whose match reached the last segment and whose terminal node satisfies that
    /// segment's `is_leaf` requirement.
    fn match_path(&mut self, segments: &[Segment]) -> Result<HashSet<FileId>> {
        if segments.is_empty() {
            return Ok(HashSet::new());
        }

        for segment in segments {
            if matches!(
                segment,
                Segment::WildcardPath | Segment::WildcardBounded { .. }
            ) {
                return Err(ErrorKind::NotImplemented(
                    "'**' and '*n*' path wildcards".into(),
                )
                .into());
            }
        }

        let collate = if self.ignore_case { " COLLATE NOCASE" } else { "" };

        let mut builder = SqlBuilder::new();
        builder.append_sql("WITH RECURSIVE seg(depth, name, is_any, is_root, is_leaf) AS (VALUES ");
        for (index, segment) in segments.iter().enumerate() {
            if index > 0 {
                builder.append_sql(", ");
            }
            let (name, is_any, is_root, is_leaf) = segment_row(segment);
            builder.append_sql("(");
            builder.append_param((index + 1) as i64);
            builder.append_sql(", ");
            builder.append_param(name);
            builder.append_sql(", ");
            builder.append_param(is_any);
            builder.append_sql(", ");
            builder.append_param(is_root);
            builder.append_sql(", ");
            builder.append_param(is_leaf);
            builder.append_sql(")");
        }
        builder.append_sql(
            "),
match(depth, id, file_id) AS (
    SELECT s.depth, ft.id, ft.file_id
    FROM file_tag ft
    JOIN tag t ON t.id = ft.tag_id
    JOIN seg s ON s.depth = 1
    WHERE (s.is_any = 1 OR t.name = s.name",
        );
        builder.append_sql(collate);
        builder.append_sql(
            ")
      AND (s.is_root = 0 OR ft.parent_id IS NULL)
    UNION ALL
    SELECT s.depth, ft.id, ft.file_id
    FROM file_tag ft
    JOIN tag t ON t.id = ft.tag_id
    JOIN match m ON ft.parent_id = m.id AND ft.file_id = m.file_id
    JOIN seg s ON s.depth = m.depth + 1
    WHERE (s.is_any = 1 OR t.name = s.name",
        );
        builder.append_sql(collate);
        builder.append_sql(
            ")
)
SELECT DISTINCT m.file_id
FROM match m
JOIN seg s ON s.depth = m.depth
WHERE m.depth = (SELECT max(depth) FROM seg)
  AND (s.is_leaf = 0 OR NOT EXISTS (SELECT 1 FROM file_tag c WHERE c.parent_id = m.id))",
        );

        let ids: Vec<FileId> =
            self.tx
                .query_vec_params(builder.sql(), builder.params(), |row| Ok(row.get(0)?))?;
        Ok(ids.into_iter().collect())
    }
}

fn segment_row(segment: &Segment) -> (Option<String>, i64, i64, i64) {
    match segment {
        Segment::Tag {
            name,
            is_root,
            is_leaf,
        } => (
            Some(name.clone()),
            0,
            *is_root as i64,
            *is_leaf as i64,
        ),
        Segment::WildcardSingle { is_root, is_leaf } => {
            (None, 1, *is_root as i64, *is_leaf as i64)
        }
        Segment::WildcardPath | Segment::WildcardBounded { .. } => {
            unreachable!("checked for not-implemented segments before building SQL")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::planner::plan;
    use crate::query::Expression;
    use crate::storage::{file, filetag, tag, Storage};

    fn attach_path(tx: &mut Transaction, file_path: &str, tags: &[&str]) -> FileId {
        let file = file::get_or_create(tx, file_path, None, None).unwrap();
        let mut parent = None;
        for name in tags {
            let tag = tag::get_or_create(tx, name).unwrap();
            parent = Some(filetag::attach(tx, file.id, tag.id, parent).unwrap());
        }
        file.id
    }

    fn run(tx: &mut Transaction, query: &str) -> HashSet<FileId> {
        let expr = Expression::parse(query).unwrap();
        let plan = plan(&expr);
        Executor::new(tx, false).execute(&plan).unwrap()
    }

    #[test]
    fn s1_set_algebra_over_flat_tags() {
        let mut store = Storage::open_in_memory().unwrap();
        let mut tx = store.begin_transaction().unwrap();

        let a = attach_path(&mut tx, "a.mp3", &["rock"]);
        let b = attach_path(&mut tx, "b.mp3", &["jazz"]);
        let c = attach_path(&mut tx, "c.mp3", &["rock"]);
        filetag::attach(&mut tx, c, tag::get_or_create(&mut tx, "jazz").unwrap().id, None).unwrap();

        assert_eq!(run(&mut tx, "rock,jazz"), [c].into_iter().collect());
        assert_eq!(run(&mut tx, "rock|jazz"), [a, b, c].into_iter().collect());
        assert_eq!(run(&mut tx, "!rock"), [b].into_iter().collect());
        assert_eq!(run(&mut tx, "xor(rock,jazz)"), [a, b].into_iter().collect());
    }

    #[test]
    fn s2_bracketed_not_matches_rewrite() {
        let mut store = Storage::open_in_memory().unwrap();
        let mut tx = store.begin_transaction().unwrap();

        attach_path(&mut tx, "song.mp3", &["genre", "rock"]);

        assert!(run(&mut tx, "genre[!rock]").is_empty());
        assert_eq!(run(&mut tx, "genre[!jazz]").len(), 1);
    }

    #[test]
    fn s3_root_and_leaf_wildcards() {
        let mut store = Storage::open_in_memory().unwrap();
        let mut tx = store.begin_transaction().unwrap();

        let a = attach_path(&mut tx, "a.mp3", &["rock"]);
        let b = attach_path(&mut tx, "b.mp3", &["genre", "rock"]);

        assert_eq!(run(&mut tx, "~"), [a].into_iter().collect());
        assert_eq!(run(&mut tx, "~[rock]"), [a].into_iter().collect());
        assert_eq!(run(&mut tx, "*[rock]"), [b].into_iter().collect());
    }

    #[test]
    fn s7_five_deep_chain_matches_exact_descent() {
        let mut store = Storage::open_in_memory().unwrap();
        let mut tx = store.begin_transaction().unwrap();

        attach_path(&mut tx, "deep.mp3", &["a", "b", "c", "d", "e"]);
        attach_path(&mut tx, "shallow.mp3", &["a", "b", "c"]);

        assert_eq!(run(&mut tx, "a[b[c[d[e]]]]").len(), 1);
    }

    #[test]
    fn bare_tag_matches_at_non_root_depth() {
        let mut store = Storage::open_in_memory().unwrap();
        let mut tx = store.begin_transaction().unwrap();

        attach_path(&mut tx, "song.mp3", &["genre", "rock"]);

        assert_eq!(run(&mut tx, "rock").len(), 1);
    }

    #[test]
    fn not_over_empty_universe_is_empty() {
        let mut store = Storage::open_in_memory().unwrap();
        let mut tx = store.begin_transaction().unwrap();
        assert!(run(&mut tx, "!rock").is_empty());
    }
}
