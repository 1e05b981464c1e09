//! Lowers a parsed [`Expression`](crate::query::Expression) into a canonical [`QueryPlan`],
//! ported line-for-line (in behavior) from `tagumori/query/planner.py`.

use crate::query::Expression;

/// One element of a `TagPath`: either a named tag or a wildcard, each optionally anchored to
/// the root of the file's tag forest and/or required to be a leaf.
#[derive(Debug, Clone, PartialEq)]
pub enum Segment {
    Tag {
        name: String,
        is_root: bool,
        is_leaf: bool,
    },
    WildcardSingle {
        is_root: bool,
        is_leaf: bool,
    },
    /// Matches zero or more tags. The executor reports not-implemented for this segment.
    WildcardPath,
    /// Matches up to `max_depth` tags. The executor reports not-implemented for this segment.
    WildcardBounded { max_depth: u32 },
}

/// The canonical algebraic form of a query, after lowering and [`simplify`].
#[derive(Debug, Clone, PartialEq)]
pub enum QueryPlan {
    And(Vec<QueryPlan>),
    Or(Vec<QueryPlan>),
    Xor(Vec<QueryPlan>),
    OnlyOne(Vec<QueryPlan>),
    Not(Box<QueryPlan>),
    TagPath(Vec<Segment>),
}

/// Lower an [`Expression`] to a [`QueryPlan`], then [`simplify`] it. The top-level call starts
/// with `is_root = false`: a bare tag matches anywhere in the forest, not just at the root.
pub fn plan(expr: &Expression) -> QueryPlan {
    simplify(lower(expr, &[], false))
}

/// `prefix` accumulates the `TagPath` segments built so far from enclosing `Tag`/`Null`/
/// wildcard ancestors; `is_root` is true only while we're still at the outermost position (it
/// is consumed after the first level of recursion, per the lowering rules).
fn lower(expr: &Expression, prefix: &[Segment], is_root: bool) -> QueryPlan {
    match expr {
        Expression::Tag(name, None) => {
            let mut segments = prefix.to_vec();
            segments.push(Segment::Tag {
                name: name.clone(),
                is_root,
                is_leaf: false,
            });
            QueryPlan::TagPath(segments)
        }
        Expression::Tag(name, Some(child)) => {
            if let Expression::Null(grandchild) = child.as_ref() {
                // `a[~[z]]` terminates at `a` as a leaf; any children under that `~` (`z`) are
                // silently dropped, per spec §4.4 (flagged as an open question in DESIGN.md).
                let _ = grandchild;
                let mut segments = prefix.to_vec();
                segments.push(Segment::Tag {
                    name: name.clone(),
                    is_root,
                    is_leaf: true,
                });
                QueryPlan::TagPath(segments)
            } else {
                let mut segments = prefix.to_vec();
                segments.push(Segment::Tag {
                    name: name.clone(),
                    is_root,
                    is_leaf: false,
                });
                lower(child, &segments, false)
            }
        }
        Expression::Null(None) => QueryPlan::TagPath(vec![Segment::WildcardSingle {
            is_root: true,
            is_leaf: true,
        }]),
        Expression::Null(Some(child)) => lower(child, prefix, true),
        Expression::WildcardSingle(None) => {
            let mut segments = prefix.to_vec();
            segments.push(Segment::WildcardSingle {
                is_root,
                is_leaf: false,
            });
            QueryPlan::TagPath(segments)
        }
        Expression::WildcardSingle(Some(child)) => {
            let mut segments = prefix.to_vec();
            segments.push(Segment::WildcardSingle {
                is_root,
                is_leaf: false,
            });
            lower(child, &segments, false)
        }
        Expression::WildcardPath(_) => {
            let mut segments = prefix.to_vec();
            segments.push(Segment::WildcardPath);
            QueryPlan::TagPath(segments)
        }
        Expression::WildcardBounded(n, _) => {
            let mut segments = prefix.to_vec();
            segments.push(Segment::WildcardBounded { max_depth: *n });
            QueryPlan::TagPath(segments)
        }
        Expression::And(operands) => {
            QueryPlan::And(operands.iter().map(|op| lower(op, prefix, is_root)).collect())
        }
        Expression::Or(operands) => {
            QueryPlan::Or(operands.iter().map(|op| lower(op, prefix, is_root)).collect())
        }
        Expression::Xor(operands) => {
            QueryPlan::Xor(operands.iter().map(|op| lower(op, prefix, is_root)).collect())
        }
        Expression::OnlyOne(operands) => QueryPlan::OnlyOne(
            operands.iter().map(|op| lower(op, prefix, is_root)).collect(),
        ),
        Expression::Not(inner) => {
            if prefix.is_empty() {
                QueryPlan::Not(Box::new(lower(inner, prefix, is_root)))
            } else {
                // `a[!b]` ≡ `a AND NOT a[b]`: the prefix built so far (`a`) must match on its
                // own, conjoined with the negation of the prefix extended by `b`.
                let prefix_plan = QueryPlan::TagPath(prefix.to_vec());
                let negated = QueryPlan::Not(Box::new(lower(inner, prefix, is_root)));
                QueryPlan::And(vec![prefix_plan, negated])
            }
        }
    }
}

/// Canonicalize a plan: collapse double negation, flatten same-kind nesting, unwrap
/// single-operand `And`/`Or`/`Xor`/`OnlyOne`.
pub fn simplify(plan: QueryPlan) -> QueryPlan {
    match plan {
        QueryPlan::Not(inner) => match simplify(*inner) {
            QueryPlan::Not(inner2) => *inner2,
            other => QueryPlan::Not(Box::new(other)),
        },
        QueryPlan::And(operands) => simplify_nary(operands, QueryPlan::And, is_and),
        QueryPlan::Or(operands) => simplify_nary(operands, QueryPlan::Or, is_or),
        QueryPlan::Xor(operands) => simplify_nary(operands, QueryPlan::Xor, is_xor),
        QueryPlan::OnlyOne(operands) => simplify_nary(operands, QueryPlan::OnlyOne, is_only_one),
        QueryPlan::TagPath(segments) => QueryPlan::TagPath(segments),
    }
}

fn simplify_nary<F, P>(operands: Vec<QueryPlan>, make: F, is_same_kind: P) -> QueryPlan
where
    F: Fn(Vec<QueryPlan>) -> QueryPlan,
    P: Fn(&QueryPlan) -> bool,
{
    let mut flattened = Vec::new();
    for operand in operands {
        match simplify(operand) {
            nested if is_same_kind(&nested) => flattened.extend(into_operands(nested)),
            other => flattened.push(other),
        }
    }

    if flattened.len() == 1 {
        flattened.into_iter().next().unwrap()
    } else {
        make(flattened)
    }
}

fn is_and(plan: &QueryPlan) -> bool {
    matches!(plan, QueryPlan::And(_))
}
fn is_or(plan: &QueryPlan) -> bool {
    matches!(plan, QueryPlan::Or(_))
}
fn is_xor(plan: &QueryPlan) -> bool {
    matches!(plan, QueryPlan::Xor(_))
}
fn is_only_one(plan: &QueryPlan) -> bool {
    matches!(plan, QueryPlan::OnlyOne(_))
}

fn into_operands(plan: QueryPlan) -> Vec<QueryPlan> {
    match plan {
        QueryPlan::And(ops) | QueryPlan::Or(ops) | QueryPlan::Xor(ops) | QueryPlan::OnlyOne(ops) => {
            ops
        }
        other => vec![other],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::Expression;

    fn lower_plan(query: &str) -> QueryPlan {
        plan(&Expression::parse(query).unwrap())
    }

    #[test]
    fn bare_tag_becomes_single_segment_path() {
        // A bare tag is not anchored to the root: it must match wherever it's attached.
        assert_eq!(
            lower_plan("rock"),
            QueryPlan::TagPath(vec![Segment::Tag {
                name: "rock".into(),
                is_root: false,
                is_leaf: false,
            }])
        );
    }

    #[test]
    fn nested_tag_prepends_segments() {
        assert_eq!(
            lower_plan("genre[rock]"),
            QueryPlan::TagPath(vec![
                Segment::Tag {
                    name: "genre".into(),
                    is_root: false,
                    is_leaf: false,
                },
                Segment::Tag {
                    name: "rock".into(),
                    is_root: false,
                    is_leaf: false,
                },
            ])
        );
    }

    #[test]
    fn five_deep_chain_lowers_to_one_tag_path() {
        // S7: `a[b[c[d[e]]]]` lowers to a single five-segment TagPath.
        match lower_plan("a[b[c[d[e]]]]") {
            QueryPlan::TagPath(segments) => assert_eq!(segments.len(), 5),
            other => panic!("expected a TagPath, got {:?}", other),
        }
    }

    #[test]
    fn bracketed_not_rewrites_to_and_not_prefix() {
        // a[!b] ≡ a AND NOT a[b]
        let plan = lower_plan("a[!b]");
        let a = Segment::Tag {
            name: "a".into(),
            is_root: false,
            is_leaf: false,
        };
        let expected = QueryPlan::And(vec![
            QueryPlan::TagPath(vec![a.clone()]),
            QueryPlan::Not(Box::new(QueryPlan::TagPath(vec![
                a,
                Segment::Tag {
                    name: "b".into(),
                    is_root: false,
                    is_leaf: false,
                },
            ]))),
        ]);
        assert_eq!(plan, expected);
    }

    #[test]
    fn double_negation_collapses() {
        assert_eq!(lower_plan("!!rock"), lower_plan("rock"));
    }

    #[test]
    fn same_kind_nesting_flattens() {
        match lower_plan("a,b,c") {
            QueryPlan::And(operands) => assert_eq!(operands.len(), 3),
            other => panic!("expected a flat And, got {:?}", other),
        }
    }

    #[test]
    fn leaf_terminated_tag_from_null_child() {
        match lower_plan("a[~]") {
            QueryPlan::TagPath(segments) => {
                assert_eq!(
                    segments.last(),
                    Some(&Segment::Tag {
                        name: "a".into(),
                        is_root: false,
                        is_leaf: true,
                    })
                );
            }
            other => panic!("expected a TagPath, got {:?}", other),
        }
    }

    #[test]
    fn bare_null_matches_any_root_leaf() {
        assert_eq!(
            lower_plan("~"),
            QueryPlan::TagPath(vec![Segment::WildcardSingle {
                is_root: true,
                is_leaf: true,
            }])
        );
    }
}
