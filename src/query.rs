mod parser;

use std::fmt;

use crate::errors::*;

/// The query language's abstract syntax tree. A closed set of variants, matched exhaustively
/// everywhere (planner, executor, `Display`) rather than dispatched through a class hierarchy.
#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    Tag(String, Option<Box<Expression>>),
    And(Vec<Expression>),
    Or(Vec<Expression>),
    Xor(Vec<Expression>),
    OnlyOne(Vec<Expression>),
    Not(Box<Expression>),
    Null(Option<Box<Expression>>),
    WildcardSingle(Option<Box<Expression>>),
    WildcardPath(Option<Box<Expression>>),
    WildcardBounded(u32, Option<Box<Expression>>),
}

impl Expression {
    pub fn parse(query: &str) -> Result<Self> {
        let (_, expr) = parser::parse_expr(query)
            .map_err(|_| ErrorKind::QueryParsingError(query.to_owned(), 0))?;
        Ok(expr)
    }

    /// Only `Tag` and `And` are accepted in write paths (`attach_tree`); everything else is
    /// ambiguous as a thing to store rather than to match against.
    pub fn parse_for_storage(query: &str) -> Result<Self> {
        let expr = Self::parse(query)?;
        if !expr.is_storage_safe() {
            return Err(ErrorKind::StorageShapeError(query.to_owned()).into());
        }
        Ok(expr)
    }

    fn is_storage_safe(&self) -> bool {
        match self {
            Expression::Tag(_, child) => child.as_ref().map_or(true, |c| c.is_storage_safe()),
            Expression::And(operands) => operands.iter().all(Expression::is_storage_safe),
            _ => false,
        }
    }

    pub fn tag_names(&self) -> Vec<&str> {
        let mut names = Vec::new();
        self.tag_names_rec(&mut names);
        names
    }

    fn tag_names_rec<'a>(&'a self, names: &mut Vec<&'a str>) {
        match self {
            Expression::Tag(name, child) => {
                names.push(name);
                if let Some(child) = child {
                    child.tag_names_rec(names);
                }
            }
            Expression::And(operands)
            | Expression::Or(operands)
            | Expression::Xor(operands)
            | Expression::OnlyOne(operands) => {
                for operand in operands {
                    operand.tag_names_rec(names);
                }
            }
            Expression::Not(inner) => inner.tag_names_rec(names),
            Expression::Null(child)
            | Expression::WildcardSingle(child)
            | Expression::WildcardPath(child)
            | Expression::WildcardBounded(_, child) => {
                if let Some(child) = child {
                    child.tag_names_rec(names);
                }
            }
        }
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn fmt_child(child: &Option<Box<Expression>>, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            if let Some(child) = child {
                write!(f, "[{}]", child)?;
            }
            Ok(())
        }

        fn fmt_list(operands: &[Expression], sep: &str, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            for (index, operand) in operands.iter().enumerate() {
                if index > 0 {
                    write!(f, "{}", sep)?;
                }
                write!(f, "{}", operand)?;
            }
            Ok(())
        }

        match self {
            Expression::Tag(name, child) => {
                write!(f, "{}", quote_if_needed(name))?;
                fmt_child(child, f)
            }
            Expression::And(operands) => fmt_list(operands, ",", f),
            Expression::Or(operands) => fmt_list(operands, "|", f),
            Expression::Xor(operands) => fmt_list(operands, "^", f),
            Expression::OnlyOne(operands) => {
                write!(f, "xor(")?;
                fmt_list(operands, ",", f)?;
                write!(f, ")")
            }
            Expression::Not(inner) => write!(f, "!{}", inner),
            Expression::Null(child) => {
                write!(f, "~")?;
                fmt_child(child, f)
            }
            Expression::WildcardSingle(child) => {
                write!(f, "*")?;
                fmt_child(child, f)
            }
            Expression::WildcardPath(child) => {
                write!(f, "**")?;
                fmt_child(child, f)
            }
            Expression::WildcardBounded(n, child) => {
                write!(f, "*{}*", n)?;
                fmt_child(child, f)
            }
        }
    }
}

fn quote_if_needed(name: &str) -> String {
    let needs_quoting = name
        .chars()
        .any(|c| !(c.is_alphanumeric() || c == '_' || c == '-' || c == ' '));
    if needs_quoting {
        format!("\"{}\"", name.replace('"', "\\\""))
    } else {
        name.to_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_bare_tag() {
        assert_eq!(
            Expression::parse("rock").unwrap(),
            Expression::Tag("rock".to_owned(), None)
        );
    }

    #[test]
    fn parses_tag_with_child() {
        assert_eq!(
            Expression::parse("genre[rock]").unwrap(),
            Expression::Tag(
                "genre".to_owned(),
                Some(Box::new(Expression::Tag("rock".to_owned(), None)))
            )
        );
    }

    #[test]
    fn parse_for_storage_rejects_or() {
        assert!(Expression::parse_for_storage("a|b").is_err());
        assert!(Expression::parse_for_storage("a,b").is_ok());
    }

    #[test]
    fn round_trips_through_display() {
        for input in [
            "rock",
            "genre[rock]",
            "a,b",
            "a|b",
            "!a",
            "a^b",
            "xor(a,b,c)",
            "~",
            "~[x]",
            "a[~]",
            "*",
            "*[x]",
            "**",
            "*3*",
        ] {
            let expr = Expression::parse(input).unwrap();
            let reprinted = expr.to_string();
            let reparsed = Expression::parse(&reprinted).unwrap();
            assert_eq!(expr, reparsed, "round-trip mismatch for '{}'", input);
        }
    }
}
