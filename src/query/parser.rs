use nom::branch::alt;
use nom::bytes::complete::{escaped_transform, tag, take, take_till1};
use nom::character::complete::{char, digit1, space0};
use nom::combinator::{all_consuming, map, opt};
use nom::multi::{many0, separated_list1};
use nom::sequence::{delimited, pair, preceded, tuple};
use nom::IResult;

use super::Expression;

/// Characters that end a bare (unquoted) name.
const SPECIAL_CHARS: &str = "()[]!^|,\"*~";

pub(super) fn parse_expr(input: &str) -> IResult<&str, Expression> {
    all_consuming(delimited(space0, xor_expr, space0))(input)
}

fn xor_expr(input: &str) -> IResult<&str, Expression> {
    let (rest, first) = or_expr(input)?;
    let (rest, mut rest_operands) =
        many0(preceded(delimited(space0, char('^'), space0), or_expr))(rest)?;
    Ok((rest, fold(first, &mut rest_operands, Expression::Xor)))
}

fn or_expr(input: &str) -> IResult<&str, Expression> {
    let (rest, first) = and_expr(input)?;
    let (rest, mut rest_operands) =
        many0(preceded(delimited(space0, char('|'), space0), and_expr))(rest)?;
    Ok((rest, fold(first, &mut rest_operands, Expression::Or)))
}

fn and_expr(input: &str) -> IResult<&str, Expression> {
    let (rest, first) = not_expr(input)?;
    let (rest, mut rest_operands) =
        many0(preceded(delimited(space0, char(','), space0), not_expr))(rest)?;
    Ok((rest, fold(first, &mut rest_operands, Expression::And)))
}

/// Collapse a single leading operand plus zero-or-more following ones into the n-ary variant,
/// or return the leading operand bare when there were no others (no pointless `And([x])`).
fn fold<F>(first: Expression, rest: &mut Vec<Expression>, make: F) -> Expression
where
    F: FnOnce(Vec<Expression>) -> Expression,
{
    if rest.is_empty() {
        first
    } else {
        rest.insert(0, first);
        make(std::mem::take(rest))
    }
}

fn not_expr(input: &str) -> IResult<&str, Expression> {
    alt((
        map(preceded(pair(char('!'), space0), not_expr), |e| {
            Expression::Not(Box::new(e))
        }),
        primary,
    ))(input)
}

fn primary(input: &str) -> IResult<&str, Expression> {
    alt((
        xor_call,
        paren_expr,
        null_expr,
        wildcard_bounded,
        wildcard_path,
        wildcard_single,
        quoted_tag,
        bare_tag,
    ))(input)
}

fn child(input: &str) -> IResult<&str, Expression> {
    delimited(
        char('['),
        delimited(space0, xor_expr, space0),
        char(']'),
    )(input)
}

fn optional_child(input: &str) -> IResult<&str, Option<Box<Expression>>> {
    map(opt(child), |c| c.map(Box::new))(input)
}

fn xor_call(input: &str) -> IResult<&str, Expression> {
    let (rest, _) = tag("xor")(input)?;
    let (rest, operands) = delimited(
        char('('),
        separated_list1(
            delimited(space0, char(','), space0),
            delimited(space0, xor_expr, space0),
        ),
        char(')'),
    )(rest)?;
    Ok((rest, Expression::OnlyOne(operands)))
}

/// Grouping only: the AST has no child slot for `And`/`Or`/`Xor`/`OnlyOne`/`Not`, so a `[...]`
/// directly after a parenthesized group is not supported, even though the grammar note in the
/// spec allows "any primary" a child — only the leaf-like primaries below actually have one.
fn paren_expr(input: &str) -> IResult<&str, Expression> {
    delimited(
        char('('),
        delimited(space0, xor_expr, space0),
        char(')'),
    )(input)
}

fn null_expr(input: &str) -> IResult<&str, Expression> {
    let (rest, _) = char('~')(input)?;
    let (rest, c) = optional_child(rest)?;
    Ok((rest, Expression::Null(c)))
}

fn wildcard_bounded(input: &str) -> IResult<&str, Expression> {
    let (rest, (_, digits, _)) = tuple((char('*'), digit1, char('*')))(input)?;
    let (rest, c) = optional_child(rest)?;
    // Unwrap is safe: digit1 only matches ASCII digits, which always parse as u32 unless the
    // literal is absurdly long; that failure mode is not worth a dedicated error variant.
    let n: u32 = digits.parse().unwrap_or(u32::MAX);
    Ok((rest, Expression::WildcardBounded(n, c)))
}

fn wildcard_path(input: &str) -> IResult<&str, Expression> {
    let (rest, _) = tag("**")(input)?;
    let (rest, c) = optional_child(rest)?;
    Ok((rest, Expression::WildcardPath(c)))
}

fn wildcard_single(input: &str) -> IResult<&str, Expression> {
    let (rest, _) = char('*')(input)?;
    let (rest, c) = optional_child(rest)?;
    Ok((rest, Expression::WildcardSingle(c)))
}

fn quoted_tag(input: &str) -> IResult<&str, Expression> {
    let content = escaped_transform(
        take_till1(|c: char| c == '"' || c == '\\'),
        '\\',
        |i: &str| take(1u8)(i),
    );
    let (rest, name) = delimited(char('"'), content, char('"'))(input)?;
    let (rest, c) = optional_child(rest)?;
    Ok((rest, Expression::Tag(name, c)))
}

fn bare_tag(input: &str) -> IResult<&str, Expression> {
    // Consumes up to the next operator/bracket char. Trailing spaces are trimmed afterwards
    // since space is itself a valid name char (`[A-Za-z0-9_ -]+`), so a run like "rock " before
    // a "," is swallowed whole and needs trimming rather than excluding from the match.
    let (rest, raw) = take_till1(|c: char| SPECIAL_CHARS.contains(c))(input)?;

    let trimmed = raw.trim_end();
    if trimmed.is_empty() {
        return Err(nom::Err::Error(nom::error::Error::new(
            input,
            nom::error::ErrorKind::TakeTill1,
        )));
    }

    let (rest, c) = optional_child(rest)?;
    Ok((rest, Expression::Tag(trimmed.to_owned(), c)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(input: &str) -> Expression {
        parse_expr(input).unwrap().1
    }

    #[test]
    fn parses_and_or_xor() {
        assert_eq!(
            parse("a,b"),
            Expression::And(vec![tag("a"), tag("b")])
        );
        assert_eq!(parse("a|b"), Expression::Or(vec![tag("a"), tag("b")]));
        assert_eq!(parse("a^b"), Expression::Xor(vec![tag("a"), tag("b")]));
    }

    #[test]
    fn parses_xor_call_as_only_one() {
        assert_eq!(
            parse("xor(a,b,c)"),
            Expression::OnlyOne(vec![tag("a"), tag("b"), tag("c")])
        );
    }

    #[test]
    fn parses_not_prefix() {
        assert_eq!(parse("!a"), Expression::Not(Box::new(tag("a"))));
    }

    #[test]
    fn parses_child_brackets() {
        assert_eq!(
            parse("genre[rock]"),
            Expression::Tag("genre".to_owned(), Some(Box::new(tag("rock"))))
        );
    }

    #[test]
    fn parses_wildcards() {
        assert_eq!(parse("~"), Expression::Null(None));
        assert_eq!(parse("*"), Expression::WildcardSingle(None));
        assert_eq!(parse("**"), Expression::WildcardPath(None));
        assert_eq!(parse("*3*"), Expression::WildcardBounded(3, None));
    }

    #[test]
    fn parses_quoted_names() {
        assert_eq!(
            parse("\"a tricky, name\""),
            Expression::Tag("a tricky, name".to_owned(), None)
        );
    }

    #[test]
    fn precedence_is_loosest_to_tightest_xor_or_and_not() {
        // `a,b|c^d` parses as `(a AND b) OR c` XORed with `d`, i.e. `^` binds loosest.
        let expected = Expression::Xor(vec![
            Expression::Or(vec![Expression::And(vec![tag("a"), tag("b")]), tag("c")]),
            tag("d"),
        ]);
        assert_eq!(parse("a,b|c^d"), expected);
    }

    fn tag(name: &str) -> Expression {
        Expression::Tag(name.to_owned(), None)
    }
}
