// Filter expression parser

use super::ast::{Clause, FilterExpr, Literal};
use super::lexer::{identifier, integer_literal, keyword, number_literal, string_literal, ws};
use nom::{
    branch::alt,
    bytes::complete::tag,
    character::complete::char,
    combinator::{eof, map},
    multi::separated_list0,
    IResult,
};

/// Field reference: quoted name (may contain spaces) or bare identifier
fn parse_field(input: &str) -> IResult<&str, String> {
    ws(alt((string_literal, identifier)))(input)
}

fn parse_literal(input: &str) -> IResult<&str, Literal> {
    alt((
        map(string_literal, Literal::Str),
        map(number_literal, |s: &str| Literal::Number(s.to_string())),
    ))(input)
}

/// Format: field in ["a", "b", 2020]
fn parse_in_clause(input: &str) -> IResult<&str, Clause> {
    let (input, field) = parse_field(input)?;
    let (input, _) = ws(keyword("in"))(input)?;
    let (input, _) = ws(char('['))(input)?;
    let (input, values) = separated_list0(ws(char(',')), ws(parse_literal))(input)?;
    let (input, _) = ws(char(']'))(input)?;

    Ok((input, Clause::In { field, values }))
}

/// Format: field between 2010 and 2020
fn parse_between_clause(input: &str) -> IResult<&str, Clause> {
    let (input, field) = parse_field(input)?;
    let (input, _) = ws(keyword("between"))(input)?;
    let (input, lower) = ws(integer_literal)(input)?;
    let (input, _) = ws(keyword("and"))(input)?;
    let (input, upper) = ws(integer_literal)(input)?;

    Ok((input, Clause::Between { field, lower, upper }))
}

/// Parse a complete filter expression
/// Format: clause & clause & ... (empty input is the empty filter)
pub fn parse_filter_expr(input: &str) -> IResult<&str, FilterExpr> {
    let (input, clauses) = separated_list0(
        ws(alt((tag("&"), keyword("and")))),
        alt((parse_in_clause, parse_between_clause)),
    )(input)?;

    let (input, _) = ws(eof)(input)?;

    Ok((input, FilterExpr { clauses }))
}
