// Lexical helpers shared by the filter expression parsers

use nom::{
    branch::alt,
    bytes::complete::{is_not, tag, tag_no_case},
    character::complete::{alpha1, alphanumeric1, char, digit1, multispace0, one_of, satisfy},
    combinator::{map, map_res, not, opt, recognize},
    multi::{fold_many0, many0},
    sequence::{delimited, pair, preceded, terminated},
    IResult,
};

/// Wrap a parser so it skips surrounding whitespace
pub fn ws<'a, F, O>(inner: F) -> impl FnMut(&'a str) -> IResult<&'a str, O>
where
    F: FnMut(&'a str) -> IResult<&'a str, O>,
{
    delimited(multispace0, inner, multispace0)
}

/// Bare identifier: letter or underscore, then letters, digits, underscores
pub fn identifier(input: &str) -> IResult<&str, String> {
    map(
        recognize(pair(
            alt((alpha1, tag("_"))),
            many0(alt((alphanumeric1, tag("_")))),
        )),
        |s: &str| s.to_string(),
    )(input)
}

/// Double-quoted string; `\"` and `\\` are the only escapes
pub fn string_literal(input: &str) -> IResult<&str, String> {
    delimited(
        char('"'),
        fold_many0(
            alt((
                map(is_not("\\\""), |s: &str| s.to_string()),
                map(preceded(char('\\'), one_of("\\\"")), |c: char| c.to_string()),
            )),
            String::new,
            |mut acc, piece| {
                acc.push_str(&piece);
                acc
            },
        ),
        char('"'),
    )(input)
}

/// Signed decimal integer
pub fn integer_literal(input: &str) -> IResult<&str, i64> {
    map_res(number_literal, |s: &str| s.parse::<i64>())(input)
}

/// Signed decimal digits, returned as written
pub fn number_literal(input: &str) -> IResult<&str, &str> {
    recognize(pair(opt(char('-')), digit1))(input)
}

/// Case-insensitive keyword that is not the prefix of a longer identifier
pub fn keyword<'a>(kw: &'static str) -> impl FnMut(&'a str) -> IResult<&'a str, &'a str> {
    terminated(
        tag_no_case(kw),
        not(satisfy(|c: char| c.is_alphanumeric() || c == '_')),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identifier() {
        assert_eq!(identifier("Title rest"), Ok((" rest", "Title".to_string())));
        assert!(identifier("9lives").is_err());
    }

    #[test]
    fn test_string_literal_escapes() {
        let (rest, s) = string_literal(r#""Firm \"A\" \\ Co" tail"#).unwrap();
        assert_eq!(s, r#"Firm "A" \ Co"#);
        assert_eq!(rest, " tail");
    }

    #[test]
    fn test_empty_string_literal() {
        assert_eq!(string_literal(r#""""#), Ok(("", String::new())));
    }

    #[test]
    fn test_unterminated_string() {
        assert!(string_literal(r#""abc"#).is_err());
    }

    #[test]
    fn test_integer_literal() {
        assert_eq!(integer_literal("2020]"), Ok(("]", 2020)));
        assert_eq!(integer_literal("-5"), Ok(("", -5)));
    }

    #[test]
    fn test_number_literal_keeps_leading_zeros() {
        assert_eq!(number_literal("007,"), Ok((",", "007")));
        assert_eq!(number_literal("-01"), Ok(("", "-01")));
        assert!(number_literal("x1").is_err());
    }

    #[test]
    fn test_keyword_boundary() {
        assert!(keyword("and")("and 2020").is_ok());
        assert!(keyword("and")("AND").is_ok());
        assert!(keyword("and")("andrew").is_err());
    }
}
