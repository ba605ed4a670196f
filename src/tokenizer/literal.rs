use nom::{
    branch::alt,
    bytes::complete::is_not,
    character::complete::{char, none_of},
    combinator::{map, recognize},
    error::context,
    multi::many0,
    sequence::{delimited, pair},
};

use super::token::{ParserResult, Token};

/// Body of a quoted string: anything but the closing quote, a backslash or
/// a newline, plus backslash escapes of any single character.
fn quoted_body<'a>(quote: char) -> impl FnMut(&'a str) -> ParserResult<'a, &'a str> {
    let stop = match quote {
        '\'' => "\\'\n",
        _ => "\\\"\n",
    };
    recognize(many0(alt((
        is_not(stop),
        recognize(pair(char('\\'), none_of("\n"))),
    ))))
}

#[tracing::instrument(level = "debug", skip(input))]
fn parse_single_quoted(input: &str) -> ParserResult<&str> {
    context(
        "single quoted string",
        delimited(char('\''), quoted_body('\''), char('\'')),
    )(input)
}

#[tracing::instrument(level = "debug", skip(input))]
fn parse_double_quoted(input: &str) -> ParserResult<&str> {
    context(
        "double quoted string",
        delimited(char('"'), quoted_body('"'), char('"')),
    )(input)
}

#[tracing::instrument(level = "debug", skip(input))]
pub fn parse_quoted(input: &str) -> ParserResult<Token> {
    context(
        "quoted",
        map(alt((parse_single_quoted, parse_double_quoted)), |s: &str| {
            Token::Quoted(s.to_string())
        }),
    )(input)
}

/// Undoes the backslash escaping of quotes and backslashes. Other escape
/// sequences are kept verbatim.
pub fn unescape(value: &str) -> String {
    let mut result = String::with_capacity(value.len());
    let mut chars = value.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            match chars.next() {
                Some(next @ ('\\' | '"' | '\'')) => result.push(next),
                Some(next) => {
                    result.push('\\');
                    result.push(next);
                }
                None => result.push('\\'),
            }
        } else {
            result.push(c);
        }
    }
    result
}
