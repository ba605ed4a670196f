use lazy_static::lazy_static;
use nom::{
    bytes::complete::{tag, take_while, take_while1},
    character::complete::not_line_ending,
    combinator::map,
    error::context,
    sequence::{preceded, tuple},
};
use regex::Regex;

use super::token::{ParserResult, Token};

lazy_static! {
    static ref NAME_PATTERN: Regex = Regex::new(r"^[A-Za-z][A-Za-z0-9_.]*$").unwrap();
}

fn is_word_char(c: char) -> bool {
    !matches!(c, '"' | '\'' | '=' | ',' | ';') && !c.is_whitespace()
}

/// Returns true when a word can serve as a keyword or verb name.
pub fn is_name(word: &str) -> bool {
    NAME_PATTERN.is_match(word)
}

/// Parses an unquoted word, classified as a name when it looks like one.
#[tracing::instrument(level = "debug", skip(input))]
pub fn parse_word(input: &str) -> ParserResult<Token> {
    context(
        "word",
        map(take_while1(is_word_char), |word: &str| {
            if is_name(word) {
                Token::Name(word.to_string())
            } else {
                Token::Value(word.to_string())
            }
        }),
    )(input)
}

/// Parses `<whitespace>=<rest of line>` following a `raw` keyword.
#[tracing::instrument(level = "debug", skip(input))]
pub fn parse_raw_line(input: &str) -> ParserResult<Token> {
    context(
        "raw line",
        map(
            preceded(
                tuple((take_while(char::is_whitespace), tag("="))),
                not_line_ending,
            ),
            |line: &str| Token::Line(line.to_string()),
        ),
    )(input)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_word_stops_at_delimiters() {
        let (rest, token) = parse_word("key=1").unwrap();
        assert_eq!(token, Token::Name("key".to_string()));
        assert_eq!(rest, "=1");

        let (rest, token) = parse_word("12.5,3").unwrap();
        assert_eq!(token, Token::Value("12.5".to_string()));
        assert_eq!(rest, ",3");
    }

    #[test]
    fn test_word_rejects_quote_start() {
        assert!(parse_word("'a'").is_err());
        assert!(parse_word(" a").is_err());
    }

    #[test]
    fn test_is_name() {
        assert!(is_name("tcc.axis_1"));
        assert!(!is_name("1tcc"));
        assert!(!is_name("a-b"));
    }

    #[test]
    fn test_raw_line() {
        let (rest, token) = parse_raw_line("  = keep  'this' ; as is").unwrap();
        assert_eq!(token, Token::Line(" keep  'this' ; as is".to_string()));
        assert_eq!(rest, "");

        let (_, token) = parse_raw_line("=").unwrap();
        assert_eq!(token, Token::Line(String::new()));

        assert!(parse_raw_line(" no equals").is_err());
    }
}
