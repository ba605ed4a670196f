//! Inline whitespace. Only spaces and tabs separate tokens; the tokenizer
//! keeps them as [`Token::Whitespace`] and the grammar skips them.

use nom::{bytes::complete::take_while1, combinator::map, error::context};

use super::token::{ParserResult, Token};

/// Parses a run of spaces and tabs.
///
/// ```
/// # use legacy_hub::tokenizer::whitespace::parse_whitespace;
/// # use legacy_hub::tokenizer::token::Token;
/// let (rest, token) = parse_whitespace(" \tkey").unwrap();
/// assert_eq!(token, Token::Whitespace(" \t".to_string()));
/// assert_eq!(rest, "key");
/// ```
#[tracing::instrument(level = "debug", skip(input))]
pub fn parse_whitespace(input: &str) -> ParserResult<Token> {
    context(
        "whitespace expected",
        map(take_while1(|c| c == ' ' || c == '\t'), |ws: &str| {
            Token::Whitespace(ws.to_string())
        }),
    )(input)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_whitespace() {
        let (rest, token) = parse_whitespace("  a").unwrap();
        assert_eq!(token, Token::Whitespace("  ".to_string()));
        assert_eq!(rest, "a");
    }

    #[test]
    fn test_newline_is_not_inline_whitespace() {
        assert!(parse_whitespace("\n").is_err());
        assert!(parse_whitespace("a").is_err());
    }
}
