use strum_macros::{AsRefStr, Display, EnumString};

use nom::{branch::alt, bytes::complete::tag, combinator::value, error::context};

use super::token::{ParserResult, Token};

/// Single character delimiters of the legacy protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumString, Display, AsRefStr)]
pub enum Delimiter {
    /// Separates a keyword name from its values (`=`)
    #[strum(serialize = "=")]
    Equals,
    /// Separates values (`,`)
    #[strum(serialize = ",")]
    Comma,
    /// Separates reply keywords (`;`)
    #[strum(serialize = ";")]
    Semicolon,
}

#[tracing::instrument(level = "debug", skip(input))]
pub fn parse_delimiter(input: &str) -> ParserResult<Token> {
    context(
        "delimiter",
        alt((
            value(Token::Delimiter(Delimiter::Equals), tag("=")),
            value(Token::Delimiter(Delimiter::Comma), tag(",")),
            value(Token::Delimiter(Delimiter::Semicolon), tag(";")),
        )),
    )(input)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_parse_delimiters() {
        for (input, expected) in [
            ("=", Delimiter::Equals),
            (",", Delimiter::Comma),
            (";", Delimiter::Semicolon),
        ] {
            let (rest, token) = parse_delimiter(input).unwrap();
            assert_eq!(token, Token::Delimiter(expected));
            assert_eq!(rest, "");
        }
        assert!(parse_delimiter("a").is_err());
    }

    #[test]
    fn test_delimiter_strings() {
        assert_eq!(Delimiter::from_str(";").unwrap(), Delimiter::Semicolon);
        assert_eq!(Delimiter::Comma.to_string(), ",");
        assert_eq!(Delimiter::Equals.as_ref(), "=");
    }
}
