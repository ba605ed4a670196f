use super::super::{core::*, prelude::*};
use super::common::*;
use crate::tokenizer::token::Token;

/// `keyword (SEMICOLON keyword)*`, or nothing at all.
pub fn parse_reply_body() -> impl Parser<Token, Vec<KeywordNode>> {
    with_context(
        all_consuming(separated_list(parse_keyword(), parse_semicolon())),
        "reply",
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tokenizer::token::{significant_tokens, LexMode};

    fn parse(input: &str) -> ParseResult<Vec<KeywordNode>> {
        let tokens = significant_tokens(LexMode::Reply, input).unwrap();
        parse_reply_body().parse(&tokens, 0)
    }

    #[test]
    fn test_empty_body() {
        assert_eq!(parse(""), Ok((0, vec![])));
    }

    #[test]
    fn test_keywords_separated_by_semicolons() {
        let (_, keywords) = parse("a=1,2; b ;c=\"x y\"").unwrap();
        assert_eq!(
            keywords,
            vec![
                KeywordNode::named("a", &["1", "2"]),
                KeywordNode::named("b", &[]),
                KeywordNode::named("c", &["x y"]),
            ]
        );
    }

    #[test]
    fn test_raw_is_an_ordinary_name_in_replies() {
        let (_, keywords) = parse("raw=1").unwrap();
        assert_eq!(keywords, vec![KeywordNode::named("raw", &["1"])]);
    }

    #[test]
    fn test_trailing_semicolon_rejected() {
        let err = parse("a=1;").unwrap_err();
        assert_eq!(err.position(), Some(3));
    }

    #[test]
    fn test_missing_separator_rejected() {
        let err = parse("a=1 b=2").unwrap_err();
        assert_eq!(err.position(), Some(3));
    }
}
