use super::super::{core::*, prelude::*};
use crate::tokenizer::{symbol::Delimiter, token::Token};

/// A keyword clause as it appears in a line, before any validation.
#[derive(Debug, Clone, PartialEq)]
pub enum KeywordNode {
    Raw(String),
    Named { name: String, values: Vec<String> },
}

impl KeywordNode {
    pub fn named(name: &str, values: &[&str]) -> Self {
        KeywordNode::Named {
            name: name.to_string(),
            values: values.iter().map(|v| v.to_string()).collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CommandNode {
    pub verb: String,
    pub values: Vec<String>,
    pub keywords: Vec<KeywordNode>,
}

pub fn parse_name() -> impl Parser<Token, String> {
    with_context(
        satisfy(|token: &Token| match token {
            Token::Name(s) => Some(s.clone()),
            _ => None,
        }),
        "name",
    )
}

pub fn parse_bare_value() -> impl Parser<Token, String> {
    satisfy(|token: &Token| match token {
        Token::Value(s) => Some(s.clone()),
        _ => None,
    })
}

pub fn parse_quoted() -> impl Parser<Token, String> {
    satisfy(|token: &Token| match token {
        Token::Quoted(s) => Some(s.clone()),
        _ => None,
    })
}

/// Any token usable as a value: a name, a bare value or a quoted string.
pub fn parse_value() -> impl Parser<Token, String> {
    with_context(
        satisfy(|token: &Token| match token {
            Token::Name(s) | Token::Value(s) | Token::Quoted(s) => Some(s.clone()),
            _ => None,
        }),
        "value",
    )
}

pub fn parse_equals() -> impl Parser<Token, ()> {
    as_unit(equal(Token::Delimiter(Delimiter::Equals)))
}

pub fn parse_comma() -> impl Parser<Token, ()> {
    as_unit(equal(Token::Delimiter(Delimiter::Comma)))
}

pub fn parse_semicolon() -> impl Parser<Token, ()> {
    as_unit(equal(Token::Delimiter(Delimiter::Semicolon)))
}

pub fn parse_raw() -> impl Parser<Token, ()> {
    satisfy(|token: &Token| match token {
        Token::Raw(_) => Some(()),
        _ => None,
    })
}

pub fn parse_line() -> impl Parser<Token, String> {
    satisfy(|token: &Token| match token {
        Token::Line(s) => Some(s.clone()),
        _ => None,
    })
}

/// `(COMMA value)*`
pub fn parse_more_values() -> impl Parser<Token, Vec<String>> {
    many(preceded(parse_comma(), parse_value()))
}

/// `EQUALS value (COMMA value)*`
pub fn parse_values() -> impl Parser<Token, Vec<String>> {
    with_context(
        preceded(
            parse_equals(),
            map(
                tuple2(parse_value(), parse_more_values()),
                |(first, rest): (String, Vec<String>)| {
                    let mut values = vec![first];
                    values.extend(rest);
                    values
                },
            ),
        ),
        "values",
    )
}

/// `RAW LINE | NAME values | NAME`
pub fn parse_keyword() -> impl Parser<Token, KeywordNode> {
    with_context(
        choice::<Token, KeywordNode>(vec![
            Box::new(map(
                tuple2(parse_raw(), parse_line()),
                |(_, line): ((), String)| KeywordNode::Raw(line),
            )),
            Box::new(map(
                tuple2(parse_name(), parse_values()),
                |(name, values): (String, Vec<String>)| KeywordNode::Named { name, values },
            )),
            Box::new(map(parse_name(), |name: String| KeywordNode::Named {
                name,
                values: vec![],
            })),
        ]),
        "keyword",
    )
}

pub fn parse_keywords() -> impl Parser<Token, Vec<KeywordNode>> {
    many(parse_keyword())
}
