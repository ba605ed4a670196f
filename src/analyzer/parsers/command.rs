use super::super::{core::*, prelude::*};
use super::common::*;
use crate::tokenizer::token::Token;

/// The verb followed by values that cannot be mistaken for a keyword:
/// `NAME NAME COMMA NAME`, `NAME VALUE` or `NAME QUOTED`, then
/// `(COMMA value)*`.
fn parse_verb_with_values() -> impl Parser<Token, (String, Vec<String>)> {
    let head = choice::<Token, (String, Vec<String>)>(vec![
        Box::new(map(
            tuple4(parse_name(), parse_name(), parse_comma(), parse_name()),
            |(verb, first, _, second): (String, String, (), String)| (verb, vec![first, second]),
        )),
        Box::new(map(
            tuple2(parse_name(), parse_bare_value()),
            |(verb, value): (String, String)| (verb, vec![value]),
        )),
        Box::new(map(
            tuple2(parse_name(), parse_quoted()),
            |(verb, value): (String, String)| (verb, vec![value]),
        )),
    ]);

    map(
        tuple2(head, parse_more_values()),
        |((verb, mut values), more): ((String, Vec<String>), Vec<String>)| {
            values.extend(more);
            (verb, values)
        },
    )
}

/// A whole command line body. Alternatives are tried in order and each
/// must account for every token.
pub fn parse_command() -> impl Parser<Token, CommandNode> {
    with_context(
        choice::<Token, CommandNode>(vec![
            // verb 1,2 key=3
            Box::new(all_consuming(map(
                tuple2(parse_verb_with_values(), parse_keywords()),
                |((verb, values), keywords): ((String, Vec<String>), Vec<KeywordNode>)| {
                    CommandNode {
                        verb,
                        values,
                        keywords,
                    }
                },
            ))),
            // verb key=1 other
            Box::new(all_consuming(map(
                tuple4(
                    parse_name(),
                    parse_name(),
                    parse_values(),
                    parse_keywords(),
                ),
                |(verb, name, values, rest): (String, String, Vec<String>, Vec<KeywordNode>)| {
                    let mut keywords = vec![KeywordNode::Named { name, values }];
                    keywords.extend(rest);
                    CommandNode {
                        verb,
                        values: vec![],
                        keywords,
                    }
                },
            ))),
            // verb raw=anything
            Box::new(all_consuming(map(
                tuple3(parse_name(), parse_raw(), parse_line()),
                |(verb, _, line): (String, (), String)| CommandNode {
                    verb,
                    values: vec![],
                    keywords: vec![KeywordNode::Raw(line)],
                },
            ))),
            // verb key other=1
            Box::new(all_consuming(map(
                tuple3(parse_name(), parse_name(), parse_keywords()),
                |(verb, name, rest): (String, String, Vec<KeywordNode>)| {
                    let mut keywords = vec![KeywordNode::Named {
                        name,
                        values: vec![],
                    }];
                    keywords.extend(rest);
                    CommandNode {
                        verb,
                        values: vec![],
                        keywords,
                    }
                },
            ))),
            // verb
            Box::new(all_consuming(map(parse_name(), |verb: String| {
                CommandNode {
                    verb,
                    values: vec![],
                    keywords: vec![],
                }
            }))),
        ]),
        "command",
    )
}
