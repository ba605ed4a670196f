//! Entry points turning legacy protocol lines into [`Command`] and [`Reply`]
//! values.

use lazy_static::lazy_static;
use regex::Regex;
use thiserror::Error;

use crate::{
    analyzer::{
        parsers::{self, CommandNode, KeywordNode},
        ParseError, Parser,
    },
    message::{Command, Keyword, Keywords, MessageCode, MessageError, Reply, ReplyHeader},
    tokenizer::{significant_tokens, LexMode, Token, TokenizerError},
};

lazy_static! {
    static ref REPLY_HEADER: Regex = Regex::new(
        r"^([A-Za-z][A-Za-z0-9_]*)?\.([A-Za-z][A-Za-z0-9_]*)(\.[A-Za-z][A-Za-z0-9_.]*)?[ \t]+(0|[1-9][0-9]*)[ \t]+([A-Za-z][A-Za-z0-9_]*)[ \t]+(.)(?:[ \t]+|$)"
    )
    .unwrap();
    static ref COMMAND_HEADER: Regex = Regex::new(
        r"(?i)^(?:([a-z0-9]*\.[a-z0-9_.]+)\s+)?(?:(\d+)(?:\s+\d+)?\s+)?([a-z_].*|--help)?$"
    )
    .unwrap();
}

const TOKEN_DISPLAY_LENGTH: usize = 20;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum GrammarError {
    #[error(transparent)]
    Lexical(#[from] TokenizerError),
    #[error("Unexpected {kind} parse token ('{token}') in:\n{line}")]
    UnexpectedToken {
        kind: &'static str,
        token: String,
        line: String,
    },
    #[error("Unexpected end of input")]
    UnexpectedEnd,
    #[error("Badly formed reply header in: {0}")]
    BadHeader(String),
    #[error("Could not parse command '{0}'")]
    BadCommandHeader(String),
    #[error(transparent)]
    Message(#[from] MessageError),
}

pub type GrammarResult<T> = Result<T, GrammarError>;

/// Parses a command body such as `move 1,2 speed=fast`.
#[tracing::instrument(level = "debug")]
pub fn parse_command(line: &str) -> GrammarResult<Command> {
    let line = strip_newline(line);
    let tokens = significant_tokens(LexMode::Command, line)?;
    let node = run(parsers::parse_command(), &tokens, line)?;
    build_command(node, line)
}

/// Parses a full reply line, header included.
#[tracing::instrument(level = "debug")]
pub fn parse_reply(line: &str) -> GrammarResult<Reply> {
    let line = strip_newline(line);
    let (header, body) = parse_reply_header(line)?;
    let tokens = significant_tokens(LexMode::Reply, body)?;
    let nodes = run(parsers::parse_reply_body(), &tokens, line)?;
    let keywords = nodes
        .into_iter()
        .map(build_keyword)
        .collect::<GrammarResult<Keywords>>()?;
    Ok(Reply::new(header, keywords).with_string(line))
}

/// Parses the header of a reply line and returns it with the rest of the
/// line.
pub fn parse_reply_header(line: &str) -> GrammarResult<(ReplyHeader, &str)> {
    let captures = REPLY_HEADER
        .captures(line)
        .ok_or_else(|| GrammarError::BadHeader(line.to_string()))?;
    let group = |i: usize| captures.get(i).map(|m| m.as_str()).unwrap_or_default();

    let command_id = group(4)
        .parse::<u64>()
        .map_err(|_| GrammarError::BadHeader(line.to_string()))?;
    let code = MessageCode::parse(group(6))?;
    let header = ReplyHeader::new(group(1), group(2), group(3), command_id, group(5), code);

    let end = captures.get(0).map(|m| m.end()).unwrap_or_default();
    Ok((header, &line[end..]))
}

/// Splits an incoming command line into its optional commander name, its
/// command id (0 when absent) and the command body.
pub fn split_command_header(line: &str) -> GrammarResult<(Option<String>, u32, String)> {
    let line = strip_newline(line);
    let captures = COMMAND_HEADER
        .captures(line)
        .ok_or_else(|| GrammarError::BadCommandHeader(line.to_string()))?;

    let commander = captures.get(1).map(|m| m.as_str().to_string());
    let command_id = match captures.get(2) {
        Some(m) => m
            .as_str()
            .parse::<u32>()
            .map_err(|_| GrammarError::BadCommandHeader(line.to_string()))?,
        None => 0,
    };
    let body = captures
        .get(3)
        .map(|m| m.as_str().trim().to_string())
        .unwrap_or_default();

    Ok((commander, command_id, body))
}

fn strip_newline(line: &str) -> &str {
    line.strip_suffix('\n').unwrap_or(line)
}

fn run<O>(parser: impl Parser<Token, O>, tokens: &[Token], line: &str) -> GrammarResult<O> {
    parser
        .parse(tokens, 0)
        .map(|(_, output)| output)
        .map_err(|err| {
            let error = grammar_error(&err, tokens, line);
            tracing::debug!("{}: {}", error, err);
            error
        })
}

fn grammar_error(err: &ParseError, tokens: &[Token], line: &str) -> GrammarError {
    match err.position().and_then(|position| tokens.get(position)) {
        Some(token) => GrammarError::UnexpectedToken {
            kind: token.kind(),
            token: token.text().chars().take(TOKEN_DISPLAY_LENGTH).collect(),
            line: line.to_string(),
        },
        None => GrammarError::UnexpectedEnd,
    }
}

fn build_keyword(node: KeywordNode) -> GrammarResult<Keyword> {
    match node {
        KeywordNode::Raw(line) => Ok(Keyword::raw(line)),
        KeywordNode::Named { name, values } => Ok(Keyword::new(name, values)?),
    }
}

fn build_command(node: CommandNode, line: &str) -> GrammarResult<Command> {
    let keywords = node
        .keywords
        .into_iter()
        .map(build_keyword)
        .collect::<GrammarResult<Keywords>>()?;
    Ok(Command::new(node.verb)?
        .with_values(node.values)
        .with_keywords(keywords)
        .with_string(line))
}
