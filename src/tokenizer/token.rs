use std::fmt;

use nom::{branch::alt, error::VerboseError, IResult};
use thiserror::Error;

use super::{
    literal::parse_quoted,
    symbol::{parse_delimiter, Delimiter},
    whitespace::parse_whitespace,
    word::{parse_raw_line, parse_word},
};

#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    /// A word shaped like an identifier, usable as a name or a value.
    Name(String),
    /// Any other unquoted word.
    Value(String),
    /// The text between quotes, backslash escapes left in place.
    Quoted(String),
    Delimiter(Delimiter),
    /// The `raw` word of a command, as written.
    Raw(String),
    /// Everything after `raw =` up to the end of the line.
    Line(String),
    Whitespace(String),
}

impl Token {
    /// Grammar class of the token, as reported in parse errors.
    pub fn kind(&self) -> &'static str {
        match self {
            Token::Name(_) => "NAME_OR_VALUE",
            Token::Value(_) => "VALUE",
            Token::Quoted(_) => "QUOTED",
            Token::Delimiter(Delimiter::Equals) => "EQUALS",
            Token::Delimiter(Delimiter::Comma) => "COMMA",
            Token::Delimiter(Delimiter::Semicolon) => "SEMICOLON",
            Token::Raw(_) => "RAW",
            Token::Line(_) => "LINE",
            Token::Whitespace(_) => "WHITESPACE",
        }
    }

    pub fn text(&self) -> String {
        match self {
            Token::Name(s)
            | Token::Value(s)
            | Token::Quoted(s)
            | Token::Raw(s)
            | Token::Line(s)
            | Token::Whitespace(s) => s.clone(),
            Token::Delimiter(d) => d.to_string(),
        }
    }

    pub fn is_trivia(&self) -> bool {
        matches!(self, Token::Whitespace(_))
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.kind(), self.text())
    }
}

/// Which grammar the lexer feeds. Only commands know the `raw` keyword,
/// only replies separate keywords with `;`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LexMode {
    #[default]
    Reply,
    Command,
}

#[derive(Debug, Clone)]
pub struct Tokenizer {
    mode: LexMode,
    current_position: usize,
}

impl Tokenizer {
    pub fn new(mode: LexMode) -> Self {
        Self {
            mode,
            current_position: 0,
        }
    }

    #[tracing::instrument(level = "debug", skip(self, input))]
    pub fn tokenize(&mut self, input: &str) -> TokenizerResult<Vec<TokenSpan>> {
        let mut tokens = Vec::new();
        let mut remaining = input;
        let mut raw_pending = false;

        while !remaining.is_empty() {
            let start_position = self.current_position;

            let result = if raw_pending {
                parse_raw_line(remaining)
            } else {
                alt((parse_whitespace, parse_quoted, parse_delimiter, parse_word))(remaining)
            };

            match result {
                Ok((new_remaining, token)) => {
                    let token = match self.classify(token) {
                        Some(token) => token,
                        None => return Err(self.lexical_error(remaining)),
                    };
                    let consumed = remaining.len() - new_remaining.len();
                    self.current_position += consumed;
                    raw_pending = matches!(token, Token::Raw(_));

                    tokens.push(TokenSpan {
                        token,
                        start: start_position,
                        end: self.current_position,
                    });

                    remaining = new_remaining;
                }
                Err(_) => return Err(self.lexical_error(remaining)),
            }
        }

        Ok(tokens)
    }

    /// Applies the mode specific rules on top of the shared lexical ones.
    fn classify(&self, token: Token) -> Option<Token> {
        match (self.mode, token) {
            (LexMode::Command, Token::Name(word)) if word.eq_ignore_ascii_case("raw") => {
                Some(Token::Raw(word))
            }
            (LexMode::Command, Token::Delimiter(Delimiter::Semicolon)) => None,
            (_, token) => Some(token),
        }
    }

    fn lexical_error(&self, remaining: &str) -> TokenizerError {
        let found = remaining.chars().take(20).collect::<String>();
        let error = TokenizerError::ParseError {
            message: "no token matches".to_string(),
            found,
            span: Span {
                start: self.current_position,
                end: self.current_position + 1,
            },
        };
        tracing::error!("{}", error);
        error
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TokenSpan {
    pub token: Token,
    pub start: usize,
    pub end: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "start: {}, end: {}", self.start, self.end)
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum TokenizerError {
    #[error("Lexical analysis error at '{found}'")]
    ParseError {
        message: String,
        found: String,
        span: Span,
    },
}

/// Tokenizes a line and drops whitespace.
pub fn significant_tokens(mode: LexMode, line: &str) -> TokenizerResult<Vec<Token>> {
    Ok(Tokenizer::new(mode)
        .tokenize(line)?
        .into_iter()
        .map(|span| span.token)
        .filter(|token| !token.is_trivia())
        .collect())
}

pub type ParserResult<'a, T> = IResult<&'a str, T, VerboseError<&'a str>>;

pub type TokenizerResult<T> = Result<T, TokenizerError>;

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(mode: LexMode, input: &str) -> Vec<&'static str> {
        significant_tokens(mode, input)
            .unwrap()
            .iter()
            .map(Token::kind)
            .collect()
    }

    #[test]
    fn test_reply_body_tokens() {
        assert_eq!(
            kinds(LexMode::Reply, "a=1,\"two words\"; b"),
            vec![
                "NAME_OR_VALUE",
                "EQUALS",
                "VALUE",
                "COMMA",
                "QUOTED",
                "SEMICOLON",
                "NAME_OR_VALUE"
            ]
        );
    }

    #[test]
    fn test_word_classification() {
        let tokens = significant_tokens(LexMode::Reply, "abc a.b_c 1abc -2.5 _x").unwrap();
        assert_eq!(
            tokens,
            vec![
                Token::Name("abc".to_string()),
                Token::Name("a.b_c".to_string()),
                Token::Value("1abc".to_string()),
                Token::Value("-2.5".to_string()),
                Token::Value("_x".to_string()),
            ]
        );
    }

    #[test]
    fn test_raw_switches_mode_in_commands_only() {
        let tokens = significant_tokens(LexMode::Command, "cmd RAW = a,b ;c=\"").unwrap();
        assert_eq!(
            tokens,
            vec![
                Token::Name("cmd".to_string()),
                Token::Raw("RAW".to_string()),
                Token::Line(" a,b ;c=\"".to_string()),
            ]
        );

        let tokens = significant_tokens(LexMode::Reply, "raw=1").unwrap();
        assert_eq!(tokens[0], Token::Name("raw".to_string()));
    }

    #[test]
    fn test_semicolon_rejected_in_commands() {
        let err = significant_tokens(LexMode::Command, "cmd a;b").unwrap_err();
        assert_eq!(err.to_string(), "Lexical analysis error at ';b'");
    }

    #[test]
    fn test_unterminated_quote() {
        let err = significant_tokens(LexMode::Reply, "a=\"open ended value that is long").unwrap_err();
        match err {
            TokenizerError::ParseError { found, span, .. } => {
                assert_eq!(found, "\"open ended value th");
                assert_eq!(span.start, 2);
            }
        }
    }

    #[test]
    fn test_spans_track_offsets() {
        let spans = Tokenizer::new(LexMode::Reply).tokenize("ab = 'c'").unwrap();
        let offsets: Vec<(usize, usize)> = spans.iter().map(|s| (s.start, s.end)).collect();
        assert_eq!(offsets, vec![(0, 2), (2, 3), (3, 4), (4, 5), (5, 8)]);
    }
}
