use thiserror::Error;

// Token level parser

pub trait Parser<I, O> {
    fn parse(&self, input: &[I], pos: usize) -> ParseResult<O>;
}

pub type ParseResult<O> = Result<(usize, O), ParseError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParseError {
    #[error("Unexpected token at {position}")]
    Unexpected { position: usize },
    #[error("Unexpected EOF")]
    UnexpectedEOF,
    #[error("No alternative")]
    NoAlternative,
    #[error("Fail: {0}")]
    Fail(String),
    #[error("WithContext: {message}, {inner}")]
    WithContext {
        message: String,
        inner: Box<ParseError>,
    },
}

impl ParseError {
    /// Index of the offending token. End of input ranks past every token so
    /// that running out of tokens counts as the furthest failure.
    pub fn position(&self) -> Option<usize> {
        match self {
            ParseError::Unexpected { position } => Some(*position),
            ParseError::UnexpectedEOF => Some(usize::MAX),
            ParseError::WithContext { inner, .. } => inner.position(),
            ParseError::NoAlternative | ParseError::Fail(_) => None,
        }
    }

    /// Keeps whichever of two failures got further into the input.
    pub fn furthest(self, other: ParseError) -> ParseError {
        if other.position() > self.position() {
            other
        } else {
            self
        }
    }

    /// Strips context wrappers.
    pub fn root(&self) -> &ParseError {
        match self {
            ParseError::WithContext { inner, .. } => inner.root(),
            other => other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_furthest_prefers_later_position() {
        let near = ParseError::Unexpected { position: 1 };
        let far = ParseError::WithContext {
            message: "keyword".to_string(),
            inner: Box::new(ParseError::Unexpected { position: 4 }),
        };
        assert_eq!(near.clone().furthest(far.clone()), far);
        assert_eq!(far.clone().furthest(near), far);
        assert_eq!(
            ParseError::NoAlternative.furthest(ParseError::UnexpectedEOF),
            ParseError::UnexpectedEOF
        );
    }

    #[test]
    fn test_root_unwraps_context() {
        let err = ParseError::WithContext {
            message: "a".to_string(),
            inner: Box::new(ParseError::WithContext {
                message: "b".to_string(),
                inner: Box::new(ParseError::UnexpectedEOF),
            }),
        };
        assert_eq!(err.root(), &ParseError::UnexpectedEOF);
    }
}
