use super::core::ParseError;
use super::core::ParseResult;
use super::core::Parser;
use std::marker::PhantomData;

fn missing<O>(input_len: usize, pos: usize) -> ParseResult<O> {
    if pos >= input_len {
        Err(ParseError::UnexpectedEOF)
    } else {
        Err(ParseError::Unexpected { position: pos })
    }
}

#[derive(Clone)]
pub struct Equal<I> {
    value: I,
}

impl<I> Equal<I> {
    pub fn new(value: I) -> Self {
        Self { value }
    }
}

impl<I: Clone + PartialEq> Parser<I, I> for Equal<I> {
    fn parse(&self, input: &[I], pos: usize) -> ParseResult<I> {
        match input.get(pos) {
            Some(found) if *found == self.value => Ok((pos + 1, found.clone())),
            _ => missing(input.len(), pos),
        }
    }
}

#[derive(Clone)]
pub struct Satisfy<I, O, F> {
    f: F,
    _phantom: PhantomData<(I, O)>,
}

impl<I, O, F> Satisfy<I, O, F> {
    pub fn new(f: F) -> Self {
        Self {
            f,
            _phantom: PhantomData,
        }
    }
}

impl<I, O, F> Parser<I, O> for Satisfy<I, O, F>
where
    F: Fn(&I) -> Option<O>,
{
    fn parse(&self, input: &[I], pos: usize) -> ParseResult<O> {
        match input.get(pos).and_then(|x| (self.f)(x)) {
            Some(result) => Ok((pos + 1, result)),
            None => missing(input.len(), pos),
        }
    }
}

/// Ordered choice. The first alternative that succeeds wins; when all of
/// them fail the error that got furthest into the input is reported.
pub struct Choice<I, O> {
    parsers: Vec<Box<dyn Parser<I, O>>>,
}

impl<I, O> Choice<I, O> {
    pub fn new(parsers: Vec<Box<dyn Parser<I, O>>>) -> Self {
        Self { parsers }
    }
}

impl<I, O> Parser<I, O> for Choice<I, O> {
    fn parse(&self, input: &[I], pos: usize) -> ParseResult<O> {
        let mut failure = ParseError::NoAlternative;
        for parser in &self.parsers {
            match parser.parse(input, pos) {
                Ok(result) => return Ok(result),
                Err(e) => failure = failure.furthest(e),
            }
        }
        Err(failure)
    }
}

#[derive(Clone)]
pub struct Preceded<P1, P2, I, O> {
    parser1: P1,
    parser2: P2,
    _phantom: PhantomData<(I, O)>,
}

impl<P1, P2, I, O> Preceded<P1, P2, I, O> {
    pub fn new(parser1: P1, parser2: P2) -> Self {
        Self {
            parser1,
            parser2,
            _phantom: PhantomData,
        }
    }
}

impl<P1, P2, I, O> Parser<I, O> for Preceded<P1, P2, I, O>
where
    P1: Parser<I, ()>,
    P2: Parser<I, O>,
{
    fn parse(&self, input: &[I], pos: usize) -> ParseResult<O> {
        let (pos, _) = self.parser1.parse(input, pos)?;
        self.parser2.parse(input, pos)
    }
}

#[derive(Clone)]
pub struct Map<P, F, A, B> {
    parser: P,
    f: F,
    _phantom: PhantomData<(A, B)>,
}

impl<P, F, A, B> Map<P, F, A, B> {
    pub fn new(parser: P, f: F) -> Self {
        Self {
            parser,
            f,
            _phantom: PhantomData,
        }
    }
}

impl<I, A, B, P, F> Parser<I, B> for Map<P, F, A, B>
where
    P: Parser<I, A>,
    F: Fn(A) -> B,
{
    fn parse(&self, input: &[I], pos: usize) -> ParseResult<B> {
        self.parser
            .parse(input, pos)
            .map(|(pos, value)| (pos, (self.f)(value)))
    }
}

#[derive(Clone)]
pub struct AsUnit<P, O> {
    parser: P,
    _phantom: PhantomData<O>,
}

impl<P, O> AsUnit<P, O> {
    pub fn new(parser: P) -> Self {
        Self {
            parser,
            _phantom: PhantomData,
        }
    }
}

impl<I, P, O> Parser<I, ()> for AsUnit<P, O>
where
    P: Parser<I, O>,
{
    fn parse(&self, input: &[I], pos: usize) -> ParseResult<()> {
        self.parser.parse(input, pos).map(|(pos, _)| (pos, ()))
    }
}

#[derive(Clone)]
pub struct Many<P, I, O> {
    parser: P,
    _phantom: PhantomData<(I, O)>,
}

impl<P, I, O> Many<P, I, O> {
    pub fn new(parser: P) -> Self {
        Self {
            parser,
            _phantom: PhantomData,
        }
    }
}

impl<I, O, P> Parser<I, Vec<O>> for Many<P, I, O>
where
    P: Parser<I, O>,
{
    fn parse(&self, input: &[I], pos: usize) -> ParseResult<Vec<O>> {
        let mut results = Vec::new();
        let mut current_pos = pos;

        while let Ok((new_pos, value)) = self.parser.parse(input, current_pos) {
            // a parser that consumes nothing would loop forever
            if new_pos == current_pos {
                break;
            }
            results.push(value);
            current_pos = new_pos;
        }

        Ok((current_pos, results))
    }
}

/// Zero or more items separated by a separator. A separator is only
/// consumed when an item follows it, so a trailing separator is left for
/// the caller to reject.
pub struct SeparatedList<P, S, I, O> {
    item_parser: P,
    separator_parser: S,
    _phantom: PhantomData<(I, O)>,
}

impl<P, S, I, O> SeparatedList<P, S, I, O> {
    pub fn new(item_parser: P, separator_parser: S) -> Self {
        Self {
            item_parser,
            separator_parser,
            _phantom: PhantomData,
        }
    }
}

impl<I, O, P, S> Parser<I, Vec<O>> for SeparatedList<P, S, I, O>
where
    P: Parser<I, O>,
    S: Parser<I, ()>,
{
    fn parse(&self, input: &[I], pos: usize) -> ParseResult<Vec<O>> {
        let mut results = Vec::new();
        let mut current_pos = pos;

        if let Ok((new_pos, value)) = self.item_parser.parse(input, current_pos) {
            results.push(value);
            current_pos = new_pos;

            while let Ok((sep_pos, _)) = self.separator_parser.parse(input, current_pos) {
                match self.item_parser.parse(input, sep_pos) {
                    Ok((new_pos, value)) => {
                        results.push(value);
                        current_pos = new_pos;
                    }
                    Err(_) => break,
                }
            }
        }

        Ok((current_pos, results))
    }
}

/// Generates a parser that runs its parsers in turn and returns their
/// outputs as a tuple.
macro_rules! sequence {
    ($name:ident, $function:ident; $($p:ident $o:ident $field:ident),+) => {
        #[derive(Clone)]
        pub struct $name<$($p,)+ I, $($o,)+> {
            $($field: $p,)+
            _phantom: PhantomData<(I, $($o,)+)>,
        }

        impl<$($p,)+ I, $($o,)+> $name<$($p,)+ I, $($o,)+> {
            pub fn new($($field: $p),+) -> Self {
                Self {
                    $($field,)+
                    _phantom: PhantomData,
                }
            }
        }

        impl<$($p,)+ I, $($o,)+> Parser<I, ($($o,)+)> for $name<$($p,)+ I, $($o,)+>
        where
            $($p: Parser<I, $o>,)+
        {
            fn parse(&self, input: &[I], pos: usize) -> ParseResult<($($o,)+)> {
                $(let (pos, $field) = self.$field.parse(input, pos)?;)+
                Ok((pos, ($($field,)+)))
            }
        }

        pub fn $function<$($p,)+ I, $($o,)+>($($field: $p),+) -> $name<$($p,)+ I, $($o,)+>
        where
            $($p: Parser<I, $o>,)+
        {
            $name::new($($field),+)
        }
    };
}

sequence!(Tuple2, tuple2; P1 O1 first, P2 O2 second);
sequence!(Tuple3, tuple3; P1 O1 first, P2 O2 second, P3 O3 third);
sequence!(Tuple4, tuple4; P1 O1 first, P2 O2 second, P3 O3 third, P4 O4 fourth);

/// Succeeds only when the wrapped parser stops exactly at the end of input.
#[derive(Clone)]
pub struct AllConsuming<P, O> {
    parser: P,
    _phantom: PhantomData<O>,
}

impl<P, O> AllConsuming<P, O> {
    pub fn new(parser: P) -> Self {
        Self {
            parser,
            _phantom: PhantomData,
        }
    }
}

impl<I, O, P> Parser<I, O> for AllConsuming<P, O>
where
    P: Parser<I, O>,
{
    fn parse(&self, input: &[I], pos: usize) -> ParseResult<O> {
        let (pos, value) = self.parser.parse(input, pos)?;
        if pos < input.len() {
            Err(ParseError::Unexpected { position: pos })
        } else {
            Ok((pos, value))
        }
    }
}

#[derive(Clone)]
pub struct WithContext<P, C> {
    parser: P,
    context: C,
}

impl<P, C> WithContext<P, C> {
    pub fn new(parser: P, context: C) -> Self {
        Self { parser, context }
    }
}

impl<I, O, P, C: ToString> Parser<I, O> for WithContext<P, C>
where
    P: Parser<I, O>,
{
    fn parse(&self, input: &[I], pos: usize) -> ParseResult<O> {
        self.parser
            .parse(input, pos)
            .map_err(|e| ParseError::WithContext {
                message: self.context.to_string(),
                inner: Box::new(e),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn digit() -> Satisfy<char, u32, impl Fn(&char) -> Option<u32>> {
        Satisfy::new(|c: &char| c.to_digit(10))
    }

    fn comma() -> AsUnit<Equal<char>, char> {
        AsUnit::new(Equal::new(','))
    }

    #[test]
    fn test_equal_reports_position() {
        let input = vec!['a', 'b'];
        let parser = Equal::new('b');
        assert_eq!(parser.parse(&input, 1), Ok((2, 'b')));
        assert_eq!(
            parser.parse(&input, 0),
            Err(ParseError::Unexpected { position: 0 })
        );
        assert_eq!(parser.parse(&input, 2), Err(ParseError::UnexpectedEOF));
    }

    #[test]
    fn test_choice_keeps_furthest_failure() {
        let input = vec!['1', 'x'];
        let parser: Choice<char, u32> = Choice::new(vec![
            Box::new(Map::new(
                Tuple2::new(digit(), digit()),
                |(a, b): (u32, u32)| a + b,
            )),
            Box::new(Map::new(Equal::new('z'), |_: char| 0u32)),
        ]);
        assert_eq!(
            parser.parse(&input, 0),
            Err(ParseError::Unexpected { position: 1 })
        );
    }

    #[test]
    fn test_separated_list_leaves_trailing_separator() {
        let input = vec!['1', ',', '2', ','];
        let parser = SeparatedList::new(digit(), comma());
        assert_eq!(parser.parse(&input, 0), Ok((3, vec![1, 2])));

        let empty: Vec<char> = vec![','];
        assert_eq!(parser.parse(&empty, 0), Ok((0, vec![])));
    }

    #[test]
    fn test_many_and_preceded() {
        let input = vec![',', '1', ',', '2', '3'];
        let parser = Many::new(Preceded::new(comma(), digit()));
        assert_eq!(parser.parse(&input, 0), Ok((4, vec![1, 2])));
    }

    #[test]
    fn test_all_consuming() {
        let input = vec!['1', '2'];
        assert_eq!(
            AllConsuming::new(digit()).parse(&input, 0),
            Err(ParseError::Unexpected { position: 1 })
        );
        assert_eq!(
            AllConsuming::new(Many::new(digit())).parse(&input, 0),
            Ok((2, vec![1, 2]))
        );
    }

    #[test]
    fn test_sequence_stops_at_first_failure() {
        let input = vec!['1', '2', 'x'];
        let parser = Tuple3::new(digit(), digit(), digit());
        assert_eq!(
            parser.parse(&input, 0),
            Err(ParseError::Unexpected { position: 2 })
        );
        assert_eq!(
            Tuple2::new(digit(), digit()).parse(&input, 0),
            Ok((2, (1, 2)))
        );
    }

    #[test]
    fn test_with_context_wraps_error() {
        let input: Vec<char> = vec![];
        let parser = WithContext::new(digit(), "digit");
        assert_eq!(
            parser.parse(&input, 0),
            Err(ParseError::WithContext {
                message: "digit".to_string(),
                inner: Box::new(ParseError::UnexpectedEOF),
            })
        );
    }
}
