use std::str::FromStr;

use combine::{easy, EasyParser, ParseError, Parser, Stream};

pub type EzParseError<'a> = easy::ParseError<&'a str>;
pub type Result<'a, T> = std::result::Result<T, EzParseError<'a>>;

/// Parses all of `s` with `parser`, failing if any input is left over.
pub fn from_str<'a, P>(s: &'a str, parser: P) -> Result<'a, P::Output>
where
    P: Parser<easy::Stream<&'a str>>,
{
    (parser, combine::eof())
        .map(|(output, _)| output)
        .easy_parse(s)
        .map(|(output, rest)| {
            debug_assert_eq!(rest, "");
            output
        })
}

/// An unsigned run of decimal digits, converted with [`FromStr`].
pub fn decimal_integer<Input, T>() -> impl Parser<Input, Output = T>
where
    Input: Stream<Token = char>,
    Input::Error: ParseError<Input::Token, Input::Range, Input::Position>,
    T: FromStr,
    T::Err: std::fmt::Display,
{
    let digits = combine::many1::<String, _, _>(combine::parser::char::digit());
    combine::parser::combinator::from_str(digits)
}

/// `parser` followed by a newline or the end of input.
pub fn line<Input, P>(parser: P) -> impl Parser<Input, Output = P::Output>
where
    Input: Stream<Token = char>,
    Input::Error: ParseError<Input::Token, Input::Range, Input::Position>,
    P: Parser<Input>,
{
    let end_of_line = combine::choice((
        combine::parser::char::newline().map(|_| ()),
        combine::eof(),
    ));
    (parser, end_of_line).map(|(output, _)| output)
}
