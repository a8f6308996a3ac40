use std::fmt;
use std::str::FromStr;

use itertools::Itertools;

use super::{Error, Result, ValveGraph, ValveName};
use crate::helpers::parse;

/// One line of the scan: a valve, its flow rate, and where its tunnels lead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScannedValve {
    pub name: ValveName,
    pub flow_rate: u32,
    pub tunnels: Vec<ValveName>,
}

impl fmt::Display for ScannedValve {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Valve {} has flow rate={}; ", self.name, self.flow_rate)?;
        if self.tunnels.len() == 1 {
            write!(f, "tunnel leads to valve ")?;
        } else {
            write!(f, "tunnels lead to valves ")?;
        }
        write!(f, "{}", self.tunnels.iter().join(", "))
    }
}

/// Parses a whole scan, one valve per line.
pub fn parse_scan(input: &str) -> Result<Vec<ScannedValve>> {
    let input = input.trim_end();
    let lines = c::many1::<Vec<_>, _, _>(parse::line(ScannedValve::parser()));
    parse::from_str(input, lines).map_err(|err| {
        let err = err.map_position(|p| p.translate_position(input));
        Error::Parse(err.to_string())
    })
}

impl FromStr for ValveGraph {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_valves(parse_scan(s)?)
    }
}

mod c {
    pub use combine::{
        parser::char::{self, string},
        *,
    };
}

use c::{ParseError, Parser, Stream};

fn valve_name<Input>() -> impl Parser<Input, Output = ValveName>
where
    Input: Stream<Token = char>,
    Input::Error: ParseError<Input::Token, Input::Range, Input::Position>,
{
    (c::char::upper(), c::char::upper()).map(|(a, b)| ValveName(a, b))
}

impl ScannedValve {
    pub fn parser<Input>() -> impl Parser<Input, Output = Self>
    where
        Input: Stream<Token = char>,
        Input::Error: ParseError<Input::Token, Input::Range, Input::Position>,
    {
        // "tunnels lead to valves DD, II, BB" or "tunnel leads to valve GG"
        let tunnels_intro = c::choice((
            c::attempt(c::string("tunnels lead to valves ")),
            c::string("tunnel leads to valve "),
        ));
        let tunnels = c::sep_by1(valve_name(), c::string(", "));

        (
            c::string("Valve "),
            valve_name(),
            c::string(" has flow rate="),
            parse::decimal_integer(),
            c::string("; "),
            tunnels_intro,
            tunnels,
        )
            .map(|(_, name, _, flow_rate, _, _, tunnels)| Self {
                name,
                flow_rate,
                tunnels,
            })
    }
}
