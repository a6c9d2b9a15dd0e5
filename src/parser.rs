//! This module provides the parser for the standard text format of Busy Beaver machines,
//! utilizing the `pest` crate. A machine is written state by state, separated by `_`, each
//! state holding its transitions for symbols 0 and 1, e.g. `1RB1LB_1LA0LC_1RZ1LD_1RD0RA`.

use crate::{
    machine::{Machine, Transition},
    types::{BeaverError, Direction, HALT, MAX_STATES, SLOTS, SYMBOLS},
};
use pest::{
    error::{Error, ErrorVariant},
    iterators::Pair,
    Parser as PestParser, Span,
};
use pest_derive::Parser as PestParser;

/// Derives a `PestParser` for the machine grammar defined in `grammar.pest`.
#[derive(PestParser)]
#[grammar = "grammar.pest"]
pub struct MachineParser;

/// Parses a standard text machine into its packed form.
///
/// The bookkeeping fields are derived from the table: the undefined count is the number
/// of halting transitions among the written states and the first undefined state is the
/// lowest state whose transitions all halt.
///
/// # Arguments
///
/// * `input` - A string slice such as `1RB1LB_1LA0LC_1RZ1LD_1RD0RA`.
///
/// # Returns
///
/// * `Ok(Machine)` if the input is well formed.
/// * `Err(BeaverError::ParseError)` on syntax errors, too many states or unknown targets.
pub fn parse(input: &str) -> Result<Machine, BeaverError> {
    let root = MachineParser::parse(Rule::machine, input.trim())
        .map_err(|e| BeaverError::ParseError(Box::new(e)))?
        .next()
        .ok_or_else(|| BeaverError::ValidationError("Empty machine".to_string()))?;

    let states: Vec<Pair<Rule>> = root
        .into_inner()
        .filter(|p| p.as_rule() == Rule::state)
        .collect();

    if states.len() > MAX_STATES {
        let span = states[MAX_STATES].as_span();
        return Err(parse_error(
            &format!("At most {} states are supported", MAX_STATES),
            span,
        ));
    }

    let count = states.len() as u8;
    let mut table = [Transition::UNDEFINED; SLOTS];

    for (state, pair) in states.into_iter().enumerate() {
        for (symbol, transition) in pair.into_inner().enumerate() {
            table[SYMBOLS * state + symbol] = parse_transition(transition, count)?;
        }
    }

    Ok(Machine::from_transitions(&table, count))
}

/// Creates a `BeaverError::ParseError` from a message and a `Span`.
fn parse_error(msg: &str, span: Span) -> BeaverError {
    BeaverError::ParseError(Box::new(Error::new_from_span(
        ErrorVariant::CustomError {
            message: msg.to_string(),
        },
        span,
    )))
}

/// Parses one `Rule::transition`, either `---` or symbol, direction and target.
fn parse_transition(pair: Pair<Rule>, states: u8) -> Result<Transition, BeaverError> {
    let Some(inner) = pair.into_inner().next() else {
        return Ok(Transition::UNDEFINED);
    };

    if inner.as_rule() == Rule::undefined {
        return Ok(Transition::UNDEFINED);
    }

    let mut write = 0;
    let mut direction = Direction::Right;
    let mut next = HALT;

    for part in inner.into_inner() {
        match part.as_rule() {
            Rule::symbol => write = if part.as_str() == "1" { 1 } else { 0 },
            Rule::direction => direction = Direction::from_bit(part.as_str() == "L"),
            Rule::target => next = parse_target(part, states)?,
            _ => {}
        }
    }

    Ok(Transition::new(next, write, direction))
}

/// Maps a state letter to its index. `Z` and `H` are the usual halt markers.
fn parse_target(pair: Pair<Rule>, states: u8) -> Result<u8, BeaverError> {
    let letter = pair.as_str().as_bytes()[0];

    match letter {
        b'Z' | b'H' => Ok(HALT),
        b'A'..=b'E' if letter - b'A' < states => Ok(letter - b'A'),
        _ => Err(parse_error(
            &format!(
                "Unknown state {} for a {}-state machine",
                letter as char, states
            ),
            pair.as_span(),
        )),
    }
}
