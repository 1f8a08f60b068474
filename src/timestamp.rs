use crate::error::{CondenseError, TimestampField};

use std::fmt;
use std::time::Duration;

use nom::bytes::complete::{tag, take_while_m_n};
use nom::character::complete::{digit1, one_of};
use nom::combinator::{all_consuming, map_res};
use nom::error::Error;
use nom::sequence::preceded;
use nom::Parser;

/// Decodes an `HH:MM:SS.fff` (or `HH:MM:SS,fff`) timestamp.
///
/// Both SRT (`00:01:02,345`) and ASS (`0:01:02.34`) timings go through here.
/// A short fractional part is right-padded, so `.34` reads as 340 milliseconds.
pub fn decode(timestamp: &str) -> Result<Duration, CondenseError> {
    let input = timestamp.trim();

    let (input, hours) = component(input, timestamp, TimestampField::Hours, number)?;
    let (input, minutes) = component(
        input,
        timestamp,
        TimestampField::Minutes,
        preceded(tag(":"), number),
    )?;
    let (input, seconds) = component(
        input,
        timestamp,
        TimestampField::Seconds,
        preceded(tag(":"), number),
    )?;
    let (_, millis) = component(
        input,
        timestamp,
        TimestampField::Milliseconds,
        all_consuming(preceded(one_of(".,"), millis)),
    )?;

    let total = scale(timestamp, TimestampField::Hours, hours, 60 * 60 * 1000, 0)
        .and_then(|t| scale(timestamp, TimestampField::Minutes, minutes, 60 * 1000, t))
        .and_then(|t| scale(timestamp, TimestampField::Seconds, seconds, 1000, t))
        .and_then(|t| scale(timestamp, TimestampField::Milliseconds, millis, 1, t))?;
    Ok(Duration::from_millis(total))
}

fn scale(
    timestamp: &str,
    field: TimestampField,
    value: u64,
    unit: u64,
    acc: u64,
) -> Result<u64, CondenseError> {
    value
        .checked_mul(unit)
        .and_then(|ms| ms.checked_add(acc))
        .ok_or_else(|| CondenseError::decode(timestamp, field))
}

fn component<'a, O, P>(
    input: &'a str,
    timestamp: &str,
    field: TimestampField,
    mut parser: P,
) -> Result<(&'a str, O), CondenseError>
where
    P: Parser<&'a str, O, Error<&'a str>>,
{
    parser
        .parse(input)
        .map_err(|_| CondenseError::decode(timestamp, field))
}

fn number(input: &str) -> nom::IResult<&str, u64> {
    map_res(digit1, |s: &str| s.parse())(input)
}

fn millis(input: &str) -> nom::IResult<&str, u64> {
    const MILLIS_MAX: usize = 3;
    map_res(
        take_while_m_n(1, MILLIS_MAX, |c: char| c.is_ascii_digit()),
        |s: &str| {
            // ASS files carry centiseconds (`.34`), so every fraction is
            // right-padded to three digits before it is read as milliseconds.
            format!("{:0<3}", s).parse::<u64>()
        },
    )(input)
}

/// Displays a duration as `HH:MM:SS.mmm`.
#[derive(Debug, Clone, Copy)]
pub struct Clock(pub Duration);

impl fmt::Display for Clock {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        let total_secs = self.0.as_secs();
        let hours = total_secs / 3600;
        let minutes = (total_secs % 3600) / 60;
        let seconds = total_secs % 60;
        let millis = self.0.subsec_millis();
        write!(
            fmt,
            "{:02}:{:02}:{:02}.{:03}",
            hours, minutes, seconds, millis
        )
    }
}
