use crate::dialog::Interval;
use crate::error::CondenseError;

use std::time::Duration;

/// Merges dialog intervals into the spans kept in the condensed output.
///
/// Dialog separated by at most `max_gap` is treated as one stretch of speech.
/// Wider gaps are cut, leaving `max_gap / 2` of silence on either side of the
/// cut. The very first and last spans get a full `max_gap` of lead-in and
/// lead-out, bounded by zero and `total` respectively.
///
/// Only a last span that ends before `total` is extended and clamped. Dialog
/// that runs past `total` is kept as it is, so the spans can end after the
/// media does.
///
/// `dialogs` must be ordered by start time. They are consumed as given.
pub fn condense(
    dialogs: &[Interval],
    max_gap: Duration,
    total: Duration,
) -> Result<Vec<Interval>, CondenseError> {
    let (first, rest) = dialogs.split_first().ok_or(CondenseError::EmptyDialog)?;
    let half_gap = max_gap / 2;

    let mut current = Interval::new(first.start.saturating_sub(max_gap), first.end);
    let mut spans = Vec::new();

    for dialog in rest {
        if dialog.start.saturating_sub(current.end) <= max_gap {
            current.end = dialog.end;
        } else {
            current.end += half_gap;
            spans.push(current);
            current = Interval::new(dialog.start.saturating_sub(half_gap), dialog.end);
        }
    }

    if current.end < total {
        current.end = total.min(current.end + max_gap);
    }
    spans.push(current);

    validate(&spans)?;
    Ok(spans)
}

fn validate(spans: &[Interval]) -> Result<(), CondenseError> {
    match spans.iter().find(|span| span.start >= span.end) {
        Some(span) => Err(CondenseError::MalformedInterval {
            start: span.start,
            end: span.end,
        }),
        None => Ok(()),
    }
}

/// Total length of the condensed output.
pub fn condensed_duration(spans: &[Interval]) -> Duration {
    spans.iter().map(Interval::span).sum()
}
