//! The block-index trailer document.
//!
//! ASDF files may end with a second YAML document whose root is a flat
//! sequence of byte offsets, one per binary block, letting readers seek
//! straight to a block without scanning. This module parses and emits that
//! document at the event level.

use alloc::vec::Vec;
use core::iter::Peekable;
use core::str;

use crate::error::{Error, Result};
use crate::event::{CollectionStyle, Event, YamlTag};

/// Parse a block-index document into its byte offsets.
///
/// The expected stream is `StreamStart, DocumentStart, SequenceStart,
/// scalar*, SequenceEnd, DocumentEnd, StreamEnd`. Every entry must be an
/// integer.
pub fn sink_block_index<I>(events: I) -> Result<Vec<u64>>
where
    I: IntoIterator<Item = Event>,
{
    let mut events = events.into_iter().peekable();

    expect(&mut events, "stream start", |e| {
        matches!(e, Event::StreamStart)
    })?;
    expect(&mut events, "document start", |e| {
        matches!(e, Event::DocumentStart)
    })?;
    expect(&mut events, "index sequence", |e| {
        matches!(e, Event::SequenceStart { .. })
    })?;

    let mut offsets = Vec::new();
    loop {
        match events.peek().ok_or(Error::NoInput)? {
            Event::SequenceEnd => {
                events.next();
                break;
            }
            _ => offsets.push(index_entry(&mut events)?),
        }
    }

    expect(&mut events, "document end", |e| {
        matches!(e, Event::DocumentEnd)
    })?;
    expect(&mut events, "stream end", |e| matches!(e, Event::StreamEnd))?;
    Ok(offsets)
}

/// Emit the event sequence for a block-index document.
pub fn stream_block_index(offsets: &[u64]) -> Vec<Event> {
    use alloc::string::ToString;

    let mut events = Vec::with_capacity(offsets.len() + 6);
    events.push(Event::StreamStart);
    events.push(Event::DocumentStart);
    events.push(Event::sequence_start(YamlTag::None, CollectionStyle::Flow));
    for offset in offsets {
        events.push(Event::plain(offset.to_string().into_bytes()));
    }
    events.push(Event::SequenceEnd);
    events.push(Event::DocumentEnd);
    events.push(Event::StreamEnd);
    events
}

fn expect<I: Iterator<Item = Event>>(
    events: &mut Peekable<I>,
    expected: &'static str,
    accepts: fn(&Event) -> bool,
) -> Result<()> {
    let event = events.next().ok_or(Error::NoInput)?;
    if accepts(&event) {
        Ok(())
    } else {
        Err(Error::ExpectedEvent {
            expected,
            found: event,
        })
    }
}

fn index_entry<I: Iterator<Item = Event>>(events: &mut Peekable<I>) -> Result<u64> {
    match events.next().ok_or(Error::NoInput)? {
        Event::Scalar { value, tag, .. } => {
            let parsed = str::from_utf8(&value).ok().and_then(|s| s.parse().ok());
            parsed.ok_or(Error::InvalidScalar {
                expected: "Int Index Entry",
                tag,
                bytes: value,
            })
        }
        other => Err(Error::ExpectedEvent {
            expected: "index entry",
            found: other,
        }),
    }
}
