//! The YAML event vocabulary.
//!
//! The crate does not parse or print YAML text itself; an external event
//! producer/consumer (libyaml or equivalent) does, and both sides speak the
//! types defined here. The stream shape is the usual libyaml one:
//! `StreamStart`, one or more framed documents, `StreamEnd`, with scalars,
//! sequences, and mappings nested inside.
//!
//! Tag resolution is the external parser's job: quoted scalars arrive as
//! [`YamlTag::Str`], plain `~` as [`YamlTag::Null`], and so on. Application
//! tags (`!core/ndarray-1.0.0` and friends) arrive as [`YamlTag::Uri`];
//! yaml-domain tags outside the core five arrive as [`YamlTag::Other`].

use alloc::string::String;
use alloc::vec::Vec;

/// Presentation style of a scalar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScalarStyle {
    /// Unquoted.
    Plain,
    /// Single-quoted.
    SingleQuoted,
    /// Double-quoted.
    DoubleQuoted,
    /// Literal block scalar (`|`).
    Literal,
    /// Folded block scalar (`>`).
    Folded,
}

/// Presentation style of a mapping or sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollectionStyle {
    /// Indented, one entry per line.
    Block,
    /// Inline `{…}` / `[…]`.
    Flow,
}

/// The tag attached to a scalar, mapping, or sequence event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum YamlTag {
    /// No tag.
    None,
    /// The core string tag.
    Str,
    /// The core integer tag.
    Int,
    /// The core float tag.
    Float,
    /// The core boolean tag.
    Bool,
    /// The core null tag.
    Null,
    /// An application tag URI.
    Uri(String),
    /// A yaml-domain tag outside the core schema (e.g. `timestamp`).
    Other(String),
}

impl core::fmt::Display for YamlTag {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            YamlTag::None => f.write_str("(none)"),
            YamlTag::Str => f.write_str("str"),
            YamlTag::Int => f.write_str("int"),
            YamlTag::Float => f.write_str("float"),
            YamlTag::Bool => f.write_str("bool"),
            YamlTag::Null => f.write_str("null"),
            YamlTag::Uri(uri) => f.write_str(uri),
            YamlTag::Other(tag) => f.write_str(tag),
        }
    }
}

/// One event in a YAML stream.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    /// Stream framing: start of the whole stream.
    StreamStart,
    /// Stream framing: end of the whole stream.
    StreamEnd,
    /// Document framing: start of one document.
    DocumentStart,
    /// Document framing: end of one document.
    DocumentEnd,
    /// A scalar value.
    Scalar {
        /// The raw scalar bytes.
        value: Vec<u8>,
        /// The resolved or explicit tag.
        tag: YamlTag,
        /// Presentation style.
        style: ScalarStyle,
        /// Optional anchor name.
        anchor: Option<String>,
    },
    /// Start of a sequence.
    SequenceStart {
        /// The explicit tag, if any.
        tag: YamlTag,
        /// Presentation style.
        style: CollectionStyle,
        /// Optional anchor name.
        anchor: Option<String>,
    },
    /// End of the innermost open sequence.
    SequenceEnd,
    /// Start of a mapping.
    MappingStart {
        /// The explicit tag, if any.
        tag: YamlTag,
        /// Presentation style.
        style: CollectionStyle,
        /// Optional anchor name.
        anchor: Option<String>,
    },
    /// End of the innermost open mapping.
    MappingEnd,
}

impl Event {
    /// A scalar event without an anchor.
    pub fn scalar(value: impl Into<Vec<u8>>, tag: YamlTag, style: ScalarStyle) -> Self {
        Event::Scalar {
            value: value.into(),
            tag,
            style,
            anchor: None,
        }
    }

    /// A plain untagged scalar, the shape every mapping key takes.
    pub fn plain(value: impl Into<Vec<u8>>) -> Self {
        Event::scalar(value, YamlTag::None, ScalarStyle::Plain)
    }

    /// A mapping start without an anchor.
    pub fn mapping_start(tag: YamlTag, style: CollectionStyle) -> Self {
        Event::MappingStart {
            tag,
            style,
            anchor: None,
        }
    }

    /// A sequence start without an anchor.
    pub fn sequence_start(tag: YamlTag, style: CollectionStyle) -> Self {
        Event::SequenceStart {
            tag,
            style,
            anchor: None,
        }
    }

    /// A short name for this event's kind, used in errors.
    pub fn kind(&self) -> &'static str {
        match self {
            Event::StreamStart => "stream start",
            Event::StreamEnd => "stream end",
            Event::DocumentStart => "document start",
            Event::DocumentEnd => "document end",
            Event::Scalar { .. } => "scalar",
            Event::SequenceStart { .. } => "sequence start",
            Event::SequenceEnd => "sequence end",
            Event::MappingStart { .. } => "mapping start",
            Event::MappingEnd => "mapping end",
        }
    }
}
