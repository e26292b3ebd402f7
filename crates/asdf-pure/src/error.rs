use alloc::string::String;
use alloc::vec::Vec;

use crate::event::{Event, YamlTag};
use crate::node::Value;

/// All errors that can occur while encoding or decoding ASDF and FITS data.
#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    /// The event stream ended before the document was complete.
    NoInput,
    /// A structurally required event was not the next one in the stream.
    ExpectedEvent {
        /// What the decoder was waiting for.
        expected: &'static str,
        /// The event actually seen.
        found: Event,
    },
    /// A scalar's bytes did not parse as the type its tag committed it to.
    InvalidScalar {
        /// The type the scalar was required to be.
        expected: &'static str,
        /// The tag carried by the scalar event.
        tag: YamlTag,
        /// The raw scalar bytes.
        bytes: Vec<u8>,
    },
    /// A scalar carried a tag this format does not define.
    InvalidScalarTag {
        /// The offending tag.
        tag: YamlTag,
        /// The raw scalar bytes.
        bytes: Vec<u8>,
    },
    /// The document tree violated a structural requirement.
    InvalidTree {
        /// Which requirement was violated.
        reason: &'static str,
        /// The offending value.
        value: Value,
    },
    /// An ndarray mapping is missing one of its required keys.
    NdArrayMissingKey(&'static str),
    /// An ndarray references a block index the store does not contain.
    NdArrayMissingBlock(usize),
    /// An ndarray field held a value of the wrong shape or type.
    NdArrayExpected {
        /// The field being decoded.
        field: &'static str,
        /// The offending value.
        value: Value,
    },
    /// A `$ref` key held something other than a string.
    InvalidReference(Value),

    /// A FITS extension HDU was malformed or of an unsupported kind.
    InvalidExtension(String),
    /// A FITS stream contained no primary HDU.
    MissingPrimary,
    /// Malformed FITS header block.
    InvalidHeader(&'static str),
    /// Malformed keyword name in a FITS header line.
    InvalidKeyword,
    /// Unrecognized BITPIX value.
    InvalidBitpix(i64),
    /// A required FITS keyword was not found in the header.
    MissingKeyword(&'static str),
    /// Premature end of data while reading FITS blocks.
    UnexpectedEof,
}

/// Convenience alias used throughout the crate.
pub type Result<T> = core::result::Result<T, Error>;

fn lossy(bytes: &[u8]) -> alloc::borrow::Cow<'_, str> {
    String::from_utf8_lossy(bytes)
}

impl core::fmt::Display for Error {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Error::NoInput => write!(f, "event stream ended unexpectedly"),
            Error::ExpectedEvent { expected, found } => {
                write!(f, "expected {expected}, found {}", found.kind())
            }
            Error::InvalidScalar {
                expected,
                tag,
                bytes,
            } => {
                write!(f, "invalid {expected} scalar {:?} ({tag})", lossy(bytes))
            }
            Error::InvalidScalarTag { tag, bytes } => {
                write!(f, "invalid scalar tag {tag} on {:?}", lossy(bytes))
            }
            Error::InvalidTree { reason, value } => {
                write!(f, "invalid tree: {reason}, found {}", value.kind())
            }
            Error::NdArrayMissingKey(key) => write!(f, "ndarray is missing key: {key}"),
            Error::NdArrayMissingBlock(index) => {
                write!(f, "ndarray references missing block {index}")
            }
            Error::NdArrayExpected { field, value } => {
                write!(f, "ndarray {field}: unexpected {}", value.kind())
            }
            Error::InvalidReference(value) => {
                write!(f, "$ref must be a string, found {}", value.kind())
            }
            Error::InvalidExtension(reason) => write!(f, "invalid extension: {reason}"),
            Error::MissingPrimary => write!(f, "FITS stream has no primary HDU"),
            Error::InvalidHeader(reason) => write!(f, "invalid FITS header: {reason}"),
            Error::InvalidKeyword => write!(f, "invalid keyword name"),
            Error::InvalidBitpix(v) => write!(f, "invalid BITPIX value: {v}"),
            Error::MissingKeyword(kw) => write!(f, "missing required keyword: {kw}"),
            Error::UnexpectedEof => write!(f, "unexpected end of file"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for Error {}
