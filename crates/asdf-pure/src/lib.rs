//! Pure Rust serialization core for ASDF and FITS astronomy files.
//!
//! ASDF documents are a YAML tree followed by opaque binary blocks. This
//! crate translates between an in-memory [`node::Node`] tree and a stream of
//! YAML [`event::Event`]s paired with a [`block::BlockStore`]: encode with
//! [`encode::stream_tree`], decode with [`decode::sink_tree`]. The actual
//! YAML text layer (libyaml or equivalent) sits outside this crate and
//! speaks the event vocabulary defined in [`event`].
//!
//! The FITS side renders block-aligned ASCII headers with CHECKSUM/DATASUM
//! stamping ([`fits::render`]) and classifies parsed HDUs back into typed
//! primary/extension values ([`fits::hdu`]).
//!
//! The core library is `no_std`-compatible (requires `alloc`). Enable the
//! `ndarray` feature for conversions into [`ndarray::ArrayD`].
#![cfg_attr(not(feature = "std"), no_std)]
#![warn(missing_docs)]

extern crate alloc;

/// N-dimensional array payloads: datatypes, byte order, shape math.
pub mod array;
/// Binary block storage shared between the encoder and decoder.
pub mod block;
/// Event stream → node tree reconstruction.
pub mod decode;
/// Node tree → event stream emission.
pub mod encode;
/// Error types used throughout the crate.
pub mod error;
/// The YAML event vocabulary spoken with the external parser/emitter.
pub mod event;
/// FITS header rendering, checksums, and HDU classification.
pub mod fits;
/// Block-index trailer document parsing and emission.
pub mod index;
/// Document tree nodes, values, and JSON pointers.
pub mod node;
/// Scalar byte/tag dispatch into typed values.
pub mod scalar;
/// Schema tags and their canonical form.
pub mod tag;

/// Conversions between array payloads and `ndarray` arrays.
#[cfg(feature = "ndarray")]
pub mod interop;

pub use error::{Error, Result};
pub use node::{Node, Tree, Value};
pub use tag::SchemaTag;
