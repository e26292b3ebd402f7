//! FITS serialization: block-aligned ASCII headers plus binary payloads.
//!
//! A FITS file is a sequence of HDUs (header-data units), each a run of
//! 2880-byte blocks: 80-column ASCII keyword lines first, binary data after.
//! [`render`] produces byte-exact headers with CHECKSUM/DATASUM stamping;
//! [`hdu`] walks raw blocks back into typed [`PrimaryHdu`] / [`Extension`]
//! values; [`card`] and [`checksum`] are the line-level and integrity
//! primitives both sides share.

use alloc::string::String;
use alloc::vec::Vec;

use crate::error::{Error, Result};

/// Keyword line parsing and rendering (one 80-byte record).
pub mod card;
/// Ones-complement HDU checksums and their ASCII encoding.
pub mod checksum;
/// HDU splitting and classification (decode path).
pub mod hdu;
/// Header assembly and full-file encoding (encode path).
pub mod render;

/// FITS block size in bytes; every section is padded to a multiple of this.
pub const BLOCK_SIZE: usize = 2880;

/// Keyword line size in bytes.
pub const LINE_SIZE: usize = 80;

/// Number of keyword lines per block.
pub const LINES_PER_BLOCK: usize = BLOCK_SIZE / LINE_SIZE;

/// The BITPIX element type of an HDU's data array.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bitpix {
    /// BITPIX = 8.
    Int8,
    /// BITPIX = 16.
    Int16,
    /// BITPIX = 32.
    Int32,
    /// BITPIX = 64.
    Int64,
    /// BITPIX = -32.
    Float32,
    /// BITPIX = -64.
    Float64,
}

impl Bitpix {
    /// The keyword value for this element type.
    pub const fn value(self) -> i64 {
        match self {
            Bitpix::Int8 => 8,
            Bitpix::Int16 => 16,
            Bitpix::Int32 => 32,
            Bitpix::Int64 => 64,
            Bitpix::Float32 => -32,
            Bitpix::Float64 => -64,
        }
    }

    /// Bytes per element.
    pub const fn byte_width(self) -> usize {
        (self.value().unsigned_abs() / 8) as usize
    }

    /// Map a BITPIX keyword value onto the element type.
    pub fn from_value(value: i64) -> Result<Bitpix> {
        match value {
            8 => Ok(Bitpix::Int8),
            16 => Ok(Bitpix::Int16),
            32 => Ok(Bitpix::Int32),
            64 => Ok(Bitpix::Int64),
            -32 => Ok(Bitpix::Float32),
            -64 => Ok(Bitpix::Float64),
            other => Err(Error::InvalidBitpix(other)),
        }
    }
}

/// The binary payload of one HDU.
#[derive(Debug, Clone, PartialEq)]
pub struct DataArray {
    /// Element type.
    pub bitpix: Bitpix,
    /// Axis lengths in column-major order (NAXIS1 first).
    pub axes: Vec<usize>,
    /// Raw big-endian element bytes, unpadded.
    pub raw: Vec<u8>,
}

impl DataArray {
    /// An empty array (NAXIS = 0, no data).
    pub fn empty(bitpix: Bitpix) -> Self {
        DataArray {
            bitpix,
            axes: Vec::new(),
            raw: Vec::new(),
        }
    }

    /// The byte length the axes and element type require.
    ///
    /// Zero when there are no axes: NAXIS = 0 means no data follows.
    pub fn expected_byte_len(&self) -> usize {
        if self.axes.is_empty() {
            return 0;
        }
        let items: usize = self.axes.iter().product();
        items * self.bitpix.byte_width()
    }
}

/// One user-supplied record in an HDU header.
#[derive(Debug, Clone, PartialEq)]
pub enum HeaderRecord {
    /// A keyword line with a value and optional comment.
    Keyword {
        /// The keyword name (uppercased and truncated to 8 on render).
        name: String,
        /// The keyword value.
        value: card::KeywordValue,
        /// Optional comment after the value.
        comment: Option<String>,
    },
    /// A `COMMENT` line.
    Comment(String),
    /// An all-space line.
    Blank,
}

/// The first HDU of a FITS file.
#[derive(Debug, Clone, PartialEq)]
pub struct PrimaryHdu {
    /// The primary data array.
    pub data: DataArray,
    /// User header records (system keywords are supplied by the renderer).
    pub records: Vec<HeaderRecord>,
}

/// An IMAGE extension HDU.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageHdu {
    /// The image data array.
    pub data: DataArray,
    /// User header records.
    pub records: Vec<HeaderRecord>,
}

/// A BINTABLE extension HDU (decode only; rendering tables is unsupported).
#[derive(Debug, Clone, PartialEq)]
pub struct BinTableHdu {
    /// The fixed-width table region (BITPIX = 8, axes = row width × rows).
    pub data: DataArray,
    /// Heap size in bytes (PCOUNT).
    pub pcount: usize,
    /// The variable-length heap following the table region.
    pub heap: Vec<u8>,
    /// User header records.
    pub records: Vec<HeaderRecord>,
}

/// Any HDU after the primary.
#[derive(Debug, Clone, PartialEq)]
pub enum Extension {
    /// An IMAGE extension.
    Image(ImageHdu),
    /// A BINTABLE extension.
    BinTable(BinTableHdu),
}

/// A classified FITS file.
#[derive(Debug, Clone, PartialEq)]
pub struct Fits {
    /// The mandatory first HDU.
    pub primary: PrimaryHdu,
    /// Extension HDUs in file order.
    pub extensions: Vec<Extension>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bitpix_values_roundtrip() {
        for bp in [
            Bitpix::Int8,
            Bitpix::Int16,
            Bitpix::Int32,
            Bitpix::Int64,
            Bitpix::Float32,
            Bitpix::Float64,
        ] {
            assert_eq!(Bitpix::from_value(bp.value()).unwrap(), bp);
        }
    }

    #[test]
    fn bitpix_widths() {
        assert_eq!(Bitpix::Int8.byte_width(), 1);
        assert_eq!(Bitpix::Int16.byte_width(), 2);
        assert_eq!(Bitpix::Int32.byte_width(), 4);
        assert_eq!(Bitpix::Int64.byte_width(), 8);
        assert_eq!(Bitpix::Float32.byte_width(), 4);
        assert_eq!(Bitpix::Float64.byte_width(), 8);
    }

    #[test]
    fn bitpix_rejects_unknown() {
        assert!(matches!(Bitpix::from_value(7), Err(Error::InvalidBitpix(7))));
        assert!(matches!(
            Bitpix::from_value(-16),
            Err(Error::InvalidBitpix(-16))
        ));
    }

    #[test]
    fn block_constants() {
        assert_eq!(BLOCK_SIZE, 2880);
        assert_eq!(LINE_SIZE, 80);
        assert_eq!(LINES_PER_BLOCK, 36);
        assert_eq!(LINES_PER_BLOCK * LINE_SIZE, BLOCK_SIZE);
    }

    #[test]
    fn data_array_byte_len() {
        let arr = DataArray {
            bitpix: Bitpix::Int16,
            axes: alloc::vec![100, 200],
            raw: Vec::new(),
        };
        assert_eq!(arr.expected_byte_len(), 2 * 100 * 200);
        assert_eq!(DataArray::empty(Bitpix::Int8).expected_byte_len(), 0);
    }
}
