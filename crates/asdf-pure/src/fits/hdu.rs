//! HDU discovery and classification (the decode path).
//!
//! [`split_hdus`] walks raw 2880-byte blocks into [`HeaderDataUnit`]
//! records: header cards, extracted dimensions, and the data slice (with the
//! heap split off for binary tables). [`classify`] then turns that record
//! list into a typed [`Fits`] value, enforcing that the first HDU is the
//! primary one.

use alloc::format;
use alloc::string::String;
use alloc::vec::Vec;

use super::card::{parse_line, Card, KeywordValue};
use super::render::padded_len;
use super::{
    BinTableHdu, Bitpix, DataArray, Extension, Fits, HeaderRecord, ImageHdu, PrimaryHdu,
    BLOCK_SIZE, LINE_SIZE,
};
use crate::error::{Error, Result};

/// The element type and axis lengths declared by one HDU header.
#[derive(Debug, Clone, PartialEq)]
pub struct Dimensions {
    /// Element type from BITPIX.
    pub bitpix: Bitpix,
    /// Axis lengths in column-major order (NAXIS1 first).
    pub axes: Vec<usize>,
}

/// What kind of HDU a header declares.
#[derive(Debug, Clone, PartialEq)]
pub enum HduKind {
    /// A primary header (begins with SIMPLE).
    Primary,
    /// An IMAGE extension.
    Image,
    /// A BINTABLE extension with its heap already sliced off.
    BinTable {
        /// Heap size in bytes (PCOUNT).
        pcount: usize,
        /// The heap bytes following the table region.
        heap: Vec<u8>,
    },
}

fn kind_name(kind: &HduKind) -> &'static str {
    match kind {
        HduKind::Primary => "SIMPLE",
        HduKind::Image => "IMAGE",
        HduKind::BinTable { .. } => "BINTABLE",
    }
}

/// One HDU as produced by the low-level block walk.
#[derive(Debug, Clone, PartialEq)]
pub struct HeaderDataUnit {
    /// All header cards up to and including END.
    pub cards: Vec<Card>,
    /// Extracted BITPIX and axis lengths.
    pub dimensions: Dimensions,
    /// The main data region (table region for binary tables), unpadded.
    pub main_data: Vec<u8>,
    /// The declared HDU kind.
    pub kind: HduKind,
}

// ── Low-level block walk ──

/// Scan whole blocks for the END card; returns the header length in bytes.
fn header_byte_len(data: &[u8]) -> Result<usize> {
    if data.len() < BLOCK_SIZE {
        return Err(Error::UnexpectedEof);
    }
    for block in 0..data.len() / BLOCK_SIZE {
        let block_start = block * BLOCK_SIZE;
        for line_start in (block_start..block_start + BLOCK_SIZE).step_by(LINE_SIZE) {
            if &data[line_start..line_start + 8] == b"END     " {
                return Ok((block + 1) * BLOCK_SIZE);
            }
        }
    }
    Err(Error::UnexpectedEof)
}

/// Parse header lines up to and including the END card.
fn parse_header(data: &[u8]) -> Result<Vec<Card>> {
    let mut cards = Vec::new();
    for start in (0..data.len()).step_by(LINE_SIZE) {
        let line: &[u8; LINE_SIZE] = data[start..start + LINE_SIZE]
            .try_into()
            .map_err(|_| Error::InvalidHeader("truncated keyword line"))?;
        let card = parse_line(line)?;
        let is_end = card.is_end();
        cards.push(card);
        if is_end {
            return Ok(cards);
        }
    }
    Err(Error::UnexpectedEof)
}

fn integer_keyword(cards: &[Card], name: &str) -> Option<i64> {
    cards.iter().find_map(|card| {
        if card.keyword == name {
            match card.value {
                Some(KeywordValue::Integer(n)) => Some(n),
                _ => None,
            }
        } else {
            None
        }
    })
}

fn string_keyword(cards: &[Card], name: &str) -> Option<String> {
    cards.iter().find_map(|card| {
        if card.keyword == name {
            match &card.value {
                Some(KeywordValue::String(s)) => Some(s.clone()),
                _ => None,
            }
        } else {
            None
        }
    })
}

fn read_dimensions(cards: &[Card]) -> Result<Dimensions> {
    let bitpix = integer_keyword(cards, "BITPIX").ok_or(Error::MissingKeyword("BITPIX"))?;
    let bitpix = Bitpix::from_value(bitpix)?;

    let naxis = integer_keyword(cards, "NAXIS").ok_or(Error::MissingKeyword("NAXIS"))?;
    if naxis < 0 {
        return Err(Error::InvalidHeader("negative NAXIS"));
    }

    let mut axes = Vec::with_capacity(naxis as usize);
    for i in 1..=naxis {
        let name = format!("NAXIS{i}");
        let axis = integer_keyword(cards, &name).ok_or(Error::MissingKeyword("NAXISn"))?;
        if axis < 0 {
            return Err(Error::InvalidHeader("negative NAXISn"));
        }
        axes.push(axis as usize);
    }
    Ok(Dimensions { bitpix, axes })
}

fn read_kind(cards: &[Card]) -> Result<(HduKind, usize)> {
    let first = cards.first().ok_or(Error::UnexpectedEof)?;
    if first.keyword == "SIMPLE" {
        return Ok((HduKind::Primary, 0));
    }
    match string_keyword(cards, "XTENSION").as_deref() {
        Some("IMAGE") => Ok((HduKind::Image, 0)),
        Some("BINTABLE") => {
            let pcount = integer_keyword(cards, "PCOUNT")
                .ok_or(Error::MissingKeyword("PCOUNT"))?
                .max(0) as usize;
            Ok((
                HduKind::BinTable {
                    pcount,
                    heap: Vec::new(),
                },
                pcount,
            ))
        }
        Some(other) => Err(Error::InvalidExtension(format!(
            "unsupported XTENSION {other:?}"
        ))),
        None => Err(Error::InvalidHeader(
            "HDU must begin with SIMPLE or carry XTENSION",
        )),
    }
}

/// Walk a raw FITS byte stream into its header-data units.
///
/// Trailing bytes shorter than one block are ignored, and an empty input
/// yields an empty list (the classifier reports the missing primary).
pub fn split_hdus(data: &[u8]) -> Result<Vec<HeaderDataUnit>> {
    let mut hdus = Vec::new();
    let mut offset = 0usize;

    while offset + BLOCK_SIZE <= data.len() {
        let remaining = &data[offset..];
        let header_len = header_byte_len(remaining)?;
        let cards = parse_header(&remaining[..header_len])?;
        let dimensions = read_dimensions(&cards)?;
        let (mut kind, heap_len) = read_kind(&cards)?;

        let main_len = if dimensions.axes.is_empty() {
            0
        } else {
            let items: usize = dimensions.axes.iter().product();
            items * dimensions.bitpix.byte_width()
        };
        let total_len = main_len + heap_len;

        let data_start = offset + header_len;
        if data_start + total_len > data.len() {
            return Err(Error::UnexpectedEof);
        }
        let main_data = data[data_start..data_start + main_len].to_vec();
        if let HduKind::BinTable { heap, .. } = &mut kind {
            *heap = data[data_start + main_len..data_start + total_len].to_vec();
        }

        hdus.push(HeaderDataUnit {
            cards,
            dimensions,
            main_data,
            kind,
        });
        offset = data_start + padded_len(total_len);
    }

    Ok(hdus)
}

// ── Classification ──

/// Keywords the renderer regenerates; they never appear as user records.
fn is_structural(name: &str) -> bool {
    matches!(
        name,
        "SIMPLE" | "XTENSION" | "BITPIX" | "EXTEND" | "PCOUNT" | "GCOUNT" | "DATASUM" | "CHECKSUM"
    ) || name.starts_with("NAXIS")
}

fn user_records(cards: &[Card]) -> Vec<HeaderRecord> {
    cards
        .iter()
        .filter_map(|card| {
            if card.is_end() || is_structural(&card.keyword) {
                return None;
            }
            if card.keyword == "COMMENT" {
                return Some(HeaderRecord::Comment(
                    card.comment.clone().unwrap_or_default(),
                ));
            }
            if card.is_blank() {
                return Some(HeaderRecord::Blank);
            }
            card.value.as_ref().map(|value| HeaderRecord::Keyword {
                name: card.keyword.clone(),
                value: value.clone(),
                comment: card.comment.clone(),
            })
        })
        .collect()
}

fn data_array(dimensions: Dimensions, raw: Vec<u8>) -> DataArray {
    DataArray {
        bitpix: dimensions.bitpix,
        axes: dimensions.axes,
        raw,
    }
}

/// Classify a sequence of HDU records into a typed [`Fits`] value.
///
/// The first record must be a primary header; an empty sequence is
/// [`Error::MissingPrimary`].
pub fn classify(hdus: Vec<HeaderDataUnit>) -> Result<Fits> {
    let mut hdus = hdus.into_iter();
    let first = hdus.next().ok_or(Error::MissingPrimary)?;
    if first.kind != HduKind::Primary {
        return Err(Error::InvalidExtension(format!(
            "expected a primary HDU first, found {}",
            kind_name(&first.kind)
        )));
    }
    let primary = PrimaryHdu {
        records: user_records(&first.cards),
        data: data_array(first.dimensions, first.main_data),
    };

    let mut extensions = Vec::new();
    for hdu in hdus {
        let records = user_records(&hdu.cards);
        match hdu.kind {
            HduKind::Image => extensions.push(Extension::Image(ImageHdu {
                data: data_array(hdu.dimensions, hdu.main_data),
                records,
            })),
            HduKind::BinTable { pcount, heap } => {
                extensions.push(Extension::BinTable(BinTableHdu {
                    data: data_array(hdu.dimensions, hdu.main_data),
                    pcount,
                    heap,
                    records,
                }))
            }
            HduKind::Primary => {
                return Err(Error::InvalidExtension(String::from(
                    "a primary HDU cannot appear as an extension",
                )))
            }
        }
    }

    Ok(Fits {
        primary,
        extensions,
    })
}

/// Split and classify a raw FITS byte stream in one step.
pub fn decode_fits(data: &[u8]) -> Result<Fits> {
    classify(split_hdus(data)?)
}
