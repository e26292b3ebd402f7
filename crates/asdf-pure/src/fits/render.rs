//! Header assembly and whole-HDU encoding.
//!
//! Headers are rendered in the standard-mandated order with DATASUM filled
//! in and CHECKSUM initially set to sixteen ASCII zeros; once header and
//! padded data are concatenated the real checksum is computed over the
//! complete unit and the CHECKSUM line is overwritten in place. The
//! encoding is defined with the field zeroed, which is what makes the
//! self-referential checksum well-defined.

use alloc::string::{String, ToString};
use alloc::vec::Vec;
use core::str;

use super::card::{
    blank_line, render_comment_line, render_end_line, render_keyword_line, KeywordValue,
};
use super::checksum::{ascii_encode, sum_blocks};
use super::{
    DataArray, Extension, HeaderRecord, ImageHdu, PrimaryHdu, BLOCK_SIZE, LINE_SIZE,
};
use crate::error::{Error, Result};

const CHECKSUM_ZEROS: &str = "0000000000000000";
const CHECKSUM_COMMENT: &str = "checksum for the whole HDU";
const DATASUM_COMMENT: &str = "checksum of the data records";

/// The padded length of a section: zero stays zero, everything else rounds
/// up to a whole number of blocks.
pub const fn padded_len(len: usize) -> usize {
    if len == 0 {
        return 0;
    }
    len.div_ceil(BLOCK_SIZE) * BLOCK_SIZE
}

/// Pad header bytes to a block boundary with ASCII spaces.
pub fn fill_header(mut bytes: Vec<u8>) -> Vec<u8> {
    bytes.resize(padded_len(bytes.len()), b' ');
    bytes
}

/// Pad data bytes to a block boundary with NUL bytes.
///
/// A zero-length section stays zero-length; an already aligned section
/// receives no extra bytes.
pub fn fill_data(bytes: &[u8]) -> Vec<u8> {
    let mut out = bytes.to_vec();
    out.resize(padded_len(out.len()), 0u8);
    out
}

/// Keywords the renderer owns; matching user records are dropped.
pub fn is_system_keyword(name: &str) -> bool {
    let upper = name.to_ascii_uppercase();
    upper == "BITPIX"
        || upper == "EXTEND"
        || upper == "DATASUM"
        || upper == "CHECKSUM"
        || upper.starts_with("NAXIS")
}

fn push_line(header: &mut Vec<u8>, line: [u8; LINE_SIZE]) {
    header.extend_from_slice(&line);
}

fn push_keyword(header: &mut Vec<u8>, name: &str, value: KeywordValue, comment: Option<&str>) {
    push_line(header, render_keyword_line(name, &value, comment));
}

fn push_dimensions(header: &mut Vec<u8>, data: &DataArray) {
    push_keyword(
        header,
        "BITPIX",
        KeywordValue::Integer(data.bitpix.value()),
        Some("array data type"),
    );
    push_keyword(
        header,
        "NAXIS",
        KeywordValue::Integer(data.axes.len() as i64),
        Some("number of array dimensions"),
    );
    for (i, &axis) in data.axes.iter().enumerate() {
        let name = alloc::format!("NAXIS{}", i + 1);
        push_keyword(header, &name, KeywordValue::Integer(axis as i64), None);
    }
}

fn push_checksums(header: &mut Vec<u8>, datasum: u32) {
    push_keyword(
        header,
        "DATASUM",
        KeywordValue::String(datasum.to_string()),
        Some(DATASUM_COMMENT),
    );
    push_keyword(
        header,
        "CHECKSUM",
        KeywordValue::String(String::from(CHECKSUM_ZEROS)),
        Some(CHECKSUM_COMMENT),
    );
}

fn push_user_records(header: &mut Vec<u8>, records: &[HeaderRecord]) {
    for record in records {
        match record {
            HeaderRecord::Keyword {
                name,
                value,
                comment,
            } => {
                if is_system_keyword(name) {
                    continue;
                }
                push_keyword(header, name, value.clone(), comment.as_deref());
            }
            HeaderRecord::Comment(text) => push_line(header, render_comment_line(text)),
            HeaderRecord::Blank => push_line(header, blank_line()),
        }
    }
}

/// Overwrite the first CHECKSUM line with the unit's encoded checksum.
///
/// `unit` must be the complete block-aligned HDU with the CHECKSUM value
/// still rendered as zeros.
pub fn patch_checksum(unit: &mut [u8]) {
    let sum = sum_blocks(unit);
    let encoded = ascii_encode(sum, true);
    let text = str::from_utf8(&encoded).unwrap_or(CHECKSUM_ZEROS);
    let line = render_keyword_line(
        "CHECKSUM",
        &KeywordValue::String(String::from(text)),
        Some(CHECKSUM_COMMENT),
    );
    for start in (0..unit.len()).step_by(LINE_SIZE) {
        if unit[start..].starts_with(b"CHECKSUM") {
            unit[start..start + LINE_SIZE].copy_from_slice(&line);
            return;
        }
    }
}

fn encode_unit(header: Vec<u8>, data: Vec<u8>) -> Vec<u8> {
    let mut unit = fill_header(header);
    unit.extend_from_slice(&data);
    patch_checksum(&mut unit);
    unit
}

fn datasum_of(padded: &[u8]) -> u32 {
    if padded.is_empty() {
        0
    } else {
        sum_blocks(padded)
    }
}

/// Encode a primary HDU: header, NUL-padded data, stamped checksums.
pub fn encode_primary(hdu: &PrimaryHdu) -> Vec<u8> {
    let data = fill_data(&hdu.data.raw);
    let datasum = datasum_of(&data);

    let mut header = Vec::new();
    push_keyword(
        &mut header,
        "SIMPLE",
        KeywordValue::Logic(true),
        Some("Conforms to the FITS standard"),
    );
    push_dimensions(&mut header, &hdu.data);
    push_keyword(&mut header, "EXTEND", KeywordValue::Logic(true), None);
    push_checksums(&mut header, datasum);
    push_user_records(&mut header, &hdu.records);
    push_line(&mut header, render_end_line());

    encode_unit(header, data)
}

/// Encode an IMAGE extension HDU.
pub fn encode_image(hdu: &ImageHdu) -> Vec<u8> {
    let data = fill_data(&hdu.data.raw);
    let datasum = datasum_of(&data);

    let mut header = Vec::new();
    push_keyword(
        &mut header,
        "XTENSION",
        KeywordValue::String(String::from("IMAGE")),
        Some("Image extension"),
    );
    push_dimensions(&mut header, &hdu.data);
    push_keyword(&mut header, "PCOUNT", KeywordValue::Integer(0), None);
    push_keyword(&mut header, "GCOUNT", KeywordValue::Integer(1), None);
    push_checksums(&mut header, datasum);
    push_user_records(&mut header, &hdu.records);
    push_line(&mut header, render_end_line());

    encode_unit(header, data)
}

/// Encode a complete FITS file: the primary HDU followed by extensions.
///
/// BINTABLE extensions cannot be rendered and are rejected.
pub fn encode_fits(primary: &PrimaryHdu, extensions: &[Extension]) -> Result<Vec<u8>> {
    let mut out = encode_primary(primary);
    for extension in extensions {
        match extension {
            Extension::Image(image) => out.extend_from_slice(&encode_image(image)),
            Extension::BinTable(_) => {
                return Err(Error::InvalidExtension(String::from(
                    "BINTABLE rendering is not supported",
                )))
            }
        }
    }
    Ok(out)
}
