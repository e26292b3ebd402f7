//! The 80-byte keyword line: the atom of a FITS header.
//!
//! Layout: bytes 0..8 keyword name (uppercase, left-justified), bytes 8..10
//! the value indicator `"= "`, bytes 10..30 the value right-justified to
//! width 20 (strings instead run `'...'` from byte 10), then an optional
//! ` / comment` truncated at column 80.

use alloc::format;
use alloc::string::{String, ToString};
use core::str;

use super::LINE_SIZE;
use crate::error::{Error, Result};

/// A FITS keyword value.
#[derive(Debug, Clone, PartialEq)]
pub enum KeywordValue {
    /// Logical `T` / `F`.
    Logic(bool),
    /// Decimal integer.
    Integer(i64),
    /// Floating-point number (rendered uppercase, `1.5E-16`).
    Float(f64),
    /// Character string, single-quoted on the wire.
    String(String),
}

// ── Rendering ──

/// Render one keyword line, byte-exact.
pub fn render_keyword_line(
    name: &str,
    value: &KeywordValue,
    comment: Option<&str>,
) -> [u8; LINE_SIZE] {
    let mut line = [b' '; LINE_SIZE];
    write_name(&mut line, name);
    line[8] = b'=';
    line[9] = b' ';
    let value_end = write_value(&mut line, value);
    if let Some(text) = comment {
        write_comment(&mut line, value_end, text);
    }
    line
}

/// Render a `COMMENT` line.
pub fn render_comment_line(text: &str) -> [u8; LINE_SIZE] {
    let mut line = [b' '; LINE_SIZE];
    line[..8].copy_from_slice(b"COMMENT ");
    let bytes = text.as_bytes();
    let len = bytes.len().min(LINE_SIZE - 8);
    line[8..8 + len].copy_from_slice(&bytes[..len]);
    line
}

/// Render the `END` line.
pub fn render_end_line() -> [u8; LINE_SIZE] {
    let mut line = [b' '; LINE_SIZE];
    line[..3].copy_from_slice(b"END");
    line
}

/// An all-space line.
pub fn blank_line() -> [u8; LINE_SIZE] {
    [b' '; LINE_SIZE]
}

fn write_name(line: &mut [u8; LINE_SIZE], name: &str) {
    for (i, b) in name.bytes().take(8).enumerate() {
        line[i] = b.to_ascii_uppercase();
    }
}

/// Write the value field; returns the byte index just past the value.
fn write_value(line: &mut [u8; LINE_SIZE], value: &KeywordValue) -> usize {
    match value {
        KeywordValue::Logic(b) => {
            line[29] = if *b { b'T' } else { b'F' };
            30
        }
        KeywordValue::Integer(n) => {
            right_justify(&mut line[10..30], n.to_string().as_bytes());
            30
        }
        KeywordValue::Float(f) => {
            right_justify(&mut line[10..30], format_float(*f).as_bytes());
            30
        }
        KeywordValue::String(s) => write_quoted(line, s),
    }
}

/// Uppercase exponent notation, precision reduced until it fits 20 columns.
fn format_float(f: f64) -> String {
    if f == 0.0 {
        return String::from("0.0");
    }
    let mut precision = 15usize;
    loop {
        let text = format!("{:.prec$E}", f, prec = precision);
        if text.len() <= 20 || precision == 0 {
            return text;
        }
        precision -= 1;
    }
}

fn right_justify(field: &mut [u8], src: &[u8]) {
    let len = src.len().min(field.len());
    let start = field.len() - len;
    field[start..].copy_from_slice(&src[..len]);
}

/// Write `'contents'` from byte 10, doubling embedded quotes; returns the
/// index just past the closing quote.
fn write_quoted(line: &mut [u8; LINE_SIZE], s: &str) -> usize {
    let mut pos = 10;
    line[pos] = b'\'';
    pos += 1;
    for b in s.bytes() {
        if pos >= LINE_SIZE - 1 {
            break;
        }
        if b == b'\'' {
            if pos + 2 >= LINE_SIZE {
                break;
            }
            line[pos] = b'\'';
            line[pos + 1] = b'\'';
            pos += 2;
        } else {
            line[pos] = b;
            pos += 1;
        }
    }
    if pos < LINE_SIZE {
        line[pos] = b'\'';
        pos += 1;
    }
    pos
}

fn write_comment(line: &mut [u8; LINE_SIZE], value_end: usize, text: &str) {
    if value_end + 3 > LINE_SIZE {
        return;
    }
    line[value_end] = b' ';
    line[value_end + 1] = b'/';
    line[value_end + 2] = b' ';
    let start = value_end + 3;
    let bytes = text.as_bytes();
    let len = bytes.len().min(LINE_SIZE - start);
    line[start..start + len].copy_from_slice(&bytes[..len]);
}

// ── Parsing ──

/// A parsed keyword line.
#[derive(Debug, Clone, PartialEq)]
pub struct Card {
    /// The trimmed keyword name.
    pub keyword: String,
    /// The value, when the line carries the `= ` indicator.
    pub value: Option<KeywordValue>,
    /// The comment, commentary text, or free-form remainder.
    pub comment: Option<String>,
}

impl Card {
    /// Returns `true` if this is the END line.
    pub fn is_end(&self) -> bool {
        self.keyword == "END"
    }

    /// Returns `true` if the keyword field is all spaces.
    pub fn is_blank(&self) -> bool {
        self.keyword.is_empty()
    }

    /// Returns `true` for COMMENT, HISTORY, and blank lines.
    pub fn is_commentary(&self) -> bool {
        self.keyword == "COMMENT" || self.keyword == "HISTORY" || self.is_blank()
    }
}

/// Parse one 80-byte keyword line.
pub fn parse_line(line: &[u8; LINE_SIZE]) -> Result<Card> {
    for &b in &line[..8] {
        match b {
            b'A'..=b'Z' | b'0'..=b'9' | b' ' | b'-' | b'_' => {}
            _ => return Err(Error::InvalidKeyword),
        }
    }
    let keyword = str::from_utf8(&line[..8])
        .map_err(|_| Error::InvalidKeyword)?
        .trim_end()
        .to_string();

    if keyword == "END" {
        return Ok(Card {
            keyword,
            value: None,
            comment: None,
        });
    }

    if line[8] == b'=' && line[9] == b' ' && !is_commentary_name(&keyword) {
        let (value, comment) = match parse_value_field(&line[10..]) {
            Some((v, c)) => (Some(v), c.map(String::from)),
            None => (None, None),
        };
        return Ok(Card {
            keyword,
            value,
            comment,
        });
    }

    let text = str::from_utf8(&line[8..])
        .map_err(|_| Error::InvalidHeader("non-ASCII commentary text"))?
        .trim_end();
    Ok(Card {
        keyword,
        value: None,
        comment: (!text.is_empty()).then(|| String::from(text)),
    })
}

fn is_commentary_name(keyword: &str) -> bool {
    keyword == "COMMENT" || keyword == "HISTORY" || keyword.is_empty()
}

/// Parse the value portion of a line (bytes 10..80).
///
/// Returns the value and the comment after the ` /` separator, if any.
pub fn parse_value_field(field: &[u8]) -> Option<(KeywordValue, Option<&str>)> {
    if field.is_empty() {
        return None;
    }
    if field[0] == b'\'' {
        return parse_quoted(field);
    }

    let (value_part, comment) = split_comment(field);
    let text = str::from_utf8(value_part).ok()?.trim();
    if text.is_empty() {
        return None;
    }

    if text == "T" {
        return Some((KeywordValue::Logic(true), comment));
    }
    if text == "F" {
        return Some((KeywordValue::Logic(false), comment));
    }
    if !text.contains(['.', 'E', 'e', 'D', 'd']) {
        if let Ok(n) = text.parse::<i64>() {
            return Some((KeywordValue::Integer(n), comment));
        }
    }
    // FITS allows a Fortran-style `D` exponent marker.
    let normalized = text.replace(['D', 'd'], "E");
    if let Ok(f) = normalized.parse::<f64>() {
        return Some((KeywordValue::Float(f), comment));
    }
    None
}

fn parse_quoted(field: &[u8]) -> Option<(KeywordValue, Option<&str>)> {
    let mut value = String::new();
    let mut i = 1;
    while i < field.len() {
        if field[i] == b'\'' {
            if field.get(i + 1) == Some(&b'\'') {
                value.push('\'');
                i += 2;
            } else {
                i += 1;
                break;
            }
        } else {
            value.push(field[i] as char);
            i += 1;
        }
    }
    let value = value.trim_end().to_string();
    let (_, comment) = split_comment(&field[i..]);
    Some((KeywordValue::String(value), comment))
}

/// Find the ` /` separator; the trailing space after the slash is optional
/// (IDL and friends omit it).
fn split_comment(field: &[u8]) -> (&[u8], Option<&str>) {
    let mut i = 0;
    while i + 1 < field.len() {
        if field[i] == b' ' && field[i + 1] == b'/' {
            let mut start = i + 2;
            if field.get(start) == Some(&b' ') {
                start += 1;
            }
            let comment = str::from_utf8(&field[start..])
                .ok()
                .map(str::trim_end)
                .filter(|s| !s.is_empty());
            return (&field[..i], comment);
        }
        i += 1;
    }
    (field, None)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn as_text(line: &[u8; LINE_SIZE]) -> &str {
        str::from_utf8(line).unwrap()
    }

    // ---- Rendering ----

    #[test]
    fn keyword_line_is_80_bytes_and_padded() {
        let line = render_keyword_line("NAXIS", &KeywordValue::Integer(2), None);
        assert_eq!(line.len(), LINE_SIZE);
        assert_eq!(&line[..8], b"NAXIS   ");
        assert_eq!(&line[8..10], b"= ");
        for &b in &line[30..] {
            assert_eq!(b, b' ');
        }
    }

    #[test]
    fn simple_line_exact_bytes() {
        let line = render_keyword_line(
            "SIMPLE",
            &KeywordValue::Logic(true),
            Some("Conforms to the FITS standard"),
        );
        let expected = format!(
            "SIMPLE  = {:>20} / Conforms to the FITS standard{:width$}",
            "T",
            "",
            width = 80 - 62
        );
        assert_eq!(as_text(&line), expected);
    }

    #[test]
    fn logic_sits_in_column_30() {
        let line = render_keyword_line("EXTEND", &KeywordValue::Logic(false), None);
        assert_eq!(line[29], b'F');
    }

    #[test]
    fn integer_right_justified_in_20() {
        let line = render_keyword_line("BITPIX", &KeywordValue::Integer(-32), None);
        assert_eq!(&line[10..30], b"                 -32");
    }

    #[test]
    fn float_uses_uppercase_exponent() {
        let line = render_keyword_line("CRVAL1", &KeywordValue::Float(1e-16), None);
        let text = as_text(&line);
        assert!(text.contains("E-16"), "got: {text}");
        assert!(!text.contains('e'));
    }

    #[test]
    fn float_fits_the_20_column_field() {
        for f in [1.5, -9.80665, 6.02214076e23, 2.5e-300] {
            let rendered = format_float(f);
            assert!(rendered.len() <= 20, "{f} rendered as {rendered}");
            assert_eq!(rendered.parse::<f64>().unwrap(), f);
        }
    }

    #[test]
    fn float_zero_renders_as_decimal() {
        let line = render_keyword_line("SCALE", &KeywordValue::Float(0.0), None);
        assert_eq!(&line[27..30], b"0.0");
    }

    #[test]
    fn string_starts_at_byte_10_unjustified() {
        let line = render_keyword_line("OBJECT", &KeywordValue::String("M31".into()), None);
        assert_eq!(&line[10..15], b"'M31'");
        for &b in &line[15..] {
            assert_eq!(b, b' ');
        }
    }

    #[test]
    fn string_with_embedded_quote_doubles_it() {
        let line = render_keyword_line("NOTE", &KeywordValue::String("it's".into()), None);
        assert!(as_text(&line).contains("'it''s'"));
    }

    #[test]
    fn string_value_then_comment() {
        let line = render_keyword_line(
            "XTENSION",
            &KeywordValue::String("IMAGE".into()),
            Some("extension type"),
        );
        let text = as_text(&line);
        assert!(text.starts_with("XTENSION= 'IMAGE' / extension type"));
    }

    #[test]
    fn long_comment_truncated_at_80() {
        let long = "x".repeat(200);
        let line = render_keyword_line("KEY", &KeywordValue::Integer(1), Some(&long));
        assert_eq!(line.len(), LINE_SIZE);
        assert_eq!(line[79], b'x');
    }

    #[test]
    fn lowercase_name_uppercased_and_truncated() {
        let line = render_keyword_line("telescoping", &KeywordValue::Integer(1), None);
        assert_eq!(&line[..8], b"TELESCOP");
    }

    #[test]
    fn comment_line_layout() {
        let line = render_comment_line("a remark");
        assert!(as_text(&line).starts_with("COMMENT a remark"));
        assert_eq!(line.len(), LINE_SIZE);
    }

    #[test]
    fn end_line_layout() {
        let line = render_end_line();
        assert_eq!(&line[..3], b"END");
        for &b in &line[3..] {
            assert_eq!(b, b' ');
        }
    }

    #[test]
    fn blank_line_is_spaces() {
        assert!(blank_line().iter().all(|&b| b == b' '));
    }

    // ---- Parsing ----

    fn make_line(text: &str) -> [u8; LINE_SIZE] {
        let mut line = [b' '; LINE_SIZE];
        let bytes = text.as_bytes();
        line[..bytes.len()].copy_from_slice(bytes);
        line
    }

    #[test]
    fn parse_logic() {
        let card = parse_line(&make_line("SIMPLE  =                    T / ok")).unwrap();
        assert_eq!(card.keyword, "SIMPLE");
        assert_eq!(card.value, Some(KeywordValue::Logic(true)));
        assert_eq!(card.comment.as_deref(), Some("ok"));
    }

    #[test]
    fn parse_integer() {
        let card = parse_line(&make_line("BITPIX  =                  -32")).unwrap();
        assert_eq!(card.value, Some(KeywordValue::Integer(-32)));
    }

    #[test]
    fn parse_float_with_d_exponent() {
        let card = parse_line(&make_line("CRVAL1  =            1.234D+05")).unwrap();
        match card.value {
            Some(KeywordValue::Float(f)) => assert!((f - 1.234e5).abs() < 1e-6),
            other => panic!("expected float, got {other:?}"),
        }
    }

    #[test]
    fn parse_string_trims_padding() {
        let card = parse_line(&make_line("XTENSION= 'IMAGE   '")).unwrap();
        assert_eq!(card.value, Some(KeywordValue::String("IMAGE".into())));
    }

    #[test]
    fn parse_string_doubled_quote() {
        let card = parse_line(&make_line("NOTE    = 'it''s ok'")).unwrap();
        assert_eq!(card.value, Some(KeywordValue::String("it's ok".into())));
    }

    #[test]
    fn parse_comment_no_trailing_space_after_slash() {
        let card = parse_line(&make_line("BITPIX  =                  -32 /No.Bits")).unwrap();
        assert_eq!(card.value, Some(KeywordValue::Integer(-32)));
        assert_eq!(card.comment.as_deref(), Some("No.Bits"));
    }

    #[test]
    fn parse_end() {
        let card = parse_line(&make_line("END")).unwrap();
        assert!(card.is_end());
    }

    #[test]
    fn parse_commentary() {
        let card = parse_line(&make_line("COMMENT free text here")).unwrap();
        assert!(card.is_commentary());
        assert_eq!(card.comment.as_deref(), Some("free text here"));
        assert!(card.value.is_none());
    }

    #[test]
    fn parse_blank() {
        let card = parse_line(&blank_line()).unwrap();
        assert!(card.is_blank());
        assert!(card.is_commentary());
        assert!(card.comment.is_none());
    }

    #[test]
    fn parse_rejects_lowercase_keyword() {
        assert!(matches!(
            parse_line(&make_line("bitpix  =                    8")),
            Err(Error::InvalidKeyword)
        ));
    }

    #[test]
    fn parse_rejects_odd_characters() {
        assert!(parse_line(&make_line("FOO@BAR =                    1")).is_err());
    }

    // ---- Round trips ----

    #[test]
    fn roundtrip_values() {
        let values = [
            KeywordValue::Logic(true),
            KeywordValue::Logic(false),
            KeywordValue::Integer(0),
            KeywordValue::Integer(i64::MIN),
            KeywordValue::Integer(982_451_653),
            KeywordValue::String("NGC 1234".into()),
            KeywordValue::String(String::new()),
        ];
        for value in values {
            let line = render_keyword_line("KEY", &value, None);
            let card = parse_line(&line).unwrap();
            assert_eq!(card.value, Some(value));
        }
    }

    #[test]
    fn roundtrip_float_values() {
        for f in [0.0f64, 1.5, -2.25, 9.80665, 1e-16, 6.02e23] {
            let line = render_keyword_line("KEY", &KeywordValue::Float(f), None);
            let card = parse_line(&line).unwrap();
            match card.value {
                Some(KeywordValue::Float(parsed)) => {
                    assert!((parsed - f).abs() <= f.abs() * 1e-12, "{f} vs {parsed}")
                }
                other => panic!("expected float, got {other:?}"),
            }
        }
    }

    #[test]
    fn roundtrip_value_with_comment() {
        let line = render_keyword_line(
            "NAXIS",
            &KeywordValue::Integer(2),
            Some("number of axes"),
        );
        let card = parse_line(&line).unwrap();
        assert_eq!(card.value, Some(KeywordValue::Integer(2)));
        assert_eq!(card.comment.as_deref(), Some("number of axes"));
    }
}
