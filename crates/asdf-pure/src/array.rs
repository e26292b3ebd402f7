//! N-dimensional array payloads.
//!
//! An ndarray node in the tree is a small mapping (`source`, `datatype`,
//! `shape`, `byteorder`) pointing at a binary block; [`NdArrayData`] is its
//! in-memory form with the block bytes attached. Shapes are row-major
//! (outermost axis first). Typed construction and extraction go through
//! `bytemuck` with an explicit in-place byte reorder, so payloads can be
//! built and read in either byte order on any host.

use alloc::string::String;
use alloc::vec::Vec;

use bytemuck::pod_collect_to_vec;

use crate::node::{Node, Value};

/// Byte order of an array payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ByteOrder {
    /// Most-significant byte first.
    Big,
    /// Least-significant byte first.
    Little,
}

impl ByteOrder {
    /// The wire name (`big` / `little`).
    pub const fn as_str(self) -> &'static str {
        match self {
            ByteOrder::Big => "big",
            ByteOrder::Little => "little",
        }
    }

    /// Parse a wire name.
    pub fn parse(text: &str) -> Option<ByteOrder> {
        match text {
            "big" => Some(ByteOrder::Big),
            "little" => Some(ByteOrder::Little),
            _ => None,
        }
    }

    /// The host's byte order.
    pub const fn native() -> ByteOrder {
        if cfg!(target_endian = "big") {
            ByteOrder::Big
        } else {
            ByteOrder::Little
        }
    }
}

/// The closed set of element types an array payload can hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataType {
    /// One-byte boolean.
    Bool8,
    /// Signed 8-bit integer.
    Int8,
    /// Signed 16-bit integer.
    Int16,
    /// Signed 32-bit integer.
    Int32,
    /// Signed 64-bit integer.
    Int64,
    /// Unsigned 8-bit integer.
    Uint8,
    /// Unsigned 16-bit integer.
    Uint16,
    /// Unsigned 32-bit integer.
    Uint32,
    /// Unsigned 64-bit integer.
    Uint64,
    /// IEEE-754 single precision.
    Float32,
    /// IEEE-754 double precision.
    Float64,
    /// UTF-32 string of `n` code units per item.
    Ucs4(usize),
}

impl DataType {
    /// Bytes per item.
    pub const fn byte_width(self) -> usize {
        match self {
            DataType::Bool8 | DataType::Int8 | DataType::Uint8 => 1,
            DataType::Int16 | DataType::Uint16 => 2,
            DataType::Int32 | DataType::Uint32 | DataType::Float32 => 4,
            DataType::Int64 | DataType::Uint64 | DataType::Float64 => 8,
            DataType::Ucs4(units) => 4 * units,
        }
    }

    /// Decode a datatype from its tree value.
    ///
    /// Scalar types are lowercase name strings; `ucs4` uses the composite
    /// two-element form `[ucs4, n]`.
    pub fn from_value(value: &Value) -> Option<DataType> {
        match value {
            Value::String(name) => match name.as_str() {
                "bool8" => Some(DataType::Bool8),
                "int8" => Some(DataType::Int8),
                "int16" => Some(DataType::Int16),
                "int32" => Some(DataType::Int32),
                "int64" => Some(DataType::Int64),
                "uint8" => Some(DataType::Uint8),
                "uint16" => Some(DataType::Uint16),
                "uint32" => Some(DataType::Uint32),
                "uint64" => Some(DataType::Uint64),
                "float32" => Some(DataType::Float32),
                "float64" => Some(DataType::Float64),
                _ => None,
            },
            Value::Array(items) => match items.as_slice() {
                [name, units] => match (&name.value, &units.value) {
                    (Value::String(n), Value::Integer(count)) if n == "ucs4" && *count > 0 => {
                        Some(DataType::Ucs4(*count as usize))
                    }
                    _ => None,
                },
                _ => None,
            },
            _ => None,
        }
    }

    /// Encode this datatype as its tree value.
    pub fn to_value(self) -> Value {
        let name = match self {
            DataType::Bool8 => "bool8",
            DataType::Int8 => "int8",
            DataType::Int16 => "int16",
            DataType::Int32 => "int32",
            DataType::Int64 => "int64",
            DataType::Uint8 => "uint8",
            DataType::Uint16 => "uint16",
            DataType::Uint32 => "uint32",
            DataType::Uint64 => "uint64",
            DataType::Float32 => "float32",
            DataType::Float64 => "float64",
            DataType::Ucs4(units) => {
                return Value::Array(alloc::vec![
                    Node::untagged(Value::String(String::from("ucs4"))),
                    Node::untagged(Value::Integer(units as i64)),
                ]);
            }
        };
        Value::String(String::from(name))
    }
}

/// The number of items in a row-major shape (1 for a zero-dimensional array).
pub fn total_items(shape: &[usize]) -> usize {
    shape.iter().product()
}

/// An n-dimensional array payload.
#[derive(Debug, Clone, PartialEq)]
pub struct NdArrayData {
    /// The raw item bytes, laid out per `byteorder`.
    pub bytes: Vec<u8>,
    /// Element type.
    pub datatype: DataType,
    /// Byte order of `bytes`.
    pub byteorder: ByteOrder,
    /// Axis lengths, outermost first.
    pub shape: Vec<usize>,
}

/// Reverse each `width`-byte item in place when `order` differs from the host.
fn reorder_in_place(buf: &mut [u8], width: usize, order: ByteOrder) {
    if width <= 1 || order == ByteOrder::native() {
        return;
    }
    for chunk in buf.chunks_exact_mut(width) {
        chunk.reverse();
    }
}

macro_rules! typed_accessors {
    ($from:ident, $to:ident, $ty:ty, $dt:expr) => {
        /// Build a payload from a typed slice in the given byte order.
        pub fn $from(values: &[$ty], shape: Vec<usize>, byteorder: ByteOrder) -> NdArrayData {
            let mut bytes: Vec<u8> = pod_collect_to_vec(values);
            reorder_in_place(&mut bytes, $dt.byte_width(), byteorder);
            NdArrayData {
                bytes,
                datatype: $dt,
                byteorder,
                shape,
            }
        }

        /// Extract the items as a typed vector, or `None` when the payload
        /// holds a different datatype or its byte length is inconsistent.
        pub fn $to(&self) -> Option<Vec<$ty>> {
            if self.datatype != $dt || !self.bytes.len().is_multiple_of($dt.byte_width()) {
                return None;
            }
            let mut bytes = self.bytes.clone();
            reorder_in_place(&mut bytes, $dt.byte_width(), self.byteorder);
            Some(pod_collect_to_vec(&bytes))
        }
    };
}

impl NdArrayData {
    /// The number of items described by the shape.
    pub fn item_count(&self) -> usize {
        total_items(&self.shape)
    }

    /// The byte length the shape and datatype require.
    pub fn expected_byte_len(&self) -> usize {
        self.item_count() * self.datatype.byte_width()
    }

    /// Returns `true` when the payload length matches shape × width.
    pub fn is_consistent(&self) -> bool {
        self.bytes.len() == self.expected_byte_len()
    }

    typed_accessors!(from_i16, to_vec_i16, i16, DataType::Int16);
    typed_accessors!(from_i32, to_vec_i32, i32, DataType::Int32);
    typed_accessors!(from_i64, to_vec_i64, i64, DataType::Int64);
    typed_accessors!(from_f32, to_vec_f32, f32, DataType::Float32);
    typed_accessors!(from_f64, to_vec_f64, f64, DataType::Float64);

    /// Build a `uint8` payload; byte order is irrelevant at width 1.
    pub fn from_u8(values: &[u8], shape: Vec<usize>, byteorder: ByteOrder) -> NdArrayData {
        NdArrayData {
            bytes: values.to_vec(),
            datatype: DataType::Uint8,
            byteorder,
            shape,
        }
    }
}
