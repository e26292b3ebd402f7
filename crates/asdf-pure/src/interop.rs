//! Conversions from array payloads into `ndarray` containers.
//!
//! Shapes are row-major on both sides, so axis lengths carry over directly
//! into a dynamic-dimension array.

use alloc::vec::Vec;

use ndarray::{ArrayD, IxDyn};

use crate::array::NdArrayData;

fn shaped<T>(shape: &[usize], items: Vec<T>) -> Option<ArrayD<T>> {
    ArrayD::from_shape_vec(IxDyn(shape), items).ok()
}

/// View an `int16` payload as a dynamic array.
pub fn to_array_i16(data: &NdArrayData) -> Option<ArrayD<i16>> {
    shaped(&data.shape, data.to_vec_i16()?)
}

/// View an `int32` payload as a dynamic array.
pub fn to_array_i32(data: &NdArrayData) -> Option<ArrayD<i32>> {
    shaped(&data.shape, data.to_vec_i32()?)
}

/// View an `int64` payload as a dynamic array.
pub fn to_array_i64(data: &NdArrayData) -> Option<ArrayD<i64>> {
    shaped(&data.shape, data.to_vec_i64()?)
}

/// View a `float32` payload as a dynamic array.
pub fn to_array_f32(data: &NdArrayData) -> Option<ArrayD<f32>> {
    shaped(&data.shape, data.to_vec_f32()?)
}

/// View a `float64` payload as a dynamic array.
pub fn to_array_f64(data: &NdArrayData) -> Option<ArrayD<f64>> {
    shaped(&data.shape, data.to_vec_f64()?)
}
