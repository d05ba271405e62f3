//! SIMD rolling-window updates using the `wide` crate.
//!
//! The region accumulator spends most of its time in `prev - leaving +
//! entering` over whole score rows. These kernels process eight lanes at a
//! time and finish the tail with the scalar expression, so results match the
//! scalar path bit for bit.

use wide::{f32x8, i32x8};

const LANES: usize = 8;

#[inline]
fn load_f32x8(slice: &[f32]) -> f32x8 {
    f32x8::from([
        slice[0], slice[1], slice[2], slice[3], slice[4], slice[5], slice[6], slice[7],
    ])
}

#[inline]
fn load_i32x8(slice: &[i32]) -> i32x8 {
    i32x8::from([
        slice[0], slice[1], slice[2], slice[3], slice[4], slice[5], slice[6], slice[7],
    ])
}

/// Writes `prev - leaving + entering` for `f32` rows.
pub(crate) fn rolling_update_f32(prev: &[f32], leaving: &[f32], entering: &[f32], out: &mut [f32]) {
    let len = out
        .len()
        .min(prev.len())
        .min(leaving.len())
        .min(entering.len());
    let simd_end = len / LANES * LANES;

    let mut i = 0;
    while i < simd_end {
        let v = load_f32x8(&prev[i..]) - load_f32x8(&leaving[i..]) + load_f32x8(&entering[i..]);
        out[i..i + LANES].copy_from_slice(&v.to_array());
        i += LANES;
    }
    while i < len {
        out[i] = prev[i] - leaving[i] + entering[i];
        i += 1;
    }
}

/// Writes `prev - leaving + entering` for `i32` rows.
pub(crate) fn rolling_update_i32(prev: &[i32], leaving: &[i32], entering: &[i32], out: &mut [i32]) {
    let len = out
        .len()
        .min(prev.len())
        .min(leaving.len())
        .min(entering.len());
    let simd_end = len / LANES * LANES;

    let mut i = 0;
    while i < simd_end {
        let v = load_i32x8(&prev[i..]) - load_i32x8(&leaving[i..]) + load_i32x8(&entering[i..]);
        out[i..i + LANES].copy_from_slice(&v.to_array());
        i += LANES;
    }
    while i < len {
        out[i] = prev[i] - leaving[i] + entering[i];
        i += 1;
    }
}
