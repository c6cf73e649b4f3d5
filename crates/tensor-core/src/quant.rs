// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Affine quantization parameters.

/// Per-tensor affine quantization: `real = scale * (quantized - zero_point)`.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct QuantParams {
    pub scale: f32,
    pub zero_point: i64,
}

impl QuantParams {
    pub fn new(scale: f32, zero_point: i64) -> Self {
        Self { scale, zero_point }
    }

    /// Maps a quantized value back to the real line.
    #[inline]
    pub fn dequantize(&self, q: i64) -> f32 {
        self.scale * (q - self.zero_point) as f32
    }
}

impl Default for QuantParams {
    /// The "not quantized" parameters reported for plain float slots.
    fn default() -> Self {
        Self {
            scale: 0.0,
            zero_point: 0,
        }
    }
}
