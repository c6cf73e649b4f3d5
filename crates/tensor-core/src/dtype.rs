// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Tensor element types.

use std::fmt;

/// Enumerates the element types a tensor slot can declare.
///
/// The discriminants are stable numeric codes; they are what the diagnostic
/// dump prints as a slot's "type" and what model files may use in place of
/// the textual names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum DType {
    #[serde(rename = "no_type")]
    NoType = 0,
    #[serde(rename = "float32", alias = "f32")]
    Float32 = 1,
    #[serde(rename = "int32", alias = "i32")]
    Int32 = 2,
    #[serde(rename = "uint8", alias = "u8")]
    UInt8 = 3,
    #[serde(rename = "int64", alias = "i64")]
    Int64 = 4,
    #[serde(rename = "string")]
    String = 5,
    #[serde(rename = "bool")]
    Bool = 6,
    #[serde(rename = "int16", alias = "i16")]
    Int16 = 7,
    #[serde(rename = "complex64")]
    Complex64 = 8,
    #[serde(rename = "int8", alias = "i8")]
    Int8 = 9,
    #[serde(rename = "float16", alias = "f16")]
    Float16 = 10,
    #[serde(rename = "float64", alias = "f64")]
    Float64 = 11,
    #[serde(rename = "complex128")]
    Complex128 = 12,
    #[serde(rename = "uint64", alias = "u64")]
    UInt64 = 13,
    #[serde(rename = "resource")]
    Resource = 14,
    #[serde(rename = "variant")]
    Variant = 15,
    #[serde(rename = "uint32", alias = "u32")]
    UInt32 = 16,
    #[serde(rename = "uint16", alias = "u16")]
    UInt16 = 17,
    #[serde(rename = "int4", alias = "i4")]
    Int4 = 18,
}

const ALL: [DType; 19] = [
    DType::NoType,
    DType::Float32,
    DType::Int32,
    DType::UInt8,
    DType::Int64,
    DType::String,
    DType::Bool,
    DType::Int16,
    DType::Complex64,
    DType::Int8,
    DType::Float16,
    DType::Float64,
    DType::Complex128,
    DType::UInt64,
    DType::Resource,
    DType::Variant,
    DType::UInt32,
    DType::UInt16,
    DType::Int4,
];

impl DType {
    /// Returns the stable numeric code of this type.
    pub fn code(self) -> u8 {
        self as u8
    }

    /// Looks up a type by its numeric code.
    pub fn from_code(code: u8) -> Option<Self> {
        ALL.get(code as usize).copied()
    }

    /// Size of one element in bytes, for byte-addressable fixed-width types.
    ///
    /// Returns `None` for `Int4` (packed two per byte) and for types whose
    /// storage is not a flat element array (`String`, `Resource`, `Variant`,
    /// `NoType`).
    pub fn size_bytes(self) -> Option<usize> {
        match self {
            DType::Bool | DType::UInt8 | DType::Int8 => Some(1),
            DType::Int16 | DType::UInt16 | DType::Float16 => Some(2),
            DType::Int32 | DType::UInt32 | DType::Float32 => Some(4),
            DType::Int64 | DType::UInt64 | DType::Float64 | DType::Complex64 => Some(8),
            DType::Complex128 => Some(16),
            DType::Int4 | DType::NoType | DType::String | DType::Resource | DType::Variant => {
                None
            }
        }
    }

    /// Number of bytes needed to store `elements` values of this type.
    ///
    /// `NoType` occupies no storage. Returns `None` for dynamically sized
    /// types that cannot be laid out from a shape alone.
    pub fn byte_size_for(self, elements: usize) -> Option<usize> {
        match self {
            DType::NoType => Some(0),
            DType::Int4 => Some(elements.div_ceil(2)),
            other => other.size_bytes().and_then(|s| s.checked_mul(elements)),
        }
    }

    /// `true` for the signed and unsigned integer types of 8 bits or wider.
    pub fn is_integer(self) -> bool {
        matches!(
            self,
            DType::Int8
                | DType::Int16
                | DType::Int32
                | DType::Int64
                | DType::UInt8
                | DType::UInt16
                | DType::UInt32
                | DType::UInt64
        )
    }

    /// `true` for real floating-point types.
    pub fn is_float(self) -> bool {
        matches!(self, DType::Float16 | DType::Float32 | DType::Float64)
    }

    /// Largest positive value representable by an integer type.
    pub fn integer_max(self) -> Option<u64> {
        match self {
            DType::Int8 => Some(i8::MAX as u64),
            DType::UInt8 => Some(u8::MAX as u64),
            DType::Int16 => Some(i16::MAX as u64),
            DType::UInt16 => Some(u16::MAX as u64),
            DType::Int32 => Some(i32::MAX as u64),
            DType::UInt32 => Some(u32::MAX as u64),
            DType::Int64 => Some(i64::MAX as u64),
            DType::UInt64 => Some(u64::MAX),
            _ => None,
        }
    }

    /// Returns a human-readable label for this data type.
    pub fn as_str(self) -> &'static str {
        match self {
            DType::NoType => "no_type",
            DType::Float32 => "float32",
            DType::Int32 => "int32",
            DType::UInt8 => "uint8",
            DType::Int64 => "int64",
            DType::String => "string",
            DType::Bool => "bool",
            DType::Int16 => "int16",
            DType::Complex64 => "complex64",
            DType::Int8 => "int8",
            DType::Float16 => "float16",
            DType::Float64 => "float64",
            DType::Complex128 => "complex128",
            DType::UInt64 => "uint64",
            DType::Resource => "resource",
            DType::Variant => "variant",
            DType::UInt32 => "uint32",
            DType::UInt16 => "uint16",
            DType::Int4 => "int4",
        }
    }
}

impl fmt::Display for DType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A Rust primitive that can be stored in a tensor buffer.
///
/// Links a plain-old-data type to the [`DType`] it is stored as, so typed
/// views can refuse to reinterpret a buffer of a different declared type.
pub trait Element: bytemuck::Pod + fmt::Debug {
    /// The declared element type this primitive corresponds to.
    const DTYPE: DType;
}

macro_rules! impl_element {
    ($($ty:ty => $dtype:ident),* $(,)?) => {
        $(impl Element for $ty {
            const DTYPE: DType = DType::$dtype;
        })*
    };
}

impl_element! {
    i8 => Int8,
    u8 => UInt8,
    i16 => Int16,
    u16 => UInt16,
    i32 => Int32,
    u32 => UInt32,
    i64 => Int64,
    u64 => UInt64,
    f32 => Float32,
    f64 => Float64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_match_positions() {
        for (i, dtype) in ALL.iter().enumerate() {
            assert_eq!(dtype.code() as usize, i);
            assert_eq!(DType::from_code(i as u8), Some(*dtype));
        }
        assert_eq!(DType::from_code(19), None);
    }

    #[test]
    fn test_well_known_codes() {
        assert_eq!(DType::Float32.code(), 1);
        assert_eq!(DType::Int32.code(), 2);
        assert_eq!(DType::Int64.code(), 4);
        assert_eq!(DType::Int8.code(), 9);
        assert_eq!(DType::Int4.code(), 18);
    }

    #[test]
    fn test_byte_size_for() {
        assert_eq!(DType::Int64.byte_size_for(8), Some(64));
        assert_eq!(DType::Int32.byte_size_for(256), Some(1024));
        assert_eq!(DType::Int4.byte_size_for(5), Some(3));
        assert_eq!(DType::NoType.byte_size_for(10), Some(0));
        assert_eq!(DType::String.byte_size_for(1), None);
    }

    #[test]
    fn test_integer_classification() {
        assert!(DType::Int32.is_integer());
        assert!(DType::UInt16.is_integer());
        assert!(!DType::Bool.is_integer());
        assert!(!DType::Int4.is_integer());
        assert!(!DType::Float32.is_integer());
        assert_eq!(DType::Int8.integer_max(), Some(127));
        assert_eq!(DType::Float32.integer_max(), None);
    }

    #[test]
    fn test_serde_names_and_aliases() {
        let d: DType = serde_json::from_str("\"int64\"").unwrap();
        assert_eq!(d, DType::Int64);
        let d: DType = serde_json::from_str("\"f32\"").unwrap();
        assert_eq!(d, DType::Float32);
        assert_eq!(serde_json::to_string(&DType::UInt8).unwrap(), "\"uint8\"");
    }

    #[test]
    fn test_element_mapping() {
        assert_eq!(<i64 as Element>::DTYPE, DType::Int64);
        assert_eq!(<f32 as Element>::DTYPE, DType::Float32);
        assert_eq!(<u8 as Element>::DTYPE, DType::UInt8);
    }
}
