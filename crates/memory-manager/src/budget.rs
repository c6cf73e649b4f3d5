// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Memory budget configuration and parsing.
//!
//! A [`MemoryBudget`] is a hard ceiling on the bytes a graph instance may
//! hold in tensor slots. It parses from human-readable strings so it can be
//! given on the command line or in a config file.

use crate::MemoryError;
use std::fmt;

const KIB: usize = 1024;
const MIB: usize = 1024 * KIB;
const GIB: usize = 1024 * MIB;

/// Recognised suffixes, longest first so `"MB"` wins over `"B"`.
const SUFFIXES: &[(&str, usize)] = &[
    ("GB", GIB),
    ("MB", MIB),
    ("KB", KIB),
    ("G", GIB),
    ("M", MIB),
    ("K", KIB),
    ("B", 1),
];

/// A hard memory ceiling for tensor slot storage.
///
/// # Examples
/// ```
/// use memory_manager::MemoryBudget;
///
/// let b = MemoryBudget::parse("256M").unwrap();
/// assert_eq!(b.as_bytes(), 256 * 1024 * 1024);
/// assert_eq!(b.to_string(), "256 MB");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct MemoryBudget {
    bytes: usize,
}

impl MemoryBudget {
    pub fn from_bytes(bytes: usize) -> Self {
        Self { bytes }
    }

    pub fn from_mb(mb: usize) -> Self {
        Self { bytes: mb * MIB }
    }

    pub fn as_bytes(&self) -> usize {
        self.bytes
    }

    /// Parses `"512M"`, `"512MB"`, `"1G"`, `"64K"`, `"100B"` or a plain byte
    /// count. Case-insensitive; surrounding whitespace is ignored. A zero
    /// budget is rejected.
    pub fn parse(input: &str) -> Result<Self, MemoryError> {
        let invalid = |reason| MemoryError::InvalidBudget {
            input: input.to_string(),
            reason,
        };

        let trimmed = input.trim();
        let upper = trimmed.to_ascii_uppercase();
        let (digits, multiplier) = SUFFIXES
            .iter()
            .find_map(|&(suffix, mult)| upper.strip_suffix(suffix).map(|rest| (rest, mult)))
            .unwrap_or((upper.as_str(), 1));

        let digits = digits.trim();
        if digits.is_empty() {
            return Err(invalid("missing number"));
        }
        let value: usize = digits
            .parse()
            .map_err(|_| invalid("expected a number with an optional K/M/G suffix"))?;
        let bytes = value
            .checked_mul(multiplier)
            .ok_or_else(|| invalid("value overflows"))?;
        if bytes == 0 {
            return Err(invalid("budget must be non-zero"));
        }
        Ok(Self { bytes })
    }
}

impl std::str::FromStr for MemoryBudget {
    type Err = MemoryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for MemoryBudget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let b = self.bytes;
        if b >= GIB && b % GIB == 0 {
            write!(f, "{} GB", b / GIB)
        } else if b >= MIB && b % MIB == 0 {
            write!(f, "{} MB", b / MIB)
        } else if b >= KIB && b % KIB == 0 {
            write!(f, "{} KB", b / KIB)
        } else {
            write!(f, "{b} B")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_suffixes() {
        assert_eq!(MemoryBudget::parse("512M").unwrap().as_bytes(), 512 * MIB);
        assert_eq!(MemoryBudget::parse("512mb").unwrap().as_bytes(), 512 * MIB);
        assert_eq!(MemoryBudget::parse("1G").unwrap().as_bytes(), GIB);
        assert_eq!(MemoryBudget::parse("2gb").unwrap().as_bytes(), 2 * GIB);
        assert_eq!(MemoryBudget::parse("64K").unwrap().as_bytes(), 64 * KIB);
        assert_eq!(MemoryBudget::parse("100B").unwrap().as_bytes(), 100);
        assert_eq!(MemoryBudget::parse("  4096 ").unwrap().as_bytes(), 4096);
    }

    #[test]
    fn test_parse_invalid() {
        for bad in ["", "M", "abc", "0M", "-1K", "1.5G", "99999999999999999999G"] {
            assert!(
                matches!(MemoryBudget::parse(bad), Err(MemoryError::InvalidBudget { .. })),
                "{bad:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_from_str() {
        let b: MemoryBudget = "8K".parse().unwrap();
        assert_eq!(b, MemoryBudget::from_bytes(8 * KIB));
    }

    #[test]
    fn test_display() {
        assert_eq!(MemoryBudget::from_bytes(GIB).to_string(), "1 GB");
        assert_eq!(MemoryBudget::from_mb(512).to_string(), "512 MB");
        assert_eq!(MemoryBudget::from_bytes(2048).to_string(), "2 KB");
        assert_eq!(MemoryBudget::from_bytes(100).to_string(), "100 B");
    }

    #[test]
    fn test_serde_is_byte_count() {
        let json = serde_json::to_string(&MemoryBudget::from_bytes(4096)).unwrap();
        assert_eq!(json, r#"{"bytes":4096}"#);
    }
}
