//! Error types for the sparse memory.

use crate::page::Address;
use std::{fmt, path::PathBuf};

/// An error raised by the memory for conditions that callers may want to tell apart.
///
/// Library functions return [anyhow::Result]; a [MemoryError] can be recovered with
/// [anyhow::Error::downcast_ref].
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum MemoryError {
    /// The requested page size is not a power of two within the address space.
    InvalidPageSize(usize),
    /// A bulk copy of `len` words at `address` runs past the end of the address space.
    RangeOverflow { address: Address, len: usize },
    /// A word image whose byte length is not a multiple of the word size.
    Misaligned { path: PathBuf, len: u64 },
}

impl fmt::Display for MemoryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MemoryError::InvalidPageSize(words) => {
                write!(f, "invalid page size: {} words is not a power of two", words)
            }
            MemoryError::RangeOverflow { address, len } => {
                write!(f, "{} words at {:#010x} overflow the address space", len, address)
            }
            MemoryError::Misaligned { path, len } => write!(
                f,
                "failed to read file '{}': {} bytes is not a whole number of words",
                path.display(),
                len
            ),
        }
    }
}

impl std::error::Error for MemoryError {}
