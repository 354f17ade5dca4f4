//! Word images: flat files of little-endian 4 byte words, with no header.

use crate::{
    error::MemoryError,
    page::{Word, WORD_SIZE},
};
use anyhow::{Context, Result};
use std::{fs, path::Path};

/// Decode a byte buffer into words.
///
/// ## Returns
/// - `Some(words)` if `bytes` holds a whole number of words.
/// - `None` otherwise.
pub fn decode_words(bytes: &[u8]) -> Option<Vec<Word>> {
    if bytes.len() % WORD_SIZE != 0 {
        return None;
    }
    Some(
        bytes
            .chunks_exact(WORD_SIZE)
            .map(|chunk| Word::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
            .collect(),
    )
}

/// Encode words into a byte buffer.
pub fn encode_words(words: &[Word]) -> Vec<u8> {
    words.iter().flat_map(|word| word.to_le_bytes()).collect()
}

/// Read the word image stored in the file at `path`.
///
/// ## Returns
/// - `Ok(words)` with every word of the file.
/// - `Err(_)` if the file cannot be read, or its length is not a multiple of the word size.
pub fn read_words(path: &Path) -> Result<Vec<Word>> {
    let bytes = fs::read(path).with_context(|| format!("failed to read file '{}'", path.display()))?;
    let len = bytes.len() as u64;
    let words = decode_words(&bytes)
        .ok_or_else(|| MemoryError::Misaligned { path: path.to_path_buf(), len })?;

    tracing::debug!(target: "sparsemem::image", "Read {} words from {}", words.len(), path.display());
    Ok(words)
}

/// Write `words` to the file at `path` as a word image.
pub fn write_words(path: &Path, words: &[Word]) -> Result<()> {
    fs::write(path, encode_words(words))
        .with_context(|| format!("failed to write file '{}'", path.display()))
}
