//! The [Rom] is a read-only block of words.
//!
//! The ROM is initialized once and never modified, and its contents must fit in host memory, so
//! it is a plain contiguous buffer with no paging and no observers.

use crate::{
    image,
    page::{Address, Word},
};
use anyhow::Result;
use std::path::Path;

/// A read-only block of [Word]s addressed from 0.
#[derive(Debug, Clone, Default, Eq, PartialEq)]
pub struct Rom {
    data: Box<[Word]>,
}

impl Rom {
    /// Create a [Rom] holding a copy of `data`.
    pub fn new(data: &[Word]) -> Self {
        Self { data: data.into() }
    }

    /// Create a [Rom] holding the word image stored in the file at `path`.
    ///
    /// ## Returns
    /// - `Ok(rom)` if the file was read.
    /// - `Err(_)` if the file cannot be read or is not a whole number of words.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let words = image::read_words(path.as_ref())?;
        tracing::info!(
            target: "sparsemem::rom",
            "Loaded {} words from {}",
            words.len(),
            path.as_ref().display()
        );
        Ok(Self { data: words.into_boxed_slice() })
    }

    /// Read the word at `address`.
    ///
    /// ## Panics
    /// - If `address` is not below [Rom::len]. Callers are expected to stay in bounds.
    #[inline(always)]
    pub fn get(&self, address: Address) -> Word {
        self.data[address as usize]
    }

    /// Returns the number of words in the [Rom].
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns `true` if the [Rom] holds no word.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Returns the words of the [Rom].
    pub fn as_slice(&self) -> &[Word] {
        &self.data
    }
}

#[cfg(test)]
mod test {
    use super::Rom;
    use crate::image::write_words;

    #[test]
    fn test_rom_create() {
        let data = [0xab, 0xbc, 0xcd, 0xde, 0x12, 0x23, 0x34, 0x45];
        let rom = Rom::new(&data);

        assert_eq!(rom.len(), 8);
        for (address, word) in data.iter().enumerate() {
            assert_eq!(rom.get(address as u32), *word);
        }
    }

    #[test]
    fn test_rom_owns_its_copy() {
        let mut data = vec![1, 2, 3];
        let rom = Rom::new(&data);
        data[0] = 99;
        assert_eq!(rom.get(0), 1);
    }

    #[test]
    #[should_panic]
    fn test_rom_out_of_range() {
        let rom = Rom::new(&[1, 2]);
        rom.get(2);
    }

    #[test]
    fn test_rom_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rom.bin");
        write_words(&path, &[7, 8, 9]).unwrap();

        let rom = Rom::from_file(&path).unwrap();
        assert_eq!(rom.as_slice(), &[7, 8, 9]);
    }

    #[test]
    fn test_rom_from_empty_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.bin");
        write_words(&path, &[]).unwrap();

        assert!(Rom::from_file(&path).unwrap().is_empty());
    }
}
