//! This module contains the [Page] type as well as associated page parameterization constants.

use crate::error::MemoryError;
use std::ops::{Index, IndexMut};

/// An [Address] identifies one [Word] within the 32 bit address space.
pub type Address = u32;

/// A [Word] is the addressable unit of storage.
pub type Word = u32;

/// The size of a [Word] in bytes.
pub const WORD_SIZE: usize = std::mem::size_of::<Word>();

/// The size of a page address in bits.
pub const PAGE_ADDRESS_SIZE: u32 = 10;

/// The default size of a [Page] in words (4096 bytes worth of words).
pub const DEFAULT_PAGE_SIZE: usize = 1 << PAGE_ADDRESS_SIZE;

/// The number of words in a [Page]. Always a power of two, so that an [Address] splits into a
/// page base and an in-page offset with a mask.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
pub struct PageSize(u32);

impl PageSize {
    /// Create a new [PageSize] of `words` words.
    ///
    /// ## Returns
    /// - `Ok(page_size)` if `words` is a power of two no larger than 2^31.
    /// - `Err(_)` otherwise.
    pub fn new(words: usize) -> anyhow::Result<Self> {
        if !words.is_power_of_two() || words > 1 << 31 {
            return Err(MemoryError::InvalidPageSize(words).into());
        }
        Ok(Self(words as u32))
    }

    /// Returns the number of words in a page.
    #[inline(always)]
    pub const fn words(&self) -> usize {
        self.0 as usize
    }

    /// Returns the mask selecting the in-page offset of an [Address].
    #[inline(always)]
    pub const fn mask(&self) -> Address {
        self.0 - 1
    }

    /// Returns the base address of the page containing `address`.
    #[inline(always)]
    pub const fn base_of(&self, address: Address) -> Address {
        address & !self.mask()
    }

    /// Returns the offset of `address` within its page.
    #[inline(always)]
    pub const fn offset_of(&self, address: Address) -> usize {
        (address & self.mask()) as usize
    }
}

impl Default for PageSize {
    fn default() -> Self {
        Self(DEFAULT_PAGE_SIZE as u32)
    }
}

/// A page of memory: a zero-initialized run of words starting at `base`.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Page {
    /// The address of the first word of the page.
    base: Address,
    /// The words of the page.
    data: Box<[Word]>,
}

impl Page {
    /// Allocate a new zeroed page of `words` words starting at `base`.
    pub fn new(base: Address, words: usize) -> Self {
        Self { base, data: vec![0; words].into_boxed_slice() }
    }

    /// Returns the base address of the page.
    #[inline(always)]
    pub fn base(&self) -> Address {
        self.base
    }

    /// Returns the words of the page.
    pub fn words(&self) -> &[Word] {
        &self.data
    }

    /// Returns the words of the page, mutably.
    pub fn words_mut(&mut self) -> &mut [Word] {
        &mut self.data
    }
}

impl Index<usize> for Page {
    type Output = Word;

    #[inline(always)]
    fn index(&self, offset: usize) -> &Self::Output {
        &self.data[offset]
    }
}

impl IndexMut<usize> for Page {
    #[inline(always)]
    fn index_mut(&mut self, offset: usize) -> &mut Self::Output {
        &mut self.data[offset]
    }
}
