//! The [Ram] is a sparse, word addressed memory spanning the whole 32 bit address space.
//!
//! It is not possible to allocate gigabytes of words upfront, so the address space is cut into
//! fixed-size pages that are materialized on first access, much like virtual memory. The mapping
//! from page base addresses to pages is kept in a [PageTable]. Any access, reads included,
//! allocates the page it falls into; [Ram::peek] is the only way to look without allocating.

use crate::{
    error::MemoryError,
    image,
    observer::{ObserverId, Observers, ReadCallback, WriteCallback},
    page::{Address, PageSize, Word, WORD_SIZE},
    page_table::PageTable,
};
use anyhow::Result;
use serde::Serialize;
use std::{fmt, path::Path};

/// The number of addressable words.
const ADDRESS_SPACE: u64 = 1 << Address::BITS;

/// A sparse memory of [Word]s with read and write observers.
pub struct Ram {
    /// Resident pages, keyed by base address.
    pages: PageTable,
    /// The size of every page.
    page_size: PageSize,
    /// Observers fired before a read returns.
    read_observers: Observers<ReadCallback>,
    /// Observers fired after a write is stored.
    write_observers: Observers<WriteCallback>,
}

/// A snapshot of the bookkeeping of a [Ram].
#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RamStats {
    /// Words per page.
    pub page_size: usize,
    /// Resident pages.
    pub page_count: usize,
    /// Slots in the page table.
    pub capacity: usize,
    /// Bytes of word storage held by resident pages.
    pub resident_bytes: u64,
    /// Registered read observers.
    pub read_observers: usize,
    /// Registered write observers.
    pub write_observers: usize,
}

impl Default for Ram {
    fn default() -> Self {
        Self::with_page_size(PageSize::default())
    }
}

impl fmt::Debug for Ram {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Ram")
            .field("page_size", &self.page_size.words())
            .field("page_count", &self.pages.len())
            .field("read_observers", &self.read_observers)
            .field("write_observers", &self.write_observers)
            .finish()
    }
}

impl Ram {
    /// Create an empty [Ram] with the default page size.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty [Ram] whose pages hold `page_size` words.
    pub fn with_page_size(page_size: PageSize) -> Self {
        Self {
            pages: PageTable::default(),
            page_size,
            read_observers: Observers::default(),
            write_observers: Observers::default(),
        }
    }

    /// Create a [Ram] holding `data` at addresses `[0, data.len())`.
    pub fn from_words(data: &[Word]) -> Result<Self> {
        let mut ram = Self::new();
        ram.bulk_init(data)?;
        Ok(ram)
    }

    /// Create a [Ram] initialized with the word image stored in the file at `path`.
    ///
    /// ## Returns
    /// - `Ok(ram)` with the image loaded at address 0.
    /// - `Err(_)` if the file cannot be read or is not a whole number of words.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let words = image::read_words(path.as_ref())?;
        let ram = Self::from_words(&words)?;
        tracing::info!(
            target: "sparsemem::ram",
            "Loaded {} words from {} into {} pages",
            words.len(),
            path.as_ref().display(),
            ram.page_count()
        );
        Ok(ram)
    }

    /// Returns the page size of the [Ram].
    pub fn page_size(&self) -> PageSize {
        self.page_size
    }

    /// Returns the number of resident pages.
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Read the word at `address`, allocating its page if it is not resident.
    ///
    /// Read observers covering `address` fire before the value is returned.
    #[inline(always)]
    pub fn get(&mut self, address: Address) -> Word {
        let page = self.pages.get_or_insert(self.page_size.base_of(address), self.page_size.words());
        self.read_observers.dispatch(address);
        page[self.page_size.offset_of(address)]
    }

    /// Write `value` at `address`, allocating its page if it is not resident.
    ///
    /// Write observers covering `address` fire once the value is stored.
    #[inline(always)]
    pub fn set(&mut self, address: Address, value: Word) {
        let page = self.pages.get_or_insert(self.page_size.base_of(address), self.page_size.words());
        page[self.page_size.offset_of(address)] = value;
        self.write_observers.dispatch(address, value);
    }

    /// Replace the word at `address` with `value` and return the previous word.
    ///
    /// Equivalent to [Ram::get] followed by [Ram::set], observers included, with a single page
    /// lookup.
    #[inline(always)]
    pub fn get_set(&mut self, address: Address, value: Word) -> Word {
        let page = self.pages.get_or_insert(self.page_size.base_of(address), self.page_size.words());
        let offset = self.page_size.offset_of(address);
        self.read_observers.dispatch(address);
        let old = std::mem::replace(&mut page[offset], value);
        self.write_observers.dispatch(address, value);
        old
    }

    /// Read the word at `address` without allocating and without firing observers.
    ///
    /// ## Returns
    /// - `Some(word)` if the page of `address` is resident.
    /// - `None` if it has never been touched.
    pub fn peek(&self, address: Address) -> Option<Word> {
        self.pages
            .get(self.page_size.base_of(address))
            .map(|page| page[self.page_size.offset_of(address)])
    }

    /// Copy `data` to addresses `[0, data.len())`. Observers do not fire.
    pub fn bulk_init(&mut self, data: &[Word]) -> Result<()> {
        self.set_range(0, data)
    }

    /// Copy `data` to the words starting at `address`, page by page. Observers do not fire.
    ///
    /// ## Takes
    /// - `address`: The address of the first word to set.
    /// - `data`: The words to copy.
    ///
    /// ## Returns
    /// - `Ok(())` if the words were copied.
    /// - `Err(_)` if the range runs past the end of the address space. Memory is left untouched.
    pub fn set_range(&mut self, address: Address, data: &[Word]) -> Result<()> {
        check_range(address, data.len())?;

        let words = self.page_size.words();
        let mut address = address;
        let mut data = data;
        while !data.is_empty() {
            let offset = self.page_size.offset_of(address);
            let page = self.pages.get_or_insert(self.page_size.base_of(address), words);

            let n = (words - offset).min(data.len());
            page.words_mut()[offset..offset + n].copy_from_slice(&data[..n]);

            data = &data[n..];
            address = address.wrapping_add(n as Address);
        }
        Ok(())
    }

    /// Read `len` words starting at `address` without allocating and without firing observers.
    /// Words of pages that were never touched read as zero.
    pub fn read_range(&self, address: Address, len: usize) -> Result<Vec<Word>> {
        check_range(address, len)?;
        Ok((0..len).map(|i| self.peek(address.wrapping_add(i as Address)).unwrap_or(0)).collect())
    }

    /// Register `callback` to be invoked on every read of an address in `[low, high]`.
    pub fn observe_reads<F>(&mut self, low: Address, high: Address, callback: F) -> ObserverId
    where
        F: FnMut(Address) + 'static,
    {
        self.read_observers.register(low..=high, Box::new(callback))
    }

    /// Register `callback` to be invoked on every write of an address in `[low, high]`.
    ///
    /// The callback cannot reach the [Ram] it observes:
    ///
    /// ```compile_fail
    /// use sparsemem_memory::Ram;
    ///
    /// let mut ram = Ram::new();
    /// let inner = &mut ram;
    /// ram.observe_writes(0, 10, move |_, _| {
    ///     inner.observe_reads(0, 10, |_| {});
    /// });
    /// ```
    pub fn observe_writes<F>(&mut self, low: Address, high: Address, callback: F) -> ObserverId
    where
        F: FnMut(Address, Word) + 'static,
    {
        self.write_observers.register(low..=high, Box::new(callback))
    }

    /// Remove a read observer. Returns `false` if it was not registered.
    pub fn remove_read_observer(&mut self, id: ObserverId) -> bool {
        self.read_observers.remove(id)
    }

    /// Remove a write observer. Returns `false` if it was not registered.
    pub fn remove_write_observer(&mut self, id: ObserverId) -> bool {
        self.write_observers.remove(id)
    }

    /// Returns the bookkeeping counters of the [Ram].
    pub fn stats(&self) -> RamStats {
        RamStats {
            page_size: self.page_size.words(),
            page_count: self.pages.len(),
            capacity: self.pages.capacity(),
            resident_bytes: self.resident_bytes(),
            read_observers: self.read_observers.len(),
            write_observers: self.write_observers.len(),
        }
    }

    /// Returns a human-readable string describing the resident size of the [Ram].
    ///
    /// ## Returns
    /// - A human-readable string describing the size of the [Ram] in B, KiB, MiB, GiB, TiB, PiB,
    ///   or EiB.
    pub fn usage(&self) -> String {
        let total = self.resident_bytes();
        const UNIT: u64 = 1024;
        if total < UNIT {
            return format!("{} B", total);
        }
        let mut div = UNIT;
        let mut exp = 0;
        let mut n = total / UNIT;
        while n >= UNIT {
            div *= UNIT;
            exp += 1;
            n /= UNIT;
        }
        format!("{:.1} {}iB", (total as f64) / (div as f64), ['K', 'M', 'G', 'T', 'P', 'E'][exp])
    }

    fn resident_bytes(&self) -> u64 {
        (self.pages.len() * self.page_size.words() * WORD_SIZE) as u64
    }
}

fn check_range(address: Address, len: usize) -> Result<()> {
    if address as u64 + len as u64 > ADDRESS_SPACE {
        return Err(MemoryError::RangeOverflow { address, len }.into());
    }
    Ok(())
}

#[cfg(test)]
mod test {
    use super::Ram;
    use crate::{
        error::MemoryError,
        page::{Address, PageSize, Word, DEFAULT_PAGE_SIZE},
    };
    use proptest::{collection::vec, prelude::any, proptest};
    use std::{cell::RefCell, rc::Rc};

    #[test]
    fn test_create() {
        let ram = Ram::new();
        assert_eq!(ram.page_count(), 0);
        assert_eq!(ram.page_size().words(), DEFAULT_PAGE_SIZE);
        assert_eq!(ram.usage(), "0 B");
    }

    #[test]
    fn test_low_address() {
        let mut ram = Ram::new();
        ram.set(512, 158);
        ram.set(8652, 326);

        assert_eq!(ram.get(512), 158);
        assert_eq!(ram.get(8652), 326);
    }

    #[test]
    fn test_high_address() {
        let mut ram = Ram::new();
        ram.set(1147483647, 84852);
        assert_eq!(ram.get(1147483647), 84852);
    }

    #[test]
    fn test_last_address() {
        let mut ram = Ram::new();
        ram.set(Address::MAX, 0xCAFE_F00D);
        ram.set(0, 0xBEEF_BABE);

        assert_eq!(ram.page_count(), 2);
        assert_eq!(ram.get(Address::MAX), 0xCAFE_F00D);
        assert_eq!(ram.get(Address::MAX - 1), 0);
        assert_eq!(ram.get(0), 0xBEEF_BABE);
    }

    #[test]
    fn test_many_access() {
        let mut ram = Ram::new();

        for address in (52..47483647).step_by(1284852) {
            ram.set(address, address);
        }
        assert!(ram.page_count() >= 37);

        for address in (52..47483647).step_by(1284852) {
            assert_eq!(ram.get(address), address);
        }
    }

    #[test]
    fn test_growth_beyond_initial_capacity() {
        let mut ram = Ram::with_page_size(PageSize::new(4).unwrap());

        for i in 0..1000u32 {
            ram.set(i * 4 + (i % 4), i);
        }
        assert_eq!(ram.page_count(), 1000);
        assert_eq!(ram.stats().capacity, 1024);

        for i in 0..1000u32 {
            assert_eq!(ram.get(i * 4 + (i % 4)), i);
        }
    }

    #[test]
    fn test_read_allocates_zero_page() {
        let mut ram = Ram::new();
        assert_eq!(ram.peek(5000), None);
        assert_eq!(ram.get(5000), 0);
        assert_eq!(ram.page_count(), 1);
        assert_eq!(ram.peek(5000), Some(0));
        assert_eq!(ram.peek(5001), Some(0));
    }

    #[test]
    fn test_peek_does_not_allocate_or_notify() {
        let mut ram = Ram::new();
        let fired = Rc::new(RefCell::new(0));
        let sink = Rc::clone(&fired);
        ram.observe_reads(0, Address::MAX, move |_| *sink.borrow_mut() += 1);

        assert_eq!(ram.peek(77), None);
        ram.set(77, 9);
        assert_eq!(ram.peek(77), Some(9));
        assert_eq!(ram.page_count(), 1);
        assert_eq!(*fired.borrow(), 0);
    }

    #[test]
    fn test_get_set() {
        let mut ram = Ram::new();
        ram.set(42, 1);
        assert_eq!(ram.get_set(42, 2), 1);
        assert_eq!(ram.get(42), 2);
        assert_eq!(ram.get_set(1 << 30, 3), 0);
        assert_eq!(ram.get(1 << 30), 3);
    }

    #[test]
    fn test_bulk_init() {
        let mut ram = Ram::new();
        ram.bulk_init(&[1, 2, 3, 4, 5, 6, 7, 8]).unwrap();
        for i in 0..8 {
            assert_eq!(ram.get(i), i + 1);
        }
        assert_eq!(ram.get(8), 0);
    }

    #[test]
    fn test_bulk_init_spans_pages() {
        let mut ram = Ram::with_page_size(PageSize::new(16).unwrap());
        let data = (0..100).map(|i| i * 3).collect::<Vec<Word>>();

        ram.bulk_init(&data).unwrap();
        assert_eq!(ram.page_count(), 7);
        for (i, word) in data.iter().enumerate() {
            assert_eq!(ram.get(i as Address), *word);
        }
    }

    #[test]
    fn test_set_range_unaligned_start() {
        let mut ram = Ram::with_page_size(PageSize::new(8).unwrap());
        ram.set_range(5, &[10, 11, 12, 13, 14]).unwrap();

        assert_eq!(ram.page_count(), 2);
        assert_eq!(ram.read_range(4, 7).unwrap(), vec![0, 10, 11, 12, 13, 14, 0]);
    }

    #[test]
    fn test_set_range_ending_at_last_word() {
        let mut ram = Ram::new();
        ram.set_range(Address::MAX - 1, &[1, 2]).unwrap();
        assert_eq!(ram.get(Address::MAX - 1), 1);
        assert_eq!(ram.get(Address::MAX), 2);
        assert_eq!(ram.peek(0), None);
    }

    #[test]
    fn test_set_range_overflow_is_rejected() {
        let mut ram = Ram::new();
        let err = ram.set_range(Address::MAX, &[1, 2]).unwrap_err();

        assert_eq!(
            err.downcast_ref::<MemoryError>(),
            Some(&MemoryError::RangeOverflow { address: Address::MAX, len: 2 })
        );
        assert_eq!(ram.page_count(), 0);
        assert!(ram.read_range(Address::MAX - 2, 4).is_err());
    }

    #[test]
    fn test_bulk_init_does_not_notify() {
        let mut ram = Ram::new();
        let fired = Rc::new(RefCell::new(0));
        let sink = Rc::clone(&fired);
        ram.observe_writes(0, 100, move |_, _| *sink.borrow_mut() += 1);

        ram.bulk_init(&[1, 2, 3]).unwrap();
        assert_eq!(*fired.borrow(), 0);
    }

    #[test]
    fn test_stats_and_usage() {
        let mut ram = Ram::new();
        ram.set(0, 1);
        ram.set(4096, 1);
        ram.observe_reads(0, 1, |_| {});

        let stats = ram.stats();
        assert_eq!(stats.page_count, 2);
        assert_eq!(stats.capacity, 64);
        assert_eq!(stats.resident_bytes, 8192);
        assert_eq!(stats.read_observers, 1);
        assert_eq!(stats.write_observers, 0);
        assert_eq!(ram.usage(), "8.0 KiB");
    }

    proptest! {
        #[test]
        fn test_write_then_read(writes in vec((any::<u32>(), any::<u32>()), 1..64)) {
            let mut ram = Ram::new();
            for (address, value) in writes.iter() {
                ram.set(*address, *value);
            }

            // The last write to an address wins.
            let mut expected = std::collections::HashMap::new();
            for (address, value) in writes {
                expected.insert(address, value);
            }
            for (address, value) in expected {
                assert_eq!(ram.get(address), value);
            }
        }

        #[test]
        fn test_untouched_reads_zero(address in any::<u32>(), other in any::<u32>()) {
            let mut ram = Ram::new();
            if address != other {
                ram.set(other, 0xFFFF_FFFF);
                assert_eq!(ram.get(address), 0);
            }
        }

        #[test]
        fn test_get_set_matches_get_then_set(address in any::<u32>(), first in any::<u32>(), second in any::<u32>()) {
            let mut split = Ram::new();
            let mut fused = Ram::new();
            split.set(address, first);
            fused.set(address, first);

            let old = split.get(address);
            split.set(address, second);

            assert_eq!(fused.get_set(address, second), old);
            assert_eq!(fused.get(address), split.get(address));
            assert_eq!(fused.page_count(), split.page_count());
        }
    }
}
