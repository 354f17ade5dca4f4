//! Open addressing hash table mapping page base addresses to resident [Page]s.
//!
//! The table uses linear probing over a power-of-two slot array, so the home slot of a key is
//! `hash(key) & (capacity - 1)`. It only grows, doubling its capacity whenever it is completely
//! full and a new page must be inserted. Pages are never removed.

use crate::page::{Address, Page};

/// The initial number of slots in a [PageTable]. Must be a power of two.
pub const INITIAL_CAPACITY: usize = 64;

/// Mix the bits of `x` so that the low bits used to pick a slot are well distributed.
#[inline(always)]
pub fn hash(x: Address) -> u32 {
    let x = ((x >> 16) ^ x).wrapping_mul(0x45d9f3b);
    let x = ((x >> 16) ^ x).wrapping_mul(0x45d9f3b);
    (x >> 16) ^ x
}

/// The outcome of probing a [PageTable] for a page base address.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum Probe {
    /// The slot at this index holds the page.
    Occupied(usize),
    /// The page is absent and this is the first empty slot on its probe sequence.
    Vacant(usize),
    /// The page is absent and every slot is taken.
    Full,
}

/// A hash table of [Page]s keyed by their base address.
#[derive(Debug, Clone)]
pub struct PageTable {
    /// The slot array. An empty slot holds no page.
    slots: Vec<Option<Page>>,
    /// The number of occupied slots.
    count: usize,
}

impl Default for PageTable {
    fn default() -> Self {
        Self::with_capacity(INITIAL_CAPACITY)
    }
}

impl PageTable {
    /// Create an empty [PageTable] with `capacity` slots, rounded up to a power of two.
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1).next_power_of_two();
        Self { slots: empty_slots(capacity), count: 0 }
    }

    /// Returns the number of resident pages.
    #[inline(always)]
    pub fn len(&self) -> usize {
        self.count
    }

    /// Returns `true` if no page is resident.
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Returns the number of slots in the table.
    #[inline(always)]
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Probe for the slot of the page starting at `base`.
    ///
    /// ## Takes
    /// - `base`: The base address of the page.
    ///
    /// ## Returns
    /// - [Probe::Occupied] with the slot holding the page if it is resident.
    /// - [Probe::Vacant] with the slot where the page belongs if it is not.
    /// - [Probe::Full] if the page is not resident and there is no room for it.
    #[inline(always)]
    pub fn find_slot(&self, base: Address) -> Probe {
        probe(&self.slots, base)
    }

    /// Look up the page starting at `base` without allocating it.
    pub fn get(&self, base: Address) -> Option<&Page> {
        match self.find_slot(base) {
            Probe::Occupied(index) => self.slots[index].as_ref(),
            _ => None,
        }
    }

    /// Look up the page starting at `base`, inserting a zeroed page of `words` words if it is not
    /// resident yet. The table grows first if it is full.
    ///
    /// ## Takes
    /// - `base`: The base address of the page.
    /// - `words`: The size of a freshly allocated page.
    ///
    /// ## Returns
    /// - The resident page.
    #[inline(always)]
    pub fn get_or_insert(&mut self, base: Address, words: usize) -> &mut Page {
        let index = match self.find_slot(base) {
            Probe::Occupied(index) => index,
            Probe::Vacant(index) => self.insert_at(index, base, words),
            Probe::Full => {
                self.grow();
                match self.find_slot(base) {
                    Probe::Vacant(index) => self.insert_at(index, base, words),
                    other => unreachable!("page {:#x} probed {:?} after growth", base, other),
                }
            }
        };

        match &mut self.slots[index] {
            Some(page) => page,
            None => unreachable!("slot {} is empty after lookup", index),
        }
    }

    /// Double the capacity of the table and reinsert every resident page.
    pub fn grow(&mut self) {
        let old_capacity = self.capacity();
        let mut slots = empty_slots(old_capacity * 2);

        for page in std::mem::take(&mut self.slots).into_iter().flatten() {
            match probe(&slots, page.base()) {
                Probe::Vacant(index) => slots[index] = Some(page),
                other => unreachable!("page {:#x} probed {:?} during rehash", page.base(), other),
            }
        }
        self.slots = slots;

        tracing::debug!(
            target: "sparsemem::page_table",
            "Grew page table from {} to {} slots ({} pages resident)",
            old_capacity,
            self.capacity(),
            self.count
        );
    }

    /// Returns an iterator over the resident pages, in slot order.
    pub fn iter(&self) -> impl Iterator<Item = &Page> {
        self.slots.iter().flatten()
    }

    fn insert_at(&mut self, index: usize, base: Address, words: usize) -> usize {
        tracing::trace!(target: "sparsemem::page_table", "Allocating page @ {:#010x}", base);
        self.slots[index] = Some(Page::new(base, words));
        self.count += 1;
        index
    }
}

fn empty_slots(capacity: usize) -> Vec<Option<Page>> {
    let mut slots = Vec::with_capacity(capacity);
    slots.resize_with(capacity, || None);
    slots
}

/// Linear probe from the home slot of `base`, wrapping around at most once.
#[inline(always)]
fn probe(slots: &[Option<Page>], base: Address) -> Probe {
    let mask = slots.len() - 1;
    let mut index = hash(base) as usize & mask;

    for _ in 0..slots.len() {
        match &slots[index] {
            Some(page) if page.base() == base => return Probe::Occupied(index),
            Some(_) => index = (index + 1) & mask,
            None => return Probe::Vacant(index),
        }
    }
    Probe::Full
}
