//! Range-scoped observers notified around memory accesses.
//!
//! Observers are kept in registration order and every observer whose inclusive range contains an
//! accessed address is invoked, in that order. Overlapping ranges all fire.
//!
//! Callbacks only receive the accessed address (and the written value), never the memory itself.
//! The memory is exclusively borrowed for the whole access, so a callback cannot register or
//! remove observers while the list is being walked; such code is rejected at compile time rather
//! than left to runtime policy.

use crate::page::{Address, Word};
use std::{fmt, ops::RangeInclusive};

/// Callback invoked with the address of a read, before the value is returned.
pub type ReadCallback = dyn FnMut(Address);

/// Callback invoked with the address and the new value of a write, after the value is stored.
pub type WriteCallback = dyn FnMut(Address, Word);

/// A handle on a registered observer, used to remove it.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub struct ObserverId(u64);

struct Observer<F: ?Sized> {
    id: ObserverId,
    range: RangeInclusive<Address>,
    callback: Box<F>,
}

/// An ordered list of observers of one access kind.
pub struct Observers<F: ?Sized> {
    entries: Vec<Observer<F>>,
    next_id: u64,
}

impl<F: ?Sized> Default for Observers<F> {
    fn default() -> Self {
        Self { entries: Vec::new(), next_id: 0 }
    }
}

impl<F: ?Sized> fmt::Debug for Observers<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.entries.iter().map(|o| (o.id, &o.range))).finish()
    }
}

impl<F: ?Sized> Observers<F> {
    /// Append an observer of `range` to the end of the list.
    ///
    /// An inverted range (`start > end`) is accepted and never matches.
    pub fn register(&mut self, range: RangeInclusive<Address>, callback: Box<F>) -> ObserverId {
        let id = ObserverId(self.next_id);
        self.next_id += 1;
        self.entries.push(Observer { id, range, callback });
        id
    }

    /// Remove the observer registered as `id`, keeping the order of the others.
    ///
    /// ## Returns
    /// - `true` if the observer was registered.
    pub fn remove(&mut self, id: ObserverId) -> bool {
        match self.entries.iter().position(|o| o.id == id) {
            Some(index) => {
                self.entries.remove(index);
                true
            }
            None => false,
        }
    }

    /// Returns the number of registered observers.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if no observer is registered.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns the observers whose range contains `address`, in invocation order.
    pub fn matching(&self, address: Address) -> impl Iterator<Item = ObserverId> + '_ {
        self.entries.iter().filter(move |o| o.range.contains(&address)).map(|o| o.id)
    }
}

impl Observers<ReadCallback> {
    /// Invoke every read observer whose range contains `address`.
    #[inline(always)]
    pub fn dispatch(&mut self, address: Address) {
        for observer in self.entries.iter_mut() {
            if observer.range.contains(&address) {
                (observer.callback)(address);
            }
        }
    }
}

impl Observers<WriteCallback> {
    /// Invoke every write observer whose range contains `address` with the written `value`.
    #[inline(always)]
    pub fn dispatch(&mut self, address: Address, value: Word) {
        for observer in self.entries.iter_mut() {
            if observer.range.contains(&address) {
                (observer.callback)(address, value);
            }
        }
    }
}
