//! Shared helpers for the integration tests.

#![allow(dead_code)]

use sparsemem_memory::{Address, Ram, Word};
use std::{cell::RefCell, rc::Rc};

/// Records which observers fired, tagged by their registration index.
#[derive(Debug, Default, Clone)]
pub struct Hits(Rc<RefCell<Vec<(usize, Address, Option<Word>)>>>);

impl Hits {
    /// Register one read observer per range, in order.
    pub fn observe_reads(&self, ram: &mut Ram, ranges: &[(Address, Address)]) {
        for (tag, (low, high)) in ranges.iter().copied().enumerate() {
            let hits = Rc::clone(&self.0);
            ram.observe_reads(low, high, move |address| {
                hits.borrow_mut().push((tag, address, None))
            });
        }
    }

    /// Register one write observer per range, in order.
    pub fn observe_writes(&self, ram: &mut Ram, ranges: &[(Address, Address)]) {
        for (tag, (low, high)) in ranges.iter().copied().enumerate() {
            let hits = Rc::clone(&self.0);
            ram.observe_writes(low, high, move |address, value| {
                hits.borrow_mut().push((tag, address, Some(value)))
            });
        }
    }

    /// Returns the tags of the observers that fired since the last call, in firing order.
    pub fn take_tags(&self) -> Vec<usize> {
        self.take().into_iter().map(|(tag, _, _)| tag).collect()
    }

    /// Returns every hit since the last call.
    pub fn take(&self) -> Vec<(usize, Address, Option<Word>)> {
        std::mem::take(&mut *self.0.borrow_mut())
    }
}

/// The observer ranges exercised by the dispatch tests.
pub const RANGES: [(Address, Address); 3] = [(156, 89965), (9532, 89965), (50, 100)];
