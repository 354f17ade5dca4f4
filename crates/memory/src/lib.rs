#![doc = include_str!("../README.md")]

mod error;
pub use error::MemoryError;

pub mod image;

pub mod observer;
pub use observer::ObserverId;

pub mod page;
pub use page::{Address, PageSize, Word};

pub mod page_table;

mod ram;
pub use ram::{Ram, RamStats};

mod rom;
pub use rom::Rom;
