#![doc = include_str!("../README.md")]

use sparsemem_memory::Address;

/// The width of the screen, in characters.
pub const WIDTH: u32 = 64;

/// The height of the screen, in characters.
pub const HEIGHT: u32 = 16;

/// The number of character cells of the screen.
pub const SIZE: u32 = WIDTH * HEIGHT;

/// The address of the first cell of the screen memory.
pub const BASE_ADDRESS: Address = 0;

mod screen;
pub use screen::{attach, cell_of, Screen};

pub mod style;
pub use style::{Style, StyledChar};
