//! Decoding of the styled character words stored in the screen memory.
//!
//! ```text
//!  31    26 25      18 17   13 12    8  7  6       0
//! +--------+----------+-------+-------+---+---------+
//! | unused |  style   |  bg   |  fg   | 0 |  ASCII  |
//! +--------+----------+-------+-------+---+---------+
//! ```

use bitflags::bitflags;
use crossterm::style::{Attribute, Color};
use sparsemem_memory::Word;

/// Mask of the ASCII character bits.
pub const CHAR_MASK: Word = 0x7F;

const FG_SHIFT: u32 = 8;
const BG_SHIFT: u32 = 13;
const COLOR_MASK: Word = 0x1F;

bitflags! {
    /// Text attributes of a styled character.
    #[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
    pub struct Style: u32 {
        const BOLD = 1 << 18;
        const FAINT = 1 << 19;
        const ITALIC = 1 << 20;
        const UNDERLINE = 1 << 21;
        const BLINKING = 1 << 22;
        const HIDE = 1 << 23;
        const CROSSED = 1 << 24;
        const OVERLINE = 1 << 25;
    }
}

impl Style {
    /// Returns the terminal attributes to enable for this style, in bit order.
    pub fn attributes(self) -> impl Iterator<Item = Attribute> {
        [
            (Style::BOLD, Attribute::Bold),
            (Style::FAINT, Attribute::Dim),
            (Style::ITALIC, Attribute::Italic),
            (Style::UNDERLINE, Attribute::Underlined),
            // Fast blinking is not widely supported.
            (Style::BLINKING, Attribute::SlowBlink),
            (Style::HIDE, Attribute::Hidden),
            (Style::CROSSED, Attribute::CrossedOut),
            (Style::OVERLINE, Attribute::OverLined),
        ]
        .into_iter()
        .filter(move |(flag, _)| self.contains(*flag))
        .map(|(_, attribute)| attribute)
    }
}

/// A character cell decoded from a screen word.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct StyledChar {
    /// The 7 bit ASCII character.
    pub ch: u8,
    /// Foreground palette index; 0 is the terminal default.
    pub fg: u8,
    /// Background palette index; 0 is the terminal default.
    pub bg: u8,
    /// Text attributes.
    pub style: Style,
}

impl StyledChar {
    /// Decode a screen word. Bits outside the layout are ignored.
    pub fn decode(word: Word) -> Self {
        Self {
            ch: (word & CHAR_MASK) as u8,
            fg: ((word >> FG_SHIFT) & COLOR_MASK) as u8,
            bg: ((word >> BG_SHIFT) & COLOR_MASK) as u8,
            style: Style::from_bits_truncate(word),
        }
    }

    /// Encode the cell back into a screen word.
    pub fn encode(&self) -> Word {
        (self.ch as Word & CHAR_MASK)
            | ((self.fg as Word & COLOR_MASK) << FG_SHIFT)
            | ((self.bg as Word & COLOR_MASK) << BG_SHIFT)
            | self.style.bits()
    }

    /// Returns the character to print. Control characters are shown as blanks so that they
    /// cannot move the terminal cursor out of its cell.
    pub fn printable(&self) -> char {
        match self.ch {
            0x20..=0x7E => self.ch as char,
            _ => ' ',
        }
    }

    /// Returns the foreground color.
    pub fn foreground(&self) -> Color {
        palette(self.fg)
    }

    /// Returns the background color.
    pub fn background(&self) -> Color {
        palette(self.bg)
    }
}

/// Map a palette index onto a terminal color: 0 is the default color, 1 to 8 are the normal
/// colors and 9 to 16 the bright ones. Other indices fall back to the default color.
pub fn palette(index: u8) -> Color {
    match index {
        1..=16 => Color::AnsiValue(index - 1),
        _ => Color::Reset,
    }
}
