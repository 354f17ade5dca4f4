//! The [Screen] renders styled character words to a terminal.

use crate::{
    style::{StyledChar, CHAR_MASK},
    BASE_ADDRESS, HEIGHT, SIZE, WIDTH,
};
use anyhow::{ensure, Result};
use crossterm::{
    cursor::{Hide, MoveTo, RestorePosition, SavePosition, Show},
    queue,
    style::{Print, ResetColor, SetAttribute, SetBackgroundColor, SetForegroundColor, Attribute},
    terminal::{Clear, ClearType},
};
use sparsemem_memory::{Address, ObserverId, Ram, Word};
use std::{cell::RefCell, io::Write, rc::Rc};

/// A [WIDTH] x [HEIGHT] character screen drawn with terminal escape sequences on `W`.
#[derive(Debug)]
pub struct Screen<W: Write> {
    out: W,
}

impl<W: Write> Screen<W> {
    /// Create a new [Screen] drawing on `out`.
    pub fn new(out: W) -> Self {
        Self { out }
    }

    /// Hide the cursor, clear the terminal and park the cursor below the character grid.
    pub fn init(&mut self) -> Result<()> {
        queue!(self.out, Hide, Clear(ClearType::All), MoveTo(0, HEIGHT as u16))?;
        self.out.flush()?;
        Ok(())
    }

    /// Restore the cursor.
    pub fn terminate(&mut self) -> Result<()> {
        queue!(self.out, Show)?;
        self.out.flush()?;
        Ok(())
    }

    /// Draw the styled character `word` in the cell at column `x` and row `y`. The terminal
    /// cursor is left where it was.
    pub fn put_char(&mut self, x: u32, y: u32, word: Word) -> Result<()> {
        ensure!(x < WIDTH && y < HEIGHT, "Cell ({}, {}) is outside of the screen", x, y);

        let cell = StyledChar::decode(word);
        queue!(self.out, SavePosition, MoveTo(x as u16, y as u16))?;

        // Most words carry no styling at all; skip the attribute sequences for them.
        if word & !CHAR_MASK == 0 {
            queue!(self.out, Print(cell.printable()))?;
        } else {
            queue!(
                self.out,
                SetAttribute(Attribute::Reset),
                SetForegroundColor(cell.foreground()),
                SetBackgroundColor(cell.background())
            )?;
            for attribute in cell.style.attributes() {
                queue!(self.out, SetAttribute(attribute))?;
            }
            queue!(self.out, Print(cell.printable()), SetAttribute(Attribute::Reset), ResetColor)?;
        }

        queue!(self.out, RestorePosition)?;
        self.out.flush()?;
        Ok(())
    }

    /// Draw the word written at `address` of the screen memory. Addresses outside of the screen
    /// memory are ignored.
    pub fn on_write(&mut self, address: Address, word: Word) {
        let Some((x, y)) = cell_of(address) else {
            return;
        };
        if let Err(e) = self.put_char(x, y, word) {
            tracing::warn!(target: "sparsemem::screen", "Failed to draw cell ({}, {}): {}", x, y, e);
        }
    }

    /// Returns a reference to the output.
    pub fn get_ref(&self) -> &W {
        &self.out
    }

    /// Returns a mutable reference to the output.
    pub fn get_mut(&mut self) -> &mut W {
        &mut self.out
    }

    /// Consume the [Screen] and return its output.
    pub fn into_inner(self) -> W {
        self.out
    }
}

/// Returns the column and row of the cell mapped at `address`, if any.
pub fn cell_of(address: Address) -> Option<(u32, u32)> {
    let offset = address.checked_sub(BASE_ADDRESS).filter(|offset| *offset < SIZE)?;
    Some((offset % WIDTH, offset / WIDTH))
}

/// Map `screen` onto the screen memory of `ram`: every write to
/// `[BASE_ADDRESS, BASE_ADDRESS + SIZE - 1]` draws the written word.
///
/// ## Returns
/// - The shared [Screen], to drive it once mapped, and the id of its write observer.
pub fn attach<W>(ram: &mut Ram, screen: Screen<W>) -> (Rc<RefCell<Screen<W>>>, ObserverId)
where
    W: Write + 'static,
{
    let screen = Rc::new(RefCell::new(screen));
    let mapped = Rc::clone(&screen);
    let id = ram.observe_writes(BASE_ADDRESS, BASE_ADDRESS + SIZE - 1, move |address, word| {
        mapped.borrow_mut().on_write(address, word)
    });

    tracing::debug!(
        target: "sparsemem::screen",
        "Mapped {}x{} screen @ [{:#x}, {:#x}]",
        WIDTH,
        HEIGHT,
        BASE_ADDRESS,
        BASE_ADDRESS + SIZE - 1
    );
    (screen, id)
}
