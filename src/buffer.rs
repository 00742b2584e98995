//! In-memory digit buffer.

/// Decimal point bit of a segment byte.
pub const DECIMAL_POINT: u8 = 0x80;
/// Segment byte of an unlit digit.
pub const BLANK: u8 = 0x00;

/// Direction of a one-digit shift.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Shift {
    /// Content moves towards position 0.
    Left,
    /// Content moves towards the last position.
    Right,
}

/// One segment byte per logical digit position.
///
/// The length is fixed for the lifetime of the buffer.
pub struct DigitBuffer<'b> {
    cells: &'b mut [u8],
}

impl<'b> DigitBuffer<'b> {
    /// Wraps `cells`, blanking it.
    pub fn new(cells: &'b mut [u8]) -> Self {
        let mut buffer = Self { cells };
        buffer.clear();
        buffer
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Blanks every digit.
    pub fn clear(&mut self) {
        self.cells.fill(BLANK);
    }

    /// Overwrites one digit.
    ///
    /// Returns `true` when `position` is in range, `false` otherwise; an out
    /// of range write leaves the buffer untouched.
    pub fn set(&mut self, position: usize, value: u8) -> bool {
        match self.cells.get_mut(position) {
            Some(cell) => {
                *cell = value;
                true
            }
            None => false,
        }
    }

    pub fn get(&self, position: usize) -> Option<u8> {
        self.cells.get(position).copied()
    }

    pub fn as_slice(&self) -> &[u8] {
        self.cells
    }

    /// Shifts the content one digit.
    ///
    /// With `rotate` the digit pushed off one end re-enters at the other,
    /// otherwise a blank digit is shifted in.
    pub fn shift(&mut self, direction: Shift, rotate: bool) {
        if self.cells.is_empty() {
            return;
        }

        let last = self.cells.len() - 1;
        match direction {
            Shift::Left => {
                self.cells.rotate_left(1);
                if !rotate {
                    self.cells[last] = BLANK;
                }
            }
            Shift::Right => {
                self.cells.rotate_right(1);
                if !rotate {
                    self.cells[0] = BLANK;
                }
            }
        }
    }
}
