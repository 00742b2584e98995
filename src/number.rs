//! Numeric formatting for seven-segment rows.

use core::fmt::{self, Write};
use core::iter::Peekable;
use core::str::Chars;

use crate::protocol::{MAX_DEVICES, MAX_SCAN_DIGITS};

/// Longest canonical form kept; anything past it can never be displayed.
pub const MAX_TEXT_LEN: usize = MAX_DEVICES * MAX_SCAN_DIGITS as usize + 1;

/// Canonical text of a number.
pub type NumberText = heapless::String<MAX_TEXT_LEN>;

/// A value accepted by [`crate::SevenSegment::set_number`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Number<'a> {
    /// Any primitive integer up to 64 bits, signed or not.
    Integer(i128),
    Float(f64),
    /// Formatted at `f32` precision, so `1.3f32` shows as `1.3`.
    Float32(f32),
    /// Numeric-looking text: digits with at most one decimal point,
    /// optionally surrounded by whitespace.
    Text(&'a str),
}

macro_rules! integer_from {
    ($($t:ty),*) => {
        $(impl From<$t> for Number<'_> {
            fn from(value: $t) -> Self {
                Number::Integer(value as i128)
            }
        })*
    };
}

integer_from!(i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, usize);

impl From<f32> for Number<'_> {
    fn from(value: f32) -> Self {
        Number::Float32(value)
    }
}

impl From<f64> for Number<'_> {
    fn from(value: f64) -> Self {
        Number::Float(value)
    }
}

impl<'a> From<&'a str> for Number<'a> {
    fn from(value: &'a str) -> Self {
        Number::Text(value)
    }
}

/// Writer that keeps the first `MAX_TEXT_LEN` bytes and drops the rest.
struct Truncating<'s>(&'s mut NumberText);

impl Write for Truncating<'_> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        for ch in s.chars() {
            if self.0.push(ch).is_err() {
                break;
            }
        }
        Ok(())
    }
}

impl Number<'_> {
    /// Canonical text form, empty when the value is not displayable.
    ///
    /// Floats always carry a fractional part (`5.0`, not `5`); non-finite
    /// floats and malformed text are empty.
    pub fn canonical(&self) -> NumberText {
        let mut text = NumberText::new();
        match *self {
            Number::Integer(value) => {
                let _ = write!(Truncating(&mut text), "{value}");
            }
            Number::Float(value) if value.is_finite() => write_float(&mut text, value),
            Number::Float32(value) if value.is_finite() => write_float(&mut text, value),
            Number::Float(_) | Number::Float32(_) => {}
            Number::Text(value) => {
                let trimmed = value.trim();
                if is_numeric(trimmed) {
                    let _ = Truncating(&mut text).write_str(trimmed);
                }
            }
        }
        text
    }
}

fn write_float(text: &mut NumberText, value: impl fmt::Display) {
    let _ = write!(Truncating(&mut *text), "{value}");
    if !text.contains('.') {
        let _ = Truncating(&mut *text).write_str(".0");
    }
}

/// Digits with at most one decimal point and at least one digit.
fn is_numeric(text: &str) -> bool {
    let mut points = 0;
    let mut digits = 0;
    for ch in text.chars() {
        match ch {
            '0'..='9' => digits += 1,
            '.' => points += 1,
            _ => return false,
        }
    }
    digits > 0 && points <= 1
}

/// Cuts `text` to what fits in `digit_count` cells.
///
/// A decimal point shares its cell with the preceding digit, so text
/// containing one gets a budget of one extra character.
pub fn truncate(text: &str, digit_count: usize) -> &str {
    let budget = if text.contains('.') {
        digit_count + 1
    } else {
        digit_count
    };

    match text.char_indices().nth(budget) {
        Some((end, _)) => &text[..end],
        None => text,
    }
}

/// One rendered digit cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cell {
    pub ch: char,
    pub dot: bool,
}

/// Splits text into digit cells, folding each decimal point into the
/// cell before it.
///
/// A point with no preceding character gets a blank cell of its own.
pub fn cells(text: &str) -> Cells<'_> {
    Cells {
        chars: text.chars().peekable(),
    }
}

pub struct Cells<'a> {
    chars: Peekable<Chars<'a>>,
}

impl Iterator for Cells<'_> {
    type Item = Cell;

    fn next(&mut self) -> Option<Cell> {
        let ch = self.chars.next()?;
        if ch == '.' {
            return Some(Cell { ch: ' ', dot: true });
        }

        let dot = self.chars.next_if_eq(&'.').is_some();
        Some(Cell { ch, dot })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rendered(number: Number<'_>, digit_count: usize) -> Vec<(char, bool)> {
        let text = number.canonical();
        cells(truncate(&text, digit_count))
            .map(|cell| (cell.ch, cell.dot))
            .collect()
    }

    #[test]
    fn canonical_forms() {
        assert_eq!(Number::from(42).canonical().as_str(), "42");
        assert_eq!(Number::from(-7).canonical().as_str(), "-7");
        assert_eq!(Number::from(123.4).canonical().as_str(), "123.4");
        assert_eq!(Number::from(5.0).canonical().as_str(), "5.0");
        assert_eq!(Number::from(" 3.14 ").canonical().as_str(), "3.14");
        assert_eq!(Number::from(1.3f32).canonical().as_str(), "1.3");
        assert_eq!(Number::from(0.1f32).canonical().as_str(), "0.1");
        assert_eq!(Number::from(2.0f32).canonical().as_str(), "2.0");
        assert_eq!(Number::from("0012").canonical().as_str(), "0012");
    }

    #[test]
    fn malformed_input_is_empty() {
        for text in ["abc", "", "  ", ".", "1.2.3", "12a", "-5", "1 2"] {
            assert!(Number::Text(text).canonical().is_empty(), "{text:?}");
        }
        assert!(Number::Float(f64::NAN).canonical().is_empty());
        assert!(Number::Float(f64::INFINITY).canonical().is_empty());
        assert!(Number::Float32(f32::NAN).canonical().is_empty());
    }

    #[test]
    fn every_integer_width_converts_losslessly() {
        assert_eq!(Number::from(5usize).canonical().as_str(), "5");
        assert_eq!(Number::from(-5isize).canonical().as_str(), "-5");
        assert_eq!(
            Number::from(u64::MAX).canonical().as_str(),
            "18446744073709551615"
        );
        assert_eq!(
            Number::from(i64::MIN).canonical().as_str(),
            "-9223372036854775808"
        );
    }

    #[test]
    fn huge_floats_are_cut_not_dropped() {
        let text = Number::Float(1e300).canonical();
        assert_eq!(text.len(), MAX_TEXT_LEN);
        assert!(text.starts_with('1'));
    }

    #[test]
    fn point_folds_into_preceding_digit() {
        assert_eq!(
            rendered(Number::Float(123.4), 8),
            [('1', false), ('2', false), ('3', true), ('4', false)]
        );
    }

    #[test]
    fn point_gets_extra_budget() {
        assert_eq!(truncate("1234567.89", 8), "1234567.8");
        assert_eq!(truncate("123456789", 8), "12345678");
        assert_eq!(truncate("12.5", 8), "12.5");
        assert_eq!(rendered(Number::Text("1234567.89"), 8).len(), 8);
    }

    #[test]
    fn trailing_point_lights_last_digit() {
        assert_eq!(rendered(Number::Text("12."), 4), [('1', false), ('2', true)]);
    }

    #[test]
    fn leading_point_takes_its_own_cell() {
        assert_eq!(rendered(Number::Text(".5"), 4), [(' ', true), ('5', false)]);
    }
}
