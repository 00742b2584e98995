//! Character to segment lookup.
//!
//! MAX7219 in no-decode mode maps segment bytes as `DP A B C D E F G`
//! from bit 7 down to bit 0. Glyph tables only produce bits 0-6; the
//! decimal point is added by the driver.

/// Segment byte mask without the decimal point.
pub const SEGMENTS: u8 = 0x7F;

/// Glyph lookup for printable characters.
pub trait Glyphs {
    /// Segment bits (0-6) for `ch`.
    fn glyph(&self, ch: char) -> u8;
}

impl<F> Glyphs for F
where
    F: Fn(char) -> u8,
{
    fn glyph(&self, ch: char) -> u8 {
        self(ch) & SEGMENTS
    }
}

/// Printable ASCII font (`' '..='~'`).
///
/// Characters outside the table render as `?`.
#[derive(Debug, Clone, Copy, Default)]
pub struct AsciiFont;

impl Glyphs for AsciiFont {
    fn glyph(&self, ch: char) -> u8 {
        let index = (ch as u32)
            .checked_sub(FIRST as u32)
            .filter(|&index| (index as usize) < ASCII.len())
            .unwrap_or((b'?' - FIRST) as u32);
        ASCII[index as usize]
    }
}

const FIRST: u8 = b' ';

/// Converts a `.GFEDCBA` segment byte (segment A in bit 0) to register order.
const fn register_order(gfedcba: u8) -> u8 {
    let mut out = 0;
    let mut segment = 0;
    while segment < 7 {
        if gfedcba & (1 << segment) != 0 {
            out |= 1 << (6 - segment);
        }
        segment += 1;
    }
    out
}

const fn build(table: [u8; 95]) -> [u8; 95] {
    let mut out = [0u8; 95];
    let mut i = 0;
    while i < table.len() {
        out[i] = register_order(table[i]);
        i += 1;
    }
    out
}

// Source rows are `.GFEDCBA`, eight characters per row starting at ' '.
#[rustfmt::skip]
static ASCII: [u8; 95] = build([
    // ' '   !     "     #     $     %     &     '
    0x00, 0x06, 0x22, 0x7E, 0x6D, 0x52, 0x46, 0x20,
    // (     )     *     +     ,     -     .     /
    0x29, 0x0B, 0x21, 0x70, 0x10, 0x40, 0x00, 0x52,
    // 0     1     2     3     4     5     6     7
    0x3F, 0x06, 0x5B, 0x4F, 0x66, 0x6D, 0x7D, 0x07,
    // 8     9     :     ;     <     =     >     ?
    0x7F, 0x6F, 0x09, 0x0D, 0x61, 0x48, 0x43, 0x53,
    // @     A     B     C     D     E     F     G
    0x5F, 0x77, 0x7C, 0x39, 0x5E, 0x79, 0x71, 0x3D,
    // H     I     J     K     L     M     N     O
    0x76, 0x30, 0x1E, 0x75, 0x38, 0x15, 0x37, 0x3F,
    // P     Q     R     S     T     U     V     W
    0x73, 0x6B, 0x33, 0x6D, 0x78, 0x3E, 0x3E, 0x2A,
    // X     Y     Z     [     \     ]     ^     _
    0x76, 0x6E, 0x5B, 0x39, 0x64, 0x0F, 0x23, 0x08,
    // `     a     b     c     d     e     f     g
    0x02, 0x5F, 0x7C, 0x58, 0x5E, 0x7B, 0x71, 0x6F,
    // h     i     j     k     l     m     n     o
    0x74, 0x10, 0x0C, 0x75, 0x30, 0x14, 0x54, 0x5C,
    // p     q     r     s     t     u     v     w
    0x73, 0x67, 0x50, 0x6D, 0x78, 0x1C, 0x1C, 0x14,
    // x     y     z     {     |     }     ~
    0x76, 0x6E, 0x5B, 0x46, 0x30, 0x70, 0x01,
]);
