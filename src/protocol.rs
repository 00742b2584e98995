//! Wire-level protocol helpers for MAX7219 chains.
//!
//! Every transfer is a sequence of 16-bit words, sent as `[register, value]`
//! byte pairs. Each device in a chain latches the last word shifted into it
//! when chip-select rises and forwards everything before it to the next
//! device, so a packet must carry exactly one pair per device.

use heapless::Vec;

/// Largest chain the driver can address.
pub const MAX_DEVICES: usize = 16;
/// Digits driven by a single device.
pub const MAX_SCAN_DIGITS: u8 = 8;
/// Largest packet ever sent over the bus.
pub const MAX_PACKET_SIZE: usize = MAX_DEVICES * 2;
/// Highest accepted intensity level.
pub const MAX_INTENSITY: u8 = 0x0F;

/// Packet holding one register/value pair per chained device.
pub type Packet = Vec<u8, MAX_PACKET_SIZE>;

/// MAX7219 register addresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Register {
    /// No-op (00h) - shifts data through without side effects
    Noop = 0x00,
    /// Digit 0 (01h); digits 1-7 follow at 02h-08h
    Digit0 = 0x01,
    /// Decode Mode (09h) - BCD decode per digit, 0 for raw segments
    DecodeMode = 0x09,
    /// Intensity (0Ah) - PWM brightness 0-15
    Intensity = 0x0A,
    /// Scan Limit (0Bh) - number of digits scanned minus one
    ScanLimit = 0x0B,
    /// Shutdown (0Ch) - 0 blanks the display, 1 is normal operation
    Shutdown = 0x0C,
    /// Display Test (0Fh) - 1 lights every segment
    DisplayTest = 0x0F,
}

impl Register {
    /// Register address for an in-device digit index (0..=7).
    #[inline]
    pub const fn digit(index: u8) -> u8 {
        Register::Digit0 as u8 + index
    }
}

impl From<Register> for u8 {
    fn from(register: Register) -> Self {
        register as u8
    }
}

/// Builds a packet writing `(register, data)` to every device of the chain.
///
/// Returns `None` when `devices` is zero or exceeds [`MAX_DEVICES`].
pub fn broadcast(devices: usize, register: u8, data: u8) -> Option<Packet> {
    if devices == 0 || devices > MAX_DEVICES {
        return None;
    }

    let mut packet = Packet::new();
    for _ in 0..devices {
        packet.extend_from_slice(&[register, data]).ok()?;
    }
    Some(packet)
}

/// Builds a packet writing `(register, data)` to exactly one device.
///
/// The target pair is preceded by `device` no-op pairs and followed by
/// `devices - 1 - device` no-op pairs, so the packet is always
/// `2 * devices` bytes long.
///
/// Returns `None` when `device` is not part of the chain.
pub fn addressed(devices: usize, device: usize, register: u8, data: u8) -> Option<Packet> {
    if device >= devices || devices > MAX_DEVICES {
        return None;
    }

    let mut packet = Packet::new();
    for slot in 0..devices {
        let pair = if slot == device {
            [register, data]
        } else {
            [Register::Noop as u8, 0x00]
        };
        packet.extend_from_slice(&pair).ok()?;
    }
    Some(packet)
}
