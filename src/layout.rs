//! Logical digit position to chained device mapping.

/// A physical digit slot: device in the chain and digit register within it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Slot {
    pub device: usize,
    pub digit: u8,
}

/// Geometry of a display made of chained devices.
///
/// With `reverse` set, the logical row is mirrored before it is split into
/// per-device runs, and the device order is mirrored as well. For chains
/// where every device is fully populated this keeps each logical group on
/// its own device and only flips the digit order inside it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Layout {
    digit_count: usize,
    scan_digits: u8,
    device_count: usize,
    reverse: bool,
}

impl Layout {
    /// `scan_digits` must be non-zero.
    pub const fn new(digit_count: usize, scan_digits: u8, reverse: bool) -> Self {
        let per_device = scan_digits as usize;
        Self {
            digit_count,
            scan_digits,
            device_count: digit_count.div_ceil(per_device),
            reverse,
        }
    }

    pub const fn digit_count(&self) -> usize {
        self.digit_count
    }

    pub const fn scan_digits(&self) -> u8 {
        self.scan_digits
    }

    pub const fn device_count(&self) -> usize {
        self.device_count
    }

    pub const fn reverse(&self) -> bool {
        self.reverse
    }

    /// Physical slot showing a logical position, `None` when out of range.
    pub fn locate(&self, position: usize) -> Option<Slot> {
        if position >= self.digit_count {
            return None;
        }

        let per_device = self.scan_digits as usize;
        let index = if self.reverse {
            self.digit_count - 1 - position
        } else {
            position
        };

        let mut device = index / per_device;
        if self.reverse {
            device = self.device_count - 1 - device;
        }

        Some(Slot {
            device,
            digit: (index % per_device) as u8,
        })
    }

    /// Logical position shown by a physical slot.
    ///
    /// Returns `None` for slots past the end of the row, which exist on the
    /// last device when `digit_count` is not a multiple of `scan_digits`.
    pub fn position(&self, slot: Slot) -> Option<usize> {
        if slot.device >= self.device_count || slot.digit >= self.scan_digits {
            return None;
        }

        let per_device = self.scan_digits as usize;
        let device = if self.reverse {
            self.device_count - 1 - slot.device
        } else {
            slot.device
        };

        let index = device * per_device + slot.digit as usize;
        if index >= self.digit_count {
            return None;
        }

        Some(if self.reverse {
            self.digit_count - 1 - index
        } else {
            index
        })
    }

    /// Devices in flush order.
    pub fn devices(&self) -> impl Iterator<Item = usize> + use<> {
        let count = self.device_count;
        let reverse = self.reverse;
        (0..count).map(move |i| if reverse { count - 1 - i } else { i })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn device_count_rounds_up() {
        assert_eq!(Layout::new(8, 8, false).device_count(), 1);
        assert_eq!(Layout::new(12, 8, false).device_count(), 2);
        assert_eq!(Layout::new(16, 4, false).device_count(), 4);
    }

    #[test]
    fn forward_mapping_splits_by_scan_digits() {
        let layout = Layout::new(16, 8, false);
        assert_eq!(layout.locate(0), Some(Slot { device: 0, digit: 0 }));
        assert_eq!(layout.locate(7), Some(Slot { device: 0, digit: 7 }));
        assert_eq!(layout.locate(9), Some(Slot { device: 1, digit: 1 }));
        assert_eq!(layout.locate(16), None);
    }

    #[test]
    fn reverse_mapping_flips_digits_within_device() {
        let layout = Layout::new(16, 8, true);
        assert_eq!(layout.locate(0), Some(Slot { device: 0, digit: 7 }));
        assert_eq!(layout.locate(7), Some(Slot { device: 0, digit: 0 }));
        assert_eq!(layout.locate(8), Some(Slot { device: 1, digit: 7 }));
        assert_eq!(layout.locate(15), Some(Slot { device: 1, digit: 0 }));
    }

    #[test]
    fn position_inverts_locate() {
        for reverse in [false, true] {
            for (digits, scan) in [(8, 8), (16, 8), (12, 8), (10, 4), (3, 1)] {
                let layout = Layout::new(digits, scan, reverse);
                for position in 0..digits {
                    let slot = layout.locate(position).unwrap();
                    assert_eq!(layout.position(slot), Some(position));
                }
            }
        }
    }

    #[test]
    fn unpopulated_slots_have_no_position() {
        let layout = Layout::new(12, 8, false);
        assert_eq!(layout.position(Slot { device: 1, digit: 4 }), None);

        let mirrored = Layout::new(12, 8, true);
        let populated = (0..2)
            .flat_map(|device| (0..8).map(move |digit| Slot { device, digit }))
            .filter(|slot| mirrored.position(*slot).is_some())
            .count();
        assert_eq!(populated, 12);
    }

    #[test]
    fn flush_order_follows_wiring() {
        let forward = Layout::new(24, 8, false);
        assert!(forward.devices().eq([0, 1, 2]));

        let mirrored = Layout::new(24, 8, true);
        assert!(mirrored.devices().eq([2, 1, 0]));
    }
}
