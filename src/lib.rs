//! Driver for daisy-chained MAX7219 controllers wired to seven-segment
//! digits.
//!
//! The driver only talks through an [`SpiDevice`]; building that device is
//! left to the board. Use [`Config::bus_speed_hz`] as the SPI clock (the
//! MAX7219 accepts up to 10 MHz, mode 0) and bind the device to the chip
//! select line named by [`Config::device_select`]:
//!
//! ```ignore
//! let config = Config { digit_count: 16, ..Config::default() };
//! let mut spi_config = spi::Config::default();
//! spi_config.frequency = Hertz(config.bus_speed_hz);
//! spi_config.mode = spi::MODE_0;
//! let bus = Spi::new_txonly(p.SPI1, p.PA5, p.PA7, p.DMA1_CH3, spi_config);
//! let cs = Output::new(cs_pin(config.device_select), Level::High, Speed::High);
//! let spi = ExclusiveDevice::new_no_delay(bus, cs)?;
//!
//! let mut cells = [0u8; 16];
//! let mut display: SevenSegment<_, EmbassyTimer> =
//!     SevenSegment::new(config, spi, &mut cells, AsciiFont)?;
//! display.init().await?;
//! display.set_number(12.5).await?;
//! ```

#![cfg_attr(not(test), no_std)]

// Must come first so the logging macros are visible in every module.
mod fmt;

pub mod buffer;
pub mod font;
pub mod layout;
pub mod number;
pub mod protocol;

use core::marker::PhantomData;

#[cfg(not(feature = "async"))]
use embedded_hal::spi::SpiDevice;
#[cfg(feature = "async")]
use embedded_hal_async::spi::SpiDevice;

pub use buffer::{BLANK, DECIMAL_POINT, DigitBuffer, Shift};
pub use font::{AsciiFont, Glyphs};
pub use layout::{Layout, Slot};
pub use number::Number;
pub use protocol::{MAX_DEVICES, MAX_INTENSITY, MAX_SCAN_DIGITS, Register};

use protocol::Packet;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Config {
    /// Total logical digits across the chain.
    pub digit_count: usize,
    /// Digits scanned by each device (1-8).
    pub scan_digits: u8,
    /// Digits are wired right-to-left.
    pub reverse: bool,
    /// Brightness applied by `init` (0-15).
    pub intensity: u8,
    /// SPI clock the board glue should configure; MAX7219 tops out at 10 MHz.
    pub bus_speed_hz: u32,
    /// Chip-select line the board glue should bind the `SpiDevice` to.
    pub device_select: u8,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            digit_count: 8,
            scan_digits: MAX_SCAN_DIGITS,
            reverse: false,
            intensity: 7,
            bus_speed_hz: 1_000_000,
            device_select: 0,
        }
    }
}

#[derive(Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error<E = ()> {
    /// Communication error
    Comm(E),
    /// Geometry or buffer does not describe a drivable chain
    InvalidConfig,
}

/// Text scrolling in from the right, one character per step.
///
/// Obtained from [`SevenSegment::start_marquee`] and advanced with
/// [`SevenSegment::step_marquee`]; stop calling it to cancel.
#[derive(Debug, Clone)]
pub struct Marquee<'t> {
    text: &'t str,
    offset: usize,
}

impl<'t> Marquee<'t> {
    fn new(text: &'t str) -> Self {
        Self { text, offset: 0 }
    }

    /// All characters have entered the display.
    pub fn is_finished(&self) -> bool {
        self.offset >= self.text.len()
    }

    /// Text not yet shown.
    pub fn remaining(&self) -> &'t str {
        &self.text[self.offset..]
    }

    fn advance(&mut self) -> Option<char> {
        let ch = self.remaining().chars().next()?;
        self.offset += ch.len_utf8();
        Some(ch)
    }
}

/// Chain of MAX7219 devices driving seven-segment digits as one row.
pub struct SevenSegment<'b, SPI, TIMER, G = AsciiFont>
where
    SPI: SpiDevice,
    TIMER: Timer,
    G: Glyphs,
{
    spi: SPI,
    config: Config,
    layout: Layout,
    buffer: DigitBuffer<'b>,
    glyphs: G,
    _timer: PhantomData<TIMER>,
}

#[maybe_async_cfg::maybe(
    sync(cfg(not(feature = "async")), self = "SevenSegment",),
    async(feature = "async", keep_self)
)]
impl<'b, SPI, E, TIMER, G> SevenSegment<'b, SPI, TIMER, G>
where
    SPI: SpiDevice<Error = E>,
    TIMER: Timer,
    G: Glyphs,
{
    /// Creates the driver over `buffer`, which must hold at least
    /// `config.digit_count` bytes. Nothing is sent until [`Self::init`].
    pub fn new(
        mut config: Config,
        spi: SPI,
        buffer: &'b mut [u8],
        glyphs: G,
    ) -> Result<Self, Error<E>> {
        if config.digit_count == 0
            || config.scan_digits == 0
            || config.scan_digits > MAX_SCAN_DIGITS
        {
            return Err(Error::InvalidConfig);
        }

        let layout = Layout::new(config.digit_count, config.scan_digits, config.reverse);
        if layout.device_count() > MAX_DEVICES {
            return Err(Error::InvalidConfig);
        }

        let cells = buffer
            .get_mut(..config.digit_count)
            .ok_or(Error::InvalidConfig)?;

        if config.intensity > MAX_INTENSITY {
            warn!("intensity {} clamped to {}", config.intensity, MAX_INTENSITY);
            config.intensity = MAX_INTENSITY;
        }

        Ok(Self {
            spi,
            config,
            layout,
            buffer: DigitBuffer::new(cells),
            glyphs,
            _timer: PhantomData,
        })
    }

    /// Brings every device out of shutdown in raw segment mode and blanks
    /// the display.
    pub async fn init(&mut self) -> Result<(), Error<E>> {
        debug!(
            "init: {} digits on {} devices, bus {} Hz, cs {}",
            self.layout.digit_count(),
            self.layout.device_count(),
            self.config.bus_speed_hz,
            self.config.device_select
        );

        self.command(Register::ScanLimit.into(), self.config.scan_digits - 1)
            .await?;
        self.command(Register::DecodeMode.into(), 0).await?; // raw segments, no BCD
        self.command(Register::DisplayTest.into(), 0).await?;
        self.command(Register::Shutdown.into(), 1).await?; // normal operation
        self.brightness(self.config.intensity).await?;
        self.clear(true).await
    }

    /// Writes `(register, data)` to every device in the chain.
    pub async fn command(&mut self, register: u8, data: u8) -> Result<(), Error<E>> {
        let packet = protocol::broadcast(self.layout.device_count(), register, data)
            .ok_or(Error::InvalidConfig)?;
        self.write_packet(&packet).await
    }

    /// Writes `(register, data)` to a single device, padding every other
    /// device with no-ops. A device outside the chain is ignored.
    pub async fn send_single(
        &mut self,
        device: usize,
        register: u8,
        data: u8,
    ) -> Result<(), Error<E>> {
        match protocol::addressed(self.layout.device_count(), device, register, data) {
            Some(packet) => self.write_packet(&packet).await,
            None => {
                warn!("device {} is not part of the chain", device);
                Ok(())
            }
        }
    }

    /// Sends one packet as a single transaction; devices latch on its end.
    async fn write_packet(&mut self, packet: &Packet) -> Result<(), Error<E>> {
        trace!("packet {:02x}", packet.as_slice());
        self.spi.write(packet).await.map_err(Error::Comm)
    }

    /// Sets the intensity of every device (0-15, higher values clamp).
    pub async fn brightness(&mut self, intensity: u8) -> Result<(), Error<E>> {
        let intensity = intensity.min(MAX_INTENSITY);
        self.command(Register::Intensity.into(), intensity).await
    }

    /// Blanks every device, keeping register contents.
    pub async fn shutdown(&mut self) -> Result<(), Error<E>> {
        self.command(Register::Shutdown.into(), 0).await
    }

    /// Leaves shutdown mode.
    pub async fn wake(&mut self) -> Result<(), Error<E>> {
        self.command(Register::Shutdown.into(), 1).await
    }

    /// Lights every segment while `on`, overriding the digit registers.
    pub async fn display_test(&mut self, on: bool) -> Result<(), Error<E>> {
        self.command(Register::DisplayTest.into(), on as u8).await
    }

    /// Blanks the buffer and optionally pushes it out.
    pub async fn clear(&mut self, flush: bool) -> Result<(), Error<E>> {
        self.buffer.clear();
        if flush {
            self.flush().await?;
        }
        Ok(())
    }

    /// Pushes the whole buffer out, one addressed write per digit register.
    ///
    /// Slots past the end of the row are blanked.
    pub async fn flush(&mut self) -> Result<(), Error<E>> {
        let layout = self.layout;
        trace!("flush {} devices", layout.device_count());

        for device in layout.devices() {
            for digit in 0..layout.scan_digits() {
                let value = layout
                    .position(Slot { device, digit })
                    .and_then(|position| self.buffer.get(position))
                    .unwrap_or(BLANK);
                self.send_single(device, Register::digit(digit), value)
                    .await?;
            }
        }
        Ok(())
    }

    /// Stores a segment byte without sending it.
    ///
    /// Returns `false` and leaves the buffer alone when `position` is
    /// outside the row.
    pub fn set_digit(&mut self, position: usize, value: u8) -> bool {
        self.buffer.set(position, value)
    }

    /// Stores a segment byte and sends only that digit.
    pub async fn write_single(&mut self, position: usize, value: u8) -> Result<(), Error<E>> {
        if !self.buffer.set(position, value) {
            return Ok(());
        }

        match self.layout.locate(position) {
            Some(slot) => {
                self.send_single(slot.device, Register::digit(slot.digit), value)
                    .await
            }
            None => Ok(()),
        }
    }

    /// Segment byte for a character, with the decimal point if `dot`.
    pub fn glyph(&self, ch: char, dot: bool) -> u8 {
        let segments = self.glyphs.glyph(ch) & font::SEGMENTS;
        if dot { segments | DECIMAL_POINT } else { segments }
    }

    /// Stores a character without sending it.
    pub fn set_letter(&mut self, position: usize, ch: char, dot: bool) -> bool {
        let value = self.glyph(ch, dot);
        self.set_digit(position, value)
    }

    /// Stores a character and flushes the whole buffer.
    pub async fn letter(&mut self, position: usize, ch: char, dot: bool) -> Result<(), Error<E>> {
        self.set_letter(position, ch, dot);
        self.flush().await
    }

    /// Stores a character and sends only that digit.
    pub async fn write_letter(
        &mut self,
        position: usize,
        ch: char,
        dot: bool,
    ) -> Result<(), Error<E>> {
        let value = self.glyph(ch, dot);
        self.write_single(position, value).await
    }

    /// Shows `text` from the leftmost digit; characters that do not fit are
    /// dropped.
    pub async fn set_text(&mut self, text: &str) -> Result<(), Error<E>> {
        self.buffer.clear();
        let digits = self.layout.digit_count();
        for (position, ch) in text.chars().take(digits).enumerate() {
            self.set_letter(position, ch, false);
        }
        self.flush().await
    }

    /// Shows a number from the leftmost digit.
    ///
    /// A decimal point lights on the digit before it instead of taking a
    /// digit of its own. Input that is not a number blanks the display.
    pub async fn set_number<'n>(&mut self, value: impl Into<Number<'n>>) -> Result<(), Error<E>> {
        self.buffer.clear();

        let value: Number<'_> = value.into();
        let text = value.canonical();
        let visible = number::truncate(&text, self.layout.digit_count());
        for (position, cell) in number::cells(visible).enumerate() {
            self.set_letter(position, cell.ch, cell.dot);
        }
        self.flush().await
    }

    /// Shifts the buffer one digit, rotating or feeding a blank.
    pub async fn scroll(
        &mut self,
        direction: Shift,
        rotate: bool,
        flush: bool,
    ) -> Result<(), Error<E>> {
        self.buffer.shift(direction, rotate);
        if flush {
            self.flush().await?;
        }
        Ok(())
    }

    /// Blanks the buffer (without sending) and prepares `text` to scroll in
    /// from the right.
    pub fn start_marquee<'t>(&mut self, text: &'t str) -> Marquee<'t> {
        self.buffer.clear();
        Marquee::new(text)
    }

    /// Moves the marquee one character: shifts left and writes the next
    /// character into the last digit. Returns `false` once the text is
    /// exhausted, without touching the display.
    pub async fn step_marquee(&mut self, marquee: &mut Marquee<'_>) -> Result<bool, Error<E>> {
        let ch = match marquee.advance() {
            Some(ch) => ch,
            None => return Ok(false),
        };

        self.buffer.shift(Shift::Left, false);
        self.letter(self.layout.digit_count() - 1, ch, false).await?;
        Ok(true)
    }

    /// Scrolls `text` across the display, waiting `delay_ms` before each
    /// character.
    pub async fn show_message(&mut self, text: &str, delay_ms: u64) -> Result<(), Error<E>> {
        debug!("message of {} bytes", text.len());

        let mut marquee = self.start_marquee(text);
        while !marquee.is_finished() {
            TIMER::delay_ms(delay_ms).await;
            self.step_marquee(&mut marquee).await?;
        }
        Ok(())
    }

    /// Current segment bytes, one per logical digit.
    pub fn buffer(&self) -> &[u8] {
        self.buffer.as_slice()
    }

    pub fn config(&self) -> Config {
        self.config
    }

    pub fn layout(&self) -> Layout {
        self.layout
    }

    pub fn device_count(&self) -> usize {
        self.layout.device_count()
    }

    /// Releases the owned bus.
    pub fn release(self) -> SPI {
        self.spi
    }
}

#[maybe_async_cfg::maybe(
    sync(cfg(not(feature = "async")), self = "Timer",),
    async(feature = "async", keep_self)
)]
/// Simplified timer trait for delay operations.
pub trait Timer {
    /// Delay for the specified number of milliseconds.
    async fn delay_ms(milliseconds: u64);
}

/// [`Timer`] backed by `embassy-time`.
#[cfg(feature = "embassy-time")]
pub struct EmbassyTimer;

#[cfg(all(feature = "embassy-time", feature = "async"))]
impl Timer for EmbassyTimer {
    async fn delay_ms(milliseconds: u64) {
        embassy_time::Timer::after_millis(milliseconds).await;
    }
}

#[cfg(all(feature = "embassy-time", not(feature = "async")))]
impl Timer for EmbassyTimer {
    fn delay_ms(milliseconds: u64) {
        embassy_time::block_for(embassy_time::Duration::from_millis(milliseconds));
    }
}
