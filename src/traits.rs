use crate::input::{Buttons, ReadError};

/// Color representation that can be implemented for different display types
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const BLACK: Color = Color { r: 0, g: 0, b: 0 };
    pub const WHITE: Color = Color { r: 255, g: 255, b: 255 };
    pub const GRAY: Color = Color { r: 128, g: 128, b: 128 };
    pub const GREEN: Color = Color { r: 0, g: 128, b: 0 };
    pub const RED: Color = Color { r: 255, g: 0, b: 0 };
}

/// The two screens a console can drive.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ScreenId {
    /// The main output (television / LCD panel).
    Tv,
    /// The secondary screen built into the gamepad.
    Gamepad,
}

/// Abstraction over a console's fixed-function framebuffer API.
///
/// Every screen needs a buffer bound to it before it can be enabled. Drawing
/// goes to the back buffer and only becomes visible after [`Screen::flip`].
pub trait Screen {
    type Error;

    /// Bring up the graphics subsystem.
    fn init(&mut self) -> Result<(), Self::Error>;

    /// Number of bytes the buffer for `screen` must hold.
    fn buffer_size(&self, screen: ScreenId) -> usize;

    /// Hand a buffer of at least [`Screen::buffer_size`] bytes to `screen`.
    fn set_buffer(&mut self, screen: ScreenId, buffer: &'static mut [u8]) -> Result<(), Self::Error>;

    fn enable(&mut self, screen: ScreenId, enabled: bool) -> Result<(), Self::Error>;

    /// Fill the whole back buffer of `screen`.
    fn clear(&mut self, screen: ScreenId, color: Color) -> Result<(), Self::Error>;

    /// Plot a single pixel; coordinates outside the screen are ignored.
    fn put_pixel(&mut self, screen: ScreenId, x: u32, y: u32, color: Color) -> Result<(), Self::Error>;

    /// Draw text starting at a character cell.
    fn put_text(&mut self, screen: ScreenId, column: u32, row: u32, text: &str) -> Result<(), Self::Error>;

    /// Present the back buffer of `screen`.
    fn flip(&mut self, screen: ScreenId) -> Result<(), Self::Error>;

    /// Tear the graphics subsystem down.
    fn shutdown(&mut self);
}

/// Abstraction for the gamepad
pub trait Controller {
    /// Read the latest sample.
    ///
    /// `Ok(None)` means the controller had no new sample since the last read.
    /// Otherwise the returned mask holds the buttons newly pressed in this
    /// sample.
    fn read(&mut self) -> Result<Option<Buttons>, ReadError>;
}

/// Process lifecycle hooks provided by the console's operating environment
pub trait ProcessHost {
    /// Called once before anything else (logging, process UI, ...).
    fn init(&mut self);

    /// Whether the process should keep running; polled once per loop.
    fn is_running(&mut self) -> bool;

    /// Allocate a zeroed screen buffer of `size` bytes.
    fn allocate_buffer(&mut self, size: usize) -> Option<&'static mut [u8]>;

    /// Called once on the way out, after the screens are shut down.
    fn shutdown(&mut self);
}

/// Monotonic tick source
pub trait Clock {
    /// Current tick count.
    fn now(&self) -> u64;

    /// Convert a duration in nanoseconds to ticks.
    fn nanos_to_ticks(&self, nanos: u64) -> u64;

    /// A value suitable for seeding the random source.
    fn seed(&self) -> u64 {
        self.now()
    }
}
