use embassy_embedded_hal::shared_bus::blocking::spi::SpiDeviceWithConfig;
use embassy_rp::gpio::{Input, Output};
use embassy_rp::peripherals::SPI1;
use embassy_rp::spi::{Blocking, Spi};
use embassy_sync::blocking_mutex::raw::NoopRawMutex;
use embassy_time::{Duration, Instant};
use static_cell::ConstStaticCell;
use thiserror::Error;

use embedded_graphics::{pixelcolor::Rgb565, prelude::*, primitives::Rectangle};
use mipidsi::interface::SpiInterface;
use mipidsi::models::ST7789;
use mipidsi::Display;

use snake_console::{Buttons, Clock, Color, Controller, Framebuffer, ProcessHost, ReadError, Screen, ScreenId};

pub const LCD_WIDTH: u32 = 135;
pub const LCD_HEIGHT: u32 = 240;

const FRAMEBUFFER_LEN: usize = Framebuffer::required_len(LCD_WIDTH, LCD_HEIGHT);

// The panel is the only screen, so one frame worth of RAM is all there is.
static FRAMEBUFFER: ConstStaticCell<[u8; FRAMEBUFFER_LEN]> = ConstStaticCell::new([0; FRAMEBUFFER_LEN]);

// Type alias to simplify the complex Display type
type LcdSpi = SpiDeviceWithConfig<'static, NoopRawMutex, Spi<'static, SPI1, Blocking>, Output<'static>>;
pub type Lcd = Display<SpiInterface<'static, LcdSpi, Output<'static>>, ST7789, Output<'static>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error, defmt::Format)]
pub enum LcdError {
    #[error("no framebuffer bound to the panel")]
    NoBuffer,
    #[error("framebuffer too small for the panel")]
    BufferTooSmall,
    #[error("SPI transfer to the panel failed")]
    Bus,
}

/// ST7789 panel driven from an in-RAM framebuffer. The gamepad screen does
/// not exist on this board: it gets an empty buffer and ignores all drawing.
pub struct PicoWaveshareScreen {
    display: Lcd,
    backlight: Output<'static>,
    framebuffer: Option<Framebuffer<'static>>,
    enabled: bool,
}

impl PicoWaveshareScreen {
    pub fn new(display: Lcd, backlight: Output<'static>) -> Self {
        Self {
            display,
            backlight,
            framebuffer: None,
            enabled: false,
        }
    }

    fn framebuffer(&mut self, screen: ScreenId) -> Result<Option<&mut Framebuffer<'static>>, LcdError> {
        match screen {
            ScreenId::Tv => self.framebuffer.as_mut().map(Some).ok_or(LcdError::NoBuffer),
            ScreenId::Gamepad => Ok(None),
        }
    }
}

impl Screen for PicoWaveshareScreen {
    type Error = LcdError;

    fn init(&mut self) -> Result<(), Self::Error> {
        // The panel is brought up by the mipidsi builder before we get it.
        Ok(())
    }

    fn buffer_size(&self, screen: ScreenId) -> usize {
        match screen {
            ScreenId::Tv => FRAMEBUFFER_LEN,
            ScreenId::Gamepad => 0,
        }
    }

    fn set_buffer(&mut self, screen: ScreenId, buffer: &'static mut [u8]) -> Result<(), Self::Error> {
        if screen == ScreenId::Tv {
            let framebuffer = Framebuffer::new(buffer, LCD_WIDTH, LCD_HEIGHT).ok_or(LcdError::BufferTooSmall)?;
            self.framebuffer = Some(framebuffer);
        }
        Ok(())
    }

    fn enable(&mut self, screen: ScreenId, enabled: bool) -> Result<(), Self::Error> {
        if screen == ScreenId::Tv {
            self.enabled = enabled;
            if enabled {
                self.backlight.set_high();
            } else {
                self.backlight.set_low();
            }
        }
        Ok(())
    }

    fn clear(&mut self, screen: ScreenId, color: Color) -> Result<(), Self::Error> {
        if let Some(framebuffer) = self.framebuffer(screen)? {
            framebuffer.fill(color.into());
        }
        Ok(())
    }

    fn put_pixel(&mut self, screen: ScreenId, x: u32, y: u32, color: Color) -> Result<(), Self::Error> {
        if let Some(framebuffer) = self.framebuffer(screen)? {
            framebuffer.set_pixel(x, y, color.into());
        }
        Ok(())
    }

    fn put_text(&mut self, screen: ScreenId, column: u32, row: u32, text: &str) -> Result<(), Self::Error> {
        if let Some(framebuffer) = self.framebuffer(screen)? {
            framebuffer.draw_text(column, row, text, Color::WHITE.into());
        }
        Ok(())
    }

    fn flip(&mut self, screen: ScreenId) -> Result<(), Self::Error> {
        if screen != ScreenId::Tv || !self.enabled {
            return Ok(());
        }
        let framebuffer = self.framebuffer.as_ref().ok_or(LcdError::NoBuffer)?;
        let area = Rectangle::new(Point::zero(), Size::new(LCD_WIDTH, LCD_HEIGHT));
        self.display
            .fill_contiguous(&area, framebuffer.pixels())
            .map_err(|_| LcdError::Bus)
    }

    fn shutdown(&mut self) {
        self.display.clear(Rgb565::BLACK).ok();
        self.backlight.set_low();
        self.enabled = false;
    }
}

/// Five-way joystick and the A/B buttons, all active low.
pub struct PicoWaveshareJoystick {
    up: Input<'static>,
    down: Input<'static>,
    left: Input<'static>,
    right: Input<'static>,
    button_a: Input<'static>,
    button_b: Input<'static>,
    held: Buttons,
    last_sample: Option<Instant>,
}

impl PicoWaveshareJoystick {
    /// Pins are polled at most this often; reads in between report no sample.
    const SAMPLE_PERIOD: Duration = Duration::from_millis(16);

    pub fn new(
        up: Input<'static>,
        down: Input<'static>,
        left: Input<'static>,
        right: Input<'static>,
        button_a: Input<'static>,
        button_b: Input<'static>,
    ) -> Self {
        Self {
            up,
            down,
            left,
            right,
            button_a,
            button_b,
            held: Buttons::empty(),
            last_sample: None,
        }
    }

    fn held_now(&self) -> Buttons {
        // The joystick is mounted 90° from the panel orientation.
        let mut held = Buttons::empty();
        held.set(Buttons::RIGHT, self.up.is_low());
        held.set(Buttons::LEFT, self.down.is_low());
        held.set(Buttons::UP, self.left.is_low());
        held.set(Buttons::DOWN, self.right.is_low());
        held.set(Buttons::A, self.button_a.is_low());
        held.set(Buttons::B, self.button_b.is_low());
        held
    }
}

impl Controller for PicoWaveshareJoystick {
    fn read(&mut self) -> Result<Option<Buttons>, ReadError> {
        let now = Instant::now();
        if let Some(last) = self.last_sample {
            if now.duration_since(last) < Self::SAMPLE_PERIOD {
                return Ok(None);
            }
        }
        self.last_sample = Some(now);

        let held = self.held_now();
        let pressed = held.difference(self.held);
        self.held = held;
        Ok(Some(pressed))
    }
}

/// Bare-metal process: it never asks to quit and owns a single static frame.
#[derive(Default)]
pub struct PicoHost {
    running: bool,
}

impl PicoHost {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ProcessHost for PicoHost {
    fn init(&mut self) {
        defmt::info!("Snake Game Starting!");
        self.running = true;
    }

    fn is_running(&mut self) -> bool {
        self.running
    }

    fn allocate_buffer(&mut self, size: usize) -> Option<&'static mut [u8]> {
        if size == 0 {
            return Some(&mut []);
        }
        if size > FRAMEBUFFER_LEN {
            return None;
        }
        FRAMEBUFFER.try_take().map(|buffer| &mut buffer[..size])
    }

    fn shutdown(&mut self) {
        self.running = false;
    }
}

pub struct PicoClock;

impl Clock for PicoClock {
    fn now(&self) -> u64 {
        Instant::now().as_ticks()
    }

    fn nanos_to_ticks(&self, nanos: u64) -> u64 {
        Duration::from_nanos(nanos).as_ticks()
    }
}
