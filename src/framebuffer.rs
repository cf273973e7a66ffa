//! In-memory RGB565 framebuffer.
//!
//! Pixels are stored big-endian, two bytes each, row-major: the layout ST7789
//! style panels accept directly, so presenting a frame is a single contiguous
//! write.

use core::convert::Infallible;

use embedded_graphics::{
    mono_font::{ascii::FONT_6X10, MonoTextStyle},
    prelude::*,
    text::{Baseline, Text},
};
use embedded_graphics_core::pixelcolor::{raw::RawU16, IntoStorage, Rgb565};

use crate::traits::Color;

pub const BYTES_PER_PIXEL: usize = 2;

// Convert our generic Color to Rgb565
impl From<Color> for Rgb565 {
    fn from(color: Color) -> Self {
        Rgb565::new(color.r >> 3, color.g >> 2, color.b >> 3)
    }
}

pub struct Framebuffer<'a> {
    buffer: &'a mut [u8],
    width: u32,
    height: u32,
}

impl<'a> Framebuffer<'a> {
    /// Bytes needed for a `width` x `height` frame.
    pub const fn required_len(width: u32, height: u32) -> usize {
        width as usize * height as usize * BYTES_PER_PIXEL
    }

    /// Wrap `buffer`, or `None` if it cannot hold a full frame.
    pub fn new(buffer: &'a mut [u8], width: u32, height: u32) -> Option<Self> {
        if buffer.len() < Self::required_len(width, height) {
            return None;
        }
        Some(Self { buffer, width, height })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    fn offset(&self, x: u32, y: u32) -> Option<usize> {
        if x >= self.width || y >= self.height {
            return None;
        }
        Some((y as usize * self.width as usize + x as usize) * BYTES_PER_PIXEL)
    }

    pub fn set_pixel(&mut self, x: u32, y: u32, color: Rgb565) {
        if let Some(offset) = self.offset(x, y) {
            let raw: u16 = color.into_storage();
            self.buffer[offset..offset + BYTES_PER_PIXEL].copy_from_slice(&raw.to_be_bytes());
        }
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<Rgb565> {
        let offset = self.offset(x, y)?;
        let raw = u16::from_be_bytes([self.buffer[offset], self.buffer[offset + 1]]);
        Some(Rgb565::from(RawU16::new(raw)))
    }

    pub fn fill(&mut self, color: Rgb565) {
        let raw: u16 = color.into_storage();
        let bytes = raw.to_be_bytes();
        let len = Self::required_len(self.width, self.height);
        for chunk in self.buffer[..len].chunks_exact_mut(BYTES_PER_PIXEL) {
            chunk.copy_from_slice(&bytes);
        }
    }

    /// Draw `text` with its top-left corner at a 6x10 character cell.
    pub fn draw_text(&mut self, column: u32, row: u32, text: &str, color: Rgb565) {
        let cell = FONT_6X10.character_size;
        let origin = Point::new((column * cell.width) as i32, (row * cell.height) as i32);
        let style = MonoTextStyle::new(&FONT_6X10, color);
        let _ = Text::with_baseline(text, origin, style, Baseline::Top).draw(self);
    }

    /// All pixels, row by row.
    pub fn pixels(&self) -> impl Iterator<Item = Rgb565> + '_ {
        let len = Self::required_len(self.width, self.height);
        self.buffer[..len]
            .chunks_exact(BYTES_PER_PIXEL)
            .map(|bytes| Rgb565::from(RawU16::new(u16::from_be_bytes([bytes[0], bytes[1]]))))
    }
}

impl OriginDimensions for Framebuffer<'_> {
    fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }
}

impl DrawTarget for Framebuffer<'_> {
    type Color = Rgb565;
    type Error = Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(point, color) in pixels {
            if point.x >= 0 && point.y >= 0 {
                self.set_pixel(point.x as u32, point.y as u32, color);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_short_buffer() {
        let mut buffer = [0u8; 10];
        assert!(Framebuffer::new(&mut buffer, 4, 2).is_none());
        assert!(Framebuffer::new(&mut buffer, 5, 1).is_some());
    }

    #[test]
    fn stores_pixels_row_major() {
        let mut buffer = vec![0u8; Framebuffer::required_len(4, 3)];
        let mut fb = Framebuffer::new(&mut buffer, 4, 3).unwrap();
        fb.set_pixel(1, 2, Color::RED.into());
        assert_eq!(fb.pixel(1, 2), Some(Rgb565::from(Color::RED)));
        assert_eq!(fb.pixel(2, 1), Some(Rgb565::BLACK));
        assert_eq!(fb.pixels().position(|p| p != Rgb565::BLACK), Some(2 * 4 + 1));
    }

    #[test]
    fn ignores_out_of_bounds_writes() {
        let mut buffer = vec![0u8; Framebuffer::required_len(4, 3)];
        let mut fb = Framebuffer::new(&mut buffer, 4, 3).unwrap();
        fb.set_pixel(4, 0, Rgb565::WHITE);
        fb.set_pixel(0, 3, Rgb565::WHITE);
        assert!(fb.pixels().all(|p| p == Rgb565::BLACK));
        assert_eq!(fb.pixel(4, 0), None);
    }

    #[test]
    fn fill_covers_every_pixel() {
        let mut buffer = vec![0u8; Framebuffer::required_len(8, 8)];
        let mut fb = Framebuffer::new(&mut buffer, 8, 8).unwrap();
        fb.fill(Color::GRAY.into());
        assert_eq!(fb.pixels().count(), 64);
        assert!(fb.pixels().all(|p| p == Rgb565::from(Color::GRAY)));
    }

    #[test]
    fn text_lands_in_its_cell() {
        let mut buffer = vec![0u8; Framebuffer::required_len(60, 30)];
        let mut fb = Framebuffer::new(&mut buffer, 60, 30).unwrap();
        fb.draw_text(0, 1, "score: 0", Rgb565::WHITE);

        let lit: Vec<(u32, u32)> = (0..30)
            .flat_map(|y| (0..60).map(move |x| (x, y)))
            .filter(|&(x, y)| fb.pixel(x, y) == Some(Rgb565::WHITE))
            .collect();
        assert!(!lit.is_empty());
        assert!(lit.iter().all(|&(_, y)| (10..20).contains(&y)));
    }
}
