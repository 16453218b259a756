// Images drawn over the chat surface
//
// Pixels are packed two rows per cell with the upper half block glyph:
// foreground carries the top pixel, background the bottom one. Terminal
// cells are about twice as tall as they are wide, so one pixel column per
// cell and two pixel rows per cell keep the aspect ratio.

use anyhow::{bail, Result};
use image::imageops::FilterType;
use image::{DynamicImage, Rgba, RgbaImage};
use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::Color;

const HALF_BLOCK: &str = "\u{2580}";

/// Pixels below this alpha show the terminal background
const ALPHA_CUTOFF: u8 = 128;

/// An image ready to be drawn into cells
#[derive(Debug, Clone)]
pub struct Image {
    source: RgbaImage,
    scaled: Option<RgbaImage>,
    cols: u16,
    rows: u16,
}

impl Image {
    /// Prepare an image for drawing. Empty images are rejected.
    pub fn new(img: &DynamicImage) -> Result<Self> {
        if img.width() == 0 || img.height() == 0 {
            bail!("image has no pixels ({}x{})", img.width(), img.height());
        }
        Ok(Self {
            source: img.to_rgba8(),
            scaled: None,
            cols: 0,
            rows: 0,
        })
    }

    /// Fit the image into `cols × rows` cells, keeping its aspect ratio
    pub fn resize(&mut self, cols: u16, rows: u16) {
        if cols == 0 || rows == 0 {
            self.scaled = None;
            self.cols = 0;
            self.rows = 0;
            return;
        }

        let (iw, ih) = self.source.dimensions();
        let scale_w = f64::from(cols) / f64::from(iw);
        let scale_h = f64::from(rows) * 2.0 / f64::from(ih);
        let scale = scale_w.min(scale_h);

        let px_w = ((f64::from(iw) * scale).round() as u32).clamp(1, u32::from(cols));
        let px_h = ((f64::from(ih) * scale).round() as u32).clamp(1, u32::from(rows) * 2);

        self.scaled = Some(image::imageops::resize(
            &self.source,
            px_w,
            px_h,
            FilterType::Triangle,
        ));
        self.cols = px_w as u16;
        self.rows = px_h.div_ceil(2) as u16;
    }

    /// Size in cells after the last resize, `(0, 0)` before any
    pub fn cell_size(&self) -> (u16, u16) {
        (self.cols, self.rows)
    }

    /// Paint into `area`, clipped to both the area and the buffer
    pub fn draw(&self, buf: &mut Buffer, area: Rect) {
        let Some(scaled) = &self.scaled else {
            return;
        };
        let area = area.intersection(buf.area);

        for cy in 0..area.height.min(self.rows) {
            for cx in 0..area.width.min(self.cols) {
                let px = u32::from(cx);
                let top = pixel_color(scaled.get_pixel_checked(px, u32::from(cy) * 2));
                let bottom = pixel_color(scaled.get_pixel_checked(px, u32::from(cy) * 2 + 1));
                if let Some(cell) = buf.cell_mut((area.x + cx, area.y + cy)) {
                    cell.set_symbol(HALF_BLOCK).set_fg(top).set_bg(bottom);
                }
            }
        }
    }
}

fn pixel_color(pixel: Option<&Rgba<u8>>) -> Color {
    match pixel {
        Some(Rgba([r, g, b, a])) if *a >= ALPHA_CUTOFF => Color::Rgb(*r, *g, *b),
        _ => Color::Reset,
    }
}

/// Rectangle of `width × height` centered in `area`
pub fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn solid(w: u32, h: u32, color: [u8; 4]) -> DynamicImage {
        DynamicImage::ImageRgba8(RgbaImage::from_pixel(w, h, Rgba(color)))
    }

    #[test]
    fn empty_image_is_rejected() {
        assert!(Image::new(&DynamicImage::new_rgba8(0, 0)).is_err());
        assert!(Image::new(&DynamicImage::new_rgba8(4, 0)).is_err());
    }

    #[test]
    fn not_ready_until_resized() {
        let mut img = Image::new(&solid(4, 4, [255, 0, 0, 255])).unwrap();
        assert_eq!(img.cell_size(), (0, 0));
        img.resize(10, 10);
        assert_ne!(img.cell_size(), (0, 0));
    }

    #[test]
    fn square_image_fits_height() {
        // 100x100 px into 80x10 cells: 20 pixel rows available -> 20x20 px -> 20x10 cells
        let mut img = Image::new(&solid(100, 100, [0, 0, 255, 255])).unwrap();
        img.resize(80, 10);
        assert_eq!(img.cell_size(), (20, 10));
    }

    #[test]
    fn wide_image_fits_width() {
        let mut img = Image::new(&solid(200, 10, [0, 0, 255, 255])).unwrap();
        img.resize(20, 10);
        assert_eq!(img.cell_size(), (20, 1));
    }

    #[test]
    fn draws_half_blocks() {
        let mut img = Image::new(&solid(2, 2, [10, 20, 30, 255])).unwrap();
        img.resize(2, 1);
        let mut buf = Buffer::empty(Rect::new(0, 0, 4, 2));
        img.draw(&mut buf, Rect::new(1, 0, 2, 1));

        let cell = &buf[(1, 0)];
        assert_eq!(cell.symbol(), HALF_BLOCK);
        assert_eq!(cell.fg, Color::Rgb(10, 20, 30));
        assert_eq!(cell.bg, Color::Rgb(10, 20, 30));
        assert_eq!(buf[(0, 0)].symbol(), " ");
    }

    #[test]
    fn transparent_pixels_keep_background() {
        let mut img = Image::new(&solid(1, 2, [10, 20, 30, 0])).unwrap();
        img.resize(1, 1);
        let mut buf = Buffer::empty(Rect::new(0, 0, 1, 1));
        let area = buf.area;
        img.draw(&mut buf, area);
        assert_eq!(buf[(0, 0)].fg, Color::Reset);
    }

    #[test]
    fn centered_rect() {
        let area = Rect::new(0, 0, 80, 24);
        assert_eq!(centered(area, 20, 10), Rect::new(30, 7, 20, 10));
        assert_eq!(centered(area, 100, 30), area);
    }
}
