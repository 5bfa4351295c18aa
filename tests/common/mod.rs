#![allow(dead_code)]

use anyhow::Result;
use tile_view::geometry::{Rect, SurfaceSize};
use tile_view::render::{ImageSource, Surface};

pub const CLEAR: u32 = 0x0000_0000;
pub const BLACK: u32 = 0x0000_00ff;
pub const OTHER: u32 = 0xdead_beef;

/// Image stand-in: a flat color of a given size.
pub struct SolidImage {
    pub width: f64,
    pub height: f64,
    pub color: u32,
}

impl ImageSource for SolidImage {
    fn dimensions(&self) -> (f64, f64) {
        (self.width, self.height)
    }
}

/// Software surface: a pixel is painted when its center falls inside the
/// rect being filled.
pub struct PixelSurface {
    size: SurfaceSize,
    pixels: Vec<u32>,
    pub draws: Vec<Rect>,
}

impl PixelSurface {
    pub fn new(width: u32, height: u32) -> Self {
        PixelSurface {
            size: SurfaceSize::new(width, height),
            pixels: vec![CLEAR; (width * height) as usize],
            draws: Vec::new(),
        }
    }

    pub fn pixel(&self, x: u32, y: u32) -> u32 {
        self.pixels[(y * self.size.width + x) as usize]
    }

    fn paint(&mut self, rect: &Rect, color: u32) {
        for y in 0..self.size.height {
            let cy = f64::from(y) + 0.5;
            if cy < rect.top_left.y || cy >= rect.bottom_right.y {
                continue;
            }
            for x in 0..self.size.width {
                let cx = f64::from(x) + 0.5;
                if cx >= rect.top_left.x && cx < rect.bottom_right.x {
                    self.pixels[(y * self.size.width + x) as usize] = color;
                }
            }
        }
    }
}

fn color_code(color: &str) -> u32 {
    match color {
        "black" => BLACK,
        _ => OTHER,
    }
}

impl Surface for PixelSurface {
    type Image = SolidImage;

    fn size(&self) -> SurfaceSize {
        self.size
    }

    fn clear(&mut self) {
        self.pixels.fill(CLEAR);
    }

    fn fill_rect(&mut self, rect: &Rect, color: &str) {
        self.paint(rect, color_code(color));
    }

    // outline only, one pixel ring inside the rect
    fn stroke_rect(&mut self, rect: &Rect, _line_width: f64, color: &str) {
        let color = color_code(color);
        let (x, y, w, h) = (rect.x(), rect.y(), rect.width(), rect.height());
        self.paint(&Rect::from_xywh(x, y, w, 1.0), color);
        self.paint(&Rect::from_xywh(x, y + h - 1.0, w, 1.0), color);
        self.paint(&Rect::from_xywh(x, y, 1.0, h), color);
        self.paint(&Rect::from_xywh(x + w - 1.0, y, 1.0, h), color);
    }

    fn draw_image(&mut self, image: &SolidImage, _source: &Rect, destination: &Rect) -> Result<()> {
        self.draws.push(*destination);
        self.paint(destination, image.color);
        Ok(())
    }
}
