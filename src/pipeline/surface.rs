//! Scratch rendering surface used to flatten a raster before JPEG export.
//!
//! The surface is opaque RGB sized to the raster's native pixel dimensions
//! and starts out black. Drawing composites straight (non-premultiplied)
//! RGBA over it, so transparent regions end up black in the JPEG, the same
//! result a `<canvas>` gives when exported as `image/jpeg`.

use image::{imageops, DynamicImage, Rgb, RgbImage};

pub struct Surface {
    pixels: RgbImage,
}

impl Surface {
    /// A black surface of `width × height` pixels.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            pixels: RgbImage::from_pixel(width, height, Rgb([0, 0, 0])),
        }
    }

    /// A surface sized to `image`, with `image` drawn at the origin.
    pub fn for_image(image: &DynamicImage) -> Self {
        let mut surface = Self::new(image.width(), image.height());
        surface.draw(image);
        surface
    }

    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    /// Composite `image` onto the surface at (0, 0), clipping to the surface.
    pub fn draw(&mut self, image: &DynamicImage) {
        if !image.color().has_alpha() {
            let rgb = image.to_rgb8();
            imageops::replace(&mut self.pixels, &rgb, 0, 0);
            return;
        }

        let mut canvas = DynamicImage::ImageRgb8(std::mem::take(&mut self.pixels)).into_rgba8();
        imageops::overlay(&mut canvas, &image.to_rgba8(), 0, 0);
        self.pixels = DynamicImage::ImageRgba8(canvas).into_rgb8();
    }

    pub fn pixels(&self) -> &RgbImage {
        &self.pixels
    }
}
