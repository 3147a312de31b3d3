use crate::error::{Error, Result};
use crate::utils::{Color, IntRect, Size};
use image::{imageops, Rgba, RgbaImage};
use std::path::Path;

/// CPU side RGBA8 pixel buffer. All composition happens on these before a
/// backend uploads them.
#[derive(Debug, Clone, PartialEq)]
pub struct Texture {
    image: RgbaImage,
}

impl Texture {
    /// Transparent canvas.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            image: RgbaImage::new(width, height),
        }
    }

    pub fn solid(width: u32, height: u32, color: Color) -> Self {
        Self {
            image: RgbaImage::from_pixel(width, height, Rgba(color.to_array())),
        }
    }

    pub fn from_image(image: RgbaImage) -> Self {
        Self { image }
    }

    pub fn load(path: &Path) -> Result<Self> {
        let img = image::open(path).map_err(|e| {
            Error::InvalidPath(format!("failed to open texture '{}': {e}", path.display()))
        })?;
        Ok(Self {
            image: img.to_rgba8(),
        })
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let img = image::load_from_memory(bytes)
            .map_err(|e| Error::InvalidPath(format!("failed to decode texture bytes: {e}")))?;
        Ok(Self {
            image: img.to_rgba8(),
        })
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        self.image.save(path).map_err(|e| {
            Error::WriteFailure(format!("failed to write texture '{}': {e}", path.display()))
        })
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.image.dimensions()
    }

    pub fn size(&self) -> Size {
        Size::new(self.width() as f32, self.height() as f32)
    }

    pub fn image(&self) -> &RgbaImage {
        &self.image
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<Color> {
        if x >= self.width() || y >= self.height() {
            return None;
        }
        Some(Color::from(self.image.get_pixel(x, y).0))
    }

    /// Copy of the given sub rectangle. An empty rect selects the whole texture.
    pub fn region(&self, rect: IntRect) -> Result<Texture> {
        if rect.is_empty() {
            return Ok(self.clone());
        }
        if rect.right() > self.width() || rect.bottom() > self.height() {
            return Err(Error::UnexpectedValue(format!(
                "region {}x{} at ({}, {}) exceeds texture bounds {}x{}",
                rect.width,
                rect.height,
                rect.x,
                rect.y,
                self.width(),
                self.height()
            )));
        }
        let view = imageops::crop_imm(&self.image, rect.x, rect.y, rect.width, rect.height);
        Ok(Self {
            image: view.to_image(),
        })
    }

    /// Overwrites pixels at (x, y) with the whole of `src`; no blending.
    pub fn blit(&mut self, src: &Texture, x: u32, y: u32) {
        imageops::replace(&mut self.image, &src.image, x as i64, y as i64);
    }

    /// Overwrites pixels at (x, y) with `src_rect` of `src`.
    pub fn blit_region(&mut self, src: &Texture, src_rect: IntRect, x: u32, y: u32) {
        let view = imageops::crop_imm(
            &src.image,
            src_rect.x,
            src_rect.y,
            src_rect.width,
            src_rect.height,
        );
        imageops::replace(&mut self.image, &view.to_image(), x as i64, y as i64);
    }

    /// Multiplies every pixel by `color`.
    pub fn colorize(&mut self, color: Color) {
        let tint = color.to_array();
        for px in self.image.pixels_mut() {
            for (channel, t) in px.0.iter_mut().zip(tint) {
                *channel = ((*channel as u16 * t as u16) / 255) as u8;
            }
        }
    }

    /// Source-over blend of `src` at a signed offset, clipped to this canvas.
    pub fn draw_over(&mut self, src: &RgbaImage, x: i64, y: i64) {
        imageops::overlay(&mut self.image, src, x, y);
    }
}
