use crate::error::{Error, Result};
use crate::texture::Texture;
use crate::utils::{Color, Size};
use image::{imageops, Rgba, RgbaImage};
use rusttype::{point, Scale};
use std::path::Path;

#[derive(Clone)]
enum FontFace {
    Outline(rusttype::Font<'static>),
    // Fixed advance per character, as a fraction of the character size.
    Fixed { advance: f32, line_height: f32 },
}

/// A loaded font. Outline fonts come from TrueType/OpenType data; fixed fonts
/// have constant metrics and are used where no font file is available.
#[derive(Clone)]
pub struct Font {
    face: FontFace,
}

impl std::fmt::Debug for Font {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.face {
            FontFace::Outline(_) => f.write_str("Font::Outline"),
            FontFace::Fixed {
                advance,
                line_height,
            } => write!(f, "Font::Fixed({advance}, {line_height})"),
        }
    }
}

impl Font {
    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self> {
        let font = rusttype::Font::try_from_vec(bytes)
            .ok_or_else(|| Error::InvalidPath("font data is not a valid TrueType font".into()))?;
        Ok(Self {
            face: FontFace::Outline(font),
        })
    }

    pub fn load(path: &Path) -> Result<Self> {
        let bytes = std::fs::read(path).map_err(|e| {
            Error::InvalidPath(format!("failed to open font '{}': {e}", path.display()))
        })?;
        Self::from_bytes(bytes).map_err(|_| {
            Error::InvalidPath(format!("'{}' is not a valid font", path.display()))
        })
    }

    /// Font with constant metrics: every character advances `advance * size`
    /// and every line is `line_height * size` tall.
    pub fn fixed(advance: f32, line_height: f32) -> Self {
        Self {
            face: FontFace::Fixed {
                advance,
                line_height,
            },
        }
    }

    pub fn is_outline(&self) -> bool {
        matches!(self.face, FontFace::Outline(_))
    }

    /// Bounds of `text` laid out on one line at `char_size` pixels.
    pub fn measure(&self, text: &str, char_size: f32) -> Size {
        match &self.face {
            FontFace::Fixed {
                advance,
                line_height,
            } => Size::new(
                text.chars().count() as f32 * advance * char_size,
                line_height * char_size,
            ),
            FontFace::Outline(font) => {
                let scale = Scale::uniform(char_size);
                let v = font.v_metrics(scale);
                let width = font
                    .layout(text, scale, point(0.0, v.ascent))
                    .last()
                    .map(|g| g.position().x + g.unpositioned().h_metrics().advance_width)
                    .unwrap_or(0.0);
                Size::new(width, v.ascent - v.descent)
            }
        }
    }

    /// Rasterises `text` into a tightly sized texture. Fixed fonts produce a
    /// filled block per non-space character.
    pub fn rasterize(&self, text: &str, char_size: f32, fill: Color) -> Texture {
        let bounds = self.measure(text, char_size);
        let w = bounds.width.ceil().max(1.0) as u32;
        let h = bounds.height.ceil().max(1.0) as u32;
        let mut img = RgbaImage::new(w, h);
        match &self.face {
            FontFace::Outline(font) => {
                let scale = Scale::uniform(char_size);
                let v = font.v_metrics(scale);
                for glyph in font.layout(text, scale, point(0.0, v.ascent)) {
                    if let Some(bb) = glyph.pixel_bounding_box() {
                        glyph.draw(|gx, gy, cov| {
                            let px = bb.min.x + gx as i32;
                            let py = bb.min.y + gy as i32;
                            if px >= 0 && py >= 0 && (px as u32) < w && (py as u32) < h {
                                let alpha = (cov * fill.a as f32) as u8;
                                img.put_pixel(
                                    px as u32,
                                    py as u32,
                                    Rgba([fill.r, fill.g, fill.b, alpha]),
                                );
                            }
                        });
                    }
                }
            }
            FontFace::Fixed { advance, .. } => {
                let step = advance * char_size;
                for (i, c) in text.chars().enumerate() {
                    if c.is_whitespace() {
                        continue;
                    }
                    let x0 = (i as f32 * step) as u32;
                    let x1 = (((i + 1) as f32 * step) as u32).min(w);
                    for x in x0..x1 {
                        for y in 0..h {
                            img.put_pixel(x, y, Rgba(fill.to_array()));
                        }
                    }
                }
            }
        }
        Texture::from_image(img)
    }

    /// Like [`Font::rasterize`], with a `thickness` pixel outline painted
    /// behind the glyphs. The texture grows by `thickness` on every side.
    pub fn rasterize_outlined(
        &self,
        text: &str,
        char_size: f32,
        fill: Color,
        outline: Color,
        thickness: u32,
    ) -> Texture {
        let glyphs = self.rasterize(text, char_size, fill);
        if thickness == 0 || outline.a == 0 {
            return glyphs;
        }
        let (w, h) = glyphs.dimensions();
        let t = thickness as i64;
        let mut img = RgbaImage::new(w + 2 * thickness, h + 2 * thickness);
        for (x, y, px) in glyphs.image().enumerate_pixels() {
            if px.0[3] == 0 {
                continue;
            }
            let alpha = (px.0[3] as u16 * outline.a as u16 / 255) as u8;
            for dy in -t..=t {
                for dx in -t..=t {
                    if dx * dx + dy * dy > t * t {
                        continue;
                    }
                    let ox = (x as i64 + t + dx) as u32;
                    let oy = (y as i64 + t + dy) as u32;
                    let cur = img.get_pixel_mut(ox, oy);
                    if cur.0[3] < alpha {
                        *cur = Rgba([outline.r, outline.g, outline.b, alpha]);
                    }
                }
            }
        }
        imageops::overlay(&mut img, glyphs.image(), t, t);
        Texture::from_image(img)
    }
}
