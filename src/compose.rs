//! Builds derived textures out of existing ones: horizontal splicing, tiling a
//! single texture to an arbitrary size, and nine-slice border frames.

use crate::error::{Error, Result};
use crate::texture::Texture;
use crate::utils::IntRect;

/// One copy of `src` (a rect inside the source tile) to `(dest_x, dest_y)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Blit {
    pub src: IntRect,
    pub dest_x: u32,
    pub dest_y: u32,
}

impl Blit {
    pub fn dest(&self) -> IntRect {
        IntRect::new(self.dest_x, self.dest_y, self.src.width, self.src.height)
    }
}

/// Concatenates `inputs` left to right. Width is the sum of widths, height the
/// tallest input; shorter inputs leave transparent space underneath.
pub fn splice(inputs: &[&Texture]) -> Result<Texture> {
    if inputs.is_empty() {
        return Err(Error::UnexpectedValue(
            "splice requires at least one input texture".to_string(),
        ));
    }
    let width: u32 = inputs.iter().map(|t| t.width()).sum();
    let height = inputs.iter().map(|t| t.height()).max().unwrap_or(0);
    let mut out = Texture::new(width, height);
    let mut x = 0;
    for input in inputs {
        out.blit(input, x, 0);
        x += input.width();
    }
    Ok(out)
}

/// Plans the blits that cover a `output_w` x `output_h` canvas with a
/// `tile_w` x `tile_h` tile. Full tiles fill the grid; the leftover right
/// column, bottom row and corner are cut from the tile's top-left, so every
/// output pixel is written exactly once.
pub fn repeat_plan(tile_w: u32, tile_h: u32, output_w: u32, output_h: u32) -> Result<Vec<Blit>> {
    if tile_w == 0 || tile_h == 0 {
        return Err(Error::DivideByZero(format!(
            "cannot repeat a {tile_w}x{tile_h} tile"
        )));
    }
    if output_w == 0 || output_h == 0 {
        return Err(Error::UnexpectedValue(format!(
            "cannot repeat to an output of {output_w}x{output_h}"
        )));
    }
    let tiles_x = output_w / tile_w;
    let tiles_y = output_h / tile_h;
    let rem_w = output_w - tiles_x * tile_w;
    let rem_h = output_h - tiles_y * tile_h;

    let mut plan = Vec::with_capacity(((tiles_x + 1) * (tiles_y + 1)) as usize);
    for y in 0..tiles_y {
        for x in 0..tiles_x {
            plan.push(Blit {
                src: IntRect::new(0, 0, tile_w, tile_h),
                dest_x: x * tile_w,
                dest_y: y * tile_h,
            });
        }
        if rem_w > 0 {
            plan.push(Blit {
                src: IntRect::new(0, 0, rem_w, tile_h),
                dest_x: tiles_x * tile_w,
                dest_y: y * tile_h,
            });
        }
    }
    if rem_h > 0 {
        for x in 0..tiles_x {
            plan.push(Blit {
                src: IntRect::new(0, 0, tile_w, rem_h),
                dest_x: x * tile_w,
                dest_y: tiles_y * tile_h,
            });
        }
        if rem_w > 0 {
            plan.push(Blit {
                src: IntRect::new(0, 0, rem_w, rem_h),
                dest_x: tiles_x * tile_w,
                dest_y: tiles_y * tile_h,
            });
        }
    }
    Ok(plan)
}

pub fn repeat_to_size(tile: &Texture, output_w: u32, output_h: u32) -> Result<Texture> {
    let plan = repeat_plan(tile.width(), tile.height(), output_w, output_h)?;
    let mut out = Texture::new(output_w, output_h);
    for blit in &plan {
        out.blit_region(tile, blit.src, blit.dest_x, blit.dest_y);
    }
    Ok(out)
}

/// The nine inputs of a border frame.
#[derive(Debug, Clone, Copy)]
pub struct BorderParts<'a> {
    pub top_left: &'a Texture,
    pub top_right: &'a Texture,
    pub bottom_left: &'a Texture,
    pub bottom_right: &'a Texture,
    pub left: &'a Texture,
    pub right: &'a Texture,
    pub top: &'a Texture,
    pub bottom: &'a Texture,
    pub center: &'a Texture,
}

/// Destination rectangles of each border piece on the output canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BorderLayout {
    pub top_left: IntRect,
    pub top_right: IntRect,
    pub bottom_left: IntRect,
    pub bottom_right: IntRect,
    pub left: IntRect,
    pub right: IntRect,
    pub top: IntRect,
    pub bottom: IntRect,
    pub center: IntRect,
}

fn span(total: u32, a: u32, b: u32, what: &str) -> Result<u32> {
    total.checked_sub(a + b).ok_or_else(|| {
        Error::InvalidConfiguration(format!(
            "border pieces ({a} + {b}) exceed output {what} {total}"
        ))
    })
}

pub fn border_layout(parts: &BorderParts<'_>, width: u32, height: u32) -> Result<BorderLayout> {
    let (tl_w, tl_h) = parts.top_left.dimensions();
    let (tr_w, tr_h) = parts.top_right.dimensions();
    let (bl_w, bl_h) = parts.bottom_left.dimensions();
    let (br_w, br_h) = parts.bottom_right.dimensions();
    let left_w = parts.left.width();
    let right_w = parts.right.width();
    let top_h = parts.top.height();
    let bottom_h = parts.bottom.height();

    let top_len = span(width, tl_w, tr_w, "width")?;
    let bottom_len = span(width, bl_w, br_w, "width")?;
    let left_len = span(height, tl_h, bl_h, "height")?;
    let right_len = span(height, tr_h, br_h, "height")?;
    let center_w = span(width, left_w, right_w, "width")?;
    let center_h = span(height, top_h, bottom_h, "height")?;

    Ok(BorderLayout {
        top_left: IntRect::new(0, 0, tl_w, tl_h),
        top_right: IntRect::new(width - tr_w, 0, tr_w, tr_h),
        bottom_left: IntRect::new(0, height - bl_h, bl_w, bl_h),
        bottom_right: IntRect::new(width - br_w, height - br_h, br_w, br_h),
        top: IntRect::new(tl_w, 0, top_len, top_h),
        bottom: IntRect::new(bl_w, height - bottom_h, bottom_len, bottom_h),
        left: IntRect::new(0, tl_h, left_w, left_len),
        right: IntRect::new(width - right_w, tr_h, right_w, right_len),
        center: IntRect::new(left_w, top_h, center_w, center_h),
    })
}

/// Composes a `width` x `height` frame. Edges and center are tiled, corners
/// are copied unscaled on top.
pub fn compose_border(parts: &BorderParts<'_>, width: u32, height: u32) -> Result<Texture> {
    let layout = border_layout(parts, width, height)?;
    let mut out = Texture::new(width, height);

    let tiled = [
        (parts.center, layout.center),
        (parts.top, layout.top),
        (parts.bottom, layout.bottom),
        (parts.left, layout.left),
        (parts.right, layout.right),
    ];
    for (tile, dest) in tiled {
        if dest.is_empty() {
            continue;
        }
        let strip = repeat_to_size(tile, dest.width, dest.height)?;
        out.blit(&strip, dest.x, dest.y);
    }

    let corners = [
        (parts.top_left, layout.top_left),
        (parts.top_right, layout.top_right),
        (parts.bottom_left, layout.bottom_left),
        (parts.bottom_right, layout.bottom_right),
    ];
    for (corner, dest) in corners {
        out.blit(corner, dest.x, dest.y);
    }
    Ok(out)
}
