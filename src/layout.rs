use crate::utils::{Position, Rectangle, Size};
use serde::{Deserialize, Serialize};

/// Anchor expressed as a percentage of the window, 0..=100 per axis.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelativePosition {
    pub x: u8,
    pub y: u8,
}

impl RelativePosition {
    pub fn new(x: u8, y: u8) -> Self {
        Self { x, y }
    }

    /// Pixel point inside `window` that this anchor refers to.
    pub fn resolve(&self, window: Size) -> Position {
        Position {
            x: window.width * self.x as f32 / 100.0,
            y: window.height * self.y as f32 / 100.0,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Orientation {
    #[default]
    Horizontal,
    Vertical,
}

/// Places a widget of `size` so that its center sits on the anchor.
pub fn anchor_centered(window: Size, anchor: RelativePosition, size: Size) -> Rectangle {
    let p = anchor.resolve(window);
    Rectangle::new(
        p.x - size.width * 0.5,
        p.y - size.height * 0.5,
        size.width,
        size.height,
    )
}

/// Center point of item `index` in a flow menu whose origin is `origin`.
///
/// Horizontal: `x = origin.x + i*w + i*spacing`, `y = origin.y + h/2` with
/// `spacing = w * spacing_pct / 100`. Vertical swaps the axes.
pub fn menu_item_center(
    origin: Position,
    item: Size,
    index: usize,
    orientation: Orientation,
    spacing_pct: f32,
) -> Position {
    let i = index as f32;
    match orientation {
        Orientation::Horizontal => {
            let spacing = item.width * spacing_pct / 100.0;
            Position {
                x: origin.x + i * item.width + i * spacing,
                y: origin.y + item.height * 0.5,
            }
        }
        Orientation::Vertical => {
            let spacing = item.height * spacing_pct / 100.0;
            Position {
                x: origin.x + item.width * 0.5,
                y: origin.y + i * item.height + i * spacing,
            }
        }
    }
}

/// Bounds of item `index` of a flow menu, built around [`menu_item_center`].
pub fn menu_item_bounds(
    origin: Position,
    item: Size,
    index: usize,
    orientation: Orientation,
    spacing_pct: f32,
) -> Rectangle {
    let c = menu_item_center(origin, item, index, orientation, spacing_pct);
    Rectangle::new(
        c.x - item.width * 0.5,
        c.y - item.height * 0.5,
        item.width,
        item.height,
    )
}

/// Centers `inner` inside `outer`.
pub fn center_in(outer: Rectangle, inner: Size) -> Rectangle {
    Rectangle::new(
        outer.x + (outer.width - inner.width) * 0.5,
        outer.y + (outer.height - inner.height) * 0.5,
        inner.width,
        inner.height,
    )
}

/// Places `inner` to the right of `outer` with `gap` pixels in between,
/// vertically centered on it.
pub fn right_of(outer: Rectangle, inner: Size, gap: f32) -> Rectangle {
    Rectangle::new(
        outer.x + outer.width + gap,
        outer.y + (outer.height - inner.height) * 0.5,
        inner.width,
        inner.height,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn anchor_centers_widget_on_window_percent() {
        let window = Size::new(800.0, 600.0);
        let r = anchor_centered(window, RelativePosition::new(50, 25), Size::new(100.0, 40.0));
        assert!((r.x - 350.0).abs() < 1e-3);
        assert!((r.y - 130.0).abs() < 1e-3);
    }

    #[test]
    fn horizontal_menu_offsets_include_relative_spacing() {
        let origin = Position::new(200.0, 100.0);
        let item = Size::new(50.0, 20.0);
        let xs: Vec<f32> = (0..3)
            .map(|i| menu_item_center(origin, item, i, Orientation::Horizontal, 10.0).x - origin.x)
            .collect();
        assert!((xs[0] - 0.0).abs() < 1e-3);
        assert!((xs[1] - 55.0).abs() < 1e-3);
        assert!((xs[2] - 110.0).abs() < 1e-3);
        let c = menu_item_center(origin, item, 2, Orientation::Horizontal, 10.0);
        assert!((c.y - 110.0).abs() < 1e-3);
    }

    #[test]
    fn vertical_menu_swaps_axes() {
        let origin = Position::new(0.0, 0.0);
        let item = Size::new(50.0, 20.0);
        let c = menu_item_center(origin, item, 2, Orientation::Vertical, 50.0);
        assert!((c.x - 25.0).abs() < 1e-3);
        assert!((c.y - 60.0).abs() < 1e-3);
        let b = menu_item_bounds(origin, item, 2, Orientation::Vertical, 50.0);
        assert!((b.y - 50.0).abs() < 1e-3);
        assert!((b.x - 0.0).abs() < 1e-3);
    }

    #[test]
    fn label_placement_helpers() {
        let button = Rectangle::new(10.0, 10.0, 100.0, 40.0);
        let centered = center_in(button, Size::new(60.0, 20.0));
        assert!((centered.x - 30.0).abs() < 1e-3);
        assert!((centered.y - 20.0).abs() < 1e-3);
        let side = right_of(button, Size::new(30.0, 10.0), 5.0);
        assert!((side.x - 115.0).abs() < 1e-3);
        assert!((side.y - 25.0).abs() < 1e-3);
    }
}
