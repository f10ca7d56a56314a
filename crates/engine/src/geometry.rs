use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub const ZERO: Vec2 = Vec2 { x: 0.0, y: 0.0 };

    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn offset(self, dx: f32, dy: f32) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
        }
    }
}

/// Axis-aligned rectangle anchored at its top-left corner.
///
/// Used both for screen-space pixel footprints and for crop rectangles inside
/// a backing image. Width and height may be negative before validation; use
/// [`Rect::is_empty`] to detect degenerate results.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn from_edges(left: f32, top: f32, right: f32, bottom: f32) -> Self {
        Self {
            x: left,
            y: top,
            width: right - left,
            height: bottom - top,
        }
    }

    pub fn centered_at(center: Vec2, width: f32, height: f32) -> Self {
        Self {
            x: center.x - width / 2.0,
            y: center.y - height / 2.0,
            width,
            height,
        }
    }

    pub fn left(&self) -> f32 {
        self.x
    }

    pub fn top(&self) -> f32 {
        self.y
    }

    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    pub fn is_empty(&self) -> bool {
        !(self.width > 0.0 && self.height > 0.0)
    }

    pub fn contains_rect(&self, other: &Rect) -> bool {
        other.left() >= self.left()
            && other.right() <= self.right()
            && other.top() >= self.top()
            && other.bottom() <= self.bottom()
    }

    pub fn intersects(&self, other: &Rect) -> bool {
        !(other.right() <= self.left()
            || self.right() <= other.left()
            || other.bottom() <= self.top()
            || self.bottom() <= other.top())
    }

    /// Overlap of two rectangles, `None` when they share no area.
    pub fn intersection(&self, other: &Rect) -> Option<Rect> {
        let overlap = Rect::from_edges(
            self.left().max(other.left()),
            self.top().max(other.top()),
            self.right().min(other.right()),
            self.bottom().min(other.bottom()),
        );
        (!overlap.is_empty()).then_some(overlap)
    }

    pub fn translated(&self, dx: f32, dy: f32) -> Rect {
        Rect {
            x: self.x + dx,
            y: self.y + dy,
            ..*self
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Color(pub [u8; 4]);

impl Color {
    pub const BLACK: Color = Color([0, 0, 0, 255]);
    pub const WHITE: Color = Color([255, 255, 255, 255]);
    pub const RED: Color = Color([255, 0, 0, 255]);
    pub const GREEN: Color = Color([0, 160, 0, 255]);
    pub const BLUE: Color = Color([0, 0, 255, 255]);
    pub const TRANSPARENT: Color = Color([0, 0, 0, 0]);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Color([r, g, b, 255])
    }

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Color([r, g, b, a])
    }

    pub fn alpha(&self) -> u8 {
        self.0[3]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rect_edges_round_trip() {
        let rect = Rect::from_edges(-2.0, 3.0, 5.0, 7.5);
        assert_eq!(rect, Rect::new(-2.0, 3.0, 7.0, 4.5));
        assert_eq!(rect.right(), 5.0);
        assert_eq!(rect.bottom(), 7.5);
    }

    #[test]
    fn centered_rect_places_center_on_point() {
        let rect = Rect::centered_at(Vec2::new(10.0, 20.0), 4.0, 6.0);
        assert_eq!(rect, Rect::new(8.0, 17.0, 4.0, 6.0));
    }

    #[test]
    fn zero_or_negative_extent_is_empty() {
        assert!(Rect::new(0.0, 0.0, 0.0, 5.0).is_empty());
        assert!(Rect::new(0.0, 0.0, 5.0, -1.0).is_empty());
        assert!(Rect::new(0.0, 0.0, f32::NAN, 1.0).is_empty());
        assert!(!Rect::new(0.0, 0.0, 0.5, 0.5).is_empty());
    }

    #[test]
    fn touching_rects_do_not_intersect() {
        let a = Rect::new(0.0, 0.0, 5.0, 5.0);
        let b = Rect::new(5.0, 0.0, 5.0, 5.0);
        assert!(!a.intersects(&b));
        assert!(a.intersects(&Rect::new(4.9, 4.9, 1.0, 1.0)));
    }

    #[test]
    fn intersection_is_the_shared_area() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        let b = Rect::new(6.0, -2.0, 10.0, 5.0);
        assert_eq!(a.intersection(&b), Some(Rect::new(6.0, 0.0, 4.0, 3.0)));
        assert_eq!(a.intersection(&Rect::new(10.0, 0.0, 2.0, 2.0)), None);
    }
}
