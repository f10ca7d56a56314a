use crate::geometry::{Color, Rect, Vec2};
use crate::graphics::ImageRegion;

/// Raw pixel surface in its own coordinate space: origin top-left, +x right,
/// +y down. Implementations rasterize or record; they never transform.
pub trait Surface {
    fn width(&self) -> u32;
    fn height(&self) -> u32;

    fn fill_rect(&mut self, rect: Rect, color: Color);
    fn blit_image_region(&mut self, region: &ImageRegion, dst: Rect);
    fn fill_circle(&mut self, center: Vec2, radius: f32, color: Color);
    fn stroke_line(&mut self, from: Vec2, to: Vec2, color: Color);
    fn draw_text(&mut self, text: &str, at: Vec2, font: &str, color: Color);

    /// Current clip rectangle, if any. Pixels outside it are never written.
    fn clip(&self) -> Option<Rect>;
    fn set_clip(&mut self, clip: Option<Rect>);

    fn bounds(&self) -> Rect {
        Rect::new(0.0, 0.0, self.width() as f32, self.height() as f32)
    }
}

impl<S: Surface + ?Sized> Surface for &mut S {
    fn width(&self) -> u32 {
        (**self).width()
    }

    fn height(&self) -> u32 {
        (**self).height()
    }

    fn fill_rect(&mut self, rect: Rect, color: Color) {
        (**self).fill_rect(rect, color)
    }

    fn blit_image_region(&mut self, region: &ImageRegion, dst: Rect) {
        (**self).blit_image_region(region, dst)
    }

    fn fill_circle(&mut self, center: Vec2, radius: f32, color: Color) {
        (**self).fill_circle(center, radius, color)
    }

    fn stroke_line(&mut self, from: Vec2, to: Vec2, color: Color) {
        (**self).stroke_line(from, to, color)
    }

    fn draw_text(&mut self, text: &str, at: Vec2, font: &str, color: Color) {
        (**self).draw_text(text, at, font, color)
    }

    fn clip(&self) -> Option<Rect> {
        (**self).clip()
    }

    fn set_clip(&mut self, clip: Option<Rect>) {
        (**self).set_clip(clip)
    }
}
