use image::{imageops, Rgba, RgbaImage};

use crate::geometry::{Color, Rect, Vec2};
use crate::graphics::ImageRegion;

use super::font::{glyph_advance, glyph_for, text_scale, GLYPH_HEIGHT, GLYPH_WIDTH};
use super::section::clip_line;
use super::Surface;

/// Software RGBA surface.
///
/// A pixel is covered by a shape when its center lies inside the shape, so a
/// rect from `x = 0` to `x = 5` covers exactly columns `0..5`.
#[derive(Debug, Clone)]
pub struct RasterSurface {
    image: RgbaImage,
    clip: Option<Rect>,
}

/// Half-open pixel window `[x0, x1) x [y0, y1)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct PixelWindow {
    x0: i32,
    y0: i32,
    x1: i32,
    y1: i32,
}

impl PixelWindow {
    fn covering(rect: Rect) -> Self {
        Self {
            x0: first_covered(rect.left()),
            y0: first_covered(rect.top()),
            x1: first_covered(rect.right()),
            y1: first_covered(rect.bottom()),
        }
    }

    fn intersect(self, other: PixelWindow) -> Option<PixelWindow> {
        let window = PixelWindow {
            x0: self.x0.max(other.x0),
            y0: self.y0.max(other.y0),
            x1: self.x1.min(other.x1),
            y1: self.y1.min(other.y1),
        };
        (window.x0 < window.x1 && window.y0 < window.y1).then_some(window)
    }

    fn contains(&self, x: i32, y: i32) -> bool {
        x >= self.x0 && x < self.x1 && y >= self.y0 && y < self.y1
    }
}

fn first_covered(edge: f32) -> i32 {
    let value = (edge - 0.5).ceil();
    value.clamp(i32::MIN as f32, i32::MAX as f32) as i32
}

impl RasterSurface {
    pub fn new(width: u32, height: u32) -> Self {
        Self::from_image(RgbaImage::new(width, height))
    }

    pub fn from_image(image: RgbaImage) -> Self {
        Self { image, clip: None }
    }

    /// Surface initialised with a copy of the region's pixels, for drawing
    /// on top of an existing texture.
    pub fn from_region(region: &ImageRegion) -> Self {
        let source = region.image();
        let crop = region.crop();
        let x = crop.x.max(0.0).round() as u32;
        let y = crop.y.max(0.0).round() as u32;
        let width = crop.width.max(0.0).round() as u32;
        let height = crop.height.max(0.0).round() as u32;
        let image = imageops::crop_imm(&**source, x, y, width, height).to_image();
        Self::from_image(image)
    }

    pub fn image(&self) -> &RgbaImage {
        &self.image
    }

    /// Raw RGBA bytes, row-major.
    pub fn as_rgba(&self) -> &[u8] {
        self.image.as_raw()
    }

    pub fn into_image(self) -> RgbaImage {
        self.image
    }

    /// Finishes drawing and turns the result into a texture that can be
    /// drawn elsewhere.
    pub fn into_image_region(self) -> ImageRegion {
        ImageRegion::new(self.image)
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<Color> {
        self.image.get_pixel_checked(x, y).map(|pixel| Color(pixel.0))
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        if self.image.dimensions() != (width, height) {
            self.image = RgbaImage::new(width, height);
        }
    }

    fn window(&self) -> Option<PixelWindow> {
        let full = PixelWindow {
            x0: 0,
            y0: 0,
            x1: self.image.width() as i32,
            y1: self.image.height() as i32,
        };
        match self.clip {
            Some(clip) => full.intersect(PixelWindow::covering(clip)),
            None => (full.x1 > 0 && full.y1 > 0).then_some(full),
        }
    }

    fn write_pixel(&mut self, x: i32, y: i32, color: [u8; 4]) {
        if x < 0 || y < 0 {
            return;
        }
        let Some(pixel) = self.image.get_pixel_mut_checked(x as u32, y as u32) else {
            return;
        };
        blend_into(pixel, color);
    }

    fn draw_glyph(
        &mut self,
        window: PixelWindow,
        x: i32,
        y: i32,
        ch: char,
        scale: i32,
        color: [u8; 4],
    ) {
        let glyph = glyph_for(ch);
        for row in 0..GLYPH_HEIGHT {
            for column in 0..GLYPH_WIDTH {
                if !glyph.is_set(column, row) {
                    continue;
                }
                for sy in 0..scale {
                    for sx in 0..scale {
                        let px = x + column * scale + sx;
                        let py = y + row * scale + sy;
                        if window.contains(px, py) {
                            self.write_pixel(px, py, color);
                        }
                    }
                }
            }
        }
    }
}

fn blend_into(pixel: &mut Rgba<u8>, color: [u8; 4]) {
    let alpha = color[3] as u32;
    if alpha == 0 {
        return;
    }
    if alpha == 255 {
        pixel.0 = color;
        return;
    }
    let inverse = 255 - alpha;
    for channel in 0..3 {
        let mixed = color[channel] as u32 * alpha + pixel.0[channel] as u32 * inverse;
        pixel.0[channel] = (mixed / 255) as u8;
    }
    pixel.0[3] = (alpha + pixel.0[3] as u32 * inverse / 255).min(255) as u8;
}

impl Surface for RasterSurface {
    fn width(&self) -> u32 {
        self.image.width()
    }

    fn height(&self) -> u32 {
        self.image.height()
    }

    fn fill_rect(&mut self, rect: Rect, color: Color) {
        let Some(window) = self.window() else {
            return;
        };
        let Some(area) = window.intersect(PixelWindow::covering(rect)) else {
            return;
        };
        for y in area.y0..area.y1 {
            for x in area.x0..area.x1 {
                self.write_pixel(x, y, color.0);
            }
        }
    }

    fn blit_image_region(&mut self, region: &ImageRegion, dst: Rect) {
        let source = region.image();
        let (source_width, source_height) = source.dimensions();
        if source_width == 0 || source_height == 0 || dst.is_empty() {
            return;
        }
        let Some(window) = self.window() else {
            return;
        };
        let Some(area) = window.intersect(PixelWindow::covering(dst)) else {
            return;
        };

        let crop = region.crop();
        let min_x = crop.left().floor().max(0.0) as u32;
        let min_y = crop.top().floor().max(0.0) as u32;
        let max_x = ((crop.right().ceil() as i64 - 1).max(0) as u32).min(source_width - 1);
        let max_y = ((crop.bottom().ceil() as i64 - 1).max(0) as u32).min(source_height - 1);
        let step_x = crop.width / dst.width;
        let step_y = crop.height / dst.height;

        for y in area.y0..area.y1 {
            let v = crop.y + (y as f32 + 0.5 - dst.y) * step_y;
            let src_y = (v.floor().max(0.0) as u32).clamp(min_y, max_y.max(min_y));
            for x in area.x0..area.x1 {
                let u = crop.x + (x as f32 + 0.5 - dst.x) * step_x;
                let src_x = (u.floor().max(0.0) as u32).clamp(min_x, max_x.max(min_x));
                let Some(texel) = source.get_pixel_checked(src_x, src_y) else {
                    continue;
                };
                if texel.0[3] == 0 {
                    continue;
                }
                self.write_pixel(x, y, texel.0);
            }
        }
    }

    fn fill_circle(&mut self, center: Vec2, radius: f32, color: Color) {
        if radius.is_nan() || radius <= 0.0 {
            return;
        }
        let Some(window) = self.window() else {
            return;
        };
        let footprint = Rect::centered_at(center, radius * 2.0, radius * 2.0);
        let Some(area) = window.intersect(PixelWindow::covering(footprint)) else {
            return;
        };
        let radius_sq = radius * radius;
        for y in area.y0..area.y1 {
            let dy = y as f32 + 0.5 - center.y;
            for x in area.x0..area.x1 {
                let dx = x as f32 + 0.5 - center.x;
                if dx * dx + dy * dy <= radius_sq {
                    self.write_pixel(x, y, color.0);
                }
            }
        }
    }

    fn stroke_line(&mut self, from: Vec2, to: Vec2, color: Color) {
        let Some(window) = self.window() else {
            return;
        };
        // One pixel of slack so endpoints on the window edge survive.
        let limit = Rect::from_edges(
            window.x0 as f32 - 1.0,
            window.y0 as f32 - 1.0,
            window.x1 as f32 + 1.0,
            window.y1 as f32 + 1.0,
        );
        let Some((from, to)) = clip_line(from, to, limit) else {
            return;
        };

        let (mut x, mut y) = (from.x.floor() as i32, from.y.floor() as i32);
        let (end_x, end_y) = (to.x.floor() as i32, to.y.floor() as i32);
        let dx = (end_x - x).abs();
        let dy = -(end_y - y).abs();
        let step_x = if x < end_x { 1 } else { -1 };
        let step_y = if y < end_y { 1 } else { -1 };
        let mut error = dx + dy;
        loop {
            if window.contains(x, y) {
                self.write_pixel(x, y, color.0);
            }
            if x == end_x && y == end_y {
                break;
            }
            let doubled = 2 * error;
            if doubled >= dy {
                error += dy;
                x += step_x;
            }
            if doubled <= dx {
                error += dx;
                y += step_y;
            }
        }
    }

    /// `at` is the left end of the text baseline.
    fn draw_text(&mut self, text: &str, at: Vec2, font: &str, color: Color) {
        let Some(window) = self.window() else {
            return;
        };
        let scale = text_scale(font);
        let top = at.y.round() as i32 - GLYPH_HEIGHT * scale;
        let mut x = at.x.round() as i32;
        for ch in text.chars() {
            if x >= window.x1 {
                break;
            }
            self.draw_glyph(window, x, top, ch, scale, color.0);
            x += glyph_advance(scale);
        }
    }

    fn clip(&self) -> Option<Rect> {
        self.clip
    }

    fn set_clip(&mut self, clip: Option<Rect>) {
        self.clip = clip;
    }
}
