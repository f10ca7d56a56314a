use crate::geometry::{Color, Rect, Vec2};
use crate::graphics::ImageRegion;

use super::Surface;

#[derive(Debug, Clone, PartialEq)]
pub enum SurfaceCall {
    FillRect {
        rect: Rect,
        color: Color,
    },
    Blit {
        region: ImageRegion,
        dst: Rect,
    },
    FillCircle {
        center: Vec2,
        radius: f32,
        color: Color,
    },
    StrokeLine {
        from: Vec2,
        to: Vec2,
        color: Color,
    },
    DrawText {
        text: String,
        at: Vec2,
        font: String,
        color: Color,
    },
    SetClip(Option<Rect>),
}

impl SurfaceCall {
    pub fn name(&self) -> &'static str {
        match self {
            SurfaceCall::FillRect { .. } => "fill_rect",
            SurfaceCall::Blit { .. } => "blit_image_region",
            SurfaceCall::FillCircle { .. } => "fill_circle",
            SurfaceCall::StrokeLine { .. } => "stroke_line",
            SurfaceCall::DrawText { .. } => "draw_text",
            SurfaceCall::SetClip(_) => "set_clip",
        }
    }
}

/// Headless surface that logs every call instead of rasterizing.
#[derive(Debug, Clone, Default)]
pub struct RecordingSurface {
    width: u32,
    height: u32,
    clip: Option<Rect>,
    calls: Vec<SurfaceCall>,
}

impl RecordingSurface {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            clip: None,
            calls: Vec::new(),
        }
    }

    pub fn calls(&self) -> &[SurfaceCall] {
        &self.calls
    }

    pub fn take_calls(&mut self) -> Vec<SurfaceCall> {
        std::mem::take(&mut self.calls)
    }
}

impl Surface for RecordingSurface {
    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }

    fn fill_rect(&mut self, rect: Rect, color: Color) {
        self.calls.push(SurfaceCall::FillRect { rect, color });
    }

    fn blit_image_region(&mut self, region: &ImageRegion, dst: Rect) {
        self.calls.push(SurfaceCall::Blit {
            region: region.clone(),
            dst,
        });
    }

    fn fill_circle(&mut self, center: Vec2, radius: f32, color: Color) {
        self.calls.push(SurfaceCall::FillCircle {
            center,
            radius,
            color,
        });
    }

    fn stroke_line(&mut self, from: Vec2, to: Vec2, color: Color) {
        self.calls.push(SurfaceCall::StrokeLine { from, to, color });
    }

    fn draw_text(&mut self, text: &str, at: Vec2, font: &str, color: Color) {
        self.calls.push(SurfaceCall::DrawText {
            text: text.to_string(),
            at,
            font: font.to_string(),
            color,
        });
    }

    fn clip(&self) -> Option<Rect> {
        self.clip
    }

    fn set_clip(&mut self, clip: Option<Rect>) {
        self.clip = clip;
        self.calls.push(SurfaceCall::SetClip(clip));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn take_calls_drains_the_log_but_keeps_the_clip() {
        let mut surface = RecordingSurface::new(8, 8);
        let clip = Some(Rect::new(1.0, 1.0, 4.0, 4.0));
        surface.set_clip(clip);
        surface.fill_rect(Rect::new(0.0, 0.0, 2.0, 2.0), Color::RED);

        let calls = surface.take_calls();
        assert_eq!(
            calls.iter().map(SurfaceCall::name).collect::<Vec<_>>(),
            ["set_clip", "fill_rect"]
        );
        assert!(surface.calls().is_empty());
        assert_eq!(surface.clip(), clip);
    }
}
