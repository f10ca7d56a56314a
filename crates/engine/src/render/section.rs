use crate::geometry::{Rect, Vec2};

use super::{DrawCommand, DrawTarget, EffectPipeline, Surface};

/// Clipped sub-region of a surface.
///
/// Commands arrive in local coordinates, are clamped to
/// `[0, width] x [0, height]`, then offset into surface coordinates. Anything
/// left with no area after clamping is dropped without a draw call.
#[derive(Debug)]
pub struct ScreenSection<'a, S: ?Sized> {
    surface: &'a mut S,
    bounds: Rect,
    effects: EffectPipeline,
}

impl<'a, S: Surface + ?Sized> ScreenSection<'a, S> {
    pub fn new(surface: &'a mut S, bounds: Rect) -> Self {
        Self {
            surface,
            bounds,
            effects: EffectPipeline::new(),
        }
    }

    /// Surface-space rectangle covered by this section.
    pub fn bounds(&self) -> Rect {
        self.bounds
    }

    pub fn effects_mut(&mut self) -> &mut EffectPipeline {
        &mut self.effects
    }

    /// Nested section, clipped to this one.
    pub fn section(&mut self, x: f32, y: f32, width: f32, height: f32) -> ScreenSection<'_, S> {
        let local = Rect::new(x, y, width, height).translated(self.bounds.x, self.bounds.y);
        let bounds = local
            .intersection(&self.bounds)
            .unwrap_or(Rect::new(local.x, local.y, 0.0, 0.0));
        ScreenSection::new(&mut *self.surface, bounds)
    }

    fn clamp_x(&self, x: f32) -> f32 {
        x.min(self.bounds.width).max(0.0)
    }

    fn clamp_y(&self, y: f32) -> f32 {
        y.min(self.bounds.height).max(0.0)
    }

    /// Local rect clamped to the section, or `None` when nothing remains.
    fn clamp_rect(&self, rect: Rect) -> Option<Rect> {
        let clamped = Rect::from_edges(
            self.clamp_x(rect.left()),
            self.clamp_y(rect.top()),
            self.clamp_x(rect.right()),
            self.clamp_y(rect.bottom()),
        );
        (!clamped.is_empty()).then_some(clamped)
    }

    fn to_surface(&self, rect: Rect) -> Rect {
        rect.translated(self.bounds.x, self.bounds.y)
    }

    fn with_clip(&mut self, draw: impl FnOnce(&mut S)) {
        let previous = self.surface.clip();
        let clip = match previous {
            Some(previous) => previous.intersection(&self.bounds),
            None => Some(self.bounds),
        };
        let Some(clip) = clip else {
            return;
        };
        self.surface.set_clip(Some(clip));
        draw(&mut *self.surface);
        self.surface.set_clip(previous);
    }

    fn render(&mut self, command: DrawCommand) {
        let (ox, oy) = (self.bounds.x, self.bounds.y);
        match command {
            DrawCommand::Clear(args) => {
                if !self.bounds.is_empty() {
                    self.surface.fill_rect(self.bounds, args.color);
                }
            }
            DrawCommand::Rect(args) => {
                let rect = Rect::new(args.x, args.y, args.width, args.height);
                if let Some(clamped) = self.clamp_rect(rect) {
                    let dst = self.to_surface(clamped);
                    self.surface.fill_rect(dst, args.color);
                }
            }
            DrawCommand::Graphic(args) => {
                let Some(frame) = args.graphic.current_frame() else {
                    return;
                };
                let width = args.width.unwrap_or(frame.width());
                let height = args.height.unwrap_or(frame.height());
                let Some(clamped) = self.clamp_rect(Rect::new(args.x, args.y, width, height))
                else {
                    return;
                };
                let crop = frame.crop();
                let scale_x = crop.width / width;
                let scale_y = crop.height / height;
                let source = Rect::new(
                    crop.x + (clamped.x - args.x) * scale_x,
                    crop.y + (clamped.y - args.y) * scale_y,
                    clamped.width * scale_x,
                    clamped.height * scale_y,
                );
                let dst = self.to_surface(clamped);
                self.surface
                    .blit_image_region(&frame.with_crop(source), dst);
            }
            DrawCommand::Circle(args) => {
                if args.radius.is_nan() || args.radius <= 0.0 {
                    return;
                }
                let local = Rect::new(0.0, 0.0, self.bounds.width, self.bounds.height);
                let footprint = Rect::centered_at(args.center(), args.radius * 2.0, args.radius * 2.0);
                if !footprint.intersects(&local) {
                    return;
                }
                let center = args.center().offset(ox, oy);
                if local.contains_rect(&footprint) {
                    self.surface.fill_circle(center, args.radius, args.color);
                } else {
                    self.with_clip(|surface| surface.fill_circle(center, args.radius, args.color));
                }
            }
            DrawCommand::Line(args) => {
                let local = Rect::new(0.0, 0.0, self.bounds.width, self.bounds.height);
                let from = Vec2::new(args.x1, args.y1);
                let to = Vec2::new(args.x2, args.y2);
                if let Some((from, to)) = clip_line(from, to, local) {
                    self.surface
                        .stroke_line(from.offset(ox, oy), to.offset(ox, oy), args.color);
                }
            }
            DrawCommand::Text(args) => {
                let at = Vec2::new(args.x + ox, args.y + oy);
                self.with_clip(|surface| surface.draw_text(&args.text, at, &args.font, args.color));
            }
        }
    }
}

impl<S: Surface + ?Sized> DrawTarget for ScreenSection<'_, S> {
    fn width(&self) -> f32 {
        self.bounds.width
    }

    fn height(&self) -> f32 {
        self.bounds.height
    }

    fn submit(&mut self, command: DrawCommand) {
        let command = self.effects.apply(command);
        self.render(command);
    }
}

/// Liang–Barsky clip of a segment against `bounds`. `None` when the segment
/// lies entirely outside.
pub(crate) fn clip_line(from: Vec2, to: Vec2, bounds: Rect) -> Option<(Vec2, Vec2)> {
    let dx = to.x - from.x;
    let dy = to.y - from.y;
    let mut t0 = 0.0_f32;
    let mut t1 = 1.0_f32;

    let edges = [
        (-dx, from.x - bounds.left()),
        (dx, bounds.right() - from.x),
        (-dy, from.y - bounds.top()),
        (dy, bounds.bottom() - from.y),
    ];
    for (p, q) in edges {
        if p == 0.0 {
            if q < 0.0 {
                return None;
            }
            continue;
        }
        let r = q / p;
        if p < 0.0 {
            if r > t1 {
                return None;
            }
            t0 = t0.max(r);
        } else {
            if r < t0 {
                return None;
            }
            t1 = t1.min(r);
        }
    }

    Some((
        Vec2::new(from.x + t0 * dx, from.y + t0 * dy),
        Vec2::new(from.x + t1 * dx, from.y + t1 * dy),
    ))
}
