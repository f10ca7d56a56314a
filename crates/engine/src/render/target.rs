use crate::geometry::{Rect, Vec2};

use super::{
    CircleArgs, ClearArgs, DrawCommand, DrawingSequence, EffectPipeline, GraphicArgs, LineArgs,
    RectArgs, ScreenSection, Surface, TextArgs,
};

/// Anything that accepts draw commands in its own coordinate space.
pub trait DrawTarget {
    fn width(&self) -> f32;
    fn height(&self) -> f32;
    fn submit(&mut self, command: DrawCommand);
}

impl<T: DrawTarget + ?Sized> DrawTarget for &mut T {
    fn width(&self) -> f32 {
        (**self).width()
    }

    fn height(&self) -> f32 {
        (**self).height()
    }

    fn submit(&mut self, command: DrawCommand) {
        (**self).submit(command)
    }
}

/// Chainable drawing calls for every [`DrawTarget`].
pub trait Draw: DrawTarget {
    fn clear(&mut self, args: ClearArgs) -> &mut Self {
        self.submit(DrawCommand::Clear(args));
        self
    }

    fn draw_rect(&mut self, args: RectArgs) -> &mut Self {
        self.submit(DrawCommand::Rect(args));
        self
    }

    fn draw_graphic(&mut self, args: GraphicArgs) -> &mut Self {
        self.submit(DrawCommand::Graphic(args));
        self
    }

    fn draw_text(&mut self, args: TextArgs) -> &mut Self {
        self.submit(DrawCommand::Text(args));
        self
    }

    fn draw_circle(&mut self, args: CircleArgs) -> &mut Self {
        self.submit(DrawCommand::Circle(args));
        self
    }

    fn draw_line(&mut self, args: LineArgs) -> &mut Self {
        self.submit(DrawCommand::Line(args));
        self
    }

    fn draw_sequence(&mut self, sequence: &DrawingSequence) -> &mut Self {
        sequence.replay(self);
        self
    }
}

impl<T: DrawTarget + ?Sized> Draw for T {}

/// Root drawing target. Owns its surface and draws in surface coordinates
/// without clipping of its own.
#[derive(Debug)]
pub struct Screen<S> {
    surface: S,
    effects: EffectPipeline,
}

impl<S: Surface> Screen<S> {
    pub fn new(surface: S) -> Self {
        Self {
            surface,
            effects: EffectPipeline::new(),
        }
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    pub fn into_surface(self) -> S {
        self.surface
    }

    pub fn effects_mut(&mut self) -> &mut EffectPipeline {
        &mut self.effects
    }

    pub fn tick_effects(&mut self) {
        self.effects.tick();
    }

    /// A clipped view of part of this screen. Coordinates given to the
    /// section are local to `(x, y)`.
    pub fn section(&mut self, x: f32, y: f32, width: f32, height: f32) -> ScreenSection<'_, S> {
        ScreenSection::new(&mut self.surface, Rect::new(x, y, width, height))
    }
}

impl<S: Surface> DrawTarget for Screen<S> {
    fn width(&self) -> f32 {
        self.surface.width() as f32
    }

    fn height(&self) -> f32 {
        self.surface.height() as f32
    }

    fn submit(&mut self, command: DrawCommand) {
        let command = self.effects.apply(command);
        render_unclipped(&mut self.surface, command);
    }
}

fn render_unclipped<S: Surface + ?Sized>(surface: &mut S, command: DrawCommand) {
    match command {
        DrawCommand::Clear(args) => {
            let extent = surface.bounds();
            surface.fill_rect(extent, args.color);
        }
        DrawCommand::Rect(args) => {
            surface.fill_rect(Rect::new(args.x, args.y, args.width, args.height), args.color);
        }
        DrawCommand::Graphic(args) => {
            let Some(frame) = args.graphic.current_frame() else {
                return;
            };
            let dst = Rect::new(
                args.x,
                args.y,
                args.width.unwrap_or(frame.width()),
                args.height.unwrap_or(frame.height()),
            );
            surface.blit_image_region(&frame, dst);
        }
        DrawCommand::Text(args) => {
            surface.draw_text(&args.text, Vec2::new(args.x, args.y), &args.font, args.color);
        }
        DrawCommand::Circle(args) => {
            surface.fill_circle(args.center(), args.radius, args.color);
        }
        DrawCommand::Line(args) => {
            surface.stroke_line(
                Vec2::new(args.x1, args.y1),
                Vec2::new(args.x2, args.y2),
                args.color,
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Color;
    use crate::graphics::{Graphic, ImageRegion};
    use crate::render::{RecordingSurface, SurfaceCall};

    #[test]
    fn clear_fills_the_whole_surface() {
        let mut screen = Screen::new(RecordingSurface::new(64, 32));
        screen.clear(ClearArgs::new(Color::BLUE));
        assert_eq!(
            screen.surface().calls(),
            &[SurfaceCall::FillRect {
                rect: Rect::new(0.0, 0.0, 64.0, 32.0),
                color: Color::BLUE
            }]
        );
    }

    #[test]
    fn calls_chain_and_forward_in_order() {
        let mut screen = Screen::new(RecordingSurface::new(10, 10));
        screen
            .draw_rect(RectArgs::new(1.0, 2.0, 3.0, 4.0))
            .draw_line(LineArgs::new(0.0, 0.0, 9.0, 9.0))
            .draw_circle(CircleArgs::new(5.0, 5.0, 2.0))
            .draw_text(TextArgs::new("hp", 1.0, 1.0));

        let names: Vec<&str> = screen.surface().calls().iter().map(|c| c.name()).collect();
        assert_eq!(
            names,
            vec!["fill_rect", "stroke_line", "fill_circle", "draw_text"]
        );
    }

    #[test]
    fn graphic_size_defaults_to_its_frame() {
        let sprite = ImageRegion::solid(Color::GREEN, 6, 4);
        let mut screen = Screen::new(RecordingSurface::new(32, 32));
        screen
            .draw_graphic(GraphicArgs::new(sprite.clone(), 3.0, 2.0))
            .draw_graphic(GraphicArgs::new(sprite.clone(), 0.0, 0.0).with_size(12.0, 8.0));

        assert_eq!(
            screen.surface().calls(),
            &[
                SurfaceCall::Blit {
                    region: sprite.clone(),
                    dst: Rect::new(3.0, 2.0, 6.0, 4.0)
                },
                SurfaceCall::Blit {
                    region: sprite,
                    dst: Rect::new(0.0, 0.0, 12.0, 8.0)
                },
            ]
        );
    }

    #[test]
    fn idle_controller_draws_nothing() {
        let mut screen = Screen::new(RecordingSurface::new(8, 8));
        screen.draw_graphic(GraphicArgs::new(
            Graphic::controller(Default::default()),
            0.0,
            0.0,
        ));
        assert!(screen.surface().calls().is_empty());
    }

    #[test]
    fn screen_effects_apply_before_forwarding() {
        let mut screen = Screen::new(RecordingSurface::new(8, 8));
        screen
            .effects_mut()
            .push_fn(|command| command.translated(2.0, 1.0));
        screen.draw_rect(RectArgs::new(0.0, 0.0, 1.0, 1.0));
        assert_eq!(
            screen.surface().calls(),
            &[SurfaceCall::FillRect {
                rect: Rect::new(2.0, 1.0, 1.0, 1.0),
                color: Color::RED
            }]
        );
    }

    #[test]
    fn screen_can_borrow_an_external_surface() {
        let mut surface = RecordingSurface::new(4, 4);
        Screen::new(&mut surface).clear(ClearArgs::default());
        assert_eq!(surface.calls().len(), 1);
    }
}
