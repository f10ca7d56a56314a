use crate::geometry::{Color, Vec2};
use crate::graphics::Graphic;

pub const DEFAULT_FONT: &str = "12px Arial";

#[derive(Debug, Clone, PartialEq)]
pub struct ClearArgs {
    pub color: Color,
}

impl ClearArgs {
    pub fn new(color: Color) -> Self {
        Self { color }
    }
}

impl Default for ClearArgs {
    fn default() -> Self {
        Self {
            color: Color::BLACK,
        }
    }
}

/// Filled rectangle. At a screen target `x`/`y` is the top-left corner; at a
/// camera it is the world-space center.
#[derive(Debug, Clone, PartialEq)]
pub struct RectArgs {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub color: Color,
}

impl RectArgs {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
            color: Color::RED,
        }
    }

    pub fn with_color(mut self, color: Color) -> Self {
        self.color = color;
        self
    }
}

/// Graphic blit. A missing width or height falls back to the size of the
/// frame the graphic resolves to when drawn.
#[derive(Debug, Clone, PartialEq)]
pub struct GraphicArgs {
    pub graphic: Graphic,
    pub x: f32,
    pub y: f32,
    pub width: Option<f32>,
    pub height: Option<f32>,
}

impl GraphicArgs {
    pub fn new(graphic: impl Into<Graphic>, x: f32, y: f32) -> Self {
        Self {
            graphic: graphic.into(),
            x,
            y,
            width: None,
            height: None,
        }
    }

    pub fn with_size(mut self, width: f32, height: f32) -> Self {
        self.width = Some(width);
        self.height = Some(height);
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TextArgs {
    pub text: String,
    pub x: f32,
    pub y: f32,
    pub font: String,
    pub color: Color,
}

impl TextArgs {
    pub fn new(text: impl Into<String>, x: f32, y: f32) -> Self {
        Self {
            text: text.into(),
            x,
            y,
            font: DEFAULT_FONT.to_string(),
            color: Color::WHITE,
        }
    }

    pub fn with_font(mut self, font: impl Into<String>) -> Self {
        self.font = font.into();
        self
    }

    pub fn with_color(mut self, color: Color) -> Self {
        self.color = color;
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CircleArgs {
    pub x: f32,
    pub y: f32,
    pub radius: f32,
    pub color: Color,
}

impl CircleArgs {
    pub fn new(x: f32, y: f32, radius: f32) -> Self {
        Self {
            x,
            y,
            radius,
            color: Color::RED,
        }
    }

    pub fn with_color(mut self, color: Color) -> Self {
        self.color = color;
        self
    }

    pub fn center(&self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LineArgs {
    pub x1: f32,
    pub y1: f32,
    pub x2: f32,
    pub y2: f32,
    pub color: Color,
}

impl LineArgs {
    pub fn new(x1: f32, y1: f32, x2: f32, y2: f32) -> Self {
        Self {
            x1,
            y1,
            x2,
            y2,
            color: Color::BLACK,
        }
    }

    pub fn with_color(mut self, color: Color) -> Self {
        self.color = color;
        self
    }
}

/// One recorded draw call: the operation and its argument record.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    Clear(ClearArgs),
    Rect(RectArgs),
    Graphic(GraphicArgs),
    Text(TextArgs),
    Circle(CircleArgs),
    Line(LineArgs),
}

impl DrawCommand {
    pub fn name(&self) -> &'static str {
        match self {
            DrawCommand::Clear(_) => "clear",
            DrawCommand::Rect(_) => "draw_rect",
            DrawCommand::Graphic(_) => "draw_graphic",
            DrawCommand::Text(_) => "draw_text",
            DrawCommand::Circle(_) => "draw_circle",
            DrawCommand::Line(_) => "draw_line",
        }
    }

    /// Shifts every position field. Sizes and `Clear` are untouched.
    pub fn translated(self, dx: f32, dy: f32) -> Self {
        match self {
            DrawCommand::Clear(args) => DrawCommand::Clear(args),
            DrawCommand::Rect(args) => DrawCommand::Rect(RectArgs {
                x: args.x + dx,
                y: args.y + dy,
                ..args
            }),
            DrawCommand::Graphic(args) => DrawCommand::Graphic(GraphicArgs {
                x: args.x + dx,
                y: args.y + dy,
                ..args
            }),
            DrawCommand::Text(args) => DrawCommand::Text(TextArgs {
                x: args.x + dx,
                y: args.y + dy,
                ..args
            }),
            DrawCommand::Circle(args) => DrawCommand::Circle(CircleArgs {
                x: args.x + dx,
                y: args.y + dy,
                ..args
            }),
            DrawCommand::Line(args) => DrawCommand::Line(LineArgs {
                x1: args.x1 + dx,
                y1: args.y1 + dy,
                x2: args.x2 + dx,
                y2: args.y2 + dy,
                ..args
            }),
        }
    }
}

impl From<ClearArgs> for DrawCommand {
    fn from(args: ClearArgs) -> Self {
        DrawCommand::Clear(args)
    }
}

impl From<RectArgs> for DrawCommand {
    fn from(args: RectArgs) -> Self {
        DrawCommand::Rect(args)
    }
}

impl From<GraphicArgs> for DrawCommand {
    fn from(args: GraphicArgs) -> Self {
        DrawCommand::Graphic(args)
    }
}

impl From<TextArgs> for DrawCommand {
    fn from(args: TextArgs) -> Self {
        DrawCommand::Text(args)
    }
}

impl From<CircleArgs> for DrawCommand {
    fn from(args: CircleArgs) -> Self {
        DrawCommand::Circle(args)
    }
}

impl From<LineArgs> for DrawCommand {
    fn from(args: LineArgs) -> Self {
        DrawCommand::Line(args)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn argument_defaults_match_primitive_conventions() {
        assert_eq!(RectArgs::new(0.0, 0.0, 1.0, 1.0).color, Color::RED);
        assert_eq!(CircleArgs::new(0.0, 0.0, 1.0).color, Color::RED);
        assert_eq!(LineArgs::new(0.0, 0.0, 1.0, 1.0).color, Color::BLACK);

        let text = TextArgs::new("hi", 0.0, 0.0);
        assert_eq!(text.color, Color::WHITE);
        assert_eq!(text.font, DEFAULT_FONT);
    }

    #[test]
    fn translation_moves_positions_only() {
        let rect = DrawCommand::from(RectArgs::new(1.0, 2.0, 3.0, 4.0)).translated(10.0, -1.0);
        assert_eq!(rect, DrawCommand::Rect(RectArgs::new(11.0, 1.0, 3.0, 4.0)));

        let line = DrawCommand::from(LineArgs::new(0.0, 0.0, 5.0, 5.0)).translated(1.0, 2.0);
        assert_eq!(line, DrawCommand::Line(LineArgs::new(1.0, 2.0, 6.0, 7.0)));

        let clear = DrawCommand::from(ClearArgs::default());
        assert_eq!(clear.clone().translated(3.0, 3.0), clear);
    }

    #[test]
    fn command_names_are_stable() {
        let circle = DrawCommand::from(CircleArgs::new(0.0, 0.0, 2.0));
        assert_eq!(circle.name(), "draw_circle");
        assert_eq!(DrawCommand::from(ClearArgs::default()).name(), "clear");
    }
}
