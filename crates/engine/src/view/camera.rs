use serde::{Deserialize, Serialize};
use tracing::{trace, warn};

use crate::geometry::{Rect, Vec2};
use crate::render::{
    CircleArgs, DrawCommand, DrawTarget, EffectPipeline, GraphicArgs, LineArgs, RectArgs, TextArgs,
};
use crate::tiles::TileSource;

use super::transform::{screen_to_world, world_to_screen, Viewport};

pub const ZOOM_MIN: f32 = 0.125;
pub const ZOOM_MAX: f32 = 512.0;
pub const ZOOM_STEP_FACTOR: f32 = 1.25;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    pub position: Vec2,
    pub zoom: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            position: Vec2::ZERO,
            zoom: 1.0,
        }
    }
}

impl CameraConfig {
    /// Multiplies the zoom by [`ZOOM_STEP_FACTOR`] per step, clamped to
    /// [`ZOOM_MIN`]..=[`ZOOM_MAX`]. Zero steps leave the config unchanged.
    pub fn with_zoom_steps(self, steps: i32) -> Self {
        if steps == 0 {
            return self;
        }
        let zoom = self.zoom * ZOOM_STEP_FACTOR.powi(steps);
        Self {
            zoom: zoom.clamp(ZOOM_MIN, ZOOM_MAX),
            ..self
        }
    }
}

/// Inclusive range of tile coordinates a camera can see.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TileWindow {
    pub min_x: i32,
    pub min_y: i32,
    pub max_x: i32,
    pub max_y: i32,
}

impl TileWindow {
    pub fn contains(&self, x: i32, y: i32) -> bool {
        (self.min_x..=self.max_x).contains(&x) && (self.min_y..=self.max_y).contains(&y)
    }

    pub fn columns(&self) -> u32 {
        (self.max_x as i64 - self.min_x as i64 + 1).max(0) as u32
    }

    pub fn rows(&self) -> u32 {
        (self.max_y as i64 - self.min_y as i64 + 1).max(0) as u32
    }
}

/// Placement of one visible tile, handed to the per-tile callback.
#[derive(Debug, Clone, PartialEq)]
pub struct TileDraw<T> {
    pub tile: Option<T>,
    pub tile_x: i32,
    pub tile_y: i32,
    /// Screen-space top-left corner.
    pub position: Vec2,
    /// On-screen edge length, one pixel larger than the tile pitch.
    pub size: f32,
}

impl<T> TileDraw<T> {
    pub fn rect(&self) -> Rect {
        Rect::new(self.position.x, self.position.y, self.size, self.size)
    }
}

/// Draw target handed to per-tile callbacks. Forwards to the camera's target
/// through the camera's effects, in screen space.
pub struct TilePainter<'a, T> {
    target: &'a mut T,
    effects: &'a EffectPipeline,
}

impl<T: DrawTarget> DrawTarget for TilePainter<'_, T> {
    fn width(&self) -> f32 {
        self.target.width()
    }

    fn height(&self) -> f32 {
        self.target.height()
    }

    fn submit(&mut self, command: DrawCommand) {
        let command = self.effects.apply(command);
        self.target.submit(command);
    }
}

/// World-space view onto a draw target.
///
/// Commands submitted to a camera are in world units: rects and graphics are
/// given by their center and full extent, circles by center and radius. They
/// are converted to the target's pixel space, passed through the camera's
/// effects and forwarded. `Clear` passes through unconverted.
#[derive(Debug)]
pub struct Camera<T> {
    target: T,
    position: Vec2,
    zoom: f32,
    effects: EffectPipeline,
}

impl<T: DrawTarget> Camera<T> {
    pub fn new(target: T, position: Vec2, zoom: f32) -> Self {
        let zoom = if is_valid_zoom(zoom) {
            zoom
        } else {
            warn!(zoom, "camera_zoom_rejected");
            1.0
        };
        Self {
            target,
            position,
            zoom,
            effects: EffectPipeline::new(),
        }
    }

    pub fn from_config(target: T, config: CameraConfig) -> Self {
        Self::new(target, config.position, config.zoom)
    }

    pub fn config(&self) -> CameraConfig {
        CameraConfig {
            position: self.position,
            zoom: self.zoom,
        }
    }

    pub fn target(&self) -> &T {
        &self.target
    }

    pub fn target_mut(&mut self) -> &mut T {
        &mut self.target
    }

    pub fn into_target(self) -> T {
        self.target
    }

    pub fn position(&self) -> Vec2 {
        self.position
    }

    pub fn set_position(&mut self, position: Vec2) {
        self.position = position;
    }

    pub fn translate(&mut self, dx: f32, dy: f32) {
        self.position = self.position.offset(dx, dy);
    }

    pub fn zoom(&self) -> f32 {
        self.zoom
    }

    /// Returns `false` and keeps the current zoom when `zoom` is not a
    /// positive finite number.
    pub fn set_zoom(&mut self, zoom: f32) -> bool {
        if !is_valid_zoom(zoom) {
            warn!(zoom, current = self.zoom, "camera_zoom_rejected");
            return false;
        }
        self.zoom = zoom;
        true
    }

    pub fn apply_zoom_steps(&mut self, steps: i32) {
        self.zoom = self.config().with_zoom_steps(steps).zoom;
    }

    pub fn effects_mut(&mut self) -> &mut EffectPipeline {
        &mut self.effects
    }

    pub fn tick_effects(&mut self) {
        self.effects.tick();
    }

    pub fn viewport(&self) -> Viewport {
        Viewport::new(self.target.width(), self.target.height())
    }

    pub fn world_to_screen(&self, world: Vec2) -> Vec2 {
        world_to_screen(world, self.position, self.zoom, self.viewport())
    }

    pub fn screen_to_world(&self, screen: Vec2) -> Vec2 {
        screen_to_world(screen, self.position, self.zoom, self.viewport())
    }

    /// Tiles of `tiles` that may be visible, padded so that partially visible
    /// edge tiles are always included.
    pub fn visible_tile_window<S: TileSource + ?Sized>(&self, tiles: &S) -> TileWindow {
        let viewport = self.viewport();
        let size = self.zoom * tiles.tile_scale();
        let middle = tiles.world_to_tilemap(self.position);
        let half_w = (viewport.width / (2.0 * size)).ceil();
        let half_h = (viewport.height / (2.0 * size)).ceil();
        TileWindow {
            min_x: (middle.x - half_w).floor() as i32,
            min_y: (middle.y - half_h).floor() as i32,
            max_x: (middle.x + half_w).ceil() as i32,
            max_y: (middle.y + half_h).ceil() as i32,
        }
    }

    /// Walks every tile in the visible window, columns left to right and
    /// within a column bottom to top, and hands each one to `draw_tile`.
    /// Tiles outside the source arrive with `tile: None`.
    pub fn draw_tilemap<S, F>(&mut self, tiles: &S, mut draw_tile: F) -> &mut Self
    where
        S: TileSource + ?Sized,
        F: FnMut(&mut TilePainter<'_, T>, TileDraw<S::Tile>),
    {
        let size = self.zoom * tiles.tile_scale();
        if !(size.is_finite() && size > 0.0) {
            warn!(size, "camera_tile_size_invalid");
            return self;
        }

        let window = self.visible_tile_window(tiles);
        let corner = tiles.tilemap_to_world(Vec2::new(window.min_x as f32, window.min_y as f32));
        let origin = self.world_to_screen(corner);
        trace!(
            min_x = window.min_x,
            min_y = window.min_y,
            columns = window.columns(),
            rows = window.rows(),
            size,
            "tile_window"
        );

        let mut painter = TilePainter {
            target: &mut self.target,
            effects: &self.effects,
        };
        for x in window.min_x..=window.max_x {
            let pos_x = origin.x + (x - window.min_x) as f32 * size;
            for y in window.min_y..=window.max_y {
                let pos_y = origin.y - (y - window.min_y) as f32 * size;
                draw_tile(
                    &mut painter,
                    TileDraw {
                        tile: tiles.tile_at(x, y),
                        tile_x: x,
                        tile_y: y,
                        position: Vec2::new(pos_x - size / 2.0, pos_y - size / 2.0),
                        size: size + 1.0,
                    },
                );
            }
        }
        self
    }

    fn to_target_space(&self, command: DrawCommand) -> Option<DrawCommand> {
        let z = self.zoom;
        let converted = match command {
            DrawCommand::Clear(args) => DrawCommand::Clear(args),
            DrawCommand::Rect(args) => {
                let center = self.world_to_screen(Vec2::new(args.x, args.y));
                let rect = Rect::centered_at(center, args.width * z, args.height * z);
                DrawCommand::Rect(RectArgs {
                    x: rect.x,
                    y: rect.y,
                    width: rect.width,
                    height: rect.height,
                    ..args
                })
            }
            DrawCommand::Graphic(args) => {
                let frame = args.graphic.current_frame()?;
                let width = args.width.unwrap_or(frame.width()) * z;
                let height = args.height.unwrap_or(frame.height()) * z;
                let center = self.world_to_screen(Vec2::new(args.x, args.y));
                let rect = Rect::centered_at(center, width, height);
                DrawCommand::Graphic(GraphicArgs {
                    x: rect.x,
                    y: rect.y,
                    width: Some(width),
                    height: Some(height),
                    ..args
                })
            }
            DrawCommand::Text(args) => {
                let at = self.world_to_screen(Vec2::new(args.x, args.y));
                DrawCommand::Text(TextArgs {
                    x: at.x,
                    y: at.y,
                    ..args
                })
            }
            DrawCommand::Circle(args) => {
                let center = self.world_to_screen(args.center());
                DrawCommand::Circle(CircleArgs {
                    x: center.x,
                    y: center.y,
                    radius: args.radius * z,
                    ..args
                })
            }
            DrawCommand::Line(args) => {
                let from = self.world_to_screen(Vec2::new(args.x1, args.y1));
                let to = self.world_to_screen(Vec2::new(args.x2, args.y2));
                DrawCommand::Line(LineArgs {
                    x1: from.x,
                    y1: from.y,
                    x2: to.x,
                    y2: to.y,
                    ..args
                })
            }
        };
        Some(converted)
    }
}

fn is_valid_zoom(zoom: f32) -> bool {
    zoom.is_finite() && zoom > 0.0
}

impl<T: DrawTarget> DrawTarget for Camera<T> {
    /// Visible extent in world units.
    fn width(&self) -> f32 {
        self.target.width() / self.zoom
    }

    fn height(&self) -> f32 {
        self.target.height() / self.zoom
    }

    fn submit(&mut self, command: DrawCommand) {
        let Some(command) = self.to_target_space(command) else {
            return;
        };
        let command = self.effects.apply(command);
        self.target.submit(command);
    }
}
