use std::cell::RefCell;
use std::f32::consts::TAU;
use std::rc::Rc;

use pixelcam::graphics::SharedAnimation;
use pixelcam::view::{TileDraw, TilePainter};
use pixelcam::{
    screen_to_world, Animation, Camera, CameraConfig, ChunkedTilemap, CircleArgs, ClearArgs,
    Color, Draw, DrawTarget, DrawingSequence, Effect, FnTiles, FrameScene, GraphicArgs,
    GraphicError, GridSplit, ImageRegion, InputSnapshot, LineArgs, LoopMetricsSnapshot,
    RasterSurface, RectArgs, Screen, ScreenShake, TextArgs, TileSource, Tilemap, TilemapError,
    Vec2, Viewport,
};
use thiserror::Error;
use tracing::{debug, info, warn};

use super::config::{DemoConfig, MinimapConfig};

const BACKDROP: Color = Color::rgb(24, 26, 33);
const MINIMAP_BACKDROP: Color = Color::rgb(10, 10, 14);
const VIEW_OUTLINE: Color = Color::rgb(255, 210, 70);
const SPRITE_COLOR: Color = Color::rgb(80, 220, 255);
const SPRITE_FRAME_PX: u32 = 16;
const SPRITE_FRAMES: u32 = 4;
const SPRITE_FPS: f32 = 6.0;
const SPRITE_ORBIT_RADIUS: f32 = 3.0;
const SPRITE_ORBIT_SECONDS: f32 = 8.0;

/// Floor plan drawn over the open world. The first row is the bottom edge.
const ROOM_ROWS: [&str; 5] = [
    "####.####",
    "#.......#",
    "#.......#",
    "#.......#",
    "#########",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Terrain {
    Grass,
    Dirt,
    Water,
    Wall,
    Floor,
    Painted,
}

impl Terrain {
    fn color(self) -> Color {
        match self {
            Terrain::Grass => Color::rgb(74, 112, 56),
            Terrain::Dirt => Color::rgb(112, 83, 58),
            Terrain::Water => Color::rgb(40, 70, 140),
            Terrain::Wall => Color::rgb(150, 150, 160),
            Terrain::Floor => Color::rgb(200, 190, 170),
            Terrain::Painted => Color::rgb(220, 60, 60),
        }
    }
}

fn generate_terrain(x: i32, y: i32) -> Option<Terrain> {
    let hash = x.wrapping_mul(73_856_093) ^ y.wrapping_mul(19_349_663);
    Some(match hash.rem_euclid(16) {
        0 => Terrain::Water,
        1..=4 => Terrain::Dirt,
        _ => Terrain::Grass,
    })
}

type TerrainFallback = FnTiles<fn(i32, i32) -> Option<Terrain>>;

#[derive(Debug, Error)]
pub(crate) enum SceneSetupError {
    #[error(transparent)]
    Tilemap(#[from] TilemapError),
    #[error(transparent)]
    Graphic(#[from] GraphicError),
    #[error("{field} must be positive and finite, got {zoom}")]
    InvalidZoom { field: &'static str, zoom: f32 },
}

pub(crate) struct DemoScene {
    camera: CameraConfig,
    pan_speed: f32,
    shake: Rc<RefCell<ScreenShake>>,
    shake_strength: f32,
    room: Tilemap<Terrain>,
    world: ChunkedTilemap<Terrain, TerrainFallback>,
    sprite: SharedAnimation,
    sprite_position: Vec2,
    elapsed_seconds: f32,
    markers: DrawingSequence,
    minimap: MinimapConfig,
}

impl DemoScene {
    pub(crate) fn new(config: &DemoConfig) -> Result<Self, SceneSetupError> {
        for (field, zoom) in [
            ("camera.zoom", config.camera.zoom),
            ("minimap.zoom", config.minimap.zoom),
        ] {
            if !(zoom.is_finite() && zoom > 0.0) {
                warn!(field, zoom, "scene_zoom_rejected");
                return Err(SceneSetupError::InvalidZoom { field, zoom });
            }
        }
        let room = Tilemap::from_rows(&ROOM_ROWS, -4, -2, |c| match c {
            '#' => Terrain::Wall,
            _ => Terrain::Floor,
        })?
        .with_tile_scale(config.tile_scale)?;
        let fallback: TerrainFallback =
            FnTiles::new(generate_terrain as fn(i32, i32) -> Option<Terrain>);
        let world = ChunkedTilemap::new(fallback, config.chunk_size, config.chunk_size)?
            .with_tile_scale(config.tile_scale)?;
        let sprite = Animation::from_grid(
            &build_sprite_sheet(),
            GridSplit::tiles(SPRITE_FRAME_PX as f32, SPRITE_FRAME_PX as f32),
            SPRITE_FPS,
        )?;

        let mut scene = Self {
            camera: config.camera,
            pan_speed: config.pan_speed_units_per_second,
            shake: Rc::new(RefCell::new(ScreenShake::new(config.shake_decay))),
            shake_strength: config.shake_strength,
            room,
            world,
            sprite: Rc::new(RefCell::new(sprite)),
            sprite_position: Vec2::ZERO,
            elapsed_seconds: 0.0,
            markers: DrawingSequence::new(0.0, 0.0),
            minimap: config.minimap,
        };
        scene.advance_sprite(0.0);
        scene.record_markers();
        Ok(scene)
    }

    fn paint_tile_at(&mut self, world: Vec2) {
        let tile = self.world.world_to_tilemap(world);
        let (x, y) = (tile.x.round() as i32, tile.y.round() as i32);
        self.world.set_tile(x, y, Terrain::Painted);
        debug!(x, y, chunk_count = self.world.chunk_count(), "tile_painted");
    }

    fn advance_sprite(&mut self, dt_seconds: f32) {
        self.elapsed_seconds += dt_seconds;
        self.sprite.borrow_mut().animate(dt_seconds * 1000.0);
        let angle = self.elapsed_seconds / SPRITE_ORBIT_SECONDS * TAU;
        self.sprite_position = Vec2::new(
            angle.cos() * SPRITE_ORBIT_RADIUS,
            angle.sin() * SPRITE_ORBIT_RADIUS,
        );
    }

    /// World-space overlay shared by the main view and the minimap.
    fn record_markers(&mut self) {
        let sprite = self.sprite_position;
        let focus = self.camera.position;
        let mut markers = DrawingSequence::new(0.0, 0.0);
        markers
            .draw_line(LineArgs::new(0.0, 0.0, sprite.x, sprite.y).with_color(Color::WHITE))
            .draw_graphic(
                GraphicArgs::new(Rc::clone(&self.sprite), sprite.x, sprite.y).with_size(1.0, 1.0),
            )
            .draw_circle(CircleArgs::new(focus.x, focus.y, 0.15))
            .draw_text(TextArgs::new("origin", 0.0, 0.0));
        self.markers = markers;
    }

    fn draw_minimap(&self, screen: &mut Screen<RasterSurface>) {
        let minimap = self.minimap;
        let view = Vec2::new(
            screen.width() / self.camera.zoom / 2.0,
            screen.height() / self.camera.zoom / 2.0,
        );
        let x = screen.width() - minimap.width - minimap.margin;
        let mut section = screen.section(x, minimap.margin, minimap.width, minimap.height);
        section.clear(ClearArgs::new(MINIMAP_BACKDROP));

        let focus = self.camera.position;
        let (left, right) = (focus.x - view.x, focus.x + view.x);
        let (bottom, top) = (focus.y - view.y, focus.y + view.y);
        let mut camera = Camera::new(&mut section, focus, minimap.zoom);
        camera
            .draw_tilemap(&self.world, paint_terrain)
            .draw_tilemap(&self.room, paint_terrain)
            .draw_sequence(&self.markers)
            .draw_line(LineArgs::new(left, bottom, right, bottom).with_color(VIEW_OUTLINE))
            .draw_line(LineArgs::new(right, bottom, right, top).with_color(VIEW_OUTLINE))
            .draw_line(LineArgs::new(right, top, left, top).with_color(VIEW_OUTLINE))
            .draw_line(LineArgs::new(left, top, left, bottom).with_color(VIEW_OUTLINE));
    }
}

impl FrameScene for DemoScene {
    fn update(&mut self, fixed_dt_seconds: f32, input: &InputSnapshot) {
        let pan = input.pan_direction();
        let step = self.pan_speed * fixed_dt_seconds;
        self.camera.position = self.camera.position.offset(pan.x * step, pan.y * step);

        let zoom_steps = input.zoom_delta_steps();
        if zoom_steps != 0 {
            self.camera = self.camera.with_zoom_steps(zoom_steps);
            info!(zoom = self.camera.zoom, "camera_zoom_changed");
        }

        if input.shake_pressed() {
            self.shake.borrow_mut().kick(self.shake_strength);
            info!(strength = self.shake_strength, "screen_shake");
        }
        self.shake.borrow_mut().tick();

        if input.left_click_pressed() {
            if let Some(cursor) = input.cursor_position_px() {
                let (width, height) = input.window_size();
                let viewport = Viewport::new(width as f32, height as f32);
                let world =
                    screen_to_world(cursor, self.camera.position, self.camera.zoom, viewport);
                self.paint_tile_at(world);
            }
        }

        self.advance_sprite(fixed_dt_seconds);
        self.record_markers();
    }

    fn render(&mut self, screen: &mut Screen<RasterSurface>, metrics: &LoopMetricsSnapshot) {
        screen.clear(ClearArgs::new(BACKDROP));

        {
            let mut camera = Camera::from_config(&mut *screen, self.camera);
            camera.effects_mut().push(Rc::clone(&self.shake));
            camera
                .draw_tilemap(&self.world, paint_terrain)
                .draw_tilemap(&self.room, paint_terrain)
                .draw_sequence(&self.markers);
        }

        self.draw_minimap(screen);

        let hud = format!(
            "FPS {:.0} TPS {:.0} ZOOM {:.2} CHUNKS {}",
            metrics.fps,
            metrics.tps,
            self.camera.zoom,
            self.world.chunk_count()
        );
        screen.draw_text(TextArgs::new(hud, 8.0, 18.0));
    }

    fn shutdown(&mut self) {
        info!(painted_chunks = self.world.chunk_count(), "demo_scene_shutdown");
    }
}

fn paint_terrain<T: DrawTarget>(painter: &mut TilePainter<'_, T>, tile: TileDraw<Terrain>) {
    if let Some(terrain) = tile.tile {
        painter.draw_rect(
            RectArgs::new(tile.position.x, tile.position.y, tile.size, tile.size)
                .with_color(terrain.color()),
        );
    }
}

/// Draws the sprite frames side by side into an offscreen surface.
fn build_sprite_sheet() -> ImageRegion {
    let mut sheet = Screen::new(RasterSurface::new(
        SPRITE_FRAME_PX * SPRITE_FRAMES,
        SPRITE_FRAME_PX,
    ));
    let half = SPRITE_FRAME_PX as f32 / 2.0;
    for frame in 0..SPRITE_FRAMES {
        let center_x = (frame * SPRITE_FRAME_PX) as f32 + half;
        sheet.draw_circle(
            CircleArgs::new(center_x, half, 3.0 + frame as f32).with_color(SPRITE_COLOR),
        );
    }
    sheet.into_surface().into_image_region()
}
