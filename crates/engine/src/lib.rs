//! World-space cameras over clipped 2D drawing targets, with tile-window
//! rendering for finite and chunked tilemaps.

pub mod app;
pub mod geometry;
pub mod graphics;
pub mod render;
pub mod tiles;
pub mod view;

pub use app::{
    run_app, AppError, FrameScene, InputAction, InputSnapshot, LoopConfig, LoopMetricsSnapshot,
};
pub use geometry::{Color, Rect, Vec2};
pub use graphics::{
    Animation, AnimationController, Graphic, GraphicError, GridSplit, ImageRegion,
};
pub use render::{
    CircleArgs, ClearArgs, Draw, DrawCommand, DrawTarget, DrawingSequence, Effect,
    EffectPipeline, GraphicArgs, LineArgs, RasterSurface, RecordingSurface, RectArgs, Screen,
    ScreenSection, ScreenShake, Surface, SurfaceCall, TextArgs,
};
pub use tiles::{
    ChunkCoord, ChunkedTilemap, FnTiles, TileSource, Tilemap, TilemapBuilder, TilemapError,
    WrapMode,
};
pub use view::{screen_to_world, world_to_screen, Camera, CameraConfig, TileDraw, Viewport};
