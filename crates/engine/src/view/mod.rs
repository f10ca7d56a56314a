mod camera;
mod transform;

pub use camera::{
    Camera, CameraConfig, TileDraw, TilePainter, TileWindow, ZOOM_MAX, ZOOM_MIN, ZOOM_STEP_FACTOR,
};
pub use transform::{screen_to_world, world_to_screen, Viewport};
