use crate::geometry::Vec2;

/// Pixel extent of the target a camera draws into.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    pub fn center(&self) -> Vec2 {
        Vec2::new(self.width * 0.5, self.height * 0.5)
    }
}

/// World up is screen up: world `y` grows upward, screen `y` grows downward.
/// `zoom` is pixels per world unit and must be positive.
pub fn world_to_screen(world: Vec2, camera: Vec2, zoom: f32, viewport: Viewport) -> Vec2 {
    Vec2 {
        x: (world.x - camera.x) * zoom + viewport.width * 0.5,
        y: viewport.height * 0.5 - (world.y - camera.y) * zoom,
    }
}

pub fn screen_to_world(screen: Vec2, camera: Vec2, zoom: f32, viewport: Viewport) -> Vec2 {
    Vec2 {
        x: (screen.x - viewport.width * 0.5) / zoom + camera.x,
        y: (viewport.height * 0.5 - screen.y) / zoom + camera.y,
    }
}
