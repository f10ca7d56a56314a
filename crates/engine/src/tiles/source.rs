use std::rc::Rc;

use crate::geometry::Vec2;

use super::tilemap::validate_tile_scale;
use super::TilemapError;

/// Anything the camera can walk tile-by-tile.
///
/// Tile coordinates are integer grid points. A tile at `(x, y)` is centered on
/// the world point `(x * tile_scale, y * tile_scale)`. Lookups that fall outside
/// the source return `None`.
pub trait TileSource {
    type Tile;

    fn tile_at(&self, x: i32, y: i32) -> Option<Self::Tile>;

    /// World units per tile.
    fn tile_scale(&self) -> f32 {
        1.0
    }

    fn world_to_tilemap(&self, world: Vec2) -> Vec2 {
        let scale = self.tile_scale();
        Vec2 {
            x: world.x / scale,
            y: world.y / scale,
        }
    }

    fn tilemap_to_world(&self, tile: Vec2) -> Vec2 {
        let scale = self.tile_scale();
        Vec2 {
            x: tile.x * scale,
            y: tile.y * scale,
        }
    }
}

impl<S: TileSource + ?Sized> TileSource for &S {
    type Tile = S::Tile;

    fn tile_at(&self, x: i32, y: i32) -> Option<Self::Tile> {
        (**self).tile_at(x, y)
    }

    fn tile_scale(&self) -> f32 {
        (**self).tile_scale()
    }
}

impl<S: TileSource + ?Sized> TileSource for Rc<S> {
    type Tile = S::Tile;

    fn tile_at(&self, x: i32, y: i32) -> Option<Self::Tile> {
        (**self).tile_at(x, y)
    }

    fn tile_scale(&self) -> f32 {
        (**self).tile_scale()
    }
}

/// Procedural tile source backed by a generator closure.
#[derive(Clone)]
pub struct FnTiles<G> {
    generator: G,
    tile_scale: f32,
}

impl<G> FnTiles<G> {
    pub fn new(generator: G) -> Self {
        Self {
            generator,
            tile_scale: 1.0,
        }
    }

    pub fn with_tile_scale(mut self, tile_scale: f32) -> Result<Self, TilemapError> {
        self.tile_scale = validate_tile_scale(tile_scale)?;
        Ok(self)
    }
}

impl<T, G> TileSource for FnTiles<G>
where
    G: Fn(i32, i32) -> Option<T>,
{
    type Tile = T;

    fn tile_at(&self, x: i32, y: i32) -> Option<T> {
        (self.generator)(x, y)
    }

    fn tile_scale(&self) -> f32 {
        self.tile_scale
    }
}
