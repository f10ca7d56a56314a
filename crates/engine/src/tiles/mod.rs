mod chunked;
mod source;
mod tilemap;

pub use chunked::{ChunkCoord, ChunkedTilemap};
pub use source::{FnTiles, TileSource};
pub use tilemap::{Axis, Neighborhood, Tilemap, TilemapBuilder, TilemapError, WrapMode};
