use std::collections::HashMap;

use tracing::{debug, warn};

use super::tilemap::validate_tile_scale;
use super::{TileSource, TilemapError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChunkCoord {
    pub x: i32,
    pub y: i32,
}

#[derive(Debug, Clone)]
struct Chunk<T> {
    cells: Vec<Option<T>>,
}

/// Unbounded tilemap that stores edits in lazily allocated fixed-size chunks.
///
/// Cells that were never written resolve through `fallback`. The first write
/// into a chunk copies the whole chunk out of the fallback, after which the
/// chunk is owned here and never released.
#[derive(Debug, Clone)]
pub struct ChunkedTilemap<T, F> {
    fallback: F,
    chunk_width: u32,
    chunk_height: u32,
    chunks: HashMap<ChunkCoord, Chunk<T>>,
    tile_scale: f32,
}

impl<T, F> ChunkedTilemap<T, F>
where
    F: TileSource<Tile = T>,
{
    pub fn new(fallback: F, chunk_width: u32, chunk_height: u32) -> Result<Self, TilemapError> {
        if chunk_width == 0 || chunk_height == 0 {
            warn!(chunk_width, chunk_height, "chunked_tilemap_zero_chunk_size");
            return Err(TilemapError::ZeroChunkSize {
                width: chunk_width,
                height: chunk_height,
            });
        }
        let tile_scale = fallback.tile_scale();
        Ok(Self {
            fallback,
            chunk_width,
            chunk_height,
            chunks: HashMap::new(),
            tile_scale,
        })
    }

    pub fn with_tile_scale(mut self, tile_scale: f32) -> Result<Self, TilemapError> {
        self.tile_scale = validate_tile_scale(tile_scale)?;
        Ok(self)
    }

    pub fn fallback(&self) -> &F {
        &self.fallback
    }

    pub fn chunk_size(&self) -> (u32, u32) {
        (self.chunk_width, self.chunk_height)
    }

    pub fn chunk_count(&self) -> usize {
        self.chunks.len()
    }

    pub fn is_materialized(&self, coord: ChunkCoord) -> bool {
        self.chunks.contains_key(&coord)
    }

    pub fn chunk_of(&self, x: i32, y: i32) -> ChunkCoord {
        ChunkCoord {
            x: x.div_euclid(self.chunk_width as i32),
            y: y.div_euclid(self.chunk_height as i32),
        }
    }

    fn local_index(&self, x: i32, y: i32) -> usize {
        let local_x = x.rem_euclid(self.chunk_width as i32) as usize;
        let local_y = y.rem_euclid(self.chunk_height as i32) as usize;
        local_x + local_y * self.chunk_width as usize
    }

    /// Reads never allocate: an absent chunk answers straight from the
    /// fallback.
    pub fn get_tile(&self, x: i32, y: i32) -> Option<T>
    where
        T: Clone,
    {
        match self.chunks.get(&self.chunk_of(x, y)) {
            Some(chunk) => chunk.cells[self.local_index(x, y)].clone(),
            None => self.fallback.tile_at(x, y),
        }
    }

    pub fn set_tile(&mut self, x: i32, y: i32, tile: T) {
        let coord = self.chunk_of(x, y);
        let index = self.local_index(x, y);
        self.materialize(coord).cells[index] = Some(tile);
    }

    /// Drops the stored value of one cell so it reads as "no tile". The chunk
    /// stays materialized.
    pub fn clear_tile(&mut self, x: i32, y: i32) {
        let coord = self.chunk_of(x, y);
        let index = self.local_index(x, y);
        self.materialize(coord).cells[index] = None;
    }

    pub fn materialized_chunks(&self) -> impl Iterator<Item = ChunkCoord> + '_ {
        self.chunks.keys().copied()
    }

    fn materialize(&mut self, coord: ChunkCoord) -> &mut Chunk<T> {
        let (chunk_width, chunk_height) = (self.chunk_width, self.chunk_height);
        let fallback = &self.fallback;
        let chunk_count = self.chunks.len() + 1;
        let mut created = false;
        let chunk = self.chunks.entry(coord).or_insert_with(|| {
            created = true;
            // Edge chunks can reach past the i32 range; those cells stay empty.
            let base_x = i64::from(coord.x) * i64::from(chunk_width);
            let base_y = i64::from(coord.y) * i64::from(chunk_height);
            let mut cells = Vec::with_capacity(chunk_width as usize * chunk_height as usize);
            for dy in 0..i64::from(chunk_height) {
                for dx in 0..i64::from(chunk_width) {
                    let x = i32::try_from(base_x + dx);
                    let y = i32::try_from(base_y + dy);
                    cells.push(match (x, y) {
                        (Ok(x), Ok(y)) => fallback.tile_at(x, y),
                        _ => None,
                    });
                }
            }
            Chunk { cells }
        });
        if created {
            debug!(
                chunk_x = coord.x,
                chunk_y = coord.y,
                chunk_count,
                "chunk_materialized"
            );
        }
        chunk
    }
}

impl<T, F> TileSource for ChunkedTilemap<T, F>
where
    T: Clone,
    F: TileSource<Tile = T>,
{
    type Tile = T;

    fn tile_at(&self, x: i32, y: i32) -> Option<T> {
        self.get_tile(x, y)
    }

    fn tile_scale(&self) -> f32 {
        self.tile_scale
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use super::*;
    use crate::tiles::{FnTiles, Tilemap};

    fn checkerboard() -> FnTiles<impl Fn(i32, i32) -> Option<u8>> {
        FnTiles::new(|x: i32, y: i32| Some((x.wrapping_add(y).rem_euclid(2)) as u8))
    }

    #[test]
    fn writes_into_one_chunk_materialize_it_once() {
        let mut map = ChunkedTilemap::new(checkerboard(), 4, 4).expect("chunked");
        assert_eq!(map.chunk_count(), 0);

        map.set_tile(1, 1, 9);
        map.set_tile(2, 3, 8);
        assert_eq!(map.chunk_count(), 1);
        assert!(map.is_materialized(ChunkCoord { x: 0, y: 0 }));

        map.set_tile(4, 0, 7);
        assert_eq!(map.chunk_count(), 2);
    }

    #[test]
    fn untouched_cells_read_like_the_fallback() {
        let fallback = checkerboard();
        let mut map = ChunkedTilemap::new(&fallback, 3, 5).expect("chunked");
        map.set_tile(0, 0, 42);

        for y in -7..7 {
            for x in -7..7 {
                if (x, y) == (0, 0) {
                    continue;
                }
                assert_eq!(map.get_tile(x, y), fallback.tile_at(x, y), "({x},{y})");
            }
        }
        assert_eq!(map.get_tile(0, 0), Some(42));
    }

    #[test]
    fn reads_do_not_materialize_chunks() {
        let map = ChunkedTilemap::new(checkerboard(), 8, 8).expect("chunked");
        for x in -20..20 {
            let _ = map.get_tile(x, x * 3);
        }
        assert_eq!(map.chunk_count(), 0);
    }

    #[test]
    fn negative_coordinates_floor_into_chunks() {
        let map = ChunkedTilemap::new(checkerboard(), 4, 2).expect("chunked");
        assert_eq!(map.chunk_of(-1, -1), ChunkCoord { x: -1, y: -1 });
        assert_eq!(map.chunk_of(-4, -2), ChunkCoord { x: -1, y: -1 });
        assert_eq!(map.chunk_of(-5, -3), ChunkCoord { x: -2, y: -2 });
        assert_eq!(map.chunk_of(3, 1), ChunkCoord { x: 0, y: 0 });
    }

    #[test]
    fn materialization_samples_fallback_once_per_cell() {
        let calls = Cell::new(0u32);
        let counting = FnTiles::new(|x: i32, _: i32| {
            calls.set(calls.get() + 1);
            Some(x)
        });
        let mut map = ChunkedTilemap::new(counting, 2, 3).expect("chunked");
        map.set_tile(-1, -1, 100);
        assert_eq!(calls.get(), 6);
        map.set_tile(-2, -3, 200);
        assert_eq!(calls.get(), 6);

        assert_eq!(map.get_tile(-2, -2), Some(-2));
        assert_eq!(map.get_tile(-1, -1), Some(100));
        assert_eq!(map.get_tile(-2, -3), Some(200));
    }

    #[test]
    fn bounded_fallback_leaves_outside_cells_empty() {
        let room = Tilemap::filled(1u8, 0, 0, 1, 1).expect("tilemap");
        let mut map = ChunkedTilemap::new(&room, 4, 4).expect("chunked");
        assert_eq!(map.get_tile(3, 3), None);

        map.set_tile(3, 3, 5);
        assert_eq!(map.get_tile(3, 3), Some(5));
        assert_eq!(map.get_tile(1, 1), Some(1));
        assert_eq!(map.get_tile(2, 2), None);
    }

    #[test]
    fn cleared_cells_read_as_empty_and_keep_their_chunk() {
        let mut map = ChunkedTilemap::new(checkerboard(), 2, 2).expect("chunked");
        map.clear_tile(0, 0);
        assert_eq!(map.get_tile(0, 0), None);
        assert_eq!(map.get_tile(1, 0), Some(1));
        assert_eq!(map.chunk_count(), 1);
    }

    #[test]
    fn zero_sized_chunks_are_rejected() {
        let result = ChunkedTilemap::new(checkerboard(), 0, 4);
        assert!(matches!(
            result,
            Err(TilemapError::ZeroChunkSize {
                width: 0,
                height: 4
            })
        ));
    }

    #[test]
    fn tile_scale_is_inherited_from_fallback() {
        let fallback = checkerboard().with_tile_scale(16.0).expect("scale");
        let map = ChunkedTilemap::new(fallback, 4, 4).expect("chunked");
        assert_eq!(map.tile_scale(), 16.0);
        let map = map.with_tile_scale(2.0).expect("scale");
        assert_eq!(map.tile_scale(), 2.0);
    }

    #[test]
    fn chunks_at_the_coordinate_extremes_materialize_without_overflow() {
        let mut map = ChunkedTilemap::new(checkerboard(), 3, 3).expect("chunked");

        map.set_tile(i32::MIN, 0, 7);
        map.set_tile(i32::MAX, 0, 9);

        assert_eq!(map.get_tile(i32::MIN, 0), Some(7));
        assert_eq!(map.get_tile(i32::MAX, 0), Some(9));
        assert_eq!(map.chunk_count(), 2);
        assert_eq!(
            map.get_tile(i32::MIN + 1, 1),
            checkerboard().tile_at(i32::MIN + 1, 1)
        );
        assert_eq!(
            map.get_tile(i32::MAX - 1, 2),
            checkerboard().tile_at(i32::MAX - 1, 2)
        );
    }

    #[test]
    fn cells_past_the_coordinate_range_stay_empty() {
        let mut map = ChunkedTilemap::new(checkerboard(), 3, 3).expect("chunked");
        map.set_tile(i32::MAX, i32::MAX, 4);

        let coord = map.chunk_of(i32::MAX, i32::MAX);
        let chunk = &map.chunks[&coord];
        let filled = chunk.cells.iter().filter(|cell| cell.is_some()).count();
        let in_range_x = (i64::from(i32::MAX) - i64::from(coord.x) * 3 + 1) as usize;
        let in_range_y = (i64::from(i32::MAX) - i64::from(coord.y) * 3 + 1) as usize;
        assert_eq!(filled, in_range_x * in_range_y);
        assert_eq!(map.get_tile(i32::MAX, i32::MAX), Some(4));
    }
}
