use std::fmt;

use thiserror::Error;
use tracing::warn;

use super::TileSource;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Axis::X => f.write_str("x"),
            Axis::Y => f.write_str("y"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum TilemapError {
    #[error("tile count mismatch: expected {expected}, got {actual}")]
    TileCountMismatch { expected: usize, actual: usize },
    #[error("max corner ({max_x},{max_y}) lies before min corner ({min_x},{min_y})")]
    InvalidBounds {
        min_x: i32,
        min_y: i32,
        max_x: i32,
        max_y: i32,
    },
    #[error("row {row} has {actual} tiles, expected {expected}")]
    RaggedRows {
        row: usize,
        expected: usize,
        actual: usize,
    },
    #[error("tilemap extent along {axis} is missing; set a size or a max coordinate")]
    MissingExtent { axis: Axis },
    #[error("tilemap extent along {axis} was given both as a size and as a max coordinate")]
    ConflictingExtent { axis: Axis },
    #[error("chunk dimensions must be non-zero, got {width}x{height}")]
    ZeroChunkSize { width: u32, height: u32 },
    #[error("tile scale must be positive and finite, got {0}")]
    InvalidTileScale(f32),
}

/// What a lookup outside the bounding rectangle resolves to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum WrapMode {
    /// Outside coordinates have no tile.
    #[default]
    None,
    /// Coordinates wrap around the bounds on both axes.
    Wrap,
}

/// Bounded, array-backed grid of tiles.
///
/// Tile `(x, y)` lives at index `(x - origin_x) + (y - origin_y) * width`.
/// The grid is never resized after construction.
#[derive(Debug, Clone, PartialEq)]
pub struct Tilemap<T> {
    origin_x: i32,
    origin_y: i32,
    width: u32,
    height: u32,
    tiles: Vec<T>,
    tile_scale: f32,
    wrap_mode: WrapMode,
}

impl<T> Tilemap<T> {
    pub fn from_tiles(
        origin_x: i32,
        origin_y: i32,
        width: u32,
        height: u32,
        tiles: Vec<T>,
    ) -> Result<Self, TilemapError> {
        let expected = width as usize * height as usize;
        let actual = tiles.len();
        if expected != actual {
            warn!(width, height, expected, actual, "tilemap_tile_count_mismatch");
            return Err(TilemapError::TileCountMismatch { expected, actual });
        }
        Ok(Self {
            origin_x,
            origin_y,
            width,
            height,
            tiles,
            tile_scale: 1.0,
            wrap_mode: WrapMode::None,
        })
    }

    /// Builds every cell by calling `generator` with its absolute coordinate,
    /// row by row.
    pub fn from_fn(
        origin_x: i32,
        origin_y: i32,
        width: u32,
        height: u32,
        mut generator: impl FnMut(i32, i32) -> T,
    ) -> Self {
        let mut tiles = Vec::with_capacity(width as usize * height as usize);
        for dy in 0..height as i32 {
            for dx in 0..width as i32 {
                tiles.push(generator(origin_x + dx, origin_y + dy));
            }
        }
        Self {
            origin_x,
            origin_y,
            width,
            height,
            tiles,
            tile_scale: 1.0,
            wrap_mode: WrapMode::None,
        }
    }

    /// Parses a character grid. Row `i` of `rows` becomes tile row
    /// `origin_y + i`.
    pub fn from_rows(
        rows: &[&str],
        origin_x: i32,
        origin_y: i32,
        mut map_char: impl FnMut(char) -> T,
    ) -> Result<Self, TilemapError> {
        let expected = rows.first().map_or(0, |row| row.chars().count());
        let mut tiles = Vec::with_capacity(expected * rows.len());
        for (row_index, row) in rows.iter().enumerate() {
            let actual = row.chars().count();
            if actual != expected {
                warn!(row = row_index, expected, actual, "tilemap_ragged_rows");
                return Err(TilemapError::RaggedRows {
                    row: row_index,
                    expected,
                    actual,
                });
            }
            tiles.extend(row.chars().map(&mut map_char));
        }
        Self::from_tiles(
            origin_x,
            origin_y,
            expected as u32,
            rows.len() as u32,
            tiles,
        )
    }

    pub fn builder() -> TilemapBuilder {
        TilemapBuilder::default()
    }

    pub fn with_tile_scale(mut self, tile_scale: f32) -> Result<Self, TilemapError> {
        self.tile_scale = validate_tile_scale(tile_scale)?;
        Ok(self)
    }

    pub fn with_wrap_mode(mut self, wrap_mode: WrapMode) -> Self {
        self.wrap_mode = wrap_mode;
        self
    }

    pub fn origin(&self) -> (i32, i32) {
        (self.origin_x, self.origin_y)
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn wrap_mode(&self) -> WrapMode {
        self.wrap_mode
    }

    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    pub fn contains(&self, x: i32, y: i32) -> bool {
        let local_x = i64::from(x) - i64::from(self.origin_x);
        let local_y = i64::from(y) - i64::from(self.origin_y);
        (0..i64::from(self.width)).contains(&local_x)
            && (0..i64::from(self.height)).contains(&local_y)
    }

    pub fn index_of(&self, x: i32, y: i32) -> Option<usize> {
        if self.tiles.is_empty() {
            return None;
        }
        let (x, y) = match self.wrap_mode {
            WrapMode::None if !self.contains(x, y) => return None,
            WrapMode::None => (x, y),
            WrapMode::Wrap => (
                wrap_coordinate(x, self.origin_x, self.width),
                wrap_coordinate(y, self.origin_y, self.height),
            ),
        };
        let local_x = (x - self.origin_x) as usize;
        let local_y = (y - self.origin_y) as usize;
        Some(local_x + local_y * self.width as usize)
    }

    pub fn position_of(&self, index: usize) -> Option<(i32, i32)> {
        if index >= self.tiles.len() {
            return None;
        }
        let width = self.width as usize;
        Some((
            self.origin_x + (index % width) as i32,
            self.origin_y + (index / width) as i32,
        ))
    }

    pub fn get_tile(&self, x: i32, y: i32) -> Option<&T> {
        self.index_of(x, y).and_then(|index| self.tiles.get(index))
    }

    pub fn get_tile_mut(&mut self, x: i32, y: i32) -> Option<&mut T> {
        self.index_of(x, y).and_then(|index| self.tiles.get_mut(index))
    }

    /// Overwrites one cell. Returns `false` and leaves the map untouched when
    /// the coordinate has no cell.
    pub fn set_tile(&mut self, x: i32, y: i32, tile: T) -> bool {
        match self.get_tile_mut(x, y) {
            Some(slot) => {
                *slot = tile;
                true
            }
            None => false,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = ((i32, i32), &T)> + '_ {
        let width = self.width.max(1) as usize;
        self.tiles.iter().enumerate().map(move |(index, tile)| {
            (
                (
                    self.origin_x + (index % width) as i32,
                    self.origin_y + (index / width) as i32,
                ),
                tile,
            )
        })
    }

    /// Produces a same-shaped map where each cell is computed from the old
    /// cell and a relative view of its surroundings.
    pub fn map_with_neighbors<U>(
        &self,
        mut f: impl FnMut(&T, Neighborhood<'_, T>) -> U,
    ) -> Tilemap<U> {
        let tiles = self
            .iter()
            .map(|((x, y), tile)| f(tile, Neighborhood { map: self, x, y }))
            .collect();
        Tilemap {
            origin_x: self.origin_x,
            origin_y: self.origin_y,
            width: self.width,
            height: self.height,
            tiles,
            tile_scale: self.tile_scale,
            wrap_mode: self.wrap_mode,
        }
    }
}

impl<T: Clone> Tilemap<T> {
    /// Fills the inclusive rectangle `[min_x, max_x] x [min_y, max_y]`.
    pub fn filled(
        tile: T,
        min_x: i32,
        min_y: i32,
        max_x: i32,
        max_y: i32,
    ) -> Result<Self, TilemapError> {
        if max_x < min_x || max_y < min_y {
            warn!(min_x, min_y, max_x, max_y, "tilemap_inverted_bounds");
            return Err(TilemapError::InvalidBounds {
                min_x,
                min_y,
                max_x,
                max_y,
            });
        }
        let (Some(width), Some(height)) =
            (inclusive_extent(min_x, max_x), inclusive_extent(min_y, max_y))
        else {
            warn!(min_x, min_y, max_x, max_y, "tilemap_extent_too_large");
            return Err(TilemapError::InvalidBounds {
                min_x,
                min_y,
                max_x,
                max_y,
            });
        };
        Self::from_tiles(
            min_x,
            min_y,
            width,
            height,
            vec![tile; width as usize * height as usize],
        )
    }
}

impl<T: Clone> TileSource for Tilemap<T> {
    type Tile = T;

    fn tile_at(&self, x: i32, y: i32) -> Option<T> {
        self.get_tile(x, y).cloned()
    }

    fn tile_scale(&self) -> f32 {
        self.tile_scale
    }
}

/// Relative lookups around one cell of a [`Tilemap`].
#[derive(Debug)]
pub struct Neighborhood<'a, T> {
    map: &'a Tilemap<T>,
    x: i32,
    y: i32,
}

impl<'a, T> Neighborhood<'a, T> {
    pub fn position(&self) -> (i32, i32) {
        (self.x, self.y)
    }

    pub fn get(&self, dx: i32, dy: i32) -> Option<&'a T> {
        self.map.get_tile(self.x + dx, self.y + dy)
    }
}

/// Option-style construction where each axis is given either as a size or as
/// an inclusive max coordinate, never both.
#[derive(Debug, Clone, Default)]
pub struct TilemapBuilder {
    min_x: i32,
    min_y: i32,
    width: Option<u32>,
    max_x: Option<i32>,
    height: Option<u32>,
    max_y: Option<i32>,
    tile_scale: Option<f32>,
    wrap_mode: WrapMode,
}

impl TilemapBuilder {
    pub fn min(mut self, min_x: i32, min_y: i32) -> Self {
        self.min_x = min_x;
        self.min_y = min_y;
        self
    }

    pub fn width(mut self, width: u32) -> Self {
        self.width = Some(width);
        self
    }

    pub fn max_x(mut self, max_x: i32) -> Self {
        self.max_x = Some(max_x);
        self
    }

    pub fn height(mut self, height: u32) -> Self {
        self.height = Some(height);
        self
    }

    pub fn max_y(mut self, max_y: i32) -> Self {
        self.max_y = Some(max_y);
        self
    }

    pub fn tile_scale(mut self, tile_scale: f32) -> Self {
        self.tile_scale = Some(tile_scale);
        self
    }

    pub fn wrap_mode(mut self, wrap_mode: WrapMode) -> Self {
        self.wrap_mode = wrap_mode;
        self
    }

    pub fn build_with<T>(
        self,
        generator: impl FnMut(i32, i32) -> T,
    ) -> Result<Tilemap<T>, TilemapError> {
        let (width, height) = self.resolve_extent()?;
        let tile_scale = match self.tile_scale {
            Some(scale) => validate_tile_scale(scale)?,
            None => 1.0,
        };
        let mut map = Tilemap::from_fn(self.min_x, self.min_y, width, height, generator);
        map.tile_scale = tile_scale;
        map.wrap_mode = self.wrap_mode;
        Ok(map)
    }

    pub fn build_filled<T: Clone>(self, tile: T) -> Result<Tilemap<T>, TilemapError> {
        self.build_with(|_, _| tile.clone())
    }

    fn resolve_extent(&self) -> Result<(u32, u32), TilemapError> {
        let width = resolve_axis(Axis::X, self.min_x, self.width, self.max_x)?;
        let height = resolve_axis(Axis::Y, self.min_y, self.height, self.max_y)?;
        match (width, height) {
            (Some(width), Some(height)) => Ok((width, height)),
            _ => {
                let max_x = self.max_x.unwrap_or(self.min_x);
                let max_y = self.max_y.unwrap_or(self.min_y);
                warn!(
                    min_x = self.min_x,
                    min_y = self.min_y,
                    max_x,
                    max_y,
                    "tilemap_inverted_extent"
                );
                Err(TilemapError::InvalidBounds {
                    min_x: self.min_x,
                    min_y: self.min_y,
                    max_x,
                    max_y,
                })
            }
        }
    }
}

/// Cell count along one axis, `None` when a max coordinate lies before `min`.
fn resolve_axis(
    axis: Axis,
    min: i32,
    size: Option<u32>,
    max: Option<i32>,
) -> Result<Option<u32>, TilemapError> {
    match (size, max) {
        (Some(size), None) => Ok(Some(size)),
        (None, Some(max)) => Ok(inclusive_extent(min, max)),
        (Some(_), Some(_)) => {
            warn!(%axis, "tilemap_conflicting_extent");
            Err(TilemapError::ConflictingExtent { axis })
        }
        (None, None) => {
            warn!(%axis, "tilemap_missing_extent");
            Err(TilemapError::MissingExtent { axis })
        }
    }
}

/// Cell count of `[min, max]`, or `None` when `max < min`.
fn inclusive_extent(min: i32, max: i32) -> Option<u32> {
    let span = i64::from(max) - i64::from(min) + 1;
    u32::try_from(span).ok().filter(|span| *span > 0)
}

fn wrap_coordinate(value: i32, origin: i32, extent: u32) -> i32 {
    let local = (i64::from(value) - i64::from(origin)).rem_euclid(i64::from(extent));
    origin + local as i32
}

pub(crate) fn validate_tile_scale(tile_scale: f32) -> Result<f32, TilemapError> {
    if tile_scale.is_finite() && tile_scale > 0.0 {
        Ok(tile_scale)
    } else {
        warn!(tile_scale, "tile_scale_rejected");
        Err(TilemapError::InvalidTileScale(tile_scale))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bordered_room() -> Tilemap<u8> {
        Tilemap::from_rows(&["###", "#.#", "###"], -1, -1, |c| match c {
            '#' => 1,
            _ => 0,
        })
        .expect("tilemap")
    }

    #[test]
    fn parsed_rows_resolve_against_origin() {
        let map = bordered_room();
        assert_eq!(map.get_tile(0, 0), Some(&0));
        assert_eq!(map.get_tile(-1, -1), Some(&1));
        assert_eq!(map.get_tile(1, 1), Some(&1));
        assert_eq!(map.get_tile(5, 5), None);
        assert_eq!(map.get_tile(-2, 0), None);
    }

    #[test]
    fn index_and_position_are_inverse_inside_bounds() {
        let map = Tilemap::filled(0u8, -3, 2, 4, 6).expect("tilemap");
        assert_eq!(map.width(), 8);
        assert_eq!(map.height(), 5);
        for y in 2..=6 {
            for x in -3..=4 {
                let index = map.index_of(x, y).expect("inside");
                assert_eq!(index as i32, (x + 3) + (y - 2) * 8);
                assert_eq!(map.position_of(index), Some((x, y)));
            }
        }
        assert_eq!(map.position_of(map.len()), None);
    }

    #[test]
    fn out_of_range_lookups_are_none() {
        let map = Tilemap::filled('a', 0, 0, 1, 1).expect("tilemap");
        for (x, y) in [(-1, 0), (0, -1), (2, 0), (0, 2), (i32::MIN, i32::MAX)] {
            assert_eq!(map.index_of(x, y), None, "({x},{y})");
            assert_eq!(map.get_tile(x, y), None, "({x},{y})");
        }
    }

    #[test]
    fn set_tile_ignores_outside_and_writes_inside() {
        let mut map = bordered_room();
        assert!(!map.set_tile(9, 9, 7));
        assert!(map.set_tile(0, 0, 7));
        assert_eq!(map.get_tile(0, 0), Some(&7));
        assert_eq!(map.len(), 9);
    }

    #[test]
    fn from_fn_receives_absolute_coordinates() {
        let map = Tilemap::from_fn(10, -2, 3, 2, |x, y| (x, y));
        assert_eq!(map.get_tile(10, -2), Some(&(10, -2)));
        assert_eq!(map.get_tile(12, -1), Some(&(12, -1)));
        assert_eq!(map.get_tile(13, -1), None);
    }

    #[test]
    fn from_tiles_rejects_count_mismatch() {
        let result = Tilemap::from_tiles(0, 0, 2, 2, vec![0u8; 3]);
        assert_eq!(
            result,
            Err(TilemapError::TileCountMismatch {
                expected: 4,
                actual: 3
            })
        );
    }

    #[test]
    fn ragged_rows_are_rejected() {
        let result = Tilemap::from_rows(&["##", "#"], 0, 0, |c| c);
        assert_eq!(
            result,
            Err(TilemapError::RaggedRows {
                row: 1,
                expected: 2,
                actual: 1
            })
        );
    }

    #[test]
    fn filled_rejects_inverted_bounds() {
        assert!(matches!(
            Tilemap::filled(0u8, 3, 0, 2, 0),
            Err(TilemapError::InvalidBounds { .. })
        ));
    }

    #[test]
    fn wrap_mode_wraps_on_both_axes() {
        let map = Tilemap::from_fn(-1, -1, 3, 2, |x, y| (x, y)).with_wrap_mode(WrapMode::Wrap);
        assert_eq!(map.get_tile(2, -1), Some(&(-1, -1)));
        assert_eq!(map.get_tile(-2, 1), Some(&(1, -1)));
        assert_eq!(map.get_tile(-4, -3), Some(&(-1, -1)));
    }

    #[test]
    fn neighborhood_mapping_sees_surrounding_cells() {
        let map = bordered_room();
        let walls_around = map.map_with_neighbors(|_, around| {
            [(-1, 0), (1, 0), (0, -1), (0, 1)]
                .into_iter()
                .filter(|&(dx, dy)| around.get(dx, dy) == Some(&1))
                .count()
        });
        assert_eq!(walls_around.get_tile(0, 0), Some(&4));
        assert_eq!(walls_around.get_tile(-1, -1), Some(&2));
        assert_eq!(walls_around.get_tile(0, -1), Some(&2));
        assert_eq!(walls_around.origin(), (-1, -1));
    }

    #[test]
    fn builder_accepts_size_or_max_per_axis() {
        let map = Tilemap::<u8>::builder()
            .min(-2, 0)
            .width(4)
            .max_y(2)
            .build_filled(5u8)
            .expect("tilemap");
        assert_eq!((map.width(), map.height()), (4, 3));
        assert_eq!(map.get_tile(1, 2), Some(&5));
        assert_eq!(map.get_tile(2, 2), None);
    }

    #[test]
    fn builder_rejects_conflicting_and_missing_extents() {
        let conflicting = Tilemap::<u8>::builder()
            .width(3)
            .max_x(2)
            .height(1)
            .build_filled(0u8);
        assert_eq!(
            conflicting,
            Err(TilemapError::ConflictingExtent { axis: Axis::X })
        );

        let missing = Tilemap::<u8>::builder().width(3).build_filled(0u8);
        assert_eq!(missing, Err(TilemapError::MissingExtent { axis: Axis::Y }));
    }

    #[test]
    fn builder_rejects_max_before_min() {
        let result = Tilemap::<u8>::builder()
            .min(5, 0)
            .max_x(2)
            .height(1)
            .build_filled(0u8);
        assert_eq!(
            result,
            Err(TilemapError::InvalidBounds {
                min_x: 5,
                min_y: 0,
                max_x: 2,
                max_y: 0
            })
        );
    }

    #[test]
    fn builder_accepts_a_single_cell_max_extent() {
        let map = Tilemap::<u8>::builder()
            .min(5, 0)
            .max_x(5)
            .height(1)
            .build_filled(3u8)
            .expect("tilemap");
        assert_eq!((map.width(), map.height()), (1, 1));
    }

    #[test]
    fn filled_rejects_extents_wider_than_the_index_range() {
        assert!(matches!(
            Tilemap::filled(0u8, i32::MIN, 0, i32::MAX, 0),
            Err(TilemapError::InvalidBounds { .. })
        ));
    }

    #[test]
    fn with_tile_scale_rejects_nan_and_negative_scales() {
        assert!(matches!(
            bordered_room().with_tile_scale(f32::NAN),
            Err(TilemapError::InvalidTileScale(_))
        ));
        assert_eq!(
            bordered_room().with_tile_scale(-1.0),
            Err(TilemapError::InvalidTileScale(-1.0))
        );
    }

    #[test]
    fn builder_rejects_non_positive_tile_scale() {
        let result = Tilemap::<u8>::builder()
            .width(1)
            .height(1)
            .tile_scale(0.0)
            .build_filled(0u8);
        assert_eq!(result, Err(TilemapError::InvalidTileScale(0.0)));
    }

    #[test]
    fn tile_source_clones_out_of_the_grid() {
        let map = bordered_room().with_tile_scale(2.0).expect("scale");
        assert_eq!(map.tile_at(0, 0), Some(0));
        assert_eq!(map.tile_at(4, 0), None);
        assert_eq!(map.tile_scale(), 2.0);
    }
}
