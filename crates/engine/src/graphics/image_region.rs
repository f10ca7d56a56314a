use std::sync::Arc;

use image::{Rgba, RgbaImage};
use tracing::warn;

use crate::geometry::{Color, Rect};

/// A crop rectangle over a shared backing image.
///
/// Regions never copy pixels; every region cut from another one aliases the
/// same backing image.
#[derive(Debug, Clone)]
pub struct ImageRegion {
    image: Arc<RgbaImage>,
    crop: Rect,
}

impl ImageRegion {
    pub fn new(image: RgbaImage) -> Self {
        Self::from_shared(Arc::new(image))
    }

    pub fn from_shared(image: Arc<RgbaImage>) -> Self {
        let crop = Rect::new(0.0, 0.0, image.width() as f32, image.height() as f32);
        Self { image, crop }
    }

    pub fn solid(color: Color, width: u32, height: u32) -> Self {
        Self::new(RgbaImage::from_pixel(width, height, Rgba(color.0)))
    }

    pub fn image(&self) -> &Arc<RgbaImage> {
        &self.image
    }

    pub fn crop(&self) -> Rect {
        self.crop
    }

    pub fn width(&self) -> f32 {
        self.crop.width
    }

    pub fn height(&self) -> f32 {
        self.crop.height
    }

    pub fn shares_image_with(&self, other: &ImageRegion) -> bool {
        Arc::ptr_eq(&self.image, &other.image)
    }

    /// Cuts a region positioned relative to this region's crop origin.
    pub fn area(&self, x: f32, y: f32, width: f32, height: f32) -> ImageRegion {
        self.with_crop(Rect::new(self.crop.x + x, self.crop.y + y, width, height))
    }

    pub fn areas(&self, locations: &[(f32, f32)], width: f32, height: f32) -> Vec<ImageRegion> {
        locations
            .iter()
            .map(|&(x, y)| self.area(x, y, width, height))
            .collect()
    }

    /// Slices the region into equally sized cells, row by row.
    pub fn split_into_grid(&self, split: GridSplit) -> Vec<ImageRegion> {
        let step_x = split.spacing_x + split.tile_width;
        let step_y = split.spacing_y + split.tile_height;
        if !(split.tile_width > 0.0 && split.tile_height > 0.0 && step_x > 0.0 && step_y > 0.0) {
            warn!(
                tile_width = split.tile_width,
                tile_height = split.tile_height,
                "image_region_invalid_grid"
            );
            return Vec::new();
        }

        let columns = split.columns.unwrap_or_else(|| {
            ((self.crop.width - split.offset_x) / step_x).floor().max(0.0) as u32
        });
        let rows = split.rows.unwrap_or_else(|| {
            ((self.crop.height - split.offset_y) / step_y).floor().max(0.0) as u32
        });

        let mut cells = Vec::with_capacity(columns as usize * rows as usize);
        for row in 0..rows {
            for column in 0..columns {
                cells.push(self.area(
                    split.offset_x + column as f32 * step_x,
                    split.offset_y + row as f32 * step_y,
                    split.tile_width,
                    split.tile_height,
                ));
            }
        }
        cells
    }

    /// Same backing image, absolute crop.
    pub(crate) fn with_crop(&self, crop: Rect) -> ImageRegion {
        ImageRegion {
            image: Arc::clone(&self.image),
            crop,
        }
    }
}

impl PartialEq for ImageRegion {
    fn eq(&self, other: &Self) -> bool {
        self.shares_image_with(other) && self.crop == other.crop
    }
}

/// Layout of a sprite sheet. When `columns` or `rows` is `None` the count is
/// whatever fits in the remaining space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridSplit {
    pub offset_x: f32,
    pub offset_y: f32,
    pub spacing_x: f32,
    pub spacing_y: f32,
    pub tile_width: f32,
    pub tile_height: f32,
    pub columns: Option<u32>,
    pub rows: Option<u32>,
}

impl GridSplit {
    pub fn tiles(tile_width: f32, tile_height: f32) -> Self {
        Self {
            offset_x: 0.0,
            offset_y: 0.0,
            spacing_x: 0.0,
            spacing_y: 0.0,
            tile_width,
            tile_height,
            columns: None,
            rows: None,
        }
    }

    pub fn with_offset(mut self, offset_x: f32, offset_y: f32) -> Self {
        self.offset_x = offset_x;
        self.offset_y = offset_y;
        self
    }

    pub fn with_spacing(mut self, spacing_x: f32, spacing_y: f32) -> Self {
        self.spacing_x = spacing_x;
        self.spacing_y = spacing_y;
        self
    }

    pub fn with_grid(mut self, columns: u32, rows: u32) -> Self {
        self.columns = Some(columns);
        self.rows = Some(rows);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn areas_are_relative_to_the_parent_crop_and_share_pixels() {
        let sheet = ImageRegion::solid(Color::RED, 50, 50);
        let inner = sheet.area(5.0, 5.0, 40.0, 40.0);
        let nested = inner.area(10.0, 2.0, 4.0, 4.0);

        assert_eq!(inner.crop(), Rect::new(5.0, 5.0, 40.0, 40.0));
        assert_eq!(nested.crop(), Rect::new(15.0, 7.0, 4.0, 4.0));
        assert!(nested.shares_image_with(&sheet));
        assert_eq!(Arc::strong_count(sheet.image()), 3);
    }

    #[test]
    fn grid_split_infers_counts_from_remaining_space() {
        let sheet = ImageRegion::solid(Color::WHITE, 20, 9);
        let cells = sheet.split_into_grid(
            GridSplit::tiles(4.0, 4.0)
                .with_offset(1.0, 0.0)
                .with_spacing(2.0, 1.0),
        );
        // 19 / 6 -> 3 columns, 9 / 5 -> 1 row
        assert_eq!(cells.len(), 3);
        assert_eq!(cells[0].crop(), Rect::new(1.0, 0.0, 4.0, 4.0));
        assert_eq!(cells[2].crop(), Rect::new(13.0, 0.0, 4.0, 4.0));
    }

    #[test]
    fn grid_split_with_explicit_counts_is_row_major() {
        let sheet = ImageRegion::solid(Color::WHITE, 4, 6);
        let cells = sheet.split_into_grid(GridSplit::tiles(2.0, 2.0).with_grid(2, 3));
        let origins: Vec<(f32, f32)> = cells.iter().map(|c| (c.crop().x, c.crop().y)).collect();
        assert_eq!(
            origins,
            vec![
                (0.0, 0.0),
                (2.0, 0.0),
                (0.0, 2.0),
                (2.0, 2.0),
                (0.0, 4.0),
                (2.0, 4.0)
            ]
        );
    }

    #[test]
    fn degenerate_grid_yields_no_cells() {
        let sheet = ImageRegion::solid(Color::WHITE, 4, 4);
        assert!(sheet.split_into_grid(GridSplit::tiles(0.0, 2.0)).is_empty());
    }

    #[test]
    fn regions_over_different_images_are_not_equal() {
        let a = ImageRegion::solid(Color::RED, 2, 2);
        let b = ImageRegion::solid(Color::RED, 2, 2);
        assert_ne!(a, b);
        assert_eq!(a, a.area(0.0, 0.0, 2.0, 2.0));
    }
}
