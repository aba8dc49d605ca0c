use image::{DynamicImage, GenericImageView};

use crate::pipeline::types::DetectionSource;

/// Rows and columns of the sweep grid.
pub const GRID_ROWS: u32 = 3;
pub const GRID_COLS: u32 = 3;

/// Placeholder location of half-cell-offset regions; never shown in reports.
pub const OFFSET_REGION: &str = "Offset-Region";

const ALIGNED_LOCATIONS: [&str; 9] = [
    "Top-Left",
    "Top-Center",
    "Top-Right",
    "Mid-Left",
    "Center",
    "Mid-Right",
    "Bottom-Left",
    "Bottom-Center",
    "Bottom-Right",
];

/// Human readable name of an aligned 3x3 cell, row-major.
pub fn grid_location_name(index: usize) -> &'static str {
    ALIGNED_LOCATIONS
        .get(index)
        .copied()
        .unwrap_or("Unknown Region")
}

/// Rectangular region of an image
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageRegion {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl ImageRegion {
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn crop(&self, image: &DynamicImage) -> DynamicImage {
        image.crop_imm(self.x, self.y, self.width, self.height)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tiling {
    Aligned,
    Offset,
}

/// A region of the sweep together with its position in the concatenated tiling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tile {
    pub index: usize,
    pub tiling: Tiling,
    pub region: ImageRegion,
}

impl Tile {
    pub fn location(&self) -> &'static str {
        match self.tiling {
            Tiling::Aligned => grid_location_name(self.index),
            Tiling::Offset => OFFSET_REGION,
        }
    }

    pub fn source(&self) -> DetectionSource {
        match self.tiling {
            Tiling::Aligned => DetectionSource::GridAligned,
            Tiling::Offset => DetectionSource::GridOffset,
        }
    }
}

pub struct RegionSplitter;

impl RegionSplitter {
    /// Partition `width x height` into `rows x cols` cells in row-major order.
    ///
    /// With `offset` the grid origin moves by half a cell on both axes and
    /// cells that would cross the right or bottom edge are dropped.
    pub fn split_dimensions(
        width: u32,
        height: u32,
        rows: u32,
        cols: u32,
        offset: bool,
    ) -> Vec<ImageRegion> {
        if rows == 0 || cols == 0 {
            return Vec::new();
        }

        let cell_w = width / cols;
        let cell_h = height / rows;
        if cell_w == 0 || cell_h == 0 {
            return Vec::new();
        }

        let (start_x, start_y) = if offset {
            (cell_w / 2, cell_h / 2)
        } else {
            (0, 0)
        };

        let mut regions = Vec::with_capacity((rows * cols) as usize);
        for r in 0..rows {
            for c in 0..cols {
                let x = start_x + c * cell_w;
                let y = start_y + r * cell_h;

                if x + cell_w <= width && y + cell_h <= height {
                    regions.push(ImageRegion::new(x, y, cell_w, cell_h));
                }
            }
        }
        regions
    }

    pub fn split(image: &DynamicImage, rows: u32, cols: u32, offset: bool) -> Vec<ImageRegion> {
        let (width, height) = image.dimensions();
        Self::split_dimensions(width, height, rows, cols, offset)
    }

    pub fn split_image(
        image: &DynamicImage,
        rows: u32,
        cols: u32,
        offset: bool,
    ) -> Vec<DynamicImage> {
        Self::split(image, rows, cols, offset)
            .iter()
            .map(|region| region.crop(image))
            .collect()
    }

    /// Aligned 3x3 tiles followed by the offset tiles that fit.
    pub fn sweep_tiles(width: u32, height: u32) -> Vec<Tile> {
        let aligned = Self::split_dimensions(width, height, GRID_ROWS, GRID_COLS, false)
            .into_iter()
            .map(|region| (Tiling::Aligned, region));
        let offset = Self::split_dimensions(width, height, GRID_ROWS, GRID_COLS, true)
            .into_iter()
            .map(|region| (Tiling::Offset, region));

        aligned
            .chain(offset)
            .enumerate()
            .map(|(index, (tiling, region))| Tile {
                index,
                tiling,
                region,
            })
            .collect()
    }
}
