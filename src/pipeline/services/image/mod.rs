pub mod region_splitter;
pub mod sky_filter;

pub use region_splitter::{
    grid_location_name, ImageRegion, RegionSplitter, Tile, Tiling, GRID_COLS, GRID_ROWS,
    OFFSET_REGION,
};
pub use sky_filter::{Hsv, SkyFilter};
