//! Default generation parameters
//!
//! A 100x100 map with ten rooms and one-unit corridors.

/// Default map dimensions
pub const DEFAULT_MAP_WIDTH: u32 = 100;
pub const DEFAULT_MAP_HEIGHT: u32 = 100;

/// Default number of rooms to place
pub const DEFAULT_ROOM_COUNT: usize = 10;

/// Default room size options as (width, height)
pub const DEFAULT_ROOM_SIZES: [(u32, u32); 2] = [(10, 10), (5, 5)];

/// Default corridor thickness
pub const DEFAULT_CORRIDOR_THICKNESS: f64 = 1.0;

/// Default spatial index bucket size
pub const DEFAULT_INDEX_CELL_SIZE: f64 = 8.0;

/// Total room placement tries per pipeline attempt
pub const DEFAULT_PLACEMENT_ATTEMPTS: u32 = 1000;

/// Door/geometry choices tried per edge
pub const DEFAULT_EDGE_ATTEMPTS: u32 = 16;

/// Full pipeline restarts
pub const DEFAULT_PIPELINE_ATTEMPTS: u32 = 100;

/// Width of the blocked ring kept around rooms by the grid router
pub const GRID_ROOM_BUFFER: i32 = 1;
