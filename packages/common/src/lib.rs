pub mod geometry;
pub mod units;

pub use geometry::{Rect, Size};
pub use units::{format_px, parse_px};
