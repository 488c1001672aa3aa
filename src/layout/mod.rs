//! # Text Layout
//!
//! Character-cell layout for the fixed-pitch printer font.
//!
//! - [`width`]: how many cells a character occupies
//! - [`columns`]: multi-column rows with wrap-on-overflow

pub mod columns;
pub mod width;

pub use columns::{MAX_COLUMNS, layout_columns};
pub use width::{char_width, text_width};
