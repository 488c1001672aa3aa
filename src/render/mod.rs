//! # Rendering Module
//!
//! Turns images into the monochrome rasters a thermal head prints.
//!
//! ## Modules
//!
//! - [`dither`]: Bayer 8x8 ordered dithering and row packing
//! - [`bitmap`]: Base64 decoding, image decoding, resizing and rasterization
//!
//! ## Usage Example
//!
//! ```no_run
//! use sunmi_printer::protocol::graphics;
//! use sunmi_printer::render::bitmap;
//!
//! let png = std::fs::read("logo.png")?;
//! let bitmap = bitmap::rasterize(&png, 200, 80, 384)?;
//! let cmd = graphics::raster(bitmap.width, bitmap.height, &bitmap.data);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod bitmap;
pub mod dither;
