//! # Printer Module
//!
//! The command facade applications talk to, and printer configurations.
//!
//! ## Modules
//!
//! - [`facade`]: [`Printer`], one async operation per printer capability
//! - [`config`]: Printer hardware specifications and driver tuning

pub mod config;
pub mod facade;

pub use config::{PrinterConfig, TextEncoding};
pub use facade::Printer;
