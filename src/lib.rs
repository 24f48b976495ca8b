// src/lib.rs

//! Palette lookup-table generator.
//!
//! Expands an ordered list of base colors into brightness-scaled palette
//! variants and precomputes, for every point of the 24-bit RGB cube, the index
//! of the nearest variant. The result is either a dense 16 MiB byte table or a
//! Rust constant listing the normalized variants.

pub mod color;
pub mod config;
pub mod lut;
pub mod palette;
pub mod render;
pub mod source;
pub mod table_io;

pub use color::Rgb;
pub use lut::{BuildError, BuildOptions, NearestIndexTable, Strategy};
pub use palette::{expand, PaletteVariant, DEFAULT_MULTIPLIERS};
