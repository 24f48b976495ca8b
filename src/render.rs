// src/render.rs

//! Renders palette variants as a Rust constant table.
//!
//! This is the alternate export mode: no nearest-neighbor search, just the
//! normalized variant channels in variant order, ready to paste into source.

use serde::{Deserialize, Serialize};
use std::fmt::Write;

use crate::palette::PaletteVariant;

/// Element type used for each vector in the rendered table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum VectorStyle {
    /// `[f32; 3]` array literals.
    #[default]
    Array,
    /// `Vec3::new(r, g, b)` constructor calls (glam-style).
    Vec3,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderOptions {
    /// Name of the generated constant.
    pub const_name: String,
    pub style: VectorStyle,
}

impl Default for RenderOptions {
    fn default() -> Self {
        RenderOptions {
            const_name: "PALETTE_VARIANTS".to_string(),
            style: VectorStyle::Array,
        }
    }
}

/// Whether `name` can be used as a Rust constant identifier.
pub fn is_valid_const_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    name != "_" && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

// `{:?}` prints the shortest round-tripping form and always keeps a decimal
// point, so every component is a valid f32 literal.
fn write_vector(out: &mut String, style: VectorStyle, [r, g, b]: [f32; 3]) {
    let _ = match style {
        VectorStyle::Array => writeln!(out, "    [{:?}, {:?}, {:?}],", r, g, b),
        VectorStyle::Vec3 => writeln!(out, "    Vec3::new({:?}, {:?}, {:?}),", r, g, b),
    };
}

/// Renders `variants` as a `pub const` array declaration.
pub fn render(variants: &[PaletteVariant], options: &RenderOptions) -> String {
    let element = match options.style {
        VectorStyle::Array => "[f32; 3]",
        VectorStyle::Vec3 => "Vec3",
    };

    let mut out = String::new();
    let _ = writeln!(
        out,
        "pub const {}: [{}; {}] = [",
        options.const_name,
        element,
        variants.len()
    );
    for variant in variants {
        write_vector(&mut out, options.style, variant.normalized());
    }
    out.push_str("];\n");
    out
}
