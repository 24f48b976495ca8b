// src/lut.rs

//! Nearest-variant lookup table builder.
//!
//! For every point of the 256x256x256 RGB cube the builder finds the palette
//! variant with the smallest squared distance and records its index. The
//! search is exhaustive: each point is compared against every considered
//! variant in palette order, and a later variant only wins with a strictly
//! smaller distance, so the earliest of several equidistant variants is kept.
//!
//! The output is split into red planes of 65,536 bytes. In the parallel
//! strategy each rayon worker owns whole planes, so no two workers touch the
//! same bytes and the result is identical to the sequential scan.

use log::{debug, info, trace};
use rayon::prelude::*;
use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Instant;

use crate::color::Rgb;
use crate::palette::{distance_squared, PaletteVariant};

/// Points along one edge of the RGB cube.
pub const CUBE_EDGE: usize = 256;
/// Bytes in one red plane (all green/blue combinations for a fixed red).
pub const PLANE_LEN: usize = CUBE_EDGE * CUBE_EDGE;
/// Bytes in a complete table.
pub const TABLE_LEN: usize = CUBE_EDGE * PLANE_LEN;
/// Indices are stored in one byte, so at most 256 variants are addressable.
pub const MAX_VARIANTS: usize = 256;
/// Variants skipped by default: the first base color's four brightness levels.
pub const DEFAULT_EXCLUDE_COUNT: usize = 4;

const PROGRESS_EVERY_PLANES: usize = 32;

/// Flat table offset of a cube point: `r << 16 | g << 8 | b`.
#[inline]
pub const fn cube_offset(r: u8, g: u8, b: u8) -> usize {
    (r as usize) << 16 | (g as usize) << 8 | b as usize
}

/// How the cube scan is scheduled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Strategy {
    /// Single thread, planes in red order.
    Sequential,
    /// Red planes distributed over the global rayon pool.
    #[default]
    Parallel,
    /// Red planes distributed over a dedicated pool of `threads` workers.
    ParallelWith { threads: usize },
}

/// Knobs for [`build`].
#[derive(Debug, Clone, Default)]
pub struct BuildOptions {
    /// Number of leading variants never considered as a match.
    pub exclude_count: usize,
    pub strategy: Strategy,
    /// When set to `true` by another thread, the scan stops at the next plane
    /// boundary and [`build`] returns [`BuildError::Cancelled`].
    pub cancel: Option<Arc<AtomicBool>>,
}

impl BuildOptions {
    pub fn new(exclude_count: usize) -> Self {
        BuildOptions {
            exclude_count,
            ..Default::default()
        }
    }

    pub fn with_strategy(mut self, strategy: Strategy) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn with_cancel(mut self, cancel: Arc<AtomicBool>) -> Self {
        self.cancel = Some(cancel);
        self
    }
}

/// Reasons a table cannot be built. All are detected before the scan starts,
/// except `Cancelled`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuildError {
    /// No variants were supplied.
    EmptyPalette,
    /// The highest variant index would not fit in a byte.
    TooManyVariants { count: usize },
    /// `exclude_count` removes every variant from consideration.
    NothingToConsider {
        exclude_count: usize,
        variant_count: usize,
    },
    /// The worker pool could not be created.
    ThreadPool(String),
    /// The scan was abandoned through the cancellation flag.
    Cancelled,
}

impl fmt::Display for BuildError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BuildError::EmptyPalette => write!(f, "palette is empty; nothing to match against"),
            BuildError::TooManyVariants { count } => write!(
                f,
                "{} palette variants exceed the single-byte index limit of {}",
                count, MAX_VARIANTS
            ),
            BuildError::NothingToConsider {
                exclude_count,
                variant_count,
            } => write!(
                f,
                "excluding {} of {} variants leaves none to consider",
                exclude_count, variant_count
            ),
            BuildError::ThreadPool(msg) => write!(f, "failed to start worker pool: {}", msg),
            BuildError::Cancelled => write!(f, "table build was cancelled"),
        }
    }
}

impl std::error::Error for BuildError {}

/// Problems with raw table data supplied from outside the builder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TableError {
    /// A table must be exactly [`TABLE_LEN`] bytes.
    WrongLength { actual: usize },
    /// An RGB24 buffer length that is not a multiple of three.
    PartialPixel { len: usize },
}

impl fmt::Display for TableError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TableError::WrongLength { actual } => write!(
                f,
                "lookup table is {} bytes, expected exactly {}",
                actual, TABLE_LEN
            ),
            TableError::PartialPixel { len } => write!(
                f,
                "RGB24 buffer of {} bytes ends with a partial pixel",
                len
            ),
        }
    }
}

impl std::error::Error for TableError {}

/// Dense mapping from every RGB cube point to a palette variant index.
#[derive(Clone, PartialEq, Eq)]
pub struct NearestIndexTable {
    data: Box<[u8]>,
}

impl fmt::Debug for NearestIndexTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NearestIndexTable")
            .field("len", &self.data.len())
            .finish()
    }
}

impl NearestIndexTable {
    /// Wraps raw table bytes, e.g. read back from disk.
    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self, TableError> {
        if bytes.len() != TABLE_LEN {
            return Err(TableError::WrongLength {
                actual: bytes.len(),
            });
        }
        Ok(NearestIndexTable {
            data: bytes.into_boxed_slice(),
        })
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    #[inline]
    pub fn get(&self, r: u8, g: u8, b: u8) -> u8 {
        self.data[cube_offset(r, g, b)]
    }

    #[inline]
    pub fn lookup(&self, color: Rgb) -> u8 {
        self.get(color.r, color.g, color.b)
    }

    /// Looks up a packed `0xRRGGBB` value. Bits above 23 are ignored.
    #[inline]
    pub fn lookup_packed(&self, packed: u32) -> u8 {
        self.data[(packed & 0x00FF_FFFF) as usize]
    }

    /// Number of cube points resolved to each index.
    pub fn histogram(&self) -> [usize; 256] {
        let mut counts = [0usize; 256];
        for &index in self.data.iter() {
            counts[index as usize] += 1;
        }
        counts
    }

    /// Maps an interleaved RGB24 pixel buffer to palette indices.
    pub fn quantize_rgb24(&self, pixels: &[u8]) -> Result<Vec<u8>, TableError> {
        if pixels.len() % 3 != 0 {
            return Err(TableError::PartialPixel { len: pixels.len() });
        }
        Ok(pixels
            .par_chunks_exact(3)
            .map(|px| self.get(px[0], px[1], px[2]))
            .collect())
    }
}

/// Checks the capacity and exclusion rules shared by [`build`] and [`nearest`].
fn validate(variant_count: usize, exclude_count: usize) -> Result<(), BuildError> {
    if variant_count == 0 {
        return Err(BuildError::EmptyPalette);
    }
    if variant_count > MAX_VARIANTS {
        return Err(BuildError::TooManyVariants {
            count: variant_count,
        });
    }
    if exclude_count >= variant_count {
        return Err(BuildError::NothingToConsider {
            exclude_count,
            variant_count,
        });
    }
    Ok(())
}

/// Position of the closest candidate. Strict `<` keeps the earliest on ties.
#[inline]
fn closest(candidates: &[[f32; 3]], point: [f32; 3]) -> usize {
    let mut best = 0;
    let mut best_dist = f32::INFINITY;
    for (i, &rgb) in candidates.iter().enumerate() {
        let dist = distance_squared(rgb, point);
        if dist < best_dist {
            best_dist = dist;
            best = i;
        }
    }
    best
}

/// Resolves a single cube point without building the table.
pub fn nearest(
    variants: &[PaletteVariant],
    exclude_count: usize,
    point: Rgb,
) -> Result<u8, BuildError> {
    validate(variants.len(), exclude_count)?;
    let candidates: Vec<[f32; 3]> = variants[exclude_count..].iter().map(|v| v.rgb).collect();
    let point = point.channels().map(f32::from);
    Ok((exclude_count + closest(&candidates, point)) as u8)
}

fn fill_plane(r: usize, plane: &mut [u8], candidates: &[[f32; 3]], first_index: usize) {
    let red = r as f32;
    for (offset, slot) in plane.iter_mut().enumerate() {
        let point = [red, (offset >> 8) as f32, (offset & 0xFF) as f32];
        // validate() bounds first_index + position by MAX_VARIANTS - 1.
        *slot = (first_index + closest(candidates, point)) as u8;
    }
}

/// Builds the dense table for `variants`.
///
/// The variant list's order is the index space: the byte stored for a point
/// is the winning variant's position in `variants`.
pub fn build(
    variants: &[PaletteVariant],
    options: &BuildOptions,
) -> Result<NearestIndexTable, BuildError> {
    let exclude_count = options.exclude_count;
    validate(variants.len(), exclude_count)?;

    let candidates: Vec<[f32; 3]> = variants[exclude_count..].iter().map(|v| v.rgb).collect();
    info!(
        "Building lookup table: {} variants, {} excluded, {} considered ({:?})",
        variants.len(),
        exclude_count,
        candidates.len(),
        options.strategy
    );

    let started = Instant::now();
    let mut data = vec![0u8; TABLE_LEN];
    let planes_done = AtomicUsize::new(0);
    let cancel = options.cancel.as_deref();

    let scan_plane = |(r, plane): (usize, &mut [u8])| -> Result<(), BuildError> {
        if cancel.is_some_and(|flag| flag.load(Ordering::Relaxed)) {
            return Err(BuildError::Cancelled);
        }
        fill_plane(r, plane, &candidates, exclude_count);
        let done = planes_done.fetch_add(1, Ordering::Relaxed) + 1;
        trace!("Red plane {} complete", r);
        if done % PROGRESS_EVERY_PLANES == 0 {
            debug!("Lookup table progress: {}/{} planes", done, CUBE_EDGE);
        }
        Ok(())
    };

    match options.strategy {
        Strategy::Sequential => data.chunks_mut(PLANE_LEN).enumerate().try_for_each(scan_plane)?,
        Strategy::Parallel => data
            .par_chunks_mut(PLANE_LEN)
            .enumerate()
            .try_for_each(scan_plane)?,
        Strategy::ParallelWith { threads } => {
            let pool = rayon::ThreadPoolBuilder::new()
                .num_threads(threads)
                .build()
                .map_err(|e| BuildError::ThreadPool(e.to_string()))?;
            pool.install(|| {
                data.par_chunks_mut(PLANE_LEN)
                    .enumerate()
                    .try_for_each(scan_plane)
            })?
        }
    }

    info!(
        "Lookup table built in {:.2}s",
        started.elapsed().as_secs_f64()
    );
    Ok(NearestIndexTable {
        data: data.into_boxed_slice(),
    })
}
