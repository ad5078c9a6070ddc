//! Fixed-point compositing of premultiplied 32-bit pixels.
//!
//! The core is a set of row combiners ([`combine`]) for the Over,
//! OverReverse, OutReverse and Add operators, each with a scalar reference
//! and SSE2, AVX2 and NEON backends selected at runtime. [`Registry`] and
//! the [`composite`] module lift them to strided images.

pub mod combine;
pub mod composite;
pub mod config;
pub mod error;
pub mod format;
pub mod image;
pub mod pixel;
pub mod registry;
pub mod span;

#[cfg(feature = "bench")]
pub mod bench;

#[cfg(test)]
pub(crate) mod testing;

pub use combine::{combine, combiner, Capability, CombineFn, Kernels, Operator};
pub use composite::{Source, SourceFormat};
pub use config::Config;
pub use error::{Error, Result};
pub use format::PixelFormat;
pub use image::{ImageDesc, ImageView, ImageViewMut};
pub use pixel::{AlphaPosition, Pixel};
pub use registry::Registry;
