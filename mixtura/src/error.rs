use thiserror::Error;

use crate::combine::Operator;
use crate::composite::SourceFormat;
use crate::format::PixelFormat;

/// Errors raised when building image views or dispatching composites.
///
/// Row combiners have no error channel; they assert their preconditions.
#[derive(Debug, Error)]
pub enum Error {
    #[error("Invalid image geometry {width}x{height} with stride {stride}")]
    InvalidGeometry {
        width: usize,
        height: usize,
        stride: usize,
    },

    #[error("Pixel buffer holds {actual} pixels, {required} required")]
    BufferTooSmall { required: usize, actual: usize },

    #[error("Pixel buffer cast failed: {0:?}")]
    Cast(bytemuck::PodCastError),

    #[error("Image sizes differ: source {src_width}x{src_height}, destination {dst_width}x{dst_height}")]
    SizeMismatch {
        src_width: usize,
        src_height: usize,
        dst_width: usize,
        dst_height: usize,
    },

    #[error("Format {format} has no alpha channel")]
    NoAlpha { format: PixelFormat },

    #[error("Formats {src} and {dst} do not share a channel layout")]
    LayoutMismatch { src: PixelFormat, dst: PixelFormat },

    #[error("No fast path for {op} from {src} to {dst}")]
    NoFastPath {
        op: Operator,
        src: SourceFormat,
        dst: PixelFormat,
    },
}

pub type Result<T> = std::result::Result<T, Error>;
