use strum_macros::{Display, EnumIter};

use crate::pixel::AlphaPosition;

/// 32-bit packed pixel formats handled by the compositing core.
///
/// Names follow the conventional most-significant-channel-first order of the
/// `u32` value, so `A8R8G8B8` keeps alpha in bits 24..32.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter)]
pub enum PixelFormat {
    #[strum(serialize = "a8r8g8b8")]
    A8R8G8B8,
    #[strum(serialize = "x8r8g8b8")]
    X8R8G8B8,
    #[strum(serialize = "a8b8g8r8")]
    A8B8G8R8,
    #[strum(serialize = "x8b8g8r8")]
    X8B8G8R8,
    #[strum(serialize = "b8g8r8a8")]
    B8G8R8A8,
    #[strum(serialize = "b8g8r8x8")]
    B8G8R8X8,
    #[strum(serialize = "r8g8b8a8")]
    R8G8B8A8,
    #[strum(serialize = "r8g8b8x8")]
    R8G8B8X8,
}

impl PixelFormat {
    pub fn alpha_position(self) -> AlphaPosition {
        match self {
            PixelFormat::A8R8G8B8
            | PixelFormat::X8R8G8B8
            | PixelFormat::A8B8G8R8
            | PixelFormat::X8B8G8R8 => AlphaPosition::High,
            PixelFormat::B8G8R8A8
            | PixelFormat::B8G8R8X8
            | PixelFormat::R8G8B8A8
            | PixelFormat::R8G8B8X8 => AlphaPosition::Low,
        }
    }

    /// False for `x8` formats, whose alpha byte is padding.
    pub fn has_alpha(self) -> bool {
        matches!(
            self,
            PixelFormat::A8R8G8B8
                | PixelFormat::A8B8G8R8
                | PixelFormat::B8G8R8A8
                | PixelFormat::R8G8B8A8
        )
    }

    /// The alpha-carrying format with the same channel layout.
    pub fn with_alpha(self) -> PixelFormat {
        match self {
            PixelFormat::X8R8G8B8 => PixelFormat::A8R8G8B8,
            PixelFormat::X8B8G8R8 => PixelFormat::A8B8G8R8,
            PixelFormat::B8G8R8X8 => PixelFormat::B8G8R8A8,
            PixelFormat::R8G8B8X8 => PixelFormat::R8G8B8A8,
            other => other,
        }
    }

    /// True when both formats share channel order, ignoring alpha presence.
    pub fn same_layout(self, other: PixelFormat) -> bool {
        self.with_alpha() == other.with_alpha()
    }
}
