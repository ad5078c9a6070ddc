//! Combiner registry and composite dispatch.
//!
//! A [`Registry`] is built once from a [`Config`] and owned by the caller.
//! It maps every `(operator, format, capability)` triple the CPU can run to
//! a combiner and routes image composites through the fast-path table
//! before falling back to the general per-row path.

use hashbrown::HashMap;
use strum::IntoEnumIterator;
use strum_macros::Display;
use tracing::{debug, trace};

use crate::combine::{self, Capability, CombineFn, Kernels, Operator};
use crate::composite::{self, Source, SourceFormat};
use crate::config::Config;
use crate::error::{Error, Result};
use crate::format::PixelFormat;
use crate::image::{ImageView, ImageViewMut};
use crate::pixel::AlphaPosition;

/// Which direct composite a fast path runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum FastPathKind {
    #[strum(serialize = "over_8888_8888")]
    Over8888,
    #[strum(serialize = "add_8888_8888")]
    Add8888,
    #[strum(serialize = "over_reverse_solid_8888")]
    OverReverseSolid,
}

/// One unmasked `(operator, source, destination)` combination with a
/// dedicated composite.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FastPath {
    pub op: Operator,
    pub src: SourceFormat,
    pub dst: PixelFormat,
    pub kind: FastPathKind,
}

impl FastPath {
    const fn new(op: Operator, src: SourceFormat, dst: PixelFormat, kind: FastPathKind) -> Self {
        Self { op, src, dst, kind }
    }
}

const fn over(src: PixelFormat, dst: PixelFormat) -> FastPath {
    FastPath::new(Operator::Over, SourceFormat::Image(src), dst, FastPathKind::Over8888)
}

const fn add(format: PixelFormat) -> FastPath {
    FastPath::new(Operator::Add, SourceFormat::Image(format), format, FastPathKind::Add8888)
}

const fn over_reverse_solid(dst: PixelFormat) -> FastPath {
    FastPath::new(
        Operator::OverReverse,
        SourceFormat::Solid,
        dst,
        FastPathKind::OverReverseSolid,
    )
}

pub const FAST_PATHS: &[FastPath] = &[
    over(PixelFormat::A8R8G8B8, PixelFormat::A8R8G8B8),
    over(PixelFormat::A8R8G8B8, PixelFormat::X8R8G8B8),
    over(PixelFormat::A8B8G8R8, PixelFormat::A8B8G8R8),
    over(PixelFormat::A8B8G8R8, PixelFormat::X8B8G8R8),
    over(PixelFormat::B8G8R8A8, PixelFormat::B8G8R8A8),
    over(PixelFormat::B8G8R8A8, PixelFormat::B8G8R8X8),
    over(PixelFormat::R8G8B8A8, PixelFormat::R8G8B8A8),
    over(PixelFormat::R8G8B8A8, PixelFormat::R8G8B8X8),
    over_reverse_solid(PixelFormat::A8R8G8B8),
    over_reverse_solid(PixelFormat::A8B8G8R8),
    over_reverse_solid(PixelFormat::B8G8R8A8),
    over_reverse_solid(PixelFormat::R8G8B8A8),
    add(PixelFormat::A8R8G8B8),
    add(PixelFormat::A8B8G8R8),
    add(PixelFormat::B8G8R8A8),
    add(PixelFormat::R8G8B8A8),
];

pub struct Registry {
    config: Config,
    /// Registered capabilities, weakest first. Always starts with scalar.
    capabilities: Vec<Capability>,
    kernels: HashMap<(Capability, AlphaPosition), Kernels>,
    combiners: HashMap<(Operator, PixelFormat, Capability), CombineFn>,
    best_high: Kernels,
    best_low: Kernels,
}

impl std::fmt::Debug for Registry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registry")
            .field("config", &self.config)
            .field("capabilities", &self.capabilities)
            .field("combiners", &self.combiners.len())
            .finish_non_exhaustive()
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new(Config::default())
    }
}

impl Registry {
    pub fn new(config: Config) -> Self {
        config.validate();

        let capabilities: Vec<Capability> = Capability::available()
            .filter(|&c| c <= config.max_capability)
            .collect();
        let best = capabilities.last().copied().unwrap_or(Capability::Scalar);

        let mut kernels = HashMap::new();
        let mut combiners = HashMap::new();
        for &capability in &capabilities {
            for alpha in [AlphaPosition::High, AlphaPosition::Low] {
                if let Some(k) = combine::kernels(capability, alpha) {
                    kernels.insert((capability, alpha), k);
                }
            }
            for format in PixelFormat::iter() {
                let Some(k) = kernels.get(&(capability, format.alpha_position())) else {
                    continue;
                };
                for op in Operator::iter() {
                    combiners.insert((op, format, capability), k.combiner(op));
                }
            }
        }

        debug!(
            ?capabilities,
            %best,
            combiners = combiners.len(),
            "combiner registry built"
        );

        let best_high = kernels
            .get(&(best, AlphaPosition::High))
            .copied()
            .unwrap_or_else(|| combine::best_kernels(AlphaPosition::High));
        let best_low = kernels
            .get(&(best, AlphaPosition::Low))
            .copied()
            .unwrap_or_else(|| combine::best_kernels(AlphaPosition::Low));

        Self {
            config,
            capabilities,
            kernels,
            combiners,
            best_high,
            best_low,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn capabilities(&self) -> &[Capability] {
        &self.capabilities
    }

    pub fn best_capability(&self) -> Capability {
        self.capabilities
            .last()
            .copied()
            .unwrap_or(Capability::Scalar)
    }

    /// Kernels of the strongest registered capability.
    pub fn kernels(&self, alpha: AlphaPosition) -> &Kernels {
        match alpha {
            AlphaPosition::High => &self.best_high,
            AlphaPosition::Low => &self.best_low,
        }
    }

    pub fn kernels_for(&self, capability: Capability, alpha: AlphaPosition) -> Option<&Kernels> {
        self.kernels.get(&(capability, alpha))
    }

    /// The strongest registered combiner for `op` on `format`.
    pub fn combiner(&self, op: Operator, format: PixelFormat) -> CombineFn {
        self.kernels(format.alpha_position()).combiner(op)
    }

    pub fn combiner_for(
        &self,
        op: Operator,
        format: PixelFormat,
        capability: Capability,
    ) -> Option<CombineFn> {
        self.combiners.get(&(op, format, capability)).copied()
    }

    pub fn fast_paths(&self) -> &'static [FastPath] {
        FAST_PATHS
    }

    pub fn fast_path(
        &self,
        op: Operator,
        src: SourceFormat,
        dst: PixelFormat,
    ) -> Option<&'static FastPath> {
        FAST_PATHS
            .iter()
            .find(|path| path.op == op && path.src == src && path.dst == dst)
    }

    /// Composites `src`, weighted by `mask`, onto `dst` with `op`.
    ///
    /// Unmasked composites matching the fast-path table run directly;
    /// everything else goes through [`composite::general`].
    pub fn composite(
        &self,
        op: Operator,
        src: Source<'_>,
        mask: Option<&ImageView<'_>>,
        dst: &mut ImageViewMut<'_>,
    ) -> Result<()> {
        if mask.is_none() && self.try_fast_path(op, &src, dst)? {
            return Ok(());
        }

        let dst_format = dst.desc().format;
        trace!(%op, src = %src.format(), dst = %dst_format, masked = mask.is_some(), "general composite");

        let kernels = self.kernels(dst_format.alpha_position());
        composite::general(kernels.combiner(op), kernels, &self.config, &src, mask, dst)
    }

    /// Like [`Registry::composite`] without a mask, failing instead of
    /// taking the general path.
    pub fn composite_fast(
        &self,
        op: Operator,
        src: Source<'_>,
        dst: &mut ImageViewMut<'_>,
    ) -> Result<()> {
        if self.try_fast_path(op, &src, dst)? {
            return Ok(());
        }
        Err(Error::NoFastPath {
            op,
            src: src.format(),
            dst: dst.desc().format,
        })
    }

    fn try_fast_path(
        &self,
        op: Operator,
        src: &Source<'_>,
        dst: &mut ImageViewMut<'_>,
    ) -> Result<bool> {
        let dst_format = dst.desc().format;
        let Some(path) = self.fast_path(op, src.format(), dst_format) else {
            return Ok(false);
        };
        trace!(%op, kind = %path.kind, dst = %dst_format, "fast path composite");

        let kernels = self.kernels(dst_format.alpha_position());
        match (path.kind, src) {
            (FastPathKind::Over8888, Source::Image(src)) => {
                composite::over_8888_8888(kernels, &self.config, src, dst)?
            }
            (FastPathKind::Add8888, Source::Image(src)) => {
                composite::add_8888_8888(kernels, &self.config, src, dst)?
            }
            (FastPathKind::OverReverseSolid, Source::Solid(solid)) => {
                composite::over_reverse_solid_8888(kernels, &self.config, *solid, dst)?
            }
            _ => return Ok(false),
        }
        Ok(true)
    }
}
