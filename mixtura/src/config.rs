//! Configuration for a [`Registry`](crate::registry::Registry).

use crate::combine::Capability;

/// Dispatch and threading settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Config {
    /// Strongest instruction set the registry may register. Capabilities
    /// above this, or missing on the CPU, are skipped.
    pub max_capability: Capability,
    /// Spread image rows over the rayon pool.
    pub parallel_rows: bool,
    /// Images with fewer rows run on the calling thread.
    pub min_parallel_rows: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_capability: Capability::Avx2,
            parallel_rows: true,
            min_parallel_rows: 64,
        }
    }
}

impl Config {
    /// Scalar combiners only, e.g. to cross-check vector output.
    pub fn scalar_only() -> Self {
        Self {
            max_capability: Capability::Scalar,
            ..Default::default()
        }
    }

    pub fn single_threaded() -> Self {
        Self {
            parallel_rows: false,
            ..Default::default()
        }
    }

    /// Validate the configuration.
    pub fn validate(&self) {
        assert!(
            self.min_parallel_rows > 0,
            "min_parallel_rows must be positive, got {}",
            self.min_parallel_rows
        );
    }

    /// Whether an image of `height` rows is split across threads.
    pub fn parallel_for(&self, height: usize) -> bool {
        self.parallel_rows && height >= self.min_parallel_rows
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        Config::default().validate();
        Config::scalar_only().validate();
        Config::single_threaded().validate();
    }

    #[test]
    fn test_presets() {
        assert_eq!(Config::scalar_only().max_capability, Capability::Scalar);
        assert!(!Config::single_threaded().parallel_rows);
        assert!(!Config::single_threaded().parallel_for(10_000));
    }

    #[test]
    fn test_parallel_threshold() {
        let config = Config {
            min_parallel_rows: 8,
            ..Default::default()
        };
        assert!(!config.parallel_for(7));
        assert!(config.parallel_for(8));
    }

    #[test]
    #[should_panic(expected = "min_parallel_rows must be positive")]
    fn test_zero_min_rows_rejected() {
        Config {
            min_parallel_rows: 0,
            ..Default::default()
        }
        .validate();
    }
}
