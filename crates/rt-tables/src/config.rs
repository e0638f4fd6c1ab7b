//! Configuration for a roll engine.

use rand::SeedableRng;
use rand::rngs::StdRng;

/// Configuration for a [`RollEngine`](crate::engine::RollEngine).
#[derive(Debug, Clone, Default)]
pub struct EngineConfig {
    /// RNG seed for reproducible rolls. `None` seeds from the OS.
    pub seed: Option<u64>,
    /// Whether selectable tables ask the installed row selector.
    pub interactive: bool,
}

impl EngineConfig {
    /// Set the RNG seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Enable or disable interactive row selection.
    pub fn interactive(mut self, interactive: bool) -> Self {
        self.interactive = interactive;
        self
    }

    /// A fresh RNG for this configuration.
    pub fn rng(&self) -> StdRng {
        match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        }
    }
}
