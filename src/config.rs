//! Runtime configuration for a render.

use std::thread;

use crate::consts::{ REFLECTION_RECURSION_DEPTH, WORKERS_PER_CORE };

/// How pixels are distributed over threads.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum RenderMode {
    /// Every pixel is traced on the calling thread.
    Sequential,

    /// A fixed pool with exactly this many workers.
    Pool(usize),

    /// A pool sized from the available hardware parallelism.
    Auto,
}

impl Default for RenderMode {
    fn default() -> Self {
        Self::Auto
    }
}

impl RenderMode {
    /// Number of workers this mode spawns. `Sequential` reports one.
    pub fn workers(&self) -> usize {
        match *self {
            RenderMode::Sequential => 1,
            RenderMode::Pool(n) => n.max(1),
            RenderMode::Auto => {
                let cores = thread::available_parallelism()
                    .map(|n| n.get())
                    .unwrap_or(1);

                cores * WORKERS_PER_CORE
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RenderConfig {
    /// Reflection/refraction bounces allowed per camera ray.
    pub recursion_depth: usize,
    pub mode: RenderMode,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            recursion_depth: REFLECTION_RECURSION_DEPTH,
            mode: RenderMode::Auto,
        }
    }
}

impl RenderConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn recursion_depth(mut self, depth: usize) -> Self {
        self.recursion_depth = depth;
        self
    }

    pub fn mode(mut self, mode: RenderMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn sequential(self) -> Self {
        self.mode(RenderMode::Sequential)
    }

    pub fn workers(self, workers: usize) -> Self {
        self.mode(RenderMode::Pool(workers))
    }
}

#[test]
fn default_config_is_auto_with_depth_five() {
    let config = RenderConfig::default();

    assert_eq!(config.recursion_depth, 5);
    assert_eq!(config.mode, RenderMode::Auto);
    assert!(config.mode.workers() >= WORKERS_PER_CORE);
}

#[test]
fn builder_overrides_fields() {
    let config = RenderConfig::new().recursion_depth(2).workers(3);
    assert_eq!(config.recursion_depth, 2);
    assert_eq!(config.mode, RenderMode::Pool(3));

    let config = config.sequential();
    assert_eq!(config.mode.workers(), 1);
}

#[test]
fn empty_pool_still_has_one_worker() {
    assert_eq!(RenderMode::Pool(0).workers(), 1);
}
