// Floating point comparisons, and the surface offset for over/under points
pub const EPSILON: f64 = 0.00001;

// Maximum recursion depth for reflected and refracted rays
pub const REFLECTION_RECURSION_DEPTH: usize = 5;

// Render workers spawned per available hardware thread
pub const WORKERS_PER_CORE: usize = 4;

// Pending pixels buffered in the render queue, per worker
pub const QUEUE_DEPTH_PER_WORKER: usize = 64;

// Common refraction indices
pub const VACUUM_RI: f64 = 1.0;
pub const AIR_RI: f64 = 1.00029;
pub const WATER_RI: f64 = 1.333;
pub const GLASS_RI: f64 = 1.5;
pub const DIAMOND_RI: f64 = 2.417;

// Default output for the command line renderer
pub const OUT_FILE: &str = "out.ppm";
