//! Simulation defaults.
//!
//! World geometry follows the classic 600x800 smart-rockets window: the launch
//! pad sits near the bottom edge and the target near the top.

// World dimensions
pub const DEFAULT_WORLD_WIDTH: f64 = 600.0;
pub const DEFAULT_WORLD_HEIGHT: f64 = 800.0;

// Launch pad and target
pub const DEFAULT_START_X: f64 = 300.0;
pub const DEFAULT_START_Y: f64 = 700.0;
pub const DEFAULT_TARGET_X: f64 = 300.0;
pub const DEFAULT_TARGET_Y: f64 = 100.0;
pub const DEFAULT_TARGET_RADIUS: f64 = 10.0;

// Evolution
pub const DEFAULT_POPULATION_SIZE: usize = 50;
pub const DEFAULT_LIFESPAN: u32 = 300;
pub const DEFAULT_MUTATION_RATE: f64 = 0.05;
pub const DEFAULT_FORCE_BOUND: f64 = 0.2;

// Fitness
pub const DEFAULT_DISTANCE_WEIGHT: f64 = 100.0;
pub const DEFAULT_REACH_BONUS: f64 = 1_000.0;
pub const DEFAULT_TIME_BONUS: f64 = 500.0;
pub const DEFAULT_CRASH_PENALTY: f64 = 0.1;
/// Lower clamp on every score so roulette weights stay strictly positive.
pub const FITNESS_FLOOR: f64 = 1e-3;

// Presentation speed, in ticks per frame. Always a multiple of SPEED_STEP.
pub const MIN_SPEED: u32 = 5;
pub const MAX_SPEED: u32 = 300;
pub const SPEED_STEP: u32 = 5;
pub const DEFAULT_SPEED: u32 = MIN_SPEED;
