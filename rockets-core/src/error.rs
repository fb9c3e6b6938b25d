use thiserror::Error;

/// Rejected simulation parameters. Raised before any generation starts.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("population_size must be > 0")]
    EmptyPopulation,
    #[error("lifespan must be > 0 ticks")]
    ZeroLifespan,
    #[error("mutation_rate must be within [0, 1], got {0}")]
    MutationRateOutOfRange(f64),
    #[error("force_bound must be a finite value > 0, got {0}")]
    InvalidForceBound(f64),
    #[error("max_speed must be a finite value > 0 when set, got {0}")]
    InvalidMaxSpeed(f64),
    #[error("target radius must be a finite value > 0, got {0}")]
    InvalidTargetRadius(f64),
    #[error("bounds must be finite and positive, got {width}x{height}")]
    InvalidBounds { width: f64, height: f64 },
    #[error("{field} must have finite coordinates")]
    NonFinitePoint { field: &'static str },
    #[error("obstacle {index} is degenerate: {reason}")]
    InvalidObstacle { index: usize, reason: &'static str },
    #[error("invalid fitness weights: {0}")]
    InvalidFitnessWeights(&'static str),
}

/// Failures inside a breeding step. None of these are recoverable; they mean
/// the population was built from parameters that should have been rejected.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum EvolutionError {
    #[error("cannot build a selection distribution over an empty population")]
    EmptyPopulation,
    #[error("genome length mismatch: {left} vs {right}")]
    GenomeLengthMismatch { left: usize, right: usize },
}
