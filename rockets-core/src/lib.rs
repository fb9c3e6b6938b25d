pub mod agent;
pub mod config;
pub mod constants;
pub mod controller;
pub mod error;
pub mod fitness;
pub mod genome;
pub mod population;
pub mod rng;
pub mod vec2;
pub mod world;

pub use agent::{Agent, AgentStatus};
pub use config::SimConfig;
pub use controller::{AgentSnapshot, Simulation, Snapshot, TickOutcome};
pub use error::{ConfigError, EvolutionError};
pub use fitness::FitnessWeights;
pub use genome::{Genome, MutationRate};
pub use population::{GenerationSummary, Phase, Population};
pub use rng::SimRng;
pub use vec2::Vec2;
pub use world::{Bounds, Obstacle, Target, World};
