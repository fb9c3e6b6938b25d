use serde::{Deserialize, Serialize};

use crate::fitness::FitnessWeights;
use crate::genome::Genome;
use crate::vec2::Vec2;
use crate::world::World;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentStatus {
    Alive,
    ReachedTarget,
    Crashed,
    Expired,
}

impl AgentStatus {
    #[inline]
    pub fn is_alive(self) -> bool {
        matches!(self, Self::Alive)
    }
}

/// A rocket: a point mass flown by its genome, one force per tick.
#[derive(Clone, Debug)]
pub struct Agent {
    genome: Genome,
    position: Vec2,
    velocity: Vec2,
    acceleration: Vec2,
    genome_index: usize,
    ticks_used: usize,
    status: AgentStatus,
    fitness: Option<f64>,
    max_speed: Option<f64>,
}

impl Agent {
    pub fn new(genome: Genome, start: Vec2, max_speed: Option<f64>) -> Self {
        let mut agent = Self {
            genome,
            position: start,
            velocity: Vec2::ZERO,
            acceleration: Vec2::ZERO,
            genome_index: 0,
            ticks_used: 0,
            status: AgentStatus::Alive,
            fitness: None,
            max_speed,
        };
        agent.reset(start);
        agent
    }

    pub fn reset(&mut self, start: Vec2) {
        self.position = start;
        self.velocity = Vec2::ZERO;
        self.acceleration = Vec2::ZERO;
        self.genome_index = 0;
        self.ticks_used = 0;
        self.status = AgentStatus::Alive;
        self.fitness = None;
    }

    /// Advances one tick. Finished agents are left untouched.
    ///
    /// Terminal checks run in priority order: target, then collision, then
    /// lifespan. A rocket that lands on the target while leaving the
    /// playfield therefore counts as a hit.
    pub fn step(&mut self, world: &World) {
        if !self.status.is_alive() {
            return;
        }
        let Some(force) = self.genome.force_at(self.genome_index) else {
            self.expire();
            return;
        };

        self.acceleration += force;
        self.integrate();
        self.genome_index += 1;

        if world.target.contains(self.position) {
            self.finish(AgentStatus::ReachedTarget);
        } else if world.collides(self.position) {
            self.finish(AgentStatus::Crashed);
        } else if self.genome_index >= self.genome.len() {
            self.finish(AgentStatus::Expired);
        }
    }

    /// Force-finishes an agent that is still flying when its generation ends.
    pub fn expire(&mut self) {
        if self.status.is_alive() {
            self.finish(AgentStatus::Expired);
        }
    }

    /// Scores the agent once; later calls return the cached value.
    pub fn compute_fitness(&mut self, world: &World, weights: &FitnessWeights) -> f64 {
        if let Some(fitness) = self.fitness {
            return fitness;
        }
        debug_assert!(
            !self.status.is_alive(),
            "fitness requested for an agent that is still alive"
        );
        let fitness = self.provisional_fitness(world, weights);
        self.fitness = Some(fitness);
        fitness
    }

    /// Score the agent would get if it stopped right now. Used for live HUD
    /// readouts; never cached.
    pub fn provisional_fitness(&self, world: &World, weights: &FitnessWeights) -> f64 {
        let ticks_used = if self.status.is_alive() {
            self.genome_index
        } else {
            self.ticks_used
        };
        weights.score(
            self.status,
            self.position.distance(world.target.point),
            ticks_used,
            self.genome.len(),
            world.reference_distance(),
        )
    }

    fn integrate(&mut self) {
        self.velocity += self.acceleration;
        if let Some(max_speed) = self.max_speed {
            self.velocity = self.velocity.limit(max_speed);
        }
        self.position += self.velocity;
        self.acceleration = Vec2::ZERO;
    }

    fn finish(&mut self, status: AgentStatus) {
        self.status = status;
        self.ticks_used = self.genome_index;
    }

    #[inline]
    pub fn genome(&self) -> &Genome {
        &self.genome
    }

    #[inline]
    pub fn position(&self) -> Vec2 {
        self.position
    }

    #[inline]
    pub fn velocity(&self) -> Vec2 {
        self.velocity
    }

    #[inline]
    pub fn genome_index(&self) -> usize {
        self.genome_index
    }

    #[inline]
    pub fn ticks_used(&self) -> usize {
        self.ticks_used
    }

    #[inline]
    pub fn status(&self) -> AgentStatus {
        self.status
    }

    #[inline]
    pub fn fitness(&self) -> Option<f64> {
        self.fitness
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::{Obstacle, Target};

    fn open_world() -> World {
        World {
            target: Target {
                point: Vec2::new(300.0, 100.0),
                radius: 5.0,
            },
            ..World::default()
        }
    }

    fn constant_genome(force: Vec2, len: usize) -> Genome {
        Genome::from_forces(vec![force; len])
    }

    #[test]
    fn euler_integration_accumulates_velocity() {
        let world = open_world();
        let mut agent = Agent::new(
            constant_genome(Vec2::new(1.0, 0.0), 10),
            Vec2::new(100.0, 400.0),
            None,
        );

        agent.step(&world);
        assert_eq!(agent.velocity(), Vec2::new(1.0, 0.0));
        assert_eq!(agent.position(), Vec2::new(101.0, 400.0));

        agent.step(&world);
        assert_eq!(agent.velocity(), Vec2::new(2.0, 0.0));
        assert_eq!(agent.position(), Vec2::new(103.0, 400.0));
        assert_eq!(agent.genome_index(), 2);
        assert_eq!(agent.status(), AgentStatus::Alive);
    }

    #[test]
    fn max_speed_caps_velocity() {
        let world = open_world();
        let mut agent = Agent::new(
            constant_genome(Vec2::new(3.0, 0.0), 5),
            Vec2::new(100.0, 400.0),
            Some(4.0),
        );
        agent.step(&world);
        agent.step(&world);
        assert_eq!(agent.velocity(), Vec2::new(4.0, 0.0));
    }

    #[test]
    fn expires_when_genome_is_spent() {
        let world = open_world();
        let mut agent = Agent::new(Genome::from_forces(vec![Vec2::ZERO; 3]), world.start, None);
        for _ in 0..3 {
            agent.step(&world);
        }
        assert_eq!(agent.status(), AgentStatus::Expired);
        assert_eq!(agent.genome_index(), 3);
        assert_eq!(agent.ticks_used(), 3);
    }

    #[test]
    fn finished_agents_are_frozen() {
        let world = open_world();
        let mut agent = Agent::new(
            constant_genome(Vec2::new(0.0, 50.0), 10),
            Vec2::new(300.0, 780.0),
            None,
        );
        agent.step(&world);
        assert_eq!(agent.status(), AgentStatus::Crashed);

        let position = agent.position();
        let index = agent.genome_index();
        agent.step(&world);
        agent.step(&world);
        assert_eq!(agent.position(), position);
        assert_eq!(agent.genome_index(), index);
    }

    #[test]
    fn obstacle_hit_crashes() {
        let world = World {
            obstacles: vec![Obstacle::Rect {
                x: 250.0,
                y: 600.0,
                width: 100.0,
                height: 20.0,
            }],
            ..open_world()
        };
        let mut agent = Agent::new(
            constant_genome(Vec2::new(0.0, -10.0), 10),
            Vec2::new(300.0, 640.0),
            None,
        );
        agent.step(&world);
        assert_eq!(agent.status(), AgentStatus::Alive);
        agent.step(&world);
        assert_eq!(agent.status(), AgentStatus::Crashed);
        assert_eq!(agent.ticks_used(), 2);
    }

    #[test]
    fn target_wins_over_leaving_bounds() {
        // Target straddles the left edge; the step lands outside the
        // playfield and inside the capture radius at once.
        let world = World {
            target: Target {
                point: Vec2::new(0.0, 400.0),
                radius: 5.0,
            },
            ..World::default()
        };
        let mut agent = Agent::new(
            constant_genome(Vec2::new(-12.0, 0.0), 10),
            Vec2::new(10.0, 400.0),
            None,
        );
        agent.step(&world);
        assert!(!world.bounds.contains(agent.position()));
        assert_eq!(agent.status(), AgentStatus::ReachedTarget);
    }

    #[test]
    fn fitness_is_computed_once() {
        let world = open_world();
        let weights = FitnessWeights::default();
        let mut agent = Agent::new(Genome::from_forces(vec![Vec2::ZERO; 2]), world.start, None);
        agent.step(&world);
        agent.step(&world);
        assert_eq!(agent.fitness(), None);

        let first = agent.compute_fitness(&world, &weights);
        let moved = World {
            target: Target {
                point: world.start,
                radius: 5.0,
            },
            ..world.clone()
        };
        assert_eq!(agent.compute_fitness(&moved, &weights), first);
        assert_eq!(agent.fitness(), Some(first));

        agent.reset(world.start);
        assert_eq!(agent.fitness(), None);
        assert_eq!(agent.status(), AgentStatus::Alive);
    }
}
