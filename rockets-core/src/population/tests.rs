use super::*;
use crate::config::SimConfig;
use crate::rng::SimRng;
use crate::vec2::Vec2;
use crate::world::Target;

fn params(config: &SimConfig) -> BreedingParams {
    config.breeding_params().expect("test config must be valid")
}

fn far_target_config() -> SimConfig {
    SimConfig {
        population_size: 50,
        lifespan: 200,
        mutation_rate: 0.05,
        force_bound: 0.2,
        start_position: Vec2::new(300.0, 700.0),
        target: Target {
            point: Vec2::new(300.0, 400.0),
            radius: 5.0,
        },
        ..SimConfig::default()
    }
}

fn run_to_scoring(population: &mut Population, world: &World) -> u32 {
    let mut ticks = 0;
    while !population.step_all(world) {
        ticks += 1;
        assert!(ticks < 10_000, "generation never ended");
    }
    ticks + 1
}

#[test]
fn random_generation_has_fixed_size_and_lifespan() {
    let config = far_target_config();
    let world = config.world();
    let population = Population::random(params(&config), &world, &mut SimRng::new(1));

    assert_eq!(population.len(), 50);
    assert_eq!(population.generation(), 0);
    assert_eq!(population.phase(), Phase::Running);
    for agent in population.agents() {
        assert_eq!(agent.genome().len(), 200);
        assert_eq!(agent.position(), world.start);
        assert_eq!(agent.status(), AgentStatus::Alive);
    }
}

#[test]
fn phases_advance_running_scoring_breeding_running() {
    let config = SimConfig {
        population_size: 8,
        lifespan: 20,
        ..far_target_config()
    };
    let world = config.world();
    let mut rng = SimRng::new(2);
    let mut population = Population::random(params(&config), &world, &mut rng);

    let ticks = run_to_scoring(&mut population, &world);
    assert!(ticks <= 20);
    assert_eq!(population.phase(), Phase::Scoring);
    assert_eq!(population.alive_count(), 0);

    // Stepping outside Running is inert.
    assert!(!population.step_all(&world));

    let summary = population.score(&world, &FitnessWeights::default());
    assert_eq!(population.phase(), Phase::Breeding);
    assert_eq!(summary.generation, 0);
    assert_eq!(summary.reached + summary.crashed + summary.expired, 8);
    assert!(summary.best_fitness >= summary.mean_fitness);

    population.breed(&world, &mut rng).expect("breeding succeeds");
    assert_eq!(population.phase(), Phase::Running);
    assert_eq!(population.generation(), 1);
    assert_eq!(population.tick(), 0);
    assert_eq!(population.len(), 8);
    assert!(population.agents().iter().all(|a| a.fitness().is_none()));
}

#[test]
fn size_is_preserved_across_many_generations() {
    let config = SimConfig {
        population_size: 13,
        lifespan: 30,
        mutation_rate: 0.3,
        ..far_target_config()
    };
    let world = config.world();
    let mut rng = SimRng::new(3);
    let mut population = Population::random(params(&config), &world, &mut rng);

    for expected_generation in 1..=10 {
        run_to_scoring(&mut population, &world);
        population.score(&world, &FitnessWeights::default());
        assert_eq!(population.len(), 13);
        population.breed(&world, &mut rng).expect("breeding succeeds");
        assert_eq!(population.len(), 13);
        assert_eq!(population.generation(), expected_generation);
    }
}

#[test]
fn elitism_never_loses_the_best_score() {
    let config = SimConfig {
        population_size: 20,
        lifespan: 120,
        mutation_rate: 0.2,
        force_bound: 0.5,
        ..far_target_config()
    };
    let world = config.world();
    let weights = FitnessWeights::default();
    let mut rng = SimRng::new(0xE117E);
    let mut population = Population::random(params(&config), &world, &mut rng);

    let mut previous_best = 0.0;
    for _ in 0..12 {
        run_to_scoring(&mut population, &world);
        let summary = population.score(&world, &weights);
        assert!(
            summary.best_fitness >= previous_best,
            "best fell from {previous_best} to {}",
            summary.best_fitness
        );
        previous_best = summary.best_fitness;
        population.breed(&world, &mut rng).expect("breeding succeeds");
    }
}

#[test]
fn elite_genome_is_copied_unchanged() {
    let config = SimConfig {
        population_size: 10,
        lifespan: 40,
        mutation_rate: 1.0,
        ..far_target_config()
    };
    let world = config.world();
    let mut rng = SimRng::new(21);
    let mut population = Population::random(params(&config), &world, &mut rng);

    run_to_scoring(&mut population, &world);
    population.score(&world, &FitnessWeights::default());
    let elite = population
        .best_agent()
        .expect("scored population has a best agent")
        .genome()
        .clone();

    population.breed(&world, &mut rng).expect("breeding succeeds");
    assert_eq!(population.agents()[0].genome(), &elite);
}

#[test]
fn without_elitism_full_mutation_replaces_everything() {
    let config = SimConfig {
        population_size: 6,
        lifespan: 50,
        mutation_rate: 1.0,
        elitism: false,
        ..far_target_config()
    };
    let world = config.world();
    let mut rng = SimRng::new(22);
    let mut population = Population::random(params(&config), &world, &mut rng);
    let parents: Vec<Genome> = population
        .agents()
        .iter()
        .map(|a| a.genome().clone())
        .collect();

    run_to_scoring(&mut population, &world);
    population.score(&world, &FitnessWeights::default());
    population.breed(&world, &mut rng).expect("breeding succeeds");

    for agent in population.agents() {
        assert!(!parents.contains(agent.genome()));
    }
}

#[test]
fn uniform_fallback_when_no_weight_is_positive() {
    let selector = Selector::build(&[0.0, 0.0, -1.0, f64::NAN]).expect("non-empty");
    assert!(matches!(selector, Selector::Uniform(4)));

    let mut rng = SimRng::new(4);
    let mut seen = [false; 4];
    for _ in 0..200 {
        seen[selector.sample(&mut rng)] = true;
    }
    assert!(seen.iter().all(|s| *s));
}

#[test]
fn roulette_favours_fitter_agents() {
    let selector = Selector::build(&[1.0, 9.0]).expect("non-empty");
    let mut rng = SimRng::new(5);
    let picks_of_fit = (0..10_000).filter(|_| selector.sample(&mut rng) == 1).count();
    assert!(
        (8_600..=9_400).contains(&picks_of_fit),
        "picked fitter agent {picks_of_fit} times"
    );
}

#[test]
fn zero_weight_agents_are_never_selected() {
    let selector = Selector::build(&[0.0, 3.0, 0.0]).expect("non-empty");
    let mut rng = SimRng::new(6);
    assert!((0..500).all(|_| selector.sample(&mut rng) == 1));
}

#[test]
fn empty_population_cannot_build_a_selector() {
    assert!(matches!(
        Selector::build(&[]),
        Err(EvolutionError::EmptyPopulation)
    ));
}

#[test]
fn force_finish_expires_stragglers() {
    let config = SimConfig {
        population_size: 5,
        lifespan: 100,
        ..far_target_config()
    };
    let world = config.world();
    let mut population = Population::random(params(&config), &world, &mut SimRng::new(7));
    population.step_all(&world);
    population.force_finish();

    assert_eq!(population.phase(), Phase::Scoring);
    assert_eq!(population.alive_count(), 0);
}
