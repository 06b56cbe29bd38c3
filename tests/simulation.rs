//! Integration tests for the simulation engine

use std::cell::RefCell;
use std::rc::Rc;
use std::time::{Duration, Instant};

use forage_sim::config::MutationConfig;
use forage_sim::scheduler::Due;
use forage_sim::{
    Genetics, HeadlessSink, NumberRange, Position, SimError, Simulation, SimulationConfig,
};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

fn empty_world() -> SimulationConfig {
    let mut config = SimulationConfig::default();
    config.starting_agents = 0;
    config.food_spawning.initial_amount = 0;
    config.food_spawning.ticks_per_spawn = 1.0;
    config.food_spawning.number_per_spawn = 0;
    config.mutation.chance = 0.0;
    config
}

fn genetics(sight: f64, speed: f64, reproduce: f64) -> Genetics {
    Genetics {
        sight,
        speed,
        reproduce,
    }
}

#[test]
fn test_population_accounting_each_tick() {
    let mut config = SimulationConfig::default();
    config.starting_agents = 30;
    config.food_spawning.initial_amount = 300;
    config.surface.width = 200.0;
    config.surface.height = 200.0;
    config.energy.agent_start_energy = 50.0;
    config.energy.reproduction_cost = 40.0;
    config.initial_agent_stats.reproduce = NumberRange::new(20.0, 30.0);
    // newborns start above the threshold and would keep breeding
    config.max_population = 300;

    let mut sim = Simulation::with_seed(config, HeadlessSink::new(), 12345).unwrap();
    let mut total_births = 0;

    for _ in 0..200 {
        let before = sim.number_of_agents();
        let report = sim.tick().unwrap();
        assert_eq!(sim.number_of_agents(), before + report.births - report.deaths);
        assert_eq!(sim.stats().agents, sim.number_of_agents());
        assert!(sim.number_of_agents() <= 300);
        total_births += report.births;

        for agent in sim.agents() {
            assert!(agent.energy > 0.0);
        }
    }

    assert!(total_births >= 30);
    assert_eq!(sim.lifetime().total_births, total_births);
    // one shape per live agent and food
    assert_eq!(
        sim.sink().live_shapes(),
        sim.number_of_agents() + sim.number_of_foods()
    );
}

#[test]
fn test_single_agent_starves_without_food() {
    let mut config = empty_world();
    config.starting_agents = 1;
    config.tps = 10.0;
    let mut sim = Simulation::with_seed(config, HeadlessSink::new(), 7).unwrap();

    let original = sim.agents()[0].genetics;
    let cost = original.sight * sim.config().energy.multipliers.sight;
    let mut died_at = None;

    for tick in 0..100 {
        let before = sim.agents().first().map(|a| a.energy);
        sim.tick().unwrap();

        match (before, sim.agents().first()) {
            (Some(energy), Some(agent)) => {
                assert_eq!(agent.genetics, original);
                assert_eq!(agent.energy, energy - cost);
                assert!(agent.energy < energy);
            }
            (Some(energy), None) => {
                assert!(energy - cost <= 0.0);
                died_at = Some(tick);
            }
            (None, agent) => {
                assert!(agent.is_none());
                assert_eq!(sim.number_of_agents(), 0);
                assert!(sim.stats().sight.average.is_nan());
            }
        }
    }

    assert!(died_at.is_some());
    assert_eq!(sim.sink().live_shapes(), 0);
}

#[test]
fn test_food_at_distance_zero_is_eaten_once() {
    let mut sim = Simulation::with_seed(empty_world(), HeadlessSink::new(), 1).unwrap();
    let spot = Position::new(50.0, 50.0);
    sim.spawn_agent_at(spot, genetics(40.0, 10.0, 1000.0));
    sim.spawn_food_at(spot);

    let report = sim.tick().unwrap();
    assert_eq!(report.food_eaten, 1);
    assert!(sim.foods()[0].eaten);
    let movement = 10.0 * 0.1 / 10.0;
    let upkeep = 40.0 * 0.005;
    let expected = 10.0 - movement + 10.0 - upkeep;
    assert!((sim.agents()[0].energy - expected).abs() < 1e-9);

    let report = sim.tick().unwrap();
    assert_eq!(report.food_eaten, 0);
    assert_eq!(report.food_purged, 1);
    assert_eq!(sim.number_of_foods(), 0);
    assert!((sim.agents()[0].energy - (expected - upkeep)).abs() < 1e-9);
}

#[test]
fn test_eaten_food_is_swept_when_population_is_empty() {
    let mut config = empty_world();
    config.energy.agent_start_energy = 0.5;
    let mut sim = Simulation::with_seed(config, HeadlessSink::new(), 2).unwrap();
    let spot = Position::new(10.0, 10.0);
    // eats, then still dies from a huge upkeep
    sim.spawn_agent_at(spot, genetics(4000.0, 1.0, 1000.0));
    sim.spawn_food_at(spot);

    let report = sim.tick().unwrap();
    assert_eq!(report.food_eaten, 1);
    assert_eq!(report.deaths, 1);
    assert_eq!(sim.number_of_foods(), 1);

    let report = sim.tick().unwrap();
    assert_eq!(report.food_purged, 1);
    assert_eq!(sim.number_of_foods(), 0);
    assert_eq!(sim.sink().live_shapes(), 0);
}

#[test]
fn test_newborn_is_counted_and_pays_upkeep_but_does_not_forage() {
    let mut sim = Simulation::with_seed(empty_world(), HeadlessSink::new(), 3).unwrap();
    let spot = Position::new(100.0, 100.0);
    sim.spawn_agent_at(spot, genetics(100.0, 10.0, 100.0));
    sim.agents_mut()[0].energy = 500.0;
    sim.spawn_food_at(Position::new(105.0, 100.0));

    let report = sim.tick().unwrap();
    assert_eq!(report.births, 1);
    assert_eq!(sim.number_of_agents(), 2);

    let parent = &sim.agents()[0];
    let child = &sim.agents()[1];
    assert_ne!(parent.position, spot);
    assert_eq!(child.position, parent.position);
    // start energy minus the passive sight cost, no movement cost
    assert_eq!(child.energy, 10.0 - 100.0 * 0.005);
    assert_eq!(child.born_tick, Some(0));
    assert_eq!(child.genetics, parent.genetics);
    assert_eq!(sim.stats().agents, 2);
    assert_eq!(sim.stats().sight.average, 100.0);

    // parent paid movement, upkeep and the reproduction cost; food was eaten
    let expected = 500.0 - 0.1 + 10.0 - 0.5 - 50.0;
    assert!((parent.energy - expected).abs() < 1e-9);

    // the child owns its own copy of the position
    let child_position = child.position;
    sim.agents_mut()[0].position.x += 40.0;
    assert_eq!(sim.agents()[1].position, child_position);
}

#[test]
fn test_newborns_can_reproduce_in_their_birth_tick() {
    let mut config = empty_world();
    config.energy.agent_start_energy = 100.0;
    config.energy.reproduction_cost = 1.0;
    config.max_population = 10;
    let mut sim = Simulation::with_seed(config, HeadlessSink::new(), 11).unwrap();
    sim.spawn_agent_at(Position::new(20.0, 20.0), genetics(100.0, 10.0, 5.0));

    let report = sim.tick().unwrap();

    // every newborn breeds when visited until the population cap is reached
    assert_eq!(report.births, 9);
    assert_eq!(sim.number_of_agents(), 10);
    assert_eq!(sim.agents()[1].energy, 100.0 - 0.5 - 1.0);
    assert_eq!(sim.agents()[9].energy, 100.0 - 0.5);
    assert_eq!(sim.lifetime().max_population, 10);
}

#[test]
fn test_initial_stat_ranges_only_checked_on_reset() {
    let mut config = empty_world();
    config.starting_agents = 3;
    let mut sim = Simulation::with_seed(config, HeadlessSink::new(), 12).unwrap();
    sim.config_mut().initial_agent_stats.sight = NumberRange::new(300.0, 200.0);

    assert!(sim.tick().is_ok());
    assert!(matches!(
        sim.reset(),
        Err(SimError::InvertedRange {
            name: "initial_agent_stats.sight",
            ..
        })
    ));
    // the failed reset leaves the world untouched
    assert_eq!(sim.number_of_agents(), 3);
    assert_eq!(sim.ticks(), 1);
}

#[test]
fn test_child_stats_mutate_independently() {
    let mut rng = ChaCha8Rng::seed_from_u64(99);
    let mutation = MutationConfig {
        chance: 0.75,
        change: 0.1,
    };
    let parent = genetics(100.0, 10.0, 200.0);
    let outcomes = [1.0, 1.1, 0.9];
    let mut seen = [[false; 3]; 3];
    let mut differing = 0;

    for _ in 0..2000 {
        let child = parent.mutate(&mutation, &mut rng);
        let factors = [
            child.sight / parent.sight,
            child.speed / parent.speed,
            child.reproduce / parent.reproduce,
        ];
        for (stat, factor) in factors.iter().enumerate() {
            let idx = outcomes
                .iter()
                .position(|o| (o - factor).abs() < 1e-12)
                .unwrap_or_else(|| panic!("unexpected factor {factor}"));
            seen[stat][idx] = true;
        }
        if (factors[0] - factors[1]).abs() > 1e-12 || (factors[1] - factors[2]).abs() > 1e-12 {
            differing += 1;
        }
    }

    assert_eq!(seen, [[true; 3]; 3]);
    assert!(differing > 1000, "{differing}");
}

#[test]
fn test_reset_restores_initial_state() {
    let mut config = SimulationConfig::default();
    config.starting_agents = 20;
    config.food_spawning.initial_amount = 40;
    let mut sim = Simulation::with_seed(config.clone(), HeadlessSink::new(), 4).unwrap();

    for _ in 0..25 {
        sim.tick().unwrap();
    }
    sim.reset().unwrap();

    assert_eq!(sim.ticks(), 0);
    assert_eq!(sim.number_of_agents(), 20);
    assert_eq!(sim.number_of_foods(), 40);
    assert_eq!(sim.config(), &config);
    assert_eq!(sim.lifetime().total_births, 0);
    assert_eq!(sim.sink().live_shapes(), 60);
}

#[test]
fn test_same_seed_is_reproducible() {
    let mut config = SimulationConfig::default();
    config.starting_agents = 25;
    config.food_spawning.initial_amount = 100;
    let mut a = Simulation::with_seed(config.clone(), HeadlessSink::new(), 2024).unwrap();
    let mut b = Simulation::with_seed(config, HeadlessSink::new(), 2024).unwrap();

    for _ in 0..60 {
        a.tick().unwrap();
        b.tick().unwrap();
    }
    assert_eq!(a.agents(), b.agents());
    assert_eq!(a.foods(), b.foods());
}

#[test]
fn test_tps_change_restarts_timers_and_keeps_state() {
    let mut config = SimulationConfig::default();
    config.starting_agents = 5;
    config.food_spawning.initial_amount = 10;
    config.tps = 10.0;
    let mut sim = Simulation::with_seed(config, HeadlessSink::new(), 5).unwrap();
    let samples = Rc::new(RefCell::new(Vec::new()));
    let s = Rc::clone(&samples);
    sim.on_ups(move |ups| s.borrow_mut().push(ups));

    let t0 = Instant::now();
    sim.start_at(t0).unwrap();
    assert!(sim.pump(t0 + Duration::from_millis(100)).unwrap().tick);
    assert_eq!(sim.ticks(), 1);
    let agents = sim.number_of_agents();

    sim.config_mut().tps = 20.0;
    let t1 = t0 + Duration::from_millis(130);
    assert!(!sim.pump(t1).unwrap().tick);
    assert_eq!(sim.scheduler().tick_period(), Some(Duration::from_millis(50)));
    assert_eq!(sim.ticks(), 1);
    assert_eq!(sim.number_of_agents(), agents);
    // restarting behaves like stop then start for the throughput hook
    assert_eq!(*samples.borrow(), vec![0]);

    assert!(sim.pump(t1 + Duration::from_millis(50)).unwrap().tick);
    assert_eq!(sim.ticks(), 2);
    assert!(sim.is_running());
}

#[test]
fn test_invalid_tps_is_rejected() {
    let mut sim = Simulation::with_seed(empty_world(), HeadlessSink::new(), 6).unwrap();
    assert!(matches!(sim.set_tps(0.0), Err(SimError::InvalidTps(_))));
    assert_eq!(sim.config().tps, 10.0);

    let t0 = Instant::now();
    sim.start_at(t0).unwrap();
    sim.config_mut().tps = -1.0;
    assert!(sim.pump(t0 + Duration::from_millis(10)).is_err());
    sim.stop();
    assert!(!sim.is_running());
}

#[test]
fn test_hooks_report_ticks_and_throughput() {
    let mut sim = Simulation::with_seed(empty_world(), HeadlessSink::new(), 8).unwrap();
    let updates = Rc::new(RefCell::new(0));
    let samples = Rc::new(RefCell::new(Vec::new()));
    let u = Rc::clone(&updates);
    let s = Rc::clone(&samples);
    sim.on_update(move || *u.borrow_mut() += 1);
    sim.on_ups(move |ups| s.borrow_mut().push(ups));

    let t0 = Instant::now();
    sim.start_at(t0).unwrap();
    sim.start_at(t0).unwrap();
    for step in 1..=10 {
        sim.pump(t0 + Duration::from_millis(100 * step)).unwrap();
    }

    assert_eq!(*updates.borrow(), 10);
    assert_eq!(*samples.borrow(), vec![10]);

    sim.stop();
    sim.stop();
    assert_eq!(*samples.borrow(), vec![10, 0]);
    assert_eq!(sim.pump(t0 + Duration::from_secs(5)).unwrap(), Due::default());
    assert_eq!(sim.ticks(), 10);
}
