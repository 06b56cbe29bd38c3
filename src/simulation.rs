//! The simulation engine: owns agents and food, runs ticks, and drives the
//! scheduler on behalf of its host.

use std::time::{Duration, Instant};

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::agent::Agent;
use crate::config::{AgentColorWeights, SimulationConfig};
use crate::error::Result;
use crate::food::Food;
use crate::genetics::Genetics;
use crate::render::{RenderSink, agent_color};
use crate::sampling::{Position, random_position};
use crate::scheduler::{Due, Scheduler, ThroughputWindow};
use crate::simulation_stats::{PopulationStats, SimulationStats, TickAggregator, TickReport};

type UpdateHook = Box<dyn FnMut()>;
type UpsHook = Box<dyn FnMut(u32)>;

pub struct Simulation<S: RenderSink> {
    config: SimulationConfig,
    sink: S,
    rng: ChaCha8Rng,
    seed: u64,

    agents: Vec<Agent>,
    foods: Vec<Food>,
    food_timer: f64,
    ticks: u64,

    stats: PopulationStats,
    lifetime: SimulationStats,
    last_report: TickReport,

    scheduler: Scheduler,
    throughput: ThroughputWindow,
    // values the timers and fills were last built from
    applied_tps: f64,
    applied_colors: AgentColorWeights,

    on_update: Option<UpdateHook>,
    on_ups: Option<UpsHook>,
}

impl<S: RenderSink> Simulation<S> {
    /// Create and populate a simulation with a random seed.
    pub fn new(config: SimulationConfig, sink: S) -> Result<Self> {
        let seed = rand::rng().random();
        Self::with_seed(config, sink, seed)
    }

    /// Create and populate a simulation with a specific seed for reproducibility.
    pub fn with_seed(config: SimulationConfig, sink: S, seed: u64) -> Result<Self> {
        let applied_tps = config.tps;
        let applied_colors = config.colors.agent;
        let mut sim = Simulation {
            config,
            sink,
            rng: ChaCha8Rng::seed_from_u64(seed),
            seed,
            agents: Vec::new(),
            foods: Vec::new(),
            food_timer: 0.0,
            ticks: 0,
            stats: PopulationStats::default(),
            lifetime: SimulationStats::default(),
            last_report: TickReport::default(),
            scheduler: Scheduler::new(),
            throughput: ThroughputWindow::new(),
            applied_tps,
            applied_colors,
            on_update: None,
            on_ups: None,
        };
        sim.initialize()?;
        Ok(sim)
    }

    /// Populate agents and food up to their configured starting counts.
    pub fn initialize(&mut self) -> Result<()> {
        self.config.validate_population()?;

        while self.agents.len() < self.config.starting_agents {
            let position = random_position(&self.config.surface, &mut self.rng)?;
            let genetics = Genetics::sample(&self.config.initial_agent_stats, &mut self.rng)?;
            let agent = self.new_agent(position, genetics);
            self.agents.push(agent);
        }
        while self.foods.len() < self.config.food_spawning.initial_amount {
            self.spawn_food()?;
        }

        self.refresh_stats();
        self.lifetime.max_population = self.lifetime.max_population.max(self.agents.len());
        log::info!(
            "Initialized: agents={} food={}",
            self.agents.len(),
            self.foods.len()
        );
        Ok(())
    }

    /// Clear both collections and regenerate the initial populations.
    pub fn reset(&mut self) -> Result<()> {
        self.config.validate_population()?;
        for agent in self.agents.drain(..) {
            self.sink.destroy(agent.handle);
        }
        for food in self.foods.drain(..) {
            self.sink.destroy(food.handle);
        }
        self.food_timer = 0.0;
        self.ticks = 0;
        self.lifetime = SimulationStats::default();
        self.last_report = TickReport::default();
        self.initialize()?;
        self.sink.redraw_food();
        self.sink.redraw_agents();
        log::info!("Simulation reset");
        Ok(())
    }

    pub fn start(&mut self) -> Result<()> {
        self.start_at(Instant::now())
    }

    /// Start both timers, counting from `now`. No-op when already running.
    pub fn start_at(&mut self, now: Instant) -> Result<()> {
        if self.is_running() {
            return Ok(());
        }
        self.scheduler.start(self.config.tps, now)?;
        self.applied_tps = self.config.tps;
        log::info!("Simulation started at {} tps", self.config.tps);
        Ok(())
    }

    /// Stop both timers. No further callbacks fire until the next start.
    pub fn stop(&mut self) {
        if !self.scheduler.stop() {
            return;
        }
        self.throughput.clear();
        if let Some(hook) = self.on_ups.as_mut() {
            hook(0);
        }
        log::info!("Simulation stopped at tick {}", self.ticks);
    }

    /// Fire whichever timers are due at `now`.
    ///
    /// Errors from a tick are returned so the host can stop the timers.
    pub fn pump(&mut self, now: Instant) -> Result<Due> {
        if !self.is_running() {
            return Ok(Due::default());
        }
        self.apply_config_changes(now)?;

        let due = self.scheduler.poll(now);
        if due.tick {
            self.tick()?;
        }
        if due.sample {
            self.sample_throughput();
        }
        Ok(due)
    }

    /// Change the tick rate, restarting the timers when running.
    pub fn set_tps(&mut self, tps: f64) -> Result<()> {
        crate::scheduler::tick_period(tps)?;
        self.config.tps = tps;
        self.restart_timers(Instant::now())
    }

    /// Change the stat-to-colour weights and recolour every live agent.
    pub fn set_agent_colors(&mut self, weights: AgentColorWeights) {
        self.config.colors.agent = weights;
        self.recolor_agents();
    }

    pub fn recolor_agents(&mut self) {
        let weights = self.config.colors.agent;
        for agent in &self.agents {
            self.sink
                .set_fill(agent.handle, agent_color(&agent.genetics, &weights));
        }
        self.applied_colors = weights;
    }

    /// Advance the simulation by one step.
    pub fn tick(&mut self) -> Result<TickReport> {
        let started = Instant::now();
        self.config.validate_tick()?;
        self.config.validate_surface()?;
        if self.config.colors.agent != self.applied_colors {
            self.recolor_agents();
        }

        let tick = self.ticks;
        let mut report = TickReport {
            tick,
            ..Default::default()
        };

        // nobody scans the food list this tick, so sweep it here
        if self.agents.is_empty() {
            report.food_purged += self.sweep_eaten_food();
        }

        self.food_timer += self.config.speed_multiplier;
        if self.food_timer >= self.config.food_spawning.ticks_per_spawn {
            for _ in 0..self.config.food_spawning.number_per_spawn {
                self.spawn_food()?;
            }
            report.food_spawned = self.config.food_spawning.number_per_spawn;
            self.food_timer = 0.0;
        }

        let mut aggregate = TickAggregator::new();
        let mut i = 0;
        while i < self.agents.len() {
            aggregate.observe(&self.agents[i].genetics);

            // newborns are counted but do not forage in their birth tick
            if self.agents[i].born_tick != Some(tick) {
                let outcome = self.agents[i].forage(&mut self.foods, &self.config, &mut self.sink);
                report.food_purged += outcome.purged;
                if outcome.ate {
                    report.food_eaten += 1;
                }
            }

            self.agents[i].pay_upkeep(&self.config);

            if self.agents.len() < self.config.max_population && self.agents[i].can_replicate() {
                let parent = &self.agents[i];
                let position = parent.position;
                let genetics = parent.genetics.mutate(&self.config.mutation, &mut self.rng);
                let mut child = self.new_agent(position, genetics);
                child.born_tick = Some(tick);
                aggregate.observe(&child.genetics);
                self.agents.push(child);
                self.agents[i].energy -= self.config.energy.reproduction_cost;
                report.births += 1;
            }

            if self.agents[i].is_dead() {
                let dead = self.agents.remove(i);
                self.sink.destroy(dead.handle);
                report.deaths += 1;
                continue;
            }

            aggregate.add_survivor(&self.agents[i].genetics);
            i += 1;
        }

        self.stats = aggregate.finish(self.agents.len(), self.foods.len());

        if report.food_spawned > 0 || report.food_purged > 0 {
            self.sink.redraw_food();
        }
        if tick % self.config.tpr == 0 {
            self.sink.redraw_agents();
        }

        report.duration = started.elapsed();
        self.ticks += 1;
        self.throughput.count_update();
        self.lifetime.record(&report, self.agents.len());
        self.last_report = report;

        log::debug!("tick {}: {}", tick, self.stats.summary());
        if report.deaths > 0 && self.agents.is_empty() {
            log::warn!("Population extinct at tick {}", tick);
        }

        if let Some(hook) = self.on_update.as_mut() {
            hook();
        }
        Ok(report)
    }

    /// Place an agent of the initial kind at an exact position.
    pub fn spawn_agent_at(&mut self, position: Position, genetics: Genetics) -> usize {
        let agent = self.new_agent(position, genetics);
        self.agents.push(agent);
        self.agents.len() - 1
    }

    pub fn spawn_food_at(&mut self, position: Position) -> usize {
        let handle = self.sink.create_food(
            position,
            self.config.sizes.food,
            self.config.colors.food,
        );
        self.foods.push(Food::new(position, handle));
        self.foods.len() - 1
    }

    pub fn on_update(&mut self, hook: impl FnMut() + 'static) {
        self.on_update = Some(Box::new(hook));
    }

    pub fn on_ups(&mut self, hook: impl FnMut(u32) + 'static) {
        self.on_ups = Some(Box::new(hook));
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// Tick rate and colour changes made here are applied on the next pump or tick.
    pub fn config_mut(&mut self) -> &mut SimulationConfig {
        &mut self.config
    }

    pub fn agents(&self) -> &[Agent] {
        &self.agents
    }

    pub fn agents_mut(&mut self) -> &mut [Agent] {
        &mut self.agents
    }

    pub fn foods(&self) -> &[Food] {
        &self.foods
    }

    pub fn number_of_agents(&self) -> usize {
        self.agents.len()
    }

    pub fn number_of_foods(&self) -> usize {
        self.foods.len()
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn last_tick_duration(&self) -> Duration {
        self.last_report.duration
    }

    pub fn is_running(&self) -> bool {
        self.scheduler.is_running()
    }

    pub fn stats(&self) -> &PopulationStats {
        &self.stats
    }

    pub fn lifetime(&self) -> &SimulationStats {
        &self.lifetime
    }

    pub fn last_report(&self) -> &TickReport {
        &self.last_report
    }

    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    fn apply_config_changes(&mut self, now: Instant) -> Result<()> {
        if self.config.tps != self.applied_tps {
            self.restart_timers(now)?;
        }
        if self.config.colors.agent != self.applied_colors {
            self.recolor_agents();
        }
        Ok(())
    }

    fn restart_timers(&mut self, now: Instant) -> Result<()> {
        if self.is_running() {
            self.scheduler.restart(self.config.tps, now)?;
            self.throughput.clear();
            if let Some(hook) = self.on_ups.as_mut() {
                hook(0);
            }
            log::info!("Tick rate changed to {} tps", self.config.tps);
        }
        self.applied_tps = self.config.tps;
        Ok(())
    }

    fn sample_throughput(&mut self) {
        if let Some(ups) = self.throughput.sample() {
            log::debug!("ups={}", ups);
            if let Some(hook) = self.on_ups.as_mut() {
                hook(ups);
            }
        }
    }

    fn new_agent(&mut self, position: Position, genetics: Genetics) -> Agent {
        let fill = agent_color(&genetics, &self.config.colors.agent);
        let handle = self
            .sink
            .create_agent(position, self.config.sizes.agent / 2.0, fill);
        Agent::new(
            position,
            genetics,
            self.config.energy.agent_start_energy,
            handle,
        )
    }

    fn spawn_food(&mut self) -> Result<()> {
        let position = random_position(&self.config.surface, &mut self.rng)?;
        self.spawn_food_at(position);
        Ok(())
    }

    fn sweep_eaten_food(&mut self) -> usize {
        let before = self.foods.len();
        let sink = &mut self.sink;
        self.foods.retain(|food| {
            if food.eaten {
                sink.destroy(food.handle);
            }
            !food.eaten
        });
        before - self.foods.len()
    }

    fn refresh_stats(&mut self) {
        let mut aggregate = TickAggregator::new();
        for agent in &self.agents {
            aggregate.observe(&agent.genetics);
            aggregate.add_survivor(&agent.genetics);
        }
        self.stats = aggregate.finish(self.agents.len(), self.foods.len());
    }
}
