use std::time::Duration;

use crate::genetics::Genetics;

/// Min, max and average of one stat over a tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StatSummary {
    pub min: Option<f64>,
    pub max: Option<f64>,
    /// NaN when the population is empty
    pub average: f64,
}

impl Default for StatSummary {
    fn default() -> Self {
        StatSummary {
            min: None,
            max: None,
            average: f64::NAN,
        }
    }
}

/// Per-stat accumulator used while walking the agent list.
#[derive(Debug, Clone, Copy, Default)]
struct StatAccumulator {
    min: Option<f64>,
    max: Option<f64>,
    total: f64,
}

impl StatAccumulator {
    fn observe(&mut self, value: f64) {
        self.min = Some(self.min.map_or(value, |m| m.min(value)));
        self.max = Some(self.max.map_or(value, |m| m.max(value)));
    }

    fn summary(&self, survivors: usize) -> StatSummary {
        StatSummary {
            min: self.min,
            max: self.max,
            average: self.total / survivors as f64,
        }
    }
}

/// Running aggregates for the tick in progress, rebuilt from scratch every tick.
#[derive(Debug, Clone, Default)]
pub struct TickAggregator {
    sight: StatAccumulator,
    speed: StatAccumulator,
    reproduce: StatAccumulator,
}

impl TickAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold into the running min and max.
    pub fn observe(&mut self, genetics: &Genetics) {
        self.sight.observe(genetics.sight);
        self.speed.observe(genetics.speed);
        self.reproduce.observe(genetics.reproduce);
    }

    /// Fold a surviving agent into the totals used for averages.
    pub fn add_survivor(&mut self, genetics: &Genetics) {
        self.sight.total += genetics.sight;
        self.speed.total += genetics.speed;
        self.reproduce.total += genetics.reproduce;
    }

    pub fn finish(&self, agents: usize, foods: usize) -> PopulationStats {
        PopulationStats {
            agents,
            foods,
            sight: self.sight.summary(agents),
            speed: self.speed.summary(agents),
            reproduce: self.reproduce.summary(agents),
        }
    }
}

/// Aggregate statistics from the most recent tick.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PopulationStats {
    pub agents: usize,
    pub foods: usize,
    pub sight: StatSummary,
    pub speed: StatSummary,
    pub reproduce: StatSummary,
}

impl PopulationStats {
    pub fn summary(&self) -> String {
        format!(
            "agents={} food={} sight={:.2} speed={:.2} reproduce={:.2}",
            self.agents,
            self.foods,
            self.sight.average,
            self.speed.average,
            self.reproduce.average
        )
    }
}

/// Side effects of a single tick.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TickReport {
    pub tick: u64,
    pub births: usize,
    pub deaths: usize,
    pub food_spawned: usize,
    pub food_purged: usize,
    pub food_eaten: usize,
    pub duration: Duration,
}

/// Counters over the lifetime of a run; cleared on reset.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SimulationStats {
    pub total_births: usize,
    pub total_deaths: usize,
    pub max_population: usize,
    pub food_eaten: usize,
}

impl SimulationStats {
    pub fn record(&mut self, report: &TickReport, population: usize) {
        self.total_births += report.births;
        self.total_deaths += report.deaths;
        self.food_eaten += report.food_eaten;
        self.max_population = self.max_population.max(population);
    }
}
