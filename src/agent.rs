use crate::config::SimulationConfig;
use crate::food::Food;
use crate::genetics::Genetics;
use crate::render::{RenderHandle, RenderSink};
use crate::sampling::Position;

/// Floor for the distance used to normalise the heading.
const MIN_HEADING_DISTANCE: f64 = 0.0001;

#[derive(Debug, Clone, PartialEq)]
pub struct Agent {
    pub position: Position,
    pub genetics: Genetics,
    pub energy: f64,
    pub handle: RenderHandle,
    /// Tick during which the agent was born, `None` for the initial population.
    pub born_tick: Option<u64>,
}

/// What happened during one foraging step.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ForageOutcome {
    pub moved: bool,
    pub ate: bool,
    /// Eaten food removed from the list during the scan
    pub purged: usize,
}

impl Agent {
    pub fn new(position: Position, genetics: Genetics, energy: f64, handle: RenderHandle) -> Self {
        Agent {
            position,
            genetics,
            energy,
            handle,
            born_tick: None,
        }
    }

    pub fn sight(&self) -> f64 {
        self.genetics.sight
    }

    pub fn speed(&self) -> f64 {
        self.genetics.speed
    }

    pub fn reproduce(&self) -> f64 {
        self.genetics.reproduce
    }

    pub fn is_dead(&self) -> bool {
        self.energy <= 0.0
    }

    /// Scan the food list once, purging eaten food, and head for the nearest
    /// food strictly inside sight.
    pub fn forage(
        &mut self,
        foods: &mut Vec<Food>,
        config: &SimulationConfig,
        sink: &mut impl RenderSink,
    ) -> ForageOutcome {
        let mut outcome = ForageOutcome::default();
        let mut nearest: Option<usize> = None;
        let mut nearest_distance = self.sight();

        let mut i = 0;
        while i < foods.len() {
            if foods[i].eaten {
                let food = foods.remove(i);
                sink.destroy(food.handle);
                outcome.purged += 1;
                continue;
            }

            let distance = self.position.distance(&foods[i].position);
            if distance < nearest_distance {
                nearest = Some(i);
                nearest_distance = distance;
            }
            i += 1;
        }

        let Some(idx) = nearest else {
            return outcome;
        };

        let target = foods[idx].position;
        let denominator = nearest_distance.max(MIN_HEADING_DISTANCE);
        let step = self.speed() * config.speed_multiplier / config.pixels_per_tick;
        self.position.x += (target.x - self.position.x) / denominator * step;
        self.position.y += (target.y - self.position.y) / denominator * step;
        sink.set_position(self.handle, self.position);
        outcome.moved = true;

        // only moving costs energy
        self.energy -=
            self.speed() * config.energy.multipliers.speed / config.tps * config.speed_multiplier;

        let eating_radius = config.sizes.food + config.sizes.agent / 2.0;
        if !foods[idx].eaten && nearest_distance < eating_radius {
            self.energy += config.energy.food;
            foods[idx].eaten = true;
            outcome.ate = true;
        }

        outcome
    }

    /// Passive cost of keeping sight open for one tick.
    pub fn pay_upkeep(&mut self, config: &SimulationConfig) {
        self.energy -= self.sight() * config.energy.multipliers.sight;
    }

    pub fn can_replicate(&self) -> bool {
        self.energy > self.reproduce()
    }
}
