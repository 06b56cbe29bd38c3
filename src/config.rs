//! Tunable parameters of the simulation.
//!
//! Loaded from YAML; every section falls back to its defaults so partial
//! files are accepted.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{Result, SimError};
use crate::sampling::NumberRange;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Ticks per second driven by the scheduler
    pub tps: f64,
    /// Ticks between agent layer redraws
    pub tpr: u64,
    pub starting_agents: usize,
    pub initial_agent_stats: InitialAgentStats,
    pub energy: EnergyConfig,
    pub mutation: MutationConfig,
    pub sizes: SizeConfig,
    pub colors: ColorConfig,
    /// Global time acceleration applied to movement and food spawning
    pub speed_multiplier: f64,
    /// Divisor applied to movement distance
    pub pixels_per_tick: f64,
    pub food_spawning: FoodSpawningConfig,
    pub surface: SurfaceConfig,
    /// Births are suppressed while the population is at this size
    pub max_population: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InitialAgentStats {
    pub sight: NumberRange,
    pub speed: NumberRange,
    pub reproduce: NumberRange,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnergyConfig {
    pub agent_start_energy: f64,
    /// Energy granted per food eaten
    pub food: f64,
    pub multipliers: EnergyMultipliers,
    pub reproduction_cost: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnergyMultipliers {
    pub speed: f64,
    pub sight: f64,
    /// Not consumed by the energy formula.
    pub reproduce: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MutationConfig {
    /// Probability that a single stat mutates at birth
    pub chance: f64,
    /// Magnitude of the multiplier delta
    pub change: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SizeConfig {
    pub food: f64,
    pub agent: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColorConfig {
    pub food: [f32; 4],
    pub agent: AgentColorWeights,
}

/// Per-stat weights used to map an agent's stats to its fill colour.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentColorWeights {
    pub speed: f64,
    pub sight: f64,
    pub reproduce: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FoodSpawningConfig {
    pub ticks_per_spawn: f64,
    pub number_per_spawn: usize,
    pub initial_amount: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SurfaceConfig {
    pub width: f64,
    pub height: f64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            tps: 10.0,
            tpr: 1,
            starting_agents: 100,
            initial_agent_stats: InitialAgentStats::default(),
            energy: EnergyConfig::default(),
            mutation: MutationConfig::default(),
            sizes: SizeConfig::default(),
            colors: ColorConfig::default(),
            speed_multiplier: 1.0,
            pixels_per_tick: 10.0,
            food_spawning: FoodSpawningConfig::default(),
            surface: SurfaceConfig::default(),
            max_population: 50_000,
        }
    }
}

impl Default for InitialAgentStats {
    fn default() -> Self {
        Self {
            sight: NumberRange::new(100.0, 200.0),
            speed: NumberRange::new(10.0, 20.0),
            reproduce: NumberRange::new(100.0, 200.0),
        }
    }
}

impl Default for EnergyConfig {
    fn default() -> Self {
        Self {
            agent_start_energy: 10.0,
            food: 10.0,
            multipliers: EnergyMultipliers::default(),
            reproduction_cost: 50.0,
        }
    }
}

impl Default for EnergyMultipliers {
    fn default() -> Self {
        Self {
            speed: 0.1,
            sight: 0.005,
            reproduce: 1.0,
        }
    }
}

impl Default for MutationConfig {
    fn default() -> Self {
        Self {
            chance: 0.75,
            change: 0.1,
        }
    }
}

impl Default for SizeConfig {
    fn default() -> Self {
        Self {
            food: 10.0,
            agent: 10.0,
        }
    }
}

impl Default for ColorConfig {
    fn default() -> Self {
        Self {
            food: [0.0, 0.5, 0.0, 1.0],
            agent: AgentColorWeights::default(),
        }
    }
}

impl Default for AgentColorWeights {
    fn default() -> Self {
        Self {
            speed: 1.0,
            sight: 1.0,
            reproduce: 1.0,
        }
    }
}

impl Default for FoodSpawningConfig {
    fn default() -> Self {
        Self {
            ticks_per_spawn: 10.0,
            number_per_spawn: 10,
            initial_amount: 500,
        }
    }
}

impl Default for SurfaceConfig {
    fn default() -> Self {
        Self {
            width: 800.0,
            height: 800.0,
        }
    }
}

impl SimulationConfig {
    /// Load configuration from a YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: SimulationConfig = serde_yaml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a YAML file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        std::fs::write(path, self.to_yaml()?)?;
        Ok(())
    }

    pub fn to_yaml(&self) -> Result<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    pub fn validate_tps(&self) -> Result<()> {
        if !self.tps.is_finite() || self.tps <= 0.0 {
            return Err(SimError::InvalidTps(self.tps));
        }
        Ok(())
    }

    /// Check the values read while populating the world.
    pub fn validate_population(&self) -> Result<()> {
        self.initial_agent_stats.sight.check("initial_agent_stats.sight")?;
        self.initial_agent_stats.speed.check("initial_agent_stats.speed")?;
        self.initial_agent_stats
            .reproduce
            .check("initial_agent_stats.reproduce")?;
        self.validate_surface()
    }

    /// Check the bounds used to place spawned food.
    pub fn validate_surface(&self) -> Result<()> {
        positive("surface.width", self.surface.width)?;
        positive("surface.height", self.surface.height)?;
        Ok(())
    }

    /// Check the values read during a tick.
    pub fn validate_tick(&self) -> Result<()> {
        self.validate_tps()?;
        if self.tpr == 0 {
            return Err(SimError::InvalidParameter {
                name: "tpr",
                value: 0.0,
            });
        }
        positive("pixels_per_tick", self.pixels_per_tick)?;
        non_negative("sizes.food", self.sizes.food)?;
        non_negative("sizes.agent", self.sizes.agent)?;
        non_negative("speed_multiplier", self.speed_multiplier)?;
        if !(0.0..=1.0).contains(&self.mutation.chance) {
            return Err(SimError::InvalidParameter {
                name: "mutation.chance",
                value: self.mutation.chance,
            });
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        self.validate_population()?;
        self.validate_tick()
    }
}

fn positive(name: &'static str, value: f64) -> Result<()> {
    if !value.is_finite() || value <= 0.0 {
        return Err(SimError::InvalidParameter { name, value });
    }
    Ok(())
}

fn non_negative(name: &'static str, value: f64) -> Result<()> {
    if !value.is_finite() || value < 0.0 {
        return Err(SimError::InvalidParameter { name, value });
    }
    Ok(())
}
