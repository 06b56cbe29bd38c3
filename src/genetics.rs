use rand::Rng;

use crate::config::{InitialAgentStats, MutationConfig};
use crate::error::Result;

/// The evolvable stats of an agent.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Genetics {
    pub sight: f64,
    pub speed: f64,
    pub reproduce: f64,
}

impl Genetics {
    pub fn sample(ranges: &InitialAgentStats, rng: &mut impl Rng) -> Result<Self> {
        Ok(Genetics {
            sight: ranges.sight.sample("initial_agent_stats.sight", rng)?,
            speed: ranges.speed.sample("initial_agent_stats.speed", rng)?,
            reproduce: ranges
                .reproduce
                .sample("initial_agent_stats.reproduce", rng)?,
        })
    }

    /// Each stat draws its own multiplier.
    pub fn mutate(&self, mutation: &MutationConfig, rng: &mut impl Rng) -> Self {
        Genetics {
            sight: self.sight * mutation_factor(mutation, rng),
            speed: self.speed * mutation_factor(mutation, rng),
            reproduce: self.reproduce * mutation_factor(mutation, rng),
        }
    }
}

/// `1` with probability `1 - chance`, otherwise `1 ± change` with an even sign.
pub fn mutation_factor(mutation: &MutationConfig, rng: &mut impl Rng) -> f64 {
    if !rng.random_bool(mutation.chance) {
        return 1.0;
    }
    let sign = if rng.random_bool(0.5) { 1.0 } else { -1.0 };
    1.0 + sign * mutation.change
}
