//! Uniform sampling over closed ranges and the 2D coordinate type.
//!
//! Both helpers read `min` as the lower bound. Real sampling is half-open,
//! `[min, max)`; integer sampling is inclusive, `[ceil(min), floor(max)]`.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::config::SurfaceConfig;
use crate::error::{Result, SimError};

/// A point on the render surface.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub fn new(x: f64, y: f64) -> Self {
        Position { x, y }
    }

    pub fn distance(&self, other: &Position) -> f64 {
        let dx = other.x - self.x;
        let dy = other.y - self.y;
        (dx * dx + dy * dy).sqrt()
    }
}

/// Closed numeric range used for initial stats and spawn placement.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NumberRange {
    pub min: f64,
    pub max: f64,
}

impl NumberRange {
    pub fn new(min: f64, max: f64) -> Self {
        NumberRange { min, max }
    }

    pub fn check(&self, name: &'static str) -> Result<()> {
        if !self.min.is_finite() || !self.max.is_finite() || self.min > self.max {
            return Err(SimError::InvertedRange {
                name,
                min: self.min,
                max: self.max,
            });
        }
        Ok(())
    }

    /// Uniform real in `[min, max)`, or exactly `min` for a degenerate range.
    pub fn sample(&self, name: &'static str, rng: &mut impl Rng) -> Result<f64> {
        self.check(name)?;
        if self.min == self.max {
            return Ok(self.min);
        }
        Ok(rng.random_range(self.min..self.max))
    }

    /// Uniform integer in `[ceil(min), floor(max)]`.
    pub fn sample_int(&self, name: &'static str, rng: &mut impl Rng) -> Result<i64> {
        self.check(name)?;
        let low = self.min.ceil() as i64;
        let high = self.max.floor() as i64;
        if low > high {
            // no integer inside, e.g. 0.2..0.8
            return Err(SimError::InvertedRange {
                name,
                min: self.min,
                max: self.max,
            });
        }
        Ok(rng.random_range(low..=high))
    }
}

/// Integer coordinates anywhere on the surface, edges included.
pub fn random_position(surface: &SurfaceConfig, rng: &mut impl Rng) -> Result<Position> {
    let x = NumberRange::new(0.0, surface.width).sample_int("surface.width", rng)?;
    let y = NumberRange::new(0.0, surface.height).sample_int("surface.height", rng)?;
    Ok(Position::new(x as f64, y as f64))
}
