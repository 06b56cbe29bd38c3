//! Time series recorder for plotting hosts.
//!
//! A sample is only accepted when it carries a value for every declared
//! label; partial rows are never stored.

use std::collections::HashMap;
use std::io::Write;

use crate::error::{Result, SimError};
use crate::simulation_stats::PopulationStats;

#[derive(Debug, Clone, PartialEq)]
pub struct SeriesLog {
    labels: Vec<String>,
    rows: Vec<Vec<f64>>,
}

impl SeriesLog {
    pub fn new<I, L>(labels: I) -> Self
    where
        I: IntoIterator<Item = L>,
        L: Into<String>,
    {
        SeriesLog {
            labels: labels.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
        }
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    pub fn rows(&self) -> &[Vec<f64>] {
        &self.rows
    }

    pub fn add(&mut self, sample: &HashMap<String, f64>) -> Result<()> {
        let row = self
            .labels
            .iter()
            .map(|label| {
                sample
                    .get(label)
                    .copied()
                    .ok_or_else(|| SimError::MissingSeries(label.clone()))
            })
            .collect::<Result<Vec<f64>>>()?;
        self.rows.push(row);
        Ok(())
    }

    pub fn reset(&mut self) {
        self.rows.clear();
    }

    pub fn write_csv<W: Write>(&self, mut out: W) -> Result<()> {
        writeln!(out, "{}", self.labels.join(","))?;
        for row in &self.rows {
            let line: Vec<String> = row.iter().map(|v| v.to_string()).collect();
            writeln!(out, "{}", line.join(","))?;
        }
        Ok(())
    }
}

/// Labels produced by [`population_sample`].
pub const POPULATION_LABELS: [&str; 5] = ["agents", "food", "sight", "speed", "reproduce"];

pub fn population_sample(stats: &PopulationStats) -> HashMap<String, f64> {
    HashMap::from([
        ("agents".to_string(), stats.agents as f64),
        ("food".to_string(), stats.foods as f64),
        ("sight".to_string(), stats.sight.average),
        ("speed".to_string(), stats.speed.average),
        ("reproduce".to_string(), stats.reproduce.average),
    ])
}
