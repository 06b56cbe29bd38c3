//! # forage-sim
//!
//! A predator-free evolutionary foraging simulation. Agents spend energy to
//! see and move, eat spawning food, reproduce with mutated stats once their
//! energy passes a threshold, and die when it runs out.
//!
//! ```rust,no_run
//! use forage_sim::{HeadlessSink, Simulation, SimulationConfig};
//!
//! let mut sim = Simulation::with_seed(SimulationConfig::default(), HeadlessSink::new(), 42)?;
//! for _ in 0..100 {
//!     sim.tick()?;
//! }
//! println!("{}", sim.stats().summary());
//! # Ok::<(), forage_sim::SimError>(())
//! ```
//!
//! Hosts that want real time call [`Simulation::start`] and then
//! [`Simulation::pump`] from their event loop.

pub mod agent;
pub mod config;
pub mod error;
pub mod food;
pub mod genetics;
pub mod render;
pub mod sampling;
pub mod scheduler;
pub mod series;
pub mod simulation;
pub mod simulation_stats;

pub use agent::Agent;
pub use config::SimulationConfig;
pub use error::{Result, SimError};
pub use food::Food;
pub use genetics::Genetics;
pub use render::{HeadlessSink, RenderHandle, RenderSink};
pub use sampling::{NumberRange, Position};
pub use simulation::Simulation;
pub use simulation_stats::{PopulationStats, StatSummary, TickReport};
