//! Depletion simulation.

pub mod depletion;

pub use depletion::{
    DepletionOutcome, DepletionSimulator, SimulationStatus, DEFAULT_MAX_EXTRA_ITERATIONS,
};
