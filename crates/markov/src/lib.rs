//! Discrete-time Markov chains with regime changes.
//!
//! This crate models how a member of a population moves between a finite
//! set of states. A timeline may be split into successive regimes
//! (segments), each with its own column-stochastic transition matrix, and
//! joined either by explicit inter-segment matrices or by a
//! percentile-preserving ordinal mapping.
//!
//! # Pipeline
//!
//! ```text
//!  ┌──────────────┐     ┌────────────────┐     ┌──────────────────┐
//!  │ MarkovModel   │────▶│ Stitched        │────▶│ Scheduled         │
//!  │ (one regime)  │     │ (time index)    │     │ (calendar date)   │
//!  └──────────────┘     └────────────────┘     └──────────────────┘
//!          │                     │
//!          ▼                     ▼
//!  adjust_probabilities   ordinal_mapping, state-distribution cache
//! ```
//!
//! Every draw takes a caller-supplied uniform in `[0, 1]` and is
//! deterministic given that draw.
//!
//! # Quick start
//!
//! ```rust
//! use ndarray::array;
//! use regime_markov::StitchedMarkovModel;
//!
//! // Two regimes: sticky for 5 steps, then mixing.
//! let mut model = StitchedMarkovModel::ordinal(
//!     vec![array![0.9, 0.1], array![0.5, 0.5]],
//!     vec![array![[0.95, 0.1], [0.05, 0.9]], array![[0.5, 0.5], [0.5, 0.5]]],
//!     vec![5],
//! )
//! .unwrap();
//! model.precalculate_state_distributions(10);
//!
//! let state = model.draw_initial_state(0.3).unwrap();
//! let (next, percentile) = model.draw_next_state_and_percentile(state, 0, 0.3).unwrap();
//! assert!(next < model.dim());
//! assert!((0.0..=1.0).contains(&percentile));
//! ```

mod cache;
pub mod cdf;
pub mod error;
pub mod model;
pub mod ordinal;
pub mod risk;
pub mod scheduled;
pub mod simulate;
pub mod stitched;
mod validate;

pub use cdf::{cumulative, cumulative_columns, select_index};
pub use error::MarkovError;
pub use model::MarkovModel;
pub use ordinal::ordinal_mapping;
pub use risk::adjust_probabilities;
pub use scheduled::ScheduledStitchedMarkovModel;
pub use simulate::{simulate_states, simulate_states_into};
pub use stitched::{StitchedMarkovModel, Time};
pub use validate::PROBABILITY_TOLERANCE;
