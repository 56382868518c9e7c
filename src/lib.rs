//! # Map Coloring Search Engine
//!
//! A stochastic local-search library for constraint-based map and graph
//! coloring: assign one label per node so that adjacent nodes never share a
//! label, maximizing the number of satisfied adjacency rules.
//!
//! This crate provides:
//! - A canonical, deduplicated rule set derived from delimited adjacency
//!   data, with a position-resolved fitness evaluator.
//! - A strict hill-climbing search driver with single-point mutation,
//!   guarded by cooperative cancellation, iteration and deadline budgets.
//! - A parallel racing mode where independent seeded chains compete for the
//!   first full coloring.
//!
//! ## Quick Start
//!
//! ```
//! use mapcolor::prelude::*;
//!
//! // Path graph A - B - C: two rules, 2-colorable.
//! let map = parse_adjacency("A,B\nB,A;C\nC,B\n").unwrap();
//! let rules = build_rules(&map).unwrap();
//! let index = NodeIndex::from_adjacency(&map);
//! let eval = RuleEvaluator::bind(&rules, &index).unwrap();
//!
//! let alphabet = Alphabet::new(['X', 'Y']).unwrap();
//! let cfg = SearchConfig {
//!     seed: Some(7),
//!     max_iterations: Some(10_000),
//!     ..SearchConfig::default()
//! };
//! let outcome = search(
//!     |genes| eval.fitness(genes),
//!     index.len(),
//!     rules.len(),
//!     &alphabet,
//!     &cfg,
//!     &CancelFlag::new(),
//!     |_| {},
//! )
//! .unwrap();
//!
//! assert!(outcome.reached_target());
//! ```
//!
//! ## Modules
//!
//! - [`adjacency`]: Parsing and loading of node→neighbor-list data.
//! - [`rules`]: Canonical rule set, node index mapping, fitness evaluation.
//! - [`candidate`]: Candidate labelings and the label alphabet.
//! - [`search`]: Hill-climbing engine, guards, and the parallel racing mode.
//! - [`export`]: Palette, progress printing, and map-script output.
//!
//! ## Notes
//!
//! - Strict acceptance means the best-fitness sequence of a run never
//!   decreases; there is no lateral or downhill move.
//! - The search has no intrinsic termination guarantee when the target is
//!   unreachable, so every run takes a cancel flag and optional budgets.
//! - Runs are reproducible: a fixed [`search::SearchConfig::seed`] replays
//!   the exact trajectory.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::module_name_repetitions)]

pub mod adjacency;
pub mod candidate;
pub mod export;
pub mod rules;
pub mod search;

/// Re-export commonly used types for convenience.
pub mod prelude {
    pub use crate::adjacency::{load_adjacency, parse_adjacency, AdjacencyMap, AUSTRALIA_CSV};
    pub use crate::candidate::{Alphabet, Candidate};
    pub use crate::export::{
        map_script, render_assignments, save_map_script, Palette, ProgressPrinter,
    };
    pub use crate::rules::{build_rules, NodeIndex, Rule, RuleEvaluator};
    pub use crate::search::{
        search, search_parallel, CancelFlag, SearchConfig, SearchOutcome, StopReason,
    };
}
