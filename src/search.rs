//! Stochastic hill-climbing search over candidate labelings.
//!
//! The engine generates one random parent, then repeatedly applies a
//! single-position mutation, keeping a child only when its fitness strictly
//! improves on the current best. The accepted-fitness sequence is therefore
//! monotonically increasing, and the run ends the first time a candidate
//! reaches the target fitness. The raw loop has no intrinsic termination
//! guarantee, so every run is guarded by a cooperative cancel flag plus
//! optional iteration and deadline budgets, checked once per iteration.

use crate::candidate::{Alphabet, Candidate};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

// ============================================================================
// Configuration
// ============================================================================

/// Search run parameters.
#[derive(Clone, Debug)]
pub struct SearchConfig {
    /// Deterministic base seed. `None` draws one from OS entropy.
    pub seed: Option<u64>,
    /// Maximum mutation attempts per chain before aborting.
    pub max_iterations: Option<u64>,
    /// Wall-clock budget for the run.
    pub deadline: Option<Duration>,
    /// Number of independent chains raced by [`search_parallel`].
    pub chains: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            seed: None,
            max_iterations: None,
            deadline: None,
            chains: 1,
        }
    }
}

// ============================================================================
// Cancellation
// ============================================================================

/// Shared cooperative cancellation flag.
///
/// Cloning is cheap and all clones observe the same flag. The engine checks
/// it once per iteration, so cancellation takes effect within one mutation
/// attempt.
#[derive(Clone, Debug, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    /// Creates a flag in the "keep running" state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests cancellation of every chain watching this flag.
    #[inline]
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    /// Returns whether cancellation has been requested.
    #[inline]
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

// ============================================================================
// Outcomes
// ============================================================================

/// Which guard stopped a run short of the target.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StopReason {
    /// The cancel flag was raised.
    Cancelled,
    /// The iteration budget ran out.
    IterationBudget,
    /// The deadline passed.
    Deadline,
}

impl fmt::Display for StopReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StopReason::Cancelled => write!(f, "cancelled"),
            StopReason::IterationBudget => write!(f, "iteration budget exhausted"),
            StopReason::Deadline => write!(f, "deadline passed"),
        }
    }
}

/// The result of a search run.
///
/// Non-convergence is a distinct outcome, never an error: the best candidate
/// found so far is always carried out of the run.
#[derive(Clone, Debug)]
pub enum SearchOutcome {
    /// A candidate reached the target fitness.
    ReachedTarget {
        /// The first candidate whose fitness reached the target.
        best: Candidate,
        /// Mutation attempts performed (0 if the initial parent qualified).
        iterations: u64,
    },
    /// A guard tripped first; the search did not reach the target.
    Aborted {
        /// Best candidate found before the guard tripped.
        best: Candidate,
        /// Mutation attempts performed.
        iterations: u64,
        /// Which guard stopped the run.
        reason: StopReason,
    },
}

impl SearchOutcome {
    /// The best candidate of the run, converged or not.
    pub fn best(&self) -> &Candidate {
        match self {
            SearchOutcome::ReachedTarget { best, .. } | SearchOutcome::Aborted { best, .. } => best,
        }
    }

    /// Consumes the outcome, returning the best candidate.
    pub fn into_best(self) -> Candidate {
        match self {
            SearchOutcome::ReachedTarget { best, .. } | SearchOutcome::Aborted { best, .. } => best,
        }
    }

    /// Returns whether the target fitness was reached.
    pub fn reached_target(&self) -> bool {
        matches!(self, SearchOutcome::ReachedTarget { .. })
    }

    /// Mutation attempts performed during the run.
    pub fn iterations(&self) -> u64 {
        match self {
            SearchOutcome::ReachedTarget { iterations, .. }
            | SearchOutcome::Aborted { iterations, .. } => *iterations,
        }
    }
}

// ============================================================================
// Errors
// ============================================================================

/// Configuration errors detected before any search work starts.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SearchError {
    /// The candidate length is zero.
    ZeroLength,
    /// A parallel run was requested with zero chains.
    ZeroChains,
}

impl fmt::Display for SearchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SearchError::ZeroLength => write!(f, "candidate length must be greater than zero"),
            SearchError::ZeroChains => write!(f, "parallel search needs at least one chain"),
        }
    }
}

impl std::error::Error for SearchError {}

// ============================================================================
// Public API
// ============================================================================

/// Runs a single hill-climbing chain.
///
/// `fitness` must be a pure, deterministic function of the label sequence.
/// `on_progress` is invoked for the initial parent and for every accepted
/// child. Returns the first candidate whose fitness reaches
/// `target_fitness`, or a [`SearchOutcome::Aborted`] carrying the best
/// candidate found when a guard trips first.
///
/// # Errors
/// Returns [`SearchError::ZeroLength`] if `length` is zero. The alphabet
/// precondition (at least two symbols) is enforced by [`Alphabet`]
/// construction.
pub fn search<F, P>(
    fitness: F,
    length: usize,
    target_fitness: usize,
    alphabet: &Alphabet,
    cfg: &SearchConfig,
    cancel: &CancelFlag,
    mut on_progress: P,
) -> Result<SearchOutcome, SearchError>
where
    F: Fn(&[char]) -> usize,
    P: FnMut(&Candidate),
{
    if length == 0 {
        return Err(SearchError::ZeroLength);
    }

    let seed = cfg.seed.unwrap_or_else(random_u64);
    let mut rng = SmallRng::seed_from_u64(seed);
    let guards = Guards {
        cancel,
        race: None,
        deadline: cfg.deadline.map(|d| Instant::now() + d),
        max_iterations: cfg.max_iterations,
    };

    Ok(run_chain(
        &mut rng,
        &fitness,
        length,
        target_fitness,
        alphabet,
        &guards,
        &mut on_progress,
    ))
}

/// Races `cfg.chains` independent chains and returns the winning outcome.
///
/// Each chain owns a `SmallRng` seeded with `splitmix64(base ^ chain_id)`,
/// so trajectories are uncorrelated but reproducible from one base seed.
/// The first chain to reach the target raises an internal flag that cancels
/// the rest. If every chain aborts, the best candidate across chains is
/// returned. `on_progress` fires from chain 0 only.
///
/// # Errors
/// Returns [`SearchError::ZeroLength`] if `length` is zero, or
/// [`SearchError::ZeroChains`] if `cfg.chains` is zero.
pub fn search_parallel<F, P>(
    fitness: F,
    length: usize,
    target_fitness: usize,
    alphabet: &Alphabet,
    cfg: &SearchConfig,
    cancel: &CancelFlag,
    on_progress: P,
) -> Result<SearchOutcome, SearchError>
where
    F: Fn(&[char]) -> usize + Sync,
    P: FnMut(&Candidate) + Send,
{
    if length == 0 {
        return Err(SearchError::ZeroLength);
    }
    if cfg.chains == 0 {
        return Err(SearchError::ZeroChains);
    }

    let base_seed = cfg.seed.unwrap_or_else(random_u64);
    let deadline = cfg.deadline.map(|d| Instant::now() + d);
    let race = CancelFlag::new();
    let progress = Mutex::new(on_progress);

    let outcomes: Vec<SearchOutcome> = (0..cfg.chains)
        .into_par_iter()
        .map(|chain_id| {
            let mut rng = SmallRng::seed_from_u64(splitmix64(base_seed ^ chain_id as u64));
            let guards = Guards {
                cancel,
                race: Some(&race),
                deadline,
                max_iterations: cfg.max_iterations,
            };
            let mut report = |candidate: &Candidate| {
                if chain_id == 0 {
                    if let Ok(mut callback) = progress.lock() {
                        callback(candidate);
                    }
                }
            };
            let outcome = run_chain(
                &mut rng,
                &fitness,
                length,
                target_fitness,
                alphabet,
                &guards,
                &mut report,
            );
            if outcome.reached_target() {
                race.cancel();
            }
            outcome
        })
        .collect();

    // A chain that reached the target always beats one that aborted; ties
    // resolve to the higher fitness.
    let mut outcomes = outcomes.into_iter();
    let Some(mut result) = outcomes.next() else {
        return Err(SearchError::ZeroChains);
    };
    for outcome in outcomes {
        let better = (outcome.reached_target(), outcome.best().fitness())
            > (result.reached_target(), result.best().fitness());
        if better {
            result = outcome;
        }
    }
    Ok(result)
}

// ============================================================================
// Chain internals
// ============================================================================

/// Per-iteration stop conditions, checked at the top of the loop.
struct Guards<'a> {
    cancel: &'a CancelFlag,
    race: Option<&'a CancelFlag>,
    deadline: Option<Instant>,
    max_iterations: Option<u64>,
}

impl Guards<'_> {
    #[inline]
    fn check(&self, iterations: u64) -> Option<StopReason> {
        if self.cancel.is_cancelled() || self.race.is_some_and(CancelFlag::is_cancelled) {
            return Some(StopReason::Cancelled);
        }
        if let Some(deadline) = self.deadline {
            if Instant::now() >= deadline {
                return Some(StopReason::Deadline);
            }
        }
        if let Some(limit) = self.max_iterations {
            if iterations >= limit {
                return Some(StopReason::IterationBudget);
            }
        }
        None
    }
}

#[allow(clippy::too_many_arguments)]
fn run_chain<R, F, P>(
    rng: &mut R,
    fitness: &F,
    length: usize,
    target_fitness: usize,
    alphabet: &Alphabet,
    guards: &Guards<'_>,
    on_progress: &mut P,
) -> SearchOutcome
where
    R: Rng,
    F: Fn(&[char]) -> usize,
    P: FnMut(&Candidate),
{
    let mut best = generate_parent(rng, length, alphabet, fitness);
    on_progress(&best);
    if best.fitness() >= target_fitness {
        return SearchOutcome::ReachedTarget {
            best,
            iterations: 0,
        };
    }

    let mut iterations: u64 = 0;
    loop {
        if let Some(reason) = guards.check(iterations) {
            return SearchOutcome::Aborted {
                best,
                iterations,
                reason,
            };
        }
        iterations += 1;

        let child = mutate(rng, &best, alphabet, fitness);
        if child.fitness() <= best.fitness() {
            continue;
        }
        on_progress(&child);
        if child.fitness() >= target_fitness {
            return SearchOutcome::ReachedTarget {
                best: child,
                iterations,
            };
        }
        best = child;
    }
}

/// Fills a fresh gene sequence batch by batch: each batch draws up to
/// alphabet-size symbols without repetition, until `length` genes are
/// placed.
fn generate_parent<R, F>(rng: &mut R, length: usize, alphabet: &Alphabet, fitness: &F) -> Candidate
where
    R: Rng,
    F: Fn(&[char]) -> usize,
{
    debug_assert!(length > 0);
    let mut genes = Vec::with_capacity(length);
    while genes.len() < length {
        let take = (length - genes.len()).min(alphabet.len());
        alphabet.sample_batch(rng, take, &mut genes);
    }
    let score = fitness(&genes);
    Candidate::new(genes, score)
}

/// Replaces the label at one uniformly random position.
///
/// Two distinct labels are sampled; the second is used iff the first equals
/// the current label, so the mutated position always actually changes.
fn mutate<R, F>(rng: &mut R, parent: &Candidate, alphabet: &Alphabet, fitness: &F) -> Candidate
where
    R: Rng,
    F: Fn(&[char]) -> usize,
{
    let mut genes = parent.genes().to_vec();
    let position = rng.random_range(0..genes.len());
    let (first, second) = alphabet.sample_two_distinct(rng);
    genes[position] = if first == genes[position] { second } else { first };
    let score = fitness(&genes);
    Candidate::new(genes, score)
}

fn random_u64() -> u64 {
    rand::random::<u64>()
}

/// SplitMix64 mixer for deriving per-chain seeds from a base seed.
#[inline]
fn splitmix64(mut x: u64) -> u64 {
    x = x.wrapping_add(0x9E37_79B9_7F4A_7C15);
    let mut z = x;
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

// ============================================================================
// Tests
// ============================================================================
