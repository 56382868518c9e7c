//! Candidate labelings and the label alphabet.

use rand::seq::SliceRandom;
use rand::Rng;
use std::fmt;

// ============================================================================
// Candidate
// ============================================================================

/// One full label assignment across all nodes, plus its cached fitness.
///
/// Candidates are disposable value objects: mutation builds a new candidate
/// rather than altering an existing one, and the search loop owns exactly
/// one "current best" at a time.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Candidate {
    genes: Vec<char>,
    fitness: usize,
}

impl Candidate {
    /// Creates a candidate from its label sequence and evaluated fitness.
    pub fn new(genes: Vec<char>, fitness: usize) -> Self {
        Self { genes, fitness }
    }

    /// The label sequence, one label per node position.
    #[inline]
    pub fn genes(&self) -> &[char] {
        &self.genes
    }

    /// The cached count of satisfied rules. Higher is better.
    #[inline]
    pub fn fitness(&self) -> usize {
        self.fitness
    }

    /// Returns the number of gene positions.
    #[inline]
    pub fn len(&self) -> usize {
        self.genes.len()
    }

    /// Returns whether the candidate has no genes.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.genes.is_empty()
    }
}

/// Renders the label sequence as one contiguous string, e.g. `"OYGB"`.
impl fmt::Display for Candidate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for gene in &self.genes {
            write!(f, "{gene}")?;
        }
        Ok(())
    }
}

// ============================================================================
// Alphabet
// ============================================================================

/// The finite set of labels available for assignment.
///
/// Construction deduplicates symbols and requires at least two of them:
/// mutation must be able to sample two distinct labels.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Alphabet {
    symbols: Vec<char>,
}

impl Alphabet {
    /// Creates an alphabet from a symbol collection.
    ///
    /// Duplicate symbols are dropped (first occurrence wins).
    ///
    /// # Errors
    /// Returns [`AlphabetError::TooFewSymbols`] if fewer than two distinct
    /// symbols remain.
    pub fn new(symbols: impl IntoIterator<Item = char>) -> Result<Self, AlphabetError> {
        let mut distinct = Vec::new();
        for symbol in symbols {
            if !distinct.contains(&symbol) {
                distinct.push(symbol);
            }
        }
        if distinct.len() < 2 {
            return Err(AlphabetError::TooFewSymbols {
                got: distinct.len(),
            });
        }
        Ok(Self { symbols: distinct })
    }

    /// Returns the number of symbols.
    #[inline]
    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    /// Always `false`: an alphabet holds at least two symbols.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    /// The symbols in construction order.
    #[inline]
    pub fn symbols(&self) -> &[char] {
        &self.symbols
    }

    /// Returns whether `symbol` belongs to the alphabet.
    #[inline]
    pub fn contains(&self, symbol: char) -> bool {
        self.symbols.contains(&symbol)
    }

    /// Appends `count` symbols drawn without replacement to `out`.
    ///
    /// This is one batch of the initial-generation scheme: `count` must not
    /// exceed the alphabet size, and within the batch no symbol repeats.
    pub fn sample_batch<R: Rng + ?Sized>(&self, rng: &mut R, count: usize, out: &mut Vec<char>) {
        debug_assert!(count <= self.symbols.len(), "batch larger than alphabet");
        let mut scratch = self.symbols.clone();
        let (picked, _) = scratch.partial_shuffle(rng, count);
        out.extend_from_slice(picked);
    }

    /// Samples two distinct symbols uniformly.
    pub fn sample_two_distinct<R: Rng + ?Sized>(&self, rng: &mut R) -> (char, char) {
        let i = rng.random_range(0..self.symbols.len());
        let mut j = rng.random_range(0..self.symbols.len());
        while j == i {
            j = rng.random_range(0..self.symbols.len());
        }
        (self.symbols[i], self.symbols[j])
    }
}

// ============================================================================
// Errors
// ============================================================================

/// Errors encountered while constructing an alphabet.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AlphabetError {
    /// Fewer than two distinct symbols were supplied.
    TooFewSymbols {
        /// Distinct symbols found.
        got: usize,
    },
}

impl fmt::Display for AlphabetError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AlphabetError::TooFewSymbols { got } => {
                write!(f, "alphabet needs at least 2 distinct symbols, got {got}")
            }
        }
    }
}

impl std::error::Error for AlphabetError {}

// ============================================================================
// Tests
// ============================================================================
