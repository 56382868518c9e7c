//! Adjacency rules: the constraint model driving the search.
//!
//! A [`Rule`] is an unordered pair of node identifiers that must receive
//! different labels. Rules are canonicalized at construction (larger
//! identifier first) so that a pair listed in either direction collapses to
//! one entity, deduplicated into a deterministic set, and then bound to a
//! [`NodeIndex`] so the hot fitness path works on plain positions.

use crate::adjacency::AdjacencyMap;
use std::collections::{BTreeSet, HashMap};
use std::fmt;

// ============================================================================
// Rule
// ============================================================================

/// An unordered pair of adjacent nodes that must be labeled differently.
///
/// Stored canonically with the lexicographically larger identifier first,
/// so `(A, B)` and `(B, A)` compare and hash as the same rule.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Rule {
    node: String,
    adjacent: String,
}

impl Rule {
    /// Creates a canonical rule from two node identifiers.
    ///
    /// # Errors
    /// Returns [`RuleError::SelfAdjacent`] if both identifiers are equal; a
    /// node can never be constrained against itself.
    pub fn new(a: impl Into<String>, b: impl Into<String>) -> Result<Self, RuleError> {
        let a = a.into();
        let b = b.into();
        if a == b {
            return Err(RuleError::SelfAdjacent { node: a });
        }
        let (node, adjacent) = if a < b { (b, a) } else { (a, b) };
        Ok(Self { node, adjacent })
    }

    /// The canonically first (larger) identifier.
    #[inline]
    pub fn node(&self) -> &str {
        &self.node
    }

    /// The canonically second (smaller) identifier.
    #[inline]
    pub fn adjacent(&self) -> &str {
        &self.adjacent
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.node, self.adjacent)
    }
}

// ============================================================================
// Errors
// ============================================================================

/// Errors encountered while building or binding rules.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RuleError {
    /// A node was listed adjacent to itself.
    SelfAdjacent {
        /// The offending identifier.
        node: String,
    },
    /// A rule references a node absent from the index mapping.
    ///
    /// The node set used to build rules and the node set used to build the
    /// index must be identical; anything else would silently corrupt
    /// fitness counting.
    UnknownNode {
        /// The unmapped identifier.
        node: String,
    },
}

impl fmt::Display for RuleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RuleError::SelfAdjacent { node } => {
                write!(f, "node {node:?} is listed adjacent to itself")
            }
            RuleError::UnknownNode { node } => {
                write!(f, "rule references node {node:?} missing from the index mapping")
            }
        }
    }
}

impl std::error::Error for RuleError {}

// ============================================================================
// Rule building
// ============================================================================

/// Derives the deduplicated rule set from adjacency data.
///
/// Empty neighbor entries mean "no neighbor" and are skipped. Bidirectional
/// listings in the source collapse to a single rule; re-adding an existing
/// rule is a no-op. The result is sorted, so the rule set is deterministic
/// for a given input.
///
/// # Errors
/// Returns [`RuleError::SelfAdjacent`] if any node lists itself.
pub fn build_rules(map: &AdjacencyMap) -> Result<Vec<Rule>, RuleError> {
    let mut rules = BTreeSet::new();
    for (node, neighbors) in map.iter() {
        for neighbor in neighbors {
            if neighbor.is_empty() {
                continue;
            }
            rules.insert(Rule::new(node, neighbor.as_str())?);
        }
    }
    Ok(rules.into_iter().collect())
}

// ============================================================================
// NodeIndex
// ============================================================================

/// Bijection from node identifier to a stable candidate position.
///
/// Positions are fixed by sorting identifiers, so a given input always
/// yields the same mapping and runs are reproducible under a fixed seed.
#[derive(Clone, Debug)]
pub struct NodeIndex {
    ids: Vec<String>,
    positions: HashMap<String, usize>,
}

impl NodeIndex {
    /// Builds the index over all nodes of `map`.
    pub fn from_adjacency(map: &AdjacencyMap) -> Self {
        let mut ids: Vec<String> = map.nodes().map(str::to_string).collect();
        ids.sort();
        let positions = ids
            .iter()
            .enumerate()
            .map(|(i, id)| (id.clone(), i))
            .collect();
        Self { ids, positions }
    }

    /// Returns the number of indexed nodes.
    #[inline]
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// Returns whether the index is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Returns the position of `node`, if indexed.
    #[inline]
    pub fn position(&self, node: &str) -> Option<usize> {
        self.positions.get(node).copied()
    }

    /// Returns the identifier at `position`, if in range.
    #[inline]
    pub fn id(&self, position: usize) -> Option<&str> {
        self.ids.get(position).map(String::as_str)
    }

    /// The identifiers in position order.
    #[inline]
    pub fn ids(&self) -> &[String] {
        &self.ids
    }
}

// ============================================================================
// Fitness evaluation
// ============================================================================

/// Rules pre-resolved to candidate positions.
///
/// Binding fails fast on any rule endpoint missing from the index, so the
/// per-iteration fitness path is a pure count over position pairs with no
/// lookups and no failure mode.
#[derive(Clone, Debug)]
pub struct RuleEvaluator {
    pairs: Vec<(usize, usize)>,
    node_count: usize,
}

impl RuleEvaluator {
    /// Resolves every rule against `index`.
    ///
    /// # Errors
    /// Returns [`RuleError::UnknownNode`] if any endpoint is unmapped.
    pub fn bind(rules: &[Rule], index: &NodeIndex) -> Result<Self, RuleError> {
        let mut pairs = Vec::with_capacity(rules.len());
        for rule in rules {
            let a = index.position(rule.node()).ok_or_else(|| RuleError::UnknownNode {
                node: rule.node().to_string(),
            })?;
            let b = index
                .position(rule.adjacent())
                .ok_or_else(|| RuleError::UnknownNode {
                    node: rule.adjacent().to_string(),
                })?;
            pairs.push((a, b));
        }
        Ok(Self {
            pairs,
            node_count: index.len(),
        })
    }

    /// Returns the number of bound rules.
    #[inline]
    pub fn rule_count(&self) -> usize {
        self.pairs.len()
    }

    /// Counts the rules satisfied by `genes`: those whose two endpoint
    /// labels differ.
    ///
    /// Pure and deterministic; the result is in `[0, rule_count]`.
    #[inline]
    pub fn fitness(&self, genes: &[char]) -> usize {
        debug_assert_eq!(genes.len(), self.node_count, "gene length mismatch");
        self.pairs
            .iter()
            .filter(|&&(a, b)| genes[a] != genes[b])
            .count()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adjacency::{parse_adjacency, AUSTRALIA_CSV};

    #[test]
    fn rule_is_canonical() {
        let ab = Rule::new("A", "B").unwrap();
        let ba = Rule::new("B", "A").unwrap();
        assert_eq!(ab, ba);
        assert_eq!(ab.node(), "B");
        assert_eq!(ab.adjacent(), "A");
    }

    #[test]
    fn rule_rejects_self_adjacency() {
        let err = Rule::new("A", "A").unwrap_err();
        assert_eq!(
            err,
            RuleError::SelfAdjacent {
                node: "A".to_string()
            }
        );
    }

    #[test]
    fn rule_displays_canonical_pair() {
        let rule = Rule::new("NT", "WA").unwrap();
        assert_eq!(rule.to_string(), "WA -> NT");
    }

    #[test]
    fn bidirectional_listings_collapse_to_one_rule() {
        let map = parse_adjacency("A,B\nB,A\n").unwrap();
        let rules = build_rules(&map).unwrap();
        assert_eq!(rules.len(), 1);
        assert_eq!(rules[0], Rule::new("A", "B").unwrap());
    }

    #[test]
    fn one_directional_listings_produce_the_same_set() {
        let once = parse_adjacency("A,B;C\nB,\nC,\n").unwrap();
        let both = parse_adjacency("A,B;C\nB,A\nC,A\n").unwrap();
        assert_eq!(build_rules(&once).unwrap(), build_rules(&both).unwrap());
    }

    #[test]
    fn empty_neighbor_entries_are_skipped() {
        let map = parse_adjacency("A,B;\nB,A\nC,\n").unwrap();
        let rules = build_rules(&map).unwrap();
        assert_eq!(rules.len(), 1);
    }

    #[test]
    fn self_adjacency_in_source_is_rejected() {
        let map = parse_adjacency("A,A;B\nB,A\n").unwrap();
        let err = build_rules(&map).unwrap_err();
        assert!(matches!(err, RuleError::SelfAdjacent { .. }));
    }

    #[test]
    fn rule_set_contains_no_duplicates_or_self_pairs() {
        let map = parse_adjacency(AUSTRALIA_CSV).unwrap();
        let rules = build_rules(&map).unwrap();
        for (i, rule) in rules.iter().enumerate() {
            assert_ne!(rule.node(), rule.adjacent());
            for later in &rules[i + 1..] {
                assert_ne!(rule, later);
            }
        }
    }

    #[test]
    fn bundled_dataset_has_nine_rules() {
        let map = parse_adjacency(AUSTRALIA_CSV).unwrap();
        let rules = build_rules(&map).unwrap();
        assert_eq!(rules.len(), 9);
    }

    #[test]
    fn node_index_is_sorted_and_bijective() {
        let map = parse_adjacency("C,\nA,\nB,\n").unwrap();
        let index = NodeIndex::from_adjacency(&map);
        assert_eq!(index.ids(), ["A", "B", "C"]);
        for (pos, id) in index.ids().iter().enumerate() {
            assert_eq!(index.position(id), Some(pos));
            assert_eq!(index.id(pos), Some(id.as_str()));
        }
        assert_eq!(index.position("Z"), None);
        assert_eq!(index.id(3), None);
    }

    #[test]
    fn bind_fails_fast_on_unmapped_node() {
        let rules = vec![Rule::new("A", "B").unwrap()];
        let index = NodeIndex::from_adjacency(&parse_adjacency("A,\nC,\n").unwrap());
        let err = RuleEvaluator::bind(&rules, &index).unwrap_err();
        assert_eq!(
            err,
            RuleError::UnknownNode {
                node: "B".to_string()
            }
        );
    }

    #[test]
    fn fitness_counts_satisfied_rules() {
        // Path A - B - C; A and C are not adjacent.
        let map = parse_adjacency("A,B\nB,A;C\nC,B\n").unwrap();
        let rules = build_rules(&map).unwrap();
        let index = NodeIndex::from_adjacency(&map);
        let eval = RuleEvaluator::bind(&rules, &index).unwrap();
        assert_eq!(eval.rule_count(), 2);

        assert_eq!(eval.fitness(&['X', 'Y', 'X']), 2);
        assert_eq!(eval.fitness(&['X', 'X', 'Y']), 1);
        assert_eq!(eval.fitness(&['X', 'X', 'X']), 0);
    }

    #[test]
    fn fitness_stays_within_rule_count() {
        let map = parse_adjacency(AUSTRALIA_CSV).unwrap();
        let rules = build_rules(&map).unwrap();
        let index = NodeIndex::from_adjacency(&map);
        let eval = RuleEvaluator::bind(&rules, &index).unwrap();

        let all_same = vec!['X'; index.len()];
        assert_eq!(eval.fitness(&all_same), 0);

        let alternating: Vec<char> = (0..index.len())
            .map(|i| if i % 2 == 0 { 'X' } else { 'Y' })
            .collect();
        assert!(eval.fitness(&alternating) <= eval.rule_count());
    }

    #[test]
    fn fitness_is_invariant_under_label_permutation() {
        let map = parse_adjacency(AUSTRALIA_CSV).unwrap();
        let rules = build_rules(&map).unwrap();
        let index = NodeIndex::from_adjacency(&map);
        let eval = RuleEvaluator::bind(&rules, &index).unwrap();

        // Fitness depends only on equality of label pairs, so any bijection
        // of the alphabet must leave it unchanged.
        let genes: Vec<char> = "OYGBOYG".chars().collect();
        let swap = |c: char| match c {
            'O' => 'B',
            'Y' => 'G',
            'G' => 'Y',
            'B' => 'O',
            other => other,
        };
        let permuted: Vec<char> = genes.iter().map(|&c| swap(c)).collect();
        assert_eq!(eval.fitness(&genes), eval.fitness(&permuted));
    }
}
