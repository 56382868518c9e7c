//! Loading and parsing of node adjacency data.
//!
//! The input format is one row per node: the node identifier, a comma, then
//! a `;`-separated neighbor list. An empty neighbor entry means "no
//! neighbor" and is preserved here; the rule builder skips it.

use std::fmt;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// Bundled demo dataset: the mainland Australian states and territories.
///
/// Tasmania has no land border, so its row exercises the empty-neighbor
/// convention.
pub const AUSTRALIA_CSV: &str = include_str!("../data/australia.csv");

// ============================================================================
// AdjacencyMap
// ============================================================================

/// Parsed node→neighbors data, in source row order.
///
/// Neighbor lists are kept exactly as written (including empty entries);
/// deduplication and empty-entry filtering happen when rules are built.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AdjacencyMap {
    entries: Vec<(String, Vec<String>)>,
}

impl AdjacencyMap {
    /// Returns the number of nodes.
    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns whether the map has no nodes.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates over `(node, neighbors)` pairs in source order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.entries
            .iter()
            .map(|(node, neighbors)| (node.as_str(), neighbors.as_slice()))
    }

    /// Iterates over node identifiers in source order.
    pub fn nodes(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(node, _)| node.as_str())
    }

    /// Returns the neighbor list of `node`, if present.
    pub fn neighbors(&self, node: &str) -> Option<&[String]> {
        self.entries
            .iter()
            .find(|(n, _)| n == node)
            .map(|(_, neighbors)| neighbors.as_slice())
    }
}

// ============================================================================
// Errors
// ============================================================================

/// Errors encountered while parsing adjacency data.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AdjacencyParseError {
    /// No non-empty rows were found.
    Empty,
    /// A row has no `,` separating the identifier from the neighbor list.
    MissingDelimiter {
        /// 1-based source line number.
        line: usize,
    },
    /// A row has an empty node identifier.
    MissingIdentifier {
        /// 1-based source line number.
        line: usize,
    },
    /// The same node identifier appears on more than one row.
    DuplicateNode {
        /// The repeated identifier.
        node: String,
    },
    /// I/O error (file not found, etc.).
    Io(String),
}

impl fmt::Display for AdjacencyParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AdjacencyParseError::Empty => write!(f, "adjacency data is empty"),
            AdjacencyParseError::MissingDelimiter { line } => {
                write!(f, "line {line}: expected `NODE,NEIGHBOR;...`, found no `,`")
            }
            AdjacencyParseError::MissingIdentifier { line } => {
                write!(f, "line {line}: empty node identifier")
            }
            AdjacencyParseError::DuplicateNode { node } => {
                write!(f, "duplicate row for node {node:?}")
            }
            AdjacencyParseError::Io(msg) => write!(f, "I/O error: {msg}"),
        }
    }
}

impl std::error::Error for AdjacencyParseError {}

// ============================================================================
// Parsing
// ============================================================================

/// Parses adjacency data from text.
///
/// Rules:
/// - Blank lines are ignored.
/// - Each row is `NODE,NB1;NB2;...`; identifier and neighbors are trimmed.
/// - Neighbor entries may be empty ("no neighbor") and are kept as-is.
///
/// # Errors
/// Returns an error if the input is empty, a row lacks the `,` delimiter or
/// an identifier, or a node appears twice.
pub fn parse_adjacency(text: &str) -> Result<AdjacencyMap, AdjacencyParseError> {
    let mut entries: Vec<(String, Vec<String>)> = Vec::new();

    for (line_idx, raw) in text.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() {
            continue;
        }

        let Some((node, rest)) = line.split_once(',') else {
            return Err(AdjacencyParseError::MissingDelimiter { line: line_idx + 1 });
        };
        let node = node.trim();
        if node.is_empty() {
            return Err(AdjacencyParseError::MissingIdentifier { line: line_idx + 1 });
        }
        if entries.iter().any(|(n, _)| n == node) {
            return Err(AdjacencyParseError::DuplicateNode {
                node: node.to_string(),
            });
        }

        let neighbors: Vec<String> = rest.split(';').map(|s| s.trim().to_string()).collect();
        entries.push((node.to_string(), neighbors));
    }

    if entries.is_empty() {
        return Err(AdjacencyParseError::Empty);
    }

    Ok(AdjacencyMap { entries })
}

/// Loads adjacency data from a file.
///
/// # Errors
/// Returns an error if the file cannot be read or its contents fail to
/// parse.
pub fn load_adjacency(path: impl AsRef<Path>) -> Result<AdjacencyMap, AdjacencyParseError> {
    let file = File::open(path).map_err(|e| AdjacencyParseError::Io(e.to_string()))?;
    let reader = BufReader::new(file);
    let mut text = String::new();
    for line in reader.lines() {
        let line = line.map_err(|e| AdjacencyParseError::Io(e.to_string()))?;
        text.push_str(&line);
        text.push('\n');
    }
    parse_adjacency(&text)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_simple_rows() {
        let map = parse_adjacency("A,B;C\nB,A\nC,A\n").unwrap();
        assert_eq!(map.len(), 3);
        assert_eq!(map.neighbors("A").unwrap(), &["B", "C"]);
        assert_eq!(map.neighbors("B").unwrap(), &["A"]);
    }

    #[test]
    fn preserves_source_order() {
        let map = parse_adjacency("Z,\nA,\nM,\n").unwrap();
        let nodes: Vec<&str> = map.nodes().collect();
        assert_eq!(nodes, ["Z", "A", "M"]);
    }

    #[test]
    fn keeps_empty_neighbor_entries() {
        // An isolated node has a single empty neighbor entry.
        let map = parse_adjacency("TAS,\n").unwrap();
        assert_eq!(map.neighbors("TAS").unwrap(), &[""]);
    }

    #[test]
    fn ignores_blank_lines_and_trims_fields() {
        let map = parse_adjacency("\n  A , B ; C \n\nB,A\nC,A\n").unwrap();
        assert_eq!(map.neighbors("A").unwrap(), &["B", "C"]);
    }

    #[test]
    fn rejects_empty_input() {
        assert_eq!(parse_adjacency(""), Err(AdjacencyParseError::Empty));
        assert_eq!(parse_adjacency("\n  \n"), Err(AdjacencyParseError::Empty));
    }

    #[test]
    fn rejects_row_without_delimiter() {
        let err = parse_adjacency("A;B\n").unwrap_err();
        assert_eq!(err, AdjacencyParseError::MissingDelimiter { line: 1 });
    }

    #[test]
    fn rejects_row_without_identifier() {
        let err = parse_adjacency("A,B\n,C\n").unwrap_err();
        assert_eq!(err, AdjacencyParseError::MissingIdentifier { line: 2 });
    }

    #[test]
    fn rejects_duplicate_node_rows() {
        let err = parse_adjacency("A,B\nA,C\n").unwrap_err();
        assert_eq!(
            err,
            AdjacencyParseError::DuplicateNode {
                node: "A".to_string()
            }
        );
    }

    #[test]
    fn unknown_node_has_no_neighbors() {
        let map = parse_adjacency("A,B\n").unwrap();
        assert!(map.neighbors("Q").is_none());
    }

    #[test]
    fn bundled_dataset_parses() {
        let map = parse_adjacency(AUSTRALIA_CSV).unwrap();
        assert_eq!(map.len(), 7);
        // Tasmania is isolated: one empty neighbor entry.
        assert_eq!(map.neighbors("TAS").unwrap(), &[""]);
        assert_eq!(map.neighbors("WA").unwrap(), &["NT", "SA"]);
    }

    #[test]
    fn load_reports_missing_file() {
        let err = load_adjacency("no_such_file_anywhere.csv").unwrap_err();
        assert!(matches!(err, AdjacencyParseError::Io(_)));
    }
}
