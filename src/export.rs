//! Rendering and persistence of search results.
//!
//! The engine works on single-character labels; this module maps them back
//! to human-readable color names, prints per-improvement progress lines,
//! and emits the map-script fragment consumed by the web map.

use crate::candidate::{Alphabet, AlphabetError, Candidate};
use crate::rules::NodeIndex;
use std::fmt;
use std::fs;
use std::path::Path;
use std::time::{Duration, Instant};

// ============================================================================
// Palette
// ============================================================================

/// An ordered list of color names whose initial characters form the label
/// alphabet.
///
/// The initials must be distinct: the initial is the gene, so two colors
/// sharing one would be indistinguishable in a candidate.
#[derive(Clone, Debug)]
pub struct Palette {
    names: Vec<String>,
    alphabet: Alphabet,
}

impl Palette {
    /// Creates a palette from color names.
    ///
    /// # Errors
    /// Returns an error if a name is empty, two names share an initial, or
    /// fewer than two colors are given.
    pub fn new<I, S>(names: I) -> Result<Self, PaletteError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let names: Vec<String> = names.into_iter().map(Into::into).collect();

        let mut initials = Vec::with_capacity(names.len());
        for (index, name) in names.iter().enumerate() {
            let Some(initial) = name.chars().next() else {
                return Err(PaletteError::EmptyName { index });
            };
            if initials.contains(&initial) {
                return Err(PaletteError::DuplicateInitial { initial });
            }
            initials.push(initial);
        }

        let alphabet = Alphabet::new(initials).map_err(|e| match e {
            AlphabetError::TooFewSymbols { got } => PaletteError::TooFewColors { got },
        })?;

        Ok(Self { names, alphabet })
    }

    /// The color names in palette order.
    #[inline]
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// The label alphabet formed by the color initials.
    #[inline]
    pub fn alphabet(&self) -> &Alphabet {
        &self.alphabet
    }

    /// Returns the color name behind `label`, if it belongs to the palette.
    pub fn name_for(&self, label: char) -> Option<&str> {
        self.alphabet
            .symbols()
            .iter()
            .position(|&s| s == label)
            .map(|i| self.names[i].as_str())
    }
}

// ============================================================================
// Errors
// ============================================================================

/// Errors encountered while constructing a palette.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PaletteError {
    /// Fewer than two colors were supplied.
    TooFewColors {
        /// Colors found.
        got: usize,
    },
    /// A color name is the empty string.
    EmptyName {
        /// Position of the empty name.
        index: usize,
    },
    /// Two color names start with the same character.
    DuplicateInitial {
        /// The shared initial.
        initial: char,
    },
}

impl fmt::Display for PaletteError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PaletteError::TooFewColors { got } => {
                write!(f, "palette needs at least 2 colors, got {got}")
            }
            PaletteError::EmptyName { index } => {
                write!(f, "color name at position {index} is empty")
            }
            PaletteError::DuplicateInitial { initial } => {
                write!(f, "two color names share the initial {initial:?}")
            }
        }
    }
}

impl std::error::Error for PaletteError {}

/// Errors encountered while rendering or persisting results.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ExportError {
    /// The gene sequence length does not match the node index.
    LengthMismatch {
        /// Indexed node count.
        expected: usize,
        /// Gene count supplied.
        got: usize,
    },
    /// A gene does not belong to the palette's alphabet.
    UnknownLabel {
        /// The unmapped label.
        label: char,
    },
    /// I/O error while writing the output file.
    Io(String),
}

impl fmt::Display for ExportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExportError::LengthMismatch { expected, got } => {
                write!(f, "expected {expected} genes (one per node), got {got}")
            }
            ExportError::UnknownLabel { label } => {
                write!(f, "gene {label:?} is not a palette initial")
            }
            ExportError::Io(msg) => write!(f, "I/O error: {msg}"),
        }
    }
}

impl std::error::Error for ExportError {}

// ============================================================================
// Progress reporting
// ============================================================================

/// Prints one line per accepted candidate: genes, fitness, elapsed time.
#[derive(Clone, Debug)]
pub struct ProgressPrinter {
    start: Instant,
}

impl ProgressPrinter {
    /// Creates a printer; elapsed time is measured from this call.
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    /// Time elapsed since the printer was created.
    #[inline]
    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }

    /// Prints the progress line for `candidate`.
    pub fn report(&self, candidate: &Candidate) {
        println!("{}\t{}\t{:.2?}", candidate, candidate.fitness(), self.elapsed());
    }
}

impl Default for ProgressPrinter {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Result rendering
// ============================================================================

/// Resolves each position to its `(node, color name)` pair.
fn assignments<'a>(
    index: &'a NodeIndex,
    genes: &[char],
    palette: &'a Palette,
) -> Result<Vec<(&'a str, &'a str)>, ExportError> {
    if genes.len() != index.len() {
        return Err(ExportError::LengthMismatch {
            expected: index.len(),
            got: genes.len(),
        });
    }
    let mut out = Vec::with_capacity(genes.len());
    for (position, &gene) in genes.iter().enumerate() {
        let name = palette
            .name_for(gene)
            .ok_or(ExportError::UnknownLabel { label: gene })?;
        // Positions come from the index itself, so the id lookup cannot miss.
        let Some(id) = index.id(position) else {
            return Err(ExportError::LengthMismatch {
                expected: index.len(),
                got: genes.len(),
            });
        };
        out.push((id, name));
    }
    Ok(out)
}

/// Renders `"<node> is <Color>"` lines, one per node in index order.
///
/// # Errors
/// Returns an error if the gene count does not match the index or a gene is
/// not a palette initial.
pub fn render_assignments(
    index: &NodeIndex,
    genes: &[char],
    palette: &Palette,
) -> Result<String, ExportError> {
    let mut out = String::new();
    for (id, name) in assignments(index, genes, palette)? {
        out.push_str(id);
        out.push_str(" is ");
        out.push_str(name);
        out.push('\n');
    }
    Ok(out)
}

/// Builds the map-script fragment: one color assignment statement per node.
///
/// # Errors
/// Returns an error if the gene count does not match the index or a gene is
/// not a palette initial.
pub fn map_script(
    index: &NodeIndex,
    genes: &[char],
    palette: &Palette,
) -> Result<String, ExportError> {
    let mut out = String::new();
    for (id, name) in assignments(index, genes, palette)? {
        out.push_str(&format!(
            "simplemaps_usmap_mapdata.state_specific.{id}.color = \"{name}\";\n"
        ));
    }
    Ok(out)
}

/// Writes the map-script fragment to `path`, replacing any existing file.
///
/// # Errors
/// Returns an error if rendering fails or the file cannot be written.
pub fn save_map_script(
    path: impl AsRef<Path>,
    index: &NodeIndex,
    genes: &[char],
    palette: &Palette,
) -> Result<(), ExportError> {
    let script = map_script(index, genes, palette)?;
    fs::write(path, script).map_err(|e| ExportError::Io(e.to_string()))
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adjacency::parse_adjacency;

    fn small_index() -> NodeIndex {
        NodeIndex::from_adjacency(&parse_adjacency("A,B\nB,A\nC,\n").unwrap())
    }

    fn palette() -> Palette {
        Palette::new(["Orange", "Yellow", "Green", "Blue"]).unwrap()
    }

    #[test]
    fn palette_alphabet_is_the_initials() {
        let palette = palette();
        assert_eq!(palette.alphabet().symbols(), ['O', 'Y', 'G', 'B']);
        assert_eq!(palette.name_for('G'), Some("Green"));
        assert_eq!(palette.name_for('Z'), None);
    }

    #[test]
    fn palette_rejects_duplicate_initials() {
        let err = Palette::new(["Green", "Gold"]).unwrap_err();
        assert_eq!(err, PaletteError::DuplicateInitial { initial: 'G' });
    }

    #[test]
    fn palette_rejects_empty_names() {
        let err = Palette::new(["Orange", ""]).unwrap_err();
        assert_eq!(err, PaletteError::EmptyName { index: 1 });
    }

    #[test]
    fn palette_rejects_single_color() {
        let err = Palette::new(["Orange"]).unwrap_err();
        assert_eq!(err, PaletteError::TooFewColors { got: 1 });
    }

    #[test]
    fn renders_assignment_lines_in_index_order() {
        let index = small_index();
        let text = render_assignments(&index, &['O', 'Y', 'O'], &palette()).unwrap();
        assert_eq!(text, "A is Orange\nB is Yellow\nC is Orange\n");
    }

    #[test]
    fn map_script_emits_one_statement_per_node() {
        let index = small_index();
        let script = map_script(&index, &['B', 'G', 'O'], &palette()).unwrap();
        let lines: Vec<&str> = script.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(
            lines[0],
            "simplemaps_usmap_mapdata.state_specific.A.color = \"Blue\";"
        );
        assert_eq!(
            lines[2],
            "simplemaps_usmap_mapdata.state_specific.C.color = \"Orange\";"
        );
    }

    #[test]
    fn rejects_gene_count_mismatch() {
        let index = small_index();
        let err = render_assignments(&index, &['O', 'Y'], &palette()).unwrap_err();
        assert_eq!(
            err,
            ExportError::LengthMismatch {
                expected: 3,
                got: 2
            }
        );
    }

    #[test]
    fn rejects_label_outside_palette() {
        let index = small_index();
        let err = map_script(&index, &['O', 'Q', 'O'], &palette()).unwrap_err();
        assert_eq!(err, ExportError::UnknownLabel { label: 'Q' });
    }

    #[test]
    fn save_map_script_writes_the_fragment() {
        let index = small_index();
        let path = std::env::temp_dir().join("mapcolor_script_test.js");
        save_map_script(&path, &index, &['O', 'Y', 'G'], &palette()).unwrap();
        let written = fs::read_to_string(&path).unwrap();
        assert!(written.contains("state_specific.B.color = \"Yellow\";"));
        let _ = fs::remove_file(&path);
    }

    #[test]
    fn progress_printer_reports_without_panicking() {
        let printer = ProgressPrinter::new();
        printer.report(&Candidate::new(vec!['O', 'Y'], 1));
        assert!(printer.elapsed() < Duration::from_secs(5));
    }
}
