//! Column-pattern consistency scoring.
//!
//! Each position matrix is the ungapped-position encoding of one alignment
//! strategy's result for the same set of sequences. A column's *pattern* is
//! the vector of ranks down that column. The first matrix is the reference:
//! for each of its columns, the score is the number of matrices (itself
//! included) in which the same pattern occurs anywhere.
//!
//! ```text
//! reference     other
//!  0  0  0      0  0  0    "0,0,0"   found -> 2
//! -1  4 -1     -1 -1 -1    "-1,4,-1" missing -> 1
//! ```

use std::collections::{HashMap, HashSet};

use thiserror::Error;

use crate::position::PositionMatrix;

/// Errors raised by the scorer and marker configuration.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConsistencyError {
    #[error("At least one position matrix is required")]
    NoMatrices,

    #[error("Position matrix {index} has shape {found:?}, expected {expected:?}")]
    ShapeMismatch {
        index: usize,
        expected: (usize, usize),
        found: (usize, usize),
    },

    #[error("Marker string {0:?} must have 2 (consistent, inconsistent) or 3 (consistent, intermediate, inconsistent) characters")]
    InvalidMarkers(String),
}

/// Result type for consistency operations.
pub type ConsistencyResult<T> = Result<T, ConsistencyError>;

fn check_shapes(matrices: &[PositionMatrix]) -> ConsistencyResult<()> {
    let Some(reference) = matrices.first() else {
        return Err(ConsistencyError::NoMatrices);
    };
    let expected = reference.shape();
    for (index, matrix) in matrices.iter().enumerate().skip(1) {
        if matrix.shape() != expected {
            return Err(ConsistencyError::ShapeMismatch {
                index,
                expected,
                found: matrix.shape(),
            });
        }
    }
    Ok(())
}

/// Number of matrices sharing the reference pattern, per reference column.
///
/// Scores range from 1 (only the reference has the pattern) to
/// `matrices.len()` (every matrix has it). Patterns that occur only in
/// non-reference matrices are ignored.
pub fn score_positions(matrices: &[PositionMatrix]) -> ConsistencyResult<Vec<usize>> {
    check_shapes(matrices)?;
    log::debug!("Scoring {} position matrices", matrices.len());

    let columns: Vec<Vec<Vec<i64>>> = matrices.iter().map(PositionMatrix::columns).collect();
    let (reference, others) = columns.split_first().ok_or(ConsistencyError::NoMatrices)?;

    let mut counts: HashMap<&[i64], usize> =
        reference.iter().map(|col| (col.as_slice(), 1)).collect();
    for matrix in others {
        // Count each matrix at most once per pattern
        let patterns: HashSet<&[i64]> = matrix.iter().map(Vec::as_slice).collect();
        for pattern in patterns {
            if let Some(count) = counts.get_mut(pattern) {
                *count += 1;
            }
        }
    }

    Ok(reference
        .iter()
        .map(|col| counts.get(col.as_slice()).copied().unwrap_or(1))
        .collect())
}

/// `true` for reference columns whose pattern occurs in every matrix.
pub fn consistent_alignment_positions(matrices: &[PositionMatrix]) -> ConsistencyResult<Vec<bool>> {
    let total = matrices.len();
    Ok(score_positions(matrices)?
        .into_iter()
        .map(|score| score == total)
        .collect())
}

/// [`consistent_alignment_positions`] expanded to nucleotide columns.
pub fn consistent_codon_alignment_positions(
    matrices: &[PositionMatrix],
) -> ConsistencyResult<Vec<bool>> {
    consistent_alignment_positions(matrices).map(|track| expand_codons(&track))
}

/// Repeats each codon-level value once per nucleotide.
pub fn expand_codons<T: Clone>(track: &[T]) -> Vec<T> {
    track
        .iter()
        .flat_map(|value| std::iter::repeat(value.clone()).take(3))
        .collect()
}

/// Characters used to render a score track.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MarkerSet {
    /// Pattern shared by every strategy
    pub consistent: char,
    /// Pattern not found in any other strategy
    pub inconsistent: char,
    /// Pattern shared by some strategies; `None` selects binary marking
    pub intermediate: Option<char>,
}

impl MarkerSet {
    /// Binary marking: consistent or not.
    pub fn binary(consistent: char, inconsistent: char) -> Self {
        Self {
            consistent,
            inconsistent,
            intermediate: None,
        }
    }

    /// Three-level marking.
    pub fn three_level(consistent: char, intermediate: char, inconsistent: char) -> Self {
        Self {
            consistent,
            inconsistent,
            intermediate: Some(intermediate),
        }
    }

    /// Marker for one score, `full` being the fully consistent score.
    pub fn mark(&self, score: usize, full: usize) -> char {
        if score == full {
            return self.consistent;
        }
        match self.intermediate {
            Some(intermediate) if score != 1 => intermediate,
            _ => self.inconsistent,
        }
    }
}

impl Default for MarkerSet {
    fn default() -> Self {
        Self::three_level('C', 'I', 'N')
    }
}

impl std::str::FromStr for MarkerSet {
    type Err = ConsistencyError;

    /// Parses `"CN"` (binary) or `"CIN"` (consistent, intermediate, inconsistent).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let chars: Vec<char> = s.chars().collect();
        match chars.as_slice() {
            &[c, n] => Ok(Self::binary(c, n)),
            &[c, i, n] => Ok(Self::three_level(c, i, n)),
            _ => Err(ConsistencyError::InvalidMarkers(s.to_string())),
        }
    }
}

/// Renders a score track, one marker per score.
pub fn mark_consistent(scores: &[usize], full: usize, markers: &MarkerSet) -> String {
    scores.iter().map(|&score| markers.mark(score, full)).collect()
}

/// Renders a codon-level score track as a nucleotide-level marker track.
pub fn mark_consistent_codon(scores: &[usize], full: usize, markers: &MarkerSet) -> String {
    mark_consistent(&expand_codons(scores), full, markers)
}
