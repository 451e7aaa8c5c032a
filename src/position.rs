//! Ungapped position tracking.
//!
//! Every alignment column of a sequence is mapped to its rank among the
//! non-gap columns of that sequence, or to [`GAP_POSITION`] when the
//! column holds the gap token. Because the rank only depends on which
//! residues precede a column, two alignments that put the same residues
//! in a column produce the same ranks even if they place gaps differently.
//!
//! Residue sequences compare one character per column. Codon sequences
//! compare one codon per column, so their gap token must span whole codons.

use thiserror::Error;

use crate::model::{Alignment, CodonTrack, Sequence, SequenceData};

/// Value recorded for a gap column.
pub const GAP_POSITION: i64 = -1;

/// Errors raised while computing ungapped positions.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PositionError {
    #[error("Gap token {token:?} must be a single character for residue sequences")]
    ResidueGapToken { token: String },

    #[error("Gap token {token:?} must be a non-empty multiple of 3 characters for codon sequences")]
    CodonGapToken { token: String },

    #[error("Row {row} has {found} columns, expected {expected}")]
    RaggedRows {
        row: usize,
        expected: usize,
        found: usize,
    },
}

/// Result type for position operations.
pub type PositionResult<T> = Result<T, PositionError>;

/// Row-major matrix of ungapped positions, one row per sequence.
///
/// All rows have the same number of columns.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PositionMatrix {
    rows: Vec<Vec<i64>>,
    columns: usize,
}

impl PositionMatrix {
    /// Builds a matrix, rejecting rows of unequal length.
    pub fn from_rows(rows: Vec<Vec<i64>>) -> PositionResult<Self> {
        let columns = rows.first().map_or(0, Vec::len);
        if let Some((row, found)) = rows
            .iter()
            .map(Vec::len)
            .enumerate()
            .find(|&(_, len)| len != columns)
        {
            return Err(PositionError::RaggedRows {
                row,
                expected: columns,
                found,
            });
        }
        Ok(Self { rows, columns })
    }

    /// Number of rows (sequences).
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Number of columns.
    pub fn column_count(&self) -> usize {
        self.columns
    }

    /// `(rows, columns)`.
    pub fn shape(&self) -> (usize, usize) {
        (self.row_count(), self.columns)
    }

    /// All rows.
    pub fn rows(&self) -> &[Vec<i64>] {
        &self.rows
    }

    /// The values down one column, top to bottom.
    ///
    /// Panics if `col` is out of range.
    pub fn column(&self, col: usize) -> Vec<i64> {
        self.rows.iter().map(|row| row[col]).collect()
    }

    /// All columns as vectors, left to right.
    pub fn columns(&self) -> Vec<Vec<i64>> {
        (0..self.columns).map(|col| self.column(col)).collect()
    }
}

/// Column unit of a sequence under a gap token.
enum Units<'a> {
    Chars(&'a str, char),
    Codons(&'a CodonTrack, &'a str),
}

fn units<'a>(seq: &'a Sequence, gap_token: &'a str) -> PositionResult<Units<'a>> {
    match seq.data() {
        SequenceData::Residues(s) => {
            let mut chars = gap_token.chars();
            match (chars.next(), chars.next()) {
                (Some(gap), None) => Ok(Units::Chars(s, gap)),
                _ => Err(PositionError::ResidueGapToken {
                    token: gap_token.to_string(),
                }),
            }
        }
        SequenceData::Codons(track) => {
            let len = gap_token.chars().count();
            if len == 0 || len % 3 != 0 {
                return Err(PositionError::CodonGapToken {
                    token: gap_token.to_string(),
                });
            }
            Ok(Units::Codons(track, gap_token))
        }
    }
}

/// Per-column gap flags for a sequence.
fn gap_mask(seq: &Sequence, gap_token: &str) -> PositionResult<Vec<bool>> {
    Ok(match units(seq, gap_token)? {
        Units::Chars(s, gap) => s.chars().map(|c| c == gap).collect(),
        Units::Codons(track, gap) => track.codons().map(|codon| codon == gap).collect(),
    })
}

/// Column indices holding something other than the gap token, ascending.
pub fn ungapped_coords(seq: &Sequence, gap_token: &str) -> PositionResult<Vec<usize>> {
    Ok(gap_mask(seq, gap_token)?
        .into_iter()
        .enumerate()
        .filter_map(|(col, is_gap)| (!is_gap).then_some(col))
        .collect())
}

/// Rank of each column among non-gap columns, [`GAP_POSITION`] for gaps.
pub fn ungapped_position_slice(seq: &Sequence, gap_token: &str) -> PositionResult<Vec<i64>> {
    let mut rank = 0;
    Ok(gap_mask(seq, gap_token)?
        .into_iter()
        .map(|is_gap| {
            if is_gap {
                GAP_POSITION
            } else {
                rank += 1;
                rank - 1
            }
        })
        .collect())
}

impl Sequence {
    /// See [`ungapped_coords`].
    pub fn ungapped_coords(&self, gap_token: &str) -> PositionResult<Vec<usize>> {
        ungapped_coords(self, gap_token)
    }

    /// See [`ungapped_position_slice`].
    pub fn ungapped_position_slice(&self, gap_token: &str) -> PositionResult<Vec<i64>> {
        ungapped_position_slice(self, gap_token)
    }
}

impl Alignment {
    /// Ungapped position slice of every row.
    pub fn ungapped_position_matrix(&self, gap_token: &str) -> PositionResult<PositionMatrix> {
        let rows = self
            .iter()
            .map(|seq| seq.ungapped_position_slice(gap_token))
            .collect::<PositionResult<Vec<_>>>()?;
        PositionMatrix::from_rows(rows)
    }

    /// Ungapped coordinates of every row, flattened into parallel
    /// `(row indices, column indices)`.
    pub fn ungapped_coords(&self, gap_token: &str) -> PositionResult<(Vec<usize>, Vec<usize>)> {
        let mut row_coords = Vec::new();
        let mut col_coords = Vec::new();
        for (row, seq) in self.iter().enumerate() {
            let cols = seq.ungapped_coords(gap_token)?;
            row_coords.extend(std::iter::repeat(row).take(cols.len()));
            col_coords.extend(cols);
        }
        Ok((row_coords, col_coords))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn three_rows() -> Alignment {
        Alignment::new(vec![
            Sequence::residues("a", "", "TTT---TTCTTATTG"),
            Sequence::residues("b", "", "TTT---TTCTTTTTG"),
            Sequence::residues("c", "", "TTTTTCTTC---TTG"),
        ])
    }

    #[test]
    fn test_residue_position_slice() {
        let seq = Sequence::residues("a", "", "TTT---TTCTTATTG");
        assert_eq!(
            seq.ungapped_position_slice("-").unwrap(),
            vec![0, 1, 2, -1, -1, -1, 3, 4, 5, 6, 7, 8, 9, 10, 11]
        );
        assert_eq!(
            seq.ungapped_coords("-").unwrap(),
            vec![0, 1, 2, 6, 7, 8, 9, 10, 11, 12, 13, 14]
        );
    }

    #[test]
    fn test_alignment_position_matrix() {
        let matrix = three_rows().ungapped_position_matrix("-").unwrap();
        assert_eq!(matrix.shape(), (3, 15));
        let rows = matrix.rows();
        assert_eq!(rows[0], vec![0, 1, 2, -1, -1, -1, 3, 4, 5, 6, 7, 8, 9, 10, 11]);
        assert_eq!(rows[1], vec![0, 1, 2, -1, -1, -1, 3, 4, 5, 6, 7, 8, 9, 10, 11]);
        assert_eq!(rows[2], vec![0, 1, 2, 3, 4, 5, 6, 7, 8, -1, -1, -1, 9, 10, 11]);
        assert_eq!(matrix.column(3), vec![-1, -1, 3]);
    }

    #[test]
    fn test_codon_position_slice() {
        let aln = Alignment::new(vec![
            Sequence::codons("a", "", "TTT---TTCTTATTG").unwrap(),
            Sequence::codons("c", "", "TTTTTCTTC---TTG").unwrap(),
        ]);
        let matrix = aln.ungapped_position_matrix("---").unwrap();
        assert_eq!(matrix.rows()[0], vec![0, -1, 1, 2, 3]);
        assert_eq!(matrix.rows()[1], vec![0, 1, 2, -1, 3]);
    }

    #[test]
    fn test_codon_gap_token_must_span_codons() {
        let seq = Sequence::codons("a", "", "TTT---").unwrap();
        assert!(matches!(
            seq.ungapped_position_slice("-"),
            Err(PositionError::CodonGapToken { .. })
        ));
        assert!(matches!(
            seq.ungapped_coords(""),
            Err(PositionError::CodonGapToken { .. })
        ));
    }

    #[test]
    fn test_residue_gap_token_single_char() {
        let seq = Sequence::residues("a", "", "AC-");
        assert!(matches!(
            seq.ungapped_position_slice("--"),
            Err(PositionError::ResidueGapToken { .. })
        ));
        assert_eq!(seq.ungapped_position_slice(".").unwrap(), vec![0, 1, 2]);
    }

    #[test]
    fn test_slice_properties() {
        for seq in three_rows().iter() {
            let slice = seq.ungapped_position_slice("-").unwrap();
            let coords = seq.ungapped_coords("-").unwrap();
            assert_eq!(slice.len(), seq.len());

            let ranks: Vec<i64> = slice.iter().copied().filter(|&v| v >= 0).collect();
            assert_eq!(ranks.len(), coords.len());
            assert_eq!(ranks, (0..coords.len() as i64).collect::<Vec<_>>());
        }
    }

    #[test]
    fn test_alignment_ungapped_coords() {
        let aln = Alignment::new(vec![
            Sequence::residues("a", "", "A-C"),
            Sequence::residues("b", "", "--G"),
        ]);
        let (rows, cols) = aln.ungapped_coords("-").unwrap();
        assert_eq!(rows, vec![0, 0, 1]);
        assert_eq!(cols, vec![0, 2, 2]);
    }

    #[test]
    fn test_codon_alignment_ungapped_coords() {
        let aln = Alignment::new(vec![
            Sequence::codons("a", "", "TTT---TTC").unwrap(),
            Sequence::codons("b", "", "---TTTTTC").unwrap(),
        ]);
        let (rows, cols) = aln.ungapped_coords("---").unwrap();
        assert_eq!(rows, vec![0, 0, 1, 1]);
        assert_eq!(cols, vec![0, 2, 1, 2]);
    }

    #[test]
    fn test_ragged_alignment_rejected() {
        let aln = Alignment::new(vec![
            Sequence::residues("a", "", "ACGT"),
            Sequence::residues("b", "", "AC"),
        ]);
        assert_eq!(
            aln.ungapped_position_matrix("-"),
            Err(PositionError::RaggedRows {
                row: 1,
                expected: 4,
                found: 2
            })
        );
    }
}
