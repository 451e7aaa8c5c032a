//! Codon alignment guided by an aligned protein sequence.
//!
//! Each residue column of the aligned protein consumes the next codon of
//! the unaligned nucleotide sequence; each gap column becomes a gap codon.
//! The result is exactly three times as long as the protein alignment.

use thiserror::Error;

use crate::genetic_code::genetic_codes;
use crate::model::{Alignment, CodonTrack, Sequence, SequenceError};

/// Errors raised while offsetting codons.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum OffsetError {
    #[error("Sequence '{0}' is not a codon sequence")]
    NotCodonSequence(String),

    #[error("Guide for '{id}' has more residues than the {codons} available codons")]
    GuideTooLong { id: String, codons: usize },

    #[error("Guide for '{id}' uses {used} of {codons} codons")]
    GuideTooShort {
        id: String,
        used: usize,
        codons: usize,
    },

    #[error("{codons} codon sequences but {guides} protein guides")]
    RowCountMismatch { codons: usize, guides: usize },

    #[error("Row {row}: codon sequence '{codon_id}' paired with guide '{guide_id}'")]
    IdMismatch {
        row: usize,
        codon_id: String,
        guide_id: String,
    },

    #[error(transparent)]
    Sequence(#[from] SequenceError),
}

/// Result type for offset alignment.
pub type OffsetResult<T> = Result<T, OffsetError>;

/// Inserts gap codons into `codons` where `guide` has `gap` characters.
///
/// `codons` must be ungapped (as sent to the aligner) and `guide` its
/// aligned translation. The number of non-gap guide columns must equal the
/// codon count. The returned sequence keeps the id, title and genetic code
/// of `codons`.
pub fn offset_align_codons(codons: &Sequence, guide: &Sequence, gap: char) -> OffsetResult<Sequence> {
    let track = codons
        .codon_track()
        .ok_or_else(|| OffsetError::NotCodonSequence(codons.id.clone()))?;

    let gap_codon: String = std::iter::repeat(gap).take(3).collect();
    let mut source = track.codons();
    let mut used = 0;
    let mut aligned = String::with_capacity(guide.text().len() * 3);

    for residue in guide.text().chars() {
        if residue == gap {
            aligned.push_str(&gap_codon);
            continue;
        }
        let codon = source.next().ok_or_else(|| OffsetError::GuideTooLong {
            id: codons.id.clone(),
            codons: track.len(),
        })?;
        aligned.push_str(codon);
        used += 1;
    }

    if used != track.len() {
        return Err(OffsetError::GuideTooShort {
            id: codons.id.clone(),
            used,
            codons: track.len(),
        });
    }

    rebuild(codons, track, aligned)
}

fn rebuild(codons: &Sequence, track: &CodonTrack, aligned: String) -> OffsetResult<Sequence> {
    let code = genetic_codes()
        .get(track.code_id())
        .ok_or(SequenceError::UnknownGeneticCode(track.code_id()))?;
    Ok(Sequence::codons_with_code(
        codons.id.clone(),
        codons.title.clone(),
        aligned,
        code,
    )?)
}

/// Applies [`offset_align_codons`] row by row. Rows are paired by position
/// and must carry the same ids.
pub fn offset_align_alignment(codons: &Alignment, guides: &Alignment, gap: char) -> OffsetResult<Alignment> {
    if codons.sequence_count() != guides.sequence_count() {
        return Err(OffsetError::RowCountMismatch {
            codons: codons.sequence_count(),
            guides: guides.sequence_count(),
        });
    }

    let sequences = codons
        .iter()
        .zip(guides.iter())
        .enumerate()
        .map(|(row, (seq, guide))| {
            if seq.id != guide.id {
                return Err(OffsetError::IdMismatch {
                    row,
                    codon_id: seq.id.clone(),
                    guide_id: guide.id.clone(),
                });
            }
            offset_align_codons(seq, guide, gap)
        })
        .collect::<OffsetResult<Vec<_>>>()?;

    Ok(Alignment::new(sequences))
}
