//! FASTA reading and writing.
//!
//! ## FASTA Format
//!
//! ```text
//! >sequence_identifier optional title
//! ACGTACGTACGT...
//! # comment lines and blank lines are skipped
//! >another_sequence
//! TGCATGCATGCA...
//! ```
//!
//! Sequence lines are concatenated until the next header. Records are
//! written back with the whole sequence on one line.

use std::fmt::Write as _;
use std::io::Write;

use thiserror::Error;

use crate::genetic_code::GeneticCode;
use crate::model::{Alignment, AlignmentMode, Sequence, SequenceError};

/// Errors that can occur during FASTA parsing and writing.
#[derive(Error, Debug)]
pub enum FastaError {
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Empty FASTA file")]
    EmptyFile,

    #[error("Invalid FASTA format: {0}")]
    InvalidFormat(String),

    #[error("Sequence without header at line {0}")]
    SequenceWithoutHeader(usize),

    #[error("Invalid sequence: {0}")]
    Sequence(#[from] SequenceError),

    #[error("Alignment does not hold codon sequences")]
    NotCodonAlignment,

    #[error("Marker track has {found} columns but the alignment has {expected}")]
    MarkerLengthMismatch { expected: usize, found: usize },
}

/// Result type for FASTA operations.
pub type FastaResult<T> = Result<T, FastaError>;

/// A raw FASTA record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FastaRecord {
    pub id: String,
    pub title: String,
    pub data: String,
}

/// Splits FASTA text into records.
pub fn parse_fasta_records(content: &str) -> FastaResult<Vec<FastaRecord>> {
    let mut records: Vec<FastaRecord> = Vec::new();

    for (idx, line) in content.lines().enumerate() {
        let line_number = idx + 1;
        let line = line.trim();

        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        if let Some(header) = line.strip_prefix('>') {
            let (id, title) = match header.split_once(char::is_whitespace) {
                Some((id, title)) => (id, title.trim()),
                None => (header, ""),
            };
            if id.is_empty() {
                return Err(FastaError::InvalidFormat(format!(
                    "Empty sequence identifier at line {}",
                    line_number
                )));
            }
            records.push(FastaRecord {
                id: id.to_string(),
                title: title.to_string(),
                data: String::new(),
            });
        } else {
            let current = records
                .last_mut()
                .ok_or(FastaError::SequenceWithoutHeader(line_number))?;
            current
                .data
                .extend(line.chars().filter(|c| !c.is_whitespace()));
        }
    }

    if records.is_empty() {
        return Err(FastaError::EmptyFile);
    }
    Ok(records)
}

/// Parses FASTA text into an alignment of residue sequences.
pub fn parse_residue_alignment(content: &str) -> FastaResult<Alignment> {
    let sequences = parse_fasta_records(content)?
        .into_iter()
        .map(|r| Sequence::residues(r.id, r.title, r.data))
        .collect();
    Ok(Alignment::new(sequences))
}

/// Parses FASTA text into an alignment of codon sequences.
///
/// Fails on the first record whose length is not a whole number of codons.
pub fn parse_codon_alignment(content: &str, code: &GeneticCode) -> FastaResult<Alignment> {
    let sequences = parse_fasta_records(content)?
        .into_iter()
        .map(|r| Sequence::codons_with_code(r.id, r.title, r.data, code))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Alignment::new(sequences))
}

/// Parses FASTA text for the given mode.
pub fn parse_alignment(content: &str, mode: AlignmentMode, code: &GeneticCode) -> FastaResult<Alignment> {
    match mode {
        AlignmentMode::Char => parse_residue_alignment(content),
        AlignmentMode::Codon => parse_codon_alignment(content, code),
    }
}

fn push_record(out: &mut String, id: &str, title: &str, data: &str) {
    // Writing into a String cannot fail
    let _ = if title.is_empty() {
        writeln!(out, ">{}", id)
    } else {
        writeln!(out, ">{} {}", id, title)
    };
    out.push_str(data);
    out.push('\n');
}

impl Alignment {
    /// FASTA text of the alignment, one line per sequence.
    pub fn to_fasta(&self) -> String {
        let mut out = String::new();
        for seq in self {
            push_record(&mut out, seq.id(), seq.title(), seq.text());
        }
        out
    }

    /// FASTA text of the translations of a codon alignment.
    pub fn translation_fasta(&self) -> FastaResult<String> {
        let mut out = String::new();
        for seq in self {
            let translation = seq.translation().ok_or(FastaError::NotCodonAlignment)?;
            push_record(&mut out, seq.id(), seq.title(), translation);
        }
        Ok(out)
    }

    /// Writes [`Alignment::to_fasta`] to a writer.
    pub fn write_fasta<W: Write>(&self, mut writer: W) -> FastaResult<()> {
        writer.write_all(self.to_fasta().as_bytes())?;
        Ok(())
    }
}

/// FASTA text with a marker record first, then every sequence of
/// `alignment`. The marker track needs one character per alignment column.
pub fn marked_alignment_to_fasta(alignment: &Alignment, marker_id: &str, track: &str) -> FastaResult<String> {
    let found = track.chars().count();
    if let Some(expected) = alignment.iter().map(|seq| seq.len()).find(|&len| len != found) {
        return Err(FastaError::MarkerLengthMismatch { expected, found });
    }

    let mut out = String::new();
    push_record(&mut out, marker_id, "", track);
    out.push_str(&alignment.to_fasta());
    Ok(out)
}
