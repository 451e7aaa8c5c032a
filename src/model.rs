//! Data model for residue and codon alignments.
//!
//! A [`Sequence`] is either a plain residue string or a codon track whose
//! translation is derived from its nucleotides. An [`Alignment`] is an
//! ordered collection of sequences of the same kind.

use thiserror::Error;

use crate::genetic_code::{genetic_codes, GeneticCode};

/// Errors raised while building or updating sequences.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SequenceError {
    #[error("Sequence '{id}' has {len} nucleotides, which is not divisible into codons")]
    MalformedCodons { id: String, len: usize },

    #[error("Sequence '{id}' contains non-ASCII characters and cannot be split into codons")]
    NonAsciiCodons { id: String },

    #[error("Unknown genetic code: {0}")]
    UnknownGeneticCode(u8),
}

/// Which unit an alignment column stands for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AlignmentMode {
    /// One character per column
    #[default]
    Char,
    /// One codon (three nucleotides) per column
    Codon,
}

impl std::fmt::Display for AlignmentMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AlignmentMode::Char => write!(f, "char"),
            AlignmentMode::Codon => write!(f, "codon"),
        }
    }
}

/// Nucleotides split into codons, with the matching translation.
///
/// The translation always has one residue per codon. Both tracks are only
/// replaced together.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodonTrack {
    nucleotides: String,
    translation: String,
    code_id: u8,
}

impl CodonTrack {
    fn build(id: &str, nucleotides: String, code: &GeneticCode) -> Result<Self, SequenceError> {
        if !nucleotides.is_ascii() {
            return Err(SequenceError::NonAsciiCodons { id: id.to_string() });
        }
        if nucleotides.len() % 3 != 0 {
            return Err(SequenceError::MalformedCodons {
                id: id.to_string(),
                len: nucleotides.len(),
            });
        }
        let translation = code.translate(&nucleotides);
        Ok(Self {
            nucleotides,
            translation,
            code_id: code.id,
        })
    }

    /// The nucleotide string.
    pub fn nucleotides(&self) -> &str {
        &self.nucleotides
    }

    /// One amino acid per codon.
    pub fn translation(&self) -> &str {
        &self.translation
    }

    /// Id of the genetic code used for the translation.
    pub fn code_id(&self) -> u8 {
        self.code_id
    }

    /// Number of codons.
    pub fn len(&self) -> usize {
        self.nucleotides.len() / 3
    }

    /// Returns true if there are no codons.
    pub fn is_empty(&self) -> bool {
        self.nucleotides.is_empty()
    }

    /// Gets the codon at a codon index.
    pub fn codon(&self, index: usize) -> Option<&str> {
        let start = index.checked_mul(3)?;
        self.nucleotides.get(start..start + 3)
    }

    /// Iterates over codons in order.
    pub fn codons(&self) -> impl Iterator<Item = &str> + '_ {
        (0..self.len()).map(move |i| &self.nucleotides[i * 3..i * 3 + 3])
    }

    fn to_upper(&mut self) {
        self.nucleotides.make_ascii_uppercase();
        self.translation.make_ascii_uppercase();
    }

    fn to_lower(&mut self) {
        self.nucleotides.make_ascii_lowercase();
        self.translation.make_ascii_lowercase();
    }
}

/// Sequence payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SequenceData {
    Residues(String),
    Codons(CodonTrack),
}

/// Represents a single sequence with its identifier, title and data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sequence {
    /// The sequence identifier (from FASTA header, without '>')
    pub id: String,
    /// Free text following the identifier on the header line
    pub title: String,
    data: SequenceData,
}

impl Sequence {
    /// Creates a residue sequence.
    pub fn residues(id: impl Into<String>, title: impl Into<String>, data: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            data: SequenceData::Residues(data.into()),
        }
    }

    /// Creates a codon sequence translated with the default genetic code.
    pub fn codons(
        id: impl Into<String>,
        title: impl Into<String>,
        nucleotides: impl Into<String>,
    ) -> Result<Self, SequenceError> {
        Self::codons_with_code(id, title, nucleotides, genetic_codes().default_code())
    }

    /// Creates a codon sequence translated with the given genetic code.
    pub fn codons_with_code(
        id: impl Into<String>,
        title: impl Into<String>,
        nucleotides: impl Into<String>,
        code: &GeneticCode,
    ) -> Result<Self, SequenceError> {
        let id = id.into();
        let track = CodonTrack::build(&id, nucleotides.into(), code)?;
        Ok(Self {
            id,
            title: title.into(),
            data: SequenceData::Codons(track),
        })
    }

    /// Identifier.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Header title, empty when absent.
    pub fn title(&self) -> &str {
        &self.title
    }

    /// The stored text: residues, or nucleotides for codon sequences.
    pub fn text(&self) -> &str {
        match &self.data {
            SequenceData::Residues(s) => s,
            SequenceData::Codons(track) => track.nucleotides(),
        }
    }

    /// Raw payload.
    pub fn data(&self) -> &SequenceData {
        &self.data
    }

    /// The codon track, if this is a codon sequence.
    pub fn codon_track(&self) -> Option<&CodonTrack> {
        match &self.data {
            SequenceData::Codons(track) => Some(track),
            SequenceData::Residues(_) => None,
        }
    }

    /// Translation of a codon sequence.
    pub fn translation(&self) -> Option<&str> {
        self.codon_track().map(CodonTrack::translation)
    }

    /// Which kind of sequence this is.
    pub fn mode(&self) -> AlignmentMode {
        match self.data {
            SequenceData::Residues(_) => AlignmentMode::Char,
            SequenceData::Codons(_) => AlignmentMode::Codon,
        }
    }

    /// Number of characters in the stored text.
    pub fn len(&self) -> usize {
        self.text().chars().count()
    }

    /// Returns true if the sequence is empty.
    pub fn is_empty(&self) -> bool {
        self.text().is_empty()
    }

    /// Replaces the stored text. For codon sequences the translation is
    /// recomputed with the same genetic code; on error nothing changes.
    pub fn set_text(&mut self, text: impl Into<String>) -> Result<(), SequenceError> {
        let text = text.into();
        match &mut self.data {
            SequenceData::Residues(s) => *s = text,
            SequenceData::Codons(track) => {
                let code = genetic_codes()
                    .get(track.code_id)
                    .ok_or(SequenceError::UnknownGeneticCode(track.code_id))?;
                *track = CodonTrack::build(&self.id, text, code)?;
            }
        }
        Ok(())
    }

    /// Changes the case of the sequence to uppercase.
    ///
    /// Only ASCII letters change, so the column count is preserved.
    pub fn to_upper(&mut self) {
        match &mut self.data {
            SequenceData::Residues(s) => s.make_ascii_uppercase(),
            SequenceData::Codons(track) => track.to_upper(),
        }
    }

    /// Changes the case of the sequence to lowercase.
    pub fn to_lower(&mut self) {
        match &mut self.data {
            SequenceData::Residues(s) => s.make_ascii_lowercase(),
            SequenceData::Codons(track) => track.to_lower(),
        }
    }
}

/// Represents an alignment of multiple sequences.
#[derive(Debug, Clone, Default)]
pub struct Alignment {
    /// All sequences in the alignment
    pub sequences: Vec<Sequence>,
    alignment_length: Option<usize>,
    /// Whether all sequences have the same length
    pub is_valid_alignment: bool,
    /// Warning message if sequences have different lengths
    pub warning: Option<String>,
}

impl Alignment {
    /// Creates a new alignment from a vector of sequences.
    pub fn new(sequences: Vec<Sequence>) -> Self {
        let (is_valid, alignment_length, warning) = Self::validate_alignment(&sequences);
        Self {
            sequences,
            alignment_length,
            is_valid_alignment: is_valid,
            warning,
        }
    }

    fn validate_alignment(sequences: &[Sequence]) -> (bool, Option<usize>, Option<String>) {
        let Some(first) = sequences.first() else {
            return (true, None, None);
        };

        let first_len = first.len();
        if sequences.iter().all(|s| s.len() == first_len) {
            return (true, Some(first_len), None);
        }

        let min_len = sequences.iter().map(Sequence::len).min().unwrap_or(0);
        let max_len = sequences.iter().map(Sequence::len).max().unwrap_or(0);
        let warning = format!(
            "Sequences have different lengths (min: {}, max: {}). Not a valid alignment.",
            min_len, max_len
        );
        (false, Some(max_len), Some(warning))
    }

    /// Returns the number of sequences.
    pub fn sequence_count(&self) -> usize {
        self.sequences.len()
    }

    /// Returns the alignment length in characters (max sequence length).
    pub fn alignment_length(&self) -> usize {
        self.alignment_length.unwrap_or(0)
    }

    /// Gets a sequence by index.
    pub fn get(&self, index: usize) -> Option<&Sequence> {
        self.sequences.get(index)
    }

    /// Iterates over sequences in order.
    pub fn iter(&self) -> std::slice::Iter<'_, Sequence> {
        self.sequences.iter()
    }

    /// Returns true if the alignment is empty.
    pub fn is_empty(&self) -> bool {
        self.sequences.is_empty()
    }

    /// Kind of the sequences, or `None` when empty or mixed.
    pub fn mode(&self) -> Option<AlignmentMode> {
        let first = self.sequences.first()?.mode();
        self.sequences
            .iter()
            .all(|s| s.mode() == first)
            .then_some(first)
    }

    /// Changes the case of all sequences to uppercase.
    pub fn to_upper(&mut self) {
        self.sequences.iter_mut().for_each(Sequence::to_upper);
    }

    /// Changes the case of all sequences to lowercase.
    pub fn to_lower(&mut self) {
        self.sequences.iter_mut().for_each(Sequence::to_lower);
    }
}

impl<'a> IntoIterator for &'a Alignment {
    type Item = &'a Sequence;
    type IntoIter = std::slice::Iter<'a, Sequence>;

    fn into_iter(self) -> Self::IntoIter {
        self.sequences.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_residue_sequence() {
        let seq = Sequence::residues("seq1", "", "AC-GT");
        assert_eq!(seq.id(), "seq1");
        assert_eq!(seq.title(), "");
        assert_eq!(seq.text(), "AC-GT");
        assert_eq!(seq.len(), 5);
        assert_eq!(seq.mode(), AlignmentMode::Char);
        assert!(seq.translation().is_none());
    }

    #[test]
    fn test_codon_sequence_tracks() {
        let seq = Sequence::codons("seq1", "desc", "TTTGGG---").unwrap();
        let track = seq.codon_track().unwrap();

        assert_eq!(track.len(), 3);
        assert_eq!(track.codons().collect::<Vec<_>>(), vec!["TTT", "GGG", "---"]);
        assert_eq!(track.codon(1), Some("GGG"));
        assert_eq!(track.codon(3), None);
        assert_eq!(seq.translation(), Some("FG-"));
        assert_eq!(seq.len(), 9);
    }

    #[test]
    fn test_codon_sequence_rejects_partial_codon() {
        let err = Sequence::codons("bad", "", "TTTG").unwrap_err();
        assert_eq!(
            err,
            SequenceError::MalformedCodons {
                id: "bad".to_string(),
                len: 4
            }
        );
    }

    #[test]
    fn test_codon_sequence_with_code() {
        let standard = genetic_codes().get(1).unwrap();
        let seq = Sequence::codons_with_code("s", "", "ATGTGA", standard).unwrap();
        assert_eq!(seq.translation(), Some("M*"));
        assert_eq!(seq.codon_track().unwrap().code_id(), 1);
    }

    #[test]
    fn test_set_text_recomputes_translation() {
        let mut seq = Sequence::codons("s", "", "TTT").unwrap();
        seq.set_text("GGGTTT").unwrap();
        assert_eq!(seq.text(), "GGGTTT");
        assert_eq!(seq.translation(), Some("GF"));

        // Failed update leaves the sequence untouched
        assert!(seq.set_text("GG").is_err());
        assert_eq!(seq.text(), "GGGTTT");
        assert_eq!(seq.translation(), Some("GF"));
    }

    #[test]
    fn test_case_changes_keep_tracks_in_sync() {
        let mut seq = Sequence::codons("s", "", "tttggg").unwrap();
        assert_eq!(seq.translation(), Some("FG"));

        seq.to_lower();
        assert_eq!(seq.text(), "tttggg");
        assert_eq!(seq.translation(), Some("fg"));

        seq.to_upper();
        assert_eq!(seq.text(), "TTTGGG");
        assert_eq!(seq.translation(), Some("FG"));
        assert_eq!(seq.codon_track().unwrap().codon(0), Some("TTT"));

        let mut res = Sequence::residues("r", "", "acgt");
        res.to_upper();
        assert_eq!(res.text(), "ACGT");
    }

    #[test]
    fn test_case_changes_keep_non_ascii_columns() {
        let mut res = Sequence::residues("r", "", "aßİ-");
        res.to_upper();
        assert_eq!(res.text(), "Aßİ-");
        assert_eq!(res.len(), 4);

        res.to_lower();
        assert_eq!(res.text(), "aßİ-");
        assert_eq!(res.len(), 4);
    }

    #[test]
    fn test_alignment_valid() {
        let alignment = Alignment::new(vec![
            Sequence::residues("seq1", "", "ACGT"),
            Sequence::residues("seq2", "", "TGCA"),
        ]);
        assert!(alignment.is_valid_alignment);
        assert!(alignment.warning.is_none());
        assert_eq!(alignment.alignment_length(), 4);
        assert_eq!(alignment.mode(), Some(AlignmentMode::Char));
    }

    #[test]
    fn test_alignment_invalid() {
        let alignment = Alignment::new(vec![
            Sequence::residues("seq1", "", "ACGT"),
            Sequence::residues("seq2", "", "TG"),
        ]);
        assert!(!alignment.is_valid_alignment);
        assert!(alignment.warning.is_some());
        assert_eq!(alignment.alignment_length(), 4);
    }

    #[test]
    fn test_alignment_mode_mixed_and_empty() {
        assert_eq!(Alignment::default().mode(), None);

        let mixed = Alignment::new(vec![
            Sequence::residues("a", "", "TTT"),
            Sequence::codons("b", "", "TTT").unwrap(),
        ]);
        assert_eq!(mixed.mode(), None);
    }

    #[test]
    fn test_alignment_case_changes() {
        let mut alignment = Alignment::new(vec![
            Sequence::residues("a", "", "acgt"),
            Sequence::codons("b", "", "ttt").unwrap(),
        ]);
        alignment.to_upper();
        assert_eq!(alignment.get(0).unwrap().text(), "ACGT");
        assert_eq!(alignment.get(1).unwrap().translation(), Some("F"));
        alignment.to_lower();
        assert_eq!(alignment.get(1).unwrap().text(), "ttt");
    }
}
