//! Scoring pipeline.
//!
//! Takes the three strategy alignments (already produced by the external
//! aligner), scores every column of the affine-local alignment against the
//! other two and renders the marked alignment.
//!
//! In codon mode the strategy alignments are protein guides; the unaligned
//! codon sequences are offset into each guide first, and scoring happens
//! per codon before being expanded back to nucleotide columns.

use thiserror::Error;

use crate::codon_align::{offset_align_alignment, OffsetError};
use crate::consistency::{
    mark_consistent, mark_consistent_codon, score_positions, ConsistencyError, MarkerSet,
};
use crate::formats::fasta::{marked_alignment_to_fasta, FastaError};
use crate::model::{Alignment, AlignmentMode};
use crate::position::PositionError;

/// Alignment strategy whose result takes part in the vote.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Strategy {
    /// Global alignment (G-INS-i)
    Global,
    /// Local alignment (L-INS-i)
    Local,
    /// Local alignment with affine gap costs (E-INS-i)
    AffineLocal,
}

impl Strategy {
    /// Reference first, as passed to the scorer.
    pub const SCORING_ORDER: [Strategy; 3] = [Strategy::AffineLocal, Strategy::Global, Strategy::Local];

    /// Short label used by the aligner and in file suffixes.
    pub fn label(&self) -> &'static str {
        match self {
            Strategy::Global => "ginsi",
            Strategy::Local => "linsi",
            Strategy::AffineLocal => "einsi",
        }
    }
}

impl std::fmt::Display for Strategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Strategy::Global => write!(f, "G-INSI"),
            Strategy::Local => write!(f, "L-INSI"),
            Strategy::AffineLocal => write!(f, "E-INSI"),
        }
    }
}

/// One alignment per strategy.
#[derive(Debug, Clone)]
pub struct StrategyAlignments {
    pub global: Alignment,
    pub local: Alignment,
    pub affine_local: Alignment,
}

impl StrategyAlignments {
    /// The alignment produced by `strategy`.
    pub fn get(&self, strategy: Strategy) -> &Alignment {
        match strategy {
            Strategy::Global => &self.global,
            Strategy::Local => &self.local,
            Strategy::AffineLocal => &self.affine_local,
        }
    }

    /// Applies `f` to every alignment, keeping the strategy slots.
    pub fn try_map<E>(
        &self,
        mut f: impl FnMut(Strategy, &Alignment) -> Result<Alignment, E>,
    ) -> Result<Self, E> {
        Ok(Self {
            global: f(Strategy::Global, &self.global)?,
            local: f(Strategy::Local, &self.local)?,
            affine_local: f(Strategy::AffineLocal, &self.affine_local)?,
        })
    }
}

/// Case applied to the output alignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CaseChange {
    #[default]
    Upper,
    Lower,
    Keep,
}

/// Parameters of a scoring run.
#[derive(Debug, Clone)]
pub struct ScoringConfig {
    /// Gap character of the alignments
    pub gap_char: char,
    /// Identifier of the marker record
    pub marker_id: String,
    /// Marker characters
    pub markers: MarkerSet,
    /// Case of the output sequences
    pub case: CaseChange,
    /// Column unit
    pub mode: AlignmentMode,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            gap_char: '-',
            marker_id: "marker".to_string(),
            markers: MarkerSet::default(),
            case: CaseChange::default(),
            mode: AlignmentMode::default(),
        }
    }
}

impl ScoringConfig {
    /// Gap token for one column: the gap character, or a gap codon.
    pub fn gap_token(&self) -> String {
        match self.mode {
            AlignmentMode::Char => self.gap_char.to_string(),
            AlignmentMode::Codon => std::iter::repeat(self.gap_char).take(3).collect(),
        }
    }
}

/// Errors raised by the pipeline.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("{0} alignment is empty. The aligner may have failed; check the input sequences")]
    EmptyAlignment(Strategy),

    #[error("{strategy} alignment does not hold {expected} sequences")]
    ModeMismatch {
        strategy: Strategy,
        expected: AlignmentMode,
    },

    #[error("Row {row} of the {strategy} alignment is '{found}', expected '{expected}' as in the E-INSI alignment")]
    IdMismatch {
        strategy: Strategy,
        row: usize,
        expected: String,
        found: String,
    },

    #[error(transparent)]
    Position(#[from] PositionError),

    #[error(transparent)]
    Consistency(#[from] ConsistencyError),

    #[error(transparent)]
    Offset(#[from] OffsetError),

    #[error(transparent)]
    Fasta(#[from] FastaError),
}

/// Result type for pipeline operations.
pub type PipelineResult<T> = Result<T, PipelineError>;

/// The reference alignment with its scores and marker track.
#[derive(Debug, Clone)]
pub struct MarkedAlignment {
    pub marker_id: String,
    /// Reference (affine-local) alignment, case already applied
    pub alignment: Alignment,
    /// Agreeing strategies per scored column (codons in codon mode)
    pub scores: Vec<usize>,
    /// One marker per output column
    pub track: String,
}

impl MarkedAlignment {
    /// Scored columns whose pattern all strategies share.
    pub fn consistent_columns(&self) -> usize {
        self.scores
            .iter()
            .filter(|&&s| s == Strategy::SCORING_ORDER.len())
            .count()
    }

    /// Marker record followed by the alignment, as FASTA.
    pub fn to_fasta(&self) -> PipelineResult<String> {
        Ok(marked_alignment_to_fasta(&self.alignment, &self.marker_id, &self.track)?)
    }
}

fn check_inputs(alignments: &StrategyAlignments, mode: AlignmentMode) -> PipelineResult<()> {
    for strategy in Strategy::SCORING_ORDER {
        let alignment = alignments.get(strategy);
        if alignment.is_empty() {
            return Err(PipelineError::EmptyAlignment(strategy));
        }
        if alignment.mode() != Some(mode) {
            return Err(PipelineError::ModeMismatch {
                strategy,
                expected: mode,
            });
        }
    }

    // Rows are compared by position, so every strategy must keep the reference order
    let reference = &alignments.affine_local;
    for strategy in [Strategy::Global, Strategy::Local] {
        let rows = reference.iter().zip(alignments.get(strategy).iter());
        if let Some((row, (expected, found))) = rows.enumerate().find(|(_, (a, b))| a.id != b.id) {
            return Err(PipelineError::IdMismatch {
                strategy,
                row,
                expected: expected.id.clone(),
                found: found.id.clone(),
            });
        }
    }
    Ok(())
}

/// Scores every column of the affine-local alignment.
pub fn score_strategies(alignments: &StrategyAlignments, config: &ScoringConfig) -> PipelineResult<Vec<usize>> {
    check_inputs(alignments, config.mode)?;

    let gap_token = config.gap_token();
    let matrices = Strategy::SCORING_ORDER
        .iter()
        .map(|&strategy| -> PipelineResult<_> {
            let matrix = alignments.get(strategy).ungapped_position_matrix(&gap_token)?;
            log::debug!("{} position matrix shape {:?}", strategy, matrix.shape());
            Ok(matrix)
        })
        .collect::<PipelineResult<Vec<_>>>()?;

    Ok(score_positions(&matrices)?)
}

/// Marker track for a score track; codon scores are expanded to nucleotides.
pub fn marker_track(scores: &[usize], config: &ScoringConfig) -> String {
    let full = Strategy::SCORING_ORDER.len();
    match config.mode {
        AlignmentMode::Char => mark_consistent(scores, full, &config.markers),
        AlignmentMode::Codon => mark_consistent_codon(scores, full, &config.markers),
    }
}

/// Offsets the unaligned codon sequences into each strategy's protein guide.
pub fn align_codons(codons: &Alignment, guides: &StrategyAlignments, gap: char) -> PipelineResult<StrategyAlignments> {
    guides.try_map(|strategy, guide| {
        if guide.is_empty() {
            return Err(PipelineError::EmptyAlignment(strategy));
        }
        log::info!("Offsetting codons into {} protein alignment", strategy);
        Ok(offset_align_alignment(codons, guide, gap)?)
    })
}

/// Scores the strategies and marks the affine-local alignment.
pub fn mark_alignments(alignments: StrategyAlignments, config: &ScoringConfig) -> PipelineResult<MarkedAlignment> {
    let scores = score_strategies(&alignments, config)?;
    let track = marker_track(&scores, config);

    let mut alignment = alignments.affine_local;
    match config.case {
        CaseChange::Upper => alignment.to_upper(),
        CaseChange::Lower => alignment.to_lower(),
        CaseChange::Keep => {}
    }

    let marked = MarkedAlignment {
        marker_id: config.marker_id.clone(),
        alignment,
        scores,
        track,
    };
    log::info!(
        "{} of {} columns consistent across {} strategies",
        marked.consistent_columns(),
        marked.scores.len(),
        Strategy::SCORING_ORDER.len()
    );
    Ok(marked)
}

/// Codon mode: offsets the codons into the protein guides, then marks.
pub fn mark_codon_alignments(
    codons: &Alignment,
    guides: &StrategyAlignments,
    config: &ScoringConfig,
) -> PipelineResult<MarkedAlignment> {
    let aligned = align_codons(codons, guides, config.gap_char)?;
    mark_alignments(aligned, config)
}
