//! conspos - Alignment consistency marker
//!
//! ## Usage
//!
//! ```bash
//! # Residue alignments produced by the three strategies
//! conspos score --global aln.ginsi --local aln.linsi --affine aln.einsi -o marked.fa
//!
//! # Codon mode: protein guides plus the unaligned coding sequences
//! conspos translate cds.fa -o prot.fa
//! conspos score --mode codon --codons cds.fa \
//!     --global prot.ginsi --local prot.linsi --affine prot.einsi
//! ```

// Use jemalloc for better memory management (returns memory to OS)
#[cfg(not(windows))]
#[global_allocator]
static GLOBAL: tikv_jemallocator::Jemalloc = tikv_jemallocator::Jemalloc;

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};

use conspos::consistency::MarkerSet;
use conspos::formats::{read_alignment_file, write_output};
use conspos::genetic_code::{genetic_codes, GeneticCode, DEFAULT_CODE_ID};
use conspos::model::AlignmentMode;
use conspos::pipeline::{
    mark_alignments, mark_codon_alignments, CaseChange, ScoringConfig, Strategy, StrategyAlignments,
};

/// Column unit for command line
#[derive(Debug, Clone, Copy, ValueEnum)]
enum ModeArg {
    /// One character per column
    Char,
    /// One codon per column, scored on protein guide alignments
    Codon,
}

impl From<ModeArg> for AlignmentMode {
    fn from(arg: ModeArg) -> Self {
        match arg {
            ModeArg::Char => AlignmentMode::Char,
            ModeArg::Codon => AlignmentMode::Codon,
        }
    }
}

/// Case change for command line
#[derive(Debug, Clone, Copy, ValueEnum)]
enum CaseArg {
    Upper,
    Lower,
    No,
}

impl From<CaseArg> for CaseChange {
    fn from(arg: CaseArg) -> Self {
        match arg {
            CaseArg::Upper => CaseChange::Upper,
            CaseArg::Lower => CaseChange::Lower,
            CaseArg::No => CaseChange::Keep,
        }
    }
}

/// conspos - Mark alignment columns that agree across alignment strategies
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Score three strategy alignments and write the marked E-INSI alignment
    Score(ScoreArgs),
    /// Write the translations of coding sequences as protein FASTA
    Translate(TranslateArgs),
}

#[derive(clap::Args, Debug)]
struct ScoreArgs {
    /// Global (G-INSI) alignment
    #[arg(long = "global")]
    global: PathBuf,

    /// Local (L-INSI) alignment
    #[arg(long = "local")]
    local: PathBuf,

    /// Affine-gap local (E-INSI) alignment, used as reference and output
    #[arg(long = "affine")]
    affine: PathBuf,

    /// Perform scoring on single characters or codons
    #[arg(short = 'm', long = "mode", value_enum, default_value = "char")]
    mode: ModeArg,

    /// Unaligned coding sequences (codon mode only)
    #[arg(long = "codons", required_if_eq("mode", "codon"))]
    codons: Option<PathBuf>,

    /// Name of the marker sequence
    #[arg(long = "marker-id", default_value = "marker")]
    marker_id: String,

    /// Markers for consistent (3/3), partially consistent (2/3) and
    /// inconsistent (1/3) columns. With 2 characters, columns are only
    /// consistent (3/3) or inconsistent.
    #[arg(long = "markers", default_value = "CIN")]
    markers: String,

    /// Character used for gaps in the alignments
    #[arg(long = "gap-char", default_value = "-")]
    gap_char: char,

    /// Change the case of the output sequences
    #[arg(long = "change-case", value_enum, default_value = "upper")]
    change_case: CaseArg,

    /// Genetic code used to read coding sequences (0 = original conspos table)
    #[arg(short = 'g', long = "genetic-code", default_value_t = DEFAULT_CODE_ID)]
    genetic_code: u8,

    /// Output file. Use "-" for stdout.
    #[arg(short = 'o', long = "output", default_value = "-")]
    output: String,
}

#[derive(clap::Args, Debug)]
struct TranslateArgs {
    /// Coding sequences in FASTA format
    file: PathBuf,

    /// Genetic code (0 = original conspos table)
    #[arg(short = 'g', long = "genetic-code", default_value_t = DEFAULT_CODE_ID)]
    genetic_code: u8,

    /// Output file. Use "-" for stdout.
    #[arg(short = 'o', long = "output", default_value = "-")]
    output: String,
}

fn genetic_code(id: u8) -> Result<&'static GeneticCode> {
    genetic_codes().get(id).with_context(|| {
        let known: Vec<String> = genetic_codes().all().iter().map(|c| c.id.to_string()).collect();
        format!("Unknown genetic code: {} (available: {})", id, known.join(", "))
    })
}

/// Reads the three strategy alignments in `mode`.
fn read_strategies(args: &ScoreArgs, mode: AlignmentMode, code: &GeneticCode) -> Result<StrategyAlignments> {
    let read = |strategy: Strategy, path: &PathBuf| {
        read_alignment_file(path, mode, code)
            .with_context(|| format!("Failed to read {} alignment {}", strategy, path.display()))
    };
    Ok(StrategyAlignments {
        global: read(Strategy::Global, &args.global)?,
        local: read(Strategy::Local, &args.local)?,
        affine_local: read(Strategy::AffineLocal, &args.affine)?,
    })
}

fn run_score(args: ScoreArgs) -> Result<()> {
    let markers: MarkerSet = args.markers.parse()?;
    let code = genetic_code(args.genetic_code)?;
    let config = ScoringConfig {
        gap_char: args.gap_char,
        marker_id: args.marker_id.clone(),
        markers,
        case: args.change_case.into(),
        mode: args.mode.into(),
    };

    let marked = match config.mode {
        AlignmentMode::Char => {
            if args.codons.is_some() {
                bail!("--codons is only used with --mode codon");
            }
            let alignments = read_strategies(&args, AlignmentMode::Char, code)?;
            mark_alignments(alignments, &config)?
        }
        AlignmentMode::Codon => {
            let Some(codon_path) = &args.codons else {
                bail!("--mode codon requires --codons <FILE>");
            };
            let codons = read_alignment_file(codon_path, AlignmentMode::Codon, code)
                .with_context(|| format!("Failed to read coding sequences {}", codon_path.display()))?;
            // Protein guides are plain residue alignments
            let guides = read_strategies(&args, AlignmentMode::Char, code)?;
            mark_codon_alignments(&codons, &guides, &config)?
        }
    };

    write_output(&args.output, &marked.to_fasta()?)
        .with_context(|| format!("Failed to write {}", args.output))?;
    if args.output != "-" {
        eprintln!(
            "Wrote {} sequences ({} of {} columns consistent) to {}",
            marked.alignment.sequence_count(),
            marked.consistent_columns(),
            marked.scores.len(),
            args.output
        );
    }
    Ok(())
}

fn run_translate(args: TranslateArgs) -> Result<()> {
    let code = genetic_code(args.genetic_code)?;
    let codons = read_alignment_file(&args.file, AlignmentMode::Codon, code)
        .with_context(|| format!("Failed to read coding sequences {}", args.file.display()))?;

    write_output(&args.output, &codons.translation_fasta()?)
        .with_context(|| format!("Failed to write {}", args.output))?;
    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();

    let level = match args.verbose {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Info,
        2 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();

    match args.command {
        Command::Score(score) => run_score(score),
        Command::Translate(translate) => run_translate(translate),
    }
}
