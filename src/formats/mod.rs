//! File-level input and output.
//!
//! Alignments are read from FASTA files (the only format the aligner
//! produces for us) and results are written either to a file or to
//! standard output when the destination is `-`.

pub mod fasta;

use std::fs::File;
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::path::Path;

use thiserror::Error;

use crate::genetic_code::GeneticCode;
use crate::model::{Alignment, AlignmentMode};

/// Errors that can occur while reading alignment files.
#[derive(Error, Debug)]
pub enum ParseError {
    #[error("Failed to open file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Empty file")]
    EmptyFile,

    #[error("FASTA error: {0}")]
    FastaError(#[from] fasta::FastaError),
}

/// Result type for parsing operations.
pub type ParseResult<T> = Result<T, ParseError>;

/// Reads a whole file into memory.
pub fn read_file<P: AsRef<Path>>(path: P) -> ParseResult<String> {
    let file = File::open(&path)?;
    let file_size = file.metadata()?.len() as usize;

    if file_size == 0 {
        return Err(ParseError::EmptyFile);
    }

    let mut reader = BufReader::with_capacity(1024 * 1024, file);
    let mut content = String::with_capacity(file_size);
    reader.read_to_string(&mut content)?;
    Ok(content)
}

/// Reads a FASTA alignment file in the given mode.
pub fn read_alignment_file<P: AsRef<Path>>(
    path: P,
    mode: AlignmentMode,
    code: &GeneticCode,
) -> ParseResult<Alignment> {
    let content = read_file(&path)?;
    let alignment = fasta::parse_alignment(&content, mode, code)?;
    log::info!(
        "Read {} sequences from {}",
        alignment.sequence_count(),
        path.as_ref().display()
    );
    if let Some(warning) = &alignment.warning {
        log::warn!("{}: {}", path.as_ref().display(), warning);
    }
    Ok(alignment)
}

/// Writes `content` to `output`, or to stdout when `output` is `-`.
pub fn write_output(output: &str, content: &str) -> io::Result<()> {
    if output == "-" {
        let stdout = io::stdout();
        let mut handle = stdout.lock();
        handle.write_all(content.as_bytes())?;
        handle.flush()
    } else {
        let mut writer = BufWriter::new(File::create(output)?);
        writer.write_all(content.as_bytes())?;
        writer.flush()
    }
}
