//! # conspos - Alignment consistency marking
//!
//! Given the results of three multiple sequence alignment strategies
//! (global, local and affine-gap local) for the same sequences, marks every
//! column of the affine-local alignment as consistent, intermediate or
//! inconsistent depending on how many strategies put the same residues
//! together in that column.
//!
//! ## Architecture
//!
//! - `model`: Residue and codon sequences, alignments
//! - `genetic_code`: Translation tables for codon sequences
//! - `position`: Ungapped position tracking per sequence and alignment
//! - `consistency`: Column pattern voting and marker rendering
//! - `codon_align`: Codon alignment from aligned protein guides
//! - `formats`: FASTA parsing, writing and the marked output
//! - `pipeline`: Strategy handling and configuration
//!
//! ## Example
//!
//! ```
//! use conspos::consistency::{mark_consistent, score_positions, MarkerSet};
//! use conspos::formats::fasta::parse_residue_alignment;
//!
//! let einsi = parse_residue_alignment(">a\nAC-GT\n>b\nA-CGT\n").unwrap();
//! let ginsi = parse_residue_alignment(">a\nAC-GT\n>b\nAC-GT\n").unwrap();
//! let linsi = parse_residue_alignment(">a\nAC-GT\n>b\nA-CGT\n").unwrap();
//!
//! let matrices = [
//!     einsi.ungapped_position_matrix("-").unwrap(),
//!     ginsi.ungapped_position_matrix("-").unwrap(),
//!     linsi.ungapped_position_matrix("-").unwrap(),
//! ];
//! let scores = score_positions(&matrices).unwrap();
//! assert_eq!(scores, vec![3, 2, 2, 3, 3]);
//! assert_eq!(mark_consistent(&scores, 3, &MarkerSet::default()), "CIICC");
//! ```

pub mod codon_align;
pub mod consistency;
pub mod formats;
pub mod genetic_code;
pub mod model;
pub mod pipeline;
pub mod position;
