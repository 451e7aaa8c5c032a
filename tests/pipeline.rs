//! End-to-end runs over alignment files on disk.

use std::fs;
use std::path::{Path, PathBuf};

use conspos::formats::fasta::parse_residue_alignment;
use conspos::formats::{read_alignment_file, write_output};
use conspos::genetic_code::genetic_codes;
use conspos::model::AlignmentMode;
use conspos::pipeline::{
    mark_alignments, mark_codon_alignments, CaseChange, ScoringConfig, StrategyAlignments,
};

fn write(dir: &Path, name: &str, content: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, content).unwrap();
    path
}

fn read_strategies(dir: &Path, contents: [&str; 3], mode: AlignmentMode) -> StrategyAlignments {
    let code = genetic_codes().default_code();
    let [global, local, affine] = contents;
    StrategyAlignments {
        global: read_alignment_file(write(dir, "aln.ginsi", global), mode, code).unwrap(),
        local: read_alignment_file(write(dir, "aln.linsi", local), mode, code).unwrap(),
        affine_local: read_alignment_file(write(dir, "aln.einsi", affine), mode, code).unwrap(),
    }
}

#[test]
fn char_mode_marks_affine_alignment() {
    let dir = tempfile::tempdir().unwrap();
    let strategies = read_strategies(
        dir.path(),
        [
            ">s1\nTTT---TTCTTATTG\n>s2\nTTT---TTCTTTTTG\n>s3\nTTTTTCTTC---TTG\n",
            ">s1\nTTT---TTCTTATTG\n>s2\nTTT---TTCTTTTTG\n>s3\nTTTTTCTTC---TTG\n",
            ">s1 first\ntttTTCTTATTG---\n>s2\ntttTTCTTTTTG---\n>s3\ntttTTCTTC---TTG\n",
        ],
        AlignmentMode::Char,
    );

    let marked = mark_alignments(strategies, &ScoringConfig::default()).unwrap();
    assert_eq!(marked.track.len(), 15);
    assert_eq!(&marked.track[..3], "CCC");

    let out = dir.path().join("marked.fa");
    write_output(out.to_str().unwrap(), &marked.to_fasta().unwrap()).unwrap();
    let written = fs::read_to_string(&out).unwrap();
    assert!(written.starts_with(&format!(">marker\n{}\n>s1 first\nTTTTTCTTATTG---\n", marked.track)));

    // The marked output is itself a valid alignment with the marker first
    let reparsed = parse_residue_alignment(&written).unwrap();
    assert_eq!(reparsed.sequence_count(), 4);
    assert!(reparsed.is_valid_alignment);
    assert_eq!(reparsed.to_fasta(), written);
}

#[test]
fn codon_mode_expands_marks_to_nucleotides() {
    let dir = tempfile::tempdir().unwrap();
    let code = genetic_codes().default_code();
    let codons = read_alignment_file(
        write(dir.path(), "cds.fa", ">a\natgtttggg\n>b\natgggg\n"),
        AlignmentMode::Codon,
        code,
    )
    .unwrap();
    let guides = read_strategies(
        dir.path(),
        [">a\nMFG\n>b\nM-G\n", ">a\nMFG\n>b\nMG-\n", ">a\nMFG\n>b\nM-G\n"],
        AlignmentMode::Char,
    );
    let config = ScoringConfig {
        mode: AlignmentMode::Codon,
        case: CaseChange::Lower,
        ..ScoringConfig::default()
    };

    let marked = mark_codon_alignments(&codons, &guides, &config).unwrap();
    assert_eq!(
        marked.to_fasta().unwrap(),
        ">marker\nCCCIIIIII\n>a\natgtttggg\n>b\natg---ggg\n"
    );
}

#[test]
fn codon_mode_rejects_mismatched_guide() {
    let dir = tempfile::tempdir().unwrap();
    let code = genetic_codes().default_code();
    let codons = read_alignment_file(
        write(dir.path(), "cds.fa", ">a\nATGTTT\n>b\nATG\n"),
        AlignmentMode::Codon,
        code,
    )
    .unwrap();
    // Guide for b has two residues but b only has one codon
    let guides = read_strategies(
        dir.path(),
        [">a\nMF\n>b\nMF\n", ">a\nMF\n>b\nM-\n", ">a\nMF\n>b\nM-\n"],
        AlignmentMode::Char,
    );
    let config = ScoringConfig {
        mode: AlignmentMode::Codon,
        ..ScoringConfig::default()
    };

    assert!(mark_codon_alignments(&codons, &guides, &config).is_err());
}

#[test]
fn translation_fasta_feeds_guides() {
    let dir = tempfile::tempdir().unwrap();
    let standard = genetic_codes().get(1).unwrap();
    let codons = read_alignment_file(
        write(dir.path(), "cds.fa", ">a gene a\nATGTTTTAA\n>b\nATGAAA\n"),
        AlignmentMode::Codon,
        standard,
    )
    .unwrap();

    assert_eq!(codons.translation_fasta().unwrap(), ">a gene a\nMF*\n>b\nMK\n");
}
