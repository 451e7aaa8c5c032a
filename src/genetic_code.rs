//! Genetic code tables and codon translation.
//!
//! Tables are built once per process and shared read-only through
//! [`genetic_codes`]. Translation never fails: codons that cannot be
//! looked up become [`UNKNOWN_RESIDUE`] and full gap codons become
//! [`GAP_RESIDUE`].

use std::collections::HashMap;
use std::sync::OnceLock;

/// Amino acid emitted for codons that are malformed or not in the table.
pub const UNKNOWN_RESIDUE: char = 'X';

/// Amino acid emitted for a codon made only of gap characters.
pub const GAP_RESIDUE: char = '-';

/// Table id used when none is requested.
pub const DEFAULT_CODE_ID: u8 = 0;

/// A genetic code table for translating codons to amino acids.
#[derive(Debug, Clone)]
pub struct GeneticCode {
    /// Table id (NCBI ids, 0 for the original conspos table)
    pub id: u8,
    /// Name of the genetic code
    pub name: String,
    codon_table: HashMap<[u8; 3], char>,
}

impl GeneticCode {
    /// Builds a table from a 64-character amino acid string in NCBI codon
    /// order (TTT, TTC, TTA, TTG, TCT, ...).
    fn from_ncbieaa(id: u8, name: &str, ncbieaa: &str) -> Self {
        const BASES: [u8; 4] = [b'T', b'C', b'A', b'G'];

        let mut amino_acids = ncbieaa.chars();
        let mut codon_table = HashMap::with_capacity(64);
        for &b1 in &BASES {
            for &b2 in &BASES {
                for &b3 in &BASES {
                    let aa = amino_acids.next().unwrap_or(UNKNOWN_RESIDUE);
                    codon_table.insert([b1, b2, b3], aa);
                }
            }
        }

        Self {
            id,
            name: name.to_string(),
            codon_table,
        }
    }

    /// Translates a single codon.
    ///
    /// - Lookup ignores case and reads `U` as `T`.
    /// - A codon made only of `-` or `.` translates to [`GAP_RESIDUE`].
    /// - Anything else that is not three table nucleotides, including
    ///   partial gaps and ambiguity codes, translates to [`UNKNOWN_RESIDUE`].
    pub fn translate_codon(&self, codon: &str) -> char {
        let bytes = codon.as_bytes();
        if bytes.len() != 3 {
            return UNKNOWN_RESIDUE;
        }
        if bytes.iter().all(|&b| b == b'-' || b == b'.') {
            return GAP_RESIDUE;
        }

        let mut key = [0u8; 3];
        for (slot, &b) in key.iter_mut().zip(bytes) {
            *slot = match b.to_ascii_uppercase() {
                b'U' => b'T',
                other => other,
            };
        }

        self.codon_table
            .get(&key)
            .copied()
            .unwrap_or(UNKNOWN_RESIDUE)
    }

    /// Translates a nucleotide string codon by codon, from the first base.
    /// A trailing partial codon is ignored.
    pub fn translate(&self, nucleotides: &str) -> String {
        nucleotides
            .as_bytes()
            .chunks_exact(3)
            .map(|chunk| match std::str::from_utf8(chunk) {
                Ok(codon) => self.translate_codon(codon),
                Err(_) => UNKNOWN_RESIDUE,
            })
            .collect()
    }
}

/// All available genetic codes.
#[derive(Debug)]
pub struct GeneticCodes {
    codes: Vec<GeneticCode>,
}

impl GeneticCodes {
    /// Creates the set of supported tables.
    pub fn new() -> Self {
        let codes = vec![
            // Carried over verbatim from the original conspos table. Several
            // assignments differ from the standard code (TCN -> L, ATG -> *, ...);
            // kept as-is pending review, select table 1 for the NCBI standard.
            GeneticCode::from_ncbieaa(0, "conspos (original)",
                "FFLLLLLLIIIMVVVVSSSSPPPPTTTTAAAAYY**HHQQNNKKDDEECC*WRRRRSSRRGGGG"),
            GeneticCode::from_ncbieaa(1, "Standard",
                "FFLLSSSSYY**CC*WLLLLPPPPHHQQRRRRIIIMTTTTNNKKSSRRVVVVAAAADDEEGGGG"),
            GeneticCode::from_ncbieaa(2, "Vertebrate Mitochondrial",
                "FFLLSSSSYY**CCWWLLLLPPPPHHQQRRRRIIMMTTTTNNKKSS**VVVVAAAADDEEGGGG"),
            GeneticCode::from_ncbieaa(3, "Yeast Mitochondrial",
                "FFLLSSSSYY**CCWWTTTTPPPPHHQQRRRRIIMMTTTTNNKKSSRRVVVVAAAADDEEGGGG"),
            GeneticCode::from_ncbieaa(4, "Mold/Protozoan/Coelenterate Mitochondrial",
                "FFLLSSSSYY**CCWWLLLLPPPPHHQQRRRRIIIMTTTTNNKKSSRRVVVVAAAADDEEGGGG"),
            GeneticCode::from_ncbieaa(5, "Invertebrate Mitochondrial",
                "FFLLSSSSYY**CCWWLLLLPPPPHHQQRRRRIIMMTTTTNNKKSSSSVVVVAAAADDEEGGGG"),
            GeneticCode::from_ncbieaa(11, "Bacterial/Archaeal/Plant Plastid",
                "FFLLSSSSYY**CC*WLLLLPPPPHHQQRRRRIIIMTTTTNNKKSSRRVVVVAAAADDEEGGGG"),
        ];

        Self { codes }
    }

    /// Returns all genetic codes.
    pub fn all(&self) -> &[GeneticCode] {
        &self.codes
    }

    /// Gets a genetic code by id.
    pub fn get(&self, id: u8) -> Option<&GeneticCode> {
        self.codes.iter().find(|c| c.id == id)
    }

    /// The table used when no id is given.
    pub fn default_code(&self) -> &GeneticCode {
        // Table 0 is always the first entry pushed by `new`.
        &self.codes[0]
    }
}

impl Default for GeneticCodes {
    fn default() -> Self {
        Self::new()
    }
}

/// Process-wide, immutable set of tables.
pub fn genetic_codes() -> &'static GeneticCodes {
    static CODES: OnceLock<GeneticCodes> = OnceLock::new();
    CODES.get_or_init(GeneticCodes::new)
}
