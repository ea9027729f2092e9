use std::fmt;
use std::str::FromStr;

/// Bulk datasets with canonical upstream locations, staged as-is for
/// downstream indexing tools.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dataset {
    /// RefSeq viral genomic release file.
    RefSeqViralGenomic,
    /// NCBI taxonomy dump archive.
    Taxdump,
    /// GenBank nucleotide accession to TaxID mapping.
    NuclAccession2Taxid,
    /// Reviewed viral proteome stream from UniProtKB.
    SwissProtViral,
    /// Unreviewed viral proteome stream from UniProtKB.
    TremblViral,
}

impl Dataset {
    pub const ALL: [Dataset; 5] = [
        Dataset::RefSeqViralGenomic,
        Dataset::Taxdump,
        Dataset::NuclAccession2Taxid,
        Dataset::SwissProtViral,
        Dataset::TremblViral,
    ];

    pub fn url(&self) -> &'static str {
        match self {
            Dataset::RefSeqViralGenomic => {
                "https://ftp.ncbi.nlm.nih.gov/refseq/release/viral/viral.1.1.genomic.fna.gz"
            }
            Dataset::Taxdump => "https://ftp.ncbi.nlm.nih.gov/pub/taxonomy/taxdump.tar.gz",
            Dataset::NuclAccession2Taxid => {
                "https://ftp.ncbi.nih.gov/pub/taxonomy/accession2taxid/nucl_gb.accession2taxid.gz"
            }
            Dataset::SwissProtViral => {
                "https://rest.uniprot.org/uniprotkb/stream?compressed=true&format=fasta&query=%28virus%29+AND+%28reviewed%3Atrue%29"
            }
            Dataset::TremblViral => {
                "https://rest.uniprot.org/uniprotkb/stream?compressed=true&format=fasta&query=%28virus%29+AND+%28reviewed%3Afalse%29"
            }
        }
    }

    pub fn filename(&self) -> &'static str {
        match self {
            Dataset::RefSeqViralGenomic => "viral.1.1.genomic.fna.gz",
            Dataset::Taxdump => "taxdump.tar.gz",
            Dataset::NuclAccession2Taxid => "nucl_gb.accession2taxid.gz",
            Dataset::SwissProtViral => "viral_proteomes_swissprot.fasta.gz",
            Dataset::TremblViral => "viral_proteomes_trembl.fasta.gz",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Dataset::RefSeqViralGenomic => "RefSeq viral genomic sequences (current release)",
            Dataset::Taxdump => "NCBI taxonomy dump (names, nodes, merged)",
            Dataset::NuclAccession2Taxid => "Nucleotide accession to taxonomy ID mapping",
            Dataset::SwissProtViral => "Reviewed viral protein sequences from UniProtKB",
            Dataset::TremblViral => "Unreviewed viral protein sequences from UniProtKB",
        }
    }

    /// Taxdump extracts with tar; everything else is plain gzip.
    pub fn is_tarball(&self) -> bool {
        matches!(self, Dataset::Taxdump)
    }
}

impl fmt::Display for Dataset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Dataset::RefSeqViralGenomic => "refseq-viral",
            Dataset::Taxdump => "taxdump",
            Dataset::NuclAccession2Taxid => "accession2taxid",
            Dataset::SwissProtViral => "swissprot-viral",
            Dataset::TremblViral => "trembl-viral",
        };
        write!(f, "{}", name)
    }
}

impl FromStr for Dataset {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "refseq-viral" => Ok(Dataset::RefSeqViralGenomic),
            "taxdump" => Ok(Dataset::Taxdump),
            "accession2taxid" => Ok(Dataset::NuclAccession2Taxid),
            "swissprot-viral" => Ok(Dataset::SwissProtViral),
            "trembl-viral" => Ok(Dataset::TremblViral),
            _ => Err(format!("Unknown dataset: {}", s)),
        }
    }
}
