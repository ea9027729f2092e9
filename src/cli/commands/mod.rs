pub mod fasta;
pub mod genomes;
pub mod mirror;
