/// Date a founder mutation with the Gamma method. The original R algorithm by Gandolfo et al translated to Rust. <https://github.com/bahlolab/DatingRareMutations>
pub mod mrca;

/// Flanking arm lengths from runs of homozygosity
pub mod roh_arms;

/// Allele frequencies from PLINK genotypes
pub mod allele_freqs;
