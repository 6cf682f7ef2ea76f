// ROHAGE - Founder mutation age estimation from runs of homozygosity
// Copyright (C) 2024  Osma S. Rautila
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with this program.  If not, see <http://www.gnu.org/licenses/>.
//

//! ROHAGE - Founder mutation age estimation from runs of homozygosity
//!
//! Dates a single founder mutation from the runs of homozygosity (ROH) flanking it in a sample
//! of affected individuals. Two genealogies are modelled with the Gamma method of Gandolfo et al.
//! (<https://github.com/bahlolab/DatingRareMutations>): one where every flanking arm is an
//! independent observation and one where the total shared lengths of the individuals are
//! correlated.
//!
//! ROHAGE toolkit commands
//!
//! * Allele frequencies and their median from PLINK `.raw` + `.map` files
//! * Flanking arm lengths in centimorgans from PLINK `.hom` ROH segments
//! * Mutation age estimation using the Gamma method
//!
//! ## Running ROHAGE
//!
//! For a full analysis of a mutation at a given locus run the following:
//! ```bash
//!rohage freqs cohort.raw cohort.map -o $outdir
//!
//!rohage arms roh.hom --coords chr9:27573534 -r recombination_rates.tsv -S affected.ids -o $outdir
//!
//!rohage mrca ${outdir}/roh_arms.tsv --freq-file ${outdir}/allele_freqs.tsv -o $outdir
//!```
//!

#[doc(hidden)]
pub mod args;

#[doc(hidden)]
pub mod io;

/// ROHAGE structs
pub mod structs;

/// The Gamma method for dating a founder mutation
pub mod gamma;

#[doc(hidden)]
pub mod utils;

#[doc(hidden)]
pub mod error;

#[cfg(feature = "clap")]
pub mod clap;
