//! Assemble sample-by-feature matrices for pharmacogenomic prediction from
//! independently built feature sets.
//!
//! - `config`: run description, feature-set registry, build order, cohort
//! - `table`: delimited table IO and the gene-level inner join
//! - `aggregate`: annotation-by-sample reductions and collision-free naming
//! - `matrix`: cohort subsetting and the unified matrix
//! - `pipeline`: the forward pass tying them together

pub mod aggregate;
pub mod config;
pub mod error;
pub mod matrix;
pub mod pipeline;
pub mod table;

pub use error::{Error, Result};
