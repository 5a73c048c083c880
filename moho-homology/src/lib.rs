mod abgroup;
mod homology_calc;
mod kunneth;

pub use abgroup::*;
pub use homology_calc::*;
pub use kunneth::*;
