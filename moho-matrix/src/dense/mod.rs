mod mat;
mod diag;

pub use mat::*;
pub use diag::*;
