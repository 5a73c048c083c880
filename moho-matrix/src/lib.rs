mod base;
mod submod;

pub mod dense;

pub use base::*;
pub use submod::*;
