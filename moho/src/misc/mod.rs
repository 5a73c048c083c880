mod int_ext;
mod union_find;

pub mod format;

pub use int_ext::*;
pub use union_find::*;
