mod err;
mod monoid;
mod layout;
mod right_mul;
mod cover;
mod node;
mod cache;
mod resolution;
mod search;

pub mod config;

pub use err::*;
pub use monoid::*;
pub use layout::*;
pub use right_mul::*;
pub use cover::*;
pub use node::*;
pub use cache::*;
pub use resolution::*;
pub use search::*;
pub use config::{ResolutionConfig, SearchConfig, Shrink};
