mod misc;

pub use misc::*;

pub mod util;
