pub mod ecmascript;
pub mod indexmap;
pub mod rayon;

pub use concat_string::concat_string;
