pub mod filter;
pub mod normalizer;
pub mod procedures;
pub mod standings;
pub mod statistics;

pub use filter::*;
pub use standings::*;
