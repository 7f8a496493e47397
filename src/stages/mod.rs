pub mod parse;
pub mod tally;

pub use parse::*;
pub use tally::*;
