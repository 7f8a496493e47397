pub mod speaker;
pub mod table;

pub use speaker::*;
pub use table::*;
