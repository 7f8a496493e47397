pub mod checkpoint;
pub mod docx;
pub mod keywords;

pub use checkpoint::*;
pub use docx::*;
pub use keywords::*;
