pub mod attrs;
pub mod parser;
pub mod types;

pub use attrs::*;
pub use parser::*;
pub use types::*;
