pub mod dom;
pub mod filter;

pub use dom::*;
pub use filter::*;
