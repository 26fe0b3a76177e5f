pub mod context;
pub mod limiter;
pub mod result;
pub mod scan;
pub mod scheduler;
pub mod signature;

pub use context::*;
pub use limiter::*;
pub use result::*;
pub use scan::*;
pub use scheduler::*;
pub use signature::*;
