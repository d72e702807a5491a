pub mod attendance;
pub mod errors;
pub mod identifiers;
pub mod task;

pub use attendance::*;
pub use errors::*;
pub use identifiers::*;
pub use task::*;
