pub mod record_store;
pub mod repositories;

pub use record_store::*;
pub use repositories::*;
