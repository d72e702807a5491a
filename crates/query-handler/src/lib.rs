//! 読み取り専用の問い合わせハンドラー

pub mod handlers;
pub mod queries;

pub use handlers::*;
pub use queries::*;
