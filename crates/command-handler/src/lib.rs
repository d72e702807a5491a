//! 状態を変更するコマンドのハンドラー
//!
//! 各ハンドラーはストアの `update` 内でドキュメントを読み込み、ドメインモデルに
//! 変更を適用して書き戻す。

pub mod commands;
pub mod handlers;

pub use commands::*;
pub use handlers::*;
