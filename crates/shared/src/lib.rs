//! # txosteo 共有ユーティリティ
//!
//! API・インフラ層から使われる共通ユーティリティ。
//! ビジネスロジックは含まない。

pub mod error_response;
pub mod event_log;
pub mod health;
pub mod observability;

pub use error_response::ErrorResponse;
pub use health::{CheckStatus, HealthResponse, ReadinessResponse, ReadinessStatus};
