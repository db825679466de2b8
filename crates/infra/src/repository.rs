//! # リポジトリ実装
//!
//! 永続化操作をトレイトとして定義し、PostgreSQL 実装を提供する。
//! ユースケース層はトレイト経由で利用するため、テストではモックに差し替えられる。

pub mod event_repository;
pub mod user_repository;

pub use event_repository::{EventRepository, PostgresEventRepository, RegistrationOutcome};
pub use user_repository::{PostgresUserRepository, UserRepository, UserWithEvents};
