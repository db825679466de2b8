//! # txosteo ドメイン層
//!
//! イベント参加登録サービスのドメインモデルを定義する。
//!
//! ## 依存関係の方向
//!
//! ```text
//! api → infra → domain
//! ```
//!
//! ドメイン層はインフラ層（DB、外部サービス）に一切依存しない。
//!
//! ## モジュール構成
//!
//! - [`event`] - イベントと残り定員
//! - [`registration`] - 登録対象の解決と認可
//! - [`user`] - ユーザーと ID プロバイダの subject
//! - [`report`] - 管理者へ送るユーザーレポート
//! - [`notification`] - 管理者向けメール種別とメッセージ
//! - [`error`] - ドメイン層で発生するエラーの定義
//!
//! ## 使用例
//!
//! ```rust
//! use txosteo_domain::{DomainError, event::EventId};
//!
//! let event_id = EventId::new();
//!
//! let error = DomainError::NotFound {
//!     entity_type: "Event",
//!     id:          event_id.to_string(),
//! };
//! ```

#[macro_use]
mod macros;

pub mod clock;
pub mod error;
pub mod event;
pub mod notification;
pub mod registration;
pub mod report;
pub mod user;
pub mod value_objects;

pub use error::DomainError;
