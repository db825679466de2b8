//! # ドメイン層エラー定義
//!
//! ビジネスルール違反やドメイン固有の例外状態を表現するエラー型。
//!
//! ## エラーの種類と HTTP ステータスの対応
//!
//! | エラー種別 | HTTP ステータス | 用途 |
//! |-----------|----------------|------|
//! | `Validation` | 400 Bad Request | 入力値の検証失敗 |
//! | `NotFound` | 404 Not Found | エンティティが存在しない |
//! | `Forbidden` | 403 Forbidden | 権限不足 |
//! | `InvalidState` | 400 Bad Request | リクエストは正しいが前提条件を満たさない |
//!
//! ## 使用例
//!
//! ```rust
//! use txosteo_domain::DomainError;
//!
//! fn validate_name(name: &str) -> Result<(), DomainError> {
//!     if name.is_empty() {
//!         return Err(DomainError::Validation("名前は必須です".to_string()));
//!     }
//!     Ok(())
//! }
//! ```

use thiserror::Error;

/// ドメイン層で発生するエラー
///
/// API 層でこのエラーを受け取り、適切な HTTP レスポンスに変換する。
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DomainError {
    /// バリデーションエラー
    ///
    /// 入力値がビジネスルールに違反している場合に使用する。
    #[error("バリデーションエラー: {0}")]
    Validation(String),

    /// エンティティが見つからない
    #[error("{entity_type} が見つかりません: {id}")]
    NotFound {
        /// エンティティの種類（"Event", "User" など）
        entity_type: &'static str,
        /// 検索に使用した識別子
        id:          String,
    },

    /// 権限エラー
    ///
    /// 認証（Authentication）ではなく認可（Authorization）の失敗を表す。
    #[error("権限がありません: {0}")]
    Forbidden(String),

    /// 状態エラー
    ///
    /// リクエスト自体は正しいが、エンティティの現在の状態が操作を許さない場合。
    /// 例: 開催済みイベントへの登録、定員に達したイベントへの登録。
    #[error("{0}")]
    InvalidState(String),
}
