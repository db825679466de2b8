//! # ビジネスイベントログとエラーコンテキストの構造化ヘルパー
//!
//! ログフィールドの命名規約とヘルパーマクロを提供する。
//!
//! ## ビジネスイベント
//!
//! [`log_business_event!`] マクロで出力する。`event.kind = "business_event"` マーカーが
//! 自動付与され、`jq 'select(.["event.kind"] == "business_event")'` でフィルタできる。
//!
//! ## エラーコンテキスト
//!
//! `tracing::error!` に `error.category` + `error.kind` フィールドを直接追加する。
//! 定数は [`error`] モジュールで提供。
//!
//! ## フィールド命名規約
//!
//! ドット記法（`event.category`、`error.kind`）を使用する。
//! JSON 出力でフラットなキーになる。

/// ビジネスイベントを構造化ログとして出力する。
///
/// `event.kind = "business_event"` マーカーを自動付与し、
/// `tracing::info!` レベルで出力する。
///
/// ## 必須フィールド（慣例）
///
/// - `event.category`: イベントカテゴリ（[`event::category`] の定数を使用）
/// - `event.action`: アクション名（[`event::action`] の定数を使用）
/// - `event.result`: 結果（[`event::result`] の定数を使用）
///
/// ## 推奨フィールド
///
/// - `event.entity_type`: エンティティ種別（[`event::entity_type`] の定数を使用）
/// - `event.entity_id`: エンティティ ID
/// - `event.actor_id`: 操作者 ID
#[macro_export]
macro_rules! log_business_event {
    ($($args:tt)*) => {
        ::tracing::info!(
            event.kind = "business_event",
            $($args)*
        )
    };
}

/// イベントフィールドの定数
pub mod event {
    /// イベントカテゴリ
    pub mod category {
        pub const REGISTRATION: &str = "registration";
        pub const REPORT: &str = "report";
        pub const IMAGE: &str = "image";
    }

    /// イベントアクション
    pub mod action {
        pub const USER_REGISTERED: &str = "registration.user_registered";
        pub const REGISTRATION_REJECTED: &str = "registration.rejected";
        pub const REPORT_SENT: &str = "report.sent";
        pub const REPORT_RATE_LIMITED: &str = "report.rate_limited";
        pub const IMAGE_DELETED: &str = "image.deleted";
    }

    /// エンティティ種別
    pub mod entity_type {
        pub const EVENT: &str = "event";
        pub const USER: &str = "user";
        pub const IMAGE: &str = "image";
    }

    /// イベント結果
    pub mod result {
        pub const SUCCESS: &str = "success";
        pub const FAILURE: &str = "failure";
    }
}

/// エラーコンテキストフィールドの定数
pub mod error {
    /// エラーカテゴリ
    pub mod category {
        /// インフラストラクチャ（DB、Redis、S3）
        pub const INFRASTRUCTURE: &str = "infrastructure";
        /// 外部サービス呼び出し（メール送信）
        pub const EXTERNAL_SERVICE: &str = "external_service";
    }

    /// エラー種別
    pub mod kind {
        pub const DATABASE: &str = "database";
        pub const SESSION: &str = "session";
        pub const REDIS: &str = "redis";
        pub const STORAGE: &str = "storage";
        pub const NOTIFICATION: &str = "notification";
        pub const INTERNAL: &str = "internal";
    }
}
