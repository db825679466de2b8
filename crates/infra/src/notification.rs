//! # 通知送信
//!
//! メール通知の送信を担当するインフラストラクチャモジュール。
//!
//! `NOTIFICATION_BACKEND` で実装を切り替える:
//!
//! | 値 | 実装 | 用途 |
//! |----|------|------|
//! | `smtp` | [`SmtpNotificationSender`] | 開発（Mailpit） |
//! | `ses` | [`SesNotificationSender`] | 本番 |
//! | `noop` | [`NoopNotificationSender`] | テスト、通知無効化 |

mod noop;
mod ses;
mod smtp;

use async_trait::async_trait;
pub use noop::NoopNotificationSender;
pub use ses::SesNotificationSender;
pub use smtp::SmtpNotificationSender;
use txosteo_domain::notification::{EmailMessage, NotificationError};

/// メール送信トレイト
#[async_trait]
pub trait NotificationSender: Send + Sync {
    /// メールを送信する
    ///
    /// `to` と `bcc` の全宛先に 1 通のメールとして送る。
    async fn send_email(&self, email: &EmailMessage) -> Result<(), NotificationError>;
}
