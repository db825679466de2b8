//! 送信しない通知バックエンド（`NOTIFICATION_BACKEND=noop`）

use async_trait::async_trait;
use txosteo_domain::notification::{EmailMessage, NotificationError};

use super::NotificationSender;

/// 宛先数と件名をログに出すだけで、メールは送らない
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopNotificationSender;

#[async_trait]
impl NotificationSender for NoopNotificationSender {
    async fn send_email(&self, email: &EmailMessage) -> Result<(), NotificationError> {
        tracing::info!(
            mail.to = email.to.len(),
            mail.bcc = email.bcc.len(),
            mail.subject = %email.subject,
            "メール送信は無効化されています"
        );
        Ok(())
    }
}
