//! SES 通知送信実装
//!
//! AWS SES v2 API を使用してメールを送信する。

use async_trait::async_trait;
use aws_sdk_sesv2::{
    Client,
    types::{Body, Content, Destination, EmailContent, Message},
};
use txosteo_domain::notification::{EmailMessage, NotificationError};

use super::NotificationSender;

/// SES 通知送信
pub struct SesNotificationSender {
    client:       Client,
    from_address: String,
}

impl SesNotificationSender {
    /// # 引数
    ///
    /// - `client`: AWS SES v2 クライアント
    /// - `from_address`: 送信元メールアドレス（SES で検証済みであること）
    pub fn new(client: Client, from_address: String) -> Self {
        Self {
            client,
            from_address,
        }
    }
}

fn content(data: &str, part: &str) -> Result<Content, NotificationError> {
    Content::builder()
        .data(data)
        .build()
        .map_err(|e| NotificationError::SendFailed(format!("{part}構築失敗: {e}")))
}

#[async_trait]
impl NotificationSender for SesNotificationSender {
    async fn send_email(&self, email: &EmailMessage) -> Result<(), NotificationError> {
        let destination = Destination::builder()
            .set_to_addresses(Some(email.to.clone()))
            .set_bcc_addresses(Some(email.bcc.clone()))
            .build();

        let message = Message::builder()
            .subject(content(&email.subject, "件名")?)
            .body(
                Body::builder()
                    .html(content(&email.html_body, "HTML 本文")?)
                    .text(content(&email.text_body, "テキスト本文")?)
                    .build(),
            )
            .build();

        self.client
            .send_email()
            .from_email_address(&self.from_address)
            .destination(destination)
            .content(EmailContent::builder().simple(message).build())
            .send()
            .await
            .map_err(|e| NotificationError::SendFailed(format!("SES 送信失敗: {e}")))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn トレイトはsendとsyncを実装している() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<SesNotificationSender>();
    }

    #[test]
    fn 空の件名でもcontentを構築できる() {
        assert!(content("", "件名").is_ok());
    }
}
