//! # 利用者レポートユースケース
//!
//! レポートフォームの内容を、`USER_REPORT` を購読している管理者へメールで送る。
//!
//! 1. 呼び出し元のレート制限を確認（超過なら 429）
//! 2. 本文（`title` / `content`）を検証
//! 3. 宛先の管理者を取得。0 人なら送信せずに終了（レート制限も消費しない）
//! 4. テンプレートをレンダリングし、全員を BCC にして 1 通送信
//! 5. 送信の成功をレート制限に記録
//!
//! 手順 5 の記録に失敗しても、メールは送信済みのため成功として返す。
//! エラーを返すと再送で同じメールが重複するため、ログのみ残す。

use std::sync::Arc;

use txosteo_domain::{
    clock::Clock,
    notification::AdminEmailCategory,
    report::UserReport,
    user::UserId,
};
use txosteo_infra::{
    RateLimiter,
    notification::NotificationSender,
    repository::UserRepository,
};
use txosteo_shared::{
    event_log::{error, event},
    log_business_event,
};

use super::TemplateRenderer;
use crate::error::ApiError;

/// レポート送信の入力
///
/// JSON ボディの値をそのまま受け取り、ユースケース内で検証する。
pub struct ReportInput {
    pub title:   Option<String>,
    pub content: Option<String>,
}

/// 利用者レポートユースケース
pub struct ReportUseCaseImpl {
    user_repository:     Arc<dyn UserRepository>,
    rate_limiter:        Arc<dyn RateLimiter>,
    notification_sender: Arc<dyn NotificationSender>,
    renderer:            TemplateRenderer,
    clock:               Arc<dyn Clock>,
}

impl ReportUseCaseImpl {
    pub fn new(
        user_repository: Arc<dyn UserRepository>,
        rate_limiter: Arc<dyn RateLimiter>,
        notification_sender: Arc<dyn NotificationSender>,
        renderer: TemplateRenderer,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            user_repository,
            rate_limiter,
            notification_sender,
            renderer,
            clock,
        }
    }

    /// レポートを送信し、宛先の人数を返す
    pub async fn send_report(&self, sender: &UserId, input: ReportInput) -> Result<usize, ApiError> {
        if self.rate_limiter.is_limited(sender).await? {
            log_business_event!(
                event.category = event::category::REPORT,
                event.action = event::action::REPORT_RATE_LIMITED,
                event.entity_type = event::entity_type::USER,
                event.entity_id = %sender,
                event.actor_id = %sender,
                event.result = event::result::FAILURE,
                "レポート送信をレート制限で拒否"
            );
            return Err(ApiError::TooManyRequests(
                "レポートの送信回数が上限に達しました。しばらくしてから再度お試しください"
                    .to_string(),
            ));
        }

        let report = UserReport::new(input.title, input.content)?;

        let recipients = self
            .user_repository
            .find_admins_subscribed_to(AdminEmailCategory::UserReport)
            .await?;
        if recipients.is_empty() {
            tracing::info!("レポートの宛先となる管理者がいないため送信をスキップ");
            return Ok(0);
        }

        let bcc: Vec<String> = recipients
            .iter()
            .map(|user| user.email().as_str().to_string())
            .collect();
        let email = self
            .renderer
            .render_user_report(&report, bcc, self.clock.now())?;

        self.notification_sender.send_email(&email).await?;
        if let Err(e) = self.rate_limiter.record(sender).await {
            tracing::error!(
                error.category = error::category::INFRASTRUCTURE,
                error.kind = error::kind::REDIS,
                span_trace = %e.span_trace(),
                "レート制限の記録に失敗: {}",
                e
            );
        }

        log_business_event!(
            event.category = event::category::REPORT,
            event.action = event::action::REPORT_SENT,
            event.entity_type = event::entity_type::USER,
            event.entity_id = %sender,
            event.actor_id = %sender,
            event.result = event::result::SUCCESS,
            recipients = recipients.len(),
            "レポートを送信"
        );

        Ok(recipients.len())
    }
}

#[cfg(test)]
mod tests {
    use chrono::{DateTime, Utc};
    use pretty_assertions::assert_eq;
    use rstest::rstest;
    use txosteo_domain::{
        clock::FixedClock,
        user::{Email, NewUser, Subject, User},
        value_objects::UserName,
    };
    use txosteo_infra::mock::{MockNotificationSender, MockRateLimiter, MockUserRepository};

    use super::*;

    fn now() -> DateTime<Utc> {
        // 2026-03-05 09:30:00 UTC
        DateTime::from_timestamp(1_772_703_000, 0).unwrap()
    }

    fn user(email: &str) -> User {
        User::new(NewUser {
            id:      UserId::new(),
            subject: Subject::new(format!("auth0|{email}")).unwrap(),
            email:   Email::new(email).unwrap(),
            name:    UserName::new("管理者").unwrap(),
            now:     now(),
        })
    }

    fn subscribed_admin(email: &str) -> User {
        user(email)
            .promoted_to_admin(now())
            .subscribed_to(AdminEmailCategory::UserReport, now())
    }

    struct Fixture {
        users:   MockUserRepository,
        limiter: MockRateLimiter,
        sender:  MockNotificationSender,
    }

    impl Fixture {
        fn new(max_requests: u32) -> Self {
            Self {
                users:   MockUserRepository::new(),
                limiter: MockRateLimiter::new(max_requests),
                sender:  MockNotificationSender::new(),
            }
        }

        fn sut(&self) -> ReportUseCaseImpl {
            ReportUseCaseImpl::new(
                Arc::new(self.users.clone()),
                Arc::new(self.limiter.clone()),
                Arc::new(self.sender.clone()),
                TemplateRenderer::new().unwrap(),
                Arc::new(FixedClock::new(now())),
            )
        }
    }

    fn valid_input() -> ReportInput {
        ReportInput {
            title:   Some("予約ページの不具合".to_string()),
            content: Some("送信後に画面が真っ白になります".to_string()),
        }
    }

    #[tokio::test]
    async fn test_購読中の管理者全員にbccで1通送る() {
        let fixture = Fixture::new(5);
        fixture.users.add_user(subscribed_admin("a@example.com"));
        fixture.users.add_user(subscribed_admin("b@example.com"));
        // 購読していない管理者と一般ユーザーは宛先にならない
        fixture.users.add_user(user("c@example.com").promoted_to_admin(now()));
        fixture
            .users
            .add_user(user("d@example.com").subscribed_to(AdminEmailCategory::UserReport, now()));
        let sender_id = UserId::new();

        let recipients = fixture
            .sut()
            .send_report(&sender_id, valid_input())
            .await
            .unwrap();

        assert_eq!(recipients, 2);
        let sent = fixture.sender.sent_emails();
        assert_eq!(sent.len(), 1);
        let mut bcc = sent[0].bcc.clone();
        bcc.sort();
        assert_eq!(bcc, vec!["a@example.com", "b@example.com"]);
        assert_eq!(sent[0].subject, "Texas Osteo Report Form - Mar 5, 2026");
        assert_eq!(fixture.limiter.count(&sender_id), 1);
    }

    #[tokio::test]
    async fn test_レート制限の記録に失敗しても送信済みなら成功を返す() {
        let fixture = Fixture {
            limiter: MockRateLimiter::failing_record(5),
            ..Fixture::new(5)
        };
        fixture.users.add_user(subscribed_admin("a@example.com"));
        let sender_id = UserId::new();

        let recipients = fixture
            .sut()
            .send_report(&sender_id, valid_input())
            .await
            .unwrap();

        assert_eq!(recipients, 1);
        assert_eq!(fixture.sender.sent_emails().len(), 1);
        assert_eq!(fixture.limiter.count(&sender_id), 0);
    }

    #[tokio::test]
    async fn test_宛先がいなければ送信もレート制限の消費もしない() {
        let fixture = Fixture::new(5);
        let sender_id = UserId::new();

        let recipients = fixture
            .sut()
            .send_report(&sender_id, valid_input())
            .await
            .unwrap();

        assert_eq!(recipients, 0);
        assert!(fixture.sender.sent_emails().is_empty());
        assert_eq!(fixture.limiter.count(&sender_id), 0);
    }

    #[tokio::test]
    async fn test_上限に達した呼び出し元はtoo_many_requests() {
        let fixture = Fixture::new(1);
        fixture.users.add_user(subscribed_admin("a@example.com"));
        let sender_id = UserId::new();
        let sut = fixture.sut();

        sut.send_report(&sender_id, valid_input()).await.unwrap();
        let result = sut.send_report(&sender_id, valid_input()).await;

        assert!(matches!(result, Err(ApiError::TooManyRequests(_))));
        assert_eq!(fixture.sender.sent_emails().len(), 1);
    }

    #[tokio::test]
    async fn test_レート制限は本文の検証より先に判定される() {
        let fixture = Fixture::new(0);
        let input = ReportInput {
            title:   None,
            content: None,
        };

        let result = fixture.sut().send_report(&UserId::new(), input).await;

        assert!(matches!(result, Err(ApiError::TooManyRequests(_))));
    }

    #[rstest]
    #[case(None, Some("本文"))]
    #[case(Some("件名"), None)]
    #[case(Some("   "), Some("本文"))]
    #[tokio::test]
    async fn test_タイトルか本文が欠けていればbad_request(
        #[case] title: Option<&str>,
        #[case] content: Option<&str>,
    ) {
        let fixture = Fixture::new(5);
        fixture.users.add_user(subscribed_admin("a@example.com"));
        let input = ReportInput {
            title:   title.map(String::from),
            content: content.map(String::from),
        };

        let result = fixture.sut().send_report(&UserId::new(), input).await;

        assert!(matches!(result, Err(ApiError::BadRequest(_))));
        assert!(fixture.sender.sent_emails().is_empty());
    }
}
