//! # テンプレートレンダラー
//!
//! tera テンプレートエンジンで管理者向けメールを HTML/plaintext 両形式で生成する。
//!
//! - テンプレートは `include_str!` でバイナリに埋め込む
//! - `.html` テンプレートは tera の自動エスケープが効く
//! - 件名: `Texas Osteo Report Form - {MMM d, y}`

use chrono::{DateTime, Utc};
use tera::{Context, Tera};
use txosteo_domain::{
    notification::{AdminEmailCategory, EmailMessage, NotificationError},
    report::UserReport,
};

const USER_REPORT: &str = "user_report";

/// テンプレートレンダラー
pub struct TemplateRenderer {
    engine: Tera,
}

impl TemplateRenderer {
    /// 埋め込みテンプレートを登録したレンダラーを作成する
    pub fn new() -> Result<Self, NotificationError> {
        let mut engine = Tera::default();

        engine
            .add_raw_templates(vec![
                (
                    "user_report.html",
                    include_str!("../../templates/email/user_report.html"),
                ),
                (
                    "user_report.txt",
                    include_str!("../../templates/email/user_report.txt"),
                ),
            ])
            .map_err(|e| NotificationError::TemplateFailed(e.to_string()))?;

        Ok(Self { engine })
    }

    /// 利用者レポートのメールを生成する
    ///
    /// 宛先は全員 BCC に入れる（管理者同士のアドレスを互いに見せない）。
    pub fn render_user_report(
        &self,
        report: &UserReport,
        bcc: Vec<String>,
        now: DateTime<Utc>,
    ) -> Result<EmailMessage, NotificationError> {
        let subject = format!("Texas Osteo Report Form - {}", now.format("%b %-d, %Y"));

        let mut context = Context::new();
        context.insert("subject", &subject);
        context.insert("received_on", &now.format("%b %-d, %Y %H:%M UTC").to_string());
        context.insert("title", report.title().as_str());
        context.insert("content", report.content().as_str());
        context.insert(
            "email_category",
            &AdminEmailCategory::UserReport.to_string(),
        );

        Ok(EmailMessage {
            to: Vec::new(),
            bcc,
            html_body: self.render(&format!("{USER_REPORT}.html"), &context)?,
            text_body: self.render(&format!("{USER_REPORT}.txt"), &context)?,
            subject,
        })
    }

    fn render(&self, template: &str, context: &Context) -> Result<String, NotificationError> {
        self.engine
            .render(template, context)
            .map_err(|e| NotificationError::TemplateFailed(e.to_string()))
    }
}
