//! # 通知
//!
//! 管理者向けメール通知に関するドメインモデルを定義する。
//!
//! ## ドメイン用語
//!
//! | 型 | ドメイン用語 |
//! |---|------------|
//! | [`AdminEmailCategory`] | 管理者が購読できるメール種別 |
//! | [`EmailMessage`] | 送信可能な状態まで組み立てられたメール |
//!
//! テンプレートのレンダリングは API 層（tera）、送信はインフラ層の責務。

use serde::{Deserialize, Serialize};
use strum::IntoStaticStr;
use thiserror::Error;

/// 通知送信エラー
#[derive(Debug, Error)]
pub enum NotificationError {
    /// メール送信に失敗
    #[error("メール送信に失敗: {0}")]
    SendFailed(String),

    /// テンプレートレンダリングに失敗
    #[error("テンプレートレンダリングに失敗: {0}")]
    TemplateFailed(String),
}

/// 管理者向けメール種別
///
/// `users.subscribed_email_categories` カラム（text[]）に格納される値。
/// 管理者は種別ごとに購読・解除できる。
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    IntoStaticStr,
    strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum AdminEmailCategory {
    /// 利用者から送られたレポートフォーム
    UserReport,
    /// 新規ユーザー登録
    NewUser,
}

/// メールメッセージ
///
/// テンプレートレンダリングの出力。NotificationSender に渡される。
/// 宛先は `to` と `bcc` のどちらか一方以上に含まれていること。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailMessage {
    /// 送信先メールアドレス
    pub to:        Vec<String>,
    /// BCC 送信先メールアドレス（受信者同士にアドレスを見せない）
    pub bcc:       Vec<String>,
    /// 件名
    pub subject:   String,
    /// HTML 本文
    pub html_body: String,
    /// プレーンテキスト本文
    pub text_body: String,
}

impl EmailMessage {
    /// 全宛先数（to + bcc）
    pub fn recipient_count(&self) -> usize {
        self.to.len() + self.bcc.len()
    }
}
