//! # ユーザーレポート
//!
//! 利用者がレポートフォームから管理者へ送る報告。

use crate::DomainError;

define_validated_string! {
    /// レポートの件名
    pub struct ReportTitle {
        label: "タイトル",
        max_length: 200,
    }
}

define_validated_string! {
    /// レポートの本文
    pub struct ReportContent {
        label: "本文",
        max_length: 5000,
    }
}

/// 検証済みのユーザーレポート
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserReport {
    title:   ReportTitle,
    content: ReportContent,
}

impl UserReport {
    /// 未検証の入力からレポートを作成する
    ///
    /// どちらかが欠けている場合は `Validation` エラー。
    pub fn new(title: Option<String>, content: Option<String>) -> Result<Self, DomainError> {
        let title = ReportTitle::new(title.unwrap_or_default())?;
        let content = ReportContent::new(content.unwrap_or_default())?;
        Ok(Self { title, content })
    }

    pub fn title(&self) -> &ReportTitle {
        &self.title
    }

    pub fn content(&self) -> &ReportContent {
        &self.content
    }
}
