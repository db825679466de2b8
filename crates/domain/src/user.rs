//! # ユーザー
//!
//! ユーザーエンティティとそれに関連する値オブジェクトを定義する。
//!
//! ## ドメイン用語
//!
//! | 型 | ドメイン用語 |
//! |---|------------|
//! | [`User`] | ユーザー（一般利用者または管理者） |
//! | [`Subject`] | 外部 ID プロバイダが発行する subject クレーム |
//!
//! ユーザーは外部 ID プロバイダでログインし、そのクレームの subject で
//! 本システムのユーザーと紐付けられる。
//!
//! ## 使用例
//!
//! ```rust
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use txosteo_domain::user::{Email, NewUser, Subject, User, UserId};
//! use txosteo_domain::value_objects::UserName;
//!
//! let user = User::new(NewUser {
//!     id:      UserId::new(),
//!     subject: Subject::new("auth0|abc123")?,
//!     email:   Email::new("user@example.com")?,
//!     name:    UserName::new("山田太郎")?,
//!     now:     chrono::Utc::now(),
//! });
//!
//! assert!(!user.is_admin());
//! # Ok(())
//! # }
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{DomainError, notification::AdminEmailCategory, value_objects::UserName};

define_uuid_id! {
    /// ユーザー ID（一意識別子）
    pub struct UserId;
}

define_validated_string! {
    /// ID プロバイダの subject クレーム
    ///
    /// `auth0|xxxx` のような ID プロバイダ固有の安定した識別子。
    pub struct Subject {
        label: "subject",
        max_length: 255,
    }
}

/// メールアドレス（値オブジェクト）
///
/// 生成時にバリデーションを実行し、不正な値の作成を防ぐ。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Email(String);

impl Email {
    /// メールアドレスを作成する
    ///
    /// # バリデーション
    ///
    /// - 空文字列ではない
    /// - `local@domain` の形式
    /// - 最大 255 文字
    pub fn new(value: impl Into<String>) -> Result<Self, DomainError> {
        let value = value.into();

        if value.is_empty() {
            return Err(DomainError::Validation(
                "メールアドレスは必須です".to_string(),
            ));
        }

        let Some((local, domain)) = value.split_once('@') else {
            return Err(DomainError::Validation(
                "メールアドレスの形式が不正です".to_string(),
            ));
        };

        if local.is_empty() || domain.is_empty() {
            return Err(DomainError::Validation(
                "メールアドレスの形式が不正です".to_string(),
            ));
        }

        if value.len() > 255 {
            return Err(DomainError::Validation(
                "メールアドレスは255文字以内である必要があります".to_string(),
            ));
        }

        Ok(Self(value))
    }

    /// 文字列参照を取得する
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Email {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// 新規ユーザー作成の入力
pub struct NewUser {
    pub id:      UserId,
    pub subject: Subject,
    pub email:   Email,
    pub name:    UserName,
    pub now:     DateTime<Utc>,
}

/// ユーザーエンティティ
///
/// # 不変条件
///
/// - `subject` はシステム全体で一意
/// - `subscribed_email_categories` は重複を含まない
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    id: UserId,
    subject: Subject,
    email: Email,
    name: UserName,
    is_admin: bool,
    subscribed_email_categories: Vec<AdminEmailCategory>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl User {
    /// 新しいユーザーを作成する
    ///
    /// 作成時は一般ユーザーで、メール種別の購読はない。
    pub fn new(input: NewUser) -> Self {
        Self {
            id: input.id,
            subject: input.subject,
            email: input.email,
            name: input.name,
            is_admin: false,
            subscribed_email_categories: Vec::new(),
            created_at: input.now,
            updated_at: input.now,
        }
    }

    /// 既存のデータからユーザーを復元する（データベースから取得時）
    #[allow(clippy::too_many_arguments)]
    pub fn from_db(
        id: UserId,
        subject: Subject,
        email: Email,
        name: UserName,
        is_admin: bool,
        subscribed_email_categories: Vec<AdminEmailCategory>,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            subject,
            email,
            name,
            is_admin,
            subscribed_email_categories,
            created_at,
            updated_at,
        }
    }

    // Getter メソッド

    pub fn id(&self) -> &UserId {
        &self.id
    }

    pub fn subject(&self) -> &Subject {
        &self.subject
    }

    pub fn email(&self) -> &Email {
        &self.email
    }

    pub fn name(&self) -> &UserName {
        &self.name
    }

    pub fn is_admin(&self) -> bool {
        self.is_admin
    }

    pub fn subscribed_email_categories(&self) -> &[AdminEmailCategory] {
        &self.subscribed_email_categories
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    // ビジネスロジックメソッド

    /// 指定したメール種別を受け取る管理者か判定する
    ///
    /// 購読していても管理者でなければ受け取らない。
    pub fn receives(&self, category: AdminEmailCategory) -> bool {
        self.is_admin && self.subscribed_email_categories.contains(&category)
    }

    /// 管理者権限を付与した新しいインスタンスを返す
    pub fn promoted_to_admin(self, now: DateTime<Utc>) -> Self {
        Self {
            is_admin: true,
            updated_at: now,
            ..self
        }
    }

    /// メール種別を購読した新しいインスタンスを返す
    ///
    /// 既に購読済みの場合は何も変わらない。
    pub fn subscribed_to(mut self, category: AdminEmailCategory, now: DateTime<Utc>) -> Self {
        if !self.subscribed_email_categories.contains(&category) {
            self.subscribed_email_categories.push(category);
            self.updated_at = now;
        }
        self
    }
}
