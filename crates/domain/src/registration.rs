//! # 参加登録の対象者解決と認可
//!
//! パス引数で指定された登録対象ユーザーを解決し、呼び出し元が
//! その対象を登録してよいかを判定する。
//!
//! - `me` は呼び出し元自身を指す
//! - 本人以外を登録できるのは管理者のみ

use crate::{DomainError, user::UserId};

/// 登録対象の指定
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserSelector {
    /// 呼び出し元自身（`me`）
    Me,
    /// パス引数で指定されたユーザー ID（未解釈の文字列）
    Id(String),
}

impl UserSelector {
    /// 呼び出し元自身を指す予約語
    pub const ME: &'static str = "me";

    /// パス引数から登録対象の指定を作成する
    ///
    /// 空白のみの場合は `Validation` エラー。
    pub fn parse(raw: &str) -> Result<Self, DomainError> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Err(DomainError::Validation(
                "ユーザー ID が指定されていません".to_string(),
            ));
        }
        if raw == Self::ME {
            return Ok(Self::Me);
        }
        Ok(Self::Id(raw.to_string()))
    }
}

/// 認証済みの呼び出し元
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Caller {
    pub user_id:  UserId,
    pub is_admin: bool,
}

impl Caller {
    /// 登録対象を解決し、認可する
    ///
    /// 1. `me` を呼び出し元の ID に置き換える
    /// 2. 本人または管理者でなければ `Forbidden`
    ///
    /// ID として解釈できない指定は本人ではありえないため、
    /// 管理者以外には `Forbidden`、管理者には `Validation` を返す。
    pub fn authorize_target(&self, selector: UserSelector) -> Result<UserId, DomainError> {
        let raw = match selector {
            UserSelector::Me => return Ok(self.user_id.clone()),
            UserSelector::Id(raw) => raw,
        };

        match UserId::parse(&raw) {
            Some(target) if target == self.user_id || self.is_admin => Ok(target),
            _ if !self.is_admin => Err(DomainError::Forbidden(
                "他のユーザーを登録するには管理者権限が必要です".to_string(),
            )),
            _ => Err(DomainError::Validation(format!(
                "ユーザー ID の形式が不正です: {raw}"
            ))),
        }
    }
}
