//! ログイン中ユーザーの参照ユースケース

use std::sync::Arc;

use txosteo_domain::user::Subject;
use txosteo_infra::repository::{UserRepository, UserWithEvents};

use crate::error::ApiError;

pub struct UserUseCaseImpl {
    user_repository: Arc<dyn UserRepository>,
}

impl UserUseCaseImpl {
    pub fn new(user_repository: Arc<dyn UserRepository>) -> Self {
        Self { user_repository }
    }

    /// セッションの subject に対応するユーザーを、参加履歴・参加登録付きで取得する
    ///
    /// セッションはあるがユーザーが未作成の場合は `NotFound`。
    pub async fn get_me(&self, subject: &Subject) -> Result<UserWithEvents, ApiError> {
        self.user_repository
            .find_with_events_by_subject(subject)
            .await?
            .ok_or_else(|| {
                ApiError::NotFound(format!(
                    "subject \"{subject}\" のユーザーが見つかりません"
                ))
            })
    }
}
