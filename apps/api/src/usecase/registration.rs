//! # 参加登録ユースケース
//!
//! イベントへの参加登録を行う。各ステップは早期終了しうる:
//!
//! 1. イベント ID・ユーザー ID の指定を確認（ストアへのアクセス前）
//! 2. `me` を呼び出し元に解決し、本人または管理者であることを確認
//! 3. イベントを登録者一覧付きで取得
//! 4. 開催済み・定員到達を確認
//! 5. 定員の減算と登録者の追加を不可分に実行
//!
//! 手順 4 の確認後に他のリクエストが最後の枠を取った場合は、
//! 手順 5 の条件付き減算が失敗し、定員到達として扱う。

use std::sync::Arc;

use txosteo_domain::{
    clock::Clock,
    event::{Event, EventId},
    registration::{Caller, UserSelector},
};
use txosteo_infra::repository::{EventRepository, RegistrationOutcome};
use txosteo_shared::{event_log::event, log_business_event};

use crate::error::ApiError;

/// 参加登録の入力
///
/// パス引数は未解釈の文字列のまま受け取る。
pub struct RegisterInput {
    pub event_id: String,
    pub user_id:  String,
    pub caller:   Caller,
}

/// 参加登録ユースケース
pub struct RegistrationUseCaseImpl {
    event_repository: Arc<dyn EventRepository>,
    clock:            Arc<dyn Clock>,
}

impl RegistrationUseCaseImpl {
    pub fn new(event_repository: Arc<dyn EventRepository>, clock: Arc<dyn Clock>) -> Self {
        Self {
            event_repository,
            clock,
        }
    }

    /// ユーザーをイベントに参加登録し、更新後のイベントを返す
    pub async fn register(&self, input: RegisterInput) -> Result<Event, ApiError> {
        let raw_event_id = input.event_id.trim();
        if raw_event_id.is_empty() {
            return Err(ApiError::BadRequest(
                "イベント ID が指定されていません".to_string(),
            ));
        }
        let selector = UserSelector::parse(&input.user_id)?;

        let target = input.caller.authorize_target(selector).inspect_err(|e| {
            log_business_event!(
                event.category = event::category::REGISTRATION,
                event.action = event::action::REGISTRATION_REJECTED,
                event.entity_type = event::entity_type::EVENT,
                event.entity_id = raw_event_id,
                event.actor_id = %input.caller.user_id,
                event.result = event::result::FAILURE,
                reason = %e,
                "参加登録を拒否"
            );
        })?;

        let not_found = || ApiError::NotFound(format!("イベントが見つかりません: {raw_event_id}"));
        let event_id = EventId::parse(raw_event_id).ok_or_else(not_found)?;

        let current = self
            .event_repository
            .find_by_id_with_members(&event_id)
            .await?
            .ok_or_else(not_found)?;

        let now = self.clock.now();
        current.ensure_open_for_registration(now)?;

        match self
            .event_repository
            .register_user(&event_id, &target, now)
            .await?
        {
            RegistrationOutcome::Registered(updated) => {
                log_business_event!(
                    event.category = event::category::REGISTRATION,
                    event.action = event::action::USER_REGISTERED,
                    event.entity_type = event::entity_type::EVENT,
                    event.entity_id = %event_id,
                    event.actor_id = %input.caller.user_id,
                    event.result = event::result::SUCCESS,
                    target_user_id = %target,
                    remaining_capacity = updated.capacity().as_i32(),
                    "参加登録完了"
                );
                Ok(updated)
            }
            RegistrationOutcome::CapacityExhausted => Err(ApiError::InvalidState(
                "このイベントは定員に達しています".to_string(),
            )),
            RegistrationOutcome::EventNotFound => Err(not_found()),
            RegistrationOutcome::UserNotFound => Err(ApiError::NotFound(format!(
                "ユーザーが見つかりません: {target}"
            ))),
        }
    }
}
