//! # イベント
//!
//! 利用者が参加登録するイベントを表現する。
//!
//! ## ドメイン用語
//!
//! | 型 | ドメイン用語 |
//! |---|------------|
//! | [`Event`] | 日時と残り枠を持つイベント |
//! | [`Capacity`] | 残り定員（登録のたびに 1 減る） |
//!
//! ## 不変条件
//!
//! - `capacity >= 0`
//! - `signed_up_users` は重複を含まない（集合として扱う）
//!
//! 登録処理の永続化はリポジトリの条件付き更新で行う。
//! このモジュールは登録可否の判定と、更新後の状態の導出のみを担う。

use chrono::{DateTime, Utc};

use crate::{DomainError, user::UserId};

define_uuid_id! {
    /// イベント ID
    pub struct EventId;
}

define_validated_string! {
    /// イベント名
    pub struct EventName {
        label: "イベント名",
        max_length: 200,
    }
}

/// 残り定員（値オブジェクト）
///
/// 負の値は存在しない。
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize)]
#[serde(transparent)]
pub struct Capacity(i32);

impl Capacity {
    pub fn new(value: i32) -> Result<Self, DomainError> {
        if value < 0 {
            return Err(DomainError::Validation(
                "定員は 0 以上である必要があります".to_string(),
            ));
        }
        Ok(Self(value))
    }

    pub fn as_i32(&self) -> i32 {
        self.0
    }

    pub fn is_exhausted(&self) -> bool {
        self.0 == 0
    }

    /// 1 枠消費した定員を返す
    ///
    /// 残りが 0 の場合は `None`。
    pub fn decremented(self) -> Option<Self> {
        (self.0 > 0).then(|| Self(self.0 - 1))
    }
}

/// イベント作成の入力
pub struct NewEvent {
    pub id:            EventId,
    pub name:          EventName,
    pub date_and_time: DateTime<Utc>,
    pub capacity:      Capacity,
    pub now:           DateTime<Utc>,
}

/// イベントエンティティ
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    id: EventId,
    name: EventName,
    date_and_time: DateTime<Utc>,
    capacity: Capacity,
    signed_up_users: Vec<UserId>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Event {
    pub fn new(input: NewEvent) -> Self {
        Self {
            id: input.id,
            name: input.name,
            date_and_time: input.date_and_time,
            capacity: input.capacity,
            signed_up_users: Vec::new(),
            created_at: input.now,
            updated_at: input.now,
        }
    }

    /// 既存のデータからイベントを復元する（データベースから取得時）
    ///
    /// `signed_up_users` の重複は取り除かれる。
    pub fn from_db(
        id: EventId,
        name: EventName,
        date_and_time: DateTime<Utc>,
        capacity: Capacity,
        signed_up_users: Vec<UserId>,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> Self {
        let mut members: Vec<UserId> = Vec::with_capacity(signed_up_users.len());
        for user_id in signed_up_users {
            if !members.contains(&user_id) {
                members.push(user_id);
            }
        }

        Self {
            id,
            name,
            date_and_time,
            capacity,
            signed_up_users: members,
            created_at,
            updated_at,
        }
    }

    pub fn id(&self) -> &EventId {
        &self.id
    }

    pub fn name(&self) -> &EventName {
        &self.name
    }

    pub fn date_and_time(&self) -> DateTime<Utc> {
        self.date_and_time
    }

    pub fn capacity(&self) -> Capacity {
        self.capacity
    }

    pub fn signed_up_users(&self) -> &[UserId] {
        &self.signed_up_users
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// イベント日時が現在時刻より前か
    pub fn has_started(&self, now: DateTime<Utc>) -> bool {
        self.date_and_time < now
    }

    pub fn is_signed_up(&self, user_id: &UserId) -> bool {
        self.signed_up_users.contains(user_id)
    }

    /// 参加登録を受け付けられる状態か検証する
    ///
    /// 開催済みの判定を定員より先に行う。
    pub fn ensure_open_for_registration(&self, now: DateTime<Utc>) -> Result<(), DomainError> {
        if self.has_started(now) {
            return Err(DomainError::InvalidState(
                "このイベントは既に開催済みのため登録できません".to_string(),
            ));
        }
        if self.capacity.is_exhausted() {
            return Err(DomainError::InvalidState(
                "このイベントは定員に達しています".to_string(),
            ));
        }
        Ok(())
    }

    /// 参加登録後のイベントを返す
    ///
    /// 定員を 1 減らし、ユーザーを登録者に加える。登録済みのユーザーでも
    /// 定員は減る。定員が 0 の場合は `InvalidState`。
    pub fn registered(self, user_id: UserId, now: DateTime<Utc>) -> Result<Self, DomainError> {
        let Some(capacity) = self.capacity.decremented() else {
            return Err(DomainError::InvalidState(
                "このイベントは定員に達しています".to_string(),
            ));
        };

        let mut signed_up_users = self.signed_up_users;
        if !signed_up_users.contains(&user_id) {
            signed_up_users.push(user_id);
        }

        Ok(Self {
            capacity,
            signed_up_users,
            updated_at: now,
            ..self
        })
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;
    use pretty_assertions::assert_eq;
    use rstest::{fixture, rstest};

    use super::*;

    #[fixture]
    fn now() -> DateTime<Utc> {
        DateTime::from_timestamp(1_700_000_000, 0).unwrap()
    }

    fn event_with(capacity: i32, date_and_time: DateTime<Utc>, now: DateTime<Utc>) -> Event {
        Event::new(NewEvent {
            id: EventId::new(),
            name: EventName::new("骨粗鬆症セミナー").unwrap(),
            date_and_time,
            capacity: Capacity::new(capacity).unwrap(),
            now,
        })
    }

    #[test]
    fn test_定員は負の値を拒否する() {
        assert!(Capacity::new(-1).is_err());
        assert!(Capacity::new(0).is_ok());
    }

    #[rstest]
    #[case(3, Some(2))]
    #[case(1, Some(0))]
    #[case(0, None)]
    fn test_定員の消費(#[case] value: i32, #[case] expected: Option<i32>) {
        let sut = Capacity::new(value).unwrap().decremented();

        assert_eq!(sut.map(|c| c.as_i32()), expected);
    }

    #[rstest]
    fn test_未来のイベントは登録を受け付ける(now: DateTime<Utc>) {
        let sut = event_with(5, now + Duration::days(1), now);

        assert_eq!(sut.ensure_open_for_registration(now), Ok(()));
    }

    #[rstest]
    fn test_開催済みのイベントは登録を拒否する(now: DateTime<Utc>) {
        let sut = event_with(5, now - Duration::seconds(1), now);

        assert_eq!(
            sut.ensure_open_for_registration(now),
            Err(DomainError::InvalidState(
                "このイベントは既に開催済みのため登録できません".to_string()
            ))
        );
    }

    #[rstest]
    fn test_開催済みかつ定員0では開催済みが優先される(now: DateTime<Utc>) {
        let sut = event_with(0, now - Duration::days(1), now);

        let result = sut.ensure_open_for_registration(now);

        assert!(matches!(result, Err(DomainError::InvalidState(msg)) if msg.contains("開催済み")));
    }

    #[rstest]
    fn test_定員0のイベントは登録を拒否する(now: DateTime<Utc>) {
        let sut = event_with(0, now + Duration::days(1), now);

        assert_eq!(
            sut.ensure_open_for_registration(now),
            Err(DomainError::InvalidState(
                "このイベントは定員に達しています".to_string()
            ))
        );
    }

    #[rstest]
    fn test_登録すると定員が1減り登録者に加わる(now: DateTime<Utc>) {
        let user_id = UserId::new();
        let later = now + Duration::minutes(5);
        let sut = event_with(5, now + Duration::days(1), now);

        let registered = sut.registered(user_id.clone(), later).unwrap();

        assert_eq!(registered.capacity().as_i32(), 4);
        assert_eq!(registered.signed_up_users(), &[user_id]);
        assert_eq!(registered.updated_at(), later);
    }

    #[rstest]
    fn test_同じユーザーの再登録でも定員は減り登録者は重複しない(now: DateTime<Utc>) {
        let user_id = UserId::new();
        let sut = event_with(5, now + Duration::days(1), now);

        let twice = sut
            .registered(user_id.clone(), now)
            .and_then(|e| e.registered(user_id.clone(), now))
            .unwrap();

        assert_eq!(twice.capacity().as_i32(), 3);
        assert_eq!(twice.signed_up_users().len(), 1);
    }

    #[rstest]
    fn test_定員0で登録するとエラー(now: DateTime<Utc>) {
        let sut = event_with(0, now + Duration::days(1), now);

        assert!(sut.registered(UserId::new(), now).is_err());
    }

    #[rstest]
    fn test_from_dbは登録者の重複を取り除く(now: DateTime<Utc>) {
        let user_id = UserId::new();

        let sut = Event::from_db(
            EventId::new(),
            EventName::new("勉強会").unwrap(),
            now,
            Capacity::new(1).unwrap(),
            vec![user_id.clone(), user_id.clone()],
            now,
            now,
        );

        assert_eq!(sut.signed_up_users(), &[user_id]);
    }
}
