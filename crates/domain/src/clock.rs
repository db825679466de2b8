//! # 時刻
//!
//! 開催済み判定・作成日時・レポートの件名日付はすべて [`Clock`] から得る。
//! 本番は [`SystemClock`]、テストは [`FixedClock`] を注入する。

use chrono::{DateTime, Utc};

pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// `Utc::now()` を返す
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// 常に同じ時刻を返す
///
/// イベント日時との前後関係（開催前 / 開催済み）をテストで固定するために使う。
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(DateTime<Utc>);

impl FixedClock {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self(now)
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::event::{Capacity, Event, EventId, EventName, NewEvent};

    fn event_at(date_and_time: DateTime<Utc>) -> Event {
        Event::new(NewEvent {
            id: EventId::new(),
            name: EventName::new("姿勢評価ワークショップ").unwrap(),
            date_and_time,
            capacity: Capacity::new(10).unwrap(),
            now: date_and_time - Duration::days(30),
        })
    }

    #[test]
    fn test_固定時刻は何度呼んでも変わらない() {
        let at = DateTime::from_timestamp(1_700_000_000, 0).unwrap();
        let clock = FixedClock::new(at);

        assert_eq!(clock.now(), at);
        assert_eq!(clock.now(), at);
    }

    #[test]
    fn test_固定時刻でイベントの開催済み判定が決まる() {
        let event = event_at(DateTime::from_timestamp(1_700_000_000, 0).unwrap());
        let before = FixedClock::new(event.date_and_time() - Duration::minutes(1));
        let after = FixedClock::new(event.date_and_time() + Duration::minutes(1));

        assert!(!event.has_started(before.now()));
        assert!(event.has_started(after.now()));
    }

    #[test]
    fn test_システム時刻は呼び出し時点の現在時刻() {
        let before = Utc::now();
        let now = SystemClock.now();

        assert!(before <= now && now <= Utc::now());
    }
}
