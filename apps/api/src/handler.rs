//! # HTTP リクエストハンドラ
//!
//! axum のルートに対応するハンドラ関数を定義する。
//!
//! - 各ハンドラはサブモジュールに配置し、ここで re-export する
//! - ハンドラは薄く保ち、判断はユースケース層・ドメイン層に委譲する

pub mod auth;
pub mod event;
pub mod health;
pub mod image;
pub mod registration;
pub mod report;

pub use auth::{UserState, me};
pub use event::{EventDto, EventState, get_event};
pub use health::{ReadinessState, health_check, readiness_check};
pub use image::{ImageState, delete_image};
pub use registration::{RegistrationState, register_for_event};
pub use report::{ReportState, send_report};
