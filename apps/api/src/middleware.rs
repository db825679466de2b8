//! # ミドルウェア
//!
//! API 用のミドルウェアを提供する。

mod auth;

pub use auth::{AuthState, AuthenticatedUser, SESSION_COOKIE_NAME, require_session};
