//! # txosteo API サーバー
//!
//! イベント管理 Web アプリケーションの HTTP API。
//!
//! 各ハンドラは (1) パラメータの取り出し (2) 認可 (3) リポジトリ・SDK の呼び出し
//! (4) レスポンスの整形またはエラー、の短い手順で構成される。
//!
//! ## モジュール構成
//!
//! - [`config`] - 環境変数からの設定読み込み
//! - [`error`] - API エラー定義と HTTP レスポンスへの変換
//! - [`middleware`] - セッション認証
//! - [`handler`] - HTTP リクエストハンドラ
//! - [`usecase`] - アプリケーションロジック
//! - [`app_builder`] - ルーター構築
//!
//! ## 依存関係
//!
//! ```text
//! api → infra → domain
//!   └──→ shared
//! ```

pub mod app_builder;
pub mod config;
pub mod error;
pub mod handler;
pub mod middleware;
pub mod usecase;
